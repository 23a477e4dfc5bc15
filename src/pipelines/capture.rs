// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipeline: webcam → tee → {preview, PNG files}
//!
//! ```text
//! source ─ tee ─┬─ videoQueue ─ videoSink
//!               └─ pngQueue ─ videoconvert ─ pngenc ─ multifilesink
//! ```

use super::bus::{BusBridge, BusEvent, RenderRect, RenderTarget, WindowHandleSlot};
use super::preview::{self, FrameReceiver};
use super::PipelineState;
use crate::config::{Config, PreviewSinkKind};
use crate::constants::pipeline;
use crate::controller::PipelineControl;
use crate::errors::{AppResult, PipelineError};
use crate::storage::{self, FramePattern};
use futures::channel::mpsc::UnboundedReceiver;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_video::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Everything needed to assemble the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Element factory name or launch fragment
    pub source: String,
    pub preview: PreviewSinkKind,
    /// Sink factory used in overlay mode
    pub overlay_sink: String,
    /// `multifilesink` location, directory joined with the filename pattern
    pub location: PathBuf,
}

impl CaptureSettings {
    pub fn from_config(config: &Config, output_dir: &Path) -> AppResult<Self> {
        let pattern = FramePattern::parse(&config.filename_pattern)?;
        Ok(Self {
            source: config.video_source.clone(),
            preview: config.preview_sink,
            overlay_sink: config.overlay_sink.clone(),
            location: storage::frame_location(output_dir, &pattern),
        })
    }
}

/// Handle on the constructed pipeline
///
/// Cloning shares the same GStreamer pipeline. The bus event and preview
/// frame receivers are handed out once, to whoever drives the controller.
#[derive(Debug, Clone)]
pub struct CapturePipeline {
    pipeline: gst::Pipeline,
    bus: BusBridge,
    frames: Arc<Mutex<Option<FrameReceiver>>>,
}

impl CapturePipeline {
    /// Assemble and link the fixed topology
    ///
    /// The pipeline is left in the NULL state.
    pub fn build(settings: &CaptureSettings, window: WindowHandleSlot) -> Result<Self, PipelineError> {
        info!(
            source = %settings.source,
            preview = %settings.preview,
            location = %settings.location.display(),
            "Building capture pipeline"
        );

        let pipeline = gst::Pipeline::with_name(pipeline::PIPELINE_NAME);

        let source = make_source(&settings.source)?;
        let tee = make_element("tee", pipeline::TEE)?;

        // Preview branch
        let preview_queue = make_element("queue", pipeline::PREVIEW_QUEUE)?;
        let (frame_sender, frame_receiver) =
            futures::channel::mpsc::channel(pipeline::PREVIEW_CHANNEL_CAPACITY);
        let frame_sender = (settings.preview == PreviewSinkKind::Embedded).then_some(frame_sender);
        let preview_sink =
            preview::build_sink(settings.preview, &settings.overlay_sink, frame_sender)?;

        // Snapshot branch
        let snapshot_queue = make_element("queue", pipeline::SNAPSHOT_QUEUE)?;
        let colorspace = make_element("videoconvert", pipeline::COLORSPACE)?;
        let encoder = gst::ElementFactory::make("pngenc")
            .name(pipeline::PNG_ENCODER)
            // Encode every frame, not only the first one
            .property("snapshot", false)
            .build()
            .map_err(|e| creation_error("pngenc", e))?;
        let file_sink = gst::ElementFactory::make("multifilesink")
            .name(pipeline::FILE_SINK)
            .property("location", &*settings.location.to_string_lossy())
            .property("post-messages", true)
            .build()
            .map_err(|e| creation_error("multifilesink", e))?;

        pipeline
            .add_many([
                &source,
                &tee,
                &preview_queue,
                &preview_sink,
                &snapshot_queue,
                &colorspace,
                &encoder,
                &file_sink,
            ])
            .map_err(|_| PipelineError::Link {
                from: "elements".to_string(),
                to: pipeline::PIPELINE_NAME.to_string(),
            })?;

        link(&source, &tee)?;
        link(&preview_queue, &preview_sink)?;
        link(&snapshot_queue, &colorspace)?;
        link(&colorspace, &encoder)?;
        link(&encoder, &file_sink)?;

        attach_branch(&tee, &preview_queue)?;
        attach_branch(&tee, &snapshot_queue)?;

        let bus = BusBridge::install(&pipeline, window)?;

        debug!("Capture pipeline linked");

        Ok(Self {
            pipeline,
            bus,
            frames: Arc::new(Mutex::new(Some(frame_receiver))),
        })
    }

    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    /// Look up a pipeline element by name
    pub fn element(&self, name: &str) -> Option<gst::Element> {
        self.pipeline.by_name(name)
    }

    /// Bus events; `None` after the first call
    pub fn take_bus_events(&self) -> Option<UnboundedReceiver<BusEvent>> {
        self.bus.take_events()
    }

    /// Embedded preview frames; `None` after the first call
    ///
    /// The stream ends immediately for non-embedded preview sinks.
    pub fn take_preview_frames(&self) -> Option<FrameReceiver> {
        self.frames.lock().ok()?.take()
    }

    /// Move an overlay sink that is already rendering to `area`
    ///
    /// Returns `false` when the display sink does not draw into the window.
    pub fn apply_render_area(&self, area: RenderRect) -> bool {
        let Some(overlay) = self
            .element(pipeline::PREVIEW_SINK)
            .and_then(|sink| sink.dynamic_cast::<gstreamer_video::VideoOverlay>().ok())
        else {
            return false;
        };

        overlay.set_render_area(area);
        overlay.expose();
        true
    }

    /// Ask the sources to finish; the bus reports end-of-stream once every sink drained
    pub fn send_eos(&self) -> bool {
        info!("Sending EOS to pipeline");
        self.pipeline.send_event(gst::event::Eos::new())
    }
}

impl PipelineControl for CapturePipeline {
    fn set_state(&self, state: PipelineState) -> Result<(), PipelineError> {
        debug!(%state, "Setting pipeline state");
        self.pipeline
            .set_state(state.into())
            .map(|_| ())
            .map_err(|e| PipelineError::StateChange {
                target: state.to_string(),
                reason: e.to_string(),
            })
    }
}

fn creation_error(element: &str, err: impl ToString) -> PipelineError {
    PipelineError::ElementCreation {
        element: element.to_string(),
        reason: err.to_string(),
    }
}

fn make_element(factory: &str, name: &str) -> Result<gst::Element, PipelineError> {
    gst::ElementFactory::make(factory)
        .name(name)
        .build()
        .map_err(|e| creation_error(factory, e))
}

/// A bare factory name becomes one element, anything else is parsed as a launch fragment
fn make_source(description: &str) -> Result<gst::Element, PipelineError> {
    let description = description.trim();
    let is_factory_name = !description.is_empty()
        && description
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if is_factory_name {
        return make_element(description, pipeline::SOURCE);
    }

    let bin = gst::parse::bin_from_description(description, true)
        .map_err(|e| creation_error(description, e))?;
    bin.set_property("name", pipeline::SOURCE);
    Ok(bin.upcast())
}

fn link(from: &gst::Element, to: &gst::Element) -> Result<(), PipelineError> {
    from.link(to).map_err(|_| PipelineError::Link {
        from: from.name().to_string(),
        to: to.name().to_string(),
    })
}

/// Link a fresh tee request pad to the branch queue's sink pad
fn attach_branch(tee: &gst::Element, queue: &gst::Element) -> Result<(), PipelineError> {
    let link_error = || PipelineError::Link {
        from: tee.name().to_string(),
        to: queue.name().to_string(),
    };

    let tee_pad = tee
        .request_pad_simple(pipeline::TEE_SRC_TEMPLATE)
        .ok_or_else(link_error)?;
    let queue_pad = queue.static_pad("sink").ok_or_else(link_error)?;
    tee_pad.link(&queue_pad).map_err(|_| link_error())?;

    debug!(pad = %tee_pad.name(), branch = %queue.name(), "Attached tee branch");
    Ok(())
}
