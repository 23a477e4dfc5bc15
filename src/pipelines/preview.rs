// SPDX-License-Identifier: GPL-3.0-only

//! Display sink for the preview branch

use crate::config::PreviewSinkKind;
use crate::constants::{pipeline, timing};
use crate::errors::PipelineError;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Tightly packed RGBA frame for the embedded preview
#[derive(Clone)]
pub struct PreviewFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub captured_at: Instant,
}

impl fmt::Debug for PreviewFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

pub type FrameSender = futures::channel::mpsc::Sender<PreviewFrame>;
pub type FrameReceiver = futures::channel::mpsc::Receiver<PreviewFrame>;

/// Build the display sink for `kind`, named [`pipeline::PREVIEW_SINK`]
///
/// `frames` is only used by the embedded sink.
pub fn build_sink(
    kind: PreviewSinkKind,
    overlay_sink: &str,
    frames: Option<FrameSender>,
) -> Result<gst::Element, PipelineError> {
    match kind {
        PreviewSinkKind::Embedded => build_embedded_sink(frames),
        PreviewSinkKind::Overlay => build_overlay_sink(overlay_sink),
        PreviewSinkKind::Headless => gst::ElementFactory::make("fakesink")
            .name(pipeline::PREVIEW_SINK)
            .property("sync", true)
            .build()
            .map_err(|e| PipelineError::ElementCreation {
                element: "fakesink".to_string(),
                reason: e.to_string(),
            }),
    }
}

fn build_embedded_sink(frames: Option<FrameSender>) -> Result<gst::Element, PipelineError> {
    let description = format!("videoconvert ! appsink name={}", pipeline::PREVIEW_APPSINK);
    let creation_error = |reason: String| PipelineError::ElementCreation {
        element: "embedded preview sink".to_string(),
        reason,
    };

    let bin = gst::parse::bin_from_description(&description, true)
        .map_err(|e| creation_error(e.to_string()))?;
    bin.set_property("name", pipeline::PREVIEW_SINK);

    let appsink = bin
        .by_name(pipeline::PREVIEW_APPSINK)
        .ok_or_else(|| creation_error("appsink missing from bin".to_string()))?
        .dynamic_cast::<AppSink>()
        .map_err(|_| creation_error("failed to cast appsink".to_string()))?;

    let caps = gst::Caps::builder("video/x-raw")
        .field("format", pipeline::PREVIEW_FORMAT)
        .build();
    appsink.set_caps(Some(&caps));
    appsink.set_property("max-buffers", pipeline::PREVIEW_MAX_BUFFERS);
    appsink.set_property("drop", true);
    appsink.set_property("enable-last-sample", false);

    if let Some(mut sender) = frames {
        let mut frame_num = 0u64;
        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                    frame_num += 1;

                    let Some(frame) = frame_from_sample(&sample) else {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            warn!(frame = frame_num, "Unreadable preview sample");
                        }
                        return Ok(gst::FlowSuccess::Ok);
                    };

                    // A full or closed channel only costs the preview, never the PNG branch
                    if let Err(e) = sender.try_send(frame) {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(frame = frame_num, error = ?e, "Preview frame dropped");
                        }
                    }

                    Ok(gst::FlowSuccess::Ok)
                })
                .build(),
        );
    }

    Ok(bin.upcast())
}

fn build_overlay_sink(factory: &str) -> Result<gst::Element, PipelineError> {
    let sink = gst::ElementFactory::make(factory)
        .name(pipeline::PREVIEW_SINK)
        .build()
        .map_err(|e| PipelineError::ElementCreation {
            element: factory.to_string(),
            reason: e.to_string(),
        })?;

    if sink.find_property(pipeline::FORCE_ASPECT_RATIO).is_some() {
        sink.set_property(pipeline::FORCE_ASPECT_RATIO, true);
    } else {
        warn!(sink = %factory, "Overlay sink cannot preserve aspect ratio");
    }

    Ok(sink)
}

/// Copy an RGBA sample into a frame without row padding
fn frame_from_sample(sample: &gst::Sample) -> Option<PreviewFrame> {
    let captured_at = Instant::now();
    let buffer = sample.buffer()?;
    let info = VideoInfo::from_caps(sample.caps()?).ok()?;
    let map = buffer.map_readable().ok()?;

    let data = pack_rows(
        map.as_slice(),
        info.width() as usize * 4,
        usize::try_from(info.stride()[0]).ok()?,
        info.height() as usize,
    )?;

    Some(PreviewFrame {
        width: info.width(),
        height: info.height(),
        data,
        captured_at,
    })
}

/// Strip per-row padding; `None` when `bytes` is too short for the layout
fn pack_rows(bytes: &[u8], row: usize, stride: usize, height: usize) -> Option<Arc<[u8]>> {
    if height == 0 || stride < row {
        return None;
    }

    let needed = stride * (height - 1) + row;
    if bytes.len() < needed {
        return None;
    }

    if stride == row {
        return Some(Arc::from(&bytes[..needed]));
    }

    let mut packed = Vec::with_capacity(row * height);
    for line in bytes.chunks(stride).take(height) {
        packed.extend_from_slice(&line[..row]);
    }
    Some(packed.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_rows_without_padding() {
        let bytes: Vec<u8> = (0..16).collect();
        let packed = pack_rows(&bytes, 8, 8, 2).unwrap();
        assert_eq!(&packed[..], &bytes[..]);
    }

    #[test]
    fn test_pack_rows_strips_padding() {
        // Two rows of one RGBA pixel, each padded to 8 bytes
        let bytes = [1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8, 0, 0, 0, 0];
        let packed = pack_rows(&bytes, 4, 8, 2).unwrap();
        assert_eq!(&packed[..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_pack_rows_short_buffer() {
        assert!(pack_rows(&[0u8; 10], 8, 8, 2).is_none());
        assert!(pack_rows(&[0u8; 16], 8, 4, 2).is_none());
        assert!(pack_rows(&[], 8, 8, 0).is_none());
    }
}
