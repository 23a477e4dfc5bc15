// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline bus bridge
//!
//! One sync handler serves the whole bus. It runs on GStreamer streaming
//! threads, so it only answers window-handle negotiation from the cached
//! [`WindowHandleSlot`] and forwards everything else the application cares
//! about as [`BusEvent`]s over a channel drained on the UI thread.

use super::PipelineState;
use crate::constants::pipeline;
use crate::errors::PipelineError;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_video::prelude::*;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info, warn};

/// Native window identifier (XID, HWND, surface pointer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(usize);

impl WindowHandle {
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> usize {
        self.0
    }
}

/// Area inside the window the video is scaled into, in window pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Native window handle plus the video area within that window
///
/// The handle is filled on the UI thread after the window is shown; the
/// first capture wins and later captures are ignored. The area follows the
/// video surface's layout and may change at any time.
#[derive(Debug, Clone, Default)]
pub struct WindowHandleSlot {
    handle: Arc<OnceLock<WindowHandle>>,
    area: Arc<Mutex<Option<RenderRect>>>,
}

impl WindowHandleSlot {
    /// Store `handle`; returns `false` if a handle was already captured
    pub fn capture(&self, handle: WindowHandle) -> bool {
        let stored = self.handle.set(handle).is_ok();
        if stored {
            info!(handle = handle.raw(), "Captured native window handle");
        } else {
            warn!(
                ignored = handle.raw(),
                "Window handle already captured, keeping the first one"
            );
        }
        stored
    }

    pub fn get(&self) -> Option<WindowHandle> {
        self.handle.get().copied()
    }

    /// Record where the video surface sits; returns whether it moved
    pub fn set_area(&self, area: RenderRect) -> bool {
        let Ok(mut current) = self.area.lock() else {
            return false;
        };
        if *current == Some(area) {
            return false;
        }
        debug!(?area, "Video surface area updated");
        *current = Some(area);
        true
    }

    pub fn area(&self) -> Option<RenderRect> {
        self.area.lock().ok().and_then(|area| *area)
    }
}

/// Element asking for a surface to render into
pub trait RenderTarget {
    /// Keep the source aspect ratio when scaling into the surface
    fn preserve_aspect_ratio(&self);

    /// Render into the native window `handle`
    fn bind_window(&self, handle: WindowHandle);

    /// Confine rendering to `area` of the bound window
    fn set_render_area(&self, area: RenderRect);
}

impl RenderTarget for gstreamer_video::VideoOverlay {
    fn preserve_aspect_ratio(&self) {
        if self.find_property(pipeline::FORCE_ASPECT_RATIO).is_some() {
            self.set_property(pipeline::FORCE_ASPECT_RATIO, true);
        }
    }

    fn bind_window(&self, handle: WindowHandle) {
        // SAFETY: the handle comes from the realized main window, which
        // outlives the pipeline; it is never dereferenced on this side.
        unsafe { self.set_window_handle(handle.raw()) }
    }

    fn set_render_area(&self, area: RenderRect) {
        if let Err(e) = self.set_render_rectangle(area.x, area.y, area.width, area.height) {
            warn!(?area, error = %e, "Sink rejected render rectangle");
        }
    }
}

/// Answer a `prepare-window-handle` request from the cached handle
///
/// Returns whether a handle was bound. Without one the sink falls back to
/// opening its own window. Without a known area the sink fills the window.
pub fn prepare_render_target(target: &impl RenderTarget, slot: &WindowHandleSlot) -> bool {
    target.preserve_aspect_ratio();
    let Some(handle) = slot.get() else {
        return false;
    };

    target.bind_window(handle);
    match slot.area() {
        Some(area) => target.set_render_area(area),
        None => warn!("Video surface area unknown, the sink covers the whole window"),
    }
    true
}

/// Error or warning reported by an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFault {
    /// Path of the reporting element
    pub source: Option<String>,
    pub message: String,
    pub debug: Option<String>,
}

impl fmt::Display for PipelineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", source, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<PipelineFault> for PipelineError {
    fn from(fault: PipelineFault) -> Self {
        PipelineError::Runtime(fault.to_string())
    }
}

/// Bus messages forwarded to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    EndOfStream,
    Error(PipelineFault),
    Warning(PipelineFault),
    /// State change of the pipeline itself (children are filtered out)
    StateChanged {
        previous: PipelineState,
        current: PipelineState,
    },
    /// The file sink finished writing frame `index`
    FrameWritten { index: u64, path: PathBuf },
}

/// Owns the receiving end of the bus event channel
#[derive(Debug, Clone)]
pub struct BusBridge {
    events: Arc<Mutex<Option<UnboundedReceiver<BusEvent>>>>,
}

impl BusBridge {
    /// Install the sync handler on `pipeline`'s bus
    pub fn install(
        pipeline: &gst::Pipeline,
        window: WindowHandleSlot,
    ) -> Result<Self, PipelineError> {
        let bus = pipeline.bus().ok_or(PipelineError::MissingBus)?;
        let (sender, receiver) = mpsc::unbounded();
        let pipeline_name = pipeline.name().to_string();

        bus.set_sync_handler(move |_bus, message| {
            handle_sync_message(message, &pipeline_name, &window, &sender);
            // Nobody pops the bus, everything is consumed here
            gst::BusSyncReply::Drop
        });

        debug!(pipeline = %pipeline.name(), "Bus sync handler installed");

        Ok(Self {
            events: Arc::new(Mutex::new(Some(receiver))),
        })
    }

    /// Hand out the event receiver; only the first call gets it
    pub fn take_events(&self) -> Option<UnboundedReceiver<BusEvent>> {
        self.events.lock().ok()?.take()
    }
}

fn handle_sync_message(
    message: &gst::MessageRef,
    pipeline_name: &str,
    window: &WindowHandleSlot,
    sender: &UnboundedSender<BusEvent>,
) {
    if gstreamer_video::is_video_overlay_prepare_window_handle_message(message) {
        let overlay = message
            .src()
            .and_then(|src| src.dynamic_cast_ref::<gstreamer_video::VideoOverlay>());

        match overlay {
            Some(overlay) => {
                if !prepare_render_target(overlay, window) {
                    warn!("Sink asked for a window before the handle was captured");
                }
            }
            None => warn!("prepare-window-handle from an element without VideoOverlay"),
        }
        return;
    }

    if let Some(event) = translate(message, pipeline_name) {
        // The receiver is gone once the application stopped listening
        let _ = sender.unbounded_send(event);
    }
}

fn translate(message: &gst::MessageRef, pipeline_name: &str) -> Option<BusEvent> {
    use gst::MessageView;

    let source = || message.src().map(|s| s.path_string().to_string());

    match message.view() {
        MessageView::Eos(_) => Some(BusEvent::EndOfStream),
        MessageView::Error(err) => Some(BusEvent::Error(PipelineFault {
            source: source(),
            message: err.error().to_string(),
            debug: err.debug().map(|d| d.to_string()),
        })),
        MessageView::Warning(w) => Some(BusEvent::Warning(PipelineFault {
            source: source(),
            message: w.error().to_string(),
            debug: w.debug().map(|d| d.to_string()),
        })),
        MessageView::StateChanged(change) => {
            let from_pipeline = message
                .src()
                .is_some_and(|s| s.name().as_str() == pipeline_name);
            from_pipeline.then(|| BusEvent::StateChanged {
                previous: change.old().into(),
                current: change.current().into(),
            })
        }
        MessageView::Element(element) => {
            let structure = element.structure()?;
            if !structure.has_name(pipeline::FILE_WRITTEN_MESSAGE) {
                return None;
            }
            let path = structure.get::<String>("filename").ok()?;
            let index = structure.get::<i32>("index").ok()?;
            Some(BusEvent::FrameWritten {
                index: u64::try_from(index).ok()?,
                path: PathBuf::from(path),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingTarget {
        aspect_calls: Cell<u32>,
        bound: RefCell<Vec<WindowHandle>>,
        areas: RefCell<Vec<RenderRect>>,
    }

    impl RenderTarget for RecordingTarget {
        fn preserve_aspect_ratio(&self) {
            self.aspect_calls.set(self.aspect_calls.get() + 1);
        }

        fn bind_window(&self, handle: WindowHandle) {
            self.bound.borrow_mut().push(handle);
        }

        fn set_render_area(&self, area: RenderRect) {
            self.areas.borrow_mut().push(area);
        }
    }

    const SURFACE: RenderRect = RenderRect {
        x: 8,
        y: 48,
        width: 644,
        height: 440,
    };

    #[test]
    fn test_first_capture_wins() {
        let slot = WindowHandleSlot::default();
        assert_eq!(slot.get(), None);
        assert!(slot.capture(WindowHandle::new(0x2a00007)));
        assert!(!slot.capture(WindowHandle::new(0x1)));
        assert_eq!(slot.get(), Some(WindowHandle::new(0x2a00007)));
    }

    #[test]
    fn test_clones_share_the_slot() {
        let slot = WindowHandleSlot::default();
        let handler_side = slot.clone();
        slot.capture(WindowHandle::new(77));
        assert_eq!(handler_side.get(), Some(WindowHandle::new(77)));
    }

    #[test]
    fn test_prepare_passes_captured_handle_unchanged() {
        let slot = WindowHandleSlot::default();
        slot.capture(WindowHandle::new(0xdead_beef));
        let target = RecordingTarget::default();

        assert!(prepare_render_target(&target, &slot));
        assert!(prepare_render_target(&target, &slot));

        assert_eq!(target.aspect_calls.get(), 2);
        assert_eq!(
            *target.bound.borrow(),
            vec![WindowHandle::new(0xdead_beef), WindowHandle::new(0xdead_beef)]
        );
    }

    #[test]
    fn test_prepare_without_handle_only_fixes_aspect() {
        let slot = WindowHandleSlot::default();
        let target = RecordingTarget::default();

        assert!(!prepare_render_target(&target, &slot));
        assert_eq!(target.aspect_calls.get(), 1);
        assert!(target.bound.borrow().is_empty());
        assert!(target.areas.borrow().is_empty());
    }

    #[test]
    fn test_prepare_confines_sink_to_surface_area() {
        let slot = WindowHandleSlot::default();
        slot.capture(WindowHandle::new(0x2a00007));
        assert!(slot.set_area(SURFACE));
        let target = RecordingTarget::default();

        assert!(prepare_render_target(&target, &slot));
        assert_eq!(*target.bound.borrow(), vec![WindowHandle::new(0x2a00007)]);
        assert_eq!(*target.areas.borrow(), vec![SURFACE]);
    }

    #[test]
    fn test_prepare_without_area_binds_whole_window() {
        let slot = WindowHandleSlot::default();
        slot.capture(WindowHandle::new(5));
        let target = RecordingTarget::default();

        assert!(prepare_render_target(&target, &slot));
        assert_eq!(target.bound.borrow().len(), 1);
        assert!(target.areas.borrow().is_empty());
    }

    #[test]
    fn test_area_updates_replace_the_previous_one() {
        let slot = WindowHandleSlot::default();
        let handler_side = slot.clone();
        let moved = RenderRect { y: 120, height: 368, ..SURFACE };

        assert!(slot.set_area(SURFACE));
        assert!(!slot.set_area(SURFACE), "unchanged area is not an update");
        assert!(slot.set_area(moved));
        assert_eq!(handler_side.area(), Some(moved));
    }

    #[test]
    fn test_fault_display() {
        let fault = PipelineFault {
            source: Some("/WebCamPipeline/source".to_string()),
            message: "Could not open device".to_string(),
            debug: None,
        };
        assert_eq!(
            fault.to_string(),
            "/WebCamPipeline/source: Could not open device"
        );
    }

    fn pipeline_with_child() -> (gst::Pipeline, gst::Bin) {
        gst::init().unwrap();
        let top = gst::Pipeline::with_name(pipeline::PIPELINE_NAME);
        let child = gst::Bin::with_name("source");
        top.add(&child).unwrap();
        (top, child)
    }

    #[test]
    fn test_error_message_becomes_fault() {
        let (_top, child) = pipeline_with_child();
        let message = gst::message::Error::builder(gst::CoreError::Failed, "Device disconnected")
            .src(&child)
            .debug("v4l2src0: No such device")
            .build();

        assert_eq!(
            translate(&message, pipeline::PIPELINE_NAME),
            Some(BusEvent::Error(PipelineFault {
                source: Some("/WebCamPipeline/source".to_string()),
                message: "Device disconnected".to_string(),
                debug: Some("v4l2src0: No such device".to_string()),
            }))
        );
    }

    #[test]
    fn test_warning_message_becomes_fault() {
        gst::init().unwrap();
        let message =
            gst::message::Warning::builder(gst::CoreError::Negotiation, "Falling back").build();

        assert_eq!(
            translate(&message, pipeline::PIPELINE_NAME),
            Some(BusEvent::Warning(PipelineFault {
                source: None,
                message: "Falling back".to_string(),
                debug: None,
            }))
        );
    }

    #[test]
    fn test_only_pipeline_state_changes_are_forwarded() {
        let (top, child) = pipeline_with_child();
        let own = gst::message::StateChanged::builder(
            gst::State::Ready,
            gst::State::Paused,
            gst::State::Playing,
        )
        .src(&top)
        .build();
        let from_child = gst::message::StateChanged::builder(
            gst::State::Ready,
            gst::State::Paused,
            gst::State::Playing,
        )
        .src(&child)
        .build();

        assert_eq!(
            translate(&own, pipeline::PIPELINE_NAME),
            Some(BusEvent::StateChanged {
                previous: PipelineState::Ready,
                current: PipelineState::Paused,
            })
        );
        assert_eq!(translate(&from_child, pipeline::PIPELINE_NAME), None);
    }

    fn file_sink_message(name: &str, filename: Option<&str>, index: i32) -> gst::Message {
        let mut structure = gst::Structure::builder(name).field("index", index);
        if let Some(filename) = filename {
            structure = structure.field("filename", filename);
        }
        gst::message::Element::builder(structure.build()).build()
    }

    #[test]
    fn test_file_sink_message_becomes_frame_written() {
        gst::init().unwrap();
        let message = file_sink_message(
            pipeline::FILE_WRITTEN_MESSAGE,
            Some("/tmp/out/frame3.png"),
            3,
        );

        assert_eq!(
            translate(&message, pipeline::PIPELINE_NAME),
            Some(BusEvent::FrameWritten {
                index: 3,
                path: PathBuf::from("/tmp/out/frame3.png"),
            })
        );
    }

    #[test]
    fn test_malformed_file_sink_messages_are_dropped() {
        gst::init().unwrap();
        let negative = file_sink_message(
            pipeline::FILE_WRITTEN_MESSAGE,
            Some("/tmp/out/frame0.png"),
            -1,
        );
        let unnamed = file_sink_message(pipeline::FILE_WRITTEN_MESSAGE, None, 4);
        let foreign = file_sink_message("GstLevel", Some("/tmp/out/frame4.png"), 4);

        assert_eq!(translate(&negative, pipeline::PIPELINE_NAME), None);
        assert_eq!(translate(&unnamed, pipeline::PIPELINE_NAME), None);
        assert_eq!(translate(&foreign, pipeline::PIPELINE_NAME), None);
    }

    #[test]
    fn test_sync_handler_forwards_end_of_stream() {
        gst::init().unwrap();
        let (sender, mut receiver) = mpsc::unbounded();

        handle_sync_message(
            &gst::message::Eos::new(),
            pipeline::PIPELINE_NAME,
            &WindowHandleSlot::default(),
            &sender,
        );

        assert_eq!(receiver.try_next().unwrap(), Some(BusEvent::EndOfStream));
    }
}
