// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer capture pipeline
//!
//! - [`capture`]: fixed topology (source → tee → preview / PNG branches)
//! - [`preview`]: display sink variants and the frames they hand to the UI
//! - [`bus`]: bus sync handler, window-handle negotiation, typed bus events

pub mod bus;
pub mod capture;
pub mod preview;

pub use bus::{BusEvent, PipelineFault, RenderRect, WindowHandle, WindowHandleSlot};
pub use capture::{CapturePipeline, CaptureSettings};
pub use preview::PreviewFrame;

use gstreamer as gst;
use std::fmt;

/// Pipeline states the application reasons about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Null,
    Ready,
    Paused,
    Playing,
}

impl From<gst::State> for PipelineState {
    fn from(state: gst::State) -> Self {
        match state {
            gst::State::Ready => PipelineState::Ready,
            gst::State::Paused => PipelineState::Paused,
            gst::State::Playing => PipelineState::Playing,
            _ => PipelineState::Null,
        }
    }
}

impl From<PipelineState> for gst::State {
    fn from(state: PipelineState) -> Self {
        match state {
            PipelineState::Null => gst::State::Null,
            PipelineState::Ready => gst::State::Ready,
            PipelineState::Paused => gst::State::Paused,
            PipelineState::Playing => gst::State::Playing,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Null => write!(f, "NULL"),
            PipelineState::Ready => write!(f, "READY"),
            PipelineState::Paused => write!(f, "PAUSED"),
            PipelineState::Playing => write!(f, "PLAYING"),
        }
    }
}
