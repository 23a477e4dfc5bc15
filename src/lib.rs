// SPDX-License-Identifier: GPL-3.0-only

//! FlipBuq - webcam preview that dumps every frame to numbered PNG files
//!
//! # Architecture
//!
//! - [`pipelines`]: GStreamer capture pipeline, preview sinks and bus bridge
//! - [`controller`]: Idle/Running state machine and enabled-control invariant
//! - [`ui`]: Declarative window description and handler binding
//! - [`app`]: libcosmic application shell
//! - [`config`]: User configuration handling
//! - [`storage`]: Output directory and frame file naming
//!
//! # Example
//!
//! ```ignore
//! // GUI:      flipbuq --output-dir ~/frames
//! // Headless: flipbuq record --frames 10 --source "videotestsrc"
//! ```

pub mod app;
pub mod config;
pub mod constants;
pub mod controller;
pub mod errors;
pub mod pipelines;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::{Config, PreviewSinkKind};
pub use controller::{Control, ControlSet, Controller, ControllerState, LoopControl, Transition};
pub use errors::{AppError, AppResult, PipelineError, UiError};
