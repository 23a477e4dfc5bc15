// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
}

/// Pipeline-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// An element could not be created (missing plugin, bad launch fragment)
    ElementCreation { element: String, reason: String },
    /// Two elements or pads refused to link
    Link { from: String, to: String },
    /// The pipeline has no bus
    MissingBus,
    /// A state change was rejected
    StateChange { target: String, reason: String },
    /// Error reported on the bus while running
    Runtime(String),
}

/// UI description errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// The description could not be read
    Io(String),
    /// The description is not valid JSON for the expected layout
    Parse(String),
    /// The window id is not the one the application drives
    UnexpectedWindow(String),
    /// The drawing surface id is not the one the application renders into
    UnexpectedSurface(String),
    /// A control id the application does not know
    UnknownControl(String),
    /// A control declared twice
    DuplicateControl(String),
    /// A required control is absent
    MissingControl(&'static str),
    /// A signal name with no registered handler
    UnknownHandler { control: String, signal: String },
    /// A handler registered for a different kind of control
    HandlerKind { control: String, signal: String },
    /// A selector declared without options
    EmptyOptions(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ElementCreation { element, reason } => {
                write!(f, "Failed to create {}: {}", element, reason)
            }
            PipelineError::Link { from, to } => write!(f, "Failed to link {} to {}", from, to),
            PipelineError::MissingBus => write!(f, "Pipeline has no bus"),
            PipelineError::StateChange { target, reason } => {
                write!(f, "Failed to set pipeline to {}: {}", target, reason)
            }
            PipelineError::Runtime(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::Io(msg) => write!(f, "Cannot read UI description: {}", msg),
            UiError::Parse(msg) => write!(f, "Invalid UI description: {}", msg),
            UiError::UnexpectedWindow(id) => write!(f, "Unexpected window id '{}'", id),
            UiError::UnexpectedSurface(id) => write!(f, "Unexpected video surface id '{}'", id),
            UiError::UnknownControl(id) => write!(f, "Unknown control '{}'", id),
            UiError::DuplicateControl(id) => write!(f, "Control '{}' declared twice", id),
            UiError::MissingControl(id) => write!(f, "Control '{}' is missing", id),
            UiError::UnknownHandler { control, signal } => {
                write!(f, "Control '{}' names unknown handler '{}'", control, signal)
            }
            UiError::HandlerKind { control, signal } => write!(
                f,
                "Handler '{}' does not fit the kind of control '{}'",
                signal, control
            ),
            UiError::EmptyOptions(id) => write!(f, "Selector '{}' has no options", id),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PipelineError {}
impl std::error::Error for UiError {}

// Conversions for I/O errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for UiError {
    fn from(err: std::io::Error) -> Self {
        UiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for UiError {
    fn from(err: serde_json::Error) -> Self {
        UiError::Parse(err.to_string())
    }
}
