// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::defaults;
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, error};

/// Where the live preview is rendered
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PreviewSinkKind {
    /// Frames are pulled from an appsink and drawn by the application
    #[default]
    Embedded,
    /// A native video sink draws straight into the window handle
    Overlay,
    /// Frames are discarded (no window)
    Headless,
}

impl fmt::Display for PreviewSinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewSinkKind::Embedded => write!(f, "Embedded"),
            PreviewSinkKind::Overlay => write!(f, "Overlay"),
            PreviewSinkKind::Headless => write!(f, "Headless"),
        }
    }
}

#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Capture source: element factory name or launch fragment
    pub video_source: String,
    /// Preview rendering mode
    pub preview_sink: PreviewSinkKind,
    /// Sink factory used in overlay mode
    pub overlay_sink: String,
    /// Directory frames are written to (working directory when unset)
    pub output_directory: Option<String>,
    /// Frame filename pattern with one integer conversion
    pub filename_pattern: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video_source: defaults::VIDEO_SOURCE.to_string(),
            preview_sink: PreviewSinkKind::default(),
            overlay_sink: defaults::OVERLAY_SINK.to_string(),
            output_directory: None,
            filename_pattern: defaults::FILENAME_PATTERN.to_string(),
        }
    }
}

impl Config {
    /// Replace the source and output directory for this run only
    pub fn with_overrides(mut self, source: Option<&str>, output_dir: Option<&Path>) -> Self {
        if let Some(source) = source {
            debug!(%source, "Overriding video source");
            self.video_source = source.to_string();
        }
        if let Some(dir) = output_dir {
            debug!(dir = %dir.display(), "Overriding output directory");
            self.output_directory = Some(dir.to_string_lossy().into_owned());
        }
        self
    }
}

/// Load the configuration entry for `app_id`, falling back to defaults
///
/// The handler is `None` when cosmic-config cannot be reached; the
/// application then runs on defaults without persisting anything.
pub fn load(app_id: &str) -> (Option<cosmic_config::Config>, Config) {
    match cosmic_config::Config::new(app_id, Config::VERSION) {
        Ok(handler) => {
            let config = match Config::get_entry(&handler) {
                Ok(config) => config,
                Err((errors, config)) => {
                    error!(?errors, "Errors loading config");
                    config
                }
            };
            (Some(handler), config)
        }
        Err(err) => {
            error!(%err, "Failed to create config handler");
            (None, Config::default())
        }
    }
}
