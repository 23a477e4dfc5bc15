// SPDX-License-Identifier: GPL-3.0-only

//! Declarative window description
//!
//! The layout ships embedded in the binary and can be replaced at startup
//! with a file of the same shape.

use crate::constants::resources;
use crate::errors::UiError;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(RustEmbed)]
#[folder = "resources/"]
struct Resources;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiDescription {
    pub window: WindowSpec,
    pub video_surface: SurfaceSpec,
    pub controls: Vec<ControlSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WindowSpec {
    pub id: String,
    pub title: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SurfaceSpec {
    pub id: String,
    /// RGB in `0.0..=1.0`, painted while no frame is shown
    #[serde(default = "default_background")]
    pub background: [f32; 3],
}

fn default_background() -> [f32; 3] {
    crate::constants::ui::IDLE_SURFACE_RGB
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Button,
    /// Button whose label is the elapsed run time
    Timer,
    /// Drop-down selector
    Combo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ControlSpec {
    pub id: String,
    pub kind: ControlKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    /// Name of the handler invoked by this control
    pub signal: String,
}

impl UiDescription {
    /// Load from `path`, or the embedded description when `None`
    pub fn load(path: Option<&Path>) -> Result<Self, UiError> {
        match path {
            Some(path) => {
                info!(path = %path.display(), "Loading UI description");
                let text = std::fs::read_to_string(path)?;
                Self::from_json(&text)
            }
            None => Self::embedded(),
        }
    }

    /// The description bundled with the binary
    pub fn embedded() -> Result<Self, UiError> {
        let file = Resources::get(resources::UI_DESCRIPTION).ok_or_else(|| {
            UiError::Io(format!("{} is not embedded", resources::UI_DESCRIPTION))
        })?;
        debug!(name = resources::UI_DESCRIPTION, "Using embedded UI description");
        Ok(serde_json::from_slice(&file.data)?)
    }

    pub fn from_json(text: &str) -> Result<Self, UiError> {
        Ok(serde_json::from_str(text)?)
    }
}
