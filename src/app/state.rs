// SPDX-License-Identifier: GPL-3.0-only

//! Application state types

use crate::config::Config;
use crate::controller::Controller;
use crate::pipelines::{BusEvent, CapturePipeline, CaptureSettings, PreviewFrame, WindowHandle, WindowHandleSlot};
use crate::ui::BoundUi;
use cosmic::cosmic_config;
use cosmic::iced::{Rectangle, window};
use std::path::PathBuf;

/// Context drawer pages
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    Settings,
}

/// Everything built before the event loop starts
#[derive(Clone)]
pub struct Flags {
    pub config: Config,
    pub config_handler: Option<cosmic_config::Config>,
    pub ui: BoundUi<Message>,
    pub capture: CaptureSettings,
    pub pipeline: CapturePipeline,
    pub window: WindowHandleSlot,
    pub output_dir: PathBuf,
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// Validated window layout
    pub ui: BoundUi<Message>,
    /// Settings the running pipeline was built with
    pub capture: CaptureSettings,
    pub controller: Controller<CapturePipeline>,
    /// Native handle shared with the bus sync handler
    pub window: WindowHandleSlot,
    pub output_dir: PathBuf,
    /// Latest embedded preview frame
    pub preview: Option<cosmic::widget::image::Handle>,
    pub frames_written: u64,
    pub last_frame_path: Option<PathBuf>,
    /// Dismissible error shown above the video surface
    pub error_banner: Option<String>,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Controls =====
    Play,
    Stop,
    Record,
    ResetTime,
    SelectFps(usize),
    ToggleContextPage(ContextPage),

    // ===== Settings drawer =====
    OpenOutputFolder,
    DismissError,

    // ===== Window =====
    WindowOpened(window::Id),
    WindowRealized(Option<WindowHandle>),
    /// Window resized; the video surface may have moved
    WindowResized,
    /// Logical bounds of the video surface
    SurfaceBounds(Option<Rectangle>),

    // ===== Pipeline =====
    Bus(BusEvent),
    PreviewFrame(PreviewFrame),
    /// Refresh the run time label
    Tick,

    UpdateConfig(Config),
}
