// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Unique identifier in RDNN notation, also the cosmic-config namespace
pub const APP_ID: &str = "com.noenieto.Flipbuq";

/// GStreamer element names and properties used by the capture pipeline
pub mod pipeline {
    /// Name of the top-level pipeline
    pub const PIPELINE_NAME: &str = "WebCamPipeline";

    /// Capture source (factory name or launch fragment)
    pub const SOURCE: &str = "source";

    /// Branch point feeding the preview and snapshot paths
    pub const TEE: &str = "t";

    /// Queue in front of the display sink
    pub const PREVIEW_QUEUE: &str = "videoQueue";

    /// Display sink (appsink bin, overlay sink or fakesink)
    pub const PREVIEW_SINK: &str = "videoSink";

    /// Appsink inside the embedded preview bin
    pub const PREVIEW_APPSINK: &str = "previewAppSink";

    /// Queue in front of the PNG branch
    pub const SNAPSHOT_QUEUE: &str = "pngQueue";

    /// Colorspace normalization before encoding
    pub const COLORSPACE: &str = "colorSpaceFlt";

    /// PNG encoder
    pub const PNG_ENCODER: &str = "pngEncoder";

    /// Numbered file writer
    pub const FILE_SINK: &str = "multiFileSink";

    /// Tee request pad template
    pub const TEE_SRC_TEMPLATE: &str = "src_%u";

    /// Property shared by overlay-capable video sinks
    pub const FORCE_ASPECT_RATIO: &str = "force-aspect-ratio";

    /// Structure name of the element message multifilesink posts per written file
    pub const FILE_WRITTEN_MESSAGE: &str = "GstMultiFileSink";

    /// Output format handed to the embedded preview
    pub const PREVIEW_FORMAT: &str = "RGBA";

    /// Appsink queue depth, old frames are dropped beyond this
    pub const PREVIEW_MAX_BUFFERS: u32 = 2;

    /// Frames buffered between the appsink callback and the UI
    pub const PREVIEW_CHANNEL_CAPACITY: usize = 4;
}

/// Defaults for the user configuration
pub mod defaults {
    /// Capture source used when nothing else is configured
    pub const VIDEO_SOURCE: &str = "autovideosrc";

    /// Native video sink used in overlay preview mode
    pub const OVERLAY_SINK: &str = "xvimagesink";

    /// Output filename pattern, printf-style integer conversion for the frame index
    pub const FILENAME_PATTERN: &str = "frame%d.png";
}

/// Declarative UI resource
pub mod resources {
    /// Embedded description file name (under `resources/`)
    pub const UI_DESCRIPTION: &str = "flipbuq.ui.json";

    /// Window id the description must declare
    pub const MAIN_WINDOW: &str = "MainWindow";

    /// Drawing surface the video is rendered into
    pub const VIDEO_SURFACE: &str = "VideoWindow";
}

/// UI layout constants
pub mod ui {
    /// Neutral gray painted on the video surface while nothing renders into it
    pub const IDLE_SURFACE_RGB: [f32; 3] = [0.5, 0.5, 0.5];

    /// Minimum window size
    pub const MIN_WIDTH: f32 = 360.0;
    pub const MIN_HEIGHT: f32 = 240.0;

    /// Control row icon size
    pub const ICON_SIZE: u16 = 16;
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// How often the running timer label refreshes
    pub const TIMER_TICK: Duration = Duration::from_secs(1);

    /// Preview frames older than this when they reach the UI are logged
    pub const SLOW_PREVIEW_FRAME: Duration = Duration::from_millis(66);

    /// Log frame statistics every N frames
    pub const FRAME_LOG_INTERVAL: u64 = 30;
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
