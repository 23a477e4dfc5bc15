// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use flipbuq::{Config, PreviewSinkKind};
use std::path::Path;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.video_source, "autovideosrc");
    assert_eq!(
        config.preview_sink,
        PreviewSinkKind::Embedded,
        "Preview should render inside the window by default"
    );
    assert_eq!(config.overlay_sink, "xvimagesink");
    assert_eq!(config.filename_pattern, "frame%d.png");
    assert!(
        config.output_directory.is_none(),
        "Frames go to the working directory unless configured"
    );
}

#[test]
fn test_overrides_replace_source_and_directory() {
    let config = Config::default().with_overrides(
        Some("videotestsrc num-buffers=5"),
        Some(Path::new("/tmp/frames")),
    );

    assert_eq!(config.video_source, "videotestsrc num-buffers=5");
    assert_eq!(config.output_directory.as_deref(), Some("/tmp/frames"));
    // Untouched fields keep their values
    assert_eq!(config.filename_pattern, "frame%d.png");
}

#[test]
fn test_no_overrides_is_identity() {
    let config = Config::default();
    assert_eq!(config.clone().with_overrides(None, None), config);
}

#[test]
fn test_config_serde_round_trip() {
    let config = Config {
        preview_sink: PreviewSinkKind::Overlay,
        output_directory: Some("frames".to_string()),
        ..Config::default()
    };

    let json = serde_json::to_string(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}
