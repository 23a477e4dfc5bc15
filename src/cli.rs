// SPDX-License-Identifier: GPL-3.0-only

//! Headless capture
//!
//! Runs the same pipeline and controller as the window, with the preview
//! branch discarding frames. Every written file is printed as it lands.

use flipbuq::config::{Config, PreviewSinkKind};
use flipbuq::controller::{Controller, LoopControl};
use flipbuq::errors::PipelineError;
use flipbuq::pipelines::{BusEvent, CapturePipeline, CaptureSettings, WindowHandleSlot};
use flipbuq::storage;
use futures::StreamExt;
use tracing::{debug, info, warn};

/// Record until end-of-stream, Ctrl+C, or `frames` files have been written
///
/// End-of-stream is requested once the limit is reached; frames already
/// queued behind it are still written and printed.
pub fn record(config: Config, frames: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize GStreamer
    gstreamer::init()?;

    let output_dir = storage::ensure_output_dir(&storage::resolve_output_dir(
        config.output_directory.as_deref(),
    ))?;

    let mut settings = CaptureSettings::from_config(&config, &output_dir)?;
    settings.preview = PreviewSinkKind::Headless;

    let pipeline = CapturePipeline::build(&settings, WindowHandleSlot::default())?;
    let mut events = pipeline
        .take_bus_events()
        .ok_or("Pipeline bus events unavailable")?;
    let mut controller = Controller::new(pipeline.clone());

    println!("Source: {}", settings.source);
    println!("Output: {}", output_dir.join(&config.filename_pattern).display());
    println!();
    match frames {
        Some(count) => println!("Recording {} frames... (press Ctrl+C to stop early)", count),
        None => println!("Recording... (press Ctrl+C to stop)"),
    }

    // Ctrl+C drains the pipeline instead of killing it mid-file
    let eos_pipeline = pipeline.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Stopping...");
        eos_pipeline.send_eos();
    })?;

    controller.on_record()?;

    let rt = tokio::runtime::Runtime::new()?;
    let written = rt.block_on(async {
        let mut written = 0u64;
        let mut eos_requested = false;

        while let Some(event) = events.next().await {
            match event {
                BusEvent::FrameWritten { index, path } => {
                    written += 1;
                    debug!(index, "Frame written");
                    println!("{}", path.display());

                    if !eos_requested && frames.is_some_and(|limit| written >= limit) {
                        info!(written, "Frame limit reached");
                        eos_requested = pipeline.send_eos();
                    }
                }
                BusEvent::EndOfStream => {
                    if controller.on_shutdown() == LoopControl::Quit {
                        break;
                    }
                }
                BusEvent::Error(fault) => {
                    controller.on_pipeline_error(&fault);
                    return Err(PipelineError::from(fault));
                }
                BusEvent::Warning(fault) => {
                    warn!(%fault, debug = ?fault.debug, "Pipeline warning");
                }
                BusEvent::StateChanged { previous, current } => {
                    debug!(%previous, %current, "Pipeline state changed");
                }
            }
        }

        Ok(written)
    })?;

    println!();
    println!("{} frames saved to {}", written, output_dir.display());

    Ok(())
}
