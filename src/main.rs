// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use flipbuq::app::{AppModel, Flags};
use flipbuq::config::{self, Config};
use flipbuq::constants::{APP_ID, ui};
use flipbuq::pipelines::{CapturePipeline, CaptureSettings, WindowHandleSlot};
use flipbuq::storage;
use flipbuq::ui::UiDescription;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "flipbuq")]
#[command(about = "Webcam preview that saves every captured frame as a numbered PNG")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// UI description file replacing the built-in layout
    #[arg(long, global = true)]
    ui: Option<PathBuf>,

    /// Capture source: element name or launch fragment (e.g. "videotestsrc num-buffers=5")
    #[arg(short, long, global = true)]
    source: Option<String>,

    /// Directory the PNG frames are written to
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture without a window, printing each written file
    Record {
        /// Stop after this many frames have been written
        #[arg(short, long)]
        frames: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=flipbuq=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let (config_handler, config) = config::load(APP_ID);
    let config = config.with_overrides(cli.source.as_deref(), cli.output_dir.as_deref());

    match cli.command {
        Some(Commands::Record { frames }) => cli::record(config, frames),
        None => run_gui(config, config_handler, cli.ui),
    }
}

fn run_gui(
    config: Config,
    config_handler: Option<cosmic::cosmic_config::Config>,
    ui_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Everything that can fail at startup fails before the window opens
    let description = UiDescription::load(ui_path.as_deref())?;
    let bound = flipbuq::ui::bind(&description, &flipbuq::app::handler_table())?;

    gstreamer::init()?;

    let output_dir = storage::ensure_output_dir(&storage::resolve_output_dir(
        config.output_directory.as_deref(),
    ))?;
    let capture = CaptureSettings::from_config(&config, &output_dir)?;
    let window = WindowHandleSlot::default();
    let pipeline = CapturePipeline::build(&capture, window.clone())?;

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default()
        .size(cosmic::iced::Size::new(bound.width, bound.height))
        .size_limits(
            cosmic::iced::Limits::NONE
                .min_width(ui::MIN_WIDTH)
                .min_height(ui::MIN_HEIGHT),
        );

    let flags = Flags {
        config,
        config_handler,
        ui: bound,
        capture,
        pipeline,
        window,
        output_dir,
    };

    cosmic::app::run::<AppModel>(settings, flags)?;

    Ok(())
}
