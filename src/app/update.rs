// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! Control messages go straight to the controller; the controller decides
//! whether they apply and which controls stay enabled.

use crate::app::state::{AppModel, ContextPage, Message};
use crate::app::view::VIDEO_SURFACE_ID;
use crate::app::window::{native_handle, surface_rect};
use crate::config::PreviewSinkKind;
use crate::constants::timing;
use crate::controller::{LoopControl, Transition};
use crate::errors::PipelineError;
use crate::pipelines::{BusEvent, PreviewFrame};
use cosmic::Task;
use tracing::{debug, error, info, warn};

impl AppModel {
    /// Main message handler
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== Controls =====
            Message::Play => {
                let result = self.controller.on_play();
                self.handle_start(result)
            }
            Message::Record => {
                let result = self.controller.on_record();
                self.handle_start(result)
            }
            Message::Stop => {
                let result = self.controller.on_stop();
                self.preview = None;
                match result {
                    Ok(_) => Task::none(),
                    Err(e) => self.show_error(e.to_string()),
                }
            }
            Message::ResetTime => {
                self.controller.on_time_reset();
                Task::none()
            }
            Message::SelectFps(index) => {
                self.controller.on_fps_select(index);
                Task::none()
            }
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Settings drawer =====
            Message::OpenOutputFolder => {
                if let Err(err) = open::that_detached(&self.output_dir) {
                    error!(path = %self.output_dir.display(), error = %err, "Failed to open output folder");
                }
                Task::none()
            }
            Message::DismissError => {
                self.error_banner = None;
                self.controller.dismiss_error();
                self.query_surface_bounds()
            }

            // ===== Window =====
            Message::WindowOpened(id) => {
                if self.window.get().is_some() {
                    return self.query_surface_bounds();
                }
                Task::batch([capture_window_handle(id), self.query_surface_bounds()])
            }
            Message::WindowRealized(Some(handle)) => {
                self.window.capture(handle);
                Task::none()
            }
            Message::WindowRealized(None) => {
                if self.capture.preview == PreviewSinkKind::Overlay {
                    warn!("No native window handle, the overlay sink will open its own window");
                }
                Task::none()
            }
            Message::WindowResized => self.query_surface_bounds(),
            Message::SurfaceBounds(bounds) => {
                self.handle_surface_bounds(bounds);
                Task::none()
            }

            // ===== Pipeline =====
            Message::Bus(event) => self.handle_bus_event(event),
            Message::PreviewFrame(frame) => {
                self.handle_preview_frame(frame);
                Task::none()
            }
            Message::Tick => Task::none(),

            Message::UpdateConfig(config) => {
                if config != self.config {
                    info!("Configuration changed, capture settings apply on next launch");
                    debug!(?config, "New configuration");
                    self.config = config;
                }
                Task::none()
            }
        }
    }

    fn handle_start(
        &mut self,
        result: Result<Transition, PipelineError>,
    ) -> Task<cosmic::Action<Message>> {
        match result {
            Ok(Transition::Applied) => {
                self.error_banner = None;
                if self.capture.preview == PreviewSinkKind::Overlay && self.window.get().is_none() {
                    warn!("Starting overlay preview before the window handle is known");
                }
            }
            Ok(Transition::Ignored) => {}
            Err(e) => return self.show_error(e.to_string()),
        }
        Task::none()
    }

    fn handle_toggle_context_page(
        &mut self,
        context_page: ContextPage,
    ) -> Task<cosmic::Action<Message>> {
        if self.context_page == context_page {
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            self.context_page = context_page;
            self.core.window.show_context = true;
        }
        // The drawer narrows the video surface
        self.query_surface_bounds()
    }

    fn handle_bus_event(&mut self, event: BusEvent) -> Task<cosmic::Action<Message>> {
        match event {
            BusEvent::EndOfStream => {
                if self.controller.on_shutdown() == LoopControl::Quit {
                    info!(frames = self.frames_written, "Capture finished, exiting");
                    return cosmic::iced::exit();
                }
            }
            BusEvent::Error(fault) => {
                self.controller.on_pipeline_error(&fault);
                self.preview = None;
                return self.show_error(fault.to_string());
            }
            BusEvent::Warning(fault) => {
                warn!(%fault, debug = ?fault.debug, "Pipeline warning");
            }
            BusEvent::StateChanged { previous, current } => {
                debug!(%previous, %current, "Pipeline state changed");
            }
            BusEvent::FrameWritten { index, path } => {
                self.frames_written += 1;
                if self.frames_written % timing::FRAME_LOG_INTERVAL == 0 {
                    debug!(index, path = %path.display(), total = self.frames_written, "Frames written");
                }
                self.last_frame_path = Some(path);
            }
        }
        Task::none()
    }

    fn handle_preview_frame(&mut self, frame: PreviewFrame) {
        // Late frames after a stop would overwrite the idle background
        if !self.controller.state().is_running() {
            return;
        }

        let latency = frame.captured_at.elapsed();
        if latency > timing::SLOW_PREVIEW_FRAME {
            debug!(latency_ms = latency.as_millis() as u64, "Slow preview frame");
        }

        self.preview = Some(cosmic::widget::image::Handle::from_rgba(
            frame.width,
            frame.height,
            frame.data.to_vec(),
        ));
    }

    /// Track the video surface so an overlay sink stays inside it
    fn handle_surface_bounds(&mut self, bounds: Option<cosmic::iced::Rectangle>) {
        let Some(area) = bounds.and_then(|b| surface_rect(b, self.core.scale_factor())) else {
            debug!("Video surface has no visible area");
            return;
        };

        if self.window.set_area(area)
            && self.controller.state().is_running()
            && !self.controller.pipeline().apply_render_area(area)
        {
            debug!("Display sink does not render into the window");
        }
    }

    /// Show the banner; it shifts the video surface down
    fn show_error(&mut self, message: String) -> Task<cosmic::Action<Message>> {
        error!(%message, "Showing error");
        self.error_banner = Some(message);
        self.query_surface_bounds()
    }

    /// Ask for the video surface's bounds; only overlay sinks need them
    pub(crate) fn query_surface_bounds(&self) -> Task<cosmic::Action<Message>> {
        if self.capture.preview != PreviewSinkKind::Overlay {
            return Task::none();
        }

        cosmic::iced::widget::container::visible_bounds(VIDEO_SURFACE_ID.clone())
            .map(|bounds| cosmic::Action::App(Message::SurfaceBounds(bounds)))
    }
}

/// Read the native handle of window `id` once it exists
pub(crate) fn capture_window_handle(id: cosmic::iced::window::Id) -> Task<cosmic::Action<Message>> {
    cosmic::iced::window::run_with_handle(id, |handle| native_handle(handle.as_raw()))
        .map(|handle| cosmic::Action::App(Message::WindowRealized(handle)))
}
