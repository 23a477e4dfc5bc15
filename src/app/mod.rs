// SPDX-License-Identifier: GPL-3.0-only

//! Main application module for FlipBuq
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Flags, Message)
//! - `view`: Video surface, control row and error banner
//! - `drawer`: Settings context drawer
//! - `update`: Message handling
//! - `window`: Native window handle and video surface geometry
//!
//! The pipeline is built before the event loop starts and handed over in
//! [`Flags`]. Bus events, embedded preview frames and the run timer arrive
//! through subscriptions; every control message goes through the
//! [`Controller`](crate::controller::Controller).

mod drawer;
mod state;
mod update;
mod view;
pub mod window;

use crate::config::{Config, PreviewSinkKind};
use crate::constants::{APP_ID, timing};
use crate::controller::Controller;
use crate::ui::HandlerTable;
use cosmic::app::context_drawer;
use cosmic::iced::Subscription;
use cosmic::{ApplicationExt, Element, Task};
pub use state::{AppModel, ContextPage, Flags, Message};
pub use view::format_elapsed;
use tracing::{info, warn};

/// Signal names the UI description may refer to
pub fn handler_table() -> HandlerTable<Message> {
    HandlerTable::new()
        .on_activate("onPlay", Message::Play)
        .on_activate("onStop", Message::Stop)
        .on_activate("onRecord", Message::Record)
        .on_activate("onTimeReset", Message::ResetTime)
        .on_activate("onSettings", Message::ToggleContextPage(ContextPage::Settings))
        .on_select("onFpsSelect", Message::SelectFps)
}

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = Flags;

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = APP_ID;

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(core: cosmic::Core, flags: Self::Flags) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let Flags {
            config,
            config_handler,
            ui,
            capture,
            pipeline,
            window,
            output_dir,
        } = flags;

        let title = ui.title.clone();

        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            config,
            config_handler,
            ui,
            capture,
            controller: Controller::new(pipeline),
            window,
            output_dir,
            preview: None,
            frames_written: 0,
            last_frame_path: None,
            error_banner: None,
        };

        app.set_header_title(title);

        // The window may already be open; otherwise the open event triggers the capture
        let handle_task = match app.core.main_window_id() {
            Some(id) => Task::batch([
                update::capture_window_handle(id),
                app.query_surface_bounds(),
            ]),
            None => Task::none(),
        };

        info!(
            source = %app.capture.source,
            output = %app.output_dir.display(),
            "Application initialized"
        );

        (app, handle_task)
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::Settings => self.settings_view(),
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        use cosmic::iced::futures::{SinkExt, StreamExt};

        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        let window_sub = cosmic::iced::window::open_events().map(Message::WindowOpened);

        // Overlay sinks draw into the window directly and must follow the layout
        let resize_sub = if self.capture.preview == PreviewSinkKind::Overlay {
            cosmic::iced::window::resize_events().map(|_| Message::WindowResized)
        } else {
            Subscription::none()
        };

        let bus_pipeline = self.controller.pipeline().clone();
        let bus_sub = Subscription::run_with_id(
            "pipeline_bus",
            cosmic::iced::stream::channel(100, move |mut output| async move {
                let Some(mut events) = bus_pipeline.take_bus_events() else {
                    warn!("Bus events already taken");
                    return;
                };
                info!("Bus subscription started");

                while let Some(event) = events.next().await {
                    if output.send(Message::Bus(event)).await.is_err() {
                        info!("Output channel closed - bus subscription stopping");
                        break;
                    }
                }
            }),
        );

        let preview_sub = if self.capture.preview == PreviewSinkKind::Embedded {
            let frame_pipeline = self.controller.pipeline().clone();
            Subscription::run_with_id(
                "preview_frames",
                cosmic::iced::stream::channel(4, move |mut output| async move {
                    let Some(mut frames) = frame_pipeline.take_preview_frames() else {
                        warn!("Preview frames already taken");
                        return;
                    };

                    while let Some(frame) = frames.next().await {
                        // Keep only the newest frame when the UI lags behind
                        if let Err(e) = output.try_send(Message::PreviewFrame(frame)) {
                            if e.is_disconnected() {
                                info!("Output channel closed - preview subscription stopping");
                                break;
                            }
                        }
                    }
                }),
            )
        } else {
            Subscription::none()
        };

        let timer_sub = if self.controller.state().is_running() {
            cosmic::iced::time::every(timing::TIMER_TICK).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };

        Subscription::batch([
            config_sub,
            window_sub,
            resize_sub,
            bus_sub,
            preview_sub,
            timer_sub,
        ])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
