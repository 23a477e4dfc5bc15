// SPDX-License-Identifier: GPL-3.0-only

//! Settings drawer view

use crate::app::state::{AppModel, ContextPage, Message};
use crate::constants::app_info;
use cosmic::Element;
use cosmic::app::context_drawer;
use cosmic::iced::{Alignment, Length};
use cosmic::widget;

impl AppModel {
    /// Capture settings in use, frame counter and output folder
    ///
    /// Read-only: the pipeline is built once at startup, changes to the
    /// configuration apply on the next launch.
    pub fn settings_view(&self) -> context_drawer::ContextDrawer<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let fps = self
            .controller
            .fps_selection()
            .and_then(|index| {
                self.ui
                    .control(crate::controller::Control::Fps)
                    .and_then(|c| c.options.get(index))
            })
            .cloned()
            .unwrap_or_else(|| "Source default".to_string());

        let last_frame = self
            .last_frame_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "None".to_string());

        let pattern = self
            .capture
            .location
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let open_button = widget::button::standard("Open Output Folder")
            .on_press(Message::OpenOutputFolder);

        let settings_column: Element<'_, Message> = widget::column()
            .push(widget::text("Capture").size(16).font(cosmic::font::bold()))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(setting_row("Source", self.capture.source.clone()))
            .push(setting_row("Preview", self.capture.preview.to_string()))
            .push(setting_row("Frame rate", fps))
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(widget::text("Output").size(16).font(cosmic::font::bold()))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(setting_row("Folder", self.output_dir.display().to_string()))
            .push(setting_row("Pattern", pattern))
            .push(setting_row("Frames written", self.frames_written.to_string()))
            .push(setting_row("Last frame", last_frame))
            .push(widget::vertical_space().height(spacing.space_xs))
            .push(open_button)
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::text(format!("Version {}", app_info::version()))
                    .size(12)
                    .class(cosmic::theme::Text::Accent),
            )
            .spacing(0)
            .into();

        context_drawer::context_drawer(
            settings_column,
            Message::ToggleContextPage(ContextPage::Settings),
        )
        .title("Settings")
    }
}

fn setting_row<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    widget::row()
        .push(widget::text(label).width(Length::FillPortion(1)))
        .push(widget::text(value).width(Length::FillPortion(2)))
        .align_y(Alignment::Center)
        .into()
}
