// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! Layout, top to bottom: optional error banner, the video surface, and the
//! control row in the order the UI description declares it.

use crate::app::state::{AppModel, Message};
use crate::config::PreviewSinkKind;
use crate::constants::ui;
use crate::controller::Control;
use crate::ui::{BoundControl, ControlKind, Handler};
use cosmic::Element;
use cosmic::iced::{Alignment, Background, Color, ContentFit, Length};
use cosmic::widget;
use std::sync::LazyLock;
use std::time::Duration;

/// Video surface container, queried for its bounds in overlay mode
pub(crate) static VIDEO_SURFACE_ID: LazyLock<widget::Id> =
    LazyLock::new(|| widget::Id::new("video-surface"));

impl AppModel {
    pub fn view(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let mut column = widget::column()
            .spacing(spacing.space_xs)
            .padding(spacing.space_xs);

        if let Some(banner) = self.build_error_banner() {
            column = column.push(banner);
        }

        column
            .push(self.build_video_surface())
            .push(self.build_control_row())
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Drawing area for the video
    ///
    /// Gray until a frame is shown. In overlay mode the sink paints into this
    /// container's bounds of the native window, so the surface stays empty.
    fn build_video_surface(&self) -> Element<'_, Message> {
        let [r, g, b] = self.ui.background;
        let background = Color::from_rgb(r, g, b);

        let content: Element<'_, Message> = match (&self.preview, self.capture.preview) {
            (Some(handle), PreviewSinkKind::Embedded) if self.controller.state().is_running() => {
                widget::image::Image::new(handle.clone())
                    .content_fit(ContentFit::Contain)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into()
            }
            _ => widget::Space::new(Length::Fill, Length::Fill).into(),
        };

        widget::container(content)
            .id(VIDEO_SURFACE_ID.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_theme| widget::container::Style {
                background: Some(Background::Color(background)),
                ..Default::default()
            })
            .into()
    }

    fn build_control_row(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();
        let enabled = self.controller.controls();

        let mut row = widget::row()
            .spacing(spacing.space_xs)
            .align_y(Alignment::Center)
            .width(Length::Fill);

        for bound in self.ui.controls() {
            row = row.push(self.build_control(bound, enabled.is_enabled(bound.control)));
        }

        row.into()
    }

    fn build_control<'a>(
        &'a self,
        bound: &'a BoundControl<Message>,
        enabled: bool,
    ) -> Element<'a, Message> {
        match (bound.kind, &bound.handler) {
            (ControlKind::Combo, Handler::Select(on_select)) => {
                match selector_view(&bound.options, self.controller.fps_selection(), enabled) {
                    SelectorView::Dropdown(selected) => {
                        widget::dropdown(&bound.options, Some(selected), *on_select).into()
                    }
                    SelectorView::Label(current) => dimmed(widget::text(current).into()),
                }
            }
            (ControlKind::Timer, _) => {
                let label = format_elapsed(self.controller.elapsed());
                let button = match &bound.icon {
                    Some(icon) => widget::button::standard(label)
                        .leading_icon(widget::icon::from_name(icon.as_str())),
                    None => widget::button::standard(label),
                };
                button
                    .on_press_maybe(enabled.then(|| bound.activate()).flatten())
                    .into()
            }
            _ => {
                let on_press = enabled.then(|| bound.activate()).flatten();
                match (&bound.label, &bound.icon) {
                    (Some(label), Some(icon)) => widget::button::standard(label.as_str())
                        .leading_icon(widget::icon::from_name(icon.as_str()))
                        .on_press_maybe(on_press)
                        .into(),
                    (Some(label), None) => widget::button::standard(label.as_str())
                        .on_press_maybe(on_press)
                        .into(),
                    (None, icon) => widget::button::icon(widget::icon::from_name(
                        icon.as_deref().unwrap_or(fallback_icon(bound.control)),
                    ))
                    .on_press_maybe(on_press)
                    .into(),
                }
            }
        }
    }

    fn build_error_banner(&self) -> Option<Element<'_, Message>> {
        let message = self.error_banner.as_ref()?;
        let spacing = cosmic::theme::spacing();

        let row = widget::row()
            .push(widget::icon::from_name("dialog-error-symbolic").size(ui::ICON_SIZE))
            .push(widget::text(message.as_str()).width(Length::Fill))
            .push(
                widget::button::icon(widget::icon::from_name("window-close-symbolic"))
                    .on_press(Message::DismissError),
            )
            .spacing(spacing.space_xs)
            .align_y(Alignment::Center);

        Some(
            widget::container(row)
                .padding(spacing.space_xs)
                .width(Length::Fill)
                .class(cosmic::theme::Container::Card)
                .into(),
        )
    }
}

/// How a selector renders in the current state
#[derive(Debug, PartialEq, Eq)]
enum SelectorView<'a> {
    /// Interactive, with this option selected
    Dropdown(usize),
    /// Disabled: the current choice as plain text, accepting no input
    Label(&'a str),
}

fn selector_view(options: &[String], selection: Option<usize>, enabled: bool) -> SelectorView<'_> {
    let selected = selection.filter(|i| *i < options.len()).unwrap_or(0);
    if enabled {
        SelectorView::Dropdown(selected)
    } else {
        SelectorView::Label(options.get(selected).map_or("", String::as_str))
    }
}

fn dimmed(element: Element<'_, Message>) -> Element<'_, Message> {
    widget::container(element)
        .style(|_theme| widget::container::Style {
            text_color: Some(Color::from_rgba(1.0, 1.0, 1.0, 0.3)),
            ..Default::default()
        })
        .padding([4, 8])
        .into()
}

fn fallback_icon(control: Control) -> &'static str {
    match control {
        Control::Play => "media-playback-start-symbolic",
        Control::Stop => "media-playback-stop-symbolic",
        Control::Record => "media-record-symbolic",
        Control::Time => "alarm-symbolic",
        Control::Fps => "view-list-symbolic",
        Control::Settings => "preferences-system-symbolic",
    }
}

/// `MM:SS`, or `H:MM:SS` past the first hour
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00");
        assert_eq!(format_elapsed(Duration::from_millis(59_999)), "00:59");
        assert_eq!(format_elapsed(Duration::from_secs(61)), "01:01");
        assert_eq!(format_elapsed(Duration::from_secs(3600 + 5 * 60 + 9)), "1:05:09");
    }

    #[test]
    fn test_disabled_selector_is_a_label() {
        let options: Vec<String> = ["1 fps", "5 fps", "10 fps"].map(String::from).into();

        assert_eq!(selector_view(&options, Some(1), false), SelectorView::Label("5 fps"));
        assert_eq!(selector_view(&options, None, false), SelectorView::Label("1 fps"));
        assert_eq!(selector_view(&options, Some(1), true), SelectorView::Dropdown(1));
    }

    #[test]
    fn test_selector_falls_back_to_first_option() {
        let options: Vec<String> = vec!["30 fps".to_string()];

        assert_eq!(selector_view(&options, Some(7), true), SelectorView::Dropdown(0));
        assert_eq!(selector_view(&[], None, false), SelectorView::Label(""));
    }
}
