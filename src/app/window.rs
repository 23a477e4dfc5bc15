// SPDX-License-Identifier: GPL-3.0-only

//! Native window handle and video surface geometry

use crate::pipelines::{RenderRect, WindowHandle};
use cosmic::iced::Rectangle;
use raw_window_handle::RawWindowHandle;
use tracing::warn;

/// Numeric handle an overlay sink can render into
///
/// X11 and Win32 give a window id; Wayland and AppKit give a surface or view
/// pointer, passed through as an address.
pub fn native_handle(raw: RawWindowHandle) -> Option<WindowHandle> {
    let handle = match raw {
        RawWindowHandle::Xlib(h) => h.window as usize,
        RawWindowHandle::Xcb(h) => h.window.get() as usize,
        RawWindowHandle::Win32(h) => h.hwnd.get() as usize,
        RawWindowHandle::Wayland(h) => h.surface.as_ptr() as usize,
        RawWindowHandle::AppKit(h) => h.ns_view.as_ptr() as usize,
        other => {
            warn!(handle = ?other, "Unsupported window system for video overlay");
            return None;
        }
    };
    Some(WindowHandle::new(handle))
}

/// Video surface bounds in window pixels
///
/// Layout bounds are logical; native sinks address physical pixels.
/// `None` while the surface has no visible area.
pub fn surface_rect(bounds: Rectangle, scale_factor: f32) -> Option<RenderRect> {
    let x = (bounds.x * scale_factor).round() as i32;
    let y = (bounds.y * scale_factor).round() as i32;
    let width = (bounds.width * scale_factor).round() as i32;
    let height = (bounds.height * scale_factor).round() as i32;

    (width > 0 && height > 0).then_some(RenderRect {
        x,
        y,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use raw_window_handle::{WebWindowHandle, XcbWindowHandle, XlibWindowHandle};
    use std::num::NonZeroU32;

    #[test]
    fn test_xlib_window_id() {
        let raw = RawWindowHandle::Xlib(XlibWindowHandle::new(0x2a00007));
        assert_eq!(native_handle(raw), Some(WindowHandle::new(0x2a00007)));
    }

    #[test]
    fn test_xcb_window_id() {
        let window = NonZeroU32::new(4242).unwrap();
        let raw = RawWindowHandle::Xcb(XcbWindowHandle::new(window));
        assert_eq!(native_handle(raw), Some(WindowHandle::new(4242)));
    }

    #[test]
    fn test_unsupported_handle() {
        let raw = RawWindowHandle::Web(WebWindowHandle::new(1));
        assert_eq!(native_handle(raw), None);
    }

    #[test]
    fn test_surface_rect_scales_to_window_pixels() {
        let bounds = Rectangle::new(
            cosmic::iced::Point::new(8.0, 48.5),
            cosmic::iced::Size::new(644.0, 440.0),
        );

        assert_eq!(
            surface_rect(bounds, 1.0),
            Some(RenderRect {
                x: 8,
                y: 49,
                width: 644,
                height: 440
            })
        );
        assert_eq!(
            surface_rect(bounds, 2.0),
            Some(RenderRect {
                x: 16,
                y: 97,
                width: 1288,
                height: 880
            })
        );
    }

    #[test]
    fn test_collapsed_surface_has_no_rect() {
        let bounds = Rectangle::new(
            cosmic::iced::Point::new(8.0, 48.0),
            cosmic::iced::Size::new(644.0, 0.0),
        );
        assert_eq!(surface_rect(bounds, 1.0), None);
    }
}
