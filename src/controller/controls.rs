// SPDX-License-Identifier: GPL-3.0-only

//! Named controls and the set of them that is currently enabled

use std::fmt;

/// The six controls the window exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Play,
    Stop,
    Record,
    Time,
    Fps,
    Settings,
}

impl Control {
    /// All controls, in toolbar order
    pub const ALL: [Control; 6] = [
        Control::Play,
        Control::Stop,
        Control::Record,
        Control::Time,
        Control::Fps,
        Control::Settings,
    ];

    /// Identifier used by the UI description
    pub fn widget_id(self) -> &'static str {
        match self {
            Control::Play => "BtnPlay",
            Control::Stop => "BtnStop",
            Control::Record => "BtnRecord",
            Control::Time => "BtnTime",
            Control::Fps => "ComboFPS",
            Control::Settings => "BtnSettings",
        }
    }

    pub fn from_widget_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.widget_id() == id)
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.widget_id())
    }
}

/// Subset of [`Control`]s that accept input
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlSet(u8);

impl ControlSet {
    /// Enabled while nothing is captured
    pub fn idle() -> Self {
        Self::from_controls(&[
            Control::Record,
            Control::Time,
            Control::Fps,
            Control::Settings,
        ])
    }

    /// Enabled while the pipeline is playing
    pub fn running() -> Self {
        Self::from_controls(&[Control::Stop])
    }

    pub fn from_controls(controls: &[Control]) -> Self {
        Self(controls.iter().fold(0, |bits, c| bits | c.bit()))
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        self.0 & control.bit() != 0
    }

    /// Enabled controls, in toolbar order
    pub fn iter(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL.into_iter().filter(|c| self.is_enabled(*c))
    }
}

impl fmt::Debug for ControlSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_ids_round_trip() {
        for control in Control::ALL {
            assert_eq!(Control::from_widget_id(control.widget_id()), Some(control));
        }
        assert_eq!(Control::from_widget_id("BtnPause"), None);
    }

    #[test]
    fn test_idle_and_running_are_disjoint() {
        let idle = ControlSet::idle();
        let running = ControlSet::running();
        for control in Control::ALL {
            assert!(!(idle.is_enabled(control) && running.is_enabled(control)));
        }
        assert!(!idle.is_enabled(Control::Play));
        assert!(!running.is_enabled(Control::Play));
    }

    #[test]
    fn test_iter_keeps_toolbar_order() {
        let ids: Vec<_> = ControlSet::idle().iter().map(Control::widget_id).collect();
        assert_eq!(ids, ["BtnRecord", "BtnTime", "ComboFPS", "BtnSettings"]);
    }
}
