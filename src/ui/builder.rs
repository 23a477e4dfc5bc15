// SPDX-License-Identifier: GPL-3.0-only

//! Resolve a [`UiDescription`] against the application's handlers
//!
//! Handlers are looked up by signal name in an explicit [`HandlerTable`]
//! built once at startup. Anything the table cannot satisfy is rejected
//! before the window opens.

use super::description::{ControlKind, UiDescription};
use crate::constants::resources;
use crate::controller::Control;
use crate::errors::UiError;
use std::collections::HashMap;
use tracing::debug;

/// What a control emits when used
#[derive(Debug, Clone)]
pub enum Handler<M> {
    /// Buttons and timers
    Activate(M),
    /// Selectors, called with the chosen option index
    Select(fn(usize) -> M),
}

/// Signal name → handler
#[derive(Debug, Clone)]
pub struct HandlerTable<M> {
    handlers: HashMap<&'static str, Handler<M>>,
}

impl<M> Default for HandlerTable<M> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<M: Clone> HandlerTable<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activate(mut self, signal: &'static str, message: M) -> Self {
        self.handlers.insert(signal, Handler::Activate(message));
        self
    }

    pub fn on_select(mut self, signal: &'static str, message: fn(usize) -> M) -> Self {
        self.handlers.insert(signal, Handler::Select(message));
        self
    }

    pub fn get(&self, signal: &str) -> Option<&Handler<M>> {
        self.handlers.get(signal)
    }
}

/// A control with its handler resolved
#[derive(Debug, Clone)]
pub struct BoundControl<M> {
    pub control: Control,
    pub kind: ControlKind,
    pub label: Option<String>,
    pub icon: Option<String>,
    pub options: Vec<String>,
    pub handler: Handler<M>,
}

impl<M: Clone> BoundControl<M> {
    /// Message for a button or timer press; `None` for selectors
    pub fn activate(&self) -> Option<M> {
        match &self.handler {
            Handler::Activate(message) => Some(message.clone()),
            Handler::Select(_) => None,
        }
    }
}

/// Validated window layout ready to render
#[derive(Debug, Clone)]
pub struct BoundUi<M> {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub background: [f32; 3],
    controls: Vec<BoundControl<M>>,
}

impl<M> BoundUi<M> {
    /// Controls in declaration order
    pub fn controls(&self) -> &[BoundControl<M>] {
        &self.controls
    }

    pub fn control(&self, control: Control) -> Option<&BoundControl<M>> {
        self.controls.iter().find(|c| c.control == control)
    }
}

/// Check `description` and resolve every control's signal in `table`
pub fn bind<M: Clone>(
    description: &UiDescription,
    table: &HandlerTable<M>,
) -> Result<BoundUi<M>, UiError> {
    if description.window.id != resources::MAIN_WINDOW {
        return Err(UiError::UnexpectedWindow(description.window.id.clone()));
    }
    if description.video_surface.id != resources::VIDEO_SURFACE {
        return Err(UiError::UnexpectedSurface(
            description.video_surface.id.clone(),
        ));
    }

    let mut controls: Vec<BoundControl<M>> = Vec::with_capacity(description.controls.len());

    for spec in &description.controls {
        let control = Control::from_widget_id(&spec.id)
            .ok_or_else(|| UiError::UnknownControl(spec.id.clone()))?;

        if controls.iter().any(|c| c.control == control) {
            return Err(UiError::DuplicateControl(spec.id.clone()));
        }

        let handler = table
            .get(&spec.signal)
            .ok_or_else(|| UiError::UnknownHandler {
                control: spec.id.clone(),
                signal: spec.signal.clone(),
            })?
            .clone();

        let fits = matches!(
            (spec.kind, &handler),
            (ControlKind::Combo, Handler::Select(_))
                | (ControlKind::Button | ControlKind::Timer, Handler::Activate(_))
        );
        if !fits {
            return Err(UiError::HandlerKind {
                control: spec.id.clone(),
                signal: spec.signal.clone(),
            });
        }

        if spec.kind == ControlKind::Combo && spec.options.is_empty() {
            return Err(UiError::EmptyOptions(spec.id.clone()));
        }

        debug!(control = %control, signal = %spec.signal, "Bound control");
        controls.push(BoundControl {
            control,
            kind: spec.kind,
            label: spec.label.clone(),
            icon: spec.icon.clone(),
            options: spec.options.clone(),
            handler,
        });
    }

    if let Some(missing) = Control::ALL
        .into_iter()
        .find(|control| !controls.iter().any(|c| c.control == *control))
    {
        return Err(UiError::MissingControl(missing.widget_id()));
    }

    Ok(BoundUi {
        title: description.window.title.clone(),
        width: description.window.width,
        height: description.window.height,
        background: description.video_surface.background,
        controls,
    })
}
