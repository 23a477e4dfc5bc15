// SPDX-License-Identifier: GPL-3.0-only

//! UI description loading and handler binding

use flipbuq::controller::Control;
use flipbuq::errors::UiError;
use flipbuq::ui::{ControlKind, Handler, HandlerTable, UiDescription, bind};

#[derive(Debug, Clone, PartialEq)]
enum TestMessage {
    Play,
    Stop,
    Record,
    Reset,
    Settings,
    Fps(usize),
}

fn table() -> HandlerTable<TestMessage> {
    HandlerTable::new()
        .on_activate("onPlay", TestMessage::Play)
        .on_activate("onStop", TestMessage::Stop)
        .on_activate("onRecord", TestMessage::Record)
        .on_activate("onTimeReset", TestMessage::Reset)
        .on_activate("onSettings", TestMessage::Settings)
        .on_select("onFpsSelect", TestMessage::Fps)
}

fn embedded() -> UiDescription {
    UiDescription::embedded().expect("embedded description parses")
}

#[test]
fn test_embedded_description_binds() {
    let ui = bind(&embedded(), &table()).unwrap();

    assert_eq!(ui.title, "FlipBuq");
    assert_eq!(ui.background, [0.5, 0.5, 0.5]);
    assert_eq!(ui.controls().len(), 6);
    for control in Control::ALL {
        assert!(ui.control(control).is_some(), "{} is bound", control);
    }
}

#[test]
fn test_bound_handlers_emit_messages() {
    let ui = bind(&embedded(), &table()).unwrap();

    let play = ui.control(Control::Play).unwrap();
    assert_eq!(play.activate(), Some(TestMessage::Play));

    let fps = ui.control(Control::Fps).unwrap();
    assert_eq!(fps.kind, ControlKind::Combo);
    assert!(!fps.options.is_empty());
    match fps.handler {
        Handler::Select(on_select) => assert_eq!(on_select(2), TestMessage::Fps(2)),
        Handler::Activate(_) => panic!("ComboFPS must bind a selection handler"),
    }
    assert_eq!(fps.activate(), None);

    let time = ui.control(Control::Time).unwrap();
    assert_eq!(time.kind, ControlKind::Timer);
    assert_eq!(time.activate(), Some(TestMessage::Reset));
}

#[test]
fn test_unexpected_window_id() {
    let mut description = embedded();
    description.window.id = "OtherWindow".to_string();
    assert_eq!(
        bind(&description, &table()).unwrap_err(),
        UiError::UnexpectedWindow("OtherWindow".to_string())
    );
}

#[test]
fn test_unexpected_surface_id() {
    let mut description = embedded();
    description.video_surface.id = "Canvas".to_string();
    assert_eq!(
        bind(&description, &table()).unwrap_err(),
        UiError::UnexpectedSurface("Canvas".to_string())
    );
}

#[test]
fn test_unknown_control() {
    let mut description = embedded();
    description.controls[0].id = "BtnPause".to_string();
    assert_eq!(
        bind(&description, &table()).unwrap_err(),
        UiError::UnknownControl("BtnPause".to_string())
    );
}

#[test]
fn test_duplicate_control() {
    let mut description = embedded();
    let first = description.controls[0].clone();
    description.controls.push(first);
    assert_eq!(
        bind(&description, &table()).unwrap_err(),
        UiError::DuplicateControl("BtnPlay".to_string())
    );
}

#[test]
fn test_missing_control() {
    let mut description = embedded();
    description.controls.retain(|c| c.id != "BtnSettings");
    assert_eq!(
        bind(&description, &table()).unwrap_err(),
        UiError::MissingControl("BtnSettings")
    );
}

#[test]
fn test_unknown_handler() {
    let mut description = embedded();
    description.controls[1].signal = "onPause".to_string();
    assert_eq!(
        bind(&description, &table()).unwrap_err(),
        UiError::UnknownHandler {
            control: "BtnStop".to_string(),
            signal: "onPause".to_string(),
        }
    );
}

#[test]
fn test_handler_kind_mismatch() {
    let mut description = embedded();
    let combo = description
        .controls
        .iter_mut()
        .find(|c| c.id == "ComboFPS")
        .unwrap();
    combo.signal = "onPlay".to_string();

    assert!(matches!(
        bind(&description, &table()).unwrap_err(),
        UiError::HandlerKind { .. }
    ));
}

#[test]
fn test_combo_without_options() {
    let mut description = embedded();
    description
        .controls
        .iter_mut()
        .filter(|c| c.kind == ControlKind::Combo)
        .for_each(|c| c.options.clear());

    assert_eq!(
        bind(&description, &table()).unwrap_err(),
        UiError::EmptyOptions("ComboFPS".to_string())
    );
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        UiDescription::from_json("{ \"window\": 3 }"),
        Err(UiError::Parse(_))
    ));
}

#[test]
fn test_load_from_file() {
    let dir = std::env::temp_dir().join(format!("flipbuq-ui-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("layout.json");

    let mut description = embedded();
    description.window.title = "Custom".to_string();
    std::fs::write(&path, serde_json::to_string(&description).unwrap()).unwrap();

    let loaded = UiDescription::load(Some(&path)).unwrap();
    assert_eq!(loaded.window.title, "Custom");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_missing_file() {
    let path = std::env::temp_dir().join(format!("flipbuq-missing-{}.json", uuid::Uuid::new_v4()));
    assert!(matches!(
        UiDescription::load(Some(&path)),
        Err(UiError::Io(_))
    ));
}
