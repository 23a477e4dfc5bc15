// SPDX-License-Identifier: GPL-3.0-only

//! Window description loading and handler binding

mod builder;
mod description;

pub use builder::{BoundControl, BoundUi, Handler, HandlerTable, bind};
pub use description::{ControlKind, ControlSpec, SurfaceSpec, UiDescription, WindowSpec};
