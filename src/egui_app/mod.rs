//! Egui front-end for the wiring editor (feature = "egui").
//!
//! [`WiringApp`] lays the two outline lists out side by side, forwards
//! pointer input to the [`InteractionController`](crate::controller::InteractionController)
//! and replays the renderer's [`DrawPlan`](crate::render::DrawPlan) with an
//! egui painter.

#![cfg(feature = "egui")]

mod app;
mod paint;

pub use app::{GuiHost, WiringApp};
pub use paint::{paint_plan, to_color32, to_pos2, to_rect};
