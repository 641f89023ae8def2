//! Click-and-drag port wiring between two hierarchical lists.
//!
//! The crate is split into a backend-neutral core and an optional egui
//! front-end:
//!
//! - [`matcher`] assigns dragged source ports to targets on the other list.
//! - [`controller`] is the press/drag/release state machine and the list
//!   context commands.
//! - [`render`] decides which lines, highlights and markers to paint.
//! - [`list_view`] and [`host`] are the seams to the list widget and to the
//!   application shell.
//!
//! The binary `portlink` drives the core headlessly from a JSON document.

pub mod config;
pub mod controller;
pub mod geometry;
pub mod host;
pub mod list_view;
pub mod matcher;
pub mod model;
pub mod outline;
pub mod render;
pub mod session;

// Optional GUI lives behind the `egui` feature flag and is used by the
// `portlink-editor` binary.
#[cfg(feature = "egui")]
pub mod egui_app;
