//! UI layer for the desktop window.

pub mod app;

pub use app::{LatexSnapApp, WINDOW_TITLE};
