//! Headless core of the image-to-LaTeX session: state, handlers and the
//! collaborators they talk to (recognition engine, clipboard, temp files).

pub mod clipboard;
pub mod config;
mod controller;
pub mod preview;
mod state;
pub mod temp_image;

pub use clipboard::{ClipboardAccess, SystemClipboard};
pub use config::{load_settings, Settings};
pub use controller::SessionController;
pub use state::{ImageOrigin, PreviewImage, SessionState, COPIED_STATUS, INITIAL_STATUS};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
