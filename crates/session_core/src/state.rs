use std::path::PathBuf;

pub const INITIAL_STATUS: &str = "Select an equation image or paste an image";
pub const COPIED_STATUS: &str = "LaTeX code copied to clipboard!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    File(PathBuf),
    Clipboard,
}

/// Decoded image shown in the preview region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub origin: ImageOrigin,
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl PreviewImage {
    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }
}

/// Everything the window shows, as a plain value.
///
/// Handlers never mutate a session in place: they return the next state and
/// the caller decides whether to adopt it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Last recognized (or last copied) LaTeX.
    pub recognized: String,
    /// Text area content. Authoritative when copying.
    pub editor_text: String,
    pub preview: Option<PreviewImage>,
    pub status: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            recognized: String::new(),
            editor_text: String::new(),
            preview: None,
            status: INITIAL_STATUS.to_string(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manual edit replaces only the text area content.
    pub fn edited(&self, text: impl Into<String>) -> Self {
        Self {
            editor_text: text.into(),
            ..self.clone()
        }
    }

    pub fn is_edited(&self) -> bool {
        self.editor_text != self.recognized
    }
}
