//! Error modeling for failed UI actions.

use shared::error::{ClipboardError, EngineError, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    ImageFile,
    Recognition,
    Clipboard,
    Staging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    LoadImage,
    PasteImage,
    CopyText,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::ImageFile => "Image",
        UiErrorCategory::Recognition => "Recognition",
        UiErrorCategory::Clipboard => "Clipboard",
        UiErrorCategory::Staging => "Temporary file",
    }
}

pub fn context_label(context: UiErrorContext) -> &'static str {
    match context {
        UiErrorContext::LoadImage => "loading the image",
        UiErrorContext::PasteImage => "pasting the clipboard image",
        UiErrorContext::CopyText => "copying the LaTeX code",
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
    hint: Option<&'static str>,
}

impl UiError {
    pub fn from_session_error(context: UiErrorContext, err: &SessionError) -> Self {
        let (category, hint) = match err {
            SessionError::ImageRead { .. } => (UiErrorCategory::ImageFile, None),
            SessionError::Engine(EngineError::Spawn { .. }) => (
                UiErrorCategory::Recognition,
                Some("Install the recognition engine or set APP__ENGINE_COMMAND / APP__ENGINE_URL."),
            ),
            SessionError::Engine(EngineError::Http(_)) => (
                UiErrorCategory::Recognition,
                Some("Check that the recognition service is running and reachable."),
            ),
            SessionError::Engine(_) => (UiErrorCategory::Recognition, None),
            SessionError::Clipboard(ClipboardError::Unavailable(_)) => (
                UiErrorCategory::Clipboard,
                Some("No system clipboard is available in this session."),
            ),
            SessionError::Clipboard(_) => (UiErrorCategory::Clipboard, None),
            SessionError::TempFile(_) | SessionError::ImageEncode(_) => {
                (UiErrorCategory::Staging, None)
            }
        };

        Self {
            category,
            context,
            message: err.to_string(),
            hint,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> Option<&'static str> {
        self.hint
    }
}
