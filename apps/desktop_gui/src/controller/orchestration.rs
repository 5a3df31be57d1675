//! Routes UI actions to the session controller and applies the results.

use std::path::PathBuf;

use recognition::RecognitionEngine;
use session_core::{ClipboardAccess, SessionController, SessionState};

use crate::controller::events::{UiError, UiErrorContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    LoadImage(PathBuf),
    PasteImage,
    CopyText,
}

impl UiAction {
    pub fn name(&self) -> &'static str {
        match self {
            UiAction::LoadImage(_) => "load_image",
            UiAction::PasteImage => "paste_image",
            UiAction::CopyText => "copy_text",
        }
    }

    fn context(&self) -> UiErrorContext {
        match self {
            UiAction::LoadImage(_) => UiErrorContext::LoadImage,
            UiAction::PasteImage => UiErrorContext::PasteImage,
            UiAction::CopyText => UiErrorContext::CopyText,
        }
    }
}

#[derive(Debug)]
pub enum ActionOutcome {
    Updated { preview_changed: bool },
    Unchanged,
    Failed(UiError),
}

/// Runs `action` to completion. `state` is replaced only on success.
pub fn dispatch_action<E, C>(
    controller: &mut SessionController<E, C>,
    state: &mut SessionState,
    action: UiAction,
) -> ActionOutcome
where
    E: RecognitionEngine,
    C: ClipboardAccess,
{
    let action_name = action.name();
    let context = action.context();
    let reloads_preview = !matches!(action, UiAction::CopyText);

    let result = match action {
        UiAction::LoadImage(path) => controller.load_from_path(state, &path).map(Some),
        UiAction::PasteImage => controller.load_from_clipboard(state),
        UiAction::CopyText => controller.copy_current_text(state),
    };

    match result {
        Ok(Some(next)) => {
            *state = next;
            tracing::debug!(action = action_name, "applied session update");
            ActionOutcome::Updated {
                preview_changed: reloads_preview,
            }
        }
        Ok(None) => {
            tracing::debug!(action = action_name, "action left the session unchanged");
            ActionOutcome::Unchanged
        }
        Err(err) => {
            tracing::error!(action = action_name, error = %err, "ui action failed");
            ActionOutcome::Failed(UiError::from_session_error(context, &err))
        }
    }
}
