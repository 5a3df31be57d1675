use std::{fs, path::Path};

use recognition::RecognitionEngine;
use shared::error::SessionError;
use tracing::{debug, error, info, warn};

use crate::{
    clipboard::ClipboardAccess,
    config::Settings,
    preview::decode_preview,
    state::{ImageOrigin, SessionState, COPIED_STATUS},
    temp_image::{encode_rgba_png, TempImage},
};

/// Runs the three user actions against a [`SessionState`].
///
/// Every handler runs to completion on the calling thread. On success it
/// returns the next state; `Ok(None)` means the action was a silent no-op.
pub struct SessionController<E, C> {
    engine: E,
    clipboard: C,
    settings: Settings,
}

impl<E: RecognitionEngine, C: ClipboardAccess> SessionController<E, C> {
    pub fn new(engine: E, clipboard: C, settings: Settings) -> Self {
        Self {
            engine,
            clipboard,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Recognizes the image at `path` and shows it.
    pub fn load_from_path(
        &self,
        state: &SessionState,
        path: &Path,
    ) -> Result<SessionState, SessionError> {
        let bytes = fs::read(path).map_err(|source| SessionError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            bytes = bytes.len(),
            engine = self.engine.name(),
            "recognizing image"
        );
        let recognition = self.engine.recognize(&bytes).map_err(|err| {
            error!(path = %path.display(), error = %err, "recognition failed");
            SessionError::from(err)
        })?;
        info!(
            elapsed_ms = recognition.elapsed_ms,
            chars = recognition.latex.chars().count(),
            "recognition finished"
        );

        let origin = ImageOrigin::File(path.to_path_buf());
        let preview = match decode_preview(origin, &bytes, self.settings.preview_max_dimension) {
            Ok(preview) => Some(preview),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "image recognized but not renderable");
                None
            }
        };

        Ok(SessionState {
            recognized: recognition.latex.clone(),
            editor_text: recognition.latex,
            preview,
            status: state.status.clone(),
        })
    }

    /// Stages the clipboard image as a temporary PNG and loads it.
    ///
    /// The temporary file is removed once the load finishes, whatever its
    /// outcome, unless `keep_temp_images` is set.
    pub fn load_from_clipboard(
        &mut self,
        state: &SessionState,
    ) -> Result<Option<SessionState>, SessionError> {
        let Some(image) = self.clipboard.read_image()? else {
            debug!("clipboard holds no image; paste ignored");
            return Ok(None);
        };
        debug!(width = image.width, height = image.height, "pasting clipboard image");

        let png = encode_rgba_png(&image).map_err(|err| {
            warn!(error = %err, "failed to encode clipboard image");
            err
        })?;
        let staged = TempImage::write_png(&self.settings.temp_dir(), &png).map_err(|err| {
            warn!(error = %err, "failed to save clipboard image");
            err
        })?;

        let loaded = self.load_from_path(state, staged.path());

        if self.settings.keep_temp_images {
            match staged.keep() {
                Ok(path) => info!(path = %path.display(), "kept clipboard image"),
                Err(err) => warn!(error = %err, "failed to keep clipboard image"),
            }
        }

        let mut next = loaded?;
        if let Some(preview) = next.preview.as_mut() {
            preview.origin = ImageOrigin::Clipboard;
        }
        Ok(Some(next))
    }

    /// Copies the text area content, which may differ from the last
    /// recognition if the user edited it.
    pub fn copy_current_text(
        &mut self,
        state: &SessionState,
    ) -> Result<Option<SessionState>, SessionError> {
        if state.editor_text.is_empty() {
            debug!("nothing to copy");
            return Ok(None);
        }

        self.clipboard.write_text(&state.editor_text).map_err(|err| {
            error!(error = %err, "failed to copy latex");
            SessionError::from(err)
        })?;
        info!(
            chars = state.editor_text.chars().count(),
            edited = state.is_edited(),
            "copied latex to clipboard"
        );

        Ok(Some(SessionState {
            recognized: state.editor_text.clone(),
            status: COPIED_STATUS.to_string(),
            ..state.clone()
        }))
    }
}
