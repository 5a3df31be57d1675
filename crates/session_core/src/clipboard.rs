use arboard::Clipboard;
use shared::{domain::ClipboardImage, error::ClipboardError};
use tracing::debug;

pub trait ClipboardAccess {
    /// `Ok(None)` when the clipboard currently holds no image.
    fn read_image(&mut self) -> Result<Option<ClipboardImage>, ClipboardError>;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

impl<T: ClipboardAccess + ?Sized> ClipboardAccess for &mut T {
    fn read_image(&mut self) -> Result<Option<ClipboardImage>, ClipboardError> {
        (**self).read_image()
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        (**self).write_text(text)
    }
}

/// Platform clipboard, opened on first use.
///
/// The handle is kept for the life of the session: on X11 the copied text
/// stays available only while its owner is alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut Clipboard, ClipboardError> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => {
                debug!("opening system clipboard");
                Clipboard::new().map_err(|err| ClipboardError::Unavailable(err.to_string()))?
            }
        };
        Ok(self.inner.insert(clipboard))
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read_image(&mut self) -> Result<Option<ClipboardImage>, ClipboardError> {
        match self.handle()?.get_image() {
            Ok(image) => Ok(Some(ClipboardImage {
                width: image.width,
                height: image.height,
                rgba: image.bytes.into_owned(),
            })),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => Err(ClipboardError::Read(err.to_string())),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.handle()?
            .set_text(text)
            .map_err(|err| ClipboardError::Write(err.to_string()))
    }
}
