//! Disk staging for clipboard images.

use std::{
    fs,
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

use shared::{domain::ClipboardImage, error::SessionError};
use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = "latex-snap-";

/// PNG file in a temp directory, deleted when dropped unless [`TempImage::keep`]
/// is called.
#[derive(Debug)]
pub struct TempImage {
    file: NamedTempFile,
}

impl TempImage {
    pub fn write_png(dir: &Path, png: &[u8]) -> Result<Self, SessionError> {
        fs::create_dir_all(dir).map_err(SessionError::TempFile)?;
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".png")
            .tempfile_in(dir)
            .map_err(SessionError::TempFile)?;
        file.write_all(png).map_err(SessionError::TempFile)?;
        file.flush().map_err(SessionError::TempFile)?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Persists the file and returns its path.
    pub fn keep(self) -> Result<PathBuf, SessionError> {
        let (_, path) = self
            .file
            .keep()
            .map_err(|err| SessionError::TempFile(err.error))?;
        Ok(path)
    }
}

pub fn encode_rgba_png(image: &ClipboardImage) -> Result<Vec<u8>, SessionError> {
    if !image.is_well_formed() {
        return Err(SessionError::ImageEncode(format!(
            "invalid RGBA buffer: {}x{} with {} bytes",
            image.width,
            image.height,
            image.rgba.len()
        )));
    }
    let width = u32::try_from(image.width)
        .map_err(|_| SessionError::ImageEncode("image too wide".to_string()))?;
    let height = u32::try_from(image.height)
        .map_err(|_| SessionError::ImageEncode("image too tall".to_string()))?;
    let buffer = image::RgbaImage::from_raw(width, height, image.rgba.clone())
        .ok_or_else(|| SessionError::ImageEncode("invalid RGBA buffer".to_string()))?;
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(buffer)
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|err| SessionError::ImageEncode(err.to_string()))?;
    Ok(out.into_inner())
}
