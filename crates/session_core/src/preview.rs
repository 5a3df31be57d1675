use image::GenericImageView;

use crate::state::{ImageOrigin, PreviewImage};

pub const DEFAULT_PREVIEW_SCALE: f32 = 3.0;

pub fn decode_preview(
    origin: ImageOrigin,
    bytes: &[u8],
    max_dimension: u32,
) -> Result<PreviewImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = decoded.dimensions();
    let max_dimension = max_dimension.max(1);
    let bounded = if width > max_dimension || height > max_dimension {
        decoded.thumbnail(max_dimension, max_dimension)
    } else {
        decoded
    };
    let rgba = bounded.to_rgba8();
    Ok(PreviewImage {
        origin,
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    })
}

/// On-screen size of the preview: `factor` times the label size, fitted
/// around the image's aspect ratio. Scales up as well as down.
pub fn scaled_preview_size(image: [usize; 2], label: [f32; 2], factor: f32) -> [f32; 2] {
    let [width, height] = image;
    let bounds = [label[0] * factor, label[1] * factor];
    if width == 0 || height == 0 || !(bounds[0] > 0.0 && bounds[1] > 0.0) {
        return [0.0, 0.0];
    }
    let (width, height) = (width as f32, height as f32);
    let scale = (bounds[0] / width).min(bounds[1] / height);
    [width * scale, height * scale]
}
