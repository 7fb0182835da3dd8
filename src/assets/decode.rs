use std::sync::Arc;

use crate::{
    assets::source::ImageSource,
    foundation::error::{OverlayError, OverlayResult},
};

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> OverlayResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| OverlayError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(OverlayError::decode("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Largest width or height the CPU surface can sample from.
pub const MAX_IMAGE_SIDE: u32 = u16::MAX as u32;

/// Load and decode an [`ImageSource`], tagging failures with the source name.
///
/// The header is probed first so images too large to draw are rejected before their pixels are
/// decoded.
pub fn decode_source(source: &ImageSource) -> OverlayResult<PreparedImage> {
    let bytes = source.load_bytes()?;
    let (width, height) = source.probe_loaded(&bytes)?;
    if width > MAX_IMAGE_SIDE || height > MAX_IMAGE_SIDE {
        return Err(OverlayError::decode(format!(
            "'{}': {width}x{height} exceeds the {MAX_IMAGE_SIDE}px limit",
            source.name()
        )));
    }

    decode_image(&bytes).map_err(|e| match e {
        OverlayError::Decode(msg) => OverlayError::decode(format!("'{}': {msg}", source.name())),
        other => other,
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
