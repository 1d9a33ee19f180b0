use anyhow::Context as _;

use crate::codec::StillPixels;
use crate::foundation::error::ImresResult;

/// Size and opacity as reported by a decoder header, without decoding pixels.
pub(crate) fn probe(decoder: &impl image::ImageDecoder) -> (u32, u32, bool) {
    let (width, height) = decoder.dimensions();
    (width, height, !decoder.color_type().has_alpha())
}

/// Decode a single-frame image to straight RGBA8888.
pub(crate) fn decode_rgba(
    bytes: &[u8],
    format: image::ImageFormat,
) -> ImresResult<(StillPixels, bool)> {
    let img = image::load_from_memory_with_format(bytes, format)
        .with_context(|| format!("decode {format:?} image from memory"))?;
    let opaque = !img.color().has_alpha();
    Ok((StillPixels::from(img.into_rgba8()), opaque))
}
