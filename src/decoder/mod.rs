//! Public decode entry points.
//!
//! Every function here is recoverable: bad input, unknown formats, and allocation failures are
//! logged and reported as `None`.

pub(crate) mod region;

use crate::codec::registry::detect;
use crate::codec::{ImageInfo, StillPixels};
use crate::foundation::core::{Blit, ImageFormat};
use crate::pixels::convert::{SrcPixels, blit_pixels};
use crate::pixels::surface::{PixelConfig, PixelRequest, Surface};
use crate::resource::image::ImageResource;

/// Options for [`decode_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOpts {
    /// Stop after the first frame of animated formats; call
    /// [`ImageResource::complete`] later to decode the rest.
    pub partial: bool,
    /// Release the decoded data when the last reference is removed.
    pub automatic_disposal: bool,
    /// Apply the display-compat delay rule to animated resources.
    pub display_compat: bool,
}

impl Default for DecodeOpts {
    fn default() -> Self {
        Self {
            partial: false,
            automatic_disposal: true,
            display_compat: false,
        }
    }
}

/// Decode `bytes` into a resource with default options.
pub fn decode(bytes: &[u8], partial: bool) -> Option<ImageResource> {
    decode_with(
        bytes,
        &DecodeOpts {
            partial,
            ..DecodeOpts::default()
        },
    )
}

/// Decode `bytes` into a resource.
#[tracing::instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn decode_with(bytes: &[u8], opts: &DecodeOpts) -> Option<ImageResource> {
    let codec = detect(bytes)?;
    match codec.decode(bytes, opts.partial) {
        Ok(decoded) => Some(ImageResource::from_decoded(codec.format(), decoded, opts)),
        Err(err) => {
            tracing::error!(format = %codec.format(), %err, "decode failed");
            None
        }
    }
}

/// Read size, format, opacity, and (when cheap) frame count without keeping anything.
pub fn decode_info(bytes: &[u8]) -> Option<ImageInfo> {
    let codec = detect(bytes)?;
    codec
        .decode_info(bytes)
        .inspect_err(|err| tracing::error!(format = %codec.format(), %err, "info probe failed"))
        .ok()
}

/// Wrap an already decoded surface as a static resource of format [`ImageFormat::Plain`].
///
/// The pixels are copied; RGB565 surfaces are expanded to RGBA8888.
pub fn create_from_surface(surface: &Surface) -> Option<ImageResource> {
    let pixels = StillPixels {
        width: surface.width(),
        height: surface.height(),
        rgba: surface.to_rgba8(),
    };
    Some(ImageResource::from_still(
        ImageFormat::Plain,
        pixels,
        false,
        &DecodeOpts::default(),
    ))
}

/// Decode the first frame straight into a new surface, downscaled by `ratio`.
///
/// `ratio` below 1 is treated as 1 and is capped so the output keeps at least one pixel.
pub fn decode_surface(bytes: &[u8], request: PixelRequest, ratio: u32) -> Option<Surface> {
    let codec = detect(bytes)?;
    let (pixels, opaque) = codec
        .decode_pixels(bytes)
        .inspect_err(|err| tracing::error!(format = %codec.format(), %err, "decode failed"))
        .ok()?;
    let src = SrcPixels {
        data: &pixels.rgba,
        width: pixels.width,
        height: pixels.height,
    };
    downscale_into_new(src, Blit::full(pixels.width, pixels.height), request.resolve(opaque), ratio)
}

/// Allocate a surface for `blit`'s region at `ratio` and copy into it.
pub(crate) fn downscale_into_new(
    src: SrcPixels<'_>,
    region: Blit,
    config: PixelConfig,
    ratio: u32,
) -> Option<Surface> {
    let (w, h) = (region.width.max(0) as u32, region.height.max(0) as u32);
    let ratio = ratio.clamp(1, w.min(h).max(1));
    let mut surface = Surface::new(w / ratio, h / ratio, config)?;
    blit_pixels(
        surface.as_dst(),
        src,
        Blit {
            dst_x: 0,
            dst_y: 0,
            ratio,
            ..region
        },
        None,
    );
    Some(surface)
}

#[cfg(test)]
#[path = "../../tests/unit/decoder/decode.rs"]
mod tests;
