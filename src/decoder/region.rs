use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::codec::StillPixels;
use crate::codec::registry::detect;
use crate::decoder::downscale_into_new;
use crate::foundation::core::{Blit, ImageFormat, IntRect};
use crate::pixels::convert::SrcPixels;
use crate::pixels::surface::{PixelRequest, Surface};

/// Decodes arbitrary sub-rectangles of one image.
///
/// The image is decoded once at construction and kept until [`recycle`](Self::recycle). A private
/// lock covers the validity check, the read, and a concurrent recycle.
pub struct RegionDecoder {
    width: u32,
    height: u32,
    format: ImageFormat,
    opaque: bool,
    pixels: Mutex<Option<StillPixels>>,
}

impl std::fmt::Debug for RegionDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionDecoder")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("recycled", &self.is_recycled())
            .finish()
    }
}

impl RegionDecoder {
    /// Decode `bytes` for region access. `None` (logged) when the input cannot be decoded.
    pub fn new(bytes: &[u8]) -> Option<Self> {
        let codec = detect(bytes)?;
        let (pixels, opaque) = codec
            .decode_pixels(bytes)
            .inspect_err(|err| {
                tracing::error!(format = %codec.format(), %err, "region decoder init failed")
            })
            .ok()?;
        Some(Self {
            width: pixels.width,
            height: pixels.height,
            format: codec.format(),
            opaque,
            pixels: Mutex::new(Some(pixels)),
        })
    }

    /// Width of the full image.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the full image.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Format of the source image.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// True when the source image is opaque.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    fn lock(&self) -> MutexGuard<'_, Option<StillPixels>> {
        self.pixels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decode `rect` (the whole image for `None`) into a new surface downscaled by `ratio`.
    ///
    /// A rectangle that is empty or lies entirely outside the image is logged and yields `None`;
    /// one that overlaps partially is clipped to the image.
    pub fn decode_region(
        &self,
        rect: Option<IntRect>,
        request: PixelRequest,
        ratio: u32,
    ) -> Option<Surface> {
        let guard = self.lock();
        let Some(pixels) = guard.as_ref() else {
            tracing::error!("region decoder is recycled");
            return None;
        };

        let rect = match rect {
            None => IntRect::from_xywh(0, 0, self.width as i32, self.height as i32),
            Some(r) => match r.clip_to(self.width, self.height) {
                Some(clipped) => clipped,
                None => {
                    tracing::error!(
                        rect = ?r,
                        width = self.width,
                        height = self.height,
                        "decode rect is invalid"
                    );
                    return None;
                }
            },
        };

        let src = SrcPixels {
            data: &pixels.rgba,
            width: pixels.width,
            height: pixels.height,
        };
        let region = Blit {
            src_x: rect.left,
            src_y: rect.top,
            width: rect.width(),
            height: rect.height(),
            ..Blit::full(0, 0)
        };
        downscale_into_new(src, region, request.resolve(self.opaque), ratio)
    }

    /// Free the decoded image. Later `decode_region` calls return `None`.
    pub fn recycle(&self) {
        if self.lock().take().is_some() {
            tracing::debug!(format = %self.format, "region decoder recycled");
        }
    }

    /// True after [`recycle`](Self::recycle).
    pub fn is_recycled(&self) -> bool {
        self.lock().is_none()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decoder/region.rs"]
mod tests;
