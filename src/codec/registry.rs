//! Table of built-in codecs and format sniffing.

use std::io::Cursor;

use anyhow::Context as _;

use crate::codec::animated::{AnimatedFrames, AnimationKind};
use crate::codec::still::{decode_rgba, probe};
use crate::codec::{Decoded, ImageInfo, StillPixels};
use crate::foundation::core::ImageFormat;
use crate::foundation::error::ImresResult;

/// One container format the crate can decode.
pub(crate) trait Codec: Send + Sync {
    fn format(&self) -> ImageFormat;

    /// Human-readable decoder name.
    fn description(&self) -> &'static str;

    /// True when `bytes` starts with this format's signature.
    fn is_magic(&self, bytes: &[u8]) -> bool;

    /// Decode into a still image or a frame source. With `partial`, animated formats may stop
    /// after the first frame.
    fn decode(&self, bytes: &[u8], partial: bool) -> ImresResult<Decoded>;

    /// Header probe; no pixels are produced.
    fn decode_info(&self, bytes: &[u8]) -> ImresResult<ImageInfo>;

    /// Decode the first (or only) frame to RGBA8888 plus its opacity.
    fn decode_pixels(&self, bytes: &[u8]) -> ImresResult<(StillPixels, bool)>;
}

struct StillCodec {
    format: ImageFormat,
    image_format: image::ImageFormat,
    magic: &'static [u8],
    description: &'static str,
}

impl StillCodec {
    fn header(&self, bytes: &[u8]) -> ImresResult<(u32, u32, bool)> {
        let cursor = Cursor::new(bytes);
        let header = match self.image_format {
            image::ImageFormat::Bmp => probe(
                &image::codecs::bmp::BmpDecoder::new(cursor).context("read bmp header")?,
            ),
            _ => probe(&image::codecs::jpeg::JpegDecoder::new(cursor).context("read jpeg header")?),
        };
        Ok(header)
    }
}

impl Codec for StillCodec {
    fn format(&self) -> ImageFormat {
        self.format
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn is_magic(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(self.magic)
    }

    fn decode(&self, bytes: &[u8], _partial: bool) -> ImresResult<Decoded> {
        let (pixels, opaque) = decode_rgba(bytes, self.image_format)?;
        Ok(Decoded::Still { pixels, opaque })
    }

    fn decode_info(&self, bytes: &[u8]) -> ImresResult<ImageInfo> {
        let (width, height, opaque) = self.header(bytes)?;
        Ok(ImageInfo {
            width,
            height,
            format: self.format,
            opaque,
            frame_count: Some(1),
        })
    }

    fn decode_pixels(&self, bytes: &[u8]) -> ImresResult<(StillPixels, bool)> {
        decode_rgba(bytes, self.image_format)
    }
}

struct PngCodec;

impl PngCodec {
    fn open(bytes: &[u8]) -> ImresResult<image::codecs::png::PngDecoder<Cursor<&[u8]>>> {
        Ok(image::codecs::png::PngDecoder::new(Cursor::new(bytes)).context("read png header")?)
    }
}

impl Codec for PngCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn description(&self) -> &'static str {
        "image-rs png decoder (PNG, APNG)"
    }

    fn is_magic(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(b"\x89PNG")
    }

    fn decode(&self, bytes: &[u8], partial: bool) -> ImresResult<Decoded> {
        if Self::open(bytes)?.is_apng().context("read png animation control")? {
            let source = AnimatedFrames::decode(AnimationKind::Apng, bytes, partial)?;
            return Ok(Decoded::Animated {
                opaque: source.is_opaque(),
                source: Box::new(source),
            });
        }
        let (pixels, opaque) = decode_rgba(bytes, image::ImageFormat::Png)?;
        Ok(Decoded::Still { pixels, opaque })
    }

    fn decode_info(&self, bytes: &[u8]) -> ImresResult<ImageInfo> {
        let decoder = Self::open(bytes)?;
        let (width, height, opaque) = probe(&decoder);
        let animated = decoder.is_apng().context("read png animation control")?;
        Ok(ImageInfo {
            width,
            height,
            format: ImageFormat::Png,
            opaque: opaque && !animated,
            frame_count: (!animated).then_some(1),
        })
    }

    fn decode_pixels(&self, bytes: &[u8]) -> ImresResult<(StillPixels, bool)> {
        decode_rgba(bytes, image::ImageFormat::Png)
    }
}

struct GifCodec;

impl Codec for GifCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn description(&self) -> &'static str {
        "image-rs gif decoder"
    }

    fn is_magic(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(b"GIF8")
    }

    fn decode(&self, bytes: &[u8], partial: bool) -> ImresResult<Decoded> {
        let source = AnimatedFrames::decode(AnimationKind::Gif, bytes, partial)?;
        Ok(Decoded::Animated {
            opaque: source.is_opaque(),
            source: Box::new(source),
        })
    }

    fn decode_info(&self, bytes: &[u8]) -> ImresResult<ImageInfo> {
        let decoder =
            image::codecs::gif::GifDecoder::new(Cursor::new(bytes)).context("read gif header")?;
        let (width, height, _) = probe(&decoder);
        Ok(ImageInfo {
            width,
            height,
            format: ImageFormat::Gif,
            opaque: false,
            frame_count: None,
        })
    }

    fn decode_pixels(&self, bytes: &[u8]) -> ImresResult<(StillPixels, bool)> {
        let (pixels, _) = decode_rgba(bytes, image::ImageFormat::Gif)?;
        Ok((pixels, false))
    }
}

static BMP: StillCodec = StillCodec {
    format: ImageFormat::Bmp,
    image_format: image::ImageFormat::Bmp,
    magic: b"BM",
    description: "image-rs bmp decoder",
};

static JPEG: StillCodec = StillCodec {
    format: ImageFormat::Jpeg,
    image_format: image::ImageFormat::Jpeg,
    magic: b"\xff\xd8",
    description: "image-rs jpeg decoder (zune-jpeg)",
};

static CODECS: [&dyn Codec; 4] = [&BMP, &JPEG, &PngCodec, &GifCodec];

/// Codec whose signature matches `bytes`. Unknown input is logged with its first two bytes.
pub(crate) fn detect(bytes: &[u8]) -> Option<&'static dyn Codec> {
    let found = CODECS.iter().copied().find(|c| c.is_magic(bytes));
    if found.is_none() {
        let head = bytes.get(..2).unwrap_or(bytes);
        tracing::error!(?head, len = bytes.len(), "unrecognized image format");
    }
    found
}

pub(crate) fn codec_for(format: ImageFormat) -> Option<&'static dyn Codec> {
    CODECS.iter().copied().find(|c| c.format() == format)
}

/// Formats with a registered decoder, in registry order.
pub fn supported_formats() -> Vec<ImageFormat> {
    CODECS.iter().map(|c| c.format()).collect()
}

/// Decoder name for `format`, `None` when no codec handles it.
pub fn decoder_description(format: ImageFormat) -> Option<&'static str> {
    codec_for(format).map(|c| c.description())
}

#[cfg(test)]
#[path = "../../tests/unit/codec/registry.rs"]
mod tests;
