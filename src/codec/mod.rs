//! Built-in codecs and the seams the resource layer consumes.
//!
//! A codec turns encoded bytes into either a [`StillPixels`] image or a boxed [`FrameSource`].
//! Everything above this module only sees those two shapes.

pub(crate) mod animated;
pub(crate) mod registry;
pub(crate) mod still;

use crate::foundation::core::ImageFormat;
use crate::foundation::error::ImresResult;

/// Frame provider behind an animated image resource.
///
/// Frames are full-canvas, tightly packed RGBA8888 buffers of `width * height * 4` bytes.
/// A source may start partially decoded (only a prefix of its frames available) and becomes
/// complete after [`FrameSource::complete`] succeeds. Implementations are driven under the owning
/// resource's lock, so they never see concurrent calls.
pub trait FrameSource: Send {
    /// Canvas size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// True once every frame has been produced.
    fn is_completed(&self) -> bool;

    /// Produce every remaining frame. Calling it on a completed source does nothing.
    fn complete(&mut self) -> ImresResult<()>;

    /// Frames available right now.
    fn frame_count(&self) -> usize;

    /// Raw delay of frame `index` in milliseconds.
    fn delay_ms(&self, index: usize) -> Option<u32>;

    /// Bytes held by the decoded frames.
    fn byte_count(&self) -> usize;

    /// RGBA8888 pixels of frame `index`, if it has been produced.
    fn frame(&self, index: usize) -> Option<&[u8]>;
}

/// Fully decoded single-frame RGBA8888 image.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct StillPixels {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

impl std::fmt::Debug for StillPixels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StillPixels")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba_len", &self.rgba.len())
            .finish()
    }
}

impl From<image::RgbaImage> for StillPixels {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba: img.into_raw(),
        }
    }
}

/// Codec output, before it is wrapped into a resource.
pub(crate) enum Decoded {
    Still {
        pixels: StillPixels,
        opaque: bool,
    },
    Animated {
        source: Box<dyn FrameSource>,
        opaque: bool,
    },
}

/// Metadata probe result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container format.
    pub format: ImageFormat,
    /// True when no pixel can be translucent.
    pub opaque: bool,
    /// Frame count, `None` when it cannot be known without decoding every frame.
    pub frame_count: Option<u32>,
}
