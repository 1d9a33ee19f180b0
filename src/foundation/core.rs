use crate::foundation::error::{ImresError, ImresResult};

/// Delay reported for frames that never advance (static images).
pub const DELAY_FOREVER: u32 = u32::MAX;

/// Raw delays at or below this many milliseconds are rounded up in display-compat mode.
pub const COMPAT_MIN_DELAY_MS: u32 = 10;

/// Delay substituted for too-short raw delays in display-compat mode.
pub const COMPAT_DELAY_MS: u32 = 100;

/// Container format of an image resource.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Format could not be determined.
    Unknown,
    /// Wrapped, already decoded pixels.
    Plain,
    /// Windows bitmap.
    Bmp,
    /// JPEG.
    Jpeg,
    /// PNG, including animated PNG.
    Png,
    /// GIF, static or animated.
    Gif,
}

impl ImageFormat {
    /// Formats a codec can be registered for, in registry order.
    pub const DECODABLE: [ImageFormat; 4] = [Self::Bmp, Self::Jpeg, Self::Png, Self::Gif];

    /// Lowercase name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Plain => "plain",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply the display-compat delay rule to a raw per-frame delay in milliseconds.
pub fn compat_delay(raw_ms: u32, display_compat: bool) -> u32 {
    if display_compat && raw_ms <= COMPAT_MIN_DELAY_MS {
        COMPAT_DELAY_MS
    } else {
        raw_ms
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Build a color from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in memory order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// RGB565 encoding in little-endian byte order (alpha dropped).
    pub fn to_rgb565_le(self) -> [u8; 2] {
        let (r, g, b) = (self.r >> 3, self.g >> 2, self.b >> 3);
        [(g << 5) | b, (r << 3) | (g >> 3)]
    }
}

/// Integer rectangle with exclusive right/bottom edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntRect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl IntRect {
    /// Build a rectangle from its edges.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a rectangle from origin and size.
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Width, zero when inverted.
    pub fn width(self) -> i32 {
        (self.right - self.left).max(0)
    }

    /// Height, zero when inverted.
    pub fn height(self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Intersection with `[0, width) x [0, height)`, `None` when disjoint.
    pub fn clip_to(self, width: u32, height: u32) -> Option<Self> {
        let w = i32::try_from(width).ok()?;
        let h = i32::try_from(height).ok()?;
        let out = Self::new(
            self.left.max(0),
            self.top.max(0),
            self.right.min(w),
            self.bottom.min(h),
        );
        (!out.is_empty()).then_some(out)
    }
}

/// Source-to-destination copy parameters shared by surface and texture rendering.
///
/// `width`/`height` are measured in source pixels; the destination receives
/// `width / ratio` by `height / ratio` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blit {
    /// Destination x offset.
    pub dst_x: i32,
    /// Destination y offset.
    pub dst_y: i32,
    /// Source x offset.
    pub src_x: i32,
    /// Source y offset.
    pub src_y: i32,
    /// Source width to copy.
    pub width: i32,
    /// Source height to copy.
    pub height: i32,
    /// Integer downscale ratio, at least 1.
    pub ratio: u32,
}

impl Blit {
    /// Copy a full `width x height` image to the destination origin without scaling.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            dst_x: 0,
            dst_y: 0,
            src_x: 0,
            src_y: 0,
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            ratio: 1,
        }
    }

    /// Same blit with a different downscale ratio.
    pub fn with_ratio(self, ratio: u32) -> Self {
        Self { ratio, ..self }
    }

    /// Reject ratios below 1.
    pub fn validate(&self) -> ImresResult<()> {
        if self.ratio == 0 {
            return Err(ImresError::invalid_argument("downscale ratio must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
