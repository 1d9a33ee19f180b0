use crate::foundation::core::Rgba8;
use crate::foundation::error::{ImresError, ImresResult};

/// Pixel layout of a [`Surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelConfig {
    /// 32-bit straight RGBA, 4 bytes per pixel.
    Rgba8888,
    /// 16-bit RGB565, little-endian, 2 bytes per pixel.
    Rgb565,
}

impl PixelConfig {
    /// Bytes used by one pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8888 => 4,
            Self::Rgb565 => 2,
        }
    }
}

/// Requested output layout for decode entry points that allocate a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelRequest {
    /// RGB565 for opaque images, RGBA8888 otherwise.
    #[default]
    Auto,
    /// Always RGB565.
    Rgb565,
    /// Always RGBA8888.
    Rgba8888,
}

impl PixelRequest {
    /// Resolve to a concrete layout for an image with the given opacity.
    pub fn resolve(self, opaque: bool) -> PixelConfig {
        match self {
            Self::Auto if opaque => PixelConfig::Rgb565,
            Self::Auto => PixelConfig::Rgba8888,
            Self::Rgb565 => PixelConfig::Rgb565,
            Self::Rgba8888 => PixelConfig::Rgba8888,
        }
    }
}

/// Caller-owned pixel storage that renderers paint into.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    config: PixelConfig,
    data: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("config", &self.config)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl Surface {
    /// Allocate a zeroed surface, failing recoverably when the allocation cannot be satisfied.
    pub fn try_new(width: u32, height: u32, config: PixelConfig) -> ImresResult<Self> {
        let len = byte_len(width, height, config).ok_or_else(|| {
            ImresError::invalid_argument(format!("surface {width}x{height} overflows usize"))
        })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            ImresError::Other(anyhow::Error::new(e).context(format!(
                "allocate {len} bytes for {width}x{height} {config:?} surface"
            )))
        })?;
        data.resize(len, 0);

        Ok(Self {
            width,
            height,
            config,
            data,
        })
    }

    /// Allocate a zeroed surface; `None` (with an error record) when allocation fails.
    pub fn new(width: u32, height: u32, config: PixelConfig) -> Option<Self> {
        match Self::try_new(width, height, config) {
            Ok(s) => Some(s),
            Err(err) => {
                tracing::error!(width, height, ?config, %err, "surface allocation failed");
                None
            }
        }
    }

    /// Wrap tightly packed RGBA8888 bytes. `None` when the length does not match.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let len = byte_len(width, height, PixelConfig::Rgba8888)?;
        (data.len() == len).then_some(Self {
            width,
            height,
            config: PixelConfig::Rgba8888,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout.
    pub fn config(&self) -> PixelConfig {
        self.config
    }

    /// Raw pixel bytes, row-major and tightly packed.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn as_dst(&mut self) -> super::convert::DstPixels<'_> {
        super::convert::DstPixels {
            width: self.width,
            height: self.height,
            config: self.config,
            data: &mut self.data,
        }
    }

    /// Fill every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8) {
        super::convert::fill_pixels(&mut self.data, self.config, color);
    }

    /// Read one pixel as RGBA; RGB565 pixels expand to opaque RGBA.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.config.bytes_per_pixel();
        let idx = (y as usize * self.width as usize + x as usize) * bpp;
        let px = &self.data[idx..idx + bpp];
        Some(match self.config {
            PixelConfig::Rgba8888 => Rgba8::new(px[0], px[1], px[2], px[3]),
            PixelConfig::Rgb565 => rgb565_to_rgba(u16::from_le_bytes([px[0], px[1]])),
        })
    }

    /// Copy out as tightly packed RGBA8888 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match self.config {
            PixelConfig::Rgba8888 => self.data.clone(),
            PixelConfig::Rgb565 => self
                .data
                .chunks_exact(2)
                .flat_map(|px| rgb565_to_rgba(u16::from_le_bytes([px[0], px[1]])).to_array())
                .collect(),
        }
    }
}

fn byte_len(width: u32, height: u32, config: PixelConfig) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(config.bytes_per_pixel())
}

fn rgb565_to_rgba(v: u16) -> Rgba8 {
    let r = ((v >> 11) & 0x1f) as u8;
    let g = ((v >> 5) & 0x3f) as u8;
    let b = (v & 0x1f) as u8;
    Rgba8::new(
        (r << 3) | (r >> 2),
        (g << 2) | (g >> 4),
        (b << 3) | (b >> 2),
        0xff,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/surface.rs"]
mod tests;
