use crate::foundation::core::Blit;
use crate::foundation::error::{ImresError, ImresResult};
use crate::pixels::convert::{SrcPixels, blit_pixels};
use crate::pixels::surface::{PixelConfig, Surface};

/// Texture target fed with tightly packed RGBA8888 rows.
///
/// Mirrors the two GL upload calls: a full (re)definition of the texture and an update of a
/// sub-rectangle of an existing texture.
pub trait TextureUpload {
    /// Define the whole `width x height` texture.
    fn tex_image_2d(&mut self, width: u32, height: u32, rgba: &[u8]) -> ImresResult<()>;

    /// Replace the `width x height` region at `(x, y)`.
    fn tex_sub_image_2d(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> ImresResult<()>;
}

/// A surface doubles as a CPU texture.
impl TextureUpload for Surface {
    fn tex_image_2d(&mut self, width: u32, height: u32, rgba: &[u8]) -> ImresResult<()> {
        *self = Surface::from_rgba8(width, height, rgba.to_vec()).ok_or_else(|| {
            ImresError::invalid_argument(format!(
                "{} bytes do not form a {width}x{height} texture",
                rgba.len()
            ))
        })?;
        Ok(())
    }

    fn tex_sub_image_2d(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> ImresResult<()> {
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(ImresError::invalid_argument(format!(
                "{} bytes do not form a {width}x{height} region",
                rgba.len()
            )));
        }
        if x.saturating_add(width) > self.width() || y.saturating_add(height) > self.height() {
            return Err(ImresError::invalid_argument(format!(
                "region {width}x{height} at ({x}, {y}) exceeds {}x{} texture",
                self.width(),
                self.height()
            )));
        }
        let blit = Blit {
            dst_x: x as i32,
            dst_y: y as i32,
            ..Blit::full(width, height)
        };
        let src = SrcPixels {
            data: rgba,
            width,
            height,
        };
        blit_pixels(self.as_dst(), src, blit, None);
        Ok(())
    }
}

/// Pixel layout every texture upload uses.
pub(crate) const TEXTURE_CONFIG: PixelConfig = PixelConfig::Rgba8888;

#[cfg(test)]
#[path = "../../tests/unit/render/texture.rs"]
mod tests;
