//! Per-consumer animation cursor over one image resource.

use crate::foundation::core::{Blit, DELAY_FOREVER, Rgba8};
use crate::foundation::error::{ImresError, ImresResult};
use crate::foundation::stats;
use crate::pixels::convert::{DstPixels, SrcPixels, blit_pixels, clip_blit};
use crate::pixels::surface::Surface;
use crate::render::scratch::ScratchPool;
use crate::render::texture::{TEXTURE_CONFIG, TextureUpload};
use crate::resource::image::{ImageResource, ResourceHandle, ResourceKind};

/// Frame currently shown by an animated renderer.
pub(crate) struct AnimCursor {
    index: usize,
    shown: bool,
    frame: Vec<u8>,
}

impl AnimCursor {
    /// Copy frame `index` out of the decoded data.
    fn show(&mut self, handle: &ResourceHandle, index: usize) {
        self.index = index;
        match handle.frame_pixels(index) {
            Some(px) if px.len() == self.frame.len() => {
                self.frame.copy_from_slice(px);
                self.shown = true;
            }
            _ => {
                tracing::warn!(index, "frame not available; renderer shows nothing");
                self.shown = false;
            }
        }
    }
}

/// Per-renderer state. Dropped on recycle.
pub(crate) enum RendererState {
    Static,
    Animated(AnimCursor),
}

impl RendererState {
    pub(crate) fn new(
        kind: ResourceKind,
        handle: &ResourceHandle,
        width: u32,
        height: u32,
    ) -> Self {
        match kind {
            ResourceKind::Static => Self::Static,
            ResourceKind::Animated => {
                let mut cursor = AnimCursor {
                    index: 0,
                    shown: false,
                    frame: vec![0; width as usize * height as usize * 4],
                };
                cursor.show(handle, 0);
                Self::Animated(cursor)
            }
        }
    }
}

fn recycled(op: &str) -> ImresError {
    ImresError::misuse(format!("{op} on a recycled frame renderer"))
}

/// Paints one resource's current frame and steps its animation.
///
/// Holds one reference on the resource from creation until [`recycle`](Self::recycle) (or drop).
/// For static resources `advance` and `reset` do nothing and never fail.
pub struct FrameRenderer {
    resource: ImageResource,
    state: Option<RendererState>,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("kind", &self.resource.kind())
            .field("frame", &self.current_frame_index().ok())
            .field("recycled", &self.is_recycled())
            .finish()
    }
}

impl FrameRenderer {
    pub(crate) fn new(resource: ImageResource, state: RendererState) -> Self {
        stats::frame_renderer_created();
        Self {
            resource,
            state: Some(state),
        }
    }

    /// The resource this renderer is bound to.
    pub fn resource(&self) -> &ImageResource {
        &self.resource
    }

    /// True after [`recycle`](Self::recycle).
    pub fn is_recycled(&self) -> bool {
        self.state.is_none()
    }

    fn with_source<R>(
        &self,
        op: &str,
        f: impl FnOnce(SrcPixels<'_>) -> ImresResult<R>,
    ) -> ImresResult<R> {
        let (width, height) = (self.resource.width(), self.resource.height());
        match self.state.as_ref().ok_or_else(|| recycled(op))? {
            RendererState::Static => self.resource.with_handle(op, |handle| {
                let data = handle
                    .frame_pixels(0)
                    .ok_or_else(|| ImresError::decode("static resource holds no pixels"))?;
                f(SrcPixels {
                    data,
                    width,
                    height,
                })
            }),
            RendererState::Animated(cursor) => f(SrcPixels {
                data: &cursor.frame,
                width,
                height,
            }),
        }
    }

    /// Paint the current frame into `surface`.
    ///
    /// With `fill`, destination pixels the copy does not cover are painted with that color.
    pub fn render(
        &mut self,
        surface: &mut Surface,
        blit: Blit,
        fill: Option<Rgba8>,
    ) -> ImresResult<()> {
        blit.validate()?;
        self.with_source("render", |src| {
            blit_pixels(surface.as_dst(), src, blit, fill);
            Ok(())
        })
    }

    /// Paint the current frame into a texture through `pool`'s scratch buffer.
    ///
    /// The pool must hold at least `tex_w * tex_h` pixels. With `init` the whole texture is
    /// (re)defined and uncovered pixels are transparent; otherwise only the covered region is
    /// uploaded.
    pub fn render_to_texture(
        &mut self,
        pool: &ScratchPool,
        target: &mut dyn TextureUpload,
        init: bool,
        tex_w: u32,
        tex_h: u32,
        blit: Blit,
    ) -> ImresResult<()> {
        blit.validate()?;
        let required = (tex_w as usize)
            .checked_mul(tex_h as usize)
            .ok_or_else(|| ImresError::invalid_argument("texture size overflows usize"))?;
        self.with_source("render_to_texture", |src| {
            pool.with_buffer(required, |buf| {
                upload(target, &mut buf[..required * 4], src, init, (tex_w, tex_h), blit)
            })?
        })
    }

    /// Step to the next frame, wrapping after the last one.
    pub fn advance(&mut self) -> ImresResult<()> {
        if self.resource.kind() == ResourceKind::Static {
            return Ok(());
        }
        let Some(RendererState::Animated(cursor)) = self.state.as_mut() else {
            return Err(recycled("advance"));
        };
        let count = self.resource.frame_count()?;
        let next = (cursor.index + 1) % count.max(1);
        self.resource.with_handle("advance", |handle| {
            cursor.show(handle, next);
            Ok(())
        })
    }

    /// Go back to frame 0.
    pub fn reset(&mut self) -> ImresResult<()> {
        if self.resource.kind() == ResourceKind::Static {
            return Ok(());
        }
        let Some(RendererState::Animated(cursor)) = self.state.as_mut() else {
            return Err(recycled("reset"));
        };
        self.resource.with_handle("reset", |handle| {
            cursor.show(handle, 0);
            Ok(())
        })
    }

    /// Index of the frame being shown. Always 0 for static resources.
    pub fn current_frame_index(&self) -> ImresResult<usize> {
        match self.state.as_ref().ok_or_else(|| recycled("current_frame_index"))? {
            RendererState::Static => Ok(0),
            RendererState::Animated(cursor) => Ok(cursor.index),
        }
    }

    /// Delay of the shown frame in milliseconds; [`DELAY_FOREVER`] for static resources and 0
    /// when no frame is shown.
    pub fn current_delay(&self) -> ImresResult<u32> {
        match self.state.as_ref().ok_or_else(|| recycled("current_delay"))? {
            RendererState::Static => Ok(DELAY_FOREVER),
            RendererState::Animated(cursor) if !cursor.shown => Ok(0),
            RendererState::Animated(cursor) => self.resource.delay(cursor.index),
        }
    }

    /// Drop the per-renderer state and give the reference back. A second call does nothing.
    pub fn recycle(&mut self) -> ImresResult<()> {
        if self.state.take().is_none() {
            return Ok(());
        }
        stats::frame_renderer_recycled();
        self.resource.remove_reference()
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        if let Err(err) = self.recycle() {
            tracing::error!(%err, "frame renderer recycle on drop failed");
        }
    }
}

fn upload(
    target: &mut dyn TextureUpload,
    buf: &mut [u8],
    src: SrcPixels<'_>,
    init: bool,
    (tex_w, tex_h): (u32, u32),
    blit: Blit,
) -> ImresResult<()> {
    if init {
        let dst = DstPixels {
            data: &mut *buf,
            width: tex_w,
            height: tex_h,
            config: TEXTURE_CONFIG,
        };
        blit_pixels(dst, src, blit, Some(Rgba8::TRANSPARENT));
        return target.tex_image_2d(tex_w, tex_h, buf);
    }

    let Some(c) = clip_blit(blit, src.width, src.height, tex_w, tex_h) else {
        return Ok(());
    };
    let (w, h) = (c.out_w as u32, c.out_h as u32);
    let len = c.out_w * c.out_h * 4;
    let region = Blit {
        dst_x: 0,
        dst_y: 0,
        src_x: c.src_x as i32,
        src_y: c.src_y as i32,
        width: (c.out_w * c.ratio) as i32,
        height: (c.out_h * c.ratio) as i32,
        ratio: c.ratio as u32,
    };
    let dst = DstPixels {
        data: &mut buf[..len],
        width: w,
        height: h,
        config: TEXTURE_CONFIG,
    };
    blit_pixels(dst, src, region, None);
    target.tex_sub_image_2d(c.dst_x as u32, c.dst_y as u32, w, h, &buf[..len])
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
