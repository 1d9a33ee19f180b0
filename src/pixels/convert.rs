//! Blit RGBA8888 source pixels into a destination buffer with integer downscaling.
//!
//! Each destination pixel averages the 2x2 block at offset `(ratio - 2) / 2` inside its
//! `ratio x ratio` source cell; ratio 1 is a straight copy. Rectangles are clipped against both
//! buffers before anything is written. When `fill` is set, every destination pixel not covered by
//! the copy is painted with it (the whole destination if nothing is copyable).

use crate::foundation::core::{Blit, Rgba8};
use crate::pixels::surface::PixelConfig;

/// Read-only RGBA8888 source.
#[derive(Clone, Copy)]
pub(crate) struct SrcPixels<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Writable destination in either supported layout.
pub(crate) struct DstPixels<'a> {
    pub(crate) data: &'a mut [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) config: PixelConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClippedBlit {
    pub(crate) dst_x: usize,
    pub(crate) dst_y: usize,
    pub(crate) src_x: usize,
    pub(crate) src_y: usize,
    /// Destination pixels per row.
    pub(crate) out_w: usize,
    /// Destination rows.
    pub(crate) out_h: usize,
    pub(crate) ratio: usize,
}

fn floor_to(n: i64, multiple: i64) -> i64 {
    n - n % multiple
}

fn ceil_to(n: i64, multiple: i64) -> i64 {
    match n % multiple {
        0 => n,
        r => n - r + multiple,
    }
}

/// Clip one axis. Returns `(dst, src, len)` with `len` in source pixels.
fn clip_axis(
    mut dst: i64,
    mut src: i64,
    mut len: i64,
    src_len: i64,
    dst_len: i64,
    ratio: i64,
) -> Option<(i64, i64, i64)> {
    if src < 0 {
        let t = ceil_to(-src, ratio);
        src += t;
        dst += t / ratio;
        len -= t;
    }
    if dst < 0 {
        let t = -dst * ratio;
        src += t;
        dst = 0;
        len -= t;
    }
    if len <= 0 {
        return None;
    }

    let over = src + len - src_len;
    if over > 0 {
        len -= ceil_to(over, ratio);
    }
    let over = dst + len / ratio - dst_len;
    if over > 0 {
        len -= over * ratio;
    }
    (len > 0).then_some((dst, src, len))
}

pub(crate) fn clip_blit(
    blit: Blit,
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
) -> Option<ClippedBlit> {
    let ratio = i64::from(blit.ratio.max(1));
    let width = floor_to(i64::from(blit.width), ratio);
    let height = floor_to(i64::from(blit.height), ratio);
    if ratio > width || ratio > height {
        return None;
    }

    let (dst_x, src_x, width) = clip_axis(
        i64::from(blit.dst_x),
        i64::from(blit.src_x),
        width,
        i64::from(src_w),
        i64::from(dst_w),
        ratio,
    )?;
    let (dst_y, src_y, height) = clip_axis(
        i64::from(blit.dst_y),
        i64::from(blit.src_y),
        height,
        i64::from(src_h),
        i64::from(dst_h),
        ratio,
    )?;

    let out_w = width / ratio;
    let out_h = height / ratio;
    if out_w <= 0 || out_h <= 0 {
        return None;
    }

    Some(ClippedBlit {
        dst_x: usize::try_from(dst_x).ok()?,
        dst_y: usize::try_from(dst_y).ok()?,
        src_x: usize::try_from(src_x).ok()?,
        src_y: usize::try_from(src_y).ok()?,
        out_w: usize::try_from(out_w).ok()?,
        out_h: usize::try_from(out_h).ok()?,
        ratio: usize::try_from(ratio).ok()?,
    })
}

fn color_bytes(color: Rgba8, config: PixelConfig) -> ([u8; 4], usize) {
    match config {
        PixelConfig::Rgba8888 => (color.to_array(), 4),
        PixelConfig::Rgb565 => {
            let [a, b] = color.to_rgb565_le();
            ([a, b, 0, 0], 2)
        }
    }
}

pub(crate) fn fill_pixels(dst: &mut [u8], config: PixelConfig, color: Rgba8) {
    let (bytes, bpp) = color_bytes(color, config);
    for px in dst.chunks_exact_mut(bpp) {
        px.copy_from_slice(&bytes[..bpp]);
    }
}

fn write_pixel(out: &mut [u8], config: PixelConfig, rgba: [u8; 4]) {
    match config {
        PixelConfig::Rgba8888 => out.copy_from_slice(&rgba),
        PixelConfig::Rgb565 => {
            out.copy_from_slice(&Rgba8::new(rgba[0], rgba[1], rgba[2], rgba[3]).to_rgb565_le())
        }
    }
}

fn sample(src: SrcPixels<'_>, x: usize, y: usize) -> [u8; 4] {
    let idx = (y * src.width as usize + x) * 4;
    [
        src.data[idx],
        src.data[idx + 1],
        src.data[idx + 2],
        src.data[idx + 3],
    ]
}

fn average_2x2(src: SrcPixels<'_>, x: usize, y: usize) -> [u8; 4] {
    let quad = [
        sample(src, x, y),
        sample(src, x + 1, y),
        sample(src, x, y + 1),
        sample(src, x + 1, y + 1),
    ];
    let mut out = [0u8; 4];
    for (c, slot) in out.iter_mut().enumerate() {
        let sum: u16 = quad.iter().map(|px| u16::from(px[c])).sum();
        *slot = (sum / 4) as u8;
    }
    out
}

fn copy_row(
    dst_row: &mut [u8],
    config: PixelConfig,
    src: SrcPixels<'_>,
    c: &ClippedBlit,
    i: usize,
) {
    let bpp = config.bytes_per_pixel();
    if c.ratio == 1 {
        let y = c.src_y + i;
        for (j, out) in dst_row.chunks_exact_mut(bpp).take(c.out_w).enumerate() {
            write_pixel(out, config, sample(src, c.src_x + j, y));
        }
        return;
    }

    let skip = (c.ratio - 2) / 2;
    let y = c.src_y + i * c.ratio + skip;
    for (j, out) in dst_row.chunks_exact_mut(bpp).take(c.out_w).enumerate() {
        let x = c.src_x + j * c.ratio + skip;
        write_pixel(out, config, average_2x2(src, x, y));
    }
}

/// Copy `src` into `dst` according to `blit`. Returns `false` when nothing was copyable.
pub(crate) fn blit_pixels(
    dst: DstPixels<'_>,
    src: SrcPixels<'_>,
    blit: Blit,
    fill: Option<Rgba8>,
) -> bool {
    let DstPixels {
        data,
        width,
        height,
        config,
    } = dst;
    let bpp = config.bytes_per_pixel();
    let row_bytes = width as usize * bpp;
    let data = &mut data[..row_bytes * height as usize];

    let Some(c) = clip_blit(blit, src.width, src.height, width, height) else {
        if let Some(color) = fill {
            fill_pixels(data, config, color);
        }
        return false;
    };

    if let Some(color) = fill {
        fill_pixels(&mut data[..c.dst_y * row_bytes], config, color);
        fill_pixels(&mut data[(c.dst_y + c.out_h) * row_bytes..], config, color);
    }

    for i in 0..c.out_h {
        let row = &mut data[(c.dst_y + i) * row_bytes..(c.dst_y + i + 1) * row_bytes];
        let (lead, rest) = row.split_at_mut(c.dst_x * bpp);
        let (body, tail) = rest.split_at_mut(c.out_w * bpp);
        if let Some(color) = fill {
            fill_pixels(lead, config, color);
            fill_pixels(tail, config, color);
        }
        copy_row(body, config, src, &c, i);
    }

    true
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/convert.rs"]
mod tests;
