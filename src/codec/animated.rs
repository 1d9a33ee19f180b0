use std::io::Cursor;

use anyhow::Context as _;
use image::AnimationDecoder as _;

use crate::codec::FrameSource;
use crate::foundation::error::{ImresError, ImresResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AnimationKind {
    Gif,
    Apng,
}

struct DecodedFrame {
    rgba: Vec<u8>,
    delay_ms: u32,
}

/// GIF / APNG frames decoded with `image`'s animation decoders.
///
/// A partial decode keeps a copy of the encoded stream and only the first frame; `complete`
/// re-reads the stream and replaces the frame list.
pub(crate) struct AnimatedFrames {
    kind: AnimationKind,
    width: u32,
    height: u32,
    opaque: bool,
    encoded: Option<Vec<u8>>,
    frames: Vec<DecodedFrame>,
}

impl AnimatedFrames {
    pub(crate) fn decode(kind: AnimationKind, bytes: &[u8], partial: bool) -> ImresResult<Self> {
        let (width, height, header_opaque) = canvas_header(kind, bytes)?;
        let limit = if partial { 1 } else { usize::MAX };
        let frames = decode_frames(kind, bytes, width, height, limit)?;
        // GIF headers always report RGBA; the first composited frame decides.
        let opaque = match kind {
            AnimationKind::Apng => header_opaque,
            AnimationKind::Gif => frames[0].rgba.chunks_exact(4).all(|px| px[3] == u8::MAX),
        };
        tracing::debug!(
            ?kind,
            width,
            height,
            opaque,
            frames = frames.len(),
            partial,
            "animation decoded"
        );
        Ok(Self {
            kind,
            width,
            height,
            opaque,
            encoded: partial.then(|| bytes.to_vec()),
            frames,
        })
    }

    /// True when the canvas can never show a translucent pixel.
    pub(crate) fn is_opaque(&self) -> bool {
        self.opaque
    }
}

impl FrameSource for AnimatedFrames {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_completed(&self) -> bool {
        self.encoded.is_none()
    }

    fn complete(&mut self) -> ImresResult<()> {
        let Some(bytes) = self.encoded.as_deref() else {
            return Ok(());
        };
        let frames = decode_frames(self.kind, bytes, self.width, self.height, usize::MAX)?;
        self.frames = frames;
        self.encoded = None;
        Ok(())
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn delay_ms(&self, index: usize) -> Option<u32> {
        self.frames.get(index).map(|f| f.delay_ms)
    }

    fn byte_count(&self) -> usize {
        self.frames.iter().map(|f| f.rgba.len()).sum()
    }

    fn frame(&self, index: usize) -> Option<&[u8]> {
        self.frames.get(index).map(|f| f.rgba.as_slice())
    }
}

fn canvas_header(kind: AnimationKind, bytes: &[u8]) -> ImresResult<(u32, u32, bool)> {
    let header = match kind {
        AnimationKind::Gif => super::still::probe(
            &image::codecs::gif::GifDecoder::new(Cursor::new(bytes)).context("open gif stream")?,
        ),
        AnimationKind::Apng => super::still::probe(
            &image::codecs::png::PngDecoder::new(Cursor::new(bytes)).context("open png stream")?,
        ),
    };
    Ok(header)
}

fn frames_of(kind: AnimationKind, bytes: &[u8]) -> ImresResult<image::Frames<'_>> {
    let cursor = Cursor::new(bytes);
    let frames = match kind {
        AnimationKind::Gif => image::codecs::gif::GifDecoder::new(cursor)
            .context("open gif stream")?
            .into_frames(),
        AnimationKind::Apng => image::codecs::png::PngDecoder::new(cursor)
            .context("open png stream")?
            .apng()
            .context("open apng stream")?
            .into_frames(),
    };
    Ok(frames)
}

/// Decode up to `limit` frames. A failure after the first frame ends the stream early instead of
/// failing the whole decode.
fn decode_frames(
    kind: AnimationKind,
    bytes: &[u8],
    width: u32,
    height: u32,
    limit: usize,
) -> ImresResult<Vec<DecodedFrame>> {
    let mut out = Vec::new();
    for frame in frames_of(kind, bytes)?.take(limit) {
        match frame {
            Ok(frame) => out.push(to_canvas(frame, width, height)),
            Err(err) if !out.is_empty() => {
                tracing::warn!(?kind, decoded = out.len(), %err, "animation stream truncated");
                break;
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("decode first {kind:?} frame"))
                    .into());
            }
        }
    }
    if out.is_empty() {
        return Err(ImresError::decode(format!("{kind:?} stream has no frames")));
    }
    Ok(out)
}

fn to_canvas(frame: image::Frame, width: u32, height: u32) -> DecodedFrame {
    let (numer, denom) = frame.delay().numer_denom_ms();
    let delay_ms = numer.checked_div(denom).unwrap_or(0);
    let (left, top) = (frame.left(), frame.top());
    let buf = frame.into_buffer();

    if buf.dimensions() == (width, height) && left == 0 && top == 0 {
        return DecodedFrame {
            rgba: buf.into_raw(),
            delay_ms,
        };
    }

    // Frame smaller than the canvas or offset into it.
    let mut rgba = vec![0u8; width as usize * height as usize * 4];
    let (bw, bh) = buf.dimensions();
    let copy_w = bw.min(width.saturating_sub(left)) as usize;
    for y in 0..bh.min(height.saturating_sub(top)) {
        let src = (y as usize * bw as usize) * 4;
        let dst = ((top + y) as usize * width as usize + left as usize) * 4;
        rgba[dst..dst + copy_w * 4].copy_from_slice(&buf.as_raw()[src..src + copy_w * 4]);
    }
    DecodedFrame { rgba, delay_ms }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/animated.rs"]
mod tests;
