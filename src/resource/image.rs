//! Shared, reference-counted image resource.
//!
//! The decoded pixels (the handle) live in `Option<ResourceHandle>` behind a per-resource mutex.
//! The same mutex serializes reference counting, so the 1 -> 0 transition and the release it may
//! trigger happen exactly once. Completion data is published through a `OnceLock`; a reader that
//! sees `is_completed() == true` also sees the frame count, delays, and byte count.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::codec::{Decoded, FrameSource, StillPixels};
use crate::decoder::DecodeOpts;
use crate::foundation::core::{DELAY_FOREVER, ImageFormat, compat_delay};
use crate::foundation::error::{ImresError, ImresResult};
use crate::foundation::stats;
use crate::render::renderer::{FrameRenderer, RendererState};
use crate::resource::refcount::{RefCount, Release};

/// Exclusively owned decoded data of a resource.
pub(crate) enum ResourceHandle {
    Still(StillPixels),
    Animated(Box<dyn FrameSource>),
}

impl ResourceHandle {
    /// RGBA8888 pixels of frame `index`, if produced.
    pub(crate) fn frame_pixels(&self, index: usize) -> Option<&[u8]> {
        match self {
            Self::Still(p) => (index == 0).then_some(p.rgba.as_slice()),
            Self::Animated(source) => source.frame(index),
        }
    }
}

/// Which behavioral variant a resource is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Single frame, always completed.
    Static,
    /// Frame sequence, possibly completed later.
    Animated,
}

struct Completion {
    delays: Vec<u32>,
    byte_count: usize,
}

impl Completion {
    fn from_source(source: &dyn FrameSource) -> Self {
        let delays = (0..source.frame_count())
            .map(|i| source.delay_ms(i).unwrap_or(0))
            .collect();
        Self {
            delays,
            byte_count: source.byte_count(),
        }
    }
}

struct State {
    refs: RefCount,
    handle: Option<ResourceHandle>,
}

struct Inner {
    kind: ResourceKind,
    format: ImageFormat,
    width: u32,
    height: u32,
    opaque: bool,
    state: Mutex<State>,
    completion: OnceLock<Completion>,
    automatic_disposal: AtomicBool,
    display_compat: AtomicBool,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state.handle.take().is_some() {
            stats::image_resource_released();
            tracing::debug!(format = %self.format, "image resource dropped without recycle");
        }
    }
}

/// Decoded (or partially decoded) image shared between renderers and callers.
///
/// Clones share the same resource. The reference count is separate from the number of clones: it
/// counts logical owners (renderers plus manual [`add_reference`](Self::add_reference) calls) and
/// gates release of the decoded data.
#[derive(Clone)]
pub struct ImageResource {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ImageResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResource")
            .field("kind", &self.inner.kind)
            .field("format", &self.inner.format)
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("completed", &self.is_completed())
            .field("references", &self.reference_count())
            .field("released", &self.is_released())
            .finish()
    }
}

fn released(op: &str) -> ImresError {
    ImresError::misuse(format!("{op} on a released image resource"))
}

impl ImageResource {
    pub(crate) fn from_decoded(format: ImageFormat, decoded: Decoded, opts: &DecodeOpts) -> Self {
        match decoded {
            Decoded::Still { pixels, opaque } => Self::from_still(format, pixels, opaque, opts),
            Decoded::Animated { source, opaque } => Self::from_source(format, source, opaque, opts),
        }
    }

    pub(crate) fn from_still(
        format: ImageFormat,
        pixels: StillPixels,
        opaque: bool,
        opts: &DecodeOpts,
    ) -> Self {
        let completion = Completion {
            delays: vec![DELAY_FOREVER],
            byte_count: pixels.rgba.len(),
        };
        let (width, height) = (pixels.width, pixels.height);
        Self::build(
            ResourceKind::Static,
            format,
            (width, height),
            opaque,
            ResourceHandle::Still(pixels),
            Some(completion),
            opts,
        )
    }

    fn from_source(
        format: ImageFormat,
        source: Box<dyn FrameSource>,
        opaque: bool,
        opts: &DecodeOpts,
    ) -> Self {
        let completion = source
            .is_completed()
            .then(|| Completion::from_source(source.as_ref()));
        Self::build(
            ResourceKind::Animated,
            format,
            source.dimensions(),
            opaque,
            ResourceHandle::Animated(source),
            completion,
            opts,
        )
    }

    /// Wrap a caller-provided frame source as an animated resource (never opaque).
    ///
    /// Unless `opts.partial` is set, the source is completed before the resource is returned.
    pub fn from_frame_source(
        mut source: Box<dyn FrameSource>,
        format: ImageFormat,
        opts: &DecodeOpts,
    ) -> ImresResult<Self> {
        if !opts.partial {
            source.complete()?;
        }
        Ok(Self::from_source(format, source, false, opts))
    }

    fn build(
        kind: ResourceKind,
        format: ImageFormat,
        (width, height): (u32, u32),
        opaque: bool,
        handle: ResourceHandle,
        completion: Option<Completion>,
        opts: &DecodeOpts,
    ) -> Self {
        let cell = OnceLock::new();
        if let Some(c) = completion {
            let _ = cell.set(c);
        }
        stats::image_resource_created();
        tracing::trace!(?kind, %format, width, height, "image resource created");
        Self {
            inner: Arc::new(Inner {
                kind,
                format,
                width,
                height,
                opaque,
                state: Mutex::new(State {
                    refs: RefCount::default(),
                    handle: Some(handle),
                }),
                completion: cell,
                automatic_disposal: AtomicBool::new(opts.automatic_disposal),
                display_compat: AtomicBool::new(opts.display_compat),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_live(&self, op: &str) -> ImresResult<()> {
        if self.lock().handle.is_none() {
            return Err(released(op));
        }
        Ok(())
    }

    fn completed(&self, op: &str) -> ImresResult<&Completion> {
        self.ensure_live(op)?;
        self.inner
            .completion
            .get()
            .ok_or_else(|| ImresError::misuse(format!("{op} before the resource is completed")))
    }

    fn release_handle(&self, state: &mut State, reason: &'static str) {
        if state.handle.take().is_some() {
            stats::image_resource_released();
            tracing::debug!(format = %self.inner.format, reason, "image resource released");
        }
    }

    /// Run `f` on the decoded data while holding the resource lock.
    pub(crate) fn with_handle<R>(
        &self,
        op: &str,
        f: impl FnOnce(&mut ResourceHandle) -> ImresResult<R>,
    ) -> ImresResult<R> {
        let mut state = self.lock();
        let handle = state.handle.as_mut().ok_or_else(|| released(op))?;
        f(handle)
    }

    /// Create a renderer positioned on frame 0. Adds one reference.
    pub fn create_renderer(&self) -> ImresResult<FrameRenderer> {
        let renderer_state = {
            let mut state = self.lock();
            let handle = state
                .handle
                .as_ref()
                .ok_or_else(|| released("create_renderer"))?;
            let renderer_state =
                RendererState::new(self.inner.kind, handle, self.width(), self.height());
            state.refs.acquire();
            renderer_state
        };
        Ok(FrameRenderer::new(self.clone(), renderer_state))
    }

    /// Add one reference for an owner that holds the resource without a renderer.
    pub fn add_reference(&self) -> ImresResult<()> {
        let mut state = self.lock();
        if state.handle.is_none() {
            return Err(released("add_reference"));
        }
        state.refs.acquire();
        Ok(())
    }

    /// Drop one reference. Releases the decoded data when this was the last reference and
    /// automatic disposal is on.
    pub fn remove_reference(&self) -> ImresResult<()> {
        let mut state = self.lock();
        if state.handle.is_none() {
            return Err(released("remove_reference"));
        }
        if state.refs.release()? == Release::LastReference && self.automatic_disposal() {
            self.release_handle(&mut state, "automatic disposal");
        }
        Ok(())
    }

    /// Release the decoded data now. Fails while references remain; a no-op once released.
    pub fn recycle(&self) -> ImresResult<()> {
        let mut state = self.lock();
        if state.handle.is_none() {
            return Ok(());
        }
        let refs = state.refs.get();
        if refs > 0 {
            return Err(ImresError::misuse(format!(
                "recycle with {refs} outstanding references"
            )));
        }
        self.release_handle(&mut state, "recycle");
        Ok(())
    }

    /// True once the decoded data has been released.
    pub fn is_released(&self) -> bool {
        self.lock().handle.is_none()
    }

    /// Current number of references.
    pub fn reference_count(&self) -> usize {
        self.lock().refs.get()
    }

    /// True while at least one reference is held.
    pub fn is_referenced(&self) -> bool {
        self.reference_count() > 0
    }

    /// Enable or disable automatic disposal on the last `remove_reference`.
    pub fn set_automatic_disposal(&self, enabled: bool) -> ImresResult<()> {
        self.ensure_live("set_automatic_disposal")?;
        self.inner
            .automatic_disposal
            .store(enabled, Ordering::Relaxed);
        Ok(())
    }

    /// Whether the last `remove_reference` releases the decoded data.
    pub fn automatic_disposal(&self) -> bool {
        self.inner.automatic_disposal.load(Ordering::Relaxed)
    }

    /// Toggle the display-compat delay rule. Static resources ignore this.
    pub fn set_display_compat(&self, enabled: bool) -> ImresResult<()> {
        self.ensure_live("set_display_compat")?;
        if self.inner.kind == ResourceKind::Animated {
            self.inner.display_compat.store(enabled, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Whether delays go through the display-compat rule. Always true for static resources.
    pub fn display_compat(&self) -> bool {
        match self.inner.kind {
            ResourceKind::Static => true,
            ResourceKind::Animated => self.inner.display_compat.load(Ordering::Relaxed),
        }
    }

    /// Finish decoding. A no-op when already completed and for static resources.
    #[tracing::instrument(level = "debug", skip(self), fields(format = %self.inner.format))]
    pub fn complete(&self) -> ImresResult<()> {
        let mut state = self.lock();
        let handle = state.handle.as_mut().ok_or_else(|| released("complete"))?;
        if self.inner.completion.get().is_some() {
            return Ok(());
        }
        let ResourceHandle::Animated(source) = handle else {
            return Ok(());
        };
        source.complete()?;
        let completion = Completion::from_source(&**source);
        tracing::debug!(frames = completion.delays.len(), "animation completed");
        let _ = self.inner.completion.set(completion);
        Ok(())
    }

    /// True once frame count, delays, and byte count are available.
    pub fn is_completed(&self) -> bool {
        self.inner.completion.get().is_some()
    }

    /// Static or animated.
    pub fn kind(&self) -> ResourceKind {
        self.inner.kind
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Container format.
    pub fn format(&self) -> ImageFormat {
        self.inner.format
    }

    /// True when no pixel can be translucent.
    pub fn is_opaque(&self) -> bool {
        self.inner.opaque
    }

    /// Number of frames; 1 for static resources.
    pub fn frame_count(&self) -> ImresResult<usize> {
        Ok(self.completed("frame_count")?.delays.len())
    }

    /// Delay of `frame` in milliseconds.
    ///
    /// Static resources report [`DELAY_FOREVER`] for every index. For animated resources an index
    /// past the last frame is misuse.
    pub fn delay(&self, frame: usize) -> ImresResult<u32> {
        let completion = self.completed("delay")?;
        if self.inner.kind == ResourceKind::Static {
            return Ok(DELAY_FOREVER);
        }
        let raw = completion.delays.get(frame).copied().ok_or_else(|| {
            ImresError::misuse(format!(
                "delay of frame {frame} out of {} frames",
                completion.delays.len()
            ))
        })?;
        Ok(compat_delay(raw, self.display_compat()))
    }

    /// Bytes held by the decoded pixels.
    pub fn byte_count(&self) -> ImresResult<usize> {
        Ok(self.completed("byte_count")?.byte_count)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/image.rs"]
mod tests;
