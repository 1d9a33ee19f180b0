//! Display-side holder that drives an animated resource and notifies subscribers.
//!
//! The caller owns the timer: [`AnimatedBitmap::start`] and [`AnimatedBitmap::tick`] return the
//! delay to wait before the next tick, or `None` when the loop should stop.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::foundation::core::Blit;
use crate::foundation::error::ImresResult;
use crate::pixels::surface::{PixelConfig, Surface};
use crate::render::renderer::FrameRenderer;
use crate::resource::image::{ImageResource, ResourceKind};

/// Stable identifier of one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

type Callback = Box<dyn FnMut(&Surface) + Send>;

struct BitmapState {
    surface: Option<Surface>,
    renderer: Option<FrameRenderer>,
    references: usize,
    running: bool,
    next_id: u64,
    subscribers: BTreeMap<SubscriberId, Callback>,
}

/// RGBA surface showing the current frame of an image resource.
///
/// Animated resources keep a renderer for the lifetime of the bitmap. A static (or single-frame)
/// resource is rendered once and its renderer recycled immediately. Callbacks run while the
/// bitmap's lock is held and must not call back into the same bitmap.
pub struct AnimatedBitmap {
    width: u32,
    height: u32,
    opaque: bool,
    state: Mutex<BitmapState>,
}

impl std::fmt::Debug for AnimatedBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("AnimatedBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("references", &state.references)
            .field("running", &state.running)
            .field("subscribers", &state.subscribers.len())
            .field("released", &state.surface.is_none())
            .finish()
    }
}

impl AnimatedBitmap {
    /// Render frame 0 of `resource` into a new surface.
    ///
    /// Animated resources are completed first so the frame count is known.
    pub fn new(resource: &ImageResource) -> ImresResult<Self> {
        let (width, height) = (resource.width(), resource.height());
        let mut surface = Surface::try_new(width, height, PixelConfig::Rgba8888)?;
        resource.complete()?;

        let mut renderer = resource.create_renderer()?;
        renderer.render(&mut surface, Blit::full(width, height), None)?;

        let animated = resource.kind() == ResourceKind::Animated && resource.frame_count()? > 1;
        let renderer = if animated {
            Some(renderer)
        } else {
            renderer.recycle()?;
            None
        };

        Ok(Self {
            width,
            height,
            opaque: resource.is_opaque(),
            state: Mutex::new(BitmapState {
                surface: Some(surface),
                renderer,
                references: 0,
                running: false,
                next_id: 0,
                subscribers: BTreeMap::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BitmapState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the source image is opaque.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// True when the bitmap keeps a renderer to step through frames.
    pub fn is_animated(&self) -> bool {
        self.lock().renderer.is_some()
    }

    /// Take a reference. `false` once the bitmap has been released.
    pub fn obtain(&self) -> bool {
        let mut state = self.lock();
        if state.surface.is_none() {
            return false;
        }
        state.references += 1;
        true
    }

    /// Give a reference back. The surface and renderer are freed when none remain.
    pub fn release(&self) {
        let mut state = self.lock();
        state.references = state.references.saturating_sub(1);
        if state.references > 0 || state.surface.is_none() {
            return;
        }
        state.surface = None;
        state.running = false;
        if let Some(mut renderer) = state.renderer.take()
            && let Err(err) = renderer.recycle()
        {
            tracing::error!(%err, "bitmap renderer recycle failed");
        }
        tracing::debug!(width = self.width, height = self.height, "bitmap released");
    }

    /// True after the last reference was released.
    pub fn is_released(&self) -> bool {
        self.lock().surface.is_none()
    }

    /// Register `callback` to run after each new frame is rendered.
    pub fn subscribe(&self, callback: impl FnMut(&Surface) + Send + 'static) -> SubscriberId {
        let mut state = self.lock();
        let id = SubscriberId(state.next_id);
        state.next_id += 1;
        state.subscribers.insert(id, Box::new(callback));
        id
    }

    /// Remove a subscription. Returns `false` for unknown ids.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Run `f` on the current surface, `None` once released.
    pub fn with_surface<R>(&self, f: impl FnOnce(&Surface) -> R) -> Option<R> {
        self.lock().surface.as_ref().map(f)
    }

    /// Begin animating. Returns the delay before the first [`tick`](Self::tick), or `None` when
    /// there is nothing to animate or the loop is already running.
    pub fn start(&self) -> ImresResult<Option<Duration>> {
        let mut state = self.lock();
        if state.running || state.surface.is_none() {
            return Ok(None);
        }
        let Some(renderer) = state.renderer.as_ref() else {
            return Ok(None);
        };
        let delay = renderer.current_delay()?;
        state.running = true;
        Ok(Some(Duration::from_millis(u64::from(delay))))
    }

    /// Stop animating; the next `tick` returns `None`.
    pub fn stop(&self) {
        self.lock().running = false;
    }

    /// True between `start` and `stop` (or the loop ending on its own).
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Advance one frame, render it, and notify subscribers.
    ///
    /// Returns the delay before the next tick. `None` ends the loop: the bitmap was released, has
    /// no animation, was stopped, or has no subscribers left.
    pub fn tick(&self) -> ImresResult<Option<Duration>> {
        let mut state = self.lock();
        let BitmapState {
            surface,
            renderer,
            running,
            subscribers,
            ..
        } = &mut *state;

        let (Some(surface), Some(renderer)) = (surface.as_mut(), renderer.as_mut()) else {
            *running = false;
            return Ok(None);
        };

        renderer.advance()?;
        if subscribers.is_empty() {
            *running = false;
            return Ok(None);
        }
        renderer.render(surface, Blit::full(self.width, self.height), None)?;
        for callback in subscribers.values_mut() {
            callback(surface);
        }

        if !*running {
            return Ok(None);
        }
        let delay = renderer.current_delay()?;
        Ok(Some(Duration::from_millis(u64::from(delay))))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/bitmap.rs"]
mod tests;
