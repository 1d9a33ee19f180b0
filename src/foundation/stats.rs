//! Process-wide live-object counters.
//!
//! Image resources count up in their constructor and down when their handle is released
//! (explicitly, automatically, or on drop). Frame renderers count up when created and down when
//! recycled. The counters are diagnostics only; nothing in the crate branches on them.

use std::sync::atomic::{AtomicUsize, Ordering};

static LIVE_IMAGE_RESOURCES: AtomicUsize = AtomicUsize::new(0);
static LIVE_FRAME_RENDERERS: AtomicUsize = AtomicUsize::new(0);

/// Snapshot of the live-object counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveCounts {
    /// Image resources whose handle has not been released.
    pub image_resources: usize,
    /// Frame renderers that have not been recycled.
    pub frame_renderers: usize,
}

/// Number of image resources whose handle has not been released.
pub fn live_image_resources() -> usize {
    LIVE_IMAGE_RESOURCES.load(Ordering::Relaxed)
}

/// Number of frame renderers that have not been recycled.
pub fn live_frame_renderers() -> usize {
    LIVE_FRAME_RENDERERS.load(Ordering::Relaxed)
}

/// Read both counters.
pub fn live_counts() -> LiveCounts {
    LiveCounts {
        image_resources: live_image_resources(),
        frame_renderers: live_frame_renderers(),
    }
}

pub(crate) fn image_resource_created() {
    LIVE_IMAGE_RESOURCES.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn image_resource_released() {
    // Saturate instead of wrapping if a release is ever double-counted.
    let _ = LIVE_IMAGE_RESOURCES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
        Some(n.saturating_sub(1))
    });
}

pub(crate) fn frame_renderer_created() {
    LIVE_FRAME_RENDERERS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn frame_renderer_recycled() {
    let _ = LIVE_FRAME_RENDERERS.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
        Some(n.saturating_sub(1))
    });
}
