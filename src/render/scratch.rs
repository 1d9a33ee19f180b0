use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::foundation::error::{ImresError, ImresResult};

/// Intermediate RGBA8888 buffer used by texture-upload rendering.
///
/// Holds at most one buffer. Capacity is counted in pixels; the buffer spans `capacity * 4` bytes.
/// The buffer is created explicitly and kept until [`destroy_buffer`](Self::destroy_buffer).
pub struct ScratchPool {
    slot: Mutex<Option<Vec<u8>>>,
}

static GLOBAL: ScratchPool = ScratchPool::new();

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScratchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchPool")
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl ScratchPool {
    /// Pool with no buffer.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Process-wide pool.
    pub fn global() -> &'static ScratchPool {
        &GLOBAL
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<u8>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate a buffer of `size` pixels unless one already exists, in which case the existing
    /// buffer and its capacity are kept. Returns `false` only when allocation failed.
    pub fn create_buffer(&self, size: usize) -> bool {
        let mut slot = self.lock();
        if let Some(buf) = slot.as_ref() {
            tracing::debug!(
                requested = size,
                capacity = buf.len() / 4,
                "scratch buffer already exists"
            );
            return true;
        }

        let Some(len) = size.checked_mul(4) else {
            tracing::error!(size, "scratch buffer size overflows usize");
            return false;
        };
        let mut buf = Vec::new();
        if let Err(err) = buf.try_reserve_exact(len) {
            tracing::error!(size, %err, "scratch buffer allocation failed");
            return false;
        }
        buf.resize(len, 0);
        *slot = Some(buf);
        tracing::debug!(capacity = size, "scratch buffer created");
        true
    }

    /// Free the buffer; nothing happens when there is none.
    pub fn destroy_buffer(&self) {
        if self.lock().take().is_some() {
            tracing::debug!("scratch buffer destroyed");
        }
    }

    /// Capacity in pixels, `None` when no buffer exists.
    pub fn capacity(&self) -> Option<usize> {
        self.lock().as_ref().map(|buf| buf.len() / 4)
    }

    /// Run `f` with exclusive access to the whole buffer.
    ///
    /// Fails as misuse when no buffer exists or `required` pixels exceed the capacity.
    pub fn with_buffer<R>(
        &self,
        required: usize,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> ImresResult<R> {
        let mut slot = self.lock();
        let buf = slot
            .as_mut()
            .ok_or_else(|| ImresError::misuse("scratch buffer requested before create_buffer"))?;
        let capacity = buf.len() / 4;
        if required > capacity {
            return Err(ImresError::misuse(format!(
                "scratch buffer of {capacity} pixels cannot hold {required}"
            )));
        }
        Ok(f(buf))
    }
}

/// [`ScratchPool::create_buffer`] on the process-wide pool.
pub fn create_buffer(size: usize) -> bool {
    GLOBAL.create_buffer(size)
}

/// [`ScratchPool::destroy_buffer`] on the process-wide pool.
pub fn destroy_buffer() {
    GLOBAL.destroy_buffer();
}

#[cfg(test)]
#[path = "../../tests/unit/render/scratch.rs"]
mod tests;
