use crate::foundation::error::{ImresError, ImresResult};

/// Outcome of dropping one reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Release {
    /// Other references remain.
    Retained,
    /// The count went from 1 to 0.
    LastReference,
}

/// Non-negative reference count with an explicit 1 -> 0 transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RefCount(usize);

impl RefCount {
    pub(crate) fn get(self) -> usize {
        self.0
    }

    pub(crate) fn acquire(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub(crate) fn release(&mut self) -> ImresResult<Release> {
        match self.0 {
            0 => Err(ImresError::misuse(
                "remove_reference on a resource with no references",
            )),
            1 => {
                self.0 = 0;
                Ok(Release::LastReference)
            }
            n => {
                self.0 = n - 1;
                Ok(Release::Retained)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/refcount.rs"]
mod tests;
