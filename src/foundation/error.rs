/// Convenience result type used across imres.
pub type ImresResult<T> = Result<T, ImresError>;

/// Top-level error taxonomy used by imres APIs.
///
/// [`ImresError::Misuse`] marks programming errors (operating on released objects, unbalanced
/// references, reading metadata before completion). Recoverable failures never reach callers of
/// the public decode entry points as errors; those return `None` after logging.
#[derive(thiserror::Error, Debug)]
pub enum ImresError {
    /// The caller broke the resource or renderer protocol.
    #[error("misuse error: {0}")]
    Misuse(String),

    /// Encoded input could not be parsed or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An argument is outside the accepted domain (empty or out-of-bounds rectangle, zero size).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImresError {
    /// Build a [`ImresError::Misuse`] value.
    pub fn misuse(msg: impl Into<String>) -> Self {
        Self::Misuse(msg.into())
    }

    /// Build a [`ImresError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ImresError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// True for protocol violations that callers must not retry.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Misuse(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
