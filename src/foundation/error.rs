use std::path::{Path, PathBuf};

/// Convenience result type used across storyreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by the render pipeline.
///
/// Every variant is fatal to the render that produced it. Callers decide whether to skip the
/// render or abort the whole job; nothing in this crate retries.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid options or render plan data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required input file is missing or cannot be decoded.
    #[error("input resolution error: '{}': {reason}", path.display())]
    InputResolution {
        /// Offending input path.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Timing data that would desynchronise captions and audio.
    #[error("timing error: {0}")]
    Timing(String),

    /// Glyph rasterisation or media tool failures.
    #[error("render backend error: {0}")]
    Backend(String),

    /// Destination or temp-file failures (unwritable path, disk full, rename).
    #[error("resource error: '{}': {reason}", path.display())]
    Resource {
        /// Destination or temp path involved.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// The render was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("render cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Payload-free error category, for callers that only branch on the kind of failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ReelError::Validation`].
    Validation,
    /// See [`ReelError::InputResolution`].
    InputResolution,
    /// See [`ReelError::Timing`].
    Timing,
    /// See [`ReelError::Backend`].
    Backend,
    /// See [`ReelError::Resource`].
    Resource,
    /// See [`ReelError::Cancelled`].
    Cancelled,
    /// See [`ReelError::Other`].
    Other,
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::InputResolution`] value.
    pub fn input(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::InputResolution {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Build a [`ReelError::Timing`] value.
    pub fn timing(msg: impl Into<String>) -> Self {
        Self::Timing(msg.into())
    }

    /// Build a [`ReelError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`ReelError::Resource`] value.
    pub fn resource(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Resource {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InputResolution { .. } => ErrorKind::InputResolution,
            Self::Timing(_) => ErrorKind::Timing,
            Self::Backend(_) => ErrorKind::Backend,
            Self::Resource { .. } => ErrorKind::Resource,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
