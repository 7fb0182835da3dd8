/// Convenience result type used across fabric-overlay.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Top-level error taxonomy used by the compositor, orchestrator and packager.
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// A batch was requested with no bases or no fabrics. Nothing was rendered.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// An input image could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The off-screen drawing surface could not be created.
    #[error("canvas unavailable: {0}")]
    CanvasUnavailable(String),

    /// Archive construction failed after a successful batch.
    #[error("packaging error: {0}")]
    Packaging(String),

    /// Invalid user-provided options or job data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    /// Build an [`OverlayError::EmptyInput`] value.
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    /// Build an [`OverlayError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`OverlayError::CanvasUnavailable`] value.
    pub fn canvas_unavailable(msg: impl Into<String>) -> Self {
        Self::CanvasUnavailable(msg.into())
    }

    /// Build an [`OverlayError::Packaging`] value.
    pub fn packaging(msg: impl Into<String>) -> Self {
        Self::Packaging(msg.into())
    }

    /// Build an [`OverlayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
