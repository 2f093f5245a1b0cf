use std::fmt;

/// Convenience result alias used across the crate.
pub type PosterResult<T> = Result<T, PosterError>;

/// Which asset a load failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStage {
    /// Background template image.
    Template,
    /// User-supplied photograph.
    User,
    /// Overlay font face.
    Font,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Template => "template",
            Self::User => "user",
            Self::Font => "font",
        })
    }
}

/// Top-level error type.
///
/// Capability errors (`ClipboardUnavailable`, `ShareUnavailable`) are expected on many platforms
/// and are absorbed by [`crate::output::share_with_fallback`]; everything else is terminal for the
/// operation that produced it.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// An image or font could not be read or decoded.
    #[error("image load error ({stage}): {reason}")]
    ImageLoad {
        /// Failing asset.
        stage: LoadStage,
        /// Underlying cause, flattened to text.
        reason: String,
    },

    /// An asset load did not finish within the configured timeout.
    #[error("image load timed out ({stage}) after {timeout_ms}ms")]
    Timeout {
        /// Failing asset.
        stage: LoadStage,
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The raster drawing surface could not be created.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The platform cannot place images on the clipboard.
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// The platform has no native share capability.
    #[error("share unavailable: {0}")]
    ShareUnavailable(String),

    /// Invalid request or template definition.
    #[error("validation error: {0}")]
    Validation(String),

    /// Text overlay could not be shaped.
    #[error("font error: {0}")]
    Font(String),

    /// The surface could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Filesystem error while writing an output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else, with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::ImageLoad`].
    pub fn image_load(stage: LoadStage, reason: impl fmt::Display) -> Self {
        Self::ImageLoad {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Build a [`PosterError::SurfaceUnavailable`].
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    /// Build a [`PosterError::ClipboardUnavailable`].
    pub fn clipboard_unavailable(msg: impl Into<String>) -> Self {
        Self::ClipboardUnavailable(msg.into())
    }

    /// Build a [`PosterError::ShareUnavailable`].
    pub fn share_unavailable(msg: impl Into<String>) -> Self {
        Self::ShareUnavailable(msg.into())
    }

    /// Build a [`PosterError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Font`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`PosterError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Load stage for load-related errors.
    pub fn load_stage(&self) -> Option<LoadStage> {
        match self {
            Self::ImageLoad { stage, .. } | Self::Timeout { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Return `true` for errors a user can reasonably retry ("try again").
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ImageLoad { .. } | Self::Timeout { .. })
    }
}
