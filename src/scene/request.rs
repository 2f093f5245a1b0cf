use crate::assets::source::ImageSource;
use crate::foundation::core::FrameShape;
use crate::foundation::error::{PosterError, PosterResult};
use crate::template::catalog::TemplateSelector;

/// Longest accepted overlay message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 150;

/// Everything needed to render one poster.
///
/// Immutable once built; one request yields exactly one poster.
#[derive(Clone, Debug, PartialEq)]
pub struct PosterRequest {
    user_image: ImageSource,
    frame_shape: FrameShape,
    message: Option<String>,
    template: TemplateSelector,
}

impl PosterRequest {
    /// Build a validated request.
    ///
    /// Messages longer than [`MAX_MESSAGE_CHARS`] are rejected; whitespace-only messages are kept
    /// but render nothing.
    pub fn new(
        user_image: ImageSource,
        frame_shape: FrameShape,
        message: Option<String>,
        template: TemplateSelector,
    ) -> PosterResult<Self> {
        if let Some(m) = &message {
            let n = m.chars().count();
            if n > MAX_MESSAGE_CHARS {
                return Err(PosterError::validation(format!(
                    "message is {n} characters (max {MAX_MESSAGE_CHARS})"
                )));
            }
        }
        Ok(Self {
            user_image,
            frame_shape,
            message,
            template,
        })
    }

    /// Source of the user photograph.
    pub fn user_image(&self) -> &ImageSource {
        &self.user_image
    }

    /// Clip shape for the photograph.
    pub fn frame_shape(&self) -> FrameShape {
        self.frame_shape
    }

    /// Message exactly as supplied.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Message with surrounding whitespace removed, or `None` when nothing is left to draw.
    pub fn overlay_text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Which template to render onto.
    pub fn template(&self) -> &TemplateSelector {
        &self.template
    }
}
