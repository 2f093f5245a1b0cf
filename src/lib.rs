//! Postercraft renders personalized event posters.
//!
//! A user photograph is clipped to a square or circle frame, composited onto a campaign template,
//! optionally captioned with a wrapped text overlay, and encoded as PNG. The result is then handed
//! to an [`OutputDispatcher`] for download, clipboard copy or native sharing.
//!
//! - Build a [`TemplateCatalog`] (built-in or from JSON)
//! - Describe the poster with a [`PosterRequest`]
//! - [`Compositor::compose`] it into a [`RenderedPoster`]
//! - Deliver it with [`share_with_fallback`] or a single dispatcher call
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// PNG encoding of finished posters.
pub(crate) mod encode;
pub(crate) mod layout;
/// Download, clipboard and share targets.
pub mod output;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod template;

pub use crate::assets::source::{FontSource, ImageSource, parse_data_url};
pub use crate::assets::text::TextMeasure;
pub use crate::encode::png::{RenderedPoster, download_file_name};
pub use crate::foundation::core::{Affine, BezPath, Canvas, FrameShape, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{LoadStage, PosterError, PosterResult};
pub use crate::layout::frame::{FrameSpec, clip_path};
pub use crate::layout::wrap::{WrappedBlock, WrappedLine, wrap_words};
pub use crate::output::{
    Capabilities, FileDispatcher, OutputDispatcher, ShareOutcome, probe_dispatcher,
    share_with_fallback,
};
#[cfg(feature = "clipboard")]
pub use crate::output::DesktopDispatcher;
pub use crate::render::compositor::{ComposeOpts, Compositor, LOAD_TIMEOUT_ENV};
pub use crate::scene::presets::SUGGESTED_MESSAGES;
pub use crate::scene::request::{MAX_MESSAGE_CHARS, PosterRequest};
pub use crate::template::catalog::{
    OverlayStyle, PosterTemplate, ShareContent, TemplateCatalog, TemplateSelector,
};
