//! Terminal actions for a finished poster: download, clipboard, share.
//!
//! Platforms differ in what they can do, so dispatchers report [`Capabilities`] and fail with
//! capability errors instead of being picked by type. [`share_with_fallback`] walks the
//! share -> clipboard -> download chain over any dispatcher.

use std::path::{Path, PathBuf};

use crate::encode::png::RenderedPoster;
use crate::foundation::error::{PosterError, PosterResult};
use crate::template::catalog::{PosterTemplate, ShareContent};

#[cfg(feature = "clipboard")]
mod desktop;
mod file;
/// Share-intent links for social networks.
pub mod social;

#[cfg(feature = "clipboard")]
pub use desktop::DesktopDispatcher;
pub use file::FileDispatcher;

/// What a dispatcher can do beyond writing files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Capabilities {
    /// Images can be placed on the system clipboard.
    pub clipboard: bool,
    /// A native share sheet is available.
    pub share: bool,
}

/// Platform sink for a rendered poster.
pub trait OutputDispatcher: Send + Sync {
    /// Advertised capabilities. Calls outside them fail with a capability error.
    fn capabilities(&self) -> Capabilities;

    /// Save the poster as `<campaign_prefix>-Poster-<unix-ms>.png` and return the written path.
    fn download(&self, poster: &RenderedPoster, campaign_prefix: &str) -> PosterResult<PathBuf>;

    /// Place the decoded image on the clipboard.
    ///
    /// Fails with [`PosterError::ClipboardUnavailable`] when the platform cannot.
    fn copy_to_clipboard(&self, poster: &RenderedPoster) -> PosterResult<()>;

    /// Hand the poster and its caption to a native share sheet.
    ///
    /// Fails with [`PosterError::ShareUnavailable`] when the platform cannot.
    fn share(&self, poster: &RenderedPoster, content: &ShareContent) -> PosterResult<()>;
}

/// Which terminal action actually happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Native share sheet accepted the poster.
    Shared,
    /// Poster is on the clipboard.
    Clipboard,
    /// Poster was written to disk.
    Download {
        /// Written file.
        path: PathBuf,
    },
}

impl ShareOutcome {
    /// Stable tag: `"shared"`, `"clipboard"` or `"download"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Clipboard => "clipboard",
            Self::Download { .. } => "download",
        }
    }

    /// Short user-facing confirmation.
    pub fn confirmation(&self) -> String {
        match self {
            Self::Shared => "Poster shared successfully.".to_owned(),
            Self::Clipboard => "Image copied. You can now paste it in any app.".to_owned(),
            Self::Download { path } => format!(
                "Your poster has been downloaded successfully ({}).",
                path.display()
            ),
        }
    }

    /// Written file, for downloads.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Download { path } => Some(path),
            _ => None,
        }
    }
}

impl serde::Serialize for ShareOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.kind())
    }
}

/// Share the poster, falling back to the clipboard and then to a download.
///
/// Only the capability errors of the failed step trigger the next one. Any other error is
/// returned unchanged. Each step runs at most once.
pub fn share_with_fallback(
    dispatcher: &dyn OutputDispatcher,
    poster: &RenderedPoster,
    template: &PosterTemplate,
) -> PosterResult<ShareOutcome> {
    match dispatcher.share(poster, &template.share) {
        Ok(()) => return Ok(ShareOutcome::Shared),
        Err(PosterError::ShareUnavailable(why)) => {
            tracing::debug!(%why, "share unavailable, trying clipboard");
        }
        Err(e) => return Err(e),
    }

    match dispatcher.copy_to_clipboard(poster) {
        Ok(()) => return Ok(ShareOutcome::Clipboard),
        Err(PosterError::ClipboardUnavailable(why)) => {
            tracing::debug!(%why, "clipboard unavailable, downloading");
        }
        Err(e) => return Err(e),
    }

    let path = dispatcher.download(poster, &template.campaign_prefix)?;
    Ok(ShareOutcome::Download { path })
}

/// Pick the most capable dispatcher this host supports, downloading into `download_dir`.
pub fn probe_dispatcher(download_dir: impl Into<PathBuf>) -> Box<dyn OutputDispatcher> {
    let download_dir = download_dir.into();

    #[cfg(feature = "clipboard")]
    {
        match DesktopDispatcher::probe(download_dir.clone()) {
            Ok(d) => {
                tracing::info!(dir = %download_dir.display(), "using desktop dispatcher");
                return Box::new(d);
            }
            Err(e) => {
                tracing::info!(error = %e, "system clipboard not available");
            }
        }
    }

    tracing::info!(dir = %download_dir.display(), "using file dispatcher");
    Box::new(FileDispatcher::new(download_dir))
}

#[cfg(test)]
#[path = "../../tests/unit/output/fallback.rs"]
mod tests;
