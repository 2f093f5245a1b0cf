use std::borrow::Cow;
use std::path::PathBuf;

use crate::encode::png::RenderedPoster;
use crate::foundation::error::{PosterError, PosterResult};
use crate::output::{Capabilities, FileDispatcher, OutputDispatcher};
use crate::template::catalog::ShareContent;

/// Desktop dispatcher: file downloads plus the system clipboard.
///
/// Desktop environments have no share sheet, so `share` always reports it unavailable.
#[derive(Clone, Debug)]
pub struct DesktopDispatcher {
    files: FileDispatcher,
}

impl DesktopDispatcher {
    /// Succeeds only if the system clipboard can be opened right now.
    pub fn probe(download_dir: impl Into<PathBuf>) -> PosterResult<Self> {
        arboard::Clipboard::new()
            .map_err(|e| PosterError::clipboard_unavailable(e.to_string()))?;
        Ok(Self {
            files: FileDispatcher::new(download_dir),
        })
    }
}

impl OutputDispatcher for DesktopDispatcher {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            clipboard: true,
            share: false,
        }
    }

    fn download(&self, poster: &RenderedPoster, campaign_prefix: &str) -> PosterResult<PathBuf> {
        self.files.download(poster, campaign_prefix)
    }

    fn copy_to_clipboard(&self, poster: &RenderedPoster) -> PosterResult<()> {
        let rgba = poster.to_rgba8()?;
        let (width, height) = rgba.dimensions();
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| PosterError::clipboard_unavailable(e.to_string()))?;
        clipboard
            .set_image(arboard::ImageData {
                width: width as usize,
                height: height as usize,
                bytes: Cow::Owned(rgba.into_raw()),
            })
            .map_err(|e| PosterError::clipboard_unavailable(e.to_string()))?;
        tracing::info!(width, height, "poster copied to clipboard");
        Ok(())
    }

    fn share(&self, _poster: &RenderedPoster, _content: &ShareContent) -> PosterResult<()> {
        Err(PosterError::share_unavailable(
            "no native share sheet on desktop",
        ))
    }
}
