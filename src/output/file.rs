use std::path::{Path, PathBuf};

use crate::encode::png::{RenderedPoster, download_file_name};
use crate::foundation::error::{PosterError, PosterResult};
use crate::output::{Capabilities, OutputDispatcher};
use crate::template::catalog::ShareContent;

/// Download-only dispatcher for headless hosts.
#[derive(Clone, Debug)]
pub struct FileDispatcher {
    dir: PathBuf,
}

impl FileDispatcher {
    /// Write downloads into `dir` (created on first use).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Download directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `poster` under the name for `unix_ms`, moving one millisecond forward while the
    /// name is taken.
    pub(crate) fn download_at(
        &self,
        poster: &RenderedPoster,
        campaign_prefix: &str,
        mut unix_ms: i64,
    ) -> PosterResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        loop {
            let path = self.dir.join(download_file_name(campaign_prefix, unix_ms));
            match poster.write_new(&path) {
                Ok(()) => return Ok(path),
                Err(PosterError::Io(e)) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    unix_ms += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl OutputDispatcher for FileDispatcher {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn download(&self, poster: &RenderedPoster, campaign_prefix: &str) -> PosterResult<PathBuf> {
        let now = chrono::Utc::now().timestamp_millis();
        match self.download_at(poster, campaign_prefix, now) {
            Ok(path) => {
                tracing::info!(path = %path.display(), bytes = poster.png_bytes().len(), "poster saved");
                Ok(path)
            }
            Err(e) => {
                tracing::warn!(error = %e, dir = %self.dir.display(), "download failed");
                Err(e)
            }
        }
    }

    fn copy_to_clipboard(&self, _poster: &RenderedPoster) -> PosterResult<()> {
        Err(PosterError::clipboard_unavailable(
            "file output has no clipboard",
        ))
    }

    fn share(&self, _poster: &RenderedPoster, _content: &ShareContent) -> PosterResult<()> {
        Err(PosterError::share_unavailable(
            "file output has no share sheet",
        ))
    }
}
