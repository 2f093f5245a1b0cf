use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;

use crate::foundation::error::{PosterError, PosterResult};

/// Final encoded poster.
///
/// The PNG bytes never change after creation; clones share the same buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPoster {
    width: u32,
    height: u32,
    png: Arc<[u8]>,
}

impl RenderedPoster {
    /// Encode straight-alpha RGBA8 pixels as PNG.
    pub(crate) fn encode_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> PosterResult<Self> {
        let img = image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| PosterError::encode("pixel buffer does not match surface size"))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| PosterError::encode(format!("png encode: {e}")))?;
        Ok(Self {
            width,
            height,
            png: Arc::from(buf),
        })
    }

    /// Wrap existing PNG bytes, reading the dimensions from the header.
    pub fn from_png_bytes(bytes: impl Into<Vec<u8>>) -> PosterResult<Self> {
        let bytes: Vec<u8> = bytes.into();
        let (width, height) = image::ImageReader::with_format(
            Cursor::new(bytes.as_slice()),
            image::ImageFormat::Png,
        )
        .into_dimensions()
        .map_err(|e| PosterError::encode(format!("not a png: {e}")))?;
        Ok(Self {
            width,
            height,
            png: Arc::from(bytes),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded PNG bytes.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// MIME type of [`Self::png_bytes`].
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// `data:image/png;base64,...` URL, as handed to web views and previews.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }

    /// Decode back to straight-alpha RGBA8 (clipboard targets want raw pixels).
    pub fn to_rgba8(&self) -> PosterResult<image::RgbaImage> {
        let img = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)
            .map_err(|e| PosterError::encode(format!("png decode: {e}")))?;
        Ok(img.to_rgba8())
    }

    /// Write the PNG bytes to `path`, failing if the file already exists.
    ///
    /// A partially written file is removed before the error is returned.
    pub fn write_new(&self, path: &Path) -> PosterResult<()> {
        let f = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        write_all_or_remove(path, f, &self.png)?;
        Ok(())
    }
}

fn write_all_or_remove<W: std::io::Write>(
    path: &Path,
    mut out: W,
    bytes: &[u8],
) -> std::io::Result<()> {
    let written = out.write_all(bytes).and_then(|()| out.flush());
    if let Err(e) = written {
        drop(out);
        if let Err(rm) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %rm, "could not remove partial file");
        }
        return Err(e);
    }
    Ok(())
}

/// Download file name: `<campaign-prefix>-Poster-<unix-timestamp-ms>.png`.
pub fn download_file_name(campaign_prefix: &str, unix_ms: i64) -> String {
    format!("{campaign_prefix}-Poster-{unix_ms}.png")
}
