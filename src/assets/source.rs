use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use base64::Engine as _;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::foundation::core::Canvas;
use crate::foundation::error::{LoadStage, PosterError, PosterResult};

/// Where an image comes from.
///
/// Camera and upload collaborators usually hand over a `data:` URL or raw bytes; templates are
/// normally files next to the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// File on disk.
    Path(PathBuf),
    /// Encoded bytes already in memory.
    Bytes(Arc<[u8]>),
    /// `data:<mime>;base64,<payload>` URL.
    DataUrl(String),
}

impl ImageSource {
    /// Wrap encoded bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self::Bytes(Arc::from(bytes))
    }

    /// Short human-readable description for logs; never includes payload bytes.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes(b) => format!("<{} bytes>", b.len()),
            Self::DataUrl(s) => {
                let head = s.split(',').next().unwrap_or_default();
                format!("<{head}, {} chars>", s.len())
            }
        }
    }

    /// Resolve relative paths against `root`; other variants are returned unchanged.
    pub fn resolve_against(self, root: &Path) -> Self {
        match self {
            Self::Path(p) if p.is_relative() => Self::Path(root.join(p)),
            other => other,
        }
    }

    pub(crate) async fn read_bytes(&self) -> anyhow::Result<Arc<[u8]>> {
        match self {
            Self::Path(p) => {
                let bytes = tokio::fs::read(p)
                    .await
                    .with_context(|| format!("read image '{}'", p.display()))?;
                Ok(Arc::from(bytes))
            }
            Self::Bytes(b) => Ok(Arc::clone(b)),
            Self::DataUrl(s) => {
                let (_mime, bytes) = parse_data_url(s)?;
                Ok(Arc::from(bytes))
            }
        }
    }
}

impl std::str::FromStr for ImageSource {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PosterError::validation("image source must be non-empty"));
        }
        if s.starts_with("data:") {
            return Ok(Self::DataUrl(s.to_owned()));
        }
        Ok(Self::Path(PathBuf::from(s)))
    }
}

impl<'de> serde::Deserialize<'de> for ImageSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Split a base64 `data:` URL into its MIME type and decoded payload.
pub fn parse_data_url(url: &str) -> anyhow::Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .context("data url must start with 'data:'")?;
    let (meta, payload) = rest
        .split_once(',')
        .context("data url is missing the ',' separator")?;
    let mime = meta
        .strip_suffix(";base64")
        .context("only base64 data urls are supported")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("decode base64 payload")?;
    Ok((mime.to_owned(), bytes))
}

/// Load and decode an image under `timeout`.
///
/// Reading happens on the runtime, decoding on the blocking pool.
pub(crate) async fn load_image(
    source: &ImageSource,
    stage: LoadStage,
    timeout: Duration,
    svg_size: Option<Canvas>,
) -> PosterResult<DecodedImage> {
    let fut = async {
        let bytes = source.read_bytes().await?;
        let decoded = tokio::task::spawn_blocking(move || decode_image(&bytes, svg_size))
            .await
            .context("decode task failed")??;
        Ok::<_, anyhow::Error>(decoded)
    };

    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(img)) => Ok(img),
        Ok(Err(e)) => Err(PosterError::image_load(stage, format!("{e:#}"))),
        Err(_) => Err(PosterError::Timeout {
            stage,
            timeout_ms: duration_ms(timeout),
        }),
    }
}

/// Where the overlay font comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FontSource {
    /// Best bold sans-serif face installed on the host.
    #[default]
    System,
    /// Font file on disk (TTF/OTF/TTC).
    Path(PathBuf),
    /// Font bytes already in memory.
    Bytes(Arc<[u8]>),
}

/// Font bytes plus the face index inside the file.
#[derive(Clone, Debug)]
pub(crate) struct LoadedFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
}

impl FontSource {
    /// Resolve relative paths against `root`.
    pub fn resolve_against(self, root: &Path) -> Self {
        match self {
            Self::Path(p) if p.is_relative() => Self::Path(root.join(p)),
            other => other,
        }
    }

    pub(crate) async fn load(&self, timeout: Duration) -> PosterResult<LoadedFont> {
        let fut = async {
            match self {
                Self::Path(p) => {
                    let bytes = tokio::fs::read(p)
                        .await
                        .with_context(|| format!("read font '{}'", p.display()))?;
                    Ok(LoadedFont {
                        bytes: Arc::new(bytes),
                        index: 0,
                    })
                }
                Self::Bytes(b) => Ok(LoadedFont {
                    bytes: Arc::new(b.to_vec()),
                    index: 0,
                }),
                Self::System => tokio::task::spawn_blocking(query_system_bold_sans)
                    .await
                    .context("font query task failed")?,
            }
        };

        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(font)) => Ok(font),
            Ok(Err(e)) => Err(PosterError::image_load(LoadStage::Font, format!("{e:#}"))),
            Err(_) => Err(PosterError::Timeout {
                stage: LoadStage::Font,
                timeout_ms: duration_ms(timeout),
            }),
        }
    }
}

impl std::str::FromStr for FontSource {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PosterError::validation("font source must be non-empty"));
        }
        if s.eq_ignore_ascii_case("system") {
            return Ok(Self::System);
        }
        Ok(Self::Path(PathBuf::from(s)))
    }
}

impl<'de> serde::Deserialize<'de> for FontSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn query_system_bold_sans() -> anyhow::Result<LoadedFont> {
    use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

    let mut db = Database::new();
    db.load_system_fonts();

    let families = [
        Family::Name("DejaVu Sans"),
        Family::Name("Liberation Sans"),
        Family::Name("Noto Sans"),
        Family::Name("Helvetica"),
        Family::Name("Arial"),
        Family::SansSerif,
    ];
    let query = Query {
        families: &families,
        weight: Weight::BOLD,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };

    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))
        .context("no system fonts available")?;
    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .context("system font face has no data")?;
    tracing::debug!(face_index = index, len = bytes.len(), "resolved system overlay font");

    Ok(LoadedFont {
        bytes: Arc::new(bytes),
        index,
    })
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
