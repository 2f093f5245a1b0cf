use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::source::{FontSource, ImageSource};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{PosterError, PosterResult};
use crate::layout::frame::FrameSpec;

/// Name of a template in a [`TemplateCatalog`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TemplateSelector(pub String);

impl TemplateSelector {
    /// Select a template by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Template name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TemplateSelector {
    fn default() -> Self {
        Self::new("poster1")
    }
}

impl std::fmt::Display for TemplateSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Styling and placement of the message overlay.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Face used for both measuring and drawing, requested at bold weight.
    ///
    /// Files holding several weights resolve to their bold face; a single-weight file is drawn
    /// as-is, so supply a bold face.
    pub font: FontSource,
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Distance between consecutive line tops.
    pub line_height_px: f32,
    /// Lines are wrapped so their measured width stays within this.
    pub max_line_width_px: f32,
    /// Space between the text block and the background edge.
    pub padding_px: f32,
    /// Top-left corner of the background rectangle.
    pub origin_x: f32,
    /// Top-left corner of the background rectangle.
    pub origin_y: f32,
    /// Background fill; must be opaque.
    pub background: Rgba8,
    /// Glyph fill.
    pub text_color: Rgba8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font: FontSource::System,
            font_size_px: 36.0,
            line_height_px: 44.0,
            max_line_width_px: 600.0,
            padding_px: 24.0,
            origin_x: 60.0,
            origin_y: 120.0,
            background: Rgba8::WHITE,
            text_color: Rgba8::rgb(17, 17, 17),
        }
    }
}

impl OverlayStyle {
    fn validate(&self, canvas: Canvas) -> PosterResult<()> {
        let positive = [
            ("font_size_px", self.font_size_px),
            ("line_height_px", self.line_height_px),
            ("max_line_width_px", self.max_line_width_px),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(PosterError::validation(format!(
                    "overlay {name} must be finite and > 0"
                )));
            }
        }
        if !self.padding_px.is_finite() || self.padding_px < 0.0 {
            return Err(PosterError::validation(
                "overlay padding_px must be finite and >= 0",
            ));
        }
        let inside = |v: f32, max: u32| v.is_finite() && v >= 0.0 && v < max as f32;
        if !inside(self.origin_x, canvas.width) || !inside(self.origin_y, canvas.height) {
            return Err(PosterError::validation(
                "overlay origin must lie inside the surface",
            ));
        }
        if !self.background.is_opaque() {
            return Err(PosterError::validation(
                "overlay background must be opaque",
            ));
        }
        Ok(())
    }
}

/// Title and caption attached when a poster is shared.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShareContent {
    /// Share sheet title.
    pub title: String,
    /// Caption text.
    pub text: String,
}

/// A fully resolved background template.
#[derive(Clone, Debug, PartialEq)]
pub struct PosterTemplate {
    /// Catalog name.
    pub name: String,
    /// Background image.
    pub source: ImageSource,
    /// Canonical surface size; the template is stretched to fill it.
    pub canvas: Canvas,
    /// Photo frame placement.
    pub frame: FrameSpec,
    /// Message overlay style.
    pub overlay: OverlayStyle,
    /// Prefix used for download file names.
    pub campaign_prefix: String,
    /// Share sheet content.
    pub share: ShareContent,
}

impl PosterTemplate {
    /// Check every definition-time invariant.
    pub fn validate(&self) -> PosterResult<()> {
        if self.name.trim().is_empty() {
            return Err(PosterError::validation("template name must be non-empty"));
        }
        if self.campaign_prefix.trim().is_empty()
            || self
                .campaign_prefix
                .chars()
                .any(|c| std::path::is_separator(c) || c.is_control())
        {
            return Err(PosterError::validation(format!(
                "template '{}': campaign_prefix must be a non-empty file-name fragment",
                self.name
            )));
        }
        self.canvas.validate()?;
        self.frame
            .validate(self.canvas)
            .map_err(|e| PosterError::validation(format!("template '{}': {e}", self.name)))?;
        self.overlay
            .validate(self.canvas)
            .map_err(|e| PosterError::validation(format!("template '{}': {e}", self.name)))?;
        Ok(())
    }

    /// Reference poster layout: 1080x1920, 360px frame dropped by 6% of the height.
    pub fn reference(name: impl Into<String>, source: ImageSource) -> Self {
        Self {
            name: name.into(),
            source,
            canvas: Canvas {
                width: 1080,
                height: 1920,
            },
            frame: FrameSpec {
                size_px: 360,
                offset_frac: 0.06,
            },
            overlay: OverlayStyle::default(),
            campaign_prefix: "GCCD-2025".to_owned(),
            share: ShareContent {
                title: "My GCCD 2025 Poster".to_owned(),
                text: "Check out my Cloud Community Day 2025 poster!".to_owned(),
            },
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct CatalogDef {
    templates: Vec<TemplateDef>,
}

#[derive(Debug, serde::Deserialize)]
struct TemplateDef {
    name: String,
    source: ImageSource,
    canvas: Canvas,
    frame: FrameSpec,
    #[serde(default)]
    overlay: OverlayStyle,
    campaign_prefix: String,
    share: ShareContent,
}

/// Set of templates addressable by [`TemplateSelector`].
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    templates: Vec<PosterTemplate>,
}

impl TemplateCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The two reference templates, `poster1` and `poster2`, resolved against `assets_root`.
    pub fn builtin(assets_root: impl AsRef<Path>) -> Self {
        let root = assets_root.as_ref();
        let mut catalog = Self::new();
        for name in ["poster1", "poster2"] {
            let source = ImageSource::Path(PathBuf::from(format!("templates/{name}.png")));
            catalog
                .templates
                .push(PosterTemplate::reference(name, source.resolve_against(root)));
        }
        catalog
    }

    /// Parse a catalog from JSON; relative paths resolve against `base_dir`.
    pub fn from_reader<R: std::io::Read>(r: R, base_dir: &Path) -> PosterResult<Self> {
        let def: CatalogDef = serde_json::from_reader(r)
            .map_err(|e| PosterError::validation(format!("parse template catalog JSON: {e}")))?;

        let mut catalog = Self::new();
        for t in def.templates {
            let mut overlay = t.overlay;
            overlay.font = overlay.font.resolve_against(base_dir);
            catalog.insert(PosterTemplate {
                name: t.name,
                source: t.source.resolve_against(base_dir),
                canvas: t.canvas,
                frame: t.frame,
                overlay,
                campaign_prefix: t.campaign_prefix,
                share: t.share,
            })?;
        }
        Ok(catalog)
    }

    /// Parse a catalog JSON file; relative paths resolve against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PosterError::validation(format!("open template catalog '{}': {e}", path.display()))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_reader(BufReader::new(f), base)
    }

    /// Validate and add a template. Names must be unique.
    pub fn insert(&mut self, template: PosterTemplate) -> PosterResult<()> {
        template.validate()?;
        if self.templates.iter().any(|t| t.name == template.name) {
            return Err(PosterError::validation(format!(
                "duplicate template name '{}'",
                template.name
            )));
        }
        self.templates.push(template);
        Ok(())
    }

    /// Look up a template.
    pub fn get(&self, selector: &TemplateSelector) -> PosterResult<&PosterTemplate> {
        self.templates
            .iter()
            .find(|t| t.name == selector.as_str())
            .ok_or_else(|| {
                PosterError::validation(format!("unknown template '{}'", selector.as_str()))
            })
    }

    /// Template names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name.as_str())
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Return `true` when no template is defined.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/catalog.rs"]
mod tests;
