use std::time::Duration;

use crate::assets::source::{LoadedFont, load_image};
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::encode::png::RenderedPoster;
use crate::foundation::error::{LoadStage, PosterResult};
use crate::layout::frame::clip_path;
use crate::layout::wrap::{WrappedBlock, wrap_words};
use crate::render::surface::CanvasSurface;
use crate::scene::request::PosterRequest;
use crate::template::catalog::{OverlayStyle, PosterTemplate, TemplateCatalog};

/// Environment variable overriding [`ComposeOpts::load_timeout`], in milliseconds.
pub const LOAD_TIMEOUT_ENV: &str = "POSTERCRAFT_LOAD_TIMEOUT_MS";

/// Knobs for [`Compositor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposeOpts {
    /// Upper bound for each individual load (template, user photo, font).
    pub load_timeout: Duration,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(10),
        }
    }
}

impl ComposeOpts {
    /// Defaults, with `POSTERCRAFT_LOAD_TIMEOUT_MS` applied when it parses to a positive integer.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(ms) = std::env::var(LOAD_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
        {
            opts.load_timeout = Duration::from_millis(ms);
        }
        opts
    }

    /// Replace the per-load timeout.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }
}

#[derive(Clone, Copy, Debug)]
enum Stage {
    LoadingTemplate,
    LoadingUser,
    Compositing,
    Encoding,
}

/// Turns a [`PosterRequest`] into a [`RenderedPoster`].
///
/// Each call owns its own surface, so one compositor can serve overlapping requests.
#[derive(Clone, Debug)]
pub struct Compositor {
    catalog: TemplateCatalog,
    opts: ComposeOpts,
}

impl Compositor {
    /// Compositor over `catalog`.
    pub fn new(catalog: TemplateCatalog, opts: ComposeOpts) -> Self {
        Self { catalog, opts }
    }

    /// Templates this compositor can resolve.
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Active options.
    pub fn opts(&self) -> &ComposeOpts {
        &self.opts
    }

    /// Resolve the request's template in the catalog and compose.
    pub async fn compose(&self, req: &PosterRequest) -> PosterResult<RenderedPoster> {
        let template = self.catalog.get(req.template())?;
        self.compose_with(template, req).await
    }

    /// Compose against an explicit template, bypassing the catalog.
    ///
    /// Any failure aborts the whole composition; nothing partial is returned.
    #[tracing::instrument(
        skip_all,
        fields(template = %template.name, shape = ?req.frame_shape())
    )]
    pub async fn compose_with(
        &self,
        template: &PosterTemplate,
        req: &PosterRequest,
    ) -> PosterResult<RenderedPoster> {
        template.validate()?;
        let timeout = self.opts.load_timeout;
        let canvas = template.canvas;
        let mut surface = CanvasSurface::acquire(canvas)?;

        tracing::debug!(stage = ?Stage::LoadingTemplate, source = %template.source.describe());
        let backdrop = load_image(&template.source, LoadStage::Template, timeout, Some(canvas)).await?;
        surface.draw_image_stretched(&backdrop, canvas.rect())?;
        drop(backdrop);

        tracing::debug!(stage = ?Stage::LoadingUser, source = %req.user_image().describe());
        let photo = load_image(req.user_image(), LoadStage::User, timeout, None).await?;

        tracing::debug!(stage = ?Stage::Compositing);
        let frame = template.frame.rect(canvas);
        surface.draw_image_clipped(&photo, frame, &clip_path(frame, req.frame_shape()))?;
        drop(photo);

        if let Some(text) = req.overlay_text() {
            let style = &template.overlay;
            let font = style.font.load(timeout).await?;
            draw_overlay(&mut surface, &font, style, text)?;
        }

        tracing::debug!(stage = ?Stage::Encoding);
        let rgba = surface.finish();
        RenderedPoster::encode_rgba8(canvas.width, canvas.height, rgba)
    }

    /// Wrap `message` exactly as [`Compositor::compose_with`] would draw it on `template`.
    pub async fn preview_lines(
        &self,
        template: &PosterTemplate,
        message: &str,
    ) -> PosterResult<WrappedBlock> {
        let style = &template.overlay;
        let font = style.font.load(self.opts.load_timeout).await?;
        let mut engine = TextLayoutEngine::new(&font, style.font_size_px)?;
        Ok(wrap_words(message, style.max_line_width_px, &mut engine))
    }
}

fn draw_overlay(
    surface: &mut CanvasSurface,
    font: &LoadedFont,
    style: &OverlayStyle,
    text: &str,
) -> PosterResult<()> {
    let mut engine = TextLayoutEngine::new(font, style.font_size_px)?;
    let block = wrap_words(text, style.max_line_width_px, &mut engine);
    if block.is_empty() {
        return Ok(());
    }

    let origin = (f64::from(style.origin_x), f64::from(style.origin_y));
    let padding = f64::from(style.padding_px);
    let line_height = f64::from(style.line_height_px);
    surface.fill_rect(
        block.background_rect(origin, padding, line_height),
        style.background,
    );

    let brush = TextBrushRgba8 {
        r: style.text_color.r,
        g: style.text_color.g,
        b: style.text_color.b,
        a: style.text_color.a,
    };
    let font_data = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
        font.index,
    );
    let x = origin.0 + padding;
    for (i, line) in block.lines.iter().enumerate() {
        let layout = engine.layout_line(&line.text, brush);
        let top = origin.1 + padding + (i as f64) * line_height;
        let centered = (line_height - f64::from(layout.height())) / 2.0;
        surface.fill_text(&layout, &font_data, (x, top + centered));
    }
    tracing::debug!(lines = block.len(), family = engine.family_name(), "overlay drawn");
    Ok(())
}
