use crate::assets::source::LoadedFont;
use crate::foundation::error::{PosterError, PosterResult};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Measures the rendered advance width of a run of text at a fixed font and size.
///
/// The word wrapper only needs widths, so tests and previews can plug in a cheap estimator
/// instead of a shaped font.
pub trait TextMeasure {
    /// Width in pixels of `text` laid out on a single line.
    fn measure(&mut self, text: &str) -> f32;
}

impl<F> TextMeasure for F
where
    F: FnMut(&str) -> f32,
{
    fn measure(&mut self, text: &str) -> f32 {
        self(text)
    }
}

/// Parley contexts bound to one registered font face and size.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    size_px: f32,
}

impl TextLayoutEngine {
    /// Register `font` and bind the engine to `size_px`.
    pub(crate) fn new(font: &LoadedFont, size_px: f32) -> PosterResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PosterError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PosterError::font("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PosterError::font("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            size_px,
        })
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` as a single unbroken line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let styles = overlay_styles(&self.family_name, self.size_px, brush);
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        for prop in styles {
            builder.push_default(prop);
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        layout
    }
}

/// Default style for overlay text: the registered family, bold, at a fixed size.
fn overlay_styles(
    family_name: &str,
    size_px: f32,
    brush: TextBrushRgba8,
) -> [parley::style::StyleProperty<'static, TextBrushRgba8>; 4] {
    [
        parley::style::StyleProperty::FontStack(parley::style::FontStack::Source(
            std::borrow::Cow::Owned(family_name.to_owned()),
        )),
        parley::style::StyleProperty::FontWeight(parley::style::FontWeight::BOLD),
        parley::style::StyleProperty::FontSize(size_px),
        parley::style::StyleProperty::Brush(brush),
    ]
}

impl TextMeasure for TextLayoutEngine {
    fn measure(&mut self, text: &str) -> f32 {
        self.layout_line(text, TextBrushRgba8::default()).width()
    }
}
