use std::sync::Arc;

use crate::assets::decode::{DecodedImage, unpremultiply_rgba8_in_place};
use crate::assets::text::TextBrushRgba8;
use crate::foundation::core::{Affine, BezPath, Canvas, Rect, Rgba8};
use crate::foundation::error::{PosterError, PosterResult};

/// Fixed-size raster surface owned by one composition.
///
/// Draw calls are recorded in order and rasterized by [`CanvasSurface::finish`].
pub(crate) struct CanvasSurface {
    ctx: vello_cpu::RenderContext,
}

impl CanvasSurface {
    /// Allocate a surface of exactly `canvas` pixels.
    pub(crate) fn acquire(canvas: Canvas) -> PosterResult<Self> {
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| PosterError::surface(format!("width {} exceeds u16", canvas.width)))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| PosterError::surface(format!("height {} exceeds u16", canvas.height)))?;
        if w == 0 || h == 0 {
            return Err(PosterError::surface(format!(
                "cannot allocate a {}x{} surface",
                canvas.width, canvas.height
            )));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
        })
    }

    /// Draw `img` stretched to exactly fill `dst` (no aspect preservation).
    pub(crate) fn draw_image_stretched(&mut self, img: &DecodedImage, dst: Rect) -> PosterResult<()> {
        let paint = image_paint(img)?;
        let iw = f64::from(img.width);
        let ih = f64::from(img.height);
        let tr = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / iw, dst.height() / ih);

        self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    /// Draw `img` stretched into `dst`, masked by `clip` (surface coordinates).
    ///
    /// The clip layer is pushed for this single draw and popped before returning.
    pub(crate) fn draw_image_clipped(
        &mut self,
        img: &DecodedImage,
        dst: Rect,
        clip: &BezPath,
    ) -> PosterResult<()> {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.push_clip_layer(&bezpath_to_cpu(clip));
        let drawn = self.draw_image_stretched(img, dst);
        self.ctx.pop_layer();
        drawn
    }

    /// Fill `rect` with a solid color.
    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color.to_cpu());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
    }

    /// Fill every glyph run of `layout`, with the layout's top-left corner at `origin`.
    pub(crate) fn fill_text(
        &mut self,
        layout: &parley::Layout<TextBrushRgba8>,
        font: &vello_cpu::peniko::FontData,
        origin: (f64, f64),
    ) {
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate(origin)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    /// Rasterize everything recorded so far into straight-alpha RGBA8.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        let mut pixmap = vello_cpu::Pixmap::new(self.ctx.width(), self.ctx.height());
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        let mut out = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

fn image_paint(img: &DecodedImage) -> PosterResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PosterResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::surface(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::surface(format!("image height {height} exceeds u16")))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PosterError::surface("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
