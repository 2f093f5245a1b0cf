use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Canvas;

/// Raster image in premultiplied RGBA8 form, ready to become a paint.
#[derive(Clone, Debug)]
pub(crate) struct DecodedImage {
    /// Width in pixels.
    pub(crate) width: u32,
    /// Height in pixels.
    pub(crate) height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

/// Decode raster bytes (any format `image` understands) or an SVG document.
///
/// SVG input is rasterized at `svg_size` when given, otherwise at its intrinsic size.
pub(crate) fn decode_image(bytes: &[u8], svg_size: Option<Canvas>) -> anyhow::Result<DecodedImage> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        let (w, h) = match svg_size {
            Some(c) => (c.width, c.height),
            None => intrinsic_svg_size(&tree)?,
        };
        let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
        return Ok(DecodedImage {
            width: w,
            height: h,
            rgba8_premul: Arc::new(rgba8_premul),
        });
    }

    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        anyhow::bail!("decoded image has zero size");
    }
    if width > Canvas::MAX_EDGE || height > Canvas::MAX_EDGE {
        anyhow::bail!(
            "image {width}x{height} exceeds {}px per edge",
            Canvas::MAX_EDGE
        );
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        // A multibyte character may straddle the cut.
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return false,
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn parse_svg(bytes: &[u8]) -> anyhow::Result<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts).context("parse svg tree")
}

fn intrinsic_svg_size(tree: &usvg::Tree) -> anyhow::Result<(u32, u32)> {
    fn to_px(v: f32) -> anyhow::Result<u32> {
        if !v.is_finite() || v <= 0.0 {
            anyhow::bail!("svg has invalid width/height");
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width())?;
    let h = to_px(size.height())?;
    if w > Canvas::MAX_EDGE || h > Canvas::MAX_EDGE {
        anyhow::bail!("svg raster size too large: {w}x{h}");
    }
    Ok((w, h))
}

/// Rasterize `tree` stretched to exactly `width x height`.
fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> anyhow::Result<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .context("failed to allocate svg pixmap")?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
