use kurbo::Shape;

use crate::foundation::core::{BezPath, Canvas, Circle, FrameShape, Rect};
use crate::foundation::error::{PosterError, PosterResult};

const PATH_TOLERANCE: f64 = 0.1;

/// Placement of the photo frame within a template.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameSpec {
    /// Edge length of the square frame in pixels.
    pub size_px: u32,
    /// Vertical shift of the frame as a fraction of the surface height (positive moves down).
    #[serde(default)]
    pub offset_frac: f64,
}

impl FrameSpec {
    /// Check that the frame fits inside `canvas`.
    ///
    /// This runs when a template is defined, so an oversized frame never reaches a request.
    pub fn validate(self, canvas: Canvas) -> PosterResult<()> {
        if self.size_px == 0 {
            return Err(PosterError::validation("frame size_px must be > 0"));
        }
        if !self.offset_frac.is_finite() {
            return Err(PosterError::validation("frame offset_frac must be finite"));
        }
        if self.size_px > canvas.width || self.size_px > canvas.height {
            return Err(PosterError::validation(format!(
                "frame size {}px does not fit a {}x{} surface",
                self.size_px, canvas.width, canvas.height
            )));
        }
        let r = self.rect(canvas);
        if r.x0 < 0.0 || r.y0 < 0.0 || r.x1 > canvas.rect().x1 || r.y1 > canvas.rect().y1 {
            return Err(PosterError::validation(format!(
                "frame offset {} pushes the frame outside the surface",
                self.offset_frac
            )));
        }
        Ok(())
    }

    /// Frame rectangle: horizontally centered, vertically centered plus the offset.
    ///
    /// The origin is snapped to whole pixels.
    pub fn rect(self, canvas: Canvas) -> Rect {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let s = f64::from(self.size_px);
        let x = ((w - s) / 2.0).round();
        let y = ((h - s) / 2.0 + h * self.offset_frac).round();
        Rect::new(x, y, x + s, y + s)
    }
}

/// Clip outline for `shape` inside the frame rectangle.
pub fn clip_path(frame: Rect, shape: FrameShape) -> BezPath {
    match shape {
        FrameShape::Square => frame.to_path(PATH_TOLERANCE),
        FrameShape::Circle => {
            Circle::new(frame.center(), frame.width().min(frame.height()) / 2.0)
                .to_path(PATH_TOLERANCE)
        }
    }
}
