use crate::assets::text::TextMeasure;
use crate::foundation::core::Rect;

/// One wrapped overlay line and its measured width.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    /// Line text, words joined by single spaces.
    pub text: String,
    /// Measured width in pixels.
    pub width: f32,
}

/// Result of wrapping a message into lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedBlock {
    /// Lines in top-to-bottom order.
    pub lines: Vec<WrappedLine>,
}

impl WrappedBlock {
    /// Return `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Widest measured line.
    pub fn max_width(&self) -> f32 {
        self.lines.iter().map(|l| l.width).fold(0.0, f32::max)
    }

    /// Line texts, for callers that do not care about widths.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// Background rectangle: the block plus `padding` on every side, anchored at `origin`.
    pub fn background_rect(&self, origin: (f64, f64), padding: f64, line_height: f64) -> Rect {
        let (x, y) = origin;
        let w = f64::from(self.max_width()) + 2.0 * padding;
        let h = (self.len() as f64) * line_height + 2.0 * padding;
        Rect::new(x, y, x + w, y + h)
    }
}

/// Greedy word wrap.
///
/// Words are appended to the current line while the measured line stays within `max_width`; the
/// first word that would overflow starts the next line. Words are never split, so a single word
/// wider than `max_width` becomes one oversized line. Surrounding and repeated whitespace is
/// collapsed.
pub fn wrap_words<M: TextMeasure + ?Sized>(
    message: &str,
    max_width: f32,
    measure: &mut M,
) -> WrappedBlock {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0f32;

    for word in message.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            current_w = measure.measure(&current);
            continue;
        }

        let candidate = format!("{current} {word}");
        let candidate_w = measure.measure(&candidate);
        if candidate_w > max_width {
            lines.push(WrappedLine {
                text: std::mem::take(&mut current),
                width: current_w,
            });
            current.push_str(word);
            current_w = measure.measure(&current);
        } else {
            current = candidate;
            current_w = candidate_w;
        }
    }

    if !current.is_empty() {
        lines.push(WrappedLine {
            text: current,
            width: current_w,
        });
    }

    WrappedBlock { lines }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
