//! Deterministic block-glyph provider
//!
//! Draws simple geometric glyphs without touching system fonts, so tests,
//! benches and headless tools behave the same on every machine.

use super::{FaceRequest, GlyphCanvas, RasterizationProvider};

/// Renders every printable character as a block shape
#[derive(Debug, Clone, Default)]
pub struct SyntheticRasterizer {
    missing: Vec<char>,
}

impl SyntheticRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Characters the provider refuses to render
    pub fn with_missing(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.missing.extend(chars);
        self
    }

    /// Ink width of a character at a line height
    pub fn ink_width(line_height: u32, weight: u16, ch: char) -> i64 {
        let h = line_height as i64;
        let code = ch as i64;
        let base = if ch.is_ascii_digit() {
            h / 5 + code % 3
        } else {
            h / 4 + code % 4
        };
        let bold = i64::from(weight >= 600);
        (base + bold).max(1)
    }
}

struct Pen<'a> {
    canvas: &'a mut GlyphCanvas,
    origin: i64,
    baseline: i64,
    slant: bool,
}

impl Pen<'_> {
    fn fill(&mut self, left: i64, top: i64, right: i64, bottom: i64) {
        for y in top..bottom {
            let shift = if self.slant {
                (self.baseline - y).max(0) / 4
            } else {
                0
            };
            for x in left..right {
                self.canvas.blend(self.origin + x + shift, y, 255);
            }
        }
    }

    /// Soften the rightmost column of a filled box
    fn soften_right(&mut self, column: i64, top: i64, bottom: i64) {
        for y in top..bottom {
            let shift = if self.slant {
                (self.baseline - y).max(0) / 4
            } else {
                0
            };
            self.canvas.put(self.origin + column + shift, y, 128);
        }
    }
}

impl RasterizationProvider for SyntheticRasterizer {
    fn render_glyph(&self, face: &FaceRequest<'_>, ch: char, canvas: &mut GlyphCanvas) -> bool {
        if ch.is_control() || self.missing.contains(&ch) {
            return false;
        }

        let h = face.pixel_height as i64;
        let cap_top = h / 5;
        let x_top = h * 2 / 5;
        let baseline = (h * 4 / 5).max(1);
        let descent = (h * 19 / 20).max(baseline);
        let stroke = (h / 10).max(1);
        let w = Self::ink_width(face.pixel_height, face.weight, ch);

        let mut pen = Pen {
            origin: canvas.pen_x() as i64,
            canvas,
            baseline,
            slant: face.italic,
        };

        match ch {
            '.' => pen.fill(0, baseline - stroke, stroke, baseline),
            ',' => pen.fill(0, baseline - stroke, stroke, baseline + stroke),
            ':' | ';' => {
                pen.fill(0, x_top, stroke, x_top + stroke);
                pen.fill(0, baseline - stroke, stroke, baseline);
            }
            '\'' | '"' | '`' => pen.fill(0, cap_top, stroke, cap_top + 2 * stroke),
            '-' => {
                let top = h / 2 - stroke / 2;
                pen.fill(0, top, w, top + stroke);
            }
            '_' => pen.fill(0, baseline - stroke, w, baseline),
            'T' => {
                pen.fill(0, cap_top, w, cap_top + stroke);
                let stem = (w - stroke) / 2;
                pen.fill(stem, cap_top, stem + stroke, baseline);
            }
            'L' => {
                pen.fill(0, cap_top, stroke, baseline);
                pen.fill(0, baseline - stroke, w, baseline);
            }
            _ => {
                let top = if ch.is_lowercase() { x_top } else { cap_top };
                let bottom = if "gjpqy".contains(ch) { descent } else { baseline };
                pen.fill(0, top, w, bottom);
                if w > 1 {
                    pen.soften_right(w - 1, top, bottom);
                }
            }
        }

        true
    }

    fn facenames(&self) -> Vec<String> {
        vec!["Synthetic".to_string()]
    }
}
