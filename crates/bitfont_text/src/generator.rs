//! On-demand glyph generation
//!
//! Asks the rasterization provider for one character, crops the canvas to
//! the inked columns and run-length encodes the top line-height rows.

use crate::codec::encode;
use crate::font::{is_control, Glyph};
use crate::params::FontParams;
use crate::rasterizer::{FaceRequest, GlyphCanvas, InkBox, RasterizationProvider};
use std::sync::Arc;

/// Produces glyphs for one font from a rasterization provider
pub struct GlyphGenerator {
    provider: Arc<dyn RasterizationProvider>,
    facename: String,
    height: u32,
    weight: u16,
    italic: bool,
    symbolic: bool,
    fixed_width: u32,
    canvas: GlyphCanvas,
    widest_digit: Option<usize>,
}

impl GlyphGenerator {
    pub fn new(provider: Arc<dyn RasterizationProvider>, params: &FontParams, height: u32) -> Self {
        Self {
            provider,
            facename: params.facename.clone(),
            height,
            weight: params.weight,
            italic: params.italic,
            symbolic: params.symbolic,
            fixed_width: params.fixed_width,
            canvas: GlyphCanvas::for_line_height(height),
            widest_digit: None,
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Render and encode the glyph for a Latin-1 code
    pub fn generate(&mut self, code: u8) -> Glyph {
        if is_control(code) {
            return Glyph::blank();
        }
        if code == b' ' {
            let width = if self.fixed_width > 0 {
                self.fixed_width
            } else {
                (self.height / 4).max(1)
            };
            return Glyph::space(width.min(u16::MAX as u32) as u16, self.height);
        }

        let ch = char::from(code);
        let digit_width = if self.fixed_width == 0 && ch.is_ascii_digit() {
            Some(self.widest_digit())
        } else {
            None
        };

        let Some(ink) = self.render(ch) else {
            tracing::debug!(
                "No ink for {:?} in '{}' at {}px",
                ch,
                self.facename,
                self.height
            );
            return Glyph::blank();
        };

        let ink_width = ink.width();
        let target = match digit_width {
            Some(widest) => widest.max(ink_width),
            None if self.fixed_width > 0 => (self.fixed_width as usize).max(ink_width),
            None => ink_width,
        }
        .min(u16::MAX as usize);
        let left = ink.left as i64 - ((target - ink_width) / 2) as i64;

        let rows = self.height as usize;
        let mask = self.canvas.extract(left, target, rows);
        let spans = encode(&mask, target, rows);
        tracing::trace!(
            "Generated {:?}: width {} (ink {}..={}, bottom {}), {} spans",
            ch,
            target,
            ink.left,
            ink.right,
            ink.bottom,
            spans.len()
        );
        Glyph::new(target as u16, spans, self.height)
    }

    fn render(&mut self, ch: char) -> Option<InkBox> {
        self.canvas.clear();
        let face = FaceRequest {
            facename: &self.facename,
            pixel_height: self.height,
            weight: self.weight,
            italic: self.italic,
            symbolic: self.symbolic,
        };
        if !self.provider.render_glyph(&face, ch, &mut self.canvas) {
            return None;
        }
        self.canvas.ink_box()
    }

    /// Ink width of the widest digit, measured once
    fn widest_digit(&mut self) -> usize {
        if let Some(widest) = self.widest_digit {
            return widest;
        }
        let widest = ('0'..='9')
            .filter_map(|digit| self.render(digit))
            .map(|ink| ink.width())
            .max()
            .unwrap_or(0);
        self.widest_digit = Some(widest);
        widest
    }
}

impl std::fmt::Debug for GlyphGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphGenerator")
            .field("facename", &self.facename)
            .field("height", &self.height)
            .field("fixed_width", &self.fixed_width)
            .finish()
    }
}
