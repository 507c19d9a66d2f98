//! Vertical text gradients
//!
//! One color per glyph scanline. Interior rows follow an arctangent ease so
//! the transition is concentrated around the middle of the line.

use bitfont_core::Color;
use std::sync::Arc;

/// Build a gradient table with one entry per scanline
pub fn build_gradient(top: Color, bottom: Color, height: usize) -> Vec<Color> {
    match height {
        0 => return Vec::new(),
        1 => return vec![top],
        _ => {}
    }

    let mut table = vec![top; height];
    table[height - 1] = bottom;

    let h = height as f64;
    for (i, entry) in table.iter_mut().enumerate().take(height - 1).skip(1) {
        let range = 10.0 * (((i as f64) - 1.0 - (h - 3.0) / 2.0) / h);
        let transition = (0.5 + range.atan() / 3.0).clamp(0.0, 1.0);

        let inverse = (255.0 * transition) as u32;
        let alpha = 255 - inverse;
        let mix = |a: u32, b: u32| ((a * alpha + b * inverse) >> 8) & 0xff;

        *entry = Color(
            (mix(top.a(), bottom.a()) << 24)
                | (mix(top.r(), bottom.r()) << 16)
                | (mix(top.g(), bottom.g()) << 8)
                | mix(top.b(), bottom.b()),
        );
    }

    table
}

/// Memoizes the most recently built gradient
#[derive(Debug, Default)]
pub struct GradientCache {
    current: Option<(Color, Color, Arc<[Color]>)>,
}

impl GradientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for the given endpoints, rebuilt only when they change
    pub fn get(&mut self, top: Color, bottom: Color, height: usize) -> Arc<[Color]> {
        if let Some((t, b, table)) = &self.current {
            if *t == top && *b == bottom && table.len() == height {
                return Arc::clone(table);
            }
        }

        let table: Arc<[Color]> = build_gradient(top, bottom, height).into();
        self.current = Some((top, bottom, Arc::clone(&table)));
        table
    }
}
