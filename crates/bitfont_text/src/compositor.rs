//! Glyph compositing onto ARGB surfaces
//!
//! All three variants share one span walker: the destination cursor moves
//! with the glyph's raster position and jumps a full surface stride every
//! time a run wraps past the glyph width.

use crate::font::Glyph;
use bitfont_core::{alpha_blend_add_alpha, Color, PixelBuffer, Rect};

/// Spans fainter than this are never drawn
pub const SKIP_THRESHOLD: u8 = 5;

/// Above this (for both coverage and color alpha) pixels are overwritten
const OPAQUE_THRESHOLD: u32 = 0xf0;

#[inline]
fn blend_pixel(dst: &mut Color, color: Color, intensity: u8) {
    if intensity as u32 > OPAQUE_THRESHOLD && color.a() > OPAQUE_THRESHOLD {
        *dst = color;
    } else {
        *dst = alpha_blend_add_alpha(color, *dst, intensity as u32);
    }
}

/// Visit every drawable pixel of a glyph placed at `(x, y)`
///
/// `plot` receives the destination index plus the column and row inside the
/// glyph.
fn walk_spans(glyph: &Glyph, x: i64, y: i64, stride: i64, mut plot: impl FnMut(i64, i64, i64, u8)) {
    let width = glyph.width() as i64;
    if width == 0 {
        return;
    }

    let mut dest = y * stride + x;
    let mut column = 0i64;
    let mut row = 0i64;

    let advance = |dest: &mut i64, column: &mut i64, row: &mut i64, n: i64| {
        *column += n;
        *dest += n;
        while *column >= width {
            *column -= width;
            *row += 1;
            *dest += stride - width;
        }
    };

    for span in glyph.spans() {
        if span.intensity < SKIP_THRESHOLD {
            advance(&mut dest, &mut column, &mut row, span.run as i64);
            continue;
        }
        for _ in 0..span.run {
            plot(dest, column, row, span.intensity);
            advance(&mut dest, &mut column, &mut row, 1);
        }
    }
}

fn pixel_at(pixels: &mut [Color], index: i64) -> Option<&mut Color> {
    usize::try_from(index).ok().and_then(|i| pixels.get_mut(i))
}

/// Draw a glyph known to lie entirely inside the surface
pub fn composite(surface: &mut PixelBuffer, glyph: &Glyph, x: i64, y: i64, color: Color) {
    let stride = surface.stride() as i64;
    let pixels = surface.pixels_mut();
    walk_spans(glyph, x, y, stride, |dest, _, _, intensity| {
        if let Some(dst) = pixel_at(pixels, dest) {
            blend_pixel(dst, color, intensity);
        }
    });
}

/// Draw a glyph, skipping pixels outside `clip`
pub fn composite_clipped(
    surface: &mut PixelBuffer,
    glyph: &Glyph,
    x: i64,
    y: i64,
    color: Color,
    clip: &Rect,
) {
    let clip = clip.intersect(&surface.bounds());
    let stride = surface.stride() as i64;
    let pixels = surface.pixels_mut();
    walk_spans(glyph, x, y, stride, |dest, column, row, intensity| {
        if !clip.contains(x + column, y + row) {
            return;
        }
        if let Some(dst) = pixel_at(pixels, dest) {
            blend_pixel(dst, color, intensity);
        }
    });
}

/// Draw a glyph with one color per glyph row, skipping pixels outside `clip`
pub fn composite_gradient(
    surface: &mut PixelBuffer,
    glyph: &Glyph,
    x: i64,
    y: i64,
    gradient: &[Color],
    clip: &Rect,
) {
    let Some(&last) = gradient.last() else {
        return;
    };
    let clip = clip.intersect(&surface.bounds());
    let stride = surface.stride() as i64;
    let pixels = surface.pixels_mut();
    walk_spans(glyph, x, y, stride, |dest, column, row, intensity| {
        if !clip.contains(x + column, y + row) {
            return;
        }
        let color = gradient.get(row as usize).copied().unwrap_or(last);
        if let Some(dst) = pixel_at(pixels, dest) {
            blend_pixel(dst, color, intensity);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;

    fn glyph_from(mask: &[u8], width: usize, height: usize) -> Glyph {
        Glyph::new(width as u16, encode(mask, width, height), height as u32)
    }

    #[test]
    fn test_decoded_pixels_land_in_place() {
        // 3x3 ring with a faint center that must be skipped
        let mask = [255, 255, 255, 255, 3, 255, 255, 255, 255];
        let glyph = glyph_from(&mask, 3, 3);

        let mut surface = PixelBuffer::new(8, 6);
        composite(&mut surface, &glyph, 2, 1, Color::WHITE);

        for y in 0..6 {
            for x in 0..8 {
                let inside = (2..5).contains(&x) && (1..4).contains(&y) && !(x == 3 && y == 2);
                let pixel = surface.get_pixel(x, y).unwrap();
                assert_eq!(pixel == Color::WHITE, inside, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_long_runs_wrap_rows() {
        // a single run covering two full rows and part of a third
        let mut mask = vec![200u8; 7];
        mask.extend([0, 0]);
        let glyph = glyph_from(&mask, 3, 3);
        assert_eq!(glyph.spans().len(), 2);

        let mut surface = PixelBuffer::new(10, 10);
        composite(&mut surface, &glyph, 4, 4, Color::RED);
        assert_ne!(surface.get_pixel(4, 6).unwrap(), Color::TRANSPARENT);
        assert_eq!(surface.get_pixel(5, 6).unwrap(), Color::TRANSPARENT);
        assert_eq!(surface.get_pixel(7, 4).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_partial_coverage_blends() {
        let glyph = glyph_from(&[128], 1, 1);
        let mut surface = PixelBuffer::new(1, 1);
        composite(&mut surface, &glyph, 0, 0, Color::WHITE);
        let pixel = surface.get_pixel(0, 0).unwrap();
        assert!(pixel.r() > 100 && pixel.r() < 160, "{pixel:x}");
    }

    #[test]
    fn test_clipped_respects_rect() {
        let glyph = glyph_from(&[255; 16], 4, 4);
        let mut surface = PixelBuffer::new(10, 10);
        composite_clipped(&mut surface, &glyph, -2, -2, Color::BLUE, &Rect::new(0, 0, 1, 10));

        assert_eq!(surface.get_pixel(0, 0).unwrap(), Color::BLUE);
        assert_eq!(surface.get_pixel(0, 1).unwrap(), Color::BLUE);
        assert_eq!(surface.get_pixel(1, 0).unwrap(), Color::TRANSPARENT);
        assert_eq!(surface.get_pixel(0, 2).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_gradient_uses_row_colors() {
        let glyph = glyph_from(&[255; 6], 2, 3);
        let gradient = [Color::RED, Color::GREEN, Color::BLUE];
        let mut surface = PixelBuffer::new(4, 4);
        let bounds = surface.bounds();
        composite_gradient(&mut surface, &glyph, 1, 0, &gradient, &bounds);

        assert_eq!(surface.get_pixel(1, 0).unwrap(), Color::RED);
        assert_eq!(surface.get_pixel(2, 1).unwrap(), Color::GREEN);
        assert_eq!(surface.get_pixel(1, 2).unwrap(), Color::BLUE);
        assert_eq!(surface.get_pixel(0, 0).unwrap(), Color::TRANSPARENT);
    }
}
