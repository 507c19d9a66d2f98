//! Pixel-based kerning
//!
//! Pairs are fitted row by row: for every scanline where both glyphs carry
//! ink, the second glyph may slide left until its first inked column sits
//! right after the first glyph's last inked column. The tightest row wins.

use crate::codec::{decode, Span};
use crate::compositor::SKIP_THRESHOLD;
use crate::font::Glyph;

/// Per-row extents of the inked pixels
///
/// Columns are 1-based; 0 means the row has no ink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowExtents {
    pub left: Box<[u16]>,
    pub right: Box<[u16]>,
}

/// Scan a glyph's spans for the leftmost and rightmost ink column of each row
pub fn row_extents(spans: &[Span], width: usize, height: usize) -> RowExtents {
    if width == 0 {
        return RowExtents::default();
    }
    let mut left = vec![0u16; height];
    let mut right = vec![0u16; height];

    for (i, intensity) in decode(spans).take(width * height).enumerate() {
        if intensity < SKIP_THRESHOLD {
            continue;
        }
        let row = i / width;
        let column = (i % width + 1) as u16;
        if left[row] == 0 {
            left[row] = column;
        }
        right[row] = column;
    }

    RowExtents {
        left: left.into(),
        right: right.into(),
    }
}

/// Characters that always keep their full advance
pub fn is_exempt(code: u8) -> bool {
    code.is_ascii_digit() || matches!(code, b'_' | b'\'' | b' ')
}

/// Kerning adjustment for `first` followed by `second`, in pixels
///
/// Never tighter than the first glyph's width. Pairs whose glyphs share no
/// inked row get no adjustment.
pub fn pair_adjustment(first: u8, a: &Glyph, second: u8, b: &Glyph) -> i16 {
    if is_exempt(first) || is_exempt(second) || a.width() == 0 || b.width() == 0 {
        return 0;
    }

    let a_width = a.width() as i32;
    let best = a
        .extents()
        .right
        .iter()
        .zip(b.extents().left.iter())
        .filter(|(&right, &left)| right > 0 && left > 0)
        .map(|(&right, &left)| -((a_width - right as i32) + left as i32))
        .max();

    match best {
        Some(adjustment) => adjustment
            .max(-a_width)
            .clamp(i16::MIN as i32 + 1, i16::MAX as i32) as i16,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;

    fn glyph(rows: &[&str]) -> Glyph {
        let width = rows[0].len();
        let mask: Vec<u8> = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| if b == b'#' { 255 } else { 0 }))
            .collect();
        let spans = encode(&mask, width, rows.len());
        Glyph::new(width as u16, spans, rows.len() as u32)
    }

    #[test]
    fn test_row_extents_are_one_based() {
        let g = glyph(&["..#.", "....", "#..#"]);
        assert_eq!(&*g.extents().left, &[3, 0, 1]);
        assert_eq!(&*g.extents().right, &[3, 0, 4]);
    }

    #[test]
    fn test_faint_pixels_are_not_ink() {
        let mask = [4u8, 200, 3, 0];
        let extents = row_extents(&encode(&mask, 4, 1), 4, 1);
        assert_eq!((&*extents.left, &*extents.right), (&[2u16][..], &[2u16][..]));
    }

    #[test]
    fn test_solid_pair_touches() {
        let a = glyph(&["###", "###"]);
        let b = glyph(&["##", "##"]);
        // with the implicit one pixel gap this leaves them abutting
        assert_eq!(pair_adjustment(b'A', &a, b'B', &b), -1);
    }

    #[test]
    fn test_overhang_pair_tucks_in() {
        // second glyph slides under the first one's top arm
        let a = glyph(&["####", "#...", "#..."]);
        let b = glyph(&["....", "....", "####"]);
        assert_eq!(pair_adjustment(b'F', &a, b'm', &b), -4);
    }

    #[test]
    fn test_tightest_row_wins_and_is_clamped() {
        let a = glyph(&["#....", "....."]);
        let b = glyph(&["....#", "....."]);
        // -(4 + 5) is tighter than the first glyph is wide
        assert_eq!(pair_adjustment(b'v', &a, b'v', &b), -5);
    }

    #[test]
    fn test_no_shared_rows_keeps_full_advance() {
        let a = glyph(&["##", ".."]);
        let b = glyph(&["..", "##"]);
        assert_eq!(pair_adjustment(b'^', &a, b'.', &b), 0);
    }

    #[test]
    fn test_exempt_characters() {
        let a = glyph(&["##"]);
        for code in [b'0', b'9', b'_', b'\'', b' '] {
            assert_eq!(pair_adjustment(code, &a, b'x', &a), 0);
            assert_eq!(pair_adjustment(b'x', &a, code, &a), 0);
        }
        assert_ne!(pair_adjustment(b'x', &a, b'x', &a), 0);
    }
}
