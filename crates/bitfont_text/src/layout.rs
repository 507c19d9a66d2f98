//! Measurement, word wrapping and paragraph placement

use crate::font::{code_point, is_control, visible_codes, Font};
use crate::style::{Alignment, HAlign, TextStyle, VAlign};
use bitfont_core::{PixelBuffer, Rect, SharedBuffer};

impl Font {
    fn line_width(&self, codes: &[u8]) -> i64 {
        codes
            .iter()
            .enumerate()
            .map(|(i, &code)| self.advance(code, codes.get(i + 1).copied()))
            .sum()
    }

    /// Width in pixels of the widest line of `text`
    pub fn string_width(&self, text: &str) -> i64 {
        text.split('\n')
            .map(|line| self.line_width(&visible_codes(line)))
            .max()
            .unwrap_or(0)
    }

    /// Bytes of `text` that fit in `max_width`, breaking after whole words
    ///
    /// A trailing space belongs to the word before it and a newline ends the
    /// line (and is counted). Falls back to [`Font::letters_that_fit`] when
    /// not even the first word fits.
    pub fn words_that_fit(&self, max_width: i64, text: &str) -> usize {
        let bytes = text.as_bytes();
        let mut fit = 0;
        let mut cur = 0;

        while cur < bytes.len() {
            while cur < bytes.len() && bytes[cur] != b' ' {
                if bytes[cur] == b'\n' {
                    if self.string_width(&text[..cur]) > max_width {
                        break;
                    }
                    return cur + 1;
                }
                cur += 1;
            }

            if self.string_width(&text[..cur]) > max_width {
                if fit == 0 {
                    return self.letters_that_fit(max_width, text);
                }
                return fit;
            }
            if cur >= bytes.len() {
                return bytes.len();
            }

            cur += 1;
            fit = cur;
        }

        fit
    }

    /// Bytes of `text` that fit in `max_width` one character at a time
    ///
    /// Always takes at least one character and stops after a newline.
    pub fn letters_that_fit(&self, max_width: i64, text: &str) -> usize {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut width = 0i64;
        let mut taken = false;

        for (i, &(offset, ch)) in chars.iter().enumerate() {
            if ch == '\n' {
                return offset + 1;
            }
            let code = code_point(ch);
            if is_control(code) {
                continue;
            }

            if width + self.glyph(code).width() as i64 > max_width {
                return if taken { offset } else { offset + ch.len_utf8() };
            }
            taken = true;

            let next = chars[i + 1..]
                .iter()
                .map(|&(_, c)| code_point(c))
                .find(|&c| !is_control(c));
            width += self.advance(code, next);
        }

        text.len()
    }

    /// Split `text` into the lines word wrapping produces
    ///
    /// Each line keeps its trailing space or newline, so the lines
    /// concatenate back to the input.
    pub fn wrap<'t>(&self, max_width: i64, text: &'t str) -> Vec<&'t str> {
        let mut lines = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            let n = self.words_that_fit(max_width, rest).clamp(1, rest.len());
            let (line, tail) = rest.split_at(n);
            lines.push(line);
            rest = tail;
        }
        lines
    }

    /// Number of wrapped lines `text` occupies at `max_width`
    pub fn line_count(&self, max_width: i64, text: &str) -> usize {
        self.wrap(max_width, text).len()
    }

    /// Where a single line of `text` lands inside `area`
    pub fn output_rect(&self, area: Rect, text: &str, alignment: Alignment, padding: i64) -> Rect {
        let area = area.deflate(padding, padding);
        let width = self.string_width(text);
        let height = self.height() as i64;

        let x = match alignment.horizontal() {
            HAlign::Left => area.left,
            HAlign::Center => area.left + (area.width() - width) / 2,
            HAlign::Right => area.right - width,
        };
        let y = match alignment.vertical(height > area.height()) {
            VAlign::Top => area.top,
            VAlign::Middle => area.top + (area.height() - height) / 2,
            VAlign::Bottom => area.bottom - height,
        };
        Rect::from_xywh(x, y, width, height)
    }

    /// Word-wrap `text` into `rect` and draw every visible line
    ///
    /// Returns `true` when every line landed inside the rect uncut.
    pub fn draw_paragraph(
        &self,
        surface: &mut PixelBuffer,
        text: &str,
        rect: Rect,
        style: &TextStyle,
        clip: Option<Rect>,
    ) -> bool {
        let area = rect.deflate(style.padding, style.padding);
        let lines = self.wrap(area.width(), text);
        let height = self.height() as i64;
        let block = height * lines.len() as i64;

        let top = match style.alignment.vertical(block > area.height()) {
            VAlign::Top => area.top,
            VAlign::Middle => (area.top + area.bottom - block) / 2,
            VAlign::Bottom => area.bottom - block,
        };
        let line_alignment = match style.alignment.horizontal() {
            HAlign::Left => Alignment::TopLeft,
            HAlign::Center => Alignment::TopCenter,
            HAlign::Right => Alignment::TopRight,
        };

        let clip = clip.map_or(area, |c| c.intersect(&area));
        let mut all_inside = true;
        for (i, line) in lines.iter().enumerate() {
            let line_top = top + i as i64 * height;
            let slot = Rect::new(area.left, line_top, area.right, line_top + height);
            let placed = self.output_rect(slot, line, line_alignment, 0);

            if placed.top < area.top || placed.bottom > area.bottom {
                all_inside = false;
            }
            if placed.bottom <= area.top || placed.top >= area.bottom {
                continue;
            }

            let target = Rect::new(
                placed.left,
                placed.top,
                placed.right.max(area.right),
                placed.bottom,
            );
            let codes = self.prepare(line);
            if !self.draw_codes(surface, &codes, target, &style.look, Some(clip)) {
                all_inside = false;
            }
        }
        all_inside
    }

    /// Like [`Font::draw_paragraph`] for a shared surface
    ///
    /// Every glyph the paragraph needs is generated before the surface is
    /// locked.
    pub fn draw_paragraph_shared(
        &self,
        surface: &SharedBuffer,
        text: &str,
        rect: Rect,
        style: &TextStyle,
        clip: Option<Rect>,
    ) -> bool {
        self.prepare(text);
        let mut surface = surface.lock();
        self.draw_paragraph(&mut surface, text, rect, style, clip)
    }
}
