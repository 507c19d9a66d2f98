//! Glyph rasterization providers
//!
//! The font system never renders outlines itself. A provider draws one
//! character at a time into a scratch [`GlyphCanvas`]; the generator then
//! crops and encodes the result.

mod synthetic;
mod system;

pub use synthetic::SyntheticRasterizer;
pub use system::SystemRasterizer;

/// Font attributes handed to a provider for each glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRequest<'a> {
    pub facename: &'a str,
    /// Line height (ascent + descent) in pixels
    pub pixel_height: u32,
    pub weight: u16,
    pub italic: bool,
    /// Symbol charset instead of Latin-1
    pub symbolic: bool,
}

/// Renders single characters for the glyph generator
pub trait RasterizationProvider: Send + Sync {
    /// Draw `ch` with its pen origin at column [`GlyphCanvas::pen_x`] and the
    /// top of the line at row 0. Returns `false` if the face cannot produce
    /// the character.
    fn render_glyph(&self, face: &FaceRequest<'_>, ch: char, canvas: &mut GlyphCanvas) -> bool;

    /// Facenames this provider can render, if it can enumerate them
    fn facenames(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Inclusive bounds of the inked pixels on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBox {
    pub left: usize,
    pub right: usize,
    pub bottom: usize,
}

impl InkBox {
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }
}

/// Offscreen 8-bit coverage bitmap for one glyph
///
/// Sized generously: five line heights wide and two tall, with the pen one
/// line height in from the left so overhanging glyphs are not cut.
pub struct GlyphCanvas {
    width: usize,
    height: usize,
    pen_x: usize,
    coverage: Vec<u8>,
}

impl GlyphCanvas {
    pub fn for_line_height(line_height: u32) -> Self {
        let line_height = line_height.max(1) as usize;
        Self::new(line_height * 5, line_height * 2, line_height)
    }

    pub fn new(width: usize, height: usize, pen_x: usize) -> Self {
        Self {
            width,
            height,
            pen_x,
            coverage: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Column of the pen origin
    pub fn pen_x(&self) -> usize {
        self.pen_x
    }

    pub fn clear(&mut self) {
        self.coverage.fill(0);
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Coverage at a pixel; zero outside the canvas
    pub fn get(&self, x: i64, y: i64) -> u8 {
        self.index(x, y).map_or(0, |i| self.coverage[i])
    }

    /// Overwrite a pixel (clipped)
    pub fn put(&mut self, x: i64, y: i64, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.coverage[i] = value;
        }
    }

    /// Combine coverage with what is already there, keeping the maximum
    pub fn blend(&mut self, x: i64, y: i64, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.coverage[i] = self.coverage[i].max(value);
        }
    }

    /// Tight bounds of every non-background pixel
    pub fn ink_box(&self) -> Option<InkBox> {
        let mut left = usize::MAX;
        let mut right = 0;
        let mut bottom = None;

        for (y, row) in self.coverage.chunks_exact(self.width.max(1)).enumerate() {
            let Some(first) = row.iter().position(|&c| c > 0) else {
                continue;
            };
            let last = row.iter().rposition(|&c| c > 0).unwrap_or(first);
            left = left.min(first);
            right = right.max(last);
            bottom = Some(y);
        }

        bottom.map(|bottom| InkBox {
            left,
            right,
            bottom,
        })
    }

    /// Copy `rows` scanlines of `width` columns starting at column `left`;
    /// columns outside the canvas read as zero
    pub fn extract(&self, left: i64, width: usize, rows: usize) -> Vec<u8> {
        let mut mask = Vec::with_capacity(width * rows);
        for y in 0..rows as i64 {
            for x in 0..width as i64 {
                mask.push(self.get(left + x, y));
            }
        }
        mask
    }
}

impl std::fmt::Debug for GlyphCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCanvas")
            .field("dimensions", &(self.width, self.height))
            .field("pen_x", &self.pen_x)
            .finish()
    }
}
