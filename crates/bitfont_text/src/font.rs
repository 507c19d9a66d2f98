//! Fonts and their glyphs
//!
//! A [`Font`] owns 256 glyph slots indexed by Latin-1 code. Slots fill on
//! first use, either from a loaded file or from the font's glyph generator,
//! and are immutable afterwards. Kerning is memoized per pair the same way.

use crate::codec::{self, Span};
use crate::compositor::{self, SKIP_THRESHOLD};
use crate::compression::CompressionCodec;
use crate::file::{self, FontHeader, FontImage, GlyphRecord};
use crate::generator::GlyphGenerator;
use crate::gradient::GradientCache;
use crate::kerning::{self, RowExtents};
use crate::params::FontParams;
use crate::rasterizer::RasterizationProvider;
use crate::style::{Decoration, TextLook};
use crate::{Result, TextError};
use bitfont_core::{Color, PixelBuffer, Rect, SharedBuffer};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Number of glyph slots in every font
pub const GLYPH_COUNT: usize = 256;

/// Kerning table entry that has not been computed yet
pub const KERN_UNSET: i16 = i16::MIN;

/// Whether a code is a control character that never renders
pub fn is_control(code: u8) -> bool {
    code < 0x20 || code == 0x7f
}

/// Map a character to its glyph slot; anything outside Latin-1 becomes '?'
pub fn code_point(ch: char) -> u8 {
    u8::try_from(u32::from(ch)).unwrap_or(b'?')
}

/// Printable glyph codes of a string
pub(crate) fn visible_codes(text: &str) -> Vec<u8> {
    text.chars()
        .map(code_point)
        .filter(|&code| !is_control(code))
        .collect()
}

/// One run-length encoded glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    width: u16,
    spans: Vec<Span>,
    extents: RowExtents,
}

impl Glyph {
    /// Build a glyph from spans covering `width * height` pixels
    pub fn new(width: u16, spans: Vec<Span>, height: u32) -> Self {
        let extents = kerning::row_extents(&spans, width as usize, height as usize);
        Self {
            width,
            spans,
            extents,
        }
    }

    /// Zero-width glyph for absent characters
    pub fn blank() -> Self {
        Self {
            width: 0,
            spans: Vec::new(),
            extents: RowExtents::default(),
        }
    }

    /// Ink-free glyph that still advances the pen
    pub fn space(width: u16, height: u32) -> Self {
        let blank = vec![0u8; width as usize * height as usize];
        Self::new(width, codec::encode(&blank, width as usize, height as usize), height)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn extents(&self) -> &RowExtents {
        &self.extents
    }

    /// Whether any pixel would be drawn
    pub fn has_ink(&self) -> bool {
        self.spans.iter().any(|s| s.intensity >= SKIP_THRESHOLD)
    }
}

struct GlyphSlot {
    glyph: OnceLock<Glyph>,
    kerning: Box<[AtomicI16]>,
}

impl GlyphSlot {
    fn new() -> Self {
        Self {
            glyph: OnceLock::new(),
            kerning: (0..GLYPH_COUNT).map(|_| AtomicI16::new(KERN_UNSET)).collect(),
        }
    }
}

/// Rasterized bitmap font
pub struct Font {
    params: FontParams,
    height: u32,
    kerning_enabled: AtomicBool,
    slots: Box<[GlyphSlot]>,
    generator: Option<Mutex<GlyphGenerator>>,
    fixed_advance: AtomicU32,
    gradient: Mutex<GradientCache>,
    path: Mutex<Option<PathBuf>>,
}

impl Font {
    /// Empty font with no way to generate glyphs
    pub fn new(params: FontParams, height: u32) -> Self {
        let height = height.max(1);
        Self {
            fixed_advance: AtomicU32::new(params.fixed_width),
            params,
            height,
            kerning_enabled: AtomicBool::new(true),
            slots: (0..GLYPH_COUNT).map(|_| GlyphSlot::new()).collect(),
            generator: None,
            gradient: Mutex::new(GradientCache::new()),
            path: Mutex::new(None),
        }
    }

    /// Font whose glyphs are rendered on first use by `provider`
    pub fn with_generator(
        params: FontParams,
        height: u32,
        provider: Arc<dyn RasterizationProvider>,
    ) -> Self {
        let mut font = Self::new(params, height);
        font.attach_generator(provider);
        font
    }

    /// Let slots that were never filled be rendered by `provider`
    pub fn attach_generator(&mut self, provider: Arc<dyn RasterizationProvider>) {
        self.generator = Some(Mutex::new(GlyphGenerator::new(
            provider,
            &self.params,
            self.height,
        )));
    }

    /// Build a font from a decoded file
    ///
    /// Stored glyphs fill their slots. Empty printable slots stay open when a
    /// provider is given so they can still be generated.
    pub fn from_image(image: FontImage, provider: Option<Arc<dyn RasterizationProvider>>) -> Self {
        let header = image.header;
        let params = FontParams {
            facename: header.facename,
            scale: header.height as f32,
            weight: header.weight,
            tracking: header.tracking,
            fixed_width: header.fixed_width,
            italic: header.italic,
            symbolic: header.symbolic,
        };

        let mut font = Self::new(params, header.height);
        let mut widest = 0u32;
        for (code, record) in image.glyphs.into_iter().enumerate().take(GLYPH_COUNT) {
            let slot = &font.slots[code];
            for (cell, &value) in slot.kerning.iter().zip(&record.kerning) {
                cell.store(value, Ordering::Relaxed);
            }

            let open = record.width == 0 && !is_control(code as u8);
            if open && provider.is_some() {
                continue;
            }
            widest = widest.max(record.width as u32);
            let stored = slot
                .glyph
                .set(Glyph::new(record.width, record.spans, header.height));
            debug_assert!(stored.is_ok(), "slot {code} filled twice");
        }

        if font.params.is_fixed_width() {
            font.fixed_advance.fetch_max(widest, Ordering::Relaxed);
        }
        if let Some(provider) = provider {
            font.attach_generator(provider);
        }
        font
    }

    /// Read a font file
    pub fn load(path: impl AsRef<Path>, codec: &dyn CompressionCodec) -> Result<Self> {
        Self::load_with_provider(path, codec, None)
    }

    pub(crate) fn load_with_provider(
        path: impl AsRef<Path>,
        codec: &dyn CompressionCodec,
        provider: Option<Arc<dyn RasterizationProvider>>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TextError::FontNotFound(path.display().to_string()));
        }
        let started = Instant::now();
        let bytes = std::fs::read(path)?;
        let font = Self::from_image(file::decode(&bytes, codec)?, provider);
        *font.path.lock() = Some(path.to_path_buf());

        tracing::debug!(
            "Loaded font {} ({} bytes) in {:?}",
            path.display(),
            bytes.len(),
            started.elapsed()
        );
        Ok(font)
    }

    /// Parse an in-memory font file
    pub fn from_bytes(bytes: &[u8], codec: &dyn CompressionCodec) -> Result<Self> {
        Ok(Self::from_image(file::decode(bytes, codec)?, None))
    }

    /// Generate every glyph and serialize the font
    pub fn to_bytes(&self, codec: &dyn CompressionCodec) -> Result<Vec<u8>> {
        file::encode(&self.to_image(), codec)
    }

    /// Write the font to disk, generating any glyphs not rendered yet
    pub fn save(&self, path: impl AsRef<Path>, codec: &dyn CompressionCodec) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes(codec)?;
        std::fs::write(path, &bytes)?;
        *self.path.lock() = Some(path.to_path_buf());
        tracing::debug!("Saved font {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Snapshot of every slot in file form
    pub fn to_image(&self) -> FontImage {
        self.generate_all();
        let glyphs = self
            .slots
            .iter()
            .enumerate()
            .map(|(code, slot)| {
                let glyph = self.glyph(code as u8);
                GlyphRecord {
                    width: glyph.width,
                    spans: glyph.spans.clone(),
                    kerning: slot
                        .kerning
                        .iter()
                        .map(|cell| cell.load(Ordering::Relaxed))
                        .collect(),
                }
            })
            .collect();

        FontImage {
            header: FontHeader {
                facename: self.params.facename.clone(),
                height: self.height,
                weight: self.params.weight,
                tracking: self.params.tracking,
                fixed_width: self.params.fixed_width,
                italic: self.params.italic,
                symbolic: self.params.symbolic,
            },
            glyphs,
        }
    }

    pub fn params(&self) -> &FontParams {
        &self.params
    }

    /// Replace the identity of a font that nobody else holds yet
    pub(crate) fn rebind(&mut self, params: FontParams) {
        self.params = params;
    }

    /// Line height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn facename(&self) -> &str {
        &self.params.facename
    }

    /// File this font was last loaded from or saved to
    pub fn path(&self) -> Option<PathBuf> {
        self.path.lock().clone()
    }

    pub fn kerning_enabled(&self) -> bool {
        self.kerning_enabled.load(Ordering::Relaxed)
    }

    pub fn set_kerning_enabled(&self, enabled: bool) {
        self.kerning_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Advance of every glyph in a fixed-width font
    pub fn fixed_advance(&self) -> u32 {
        self.fixed_advance.load(Ordering::Relaxed)
    }

    /// Glyph for a code, generating it on first use
    pub fn glyph(&self, code: u8) -> &Glyph {
        self.slots[code as usize].glyph.get_or_init(|| {
            let glyph = match &self.generator {
                Some(generator) if !is_control(code) => generator.lock().generate(code),
                _ => Glyph::blank(),
            };
            if self.params.is_fixed_width() {
                self.fixed_advance
                    .fetch_max(glyph.width as u32, Ordering::Relaxed);
            }
            glyph
        })
    }

    /// Whether a slot has been filled
    pub fn is_generated(&self, code: u8) -> bool {
        self.slots[code as usize].glyph.get().is_some()
    }

    /// Fill every printable slot
    pub fn generate_all(&self) {
        for code in 0..GLYPH_COUNT {
            self.glyph(code as u8);
        }
    }

    /// Width of a character's glyph in pixels
    pub fn char_width(&self, ch: char) -> i64 {
        self.glyph(code_point(ch)).width as i64
    }

    /// Kerning adjustment for a pair, computed once and then remembered
    pub fn kerning(&self, first: u8, second: u8) -> i16 {
        let cell = &self.slots[first as usize].kerning[second as usize];
        let value = cell.load(Ordering::Relaxed);
        if value != KERN_UNSET {
            return value;
        }

        let value = kerning::pair_adjustment(first, self.glyph(first), second, self.glyph(second));
        cell.store(value, Ordering::Relaxed);
        value
    }

    /// Space added after `first` when it is followed by `second`
    pub fn spacing(&self, first: u8, second: u8) -> i64 {
        let tracking = self.params.tracking as i64;
        if self.kerning_enabled() && !self.params.symbolic {
            self.kerning(first, second) as i64 + tracking
        } else {
            tracking
        }
    }

    /// Pen movement after drawing `code`; the last glyph only adds its width
    pub(crate) fn advance(&self, code: u8, next: Option<u8>) -> i64 {
        let width = self.glyph(code).width as i64;
        match next {
            None => width,
            Some(_) if self.params.is_fixed_width() => self.fixed_advance() as i64,
            Some(next) => width + 1 + self.spacing(code, next),
        }
    }

    /// Generate every glyph and kerning pair `text` needs
    pub fn prepare(&self, text: &str) -> Vec<u8> {
        let codes = visible_codes(text);
        for (i, &code) in codes.iter().enumerate() {
            self.glyph(code);
            if let Some(&next) = codes.get(i + 1) {
                self.spacing(code, next);
            }
        }
        codes
    }

    /// Gradient table for this font's line height
    pub(crate) fn gradient(&self, top: Color, bottom: Color) -> Arc<[Color]> {
        self.gradient.lock().get(top, bottom, self.height as usize)
    }

    /// Draw one line of text with its top-left corner at the area's origin
    ///
    /// Stops at the area's right edge; returns `false` if the text was cut.
    pub fn draw_text(
        &self,
        surface: &mut PixelBuffer,
        text: &str,
        area: Rect,
        look: &TextLook,
        clip: Option<Rect>,
    ) -> bool {
        let codes = self.prepare(text);
        self.draw_codes(surface, &codes, area, look, clip)
    }

    /// Like [`Font::draw_text`] for a shared surface
    ///
    /// Glyphs are generated before the surface is locked.
    pub fn draw_text_shared(
        &self,
        surface: &SharedBuffer,
        text: &str,
        area: Rect,
        look: &TextLook,
        clip: Option<Rect>,
    ) -> bool {
        let codes = self.prepare(text);
        let mut surface = surface.lock();
        self.draw_codes(&mut surface, &codes, area, look, clip)
    }

    pub(crate) fn draw_codes(
        &self,
        surface: &mut PixelBuffer,
        codes: &[u8],
        area: Rect,
        look: &TextLook,
        clip: Option<Rect>,
    ) -> bool {
        let height = self.height as i64;
        match look.decoration {
            Decoration::Normal => {}
            Decoration::Shadowed => {
                let offset = (height / 20).max(1);
                let shadow = look.top.alpha_only();
                self.draw_flat(surface, codes, area.offset(offset, offset), shadow, clip);
            }
            Decoration::Embossed => {
                let offset = (height / 32).max(1);
                let dark = look.top.alpha_only();
                let light = Color(dark.0 | 0x00ff_ffff);
                self.draw_flat(surface, codes, area.offset(offset, offset), dark, clip);
                self.draw_flat(surface, codes, area.offset(-offset, -offset), light, clip);
            }
        }

        if look.is_gradient() {
            self.draw_gradient(surface, codes, area, look.top, look.bottom, clip)
        } else {
            self.draw_flat(surface, codes, area, look.top, clip)
        }
    }

    /// Pen positions of every glyph that starts inside the area, plus
    /// whether the whole string fit
    fn layout_line(&self, codes: &[u8], area: &Rect) -> (Vec<i64>, bool) {
        let mut positions = Vec::with_capacity(codes.len());
        let mut x = area.left;
        for (i, &code) in codes.iter().enumerate() {
            if x >= area.right {
                return (positions, false);
            }
            positions.push(x);
            x += self.advance(code, codes.get(i + 1).copied());
        }
        (positions, true)
    }

    /// Bounds of every glyph placed at `positions`
    fn ink_bounds(&self, codes: &[u8], positions: &[i64], top: i64) -> Rect {
        let left = positions.iter().copied().min().unwrap_or(0);
        let right = codes
            .iter()
            .zip(positions)
            .map(|(&code, &x)| x + self.glyph(code).width as i64)
            .max()
            .unwrap_or(left);
        Rect::new(left, top, right.max(left), top + self.height as i64)
    }

    fn draw_flat(
        &self,
        surface: &mut PixelBuffer,
        codes: &[u8],
        area: Rect,
        color: Color,
        clip: Option<Rect>,
    ) -> bool {
        let (positions, fit) = self.layout_line(codes, &area);
        if positions.is_empty() {
            return fit;
        }

        let bounds = surface.bounds();
        let clip = clip.unwrap_or(bounds).intersect(&bounds);
        let output = self.ink_bounds(codes, &positions, area.top);
        let unclipped = clip.contains_rect(&output) && area.contains_rect(&output);
        let clip = clip.intersect(&area);
        if !unclipped && !clip.intersects(&output) {
            return fit;
        }

        for (&code, &x) in codes.iter().zip(&positions) {
            let glyph = self.glyph(code);
            if code == b' ' || glyph.width == 0 {
                continue;
            }
            if unclipped {
                compositor::composite(surface, glyph, x, area.top, color);
            } else {
                compositor::composite_clipped(surface, glyph, x, area.top, color, &clip);
            }
        }
        fit
    }

    fn draw_gradient(
        &self,
        surface: &mut PixelBuffer,
        codes: &[u8],
        area: Rect,
        top: Color,
        bottom: Color,
        clip: Option<Rect>,
    ) -> bool {
        let (positions, fit) = self.layout_line(codes, &area);
        if positions.is_empty() {
            return fit;
        }

        let bounds = surface.bounds();
        let clip = clip.unwrap_or(bounds).intersect(&bounds).intersect(&area);
        if !clip.intersects(&self.ink_bounds(codes, &positions, area.top)) {
            return fit;
        }

        let gradient = self.gradient(top, bottom);
        for (&code, &x) in codes.iter().zip(&positions) {
            let glyph = self.glyph(code);
            if code == b' ' || glyph.width == 0 {
                continue;
            }
            compositor::composite_gradient(surface, glyph, x, area.top, &gradient, &clip);
        }
        fit
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let generated = self.slots.iter().filter(|s| s.glyph.get().is_some()).count();
        f.debug_struct("Font")
            .field("facename", &self.params.facename)
            .field("height", &self.height)
            .field("weight", &self.params.weight)
            .field("generated", &generated)
            .field("has_generator", &self.generator.is_some())
            .finish()
    }
}
