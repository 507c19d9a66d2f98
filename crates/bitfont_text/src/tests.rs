//! End-to-end tests across the font system, file cache and renderer

use crate::codec::span_total;
use crate::compression::{CompressionCodec, ZlibCodec};
use crate::config::FontSystemConfig;
use crate::font::Font;
use crate::params::FontParams;
use crate::rasterizer::{FaceRequest, GlyphCanvas, RasterizationProvider, SyntheticRasterizer};
use crate::style::{Alignment, Decoration, TextLook, TextStyle};
use crate::system::FontSystem;
use crate::Result;
use bitfont_core::{Color, PixelBuffer, Rect, SharedBuffer};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

/// zlib codec that counts how often it writes
#[derive(Default)]
struct CountingCodec {
    inner: ZlibCodec,
    writes: AtomicUsize,
}

impl CompressionCodec for CountingCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.compress(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.inner.decompress(data)
    }
}

/// Synthetic glyphs that records every render and whether the watched
/// surface was locked at the time
#[derive(Default)]
struct WatchingRasterizer {
    inner: SyntheticRasterizer,
    renders: Mutex<BTreeMap<char, usize>>,
    surface: OnceLock<SharedBuffer>,
    renders_under_lock: AtomicUsize,
}

impl WatchingRasterizer {
    fn render_count(&self, ch: char) -> usize {
        self.renders.lock().get(&ch).copied().unwrap_or(0)
    }
}

impl RasterizationProvider for WatchingRasterizer {
    fn render_glyph(&self, face: &FaceRequest<'_>, ch: char, canvas: &mut GlyphCanvas) -> bool {
        if let Some(surface) = self.surface.get() {
            if surface.try_lock().is_none() {
                self.renders_under_lock.fetch_add(1, Ordering::SeqCst);
            }
        }
        *self.renders.lock().entry(ch).or_default() += 1;
        self.inner.render_glyph(face, ch, canvas)
    }
}

fn caching_system(dir: &std::path::Path, codec: Arc<CountingCodec>) -> FontSystem {
    let config = FontSystemConfig::standard().with_cache_dir(dir);
    FontSystem::with_codec(config, Arc::new(SyntheticRasterizer::new()), codec)
}

#[test]
fn test_hi_on_small_surface() {
    let system = FontSystem::new(FontSystemConfig::headless(), Arc::new(SyntheticRasterizer::new()));
    let font = system.get_font(&FontParams::new("Test", 20.0, 400));
    assert_eq!(font.height(), 20);

    let mut surface = PixelBuffer::new(100, 50);
    let look = TextLook::solid(Color::WHITE);
    assert!(font.draw_text(&mut surface, "Hi", Rect::new(0, 0, 100, 50), &look, None));

    let mut x = 0;
    let codes = [b'H', b'i'];
    for (i, &code) in codes.iter().enumerate() {
        let width = font.glyph(code).width() as i64;
        let inked = (0..20).any(|y| {
            (x..x + width).any(|px| surface.get_pixel(px, y) != Some(Color::TRANSPARENT))
        });
        assert!(inked, "no ink inside the box of {}", code as char);
        x += width + 1 + font.spacing(code, *codes.get(i + 1).unwrap_or(&b' '));
    }
}

#[test]
fn test_cache_is_written_once_and_reused() {
    let dir = tempfile::tempdir().unwrap();
    let codec = Arc::new(CountingCodec::default());
    let system = caching_system(dir.path(), Arc::clone(&codec));
    let params = FontParams::new("Test", 20.0, 400);

    let first = system.get_font(&params);
    assert_eq!(codec.writes.load(Ordering::SeqCst), 1);
    let file = dir.path().join(FontSystem::cache_file_name(&params, 20));
    assert!(file.exists());

    let second = system.get_font(&params);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(codec.writes.load(Ordering::SeqCst), 1);

    // a fresh system finds the file instead of generating
    let fresh_codec = Arc::new(CountingCodec::default());
    let fresh = caching_system(dir.path(), Arc::clone(&fresh_codec));
    let loaded = fresh.get_font(&params);
    assert_eq!(fresh_codec.writes.load(Ordering::SeqCst), 0);
    assert!(loaded.is_generated(b'H'));
    assert_eq!(loaded.glyph(b'W'), first.glyph(b'W'));
    assert_eq!(loaded.params(), &params);
}

#[test]
fn test_symbolic_fonts_are_never_cached() {
    let dir = tempfile::tempdir().unwrap();
    let codec = Arc::new(CountingCodec::default());
    let system = caching_system(dir.path(), Arc::clone(&codec));
    system.get_font(&FontParams::new("Symbols", 20.0, 400).symbolic());
    assert_eq!(codec.writes.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_corrupt_cache_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let params = FontParams::new("Test", 20.0, 400);
    let file = dir.path().join(FontSystem::cache_file_name(&params, 20));
    std::fs::write(&file, b"not a font").unwrap();

    let codec = Arc::new(CountingCodec::default());
    let system = caching_system(dir.path(), Arc::clone(&codec));
    let font = system.get_font(&params);
    assert!(font.glyph(b'A').width() > 0);
    assert_eq!(codec.writes.load(Ordering::SeqCst), 1);

    let bytes = std::fs::read(&file).unwrap();
    assert!(Font::from_bytes(&bytes, &ZlibCodec::new()).is_ok());
}

#[test]
fn test_saved_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("round.bfont");
    let params = FontParams::new("Test", 24.0, 700).with_tracking(2).italic();
    let font = Font::with_generator(params.clone(), 24, Arc::new(SyntheticRasterizer::new()));
    font.kerning(b'L', b'T');

    let codec = ZlibCodec::new().scrambled(true);
    font.save(&path, &codec).unwrap();
    assert_eq!(font.path().as_deref(), Some(path.as_path()));

    let loaded = Font::load(&path, &codec).unwrap();
    assert_eq!(loaded.height(), 24);
    assert_eq!(loaded.params().tracking, 2);
    assert!(loaded.params().italic);
    assert_eq!(loaded.kerning(b'L', b'T'), font.kerning(b'L', b'T'));
    for code in 0..=255u8 {
        let glyph = loaded.glyph(code);
        assert_eq!(span_total(glyph.spans()), glyph.width() as usize * 24);
        assert_eq!(glyph, font.glyph(code));
    }

    // the scrambled file is not readable as plain zlib
    assert!(Font::load(&path, &ZlibCodec::new()).is_err());
}

#[test]
fn test_load_font_registers_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reg.bfont");
    let font = Font::with_generator(
        FontParams::new("Stored", 18.0, 400),
        18,
        Arc::new(SyntheticRasterizer::new()),
    );
    font.save(&path, &ZlibCodec::new()).unwrap();

    let system = FontSystem::new(FontSystemConfig::headless(), Arc::new(SyntheticRasterizer::new()));
    let loaded = system.load_font(&path).unwrap();
    assert_eq!(system.font_names(), vec!["Stored"]);
    assert_eq!(system.available_sizes("Stored"), vec![18]);
    assert_eq!(loaded.string_width("abc"), font.string_width("abc"));
}

#[test]
fn test_concurrent_requests_share_one_font() {
    let system = Arc::new(FontSystem::new(
        FontSystemConfig::headless(),
        Arc::new(SyntheticRasterizer::new()),
    ));
    let params = FontParams::new("Test", 20.0, 400);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let system = Arc::clone(&system);
            let params = params.clone();
            thread::spawn(move || {
                let font = system.get_font(&params);
                let surface = PixelBuffer::new(200, 40).into_shared();
                let text = format!("Thread {i} draws AVATAR");
                font.draw_text_shared(&surface, &text, Rect::new(0, 0, 200, 40), &TextLook::default(), None);
                font
            })
        })
        .collect();

    let fonts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(fonts.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(system.font_count(), 1);
}

#[test]
fn test_paragraph_word_wrap_scenario() {
    let system = FontSystem::new(FontSystemConfig::headless(), Arc::new(SyntheticRasterizer::new()));
    let font = system.get_font(&FontParams::new("Test", 16.0, 400));
    let text = "Bitmap fonts wrap words at spaces and keep long words intact";

    let width = 120;
    let lines = font.wrap(width, text);
    assert!(lines.len() > 1);
    assert_eq!(lines.concat(), text);
    for line in &lines {
        assert!(font.string_width(line.trim_end()) <= width, "{line:?}");
    }

    let mut surface = PixelBuffer::new(200, 200);
    let style = TextStyle::new(
        TextLook::new(Decoration::Shadowed, Color::YELLOW, Color::RED),
        Alignment::Fit,
    )
    .with_padding(4);
    let rect = Rect::new(0, 0, width + 8, 200);
    assert!(font.draw_paragraph(&mut surface, text, rect, &style, None));

    // nothing lands outside the padded rect
    for y in 0..200 {
        for x in width + 4..200 {
            assert_eq!(surface.get_pixel(x, y), Some(Color::TRANSPARENT), "({x}, {y})");
        }
    }
}

#[test]
fn test_unicode_outside_latin1_draws_question_marks() {
    let system = FontSystem::new(FontSystemConfig::headless(), Arc::new(SyntheticRasterizer::new()));
    let font = system.get_font(&FontParams::new("Test", 20.0, 400));
    assert_eq!(font.string_width("€"), font.string_width("?"));
    assert_eq!(font.string_width("日本"), font.string_width("??"));
}

#[test]
fn test_glyphs_render_before_the_surface_is_locked() {
    let provider = Arc::new(WatchingRasterizer::default());
    let surface = PixelBuffer::new(200, 120).into_shared();
    assert!(provider.surface.set(Arc::clone(&surface)).is_ok());

    let system = FontSystem::new(FontSystemConfig::headless(), provider.clone());
    let font = system.get_font(&FontParams::new("Test", 16.0, 400));
    let look = TextLook::new(Decoration::Shadowed, Color::WHITE, Color::RED);
    font.draw_text_shared(&surface, "Locked away", Rect::new(0, 0, 200, 20), &look, None);
    let style = TextStyle::new(look, Alignment::Fit);
    font.draw_paragraph_shared(&surface, "Quiet jumping foxes", Rect::new(0, 20, 80, 120), &style, None);

    assert!(provider.render_count('L') > 0);
    assert!(provider.render_count('Q') > 0);
    assert_eq!(provider.renders_under_lock.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_draws_render_each_glyph_once() {
    let provider = Arc::new(WatchingRasterizer::default());
    let system = Arc::new(FontSystem::new(FontSystemConfig::headless(), provider.clone()));
    let params = FontParams::new("Test", 18.0, 400);
    let surface = PixelBuffer::new(240, 160).into_shared();
    let words = ["AVATAR", "waves", "Jumbled", "quartz", "fix", "yolk", "Vow", "keg"];

    let handles: Vec<_> = words
        .iter()
        .map(|&word| {
            let system = Arc::clone(&system);
            let params = params.clone();
            let surface = Arc::clone(&surface);
            thread::spawn(move || {
                let font = system.get_font(&params);
                let look = TextLook::default();
                let text = format!("Every thread draws {word}");
                font.draw_text_shared(&surface, &text, Rect::new(0, 0, 240, 40), &look, None);
                let style = TextStyle::new(look, Alignment::MiddleCenter);
                font.draw_paragraph_shared(&surface, &text, Rect::new(0, 40, 120, 160), &style, None);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let renders = provider.renders.lock();
    assert!(renders.contains_key(&'E'));
    for (ch, &count) in renders.iter() {
        assert_eq!(count, 1, "{ch:?} was rendered {count} times");
    }
}
