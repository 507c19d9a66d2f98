//! System font provider using fontdb for discovery and swash for scaling
//!
//! Only a handful of well-known font files are loaded up front; the full
//! system scan runs the first time a lookup misses.

use super::{FaceRequest, GlyphCanvas, RasterizationProvider};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::{Angle, Format, Transform};

/// Known system font paths, loaded without scanning every font directory
#[cfg(target_os = "macos")]
const KNOWN_FONT_PATHS: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/Times.ttc",
    "/System/Library/Fonts/Menlo.ttc",
    "/Library/Fonts/Arial.ttf",
    "/Library/Fonts/Verdana.ttf",
    "/Library/Fonts/Georgia.ttf",
];

#[cfg(target_os = "windows")]
const KNOWN_FONT_PATHS: &[&str] = &[
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\verdana.ttf",
    "C:\\Windows\\Fonts\\tahoma.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const KNOWN_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
];

/// Horizontal shear used when a face has no italic variant
const SYNTHETIC_ITALIC_DEGREES: f32 = 12.0;

/// Code point offset of symbol fonts that map their glyphs into the PUA
const SYMBOL_PUA_BASE: u32 = 0xF000;

/// A resolved face with its bytes held in memory
struct LoadedFace {
    data: Vec<u8>,
    index: u32,
    weight: u16,
    italic: bool,
}

struct Inner {
    db: Database,
    faces: FxHashMap<String, Option<Arc<LoadedFace>>>,
    system_fonts_loaded: bool,
    scale_context: ScaleContext,
}

impl Inner {
    fn ensure_system_fonts_loaded(&mut self) {
        if self.system_fonts_loaded {
            return;
        }

        tracing::debug!("Loading all system fonts (lazy scan)...");
        self.db.load_system_fonts();
        self.system_fonts_loaded = true;
        tracing::debug!("System fonts loaded: {} faces", self.db.faces().count());
    }

    fn query(&self, family: Family<'_>, weight: u16, italic: bool) -> Option<fontdb::ID> {
        let query = Query {
            families: &[family],
            weight: Weight(weight),
            style: if italic { Style::Italic } else { Style::Normal },
            stretch: Stretch::Normal,
        };
        if let Some(id) = self.db.query(&query) {
            return Some(id);
        }

        if italic {
            let oblique = Query {
                style: Style::Oblique,
                ..query
            };
            return self.db.query(&oblique);
        }
        None
    }

    fn find_face_id(&mut self, name: &str, weight: u16, italic: bool) -> Option<fontdb::ID> {
        let family = match name.to_ascii_lowercase().as_str() {
            "sans-serif" | "sans" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" | "mono" => Family::Monospace,
            _ => Family::Name(name),
        };

        if let Some(id) = self.query(family, weight, italic) {
            return Some(id);
        }
        self.ensure_system_fonts_loaded();
        self.query(family, weight, italic)
    }

    fn resolve(&mut self, face: &FaceRequest<'_>) -> Option<Arc<LoadedFace>> {
        let key = format!(
            "{}:w{}:{}",
            face.facename.to_lowercase(),
            face.weight,
            if face.italic { "i" } else { "n" }
        );
        if let Some(cached) = self.faces.get(&key) {
            return cached.clone();
        }

        let loaded = self
            .find_face_id(face.facename, face.weight, face.italic)
            .and_then(|id| {
                let info = self.db.face(id)?;
                let weight = info.weight.0;
                let italic = info.style != Style::Normal;
                let (data, index) = self
                    .db
                    .with_face_data(id, |data, index| (data.to_vec(), index))?;
                Some(Arc::new(LoadedFace {
                    data,
                    index,
                    weight,
                    italic,
                }))
            });

        match &loaded {
            Some(_) => tracing::debug!("Resolved face '{}'", key),
            None => tracing::debug!("No system face for '{}'", key),
        }
        self.faces.insert(key, loaded.clone());
        loaded
    }
}

/// Renders glyphs from installed system fonts
pub struct SystemRasterizer {
    inner: Mutex<Inner>,
}

impl SystemRasterizer {
    pub fn new() -> Self {
        let mut db = Database::new();

        let mut loaded_count = 0;
        for path in KNOWN_FONT_PATHS {
            if Path::new(path).exists() && db.load_font_file(path).is_ok() {
                loaded_count += 1;
            }
        }
        tracing::debug!("Loaded {} known system fonts", loaded_count);

        Self {
            inner: Mutex::new(Inner {
                db,
                faces: FxHashMap::default(),
                system_fonts_loaded: false,
                scale_context: ScaleContext::new(),
            }),
        }
    }

    /// Register an additional font file, e.g. one bundled with an application
    pub fn load_font_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let mut inner = self.inner.lock();
        inner.db.load_font_file(path.as_ref())?;
        inner.faces.clear();
        Ok(())
    }
}

impl Default for SystemRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterizationProvider for SystemRasterizer {
    fn render_glyph(&self, face: &FaceRequest<'_>, ch: char, canvas: &mut GlyphCanvas) -> bool {
        let mut inner = self.inner.lock();
        let Some(loaded) = inner.resolve(face) else {
            return false;
        };
        let Some(font) = swash::FontRef::from_index(&loaded.data, loaded.index as usize) else {
            return false;
        };

        let charmap = font.charmap();
        let mut glyph_id = charmap.map(ch);
        if glyph_id == 0 && face.symbolic {
            if let Some(pua) = char::from_u32(SYMBOL_PUA_BASE + ch as u32) {
                glyph_id = charmap.map(pua);
            }
        }
        if glyph_id == 0 {
            return false;
        }

        // Scale so ascent + descent fills the requested line height
        let metrics = font.metrics(&[]);
        let cell = metrics.ascent + metrics.descent.abs();
        if cell <= 0.0 || metrics.units_per_em == 0 {
            return false;
        }
        let size = face.pixel_height as f32 * metrics.units_per_em as f32 / cell;
        let baseline = (metrics.ascent * size / metrics.units_per_em as f32).round() as i64;

        let mut scaler = inner
            .scale_context
            .builder(font)
            .size(size)
            .hint(true)
            .build();

        let mut render = Render::new(&[Source::Outline]);
        render.format(Format::Alpha);
        if face.italic && !loaded.italic {
            render.transform(Some(Transform::skew(
                Angle::from_degrees(SYNTHETIC_ITALIC_DEGREES),
                Angle::from_degrees(0.0),
            )));
        }
        if face.weight >= loaded.weight.saturating_add(200) {
            render.embolden((size / 32.0).max(0.5));
        }

        let Some(image) = render.render(&mut scaler, glyph_id) else {
            return false;
        };

        let left = canvas.pen_x() as i64 + image.placement.left as i64;
        let top = baseline - image.placement.top as i64;
        let width = image.placement.width as usize;
        if width == 0 {
            return true;
        }
        for (y, row) in image.data.chunks_exact(width).enumerate() {
            for (x, &coverage) in row.iter().enumerate() {
                if coverage > 0 {
                    canvas.blend(left + x as i64, top + y as i64, coverage);
                }
            }
        }
        true
    }

    fn facenames(&self) -> Vec<String> {
        let mut inner = self.inner.lock();
        inner.ensure_system_fonts_loaded();

        let mut names: Vec<String> = inner
            .db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl std::fmt::Debug for SystemRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SystemRasterizer")
            .field("faces_in_db", &inner.db.len())
            .field("resolved", &inner.faces.len())
            .field("system_fonts_loaded", &inner.system_fonts_loaded)
            .finish()
    }
}
