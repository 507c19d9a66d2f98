//! Font system: the registry of every live font
//!
//! Fonts are keyed by line height and then by their full parameters. A miss
//! is served from the disk cache when a matching file exists, otherwise the
//! font is synthesized and (if caching is on) written back.

use crate::compression::{CompressionCodec, ZlibCodec};
use crate::config::FontSystemConfig;
use crate::file;
use crate::font::Font;
use crate::params::FontParams;
use crate::rasterizer::RasterizationProvider;
use crate::Result;
use parking_lot::{ReentrantMutex, RwLock};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extension of font files written by the cache
pub const FONT_FILE_EXTENSION: &str = "bfont";

type FontMap = BTreeMap<u32, BTreeMap<FontParams, Arc<Font>>>;

/// Owns every font and the services used to build them
pub struct FontSystem {
    config: FontSystemConfig,
    provider: Arc<dyn RasterizationProvider>,
    codec: Arc<dyn CompressionCodec>,
    fonts: ReentrantMutex<RefCell<FontMap>>,
    cache_dir: RwLock<Option<PathBuf>>,
    default_font: RwLock<Option<Arc<Font>>>,
}

impl FontSystem {
    pub fn new(config: FontSystemConfig, provider: Arc<dyn RasterizationProvider>) -> Self {
        Self::with_codec(config, provider, Arc::new(ZlibCodec::new()))
    }

    pub fn with_codec(
        config: FontSystemConfig,
        provider: Arc<dyn RasterizationProvider>,
        codec: Arc<dyn CompressionCodec>,
    ) -> Self {
        let system = Self {
            provider,
            codec,
            fonts: ReentrantMutex::new(RefCell::new(BTreeMap::new())),
            cache_dir: RwLock::new(None),
            default_font: RwLock::new(None),
            config,
        };

        if let Some(dir) = system.config.cache_dir.clone() {
            if !system.set_cache_folder(&dir) {
                tracing::warn!("Font cache folder {} does not exist", dir.display());
            }
        }
        if let Some(params) = system.config.default_font.clone() {
            system.set_default_font(&params);
        }
        system
    }

    pub fn config(&self) -> &FontSystemConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn RasterizationProvider> {
        &self.provider
    }

    pub fn codec(&self) -> &dyn CompressionCodec {
        self.codec.as_ref()
    }

    /// Line height in pixels these parameters resolve to
    pub fn line_height(&self, params: &FontParams) -> u32 {
        params.line_height(self.config.measurement_unit)
    }

    /// Point the disk cache at `dir`
    ///
    /// Returns `false` and disables disk caching if the directory does not
    /// exist.
    pub fn set_cache_folder(&self, dir: impl AsRef<Path>) -> bool {
        let dir = dir.as_ref();
        let exists = dir.is_dir();
        *self.cache_dir.write() = exists.then(|| dir.to_path_buf());
        exists
    }

    pub fn cache_folder(&self) -> Option<PathBuf> {
        self.cache_dir.read().clone()
    }

    pub fn caching_enabled(&self) -> bool {
        self.config.caching && self.cache_dir.read().is_some()
    }

    /// Cache file name for a font, e.g. `verdana_20_400_1_i.bfont`
    pub fn cache_file_name(params: &FontParams, height: u32) -> String {
        let face: String = params
            .facename
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();

        let mut name = format!("{}_{}_{}_{}", face, height, params.weight, params.tracking);
        if params.italic {
            name.push_str("_i");
        }
        if params.is_fixed_width() {
            name.push_str(&format!("_f{}", params.fixed_width));
        }
        name.push('.');
        name.push_str(FONT_FILE_EXTENSION);
        name
    }

    /// Where a font would be cached, if caching applies to it
    pub fn cache_path(&self, params: &FontParams) -> Option<PathBuf> {
        if !self.config.caching || params.symbolic {
            return None;
        }
        let dir = self.cache_dir.read().clone()?;
        Some(dir.join(Self::cache_file_name(params, self.line_height(params))))
    }

    /// Font for the given parameters, creating it on first request
    ///
    /// Every later call with equal parameters returns the same font.
    pub fn get_font(&self, params: &FontParams) -> Arc<Font> {
        let height = self.line_height(params);
        let fonts = self.fonts.lock();

        let existing = fonts
            .borrow()
            .get(&height)
            .and_then(|sizes| sizes.get(params))
            .cloned();
        if let Some(font) = existing {
            return font;
        }

        let font = Arc::new(self.create_font(params, height));
        fonts
            .borrow_mut()
            .entry(height)
            .or_default()
            .insert(params.clone(), Arc::clone(&font));
        font
    }

    fn create_font(&self, params: &FontParams, height: u32) -> Font {
        let cache_path = self.cache_path(params);

        if let Some(path) = cache_path.as_deref().filter(|p| p.exists()) {
            match self.load_cached(path, params, height) {
                Ok(Some(font)) => return font,
                Ok(None) => tracing::warn!(
                    "Ignoring cached font {}: parameters do not match",
                    path.display()
                ),
                Err(e) => tracing::warn!("Ignoring cached font {}: {}", path.display(), e),
            }
        }

        tracing::debug!(
            "Synthesizing font '{}' at {}px, weight {}",
            params.facename,
            height,
            params.weight
        );
        let font = Font::with_generator(params.clone(), height, Arc::clone(&self.provider));
        font.set_kerning_enabled(self.config.kerning);

        if let Some(path) = cache_path {
            if let Err(e) = font.save(&path, self.codec.as_ref()) {
                tracing::warn!("Could not cache font {}: {}", path.display(), e);
            }
        }
        font
    }

    fn load_cached(&self, path: &Path, params: &FontParams, height: u32) -> Result<Option<Font>> {
        let bytes = std::fs::read(path)?;
        let image = file::decode(&bytes, self.codec.as_ref())?;

        let header = &image.header;
        let matches = header.height == height
            && header.facename == params.facename
            && header.weight == params.weight
            && header.tracking == params.tracking
            && header.fixed_width == params.fixed_width
            && header.italic == params.italic;
        if !matches {
            return Ok(None);
        }

        let mut font = Font::from_image(image, Some(Arc::clone(&self.provider)));
        font.rebind(params.clone());
        font.set_kerning_enabled(self.config.kerning);
        tracing::debug!("Loaded cached font {}", path.display());
        Ok(Some(font))
    }

    /// Load a font file and register it under the parameters it stores
    pub fn load_font(&self, path: impl AsRef<Path>) -> Result<Arc<Font>> {
        let font = Font::load_with_provider(path, self.codec.as_ref(), None)?;
        font.set_kerning_enabled(self.config.kerning);
        let params = font.params().clone();
        let height = font.height();

        let font = Arc::new(font);
        let fonts = self.fonts.lock();
        fonts
            .borrow_mut()
            .entry(height)
            .or_default()
            .insert(params, Arc::clone(&font));
        Ok(font)
    }

    /// Create (or fetch) a font and make it the default
    pub fn set_default_font(&self, params: &FontParams) -> Arc<Font> {
        let font = self.get_font(params);
        *self.default_font.write() = Some(Arc::clone(&font));
        font
    }

    pub fn default_font(&self) -> Option<Arc<Font>> {
        self.default_font.read().clone()
    }

    /// Distinct facenames of every live font
    pub fn font_names(&self) -> Vec<String> {
        let fonts = self.fonts.lock();
        let mut names: Vec<String> = fonts
            .borrow()
            .values()
            .flat_map(|sizes| sizes.keys().map(|p| p.facename.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Line heights that have a live font with this facename
    pub fn available_sizes(&self, facename: &str) -> Vec<u32> {
        let fonts = self.fonts.lock();
        let sizes = fonts
            .borrow()
            .iter()
            .filter(|(_, fonts)| fonts.keys().any(|p| p.facename == facename))
            .map(|(&height, _)| height)
            .collect();
        sizes
    }

    /// Facenames the rasterization provider offers
    pub fn provider_facenames(&self) -> Vec<String> {
        self.provider.facenames()
    }

    pub fn font_count(&self) -> usize {
        let fonts = self.fonts.lock();
        let count = fonts.borrow().values().map(BTreeMap::len).sum();
        count
    }

    /// Forget every font; fonts still held elsewhere stay usable
    pub fn clear(&self) {
        let fonts = self.fonts.lock();
        fonts.borrow_mut().clear();
        *self.default_font.write() = None;
    }
}

impl std::fmt::Debug for FontSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSystem")
            .field("fonts", &self.font_count())
            .field("cache_dir", &self.cache_folder())
            .field("caching", &self.config.caching)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::SyntheticRasterizer;

    fn system() -> FontSystem {
        FontSystem::new(FontSystemConfig::headless(), Arc::new(SyntheticRasterizer::new()))
    }

    #[test]
    fn test_same_params_same_font() {
        let system = system();
        let a = system.get_font(&FontParams::new("Test", 20.0, 400));
        let b = system.get_font(&FontParams::new("Test", 20.0, 400));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(system.font_count(), 1);

        let c = system.get_font(&FontParams::new("Test", 20.0, 700));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(system.font_count(), 2);
    }

    #[test]
    fn test_measurement_unit_scales_height() {
        let config = FontSystemConfig::headless().with_measurement_unit(720.0);
        let system = FontSystem::new(config, Arc::new(SyntheticRasterizer::new()));
        let font = system.get_font(&FontParams::new("Test", 0.05, 400));
        assert_eq!(font.height(), 36);
    }

    #[test]
    fn test_cache_file_name() {
        let params = FontParams::new("Times New Roman", 20.0, 700).italic();
        assert_eq!(
            FontSystem::cache_file_name(&params, 20),
            "times_new_roman_20_700_1_i.bfont"
        );
        let fixed = FontParams::new("Mono", 10.0, 400).with_fixed_width(7).with_tracking(0);
        assert_eq!(FontSystem::cache_file_name(&fixed, 10), "mono_10_400_0_f7.bfont");
    }

    #[test]
    fn test_missing_cache_folder_disables_caching() {
        let system = FontSystem::new(FontSystemConfig::standard(), Arc::new(SyntheticRasterizer::new()));
        assert!(!system.set_cache_folder("/definitely/not/a/dir"));
        assert!(!system.caching_enabled());
        assert_eq!(system.cache_path(&FontParams::new("Test", 20.0, 400)), None);
    }

    #[test]
    fn test_names_and_sizes() {
        let system = system();
        system.get_font(&FontParams::new("Beta", 12.0, 400));
        system.get_font(&FontParams::new("Alpha", 20.0, 400));
        system.get_font(&FontParams::new("Alpha", 12.0, 700));
        assert_eq!(system.font_names(), vec!["Alpha", "Beta"]);
        assert_eq!(system.available_sizes("Alpha"), vec![12, 20]);
        assert!(system.available_sizes("Gamma").is_empty());
        assert_eq!(system.provider_facenames(), vec!["Synthetic"]);
    }

    #[test]
    fn test_default_font_and_clear() {
        let system = system();
        assert!(system.default_font().is_none());
        let font = system.set_default_font(&FontParams::new("Test", 16.0, 400));
        assert!(Arc::ptr_eq(&font, &system.default_font().unwrap()));

        system.clear();
        assert_eq!(system.font_count(), 0);
        assert!(system.default_font().is_none());
        // a font handed out earlier keeps working
        assert!(font.string_width("ok") > 0);
    }

    #[test]
    fn test_kerning_setting_applies_to_new_fonts() {
        let mut config = FontSystemConfig::headless();
        config.kerning = false;
        let system = FontSystem::new(config, Arc::new(SyntheticRasterizer::new()));
        assert!(!system.get_font(&FontParams::new("Test", 20.0, 400)).kerning_enabled());
    }
}
