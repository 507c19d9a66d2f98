//! Font identity parameters

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tallest line a font may have
///
/// Glyphs this tall can still need more span bytes than a font file stores
/// per glyph, in which case saving fails with `TextError::GlyphTooLarge`.
pub const MAX_LINE_HEIGHT: u32 = 4096;

/// Font weight variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    Thin = 100,
    ExtraLight = 200,
    Light = 300,
    #[default]
    Regular = 400,
    Medium = 500,
    SemiBold = 600,
    Bold = 700,
    ExtraBold = 800,
    Black = 900,
}

impl FontWeight {
    /// Convert from numeric weight (100-900)
    pub fn from_number(weight: u16) -> Self {
        match weight {
            0..=149 => FontWeight::Thin,
            150..=249 => FontWeight::ExtraLight,
            250..=349 => FontWeight::Light,
            350..=449 => FontWeight::Regular,
            450..=549 => FontWeight::Medium,
            550..=649 => FontWeight::SemiBold,
            650..=749 => FontWeight::Bold,
            750..=849 => FontWeight::ExtraBold,
            _ => FontWeight::Black,
        }
    }

    /// Get numeric weight value
    pub fn to_number(self) -> u16 {
        self as u16
    }

    /// Parse a weight name such as "bold" or "semibold"
    pub fn from_name(name: &str) -> Option<Self> {
        let weight = match name.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "thin" => FontWeight::Thin,
            "extralight" => FontWeight::ExtraLight,
            "light" => FontWeight::Light,
            "regular" | "normal" => FontWeight::Regular,
            "medium" => FontWeight::Medium,
            "semibold" => FontWeight::SemiBold,
            "bold" => FontWeight::Bold,
            "extrabold" => FontWeight::ExtraBold,
            "black" => FontWeight::Black,
            _ => return None,
        };
        Some(weight)
    }
}

/// Everything that identifies one rasterized font
///
/// `scale` is measured in the font system's measurement unit; with the
/// default unit of one pixel it is the line height in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontParams {
    pub facename: String,
    pub scale: f32,
    pub weight: u16,
    /// Extra pixels between every pair of glyphs
    pub tracking: i32,
    /// Advance of every glyph in pixels; 0 for proportional fonts
    pub fixed_width: u32,
    pub italic: bool,
    /// Symbol charset; disables kerning and disk caching
    pub symbolic: bool,
}

impl FontParams {
    pub fn new(facename: impl Into<String>, scale: f32, weight: u16) -> Self {
        Self {
            facename: facename.into(),
            scale,
            weight,
            ..Self::default()
        }
    }

    pub fn with_tracking(mut self, tracking: i32) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn with_fixed_width(mut self, fixed_width: u32) -> Self {
        self.fixed_width = fixed_width;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn symbolic(mut self) -> Self {
        self.symbolic = true;
        self
    }

    /// Line height in pixels for a given measurement unit, clamped to
    /// `1..=MAX_LINE_HEIGHT`
    pub fn line_height(&self, unit: f32) -> u32 {
        let height = (self.scale * unit).round();
        if height.is_finite() && height >= 1.0 {
            (height as u32).min(MAX_LINE_HEIGHT)
        } else {
            1
        }
    }

    pub fn is_fixed_width(&self) -> bool {
        self.fixed_width > 0
    }
}

impl Default for FontParams {
    fn default() -> Self {
        Self {
            facename: String::new(),
            scale: 0.0,
            weight: FontWeight::Regular.to_number(),
            tracking: 1,
            fixed_width: 0,
            italic: false,
            symbolic: false,
        }
    }
}

impl Ord for FontParams {
    fn cmp(&self, other: &Self) -> Ordering {
        self.facename
            .cmp(&other.facename)
            .then_with(|| self.scale.total_cmp(&other.scale))
            .then_with(|| self.weight.cmp(&other.weight))
            .then_with(|| self.tracking.cmp(&other.tracking))
            .then_with(|| self.fixed_width.cmp(&other.fixed_width))
            .then_with(|| self.italic.cmp(&other.italic))
            .then_with(|| self.symbolic.cmp(&other.symbolic))
    }
}

impl PartialOrd for FontParams {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FontParams {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FontParams {}
