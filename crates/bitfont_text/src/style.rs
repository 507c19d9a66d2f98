//! Text looks and paragraph styles

use bitfont_core::Color;
use serde::{Deserialize, Serialize};

/// Layering applied around the real text pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    #[default]
    Normal,
    /// Dark copy offset down-right underneath the text
    Shadowed,
    /// Dark copy down-right and light copy up-left underneath the text
    Embossed,
}

/// Colors and decoration for one draw call
///
/// `top` and `bottom` are the endpoints of the vertical gradient; equal
/// colors draw flat text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLook {
    pub decoration: Decoration,
    pub top: Color,
    pub bottom: Color,
}

impl TextLook {
    pub const fn new(decoration: Decoration, top: Color, bottom: Color) -> Self {
        Self {
            decoration,
            top,
            bottom,
        }
    }

    /// Flat single-color look
    pub const fn solid(color: Color) -> Self {
        Self::new(Decoration::Normal, color, color)
    }

    pub const fn is_gradient(&self) -> bool {
        self.top.0 != self.bottom.0
    }
}

impl Default for TextLook {
    fn default() -> Self {
        Self::solid(Color::WHITE)
    }
}

/// Placement of text inside a rect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    /// Centered while the text fits, top anchored once it overflows
    Fit,
}

/// Horizontal placement of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical placement of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VAlign {
    Top,
    Middle,
    Bottom,
}

impl Alignment {
    pub(crate) fn horizontal(self) -> HAlign {
        match self {
            Alignment::TopLeft | Alignment::MiddleLeft | Alignment::BottomLeft => HAlign::Left,
            Alignment::TopCenter
            | Alignment::MiddleCenter
            | Alignment::BottomCenter
            | Alignment::Fit => HAlign::Center,
            Alignment::TopRight | Alignment::MiddleRight | Alignment::BottomRight => HAlign::Right,
        }
    }

    /// Vertical placement; `Fit` depends on whether the content overflows
    pub(crate) fn vertical(self, overflows: bool) -> VAlign {
        match self {
            Alignment::TopLeft | Alignment::TopCenter | Alignment::TopRight => VAlign::Top,
            Alignment::MiddleLeft | Alignment::MiddleCenter | Alignment::MiddleRight => {
                VAlign::Middle
            }
            Alignment::BottomLeft | Alignment::BottomCenter | Alignment::BottomRight => {
                VAlign::Bottom
            }
            Alignment::Fit if overflows => VAlign::Top,
            Alignment::Fit => VAlign::Middle,
        }
    }

    /// Parse names like "top_left", "middle-center" or "fit"
    pub fn from_name(name: &str) -> Option<Self> {
        let alignment = match name.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "top_left" => Alignment::TopLeft,
            "top_center" => Alignment::TopCenter,
            "top_right" => Alignment::TopRight,
            "middle_left" => Alignment::MiddleLeft,
            "middle_center" | "center" => Alignment::MiddleCenter,
            "middle_right" => Alignment::MiddleRight,
            "bottom_left" => Alignment::BottomLeft,
            "bottom_center" => Alignment::BottomCenter,
            "bottom_right" => Alignment::BottomRight,
            "fit" => Alignment::Fit,
            _ => return None,
        };
        Some(alignment)
    }
}

/// Look plus paragraph placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub look: TextLook,
    pub alignment: Alignment,
    /// Inset applied to every side of the target rect
    pub padding: i64,
}

impl TextStyle {
    pub const fn new(look: TextLook, alignment: Alignment) -> Self {
        Self {
            look,
            alignment,
            padding: 0,
        }
    }

    pub const fn with_padding(mut self, padding: i64) -> Self {
        self.padding = padding;
        self
    }
}
