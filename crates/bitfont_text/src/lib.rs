//! Bitmap text rendering for bitfont
//!
//! This crate provides:
//! - Run-length glyph encoding (8-bit coverage spans)
//! - A compressed binary font file format
//! - On-demand glyph generation through a pluggable rasterization provider
//! - Kerning inferred from glyph pixels
//! - Word wrapping and paragraph alignment
//! - Plain, clipped and vertical-gradient compositing onto ARGB buffers
//! - A font system that caches fonts in memory and on disk
//!
//! # Example
//!
//! ```rust
//! use bitfont_core::{PixelBuffer, Rect};
//! use bitfont_text::{FontParams, FontSystem, FontSystemConfig, SyntheticRasterizer, TextLook};
//! use std::sync::Arc;
//!
//! let system = FontSystem::new(FontSystemConfig::headless(), Arc::new(SyntheticRasterizer::new()));
//! let font = system.get_font(&FontParams::new("Test", 20.0, 400));
//!
//! let mut surface = PixelBuffer::new(100, 50);
//! font.draw_text(&mut surface, "Hi", Rect::new(0, 0, 100, 50), &TextLook::default(), None);
//! ```

pub mod codec;
pub mod compositor;
pub mod compression;
pub mod config;
pub mod file;
pub mod font;
pub mod generator;
pub mod gradient;
pub mod kerning;
pub mod layout;
pub mod params;
pub mod rasterizer;
pub mod style;
pub mod system;

#[cfg(test)]
mod tests;

pub use codec::{Span, MAX_RUN};
pub use compression::{CompressionCodec, ZlibCodec};
pub use config::FontSystemConfig;
pub use font::{Font, Glyph, GLYPH_COUNT, KERN_UNSET};
pub use params::{FontParams, FontWeight};
pub use rasterizer::{
    FaceRequest, GlyphCanvas, RasterizationProvider, SyntheticRasterizer, SystemRasterizer,
};
pub use style::{Alignment, Decoration, TextLook, TextStyle};
pub use system::FontSystem;

use thiserror::Error;

/// Text rendering errors
#[derive(Error, Debug)]
pub enum TextError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a bitfont file (bad header)")]
    BadMagic,

    #[error("Corrupt font data: {0}")]
    CorruptFont(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Glyph {code} needs {bytes} span bytes, more than the file format can store")]
    GlyphTooLarge { code: u8, bytes: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),
}

pub type Result<T> = std::result::Result<T, TextError>;
