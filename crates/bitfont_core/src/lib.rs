//! Bitfont Core
//!
//! Pixel-level primitives shared by the bitfont crates:
//!
//! - **Color**: packed 32-bit ARGB values and the blend rules used by text
//!   compositing
//! - **Rect**: integer pixel rectangles (left/top inclusive, right/bottom
//!   exclusive)
//! - **PixelBuffer**: a row-major ARGB destination surface with a known stride
//!
//! # Example
//!
//! ```rust
//! use bitfont_core::{Color, PixelBuffer, Rect};
//!
//! let mut buffer = PixelBuffer::new(64, 32);
//! buffer.fill(Rect::new(0, 0, 64, 32), Color::BLACK);
//! buffer.set_pixel(3, 4, Color::WHITE);
//! assert_eq!(buffer.get_pixel(3, 4), Some(Color::WHITE));
//! ```

pub mod buffer;
pub mod color;
pub mod geometry;

pub use buffer::{PixelBuffer, SharedBuffer};
pub use color::{alpha_blend_add_alpha, Color};
pub use geometry::Rect;
