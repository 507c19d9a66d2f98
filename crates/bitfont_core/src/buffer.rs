//! ARGB pixel buffers
//!
//! A `PixelBuffer` is the destination surface for text compositing: a
//! row-major block of packed ARGB pixels whose stride equals its width.
//! Sharing a buffer across threads goes through [`SharedBuffer`]; whoever
//! holds the lock owns the pixels for the duration of a draw call.

use crate::{Color, Rect};
use parking_lot::Mutex;
use std::sync::Arc;

/// A buffer shared between threads behind its own lock
pub type SharedBuffer = Arc<Mutex<PixelBuffer>>;

/// Row-major ARGB surface
#[derive(Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Create a zeroed (fully transparent black) buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Wrap existing pixels; returns `None` if the length does not match
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Move this buffer behind a lock
    pub fn into_shared(self) -> SharedBuffer {
        Arc::new(Mutex::new(self))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Distance in pixels between the starts of two consecutive rows
    pub fn stride(&self) -> usize {
        self.width as usize
    }

    /// The whole surface as a rect at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i64, self.height as i64)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.stride() + x as usize)
    }

    pub fn get_pixel(&self, x: i64, y: i64) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Write one pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Fill a rect (clipped to the surface) with a solid color
    pub fn fill(&mut self, rect: Rect, color: Color) {
        let area = rect.intersect(&self.bounds());
        if area.is_empty() {
            return;
        }
        let stride = self.stride();
        for y in area.top..area.bottom {
            let row = y as usize * stride;
            self.pixels[row + area.left as usize..row + area.right as usize].fill(color);
        }
    }

    /// Reset every pixel to transparent black
    pub fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
    }

    /// Pixels as `RGBA8` bytes (for image encoders)
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgba8()).collect()
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("dimensions", &(self.width, self.height))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_transparent() {
        let buffer = PixelBuffer::new(8, 4);
        assert_eq!(buffer.pixels().len(), 32);
        assert!(buffer.pixels().iter().all(|&p| p == Color::TRANSPARENT));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.set_pixel(-1, 0, Color::WHITE);
        buffer.set_pixel(4, 0, Color::WHITE);
        assert_eq!(buffer.get_pixel(4, 0), None);
        assert!(buffer.pixels().iter().all(|&p| p == Color::TRANSPARENT));
    }

    #[test]
    fn test_fill_is_clipped() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.fill(Rect::new(2, 2, 10, 10), Color::RED);
        assert_eq!(buffer.get_pixel(3, 3), Some(Color::RED));
        assert_eq!(buffer.get_pixel(1, 3), Some(Color::TRANSPARENT));
        assert_eq!(buffer.pixels().iter().filter(|&&p| p == Color::RED).count(), 4);
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(PixelBuffer::from_pixels(2, 2, vec![Color::BLACK; 3]).is_none());
        assert!(PixelBuffer::from_pixels(2, 2, vec![Color::BLACK; 4]).is_some());
    }
}
