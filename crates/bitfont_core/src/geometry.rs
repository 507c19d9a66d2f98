//! Integer pixel rectangles

use serde::{Deserialize, Serialize};

/// Pixel rectangle; `left`/`top` inclusive, `right`/`bottom` exclusive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rect from an origin and a size
    pub const fn from_xywh(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub const fn width(&self) -> i64 {
        self.right - self.left
    }

    pub const fn height(&self) -> i64 {
        self.bottom - self.top
    }

    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub const fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// True when `other` lies entirely inside this rect
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Offset the rect by a delta
    pub const fn offset(&self, dx: i64, dy: i64) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    /// Shrink from all sides (never inverts)
    pub fn deflate(&self, dx: i64, dy: i64) -> Self {
        let left = self.left + dx;
        let top = self.top + dy;
        Self::new(
            left,
            top,
            (self.right - dx).max(left),
            (self.bottom - dy).max(top),
        )
    }

    /// Overlapping area of two rects; empty rects collapse to a zero-sized
    /// rect at this rect's clamped origin
    pub fn intersect(&self, other: &Rect) -> Self {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right).max(left);
        let bottom = self.bottom.min(other.bottom).max(top);
        Self::new(left, top, right, bottom)
    }

    /// Check if this rect overlaps another at any pixel
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersect(other).is_empty()
    }
}
