//! Packed ARGB colors

use serde::{Deserialize, Serialize};

/// A 32-bit color packed as `0xAARRGGBB`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffff_ffff);
    pub const BLACK: Color = Color(0xff00_0000);
    pub const RED: Color = Color(0xffff_0000);
    pub const GREEN: Color = Color(0xff00_ff00);
    pub const BLUE: Color = Color(0xff00_00ff);
    pub const YELLOW: Color = Color(0xffff_ff00);
    pub const GRAY: Color = Color(0xff80_8080);
    pub const TRANSPARENT: Color = Color(0x0000_0000);

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Opaque color from a `0xRRGGBB` value
    pub const fn from_hex(hex: u32) -> Self {
        Self(0xff00_0000 | (hex & 0x00ff_ffff))
    }

    /// Build from normalized float channels (0.0 - 1.0)
    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::argb(q(a), q(r), q(g), q(b))
    }

    pub const fn a(self) -> u32 {
        (self.0 >> 24) & 0xff
    }

    pub const fn r(self) -> u32 {
        (self.0 >> 16) & 0xff
    }

    pub const fn g(self) -> u32 {
        (self.0 >> 8) & 0xff
    }

    pub const fn b(self) -> u32 {
        self.0 & 0xff
    }

    /// Same RGB with a replaced alpha channel
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00ff_ffff) | ((alpha as u32) << 24))
    }

    /// Black carrying only this color's alpha
    pub const fn alpha_only(self) -> Self {
        Self(self.0 & 0xff00_0000)
    }

    /// Channels as `[r, g, b, a]` bytes
    pub const fn to_rgba8(self) -> [u8; 4] {
        [self.r() as u8, self.g() as u8, self.b() as u8, self.a() as u8]
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Color(value)
    }
}

impl std::fmt::LowerHex for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Blend `src` over `dst` weighted by `coverage` (0-255) scaled by the source
/// alpha. The resulting alpha is the saturated sum of both alphas.
#[inline]
pub fn alpha_blend_add_alpha(src: Color, dst: Color, coverage: u32) -> Color {
    let blend = (coverage * src.a()) >> 8;
    let inverse = 255 - blend;
    let alpha = (src.a() + dst.a()).min(0xff);

    let mix = |s: u32, d: u32| (s * blend + d * inverse) >> 8;
    Color(
        (alpha << 24)
            | (mix(src.r(), dst.r()) << 16)
            | (mix(src.g(), dst.g()) << 8)
            | mix(src.b(), dst.b()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let c = Color::argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x1234_5678);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x12, 0x34, 0x56, 0x78));
        assert_eq!(c.with_alpha(0xff).0, 0xff34_5678);
        assert_eq!(c.alpha_only().0, 0x1200_0000);
    }

    #[test]
    fn test_from_f32_rounds_and_clamps() {
        assert_eq!(Color::from_f32(1.0, 0.0, 2.0, 1.0), Color(0xffff_00ff));
        assert_eq!(Color::from_f32(0.5, 0.5, 0.5, -1.0).a(), 0);
    }

    #[test]
    fn test_blend_full_coverage_keeps_mostly_source() {
        let out = alpha_blend_add_alpha(Color::WHITE, Color::BLACK, 255);
        // (255 * 254) >> 8 == 253
        assert_eq!(out.r(), 253);
        assert_eq!(out.a(), 0xff);
    }

    #[test]
    fn test_blend_zero_coverage_keeps_destination() {
        let dst = Color::argb(0x40, 10, 20, 30);
        let out = alpha_blend_add_alpha(Color::WHITE, dst, 0);
        assert_eq!((out.r(), out.g(), out.b()), (9, 19, 29));
        assert_eq!(out.a(), 0xff);
    }

    #[test]
    fn test_blend_transparent_source_adds_no_color() {
        let dst = Color::argb(0, 100, 100, 100);
        let out = alpha_blend_add_alpha(Color::TRANSPARENT, dst, 200);
        assert_eq!(out.a(), 0);
        assert_eq!(out.r(), (100 * 255) >> 8);
    }
}
