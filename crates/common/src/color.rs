//! Color representation and blending.

use serde::{Deserialize, Serialize};

/// RGBA color with normalized f32 components.
///
/// Channels are nominally in `[0, 1]`. No clamping is enforced on
/// construction; blending assumes normalized input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const CLEAR: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::opaque(1.0, 1.0, 1.0);
    pub const RED: Color = Color::opaque(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::opaque(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::opaque(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::opaque(1.0, 1.0, 0.0);
    pub const CYAN: Color = Color::opaque(0.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::opaque(1.0, 0.0, 1.0);
    pub const GRAY: Color = Color::opaque(0.5, 0.5, 0.5);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Linear interpolation per channel.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Blend this color over a background using standard alpha compositing.
    pub fn blend_over(self, background: Color) -> Color {
        let out_a = self.a + background.a * (1.0 - self.a);

        if out_a <= 0.0 {
            return Color::CLEAR;
        }

        let blend = |fg: f32, bg: f32| -> f32 {
            (fg * self.a + bg * background.a * (1.0 - self.a)) / out_a
        };

        Color::new(
            blend(self.r, background.r),
            blend(self.g, background.g),
            blend(self.b, background.b),
            out_a,
        )
    }

    /// Sum of absolute per-channel differences, across all four channels.
    #[inline]
    pub fn diff_sum(self, other: Color) -> f32 {
        (self.r - other.r).abs()
            + (self.g - other.g).abs()
            + (self.b - other.b).abs()
            + (self.a - other.a).abs()
    }

    /// Convert to 8-bit RGBA, clamping each channel into range.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |c: f32| -> u8 { (c.clamp(0.0, 1.0) * 255.0).round() as u8 };
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }

    /// Create from 8-bit RGBA components.
    #[inline]
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::new(
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
            rgba[3] as f32 / 255.0,
        )
    }

    /// Channel-wise equality within a tolerance.
    #[inline]
    pub fn approx_eq(self, other: Color, epsilon: f32) -> bool {
        (self.r - other.r).abs() <= epsilon
            && (self.g - other.g).abs() <= epsilon
            && (self.b - other.b).abs() <= epsilon
            && (self.a - other.a).abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert!(mid.approx_eq(Color::opaque(0.5, 0.5, 0.5), 1e-6));
        assert!(Color::BLACK.lerp(Color::WHITE, 0.0).approx_eq(Color::BLACK, 1e-6));
        assert!(Color::BLACK.lerp(Color::WHITE, 1.0).approx_eq(Color::WHITE, 1e-6));
    }

    #[test]
    fn test_blend_opaque_top_wins() {
        let out = Color::BLUE.blend_over(Color::RED);
        assert!(out.approx_eq(Color::BLUE, 1e-6));
    }

    #[test]
    fn test_blend_half_alpha() {
        let top = Color::new(0.0, 0.0, 1.0, 0.5);
        let out = top.blend_over(Color::RED);
        assert!(out.approx_eq(Color::new(0.5, 0.0, 0.5, 1.0), 1e-6));
    }

    #[test]
    fn test_blend_both_transparent() {
        let out = Color::CLEAR.blend_over(Color::CLEAR);
        assert_eq!(out, Color::CLEAR);
    }

    #[test]
    fn test_rgba8_round_trip() {
        let c = Color::new(0.25, 0.5, 0.75, 1.0);
        let back = Color::from_rgba8(c.to_rgba8());
        assert!(back.approx_eq(c, 1.0 / 255.0));
    }
}
