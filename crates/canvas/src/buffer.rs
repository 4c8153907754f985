//! Square pixel buffer with bounds-checked access.

use common::Color;

/// Smallest supported canvas side length.
pub const MIN_CANVAS_SIZE: usize = 8;
/// Largest supported canvas side length.
pub const MAX_CANVAS_SIZE: usize = 512;

/// A square grid of RGBA pixels.
///
/// Out-of-bounds reads return [`Color::CLEAR`]; out-of-bounds writes are
/// no-ops. Drawing code probes freely around the canvas edge and relies on
/// both.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    size: usize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Create a transparent buffer. `size` is clamped into
    /// `[MIN_CANVAS_SIZE, MAX_CANVAS_SIZE]`.
    pub fn new(size: usize) -> Self {
        let size = size.clamp(MIN_CANVAS_SIZE, MAX_CANVAS_SIZE);
        Self {
            size,
            pixels: vec![Color::CLEAR; size * size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.size as i32 || y < 0 || y >= self.size as i32 {
            return None;
        }
        Some(y as usize * self.size + x as usize)
    }

    /// Pixel at `(x, y)`, or transparent outside the canvas.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Color {
        match self.index(x, y) {
            Some(i) => self.pixels[i],
            None => Color::CLEAR,
        }
    }

    /// Write a pixel. Writes outside the canvas are dropped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Replace the whole pixel array. Silently ignored if the length does
    /// not match the canvas.
    pub fn set_all(&mut self, pixels: &[Color]) {
        if pixels.len() != self.pixels.len() {
            return;
        }
        self.pixels.copy_from_slice(pixels);
    }

    /// Fresh detached copy of the pixel array.
    pub fn get_all(&self) -> Vec<Color> {
        self.pixels.clone()
    }

    /// Fill fully transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::CLEAR);
    }

    #[inline]
    pub fn as_slice(&self) -> &[Color] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_round_trip() {
        let mut buf = PixelBuffer::new(8);
        buf.set(3, 5, Color::RED);
        assert_eq!(buf.get(3, 5), Color::RED);
    }

    #[test]
    fn test_out_of_bounds_get_is_clear() {
        let buf = PixelBuffer::new(8);
        assert_eq!(buf.get(-1, 0), Color::CLEAR);
        assert_eq!(buf.get(0, -1), Color::CLEAR);
        assert_eq!(buf.get(8, 0), Color::CLEAR);
        assert_eq!(buf.get(0, 8), Color::CLEAR);
    }

    #[test]
    fn test_out_of_bounds_set_is_noop() {
        let mut buf = PixelBuffer::new(8);
        let before = buf.get_all();
        buf.set(-1, 0, Color::RED);
        buf.set(8, 8, Color::RED);
        assert_eq!(buf.get_all(), before);
    }

    #[test]
    fn test_set_all_length_mismatch_ignored() {
        let mut buf = PixelBuffer::new(8);
        buf.set(0, 0, Color::GREEN);
        buf.set_all(&[Color::RED; 10]);
        assert_eq!(buf.get(0, 0), Color::GREEN);
    }

    #[test]
    fn test_clear() {
        let mut buf = PixelBuffer::new(8);
        buf.set(2, 2, Color::BLUE);
        buf.clear();
        assert_eq!(buf.get(2, 2), Color::CLEAR);
    }

    #[test]
    fn test_size_clamped() {
        assert_eq!(PixelBuffer::new(2).size(), MIN_CANVAS_SIZE);
        assert_eq!(PixelBuffer::new(4096).size(), MAX_CANVAS_SIZE);
    }

    #[test]
    fn test_get_all_is_detached() {
        let mut buf = PixelBuffer::new(8);
        let copy = buf.get_all();
        buf.set(0, 0, Color::RED);
        assert_eq!(copy[0], Color::CLEAR);
    }
}
