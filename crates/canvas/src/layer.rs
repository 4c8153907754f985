//! A single editable pixel plane with a cached renderable form.

use crate::buffer::PixelBuffer;
use common::Color;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable handle identifying a layer for its whole lifetime.
///
/// Ids are minted from a process-wide counter so they stay unique across
/// every frame's layer list; undo history is keyed by them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        LayerId(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A named, visibility-tagged pixel plane within a frame.
///
/// The layer keeps an 8-bit RGBA render target that external UI code reads;
/// it is rebuilt lazily behind a dirty flag by
/// [`apply_to_render_target`](Layer::apply_to_render_target).
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    pub visible: bool,
    /// Stored per layer but not applied by the composite blend.
    pub opacity: f32,
    buffer: PixelBuffer,
    render_target: Vec<u8>,
    dirty: bool,
}

impl Layer {
    pub fn new(size: usize, name: impl Into<String>) -> Self {
        let buffer = PixelBuffer::new(size);
        let side = buffer.size();
        Self {
            id: LayerId::next(),
            name: name.into(),
            visible: true,
            opacity: 1.0,
            buffer,
            render_target: vec![0; side * side * 4],
            dirty: true,
        }
    }

    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.buffer.size()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Color {
        self.buffer.get(x, y)
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        self.buffer.set(x, y, color);
        self.dirty = true;
    }

    pub fn set_all(&mut self, pixels: &[Color]) {
        self.buffer.set_all(pixels);
        self.dirty = true;
    }

    pub fn get_all(&self) -> Vec<Color> {
        self.buffer.get_all()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.dirty = true;
    }

    #[inline]
    pub fn pixels(&self) -> &[Color] {
        self.buffer.as_slice()
    }

    /// Materialize pixel state into the render target if anything changed
    /// since the last call. Idempotent.
    pub fn apply_to_render_target(&mut self) {
        if !self.dirty {
            return;
        }
        for (chunk, color) in self
            .render_target
            .chunks_exact_mut(4)
            .zip(self.buffer.as_slice())
        {
            chunk.copy_from_slice(&color.to_rgba8());
        }
        self.dirty = false;
    }

    /// The cached 8-bit RGBA form. Call
    /// [`apply_to_render_target`](Layer::apply_to_render_target) after a
    /// batch of writes before reading this.
    #[inline]
    pub fn render_target(&self) -> &[u8] {
        &self.render_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = Layer::new(8, "a");
        let b = Layer::new(8, "b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_render_target_rebuilds_when_dirty() {
        let mut layer = Layer::new(8, "Layer 1");
        layer.set(0, 0, Color::WHITE);
        layer.apply_to_render_target();
        assert_eq!(&layer.render_target()[..4], &[255, 255, 255, 255]);

        layer.set(0, 0, Color::RED);
        layer.apply_to_render_target();
        assert_eq!(&layer.render_target()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut layer = Layer::new(8, "Layer 1");
        layer.set(1, 1, Color::BLUE);
        layer.apply_to_render_target();
        let first = layer.render_target().to_vec();
        layer.apply_to_render_target();
        assert_eq!(layer.render_target(), first.as_slice());
    }
}
