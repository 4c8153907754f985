//! One timeline step: a stack of layers and their cached composite.

use crate::layer::Layer;
use common::Color;

/// Whole-layer pixel remaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerTransform {
    FlipHorizontal,
    FlipVertical,
    Rotate90,
}

/// A stack of layers plus an active-layer pointer.
///
/// The flattened composite of all visible layers is cached and rebuilt
/// lazily; any pixel write through the frame marks it dirty.
#[derive(Debug)]
pub struct Frame {
    layers: Vec<Layer>,
    active_layer_index: usize,
    composite: Option<Vec<Color>>,
    dirty: bool,
}

impl Frame {
    /// New frame with a single transparent "Layer 1".
    pub fn new(size: usize) -> Self {
        Self {
            layers: vec![Layer::new(size, "Layer 1")],
            active_layer_index: 0,
            composite: None,
            dirty: true,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.layers[0].size()
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn active_layer_index(&self) -> usize {
        self.active_layer_index
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Mutable access to a layer. Conservatively marks the composite dirty.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.dirty = true;
        self.layers.get_mut(index)
    }

    pub fn active_layer(&self) -> &Layer {
        &self.layers[self.active_layer_index]
    }

    /// Mutable access to the active layer. Marks the composite dirty.
    pub fn active_layer_mut(&mut self) -> &mut Layer {
        self.dirty = true;
        &mut self.layers[self.active_layer_index]
    }

    /// Select the active layer. No-op outside `[0, layer_count)`.
    pub fn set_active_layer(&mut self, index: usize) {
        if index < self.layers.len() {
            self.active_layer_index = index;
        }
    }

    /// Insert a new transparent layer above the active one and select it.
    pub fn add_layer(&mut self, name: impl Into<String>) -> &Layer {
        let size = self.size();
        let index = self.active_layer_index + 1;
        self.layers.insert(index, Layer::new(size, name));
        self.active_layer_index = index;
        self.dirty = true;
        &self.layers[index]
    }

    /// Remove the active layer. Refused when it is the only one; returns the
    /// removed layer otherwise.
    pub fn remove_active_layer(&mut self) -> Option<Layer> {
        if self.layers.len() <= 1 {
            return None;
        }
        let removed = self.layers.remove(self.active_layer_index);
        if self.active_layer_index >= self.layers.len() {
            self.active_layer_index = self.layers.len() - 1;
        }
        self.dirty = true;
        Some(removed)
    }

    /// Pixel of the active layer, transparent outside the canvas.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        self.layers[self.active_layer_index].get(x, y)
    }

    /// Write a pixel of the active layer. No-op outside the canvas.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.layers[self.active_layer_index].set(x, y, color);
        self.dirty = true;
    }

    /// Replace the active layer's pixels. Ignored on length mismatch.
    pub fn set_pixels(&mut self, pixels: &[Color]) {
        self.layers[self.active_layer_index].set_all(pixels);
        self.dirty = true;
    }

    /// Detached copy of the active layer's pixels.
    pub fn get_pixels(&self) -> Vec<Color> {
        self.layers[self.active_layer_index].get_all()
    }

    /// Clear the active layer.
    pub fn clear(&mut self) {
        self.layers[self.active_layer_index].clear();
        self.dirty = true;
    }

    /// Rebuild every layer's render target.
    pub fn apply_all_render_targets(&mut self) {
        for layer in &mut self.layers {
            layer.apply_to_render_target();
        }
    }

    /// Force a composite rebuild on next read.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// The flattened result of all visible layers, bottom to top, cached
    /// until a write marks it dirty.
    pub fn composite(&mut self) -> &[Color] {
        if self.dirty || self.composite.is_none() {
            self.rebuild_composite();
        }
        self.composite.get_or_insert_with(Vec::new)
    }

    fn rebuild_composite(&mut self) {
        let size = self.size();
        let mut pixels = vec![Color::CLEAR; size * size];

        for layer in &self.layers {
            if !layer.visible {
                continue;
            }
            for (acc, &top) in pixels.iter_mut().zip(layer.pixels()) {
                *acc = top.blend_over(*acc);
            }
        }

        self.composite = Some(pixels);
        self.dirty = false;
    }

    /// Remap the active layer's pixels by a whole-layer transform.
    pub fn apply_transform(&mut self, transform: LayerTransform) {
        let size = self.size() as i32;
        let pixels = self.get_pixels();
        let mut out = vec![Color::CLEAR; pixels.len()];

        for y in 0..size {
            for x in 0..size {
                let src = (y * size + x) as usize;
                let dst = match transform {
                    LayerTransform::FlipHorizontal => y * size + (size - 1 - x),
                    LayerTransform::FlipVertical => (size - 1 - y) * size + x,
                    LayerTransform::Rotate90 => x * size + (size - 1 - y),
                } as usize;
                out[dst] = pixels[src];
            }
        }

        self.set_pixels(&out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_has_layer_one() {
        let frame = Frame::new(8);
        assert_eq!(frame.layer_count(), 1);
        assert_eq!(frame.active_layer().name, "Layer 1");
    }

    #[test]
    fn test_composite_opaque_layers_top_wins() {
        let mut frame = Frame::new(8);
        frame.set_pixels(&vec![Color::RED; 64]);
        frame.add_layer("Layer 2");
        frame.set_pixels(&vec![Color::BLUE; 64]);

        let out = frame.composite()[0];
        assert!(out.approx_eq(Color::BLUE, 1e-6));
    }

    #[test]
    fn test_composite_half_alpha_top() {
        let mut frame = Frame::new(8);
        frame.set_pixels(&vec![Color::RED; 64]);
        frame.add_layer("Layer 2");
        frame.set_pixels(&vec![Color::new(0.0, 0.0, 1.0, 0.5); 64]);

        let out = frame.composite()[0];
        assert!(out.approx_eq(Color::new(0.5, 0.0, 0.5, 1.0), 1e-6));
    }

    #[test]
    fn test_composite_skips_hidden_layers() {
        let mut frame = Frame::new(8);
        frame.set_pixels(&vec![Color::RED; 64]);
        frame.add_layer("Layer 2");
        frame.set_pixels(&vec![Color::BLUE; 64]);
        frame.active_layer_mut().visible = false;

        let out = frame.composite()[0];
        assert!(out.approx_eq(Color::RED, 1e-6));
    }

    #[test]
    fn test_composite_cache_invalidation() {
        let mut frame = Frame::new(8);
        assert_eq!(frame.composite()[0], Color::CLEAR);
        frame.set_pixel(0, 0, Color::GREEN);
        assert!(frame.composite()[0].approx_eq(Color::GREEN, 1e-6));
    }

    #[test]
    fn test_remove_last_layer_refused() {
        let mut frame = Frame::new(8);
        assert!(frame.remove_active_layer().is_none());
        frame.add_layer("Layer 2");
        assert!(frame.remove_active_layer().is_some());
        assert_eq!(frame.layer_count(), 1);
    }

    #[test]
    fn test_remove_clamps_active_index() {
        let mut frame = Frame::new(8);
        frame.add_layer("Layer 2");
        frame.add_layer("Layer 3");
        assert_eq!(frame.active_layer_index(), 2);
        frame.remove_active_layer();
        assert_eq!(frame.active_layer_index(), 1);
    }

    #[test]
    fn test_flip_horizontal_involution() {
        let mut frame = Frame::new(8);
        frame.set_pixel(1, 2, Color::RED);
        let before = frame.get_pixels();
        frame.apply_transform(LayerTransform::FlipHorizontal);
        assert_eq!(frame.get_pixel(6, 2), Color::RED);
        frame.apply_transform(LayerTransform::FlipHorizontal);
        assert_eq!(frame.get_pixels(), before);
    }

    #[test]
    fn test_rotate90_four_times_is_identity() {
        let mut frame = Frame::new(8);
        frame.set_pixel(3, 1, Color::BLUE);
        let before = frame.get_pixels();
        for _ in 0..4 {
            frame.apply_transform(LayerTransform::Rotate90);
        }
        assert_eq!(frame.get_pixels(), before);
    }
}
