//! Rectangular and flood-fill region selection with a detached copy buffer.

use canvas::Frame;
use common::{Color, PixelPoint, PixelRect};
use std::collections::VecDeque;

/// Region selection over a frame's active layer.
///
/// The copy buffer is a detached pixel array matching the selection rect;
/// once captured it is independent of canvas state.
#[derive(Debug, Default)]
pub struct SelectionEngine {
    rect: Option<PixelRect>,
    buffer: Option<Vec<Color>>,
    drag_origin: Option<PixelPoint>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rect(&self) -> Option<PixelRect> {
        self.rect
    }

    pub fn has_selection(&self) -> bool {
        self.rect.is_some_and(|r| !r.is_empty())
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    /// Start a rectangular drag at `p`. The selection tracks the drag until
    /// [`end_drag`](Self::end_drag) or [`abandon_drag`](Self::abandon_drag).
    pub fn begin_drag(&mut self, p: PixelPoint) {
        self.drag_origin = Some(p);
        self.rect = Some(PixelRect::from_drag(p, p));
        self.buffer = None;
    }

    /// Update the tracked rect while dragging: min/max of the origin and the
    /// current pixel, both inclusive.
    pub fn update_drag(&mut self, p: PixelPoint) {
        if let Some(origin) = self.drag_origin {
            self.rect = Some(PixelRect::from_drag(origin, p));
        }
    }

    /// Commit the drag at its release pixel.
    pub fn end_drag(&mut self, p: PixelPoint) {
        self.update_drag(p);
        self.drag_origin = None;
    }

    /// Abandon a provisional drag without touching pixels (release outside
    /// the canvas).
    pub fn abandon_drag(&mut self) {
        if self.drag_origin.take().is_some() {
            self.rect = None;
        }
    }

    /// Drop the selection and its buffer. Never mutates pixels.
    pub fn clear(&mut self) {
        self.rect = None;
        self.buffer = None;
        self.drag_origin = None;
    }

    /// Flood-fill selection from `seed` by color similarity.
    ///
    /// A neighbor joins the region when the summed absolute channel
    /// difference against the seed color is within `tolerance * 4`.
    /// `continuous` keeps traversal 4-connected; clearing it additionally
    /// admits diagonal neighbors (the flag name is historical and reads
    /// inverted). The selection becomes the tight bounding box of the
    /// region and a copy buffer is captured for the whole box.
    pub fn magic_wand(&mut self, frame: &Frame, seed: PixelPoint, tolerance: f32, continuous: bool) {
        let size = frame.size() as i32;
        if seed.x < 0 || seed.x >= size || seed.y < 0 || seed.y >= size {
            return;
        }

        let target = frame.get_pixel(seed.x, seed.y);
        let mut visited = vec![false; (size * size) as usize];
        let mut queue = VecDeque::new();
        let mut region = Vec::new();

        visited[(seed.y * size + seed.x) as usize] = true;
        queue.push_back(seed);

        while let Some(p) = queue.pop_front() {
            region.push(p);

            let mut probe = |x: i32, y: i32, queue: &mut VecDeque<PixelPoint>| {
                if x < 0 || x >= size || y < 0 || y >= size {
                    return;
                }
                let index = (y * size + x) as usize;
                if visited[index] {
                    return;
                }
                if frame.get_pixel(x, y).diff_sum(target) <= tolerance * 4.0 {
                    visited[index] = true;
                    queue.push_back(PixelPoint::new(x, y));
                }
            };

            probe(p.x + 1, p.y, &mut queue);
            probe(p.x - 1, p.y, &mut queue);
            probe(p.x, p.y + 1, &mut queue);
            probe(p.x, p.y - 1, &mut queue);

            if !continuous {
                probe(p.x + 1, p.y + 1, &mut queue);
                probe(p.x - 1, p.y - 1, &mut queue);
                probe(p.x + 1, p.y - 1, &mut queue);
                probe(p.x - 1, p.y + 1, &mut queue);
            }
        }

        if let Some(bounds) = PixelRect::bounding(&region) {
            self.rect = Some(bounds);
            self.buffer = Some(capture(frame, bounds));
        }
    }

    /// Capture a fresh copy buffer for the current rect.
    pub fn copy(&mut self, frame: &Frame) {
        if let Some(rect) = self.rect.filter(|r| !r.is_empty()) {
            self.buffer = Some(capture(frame, rect));
        }
    }

    /// Write the copy buffer at the current rect, clipped to the canvas.
    pub fn paste(&mut self, frame: &mut Frame) {
        let (Some(rect), Some(buffer)) = (self.rect, self.buffer.as_ref()) else {
            return;
        };
        for y in 0..rect.height {
            for x in 0..rect.width {
                let color = buffer[(y * rect.width + x) as usize];
                frame.set_pixel(rect.x + x, rect.y + y, color);
            }
        }
    }

    /// Shift the selection by `(dx, dy)`: the vacated source cells are
    /// cleared to transparent, then the buffer is pasted at the new
    /// location.
    pub fn move_by(&mut self, frame: &mut Frame, dx: i32, dy: i32) {
        let Some(rect) = self.rect.filter(|r| !r.is_empty()) else {
            return;
        };
        if self.buffer.is_none() {
            return;
        }

        for y in 0..rect.height {
            for x in 0..rect.width {
                frame.set_pixel(rect.x + x, rect.y + y, Color::CLEAR);
            }
        }

        self.rect = Some(rect.translated(dx, dy));
        self.paste(frame);
    }

    /// Mirror the copy buffer left-right, then re-paste it.
    pub fn flip_horizontal(&mut self, frame: &mut Frame) {
        let Some(rect) = self.rect.filter(|r| !r.is_empty()) else {
            return;
        };
        if let Some(buffer) = self.buffer.as_mut() {
            let width = rect.width as usize;
            for row in buffer.chunks_exact_mut(width) {
                row.reverse();
            }
            self.paste(frame);
        }
    }

    /// Mirror the copy buffer top-bottom, then re-paste it.
    pub fn flip_vertical(&mut self, frame: &mut Frame) {
        let Some(rect) = self.rect.filter(|r| !r.is_empty()) else {
            return;
        };
        if let Some(buffer) = self.buffer.as_mut() {
            let width = rect.width as usize;
            let height = rect.height as usize;
            for y in 0..height / 2 {
                for x in 0..width {
                    buffer.swap(y * width + x, (height - 1 - y) * width + x);
                }
            }
            self.paste(frame);
        }
    }
}

fn capture(frame: &Frame, rect: PixelRect) -> Vec<Color> {
    let mut buffer = Vec::with_capacity(rect.area());
    for y in 0..rect.height {
        for x in 0..rect.width {
            buffer.push(frame.get_pixel(rect.x + x, rect.y + y));
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_block(origin: PixelPoint, w: i32, h: i32, color: Color) -> Frame {
        let mut frame = Frame::new(8);
        for y in 0..h {
            for x in 0..w {
                frame.set_pixel(origin.x + x, origin.y + y, color);
            }
        }
        frame
    }

    #[test]
    fn test_drag_tracks_min_max() {
        let mut sel = SelectionEngine::new();
        sel.begin_drag(PixelPoint::new(5, 5));
        sel.update_drag(PixelPoint::new(2, 7));
        assert_eq!(sel.rect(), Some(PixelRect::new(2, 5, 4, 3)));
        sel.end_drag(PixelPoint::new(1, 1));
        assert_eq!(sel.rect(), Some(PixelRect::new(1, 1, 5, 5)));
    }

    #[test]
    fn test_abandon_drops_provisional_rect() {
        let mut sel = SelectionEngine::new();
        sel.begin_drag(PixelPoint::new(3, 3));
        sel.update_drag(PixelPoint::new(5, 5));
        sel.abandon_drag();
        assert!(!sel.has_selection());
    }

    #[test]
    fn test_magic_wand_stays_in_one_region() {
        // Two disjoint red blocks; the wand must not bleed across.
        let mut frame = frame_with_block(PixelPoint::new(0, 0), 2, 2, Color::RED);
        for y in 0..2 {
            for x in 0..2 {
                frame.set_pixel(5 + x, 5 + y, Color::RED);
            }
        }

        let mut sel = SelectionEngine::new();
        sel.magic_wand(&frame, PixelPoint::new(0, 0), 0.0, true);
        assert_eq!(sel.rect(), Some(PixelRect::new(0, 0, 2, 2)));
    }

    #[test]
    fn test_magic_wand_tolerance_admits_near_colors() {
        let mut frame = Frame::new(8);
        frame.set_pixel(0, 0, Color::RED);
        frame.set_pixel(1, 0, Color::new(0.9, 0.0, 0.0, 1.0));

        let mut sel = SelectionEngine::new();
        sel.magic_wand(&frame, PixelPoint::new(0, 0), 0.0, true);
        assert_eq!(sel.rect(), Some(PixelRect::new(0, 0, 1, 1)));

        sel.magic_wand(&frame, PixelPoint::new(0, 0), 0.05, true);
        assert_eq!(sel.rect(), Some(PixelRect::new(0, 0, 2, 1)));
    }

    #[test]
    fn test_magic_wand_diagonals_when_not_continuous() {
        let mut frame = Frame::new(8);
        frame.set_pixel(0, 0, Color::RED);
        frame.set_pixel(1, 1, Color::RED);

        let mut sel = SelectionEngine::new();
        sel.magic_wand(&frame, PixelPoint::new(0, 0), 0.0, true);
        assert_eq!(sel.rect(), Some(PixelRect::new(0, 0, 1, 1)));

        sel.magic_wand(&frame, PixelPoint::new(0, 0), 0.0, false);
        assert_eq!(sel.rect(), Some(PixelRect::new(0, 0, 2, 2)));
    }

    #[test]
    fn test_magic_wand_captures_bounding_box_buffer() {
        // An L-shaped region: the bounding box includes a cell outside the
        // flood, which is still copied.
        let mut frame = Frame::new(8);
        frame.set_pixel(0, 0, Color::RED);
        frame.set_pixel(0, 1, Color::RED);
        frame.set_pixel(1, 1, Color::RED);
        frame.set_pixel(1, 0, Color::BLUE);

        let mut sel = SelectionEngine::new();
        sel.magic_wand(&frame, PixelPoint::new(0, 0), 0.0, true);
        assert_eq!(sel.rect(), Some(PixelRect::new(0, 0, 2, 2)));

        // Pasting elsewhere reproduces the blue corner too.
        sel.move_by(&mut frame, 4, 4);
        assert_eq!(frame.get_pixel(5, 4), Color::BLUE);
    }

    #[test]
    fn test_move_clears_source() {
        let mut frame = frame_with_block(PixelPoint::new(1, 1), 2, 2, Color::GREEN);
        let mut sel = SelectionEngine::new();
        sel.begin_drag(PixelPoint::new(1, 1));
        sel.end_drag(PixelPoint::new(2, 2));
        sel.copy(&frame);

        sel.move_by(&mut frame, 3, 0);

        assert_eq!(frame.get_pixel(1, 1), Color::CLEAR);
        assert_eq!(frame.get_pixel(2, 2), Color::CLEAR);
        assert_eq!(frame.get_pixel(4, 1), Color::GREEN);
        assert_eq!(frame.get_pixel(5, 2), Color::GREEN);
        assert_eq!(sel.rect(), Some(PixelRect::new(4, 1, 2, 2)));
    }

    #[test]
    fn test_buffer_is_detached_from_canvas() {
        let mut frame = frame_with_block(PixelPoint::new(0, 0), 2, 1, Color::RED);
        let mut sel = SelectionEngine::new();
        sel.begin_drag(PixelPoint::new(0, 0));
        sel.end_drag(PixelPoint::new(1, 0));
        sel.copy(&frame);

        frame.set_pixel(0, 0, Color::BLUE);
        sel.paste(&mut frame);
        assert_eq!(frame.get_pixel(0, 0), Color::RED);
    }

    #[test]
    fn test_flip_horizontal_mirrors_buffer() {
        let mut frame = Frame::new(8);
        frame.set_pixel(0, 0, Color::RED);
        frame.set_pixel(1, 0, Color::BLUE);

        let mut sel = SelectionEngine::new();
        sel.begin_drag(PixelPoint::new(0, 0));
        sel.end_drag(PixelPoint::new(1, 0));
        sel.copy(&frame);
        sel.flip_horizontal(&mut frame);

        assert_eq!(frame.get_pixel(0, 0), Color::BLUE);
        assert_eq!(frame.get_pixel(1, 0), Color::RED);
    }

    #[test]
    fn test_flip_vertical_mirrors_buffer() {
        let mut frame = Frame::new(8);
        frame.set_pixel(0, 0, Color::RED);
        frame.set_pixel(0, 1, Color::BLUE);

        let mut sel = SelectionEngine::new();
        sel.begin_drag(PixelPoint::new(0, 0));
        sel.end_drag(PixelPoint::new(0, 1));
        sel.copy(&frame);
        sel.flip_vertical(&mut frame);

        assert_eq!(frame.get_pixel(0, 0), Color::BLUE);
        assert_eq!(frame.get_pixel(0, 1), Color::RED);
    }

    #[test]
    fn test_paste_clips_at_canvas_edge() {
        let mut frame = frame_with_block(PixelPoint::new(6, 6), 2, 2, Color::RED);
        let mut sel = SelectionEngine::new();
        sel.begin_drag(PixelPoint::new(6, 6));
        sel.end_drag(PixelPoint::new(7, 7));
        sel.copy(&frame);

        // Push the selection partially off-canvas; the overflow is dropped.
        sel.move_by(&mut frame, 1, 1);
        assert_eq!(frame.get_pixel(7, 7), Color::RED);
        assert_eq!(frame.get_pixel(6, 6), Color::CLEAR);
    }

    #[test]
    fn test_wand_outside_canvas_is_noop() {
        let frame = Frame::new(8);
        let mut sel = SelectionEngine::new();
        sel.magic_wand(&frame, PixelPoint::new(-1, 3), 0.0, true);
        assert!(!sel.has_selection());
    }
}
