//! Multi-stop gradient ramps and their spatial mappings.

use canvas::Frame;
use common::{Color, PixelPoint};
use smallvec::{smallvec, SmallVec};

/// How canvas position maps to ramp position `t`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradientShape {
    #[default]
    Linear,
    Radial,
    Angular,
    Diamond,
    Reflected,
}

/// One (color, position) pair on the ramp. Positions live in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    pub position: f32,
}

/// An ordered color ramp of at least two stops, kept sorted by position.
#[derive(Clone, Debug)]
pub struct GradientSpec {
    stops: SmallVec<[GradientStop; 4]>,
}

impl Default for GradientSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl GradientSpec {
    /// The default black-to-white ramp.
    pub fn new() -> Self {
        Self {
            stops: smallvec![
                GradientStop {
                    color: Color::BLACK,
                    position: 0.0,
                },
                GradientStop {
                    color: Color::WHITE,
                    position: 1.0,
                },
            ],
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Insert a stop, keeping the ramp sorted. Position is clamped into
    /// `[0, 1]`.
    pub fn add_stop(&mut self, color: Color, position: f32) {
        self.stops.push(GradientStop {
            color,
            position: position.clamp(0.0, 1.0),
        });
        self.sort_stops();
    }

    /// Remove a stop. Refused (returns false) when only two remain.
    pub fn remove_stop(&mut self, index: usize) -> bool {
        if self.stops.len() <= 2 || index >= self.stops.len() {
            return false;
        }
        self.stops.remove(index);
        true
    }

    /// Reposition a stop and restore sorted order. No-op out of range.
    pub fn move_stop(&mut self, index: usize, position: f32) {
        if let Some(stop) = self.stops.get_mut(index) {
            stop.position = position.clamp(0.0, 1.0);
            self.sort_stops();
        }
    }

    /// Replace the color of a stop. No-op out of range.
    pub fn recolor_stop(&mut self, index: usize, color: Color) {
        if let Some(stop) = self.stops.get_mut(index) {
            stop.color = color;
        }
    }

    fn sort_stops(&mut self) {
        self.stops.sort_by(|a, b| {
            a.position
                .partial_cmp(&b.position)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Color of the ramp at `t`, clamping to the endpoint colors outside
    /// the stop range.
    pub fn evaluate(&self, t: f32) -> Color {
        let stops = &self.stops;
        match stops.len() {
            0 => return Color::BLACK,
            1 => return stops[0].color,
            _ => {}
        }

        for pair in stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t >= lo.position && t <= hi.position {
                let span = hi.position - lo.position;
                let local = if span <= f32::EPSILON {
                    1.0
                } else {
                    (t - lo.position) / span
                };
                return lo.color.lerp(hi.color, local);
            }
        }

        if t <= stops[0].position {
            stops[0].color
        } else {
            stops[stops.len() - 1].color
        }
    }
}

/// Map a canvas pixel onto ramp position `t` for the endpoints `a -> b`.
pub fn map_position(p: PixelPoint, a: PixelPoint, b: PixelPoint, shape: GradientShape) -> f32 {
    let ax = a.x as f32;
    let ay = a.y as f32;
    let dir_x = (b.x - a.x) as f32;
    let dir_y = (b.y - a.y) as f32;
    let length = (dir_x * dir_x + dir_y * dir_y).sqrt();
    let px = p.x as f32 - ax;
    let py = p.y as f32 - ay;

    match shape {
        GradientShape::Linear => {
            let along = (px * dir_x + py * dir_y) / length;
            (along / length).clamp(0.0, 1.0)
        }
        GradientShape::Radial => ((px * px + py * py).sqrt() / length).clamp(0.0, 1.0),
        GradientShape::Angular => {
            let angle = (dir_x * py - dir_y * px).atan2(dir_x * px + dir_y * py);
            (angle.to_degrees() + 180.0) / 360.0
        }
        GradientShape::Diamond => {
            let denom = dir_x.abs() + dir_y.abs();
            ((px.abs() + py.abs()) / denom).clamp(0.0, 1.0)
        }
        GradientShape::Reflected => {
            let along = ((px * dir_x + py * dir_y) / length).abs();
            ping_pong(along / length * 2.0, 1.0)
        }
    }
}

/// Triangle-wave fold of `x` into `[0, len]`.
fn ping_pong(x: f32, len: f32) -> f32 {
    let m = x.rem_euclid(2.0 * len);
    if m < len {
        m
    } else {
        2.0 * len - m
    }
}

/// Overwrite every pixel of the frame's active layer with the gradient
/// mapped between the two endpoints. A degenerate endpoint pair is a silent
/// no-op.
pub fn apply(
    frame: &mut Frame,
    spec: &GradientSpec,
    a: PixelPoint,
    b: PixelPoint,
    shape: GradientShape,
) {
    if a.distance(b) < 0.1 {
        return;
    }

    let size = frame.size() as i32;
    for y in 0..size {
        for x in 0..size {
            let t = map_position(PixelPoint::new(x, y), a, b, shape);
            frame.set_pixel(x, y, spec.evaluate(t));
        }
    }
}
