//! Brush stamping and shape drawing.
//!
//! All operations are clipped by the frame's bounds checks and never fail;
//! coordinates may wander off-canvas freely during drags.

use canvas::Frame;
use common::Color;
use rand::Rng;

/// Pixel-level apply rule of a stamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrushKind {
    #[default]
    Pencil,
    Spray,
    SprayDither,
}

impl BrushKind {
    /// Stable tag used by the project file.
    pub fn tag(self) -> i32 {
        match self {
            BrushKind::Pencil => 0,
            BrushKind::Spray => 1,
            BrushKind::SprayDither => 2,
        }
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(BrushKind::Pencil),
            1 => Some(BrushKind::Spray),
            2 => Some(BrushKind::SprayDither),
            _ => None,
        }
    }
}

/// Footprint mask of a stamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrushTip {
    #[default]
    Square,
    Circle,
}

impl BrushTip {
    pub fn tag(self) -> i32 {
        match self {
            BrushTip::Square => 0,
            BrushTip::Circle => 1,
        }
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(BrushTip::Square),
            1 => Some(BrushTip::Circle),
            _ => None,
        }
    }
}

/// Everything that shapes a stamp besides its position and color.
#[derive(Clone, Copy, Debug)]
pub struct BrushParams {
    pub size: i32,
    pub kind: BrushKind,
    pub tip: BrushTip,
    pub symmetry_x: bool,
    pub symmetry_y: bool,
    pub radial_symmetry: bool,
    pub radial_folds: i32,
    pub falloff: bool,
}

impl Default for BrushParams {
    fn default() -> Self {
        Self {
            size: 1,
            kind: BrushKind::Pencil,
            tip: BrushTip::Square,
            symmetry_x: false,
            symmetry_y: false,
            radial_symmetry: false,
            radial_folds: 6,
            falloff: false,
        }
    }
}

/// Stateless drawing algorithms over a frame's active layer.
#[derive(Debug, Default)]
pub struct BrushEngine;

impl BrushEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply one stamp centered at `(cx, cy)`.
    ///
    /// Each offset in the tip window is applied to the primary position and,
    /// independently, to every active symmetry reflection of the offset
    /// about the stamp center. The random source drives the spray rule only.
    pub fn stamp(
        &self,
        frame: &mut Frame,
        rng: &mut impl Rng,
        cx: i32,
        cy: i32,
        color: Color,
        params: &BrushParams,
    ) {
        let radius = params.size / 2;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if params.tip == BrushTip::Circle {
                    let dist = ((dx * dx + dy * dy) as f32).sqrt();
                    if dist > radius as f32 {
                        continue;
                    }
                }

                let strength = if params.falloff {
                    1.0 - (dx.abs() + dy.abs()) as f32 / params.size as f32
                } else {
                    1.0
                };

                self.apply_to_pixel(frame, rng, cx + dx, cy + dy, color, params.kind, strength);

                if params.symmetry_x {
                    self.apply_to_pixel(frame, rng, cx - dx, cy + dy, color, params.kind, strength);
                }
                if params.symmetry_y {
                    self.apply_to_pixel(frame, rng, cx + dx, cy - dy, color, params.kind, strength);
                }
                if params.symmetry_x && params.symmetry_y {
                    self.apply_to_pixel(frame, rng, cx - dx, cy - dy, color, params.kind, strength);
                }

                if params.radial_symmetry && params.radial_folds > 1 {
                    let angle_step = 360.0 / params.radial_folds as f32;
                    for fold in 1..params.radial_folds {
                        let (rx, ry) = rotate_offset(dx, dy, angle_step * fold as f32);
                        self.apply_to_pixel(
                            frame,
                            rng,
                            cx + rx,
                            cy + ry,
                            color,
                            params.kind,
                            strength,
                        );
                    }
                }
            }
        }
    }

    fn apply_to_pixel(
        &self,
        frame: &mut Frame,
        rng: &mut impl Rng,
        x: i32,
        y: i32,
        color: Color,
        kind: BrushKind,
        strength: f32,
    ) {
        match kind {
            BrushKind::Spray => {
                if rng.gen::<f32>() > strength {
                    return;
                }
            }
            BrushKind::SprayDither => {
                // Checkerboard mask, independent of strength.
                if (x + y).rem_euclid(2) != 0 {
                    return;
                }
            }
            BrushKind::Pencil => {}
        }

        let final_color = if strength < 1.0 && kind == BrushKind::Pencil {
            frame.get_pixel(x, y).lerp(color, strength)
        } else {
            color
        };

        frame.set_pixel(x, y, final_color);
    }

    /// Bresenham line from `(x1, y1)` to `(x2, y2)`, stamping at every
    /// sample point.
    pub fn draw_line(
        &self,
        frame: &mut Frame,
        rng: &mut impl Rng,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        params: &BrushParams,
    ) {
        let dx = (x2 - x1).abs();
        let dy = (y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx - dy;
        let (mut x, mut y) = (x1, y1);

        loop {
            self.stamp(frame, rng, x, y, color, params);

            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Midpoint circle outline of `radius` around `(cx, cy)`, stamping at
    /// every sample point.
    pub fn draw_circle(
        &self,
        frame: &mut Frame,
        rng: &mut impl Rng,
        cx: i32,
        cy: i32,
        radius: i32,
        color: Color,
        params: &BrushParams,
    ) {
        let mut x = radius;
        let mut y = 0;
        let mut err = 0;

        while x >= y {
            for (px, py) in [
                (cx + x, cy + y),
                (cx + y, cy + x),
                (cx - y, cy + x),
                (cx - x, cy + y),
                (cx - x, cy - y),
                (cx - y, cy - x),
                (cx + y, cy - x),
                (cx + x, cy - y),
            ] {
                self.stamp(frame, rng, px, py, color, params);
            }

            if err <= 0 {
                y += 1;
                err += 2 * y + 1;
            }
            if err > 0 {
                x -= 1;
                err -= 2 * x + 1;
            }
        }
    }

    /// Unfilled rectangle boundary: four lines.
    pub fn draw_rect(
        &self,
        frame: &mut Frame,
        rng: &mut impl Rng,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        params: &BrushParams,
    ) {
        self.draw_line(frame, rng, x1, y1, x2, y1, color, params);
        self.draw_line(frame, rng, x2, y1, x2, y2, color, params);
        self.draw_line(frame, rng, x2, y2, x1, y2, color, params);
        self.draw_line(frame, rng, x1, y2, x1, y1, color, params);
    }
}

/// Rotate an integer offset by `degrees`, rounding to the nearest pixel.
fn rotate_offset(dx: i32, dy: i32, degrees: f32) -> (i32, i32) {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    let fx = dx as f32;
    let fy = dy as f32;
    (
        (fx * cos - fy * sin).round() as i32,
        (fx * sin + fy * cos).round() as i32,
    )
}
