//! The editing session: routes user-intent events into the engine crates.
//!
//! All mutation happens on one control thread, driven by user events
//! interleaved with a periodic [`tick`](StudioSession::tick) that advances
//! playback and the autosave clock. Drag-based operations stay provisional
//! until their commit call; abandoning a drag never touches pixels.

use crate::config::StudioConfig;
use crate::export;
use canvas::LayerTransform;
use common::{Color, PixelPoint, StudioResult};
use history::UndoHistory;
use project::{codec, CustomBrush, Project};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use timeline::{Bone, BonePose};
use tools::{BrushEngine, BrushParams, GradientShape, GradientSpec, SelectionEngine};
use tracing::{info, warn};

/// Shape tools that preview during a drag and commit on release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Circle,
    Rect,
}

#[derive(Clone, Copy, Debug)]
struct ShapeDrag {
    kind: ShapeKind,
    start: PixelPoint,
    current: PixelPoint,
}

/// One open editing session over a project.
pub struct StudioSession {
    config: StudioConfig,
    project: Project,
    history: UndoHistory,
    selection: SelectionEngine,
    brush_engine: BrushEngine,
    rng: StdRng,

    /// Active brush configuration.
    pub brush: BrushParams,
    /// Active draw color.
    pub color: Color,
    /// Active gradient ramp.
    pub gradient: GradientSpec,
    /// Active gradient spatial mapping.
    pub gradient_shape: GradientShape,
    /// Magic wand color tolerance.
    pub wand_tolerance: f32,
    /// Magic wand connectivity flag (true = 4-connected).
    pub wand_continuous: bool,

    shape_drag: Option<ShapeDrag>,
    gradient_drag: Option<(PixelPoint, PixelPoint)>,
    stroke_active: bool,
    last_autosave: f64,
    unsaved_changes: bool,
}

impl StudioSession {
    pub fn new(config: StudioConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Session with a deterministic spray-brush generator.
    pub fn with_seed(config: StudioConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: StudioConfig, rng: StdRng) -> Self {
        let mut project = Project::new(config.canvas_size);
        project.timeline.set_frame_rate(config.frame_rate);
        project.ensure_default_palette();

        Self {
            history: UndoHistory::with_capacity(config.undo_capacity),
            selection: SelectionEngine::new(),
            brush_engine: BrushEngine::new(),
            rng,
            brush: BrushParams::default(),
            color: Color::BLACK,
            gradient: GradientSpec::new(),
            gradient_shape: GradientShape::Linear,
            wand_tolerance: 0.1,
            wand_continuous: true,
            shape_drag: None,
            gradient_drag: None,
            stroke_active: false,
            last_autosave: 0.0,
            unsaved_changes: false,
            project,
            config,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn canvas_size(&self) -> usize {
        self.project.canvas_size()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// Replace the document with a blank canvas of the given size. Palette,
    /// settings, and custom brushes survive; pixel state and history do not.
    pub fn new_canvas(&mut self, size: usize) {
        self.project.timeline = timeline::Timeline::new(size);
        self.project.timeline.set_frame_rate(self.config.frame_rate);
        self.project
            .bone_rig
            .sync_with_frame_count(self.project.timeline.frame_count());
        self.history = UndoHistory::with_capacity(self.config.undo_capacity);
        self.selection.clear();
        self.shape_drag = None;
        self.gradient_drag = None;
        self.stroke_active = false;
        self.unsaved_changes = false;
    }

    fn snapshot_active_layer(&mut self) {
        let layer = self.project.timeline.current_frame().active_layer();
        self.history.snapshot(layer);
        self.unsaved_changes = true;
    }

    // -- Freehand drawing ---------------------------------------------------

    /// Stamp the active brush at a pixel. The first touch of a stroke takes
    /// the undo snapshot; further calls extend the same stroke.
    pub fn draw_at(&mut self, x: i32, y: i32) {
        self.paint_at(x, y, self.color);
    }

    /// Stamp transparency (the eraser is a brush with the clear color).
    pub fn erase_at(&mut self, x: i32, y: i32) {
        self.paint_at(x, y, Color::CLEAR);
    }

    fn paint_at(&mut self, x: i32, y: i32, color: Color) {
        if !self.stroke_active {
            self.snapshot_active_layer();
            self.stroke_active = true;
        }
        let frame = self.project.timeline.current_frame_mut();
        self.brush_engine
            .stamp(frame, &mut self.rng, x, y, color, &self.brush);
        frame.apply_all_render_targets();
    }

    /// Close the current stroke; the next draw starts a fresh undo step.
    pub fn end_stroke(&mut self) {
        self.stroke_active = false;
    }

    /// Pick up the active layer's color at a pixel as the draw color.
    pub fn pick_color(&mut self, x: i32, y: i32) {
        self.color = self.project.timeline.current_frame().get_pixel(x, y);
    }

    // -- Shape drags --------------------------------------------------------

    pub fn begin_shape(&mut self, kind: ShapeKind, p: PixelPoint) {
        self.shape_drag = Some(ShapeDrag {
            kind,
            start: p,
            current: p,
        });
    }

    pub fn update_shape(&mut self, p: PixelPoint) {
        if let Some(drag) = self.shape_drag.as_mut() {
            drag.current = p;
        }
    }

    /// Commit the provisional shape at its final drag position.
    pub fn commit_shape(&mut self) {
        let Some(drag) = self.shape_drag.take() else {
            return;
        };
        self.snapshot_active_layer();

        let color = self.color;
        let params = self.brush;
        let frame = self.project.timeline.current_frame_mut();
        match drag.kind {
            ShapeKind::Line => self.brush_engine.draw_line(
                frame,
                &mut self.rng,
                drag.start.x,
                drag.start.y,
                drag.current.x,
                drag.current.y,
                color,
                &params,
            ),
            ShapeKind::Circle => {
                let radius = drag.start.distance(drag.current).round() as i32;
                self.brush_engine.draw_circle(
                    frame,
                    &mut self.rng,
                    drag.start.x,
                    drag.start.y,
                    radius,
                    color,
                    &params,
                );
            }
            ShapeKind::Rect => self.brush_engine.draw_rect(
                frame,
                &mut self.rng,
                drag.start.x.min(drag.current.x),
                drag.start.y.min(drag.current.y),
                drag.start.x.max(drag.current.x),
                drag.start.y.max(drag.current.y),
                color,
                &params,
            ),
        }
        frame.apply_all_render_targets();
    }

    /// Drop the provisional shape without drawing.
    pub fn abandon_shape(&mut self) {
        self.shape_drag = None;
    }

    // -- Gradient drags -----------------------------------------------------

    pub fn begin_gradient(&mut self, p: PixelPoint) {
        self.gradient_drag = Some((p, p));
    }

    pub fn update_gradient(&mut self, p: PixelPoint) {
        if let Some((_, end)) = self.gradient_drag.as_mut() {
            *end = p;
        }
    }

    /// Commit the gradient across the whole active layer.
    pub fn commit_gradient(&mut self) {
        let Some((start, end)) = self.gradient_drag.take() else {
            return;
        };
        self.snapshot_active_layer();

        let frame = self.project.timeline.current_frame_mut();
        tools::gradient::apply(frame, &self.gradient, start, end, self.gradient_shape);
        frame.apply_all_render_targets();
    }

    pub fn abandon_gradient(&mut self) {
        self.gradient_drag = None;
    }

    // -- Selection ----------------------------------------------------------

    pub fn begin_selection(&mut self, p: PixelPoint) {
        self.selection.begin_drag(p);
    }

    pub fn update_selection(&mut self, p: PixelPoint) {
        self.selection.update_drag(p);
    }

    pub fn end_selection(&mut self, p: PixelPoint) {
        self.selection.end_drag(p);
    }

    /// Abandon a provisional selection drag (released outside the canvas).
    pub fn abandon_selection(&mut self) {
        self.selection.abandon_drag();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn magic_wand(&mut self, p: PixelPoint) {
        let frame = self.project.timeline.current_frame();
        self.selection
            .magic_wand(frame, p, self.wand_tolerance, self.wand_continuous);
    }

    pub fn copy_selection(&mut self) {
        self.selection.copy(self.project.timeline.current_frame());
    }

    pub fn paste_selection(&mut self) {
        if !self.selection.has_buffer() {
            return;
        }
        self.snapshot_active_layer();
        let frame = self.project.timeline.current_frame_mut();
        self.selection.paste(frame);
        frame.apply_all_render_targets();
    }

    pub fn move_selection(&mut self, dx: i32, dy: i32) {
        if !self.selection.has_buffer() {
            return;
        }
        self.snapshot_active_layer();
        let frame = self.project.timeline.current_frame_mut();
        self.selection.move_by(frame, dx, dy);
        frame.apply_all_render_targets();
    }

    pub fn flip_selection_horizontal(&mut self) {
        if !self.selection.has_buffer() {
            return;
        }
        self.snapshot_active_layer();
        let frame = self.project.timeline.current_frame_mut();
        self.selection.flip_horizontal(frame);
        frame.apply_all_render_targets();
    }

    pub fn flip_selection_vertical(&mut self) {
        if !self.selection.has_buffer() {
            return;
        }
        self.snapshot_active_layer();
        let frame = self.project.timeline.current_frame_mut();
        self.selection.flip_vertical(frame);
        frame.apply_all_render_targets();
    }

    // -- Undo/redo ----------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let frame = self.project.timeline.current_frame_mut();
        let restored = self.history.undo(frame.active_layer_mut());
        if restored {
            self.unsaved_changes = true;
        }
        restored
    }

    pub fn redo(&mut self) -> bool {
        let frame = self.project.timeline.current_frame_mut();
        let restored = self.history.redo(frame.active_layer_mut());
        if restored {
            self.unsaved_changes = true;
        }
        restored
    }

    // -- Layers -------------------------------------------------------------

    /// Add a layer above the active one and select it.
    pub fn add_layer(&mut self) {
        let frame = self.project.timeline.current_frame_mut();
        let name = format!("Layer {}", frame.layer_count() + 1);
        frame.add_layer(name);
        self.unsaved_changes = true;
    }

    /// Remove the active layer (refused when it is the only one) and drop
    /// its history.
    pub fn remove_layer(&mut self) {
        let frame = self.project.timeline.current_frame_mut();
        if let Some(removed) = frame.remove_active_layer() {
            self.history.forget(removed.id());
            self.unsaved_changes = true;
        }
    }

    pub fn select_layer(&mut self, index: usize) {
        self.project
            .timeline
            .current_frame_mut()
            .set_active_layer(index);
    }

    /// Flip or rotate the whole active layer.
    pub fn transform_layer(&mut self, transform: LayerTransform) {
        self.snapshot_active_layer();
        let frame = self.project.timeline.current_frame_mut();
        frame.apply_transform(transform);
        frame.apply_all_render_targets();
    }

    // -- Frames and playback ------------------------------------------------

    pub fn add_frame(&mut self) {
        self.project.timeline.add_frame();
        self.sync_bone_frames();
        self.unsaved_changes = true;
    }

    /// Remove the current frame (refused when it is the last one), dropping
    /// history for its layers.
    pub fn remove_frame(&mut self) {
        if let Some(removed) = self.project.timeline.remove_current() {
            for layer in removed.layers() {
                self.history.forget(layer.id());
            }
            self.sync_bone_frames();
            self.unsaved_changes = true;
        }
    }

    pub fn next_frame(&mut self) {
        self.project.timeline.go_to_next();
    }

    pub fn prev_frame(&mut self) {
        self.project.timeline.go_to_prev();
    }

    pub fn go_to_frame(&mut self, index: usize) {
        self.project.timeline.go_to(index);
    }

    pub fn copy_frame(&mut self) {
        self.project.timeline.copy_frame();
    }

    pub fn paste_frame(&mut self) {
        if !self.project.timeline.has_copied_frame() {
            return;
        }
        self.snapshot_active_layer();
        self.project.timeline.paste_frame();
    }

    pub fn toggle_playback(&mut self, now: f64) {
        self.project.timeline.toggle_playback(now);
    }

    pub fn set_frame_rate(&mut self, rate: u32) {
        self.project.timeline.set_frame_rate(rate);
        self.unsaved_changes = true;
    }

    /// Periodic driver: advances playback and runs the interval-gated
    /// autosave. Autosave failure is reported and never fatal.
    pub fn tick(&mut self, now: f64) {
        self.project.timeline.tick(now);

        if self.config.autosave_enabled
            && now - self.last_autosave > self.config.autosave_interval_secs
        {
            if let Err(error) = self.autosave_now() {
                warn!("autosave failed: {error}");
            }
            self.last_autosave = now;
        }
    }

    // -- Bones --------------------------------------------------------------

    /// Reconcile bone pose frames with the timeline frame count. Called
    /// after every frame-count change.
    fn sync_bone_frames(&mut self) {
        let count = self.project.timeline.frame_count();
        self.project.bone_rig.sync_with_frame_count(count);
    }

    pub fn add_bone(&mut self, name: impl Into<String>, position: [f32; 2]) -> usize {
        self.unsaved_changes = true;
        self.project.bone_rig.add_bone(Bone {
            name: name.into(),
            position,
            ..Bone::default()
        })
    }

    pub fn remove_bone(&mut self, index: usize) {
        self.project.bone_rig.remove_bone(index);
        self.unsaved_changes = true;
    }

    pub fn clear_bones(&mut self) {
        self.project.bone_rig.clear();
        self.unsaved_changes = true;
    }

    /// Reposition one bone's pose on one frame. No-op out of range.
    pub fn set_bone_pose(&mut self, frame_index: usize, bone_index: usize, pose: BonePose) {
        if let Some(frame) = self.project.bone_rig.frames.get_mut(frame_index) {
            if let Some(slot) = frame.poses.get_mut(bone_index) {
                *slot = pose;
                self.unsaved_changes = true;
            }
        }
    }

    // -- Palette ------------------------------------------------------------

    pub fn add_palette_color(&mut self, color: Color) {
        self.project.palette.push(color);
        self.unsaved_changes = true;
    }

    /// Remove a palette entry. No-op out of range.
    pub fn remove_palette_color(&mut self, index: usize) {
        if index < self.project.palette.len() {
            self.project.palette.remove(index);
            self.unsaved_changes = true;
        }
    }

    /// Replace a palette entry. No-op out of range.
    pub fn edit_palette_color(&mut self, index: usize, color: Color) {
        if let Some(slot) = self.project.palette.get_mut(index) {
            *slot = color;
            self.unsaved_changes = true;
        }
    }

    // -- Custom brushes -----------------------------------------------------

    /// Save the active brush configuration as a named preset.
    pub fn save_custom_brush(&mut self, name: impl Into<String>) {
        self.project.custom_brushes.push(CustomBrush {
            name: name.into(),
            size: self.brush.size,
            kind: self.brush.kind,
            tip: self.brush.tip,
        });
        self.unsaved_changes = true;
    }

    /// Make a saved preset the active brush. No-op out of range.
    pub fn apply_custom_brush(&mut self, index: usize) {
        if let Some(preset) = self.project.custom_brushes.get(index) {
            self.brush.size = preset.size;
            self.brush.kind = preset.kind;
            self.brush.tip = preset.tip;
        }
    }

    // -- Persistence --------------------------------------------------------

    pub fn save_project(&mut self, path: &Path) -> StudioResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        codec::write_project(&mut writer, &self.project)?;
        self.unsaved_changes = false;
        info!("project saved to {}", path.display());
        Ok(())
    }

    /// Load a project file. On any failure the in-memory state is left
    /// untouched.
    pub fn load_project(&mut self, path: &Path) -> StudioResult<()> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let loaded = codec::read_project(&mut reader)?;

        self.project = loaded;
        self.history = UndoHistory::with_capacity(self.config.undo_capacity);
        self.selection.clear();
        self.sync_bone_frames();
        self.unsaved_changes = false;
        info!("project loaded from {}", path.display());
        Ok(())
    }

    /// Write the lightweight autosave blob.
    pub fn autosave_now(&self) -> StudioResult<()> {
        let file = File::create(&self.config.autosave_path)?;
        let mut writer = BufWriter::new(file);
        codec::write_autosave(&mut writer, &self.project)
    }

    pub fn save_palette(&self, path: &Path) -> StudioResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        codec::write_palette(&mut writer, &self.project.palette)
    }

    pub fn load_palette(&mut self, path: &Path) -> StudioResult<()> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        self.project.palette = codec::read_palette(&mut reader)?;
        Ok(())
    }

    // -- Import and export --------------------------------------------------

    /// Load an image file into the active layer, resized to the canvas.
    pub fn import_image(&mut self, path: &Path) -> StudioResult<()> {
        let pixels = export::load_image_pixels(path, self.canvas_size())?;
        self.snapshot_active_layer();
        let frame = self.project.timeline.current_frame_mut();
        frame.set_pixels(&pixels);
        frame.apply_all_render_targets();
        Ok(())
    }

    /// Embed an image file as the project's reference image.
    pub fn set_reference_image(&mut self, path: &Path) -> StudioResult<()> {
        self.project.reference_image = export::load_reference_bytes(path)?;
        self.unsaved_changes = true;
        Ok(())
    }

    pub fn export_frame_png(&mut self, index: usize, path: &Path) -> StudioResult<()> {
        export::export_frame_png(&mut self.project, index, path)
    }

    pub fn export_frames(&mut self, dir: &Path) -> StudioResult<()> {
        export::export_frames(&mut self.project, dir)
    }

    pub fn export_sprite_sheet(&mut self, path: &Path) -> StudioResult<()> {
        export::export_sprite_sheet(&mut self.project, path)
    }

    pub fn export_bone_data(&self, path: &Path) -> StudioResult<()> {
        export::export_bone_json(&self.project.bone_rig, path)
    }
}
