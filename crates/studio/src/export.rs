//! PNG and JSON export, plus image import.
//!
//! These are the file-facing consumers of the core byte layouts; the codec
//! and canvas crates never touch the filesystem themselves.

use canvas::Frame;
use common::{Color, StudioError, StudioResult};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::Path;
use timeline::BoneRig;

use project::Project;

/// Flatten a frame's composite into an 8-bit RGBA image.
fn composite_image(frame: &mut Frame) -> RgbaImage {
    let size = frame.size() as u32;
    let mut bytes = Vec::with_capacity((size * size * 4) as usize);
    for color in frame.composite() {
        bytes.extend_from_slice(&color.to_rgba8());
    }
    RgbaImage::from_raw(size, size, bytes).unwrap_or_else(|| RgbaImage::new(size, size))
}

/// Export one frame's composite as a PNG. The index is clamped into range.
pub fn export_frame_png(project: &mut Project, index: usize, path: &Path) -> StudioResult<()> {
    let index = index.min(project.timeline.frame_count() - 1);
    let frame = match project.timeline.frame_mut(index) {
        Some(frame) => frame,
        None => return Ok(()),
    };
    let image = composite_image(frame);
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| StudioError::image(e.to_string()))
}

/// Export every frame as `frame_NNN.png` under `dir`.
pub fn export_frames(project: &mut Project, dir: &Path) -> StudioResult<()> {
    for index in 0..project.timeline.frame_count() {
        let path = dir.join(format!("frame_{index:03}.png"));
        export_frame_png(project, index, &path)?;
    }
    Ok(())
}

/// Export all frames packed into one sprite sheet, laid out row-major on a
/// near-square grid.
pub fn export_sprite_sheet(project: &mut Project, path: &Path) -> StudioResult<()> {
    let count = project.timeline.frame_count();
    let size = project.canvas_size() as u32;
    let cols = (count as f64).sqrt().ceil() as u32;
    let rows = (count as u32).div_ceil(cols);

    let mut sheet = RgbaImage::new(cols * size, rows * size);
    for index in 0..count {
        let frame = match project.timeline.frame_mut(index) {
            Some(frame) => frame,
            None => continue,
        };
        let tile = composite_image(frame);
        let x = (index as u32 % cols) * size;
        let y = (index as u32 / cols) * size;
        imageops::replace(&mut sheet, &tile, x as i64, y as i64);
    }

    sheet
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| StudioError::image(e.to_string()))
}

/// Export the bone rig as pretty-printed JSON.
pub fn export_bone_json(rig: &BoneRig, path: &Path) -> StudioResult<()> {
    let json = serde_json::to_string_pretty(rig)
        .map_err(|e| StudioError::invalid(format!("bone data serialization failed: {e}")))?;
    fs::write(path, json)?;
    Ok(())
}

/// Decode an image file into canvas-sized pixels, nearest-neighbor resized
/// when the dimensions differ.
pub fn load_image_pixels(path: &Path, canvas_size: usize) -> StudioResult<Vec<Color>> {
    let image = image::open(path).map_err(|e| StudioError::image(e.to_string()))?;
    let mut rgba = image.to_rgba8();

    let size = canvas_size as u32;
    if rgba.width() != size || rgba.height() != size {
        rgba = imageops::resize(&rgba, size, size, FilterType::Nearest);
    }

    Ok(rgba
        .pixels()
        .map(|p| Color::from_rgba8(p.0))
        .collect())
}

/// Read an image file's raw bytes for embedding, validating that they
/// decode.
pub fn load_reference_bytes(path: &Path) -> StudioResult<Vec<u8>> {
    let bytes = fs::read(path)?;
    image::load_from_memory(&bytes).map_err(|e| StudioError::image(e.to_string()))?;
    Ok(bytes)
}
