//! Binary project codec.
//!
//! Fixed field order, little-endian primitives. Strings are a u32 byte
//! length followed by UTF-8 bytes; bools are one byte. The reader mirrors
//! the writer exactly and builds a fresh [`Project`], so a failed load
//! leaves the caller's state untouched.

use crate::document::{CustomBrush, Project};
use crate::settings::{ExportPreset, StudioSettings, TilingMode};
use canvas::{MAX_CANVAS_SIZE, MIN_CANVAS_SIZE};
use common::{Color, StudioError, StudioResult};
use std::io::{Read, Write};
use timeline::{Bone, BonePose, PoseFrame};
use tools::{BrushKind, BrushTip};

/// Magic header of the project format.
pub const PROJECT_MAGIC: &[u8; 6] = b"PAPROJ";
/// Current format version.
pub const PROJECT_VERSION: i32 = 1;

// ---------------------------------------------------------------------------
// Primitive field helpers
// ---------------------------------------------------------------------------

fn write_i32(w: &mut impl Write, value: i32) -> StudioResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32(w: &mut impl Write, value: f32) -> StudioResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_bool(w: &mut impl Write, value: bool) -> StudioResult<()> {
    w.write_all(&[value as u8])?;
    Ok(())
}

fn write_string(w: &mut impl Write, value: &str) -> StudioResult<()> {
    w.write_all(&(value.len() as u32).to_le_bytes())?;
    w.write_all(value.as_bytes())?;
    Ok(())
}

fn write_color(w: &mut impl Write, color: Color) -> StudioResult<()> {
    write_f32(w, color.r)?;
    write_f32(w, color.g)?;
    write_f32(w, color.b)?;
    write_f32(w, color.a)
}

fn read_i32(r: &mut impl Read) -> StudioResult<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32(r: &mut impl Read) -> StudioResult<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_bool(r: &mut impl Read) -> StudioResult<bool> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0] != 0)
}

/// Read an i32 field that must be a non-negative element count.
fn read_count(r: &mut impl Read, what: &str) -> StudioResult<usize> {
    let value = read_i32(r)?;
    usize::try_from(value).map_err(|_| StudioError::malformed(format!("negative {what} count")))
}

fn read_string(r: &mut impl Read) -> StudioResult<String> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    let len = u32::from_le_bytes(buf) as usize;
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| StudioError::malformed("invalid UTF-8 in string field"))
}

fn read_color(r: &mut impl Read) -> StudioResult<Color> {
    Ok(Color::new(
        read_f32(r)?,
        read_f32(r)?,
        read_f32(r)?,
        read_f32(r)?,
    ))
}

fn read_pixels(r: &mut impl Read, expected: usize) -> StudioResult<Vec<Color>> {
    let count = read_count(r, "pixel")?;
    if count != expected {
        return Err(StudioError::malformed(format!(
            "frame holds {count} pixels, canvas needs {expected}"
        )));
    }
    let mut pixels = Vec::with_capacity(count);
    for _ in 0..count {
        pixels.push(read_color(r)?);
    }
    Ok(pixels)
}

// ---------------------------------------------------------------------------
// Project format
// ---------------------------------------------------------------------------

/// Write the whole project in the fixed field order of §6.
pub fn write_project(w: &mut impl Write, project: &Project) -> StudioResult<()> {
    w.write_all(PROJECT_MAGIC)?;
    write_i32(w, PROJECT_VERSION)?;

    let size = project.canvas_size();
    write_i32(w, size as i32)?;

    // Frames: active-layer pixel arrays.
    let timeline = &project.timeline;
    write_i32(w, timeline.frame_count() as i32)?;
    for frame in timeline.frames() {
        let pixels = frame.get_pixels();
        write_i32(w, pixels.len() as i32)?;
        for pixel in &pixels {
            write_color(w, *pixel)?;
        }
    }

    // Palette.
    write_i32(w, project.palette.len() as i32)?;
    for color in &project.palette {
        write_color(w, *color)?;
    }

    // Bone rig.
    let rig = &project.bone_rig;
    write_i32(w, rig.bones.len() as i32)?;
    for bone in &rig.bones {
        write_string(w, &bone.name)?;
        write_i32(w, bone.parent_index)?;
        write_f32(w, bone.length)?;
        write_f32(w, bone.position[0])?;
        write_f32(w, bone.position[1])?;
        write_f32(w, bone.rotation)?;
    }

    write_i32(w, rig.frames.len() as i32)?;
    for pose_frame in &rig.frames {
        write_i32(w, pose_frame.poses.len() as i32)?;
        for pose in &pose_frame.poses {
            write_f32(w, pose.position[0])?;
            write_f32(w, pose.position[1])?;
            write_f32(w, pose.rotation)?;
        }
    }

    // Custom brushes.
    write_i32(w, project.custom_brushes.len() as i32)?;
    for brush in &project.custom_brushes {
        write_string(w, &brush.name)?;
        write_i32(w, brush.size)?;
        write_i32(w, brush.kind.tag())?;
        write_i32(w, brush.tip.tag())?;
    }

    // Animation and editor settings.
    let settings = &project.settings;
    write_i32(w, timeline.frame_rate() as i32)?;
    write_string(w, &settings.animation_name)?;
    write_i32(w, settings.loop_start)?;
    write_i32(w, settings.loop_end)?;
    write_bool(w, settings.ping_pong)?;
    write_bool(w, settings.onion_enabled)?;
    write_f32(w, settings.prev_onion_opacity)?;
    write_f32(w, settings.next_onion_opacity)?;
    write_i32(w, settings.onion_prev_range)?;
    write_i32(w, settings.onion_next_range)?;
    write_bool(w, settings.frame_blending)?;

    write_bool(w, settings.show_tiling_preview)?;
    write_i32(w, settings.tiling_grid_size)?;
    write_i32(w, settings.tiling_mode.tag())?;

    write_bool(w, settings.show_isometric_grid)?;
    write_f32(w, settings.isometric_angle)?;
    write_color(w, settings.isometric_color)?;

    write_i32(w, settings.export_preset.tag())?;
    write_i32(w, settings.export_padding)?;
    write_bool(w, settings.export_trim)?;

    // Embedded reference image (0-length = none).
    write_i32(w, project.reference_image.len() as i32)?;
    w.write_all(&project.reference_image)?;

    Ok(())
}

/// Read a project written by [`write_project`].
pub fn read_project(r: &mut impl Read) -> StudioResult<Project> {
    let mut magic = [0u8; 6];
    r.read_exact(&mut magic)?;
    if &magic != PROJECT_MAGIC {
        return Err(StudioError::malformed("not a pixel studio project file"));
    }

    let version = read_i32(r)?;
    if version != PROJECT_VERSION {
        return Err(StudioError::malformed(format!(
            "unsupported project version {version}"
        )));
    }

    let size = read_canvas_size(r)?;
    let mut project = Project::new(size);
    let pixel_count = size * size;

    // Frames.
    let frame_count = read_count(r, "frame")?;
    for index in 0..frame_count {
        if index > 0 {
            project.timeline.add_frame();
        }
        let pixels = read_pixels(r, pixel_count)?;
        let frame = project.timeline.current_frame_mut();
        frame.set_pixels(&pixels);
        frame.apply_all_render_targets();
    }

    // Palette.
    let palette_count = read_count(r, "palette")?;
    for _ in 0..palette_count {
        let color = read_color(r)?;
        project.palette.push(color);
    }

    // Bone rig.
    let bone_count = read_count(r, "bone")?;
    for _ in 0..bone_count {
        let name = read_string(r)?;
        let parent_index = read_i32(r)?;
        let length = read_f32(r)?;
        let pos_x = read_f32(r)?;
        let pos_y = read_f32(r)?;
        let rotation = read_f32(r)?;
        project.bone_rig.bones.push(Bone {
            name,
            parent_index,
            length,
            position: [pos_x, pos_y],
            rotation,
        });
    }

    let pose_frame_count = read_count(r, "pose frame")?;
    for _ in 0..pose_frame_count {
        let pose_count = read_count(r, "pose")?;
        let mut poses = Vec::with_capacity(pose_count);
        for _ in 0..pose_count {
            let pos_x = read_f32(r)?;
            let pos_y = read_f32(r)?;
            let rotation = read_f32(r)?;
            poses.push(BonePose {
                position: [pos_x, pos_y],
                rotation,
            });
        }
        project.bone_rig.frames.push(PoseFrame { poses });
    }

    // Custom brushes.
    let brush_count = read_count(r, "custom brush")?;
    for _ in 0..brush_count {
        let name = read_string(r)?;
        let size = read_i32(r)?;
        let kind_tag = read_i32(r)?;
        let tip_tag = read_i32(r)?;
        project.custom_brushes.push(CustomBrush {
            name,
            size,
            kind: BrushKind::from_tag(kind_tag)
                .ok_or_else(|| StudioError::malformed(format!("unknown brush type tag {kind_tag}")))?,
            tip: BrushTip::from_tag(tip_tag)
                .ok_or_else(|| StudioError::malformed(format!("unknown tip shape tag {tip_tag}")))?,
        });
    }

    // Animation and editor settings.
    let frame_rate = read_i32(r)?;
    project.timeline.set_frame_rate(frame_rate.max(0) as u32);

    let mut settings = StudioSettings {
        animation_name: read_string(r)?,
        loop_start: read_i32(r)?,
        loop_end: read_i32(r)?,
        ping_pong: read_bool(r)?,
        onion_enabled: read_bool(r)?,
        prev_onion_opacity: read_f32(r)?,
        next_onion_opacity: read_f32(r)?,
        onion_prev_range: read_i32(r)?,
        onion_next_range: read_i32(r)?,
        frame_blending: read_bool(r)?,
        ..StudioSettings::default()
    };

    settings.show_tiling_preview = read_bool(r)?;
    settings.tiling_grid_size = read_i32(r)?;
    let tiling_tag = read_i32(r)?;
    settings.tiling_mode = TilingMode::from_tag(tiling_tag)
        .ok_or_else(|| StudioError::malformed(format!("unknown tiling mode tag {tiling_tag}")))?;

    settings.show_isometric_grid = read_bool(r)?;
    settings.isometric_angle = read_f32(r)?;
    settings.isometric_color = read_color(r)?;

    let preset_tag = read_i32(r)?;
    settings.export_preset = ExportPreset::from_tag(preset_tag)
        .ok_or_else(|| StudioError::malformed(format!("unknown export preset tag {preset_tag}")))?;
    settings.export_padding = read_i32(r)?;
    settings.export_trim = read_bool(r)?;
    project.settings = settings;

    // Embedded reference image.
    let ref_len = read_count(r, "reference image byte")?;
    if ref_len > 0 {
        let mut bytes = vec![0u8; ref_len];
        r.read_exact(&mut bytes)?;
        project.reference_image = bytes;
    }

    project.timeline.go_to_first();
    Ok(project)
}

fn read_canvas_size(r: &mut impl Read) -> StudioResult<usize> {
    let size = read_i32(r)?;
    let size = usize::try_from(size)
        .map_err(|_| StudioError::malformed("negative canvas size"))?;
    if !(MIN_CANVAS_SIZE..=MAX_CANVAS_SIZE).contains(&size) {
        return Err(StudioError::malformed(format!(
            "canvas size {size} outside {MIN_CANVAS_SIZE}..{MAX_CANVAS_SIZE}"
        )));
    }
    Ok(size)
}

// ---------------------------------------------------------------------------
// Autosave subset: canvas size + frame pixel arrays, no magic. A strict
// prefix of the project layout past the header.
// ---------------------------------------------------------------------------

pub fn write_autosave(w: &mut impl Write, project: &Project) -> StudioResult<()> {
    let timeline = &project.timeline;
    write_i32(w, project.canvas_size() as i32)?;
    write_i32(w, timeline.frame_count() as i32)?;
    for frame in timeline.frames() {
        let pixels = frame.get_pixels();
        write_i32(w, pixels.len() as i32)?;
        for pixel in &pixels {
            write_color(w, *pixel)?;
        }
    }
    Ok(())
}

/// Read an autosave blob into a fresh project with default settings.
pub fn read_autosave(r: &mut impl Read) -> StudioResult<Project> {
    let size = read_canvas_size(r)?;
    let mut project = Project::new(size);
    let pixel_count = size * size;

    let frame_count = read_count(r, "frame")?;
    for index in 0..frame_count {
        if index > 0 {
            project.timeline.add_frame();
        }
        let pixels = read_pixels(r, pixel_count)?;
        let frame = project.timeline.current_frame_mut();
        frame.set_pixels(&pixels);
        frame.apply_all_render_targets();
    }

    project.timeline.go_to_first();
    Ok(project)
}

// ---------------------------------------------------------------------------
// Palette file: count + colors.
// ---------------------------------------------------------------------------

pub fn write_palette(w: &mut impl Write, palette: &[Color]) -> StudioResult<()> {
    write_i32(w, palette.len() as i32)?;
    for color in palette {
        write_color(w, *color)?;
    }
    Ok(())
}

pub fn read_palette(r: &mut impl Read) -> StudioResult<Vec<Color>> {
    let count = read_count(r, "palette")?;
    let mut palette = Vec::with_capacity(count);
    for _ in 0..count {
        palette.push(read_color(r)?);
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        let mut project = Project::new(8);
        project
            .timeline
            .current_frame_mut()
            .set_pixel(1, 2, Color::RED);
        project.timeline.add_frame();
        project
            .timeline
            .current_frame_mut()
            .set_pixel(3, 4, Color::new(0.1, 0.2, 0.3, 0.4));

        project.palette = vec![Color::RED, Color::new(0.5, 0.25, 0.125, 1.0)];

        project.bone_rig.add_bone(Bone {
            name: "spine".to_string(),
            parent_index: -1,
            length: 12.5,
            position: [4.0, 3.0],
            rotation: 45.0,
        });
        project.bone_rig.sync_with_frame_count(2);

        project.custom_brushes.push(CustomBrush {
            name: "soft round".to_string(),
            size: 5,
            kind: BrushKind::Spray,
            tip: BrushTip::Circle,
        });

        project.timeline.set_frame_rate(24);
        project.settings.animation_name = "walk cycle".to_string();
        project.settings.loop_start = 1;
        project.settings.loop_end = 1;
        project.settings.ping_pong = true;
        project.settings.tiling_mode = TilingMode::Both;
        project.settings.export_preset = ExportPreset::Godot;
        project.settings.isometric_angle = 26.57;
        project.reference_image = vec![1, 2, 3, 4, 5];
        project
    }

    #[test]
    fn test_project_round_trip() {
        let project = sample_project();
        let mut blob = Vec::new();
        write_project(&mut blob, &project).unwrap();

        let loaded = read_project(&mut blob.as_slice()).unwrap();

        assert_eq!(loaded.canvas_size(), 8);
        assert_eq!(loaded.timeline.frame_count(), 2);
        assert_eq!(loaded.timeline.current_index(), 0);
        assert_eq!(loaded.timeline.frame_rate(), 24);

        assert_eq!(
            loaded.timeline.frame(0).unwrap().get_pixels(),
            project.timeline.frame(0).unwrap().get_pixels()
        );
        assert_eq!(
            loaded.timeline.frame(1).unwrap().get_pixels(),
            project.timeline.frame(1).unwrap().get_pixels()
        );

        assert_eq!(loaded.palette, project.palette);
        assert_eq!(loaded.bone_rig.bones.len(), 1);
        assert_eq!(loaded.bone_rig.bones[0].name, "spine");
        assert_eq!(loaded.bone_rig.bones[0].position, [4.0, 3.0]);
        assert_eq!(loaded.bone_rig.frames.len(), 2);
        assert_eq!(loaded.custom_brushes, project.custom_brushes);
        assert_eq!(loaded.settings, project.settings);
        assert_eq!(loaded.reference_image, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_wrong_magic_is_rejected() {
        let project = sample_project();
        let mut blob = Vec::new();
        write_project(&mut blob, &project).unwrap();
        blob[0] = b'X';

        let err = read_project(&mut blob.as_slice()).unwrap_err();
        assert!(matches!(err, StudioError::MalformedFile(_)));
    }

    #[test]
    fn test_truncated_blob_is_rejected() {
        let project = sample_project();
        let mut blob = Vec::new();
        write_project(&mut blob, &project).unwrap();
        blob.truncate(blob.len() / 2);

        assert!(read_project(&mut blob.as_slice()).is_err());
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let project = sample_project();
        let mut blob = Vec::new();
        write_project(&mut blob, &project).unwrap();
        blob[6..10].copy_from_slice(&2i32.to_le_bytes());

        let err = read_project(&mut blob.as_slice()).unwrap_err();
        assert!(matches!(err, StudioError::MalformedFile(_)));
    }

    #[test]
    fn test_bad_canvas_size_is_rejected() {
        let mut blob = Vec::new();
        blob.extend_from_slice(PROJECT_MAGIC);
        blob.extend_from_slice(&PROJECT_VERSION.to_le_bytes());
        blob.extend_from_slice(&4096i32.to_le_bytes());

        assert!(matches!(
            read_project(&mut blob.as_slice()),
            Err(StudioError::MalformedFile(_))
        ));
    }

    #[test]
    fn test_autosave_round_trip() {
        let project = sample_project();
        let mut blob = Vec::new();
        write_autosave(&mut blob, &project).unwrap();

        let loaded = read_autosave(&mut blob.as_slice()).unwrap();
        assert_eq!(loaded.canvas_size(), 8);
        assert_eq!(loaded.timeline.frame_count(), 2);
        assert_eq!(
            loaded.timeline.frame(1).unwrap().get_pixels(),
            project.timeline.frame(1).unwrap().get_pixels()
        );
        // Settings are not part of the autosave subset.
        assert_eq!(loaded.settings, StudioSettings::default());
    }

    #[test]
    fn test_autosave_is_prefix_of_project_body() {
        // The autosave layout must stay a strict prefix of the project
        // layout after the magic and version fields.
        let project = sample_project();

        let mut full = Vec::new();
        write_project(&mut full, &project).unwrap();
        let mut autosave = Vec::new();
        write_autosave(&mut autosave, &project).unwrap();

        assert_eq!(&full[10..10 + autosave.len()], autosave.as_slice());
    }

    #[test]
    fn test_palette_round_trip() {
        let palette = vec![Color::RED, Color::CLEAR, Color::new(0.1, 0.9, 0.5, 0.7)];
        let mut blob = Vec::new();
        write_palette(&mut blob, &palette).unwrap();
        assert_eq!(read_palette(&mut blob.as_slice()).unwrap(), palette);
    }

    #[test]
    fn test_empty_reference_image_round_trips_as_none() {
        let mut project = sample_project();
        project.reference_image.clear();

        let mut blob = Vec::new();
        write_project(&mut blob, &project).unwrap();
        let loaded = read_project(&mut blob.as_slice()).unwrap();
        assert!(loaded.reference_image.is_empty());
    }
}
