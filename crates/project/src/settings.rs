//! Persisted editor settings.

use common::Color;

/// Tiling preview arrangement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TilingMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl TilingMode {
    pub fn tag(self) -> i32 {
        match self {
            TilingMode::None => 0,
            TilingMode::Horizontal => 1,
            TilingMode::Vertical => 2,
            TilingMode::Both => 3,
        }
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(TilingMode::None),
            1 => Some(TilingMode::Horizontal),
            2 => Some(TilingMode::Vertical),
            3 => Some(TilingMode::Both),
            _ => None,
        }
    }
}

/// Target engine preset for sprite export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportPreset {
    #[default]
    Unity,
    Unreal,
    Godot,
    Custom,
}

impl ExportPreset {
    pub fn tag(self) -> i32 {
        match self {
            ExportPreset::Unity => 0,
            ExportPreset::Unreal => 1,
            ExportPreset::Godot => 2,
            ExportPreset::Custom => 3,
        }
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(ExportPreset::Unity),
            1 => Some(ExportPreset::Unreal),
            2 => Some(ExportPreset::Godot),
            3 => Some(ExportPreset::Custom),
            _ => None,
        }
    }
}

/// Every settings field the project file persists.
#[derive(Clone, Debug, PartialEq)]
pub struct StudioSettings {
    pub animation_name: String,
    pub loop_start: i32,
    pub loop_end: i32,
    pub ping_pong: bool,
    pub onion_enabled: bool,
    pub prev_onion_opacity: f32,
    pub next_onion_opacity: f32,
    pub onion_prev_range: i32,
    pub onion_next_range: i32,
    pub frame_blending: bool,
    pub show_tiling_preview: bool,
    pub tiling_grid_size: i32,
    pub tiling_mode: TilingMode,
    pub show_isometric_grid: bool,
    pub isometric_angle: f32,
    pub isometric_color: Color,
    pub export_preset: ExportPreset,
    pub export_padding: i32,
    pub export_trim: bool,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            animation_name: "Untitled".to_string(),
            loop_start: 0,
            loop_end: 0,
            ping_pong: false,
            onion_enabled: true,
            prev_onion_opacity: 0.25,
            next_onion_opacity: 0.25,
            onion_prev_range: 1,
            onion_next_range: 1,
            frame_blending: false,
            show_tiling_preview: false,
            tiling_grid_size: 3,
            tiling_mode: TilingMode::None,
            show_isometric_grid: false,
            isometric_angle: 30.0,
            isometric_color: Color::new(1.0, 1.0, 1.0, 0.2),
            export_preset: ExportPreset::Unity,
            export_padding: 1,
            export_trim: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_tags_round_trip() {
        for mode in [
            TilingMode::None,
            TilingMode::Horizontal,
            TilingMode::Vertical,
            TilingMode::Both,
        ] {
            assert_eq!(TilingMode::from_tag(mode.tag()), Some(mode));
        }
        for preset in [
            ExportPreset::Unity,
            ExportPreset::Unreal,
            ExportPreset::Godot,
            ExportPreset::Custom,
        ] {
            assert_eq!(ExportPreset::from_tag(preset.tag()), Some(preset));
        }
        assert_eq!(TilingMode::from_tag(7), None);
        assert_eq!(ExportPreset::from_tag(-2), None);
    }
}
