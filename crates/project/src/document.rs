//! The aggregate editable state: everything the project file persists.

use crate::settings::StudioSettings;
use common::Color;
use timeline::{BoneRig, Timeline};
use tools::{BrushKind, BrushTip};

/// A reusable brush configuration preset.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomBrush {
    pub name: String,
    pub size: i32,
    pub kind: BrushKind,
    pub tip: BrushTip,
}

/// The whole editable document.
#[derive(Debug)]
pub struct Project {
    pub timeline: Timeline,
    pub palette: Vec<Color>,
    pub bone_rig: BoneRig,
    pub custom_brushes: Vec<CustomBrush>,
    pub settings: StudioSettings,
    /// Raw encoded bytes of an embedded reference image; empty when none.
    pub reference_image: Vec<u8>,
}

impl Project {
    pub fn new(canvas_size: usize) -> Self {
        Self {
            timeline: Timeline::new(canvas_size),
            palette: Vec::new(),
            bone_rig: BoneRig::new(),
            custom_brushes: Vec::new(),
            settings: StudioSettings::default(),
            reference_image: Vec::new(),
        }
    }

    #[inline]
    pub fn canvas_size(&self) -> usize {
        self.timeline.canvas_size()
    }

    /// The preset palette used when the user has none.
    pub fn default_palette() -> Vec<Color> {
        vec![
            Color::BLACK,
            Color::WHITE,
            Color::RED,
            Color::GREEN,
            Color::BLUE,
            Color::YELLOW,
            Color::CYAN,
            Color::MAGENTA,
            Color::GRAY,
        ]
    }

    /// Load the preset palette if the palette is empty.
    pub fn ensure_default_palette(&mut self) {
        if self.palette.is_empty() {
            self.palette = Self::default_palette();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_has_one_frame() {
        let project = Project::new(32);
        assert_eq!(project.canvas_size(), 32);
        assert_eq!(project.timeline.frame_count(), 1);
    }

    #[test]
    fn test_default_palette_only_fills_empty() {
        let mut project = Project::new(32);
        project.ensure_default_palette();
        assert_eq!(project.palette.len(), 9);

        project.palette = vec![Color::RED];
        project.ensure_default_palette();
        assert_eq!(project.palette.len(), 1);
    }
}
