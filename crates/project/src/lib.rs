//! The editable project document and its binary persistence formats.

pub mod codec;
pub mod document;
pub mod settings;

pub use codec::{
    read_autosave, read_palette, read_project, write_autosave, write_palette, write_project,
    PROJECT_MAGIC, PROJECT_VERSION,
};
pub use document::{CustomBrush, Project};
pub use settings::{ExportPreset, StudioSettings, TilingMode};
