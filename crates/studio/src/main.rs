//! Pixel Studio - a frame-based pixel art and animation engine.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use studio::{StudioConfig, StudioSession};

/// Pixel Studio - pixel art and animation engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project file to open
    project: Option<PathBuf>,

    /// Canvas size for a new project
    #[arg(long, default_value = "32")]
    canvas_size: usize,

    /// Playback frame rate
    #[arg(long, default_value = "12")]
    frame_rate: u32,

    /// Disable periodic autosave
    #[arg(long)]
    no_autosave: bool,

    /// Export the current frame composite as PNG
    #[arg(long)]
    export_png: Option<PathBuf>,

    /// Export all frames as a sprite sheet PNG
    #[arg(long)]
    export_sheet: Option<PathBuf>,

    /// Export every frame as a numbered PNG into a directory
    #[arg(long)]
    export_frames: Option<PathBuf>,

    /// Export the bone rig as JSON
    #[arg(long)]
    export_bones: Option<PathBuf>,

    /// Save the project to this path before exiting
    #[arg(long)]
    save: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Pixel Studio v{}", studio::VERSION);

    let config = StudioConfig::new()
        .with_canvas_size(args.canvas_size)
        .with_frame_rate(args.frame_rate)
        .with_autosave(!args.no_autosave);

    let mut session = StudioSession::new(config);

    if let Some(path) = &args.project {
        info!("Opening: {}", path.display());
        session.load_project(path)?;
    }

    let project = session.project();
    info!(
        "Canvas {0}x{0}, {1} frame(s), {2} palette color(s)",
        project.canvas_size(),
        project.timeline.frame_count(),
        project.palette.len()
    );

    if let Some(path) = &args.export_png {
        let index = session.project().timeline.current_index();
        session.export_frame_png(index, path)?;
        info!("Frame exported to: {}", path.display());
    }

    if let Some(path) = &args.export_sheet {
        session.export_sprite_sheet(path)?;
        info!("Sprite sheet exported to: {}", path.display());
    }

    if let Some(dir) = &args.export_frames {
        std::fs::create_dir_all(dir)?;
        session.export_frames(dir)?;
        info!("Frames exported to: {}", dir.display());
    }

    if let Some(path) = &args.export_bones {
        session.export_bone_data(path)?;
        info!("Bone data exported to: {}", path.display());
    }

    if let Some(path) = &args.save {
        session.save_project(path)?;
    }

    info!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default() {
        let args = Args::parse_from(["pixel-studio"]);
        assert!(args.project.is_none());
        assert_eq!(args.canvas_size, 32);
        assert_eq!(args.frame_rate, 12);
        assert!(!args.no_autosave);
    }

    #[test]
    fn test_args_with_project() {
        let args = Args::parse_from(["pixel-studio", "art.paproj"]);
        assert_eq!(args.project, Some(PathBuf::from("art.paproj")));
    }

    #[test]
    fn test_args_export_flags() {
        let args = Args::parse_from(["pixel-studio", "--export-sheet", "sheet.png", "--verbose"]);
        assert_eq!(args.export_sheet, Some(PathBuf::from("sheet.png")));
        assert!(args.verbose);
    }
}
