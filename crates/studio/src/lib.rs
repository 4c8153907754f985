//! Pixel Studio - a frame-based pixel art and animation engine.
//!
//! This crate ties the engine together:
//! - layered pixel canvas and compositing
//! - animation timeline and playback
//! - brush, selection, and gradient tools
//! - per-layer undo/redo
//! - binary project persistence and PNG export

pub mod config;
pub mod export;
pub mod session;

pub use config::StudioConfig;
pub use session::{ShapeKind, StudioSession};

/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
