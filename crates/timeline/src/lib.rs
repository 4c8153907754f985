//! Animation timeline: ordered frames, playback clock, and the bone rig
//! that persists alongside them.

pub mod bones;
pub mod timeline;

pub use bones::{Bone, BonePose, BoneRig, PoseFrame};
pub use timeline::Timeline;
