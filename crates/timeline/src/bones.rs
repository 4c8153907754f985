//! Skeletal bone data persisted alongside frames.
//!
//! The rig carries no kinematics; it is index bookkeeping kept in lockstep
//! with the timeline (one pose list per frame, one pose per bone).

use serde::{Deserialize, Serialize};

/// A bone in the rig. `parent_index` is -1 for roots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub parent_index: i32,
    pub length: f32,
    pub position: [f32; 2],
    pub rotation: f32,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: "Bone".to_string(),
            parent_index: -1,
            length: 10.0,
            position: [0.0, 0.0],
            rotation: 0.0,
        }
    }
}

/// One bone's placement on one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BonePose {
    pub position: [f32; 2],
    pub rotation: f32,
}

/// Per-frame pose list; kept the same length as the bone list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PoseFrame {
    pub poses: Vec<BonePose>,
}

/// The full rig: bones plus one pose frame per timeline frame.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoneRig {
    pub bones: Vec<Bone>,
    pub frames: Vec<PoseFrame>,
}

impl BoneRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the pose-frame list with the timeline frame count. Invoked
    /// after any frame-count change (add, remove, load); new pose frames
    /// start at each bone's rest placement.
    pub fn sync_with_frame_count(&mut self, frame_count: usize) {
        while self.frames.len() < frame_count {
            let poses = self
                .bones
                .iter()
                .map(|bone| BonePose {
                    position: bone.position,
                    rotation: bone.rotation,
                })
                .collect();
            self.frames.push(PoseFrame { poses });
        }
        self.frames.truncate(frame_count);
    }

    /// Add a bone and give every frame a pose for it at the rest placement.
    pub fn add_bone(&mut self, bone: Bone) -> usize {
        let pose = BonePose {
            position: bone.position,
            rotation: bone.rotation,
        };
        for frame in &mut self.frames {
            frame.poses.push(pose);
        }
        self.bones.push(bone);
        self.bones.len() - 1
    }

    /// Remove a bone, its pose on every frame, and fix up parent indices:
    /// children of the removed bone become roots, later indices shift down.
    /// No-op outside `[0, bone_count)`.
    pub fn remove_bone(&mut self, index: usize) {
        if index >= self.bones.len() {
            return;
        }

        self.bones.remove(index);
        for frame in &mut self.frames {
            if index < frame.poses.len() {
                frame.poses.remove(index);
            }
        }

        let removed = index as i32;
        for bone in &mut self.bones {
            if bone.parent_index == removed {
                bone.parent_index = -1;
            } else if bone.parent_index > removed {
                bone.parent_index -= 1;
            }
        }
    }

    /// Drop every bone and every pose.
    pub fn clear(&mut self) {
        self.bones.clear();
        for frame in &mut self.frames {
            frame.poses.clear();
        }
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, parent: i32) -> Bone {
        Bone {
            name: name.to_string(),
            parent_index: parent,
            ..Bone::default()
        }
    }

    #[test]
    fn test_sync_grows_and_shrinks() {
        let mut rig = BoneRig::new();
        rig.add_bone(named("root", -1));
        rig.sync_with_frame_count(3);
        assert_eq!(rig.frames.len(), 3);
        assert_eq!(rig.frames[2].poses.len(), 1);

        rig.sync_with_frame_count(1);
        assert_eq!(rig.frames.len(), 1);
    }

    #[test]
    fn test_add_bone_updates_every_frame() {
        let mut rig = BoneRig::new();
        rig.sync_with_frame_count(2);
        rig.add_bone(named("root", -1));
        assert_eq!(rig.frames[0].poses.len(), 1);
        assert_eq!(rig.frames[1].poses.len(), 1);
    }

    #[test]
    fn test_remove_bone_fixes_parents() {
        let mut rig = BoneRig::new();
        rig.sync_with_frame_count(1);
        rig.add_bone(named("a", -1));
        rig.add_bone(named("b", 0));
        rig.add_bone(named("c", 1));

        rig.remove_bone(0);

        assert_eq!(rig.bone_count(), 2);
        // b lost its parent, c's parent index shifted down
        assert_eq!(rig.bones[0].parent_index, -1);
        assert_eq!(rig.bones[1].parent_index, 0);
        assert_eq!(rig.frames[0].poses.len(), 2);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut rig = BoneRig::new();
        rig.add_bone(named("a", -1));
        rig.remove_bone(5);
        assert_eq!(rig.bone_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut rig = BoneRig::new();
        rig.sync_with_frame_count(2);
        rig.add_bone(named("a", -1));
        rig.clear();
        assert_eq!(rig.bone_count(), 0);
        assert!(rig.frames.iter().all(|f| f.poses.is_empty()));
    }
}
