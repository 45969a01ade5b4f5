//! Per-weapon attachment state and the stabilization window.
//!
//! A detachable part waits until the body has started animating, then is
//! re-parented onto its hand bone every frame until the window closes. It is
//! only shown once the first re-parent has happened.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::content::StabilizationPolicy;

/// What the attachment system should do this frame for one weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachStep {
    /// Body not animating yet.
    Waiting,
    /// Re-parent onto this bone with the correction transform.
    Reparent(Entity),
    /// Window closed or nothing left to do.
    Idle,
    /// No hand bone exists; reported once.
    Missed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentState {
    attached_bone: Option<Entity>,
    frames_since_attach: u32,
    visible: bool,
    stabilized: bool,
    missed: bool,
    last_bone_pos: Option<Vec3>,
}

impl AttachmentState {
    pub fn step(
        &mut self,
        body_animating: bool,
        bone: Option<Entity>,
        bone_translation: Option<Vec3>,
        policy: &StabilizationPolicy,
    ) -> AttachStep {
        if self.stabilized {
            return AttachStep::Idle;
        }
        if !body_animating {
            return AttachStep::Waiting;
        }
        let Some(bone) = bone else {
            if self.missed {
                return AttachStep::Idle;
            }
            self.missed = true;
            return AttachStep::Missed;
        };

        self.attached_bone = Some(bone);
        self.frames_since_attach += 1;
        self.visible = true;

        self.stabilized = match *policy {
            StabilizationPolicy::FixedFrames(frames) => self.frames_since_attach >= frames,
            StabilizationPolicy::PoseDelta {
                threshold,
                max_frames,
            } => {
                let settled = match (self.last_bone_pos, bone_translation) {
                    (Some(prev), Some(cur)) => prev.distance(cur) < threshold,
                    _ => false,
                };
                settled || self.frames_since_attach >= max_frames
            }
        };
        self.last_bone_pos = bone_translation;

        AttachStep::Reparent(bone)
    }

    /// True once the weapon has been parented to a bone at least once.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_stabilized(&self) -> bool {
        self.stabilized
    }

    pub fn attached_bone(&self) -> Option<Entity> {
        self.attached_bone
    }

    pub fn frames_since_attach(&self) -> u32 {
        self.frames_since_attach
    }
}

/// Attachment state for every detachable part of the current session, keyed
/// by part name.
#[derive(Resource, Debug, Default)]
pub struct AttachmentRegistry {
    states: HashMap<String, AttachmentState>,
}

impl AttachmentRegistry {
    pub fn reset<'a>(&mut self, weapons: impl IntoIterator<Item = &'a str>) {
        self.states = weapons
            .into_iter()
            .map(|name| (name.to_string(), AttachmentState::default()))
            .collect();
    }

    pub fn get(&self, name: &str) -> Option<&AttachmentState> {
        self.states.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AttachmentState> {
        self.states.get_mut(name)
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.states.get(name).is_some_and(AttachmentState::is_visible)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
