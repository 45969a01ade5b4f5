//! Attachment domain: hand-bone discovery and weapon re-parenting.
//!
//! Weapons are loaded as free-standing hidden scenes. Once the body animation
//! runs, each one is parented onto its hand bone with a correction transform
//! for a configurable stabilization window and then left alone.

mod bones;
mod systems;
mod tracker;

pub use bones::{HandBones, hand_side};
pub use systems::weapon_correction;
pub use tracker::{AttachStep, AttachmentRegistry, AttachmentState};

use bevy::prelude::*;

use crate::core::ViewerSet;
use systems::{reset_on_session, stabilize_weapons, track_body_animation};

/// Frames on which the body animation has been seen playing this session.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct BodyAnimationClock {
    pub frames_playing: u32,
    pub warned_no_player: bool,
}

impl BodyAnimationClock {
    pub fn has_started(&self) -> bool {
        self.frames_playing > 0
    }
}

pub struct AttachmentPlugin;

impl Plugin for AttachmentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AttachmentRegistry>()
            .init_resource::<BodyAnimationClock>()
            .add_systems(Update, reset_on_session.in_set(ViewerSet::Reset))
            .add_systems(
                Update,
                (track_body_animation, stabilize_weapons)
                    .chain()
                    .in_set(ViewerSet::Attach),
            );
    }
}
