//! Animation domain: the shared clip set, weapon clip naming and playback
//! across every loaded part.

mod library;
mod naming;
mod systems;

pub use library::{
    AnimationLibrary, ClipChoice, ClipRef, CurrentAnimation, SharedAnimationSet, choose_clip,
};
pub use naming::{WEAPON_SEGMENT, is_facial_variant, weapon_clip_name};

use bevy::ecs::message::Message;
use bevy::prelude::*;
use std::collections::HashMap;

use crate::core::ViewerSet;
use systems::{apply_pending_clip, build_part_graphs, handle_animation_requests, reset_on_session};

/// Play a clip by name on every part.
#[derive(Debug, Clone)]
pub struct PlayAnimation {
    pub name: String,
}

impl Message for PlayAnimation {}

/// Step through the shared clip set.
#[derive(Debug, Clone, Copy)]
pub struct CycleAnimation {
    pub step: isize,
}

impl Message for CycleAnimation {}

/// Graph node of each clip available to one animation player.
#[derive(Component, Debug, Clone, Default)]
pub struct PartAnimator {
    pub nodes: HashMap<String, AnimationNodeIndex>,
}

pub struct AnimationLibraryPlugin;

impl Plugin for AnimationLibraryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AnimationLibrary>()
            .init_resource::<CurrentAnimation>()
            .add_message::<PlayAnimation>()
            .add_message::<CycleAnimation>()
            .add_systems(Update, reset_on_session.in_set(ViewerSet::Reset))
            .add_systems(
                Update,
                (handle_animation_requests, build_part_graphs, apply_pending_clip)
                    .chain()
                    .in_set(ViewerSet::Animate),
            );
    }
}
