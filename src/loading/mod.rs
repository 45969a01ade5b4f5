//! Loading domain: sequential part loading, progress, material normalization
//! and the arena of loaded parts.

mod arena;
mod material;
mod progress;
mod queue;
mod systems;
#[cfg(test)]
mod tests;

pub use arena::{LoadedPart, PartArena, PartHandle};
pub use material::{MaterialMode, NormalizedMaterial, placeholder_bundle};
pub use progress::LoadProgress;
pub use queue::{InFlight, LoadPhase, LoadQueue, PartOutcome};

use bevy::app::AnimationSystems;
use bevy::prelude::*;
use bevy::transform::TransformSystems;

use crate::core::ViewerSet;
use systems::{
    bind_ready_parts, issue_next_part, poll_in_flight_part, reset_on_session, sync_follower_bones,
};

/// Marks the scene root entity of a loaded part.
#[derive(Component, Debug, Clone, Copy)]
pub struct PartRoot {
    pub handle: PartHandle,
    pub generation: u64,
}

/// Added once the part's scene has been inspected.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PartBound;

/// True once the queue is drained and every loaded part is bound.
pub fn parts_settled(queue: &LoadQueue, arena: &PartArena) -> bool {
    queue.is_drained() && !arena.is_empty() && arena.all_bound()
}

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LoadQueue>()
            .init_resource::<PartArena>()
            .add_systems(Update, reset_on_session.in_set(ViewerSet::Reset))
            .add_systems(
                Update,
                (
                    poll_in_flight_part,
                    issue_next_part,
                    bind_ready_parts,
                )
                    .chain()
                    .in_set(ViewerSet::Load),
            )
            .add_systems(
                PostUpdate,
                sync_follower_bones
                    .after(AnimationSystems)
                    .before(TransformSystems::Propagate),
            );
    }
}
