//! Stage domain: optional stage scene, per-character offsets and helpers.

mod helpers;
mod offsets;
mod systems;
#[cfg(test)]
mod tests;

pub use helpers::HelperVisibility;
pub use offsets::{ActiveOffsets, OffsetCache};

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::core::ViewerSet;
use systems::{
    apply_session_offsets, draw_ground_grid, handle_helper_toggles, handle_stage_requests,
};

/// Select a stage by name, or clear it with `None`.
#[derive(Debug, Clone)]
pub struct SelectStage {
    pub stage: Option<String>,
}

impl Message for SelectStage {}

/// Step through "no stage" followed by every stage on disk.
#[derive(Debug, Clone, Copy)]
pub struct CycleStage {
    pub step: isize,
}

impl Message for CycleStage {}

#[derive(Debug, Clone, Copy)]
pub struct ToggleHelpers;

impl Message for ToggleHelpers {}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct StageRoot;

#[derive(Resource, Debug, Default)]
pub struct StageState {
    pub current: Option<String>,
    pub entity: Option<Entity>,
}

/// Stage `step` positions away from `current` in the cycle
/// `[none, stages...]`, wrapping around.
pub fn cycle_stage(stages: &[String], current: Option<&str>, step: isize) -> Option<String> {
    let len = stages.len() as isize + 1;
    let position = current
        .and_then(|name| stages.iter().position(|s| s == name))
        .map_or(0, |i| i as isize + 1);
    match (position + step).rem_euclid(len) {
        0 => None,
        next => Some(stages[next as usize - 1].clone()),
    }
}

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StageState>()
            .init_resource::<OffsetCache>()
            .init_resource::<ActiveOffsets>()
            .init_resource::<HelperVisibility>()
            .add_message::<SelectStage>()
            .add_message::<CycleStage>()
            .add_message::<ToggleHelpers>()
            .add_systems(
                Update,
                (handle_stage_requests, handle_helper_toggles).in_set(ViewerSet::Session),
            )
            .add_systems(Update, apply_session_offsets.in_set(ViewerSet::Reset))
            .add_systems(Update, draw_ground_grid.in_set(ViewerSet::Visibility));
    }
}
