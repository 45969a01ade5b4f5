//! Visibility domain: which parts render, user toggles, and the sync onto
//! scene roots.

mod set;
#[cfg(test)]
mod tests;

pub use set::{ToggleOutcome, VisibleSet};

use bevy::ecs::message::{Message, MessageReader};
use bevy::prelude::*;

use crate::core::{SessionStarted, ViewerSet};
use crate::loading::{PartArena, PartRoot};

/// Flip one part in or out of the visible set.
#[derive(Debug, Clone)]
pub struct TogglePart {
    pub name: String,
}

impl Message for TogglePart {}

pub struct VisibilityPlugin;

impl Plugin for VisibilityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisibleSet>()
            .add_message::<TogglePart>()
            .add_systems(Update, rebuild_on_session.in_set(ViewerSet::Reset))
            .add_systems(
                Update,
                (handle_toggles, apply_part_visibility)
                    .chain()
                    .in_set(ViewerSet::Visibility),
            );
    }
}

fn rebuild_on_session(mut started: MessageReader<SessionStarted>, mut visible: ResMut<VisibleSet>) {
    if let Some(session) = started.read().last() {
        visible.rebuild(&session.parts);
    }
}

fn handle_toggles(mut toggles: MessageReader<TogglePart>, mut visible: ResMut<VisibleSet>) {
    for toggle in toggles.read() {
        match visible.toggle(&toggle.name) {
            ToggleOutcome::Shown => info!("Showing {}", toggle.name),
            ToggleOutcome::Hidden => info!("Hiding {}", toggle.name),
            ToggleOutcome::Refused => {
                info!("{} is not attached to a hand yet", toggle.name)
            }
            ToggleOutcome::Unknown => debug!("No part named {}", toggle.name),
        }
    }
}

/// Write `Visibility` on every part root from the visible set.
fn apply_part_visibility(
    visible: Res<VisibleSet>,
    arena: Res<PartArena>,
    mut roots: Query<(Entity, &PartRoot, &mut Visibility)>,
) {
    for (entity, root, mut visibility) in &mut roots {
        let Some(part) = arena.get(root.handle).filter(|p| p.root == entity) else {
            continue;
        };
        let target = if visible.should_render(part.name()) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(target);
    }
}
