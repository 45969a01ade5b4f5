//! Core domain: the viewing session, scene setup and frame ordering.

mod events;
mod resources;
mod systems;
#[cfg(test)]
mod tests;

pub use events::{CycleVariant, SelectVariant, SessionStarted};
pub use resources::{Cli, DEFAULT_ASSETS_ROOT, ViewerSession, resolve_assets_root};

use bevy::prelude::*;

use systems::{handle_cycle_variant, select_initial, setup_scene, start_session};

/// Parent of every body-like part. The model offset lives on its transform.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ActorRoot;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ViewerCamera;

/// Frame phases inside `Update`, run in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerSet {
    Input,
    Session,
    /// Per-session state reset after a `SessionStarted`.
    Reset,
    Load,
    Animate,
    Attach,
    Visibility,
    Capture,
}

pub struct CorePlugin {
    pub cli: Cli,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.cli.clone())
            .init_resource::<ViewerSession>()
            .add_message::<SelectVariant>()
            .add_message::<CycleVariant>()
            .add_message::<SessionStarted>()
            .configure_sets(
                Update,
                (
                    ViewerSet::Input,
                    ViewerSet::Session,
                    ViewerSet::Reset,
                    ViewerSet::Load,
                    ViewerSet::Animate,
                    ViewerSet::Attach,
                    ViewerSet::Visibility,
                    ViewerSet::Capture,
                )
                    .chain(),
            )
            .add_systems(Startup, (setup_scene, select_initial))
            .add_systems(
                Update,
                (handle_cycle_variant, start_session)
                    .chain()
                    .in_set(ViewerSet::Session),
            );
    }
}
