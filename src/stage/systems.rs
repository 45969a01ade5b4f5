//! Stage systems: offsets per session, stage switching and the ground grid.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use super::helpers::HelperVisibility;
use super::offsets::{ActiveOffsets, OffsetCache};
use super::{CycleStage, SelectStage, StageRoot, StageState, ToggleHelpers, cycle_stage};
use crate::content::{ViewerSettings, load_offset_config};
use crate::core::{ActorRoot, SessionStarted};
use crate::parts::AssetCatalog;

const GRID_CELL_SIZE: f32 = 0.5;
const GRID_HALF_CELLS: i32 = 10;

/// Fetch the new character's offsets and re-place the actor and stage.
pub(crate) fn apply_session_offsets(
    mut started: MessageReader<SessionStarted>,
    catalog: Res<AssetCatalog>,
    settings: Res<ViewerSettings>,
    mut cache: ResMut<OffsetCache>,
    mut active: ResMut<ActiveOffsets>,
    mut actors: Query<&mut Transform, (With<ActorRoot>, Without<StageRoot>)>,
    mut stages: Query<&mut Transform, (With<StageRoot>, Without<ActorRoot>)>,
) {
    let Some(session) = started.read().last() else {
        return;
    };

    let config = cache
        .lookup(&session.character, |character| {
            load_offset_config(catalog.root(), character)
        })
        .cloned()
        .unwrap_or_default();
    *active = ActiveOffsets {
        character: Some(session.character.clone()),
        config,
    };

    for mut transform in &mut actors {
        *transform = active.model_transform();
    }
    for mut transform in &mut stages {
        *transform = active.stage_transform(settings.stage_scale);
    }
}

/// Swap the stage scene. At most one stage exists at a time.
#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_stage_requests(
    mut commands: Commands,
    mut selects: MessageReader<SelectStage>,
    mut cycles: MessageReader<CycleStage>,
    asset_server: Res<AssetServer>,
    catalog: Res<AssetCatalog>,
    settings: Res<ViewerSettings>,
    active: Res<ActiveOffsets>,
    mut stage: ResMut<StageState>,
) {
    let mut target = selects.read().last().map(|s| s.stage.clone());
    let step: isize = cycles.read().map(|c| c.step).sum();
    if step != 0 {
        target = Some(cycle_stage(
            &catalog.stages(),
            stage.current.as_deref(),
            step,
        ));
    }
    let Some(target) = target else {
        return;
    };
    if target == stage.current {
        return;
    }

    let path = match &target {
        Some(name) => match catalog.stage_path(name) {
            Some(path) => Some(path),
            None => {
                warn!("Unknown stage {}", name);
                return;
            }
        },
        None => None,
    };

    if let Some(old) = stage.entity.take() {
        commands.entity(old).try_despawn();
    }
    stage.current = None;

    match (target, path) {
        (Some(name), Some(path)) => {
            let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path));
            let entity = commands
                .spawn((
                    SceneRoot(scene),
                    StageRoot,
                    Name::new(format!("Stage {name}")),
                    active.stage_transform(settings.stage_scale),
                ))
                .id();
            info!("Stage: {}", name);
            stage.current = Some(name);
            stage.entity = Some(entity);
        }
        _ => info!("Stage cleared"),
    }
}

pub(crate) fn handle_helper_toggles(
    mut toggles: MessageReader<ToggleHelpers>,
    mut helpers: ResMut<HelperVisibility>,
) {
    for _ in toggles.read() {
        let shown = helpers.toggle();
        debug!("Helpers {}", if shown { "shown" } else { "hidden" });
    }
}

/// Ground grid drawn when no stage is loaded.
pub(crate) fn draw_ground_grid(
    mut gizmos: Gizmos,
    stage: Res<StageState>,
    helpers: Res<HelperVisibility>,
) {
    if stage.current.is_some() || !helpers.is_drawn() {
        return;
    }

    let extent = GRID_HALF_CELLS as f32 * GRID_CELL_SIZE;
    let color = Color::srgb(0.3, 0.3, 0.3);
    let axis_color = Color::srgb(0.5, 0.5, 0.5);

    for i in -GRID_HALF_CELLS..=GRID_HALF_CELLS {
        let pos = i as f32 * GRID_CELL_SIZE;
        let color = if i == 0 { axis_color } else { color };
        gizmos.line(
            Vec3::new(-extent, 0.0, pos),
            Vec3::new(extent, 0.0, pos),
            color,
        );
        gizmos.line(
            Vec3::new(pos, 0.0, -extent),
            Vec3::new(pos, 0.0, extent),
            color,
        );
    }
}
