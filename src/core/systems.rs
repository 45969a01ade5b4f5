//! Core domain: scene setup and the selection -> session flow.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use super::events::{CycleVariant, SelectVariant, SessionStarted};
use super::resources::{Cli, ViewerSession};
use super::{ActorRoot, ViewerCamera};
use crate::content::ViewerContent;
use crate::parts::{AssetCatalog, ResolveRequest, resolve_parts};
use crate::stage::SelectStage;

pub(crate) fn setup_scene(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 1.2, 4.0).looking_at(Vec3::new(0.0, 0.9, 0.0), Vec3::Y),
        ViewerCamera,
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(3.0, 6.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        ActorRoot,
        Name::new("Actor"),
        Transform::default(),
        Visibility::default(),
    ));
}

/// Pick the launch character (or the first one on disk) and stage.
pub(crate) fn select_initial(
    options: Res<Cli>,
    catalog: Res<AssetCatalog>,
    content: Res<ViewerContent>,
    mut select_variant: MessageWriter<SelectVariant>,
    mut select_stage: MessageWriter<SelectStage>,
) {
    let character = match &options.character {
        Some(character) => Some(character.clone()),
        None => match catalog.characters() {
            Ok(characters) => characters
                .first()
                .map(|spelling| content.character_for_spelling(spelling).to_string()),
            Err(e) => {
                warn!("{}", e);
                None
            }
        },
    };

    match character {
        Some(character) => {
            select_variant.write(SelectVariant {
                character,
                variant: options.variant.clone(),
            });
        }
        None => warn!(
            "No characters found under {}",
            catalog.root().display()
        ),
    }

    if let Some(stage) = &options.stage {
        select_stage.write(SelectStage {
            stage: Some(stage.clone()),
        });
    }
}

/// Translate variant stepping into a concrete selection.
pub(crate) fn handle_cycle_variant(
    mut cycles: MessageReader<CycleVariant>,
    session: Res<ViewerSession>,
    catalog: Res<AssetCatalog>,
    content: Res<ViewerContent>,
    mut select_variant: MessageWriter<SelectVariant>,
) {
    let step: isize = cycles.read().map(|c| c.step).sum();
    if step == 0 {
        return;
    }
    let Some(character) = &session.character else {
        return;
    };

    let variants = match catalog.variants(content.folder_spelling(character)) {
        Ok(variants) if !variants.is_empty() => variants,
        Ok(_) => return,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };

    let current = session
        .variant
        .as_ref()
        .and_then(|v| variants.iter().position(|x| x == v))
        .unwrap_or(0) as isize;
    let next = (current + step).rem_euclid(variants.len() as isize) as usize;

    select_variant.write(SelectVariant {
        character: character.clone(),
        variant: Some(variants[next].clone()),
    });
}

/// Resolve the latest selection into a part list and start a new session.
pub(crate) fn start_session(
    mut requests: MessageReader<SelectVariant>,
    catalog: Res<AssetCatalog>,
    content: Res<ViewerContent>,
    mut session: ResMut<ViewerSession>,
    mut started: MessageWriter<SessionStarted>,
) {
    let Some(request) = requests.read().last().cloned() else {
        return;
    };

    let spelling = content.folder_spelling(&request.character).to_string();
    let variants = match catalog.variants(&spelling) {
        Ok(variants) => variants,
        Err(e) => {
            warn!("Cannot list variants of {}: {}", request.character, e);
            return;
        }
    };

    let variant = match request.variant {
        Some(variant) if variants.contains(&variant) => variant,
        Some(variant) => {
            warn!("{} has no variant {}", request.character, variant);
            return;
        }
        None => match variants.first() {
            Some(first) => first.clone(),
            None => {
                warn!("{} has no variants", request.character);
                return;
            }
        },
    };

    let folders = match catalog.variant_folders(&spelling, &variant) {
        Ok(folders) => folders,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };

    let parts = resolve_parts(
        ResolveRequest {
            character: &request.character,
            variant: &variant,
            folders: &folders,
        },
        &content,
        &*catalog,
    );

    let generation = session.advance(&request.character, &variant);
    info!(
        "Session {}: {} / {} with {} parts",
        generation,
        request.character,
        variant,
        parts.len()
    );
    for part in &parts {
        debug!("  {} ({}) -> {}", part.name, part.part_type.label(), part.path);
    }

    started.write(SessionStarted {
        generation,
        character: request.character,
        variant,
        parts,
    });
}
