//! Part loading systems: sequential issue, polling, scene spawn and binding.

use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::ecs::message::MessageReader;
use bevy::gltf::{Gltf, GltfMaterialName};
use bevy::prelude::*;
use bevy::scene::SceneInstance;
use std::collections::HashMap;

use super::arena::{LoadedPart, PartArena};
use super::material::{MaterialMode, NormalizedMaterial, placeholder_bundle};
use super::queue::{LoadPhase, LoadQueue, PartOutcome};
use super::{PartBound, PartRoot};
use crate::animation::{AnimationLibrary, ClipRef};
use crate::core::{ActorRoot, SessionStarted};
use crate::parts::PartType;

/// Drop every part of the previous session and queue the new part list.
pub(crate) fn reset_on_session(
    mut commands: Commands,
    mut started: MessageReader<SessionStarted>,
    mut queue: ResMut<LoadQueue>,
    mut arena: ResMut<PartArena>,
    roots: Query<Entity, With<PartRoot>>,
) {
    let Some(session) = started.read().last() else {
        return;
    };
    for root in &roots {
        commands.entity(root).try_despawn();
    }
    arena.clear();
    queue.begin(session.generation, &session.parts);
}

/// Issue the next queued part once nothing is in flight.
pub(crate) fn issue_next_part(asset_server: Res<AssetServer>, mut queue: ResMut<LoadQueue>) {
    let Some((index, descriptor)) = queue.next_to_issue() else {
        return;
    };
    debug!("Loading part {} from {}", descriptor.name, descriptor.path);
    let handle = asset_server.load::<Gltf>(descriptor.path.clone());
    queue.mark_issued(index, descriptor, handle);
}

/// Poll the in-flight load and spawn its scene once everything arrived.
pub(crate) fn poll_in_flight_part(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    clip_assets: Res<Assets<AnimationClip>>,
    mut queue: ResMut<LoadQueue>,
    mut arena: ResMut<PartArena>,
    mut library: ResMut<AnimationLibrary>,
    actor: Query<Entity, With<ActorRoot>>,
) {
    let Some(in_flight) = queue.in_flight().cloned() else {
        return;
    };
    let name = &in_flight.descriptor.name;

    if queue.is_stale(&in_flight) {
        debug!("Discarding stale load of {}", name);
        finish_part(&mut queue, PartOutcome::Failed);
        return;
    }

    let id = in_flight.handle.id();
    match asset_server.get_load_state(id) {
        Some(LoadState::Failed(err)) => {
            warn!("Failed to load part {}: {}", name, err);
            finish_part(&mut queue, PartOutcome::Failed);
            return;
        }
        Some(LoadState::Loaded) => queue.report(0.5),
        _ => return,
    }

    if !asset_server.is_loaded_with_dependencies(id) {
        if let Some(RecursiveDependencyLoadState::Failed(err)) =
            asset_server.get_recursive_dependency_load_state(id)
        {
            warn!("Failed to load dependencies of part {}: {}", name, err);
            finish_part(&mut queue, PartOutcome::Failed);
        }
        return;
    }

    let Some(gltf) = gltfs.get(id) else {
        warn!("Part {} finished loading but its document is gone", name);
        finish_part(&mut queue, PartOutcome::Failed);
        return;
    };
    let Some(scene) = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
    else {
        warn!("Part {} has no scene", name);
        finish_part(&mut queue, PartOutcome::Failed);
        return;
    };

    let clips = collect_clips(gltf, &clip_assets);
    if library.shared.offer(&clips) {
        info!("Shared animation set: {} clips from {}", clips.len(), name);
    }

    let descriptor = in_flight.descriptor;
    let part_type = descriptor.part_type;
    let mut root = commands.spawn((
        SceneRoot(scene),
        Name::new(descriptor.name.clone()),
        Transform::default(),
        Visibility::default(),
    ));
    if descriptor.needs_attachment() {
        root.insert(Visibility::Hidden);
    } else if let Ok(actor) = actor.single() {
        root.insert(ChildOf(actor));
    }
    let root = root.id();

    info!(
        "Loaded {} ({}, {} clips)",
        descriptor.name,
        part_type.label(),
        clips.len()
    );
    let handle = arena.insert(LoadedPart::new(descriptor, root, clips));
    commands.entity(root).insert(PartRoot {
        handle,
        generation: in_flight.generation,
    });
    finish_part(&mut queue, PartOutcome::Loaded(part_type));
}

fn finish_part(queue: &mut LoadQueue, outcome: PartOutcome) {
    let before = queue.phase();
    queue.finish(outcome);
    match queue.phase() {
        phase if phase == before => {}
        LoadPhase::Ready => info!(
            "All parts loaded: {} ok, {} failed",
            queue.loaded(),
            queue.failed()
        ),
        LoadPhase::Empty => warn!(
            "No body part loaded ({} failed); nothing to show",
            queue.failed()
        ),
        LoadPhase::Idle | LoadPhase::Loading => {}
    }
}

/// Named clips in document order.
fn collect_clips(gltf: &Gltf, clip_assets: &Assets<AnimationClip>) -> Vec<ClipRef> {
    let mut clips: Vec<(usize, ClipRef)> = gltf
        .named_animations
        .iter()
        .map(|(name, handle)| {
            let order = gltf
                .animations
                .iter()
                .position(|h| h == handle)
                .unwrap_or(usize::MAX);
            let duration_secs = clip_assets.get(handle).map_or(0.0, AnimationClip::duration);
            (
                order,
                ClipRef {
                    name: name.to_string(),
                    duration_secs,
                    handle: handle.clone(),
                },
            )
        })
        .collect();
    clips.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));
    clips.into_iter().map(|(_, clip)| clip).collect()
}

/// Inspect spawned scenes: record bones, hand bones and the animation player,
/// and normalize every material.
#[allow(clippy::too_many_arguments)]
pub(crate) fn bind_ready_parts(
    mut commands: Commands,
    scene_spawner: Res<SceneSpawner>,
    mut arena: ResMut<PartArena>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    roots: Query<(Entity, &PartRoot, &SceneInstance), Without<PartBound>>,
    children: Query<&Children>,
    names: Query<&Name>,
    players: Query<(), With<AnimationPlayer>>,
    meshes: Query<(&MeshMaterial3d<StandardMaterial>, Option<&GltfMaterialName>)>,
) {
    for (root, part_root, instance) in &roots {
        if !scene_spawner.instance_is_ready(**instance) {
            continue;
        }
        let Some(part) = arena.get_mut(part_root.handle) else {
            continue;
        };
        if part.root != root {
            continue;
        }

        let is_body = part.part_type() == PartType::Body;
        let mut normalized: HashMap<AssetId<StandardMaterial>, (Handle<StandardMaterial>, MaterialMode)> =
            HashMap::new();
        let mut placeholders = 0usize;

        for entity in children.iter_descendants(root) {
            if let Ok(name) = names.get(entity) {
                part.bones.entry(name.as_str().to_string()).or_insert(entity);
                if is_body && part.hand_bones.record(name.as_str(), entity) {
                    debug!("Hand bone {} on {}", name, part.descriptor.name);
                }
            }
            if part.player.is_none() && players.contains(entity) {
                part.player = Some(entity);
            }

            let Ok((mesh_material, material_name)) = meshes.get(entity) else {
                continue;
            };
            let source_id = mesh_material.id();
            let (handle, mode) = match normalized.get(&source_id) {
                Some(entry) => entry.clone(),
                None => {
                    let Some(source) = materials.get(source_id) else {
                        continue;
                    };
                    let name = material_name.map(|n| n.0.clone()).unwrap_or_default();
                    let material = NormalizedMaterial::from_standard(name, source);
                    let mode = material.mode();
                    let handle = materials.add(material.to_standard());
                    normalized.insert(source_id, (handle.clone(), mode));
                    (handle, mode)
                }
            };

            let mut mesh = commands.entity(entity);
            mesh.insert(MeshMaterial3d(handle));
            if mode == MaterialMode::Placeholder {
                mesh.insert(placeholder_bundle());
                placeholders += 1;
            }
        }

        part.materials_normalized = true;
        part.bound = true;
        commands.entity(root).insert(PartBound);
        debug!(
            "Bound {}: {} nodes, player: {}, {} materials ({} placeholders)",
            part.descriptor.name,
            part.bones.len(),
            part.player.is_some(),
            normalized.len(),
            placeholders
        );
        if is_body && part.hand_bones.is_empty() {
            debug!("Body {} has no hand bones", part.descriptor.name);
        }
    }
}

/// Copy the body skeleton's local bone poses onto parts that have no
/// animation player of their own, matching bones by name.
pub(crate) fn sync_follower_bones(arena: Res<PartArena>, mut transforms: Query<&mut Transform>) {
    let Some(body) = arena.body().filter(|b| b.bound) else {
        return;
    };

    for part in arena.iter().filter(|p| p.follows_body()) {
        for (bone, &target) in &part.bones {
            let Some(&source) = body.bones.get(bone) else {
                continue;
            };
            let Ok(pose) = transforms.get(source).map(|t| *t) else {
                continue;
            };
            if let Ok(mut transform) = transforms.get_mut(target) {
                *transform = pose;
            }
        }
    }
}
