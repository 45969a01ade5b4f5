//! Animation systems: per-part graphs, the readiness barrier and clip playback.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use super::library::{AnimationLibrary, ClipChoice, ClipRef, CurrentAnimation, choose_clip};
use super::{CycleAnimation, PartAnimator, PlayAnimation};
use crate::content::ViewerSettings;
use crate::core::SessionStarted;
use crate::loading::{LoadQueue, PartArena, parts_settled};
use crate::parts::PartType;
use crate::visibility::VisibleSet;

pub(crate) fn reset_on_session(
    mut started: MessageReader<SessionStarted>,
    mut library: ResMut<AnimationLibrary>,
    mut current: ResMut<CurrentAnimation>,
) {
    if started.read().last().is_some() {
        library.reset();
        *current = CurrentAnimation::default();
    }
}

pub(crate) fn handle_animation_requests(
    mut plays: MessageReader<PlayAnimation>,
    mut cycles: MessageReader<CycleAnimation>,
    mut library: ResMut<AnimationLibrary>,
) {
    for play in plays.read() {
        library.request(play.name.clone());
    }
    let step: isize = cycles.read().map(|c| c.step).sum();
    if step != 0
        && let Some(next) = library.cycle(step)
    {
        library.request(next);
    }
}

/// Once every part is loaded and bound, give each animation player a graph
/// holding its own clips plus the shared set, and pick a starting clip.
pub(crate) fn build_part_graphs(
    mut commands: Commands,
    queue: Res<LoadQueue>,
    arena: Res<PartArena>,
    mut library: ResMut<AnimationLibrary>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    if library.graphs_ready() || !parts_settled(&queue, &arena) {
        return;
    }

    for part in arena.iter() {
        let Some(player) = part.player else {
            continue;
        };
        let mut clips: Vec<&ClipRef> = part.clips.iter().collect();
        for shared in library.shared.clips() {
            if !clips.iter().any(|c| c.name == shared.name) {
                clips.push(shared);
            }
        }
        if clips.is_empty() {
            continue;
        }

        let (graph, indices) = AnimationGraph::from_clips(clips.iter().map(|c| c.handle.clone()));
        let nodes: HashMap<String, AnimationNodeIndex> = clips
            .iter()
            .map(|c| c.name.clone())
            .zip(indices)
            .collect();
        debug!("Animation graph for {}: {} clips", part.name(), nodes.len());

        commands.entity(player).insert((
            AnimationGraphHandle(graphs.add(graph)),
            AnimationTransitions::new(),
            PartAnimator { nodes },
        ));
    }

    library.set_graphs_ready();
    if library.requested().is_none() {
        let first = library
            .shared
            .default_clip()
            .or_else(|| arena.body().and_then(|b| b.clips.first()))
            .map(|c| c.name.clone());
        if let Some(name) = first {
            library.request(name);
        }
    }
    info!("All parts ready; {} shared clips", library.shared.clips().len());
}

/// Apply the pending clip to every part in one frame.
pub(crate) fn apply_pending_clip(
    arena: Res<PartArena>,
    settings: Res<ViewerSettings>,
    mut library: ResMut<AnimationLibrary>,
    mut current: ResMut<CurrentAnimation>,
    mut visible: ResMut<VisibleSet>,
    mut players: Query<(&mut AnimationPlayer, &mut AnimationTransitions, &PartAnimator)>,
) {
    if !library.graphs_ready() {
        return;
    }
    let Some(requested) = library.pending().map(str::to_string) else {
        return;
    };

    let crossfade = Duration::from_secs_f32(settings.crossfade_secs.max(0.0));
    let mut body_clip = None;

    for part in arena.iter() {
        match choose_clip(part.part_type(), &part.clips, &library.shared, &requested) {
            ClipChoice::Play(clip) => {
                visible.set_suppressed(part.name(), false);
                if let Some(player) = part.player
                    && let Ok((mut player, mut transitions, animator)) = players.get_mut(player)
                    && let Some(&node) = animator.nodes.get(&clip.name)
                {
                    transitions.play(&mut player, node, crossfade).repeat();
                }
                if part.part_type() == PartType::Body {
                    body_clip = Some(clip);
                }
            }
            ClipChoice::Hide => {
                debug!("{} has no clip for {}; hiding", part.name(), requested);
                visible.set_suppressed(part.name(), true);
            }
            ClipChoice::Hold => visible.set_suppressed(part.name(), false),
        }
    }

    let duration_secs = body_clip
        .as_ref()
        .map(|c| c.duration_secs)
        .or_else(|| library.shared.get(&requested).map(|c| c.duration_secs));
    *current = CurrentAnimation {
        name: Some(requested.clone()),
        duration_secs,
    };
    info!("Playing {} ({:.2}s)", requested, duration_secs.unwrap_or(0.0));
    library.mark_applied(&requested);
}
