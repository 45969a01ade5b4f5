//! Attachment systems: watch the body animation and move weapons onto hands.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use super::tracker::{AttachStep, AttachmentRegistry};
use super::BodyAnimationClock;
use crate::animation::AnimationLibrary;
use crate::content::{TransformOverride, ViewerSettings, apply_override};
use crate::core::SessionStarted;
use crate::loading::PartArena;
use crate::stage::ActiveOffsets;
use crate::visibility::VisibleSet;

/// Local transform a weapon gets under its hand bone.
pub fn weapon_correction(settings: &ViewerSettings, over: Option<&TransformOverride>) -> Transform {
    apply_override(over, Transform::from_rotation(settings.weapon_rotation()))
}

pub(crate) fn reset_on_session(
    mut started: MessageReader<SessionStarted>,
    mut registry: ResMut<AttachmentRegistry>,
    mut clock: ResMut<BodyAnimationClock>,
) {
    let Some(session) = started.read().last() else {
        return;
    };
    registry.reset(
        session
            .parts
            .iter()
            .filter(|p| p.needs_attachment())
            .map(|p| p.name.as_str()),
    );
    *clock = BodyAnimationClock::default();
}

/// Count frames on which the body's animation player is running. A body
/// without a player never animates, so its bind pose counts as settled.
pub(crate) fn track_body_animation(
    arena: Res<PartArena>,
    library: Res<AnimationLibrary>,
    players: Query<&AnimationPlayer>,
    mut clock: ResMut<BodyAnimationClock>,
) {
    let Some(body) = arena.body().filter(|b| b.bound) else {
        return;
    };
    let playing = body
        .player
        .and_then(|p| players.get(p).ok())
        .is_some_and(|player| player.playing_animations().next().is_some());

    // With no clip anywhere the bind pose is final.
    let no_clips = library.shared.is_empty() && body.clips.is_empty();
    let no_player = body.player.is_none();
    let static_pose = library.graphs_ready() && (no_clips || no_player);

    if static_pose && no_player && !no_clips && !clock.warned_no_player {
        warn!(
            "{} has no animation player; shared clips cannot play on it and weapons attach to its bind pose",
            body.name()
        );
        clock.warned_no_player = true;
    }

    if playing || static_pose {
        clock.frames_playing = clock.frames_playing.saturating_add(1);
    }
}

/// Re-parent waiting weapons onto their hand bone until the window closes.
#[allow(clippy::too_many_arguments)]
pub(crate) fn stabilize_weapons(
    mut commands: Commands,
    arena: Res<PartArena>,
    settings: Res<ViewerSettings>,
    offsets: Res<ActiveOffsets>,
    clock: Res<BodyAnimationClock>,
    mut registry: ResMut<AttachmentRegistry>,
    mut visible: ResMut<VisibleSet>,
    globals: Query<&GlobalTransform>,
) {
    let Some(body) = arena.body().filter(|b| b.bound) else {
        return;
    };
    let correction = weapon_correction(&settings, offsets.config.weapon.as_ref());

    for part in arena
        .iter()
        .filter(|p| p.bound && p.descriptor.needs_attachment())
    {
        let Some(state) = registry.get_mut(part.name()) else {
            continue;
        };
        let bone = body.hand_bones.for_part(part.part_type());
        let bone_translation = bone
            .and_then(|b| globals.get(b).ok())
            .map(GlobalTransform::translation);

        match state.step(
            clock.has_started(),
            bone,
            bone_translation,
            &settings.stabilization,
        ) {
            AttachStep::Reparent(bone) => {
                commands
                    .entity(part.root)
                    .remove::<ChildOf>()
                    .insert((correction, ChildOf(bone)));
                if visible.confirm_attached(part.name()) {
                    info!("{} attached to hand bone", part.name());
                }
                if state.is_stabilized() {
                    debug!(
                        "{} stabilized after {} frames",
                        part.name(),
                        state.frames_since_attach()
                    );
                }
            }
            AttachStep::Missed => {
                warn!("No hand bone for {}; it stays hidden", part.name());
            }
            AttachStep::Waiting | AttachStep::Idle => {}
        }
    }
}
