//! Developer overlay (dev-tools builds): a text panel with the session, load
//! progress, current clip, capture state and the visible parts.
//!
//! F1 or ` toggles the panel. It hides itself while a capture suppresses
//! helpers.


use bevy::prelude::*;

use crate::animation::CurrentAnimation;
use crate::capture::{CaptureMachine, CaptureStatus};
use crate::core::{ViewerSession, ViewerSet};
use crate::loading::LoadQueue;
use crate::stage::HelperVisibility;
use crate::visibility::VisibleSet;

#[derive(Resource, Debug)]
pub struct DebugState {
    pub overlay_visible: bool,
}

impl Default for DebugState {
    fn default() -> Self {
        Self {
            overlay_visible: true,
        }
    }
}

/// Marker for the overlay text.
#[derive(Component, Debug)]
pub struct DebugInfoOverlay;

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>()
            .add_systems(Startup, spawn_debug_info_overlay)
            .add_systems(Update, toggle_debug_overlay.in_set(ViewerSet::Input))
            .add_systems(Update, update_debug_info_overlay.after(ViewerSet::Capture));
    }
}

fn spawn_debug_info_overlay(mut commands: Commands) {
    commands.spawn((
        DebugInfoOverlay,
        Text::new("Loading..."),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.9, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(20.0),
            bottom: Val::Px(20.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ZIndex(500),
    ));
}

fn toggle_debug_overlay(keyboard: Res<ButtonInput<KeyCode>>, mut state: ResMut<DebugState>) {
    if keyboard.just_pressed(KeyCode::F1) || keyboard.just_pressed(KeyCode::Backquote) {
        state.overlay_visible = !state.overlay_visible;
    }
}

/// Overlay body, one fact per line.
pub fn overlay_text(
    session: &ViewerSession,
    queue: &LoadQueue,
    current: &CurrentAnimation,
    machine: &CaptureMachine,
    status: &CaptureStatus,
    visible: &VisibleSet,
) -> String {
    let mut lines = vec![
        format!("Session: {}", session.label()),
        format!(
            "Load: {:?} {:.0}% ({} loaded, {} failed)",
            queue.phase(),
            queue.percent(),
            queue.loaded(),
            queue.failed()
        ),
        format!(
            "Animation: {}",
            match (&current.name, current.duration_secs) {
                (Some(name), Some(duration)) => format!("{name} ({duration:.2}s)"),
                (Some(name), None) => name.clone(),
                (None, _) => "-".to_string(),
            }
        ),
        format!("Capture: {}", machine.label()),
    ];
    if let Some(message) = &status.message {
        lines.push(format!("  {message}"));
    }
    lines.push("Parts:".to_string());
    for (slot, name) in visible.names().enumerate() {
        let mark = if visible.should_render(name) { 'x' } else { ' ' };
        lines.push(format!("  {} [{}] {}", (slot + 1) % 10, mark, name));
    }
    lines.join("\n")
}

#[allow(clippy::too_many_arguments)]
fn update_debug_info_overlay(
    state: Res<DebugState>,
    helpers: Res<HelperVisibility>,
    session: Res<ViewerSession>,
    queue: Res<LoadQueue>,
    current: Res<CurrentAnimation>,
    machine: Res<CaptureMachine>,
    status: Res<CaptureStatus>,
    visible: Res<VisibleSet>,
    mut overlay: Query<(&mut Text, &mut Visibility), With<DebugInfoOverlay>>,
) {
    let Ok((mut text, mut visibility)) = overlay.single_mut() else {
        return;
    };
    let shown = state.overlay_visible && !helpers.is_suppressed();
    visibility.set_if_neq(if shown {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    });
    if shown {
        **text = overlay_text(&session, &queue, &current, &machine, &status, &visible);
    }
}
