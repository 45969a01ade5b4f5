//! Keyboard bindings. Every key is turned into a domain message; nothing here
//! touches viewer state directly.
//!
//! | Key          | Action                         |
//! |--------------|--------------------------------|
//! | 1-9, 0       | toggle the Nth part            |
//! | Left / Right | previous / next animation      |
//! | Up / Down    | previous / next variant        |
//! | S            | next stage                     |
//! | H            | toggle grid and helpers        |
//! | P, F12       | screenshot                     |
//! | R            | start / stop recording         |
//! | E            | record one animation cycle     |
//! | G            | convert last recording to GIF  |
//! | X            | export part assets             |


use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::animation::CycleAnimation;
use crate::capture::CaptureRequest;
use crate::core::{CycleVariant, ViewerSet};
use crate::stage::{CycleStage, ToggleHelpers};
use crate::visibility::{TogglePart, VisibleSet};

const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
    KeyCode::Digit0,
];

/// Part slot bound to a digit key; `0` is the tenth part.
pub fn digit_slot(key: KeyCode) -> Option<usize> {
    DIGITS.iter().position(|k| *k == key)
}

/// Capture request bound to `key`, if any.
pub fn capture_binding(key: KeyCode) -> Option<CaptureRequest> {
    match key {
        KeyCode::KeyP | KeyCode::F12 => Some(CaptureRequest::Screenshot),
        KeyCode::KeyR => Some(CaptureRequest::ToggleRecording),
        KeyCode::KeyE => Some(CaptureRequest::ExportAnimation),
        KeyCode::KeyG => Some(CaptureRequest::ConvertToGif),
        KeyCode::KeyX => Some(CaptureRequest::ExportAssets),
        _ => None,
    }
}

fn axis(keyboard: &ButtonInput<KeyCode>, back: KeyCode, forward: KeyCode) -> isize {
    keyboard.just_pressed(forward) as isize - keyboard.just_pressed(back) as isize
}

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (read_part_keys, read_navigation_keys, read_capture_keys).in_set(ViewerSet::Input),
        );
    }
}

pub(crate) fn read_part_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    visible: Res<VisibleSet>,
    mut toggles: MessageWriter<TogglePart>,
) {
    for key in keyboard.get_just_pressed() {
        let Some(slot) = digit_slot(*key) else {
            continue;
        };
        match visible.name_at(slot) {
            Some(name) => {
                toggles.write(TogglePart {
                    name: name.to_string(),
                });
            }
            None => debug!("No part in slot {}", slot + 1),
        }
    }
}

pub(crate) fn read_navigation_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut animations: MessageWriter<CycleAnimation>,
    mut variants: MessageWriter<CycleVariant>,
    mut stages: MessageWriter<CycleStage>,
    mut helpers: MessageWriter<ToggleHelpers>,
) {
    let step = axis(&keyboard, KeyCode::ArrowLeft, KeyCode::ArrowRight);
    if step != 0 {
        animations.write(CycleAnimation { step });
    }
    let step = axis(&keyboard, KeyCode::ArrowUp, KeyCode::ArrowDown);
    if step != 0 {
        variants.write(CycleVariant { step });
    }
    if keyboard.just_pressed(KeyCode::KeyS) {
        stages.write(CycleStage { step: 1 });
    }
    if keyboard.just_pressed(KeyCode::KeyH) {
        helpers.write(ToggleHelpers);
    }
}

pub(crate) fn read_capture_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut captures: MessageWriter<CaptureRequest>,
) {
    // One request per frame; the machine would refuse the rest as busy.
    if let Some(request) = keyboard.get_just_pressed().find_map(|k| capture_binding(*k)) {
        captures.write(request);
    }
}
