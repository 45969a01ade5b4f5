//! Hand-bone detection in the body skeleton.

use bevy::prelude::*;

use crate::parts::{HandSide, PartType};

const FINGER_WORDS: &[&str] = &["thumb", "index", "middle", "ring", "pinky", "finger"];

/// Which hand a bone name refers to, if any.
///
/// The name must mention `hand` plus a side: `right`/`left` anywhere, or an
/// `r`/`l` token (`Bip01_R_Hand`, `hand.l`, `RHand`). Finger bones under the
/// hand are ignored.
pub fn hand_side(bone_name: &str) -> Option<HandSide> {
    let lower = bone_name.to_ascii_lowercase();
    if !lower.contains("hand") || FINGER_WORDS.iter().any(|w| lower.contains(w)) {
        return None;
    }
    if lower.contains("right") {
        return Some(HandSide::Right);
    }
    if lower.contains("left") {
        return Some(HandSide::Left);
    }

    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find_map(|token| match token {
            "r" | "rhand" | "handr" => Some(HandSide::Right),
            "l" | "lhand" | "handl" => Some(HandSide::Left),
            _ => None,
        })
}

/// Hand bones found in the body part's hierarchy. First match per side wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandBones {
    pub right: Option<Entity>,
    pub left: Option<Entity>,
}

impl HandBones {
    /// Record `entity` if `name` is an unclaimed hand bone. Returns true when recorded.
    pub fn record(&mut self, name: &str, entity: Entity) -> bool {
        let slot = match hand_side(name) {
            Some(HandSide::Right) => &mut self.right,
            Some(HandSide::Left) => &mut self.left,
            None => return false,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(entity);
        true
    }

    pub fn side(&self, side: HandSide) -> Option<Entity> {
        match side {
            HandSide::Right => self.right,
            HandSide::Left => self.left,
        }
    }

    /// Bone for `part_type`, falling back to the other hand when its own is absent.
    pub fn for_part(&self, part_type: PartType) -> Option<Entity> {
        let side = part_type.hand_side()?;
        self.side(side).or_else(|| self.side(side.opposite()))
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_none() && self.left.is_none()
    }
}
