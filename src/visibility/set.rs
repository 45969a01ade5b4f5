//! The set of parts the viewer intends to render.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::parts::PartDescriptor;

/// Result of a user toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Shown,
    Hidden,
    /// Weapon not attached to a hand yet.
    Refused,
    Unknown,
}

#[derive(Debug, Clone)]
struct Known {
    name: String,
    needs_attachment: bool,
}

#[derive(Resource, Debug, Default)]
pub struct VisibleSet {
    known: Vec<Known>,
    shown: HashSet<String>,
    attached: HashSet<String>,
    /// Weapons hidden by the current animation.
    suppressed: HashSet<String>,
}

impl VisibleSet {
    /// Start over for a new part list: body-like parts and default-position
    /// weapons are shown, attachable weapons wait for their hand bone.
    pub fn rebuild(&mut self, parts: &[PartDescriptor]) {
        self.known = parts
            .iter()
            .map(|p| Known {
                name: p.name.clone(),
                needs_attachment: p.needs_attachment(),
            })
            .collect();
        self.shown = parts
            .iter()
            .filter(|p| !p.needs_attachment())
            .map(|p| p.name.clone())
            .collect();
        self.attached.clear();
        self.suppressed.clear();
    }

    pub fn toggle(&mut self, name: &str) -> ToggleOutcome {
        let Some(known) = self.known.iter().find(|k| k.name == name) else {
            return ToggleOutcome::Unknown;
        };
        if self.shown.remove(name) {
            return ToggleOutcome::Hidden;
        }
        if known.needs_attachment && !self.attached.contains(name) {
            return ToggleOutcome::Refused;
        }
        self.shown.insert(name.to_string());
        ToggleOutcome::Shown
    }

    /// Record that a weapon reached its hand bone. The first confirmation
    /// also adds it to the set; returns true in that case.
    pub fn confirm_attached(&mut self, name: &str) -> bool {
        if !self.known.iter().any(|k| k.name == name) || !self.attached.insert(name.to_string()) {
            return false;
        }
        self.shown.insert(name.to_string());
        true
    }

    pub fn set_suppressed(&mut self, name: &str, suppressed: bool) {
        if suppressed {
            self.suppressed.insert(name.to_string());
        } else {
            self.suppressed.remove(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shown.contains(name)
    }

    pub fn should_render(&self, name: &str) -> bool {
        let Some(known) = self.known.iter().find(|k| k.name == name) else {
            return false;
        };
        self.shown.contains(name)
            && (!known.needs_attachment || self.attached.contains(name))
            && !self.suppressed.contains(name)
    }

    /// Part name at a position of the session part list.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.known.get(index).map(|k| k.name.as_str())
    }

    /// Names in part-list order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(|k| k.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
