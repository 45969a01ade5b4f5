//! Visibility of debug helpers (ground grid) with capture suppression.

use bevy::prelude::*;
use std::collections::HashSet;

/// Helpers are drawn when the user wants them and nothing suppresses them.
/// Captures suppress helpers for their duration.
#[derive(Resource, Debug)]
pub struct HelperVisibility {
    pub shown: bool,
    suppressors: HashSet<String>,
}

impl Default for HelperVisibility {
    fn default() -> Self {
        Self {
            shown: true,
            suppressors: HashSet::new(),
        }
    }
}

impl HelperVisibility {
    pub fn is_drawn(&self) -> bool {
        self.shown && self.suppressors.is_empty()
    }

    pub fn toggle(&mut self) -> bool {
        self.shown = !self.shown;
        self.shown
    }

    pub fn suppress(&mut self, source: impl Into<String>) {
        self.suppressors.insert(source.into());
    }

    pub fn release(&mut self, source: &str) {
        self.suppressors.remove(source);
    }

    pub fn is_suppressed(&self) -> bool {
        !self.suppressors.is_empty()
    }
}
