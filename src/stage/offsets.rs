//! Per-character offset lookup and the transforms derived from it.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::content::{ContentError, OffsetConfig, apply_override};

/// Offsets fetched during this run, keyed by character. Failed or absent
/// lookups are cached as `None` so they are not retried.
#[derive(Resource, Debug, Default)]
pub struct OffsetCache {
    entries: HashMap<String, Option<OffsetConfig>>,
}

impl OffsetCache {
    /// Cached offsets for `character`, loading them on first use.
    pub fn lookup<F>(&mut self, character: &str, load: F) -> Option<&OffsetConfig>
    where
        F: FnOnce(&str) -> Result<Option<OffsetConfig>, ContentError>,
    {
        self.entries
            .entry(character.to_string())
            .or_insert_with(|| match load(character) {
                Ok(Some(config)) => Some(config),
                Ok(None) => {
                    debug!("No offsets for {}; using defaults", character);
                    None
                }
                Err(e) => {
                    warn!("{}; ignoring offsets for {}", e, character);
                    None
                }
            })
            .as_ref()
    }

    pub fn contains(&self, character: &str) -> bool {
        self.entries.contains_key(character)
    }
}

/// Offsets in effect for the current session.
#[derive(Resource, Debug, Default, Clone)]
pub struct ActiveOffsets {
    pub character: Option<String>,
    pub config: OffsetConfig,
}

impl ActiveOffsets {
    /// Transform of the actor root.
    pub fn model_transform(&self) -> Transform {
        apply_override(self.config.model.as_ref(), Transform::IDENTITY)
    }

    /// Transform of a stage scene root.
    pub fn stage_transform(&self, stage_scale: f32) -> Transform {
        apply_override(
            self.config.scene.as_ref(),
            Transform::from_scale(Vec3::splat(stage_scale)),
        )
    }
}
