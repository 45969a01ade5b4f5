//! Loaded parts of the current session, addressed by stable handles.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::animation::ClipRef;
use crate::attachment::HandBones;
use crate::parts::{PartDescriptor, PartType};

/// Index into the [`PartArena`]. Valid until the arena is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartHandle(pub u32);

#[derive(Debug, Clone)]
pub struct LoadedPart {
    pub descriptor: PartDescriptor,
    /// Entity carrying the part's `SceneRoot`.
    pub root: Entity,
    pub clips: Vec<ClipRef>,
    /// First `AnimationPlayer` under the scene root, found at bind time.
    pub player: Option<Entity>,
    /// Named descendants of the scene, found at bind time.
    pub bones: HashMap<String, Entity>,
    pub hand_bones: HandBones,
    pub materials_normalized: bool,
    /// Scene instance spawned and inspected.
    pub bound: bool,
}

impl LoadedPart {
    pub fn new(descriptor: PartDescriptor, root: Entity, clips: Vec<ClipRef>) -> Self {
        Self {
            descriptor,
            root,
            clips,
            player: None,
            bones: HashMap::new(),
            hand_bones: HandBones::default(),
            materials_normalized: false,
            bound: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn part_type(&self) -> PartType {
        self.descriptor.part_type
    }

    /// Body-like parts without their own player copy bone poses from the body.
    pub fn follows_body(&self) -> bool {
        self.bound
            && self.player.is_none()
            && self.part_type().is_body_like()
            && self.part_type() != PartType::Body
    }
}

#[derive(Resource, Debug, Default)]
pub struct PartArena {
    parts: Vec<LoadedPart>,
    by_name: HashMap<String, PartHandle>,
}

impl PartArena {
    /// Insert a part. A part with the same name replaces the earlier entry in
    /// place and keeps its handle.
    pub fn insert(&mut self, part: LoadedPart) -> PartHandle {
        if let Some(&handle) = self.by_name.get(part.name()) {
            self.parts[handle.0 as usize] = part;
            return handle;
        }
        let handle = PartHandle(self.parts.len() as u32);
        self.by_name.insert(part.name().to_string(), handle);
        self.parts.push(part);
        handle
    }

    pub fn get(&self, handle: PartHandle) -> Option<&LoadedPart> {
        self.parts.get(handle.0 as usize)
    }

    pub fn get_mut(&mut self, handle: PartHandle) -> Option<&mut LoadedPart> {
        self.parts.get_mut(handle.0 as usize)
    }

    pub fn handle_of(&self, name: &str) -> Option<PartHandle> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&LoadedPart> {
        self.handle_of(name).and_then(|h| self.get(h))
    }

    /// The body part, if one loaded.
    pub fn body(&self) -> Option<&LoadedPart> {
        self.parts
            .iter()
            .find(|p| p.part_type() == PartType::Body)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedPart> {
        self.parts.iter()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn all_bound(&self) -> bool {
        self.parts.iter().all(|p| p.bound)
    }

    pub fn clear(&mut self) {
        self.parts.clear();
        self.by_name.clear();
    }
}
