//! Animation library: the session-wide shared clip set and per-part clip choice.

use bevy::prelude::*;

use super::naming::weapon_clip_name;
use crate::parts::PartType;

/// One named clip exposed by a loaded part.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRef {
    pub name: String,
    pub duration_secs: f32,
    pub handle: Handle<AnimationClip>,
}

/// The first non-empty clip list observed during a session. Once set it never
/// changes until the next session replaces the whole value.
#[derive(Debug, Clone, Default)]
pub struct SharedAnimationSet {
    clips: Option<Vec<ClipRef>>,
}

impl SharedAnimationSet {
    /// Offer a part's clips. Returns true if they became the shared set.
    pub fn offer(&mut self, clips: &[ClipRef]) -> bool {
        if self.clips.is_some() || clips.is_empty() {
            return false;
        }
        self.clips = Some(clips.to_vec());
        true
    }

    pub fn is_empty(&self) -> bool {
        self.clips.as_ref().is_none_or(Vec::is_empty)
    }

    pub fn clips(&self) -> &[ClipRef] {
        self.clips.as_deref().unwrap_or(&[])
    }

    pub fn get(&self, name: &str) -> Option<&ClipRef> {
        self.clips().iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clips().iter().map(|c| c.name.as_str())
    }

    /// Clip to start with: the first whose name mentions "idle", else the first.
    pub fn default_clip(&self) -> Option<&ClipRef> {
        self.clips()
            .iter()
            .find(|c| c.name.to_ascii_lowercase().contains("idle"))
            .or_else(|| self.clips().first())
    }
}

/// What a part should do for a requested clip.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipChoice {
    Play(ClipRef),
    /// Weapon has no matching clip; hide it for this animation.
    Hide,
    /// Nothing to play; keep the current pose and visibility.
    Hold,
}

/// Resolve `requested` for one part.
///
/// Body-like parts look in their own clips, then the shared set. Weapons with
/// their own clips play the derived weapon clip or are hidden; weapons without
/// clips are rigid and just hold.
pub fn choose_clip(
    part_type: PartType,
    own: &[ClipRef],
    shared: &SharedAnimationSet,
    requested: &str,
) -> ClipChoice {
    if part_type.is_detachable() {
        if own.is_empty() {
            return ClipChoice::Hold;
        }
        let derived = weapon_clip_name(requested);
        return own
            .iter()
            .find(|c| c.name == derived)
            .or_else(|| shared.get(&derived))
            .cloned()
            .map_or(ClipChoice::Hide, ClipChoice::Play);
    }

    own.iter()
        .find(|c| c.name == requested)
        .or_else(|| shared.get(requested))
        .cloned()
        .map_or(ClipChoice::Hold, ClipChoice::Play)
}

/// Session animation state: the shared set plus the pending request.
#[derive(Resource, Debug, Default)]
pub struct AnimationLibrary {
    pub shared: SharedAnimationSet,
    requested: Option<String>,
    applied: Option<String>,
    graphs_ready: bool,
}

impl AnimationLibrary {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn request(&mut self, name: impl Into<String>) {
        self.requested = Some(name.into());
    }

    pub fn requested(&self) -> Option<&str> {
        self.requested.as_deref()
    }

    pub fn applied(&self) -> Option<&str> {
        self.applied.as_deref()
    }

    /// The request waiting to be applied, if it differs from the applied one.
    pub fn pending(&self) -> Option<&str> {
        match (&self.requested, &self.applied) {
            (Some(req), Some(applied)) if req == applied => None,
            (req, _) => req.as_deref(),
        }
    }

    /// Apply the current request again, restarting the clip from its start.
    pub fn replay(&mut self) {
        self.applied = None;
    }

    pub fn mark_applied(&mut self, name: &str) {
        self.applied = Some(name.to_string());
    }

    pub fn graphs_ready(&self) -> bool {
        self.graphs_ready
    }

    pub fn set_graphs_ready(&mut self) {
        self.graphs_ready = true;
    }

    /// Name `step` positions away from the current request in the shared set,
    /// wrapping around.
    pub fn cycle(&self, step: isize) -> Option<String> {
        let clips = self.shared.clips();
        if clips.is_empty() {
            return None;
        }
        let len = clips.len() as isize;
        let current = self
            .requested
            .as_deref()
            .and_then(|name| clips.iter().position(|c| c.name == name))
            .map_or(0, |i| i as isize);
        let next = (current + step).rem_euclid(len) as usize;
        Some(clips[next].name.clone())
    }
}

/// Body clip currently playing; its duration bounds animation exports.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct CurrentAnimation {
    pub name: Option<String>,
    pub duration_secs: Option<f32>,
}
