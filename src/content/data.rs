//! Content domain: schema definitions for viewer settings and external JSON tables.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Viewer settings (data/viewer.ron)
// ============================================================================

/// Tunables for the render pipeline, loaded once at startup.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub schema_version: u32,
    /// How long weapons keep being re-parented onto the hand bone.
    pub stabilization: StabilizationPolicy,
    /// Crossfade window when switching clips.
    pub crossfade_secs: f32,
    /// Default weapon rotation correction, XYZ Euler degrees.
    pub weapon_rotation_deg: [f32; 3],
    /// Uniform scale applied to stage scenes without an offset override.
    pub stage_scale: f32,
    pub recording_fps: u32,
    /// Slack added after the clip duration in "export current animation" mode.
    pub recording_buffer_secs: f32,
    /// Any recording stops on its own after this many seconds.
    pub max_recording_secs: f32,
    pub gif_fps: u32,
    /// Directory (relative to the working dir) receiving screenshots and recordings.
    pub captures_dir: String,
    /// Frames to wait for a screenshot before giving up and restoring helpers.
    pub screenshot_timeout_frames: u32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            schema_version: 1,
            stabilization: StabilizationPolicy::default(),
            crossfade_secs: 0.25,
            weapon_rotation_deg: [90.0, 0.0, 0.0],
            stage_scale: 0.01,
            recording_fps: 30,
            recording_buffer_secs: 0.05,
            max_recording_secs: 60.0,
            gif_fps: 15,
            captures_dir: "captures".to_string(),
            screenshot_timeout_frames: 120,
        }
    }
}

impl ViewerSettings {
    /// Default weapon rotation as a quaternion.
    pub fn weapon_rotation(&self) -> Quat {
        euler_degrees(self.weapon_rotation_deg)
    }
}

/// Policy deciding when weapon re-parenting may stop.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub enum StabilizationPolicy {
    /// Re-parent for a fixed number of animated frames.
    FixedFrames(u32),
    /// Re-parent until the hand bone moves less than `threshold` world units
    /// between two consecutive frames, but never longer than `max_frames`.
    PoseDelta { threshold: f32, max_frames: u32 },
}

impl Default for StabilizationPolicy {
    fn default() -> Self {
        Self::FixedFrames(10)
    }
}

// ============================================================================
// External JSON tables (data/*.json)
// ============================================================================

/// `fallback key -> folder` or `fallback key -> [folders]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FolderList {
    One(String),
    Many(Vec<String>),
}

impl FolderList {
    pub fn as_slice(&self) -> &[String] {
        match self {
            FolderList::One(folder) => std::slice::from_ref(folder),
            FolderList::Many(folders) => folders,
        }
    }
}

/// Alternate on-disk folder spelling per character.
pub type NameAliases = HashMap<String, String>;

/// `"{character}_{variant}" -> folder`
pub type HairFallbacks = HashMap<String, String>;

/// `"{character}_{variant}" -> folder | [folders]`
pub type WeaponFallbacks = HashMap<String, FolderList>;

/// Characters whose weapons render at the authored mesh position.
pub type DefaultWeaponPosition = HashSet<String>;

// ============================================================================
// Per-character offsets (offsets/<character>.json)
// ============================================================================

/// Per-character transform corrections for model, weapon and stage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OffsetConfig {
    #[serde(default)]
    pub scene: Option<TransformOverride>,
    #[serde(default)]
    pub model: Option<TransformOverride>,
    #[serde(default)]
    pub weapon: Option<TransformOverride>,
}

/// Optional position / rotation / scale override. Unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransformOverride {
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    /// XYZ Euler angles in degrees.
    #[serde(default)]
    pub rotation: Option<[f32; 3]>,
    #[serde(default)]
    pub scale: Option<ScaleOverride>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ScaleOverride {
    Uniform(f32),
    Axes([f32; 3]),
}

impl ScaleOverride {
    pub fn to_vec3(self) -> Vec3 {
        match self {
            ScaleOverride::Uniform(s) => Vec3::splat(s),
            ScaleOverride::Axes(axes) => Vec3::from_array(axes),
        }
    }
}

impl TransformOverride {
    /// Overlay the set fields onto `base`.
    pub fn apply(&self, base: Transform) -> Transform {
        let mut transform = base;
        if let Some(position) = self.position {
            transform.translation = Vec3::from_array(position);
        }
        if let Some(rotation) = self.rotation {
            transform.rotation = euler_degrees(rotation);
        }
        if let Some(scale) = self.scale {
            transform.scale = scale.to_vec3();
        }
        transform
    }
}

/// Apply an optional override, falling back to `base` when absent.
pub fn apply_override(over: Option<&TransformOverride>, base: Transform) -> Transform {
    over.map_or(base, |o| o.apply(base))
}

pub fn euler_degrees(deg: [f32; 3]) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        deg[0].to_radians(),
        deg[1].to_radians(),
        deg[2].to_radians(),
    )
}
