//! Material normalization.
//!
//! Every material of a loaded part is reduced to a diffuse texture, a tint
//! and an opacity, then rebuilt as an unlit material so all parts share one
//! look regardless of how they were authored.

use bevy::picking::Pickable;
use bevy::prelude::*;

/// Normalized view of one source material.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMaterial {
    pub name: String,
    pub diffuse: Option<Handle<Image>>,
    /// Tint with alpha forced to 1; opacity lives in its own field.
    pub color: Color,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialMode {
    Opaque,
    Blended,
    /// Fully transparent: the mesh is hidden and ignored by picking.
    Placeholder,
}

impl NormalizedMaterial {
    pub fn from_standard(name: impl Into<String>, source: &StandardMaterial) -> Self {
        let srgba = source.base_color.to_srgba();
        let opacity = match source.alpha_mode {
            AlphaMode::Opaque => 1.0,
            _ => srgba.alpha,
        };
        Self {
            name: name.into(),
            diffuse: source.base_color_texture.clone(),
            color: Color::Srgba(srgba.with_alpha(1.0)),
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    pub fn mode(&self) -> MaterialMode {
        if self.opacity <= 0.0 {
            MaterialMode::Placeholder
        } else if self.opacity < 1.0 {
            MaterialMode::Blended
        } else {
            MaterialMode::Opaque
        }
    }

    pub fn to_standard(&self) -> StandardMaterial {
        let alpha_mode = match self.mode() {
            MaterialMode::Opaque => AlphaMode::Opaque,
            MaterialMode::Blended | MaterialMode::Placeholder => AlphaMode::Blend,
        };
        StandardMaterial {
            base_color: self.color.with_alpha(self.opacity),
            base_color_texture: self.diffuse.clone(),
            unlit: true,
            alpha_mode,
            double_sided: true,
            cull_mode: None,
            ..default()
        }
    }
}

/// Components inserted on a mesh whose material normalized to a placeholder.
pub fn placeholder_bundle() -> (Visibility, Pickable) {
    (Visibility::Hidden, Pickable::IGNORE)
}
