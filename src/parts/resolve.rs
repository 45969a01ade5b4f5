//! Fallback resolution: turns a variant's classified folders into the final
//! part list, filling missing hair and weapons from the fallback tables.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::classify::{PartType, classify};
use crate::content::ViewerContent;

/// One resolved, loadable part of a character variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PartDescriptor {
    /// Unique within the variant; the folder name.
    pub name: String,
    /// Asset path relative to the asset root.
    pub path: String,
    pub part_type: PartType,
    /// Weapon renders at the authored mesh position instead of a hand bone.
    pub default_position: bool,
}

impl PartDescriptor {
    pub fn is_detachable(&self) -> bool {
        self.part_type.is_detachable()
    }

    /// Detachable parts that need a hand bone before they may be shown.
    pub fn needs_attachment(&self) -> bool {
        self.is_detachable() && !self.default_position
    }
}

/// Where mesh folders live. Implemented by the on-disk catalog; tests use an
/// in-memory map.
pub trait FolderSource {
    /// Asset path of the mesh inside `folder`, or `None` if the folder is
    /// missing or holds no mesh.
    fn mesh_path(&self, folder: &str) -> Option<String>;
}

/// Inputs for one variant resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub character: &'a str,
    pub variant: &'a str,
    /// Folder names belonging to this variant, in catalog order.
    pub folders: &'a [String],
}

/// Classify the variant's folders, apply the hair and weapon fallbacks, flag
/// default-position weapons, and sort by load rank. Never fails: unmatched
/// folders are dropped and missing fallback targets are skipped.
pub fn resolve_parts(
    request: ResolveRequest<'_>,
    content: &ViewerContent,
    source: &impl FolderSource,
) -> Vec<PartDescriptor> {
    let default_position = content.uses_default_weapon_position(request.character);
    let mut parts = Vec::new();
    let mut names = HashSet::new();

    for folder in request.folders {
        let Some(part_type) = classify(folder) else {
            debug!("Folder '{}' matches no part pattern, skipping", folder);
            continue;
        };
        if !push_part(
            &mut parts,
            &mut names,
            source,
            folder,
            part_type,
            default_position,
        ) {
            warn!("Folder '{}' holds no mesh, skipping", folder);
        }
    }

    if !parts.iter().any(|p| p.part_type.is_hair()) {
        if let Some(folder) = content.hair_fallback(request.character, request.variant) {
            if !push_part(
                &mut parts,
                &mut names,
                source,
                folder,
                PartType::Hair,
                default_position,
            ) {
                warn!(
                    "Hair fallback '{}' for {}_{} has no mesh, skipping",
                    folder, request.character, request.variant
                );
            }
        }
    }

    if !parts.iter().any(PartDescriptor::is_detachable) {
        for folder in content.weapon_fallbacks(request.character, request.variant) {
            let part_type = classify(folder)
                .filter(|t| t.is_detachable())
                .unwrap_or(PartType::Weapon);
            if !push_part(
                &mut parts,
                &mut names,
                source,
                folder,
                part_type,
                default_position,
            ) {
                warn!(
                    "Weapon fallback '{}' for {}_{} has no mesh, skipping",
                    folder, request.character, request.variant
                );
            }
        }
    }

    parts.sort_by_key(|p| p.part_type.load_rank());
    parts
}

/// Returns false when the folder has no mesh. Duplicate names are ignored but
/// count as present.
fn push_part(
    parts: &mut Vec<PartDescriptor>,
    names: &mut HashSet<String>,
    source: &impl FolderSource,
    folder: &str,
    part_type: PartType,
    default_position: bool,
) -> bool {
    if names.contains(folder) {
        return true;
    }
    let Some(path) = source.mesh_path(folder) else {
        return false;
    };
    names.insert(folder.to_string());
    parts.push(PartDescriptor {
        name: folder.to_string(),
        path,
        part_type,
        default_position: part_type.is_detachable() && default_position,
    });
    true
}
