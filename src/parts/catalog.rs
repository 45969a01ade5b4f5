//! On-disk asset catalog.
//!
//! Layout: `models/<character>/<folder>/<mesh>.glb` where the folder name is
//! `{character}_{variant}_{role...}`, plus `stages/<stage>.glb`.

use bevy::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::resolve::FolderSource;

pub const MODELS_DIR: &str = "models";
pub const STAGES_DIR: &str = "stages";
const MESH_EXTENSIONS: &[&str] = &["glb", "gltf"];

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Walks the asset store rooted at the Bevy asset directory.
#[derive(Resource, Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of an asset path returned by this catalog.
    pub fn absolute(&self, asset_path: &str) -> PathBuf {
        self.root.join(asset_path)
    }

    /// Character directories (on-disk spelling), sorted.
    pub fn characters(&self) -> Result<Vec<String>, CatalogError> {
        list_entries(&self.root.join(MODELS_DIR), EntryKind::Dir)
    }

    /// Variant keys available for a character spelling, sorted and unique.
    pub fn variants(&self, spelling: &str) -> Result<Vec<String>, CatalogError> {
        let mut variants: Vec<String> = self
            .folders(spelling)?
            .iter()
            .filter_map(|folder| folder_variant(spelling, folder))
            .map(str::to_string)
            .collect();
        variants.sort();
        variants.dedup();
        Ok(variants)
    }

    /// Folders belonging to one variant of a character spelling.
    pub fn variant_folders(
        &self,
        spelling: &str,
        variant: &str,
    ) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .folders(spelling)?
            .into_iter()
            .filter(|folder| folder_variant(spelling, folder) == Some(variant))
            .collect())
    }

    /// Stage names (file stems under `stages/`), sorted. An absent directory
    /// means no stages.
    pub fn stages(&self) -> Vec<String> {
        let dir = self.root.join(STAGES_DIR);
        match list_entries(&dir, EntryKind::Mesh) {
            Ok(files) => files
                .iter()
                .filter_map(|f| Path::new(f).file_stem())
                .map(|s| s.to_string_lossy().into_owned())
                .collect(),
            Err(e) => {
                debug!("{}", e);
                Vec::new()
            }
        }
    }

    pub fn stage_path(&self, stage: &str) -> Option<String> {
        let dir = self.root.join(STAGES_DIR);
        let files = list_entries(&dir, EntryKind::Mesh).ok()?;
        files
            .into_iter()
            .find(|f| Path::new(f).file_stem().is_some_and(|s| s == stage))
            .map(|f| format!("{STAGES_DIR}/{f}"))
    }

    fn folders(&self, spelling: &str) -> Result<Vec<String>, CatalogError> {
        list_entries(&self.root.join(MODELS_DIR).join(spelling), EntryKind::Dir)
    }

    fn mesh_in(&self, character_dir: &str, folder: &str) -> Option<String> {
        let dir = self.root.join(MODELS_DIR).join(character_dir).join(folder);
        let mesh = list_entries(&dir, EntryKind::Mesh).ok()?.into_iter().next()?;
        Some(format!("{MODELS_DIR}/{character_dir}/{folder}/{mesh}"))
    }
}

impl FolderSource for AssetCatalog {
    fn mesh_path(&self, folder: &str) -> Option<String> {
        // Fast path: the folder prefix names its character directory.
        if let Some(prefix) = folder.split('_').next() {
            if let Some(path) = self.mesh_in(prefix, folder) {
                return Some(path);
            }
        }
        // Fallback folders may live under another character's directory.
        self.characters()
            .ok()?
            .iter()
            .find_map(|character| self.mesh_in(character, folder))
    }
}

/// Variant segment of `{spelling}_{variant}_{role}`; `None` for folders of
/// another character or without a role segment.
pub fn folder_variant<'a>(spelling: &str, folder: &'a str) -> Option<&'a str> {
    let rest = folder.strip_prefix(spelling)?.strip_prefix('_')?;
    let (variant, role) = rest.split_once('_')?;
    (!variant.is_empty() && !role.is_empty()).then_some(variant)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    Mesh,
}

fn list_entries(dir: &Path, kind: EntryKind) -> Result<Vec<String>, CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let matches = match kind {
            EntryKind::Dir => path.is_dir(),
            EntryKind::Mesh => {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| MESH_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            }
        };
        if matches {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
