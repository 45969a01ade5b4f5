//! Parts domain: folder classification, fallback resolution and the on-disk
//! asset catalog that feeds them.

mod catalog;
mod classify;
mod resolve;
#[cfg(test)]
mod tests;

pub use catalog::{AssetCatalog, CatalogError, folder_variant};
pub use classify::{HandSide, PART_PATTERNS, PartType, classify, classify_with, role_key};
pub use resolve::{FolderSource, PartDescriptor, ResolveRequest, resolve_parts};

use bevy::prelude::*;
use std::path::PathBuf;

pub struct PartsPlugin {
    pub assets_root: PathBuf,
}

impl Plugin for PartsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AssetCatalog::new(self.assets_root.clone()));
    }
}
