//! Core domain: the active viewing session and launch options.

use bevy::prelude::*;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// Character/variant currently on screen. The generation increments on every
/// switch and tags in-flight loads.
#[derive(Resource, Debug, Default, Clone)]
pub struct ViewerSession {
    pub generation: u64,
    pub character: Option<String>,
    pub variant: Option<String>,
}

impl ViewerSession {
    /// Begin a new session and return its generation.
    pub fn advance(&mut self, character: impl Into<String>, variant: impl Into<String>) -> u64 {
        self.generation += 1;
        self.character = Some(character.into());
        self.variant = Some(variant.into());
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.character.is_some()
    }

    /// `character / variant` for status lines.
    pub fn label(&self) -> String {
        match (&self.character, &self.variant) {
            (Some(c), Some(v)) => format!("{c} / {v}"),
            (Some(c), None) => c.clone(),
            _ => "(none)".to_string(),
        }
    }
}

/// Initial selection taken from the command line.
#[derive(Parser, Resource, Debug, Clone, PartialEq)]
#[command(name = "costume-viewer", version)]
#[command(about = "Composite character viewer: parts, animations, captures")]
pub struct Cli {
    /// Character to show first; defaults to the first one on disk
    pub character: Option<String>,

    /// Variant of that character; defaults to its first variant
    pub variant: Option<String>,

    /// Stage scene to load at startup
    #[arg(long)]
    pub stage: Option<String>,

    /// Asset directory holding `models/`, `stages/`, `offsets/` and `data/`
    #[arg(long, default_value = DEFAULT_ASSETS_ROOT)]
    pub assets: PathBuf,
}

pub const DEFAULT_ASSETS_ROOT: &str = "assets";

/// Absolute form of `assets`. The asset server and the catalog both read
/// this path.
pub fn resolve_assets_root(assets: &Path) -> PathBuf {
    if let Ok(path) = fs::canonicalize(assets) {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(assets),
        Err(_) => assets.to_path_buf(),
    }
}
