//! Loader for the viewer settings (RON) and the optional JSON lookup tables.
//!
//! Every table is optional: a missing file yields an empty table, a malformed
//! one is reported and also treated as empty.

use bevy::prelude::*;
use ron::Options;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::Path;

use super::data::*;
use super::registry::ViewerContent;

pub const SETTINGS_FILE: &str = "data/viewer.ron";
pub const ALIASES_FILE: &str = "data/name_aliases.json";
pub const HAIR_FALLBACKS_FILE: &str = "data/hair_fallbacks.json";
pub const WEAPON_FALLBACKS_FILE: &str = "data/weapon_fallbacks.json";
pub const DEFAULT_WEAPON_POSITION_FILE: &str = "data/default_weapon_position.json";
pub const OFFSETS_DIR: &str = "offsets";

/// Error type for content loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },
}

/// Create RON options with extensions enabled for more flexible parsing.
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// Read a file, mapping "not found" to `Ok(None)`.
fn read_optional(path: &Path) -> Result<Option<String>, ContentError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ContentError::Io {
            file: path.display().to_string(),
            source,
        }),
    }
}

/// Load an optional JSON document.
pub fn load_json_optional<T>(path: &Path) -> Result<Option<T>, ContentError>
where
    T: DeserializeOwned,
{
    let Some(contents) = read_optional(path)? else {
        return Ok(None);
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| ContentError::Parse {
            file: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Load `data/viewer.ron`, falling back to defaults when the file is absent.
pub fn load_viewer_settings(base_path: &Path) -> Result<ViewerSettings, ContentError> {
    let path = base_path.join(SETTINGS_FILE);
    let Some(contents) = read_optional(&path)? else {
        info!("No {} found, using default viewer settings", SETTINGS_FILE);
        return Ok(ViewerSettings::default());
    };

    ron_options()
        .from_str(&contents)
        .map_err(|e| ContentError::Parse {
            file: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Load all lookup tables under `base_path`. Tables that fail to load are left
/// empty and their errors returned alongside the registry.
pub fn load_viewer_content(base_path: &Path) -> (ViewerContent, Vec<ContentError>) {
    let mut content = ViewerContent::default();
    let mut errors = Vec::new();

    macro_rules! load_into {
        ($field:expr, $file:expr) => {
            match load_json_optional(&base_path.join($file)) {
                Ok(Some(table)) => $field = table,
                Ok(None) => debug!("Optional table {} not present", $file),
                Err(e) => errors.push(e),
            }
        };
    }

    load_into!(content.aliases, ALIASES_FILE);
    load_into!(content.hair_fallbacks, HAIR_FALLBACKS_FILE);
    load_into!(content.weapon_fallbacks, WEAPON_FALLBACKS_FILE);
    load_into!(content.default_weapon_position, DEFAULT_WEAPON_POSITION_FILE);

    (content, errors)
}

/// Load `offsets/<character>.json`. Absence is `Ok(None)`, not an error.
pub fn load_offset_config(
    base_path: &Path,
    character: &str,
) -> Result<Option<OffsetConfig>, ContentError> {
    let path = base_path.join(OFFSETS_DIR).join(format!("{character}.json"));
    load_json_optional(&path)
}
