//! ViewerContent resource providing lookups over the external tables.

use bevy::prelude::*;

use super::data::*;

/// All optional lookup tables consumed by the part resolver.
#[derive(Resource, Debug, Default, Clone)]
pub struct ViewerContent {
    pub aliases: NameAliases,
    pub hair_fallbacks: HairFallbacks,
    pub weapon_fallbacks: WeaponFallbacks,
    pub default_weapon_position: DefaultWeaponPosition,
}

/// Key used by both fallback tables.
pub fn fallback_key(character: &str, variant: &str) -> String {
    format!("{character}_{variant}")
}

impl ViewerContent {
    /// Folder spelling used on disk for `character`.
    pub fn folder_spelling<'a>(&'a self, character: &'a str) -> &'a str {
        self.aliases
            .get(character)
            .map(String::as_str)
            .unwrap_or(character)
    }

    /// Reverse alias lookup: logical character name for an on-disk spelling.
    pub fn character_for_spelling<'a>(&'a self, spelling: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|(_, alias)| alias.as_str() == spelling)
            .map(|(character, _)| character.as_str())
            .unwrap_or(spelling)
    }

    pub fn hair_fallback(&self, character: &str, variant: &str) -> Option<&str> {
        self.hair_fallbacks
            .get(&fallback_key(character, variant))
            .map(String::as_str)
    }

    /// Weapon fallback folders in configured order; empty when none.
    pub fn weapon_fallbacks(&self, character: &str, variant: &str) -> &[String] {
        self.weapon_fallbacks
            .get(&fallback_key(character, variant))
            .map(FolderList::as_slice)
            .unwrap_or(&[])
    }

    pub fn uses_default_weapon_position(&self, character: &str) -> bool {
        self.default_weapon_position.contains(character)
    }

    /// Returns a summary of loaded table sizes for logging.
    pub fn summary(&self) -> String {
        format!(
            "ViewerContent loaded:\n\
             - Name aliases: {}\n\
             - Hair fallbacks: {}\n\
             - Weapon fallbacks: {}\n\
             - Default weapon position: {}",
            self.aliases.len(),
            self.hair_fallbacks.len(),
            self.weapon_fallbacks.len(),
            self.default_weapon_position.len(),
        )
    }
}
