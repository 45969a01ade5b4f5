//! Parts domain: tests for classification order, fallbacks and the catalog.

use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

use super::*;
use crate::content::{FolderList, ViewerContent};

/// In-memory folder source: folder -> mesh path.
struct MemorySource(HashMap<String, String>);

impl MemorySource {
    fn with(folders: &[&str]) -> Self {
        Self(
            folders
                .iter()
                .map(|f| (f.to_string(), format!("models/test/{f}/mesh.glb")))
                .collect(),
        )
    }
}

impl FolderSource for MemorySource {
    fn mesh_path(&self, folder: &str) -> Option<String> {
        self.0.get(folder).cloned()
    }
}

fn folders(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// -----------------------------------------------------------------------------
// Classification
// -----------------------------------------------------------------------------

#[test]
fn test_every_pattern_classifies_to_its_own_type() {
    for (index, (needle, expected)) in PART_PATTERNS.iter().enumerate() {
        let name = format!("Aria_Default_{}", needle.trim_matches('_'));
        // An earlier pattern may legitimately shadow this one; it must then be
        // a substring of the needle.
        let key = role_key(&name);
        let first_hit = PART_PATTERNS
            .iter()
            .position(|(n, _)| key.contains(n))
            .expect("own pattern matches");
        assert!(first_hit <= index);
        if first_hit == index {
            assert_eq!(classify(&name), Some(*expected), "pattern {needle}");
        }
    }
}

#[test]
fn test_classification_is_deterministic() {
    for name in ["Aria_Default_Body", "Aria_Default_HoodHair", "x", "Bram_S_Shield"] {
        let first = classify(name);
        for _ in 0..5 {
            assert_eq!(classify(name), first);
        }
    }
}

#[test]
fn test_compound_hood_hair_beats_hood() {
    assert_eq!(classify("Aria_Winter_Hood_Hair"), Some(PartType::Hair));
    assert_eq!(classify("Aria_Winter_HoodHair"), Some(PartType::Hair));
    assert_eq!(classify("Aria_Winter_Hood"), Some(PartType::Hood));
}

#[test]
fn test_left_weapon_beats_generic_weapon() {
    assert_eq!(classify("Aria_Default_Weapon_L"), Some(PartType::WeaponLeft));
    assert_eq!(classify("Aria_Default_LWeapon"), Some(PartType::WeaponLeft));
    assert_eq!(classify("Aria_Default_Weapon"), Some(PartType::Weapon));
    assert_eq!(classify("Aria_Default_Shield"), Some(PartType::Shield));
}

#[test]
fn test_left_weapon_spellings_are_anchored() {
    assert_eq!(classify("Aria_Default_Weapon_Lance"), Some(PartType::Weapon));
    assert_eq!(classify("Aria_Default_WeaponLong"), Some(PartType::Weapon));
    assert_eq!(classify("Aria_Default_Weapon_L_Dagger"), Some(PartType::WeaponLeft));
    assert_eq!(classify("Aria_Default_WeaponL"), Some(PartType::WeaponLeft));
}

#[test]
fn test_character_and_variant_names_do_not_classify() {
    assert_eq!(classify("Robinhood_Default_Body"), Some(PartType::Body));
    assert_eq!(classify("Aria_Hoodie_Body"), Some(PartType::Body));
    assert_eq!(classify("Shieldmaiden_Default_Body"), Some(PartType::Body));
    assert_eq!(classify("Swordsman_Tailcoat_Hair"), Some(PartType::Hair));
    assert_eq!(classify("Robinhood_Default_Effects"), None);
}

#[test]
fn test_role_key_keeps_segments_after_variant() {
    assert_eq!(role_key("Aria_Summer_Hood_Hair"), "_hood_hair_");
    assert_eq!(role_key("Aria_Body"), "_aria_body_");
    assert_eq!(role_key("Aria_Summer_"), "_aria_summer__");
}

#[test]
fn test_classification_is_case_insensitive() {
    assert_eq!(classify("ARIA_DEFAULT_BODY"), Some(PartType::Body));
    assert_eq!(classify("aria_default_hair"), Some(PartType::Hair));
}

#[test]
fn test_short_role_words_need_segment_start() {
    assert_eq!(classify("Aria_Charm"), None);
    assert_eq!(classify("Aria_Default_Arm"), Some(PartType::Arm));
    assert_eq!(classify("Aria_Rainbow"), None);
    assert_eq!(classify("Aria_Default_Armor"), None);
    assert_eq!(classify("Aria_Default_Arm_L"), Some(PartType::Arm));
}

#[test]
fn test_unmatched_names_are_rejected() {
    assert_eq!(classify("Aria_Default_Effects"), None);
    assert_eq!(classify(""), None);
}

#[test]
fn test_table_order_is_load_bearing() {
    // Swapping the compound and bare patterns changes the result.
    let reordered = [("hood", PartType::Hood), ("hood_hair", PartType::Hair)];
    assert_eq!(classify_with(&reordered, "A_B_Hood_Hair"), Some(PartType::Hood));
    assert_eq!(classify("A_B_Hood_Hair"), Some(PartType::Hair));
}

#[test]
fn test_part_families() {
    assert!(PartType::Body.is_body_like());
    assert!(PartType::Hair.is_body_like());
    assert!(PartType::Shield.is_detachable());
    assert_eq!(PartType::Shield.hand_side(), Some(HandSide::Left));
    assert_eq!(PartType::Weapon.hand_side(), Some(HandSide::Right));
    assert_eq!(PartType::Body.hand_side(), None);
    assert!(PartType::Body.load_rank() < PartType::Arm.load_rank());
    assert!(PartType::Arm.load_rank() < PartType::Hair.load_rank());
}

// -----------------------------------------------------------------------------
// Fallback resolution
// -----------------------------------------------------------------------------

#[test]
fn test_weapon_fallback_is_synthesized() {
    let source = MemorySource::with(&["Aria_Default_Body", "Aria_Default_Hair", "Aria_Base_Weapon"]);
    let mut content = ViewerContent::default();
    content.weapon_fallbacks.insert(
        "Aria_Default".to_string(),
        FolderList::One("Aria_Base_Weapon".to_string()),
    );

    let variant_folders = folders(&["Aria_Default_Body", "Aria_Default_Hair"]);
    let parts = resolve_parts(
        ResolveRequest {
            character: "Aria",
            variant: "Default",
            folders: &variant_folders,
        },
        &content,
        &source,
    );

    assert_eq!(parts.len(), 3);
    let weapon = parts.iter().find(|p| p.is_detachable()).expect("weapon");
    assert_eq!(weapon.name, "Aria_Base_Weapon");
    assert_eq!(weapon.part_type, PartType::Weapon);
    assert!(!weapon.default_position);
    assert!(weapon.needs_attachment());
}

#[test]
fn test_weapon_fallback_list_skips_missing_and_keeps_rest() {
    // The first folder has no mesh; the second must still be classified.
    let source = MemorySource::with(&["Bram_Winter_Body", "Bram_Base_Shield"]);
    let mut content = ViewerContent::default();
    content.weapon_fallbacks.insert(
        "Bram_Winter".to_string(),
        FolderList::Many(vec![
            "Bram_Base_Sword".to_string(),
            "Bram_Base_Shield".to_string(),
        ]),
    );

    let variant_folders = folders(&["Bram_Winter_Body"]);
    let parts = resolve_parts(
        ResolveRequest {
            character: "Bram",
            variant: "Winter",
            folders: &variant_folders,
        },
        &content,
        &source,
    );

    let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Bram_Winter_Body", "Bram_Base_Shield"]);
    assert_eq!(parts[1].part_type, PartType::Shield);
}

#[test]
fn test_weapon_fallback_unclassified_becomes_weapon() {
    let source = MemorySource::with(&["Cassia_A_Body", "Cassia_A_Glaive"]);
    let mut content = ViewerContent::default();
    content.weapon_fallbacks.insert(
        "Cassia_A".to_string(),
        FolderList::One("Cassia_A_Glaive".to_string()),
    );

    let variant_folders = folders(&["Cassia_A_Body"]);
    let parts = resolve_parts(
        ResolveRequest {
            character: "Cassia",
            variant: "A",
            folders: &variant_folders,
        },
        &content,
        &source,
    );
    assert_eq!(parts[1].part_type, PartType::Weapon);
}

#[test]
fn test_weapon_fallback_ignored_when_variant_has_weapon() {
    let source = MemorySource::with(&["Aria_Default_Body", "Aria_Default_Weapon", "Aria_Base_Weapon"]);
    let mut content = ViewerContent::default();
    content.weapon_fallbacks.insert(
        "Aria_Default".to_string(),
        FolderList::One("Aria_Base_Weapon".to_string()),
    );

    let variant_folders = folders(&["Aria_Default_Body", "Aria_Default_Weapon"]);
    let parts = resolve_parts(
        ResolveRequest {
            character: "Aria",
            variant: "Default",
            folders: &variant_folders,
        },
        &content,
        &source,
    );
    assert_eq!(parts.iter().filter(|p| p.is_detachable()).count(), 1);
    assert!(parts.iter().all(|p| p.name != "Aria_Base_Weapon"));
}

#[test]
fn test_hair_fallback_fills_missing_hair() {
    let source = MemorySource::with(&["Aria_Summer_Body", "Aria_Default_Hair"]);
    let mut content = ViewerContent::default();
    content
        .hair_fallbacks
        .insert("Aria_Summer".to_string(), "Aria_Default_Hair".to_string());

    let variant_folders = folders(&["Aria_Summer_Body"]);
    let parts = resolve_parts(
        ResolveRequest {
            character: "Aria",
            variant: "Summer",
            folders: &variant_folders,
        },
        &content,
        &source,
    );
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1].part_type, PartType::Hair);
    assert_eq!(parts[1].name, "Aria_Default_Hair");
}

#[test]
fn test_missing_hair_fallback_target_is_skipped() {
    let source = MemorySource::with(&["Aria_Summer_Body"]);
    let mut content = ViewerContent::default();
    content
        .hair_fallbacks
        .insert("Aria_Summer".to_string(), "Aria_Gone_Hair".to_string());

    let variant_folders = folders(&["Aria_Summer_Body"]);
    let parts = resolve_parts(
        ResolveRequest {
            character: "Aria",
            variant: "Summer",
            folders: &variant_folders,
        },
        &content,
        &source,
    );
    assert_eq!(parts.len(), 1);
}

#[test]
fn test_default_position_flag_applies_to_weapons_only() {
    let source = MemorySource::with(&["Dax_A_Body", "Dax_A_Weapon"]);
    let mut content = ViewerContent::default();
    content.default_weapon_position.insert("Dax".to_string());

    let variant_folders = folders(&["Dax_A_Weapon", "Dax_A_Body"]);
    let parts = resolve_parts(
        ResolveRequest {
            character: "Dax",
            variant: "A",
            folders: &variant_folders,
        },
        &content,
        &source,
    );
    assert_eq!(parts[0].part_type, PartType::Body);
    assert!(!parts[0].default_position);
    assert!(parts[1].default_position);
    assert!(!parts[1].needs_attachment());
}

#[test]
fn test_resolved_parts_are_sorted_body_first() {
    let names = [
        "Eve_A_Weapon",
        "Eve_A_Hair",
        "Eve_A_Arm",
        "Eve_A_Body",
        "Eve_A_Unknown",
    ];
    let source = MemorySource::with(&names);
    let variant_folders = folders(&names);
    let parts = resolve_parts(
        ResolveRequest {
            character: "Eve",
            variant: "A",
            folders: &variant_folders,
        },
        &ViewerContent::default(),
        &source,
    );
    let types: Vec<PartType> = parts.iter().map(|p| p.part_type).collect();
    assert_eq!(
        types,
        [PartType::Body, PartType::Arm, PartType::Hair, PartType::Weapon]
    );
}

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

fn catalog_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (dir, file) in [
        ("models/Aria/Aria_Default_Body", "body.glb"),
        ("models/Aria/Aria_Default_Hair", "hair.glb"),
        ("models/Aria/Aria_Summer_Body", "body.glb"),
        ("models/Aria/Aria_Summer_Notes", "readme.txt"),
        ("models/Bram/Bram_Base_Sword", "sword.gltf"),
        ("stages", "arena.glb"),
    ] {
        fs::create_dir_all(tmp.path().join(dir)).unwrap();
        fs::write(tmp.path().join(dir).join(file), b"stub").unwrap();
    }
    tmp
}

#[test]
fn test_folder_variant_parsing() {
    assert_eq!(folder_variant("Aria", "Aria_Summer_Body"), Some("Summer"));
    assert_eq!(folder_variant("Aria", "Aria_Summer_Hood_Hair"), Some("Summer"));
    assert_eq!(folder_variant("Aria", "Aria_Summer"), None);
    assert_eq!(folder_variant("Aria", "Bram_Summer_Body"), None);
}

#[test]
fn test_catalog_lists_variants_and_folders() {
    let tmp = catalog_fixture();
    let catalog = AssetCatalog::new(tmp.path());
    assert_eq!(catalog.characters().unwrap(), ["Aria", "Bram"]);
    assert_eq!(catalog.variants("Aria").unwrap(), ["Default", "Summer"]);
    assert_eq!(
        catalog.variant_folders("Aria", "Default").unwrap(),
        ["Aria_Default_Body", "Aria_Default_Hair"]
    );
    assert_eq!(catalog.stages(), ["arena"]);
    assert_eq!(catalog.stage_path("arena").as_deref(), Some("stages/arena.glb"));
}

#[test]
fn test_catalog_mesh_path_searches_other_characters() {
    let tmp = catalog_fixture();
    let catalog = AssetCatalog::new(tmp.path());
    assert_eq!(
        catalog.mesh_path("Aria_Default_Body").as_deref(),
        Some("models/Aria/Aria_Default_Body/body.glb")
    );
    assert_eq!(
        catalog.mesh_path("Bram_Base_Sword").as_deref(),
        Some("models/Bram/Bram_Base_Sword/sword.gltf")
    );
    assert_eq!(catalog.mesh_path("Aria_Summer_Notes"), None);
    assert_eq!(catalog.mesh_path("Nobody_Here"), None);
}

#[test]
fn test_catalog_missing_root_is_an_error() {
    let catalog = AssetCatalog::new("/definitely/not/a/real/asset/root");
    assert!(matches!(catalog.characters(), Err(CatalogError::Io { .. })));
    assert!(catalog.stages().is_empty());
}
