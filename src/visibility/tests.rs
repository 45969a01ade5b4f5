use super::*;
use crate::parts::{PartDescriptor, PartType};

fn part(name: &str, part_type: PartType, default_position: bool) -> PartDescriptor {
    PartDescriptor {
        name: name.to_string(),
        path: format!("models/Bram/{name}/{name}.glb"),
        part_type,
        default_position,
    }
}

fn bram_parts() -> Vec<PartDescriptor> {
    vec![
        part("Bram_Winter_Body", PartType::Body, false),
        part("Bram_Winter_Hair", PartType::Hair, false),
        part("Bram_Winter_Sword", PartType::Weapon, false),
        part("Bram_Winter_Shield", PartType::Shield, false),
    ]
}

// --- Initial set ---

#[test]
fn test_rebuild_shows_body_like_parts_only() {
    let mut visible = VisibleSet::default();
    visible.rebuild(&bram_parts());

    assert!(visible.should_render("Bram_Winter_Body"));
    assert!(visible.should_render("Bram_Winter_Hair"));
    assert!(!visible.contains("Bram_Winter_Sword"));
    assert!(!visible.should_render("Bram_Winter_Sword"));
    assert_eq!(visible.len(), 4);
    assert_eq!(visible.name_at(2), Some("Bram_Winter_Sword"));
}

#[test]
fn test_default_position_weapon_visible_from_start() {
    let mut visible = VisibleSet::default();
    visible.rebuild(&[
        part("Cato_Base_Body", PartType::Body, false),
        part("Cato_Base_Staff", PartType::Weapon, true),
    ]);
    assert!(visible.should_render("Cato_Base_Staff"));
}

#[test]
fn test_rebuild_forgets_previous_session() {
    let mut visible = VisibleSet::default();
    visible.rebuild(&bram_parts());
    visible.confirm_attached("Bram_Winter_Sword");

    visible.rebuild(&bram_parts());
    assert!(!visible.should_render("Bram_Winter_Sword"));
}

// --- Toggling ---

#[test]
fn test_toggle_body_like_part() {
    let mut visible = VisibleSet::default();
    visible.rebuild(&bram_parts());

    assert_eq!(visible.toggle("Bram_Winter_Hair"), ToggleOutcome::Hidden);
    assert!(!visible.should_render("Bram_Winter_Hair"));
    assert_eq!(visible.toggle("Bram_Winter_Hair"), ToggleOutcome::Shown);
    assert!(visible.should_render("Bram_Winter_Hair"));
}

#[test]
fn test_unattached_weapon_cannot_be_shown() {
    let mut visible = VisibleSet::default();
    visible.rebuild(&bram_parts());

    assert_eq!(visible.toggle("Bram_Winter_Sword"), ToggleOutcome::Refused);
    assert!(!visible.contains("Bram_Winter_Sword"));
}

#[test]
fn test_toggle_unknown_part() {
    let mut visible = VisibleSet::default();
    visible.rebuild(&bram_parts());
    assert_eq!(visible.toggle("Nobody_Body"), ToggleOutcome::Unknown);
}

// --- Attachment and animation ---

#[test]
fn test_weapon_added_once_on_attachment() {
    let mut visible = VisibleSet::default();
    visible.rebuild(&bram_parts());

    assert!(visible.confirm_attached("Bram_Winter_Sword"));
    assert!(visible.should_render("Bram_Winter_Sword"));

    // The user hides it; later confirmations must not bring it back.
    assert_eq!(visible.toggle("Bram_Winter_Sword"), ToggleOutcome::Hidden);
    assert!(!visible.confirm_attached("Bram_Winter_Sword"));
    assert!(!visible.should_render("Bram_Winter_Sword"));

    assert_eq!(visible.toggle("Bram_Winter_Sword"), ToggleOutcome::Shown);
}

#[test]
fn test_suppressed_weapon_hidden_until_released() {
    let mut visible = VisibleSet::default();
    visible.rebuild(&bram_parts());
    visible.confirm_attached("Bram_Winter_Shield");

    visible.set_suppressed("Bram_Winter_Shield", true);
    assert!(visible.contains("Bram_Winter_Shield"));
    assert!(!visible.should_render("Bram_Winter_Shield"));

    visible.set_suppressed("Bram_Winter_Shield", false);
    assert!(visible.should_render("Bram_Winter_Shield"));
}
