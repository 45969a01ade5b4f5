use super::*;
use crate::content::{ContentError, OffsetConfig, ScaleOverride, TransformOverride};
use std::cell::Cell;

fn stages() -> Vec<String> {
    vec!["arena".to_string(), "temple".to_string()]
}

// --- Stage cycling ---

#[test]
fn test_cycle_stage_starts_from_none() {
    assert_eq!(cycle_stage(&stages(), None, 1).as_deref(), Some("arena"));
    assert_eq!(cycle_stage(&stages(), None, -1).as_deref(), Some("temple"));
}

#[test]
fn test_cycle_stage_wraps_back_to_none() {
    assert_eq!(cycle_stage(&stages(), Some("temple"), 1), None);
    assert_eq!(cycle_stage(&stages(), Some("arena"), 1).as_deref(), Some("temple"));
}

#[test]
fn test_cycle_stage_without_stages_stays_none() {
    assert_eq!(cycle_stage(&[], None, 1), None);
    assert_eq!(cycle_stage(&[], Some("gone"), 3), None);
}

// --- Offset cache ---

#[test]
fn test_offsets_loaded_once_per_character() {
    let mut cache = OffsetCache::default();
    let calls = Cell::new(0);
    let load = |_: &str| {
        calls.set(calls.get() + 1);
        Ok(Some(OffsetConfig {
            model: Some(TransformOverride {
                scale: Some(ScaleOverride::Uniform(2.0)),
                ..Default::default()
            }),
            ..Default::default()
        }))
    };

    assert!(cache.lookup("Aria", load).is_some());
    assert!(cache.lookup("Aria", load).is_some());
    assert_eq!(calls.get(), 1);
    assert!(cache.contains("Aria"));
}

#[test]
fn test_missing_offsets_cached_as_none() {
    let mut cache = OffsetCache::default();
    assert!(cache.lookup("Bram", |_| Ok(None)).is_none());
    assert!(cache.contains("Bram"));
    assert!(
        cache
            .lookup("Bram", |_| panic!("absent offsets must not be refetched"))
            .is_none()
    );
}

#[test]
fn test_malformed_offsets_are_ignored() {
    let mut cache = OffsetCache::default();
    let result = cache.lookup("Cato", |_| {
        Err(ContentError::Parse {
            file: "offsets/Cato.json".to_string(),
            message: "expected value at line 1".to_string(),
        })
    });
    assert!(result.is_none());
}

// --- Active offsets ---

#[test]
fn test_default_transforms() {
    let active = ActiveOffsets::default();
    assert_eq!(active.model_transform(), Transform::IDENTITY);
    assert_eq!(
        active.stage_transform(0.01).scale,
        Vec3::splat(0.01)
    );
}

#[test]
fn test_scene_override_replaces_stage_scale() {
    let active = ActiveOffsets {
        character: Some("Aria".to_string()),
        config: OffsetConfig {
            scene: Some(TransformOverride {
                position: Some([0.0, -1.0, 0.0]),
                scale: Some(ScaleOverride::Axes([0.5, 0.5, 0.5])),
                ..Default::default()
            }),
            ..Default::default()
        },
    };
    let transform = active.stage_transform(0.01);
    assert_eq!(transform.translation, Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(transform.scale, Vec3::splat(0.5));
    assert_eq!(active.model_transform(), Transform::IDENTITY);
}

// --- Helpers ---

#[test]
fn test_helpers_hidden_while_suppressed() {
    let mut helpers = HelperVisibility::default();
    assert!(helpers.is_drawn());

    helpers.suppress("screenshot");
    assert!(!helpers.is_drawn());
    helpers.release("screenshot");
    assert!(helpers.is_drawn());
}

#[test]
fn test_helper_toggle_survives_capture() {
    let mut helpers = HelperVisibility::default();
    assert!(!helpers.toggle());

    helpers.suppress("recording");
    helpers.release("recording");
    assert!(!helpers.is_drawn());
    assert!(!helpers.is_suppressed());
}
