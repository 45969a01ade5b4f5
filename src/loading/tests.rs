use super::*;
use crate::parts::{PartDescriptor, PartType};
use bevy::gltf::Gltf;
use bevy::prelude::*;

fn part(name: &str, part_type: PartType) -> PartDescriptor {
    PartDescriptor {
        name: name.to_string(),
        path: format!("models/Aria/{name}/{name}.glb"),
        part_type,
        default_position: false,
    }
}

fn session_parts() -> Vec<PartDescriptor> {
    vec![
        part("Aria_Default_Body", PartType::Body),
        part("Aria_Default_Hair", PartType::Hair),
        part("Aria_Default_Weapon", PartType::Weapon),
    ]
}

/// Issue and finish every queued part with `outcome`.
fn drain(queue: &mut LoadQueue, outcome: impl Fn(&PartDescriptor) -> PartOutcome) -> Vec<String> {
    let mut order = Vec::new();
    while let Some((index, descriptor)) = queue.next_to_issue() {
        order.push(descriptor.name.clone());
        let result = outcome(&descriptor);
        queue.mark_issued(index, descriptor, Handle::<Gltf>::default());
        queue.report(0.5);
        queue.finish(result);
    }
    order
}

// --- LoadProgress ---

#[test]
fn test_progress_never_decreases_under_noisy_reports() {
    let mut progress = LoadProgress::new(3);
    let reports = [
        (0, 0.5),
        (0, 0.2),
        (1, 0.9),
        (1, -1.0),
        (2, f32::NAN),
        (0, 1.0),
        (1, 0.1),
        (2, 2.0),
    ];

    let mut last = 0.0;
    for (index, fraction) in reports {
        let now = progress.report(index, fraction);
        assert!(now >= last, "{now} < {last} after ({index}, {fraction})");
        assert!((0.0..=100.0).contains(&now));
        last = now;
    }
    assert!((progress.percent() - 96.666_67).abs() < 1e-3);
}

#[test]
fn test_progress_complete_reaches_hundred() {
    let mut progress = LoadProgress::new(2);
    progress.complete(0);
    assert_eq!(progress.percent(), 50.0);
    progress.complete(1);
    assert_eq!(progress.percent(), 100.0);
}

#[test]
fn test_progress_ignores_unknown_index() {
    let mut progress = LoadProgress::new(1);
    assert_eq!(progress.report(5, 1.0), 0.0);
}

#[test]
fn test_progress_without_parts_is_complete() {
    assert_eq!(LoadProgress::new(0).percent(), 100.0);
}

// --- LoadQueue ---

#[test]
fn test_queue_issues_one_part_at_a_time_in_order() {
    let mut queue = LoadQueue::default();
    queue.begin(1, &session_parts());

    let (index, descriptor) = queue.next_to_issue().unwrap();
    assert_eq!(index, 0);
    queue.mark_issued(index, descriptor, Handle::default());
    assert!(queue.next_to_issue().is_none(), "second load issued while one is in flight");

    queue.finish(PartOutcome::Loaded(PartType::Body));
    let order = drain(&mut queue, |d| PartOutcome::Loaded(d.part_type));
    assert_eq!(order, ["Aria_Default_Hair", "Aria_Default_Weapon"]);
    assert_eq!(queue.phase(), LoadPhase::Ready);
    assert_eq!(queue.percent(), 100.0);
    assert_eq!(queue.loaded(), 3);
}

#[test]
fn test_queue_continues_after_failure() {
    let mut queue = LoadQueue::default();
    queue.begin(1, &session_parts());

    let order = drain(&mut queue, |d| {
        if d.part_type == PartType::Hair {
            PartOutcome::Failed
        } else {
            PartOutcome::Loaded(d.part_type)
        }
    });

    assert_eq!(order.len(), 3);
    assert_eq!(queue.failed(), 1);
    assert_eq!(queue.loaded(), 2);
    assert_eq!(queue.phase(), LoadPhase::Ready);
}

#[test]
fn test_queue_without_body_reports_empty() {
    let mut queue = LoadQueue::default();
    queue.begin(1, &session_parts());

    drain(&mut queue, |d| {
        if d.part_type == PartType::Body {
            PartOutcome::Failed
        } else {
            PartOutcome::Loaded(d.part_type)
        }
    });

    assert_eq!(queue.phase(), LoadPhase::Empty);
}

#[test]
fn test_queue_with_no_parts_is_empty_immediately() {
    let mut queue = LoadQueue::default();
    queue.begin(4, &[]);
    assert_eq!(queue.phase(), LoadPhase::Empty);
    assert!(queue.is_drained());
}

#[test]
fn test_stale_load_is_discarded_without_counting() {
    let mut queue = LoadQueue::default();
    queue.begin(1, &session_parts());
    let (index, descriptor) = queue.next_to_issue().unwrap();
    queue.mark_issued(index, descriptor, Handle::default());

    // Variant switch while the body of session 1 is in flight.
    queue.begin(2, &session_parts()[..1]);
    assert!(queue.next_to_issue().is_none());
    let stale = queue.in_flight().cloned().unwrap();
    assert!(queue.is_stale(&stale));

    let finished = queue.finish(PartOutcome::Loaded(PartType::Body)).unwrap();
    assert_eq!(finished.generation, 1);
    assert_eq!(queue.loaded(), 0);
    assert_eq!(queue.phase(), LoadPhase::Loading);

    let order = drain(&mut queue, |d| PartOutcome::Loaded(d.part_type));
    assert_eq!(order, ["Aria_Default_Body"]);
    assert_eq!(queue.loaded(), 1);
    assert_eq!(queue.phase(), LoadPhase::Ready);
}

// --- PartArena ---

#[test]
fn test_arena_lookup_by_name_and_handle() {
    let mut world = World::new();
    let mut arena = PartArena::default();
    let body_root = world.spawn_empty().id();
    let hair_root = world.spawn_empty().id();

    let body = arena.insert(LoadedPart::new(
        part("Aria_Default_Body", PartType::Body),
        body_root,
        Vec::new(),
    ));
    let hair = arena.insert(LoadedPart::new(
        part("Aria_Default_Hair", PartType::Hair),
        hair_root,
        Vec::new(),
    ));

    assert_ne!(body, hair);
    assert_eq!(arena.handle_of("Aria_Default_Hair"), Some(hair));
    assert_eq!(arena.get(body).map(|p| p.root), Some(body_root));
    assert_eq!(arena.body().map(LoadedPart::name), Some("Aria_Default_Body"));
    assert!(!arena.all_bound());

    arena.clear();
    assert!(arena.is_empty());
    assert!(arena.handle_of("Aria_Default_Body").is_none());
}

#[test]
fn test_follower_requires_bound_body_like_part_without_player() {
    let mut world = World::new();
    let root = world.spawn_empty().id();

    let mut hair = LoadedPart::new(part("Aria_Default_Hair", PartType::Hair), root, Vec::new());
    assert!(!hair.follows_body(), "unbound parts do not follow");
    hair.bound = true;
    assert!(hair.follows_body());
    hair.player = Some(root);
    assert!(!hair.follows_body());

    let mut weapon = LoadedPart::new(part("Aria_Default_Weapon", PartType::Weapon), root, Vec::new());
    weapon.bound = true;
    assert!(!weapon.follows_body());

    let mut body = LoadedPart::new(part("Aria_Default_Body", PartType::Body), root, Vec::new());
    body.bound = true;
    assert!(!body.follows_body());
}

#[test]
fn test_parts_settled_waits_for_binding() {
    let mut world = World::new();
    let mut queue = LoadQueue::default();
    let mut arena = PartArena::default();
    queue.begin(1, &session_parts()[..1]);
    assert!(!parts_settled(&queue, &arena));

    drain(&mut queue, |d| PartOutcome::Loaded(d.part_type));
    let handle = arena.insert(LoadedPart::new(
        part("Aria_Default_Body", PartType::Body),
        world.spawn_empty().id(),
        Vec::new(),
    ));
    assert!(!parts_settled(&queue, &arena));

    arena.get_mut(handle).unwrap().bound = true;
    assert!(parts_settled(&queue, &arena));
}

// --- Material normalization ---

#[test]
fn test_transparent_material_becomes_hidden_placeholder() {
    let source = StandardMaterial {
        base_color: Color::srgba(0.2, 0.4, 0.6, 0.0),
        alpha_mode: AlphaMode::Blend,
        ..default()
    };
    let normalized = NormalizedMaterial::from_standard("Glass", &source);
    assert_eq!(normalized.opacity, 0.0);
    assert_eq!(normalized.mode(), MaterialMode::Placeholder);

    let (visibility, pickable) = placeholder_bundle();
    assert_eq!(visibility, Visibility::Hidden);
    assert!(!pickable.is_hoverable);
    assert!(!pickable.should_block_lower);
}

#[test]
fn test_partial_opacity_blends() {
    let source = StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, 0.5),
        alpha_mode: AlphaMode::Blend,
        ..default()
    };
    let normalized = NormalizedMaterial::from_standard("Veil", &source);
    assert_eq!(normalized.mode(), MaterialMode::Blended);

    let rebuilt = normalized.to_standard();
    assert!(rebuilt.unlit);
    assert_eq!(rebuilt.alpha_mode, AlphaMode::Blend);
    assert_eq!(rebuilt.base_color.alpha(), 0.5);
}

#[test]
fn test_opaque_material_ignores_color_alpha() {
    let source = StandardMaterial {
        base_color: Color::srgba(1.0, 0.0, 0.0, 0.3),
        alpha_mode: AlphaMode::Opaque,
        ..default()
    };
    let normalized = NormalizedMaterial::from_standard("Cloth", &source);
    assert_eq!(normalized.opacity, 1.0);
    assert_eq!(normalized.mode(), MaterialMode::Opaque);

    let rebuilt = normalized.to_standard();
    assert!(rebuilt.unlit);
    assert_eq!(rebuilt.alpha_mode, AlphaMode::Opaque);
    assert_eq!(rebuilt.base_color.alpha(), 1.0);
}
