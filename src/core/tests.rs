use super::*;
use bevy::ecs::message::{MessageReader, MessageWriter, Messages};
use bevy::ecs::system::RunSystemOnce;
use std::fs;
use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::content::ViewerContent;
use crate::parts::AssetCatalog;

// -----------------------------------------------------------------------------
// Launch options
// -----------------------------------------------------------------------------

#[test]
fn test_cli_without_arguments_uses_defaults() {
    let cli = Cli::try_parse_from(["costume-viewer"]).expect("parse");
    assert_eq!(cli.character, None);
    assert_eq!(cli.variant, None);
    assert_eq!(cli.stage, None);
    assert_eq!(cli.assets, PathBuf::from(DEFAULT_ASSETS_ROOT));
}

#[test]
fn test_cli_positionals_and_flags() {
    let cli = Cli::try_parse_from([
        "costume-viewer",
        "Aria",
        "--stage",
        "arena",
        "Summer",
        "--assets",
        "/data",
    ])
    .expect("parse");

    assert_eq!(cli.character.as_deref(), Some("Aria"));
    assert_eq!(cli.variant.as_deref(), Some("Summer"));
    assert_eq!(cli.stage.as_deref(), Some("arena"));
    assert_eq!(cli.assets, PathBuf::from("/data"));
}

#[test]
fn test_cli_rejects_unknown_flag_and_extra_argument() {
    assert!(Cli::try_parse_from(["costume-viewer", "Aria", "--fast"]).is_err());
    assert!(Cli::try_parse_from(["costume-viewer", "Aria", "Default", "extra"]).is_err());
    assert!(Cli::try_parse_from(["costume-viewer", "--stage"]).is_err());
}

#[test]
fn test_assets_root_is_absolute() {
    let tmp = TempDir::new().unwrap();
    let absolute = resolve_assets_root(tmp.path());
    assert!(absolute.is_absolute());
    assert_eq!(absolute, fs::canonicalize(tmp.path()).unwrap());

    let relative = resolve_assets_root(Path::new("no_such_assets_dir"));
    assert!(relative.is_absolute());
    assert!(relative.ends_with("no_such_assets_dir"));
}

// -----------------------------------------------------------------------------
// Session
// -----------------------------------------------------------------------------

#[test]
fn test_session_generation_increments() {
    let mut session = ViewerSession::default();
    assert!(!session.is_active());
    assert_eq!(session.label(), "(none)");

    assert_eq!(session.advance("Aria", "Default"), 1);
    assert_eq!(session.advance("Aria", "Summer"), 2);
    assert!(session.is_active());
    assert_eq!(session.label(), "Aria / Summer");
}

// -----------------------------------------------------------------------------
// Selection flow
// -----------------------------------------------------------------------------

fn catalog_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (dir, file) in [
        ("models/Aria/Aria_Default_Body", "body.glb"),
        ("models/Aria/Aria_Default_Hair", "hair.glb"),
        ("models/Aria/Aria_Summer_Body", "body.glb"),
    ] {
        fs::create_dir_all(tmp.path().join(dir)).expect("create fixture dir");
        fs::write(tmp.path().join(dir).join(file), b"stub").expect("write fixture");
    }
    tmp
}

/// The returned directory must outlive the world.
fn selection_world() -> (World, TempDir) {
    let tmp = catalog_fixture();
    let mut world = World::new();
    world.insert_resource(AssetCatalog::new(tmp.path().to_path_buf()));
    world.init_resource::<ViewerContent>();
    world.init_resource::<ViewerSession>();
    world.init_resource::<Messages<SelectVariant>>();
    world.init_resource::<Messages<CycleVariant>>();
    world.init_resource::<Messages<SessionStarted>>();
    (world, tmp)
}

fn select(world: &mut World, character: &str, variant: Option<&str>) {
    let request = SelectVariant {
        character: character.to_string(),
        variant: variant.map(str::to_string),
    };
    world
        .run_system_once(move |mut writer: MessageWriter<SelectVariant>| {
            writer.write(request.clone());
        })
        .expect("write selection");
}

fn started(world: &mut World) -> Vec<SessionStarted> {
    world
        .run_system_once(|mut reader: MessageReader<SessionStarted>| {
            reader.read().cloned().collect::<Vec<_>>()
        })
        .expect("read sessions")
}

#[test]
fn test_selection_starts_session_with_resolved_parts() {
    let (mut world, _tmp) = selection_world();
    select(&mut world, "Aria", None);
    world
        .run_system_once(systems::start_session)
        .expect("start_session runs");

    let sessions = started(&mut world);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].generation, 1);
    assert_eq!(sessions[0].variant, "Default");
    let names: Vec<&str> = sessions[0].parts.iter().map(|p| p.name.as_str()).collect();
    assert!(names.contains(&"Aria_Default_Body"));
    assert!(names.contains(&"Aria_Default_Hair"));
    assert_eq!(world.resource::<ViewerSession>().label(), "Aria / Default");
}

#[test]
fn test_unknown_variant_keeps_current_session() {
    let (mut world, _tmp) = selection_world();
    select(&mut world, "Aria", Some("Winter"));
    world
        .run_system_once(systems::start_session)
        .expect("start_session runs");

    assert!(started(&mut world).is_empty());
    assert!(!world.resource::<ViewerSession>().is_active());
}

#[test]
fn test_cycle_variant_wraps_around() {
    let (mut world, _tmp) = selection_world();
    world.resource_mut::<ViewerSession>().advance("Aria", "Summer");
    world
        .run_system_once(|mut writer: MessageWriter<CycleVariant>| {
            writer.write(CycleVariant { step: 1 });
        })
        .expect("write cycle");
    world
        .run_system_once(systems::handle_cycle_variant)
        .expect("handle_cycle_variant runs");

    let selected = world
        .run_system_once(|mut reader: MessageReader<SelectVariant>| {
            reader.read().cloned().collect::<Vec<_>>()
        })
        .expect("read selections");
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].variant.as_deref(), Some("Default"));
}
