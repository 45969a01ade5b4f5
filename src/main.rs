mod animation;
mod attachment;
mod capture;
mod content;
mod controls;
mod core;
#[cfg(feature = "dev-tools")]
mod debug;
mod loading;
mod parts;
mod stage;
mod visibility;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use crate::core::{Cli, resolve_assets_root};

fn main() {
    let cli = Cli::parse();
    let assets_root = resolve_assets_root(&cli.assets);

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Costume Viewer".to_string(),
                    resolution: (1280, 720).into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: assets_root.to_string_lossy().into_owned(),
                ..default()
            })
            .set(LogPlugin {
                filter: "wgpu=error,naga=warn,costume_viewer=debug".to_string(),
                ..default()
            }),
    )
    .add_plugins((
        content::ContentPlugin {
            assets_root: assets_root.clone(),
        },
        parts::PartsPlugin { assets_root },
        core::CorePlugin { cli },
        loading::LoadingPlugin,
        animation::AnimationLibraryPlugin,
        attachment::AttachmentPlugin,
        visibility::VisibilityPlugin,
        stage::StagePlugin,
        capture::CapturePlugin,
        controls::ControlsPlugin,
    ));

    #[cfg(feature = "dev-tools")]
    app.add_plugins(debug::DebugPlugin);

    app.run();
}
