//! Content domain: viewer settings and the optional lookup tables that steer
//! part resolution (aliases, hair/weapon fallbacks, default weapon position).

mod data;
mod loader;
mod registry;

pub use data::*;
pub use loader::{ContentError, load_offset_config, load_viewer_content, load_viewer_settings};
pub use registry::{ViewerContent, fallback_key};

use bevy::prelude::*;
use std::path::PathBuf;

/// Loads settings and tables from the asset root while the app is built, so
/// every later plugin can rely on them being present.
pub struct ContentPlugin {
    pub assets_root: PathBuf,
}

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        let settings = match load_viewer_settings(&self.assets_root) {
            Ok(settings) => settings,
            Err(e) => {
                error!("{}; falling back to default viewer settings", e);
                ViewerSettings::default()
            }
        };

        let (content, errors) = load_viewer_content(&self.assets_root);
        for e in &errors {
            warn!("{}", e);
        }
        info!("{}", content.summary());

        app.insert_resource(settings).insert_resource(content);
    }
}
