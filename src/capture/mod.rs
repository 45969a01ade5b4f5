//! Capture domain: screenshots, frame recordings, GIF conversion and asset
//! export bundles, all written under the captures directory.

mod container;
mod export;
mod gif;
mod machine;
mod systems;

pub use container::{
    EncodedFrame, FrameManifest, MANIFEST_FILE, RECORDING_SUFFIX, read_frames, write_frames,
};
pub use export::{
    ExportEntry, README_FILE, WeaponPlacement, collect_export_files, readme_text, write_bundle,
};
pub use gif::{convert_recording, encode_gif, gif_path, sample_indices};
pub use machine::{
    CaptureError, CaptureId, CaptureMachine, CaptureState, JobKind, MAX_DRAIN_TICKS, RecordMode,
    Recording, RecordingTick, ScreenshotTick,
};
pub use systems::capture_stem;

use bevy::ecs::message::Message;
use bevy::prelude::*;
use std::path::PathBuf;

use crate::core::ViewerSet;
use systems::{drive_recording, drive_screenshot, handle_capture_requests, poll_capture_jobs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRequest {
    Screenshot,
    /// Start a manual recording, or stop the running one.
    ToggleRecording,
    /// Record exactly one cycle of the current animation.
    ExportAnimation,
    ConvertToGif,
    ExportAssets,
}

impl Message for CaptureRequest {}

/// Last capture outcome, shown by the status overlay.
#[derive(Resource, Debug, Default)]
pub struct CaptureStatus {
    pub message: Option<String>,
    /// Most recent finished recording; the GIF conversion source.
    pub last_recording: Option<PathBuf>,
}

impl CaptureStatus {
    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.message = Some(message);
    }

    pub fn fail(&mut self, error: &CaptureError) {
        warn!("Capture failed: {}", error);
        self.message = Some(format!("Capture failed: {error}"));
    }
}

pub struct CapturePlugin;

impl Plugin for CapturePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CaptureMachine>()
            .init_resource::<CaptureStatus>()
            .add_message::<CaptureRequest>()
            .add_systems(
                Update,
                (
                    poll_capture_jobs,
                    drive_screenshot,
                    drive_recording,
                    handle_capture_requests,
                )
                    .chain()
                    .in_set(ViewerSet::Capture),
            );
    }
}
