//! Capture systems: request handling, window captures and background jobs.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use bevy::tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future};
use image::RgbaImage;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::container::{EncodedFrame, RECORDING_SUFFIX, encode_png, write_frames};
use super::export::{WeaponPlacement, collect_export_files, export_bundle, readme_text};
use super::gif::convert_recording;
use super::machine::{
    CaptureError, CaptureId, CaptureMachine, JobKind, RecordMode, ScreenshotTick,
};
use super::{CaptureRequest, CaptureStatus};
use crate::animation::{AnimationLibrary, CurrentAnimation};
use crate::content::ViewerSettings;
use crate::core::ViewerSession;
use crate::loading::PartArena;
use crate::parts::AssetCatalog;
use crate::stage::{ActiveOffsets, HelperVisibility};

const SCREENSHOT_SOURCE: &str = "screenshot";
const RECORDING_SOURCE: &str = "recording";

pub enum JobOutput {
    Recording { path: PathBuf, frames: usize },
    Gif { path: PathBuf, frames: usize },
    Assets { path: PathBuf, files: usize },
}

/// Background encode/convert/export work.
#[derive(Component)]
pub struct CaptureJob(Task<Result<JobOutput, CaptureError>>);

/// `<character>_<variant>_<millis>` for output files.
pub fn capture_stem(session: &ViewerSession, stamp: u64) -> String {
    format!(
        "{}_{}_{}",
        session.character.as_deref().unwrap_or("viewer"),
        session.variant.as_deref().unwrap_or("none"),
        stamp
    )
}

fn timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn to_rgba(image: &Image) -> Result<RgbaImage, CaptureError> {
    image
        .clone()
        .try_into_dynamic()
        .map(|dynamic| dynamic.to_rgba8())
        .map_err(|e| CaptureError::Frame(e.to_string()))
}

fn ensure_dir(dir: &Path) -> Result<(), CaptureError> {
    fs::create_dir_all(dir).map_err(CaptureError::io(dir))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_capture_requests(
    mut commands: Commands,
    mut requests: MessageReader<CaptureRequest>,
    mut machine: ResMut<CaptureMachine>,
    mut helpers: ResMut<HelperVisibility>,
    mut status: ResMut<CaptureStatus>,
    mut library: ResMut<AnimationLibrary>,
    settings: Res<ViewerSettings>,
    current: Res<CurrentAnimation>,
    session: Res<ViewerSession>,
    arena: Res<PartArena>,
    catalog: Res<AssetCatalog>,
    offsets: Res<ActiveOffsets>,
) {
    for request in requests.read() {
        let result = match request {
            CaptureRequest::Screenshot => machine.start_screenshot().map(|()| {
                helpers.suppress(SCREENSHOT_SOURCE);
            }),
            CaptureRequest::ToggleRecording => match machine.recording_mut() {
                Some(recording) => {
                    recording.request_stop();
                    Ok(())
                }
                None => machine
                    .start_recording(
                        RecordMode::Manual,
                        settings.recording_fps,
                        settings.recording_buffer_secs,
                        settings.max_recording_secs,
                    )
                    .map(|_| {
                        helpers.suppress(RECORDING_SOURCE);
                        status.report("Recording started");
                    }),
            },
            CaptureRequest::ExportAnimation => {
                start_animation_export(&mut machine, &settings, &current).map(|duration| {
                    library.replay();
                    helpers.suppress(RECORDING_SOURCE);
                    status.report(format!("Recording one {duration:.2}s cycle"));
                })
            }
            CaptureRequest::ConvertToGif => start_gif(&mut machine, &status, &settings)
                .map(|task| {
                    commands.spawn(CaptureJob(task));
                    status.report("Converting last recording to GIF");
                }),
            CaptureRequest::ExportAssets => {
                let weapon = WeaponPlacement::resolve(&settings, offsets.config.weapon.as_ref());
                start_asset_export(&mut machine, &settings, &session, &arena, &catalog, &weapon)
                    .map(|task| {
                        commands.spawn(CaptureJob(task));
                        status.report("Exporting assets");
                    })
            }
        };
        if let Err(e) = result {
            status.fail(&e);
        }
    }
}

fn start_animation_export(
    machine: &mut CaptureMachine,
    settings: &ViewerSettings,
    current: &CurrentAnimation,
) -> Result<f32, CaptureError> {
    let duration_secs = current
        .duration_secs
        .filter(|d| *d > 0.0)
        .ok_or(CaptureError::NoAnimation)?;
    machine.start_recording(
        RecordMode::ExportAnimation { duration_secs },
        settings.recording_fps,
        settings.recording_buffer_secs,
        settings.max_recording_secs,
    )?;
    Ok(duration_secs)
}

fn start_gif(
    machine: &mut CaptureMachine,
    status: &CaptureStatus,
    settings: &ViewerSettings,
) -> Result<Task<Result<JobOutput, CaptureError>>, CaptureError> {
    let recording = status
        .last_recording
        .clone()
        .ok_or(CaptureError::NoRecording)?;
    machine.start_job(JobKind::Gif)?;
    let gif_fps = settings.gif_fps;
    Ok(AsyncComputeTaskPool::get().spawn(async move {
        convert_recording(&recording, gif_fps).map(|(path, frames)| JobOutput::Gif { path, frames })
    }))
}

fn start_asset_export(
    machine: &mut CaptureMachine,
    settings: &ViewerSettings,
    session: &ViewerSession,
    arena: &PartArena,
    catalog: &AssetCatalog,
    weapon: &WeaponPlacement,
) -> Result<Task<Result<JobOutput, CaptureError>>, CaptureError> {
    if arena.is_empty() {
        return Err(CaptureError::NothingToExport);
    }
    machine.start_job(JobKind::AssetExport)?;

    let parts: Vec<_> = arena.iter().map(|p| p.descriptor.clone()).collect();
    let character = session.character.clone().unwrap_or_default();
    let variant = session.variant.clone().unwrap_or_default();
    let readme = readme_text(&character, &variant, &parts, weapon);
    let assets_root = catalog.root().to_path_buf();
    let path = PathBuf::from(&settings.captures_dir).join(format!("{character}_{variant}_assets.zip"));

    Ok(AsyncComputeTaskPool::get().spawn(async move {
        let entries = collect_export_files(&assets_root, &parts)?;
        let files = export_bundle(&path, &entries, &readme)?;
        Ok::<_, CaptureError>(JobOutput::Assets { path, files })
    }))
}

/// Request the window capture one frame after the screenshot started, and
/// give up after the configured timeout.
pub(crate) fn drive_screenshot(
    mut commands: Commands,
    mut machine: ResMut<CaptureMachine>,
    mut helpers: ResMut<HelperVisibility>,
    mut status: ResMut<CaptureStatus>,
    settings: Res<ViewerSettings>,
) {
    match machine.drive_screenshot(settings.screenshot_timeout_frames) {
        ScreenshotTick::Request(id) => {
            commands.spawn(Screenshot::primary_window()).observe(
                move |captured: On<ScreenshotCaptured>,
                      machine: ResMut<CaptureMachine>,
                      helpers: ResMut<HelperVisibility>,
                      status: ResMut<CaptureStatus>,
                      session: Res<ViewerSession>,
                      settings: Res<ViewerSettings>| {
                    save_screenshot(id, &captured, machine, helpers, status, &session, &settings);
                },
            );
        }
        ScreenshotTick::TimedOut => {
            helpers.release(SCREENSHOT_SOURCE);
            status.fail(&CaptureError::Timeout(settings.screenshot_timeout_frames));
        }
        ScreenshotTick::Wait | ScreenshotTick::NotCapturing => {}
    }
}

fn save_screenshot(
    id: CaptureId,
    captured: &ScreenshotCaptured,
    mut machine: ResMut<CaptureMachine>,
    mut helpers: ResMut<HelperVisibility>,
    mut status: ResMut<CaptureStatus>,
    session: &ViewerSession,
    settings: &ViewerSettings,
) {
    if !machine.accept_screenshot(id) {
        debug!("Ignoring late capture from screenshot {}", id);
        return;
    }
    let dir = PathBuf::from(&settings.captures_dir);
    let path = dir.join(format!("{}.png", capture_stem(session, timestamp_millis())));
    let result = to_rgba(&captured.image)
        .and_then(|frame| encode_png(&frame))
        .and_then(|png| {
            ensure_dir(&dir)?;
            fs::write(&path, png).map_err(CaptureError::io(&path))
        });

    helpers.release(SCREENSHOT_SOURCE);
    match result {
        Ok(()) => status.report(format!("Saved {}", path.display())),
        Err(e) => status.fail(&e),
    }
}

/// Advance the active recording, request frames, and hand finished
/// recordings to the encoder.
pub(crate) fn drive_recording(
    mut commands: Commands,
    time: Res<Time>,
    mut machine: ResMut<CaptureMachine>,
    mut helpers: ResMut<HelperVisibility>,
    session: Res<ViewerSession>,
    settings: Res<ViewerSettings>,
) {
    let Some(recording) = machine.recording_mut() else {
        return;
    };

    let id = recording.id();
    let tick = recording.tick(time.delta_secs());
    if let Some(index) = tick.capture_frame {
        commands.spawn(Screenshot::primary_window()).observe(
            move |captured: On<ScreenshotCaptured>, mut machine: ResMut<CaptureMachine>| {
                match to_rgba(&captured.image).and_then(|frame| EncodedFrame::encode(&frame)) {
                    Ok(frame) => {
                        if !machine.push_recorded_frame(id, index, frame) {
                            debug!("Dropping frame {} of finished recording {}", index, id);
                        }
                    }
                    Err(e) => warn!("Dropping recorded frame {}: {}", index, e),
                }
            },
        );
    }
    if !recording.is_complete() {
        return;
    }

    let Some(recording) = machine.take_recording() else {
        return;
    };
    helpers.release(RECORDING_SOURCE);

    let fps = recording.fps();
    let elapsed = recording.elapsed();
    let bytes = recording.buffered_bytes();
    let frames = recording.into_frames();
    info!(
        "Recording stopped after {:.2}s with {} frames ({} KiB encoded)",
        elapsed,
        frames.len(),
        bytes / 1024
    );

    let path = PathBuf::from(&settings.captures_dir).join(format!(
        "{}{}",
        capture_stem(&session, timestamp_millis()),
        RECORDING_SUFFIX
    ));
    let task = AsyncComputeTaskPool::get().spawn(async move {
        let frames = write_recording(&path, fps, &frames)?;
        Ok::<_, CaptureError>(JobOutput::Recording { path, frames })
    });
    commands.spawn(CaptureJob(task));
}

fn write_recording(path: &Path, fps: u32, frames: &[EncodedFrame]) -> Result<usize, CaptureError> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }
    let file = File::create(path).map_err(CaptureError::io(path))?;
    let manifest = write_frames(file, fps, frames)?;
    Ok(manifest.frames as usize)
}

pub(crate) fn poll_capture_jobs(
    mut commands: Commands,
    mut jobs: Query<(Entity, &mut CaptureJob)>,
    mut machine: ResMut<CaptureMachine>,
    mut status: ResMut<CaptureStatus>,
) {
    for (entity, mut job) in &mut jobs {
        let Some(result) = block_on(future::poll_once(&mut job.0)) else {
            continue;
        };
        commands.entity(entity).despawn();
        machine.finish();

        match result {
            Ok(JobOutput::Recording { path, frames }) => {
                status.report(format!("Saved {} ({} frames)", path.display(), frames));
                status.last_recording = Some(path);
            }
            Ok(JobOutput::Gif { path, frames }) => {
                status.report(format!("Saved {} ({} frames)", path.display(), frames));
            }
            Ok(JobOutput::Assets { path, files }) => {
                status.report(format!("Saved {} ({} files)", path.display(), files));
            }
            Err(e) => status.fail(&e),
        }
    }
}
