//! Capture state machine: one screenshot, recording or export job at a time.

use bevy::prelude::*;
use std::io;
use std::path::PathBuf;

use super::container::EncodedFrame;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("a capture is already in progress")]
    Busy,
    #[error("no animation is playing")]
    NoAnimation,
    #[error("no finished recording to convert")]
    NoRecording,
    #[error("nothing is loaded to export")]
    NothingToExport,
    #[error("screenshot did not arrive within {0} frames")]
    Timeout(u32),
    #[error("recording captured no frames")]
    EmptyRecording,
    #[error("unreadable frame: {0}")]
    Frame(String),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("bad recording manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CaptureError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| CaptureError::Io { path, source }
    }
}

/// What stops a recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordMode {
    /// Until the user stops it.
    Manual,
    /// After one pass of the current clip plus a small buffer.
    ExportAnimation { duration_secs: f32 },
}

/// Result of advancing a recording by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingTick {
    /// Request a window capture for this frame index.
    pub capture_frame: Option<u32>,
    pub finished: bool,
}

/// Frames still allowed to arrive after a recording stops.
pub const MAX_DRAIN_TICKS: u32 = 30;

/// Identifies one window capture request, so a late frame from an earlier
/// capture is never credited to the current one.
pub type CaptureId = u64;

#[derive(Debug)]
pub struct Recording {
    id: CaptureId,
    mode: RecordMode,
    fps: u32,
    buffer_secs: f32,
    /// Hard cap on recording length, whatever the mode.
    max_secs: f32,
    elapsed: f32,
    next_frame_at: f32,
    requested: u32,
    frames: Vec<Option<EncodedFrame>>,
    stop_requested: bool,
    finished: bool,
    drain_ticks: u32,
}

impl Recording {
    pub fn new(
        id: CaptureId,
        mode: RecordMode,
        fps: u32,
        buffer_secs: f32,
        max_secs: f32,
    ) -> Self {
        Self {
            id,
            mode,
            fps: fps.max(1),
            buffer_secs: buffer_secs.max(0.0),
            max_secs: max_secs.max(0.0),
            elapsed: 0.0,
            next_frame_at: 0.0,
            requested: 0,
            frames: Vec::new(),
            stop_requested: false,
            finished: false,
            drain_ticks: 0,
        }
    }

    pub fn id(&self) -> CaptureId {
        self.id
    }

    pub fn mode(&self) -> RecordMode {
        self.mode
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Time at which an animation export stops on its own.
    pub fn stop_at(&self) -> Option<f32> {
        match self.mode {
            RecordMode::Manual => None,
            RecordMode::ExportAnimation { duration_secs } => Some(duration_secs + self.buffer_secs),
        }
    }

    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn tick(&mut self, dt: f32) -> RecordingTick {
        if self.finished {
            self.drain_ticks = self.drain_ticks.saturating_add(1);
            return RecordingTick {
                capture_frame: None,
                finished: true,
            };
        }
        if self.should_stop(dt.max(0.0)) {
            self.finished = true;
            return RecordingTick {
                capture_frame: None,
                finished: true,
            };
        }

        let capture_frame = (self.elapsed >= self.next_frame_at).then(|| {
            let index = self.requested;
            self.requested += 1;
            self.next_frame_at = (self.next_frame_at + 1.0 / self.fps as f32).max(self.elapsed);
            index
        });
        self.elapsed += dt.max(0.0);

        RecordingTick {
            capture_frame,
            finished: false,
        }
    }

    /// An animation export stops once the clip has played through, at the
    /// last tick before the buffer would be overrun.
    fn should_stop(&self, dt: f32) -> bool {
        if self.stop_requested || self.elapsed >= self.max_secs {
            return true;
        }
        match self.mode {
            RecordMode::Manual => false,
            RecordMode::ExportAnimation { duration_secs } => {
                let stop_at = duration_secs + self.buffer_secs;
                self.elapsed >= stop_at
                    || (self.elapsed >= duration_secs && self.elapsed + dt > stop_at)
            }
        }
    }

    /// Store a captured frame. Frames may arrive out of order.
    pub fn push_frame(&mut self, index: u32, frame: EncodedFrame) {
        let index = index as usize;
        if self.frames.len() <= index {
            self.frames.resize_with(index + 1, || None);
        }
        self.frames[index] = Some(frame);
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn received(&self) -> u32 {
        self.frames.iter().filter(|f| f.is_some()).count() as u32
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stopped, and every requested frame arrived or the drain window ran out.
    pub fn is_complete(&self) -> bool {
        self.finished && (self.received() >= self.requested || self.drain_ticks >= MAX_DRAIN_TICKS)
    }

    /// Bytes held by the encoded frames received so far.
    pub fn buffered_bytes(&self) -> usize {
        self.frames.iter().flatten().map(|f| f.png.len()).sum()
    }

    /// Captured frames in order; missing frames are skipped.
    pub fn into_frames(self) -> Vec<EncodedFrame> {
        self.frames.into_iter().flatten().collect()
    }
}

/// Background work that keeps the machine busy until it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    EncodeRecording,
    Gif,
    AssetExport,
}

impl JobKind {
    pub fn label(self) -> &'static str {
        match self {
            JobKind::EncodeRecording => "encoding recording",
            JobKind::Gif => "converting to GIF",
            JobKind::AssetExport => "exporting assets",
        }
    }
}

#[derive(Debug, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Screenshot {
        id: CaptureId,
        frames_waiting: u32,
        requested: bool,
    },
    Video(Recording),
    Finalizing(JobKind),
}

/// What the screenshot driver should do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotTick {
    NotCapturing,
    Request(CaptureId),
    Wait,
    TimedOut,
}

#[derive(Resource, Debug, Default)]
pub struct CaptureMachine {
    state: CaptureState,
    last_id: CaptureId,
}

impl CaptureMachine {
    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, CaptureState::Idle)
    }

    fn ensure_idle(&self) -> Result<(), CaptureError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(CaptureError::Busy)
        }
    }

    fn next_id(&mut self) -> CaptureId {
        self.last_id += 1;
        self.last_id
    }

    /// Begin a screenshot. The window capture is requested on the next
    /// [`drive_screenshot`](Self::drive_screenshot) so helpers are already
    /// hidden when the frame renders.
    pub fn start_screenshot(&mut self) -> Result<(), CaptureError> {
        self.ensure_idle()?;
        let id = self.next_id();
        self.state = CaptureState::Screenshot {
            id,
            frames_waiting: 0,
            requested: false,
        };
        Ok(())
    }

    pub fn drive_screenshot(&mut self, timeout_frames: u32) -> ScreenshotTick {
        let CaptureState::Screenshot {
            id,
            frames_waiting,
            requested,
        } = &mut self.state
        else {
            return ScreenshotTick::NotCapturing;
        };

        if !*requested {
            *requested = true;
            return ScreenshotTick::Request(*id);
        }
        *frames_waiting += 1;
        if *frames_waiting > timeout_frames {
            self.state = CaptureState::Idle;
            return ScreenshotTick::TimedOut;
        }
        ScreenshotTick::Wait
    }

    pub fn is_taking_screenshot(&self) -> bool {
        matches!(self.state, CaptureState::Screenshot { .. })
    }

    /// Finish the screenshot `id` if it is still the one in flight. Captures
    /// from a timed-out request return `false` and leave the machine alone.
    pub fn accept_screenshot(&mut self, id: CaptureId) -> bool {
        match self.state {
            CaptureState::Screenshot { id: current, .. } if current == id => {
                self.state = CaptureState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn start_recording(
        &mut self,
        mode: RecordMode,
        fps: u32,
        buffer_secs: f32,
        max_secs: f32,
    ) -> Result<CaptureId, CaptureError> {
        self.ensure_idle()?;
        let id = self.next_id();
        let recording = Recording::new(id, mode, fps, buffer_secs, max_secs);
        self.state = CaptureState::Video(recording);
        Ok(id)
    }

    pub fn recording(&self) -> Option<&Recording> {
        match &self.state {
            CaptureState::Video(recording) => Some(recording),
            _ => None,
        }
    }

    pub fn recording_mut(&mut self) -> Option<&mut Recording> {
        match &mut self.state {
            CaptureState::Video(recording) => Some(recording),
            _ => None,
        }
    }

    /// Deliver frame `index` to recording `id`; dropped when that recording
    /// is no longer running.
    pub fn push_recorded_frame(
        &mut self,
        id: CaptureId,
        index: u32,
        frame: EncodedFrame,
    ) -> bool {
        match self.recording_mut() {
            Some(recording) if recording.id() == id => {
                recording.push_frame(index, frame);
                true
            }
            _ => false,
        }
    }

    /// Hand the recording over for encoding; the machine stays busy until
    /// [`finish`](Self::finish).
    pub fn take_recording(&mut self) -> Option<Recording> {
        if !matches!(self.state, CaptureState::Video(_)) {
            return None;
        }
        match std::mem::replace(
            &mut self.state,
            CaptureState::Finalizing(JobKind::EncodeRecording),
        ) {
            CaptureState::Video(recording) => Some(recording),
            _ => None,
        }
    }

    pub fn start_job(&mut self, kind: JobKind) -> Result<(), CaptureError> {
        self.ensure_idle()?;
        self.state = CaptureState::Finalizing(kind);
        Ok(())
    }

    pub fn finish(&mut self) {
        self.state = CaptureState::Idle;
    }

    /// Short description for the status overlay.
    pub fn label(&self) -> String {
        match &self.state {
            CaptureState::Idle => "idle".to_string(),
            CaptureState::Screenshot { .. } => "screenshot".to_string(),
            CaptureState::Video(recording) => match recording.stop_at() {
                Some(stop_at) => format!(
                    "recording animation {:.1}/{:.1}s",
                    recording.elapsed(),
                    stop_at
                ),
                None => format!("recording {:.1}s", recording.elapsed()),
            },
            CaptureState::Finalizing(kind) => kind.label().to_string(),
        }
    }
}
