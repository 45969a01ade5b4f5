//! GIF conversion of a finished recording.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::container::{RECORDING_SUFFIX, read_frames};
use super::machine::CaptureError;

/// Encoder speed, 1 (best palette) to 30 (fastest).
const GIF_SPEED: i32 = 10;

/// Indices of the source frames kept when resampling from `source_fps` to
/// `target_fps`. Never upsamples.
pub fn sample_indices(source_fps: u32, target_fps: u32, frame_count: usize) -> Vec<usize> {
    if frame_count == 0 {
        return Vec::new();
    }
    if target_fps == 0 || source_fps == 0 || target_fps >= source_fps {
        return (0..frame_count).collect();
    }

    let step = source_fps as f64 / target_fps as f64;
    let mut indices: Vec<usize> = (0..)
        .map(|k| (k as f64 * step).round() as usize)
        .take_while(|&i| i < frame_count)
        .collect();
    indices.dedup();
    indices
}

/// Encode `frames` as an infinitely looping GIF at `fps`.
pub fn encode_gif<W: Write>(writer: W, frames: Vec<RgbaImage>, fps: u32) -> Result<usize, CaptureError> {
    if frames.is_empty() {
        return Err(CaptureError::EmptyRecording);
    }
    let count = frames.len();
    let delay = Delay::from_numer_denom_ms(1000, fps.max(1));

    let mut encoder = GifEncoder::new_with_speed(writer, GIF_SPEED);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(
        frames
            .into_iter()
            .map(|frame| Frame::from_parts(frame, 0, 0, delay)),
    )?;
    Ok(count)
}

/// Output path of the GIF made from `recording`.
pub fn gif_path(recording: &Path) -> PathBuf {
    let name = recording
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(RECORDING_SUFFIX).unwrap_or(&name);
    recording.with_file_name(format!("{stem}.gif"))
}

/// Read a recording container, resample it to `gif_fps` and write the GIF
/// next to it. Returns the GIF path and its frame count.
pub fn convert_recording(recording: &Path, gif_fps: u32) -> Result<(PathBuf, usize), CaptureError> {
    let file = File::open(recording).map_err(CaptureError::io(recording))?;
    let (manifest, frames) = read_frames(BufReader::new(file))?;

    let keep = sample_indices(manifest.fps, gif_fps, frames.len());
    let mut frames: Vec<Option<RgbaImage>> = frames.into_iter().map(Some).collect();
    let sampled: Vec<RgbaImage> = keep.iter().filter_map(|&i| frames[i].take()).collect();
    let fps = gif_fps.min(manifest.fps).max(1);

    let output = gif_path(recording);
    if let Some(dir) = output.parent() {
        fs::create_dir_all(dir).map_err(CaptureError::io(dir))?;
    }
    let file = File::create(&output).map_err(CaptureError::io(&output))?;
    let count = encode_gif(BufWriter::new(file), sampled, fps)?;
    Ok((output, count))
}
