//! Frame-sequence container for recordings: a zip holding numbered PNG
//! frames and a `manifest.json`.

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::machine::CaptureError;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const RECORDING_SUFFIX: &str = ".frames.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameManifest {
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub frames: u32,
}

pub fn frame_name(index: usize) -> String {
    format!("frame_{index:05}.png")
}

/// One recorded frame, already PNG-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl EncodedFrame {
    pub fn encode(image: &RgbaImage) -> Result<Self, CaptureError> {
        Ok(Self {
            width: image.width(),
            height: image.height(),
            png: encode_png(image)?,
        })
    }

    /// Re-encode at `width` x `height`, or return the bytes unchanged when
    /// the size already matches.
    fn png_sized(&self, width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
        if (self.width, self.height) == (width, height) {
            return Ok(self.png.clone());
        }
        let image = image::load_from_memory_with_format(&self.png, ImageFormat::Png)?.to_rgba8();
        encode_png(&imageops::resize(&image, width, height, FilterType::Triangle))
    }
}

/// Write `frames` into a container. Frames whose size differs from the first
/// one are resized to match.
pub fn write_frames<W: Write + Seek>(
    writer: W,
    fps: u32,
    frames: &[EncodedFrame],
) -> Result<FrameManifest, CaptureError> {
    let first = frames.first().ok_or(CaptureError::EmptyRecording)?;
    let manifest = FrameManifest {
        fps,
        width: first.width,
        height: first.height,
        frames: frames.len() as u32,
    };

    let mut zip = ZipWriter::new(writer);
    // PNG data is already compressed.
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_FILE, deflated)?;
    zip.write_all(&serde_json::to_vec_pretty(&manifest)?)
        .map_err(CaptureError::io(MANIFEST_FILE))?;

    for (index, frame) in frames.iter().enumerate() {
        let name = frame_name(index);
        let png = frame.png_sized(manifest.width, manifest.height)?;
        zip.start_file(name.as_str(), stored)?;
        zip.write_all(&png).map_err(CaptureError::io(name))?;
    }

    zip.finish()?;
    Ok(manifest)
}

/// Read every frame of a container, in order.
pub fn read_frames<R: Read + Seek>(reader: R) -> Result<(FrameManifest, Vec<RgbaImage>), CaptureError> {
    let mut archive = ZipArchive::new(reader)?;
    let manifest: FrameManifest = {
        let entry = archive.by_name(MANIFEST_FILE)?;
        serde_json::from_reader(entry)?
    };

    let mut frames = Vec::with_capacity(manifest.frames as usize);
    for index in 0..manifest.frames as usize {
        let name = frame_name(index);
        let mut bytes = Vec::new();
        archive
            .by_name(&name)?
            .read_to_end(&mut bytes)
            .map_err(CaptureError::io(name))?;
        let frame = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?.to_rgba8();
        frames.push(frame);
    }
    Ok((manifest, frames))
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
