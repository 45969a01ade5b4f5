//! Asset export: a zip of every loaded part's folder plus a README.

use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::machine::CaptureError;
use crate::content::{TransformOverride, ViewerSettings};
use crate::parts::PartDescriptor;

pub const README_FILE: &str = "README.txt";

/// One file going into the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    /// Path inside the archive, `<part folder>/<file>`.
    pub archive_name: String,
    pub source: PathBuf,
}

/// Every file in each part's folder. Parts sharing a folder are listed once.
pub fn collect_export_files(
    assets_root: &Path,
    parts: &[PartDescriptor],
) -> Result<Vec<ExportEntry>, CaptureError> {
    let mut entries: Vec<ExportEntry> = Vec::new();
    for part in parts {
        let mesh = assets_root.join(&part.path);
        let Some(dir) = mesh.parent() else {
            continue;
        };
        let folder = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| part.name.clone());

        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(CaptureError::io(dir))?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        for source in files {
            let Some(file_name) = source.file_name() else {
                continue;
            };
            let archive_name = format!("{folder}/{}", file_name.to_string_lossy());
            if entries.iter().all(|e| e.archive_name != archive_name) {
                entries.push(ExportEntry {
                    archive_name,
                    source,
                });
            }
        }
    }
    Ok(entries)
}

/// Weapon correction applied at attachment time: the configured default
/// rotation overlaid with the character's weapon offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponPlacement {
    pub position: [f32; 3],
    /// XYZ Euler degrees.
    pub rotation_deg: [f32; 3],
    pub scale: [f32; 3],
    pub from_offsets: bool,
}

impl WeaponPlacement {
    pub fn resolve(settings: &ViewerSettings, over: Option<&TransformOverride>) -> Self {
        Self {
            position: over.and_then(|o| o.position).unwrap_or([0.0; 3]),
            rotation_deg: over
                .and_then(|o| o.rotation)
                .unwrap_or(settings.weapon_rotation_deg),
            scale: over
                .and_then(|o| o.scale)
                .map_or([1.0; 3], |s| s.to_vec3().to_array()),
            from_offsets: over.is_some(),
        }
    }
}

fn triple(values: [f32; 3]) -> String {
    format!("({}, {}, {})", values[0], values[1], values[2])
}

pub fn readme_text(
    character: &str,
    variant: &str,
    parts: &[PartDescriptor],
    weapon: &WeaponPlacement,
) -> String {
    let source = if weapon.from_offsets {
        "the per-character offset file"
    } else {
        "the viewer defaults"
    };
    let mut text = format!(
        "{character} / {variant}\n\
         \n\
         Each folder holds one part exactly as the viewer loads it (glTF\n\
         binary plus any sibling textures). Parts share the body skeleton:\n\
         import the body first, then the other parts onto the same rig.\n\
         \n\
         Units are the source units of the models; the viewer shows them at\n\
         scale 1. Weapons are authored at the origin and are attached to a\n\
         hand bone at runtime with this local transform (from {source}):\n\
         \n\
         \x20 rotation (XYZ degrees): {}\n\
         \x20 position: {}\n\
         \x20 scale: {}\n\
         \n\
         Parts:\n",
        triple(weapon.rotation_deg),
        triple(weapon.position),
        triple(weapon.scale),
    );
    for part in parts {
        let placement = if part.default_position {
            ", authored position"
        } else {
            ""
        };
        text.push_str(&format!(
            "  - {} ({}{})\n",
            part.name,
            part.part_type.label(),
            placement
        ));
    }
    text
}

/// Write the bundle; returns the number of files copied (README excluded).
pub fn write_bundle<W: Write + Seek>(
    writer: W,
    entries: &[ExportEntry],
    readme: &str,
) -> Result<usize, CaptureError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default();

    zip.start_file(README_FILE, options)?;
    zip.write_all(readme.as_bytes())
        .map_err(CaptureError::io(README_FILE))?;

    for entry in entries {
        let bytes = fs::read(&entry.source).map_err(CaptureError::io(&entry.source))?;
        zip.start_file(entry.archive_name.as_str(), options)?;
        zip.write_all(&bytes)
            .map_err(CaptureError::io(&entry.source))?;
    }

    zip.finish()?;
    Ok(entries.len())
}

/// Write the bundle to `output`, creating its directory.
pub fn export_bundle(
    output: &Path,
    entries: &[ExportEntry],
    readme: &str,
) -> Result<usize, CaptureError> {
    if let Some(dir) = output.parent() {
        fs::create_dir_all(dir).map_err(CaptureError::io(dir))?;
    }
    let file = File::create(output).map_err(CaptureError::io(output))?;
    write_bundle(file, entries, readme)
}
