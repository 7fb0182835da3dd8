use std::{
    collections::HashMap,
    fs::File,
    io::{Cursor, Seek, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::{
    batch::run::CombinationResult,
    foundation::error::{OverlayError, OverlayResult},
};

/// Archive file name used when the caller does not pick one.
pub const DEFAULT_ARCHIVE_NAME: &str = "fabric_overlays.zip";

/// Replace every character outside `[A-Za-z0-9-]` with `-`.
///
/// Replacement is per UTF-16 code unit, so a character outside the Basic Multilingual Plane
/// (an emoji, say) becomes `--`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .flat_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                std::iter::repeat_n(c, 1)
            } else {
                std::iter::repeat_n('-', c.len_utf16())
            }
        })
        .collect()
}

/// Archive entry name for one composite: `"{base}-{fabric}.png"` with both names sanitized.
pub fn entry_filename(base_name: &str, fabric_name: &str) -> String {
    format!("{}-{}.png", sanitize_name(base_name), sanitize_name(fabric_name))
}

/// One named file destined for the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry file name.
    pub name: String,
    /// PNG bytes.
    pub png: Arc<Vec<u8>>,
}

/// Map results to archive entries in result order.
///
/// Two results that sanitize to the same file name collapse into one entry: the later result's
/// image wins and the entry keeps the position of the first occurrence.
pub fn archive_entries(results: &[CombinationResult]) -> Vec<ArchiveEntry> {
    let mut entries = Vec::<ArchiveEntry>::with_capacity(results.len());
    let mut index_by_name = HashMap::<String, usize>::with_capacity(results.len());

    for r in results {
        let name = entry_filename(&r.base_name, &r.fabric_name);
        if let Some(&idx) = index_by_name.get(&name) {
            tracing::warn!(
                entry = %name,
                base_index = r.base_index,
                fabric_index = r.fabric_index,
                "archive entry name collision, keeping the later image"
            );
            entries[idx].png = r.image.png.clone();
            continue;
        }
        index_by_name.insert(name.clone(), entries.len());
        entries.push(ArchiveEntry {
            name,
            png: r.image.png.clone(),
        });
    }
    entries
}

/// Build a zip archive of every composite in memory.
pub fn build_archive(results: &[CombinationResult]) -> OverlayResult<Vec<u8>> {
    let entries = non_empty_entries(results)?;
    let cursor = write_entries(Cursor::new(Vec::new()), &entries)?;
    Ok(cursor.into_inner())
}

/// Write a zip archive of every composite to `path`, creating parent directories as needed.
pub fn write_archive(results: &[CombinationResult], path: &Path) -> OverlayResult<()> {
    let entries = non_empty_entries(results)?;
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|e| {
        OverlayError::packaging(format!("failed to create '{}': {e}", path.display()))
    })?;
    write_entries(file, &entries)?;
    tracing::info!(path = %path.display(), entries = entries.len(), "archive written");
    Ok(())
}

/// Write each composite as its own PNG under `dir`, using the archive entry names.
pub fn write_pngs_to_dir(results: &[CombinationResult], dir: &Path) -> OverlayResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| {
        OverlayError::packaging(format!("failed to create '{}': {e}", dir.display()))
    })?;

    let mut written = Vec::new();
    for entry in archive_entries(results) {
        let path = dir.join(&entry.name);
        std::fs::write(&path, entry.png.as_slice()).map_err(|e| {
            OverlayError::packaging(format!("failed to write '{}': {e}", path.display()))
        })?;
        written.push(path);
    }
    Ok(written)
}

fn non_empty_entries(results: &[CombinationResult]) -> OverlayResult<Vec<ArchiveEntry>> {
    if results.is_empty() {
        return Err(OverlayError::packaging("no composites to package"));
    }
    Ok(archive_entries(results))
}

fn write_entries<W: Write + Seek>(writer: W, entries: &[ArchiveEntry]) -> OverlayResult<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for entry in entries {
        add_file_to_zip(&mut zip, &entry.name, entry.png.as_slice(), options)?;
    }

    zip.finish()
        .map_err(|e| OverlayError::packaging(format!("failed to finalize zip: {e}")))
}

fn add_file_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: &[u8],
    options: SimpleFileOptions,
) -> OverlayResult<()> {
    zip.start_file(name, options)
        .map_err(|e| OverlayError::packaging(format!("failed to start file {name}: {e}")))?;
    zip.write_all(content)
        .map_err(|e| OverlayError::packaging(format!("failed to write file {name}: {e}")))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> OverlayResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            OverlayError::packaging(format!("failed to create '{}': {e}", parent.display()))
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/package/archive.rs"]
mod tests;
