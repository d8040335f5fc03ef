//! Zip packaging of a finished mirror
//!
//! Pure post-processing: walks the completed mirror directory and deflates
//! every regular file with paths relative to the mirror root.

use crate::MirrorError;
use std::io::{Cursor, Write};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compresses a directory tree into zip bytes
///
/// # Arguments
///
/// * `source` - The mirror root to archive
/// * `exclude` - Optional path to leave out (the archive file itself, when it
///   lives inside the source tree)
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The zip archive bytes
/// * `Err(MirrorError::Archive)` - Walk or compression failure
pub fn archive_dir(source: &Path, exclude: Option<&Path>) -> Result<Vec<u8>, MirrorError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| MirrorError::Archive(e.to_string()))?;
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }
        if exclude.is_some_and(|excluded| path == excluded) {
            continue;
        }

        let relative = path
            .strip_prefix(source)
            .map_err(|e| MirrorError::Archive(e.to_string()))?;
        let name = relative.to_string_lossy().replace('\\', "/");

        writer
            .start_file(&name, options)
            .map_err(|e| MirrorError::Archive(e.to_string()))?;
        let bytes = std::fs::read(path)?;
        writer.write_all(&bytes)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| MirrorError::Archive(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Archives a directory and writes the zip next to it or inside it
pub fn write_archive(source: &Path, dest: &Path) -> Result<(), MirrorError> {
    let bytes = archive_dir(source, Some(dest))?;
    std::fs::write(dest, bytes).map_err(|e| MirrorError::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}
