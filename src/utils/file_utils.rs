use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::shared::error::FramegrabError;

/// Regular files directly inside `dir` whose name ends with `suffix`
/// (case-sensitive), sorted by file name. Subdirectories are not descended into.
pub fn list_files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            // Compare raw bytes so names that are not valid UTF-8 still match
            path.is_file()
                && path
                    .file_name()
                    .map_or(false, |name| name.as_encoded_bytes().ends_with(suffix.as_bytes()))
        })
        .collect();

    // Directory enumeration order is platform dependent
    files.sort();
    Ok(files)
}

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Moves `src` into `dest_dir` keeping its file name. Refuses to replace an
/// existing destination. Falls back to copy + remove when a rename cannot
/// cross filesystems.
pub fn move_into_dir(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = src
        .file_name()
        .with_context(|| format!("Not a file path: {}", src.display()))?;
    let dest = dest_dir.join(file_name);

    if dest.exists() {
        return Err(FramegrabError::ArchiveConflict(dest).into());
    }

    match fs::rename(src, &dest) {
        Ok(()) => Ok(dest),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(e).with_context(|| format!("Failed to move {}", src.display()))
        }
        Err(_) => {
            fs::copy(src, &dest)
                .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
            fs::remove_file(src)
                .with_context(|| format!("Failed to remove {} after copying", src.display()))?;
            Ok(dest)
        }
    }
}
