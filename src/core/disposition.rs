use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::error::FramegrabError;
use crate::utils::{file_utils, logger};

/// What happens to a source video once all of its frames are on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    None,
    Delete,
    Archive(PathBuf),
}

impl Disposition {
    /// Resolves the command-line flags into a single disposition.
    ///
    /// Archiving without a (non-empty) target directory is rejected even when
    /// `delete` is also set. When both are requested, delete wins.
    pub fn from_flags(
        delete: bool,
        archive: bool,
        archive_dir: Option<PathBuf>,
    ) -> Result<Self, FramegrabError> {
        let archive_dir = archive_dir.filter(|dir| !dir.as_os_str().is_empty());

        if archive && archive_dir.is_none() {
            return Err(FramegrabError::ArchiveDirMissing);
        }

        if delete {
            if archive {
                logger::warn("both --delete and --archive given; deleting instead of archiving");
            }
            return Ok(Disposition::Delete);
        }

        match (archive, archive_dir) {
            (true, Some(dir)) => Ok(Disposition::Archive(dir)),
            _ => Ok(Disposition::None),
        }
    }

    /// Applies the disposition to `video` and returns the confirmation line to
    /// show the user, if any.
    pub fn apply(&self, video: &Path) -> Result<Option<String>> {
        let name = video
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| video.display().to_string());

        match self {
            Disposition::None => Ok(None),
            Disposition::Delete => {
                fs::remove_file(video)
                    .with_context(|| format!("Failed to delete {}", video.display()))?;
                logger::info(&format!("deleted {}", video.display()));
                Ok(Some(format!("Deleted: {}", name)))
            }
            Disposition::Archive(dir) => {
                let dest = file_utils::move_into_dir(video, dir)?;
                logger::info(&format!("archived {} -> {}", video.display(), dest.display()));
                Ok(Some(format!("Moved {} to {}", name, dir.display())))
            }
        }
    }
}
