use std::path::PathBuf;
use thiserror::Error;

/// Conditions callers need to tell apart. Everything else travels as a plain
/// `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum FramegrabError {
    #[error("input directory '{}' does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("--archive requires --archive_dir to be specified")]
    ArchiveDirMissing,

    #[error("interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("video suffix must not be empty")]
    EmptySuffix,

    #[error("video '{}' reports an unusable frame rate ({fps})", path.display())]
    InvalidFrameRate { path: PathBuf, fps: f64 },

    #[error("failed to open video file: {}", .0.display())]
    OpenFailed(PathBuf),

    #[error("failed to write image: {}", .0.display())]
    ImageWrite(PathBuf),

    #[error("archive destination already exists: {}", .0.display())]
    ArchiveConflict(PathBuf),
}

impl FramegrabError {
    /// Configuration errors are reported before any work starts.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            FramegrabError::InputNotFound(_)
                | FramegrabError::ArchiveDirMissing
                | FramegrabError::InvalidInterval(_)
                | FramegrabError::EmptySuffix
        )
    }
}
