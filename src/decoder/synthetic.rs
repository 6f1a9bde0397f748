//! In-memory stand-in for a real decoder.
//!
//! A fake video file holds `"<fps> <frames>"`, optionally followed by
//! `fail@<n>` to make decoding of frame `n` error out. Frames are their own
//! frame numbers, and written images contain that number as text.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{FrameSource, VideoBackend, VideoInfo};
use crate::shared::error::FramegrabError;

#[derive(Default, Clone)]
pub struct SyntheticBackend {
    pub opened: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

pub struct SyntheticSource {
    info: VideoInfo,
    next: u64,
    fail_at: Option<u64>,
    released: Arc<AtomicUsize>,
}

impl SyntheticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// Writes a fake video description to `path`.
pub fn write_fake_video(path: &Path, fps: f64, frames: u64) {
    fs::write(path, format!("{} {}", fps, frames)).unwrap();
}

/// Reads back the frame number stored in an image written by the backend.
pub fn read_frame_number(path: &Path) -> u64 {
    fs::read_to_string(path).unwrap().trim().parse().unwrap()
}

impl VideoBackend for SyntheticBackend {
    type Source = SyntheticSource;

    fn open(&self, path: &Path) -> Result<SyntheticSource> {
        let text = fs::read_to_string(path)
            .map_err(|_| FramegrabError::OpenFailed(path.to_path_buf()))?;
        let mut parts = text.split_whitespace();

        let fps: f64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| FramegrabError::OpenFailed(path.to_path_buf()))?;
        let frames: u64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| FramegrabError::OpenFailed(path.to_path_buf()))?;
        let fail_at = parts
            .next()
            .and_then(|s| s.strip_prefix("fail@"))
            .and_then(|s| s.parse().ok());

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(SyntheticSource {
            info: VideoInfo::new(fps, frames),
            next: 0,
            fail_at,
            released: Arc::clone(&self.released),
        })
    }

    fn write_frame(&self, frame: &u64, path: &Path) -> Result<()> {
        fs::write(path, frame.to_string())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl FrameSource for SyntheticSource {
    type Frame = u64;

    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&mut self) -> Result<Option<u64>> {
        if self.fail_at == Some(self.next) {
            return Err(anyhow!("corrupt packet at frame {}", self.next));
        }
        if self.next >= self.info.frame_count {
            return Ok(None);
        }
        let frame = self.next;
        self.next += 1;
        Ok(Some(frame))
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
