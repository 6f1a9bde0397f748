use anyhow::{Context, Result};
use opencv::{
    core::{Mat, Vector},
    imgcodecs,
    prelude::*,
    videoio,
};
use std::path::{Path, PathBuf};

use super::{FrameSource, VideoBackend, VideoInfo};
use crate::shared::error::FramegrabError;
use crate::utils::logger;

/// OpenCV `VideoCapture` for decoding, `imwrite` for JPEG output.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvBackend;

impl OpenCvBackend {
    pub fn new() -> Self {
        Self
    }
}

pub struct OpenCvSource {
    capture: videoio::VideoCapture,
    path: PathBuf,
    info: VideoInfo,
}

impl VideoBackend for OpenCvBackend {
    type Source = OpenCvSource;

    fn open(&self, path: &Path) -> Result<OpenCvSource> {
        let path_str = path
            .to_str()
            .ok_or_else(|| FramegrabError::OpenFailed(path.to_path_buf()))?;

        // CAP_ANY lets OpenCV pick the backend for the platform
        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .with_context(|| format!("OpenCV could not create a capture for {}", path.display()))?;

        if !capture.is_opened()? {
            logger::error(&format!("Failed to open video file: {}", path.display()));
            return Err(FramegrabError::OpenFailed(path.to_path_buf()).into());
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        // Some containers report -1 or garbage here; the count is advisory only
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64;

        logger::debug(&format!(
            "opened {} (fps={}, frames={})",
            path.display(),
            fps,
            frame_count
        ));

        Ok(OpenCvSource {
            capture,
            path: path.to_path_buf(),
            info: VideoInfo::new(fps, frame_count),
        })
    }

    fn write_frame(&self, frame: &Mat, path: &Path) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| FramegrabError::ImageWrite(path.to_path_buf()))?;

        let written = imgcodecs::imwrite(path_str, frame, &Vector::<i32>::new())
            .with_context(|| format!("OpenCV failed encoding {}", path.display()))?;
        if !written {
            return Err(FramegrabError::ImageWrite(path.to_path_buf()).into());
        }
        Ok(())
    }
}

impl FrameSource for OpenCvSource {
    type Frame = Mat;

    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .with_context(|| format!("Decoding error in {}", self.path.display()))?;

        if !grabbed || frame.empty() {
            return Ok(None); // EOF
        }
        Ok(Some(frame))
    }
}

impl Drop for OpenCvSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            logger::error(&format!("Failed to release {}: {}", self.path.display(), e));
        }
    }
}
