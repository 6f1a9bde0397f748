pub mod video;
pub mod video_info;

#[cfg(test)]
pub mod synthetic;

use anyhow::Result;
use std::path::Path;

pub use video::OpenCvBackend;
pub use video_info::VideoInfo;

/// An opened video, read front to back exactly once.
///
/// Implementations release their decoder when dropped, so an early return
/// from a sampling loop never leaks the underlying handle.
pub trait FrameSource {
    type Frame;

    fn info(&self) -> VideoInfo;

    /// Next decoded frame in playback order, `None` once the stream is exhausted.
    fn read_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// Decode and image-encode capability the sampler is built on.
pub trait VideoBackend {
    type Source: FrameSource;

    fn open(&self, path: &Path) -> Result<Self::Source>;

    /// Encode `frame` as a lossy image at `path`, replacing any existing file.
    fn write_frame(&self, frame: &<Self::Source as FrameSource>::Frame, path: &Path) -> Result<()>;
}
