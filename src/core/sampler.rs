use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::Path;

use crate::decoder::{FrameSource, VideoBackend};
use crate::shared::constants;
use crate::shared::error::FramegrabError;
use crate::utils::logger;

/// Picks frames at a fixed playback-time interval.
///
/// A frame is kept when it is the first one whose elapsed playback time
/// reaches the next threshold (`next_index * interval_secs`). Frame 0 is
/// therefore always kept.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    interval_secs: f64,
}

impl FrameSampler {
    pub fn new(interval_secs: f64) -> Self {
        Self { interval_secs }
    }

    pub fn is_due(&self, frame_number: u64, frame_rate: f64, next_index: usize) -> bool {
        frame_number as f64 / frame_rate >= next_index as f64 * self.interval_secs
    }

    /// Decodes `video` front to back and writes every due frame into
    /// `output_dir` as `frame_NNNN.jpg`. Returns the number of images written.
    ///
    /// Errors abort this video only; images already written are left in place.
    /// The decoder is released on every exit path when the source is dropped.
    pub fn sample<B: VideoBackend>(
        &self,
        backend: &B,
        video: &Path,
        output_dir: &Path,
        progress: &ProgressBar,
    ) -> Result<usize> {
        if !output_dir.is_dir() {
            anyhow::bail!("Output directory does not exist: {}", output_dir.display());
        }

        let mut source = backend
            .open(video)
            .with_context(|| format!("Failed to open {}", video.display()))?;
        let info = source.info();

        if !info.has_usable_frame_rate() {
            return Err(FramegrabError::InvalidFrameRate {
                path: video.to_path_buf(),
                fps: info.frame_rate,
            }
            .into());
        }

        progress.set_length(info.estimated_samples(self.interval_secs));
        logger::debug(&format!(
            "sampling {} every {}s (duration {:.2}s)",
            video.display(),
            self.interval_secs,
            info.duration_secs()
        ));

        let mut frame_number: u64 = 0;
        let mut next_index: usize = 0;

        while let Some(frame) = source
            .read_frame()
            .with_context(|| format!("Decoding failed at frame {} of {}", frame_number, video.display()))?
        {
            if self.is_due(frame_number, info.frame_rate, next_index) {
                let path = output_dir.join(constants::frame_file_name(next_index));
                backend.write_frame(&frame, &path)?;
                next_index += 1;
                progress.inc(1);
            }
            frame_number += 1;
        }

        logger::info(&format!(
            "{}: {} frames decoded, {} written",
            video.display(),
            frame_number,
            next_index
        ));
        Ok(next_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::synthetic::{read_frame_number, write_fake_video, SyntheticBackend};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn written_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn run(fps: f64, frames: u64, interval: f64) -> (usize, Vec<u64>, Vec<String>) {
        let tmp = tempdir().unwrap();
        let video = tmp.path().join("clip.mov");
        write_fake_video(&video, fps, frames);
        let out = tmp.path().join("clip");
        fs::create_dir(&out).unwrap();

        let backend = SyntheticBackend::new();
        let count = FrameSampler::new(interval)
            .sample(&backend, &video, &out, &ProgressBar::hidden())
            .unwrap();

        let names = written_names(&out);
        let picked = names.iter().map(|n| read_frame_number(&out.join(n))).collect();
        (count, picked, names)
    }

    #[test]
    fn test_first_frame_always_due() {
        let sampler = FrameSampler::new(60.0);
        assert!(sampler.is_due(0, 30.0, 0));
        assert!(!sampler.is_due(1, 30.0, 1));
    }

    #[test]
    fn test_one_minute_at_ten_seconds() {
        let (count, picked, names) = run(30.0, 1800, 10.0);
        assert_eq!(count, 6);
        assert_eq!(picked, vec![0, 300, 600, 900, 1200, 1500]);
        assert_eq!(
            names,
            vec![
                "frame_0000.jpg",
                "frame_0001.jpg",
                "frame_0002.jpg",
                "frame_0003.jpg",
                "frame_0004.jpg",
                "frame_0005.jpg",
            ]
        );
    }

    #[test]
    fn test_last_frame_on_threshold() {
        // 101 frames at 25fps end exactly at t=4.0s
        let (count, picked, _) = run(25.0, 101, 2.0);
        assert_eq!(count, 3);
        assert_eq!(picked, vec![0, 50, 100]);
    }

    #[test]
    fn test_fractional_frame_rate_picks_first_frame_past_threshold() {
        // 5s * 29.97 = 149.85, so frame 150 is the first at or past 5s
        let (count, picked, _) = run(29.97, 600, 5.0);
        assert_eq!(count, 4);
        assert_eq!(picked, vec![0, 150, 300, 450]);
    }

    #[test]
    fn test_interval_longer_than_video() {
        let (count, picked, _) = run(24.0, 48, 60.0);
        assert_eq!(count, 1);
        assert_eq!(picked, vec![0]);
    }

    #[test]
    fn test_count_matches_threshold_simulation() {
        for (fps, frames, interval) in [(30.0, 1000, 3.0), (23.976, 5000, 7.5), (60.0, 59, 0.5), (1.0, 10, 1.0)] {
            let (count, _, names) = run(fps, frames, interval);

            // distinct k with some frame n < frames such that n/fps >= k*interval
            let last_time = (frames - 1) as f64 / fps;
            let mut expected = 0;
            while last_time >= expected as f64 * interval {
                expected += 1;
            }
            assert_eq!(count, expected, "fps={} frames={} interval={}", fps, frames, interval);

            let contiguous: Vec<String> = (0..count).map(constants::frame_file_name).collect();
            assert_eq!(names, contiguous);
        }
    }

    #[test]
    fn test_empty_video_writes_nothing() {
        let (count, _, names) = run(30.0, 0, 1.0);
        assert_eq!(count, 0);
        assert!(names.is_empty());
    }

    #[test]
    fn test_zero_frame_rate_is_an_error() {
        let tmp = tempdir().unwrap();
        let video = tmp.path().join("still.mov");
        write_fake_video(&video, 0.0, 100);
        let backend = SyntheticBackend::new();

        let err = FrameSampler::new(1.0)
            .sample(&backend, &video, tmp.path(), &ProgressBar::hidden())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FramegrabError>(),
            Some(FramegrabError::InvalidFrameRate { .. })
        ));
        assert_eq!(backend.released(), 1);
    }

    #[test]
    fn test_decode_error_keeps_partial_output_and_releases() {
        let tmp = tempdir().unwrap();
        let video = tmp.path().join("broken.mov");
        fs::write(&video, "10 100 fail@25").unwrap();
        let out = tmp.path().join("broken");
        fs::create_dir(&out).unwrap();
        let backend = SyntheticBackend::new();

        let result = FrameSampler::new(1.0).sample(&backend, &video, &out, &ProgressBar::hidden());
        assert!(result.is_err());
        assert_eq!(written_names(&out), vec!["frame_0000.jpg", "frame_0001.jpg", "frame_0002.jpg"]);
        assert_eq!(backend.opened(), 1);
        assert_eq!(backend.released(), 1);
    }

    #[test]
    fn test_rerun_overwrites_same_files() {
        let tmp = tempdir().unwrap();
        let video = tmp.path().join("clip.mov");
        write_fake_video(&video, 30.0, 900);
        let out = tmp.path().join("clip");
        fs::create_dir(&out).unwrap();
        let backend = SyntheticBackend::new();
        let sampler = FrameSampler::new(10.0);

        sampler.sample(&backend, &video, &out, &ProgressBar::hidden()).unwrap();
        let first = written_names(&out);
        sampler.sample(&backend, &video, &out, &ProgressBar::hidden()).unwrap();
        assert_eq!(written_names(&out), first);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_progress_estimate_is_advisory() {
        let tmp = tempdir().unwrap();
        let video = tmp.path().join("clip.mov");
        write_fake_video(&video, 30.0, 1800);
        let out = tmp.path().join("clip");
        fs::create_dir(&out).unwrap();
        let pb = ProgressBar::hidden();

        let count = FrameSampler::new(10.0)
            .sample(&SyntheticBackend::new(), &video, &out, &pb)
            .unwrap();
        // floor(60 / 10) = 6 estimated, 6 written
        assert_eq!(pb.length(), Some(6));
        assert_eq!(pb.position(), count as u64);
    }

    #[test]
    fn test_missing_output_dir() {
        let tmp = tempdir().unwrap();
        let video = tmp.path().join("clip.mov");
        write_fake_video(&video, 30.0, 10);
        let backend = SyntheticBackend::new();

        let result = FrameSampler::new(1.0).sample(&backend, &video, &tmp.path().join("missing"), &ProgressBar::hidden());
        assert!(result.is_err());
        assert_eq!(backend.opened(), 0);
    }
}
