use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use super::disposition::Disposition;
use super::sampler::FrameSampler;
use crate::decoder::VideoBackend;
use crate::shared::constants;
use crate::shared::error::FramegrabError;
use crate::utils::{file_utils, logger};

/// Everything one batch run needs.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub interval_secs: f64,
    pub disposition: Disposition,
    pub suffix: String,
    pub show_progress: bool,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            interval_secs: constants::DEFAULT_INTERVAL_SECS,
            disposition: Disposition::None,
            suffix: constants::VIDEO_SUFFIX.to_string(),
            show_progress: true,
        }
    }

    pub fn with_interval(mut self, interval_secs: f64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Checks run before any file is created, moved or deleted.
    pub fn validate(&self) -> Result<(), FramegrabError> {
        if let Disposition::Archive(dir) = &self.disposition {
            if dir.as_os_str().is_empty() {
                return Err(FramegrabError::ArchiveDirMissing);
            }
        }
        if !self.interval_secs.is_finite() || self.interval_secs <= 0.0 {
            return Err(FramegrabError::InvalidInterval(self.interval_secs));
        }
        if self.suffix.is_empty() {
            return Err(FramegrabError::EmptySuffix);
        }
        if !self.input_dir.is_dir() {
            return Err(FramegrabError::InputNotFound(self.input_dir.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoStatus {
    Done { frames: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoOutcome {
    pub video: PathBuf,
    pub status: VideoStatus,
}

/// Per-video results in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<VideoOutcome>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, VideoStatus::Done { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.processed()
    }

    pub fn frames_written(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                VideoStatus::Done { frames } => frames,
                VideoStatus::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} video(s) processed, {} failed, {} frame(s) written",
            self.processed(),
            self.failed(),
            self.frames_written()
        )
    }
}

/// Samples every candidate video in `config.input_dir`, one at a time, then
/// applies the configured disposition to each one that sampled cleanly.
///
/// Configuration problems fail before anything touches the filesystem. A
/// failing video is recorded in the report and the batch moves on; its
/// disposition is skipped.
pub fn run<B: VideoBackend>(backend: &B, config: &BatchConfig) -> Result<BatchReport> {
    config.validate()?;

    file_utils::ensure_dir(&config.output_dir)?;
    if let Disposition::Archive(dir) = &config.disposition {
        file_utils::ensure_dir(dir)?;
    }

    let videos = file_utils::list_files_with_suffix(&config.input_dir, &config.suffix)?;
    logger::info(&format!(
        "{} candidate(s) ending in '{}' under {}",
        videos.len(),
        config.suffix,
        config.input_dir.display()
    ));

    let sampler = FrameSampler::new(config.interval_secs);
    let mut report = BatchReport::default();

    for video in videos {
        let status = match process_video(backend, &sampler, &video, config) {
            Ok(frames) => VideoStatus::Done { frames },
            Err(e) => {
                let reason = format!("{:#}", e);
                logger::error(&format!("{}: {}", video.display(), reason));
                eprintln!("Failed: {}: {}", display_name(&video), reason);
                VideoStatus::Failed { reason }
            }
        };
        report.outcomes.push(VideoOutcome { video, status });
    }

    logger::info(&report.summary());
    Ok(report)
}

fn process_video<B: VideoBackend>(
    backend: &B,
    sampler: &FrameSampler,
    video: &Path,
    config: &BatchConfig,
) -> Result<usize> {
    let stem = video
        .file_stem()
        .with_context(|| format!("No file stem for {}", video.display()))?;
    let video_output_dir = config.output_dir.join(stem);
    file_utils::ensure_dir(&video_output_dir)?;

    let pb = screenshot_bar(&format!("Processing {}", display_name(video)), config.show_progress);
    let sampled = sampler.sample(backend, video, &video_output_dir, &pb);
    pb.finish_and_clear();
    let frames = sampled?;

    if let Some(message) = config.disposition.apply(video)? {
        println!("{}", message);
    }
    Ok(frames)
}

/// Per-video bar counting written screenshots. The sampler sets its length
/// once the stream duration is known; it is only an estimate.
fn screenshot_bar(label: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} screenshot")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_message(label.to_string());
    pb
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
