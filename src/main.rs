mod core;
mod decoder;
mod shared;
mod utils;

use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::disposition::Disposition;
use crate::core::orchestrator::{self, BatchConfig};
use crate::decoder::OpenCvBackend;
use crate::shared::constants;
use crate::shared::error::FramegrabError;
use crate::utils::logger;

/// Extract screenshots from video files at a fixed interval and optionally
/// delete or archive the videos afterwards.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the video files
    input_dir: PathBuf,

    /// Directory to store the screenshots (one subfolder per video)
    output_dir: PathBuf,

    /// Time interval in seconds between screenshots
    #[arg(short, long, default_value_t = constants::DEFAULT_INTERVAL_SECS)]
    interval: f64,

    /// Delete the original video files after processing
    #[arg(short, long)]
    delete: bool,

    /// Move videos to the archive folder after processing (requires --archive_dir)
    #[arg(short, long)]
    archive: bool,

    /// Directory to move processed videos into
    #[arg(long = "archive_dir", visible_alias = "archive-dir", value_name = "PATH")]
    archive_dir: Option<PathBuf>,

    /// File name suffix that marks a video (case-sensitive)
    #[arg(short, long, default_value = constants::VIDEO_SUFFIX)]
    suffix: String,

    /// Hide progress bars
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> Result<BatchConfig> {
        let disposition = Disposition::from_flags(self.delete, self.archive, self.archive_dir)?;
        Ok(BatchConfig::new(self.input_dir, self.output_dir)
            .with_interval(self.interval)
            .with_disposition(disposition)
            .with_suffix(self.suffix)
            .with_progress(!self.quiet))
    }
}

/// `-ad` is a two-letter short option clap cannot express, and left alone it
/// would parse as `-a -d`. Rewrite it to the long form before parsing.
/// Arguments after `--` are positional and left untouched.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut past_separator = false;
    args.into_iter()
        .map(|arg| {
            if past_separator {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    past_separator = true;
                    arg
                }
                Some("-ad") => OsString::from("--archive_dir"),
                Some(s) if s.starts_with("-ad=") => OsString::from(format!("--archive_dir={}", &s[4..])),
                _ => arg,
            }
        })
        .collect()
}

fn log_failure(e: anyhow::Error) -> anyhow::Error {
    let is_config = e
        .downcast_ref::<FramegrabError>()
        .map_or(false, FramegrabError::is_config_error);
    // Configuration errors only reach stderr; the log files are not opened yet
    if !is_config {
        logger::error(&format!("{:#}", e));
    }
    e
}

/// Builds and validates the batch config, and only then opens the log files
/// in `log_dir`. A rejected command line leaves the filesystem untouched.
fn startup(cli: Cli, log_dir: &Path) -> Result<BatchConfig> {
    let config = cli.into_config()?;
    config.validate()?;

    logger::init(log_dir);
    logger::debug(&format!("{:?}", config));
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let log_dir = std::env::current_dir().unwrap_or_default();

    let config = startup(cli, &log_dir)?;
    orchestrator::run(&OpenCvBackend::new(), &config).map_err(log_failure)?;
    Ok(())
}
