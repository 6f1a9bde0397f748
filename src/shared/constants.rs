pub const APP_NAME: &str = "framegrab";

pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

/// Case-sensitive suffix a file name must end with to be treated as a video.
pub const VIDEO_SUFFIX: &str = ".mov";

pub const DEFAULT_INTERVAL_SECS: f64 = 60.0;

pub const FRAME_FILE_PREFIX: &str = "frame_";
pub const FRAME_FILE_EXTENSION: &str = "jpg";
pub const FRAME_INDEX_WIDTH: usize = 4;

/// `frame_0000.jpg`, `frame_0001.jpg`, ... Indices past 9999 simply grow wider.
pub fn frame_file_name(index: usize) -> String {
    format!(
        "{}{:0width$}.{}",
        FRAME_FILE_PREFIX,
        index,
        FRAME_FILE_EXTENSION,
        width = FRAME_INDEX_WIDTH
    )
}
