/// Stream properties reported by the decoder when a video is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub frame_rate: f64,
    pub frame_count: u64,
}

impl VideoInfo {
    pub fn new(frame_rate: f64, frame_count: u64) -> Self {
        Self { frame_rate, frame_count }
    }

    /// Zero, negative and NaN rates make elapsed-time computation meaningless.
    pub fn has_usable_frame_rate(&self) -> bool {
        self.frame_rate.is_finite() && self.frame_rate > 0.0
    }

    pub fn duration_secs(&self) -> f64 {
        if !self.has_usable_frame_rate() {
            return 0.0;
        }
        self.frame_count as f64 / self.frame_rate
    }

    /// Advisory sample count: floor(duration / interval).
    pub fn estimated_samples(&self, interval_secs: f64) -> u64 {
        if interval_secs <= 0.0 {
            return 0;
        }
        (self.duration_secs() / interval_secs).floor() as u64
    }
}
