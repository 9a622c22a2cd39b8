use std::path::PathBuf;

use thiserror::Error;

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Load-time rejection of authored schedule data. A schedule that fails here
/// never reaches the driver.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("interval {index}: bounds [{start}s, {end}s] must be finite, non-negative and increasing")]
    InvalidBounds { index: usize, start: f64, end: f64 },

    #[error("interval {index}: starts at {start}s, before the previous interval ends at {previous_end}s")]
    OutOfOrder {
        index: usize,
        start: f64,
        previous_end: f64,
    },

    #[error("interval {index}: topic {topic} is out of range ({topic_count} topics)")]
    TopicOutOfRange {
        index: usize,
        topic: usize,
        topic_count: usize,
    },

    #[error("recording length {0}s is not a finite, non-negative number")]
    InvalidRecording(f64),

    #[error("recording length {recording}s is shorter than the schedule ({last_end}s)")]
    RecordingTooShort { recording: f64, last_end: f64 },

    #[error("failed to parse schedule: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read schedule {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
