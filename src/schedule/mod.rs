pub mod builtin;
pub mod error;
pub mod interval;

pub use error::{ScheduleError, ScheduleResult};
pub use interval::{IntervalSpec, TopicId, TopicInterval};

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// Schedule data as authored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFile {
    pub topics: Vec<String>,
    pub intervals: Vec<IntervalSpec>,
    /// Length of the recording. Drives the time axis and autoscroll; defaults
    /// to the end of the last interval.
    #[serde(default)]
    pub recording_seconds: Option<f64>,
}

/// Ordered, validated topic intervals plus the parallel list of topic names.
///
/// Insertion order is playback order. Nothing mutates a schedule once built.
#[derive(Debug, Clone)]
pub struct Schedule {
    topics: Vec<String>,
    intervals: Vec<TopicInterval>,
    recording: Duration,
}

impl Schedule {
    pub fn new(
        topics: Vec<String>,
        specs: &[IntervalSpec],
        recording_seconds: Option<f64>,
    ) -> ScheduleResult<Self> {
        let mut intervals = Vec::with_capacity(specs.len());
        let mut previous_end: Option<(f64, Duration)> = None;

        for (index, spec) in specs.iter().enumerate() {
            let well_formed = spec.start.is_finite()
                && spec.end.is_finite()
                && spec.start >= 0.0
                && spec.start < spec.end;
            let invalid = || ScheduleError::InvalidBounds {
                index,
                start: spec.start,
                end: spec.end,
            };
            if !well_formed {
                return Err(invalid());
            }
            let start = Duration::try_from_secs_f64(spec.start).map_err(|_| invalid())?;
            let end = Duration::try_from_secs_f64(spec.end).map_err(|_| invalid())?;

            if let Some((previous_secs, previous)) = previous_end {
                if start < previous {
                    return Err(ScheduleError::OutOfOrder {
                        index,
                        start: spec.start,
                        previous_end: previous_secs,
                    });
                }
            }

            if spec.topic >= topics.len() {
                return Err(ScheduleError::TopicOutOfRange {
                    index,
                    topic: spec.topic,
                    topic_count: topics.len(),
                });
            }

            intervals.push(TopicInterval::new(start, end, TopicId(spec.topic)));
            previous_end = Some((spec.end, end));
        }

        let last_end = intervals.last().map(|t| t.end).unwrap_or_default();
        let recording = match recording_seconds {
            None => last_end,
            Some(secs) => {
                let recording = (secs.is_finite() && secs >= 0.0)
                    .then(|| Duration::try_from_secs_f64(secs).ok())
                    .flatten()
                    .ok_or(ScheduleError::InvalidRecording(secs))?;
                if recording < last_end {
                    return Err(ScheduleError::RecordingTooShort {
                        recording: secs,
                        last_end: last_end.as_secs_f64(),
                    });
                }
                recording
            }
        };

        Ok(Self {
            topics,
            intervals,
            recording,
        })
    }

    pub fn from_file(file: ScheduleFile) -> ScheduleResult<Self> {
        Self::new(file.topics, &file.intervals, file.recording_seconds)
    }

    pub fn from_json_str(json: &str) -> ScheduleResult<Self> {
        let file: ScheduleFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn load(path: &Path) -> ScheduleResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ScheduleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// The schedule bundled with the player.
    pub fn builtin() -> ScheduleResult<Self> {
        Self::from_file(builtin::press_conference())
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TopicInterval> {
        self.intervals.get(index)
    }

    pub fn intervals(&self) -> &[TopicInterval] {
        &self.intervals
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn topic_name(&self, topic: TopicId) -> Option<&str> {
        self.topics.get(topic.0).map(String::as_str)
    }

    /// Length of the recording the schedule annotates.
    pub fn recording(&self) -> Duration {
        self.recording
    }

    /// End of the last interval, zero for an empty schedule.
    pub fn end(&self) -> Duration {
        self.intervals.last().map(|t| t.end).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("t{i}")).collect()
    }

    #[test]
    fn accepts_contiguous_and_gapped_intervals() {
        let schedule = Schedule::new(
            topics(2),
            &[
                IntervalSpec::new(0.0, 6.0, 0),
                IntervalSpec::new(6.0, 10.0, 1),
                IntervalSpec::new(12.0, 14.0, 0),
            ],
            None,
        )
        .unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.end(), Duration::from_secs(14));
        assert_eq!(schedule.recording(), Duration::from_secs(14));
        assert_eq!(schedule.topic_name(TopicId(1)), Some("t1"));
    }

    #[test]
    fn rejects_backwards_bounds() {
        let err = Schedule::new(topics(1), &[IntervalSpec::new(5.0, 5.0, 0)], None).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidBounds { index: 0, .. }));

        let err =
            Schedule::new(topics(1), &[IntervalSpec::new(-1.0, 5.0, 0)], None).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidBounds { .. }));

        let err = Schedule::new(topics(1), &[IntervalSpec::new(0.0, f64::NAN, 0)], None)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidBounds { .. }));
    }

    #[test]
    fn rejects_overlap_and_reordering() {
        let err = Schedule::new(
            topics(2),
            &[IntervalSpec::new(0.0, 6.0, 0), IntervalSpec::new(5.0, 8.0, 1)],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn rejects_unknown_topic() {
        let err = Schedule::new(topics(2), &[IntervalSpec::new(0.0, 1.0, 2)], None).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::TopicOutOfRange {
                topic: 2,
                topic_count: 2,
                ..
            }
        ));
    }

    #[test]
    fn recording_must_cover_schedule() {
        let err = Schedule::new(topics(1), &[IntervalSpec::new(0.0, 10.0, 0)], Some(8.0))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::RecordingTooShort { .. }));

        let err = Schedule::new(topics(1), &[], Some(f64::INFINITY)).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidRecording(_)));
    }

    #[test]
    fn empty_schedule_is_valid() {
        let schedule = Schedule::new(Vec::new(), &[], None).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.end(), Duration::ZERO);
    }

    #[test]
    fn parses_json_file_format() {
        let schedule = Schedule::from_json_str(
            r#"{
                "topics": ["A", "B"],
                "intervals": [
                    {"start": 0, "end": 6, "topic": 0},
                    {"start": 6, "end": 10, "topic": 1}
                ],
                "recordingSeconds": 12
            }"#,
        )
        .unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.recording(), Duration::from_secs(12));
        assert_eq!(schedule.get(1).map(|t| t.topic), Some(TopicId(1)));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("tangent-tally-no-such-schedule.json");
        let err = Schedule::load(&path).unwrap_err();
        assert!(err.to_string().contains("tangent-tally-no-such-schedule.json"));
    }

    #[test]
    fn builtin_schedule_validates() {
        let schedule = Schedule::builtin().unwrap();
        assert_eq!(schedule.len(), 31);
        assert_eq!(schedule.topic_count(), 13);
        assert_eq!(schedule.end(), Duration::from_secs(267));
        assert_eq!(schedule.recording(), Duration::from_secs(270));
        // Contiguous throughout.
        for pair in schedule.intervals().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }
}
