use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Index into the schedule's topic-name list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub usize);

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topic#{}", self.0)
    }
}

/// One authored interval as it appears in a schedule file, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalSpec {
    pub start: f64,
    pub end: f64,
    pub topic: usize,
}

impl IntervalSpec {
    pub const fn new(start: f64, end: f64, topic: usize) -> Self {
        Self { start, end, topic }
    }
}

/// A validated span of playback time during which one topic is active.
///
/// Bounds are kept as `Duration` so that comparisons against a clock that
/// advances in whole ticks are exact: 60 ticks of 100 ms land on 6 s, not on
/// 5.999999 s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicInterval {
    pub start: Duration,
    pub end: Duration,
    pub topic: TopicId,
}

impl TopicInterval {
    pub fn new(start: Duration, end: Duration, topic: TopicId) -> Self {
        Self { start, end, topic }
    }

    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    /// Time left in this interval at `elapsed`, zero once it has ended.
    pub fn remaining_at(&self, elapsed: Duration) -> Duration {
        self.end.saturating_sub(elapsed)
    }

    pub fn contains(&self, elapsed: Duration) -> bool {
        self.start <= elapsed && elapsed < self.end
    }
}
