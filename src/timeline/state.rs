use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::schedule::TopicId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
    Complete,
}

/// Optional presentation features. The page variants differed only in these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Capabilities {
    /// Emit per-topic duration totals for a bar chart.
    pub bar_chart: bool,
    /// Ask the sink to emphasize the tangent counter when it changes.
    pub tangent_pop: bool,
    /// Emit page-scroll targets on play and resume.
    pub autoscroll: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            bar_chart: true,
            tangent_pop: true,
            autoscroll: true,
        }
    }
}

impl Capabilities {
    /// Figure, path and tally only.
    pub fn minimal() -> Self {
        Self {
            bar_chart: false,
            tangent_pop: false,
            autoscroll: false,
        }
    }
}

/// Mutable playback progress, owned by the driver.
///
/// Elapsed time itself lives in the driver's clock.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Interval currently (or most recently) active. Equals the schedule
    /// length once playback is complete.
    pub current_interval_index: usize,
    /// Starts at -1 so the opening interval, which answers the question
    /// rather than drifting from it, shows a tally of 0.
    pub tangent_count: i64,
    /// Time spent per topic in closed intervals.
    pub per_topic: BTreeMap<TopicId, Duration>,
    /// Elapsed time at which the open interval was entered.
    pub last_transition_at: Duration,
    pub is_playing: bool,
    pub started_at: Option<DateTime<Utc>>,

    /// Last interval `TopicEntered` was emitted for.
    pub(crate) entered: Option<usize>,
    /// Intervals `[0, closed_through)` have been added to `per_topic`.
    pub(crate) closed_through: usize,
    /// Intervals `[0, counted_through)` have been added to the tally.
    pub(crate) counted_through: usize,
    /// An `AnimateTo` for the open interval is in flight at the sink.
    pub(crate) animating: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            current_interval_index: 0,
            tangent_count: -1,
            per_topic: BTreeMap::new(),
            last_transition_at: Duration::ZERO,
            is_playing: false,
            started_at: None,
            entered: None,
            closed_through: 0,
            counted_through: 0,
            animating: false,
        }
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulated(&self, topic: TopicId) -> Duration {
        self.per_topic.get(&topic).copied().unwrap_or_default()
    }

    pub fn total_accumulated(&self) -> Duration {
        self.per_topic.values().sum()
    }

    pub fn is_complete(&self) -> bool {
        self.status == PlaybackStatus::Complete
    }
}

/// Point-in-time view of a playback session for status queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub session_id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub status: PlaybackStatus,
    pub is_playing: bool,
    pub elapsed_seconds: f64,
    pub current_interval_index: usize,
    pub current_topic: Option<TopicId>,
    pub tangent_count: i64,
    pub per_topic_seconds: BTreeMap<TopicId, f64>,
    /// Time since the open topic was entered, for growing its bar live.
    pub seconds_since_transition: f64,
    /// Time left in the current interval.
    pub remaining_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_shows_minus_one_tally() {
        let state = PlaybackState::new();
        assert_eq!(state.tangent_count, -1);
        assert_eq!(state.status, PlaybackStatus::Idle);
        assert_eq!(state.total_accumulated(), Duration::ZERO);
        assert_eq!(state.accumulated(TopicId(4)), Duration::ZERO);
    }

    #[test]
    fn capabilities_fill_missing_fields_with_defaults() {
        let caps: Capabilities = serde_json::from_str(r#"{"barChart": false}"#).unwrap();
        assert!(!caps.bar_chart);
        assert!(caps.tangent_pop);
        assert!(caps.autoscroll);
    }

    #[test]
    fn status_serializes_camel_case() {
        let json = serde_json::to_string(&PlaybackStatus::Complete).unwrap();
        assert_eq!(json, r#""complete""#);
    }
}
