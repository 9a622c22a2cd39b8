use serde::Serialize;

use crate::schedule::TopicId;

/// What the driver tells the presentation layer. Times are playback seconds
/// except `*_duration` fields, which are real-time spans the sink should
/// interpolate over.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TimelineEvent {
    /// The figure moved onto a topic for a new interval.
    TopicEntered {
        topic: TopicId,
        interval_index: usize,
        start_seconds: f64,
    },
    /// Reveal the connector from the end of one interval to the start of the
    /// next.
    ConnectorRevealed {
        from_interval: usize,
        to_interval: usize,
    },
    /// Interpolate linearly from `from_seconds` to `target_seconds` over
    /// `duration_seconds` of real time: figure, path and open bar together.
    AnimateTo {
        topic: TopicId,
        interval_index: usize,
        from_seconds: f64,
        target_seconds: f64,
        duration_seconds: f64,
    },
    /// An interval elapsed without ever being entered; draw it fully.
    IntervalSkipped {
        topic: TopicId,
        interval_index: usize,
    },
    TangentCountChanged { count: i64, emphasize: bool },
    /// Closed-interval total for a topic. A zero total means the topic just
    /// appeared; sinks give it a visible minimum width.
    TopicDurationUpdated { topic: TopicId, total_seconds: f64 },
    ScrollTo {
        target_seconds: f64,
        duration_seconds: f64,
    },
    /// Snap every in-flight interpolation to its value at `at_seconds`.
    Freeze { at_seconds: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let event = TimelineEvent::TopicEntered {
            topic: TopicId(2),
            interval_index: 5,
            start_seconds: 42.0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "topicEntered");
        assert_eq!(json["topic"], 2);
        assert_eq!(json["intervalIndex"], 5);
        assert_eq!(json["startSeconds"], 42.0);
    }
}
