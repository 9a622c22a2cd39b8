use std::collections::BTreeMap;

use crate::{schedule::TopicId, timeline::TimelineEvent};

use super::PresentationSink;

/// One animation span as the sink actually played it: a freeze cuts the span
/// short at the frozen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedSpan {
    pub interval_index: usize,
    pub from_seconds: f64,
    pub target_seconds: f64,
    pub stopped_at: Option<f64>,
}

impl AnimatedSpan {
    pub fn effective_seconds(&self) -> f64 {
        self.stopped_at.unwrap_or(self.target_seconds) - self.from_seconds
    }
}

/// Reference sink: keeps every event and the state a renderer would derive
/// from them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<TimelineEvent>,
    spans: Vec<AnimatedSpan>,
    tally: Option<i64>,
    bars: BTreeMap<TopicId, f64>,
    viewport_width: Option<u16>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn spans(&self) -> &[AnimatedSpan] {
        &self.spans
    }

    /// Last tally shown, if any.
    pub fn tally(&self) -> Option<i64> {
        self.tally
    }

    pub fn bars(&self) -> &BTreeMap<TopicId, f64> {
        &self.bars
    }

    pub fn viewport_width(&self) -> Option<u16> {
        self.viewport_width
    }

    /// Interval indices in the order their topics were entered.
    pub fn entered(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TimelineEvent::TopicEntered { interval_index, .. } => Some(*interval_index),
                _ => None,
            })
            .collect()
    }

    /// Seconds of schedule time actually animated for one interval.
    pub fn animated_seconds(&self, interval_index: usize) -> f64 {
        self.spans
            .iter()
            .filter(|span| span.interval_index == interval_index)
            .map(AnimatedSpan::effective_seconds)
            .sum()
    }

    pub fn clear(&mut self) {
        *self = Self {
            viewport_width: self.viewport_width,
            ..Self::default()
        };
    }
}

impl PresentationSink for RecordingSink {
    fn emit(&mut self, event: TimelineEvent) {
        match &event {
            TimelineEvent::AnimateTo {
                interval_index,
                from_seconds,
                target_seconds,
                ..
            } => self.spans.push(AnimatedSpan {
                interval_index: *interval_index,
                from_seconds: *from_seconds,
                target_seconds: *target_seconds,
                stopped_at: None,
            }),
            TimelineEvent::Freeze { at_seconds } => {
                if let Some(span) = self.spans.last_mut() {
                    if span.stopped_at.is_none() && *at_seconds < span.target_seconds {
                        span.stopped_at = Some(at_seconds.max(span.from_seconds));
                    }
                }
            }
            TimelineEvent::TangentCountChanged { count, .. } => self.tally = Some(*count),
            TimelineEvent::TopicDurationUpdated {
                topic,
                total_seconds,
            } => {
                self.bars.insert(*topic, *total_seconds);
            }
            _ => {}
        }
        self.events.push(event);
    }

    fn resize(&mut self, viewport_width: u16) {
        self.viewport_width = Some(viewport_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_cuts_the_open_span() {
        let mut sink = RecordingSink::new();
        sink.emit(TimelineEvent::AnimateTo {
            topic: TopicId(0),
            interval_index: 0,
            from_seconds: 0.0,
            target_seconds: 6.0,
            duration_seconds: 6.0,
        });
        sink.emit(TimelineEvent::Freeze { at_seconds: 3.0 });
        sink.emit(TimelineEvent::AnimateTo {
            topic: TopicId(0),
            interval_index: 0,
            from_seconds: 3.0,
            target_seconds: 6.0,
            duration_seconds: 3.0,
        });

        assert_eq!(sink.spans().len(), 2);
        assert_eq!(sink.animated_seconds(0), 6.0);
    }

    #[test]
    fn clear_keeps_viewport() {
        let mut sink = RecordingSink::new();
        sink.resize(90);
        sink.emit(TimelineEvent::TangentCountChanged {
            count: 2,
            emphasize: true,
        });
        assert_eq!(sink.tally(), Some(2));

        sink.clear();
        assert!(sink.events().is_empty());
        assert_eq!(sink.tally(), None);
        assert_eq!(sink.viewport_width(), Some(90));
    }
}
