//! Geometry derived from the viewport width: one column per topic.
//! Recomputed wholesale on every resize; nothing here is playback state.

use chrono::NaiveTime;

use crate::schedule::TopicId;

/// Inner and outer padding of the topic band scale, as a fraction of a step.
const BAND_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub right: f64,
    pub left: f64,
}

impl Margins {
    /// Cell margins for a terminal: room for a `%_M:%S` timestamp on the left.
    pub const TERMINAL: Margins = Margins {
        right: 1.0,
        left: 8.0,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    width: f64,
    margins: Margins,
    topic_count: usize,
}

impl ChartLayout {
    pub fn new(viewport_width: f64, margins: Margins, topic_count: usize) -> Self {
        Self {
            width: viewport_width.max(0.0),
            margins,
            topic_count,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn chart_width(&self) -> f64 {
        (self.width - self.margins.left - self.margins.right).max(0.0)
    }

    fn step(&self) -> f64 {
        if self.topic_count == 0 {
            return 0.0;
        }
        let n = self.topic_count as f64;
        self.chart_width() / (n - BAND_PADDING + 2.0 * BAND_PADDING)
    }

    /// Width of one topic column.
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - BAND_PADDING)
    }

    /// Left edge of a topic's column, relative to the chart origin.
    pub fn column_x(&self, topic: TopicId) -> f64 {
        let n = self.topic_count as f64;
        let step = self.step();
        let offset = (self.chart_width() - step * (n - BAND_PADDING)) / 2.0;
        offset + step * topic.0 as f64
    }

    pub fn column_center(&self, topic: TopicId) -> f64 {
        self.column_x(topic) + self.bandwidth() / 2.0
    }
}

/// Renders playback seconds the way the time axis labels them (` 4:07`).
pub fn format_seconds(seconds: f64) -> String {
    let whole = seconds.max(0.0).floor() as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(whole % 86_400, 0)
        .map(|time| time.format("%_M:%S").to_string())
        .unwrap_or_default()
}
