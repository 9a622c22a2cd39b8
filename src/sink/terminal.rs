use std::{collections::BTreeMap, io::Write, sync::Arc, time::Duration};

use crate::{
    layout::{format_seconds, ChartLayout, Margins},
    schedule::{Schedule, TopicId},
    timeline::TimelineEvent,
};

use super::{PresentationSink, Tween};

// Set to true to report write failures
const ENABLE_LOGS: bool = true;

use crate::log_warn;

const FIGURE: char = '●';
const SKIPPED: char = '·';
const CONNECTOR: char = '─';
const BAR: char = '█';

/// Draws the timeline as it plays, one row per topic change, with a bar chart
/// of time per topic on pause.
pub struct TerminalSink<W: Write> {
    schedule: Arc<Schedule>,
    layout: ChartLayout,
    writer: W,
    figure: Tween,
    figure_topic: Option<TopicId>,
    tally: i64,
    pop_pending: bool,
    bars: BTreeMap<TopicId, f64>,
    connector_from: Option<usize>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(schedule: Arc<Schedule>, viewport_width: u16, writer: W) -> Self {
        let layout = layout_for(&schedule, viewport_width);
        Self {
            schedule,
            layout,
            writer,
            figure: Tween::at_rest(0.0),
            figure_topic: None,
            tally: 0,
            pop_pending: false,
            bars: BTreeMap::new(),
            connector_from: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Playback position of the figure right now, interpolated.
    pub fn figure_seconds(&self) -> f64 {
        self.figure.value()
    }

    pub fn status_line(&self) -> String {
        let topic = self
            .figure_topic
            .and_then(|topic| self.schedule.topic_name(topic))
            .unwrap_or("-");
        format!(
            "{} {}  tangents: {}",
            format_seconds(self.figure_seconds()),
            topic,
            self.tally
        )
    }

    /// Horizontal bar per topic seen so far, scaled to the longest. A topic
    /// with no closed time yet still gets one cell.
    pub fn render_bars(&self) -> String {
        let label_width = self
            .bars
            .keys()
            .filter_map(|topic| self.schedule.topic_name(*topic))
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0);
        let space = (self.layout.width() as usize)
            .saturating_sub(label_width + 10)
            .max(1);
        let longest = self.bars.values().copied().fold(0.0_f64, f64::max);

        let mut out = String::new();
        for (topic, total) in &self.bars {
            let name = self.schedule.topic_name(*topic).unwrap_or("?");
            let cells = if longest > 0.0 {
                ((total / longest) * space as f64).round() as usize
            } else {
                0
            };
            let bar: String = std::iter::repeat(BAR).take(cells.max(1)).collect();
            out.push_str(&format!(
                "{name:>label_width$} {bar} {}\n",
                format_seconds(*total).trim_start()
            ));
        }
        out
    }

    fn column(&self, topic: TopicId) -> usize {
        let width = self.layout.chart_width() as usize;
        (self.layout.column_center(topic).floor().max(0.0) as usize).min(width.saturating_sub(1))
    }

    fn track(&self, topic: TopicId, mark: char, connect_from: Option<TopicId>) -> String {
        let width = self.layout.chart_width() as usize;
        let mut cells = vec![' '; width.max(1)];
        let here = self.column(topic);
        if let Some(previous) = connect_from {
            let there = self.column(previous);
            for cell in &mut cells[here.min(there)..=here.max(there)] {
                *cell = CONNECTOR;
            }
        }
        if let Some(cell) = cells.get_mut(here) {
            *cell = mark;
        }
        cells.into_iter().collect()
    }

    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.writer, "{line}") {
            log_warn!("failed to write timeline row: {err}");
        }
    }

    fn interval_topic(&self, index: usize) -> Option<TopicId> {
        self.schedule.get(index).map(|interval| interval.topic)
    }
}

impl<W: Write> PresentationSink for TerminalSink<W> {
    fn emit(&mut self, event: TimelineEvent) {
        match event {
            TimelineEvent::TopicEntered {
                topic,
                start_seconds,
                ..
            } => {
                let from = self.connector_from.take().and_then(|i| self.interval_topic(i));
                let track = self.track(topic, FIGURE, from);
                let name = self.schedule.topic_name(topic).unwrap_or("?");
                let pop = if std::mem::take(&mut self.pop_pending) { "!" } else { "" };
                let line = format!(
                    "{:>7} {track} {name}  [tangents: {}{pop}]",
                    format_seconds(start_seconds),
                    self.tally
                );
                self.write_line(&line);
            }
            TimelineEvent::IntervalSkipped {
                topic,
                interval_index,
            } => {
                let from = self.connector_from.take().and_then(|i| self.interval_topic(i));
                let track = self.track(topic, SKIPPED, from);
                let start = self
                    .schedule
                    .get(interval_index)
                    .map(|interval| interval.start.as_secs_f64())
                    .unwrap_or_default();
                let name = self.schedule.topic_name(topic).unwrap_or("?");
                let line = format!("{:>7} {track} {name} (missed)", format_seconds(start));
                self.write_line(&line);
            }
            TimelineEvent::ConnectorRevealed { from_interval, .. } => {
                self.connector_from = Some(from_interval);
            }
            TimelineEvent::AnimateTo {
                topic,
                from_seconds,
                target_seconds,
                duration_seconds,
                ..
            } => {
                self.figure = Tween::new(
                    from_seconds,
                    target_seconds,
                    Duration::from_secs_f64(duration_seconds.max(0.0)),
                );
                self.figure_topic = Some(topic);
            }
            TimelineEvent::TangentCountChanged { count, emphasize } => {
                self.tally = count;
                self.pop_pending = emphasize;
            }
            TimelineEvent::TopicDurationUpdated {
                topic,
                total_seconds,
            } => {
                self.bars.insert(topic, total_seconds);
            }
            TimelineEvent::Freeze { at_seconds } => {
                self.figure.freeze_at(at_seconds);
                let line = format!("{:>7} paused", format_seconds(at_seconds));
                self.write_line(&line);
                if !self.bars.is_empty() {
                    let bars = self.render_bars();
                    self.write_line(bars.trim_end());
                }
            }
            // The terminal scrolls on its own.
            TimelineEvent::ScrollTo { .. } => {}
        }
    }

    fn resize(&mut self, viewport_width: u16) {
        self.layout = layout_for(&self.schedule, viewport_width);
    }
}

fn layout_for(schedule: &Schedule, viewport_width: u16) -> ChartLayout {
    ChartLayout::new(
        f64::from(viewport_width),
        Margins::TERMINAL,
        schedule.topic_count(),
    )
}
