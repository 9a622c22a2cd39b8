use chrono::Utc;
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

use crate::{
    clock::ElapsedClock,
    schedule::{Schedule, TopicInterval},
    sink::PresentationSink,
};

use super::{Capabilities, PlaybackSnapshot, PlaybackState, PlaybackStatus, TimelineEvent};

// Set to true to log interval transitions
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Walks a schedule in step with an elapsed-time clock and tells a
/// presentation sink what to draw.
///
/// The driver is the only writer of its `PlaybackState`. It holds no timers:
/// callers feed it `tick`/`advance` and the play/pause commands, so every
/// mutation is serialized by whoever owns the driver.
pub struct TimelineDriver {
    schedule: Arc<Schedule>,
    capabilities: Capabilities,
    clock: ElapsedClock,
    state: PlaybackState,
    session_id: String,
}

impl TimelineDriver {
    pub fn new(schedule: Arc<Schedule>, clock: ElapsedClock, capabilities: Capabilities) -> Self {
        Self {
            schedule,
            capabilities,
            clock,
            state: PlaybackState::new(),
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn clock(&self) -> &ElapsedClock {
        &self.clock
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Starts or resumes playback. Returns `false` when already playing or
    /// complete.
    pub fn play(&mut self, sink: &mut dyn PresentationSink) -> bool {
        match self.state.status {
            PlaybackStatus::Playing | PlaybackStatus::Complete => return false,
            PlaybackStatus::Idle => {
                self.clock.reset();
                self.state.started_at = Some(Utc::now());
                if self.schedule.is_empty() {
                    log_info!("session {}: empty schedule, nothing to play", self.session_id);
                    self.finish();
                    return true;
                }
                log_info!(
                    "session {}: playing {} intervals",
                    self.session_id,
                    self.schedule.len()
                );
            }
            PlaybackStatus::Paused => {
                log_info!(
                    "session {}: resuming at {:.1}s",
                    self.session_id,
                    self.elapsed().as_secs_f64()
                );
            }
        }

        self.clock.start();
        self.state.status = PlaybackStatus::Playing;
        self.state.is_playing = true;
        self.settle(sink);

        if self.capabilities.autoscroll && self.state.status == PlaybackStatus::Playing {
            let elapsed = self.elapsed();
            let recording = self.schedule.recording();
            if recording > elapsed {
                sink.emit(TimelineEvent::ScrollTo {
                    target_seconds: recording.as_secs_f64(),
                    duration_seconds: (recording - elapsed).as_secs_f64(),
                });
            }
        }
        true
    }

    /// Freezes playback where it is. Returns `false` unless playing, or when
    /// the time that passed since the last tick finished the timeline.
    pub fn pause(&mut self, sink: &mut dyn PresentationSink) -> bool {
        if self.state.status != PlaybackStatus::Playing {
            return false;
        }
        // A throttled ticker may be far behind the wall clock.
        self.clock.sync();
        self.settle(sink);
        if self.state.status != PlaybackStatus::Playing {
            return false;
        }
        self.clock.stop();
        self.state.status = PlaybackStatus::Paused;
        self.state.is_playing = false;
        self.state.animating = false;

        let at = self.elapsed().as_secs_f64();
        log_info!("session {}: paused at {:.1}s", self.session_id, at);
        sink.emit(TimelineEvent::Freeze { at_seconds: at });
        true
    }

    /// One clock tick. Does nothing unless playing.
    pub fn tick(&mut self, sink: &mut dyn PresentationSink) -> PlaybackStatus {
        if self.state.status == PlaybackStatus::Playing {
            self.clock.tick();
            self.settle(sink);
        }
        self.state.status
    }

    /// Moves the clock forward by `by` at once, as after a throttled timer.
    /// Does nothing unless playing.
    pub fn advance(&mut self, by: Duration, sink: &mut dyn PresentationSink) -> PlaybackStatus {
        if self.state.status == PlaybackStatus::Playing {
            self.clock.advance(by);
            self.settle(sink);
        }
        self.state.status
    }

    /// Ends the session, freezing anything in flight, and returns its final
    /// state.
    pub fn dispose(mut self, sink: &mut dyn PresentationSink) -> PlaybackSnapshot {
        self.pause(sink);
        self.clock.stop();
        log_info!("session {}: disposed", self.session_id);
        self.snapshot()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let elapsed = self.elapsed();
        let current = self
            .state
            .entered
            .and_then(|index| self.schedule.get(index))
            .filter(|_| self.state.current_interval_index < self.schedule.len());

        PlaybackSnapshot {
            session_id: self.session_id.clone(),
            started_at: self.state.started_at,
            status: self.state.status,
            is_playing: self.state.is_playing,
            elapsed_seconds: elapsed.as_secs_f64(),
            current_interval_index: self.state.current_interval_index,
            current_topic: current.map(|interval| interval.topic),
            tangent_count: self.state.tangent_count,
            per_topic_seconds: self
                .state
                .per_topic
                .iter()
                .map(|(topic, total)| (*topic, total.as_secs_f64()))
                .collect(),
            seconds_since_transition: current
                .map(|_| elapsed.saturating_sub(self.state.last_transition_at).as_secs_f64())
                .unwrap_or(0.0),
            remaining_seconds: current
                .map(|interval| interval.remaining_at(elapsed).as_secs_f64())
                .unwrap_or(0.0),
        }
    }

    /// Brings the state in line with the clock: closes every interval that has
    /// fully elapsed, then enters and animates the open one. Converges in one
    /// call no matter how far the clock jumped.
    fn settle(&mut self, sink: &mut dyn PresentationSink) {
        loop {
            let index = self.state.current_interval_index;
            let elapsed = self.elapsed();
            let Some(interval) = self.schedule.get(index).copied() else {
                self.finish();
                return;
            };

            if elapsed >= interval.end {
                if self.state.entered != Some(index) && index >= self.state.closed_through {
                    log_debug!(
                        "session {}: interval {} elapsed while away, skipping",
                        self.session_id,
                        index
                    );
                    self.reveal_connector(index, sink);
                    sink.emit(TimelineEvent::IntervalSkipped {
                        topic: interval.topic,
                        interval_index: index,
                    });
                }
                self.count_through(index, sink);
                self.close_through(index, sink);

                match self.schedule.get(index + 1) {
                    None => {
                        self.state.current_interval_index = index + 1;
                        self.finish();
                        return;
                    }
                    // Gap before the next interval: hold on the closed one.
                    Some(next) if elapsed < next.start => return,
                    Some(_) => {
                        self.state.current_interval_index = index + 1;
                        self.state.animating = false;
                        continue;
                    }
                }
            }

            // A schedule may open after zero; nothing is active yet.
            if elapsed < interval.start {
                return;
            }

            if self.state.entered != Some(index) {
                self.enter(index, interval, sink);
            }
            if !self.state.animating {
                self.animate(index, interval, elapsed, sink);
            }
            return;
        }
    }

    fn enter(&mut self, index: usize, interval: TopicInterval, sink: &mut dyn PresentationSink) {
        self.count_through(index, sink);
        if index > 0 {
            self.close_through(index - 1, sink);
        }

        if !self.state.per_topic.contains_key(&interval.topic) {
            self.state.per_topic.insert(interval.topic, Duration::ZERO);
            if self.capabilities.bar_chart {
                sink.emit(TimelineEvent::TopicDurationUpdated {
                    topic: interval.topic,
                    total_seconds: 0.0,
                });
            }
        }

        self.reveal_connector(index, sink);
        self.state.entered = Some(index);
        self.state.last_transition_at = self.elapsed();

        log_info!(
            "session {}: interval {} -> {} (tangents: {})",
            self.session_id,
            index,
            self.schedule.topic_name(interval.topic).unwrap_or("?"),
            self.state.tangent_count
        );
        sink.emit(TimelineEvent::TopicEntered {
            topic: interval.topic,
            interval_index: index,
            start_seconds: interval.start.as_secs_f64(),
        });
    }

    fn animate(
        &mut self,
        index: usize,
        interval: TopicInterval,
        elapsed: Duration,
        sink: &mut dyn PresentationSink,
    ) {
        let from = elapsed.max(interval.start);
        sink.emit(TimelineEvent::AnimateTo {
            topic: interval.topic,
            interval_index: index,
            from_seconds: from.as_secs_f64(),
            target_seconds: interval.end.as_secs_f64(),
            duration_seconds: interval.remaining_at(from).as_secs_f64(),
        });
        self.state.animating = true;
    }

    fn reveal_connector(&self, index: usize, sink: &mut dyn PresentationSink) {
        if index > 0 {
            sink.emit(TimelineEvent::ConnectorRevealed {
                from_interval: index - 1,
                to_interval: index,
            });
        }
    }

    /// Adds every interval up to and including `index` to the tally, each
    /// exactly once.
    fn count_through(&mut self, index: usize, sink: &mut dyn PresentationSink) {
        if index < self.state.counted_through {
            return;
        }
        let added = (index + 1 - self.state.counted_through) as i64;
        self.state.tangent_count += added;
        self.state.counted_through = index + 1;

        let count = self.state.tangent_count;
        sink.emit(TimelineEvent::TangentCountChanged {
            count,
            emphasize: self.capabilities.tangent_pop && count >= 1,
        });
    }

    /// Adds the full duration of every interval up to and including `index`
    /// to its topic's total, each exactly once.
    fn close_through(&mut self, index: usize, sink: &mut dyn PresentationSink) {
        while self.state.closed_through <= index {
            let Some(interval) = self.schedule.get(self.state.closed_through).copied() else {
                return;
            };
            let total = self
                .state
                .per_topic
                .entry(interval.topic)
                .or_insert(Duration::ZERO);
            *total += interval.duration();
            let total_seconds = total.as_secs_f64();
            self.state.closed_through += 1;

            if self.capabilities.bar_chart {
                sink.emit(TimelineEvent::TopicDurationUpdated {
                    topic: interval.topic,
                    total_seconds,
                });
            }
        }
    }

    fn finish(&mut self) {
        if self.state.status == PlaybackStatus::Complete {
            return;
        }
        self.clock.stop();
        self.state.status = PlaybackStatus::Complete;
        self.state.is_playing = false;
        self.state.animating = false;
        self.state.current_interval_index = self.schedule.len();
        log_info!(
            "session {}: complete at {:.1}s with {} tangents",
            self.session_id,
            self.elapsed().as_secs_f64(),
            self.state.tangent_count
        );
    }
}
