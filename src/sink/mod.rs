pub mod json;
pub mod recording;
pub mod terminal;

pub use json::JsonLinesSink;
pub use recording::RecordingSink;
pub use terminal::TerminalSink;

use std::time::Duration;
use tokio::time::Instant;

use crate::timeline::TimelineEvent;

/// Consumer of driver events. Reads driver output; never writes driver state.
pub trait PresentationSink {
    fn emit(&mut self, event: TimelineEvent);

    /// New viewport width; derived geometry should be recomputed.
    fn resize(&mut self, _viewport_width: u16) {}
}

impl PresentationSink for Vec<TimelineEvent> {
    fn emit(&mut self, event: TimelineEvent) {
        self.push(event);
    }
}

impl<S: PresentationSink + ?Sized> PresentationSink for Box<S> {
    fn emit(&mut self, event: TimelineEvent) {
        (**self).emit(event);
    }

    fn resize(&mut self, viewport_width: u16) {
        (**self).resize(viewport_width);
    }
}

/// Linear interpolation of one value over real time, frozen on demand.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    target: f64,
    duration: Duration,
    started: Instant,
    frozen: Option<f64>,
}

impl Tween {
    pub fn new(from: f64, target: f64, duration: Duration) -> Self {
        Self {
            from,
            target,
            duration,
            started: Instant::now(),
            frozen: None,
        }
    }

    /// A tween that is already at rest on `value`.
    pub fn at_rest(value: f64) -> Self {
        Self {
            from: value,
            target: value,
            duration: Duration::ZERO,
            started: Instant::now(),
            frozen: Some(value),
        }
    }

    pub fn value(&self) -> f64 {
        if let Some(value) = self.frozen {
            return value;
        }
        if self.duration.is_zero() {
            return self.target;
        }
        let progress = (self.started.elapsed().as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        self.from + (self.target - self.from) * progress
    }

    /// Stops at a value supplied by the driver rather than jumping to the
    /// target.
    pub fn freeze_at(&mut self, value: f64) {
        self.frozen = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tween_interpolates_over_real_time() {
        let tween = Tween::new(0.0, 6.0, Duration::from_secs(6));
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!((tween.value() - 3.0).abs() < 1e-9);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(tween.value(), 6.0);
    }

    #[tokio::test(start_paused = true)]
    async fn frozen_tween_stays_put() {
        let mut tween = Tween::new(0.0, 10.0, Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(4)).await;
        tween.freeze_at(4.0);
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(tween.value(), 4.0);
    }

    #[test]
    fn boxed_sinks_forward() {
        let mut sink: Box<dyn PresentationSink> = Box::new(RecordingSink::new());
        sink.emit(TimelineEvent::Freeze { at_seconds: 1.0 });
        sink.resize(120);
    }
}
