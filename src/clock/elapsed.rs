use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// How the clock turns ticks into elapsed playback time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClockMode {
    /// Every tick adds exactly one tick period, regardless of how late it ran.
    #[default]
    FixedStep,
    /// Every tick re-reads a monotonic anchor, so throttled or late ticks
    /// still land on the true elapsed time.
    WallClock,
}

/// Elapsed playback time that only moves while running.
///
/// In wall-clock mode `baseline` holds time accumulated in earlier running
/// windows and combines with `running_anchor` to produce the current value.
#[derive(Debug, Clone)]
pub struct ElapsedClock {
    mode: ClockMode,
    step: Duration,
    elapsed: Duration,
    baseline: Duration,
    running_anchor: Option<Instant>,
    running: bool,
}

impl ElapsedClock {
    pub fn new(mode: ClockMode, step: Duration) -> Self {
        Self {
            mode,
            step,
            elapsed: Duration::ZERO,
            baseline: Duration::ZERO,
            running_anchor: None,
            running: false,
        }
    }

    pub fn fixed_step(step: Duration) -> Self {
        Self::new(ClockMode::FixedStep, step)
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Elapsed time as of the last tick, start or stop.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        if self.mode == ClockMode::WallClock {
            self.baseline = self.elapsed;
            self.running_anchor = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.sync_from_anchor();
        self.running = false;
        self.running_anchor = None;
        self.baseline = self.elapsed;
    }

    /// Back to zero. Only meaningful at session start.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.baseline = Duration::ZERO;
        if self.running && self.mode == ClockMode::WallClock {
            self.running_anchor = Some(Instant::now());
        }
    }

    /// One tick of the ticker. Returns the new elapsed value; a stopped clock
    /// does not move.
    pub fn tick(&mut self) -> Duration {
        if self.running {
            match self.mode {
                ClockMode::FixedStep => self.elapsed = self.elapsed.saturating_add(self.step),
                ClockMode::WallClock => self.sync_from_anchor(),
            }
        }
        self.elapsed
    }

    /// Brings a wall-clock reading up to date without counting a tick. A
    /// fixed-step clock only moves on ticks, so this leaves it alone.
    pub fn sync(&mut self) -> Duration {
        self.sync_from_anchor();
        self.elapsed
    }

    /// Jumps forward by `by` while running, e.g. to catch up after the host
    /// was suspended.
    pub fn advance(&mut self, by: Duration) -> Duration {
        if self.running {
            self.baseline = self.baseline.saturating_add(by);
            self.elapsed = self.elapsed.saturating_add(by);
        }
        self.elapsed
    }

    fn sync_from_anchor(&mut self) {
        if let (true, Some(anchor)) = (self.running, self.running_anchor) {
            self.elapsed = self.baseline.saturating_add(anchor.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(100);

    #[test]
    fn fixed_step_adds_one_period_per_tick() {
        let mut clock = ElapsedClock::fixed_step(STEP);
        clock.start();
        for _ in 0..60 {
            clock.tick();
        }
        assert_eq!(clock.elapsed(), Duration::from_secs(6));
    }

    #[test]
    fn stopped_clock_ignores_ticks_and_keeps_value() {
        let mut clock = ElapsedClock::fixed_step(STEP);
        clock.tick();
        assert_eq!(clock.elapsed(), Duration::ZERO);

        clock.start();
        clock.tick();
        clock.stop();
        clock.tick();
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.elapsed(), STEP);
    }

    #[test]
    fn start_is_idempotent() {
        let mut clock = ElapsedClock::fixed_step(STEP);
        clock.start();
        clock.start();
        clock.tick();
        assert_eq!(clock.elapsed(), STEP);
    }

    #[test]
    fn reset_zeroes_elapsed() {
        let mut clock = ElapsedClock::fixed_step(STEP);
        clock.start();
        clock.advance(Duration::from_secs(3));
        clock.reset();
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn wall_clock_follows_the_anchor_across_pauses() {
        let mut clock = ElapsedClock::new(ClockMode::WallClock, STEP);
        clock.start();
        tokio::time::advance(Duration::from_millis(750)).await;
        assert_eq!(clock.tick(), Duration::from_millis(750));

        clock.stop();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(clock.tick(), Duration::from_millis(750));

        clock.start();
        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(clock.tick(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn sync_catches_up_without_counting_a_tick() {
        let mut wall = ElapsedClock::new(ClockMode::WallClock, STEP);
        let mut fixed = ElapsedClock::fixed_step(STEP);
        wall.start();
        fixed.start();
        tokio::time::advance(Duration::from_secs(7)).await;

        assert_eq!(wall.sync(), Duration::from_secs(7));
        assert_eq!(fixed.sync(), Duration::ZERO);
    }
}
