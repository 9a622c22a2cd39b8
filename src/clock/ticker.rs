use std::{future::Future, ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

// Set to true to log ticker lifecycle
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Owns at most one periodic tick task.
///
/// `start` while a task is alive is a no-op, so a repeated play can never
/// leave two tick sources feeding the same clock.
pub struct Ticker {
    period: Duration,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Spawns the tick task. The first tick fires one period from now. The
    /// task ends when `on_tick` breaks or `stop` is called. Returns `false`
    /// when a task was already running.
    pub fn start<F, Fut>(&mut self, mut on_tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        if self.is_running() {
            return false;
        }
        self.stop();

        let period = self.period;
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            // A late ticker catches up instead of silently losing steps.
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        log_debug!("ticker cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        if on_tick().await.is_break() {
                            log_debug!("ticker finished");
                            break;
                        }
                    }
                }
            }
        });

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        true
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
