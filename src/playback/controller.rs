use std::{ops::ControlFlow, sync::Arc};

use anyhow::{bail, Context, Result};
use tokio::sync::{watch, Mutex};

use crate::{
    audio::AudioTransport,
    clock::Ticker,
    sink::PresentationSink,
    timeline::{PlaybackSnapshot, PlaybackStatus, TimelineDriver},
};

// Set to true to log controller lifecycle
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Driver and sink share one lock so ticks, commands and renders are
/// serialized. `epoch` changes on every pause; a tick that wakes up under an
/// older epoch is stale and must not touch the driver.
struct Session<S> {
    driver: TimelineDriver,
    sink: S,
    epoch: u64,
    disposed: bool,
}

/// Runs a playback session: owns the tick task, keeps the audio transport
/// in step and publishes status changes.
pub struct PlaybackController<S: PresentationSink + Send + 'static> {
    session: Arc<Mutex<Session<S>>>,
    ticker: Arc<Mutex<Ticker>>,
    transport: Arc<dyn AudioTransport>,
    status_tx: Arc<watch::Sender<PlaybackStatus>>,
    heartbeat_every_ticks: u32,
}

impl<S: PresentationSink + Send + 'static> Clone for PlaybackController<S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            ticker: self.ticker.clone(),
            transport: self.transport.clone(),
            status_tx: self.status_tx.clone(),
            heartbeat_every_ticks: self.heartbeat_every_ticks,
        }
    }
}

impl<S: PresentationSink + Send + 'static> PlaybackController<S> {
    pub fn new(driver: TimelineDriver, sink: S, transport: Arc<dyn AudioTransport>) -> Self {
        let debug_mode = std::env::var("TANGENT_TALLY_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let tick_interval = driver.clock().step();
        let (status_tx, _) = watch::channel(driver.status());

        Self {
            session: Arc::new(Mutex::new(Session {
                driver,
                sink,
                epoch: 0,
                disposed: false,
            })),
            ticker: Arc::new(Mutex::new(Ticker::new(tick_interval))),
            transport,
            status_tx: Arc::new(status_tx),
            heartbeat_every_ticks: if debug_mode { 1 } else { 50 },
        }
    }

    /// Status updates, starting with the current status.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.status_tx.subscribe()
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.session.lock().await.driver.snapshot()
    }

    pub async fn play(&self) -> Result<PlaybackSnapshot> {
        let (started, snapshot) = {
            let mut guard = self.session.lock().await;
            if guard.disposed {
                bail!("playback session has been disposed");
            }
            if matches!(
                guard.driver.status(),
                PlaybackStatus::Playing | PlaybackStatus::Complete
            ) {
                return Ok(guard.driver.snapshot());
            }

            self.transport.play().context("failed to start audio")?;

            let Session { driver, sink, .. } = &mut *guard;
            let started = driver.play(sink);
            (started, driver.snapshot())
        };

        self.status_tx.send_replace(snapshot.status);
        if started && snapshot.status == PlaybackStatus::Playing {
            self.spawn_ticker().await;
        }
        Ok(snapshot)
    }

    pub async fn pause(&self) -> Result<PlaybackSnapshot> {
        let (paused, snapshot) = {
            let mut guard = self.session.lock().await;
            let Session {
                driver,
                sink,
                epoch,
                ..
            } = &mut *guard;
            let paused = driver.pause(sink);
            if paused {
                *epoch += 1;
            }
            (paused, driver.snapshot())
        };

        // Catching up on pause can also finish the timeline.
        if paused || snapshot.status == PlaybackStatus::Complete {
            self.cancel_ticker().await;
            self.status_tx.send_replace(snapshot.status);
        }
        if paused {
            self.transport.pause().context("failed to pause audio")?;
        }
        Ok(snapshot)
    }

    /// The play/pause button.
    pub async fn toggle(&self) -> Result<PlaybackSnapshot> {
        let playing = self.session.lock().await.driver.status() == PlaybackStatus::Playing;
        if playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Hiding the page pauses; showing it again does not resume.
    pub async fn on_visibility_change(&self, hidden: bool) -> Result<()> {
        if hidden {
            log_info!("page hidden, pausing");
            self.pause().await?;
        }
        Ok(())
    }

    pub async fn resize(&self, viewport_width: u16) {
        self.session.lock().await.sink.resize(viewport_width);
    }

    /// Runs `f` against the sink under the session lock.
    pub async fn with_sink<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.session.lock().await.sink)
    }

    /// Ends the session: freezes the sink, stops ticking and releases the
    /// audio output. Further `play` calls fail.
    pub async fn dispose(&self) -> Result<PlaybackSnapshot> {
        let snapshot = {
            let mut guard = self.session.lock().await;
            let Session {
                driver,
                sink,
                epoch,
                disposed,
            } = &mut *guard;
            driver.pause(sink);
            *epoch += 1;
            *disposed = true;
            driver.snapshot()
        };

        self.cancel_ticker().await;
        self.transport.stop().context("failed to stop audio")?;
        self.status_tx.send_replace(snapshot.status);
        log_info!("session {} disposed", snapshot.session_id);
        Ok(snapshot)
    }

    async fn spawn_ticker(&self) {
        let mut ticker = self.ticker.lock().await;
        let epoch = self.session.lock().await.epoch;

        let session = self.session.clone();
        let status_tx = self.status_tx.clone();
        let heartbeat_every = self.heartbeat_every_ticks;
        let mut ticks: u32 = 0;

        let spawned = ticker.start(move || {
            let session = session.clone();
            let status_tx = status_tx.clone();
            ticks = ticks.wrapping_add(1);
            let tick = ticks;

            async move {
                let mut guard = session.lock().await;
                if guard.epoch != epoch {
                    return ControlFlow::Break(());
                }
                let Session { driver, sink, .. } = &mut *guard;
                let status = driver.tick(sink);

                if tick % heartbeat_every == 0 {
                    log_debug!(
                        "heartbeat: {:.1}s, interval {}",
                        driver.elapsed().as_secs_f64(),
                        driver.state().current_interval_index
                    );
                }

                if status == PlaybackStatus::Complete {
                    log_info!("timeline complete, stopping ticker");
                    status_tx.send_replace(status);
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            }
        });

        if spawned {
            log_debug!("ticker started ({:?} period)", ticker.period());
        }
    }

    async fn cancel_ticker(&self) {
        self.ticker.lock().await.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::SilentTransport,
        clock::{ElapsedClock, DEFAULT_TICK},
        schedule::{IntervalSpec, Schedule, TopicId},
        sink::RecordingSink,
        timeline::Capabilities,
    };
    use std::time::Duration;
    use tokio::time;

    fn controller(
        specs: &[IntervalSpec],
    ) -> (PlaybackController<RecordingSink>, Arc<SilentTransport>) {
        let schedule = Schedule::new(vec!["A".into(), "B".into()], specs, None).unwrap();
        let driver = TimelineDriver::new(
            Arc::new(schedule),
            ElapsedClock::fixed_step(DEFAULT_TICK),
            Capabilities::default(),
        );
        let transport = Arc::new(SilentTransport::new());
        (
            PlaybackController::new(driver, RecordingSink::new(), transport.clone()),
            transport,
        )
    }

    fn two_topics() -> Vec<IntervalSpec> {
        vec![IntervalSpec::new(0.0, 0.3, 0), IntervalSpec::new(0.3, 1.0, 1)]
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_advance_the_timeline() {
        let (controller, transport) = controller(&two_topics());
        controller.play().await.unwrap();
        assert!(transport.is_playing());

        time::sleep(Duration::from_millis(650)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.current_interval_index, 1);
        assert_eq!(snapshot.current_topic, Some(TopicId(1)));
        assert_eq!(snapshot.tangent_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_time_until_resumed() {
        let (controller, transport) = controller(&two_topics());
        controller.play().await.unwrap();
        time::sleep(Duration::from_millis(250)).await;
        let paused = controller.pause().await.unwrap();
        assert!(!transport.is_playing());

        time::sleep(Duration::from_secs(5)).await;
        let later = controller.snapshot().await;
        assert_eq!(later.elapsed_seconds, paused.elapsed_seconds);
        assert_eq!(later.status, PlaybackStatus::Paused);

        controller.play().await.unwrap();
        time::sleep(Duration::from_millis(250)).await;
        assert_eq!(controller.snapshot().await.current_interval_index, 1);
        controller
            .with_sink(|sink| assert_eq!(sink.entered(), vec![0, 1]))
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_toggling_never_doubles_the_tick_rate() {
        let (controller, _) = controller(&[IntervalSpec::new(0.0, 100.0, 0)]);
        for _ in 0..5 {
            controller.toggle().await.unwrap();
            controller.toggle().await.unwrap();
        }
        controller.play().await.unwrap();
        controller.play().await.unwrap();

        time::sleep(Duration::from_millis(1050)).await;
        let snapshot = controller.snapshot().await;
        assert!((snapshot.elapsed_seconds - 1.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_is_published() {
        let (controller, _) = controller(&two_topics());
        let mut status = controller.subscribe();
        controller.play().await.unwrap();

        time::timeout(Duration::from_secs(5), async {
            while *status.borrow_and_update() != PlaybackStatus::Complete {
                status.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.current_interval_index, 2);
        let total: f64 = snapshot.per_topic_seconds.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn hiding_pauses_and_showing_does_not_resume() {
        let (controller, _) = controller(&two_topics());
        controller.play().await.unwrap();
        controller.on_visibility_change(true).await.unwrap();
        controller.on_visibility_change(false).await.unwrap();
        assert_eq!(controller.snapshot().await.status, PlaybackStatus::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn disposed_session_refuses_to_play() {
        let (controller, transport) = controller(&two_topics());
        controller.play().await.unwrap();
        controller.dispose().await.unwrap();
        assert!(!transport.is_playing());
        assert!(controller.play().await.is_err());
    }

    struct UnpausableTransport;

    impl AudioTransport for UnpausableTransport {
        fn play(&self) -> Result<()> {
            Ok(())
        }

        fn pause(&self) -> Result<()> {
            bail!("output device went away")
        }

        fn stop(&self) -> Result<()> {
            Ok(())
        }

        fn is_playing(&self) -> bool {
            true
        }
    }

    #[tokio::test(start_paused = true)]
    async fn audio_failure_on_pause_still_publishes_paused() {
        let schedule = Schedule::new(vec!["A".into()], &[IntervalSpec::new(0.0, 5.0, 0)], None)
            .unwrap();
        let driver = TimelineDriver::new(
            Arc::new(schedule),
            ElapsedClock::fixed_step(DEFAULT_TICK),
            Capabilities::default(),
        );
        let controller =
            PlaybackController::new(driver, RecordingSink::new(), Arc::new(UnpausableTransport));
        let status = controller.subscribe();

        controller.play().await.unwrap();
        assert!(controller.pause().await.is_err());
        assert_eq!(*status.borrow(), PlaybackStatus::Paused);

        let elapsed = controller.snapshot().await.elapsed_seconds;
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(controller.snapshot().await.elapsed_seconds, elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn resize_reaches_the_sink() {
        let (controller, _) = controller(&two_topics());
        controller.resize(132).await;
        let width = controller.with_sink(|sink| sink.viewport_width()).await;
        assert_eq!(width, Some(132));
    }
}
