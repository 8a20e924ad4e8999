//! Widget controller: owns the timer and drives everything else.
//!
//! The controller is the only writer of [`TimerState`](crate::clock::TimerState).
//! The out-of-window surface gets read-only snapshots and talks back
//! through [`PipEvent`] messages on the controller's channel.
//!
//! While the countdown runs the controller also holds the host's screen
//! wake lock, if there is one.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::{Clock, ClockEngine, Snapshot, SystemClock, TimerStatus};
use crate::config::MAX_TICK_INTERVAL_MS;
use crate::duration::{DurationAnswer, DurationParser};
use crate::error::{PipError, PlatformError};
use crate::events::{CloseReason, Event};
use crate::pip::{PipCallbacks, PipCoordinator, PipEvent, PipToggle, Platform, ScreenWakeLock};

/// Host animation-frame cadence while the loop runs.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Result of [`WidgetController::set_from_external_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The timer now holds this many seconds, idle.
    Applied(u32),
    /// Nothing usable came back. The timer is unchanged.
    CouldNotInterpret,
}

pub struct WidgetController<P: Platform, D: DurationParser, C: Clock = SystemClock> {
    engine: ClockEngine<C>,
    pip: PipCoordinator<P>,
    parser: D,
    pip_tx: UnboundedSender<PipEvent>,
    pip_rx: UnboundedReceiver<PipEvent>,
    snapshots: watch::Sender<Snapshot>,
    event_sink: Option<UnboundedSender<Event>>,
    tick_interval: Duration,
    wake_lock: Option<P::WakeLock>,
    /// Status the wake lock was last brought in line with.
    lock_synced: Option<TimerStatus>,
}

impl<P: Platform, D: DurationParser, C: Clock> WidgetController<P, D, C> {
    pub fn new(engine: ClockEngine<C>, pip: PipCoordinator<P>, parser: D) -> Self {
        let (pip_tx, pip_rx) = mpsc::unbounded_channel();
        let (snapshots, _) = watch::channel(engine.snapshot());
        let wake_lock = pip.platform().wake_lock();
        if wake_lock.is_none() {
            debug!("no screen wake lock on this platform");
        }
        Self {
            engine,
            pip,
            parser,
            pip_tx,
            pip_rx,
            snapshots,
            event_sink: None,
            tick_interval: Duration::from_millis(MAX_TICK_INTERVAL_MS),
            wake_lock,
            lock_synced: None,
        }
    }

    /// Sampling interval, clamped to 1..=100 ms.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval =
            interval.clamp(Duration::from_millis(1), Duration::from_millis(MAX_TICK_INTERVAL_MS));
        self
    }

    /// Every event the controller produces is also sent here.
    pub fn with_event_sink(mut self, sink: UnboundedSender<Event>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn engine(&self) -> &ClockEngine<C> {
        &self.engine
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    /// Observe snapshots as they change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn pip(&self) -> &PipCoordinator<P> {
        &self.pip
    }

    pub fn pip_active(&self) -> bool {
        self.pip.is_active()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock.as_ref().is_some_and(|lock| lock.is_held())
    }

    // ── Timer operations ─────────────────────────────────────────────

    /// Start/pause.
    pub fn toggle(&mut self) -> Option<Event> {
        let event = self.engine.toggle();
        self.after_change(event)
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = self.engine.reset();
        self.after_change(event)
    }

    /// Rewrite total and remaining time, whatever the current status.
    pub fn set_duration(&mut self, total_seconds: u32) -> Option<Event> {
        let event = self.engine.set_duration(total_seconds);
        self.after_change(event)
    }

    /// Open the inline editor. A running countdown pauses; an idle one
    /// stays idle. Returns the whole minutes to prefill, taken from the
    /// magnitude of the remaining time.
    pub fn begin_edit(&mut self) -> u32 {
        if self.engine.status() == TimerStatus::Running {
            let event = self.engine.pause();
            self.after_change(event);
        }
        let minutes = self.engine.remaining_seconds().unsigned_abs() / 60;
        u32::try_from(minutes).unwrap_or(u32::MAX)
    }

    /// Inline editor input: whole minutes.
    pub fn edit_minutes(&mut self, minutes: u32) -> Option<Event> {
        self.set_duration(minutes.saturating_mul(60))
    }

    /// Ask the duration service and apply a positive answer. The timer is
    /// left idle so the user starts it.
    pub async fn set_from_external_query(&mut self, text: &str) -> QueryOutcome {
        let answer = match self.parser.parse_duration(text).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "duration service failed");
                return QueryOutcome::CouldNotInterpret;
            }
        };
        match answer {
            DurationAnswer::Seconds(seconds) => {
                info!(seconds, "applying duration from query");
                self.set_duration(seconds);
                if self.engine.status() != TimerStatus::Idle {
                    self.reset();
                }
                QueryOutcome::Applied(seconds)
            }
            DurationAnswer::NotUnderstood => {
                debug!(query = text, "duration service did not understand query");
                QueryOutcome::CouldNotInterpret
            }
        }
    }

    /// One sampling tick: advance the clock, mirror it outward, then
    /// handle whatever the external surface reported.
    pub fn tick(&mut self) {
        let event = self.engine.tick();
        self.after_change(event);
        if let Some(session) = self.pip.pump() {
            self.emit(Some(Event::PipClosed {
                session_id: session.id,
                reason: CloseReason::Dismissed,
                at: self.engine.now(),
            }));
        }
        self.drain_pip_events();
    }

    pub fn animation_frame(&mut self, timestamp_ms: f64) {
        self.pip.animation_frame(timestamp_ms);
    }

    /// The host page became visible or hidden. Hosts drop the wake lock
    /// on hide, so it is requested again on show while running.
    pub fn visibility_changed(&mut self, visible: bool) {
        if visible && self.engine.status() == TimerStatus::Running {
            self.acquire_wake_lock();
        }
    }

    // ── Out-of-window surface ────────────────────────────────────────

    /// Open or close the external surface.
    pub async fn toggle_pip(&mut self) -> Result<PipToggle, PipError> {
        let callbacks = PipCallbacks::new(self.pip_tx.clone());
        let snapshot = self.engine.snapshot();
        let outcome = self
            .pip
            .toggle(&snapshot, callbacks, self.engine.now())
            .await?;
        let event = match &outcome {
            PipToggle::Opened(session) => Event::PipOpened {
                session_id: session.id,
                strategy: session.strategy,
                at: session.opened_at,
            },
            PipToggle::Closed(session) => Event::PipClosed {
                session_id: session.id,
                reason: CloseReason::Toggled,
                at: self.engine.now(),
            },
        };
        self.emit(Some(event));
        Ok(outcome)
    }

    /// Tear the surface down without a close notification.
    pub fn close_pip(&mut self) {
        if let Some(session) = self.pip.close() {
            self.emit(Some(Event::PipClosed {
                session_id: session.id,
                reason: CloseReason::Shutdown,
                at: self.engine.now(),
            }));
        }
    }

    pub fn handle_pip_event(&mut self, event: PipEvent) {
        debug!(?event, "external surface event");
        match event {
            PipEvent::Toggle => {
                self.toggle();
            }
            PipEvent::Reset => {
                self.reset();
            }
            // Already reaped by the coordinator.
            PipEvent::Closed => {}
        }
    }

    /// Apply every queued external-surface event.
    pub fn drain_pip_events(&mut self) {
        while let Ok(event) = self.pip_rx.try_recv() {
            self.handle_pip_event(event);
        }
    }

    /// Drive ticks and animation frames until `shutdown` resolves, then
    /// close the external surface. The first event emitted is a
    /// [`Event::StateSnapshot`] of where the timer stands.
    pub async fn run<F: Future<Output = ()>>(&mut self, shutdown: F) {
        let mut ticks = tokio::time::interval(self.tick_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let started = Instant::now();
        tokio::pin!(shutdown);

        info!(tick_ms = self.tick_interval.as_millis() as u64, "timer loop started");
        self.emit(Some(self.engine.snapshot_event()));
        self.sync_wake_lock();
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticks.tick() => self.tick(),
                _ = frames.tick() => {
                    self.animation_frame(started.elapsed().as_secs_f64() * 1000.0);
                }
                Some(event) = self.pip_rx.recv() => self.handle_pip_event(event),
            }
        }
        self.close_pip();
        self.release_wake_lock();
        self.lock_synced = None;
        info!("timer loop stopped");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn after_change(&mut self, event: Option<Event>) -> Option<Event> {
        let snapshot = self.engine.snapshot();
        self.pip.update(&snapshot);
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        self.sync_wake_lock();
        self.emit(event.clone());
        event
    }

    fn sync_wake_lock(&mut self) {
        let status = self.engine.status();
        if self.lock_synced == Some(status) {
            return;
        }
        self.lock_synced = Some(status);
        if status == TimerStatus::Running {
            self.acquire_wake_lock();
        } else {
            self.release_wake_lock();
        }
    }

    fn acquire_wake_lock(&mut self) {
        let Some(lock) = self.wake_lock.as_mut() else {
            return;
        };
        if lock.is_held() {
            return;
        }
        match lock.acquire() {
            Ok(()) => debug!("screen wake lock acquired"),
            Err(PlatformError::Denied(reason)) => debug!(%reason, "screen wake lock denied"),
            Err(e) => warn!(error = %e, "screen wake lock request failed"),
        }
    }

    fn release_wake_lock(&mut self) {
        if let Some(lock) = self.wake_lock.as_mut().filter(|lock| lock.is_held()) {
            lock.release();
            debug!("screen wake lock released");
        }
    }

    fn emit(&self, event: Option<Event>) {
        let Some(event) = event else {
            return;
        };
        debug!(?event, "timer event");
        if let Some(sink) = &self.event_sink {
            let _ = sink.send(event);
        }
    }
}
