//! Clock engine implementation.
//!
//! The clock engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^________|__________|   (reset)
//! ```
//!
//! There is no terminal state: a running countdown passes zero and keeps
//! going into overtime until it is paused or reset.
//!
//! ## Drift
//!
//! Entering `Running` fixes an expiry instant (`now + remaining`). Every tick
//! recomputes `remaining` from that instant, so late or skipped ticks never
//! accumulate error. Leaving `Running` drops the instant; the next start
//! re-arms it from the value on display.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = ClockEngine::new(SystemClock, 15 * 60);
//! engine.start();
//! // Every <= 100 ms:
//! engine.tick();
//! ```

use super::source::{Clock, SystemClock};
use super::state::{DisplayState, Snapshot, TimerState, TimerStatus};
use crate::events::{timestamp, Event};

/// Core clock engine.
///
/// Operates on wall-clock deltas -- no internal thread.
#[derive(Debug, Clone)]
pub struct ClockEngine<C: Clock = SystemClock> {
    clock: C,
    state: TimerState,
}

impl ClockEngine<SystemClock> {
    pub fn with_system_clock(total_seconds: u32) -> Self {
        Self::new(SystemClock, total_seconds)
    }
}

impl<C: Clock> ClockEngine<C> {
    /// Create an idle engine with `total_seconds` on the clock.
    pub fn new(clock: C, total_seconds: u32) -> Self {
        Self {
            clock,
            state: TimerState::new(total_seconds),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.state.remaining_seconds
    }

    pub fn total_seconds(&self) -> u32 {
        self.state.total_seconds
    }

    pub fn expiry_ms(&self) -> Option<i64> {
        self.state.expiry_ms
    }

    pub fn display(&self) -> DisplayState {
        self.state.display()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            snapshot: self.snapshot(),
            at: self.at(),
        }
    }

    /// Wall-clock time as this engine sees it.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.at()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.state.status {
            TimerStatus::Idle => {
                self.state.status = TimerStatus::Running;
                self.arm();
                Some(Event::TimerStarted {
                    remaining_seconds: self.state.remaining_seconds,
                    at: self.at(),
                })
            }
            TimerStatus::Paused => self.resume(),
            TimerStatus::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state.status != TimerStatus::Running {
            return None;
        }
        // Sample first so the paused value is exact.
        self.sample();
        self.state.status = TimerStatus::Paused;
        self.state.expiry_ms = None;
        Some(Event::TimerPaused {
            remaining_seconds: self.state.remaining_seconds,
            at: self.at(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.status != TimerStatus::Paused {
            return None;
        }
        self.state.status = TimerStatus::Running;
        self.arm();
        Some(Event::TimerResumed {
            remaining_seconds: self.state.remaining_seconds,
            at: self.at(),
        })
    }

    /// Start/pause in one control: pauses while running, otherwise starts or resumes.
    pub fn toggle(&mut self) -> Option<Event> {
        match self.state.status {
            TimerStatus::Running => self.pause(),
            TimerStatus::Idle | TimerStatus::Paused => self.start(),
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state.status = TimerStatus::Idle;
        self.state.remaining_seconds = i64::from(self.state.total_seconds);
        self.state.expiry_ms = None;
        Some(Event::TimerReset {
            total_seconds: self.state.total_seconds,
            at: self.at(),
        })
    }

    /// Rewrite total and remaining time, keeping the current status.
    ///
    /// A running countdown re-arms its expiry on the next tick.
    pub fn set_duration(&mut self, total_seconds: u32) -> Option<Event> {
        self.state.total_seconds = total_seconds;
        self.state.remaining_seconds = i64::from(total_seconds);
        self.state.expiry_ms = None;
        Some(Event::DurationSet {
            total_seconds,
            status: self.state.status,
            at: self.at(),
        })
    }

    /// Call periodically. Returns `Some(Event::OvertimeEntered)` on the tick
    /// where the countdown first goes negative.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state.status != TimerStatus::Running {
            return None;
        }
        if self.state.expiry_ms.is_none() {
            self.arm();
        }
        let before = self.state.remaining_seconds;
        self.sample();
        if before >= 0 && self.state.remaining_seconds < 0 {
            return Some(Event::OvertimeEntered { at: self.at() });
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self) {
        if self.state.expiry_ms.is_none() {
            let offset = self.state.remaining_seconds.saturating_mul(1000);
            self.state.expiry_ms = Some(self.clock.now_ms().saturating_add(offset));
        }
    }

    fn sample(&mut self) {
        if let Some(expiry) = self.state.expiry_ms {
            self.state.remaining_seconds = seconds_until(expiry, self.clock.now_ms());
        }
    }

    fn at(&self) -> chrono::DateTime<chrono::Utc> {
        timestamp(self.clock.now_ms())
    }
}

/// Whole seconds still owed before `expiry_ms`; zero at the expiry instant,
/// negative afterwards.
fn seconds_until(expiry_ms: i64, now_ms: i64) -> i64 {
    -now_ms.saturating_sub(expiry_ms).div_euclid(1000)
}
