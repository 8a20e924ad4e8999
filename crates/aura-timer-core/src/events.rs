use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Snapshot, TimerStatus};
use crate::pip::StrategyKind;

/// Every state change in the timer or the out-of-window session produces
/// an Event. The CLI prints them; the controller logs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        remaining_seconds: i64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_seconds: i64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_seconds: i64,
        at: DateTime<Utc>,
    },
    TimerReset {
        total_seconds: u32,
        at: DateTime<Utc>,
    },
    /// Total and remaining time were rewritten (edit or external query).
    DurationSet {
        total_seconds: u32,
        status: TimerStatus,
        at: DateTime<Utc>,
    },
    /// First tick at which the running countdown went negative.
    OvertimeEntered {
        at: DateTime<Utc>,
    },
    PipOpened {
        session_id: Uuid,
        strategy: StrategyKind,
        at: DateTime<Utc>,
    },
    PipClosed {
        session_id: Uuid,
        reason: CloseReason,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        snapshot: Snapshot,
        at: DateTime<Utc>,
    },
}

/// Why an out-of-window session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Toggled off by the user from the main widget.
    Toggled,
    /// Dismissed directly on the external surface.
    Dismissed,
    /// Torn down on shutdown.
    Shutdown,
}

/// Converts epoch milliseconds to a UTC timestamp, clamping out-of-range values to the epoch.
pub(crate) fn timestamp(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_snake_case() {
        let event = Event::TimerPaused {
            remaining_seconds: 42,
            at: timestamp(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "timer_paused");
        assert_eq!(json["remaining_seconds"], 42);
    }

    #[test]
    fn timestamp_converts_millis() {
        assert_eq!(timestamp(1_500).timestamp_millis(), 1_500);
    }
}
