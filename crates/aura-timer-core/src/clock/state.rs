//! Timer state, derived display state and the read-only snapshot handed
//! to out-of-window consumers.

use serde::{Deserialize, Serialize};

/// Remaining-time threshold (inclusive) under which a running timer warns.
pub const WARNING_THRESHOLD_SECS: i64 = 300;

const SECS_PER_HOUR: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

impl std::fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        };
        f.write_str(s)
    }
}

/// The single source of truth for the countdown.
///
/// `remaining_seconds` goes negative in overtime and has no floor.
/// `expiry_ms` is only ever set while `status == Running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub total_seconds: u32,
    pub remaining_seconds: i64,
    pub status: TimerStatus,
    /// Epoch milliseconds at which `remaining_seconds` reaches zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_ms: Option<i64>,
}

impl TimerState {
    pub fn new(total_seconds: u32) -> Self {
        Self {
            total_seconds,
            remaining_seconds: i64::from(total_seconds),
            status: TimerStatus::Idle,
            expiry_ms: None,
        }
    }

    pub fn display(&self) -> DisplayState {
        DisplayState::derive(self.total_seconds, self.remaining_seconds, self.status)
    }

    pub fn snapshot(&self) -> Snapshot {
        let display = self.display();
        Snapshot {
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.total_seconds,
            status: self.status,
            time_string: display.time_string,
            is_overtime: display.is_overtime,
            is_warning: display.is_warning,
        }
    }
}

/// Zero-padded decomposition of `|remaining_seconds|`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeString {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl TimeString {
    pub fn from_seconds(remaining_seconds: i64) -> Self {
        let abs = remaining_seconds.unsigned_abs();
        Self {
            hours: format!("{:02}", abs / SECS_PER_HOUR),
            minutes: format!("{:02}", (abs % SECS_PER_HOUR) / 60),
            seconds: format!("{:02}", abs % 60),
        }
    }
}

/// Everything a renderer needs beyond the raw counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub is_overtime: bool,
    pub is_warning: bool,
    pub show_hours: bool,
    pub time_string: TimeString,
}

impl DisplayState {
    pub fn derive(total_seconds: u32, remaining_seconds: i64, status: TimerStatus) -> Self {
        let is_overtime = remaining_seconds < 0;
        let is_warning = !is_overtime
            && remaining_seconds <= WARNING_THRESHOLD_SECS
            && status == TimerStatus::Running;
        Self {
            is_overtime,
            is_warning,
            show_hours: show_hours(total_seconds, remaining_seconds),
            time_string: TimeString::from_seconds(remaining_seconds),
        }
    }
}

fn show_hours(total_seconds: u32, remaining_seconds: i64) -> bool {
    u64::from(total_seconds) >= SECS_PER_HOUR || remaining_seconds.unsigned_abs() >= SECS_PER_HOUR
}

/// Immutable copy of [`TimerState`] passed to non-owning consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(alias = "timeLeft")]
    pub remaining_seconds: i64,
    pub total_seconds: u32,
    pub status: TimerStatus,
    pub time_string: TimeString,
    pub is_overtime: bool,
    pub is_warning: bool,
}

impl Snapshot {
    pub fn show_hours(&self) -> bool {
        show_hours(self.total_seconds, self.remaining_seconds)
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Colons dim on odd seconds while running.
    pub fn colon_dimmed(&self) -> bool {
        self.is_running() && self.remaining_seconds.unsigned_abs() % 2 == 1
    }

    /// Text as drawn: optional sign, optional hours, minutes and seconds.
    pub fn clock_text(&self) -> String {
        let t = &self.time_string;
        let sign = if self.is_overtime { "-" } else { "" };
        if self.show_hours() {
            format!("{sign}{}:{}:{}", t.hours, t.minutes, t.seconds)
        } else {
            format!("{sign}{}:{}", t.minutes, t.seconds)
        }
    }
}

/// Long-form total duration: "15 min", "1 hr", "1 hr 30 min".
pub fn format_total_time(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    match (hours, minutes) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(remaining: i64) -> DisplayState {
        DisplayState::derive(900, remaining, TimerStatus::Running)
    }

    #[test]
    fn warning_boundary() {
        assert!(running(300).is_warning);
        assert!(running(0).is_warning);
        assert!(!running(301).is_warning);
        assert!(!running(-1).is_warning);
        assert!(running(-1).is_overtime);
        assert!(!DisplayState::derive(900, 120, TimerStatus::Paused).is_warning);
        assert!(!DisplayState::derive(900, 120, TimerStatus::Idle).is_warning);
    }

    #[test]
    fn time_string_uses_absolute_value() {
        let t = TimeString::from_seconds(-3725);
        assert_eq!((t.hours.as_str(), t.minutes.as_str(), t.seconds.as_str()), ("01", "02", "05"));
        let t = TimeString::from_seconds(59);
        assert_eq!((t.hours.as_str(), t.minutes.as_str(), t.seconds.as_str()), ("00", "00", "59"));
    }

    #[test]
    fn hours_shown_for_long_totals_or_long_overtime() {
        assert!(DisplayState::derive(3600, 10, TimerStatus::Idle).show_hours);
        assert!(DisplayState::derive(900, -3600, TimerStatus::Running).show_hours);
        assert!(!DisplayState::derive(900, -3599, TimerStatus::Running).show_hours);
    }

    #[test]
    fn clock_text_composition() {
        let mut state = TimerState::new(900);
        assert_eq!(state.snapshot().clock_text(), "15:00");
        state.remaining_seconds = -30;
        assert_eq!(state.snapshot().clock_text(), "-00:30");
        let state = TimerState::new(5025);
        assert_eq!(state.snapshot().clock_text(), "01:23:45");
    }

    #[test]
    fn colon_dims_only_on_odd_running_seconds() {
        let mut state = TimerState::new(901);
        assert!(!state.snapshot().colon_dimmed());
        state.status = TimerStatus::Running;
        assert!(state.snapshot().colon_dimmed());
        state.remaining_seconds = 900;
        assert!(!state.snapshot().colon_dimmed());
    }

    #[test]
    fn total_time_long_form() {
        assert_eq!(format_total_time(900), "15 min");
        assert_eq!(format_total_time(3600), "1 hr");
        assert_eq!(format_total_time(5400), "1 hr 30 min");
        assert_eq!(format_total_time(30), "0 min");
    }

    #[test]
    fn snapshot_serializes_in_wire_shape() {
        let snap = TimerState::new(900).snapshot();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["remainingSeconds"], 900);
        assert_eq!(json["totalSeconds"], 900);
        assert_eq!(json["status"], "IDLE");
        assert_eq!(json["timeString"]["minutes"], "15");
        assert_eq!(json["isOvertime"], false);

        let parsed: Snapshot = serde_json::from_str(
            r#"{"timeLeft":5,"totalSeconds":10,"status":"PAUSED",
                "timeString":{"hours":"00","minutes":"00","seconds":"05"},
                "isOvertime":false,"isWarning":false}"#,
        )
        .unwrap();
        assert_eq!(parsed.remaining_seconds, 5);
        assert_eq!(parsed.status, TimerStatus::Paused);
    }
}
