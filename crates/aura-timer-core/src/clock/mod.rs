mod engine;
mod source;
mod state;

pub use engine::ClockEngine;
pub use source::{Clock, ManualClock, SystemClock};
pub use state::{
    format_total_time, DisplayState, Snapshot, TimeString, TimerState, TimerStatus,
    WARNING_THRESHOLD_SECS,
};
