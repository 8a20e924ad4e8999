//! # Aura Timer Core Library
//!
//! This library provides the core logic for Aura Timer, a floating
//! countdown that keeps counting into overtime and can mirror itself into
//! an always-on-top surface outside the main window.
//!
//! ## Architecture
//!
//! - **Clock Engine**: A wall-clock-based state machine; the caller invokes
//!   `tick()` at least every 100 ms and the engine recomputes the remaining
//!   time from a fixed expiry instant
//! - **Frame Renderer**: Paints a snapshot onto any 2D drawing surface
//! - **Picture-in-picture**: Two out-of-window strategies behind one
//!   interface, picked at activation time by a coordinator that also keeps
//!   the host awake with silent audio
//! - **Widget Controller**: Owns the timer and the tick loop
//!
//! ## Key Components
//!
//! - [`ClockEngine`]: Core timer state machine
//! - [`render_frame`]: Frame renderer
//! - [`PipCoordinator`]: Out-of-window session owner
//! - [`WidgetController`]: Composition root
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod events;
pub mod pip;
pub mod render;
pub mod widget;

pub use clock::{ClockEngine, Clock, ManualClock, Snapshot, SystemClock, TimerState, TimerStatus};
pub use config::Config;
pub use duration::{DurationAnswer, DurationParser, HttpDurationParser};
pub use error::{ConfigError, CoreError, DurationServiceError, PipError, PlatformError};
pub use events::{CloseReason, Event};
pub use pip::{Capabilities, HeadlessPlatform, PipCoordinator, PipToggle, Platform, StrategyKind};
pub use render::{render_frame, RecordingSurface, Size};
pub use widget::{QueryOutcome, WidgetController};
