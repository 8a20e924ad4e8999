//! Strategy interface, callback channel and capability-based selection.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::canvas::{CanvasStreamStrategy, DEFAULT_CANVAS_SIZE};
use super::detached::{DetachedWindowStrategy, NOMINAL_WINDOW_SIZE};
use super::platform::{Capabilities, Platform};
use crate::clock::Snapshot;
use crate::error::PlatformError;
use crate::render::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    DetachedWindow,
    CanvasStream,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::DetachedWindow => f.write_str("detached-window"),
            StrategyKind::CanvasStream => f.write_str("canvas-stream"),
        }
    }
}

/// First match wins: detached window, then floating video, else nothing.
pub fn select_strategy(capabilities: Capabilities) -> Option<StrategyKind> {
    if capabilities.detached_window {
        Some(StrategyKind::DetachedWindow)
    } else if capabilities.floating_video {
        Some(StrategyKind::CanvasStream)
    } else {
        None
    }
}

/// What the external surface can tell its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipEvent {
    Toggle,
    Reset,
    Closed,
}

/// `{on_toggle, on_reset, on_close}` as a message sender. Holds no
/// reference to timer state.
#[derive(Debug, Clone)]
pub struct PipCallbacks {
    tx: UnboundedSender<PipEvent>,
}

impl PipCallbacks {
    pub fn new(tx: UnboundedSender<PipEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, UnboundedReceiver<PipEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn on_toggle(&self) {
        self.send(PipEvent::Toggle);
    }

    pub fn on_reset(&self) {
        self.send(PipEvent::Reset);
    }

    pub fn on_close(&self) {
        self.send(PipEvent::Closed);
    }

    fn send(&self, event: PipEvent) {
        // Receiver gone means the owner is shutting down.
        let _ = self.tx.send(event);
    }
}

/// Common contract of both out-of-window strategies.
#[allow(async_fn_in_trait)]
pub trait PipStrategy {
    fn kind(&self) -> StrategyKind;

    fn is_active(&self) -> bool;

    async fn open(&mut self, initial: &Snapshot, callbacks: PipCallbacks)
        -> Result<(), PlatformError>;

    /// No-op unless open.
    fn update(&mut self, snapshot: &Snapshot);

    /// Idempotent. Never invokes `on_close`.
    fn close(&mut self);

    /// Drain pending platform events.
    fn pump(&mut self);

    /// Host animation-frame callback, in milliseconds.
    fn animation_frame(&mut self, _timestamp_ms: f64) {}
}

/// Sizes each strategy starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSizes {
    /// Nominal detached-window request.
    pub window: Size,
    /// Initial offscreen canvas.
    pub canvas: Size,
}

impl Default for SurfaceSizes {
    fn default() -> Self {
        Self {
            window: NOMINAL_WINDOW_SIZE,
            canvas: DEFAULT_CANVAS_SIZE,
        }
    }
}

/// The closed set of strategies.
pub enum Strategy<P: Platform> {
    Detached(DetachedWindowStrategy<P>),
    Canvas(CanvasStreamStrategy<P>),
}

impl<P: Platform> Strategy<P> {
    pub fn new(kind: StrategyKind, platform: Rc<P>) -> Self {
        Self::sized(kind, platform, SurfaceSizes::default())
    }

    pub fn sized(kind: StrategyKind, platform: Rc<P>, sizes: SurfaceSizes) -> Self {
        match kind {
            StrategyKind::DetachedWindow => Strategy::Detached(
                DetachedWindowStrategy::with_nominal_size(platform, sizes.window),
            ),
            StrategyKind::CanvasStream => {
                Strategy::Canvas(CanvasStreamStrategy::with_canvas_size(platform, sizes.canvas))
            }
        }
    }
}

impl<P: Platform> PipStrategy for Strategy<P> {
    fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Detached(s) => s.kind(),
            Strategy::Canvas(s) => s.kind(),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Strategy::Detached(s) => s.is_active(),
            Strategy::Canvas(s) => s.is_active(),
        }
    }

    async fn open(
        &mut self,
        initial: &Snapshot,
        callbacks: PipCallbacks,
    ) -> Result<(), PlatformError> {
        match self {
            Strategy::Detached(s) => s.open(initial, callbacks).await,
            Strategy::Canvas(s) => s.open(initial, callbacks).await,
        }
    }

    fn update(&mut self, snapshot: &Snapshot) {
        match self {
            Strategy::Detached(s) => s.update(snapshot),
            Strategy::Canvas(s) => s.update(snapshot),
        }
    }

    fn close(&mut self) {
        match self {
            Strategy::Detached(s) => s.close(),
            Strategy::Canvas(s) => s.close(),
        }
    }

    fn pump(&mut self) {
        match self {
            Strategy::Detached(s) => s.pump(),
            Strategy::Canvas(s) => s.pump(),
        }
    }

    fn animation_frame(&mut self, timestamp_ms: f64) {
        match self {
            Strategy::Detached(s) => s.animation_frame(timestamp_ms),
            Strategy::Canvas(s) => s.animation_frame(timestamp_ms),
        }
    }
}
