//! Canvas-stream strategy: draws the timer onto an offscreen surface,
//! captures it into a muted video and floats that video.
//!
//! The host's animation frames drive [`PipStrategy::animation_frame`];
//! the frame renderer runs at most [`CANVAS_FPS`] times per second.

use std::rc::Rc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use super::platform::{Control, FloatingVideo, Platform, SurfaceEvent};
use super::strategy::{PipCallbacks, PipStrategy, StrategyKind};
use crate::clock::Snapshot;
use crate::error::PlatformError;
use crate::render::{render_frame, DrawSurface, Size};

/// Redraw cap. A digit clock needs no more.
pub const CANVAS_FPS: u32 = 10;

pub const DEFAULT_CANVAS_SIZE: Size = Size::new(600, 340);

pub struct CanvasStreamStrategy<P: Platform> {
    platform: Rc<P>,
    initial_size: Size,
    surface: Option<P::Surface>,
    video: Option<P::Video>,
    events: Option<UnboundedReceiver<SurfaceEvent>>,
    callbacks: Option<PipCallbacks>,
    current: Option<Snapshot>,
    last_draw_ms: Option<f64>,
    frames_drawn: u64,
    active: bool,
}

impl<P: Platform> CanvasStreamStrategy<P> {
    pub fn new(platform: Rc<P>) -> Self {
        Self::with_canvas_size(platform, DEFAULT_CANVAS_SIZE)
    }

    pub fn with_canvas_size(platform: Rc<P>, initial_size: Size) -> Self {
        Self {
            platform,
            initial_size,
            surface: None,
            video: None,
            events: None,
            callbacks: None,
            current: None,
            last_draw_ms: None,
            frames_drawn: 0,
            active: false,
        }
    }

    pub fn frame_interval_ms() -> f64 {
        1000.0 / f64::from(CANVAS_FPS)
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn canvas_size(&self) -> Option<Size> {
        self.surface.as_ref().map(|s| s.size())
    }

    fn draw(&mut self) {
        let (Some(surface), Some(snapshot)) = (self.surface.as_mut(), self.current.as_ref()) else {
            return;
        };
        let size = surface.size();
        render_frame(surface, size, snapshot);
        if let Some(video) = self.video.as_mut() {
            video.present(surface);
        }
        self.frames_drawn += 1;
    }

    fn resize_to(&mut self, size: Size) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if surface.size() == size {
            return;
        }
        debug!(from = %surface.size(), to = %size, "resizing canvas");
        surface.resize(size);
        // Never show a stretched frame after a resize.
        self.draw();
    }

    /// Stop the loop and release the stream. Returns the callbacks only on
    /// the first call.
    fn cleanup(&mut self) -> Option<PipCallbacks> {
        if !self.active {
            return None;
        }
        self.active = false;
        if let Some(mut video) = self.video.take() {
            video.stop_tracks();
            video.exit();
        }
        self.surface = None;
        self.events = None;
        self.last_draw_ms = None;
        self.callbacks.take()
    }
}

impl<P: Platform> PipStrategy for CanvasStreamStrategy<P> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CanvasStream
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn open(
        &mut self,
        initial: &Snapshot,
        callbacks: PipCallbacks,
    ) -> Result<(), PlatformError> {
        self.callbacks = Some(callbacks);
        self.current = Some(initial.clone());

        let surface = self.platform.create_surface(self.initial_size);
        self.active = true;

        let (tx, rx) = mpsc::unbounded_channel();
        let floated = self.platform.float_video(&surface, CANVAS_FPS, tx).await;
        self.surface = Some(surface);
        match floated {
            Ok(video) => {
                self.video = Some(video);
                self.events = Some(rx);
            }
            Err(e) => {
                warn!(error = %e, "failed to float canvas stream");
                self.cleanup();
                return Err(e);
            }
        }

        self.draw();
        info!(size = %self.initial_size, fps = CANVAS_FPS, "canvas stream floated");
        Ok(())
    }

    fn update(&mut self, snapshot: &Snapshot) {
        if !self.active {
            return;
        }
        // The render loop picks it up.
        self.current = Some(snapshot.clone());
    }

    fn close(&mut self) {
        self.cleanup();
    }

    fn pump(&mut self) {
        if !self.active {
            return;
        }
        let mut pending = Vec::new();
        if let Some(events) = self.events.as_mut() {
            while let Ok(event) = events.try_recv() {
                pending.push(event);
            }
        }

        for event in pending {
            match event {
                SurfaceEvent::Resized(size) => self.resize_to(size),
                SurfaceEvent::Pressed(control) => {
                    if let Some(callbacks) = &self.callbacks {
                        match control {
                            Control::Toggle => callbacks.on_toggle(),
                            Control::Reset => callbacks.on_reset(),
                        }
                    }
                }
                SurfaceEvent::Dismissed => {
                    info!("floated video dismissed by user");
                    if let Some(callbacks) = self.cleanup() {
                        callbacks.on_close();
                    }
                    return;
                }
            }
        }
    }

    fn animation_frame(&mut self, timestamp_ms: f64) {
        if !self.active {
            return;
        }
        let due = self
            .last_draw_ms
            .map_or(true, |last| timestamp_ms - last >= Self::frame_interval_ms());
        if due {
            self.draw();
            self.last_draw_ms = Some(timestamp_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{TimerState, TimerStatus};
    use crate::pip::headless::HeadlessPlatform;
    use crate::pip::strategy::PipEvent;
    use crate::pip::Capabilities;

    fn snap(remaining: i64, status: TimerStatus) -> Snapshot {
        let mut state = TimerState::new(900);
        state.remaining_seconds = remaining;
        state.status = status;
        state.snapshot()
    }

    async fn opened(
        platform: &HeadlessPlatform,
    ) -> (CanvasStreamStrategy<HeadlessPlatform>, UnboundedReceiver<PipEvent>) {
        let mut strategy = CanvasStreamStrategy::new(Rc::new(platform.clone()));
        let (callbacks, rx) = PipCallbacks::channel();
        strategy
            .open(&snap(900, TimerStatus::Idle), callbacks)
            .await
            .unwrap();
        (strategy, rx)
    }

    #[tokio::test]
    async fn open_floats_and_draws_first_frame() {
        let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
        let (strategy, _rx) = opened(&platform).await;
        assert!(strategy.is_active());
        assert!(platform.video_floating());
        assert_eq!(platform.frames_presented(), 1);
        assert_eq!(platform.last_frame_texts().concat(), "15:00");
        assert_eq!(strategy.canvas_size(), Some(DEFAULT_CANVAS_SIZE));
    }

    #[tokio::test]
    async fn render_loop_is_capped_at_frame_rate() {
        let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
        let (mut strategy, _rx) = opened(&platform).await;
        let start = strategy.frames_drawn();
        // One second of 60 Hz animation frames.
        for i in 0..60 {
            strategy.animation_frame(f64::from(i) * 1000.0 / 60.0);
        }
        assert_eq!(strategy.frames_drawn() - start, 10);
    }

    #[tokio::test]
    async fn long_sessions_keep_one_frame_on_the_surface() {
        let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
        let (mut strategy, _rx) = opened(&platform).await;
        strategy.update(&snap(-5, TimerStatus::Running));
        strategy.animation_frame(0.0);
        let per_frame = platform.last_frame_op_count();
        assert!(per_frame > 0);

        // An hour of 60 Hz animation frames.
        for i in 1..(60 * 60 * 60) {
            strategy.animation_frame(f64::from(i) * 1000.0 / 60.0);
        }
        assert!(platform.frames_presented() > 10_000);
        assert_eq!(platform.last_frame_op_count(), per_frame);
        assert!(platform.last_frame_texts().concat().starts_with("-00:05"));
    }

    #[tokio::test]
    async fn update_is_drawn_by_the_loop() {
        let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
        let (mut strategy, _rx) = opened(&platform).await;
        strategy.update(&snap(-5, TimerStatus::Running));
        assert_eq!(platform.last_frame_texts().concat(), "15:00");
        strategy.animation_frame(0.0);
        assert!(platform.last_frame_texts().concat().starts_with("-00:05"));
    }

    #[tokio::test]
    async fn resize_redraws_immediately() {
        let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
        let (mut strategy, _rx) = opened(&platform).await;
        let before = platform.frames_presented();

        platform.resize(Size::new(320, 180));
        strategy.pump();
        assert_eq!(strategy.canvas_size(), Some(Size::new(320, 180)));
        assert_eq!(platform.frames_presented(), before + 1);

        // Same size reported again: no redraw.
        platform.resize(Size::new(320, 180));
        strategy.pump();
        assert_eq!(platform.frames_presented(), before + 1);
    }

    #[tokio::test]
    async fn dismissal_releases_stream_and_reports_once() {
        let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
        let (mut strategy, mut rx) = opened(&platform).await;
        platform.dismiss();
        strategy.pump();
        assert!(!strategy.is_active());
        assert!(platform.tracks_stopped());
        assert!(!platform.video_floating());
        assert_eq!(rx.try_recv().ok(), Some(PipEvent::Closed));

        strategy.close();
        strategy.close();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn float_failure_unwinds() {
        let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
        platform.deny_next_open(PlatformError::Interrupted("gesture required".into()));
        let mut strategy = CanvasStreamStrategy::new(Rc::new(platform.clone()));
        let (callbacks, mut rx) = PipCallbacks::channel();
        assert!(strategy.open(&snap(900, TimerStatus::Idle), callbacks).await.is_err());
        assert!(!strategy.is_active());
        assert_eq!(strategy.canvas_size(), None);
        assert!(rx.try_recv().is_err());
    }
}
