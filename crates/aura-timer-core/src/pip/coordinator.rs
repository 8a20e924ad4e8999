//! Out-of-window coordinator.
//!
//! Owns at most one active strategy, picks it from the platform's
//! capabilities on open, and keeps a silent looping clip playing for the
//! lifetime of the session so the host keeps the timer ticking while the
//! main window is hidden.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::keep_alive::silent_clip;
use super::platform::{KeepAliveAudio, Platform};
use super::strategy::{
    select_strategy, PipCallbacks, PipStrategy, Strategy, StrategyKind, SurfaceSizes,
};
use crate::clock::Snapshot;
use crate::error::PipError;

/// One open-to-close lifetime of an external surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipSession {
    pub id: Uuid,
    pub strategy: StrategyKind,
    pub opened_at: DateTime<Utc>,
}

/// Outcome of [`PipCoordinator::toggle`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipToggle {
    Opened(PipSession),
    Closed(PipSession),
}

pub struct PipCoordinator<P: Platform> {
    platform: Rc<P>,
    strategy: Option<Strategy<P>>,
    keep_alive: Option<P::Audio>,
    session: Option<PipSession>,
    sizes: SurfaceSizes,
}

impl<P: Platform> PipCoordinator<P> {
    pub fn new(platform: Rc<P>) -> Self {
        Self {
            platform,
            strategy: None,
            keep_alive: None,
            session: None,
            sizes: SurfaceSizes::default(),
        }
    }

    /// Override the nominal window and initial canvas sizes.
    pub fn with_surface_sizes(mut self, sizes: SurfaceSizes) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn platform(&self) -> &Rc<P> {
        &self.platform
    }

    /// Derived from the strategy's own flag, never tracked separately.
    pub fn is_active(&self) -> bool {
        self.strategy.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn active_kind(&self) -> Option<StrategyKind> {
        self.strategy
            .as_ref()
            .filter(|s| s.is_active())
            .map(|s| s.kind())
    }

    pub fn session(&self) -> Option<&PipSession> {
        self.session.as_ref().filter(|_| self.is_active())
    }

    pub fn keep_alive_playing(&self) -> bool {
        self.keep_alive.as_ref().is_some_and(|a| a.is_playing())
    }

    /// Close if open, otherwise open with the best available strategy.
    ///
    /// Closing from here is a user action, so `on_close` is invoked once.
    pub async fn toggle(
        &mut self,
        snapshot: &Snapshot,
        callbacks: PipCallbacks,
        now: DateTime<Utc>,
    ) -> Result<PipToggle, PipError> {
        if self.is_active() {
            if let Some(session) = self.shutdown() {
                info!(session = %session.id, "out-of-window session toggled off");
                callbacks.on_close();
                return Ok(PipToggle::Closed(session));
            }
        }

        let kind = select_strategy(self.platform.capabilities()).ok_or_else(|| {
            warn!("no out-of-window capability on this platform");
            PipError::CapabilityUnavailable
        })?;

        self.start_keep_alive();

        let mut strategy = Strategy::sized(kind, Rc::clone(&self.platform), self.sizes);
        if let Err(source) = strategy.open(snapshot, callbacks).await {
            warn!(strategy = %kind, error = %source, "failed to open out-of-window surface");
            strategy.close();
            self.stop_keep_alive();
            return Err(PipError::OpenFailed {
                strategy: kind,
                source,
            });
        }

        let session = PipSession {
            id: Uuid::new_v4(),
            strategy: kind,
            opened_at: now,
        };
        info!(session = %session.id, strategy = %kind, "out-of-window session opened");
        self.strategy = Some(strategy);
        self.session = Some(session.clone());
        Ok(PipToggle::Opened(session))
    }

    /// Forward a snapshot to the active strategy.
    pub fn update(&mut self, snapshot: &Snapshot) {
        if let Some(strategy) = self.strategy.as_mut().filter(|s| s.is_active()) {
            strategy.update(snapshot);
        }
    }

    /// Drain platform events. Returns the session when the surface was
    /// dismissed from its own chrome during this pump.
    pub fn pump(&mut self) -> Option<PipSession> {
        let strategy = self.strategy.as_mut()?;
        strategy.pump();
        if strategy.is_active() {
            return None;
        }
        self.strategy = None;
        self.stop_keep_alive();
        let session = self.session.take();
        if let Some(session) = &session {
            info!(session = %session.id, "out-of-window session dismissed");
        }
        session
    }

    pub fn animation_frame(&mut self, timestamp_ms: f64) {
        if let Some(strategy) = self.strategy.as_mut() {
            strategy.animation_frame(timestamp_ms);
        }
    }

    /// Tear down without notifying. Used on shutdown.
    pub fn close(&mut self) -> Option<PipSession> {
        let session = self.shutdown();
        if let Some(session) = &session {
            info!(session = %session.id, "out-of-window session closed");
        }
        session
    }

    fn shutdown(&mut self) -> Option<PipSession> {
        if let Some(mut strategy) = self.strategy.take() {
            strategy.close();
        }
        self.stop_keep_alive();
        self.session.take()
    }

    fn start_keep_alive(&mut self) {
        let platform = &self.platform;
        let audio = self.keep_alive.get_or_insert_with(|| platform.keep_alive_audio());
        if audio.is_playing() {
            return;
        }
        let clip = match silent_clip() {
            Ok(clip) => clip,
            Err(e) => {
                warn!(error = %e, "keep-alive clip is malformed");
                return;
            }
        };
        // Best effort. The timer still works, it may just be throttled.
        match audio.play(&clip) {
            Ok(()) => debug!("keep-alive audio started"),
            Err(e) => warn!(error = %e, "keep-alive audio failed to start"),
        }
    }

    fn stop_keep_alive(&mut self) {
        if let Some(audio) = self.keep_alive.as_mut() {
            if audio.is_playing() {
                audio.stop();
                debug!("keep-alive audio stopped");
            }
        }
    }
}
