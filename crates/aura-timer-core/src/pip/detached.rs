//! Detached-window strategy: an always-on-top auxiliary window carrying
//! the host's styles and a live scene graph with toggle/reset controls.

use std::rc::Rc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

use super::platform::{AuxWindow, Control, Platform, StyleInjection, SurfaceEvent, WindowRequest};
use super::scene::{Scene, SceneMetrics, ScenePatch};
use super::strategy::{PipCallbacks, PipStrategy, StrategyKind};
use crate::clock::Snapshot;
use crate::error::PlatformError;
use crate::render::Size;

/// Size requested from the platform. The granted size may differ.
pub const NOMINAL_WINDOW_SIZE: Size = Size::new(340, 200);

pub struct DetachedWindowStrategy<P: Platform> {
    platform: Rc<P>,
    nominal: Size,
    window: Option<P::Window>,
    events: Option<UnboundedReceiver<SurfaceEvent>>,
    callbacks: Option<PipCallbacks>,
    scene: Option<Scene>,
    active: bool,
}

impl<P: Platform> DetachedWindowStrategy<P> {
    pub fn new(platform: Rc<P>) -> Self {
        Self::with_nominal_size(platform, NOMINAL_WINDOW_SIZE)
    }

    pub fn with_nominal_size(platform: Rc<P>, nominal: Size) -> Self {
        Self {
            platform,
            nominal,
            window: None,
            events: None,
            callbacks: None,
            scene: None,
            active: false,
        }
    }

    /// Currently mounted scene, if open.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Recompute sizes from the window's real dimensions.
    fn rescale(&mut self) {
        let (Some(window), Some(scene)) = (self.window.as_mut(), self.scene.as_mut()) else {
            return;
        };
        let metrics = SceneMetrics::for_size(window.inner_size());
        if metrics != scene.metrics {
            let patch = [ScenePatch::Metrics { metrics }];
            window.patch(&patch);
            scene.apply(&patch);
        }
    }

    /// Release everything. Returns the callbacks only on the first call.
    fn cleanup(&mut self) -> Option<PipCallbacks> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.window = None;
        // Dropping the receiver disconnects the size observer.
        self.events = None;
        self.scene = None;
        self.callbacks.take()
    }
}

impl<P: Platform> PipStrategy for DetachedWindowStrategy<P> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DetachedWindow
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn open(
        &mut self,
        initial: &Snapshot,
        callbacks: PipCallbacks,
    ) -> Result<(), PlatformError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut window = self
            .platform
            .request_window(WindowRequest { size: self.nominal }, tx)
            .await?;

        let styles = StyleInjection::from_host(&self.platform.host_style_sheets());
        window.inject_styles(&styles);

        let granted = window.inner_size();
        let scene = Scene::build(initial, SceneMetrics::for_size(granted));
        window.mount(&scene);
        info!(requested = %self.nominal, granted = %granted, styles = styles.len(), "detached window opened");

        self.window = Some(window);
        self.events = Some(rx);
        self.callbacks = Some(callbacks);
        self.scene = Some(scene);
        self.active = true;
        Ok(())
    }

    fn update(&mut self, snapshot: &Snapshot) {
        if !self.active {
            return;
        }
        let (Some(window), Some(scene)) = (self.window.as_mut(), self.scene.as_mut()) else {
            return;
        };
        let next = Scene::build(snapshot, scene.metrics);
        if scene.same_layout(&next) {
            let patches = scene.diff(&next);
            if !patches.is_empty() {
                window.patch(&patches);
            }
        } else {
            debug!(show_hours = next.show_hours, "rebuilding detached scene");
            window.mount(&next);
        }
        *scene = next;
    }

    fn close(&mut self) {
        if !self.active {
            return;
        }
        if let Some(window) = self.window.as_mut() {
            window.close();
        }
        self.cleanup();
    }

    fn pump(&mut self) {
        if !self.active {
            return;
        }
        let mut resized = false;
        let mut dismissed = false;
        if let Some(events) = self.events.as_mut() {
            while let Ok(event) = events.try_recv() {
                match event {
                    SurfaceEvent::Resized(_) => resized = true,
                    SurfaceEvent::Pressed(control) => {
                        if let Some(callbacks) = &self.callbacks {
                            match control {
                                Control::Toggle => callbacks.on_toggle(),
                                Control::Reset => callbacks.on_reset(),
                            }
                        }
                    }
                    SurfaceEvent::Dismissed => {
                        dismissed = true;
                        break;
                    }
                }
            }
        }

        if dismissed {
            info!("detached window dismissed by user");
            if let Some(callbacks) = self.cleanup() {
                callbacks.on_close();
            }
        } else if resized {
            // Several resizes in one pump collapse into one rescale.
            self.rescale();
        }
    }
}
