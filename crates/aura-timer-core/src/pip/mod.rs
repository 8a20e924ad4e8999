//! Out-of-window ("picture-in-picture") display of the timer.
//!
//! Two strategies render the same snapshot outside the main window: a
//! detached always-on-top window ([`DetachedWindowStrategy`]) and, where
//! that is unavailable, a canvas captured into a floated video
//! ([`CanvasStreamStrategy`]). [`PipCoordinator`] picks one and owns its
//! lifetime.

pub mod canvas;
pub mod coordinator;
pub mod detached;
pub mod headless;
pub mod keep_alive;
pub mod platform;
pub mod scene;
pub mod strategy;

pub use canvas::{CanvasStreamStrategy, CANVAS_FPS, DEFAULT_CANVAS_SIZE};
pub use coordinator::{PipCoordinator, PipSession, PipToggle};
pub use detached::{DetachedWindowStrategy, NOMINAL_WINDOW_SIZE};
pub use headless::{HeadlessPlatform, HeadlessWakeLock};
pub use keep_alive::{silent_clip, SILENT_AUDIO_URL};
pub use platform::{
    AuxWindow, Capabilities, Control, FloatingVideo, HostStyleSheet, KeepAliveAudio, Platform,
    ScreenWakeLock, StyleInjection, SurfaceEvent, SurfaceEventSender, WindowRequest,
};
pub use scene::{Icon, Scene, SceneMetrics, ScenePatch};
pub use strategy::{
    select_strategy, PipCallbacks, PipEvent, PipStrategy, Strategy, StrategyKind, SurfaceSizes,
};
