//! In-memory platform with every capability switchable.
//!
//! Used by the CLI to drive the out-of-window subsystem without a
//! display, and by tests to observe what the strategies did and to inject
//! user actions.

use std::cell::RefCell;
use std::rc::Rc;

use super::platform::{
    AuxWindow, Capabilities, Control, FloatingVideo, HostStyleSheet, KeepAliveAudio, Platform,
    ScreenWakeLock, StyleInjection, SurfaceEvent, SurfaceEventSender, WindowRequest,
};
use super::scene::{Scene, ScenePatch};
use crate::error::PlatformError;
use crate::render::{RecordingSurface, Size};

#[derive(Debug, Default)]
struct HeadlessState {
    capabilities: Capabilities,
    granted_size: Option<Size>,
    window_size: Size,
    style_sheets: Vec<HostStyleSheet>,
    deny_next: Option<PlatformError>,
    events: Option<SurfaceEventSender>,

    window_open: bool,
    mount_count: usize,
    patch_batches: usize,
    injected_styles: Vec<StyleInjection>,
    scene: Option<Scene>,
    markup: String,

    video_floating: bool,
    tracks_stopped: bool,
    frames_presented: usize,
    last_frame: Vec<String>,
    last_frame_ops: usize,

    audio_failure: Option<PlatformError>,
    audio_playing: bool,
    audio_play_count: usize,

    wake_lock_unsupported: bool,
    wake_lock_failure: Option<PlatformError>,
    wake_lock_held: bool,
    wake_lock_acquisitions: usize,
}

/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlatform {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessPlatform {
    pub fn new(capabilities: Capabilities) -> Self {
        let platform = Self::default();
        platform.state.borrow_mut().capabilities = capabilities;
        platform
    }

    /// Grant this window size regardless of what is requested.
    pub fn with_window_size(self, size: Size) -> Self {
        self.state.borrow_mut().granted_size = Some(size);
        self
    }

    pub fn with_style_sheets(self, sheets: Vec<HostStyleSheet>) -> Self {
        self.state.borrow_mut().style_sheets = sheets;
        self
    }

    /// Refuse the next window or video request with `error`.
    pub fn deny_next_open(&self, error: PlatformError) {
        self.state.borrow_mut().deny_next = Some(error);
    }

    /// Make every keep-alive `play` fail with `error`.
    pub fn set_audio_failure(&self, error: PlatformError) {
        self.state.borrow_mut().audio_failure = Some(error);
    }

    /// Report no wake-lock capability.
    pub fn without_wake_lock(self) -> Self {
        self.state.borrow_mut().wake_lock_unsupported = true;
        self
    }

    /// Make every wake-lock `acquire` fail with `error`.
    pub fn set_wake_lock_failure(&self, error: PlatformError) {
        self.state.borrow_mut().wake_lock_failure = Some(error);
    }

    /// The host drops the lock by itself, as a browser does for a hidden page.
    pub fn drop_wake_lock(&self) {
        self.state.borrow_mut().wake_lock_held = false;
    }

    /// Deliver a raw event to whichever surface is open.
    pub fn emit(&self, event: SurfaceEvent) {
        let state = self.state.borrow();
        if let Some(tx) = &state.events {
            let _ = tx.send(event);
        }
    }

    pub fn press(&self, control: Control) {
        self.emit(SurfaceEvent::Pressed(control));
    }

    pub fn resize(&self, size: Size) {
        self.state.borrow_mut().window_size = size;
        self.emit(SurfaceEvent::Resized(size));
    }

    /// The user closes the surface through platform chrome.
    pub fn dismiss(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.window_open = false;
            state.video_floating = false;
        }
        self.emit(SurfaceEvent::Dismissed);
    }

    pub fn window_open(&self) -> bool {
        self.state.borrow().window_open
    }

    pub fn mount_count(&self) -> usize {
        self.state.borrow().mount_count
    }

    pub fn patch_batches(&self) -> usize {
        self.state.borrow().patch_batches
    }

    pub fn injected_styles(&self) -> Vec<StyleInjection> {
        self.state.borrow().injected_styles.clone()
    }

    /// Scene as the window currently shows it, patches applied.
    pub fn scene(&self) -> Option<Scene> {
        self.state.borrow().scene.clone()
    }

    /// Markup of the mounted scene, kept in step with patches.
    pub fn markup(&self) -> String {
        self.state.borrow().markup.clone()
    }

    pub fn video_floating(&self) -> bool {
        self.state.borrow().video_floating
    }

    pub fn tracks_stopped(&self) -> bool {
        self.state.borrow().tracks_stopped
    }

    pub fn frames_presented(&self) -> usize {
        self.state.borrow().frames_presented
    }

    /// Text drawn in the most recently presented frame.
    pub fn last_frame_texts(&self) -> Vec<String> {
        self.state.borrow().last_frame.clone()
    }

    /// Ops the surface held when the last frame was presented.
    pub fn last_frame_op_count(&self) -> usize {
        self.state.borrow().last_frame_ops
    }

    pub fn audio_playing(&self) -> bool {
        self.state.borrow().audio_playing
    }

    pub fn audio_play_count(&self) -> usize {
        self.state.borrow().audio_play_count
    }

    pub fn wake_lock_held(&self) -> bool {
        self.state.borrow().wake_lock_held
    }

    pub fn wake_lock_acquisitions(&self) -> usize {
        self.state.borrow().wake_lock_acquisitions
    }
}

pub struct HeadlessWindow {
    state: Rc<RefCell<HeadlessState>>,
}

impl AuxWindow for HeadlessWindow {
    fn inner_size(&self) -> Size {
        self.state.borrow().window_size
    }

    fn inject_styles(&mut self, styles: &[StyleInjection]) {
        self.state
            .borrow_mut()
            .injected_styles
            .extend_from_slice(styles);
    }

    fn mount(&mut self, scene: &Scene) {
        let mut state = self.state.borrow_mut();
        state.mount_count += 1;
        state.markup = scene.to_html();
        state.scene = Some(scene.clone());
    }

    fn patch(&mut self, patches: &[ScenePatch]) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.patch_batches += 1;
        if let Some(scene) = state.scene.as_mut() {
            scene.apply(patches);
            state.markup = scene.to_html();
        }
    }

    fn close(&mut self) {
        let mut state = self.state.borrow_mut();
        state.window_open = false;
        state.events = None;
    }
}

pub struct HeadlessVideo {
    state: Rc<RefCell<HeadlessState>>,
}

impl FloatingVideo for HeadlessVideo {
    type Surface = RecordingSurface;

    fn present(&mut self, surface: &RecordingSurface) {
        let mut state = self.state.borrow_mut();
        state.frames_presented += 1;
        state.last_frame = surface.texts().into_iter().map(str::to_string).collect();
        state.last_frame_ops = surface.ops().len();
    }

    fn stop_tracks(&mut self) {
        self.state.borrow_mut().tracks_stopped = true;
    }

    fn exit(&mut self) {
        let mut state = self.state.borrow_mut();
        state.video_floating = false;
        state.events = None;
    }
}

pub struct HeadlessAudio {
    state: Rc<RefCell<HeadlessState>>,
}

impl KeepAliveAudio for HeadlessAudio {
    fn play(&mut self, clip: &[u8]) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        if let Some(error) = state.audio_failure.clone() {
            return Err(error);
        }
        if clip.is_empty() {
            return Err(PlatformError::Playback("empty clip".into()));
        }
        state.audio_playing = true;
        state.audio_play_count += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.state.borrow_mut().audio_playing = false;
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().audio_playing
    }
}

pub struct HeadlessWakeLock {
    state: Rc<RefCell<HeadlessState>>,
}

impl ScreenWakeLock for HeadlessWakeLock {
    fn acquire(&mut self) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        if let Some(error) = state.wake_lock_failure.clone() {
            return Err(error);
        }
        state.wake_lock_held = true;
        state.wake_lock_acquisitions += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.state.borrow_mut().wake_lock_held = false;
    }

    fn is_held(&self) -> bool {
        self.state.borrow().wake_lock_held
    }
}

impl Platform for HeadlessPlatform {
    type Window = HeadlessWindow;
    type Surface = RecordingSurface;
    type Video = HeadlessVideo;
    type Audio = HeadlessAudio;
    type WakeLock = HeadlessWakeLock;

    fn capabilities(&self) -> Capabilities {
        self.state.borrow().capabilities
    }

    fn host_style_sheets(&self) -> Vec<HostStyleSheet> {
        self.state.borrow().style_sheets.clone()
    }

    async fn request_window(
        &self,
        request: WindowRequest,
        events: SurfaceEventSender,
    ) -> Result<HeadlessWindow, PlatformError> {
        let mut state = self.state.borrow_mut();
        if !state.capabilities.detached_window {
            return Err(PlatformError::Unsupported);
        }
        if let Some(error) = state.deny_next.take() {
            return Err(error);
        }
        state.window_size = state.granted_size.unwrap_or(request.size);
        state.window_open = true;
        state.events = Some(events);
        Ok(HeadlessWindow {
            state: Rc::clone(&self.state),
        })
    }

    fn create_surface(&self, size: Size) -> RecordingSurface {
        RecordingSurface::new(size)
    }

    async fn float_video(
        &self,
        _surface: &RecordingSurface,
        _fps: u32,
        events: SurfaceEventSender,
    ) -> Result<HeadlessVideo, PlatformError> {
        let mut state = self.state.borrow_mut();
        if !state.capabilities.floating_video {
            return Err(PlatformError::Unsupported);
        }
        if let Some(error) = state.deny_next.take() {
            return Err(error);
        }
        state.video_floating = true;
        state.tracks_stopped = false;
        state.events = Some(events);
        Ok(HeadlessVideo {
            state: Rc::clone(&self.state),
        })
    }

    fn keep_alive_audio(&self) -> HeadlessAudio {
        HeadlessAudio {
            state: Rc::clone(&self.state),
        }
    }

    fn wake_lock(&self) -> Option<HeadlessWakeLock> {
        if self.state.borrow().wake_lock_unsupported {
            return None;
        }
        Some(HeadlessWakeLock {
            state: Rc::clone(&self.state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn refuses_missing_capability() {
        let platform = HeadlessPlatform::new(Capabilities::VIDEO_ONLY);
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = platform
            .request_window(WindowRequest { size: Size::new(340, 200) }, tx)
            .await;
        assert!(matches!(result, Err(PlatformError::Unsupported)));
    }

    #[tokio::test]
    async fn denial_applies_once() {
        let platform = HeadlessPlatform::new(Capabilities::ALL);
        platform.deny_next_open(PlatformError::Denied("no".into()));
        let (tx, _rx) = mpsc::unbounded_channel();
        let request = WindowRequest { size: Size::new(340, 200) };
        assert!(platform.request_window(request, tx.clone()).await.is_err());
        let window = platform.request_window(request, tx).await.unwrap();
        assert_eq!(window.inner_size(), Size::new(340, 200));
        assert!(platform.window_open());
    }

    #[tokio::test]
    async fn events_reach_the_open_surface() {
        let platform = HeadlessPlatform::new(Capabilities::ALL);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _window = platform
            .request_window(WindowRequest { size: Size::new(340, 200) }, tx)
            .await
            .unwrap();
        platform.press(Control::Reset);
        platform.dismiss();
        assert_eq!(rx.try_recv().ok(), Some(SurfaceEvent::Pressed(Control::Reset)));
        assert_eq!(rx.try_recv().ok(), Some(SurfaceEvent::Dismissed));
        assert!(!platform.window_open());
    }

    #[tokio::test]
    async fn mounted_markup_follows_patches() {
        use crate::clock::{TimerState, TimerStatus};
        use crate::pip::scene::SceneMetrics;

        let platform = HeadlessPlatform::new(Capabilities::ALL);
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut window = platform
            .request_window(WindowRequest { size: Size::new(340, 200) }, tx)
            .await
            .unwrap();
        let metrics = SceneMetrics::for_size(window.inner_size());
        let mut state = TimerState::new(900);
        let scene = Scene::build(&state.snapshot(), metrics);
        window.mount(&scene);
        assert!(platform.markup().contains(r#"data-action="toggle""#));
        assert!(platform.markup().contains(">15</span>"));

        state.remaining_seconds = 899;
        state.status = TimerStatus::Running;
        let next = Scene::build(&state.snapshot(), metrics);
        window.patch(&scene.diff(&next));
        assert!(platform.markup().contains(">14</span>"));
        assert!(platform.markup().contains(">59</span>"));
    }

    #[test]
    fn wake_lock_is_switchable() {
        let platform = HeadlessPlatform::new(Capabilities::ALL);
        let mut lock = platform.wake_lock().unwrap();
        lock.acquire().unwrap();
        assert!(platform.wake_lock_held());
        platform.drop_wake_lock();
        assert!(!lock.is_held());

        let bare = HeadlessPlatform::new(Capabilities::ALL).without_wake_lock();
        assert!(bare.wake_lock().is_none());
    }

    #[test]
    fn audio_failure_is_reported() {
        let platform = HeadlessPlatform::new(Capabilities::ALL);
        platform.set_audio_failure(PlatformError::Playback("autoplay blocked".into()));
        let mut audio = platform.keep_alive_audio();
        assert!(audio.play(b"RIFF").is_err());
        assert!(!audio.is_playing());
        assert_eq!(platform.audio_play_count(), 0);
    }
}
