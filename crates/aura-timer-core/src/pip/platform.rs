//! Host platform seam for out-of-window surfaces.
//!
//! A platform advertises which capabilities it has and hands out the
//! concrete window, drawing surface, floated video and keep-alive audio.
//! Everything the platform reports back (resizes, button presses,
//! dismissal) arrives as [`SurfaceEvent`]s on the channel passed at open.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use super::scene::{Scene, ScenePatch};
use crate::error::PlatformError;
use crate::render::{DrawSurface, Size};

/// Which out-of-window capabilities the host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Always-on-top auxiliary window sharing the host's style rules.
    pub detached_window: bool,
    /// "Float a video above everything".
    pub floating_video: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        detached_window: false,
        floating_video: false,
    };
    pub const ALL: Capabilities = Capabilities {
        detached_window: true,
        floating_video: true,
    };
    pub const VIDEO_ONLY: Capabilities = Capabilities {
        detached_window: false,
        floating_video: true,
    };
}

/// Controls rendered inside the external surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Toggle,
    Reset,
}

/// Raw notifications from the platform about the external surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The surface now has this size.
    Resized(Size),
    Pressed(Control),
    /// The user or the platform closed the surface.
    Dismissed,
}

pub type SurfaceEventSender = UnboundedSender<SurfaceEvent>;

/// Nominal size asked of the platform. It may grant something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    pub size: Size,
}

/// A style sheet attached to the host document.
#[derive(Debug, Clone, PartialEq)]
pub struct HostStyleSheet {
    pub href: Option<String>,
    pub media: String,
    /// `None` when the rules cannot be read (cross-origin source).
    pub rules: Option<Vec<String>>,
}

/// How a host style sheet is carried into the auxiliary window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleInjection {
    Inline(String),
    Linked { href: String, media: String },
}

impl StyleInjection {
    /// Inline readable sheets, link unreadable ones by reference, skip
    /// unreadable sheets that have no address.
    pub fn from_host(sheets: &[HostStyleSheet]) -> Vec<StyleInjection> {
        sheets
            .iter()
            .filter_map(|sheet| match (&sheet.rules, &sheet.href) {
                (Some(rules), _) => Some(StyleInjection::Inline(rules.concat())),
                (None, Some(href)) => Some(StyleInjection::Linked {
                    href: href.clone(),
                    media: sheet.media.clone(),
                }),
                (None, None) => None,
            })
            .collect()
    }
}

/// Auxiliary always-on-top window holding a scene graph.
pub trait AuxWindow {
    /// Actual inner size, which may differ from the requested one.
    fn inner_size(&self) -> Size;

    fn inject_styles(&mut self, styles: &[StyleInjection]);

    /// Replace the whole scene.
    fn mount(&mut self, scene: &Scene);

    /// Apply in-place changes to the mounted scene.
    fn patch(&mut self, patches: &[ScenePatch]);

    fn close(&mut self);
}

/// A muted, inline video floated above everything, fed by a captured
/// stream of an offscreen surface.
pub trait FloatingVideo {
    type Surface: DrawSurface;

    /// Push the current contents of `surface` into the stream.
    fn present(&mut self, surface: &Self::Surface);

    fn stop_tracks(&mut self);

    /// Leave the floated mode and detach the video element.
    fn exit(&mut self);
}

/// Silent looping playback that keeps the host from being throttled.
pub trait KeepAliveAudio {
    fn play(&mut self, clip: &[u8]) -> Result<(), PlatformError>;

    /// Pause and rewind.
    fn stop(&mut self);

    fn is_playing(&self) -> bool;
}

/// Screen wake lock held while the countdown runs.
///
/// The host may drop the lock on its own (a hidden page loses it), so
/// `is_held` reflects the platform's view, not just the last call.
pub trait ScreenWakeLock {
    fn acquire(&mut self) -> Result<(), PlatformError>;

    fn release(&mut self);

    fn is_held(&self) -> bool;
}

/// Everything the out-of-window subsystem needs from its host.
#[allow(async_fn_in_trait)]
pub trait Platform {
    type Window: AuxWindow;
    type Surface: DrawSurface;
    type Video: FloatingVideo<Surface = Self::Surface>;
    type Audio: KeepAliveAudio;
    type WakeLock: ScreenWakeLock;

    fn capabilities(&self) -> Capabilities;

    fn host_style_sheets(&self) -> Vec<HostStyleSheet>;

    /// Ask for an auxiliary window. Resolves once the platform grants or refuses it.
    async fn request_window(
        &self,
        request: WindowRequest,
        events: SurfaceEventSender,
    ) -> Result<Self::Window, PlatformError>;

    fn create_surface(&self, size: Size) -> Self::Surface;

    /// Capture `surface` at `fps` into a video and float it.
    async fn float_video(
        &self,
        surface: &Self::Surface,
        fps: u32,
        events: SurfaceEventSender,
    ) -> Result<Self::Video, PlatformError>;

    fn keep_alive_audio(&self) -> Self::Audio;

    /// `None` when the host has no wake-lock capability.
    fn wake_lock(&self) -> Option<Self::WakeLock>;
}
