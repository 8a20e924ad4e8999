//! DOM-like scene graph shown in the detached window.
//!
//! The scene is rebuilt from each snapshot and diffed against the mounted
//! one. Only a change in hour visibility changes the node structure;
//! everything else is patched in place so running opacity transitions
//! are not interrupted.

use serde::Serialize;

use super::platform::Control;
use crate::clock::{Snapshot, TimerStatus};
use crate::render::{Rgba, Size, Tone, BACKGROUND, DIGITS};

/// Opacity of a dimmed colon in the detached window.
pub const DIMMED_COLON_OPACITY: f32 = 0.4;
pub const COLON_TRANSITION: &str = "opacity 0.5s ease-in-out";

const MIN_BUTTON_PX: f32 = 32.0;
const MAX_BUTTON_PX: f32 = 56.0;

const AMBER_300: Rgba = Rgba::opaque(0xfc, 0xd3, 0x4d);
const ROSE_400: Rgba = Rgba::opaque(0xfb, 0x71, 0x85);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Play,
    Pause,
    Reset,
}

impl Icon {
    pub fn for_status(status: TimerStatus) -> Self {
        if status == TimerStatus::Running {
            Icon::Pause
        } else {
            Icon::Play
        }
    }

    fn svg(self) -> &'static str {
        match self {
            Icon::Play => r#"<polygon points="5 3 19 12 5 21 5 3"></polygon>"#,
            Icon::Pause => {
                r#"<rect x="6" y="4" width="4" height="16"></rect><rect x="14" y="4" width="4" height="16"></rect>"#
            }
            Icon::Reset => {
                r#"<path d="M3 12a9 9 0 1 0 9-9 9.75 9.75 0 0 0-6.74 2.74L3 12"></path><path d="M3 3v9h9"></path>"#
            }
        }
    }
}

/// Glyph and control sizes derived from the window's actual size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneMetrics {
    pub font_px: f32,
    pub button_px: f32,
    pub icon_px: f32,
}

impl SceneMetrics {
    pub fn for_size(size: Size) -> Self {
        let width = size.width as f32;
        let height = size.height as f32;
        let button_px = (width * 0.11).clamp(MIN_BUTTON_PX, MAX_BUTTON_PX);
        Self {
            font_px: (width * 0.32).min(height * 0.48),
            button_px,
            icon_px: button_px * 0.65,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub show_hours: bool,
    pub negative: bool,
    /// Digit groups, colon-separated when drawn.
    pub parts: Vec<String>,
    pub colon_opacity: f32,
    pub tone: Tone,
    pub toggle_icon: Icon,
    pub metrics: SceneMetrics,
}

/// In-place change to a mounted scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "patch", rename_all = "snake_case")]
pub enum ScenePatch {
    Digits { index: usize, text: String },
    ColonOpacity { opacity: f32 },
    Negative { visible: bool },
    Tone { tone: Tone },
    ToggleIcon { icon: Icon },
    Metrics { metrics: SceneMetrics },
}

impl Scene {
    pub fn build(snapshot: &Snapshot, metrics: SceneMetrics) -> Self {
        let t = &snapshot.time_string;
        let show_hours = snapshot.show_hours();
        let mut parts = Vec::with_capacity(3);
        if show_hours {
            parts.push(t.hours.clone());
        }
        parts.push(t.minutes.clone());
        parts.push(t.seconds.clone());

        Self {
            show_hours,
            negative: snapshot.is_overtime,
            parts,
            colon_opacity: if snapshot.colon_dimmed() {
                DIMMED_COLON_OPACITY
            } else {
                1.0
            },
            tone: Tone::of(snapshot),
            toggle_icon: Icon::for_status(snapshot.status),
            metrics,
        }
    }

    /// Whether `next` can be reached by patching `self`.
    pub fn same_layout(&self, next: &Scene) -> bool {
        self.show_hours == next.show_hours && self.parts.len() == next.parts.len()
    }

    /// Patches turning `self` into `next`. Assumes [`Scene::same_layout`].
    pub fn diff(&self, next: &Scene) -> Vec<ScenePatch> {
        let mut patches = Vec::new();
        for (index, (old, new)) in self.parts.iter().zip(&next.parts).enumerate() {
            if old != new {
                patches.push(ScenePatch::Digits {
                    index,
                    text: new.clone(),
                });
            }
        }
        if self.colon_opacity != next.colon_opacity {
            patches.push(ScenePatch::ColonOpacity {
                opacity: next.colon_opacity,
            });
        }
        if self.negative != next.negative {
            patches.push(ScenePatch::Negative {
                visible: next.negative,
            });
        }
        if self.tone != next.tone {
            patches.push(ScenePatch::Tone { tone: next.tone });
        }
        if self.toggle_icon != next.toggle_icon {
            patches.push(ScenePatch::ToggleIcon {
                icon: next.toggle_icon,
            });
        }
        if self.metrics != next.metrics {
            patches.push(ScenePatch::Metrics {
                metrics: next.metrics,
            });
        }
        patches
    }

    /// Apply patches produced by [`Scene::diff`].
    pub fn apply(&mut self, patches: &[ScenePatch]) {
        for patch in patches {
            match patch {
                ScenePatch::Digits { index, text } => {
                    if let Some(part) = self.parts.get_mut(*index) {
                        part.clone_from(text);
                    }
                }
                ScenePatch::ColonOpacity { opacity } => self.colon_opacity = *opacity,
                ScenePatch::Negative { visible } => self.negative = *visible,
                ScenePatch::Tone { tone } => self.tone = *tone,
                ScenePatch::ToggleIcon { icon } => self.toggle_icon = *icon,
                ScenePatch::Metrics { metrics } => self.metrics = *metrics,
            }
        }
    }

    /// Markup for hosts that render HTML.
    pub fn to_html(&self) -> String {
        let m = &self.metrics;
        let mut digits = String::new();
        if self.negative {
            digits.push_str(r#"<span class="sign" style="margin-right:0.1em">-</span>"#);
        }
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                digits.push_str(&format!(
                    r#"<span class="colon" style="opacity:{};transition:{};margin:0 0.05em">:</span>"#,
                    self.colon_opacity, COLON_TRANSITION
                ));
            }
            digits.push_str(&format!(r#"<span class="digits">{part}</span>"#));
        }

        format!(
            concat!(
                r#"<body style="margin:0;background:{bg};display:flex;justify-content:center;align-items:center;height:100vh;overflow:hidden">"#,
                r#"<div class="container">"#,
                r#"<div class="time" style="font-size:{font}px;line-height:1;color:{color}">{digits}</div>"#,
                r#"<div class="controls">{toggle}{reset}</div>"#,
                r#"</div></body>"#
            ),
            bg = BACKGROUND.to_css(),
            font = m.font_px,
            color = tone_color(self.tone).to_css(),
            digits = digits,
            toggle = button_html(Control::Toggle, self.toggle_icon, m),
            reset = button_html(Control::Reset, Icon::Reset, m),
        )
    }
}

fn tone_color(tone: Tone) -> Rgba {
    match tone {
        Tone::Neutral => DIGITS,
        Tone::Warning => ROSE_400,
        Tone::Overtime => AMBER_300,
    }
}

fn button_html(control: Control, icon: Icon, m: &SceneMetrics) -> String {
    let action = match control {
        Control::Toggle => "toggle",
        Control::Reset => "reset",
    };
    format!(
        r#"<button data-action="{action}" style="width:{b}px;height:{b}px"><svg viewBox="0 0 24 24" width="{i}" height="{i}" fill="none" stroke="currentColor">{svg}</svg></button>"#,
        b = m.button_px,
        i = m.icon_px,
        svg = icon.svg(),
    )
}
