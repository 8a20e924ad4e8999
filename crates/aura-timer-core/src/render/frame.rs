//! Frame renderer: projects a [`Snapshot`] onto a [`DrawSurface`].
//!
//! Layout reflows to any surface size. The clock text is measured as one
//! block, shrunk to fit 90% of the width, then drawn glyph by glyph at
//! cumulative advance offsets so the block stays centered.

use serde::{Deserialize, Serialize};

use super::surface::{DrawSurface, Font, Glow, Paint, Rgba, Size, TextAlign};
use crate::clock::{format_total_time, Snapshot, TimerStatus};

pub const BACKGROUND: Rgba = Rgba::opaque(0x1e, 0x1e, 0x23);
pub const DIGITS: Rgba = Rgba::opaque(0xe4, 0xe4, 0xe7);
pub const OVERTIME_GLOW: Rgba = Rgba::new(251, 191, 36, 0.28);
pub const WARNING_GLOW: Rgba = Rgba::new(251, 113, 133, 0.22);
pub const SUBTITLE: Rgba = Rgba::new(161, 161, 170, 0.9);
pub const PAUSED_LABEL: Rgba = Rgba::new(255, 255, 255, 0.5);

/// Opacity of a dimmed colon on the canvas.
pub const DIMMED_COLON_ALPHA: f32 = 0.55;

const MAX_TEXT_WIDTH_RATIO: f32 = 0.9;
const FIT_PASSES: usize = 4;

/// Highlight applied to the digits. Exactly one applies per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Warning,
    Overtime,
}

impl Tone {
    /// Overtime wins over warning.
    pub fn of(snapshot: &Snapshot) -> Self {
        if snapshot.is_overtime {
            Tone::Overtime
        } else if snapshot.is_warning && snapshot.status == TimerStatus::Running {
            Tone::Warning
        } else {
            Tone::Neutral
        }
    }

    pub fn glow(self, font_px: f32) -> Option<Glow> {
        match self {
            Tone::Neutral => None,
            Tone::Warning => Some(Glow {
                color: WARNING_GLOW,
                blur_px: font_px * 0.08,
            }),
            Tone::Overtime => Some(Glow {
                color: OVERTIME_GLOW,
                blur_px: font_px * 0.1,
            }),
        }
    }
}

/// Base glyph size before fitting: `min(width * 0.28, height * 0.5)`.
pub fn base_font_px(size: Size) -> f32 {
    (size.width as f32 * 0.28).min(size.height as f32 * 0.5)
}

/// Paint one frame. Deterministic over `(size, snapshot)`.
pub fn render_frame<S: DrawSurface + ?Sized>(surface: &mut S, size: Size, snapshot: &Snapshot) {
    let width = size.width as f32;
    let height = size.height as f32;

    surface.fill_rect(0.0, 0.0, width, height, BACKGROUND);
    if size.is_empty() {
        return;
    }

    let text = snapshot.clock_text();
    let font_px = fit_font(surface, &text, base_font_px(size), width * MAX_TEXT_WIDTH_RATIO);
    let text_width = surface.measure_text(&text);

    let x_base = (width - text_width) / 2.0;
    let y = height / 2.0;
    let tone = Tone::of(snapshot);
    let colon_alpha = if snapshot.colon_dimmed() {
        DIMMED_COLON_ALPHA
    } else {
        1.0
    };

    for (i, ch) in text.char_indices() {
        let advance = surface.measure_text(&text[..i]);
        let paint = Paint {
            color: DIGITS,
            alpha: if ch == ':' { colon_alpha } else { 1.0 },
            glow: tone.glow(font_px),
        };
        let mut buf = [0u8; 4];
        surface.fill_text(ch.encode_utf8(&mut buf), x_base + advance, y, TextAlign::Left, paint);
    }

    if snapshot.status != TimerStatus::Idle {
        surface.set_font(Font::sans(500, font_px * 0.18));
        surface.fill_text(
            &format_total_time(snapshot.total_seconds),
            width / 2.0,
            y + font_px * 0.5,
            TextAlign::Center,
            Paint::solid(SUBTITLE),
        );
    }

    if snapshot.status == TimerStatus::Paused {
        surface.set_font(Font::mono(600, font_px * 0.12));
        surface.fill_text(
            "PAUSED",
            width / 2.0,
            y + font_px * 0.75,
            TextAlign::Center,
            Paint::solid(PAUSED_LABEL),
        );
    }
}

/// Shrink the digit font until `text` fits in `max_width`. Leaves the
/// fitted font selected on the surface.
fn fit_font<S: DrawSurface + ?Sized>(surface: &mut S, text: &str, base_px: f32, max_width: f32) -> f32 {
    let mut font_px = base_px;
    surface.set_font(Font::mono(700, font_px));
    let mut measured = surface.measure_text(text);
    for _ in 0..FIT_PASSES {
        if measured <= max_width || measured <= 0.0 {
            break;
        }
        font_px *= max_width / measured;
        surface.set_font(Font::mono(700, font_px));
        measured = surface.measure_text(text);
    }
    font_px
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TimerState;
    use crate::render::recording::{DrawOp, RecordingSurface};

    fn snapshot(total: u32, remaining: i64, status: TimerStatus) -> Snapshot {
        let mut state = TimerState::new(total);
        state.remaining_seconds = remaining;
        state.status = status;
        state.snapshot()
    }

    fn glyph_ops(surface: &RecordingSurface) -> Vec<(String, f32, f32, Font, Option<Glow>)> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText {
                    text,
                    x,
                    alpha,
                    font,
                    glow,
                    align: TextAlign::Left,
                    ..
                } => Some((text.clone(), *x, *alpha, *font, *glow)),
                _ => None,
            })
            .collect()
    }

    fn render(size: Size, snap: &Snapshot) -> RecordingSurface {
        let mut surface = RecordingSurface::new(size);
        render_frame(&mut surface, size, snap);
        surface
    }

    #[test]
    fn idle_frame_draws_digits_only() {
        let surface = render(Size::new(600, 340), &snapshot(900, 900, TimerStatus::Idle));
        assert_eq!(surface.texts().concat(), "15:00");
        assert!(matches!(surface.ops()[0], DrawOp::FillRect { color, .. } if color == BACKGROUND));
    }

    #[test]
    fn glyphs_are_centered_as_one_block() {
        let size = Size::new(600, 340);
        let surface = render(size, &snapshot(900, 900, TimerStatus::Idle));
        let glyphs = glyph_ops(&surface);
        let font_px = base_font_px(size);
        assert_eq!(glyphs[0].3.size_px, font_px);
        let advance = font_px * 0.6;
        let block = advance * 5.0;
        let start = (600.0 - block) / 2.0;
        for (i, glyph) in glyphs.iter().enumerate() {
            assert!((glyph.1 - (start + advance * i as f32)).abs() < 1e-3);
        }
    }

    #[test]
    fn wide_text_is_scaled_to_ninety_percent() {
        let size = Size::new(300, 400);
        let surface = render(size, &snapshot(7200, -36_000, TimerStatus::Running));
        let glyphs = glyph_ops(&surface);
        let text: String = glyphs.iter().map(|g| g.0.as_str()).collect();
        assert_eq!(text, "-10:00:00");
        let font_px = glyphs[0].3.size_px;
        assert!(font_px < base_font_px(size));
        let width = text.chars().count() as f32 * font_px * 0.6;
        assert!(width <= 270.0 + 1e-3);
    }

    #[test]
    fn colons_breathe_only_while_running() {
        let running_odd = render(Size::new(600, 340), &snapshot(900, 899, TimerStatus::Running));
        let colon = glyph_ops(&running_odd).into_iter().find(|g| g.0 == ":").unwrap();
        assert_eq!(colon.2, DIMMED_COLON_ALPHA);

        let running_even = render(Size::new(600, 340), &snapshot(900, 898, TimerStatus::Running));
        let colon = glyph_ops(&running_even).into_iter().find(|g| g.0 == ":").unwrap();
        assert_eq!(colon.2, 1.0);

        let paused = render(Size::new(600, 340), &snapshot(900, 899, TimerStatus::Paused));
        let colon = glyph_ops(&paused).into_iter().find(|g| g.0 == ":").unwrap();
        assert_eq!(colon.2, 1.0);
    }

    #[test]
    fn tone_precedence() {
        let warning = snapshot(900, 200, TimerStatus::Running);
        assert_eq!(Tone::of(&warning), Tone::Warning);
        let overtime = snapshot(900, -1, TimerStatus::Running);
        assert_eq!(Tone::of(&overtime), Tone::Overtime);
        assert_eq!(Tone::of(&snapshot(900, 600, TimerStatus::Running)), Tone::Neutral);

        let surface = render(Size::new(600, 340), &overtime);
        let glyph = &glyph_ops(&surface)[0];
        assert_eq!(glyph.4.map(|g| g.color), Some(OVERTIME_GLOW));
    }

    #[test]
    fn subtitle_and_paused_label() {
        let running = render(Size::new(600, 340), &snapshot(5400, 100, TimerStatus::Running));
        assert!(running.texts().contains(&"1 hr 30 min"));
        assert!(!running.texts().contains(&"PAUSED"));

        let paused = render(Size::new(600, 340), &snapshot(900, 100, TimerStatus::Paused));
        assert!(paused.texts().contains(&"15 min"));
        assert!(paused.texts().contains(&"PAUSED"));

        let idle = render(Size::new(600, 340), &snapshot(900, 900, TimerStatus::Idle));
        assert!(!idle.texts().contains(&"15 min"));
    }

    #[test]
    fn empty_surface_only_clears() {
        let surface = render(Size::new(0, 0), &snapshot(900, 900, TimerStatus::Idle));
        assert_eq!(surface.ops().len(), 1);
    }
}
