//! Frame rendering onto 2D surfaces.

mod frame;
mod recording;
mod surface;

pub use frame::{
    base_font_px, render_frame, Tone, BACKGROUND, DIGITS, DIMMED_COLON_ALPHA, OVERTIME_GLOW,
    PAUSED_LABEL, SUBTITLE, WARNING_GLOW,
};
pub use recording::{DrawOp, RecordingSurface};
pub use surface::{DrawSurface, Font, FontFamily, Glow, Paint, Rgba, Size, TextAlign};
