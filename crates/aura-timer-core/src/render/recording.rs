//! Deterministic in-memory surface.
//!
//! Glyph advance is a flat 0.6 em, which is close enough to the monospace
//! faces the timer uses and keeps layout assertions exact.

use serde::Serialize;

use super::surface::{DrawSurface, Font, Glow, Paint, Rgba, Size, TextAlign};

const ADVANCE_EM: f32 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    FillText {
        text: String,
        x: f32,
        y: f32,
        align: TextAlign,
        font: Font,
        color: Rgba,
        alpha: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        glow: Option<Glow>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Size,
    font: Font,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            font: Font::default(),
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text of every `FillText` op, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                DrawOp::FillRect { .. } => None,
            })
            .collect()
    }

    fn covers(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        x <= 0.0
            && y <= 0.0
            && x + width >= self.size.width as f32
            && y + height >= self.size.height as f32
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        // A fill over the whole surface hides everything drawn before it.
        if self.covers(x, y, width, height) {
            self.ops.clear();
        }
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.font.size_px * ADVANCE_EM
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, align: TextAlign, paint: Paint) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
            align,
            font: self.font,
            color: paint.color,
            alpha: paint.alpha,
            glow: paint.glow,
        });
    }
}
