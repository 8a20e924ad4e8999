//! 2D drawing surface abstraction, modelled on a canvas context.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of a surface or window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    Monospace,
    SansSerif,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: FontFamily,
    pub weight: u16,
    pub size_px: f32,
}

impl Font {
    pub const fn mono(weight: u16, size_px: f32) -> Self {
        Self {
            family: FontFamily::Monospace,
            weight,
            size_px,
        }
    }

    pub const fn sans(weight: u16, size_px: f32) -> Self {
        Self {
            family: FontFamily::SansSerif,
            weight,
            size_px,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::sans(400, 10.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
}

/// Soft shadow drawn behind glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glow {
    pub color: Rgba,
    pub blur_px: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub color: Rgba,
    pub alpha: f32,
    pub glow: Option<Glow>,
}

impl Paint {
    pub const fn solid(color: Rgba) -> Self {
        Self {
            color,
            alpha: 1.0,
            glow: None,
        }
    }
}

/// A 2D drawing target. Text is vertically centered on `y`.
pub trait DrawSurface {
    fn size(&self) -> Size;

    fn resize(&mut self, size: Size);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);

    fn set_font(&mut self, font: Font);

    /// Advance width of `text` in the current font.
    fn measure_text(&self, text: &str) -> f32;

    fn fill_text(&mut self, text: &str, x: f32, y: f32, align: TextAlign, paint: Paint);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_colors() {
        assert_eq!(Rgba::opaque(0x1e, 0x1e, 0x23).to_css(), "#1e1e23");
        assert_eq!(Rgba::new(251, 191, 36, 0.28).to_css(), "rgba(251, 191, 36, 0.28)");
    }

    #[test]
    fn empty_sizes() {
        assert!(Size::new(0, 10).is_empty());
        assert!(!Size::new(1, 1).is_empty());
        assert_eq!(Size::new(600, 340).to_string(), "600x340");
    }
}
