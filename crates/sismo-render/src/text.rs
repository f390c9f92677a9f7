//! Text rasterization with the bundled Ubuntu Light face.

use ab_glyph::{Font, FontRef, GlyphId, PxScale, ScaleFont, point};

use crate::canvas::Canvas;
use crate::{Error, Result};

/// Glyph coverage for one line of text, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl Label {
    /// Width of the line box in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the line box (ascent plus descent) in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at `(x, y)` inside the line box, 0 outside.
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.coverage[(y * self.width + x) as usize]
    }

    /// Draw with the line box's top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut Canvas, x: i64, y: i64, color: [u8; 3]) {
        for ly in 0..self.height {
            for lx in 0..self.width {
                let alpha = self.coverage(lx, ly);
                if alpha > 0.0 {
                    canvas.blend(x + i64::from(lx), y + i64::from(ly), color, alpha);
                }
            }
        }
    }

    /// Draw rotated a quarter turn counter-clockwise, reading bottom to top.
    ///
    /// The rotated box is `height` wide and `width` tall, with its top-left
    /// corner at `(x, y)`.
    pub fn draw_rotated(&self, canvas: &mut Canvas, x: i64, y: i64, color: [u8; 3]) {
        for ly in 0..self.height {
            for lx in 0..self.width {
                let alpha = self.coverage(lx, ly);
                if alpha > 0.0 {
                    let cx = x + i64::from(ly);
                    let cy = y + i64::from(self.width - 1 - lx);
                    canvas.blend(cx, cy, color, alpha);
                }
            }
        }
    }
}

/// Lays out and rasterizes single lines of text.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    font: FontRef<'static>,
}

impl TextRenderer {
    /// Load the bundled face.
    pub fn new() -> Result<Self> {
        let font = FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)
            .map_err(|e| Error::render(format!("bundled font is unreadable: {e}")))?;
        Ok(Self { font })
    }

    /// Rasterize `text` at a pixel height of `px`.
    pub fn rasterize(&self, text: &str, px: f32) -> Label {
        let scale = PxScale::from(px);
        let scaled = self.font.as_scaled(scale);
        let ascent = scaled.ascent();
        let height = (ascent - scaled.descent()).ceil().max(0.0) as u32;

        let mut caret = 0.0f32;
        let mut previous: Option<GlyphId> = None;
        let mut glyphs = Vec::with_capacity(text.len());
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, ascent)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        let width = caret.ceil().max(0.0) as u32;

        let mut coverage = vec![0.0f32; (width * height) as usize];
        for glyph in glyphs {
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let x = bounds.min.x as i64 + i64::from(gx);
                let y = bounds.min.y as i64 + i64::from(gy);
                if (0..i64::from(width)).contains(&x) && (0..i64::from(height)).contains(&y) {
                    let cell = &mut coverage[(y as u32 * width + x as u32) as usize];
                    *cell = (*cell + c).min(1.0);
                }
            });
        }

        Label {
            width,
            height,
            coverage,
        }
    }
}
