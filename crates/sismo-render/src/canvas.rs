//! RGB raster with the handful of primitives the plots need.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

use crate::Result;

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// One past the rightmost column.
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom row.
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// True if `(x, y)` lies inside.
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Drawing surface. Out-of-bounds writes are clipped.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// A `width` x `height` canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
        }
    }

    /// Canvas width.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Canvas height.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel colour, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Set one pixel.
    #[inline]
    pub fn put(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if let Some(p) = self.image.get_pixel_mut_checked(x, y) {
            *p = Rgb(color);
        }
    }

    /// Mix `color` into one pixel with coverage `alpha` in `[0, 1]`.
    /// Signed coordinates so text can start off-canvas.
    pub fn blend(&mut self, x: i64, y: i64, color: [u8; 3], alpha: f32) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        let alpha = alpha.clamp(0.0, 1.0);
        if let Some(p) = self.image.get_pixel_mut_checked(x, y) {
            for (dst, src) in p.0.iter_mut().zip(color) {
                let mixed = f32::from(*dst) * (1.0 - alpha) + f32::from(src) * alpha;
                *dst = mixed.round() as u8;
            }
        }
    }

    /// Fill `rect`.
    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 3]) {
        for y in rect.y..rect.bottom().min(self.height()) {
            for x in rect.x..rect.right().min(self.width()) {
                self.put(x, y, color);
            }
        }
    }

    /// Horizontal line over columns `x0..=x1`.
    pub fn hline(&mut self, x0: u32, x1: u32, y: u32, color: [u8; 3]) {
        for x in x0.min(x1)..=x0.max(x1) {
            self.put(x, y, color);
        }
    }

    /// Vertical line over rows `y0..=y1`, in either order.
    pub fn vline(&mut self, x: u32, y0: u32, y1: u32, color: [u8; 3]) {
        for y in y0.min(y1)..=y0.max(y1) {
            self.put(x, y, color);
        }
    }

    /// One-pixel outline just outside `rect`.
    pub fn frame(&mut self, rect: Rect, color: [u8; 3]) {
        let left = rect.x.saturating_sub(1);
        let top = rect.y.saturating_sub(1);
        self.hline(left, rect.right(), top, color);
        self.hline(left, rect.right(), rect.bottom(), color);
        self.vline(left, top, rect.bottom(), color);
        self.vline(rect.right(), top, rect.bottom(), color);
    }

    /// Take the underlying image.
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Encode as an 8-bit RGB PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            self.image.as_raw(),
            self.width(),
            self.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 3] = [255, 0, 0];

    #[test]
    fn drawing_is_clipped() {
        let mut canvas = Canvas::new(10, 5, [0, 0, 0]);
        canvas.hline(5, 40, 2, RED);
        canvas.vline(9, 0, 100, RED);
        canvas.put(50, 50, RED);
        assert_eq!(canvas.pixel(9, 2), Some(RED));
        assert_eq!(canvas.pixel(4, 2), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(10, 2), None);
    }

    #[test]
    fn frame_surrounds_rect() {
        let mut canvas = Canvas::new(10, 10, [0, 0, 0]);
        let rect = Rect::new(2, 2, 5, 5);
        canvas.frame(rect, RED);
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(7, 7), Some(RED));
        assert_eq!(canvas.pixel(4, 4), Some([0, 0, 0]));
        assert!(rect.contains(6, 6));
        assert!(!rect.contains(7, 6));
    }

    #[test]
    fn blending_mixes_and_clips() {
        let mut canvas = Canvas::new(4, 4, [255, 255, 255]);
        canvas.blend(1, 1, [0, 0, 0], 1.0);
        canvas.blend(2, 2, [0, 0, 0], 0.5);
        canvas.blend(-1, 2, [0, 0, 0], 1.0);
        canvas.blend(2, 9, [0, 0, 0], 1.0);
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(2, 2), Some([128, 128, 128]));
        assert_eq!(canvas.pixel(0, 2), Some([255, 255, 255]));
    }

    #[test]
    fn png_signature() {
        let png = Canvas::new(4, 3, [1, 2, 3]).encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
