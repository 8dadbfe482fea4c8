//! Drawing surface contract and a fixed-resolution raster implementation
//!
//! The render pipeline only needs clear, fill-rect and stroke-rect. The
//! raster surface rasterizes those into a pixel buffer that is uploaded as a
//! texture, and tests inspect its pixels directly.

use egui::{Color32, ColorImage, Pos2, Rect, Stroke, Vec2};

/// A 2D target the render pipeline paints into, in surface pixels
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> Vec2;

    /// Reset every pixel to the background
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Color32);

    /// Outline drawn along the inside of `rect`
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);

    /// Outline broken into `dash`-long segments separated by `gap`
    fn stroke_dashed_rect(&mut self, rect: Rect, stroke: Stroke, dash: f32, gap: f32);
}

/// Row-major RGBA pixel buffer
#[derive(Clone, Debug)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    background: Color32,
    pixels: Vec<Color32>,
}

impl RasterSurface {
    pub fn new(width: usize, height: usize, background: Color32) -> Self {
        Self {
            width,
            height,
            background,
            pixels: vec![background; width * height],
        }
    }

    /// Surface dimensions as `[width, height]`
    pub fn dimensions(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    /// Pixel at (x, y), `None` outside the surface
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Pixel under a surface position
    pub fn pixel_at(&self, pos: Pos2) -> Option<Color32> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        self.pixel(pos.x as usize, pos.y as usize)
    }

    /// Copy out as an egui image for texture upload
    pub fn to_color_image(&self) -> ColorImage {
        let rgba: Vec<u8> = self.pixels.iter().flat_map(|c| c.to_array()).collect();
        ColorImage::from_rgba_unmultiplied([self.width, self.height], &rgba)
    }

    /// Pixel span covered by `[min, max)`, rounded so adjacent rects tile exactly
    fn span(min: f32, max: f32, limit: usize) -> (usize, usize) {
        let lo = min.round().max(0.0) as usize;
        let hi = max.round().max(0.0) as usize;
        (lo.min(limit), hi.min(limit))
    }

    fn fill_pixels(&mut self, x0: usize, x1: usize, y0: usize, y1: usize, color: Color32) {
        for y in y0..y1 {
            let row = y * self.width;
            self.pixels[row + x0..row + x1].fill(color);
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        let (x0, x1) = Self::span(rect.min.x, rect.max.x, self.width);
        let (y0, y1) = Self::span(rect.min.y, rect.max.y, self.height);
        if x0 < x1 && y0 < y1 {
            self.fill_pixels(x0, x1, y0, y1, color);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        let w = stroke.width.max(1.0);
        for band in edge_bands(rect, w) {
            self.fill_rect(band, stroke.color);
        }
    }

    fn stroke_dashed_rect(&mut self, rect: Rect, stroke: Stroke, dash: f32, gap: f32) {
        let w = stroke.width.max(1.0);
        let period = (dash + gap).max(1.0);
        let dash = dash.max(1.0);

        // Horizontal edges
        for y in [rect.min.y, rect.max.y - w] {
            let mut x = rect.min.x;
            while x < rect.max.x {
                let seg = Rect::from_min_max(Pos2::new(x, y), Pos2::new((x + dash).min(rect.max.x), y + w));
                self.fill_rect(seg, stroke.color);
                x += period;
            }
        }
        // Vertical edges
        for x in [rect.min.x, rect.max.x - w] {
            let mut y = rect.min.y;
            while y < rect.max.y {
                let seg = Rect::from_min_max(Pos2::new(x, y), Pos2::new(x + w, (y + dash).min(rect.max.y)));
                self.fill_rect(seg, stroke.color);
                y += period;
            }
        }
    }
}

/// Four bands of width `w` lining the inside of `rect`
fn edge_bands(rect: Rect, w: f32) -> [Rect; 4] {
    [
        Rect::from_min_max(rect.min, Pos2::new(rect.max.x, rect.min.y + w)),
        Rect::from_min_max(Pos2::new(rect.min.x, rect.max.y - w), rect.max),
        Rect::from_min_max(rect.min, Pos2::new(rect.min.x + w, rect.max.y)),
        Rect::from_min_max(Pos2::new(rect.max.x - w, rect.min.y), rect.max),
    ]
}
