//! Software RGB canvas
//!
//! Lines are rasterized by coverage: a pixel is painted when its centre lies
//! within `thickness / 2` of the segment. That gives round caps and joins for
//! free, which matches how thick strokes look on screen.

use glam::Vec2;

use super::{InkMask, InkPolicy, InkSampler, Rect, Rgb, Surface};

/// RGB pixel buffer
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Canvas {
    /// Black canvas of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixels, row-major
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = color;
        }
    }

    /// Paint every pixel in the bounding box whose centre passes `inside`
    fn paint_region(&mut self, min: Vec2, max: Vec2, color: Rgb, inside: impl Fn(Vec2) -> bool) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.width - 1);
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.height - 1);
        if min.x > (self.width - 1) as f32 || min.y > (self.height - 1) as f32 {
            return;
        }

        for y in y0..=y1 {
            for x in x0..=x1 {
                if inside(Vec2::new(x as f32, y as f32)) {
                    let idx = self.index(x, y);
                    self.pixels[idx] = color;
                }
            }
        }
    }
}

/// Distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    fn draw_line(&mut self, p1: Vec2, p2: Vec2, color: Rgb, thickness: f32) {
        let half = (thickness * 0.5).max(0.5);
        let pad = Vec2::splat(half);
        self.paint_region(p1.min(p2) - pad, p1.max(p2) + pad, color, |p| {
            distance_to_segment(p, p1, p2) <= half
        });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgb) {
        let pad = Vec2::splat(radius);
        self.paint_region(center - pad, center + pad, color, |p| {
            p.distance(center) <= radius
        });
    }
}

impl InkSampler for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn ink_mask(&self, rect: Rect, policy: InkPolicy) -> InkMask {
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let w = rect.width.min(self.width - x0);
        let h = rect.height.min(self.height - y0);
        InkMask::from_fn(w, h, |x, y| policy.is_ink(self.pixel(x0 + x, y0 + y)))
    }
}
