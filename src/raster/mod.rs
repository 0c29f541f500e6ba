//! Raster layer
//!
//! The drawing core never reads a display directly. It draws through the
//! `Surface` trait and reads ink back through the `InkSampler` trait, which
//! turns a rectangle of pixels into a boolean grid. `Canvas` is the software
//! implementation of both.

pub mod canvas;
pub mod crofton;

pub use canvas::Canvas;
pub use crofton::{CroftonConfig, CroftonEstimator, CroftonFormula, count_transitions};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Pixel rectangle (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whole surface of the given size
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// Rule deciding which pixels count as ink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InkPolicy {
    /// Any non-zero channel
    AnyChannel,
    /// Exactly this colour
    ExactColor(Rgb),
}

impl InkPolicy {
    #[inline]
    pub fn is_ink(&self, pixel: Rgb) -> bool {
        match self {
            InkPolicy::AnyChannel => !pixel.is_zero(),
            InkPolicy::ExactColor(color) => pixel == *color,
        }
    }
}

/// Boolean ink grid, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl InkMask {
    /// All-background mask
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
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

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn row(&self, y: u32) -> &[bool] {
        let start = (y as usize) * (self.width as usize);
        &self.cells[start..start + self.width as usize]
    }

    pub fn column(&self, x: u32) -> impl Iterator<Item = bool> + '_ {
        (0..self.height).map(move |y| self.get(x, y))
    }

    pub fn ink_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Something that can be drawn on
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn fill(&mut self, color: Rgb);
    fn draw_line(&mut self, p1: Vec2, p2: Vec2, color: Rgb, thickness: f32);
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgb);

    /// Connected line strip through `points` (open)
    fn draw_polyline(&mut self, points: &[Vec2], color: Rgb, thickness: f32) {
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], color, thickness);
        }
    }
}

/// Read-back capability feeding the length estimator
pub trait InkSampler {
    fn size(&self) -> (u32, u32);

    /// Boolean ink grid for `rect` (clipped to the surface)
    fn ink_mask(&self, rect: Rect, policy: InkPolicy) -> InkMask;
}
