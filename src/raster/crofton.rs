//! Crofton length estimation
//!
//! Curve length is estimated from pixels alone. Vertical scan lines at
//! x = 0, step, 2·step… and horizontal scan lines at y = 0, step… are laid
//! over the ink mask; every background/ink change along a scan line is one
//! transition. The total transition count `I` feeds a Crofton formula.
//!
//! A thick stroke crossing a scan line produces two transitions (enter and
//! leave). Both formulas below are calibrated against that, not against
//! ideal zero-width crossings, so absolute values run above the true
//! arc length. Scores only ever compare estimates from the same formula.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use super::{InkPolicy, InkSampler, Rect};
use crate::consts::PREVIEW_STEP_FACTOR;
use crate::error::ConfigError;

/// Crofton formula instantiation, fixed for a whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CroftonFormula {
    /// `(π/2) · I · step`
    #[default]
    GridStep,
    /// `(π/2) · ((w + h) / (⌊w/step⌋ + ⌊h/step⌋)) · (I / 2)`
    Normalized,
}

/// Estimator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CroftonConfig {
    pub step: u32,
    pub formula: CroftonFormula,
}

impl Default for CroftonConfig {
    fn default() -> Self {
        Self {
            step: crate::consts::DEFAULT_CROFTON_STEP,
            formula: CroftonFormula::GridStep,
        }
    }
}

/// Number of value changes between neighbouring cells
pub fn count_transitions(line: impl IntoIterator<Item = bool>) -> u64 {
    let mut iter = line.into_iter();
    let Some(mut prev) = iter.next() else {
        return 0;
    };
    let mut count = 0;
    for cell in iter {
        if cell != prev {
            count += 1;
        }
        prev = cell;
    }
    count
}

/// Length estimator bound to one surface size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CroftonEstimator {
    config: CroftonConfig,
    width: u32,
    height: u32,
}

impl CroftonEstimator {
    /// Validates `0 < step <= min(width, height)`
    pub fn new(config: CroftonConfig, width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptySurface { width, height });
        }
        if config.step == 0 || config.step > width.min(height) {
            return Err(ConfigError::InvalidStep {
                step: config.step,
                width,
                height,
            });
        }
        Ok(Self {
            config,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Full estimate: one mask of the whole surface, scan lines every `step` pixels
    pub fn estimate(&self, sampler: &impl InkSampler, policy: InkPolicy) -> f64 {
        self.assert_surface(sampler);
        let mask = sampler.ink_mask(Rect::full(self.width, self.height), policy);

        let step = self.config.step as usize;
        let vertical: u64 = (0..mask.width())
            .step_by(step)
            .map(|x| count_transitions(mask.column(x)))
            .sum();
        let horizontal: u64 = (0..mask.height())
            .step_by(step)
            .map(|y| count_transitions(mask.row(y).iter().copied()))
            .sum();

        self.apply_formula(vertical + horizontal, self.config.step)
    }

    /// Cheap estimate for live feedback
    ///
    /// Reads only the scan lines themselves (one thin rectangle each) at a
    /// coarser spacing. Never use it for scoring.
    pub fn preview(&self, sampler: &impl InkSampler, policy: InkPolicy) -> f64 {
        self.assert_surface(sampler);
        let step = (self.config.step * PREVIEW_STEP_FACTOR).min(self.width.min(self.height));

        let vertical: u64 = (0..self.width)
            .step_by(step as usize)
            .map(|x| {
                let scan = sampler.ink_mask(Rect::new(x, 0, 1, self.height), policy);
                count_transitions(scan.column(0))
            })
            .sum();
        let horizontal: u64 = (0..self.height)
            .step_by(step as usize)
            .map(|y| {
                let scan = sampler.ink_mask(Rect::new(0, y, self.width, 1), policy);
                count_transitions(scan.row(0).iter().copied())
            })
            .sum();

        self.apply_formula(vertical + horizontal, step)
    }

    /// A sampler of another size would score a different picture
    fn assert_surface(&self, sampler: &impl InkSampler) {
        assert_eq!(
            sampler.size(),
            (self.width, self.height),
            "ink sampler must match the estimator's surface"
        );
    }

    fn apply_formula(&self, intersections: u64, step: u32) -> f64 {
        let i = intersections as f64;
        match self.config.formula {
            CroftonFormula::GridStep => FRAC_PI_2 * i * step as f64,
            CroftonFormula::Normalized => {
                let scan_extent = (self.width + self.height) as f64;
                let scan_lines = (self.width / step + self.height / step) as f64;
                FRAC_PI_2 * (scan_extent / scan_lines) * (i / 2.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Canvas, InkMask, Rgb, Surface};
    use glam::Vec2;
    use proptest::prelude::*;

    fn estimator(step: u32) -> CroftonEstimator {
        CroftonEstimator::new(
            CroftonConfig {
                step,
                formula: CroftonFormula::GridStep,
            },
            800,
            600,
        )
        .unwrap()
    }

    fn circle_points(center: Vec2, radius: f32, n: usize) -> Vec<Vec2> {
        (0..=n)
            .map(|i| {
                let t = i as f32 / n as f32 * std::f32::consts::TAU;
                center + Vec2::new(t.cos(), t.sin()) * radius
            })
            .collect()
    }

    struct MaskSampler(InkMask);

    impl InkSampler for MaskSampler {
        fn size(&self) -> (u32, u32) {
            (self.0.width(), self.0.height())
        }

        fn ink_mask(&self, rect: Rect, _policy: InkPolicy) -> InkMask {
            InkMask::from_fn(rect.width, rect.height, |x, y| self.0.get(rect.x + x, rect.y + y))
        }
    }

    #[test]
    fn test_count_transitions() {
        assert_eq!(count_transitions([false, false, false]), 0);
        assert_eq!(count_transitions([false, true, true, false]), 2);
        assert_eq!(count_transitions([true, false, true]), 2);
        assert_eq!(count_transitions(std::iter::empty()), 0);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let cfg = |step| CroftonConfig {
            step,
            formula: CroftonFormula::GridStep,
        };
        assert!(matches!(
            CroftonEstimator::new(cfg(0), 800, 600),
            Err(ConfigError::InvalidStep { .. })
        ));
        assert!(CroftonEstimator::new(cfg(601), 800, 600).is_err());
        assert!(CroftonEstimator::new(cfg(600), 800, 600).is_ok());
        assert!(matches!(
            CroftonEstimator::new(cfg(1), 0, 600),
            Err(ConfigError::EmptySurface { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "ink sampler must match")]
    fn test_estimate_rejects_mismatched_surface() {
        let mut canvas = Canvas::new(400, 300);
        canvas.draw_line(Vec2::new(10.0, 150.0), Vec2::new(390.0, 150.0), Rgb::WHITE, 3.0);
        estimator(10).estimate(&canvas, InkPolicy::AnyChannel);
    }

    #[test]
    #[should_panic(expected = "ink sampler must match")]
    fn test_preview_rejects_mismatched_surface() {
        let canvas = Canvas::new(400, 300);
        estimator(10).preview(&canvas, InkPolicy::AnyChannel);
    }

    #[test]
    fn test_blank_canvas_is_zero() {
        let canvas = Canvas::new(800, 600);
        assert_eq!(estimator(10).estimate(&canvas, InkPolicy::AnyChannel), 0.0);
        assert_eq!(estimator(10).preview(&canvas, InkPolicy::AnyChannel), 0.0);
    }

    #[test]
    fn test_horizontal_line_grid_step() {
        let mut canvas = Canvas::new(800, 600);
        canvas.draw_line(Vec2::new(100.0, 305.0), Vec2::new(500.0, 305.0), Rgb::WHITE, 3.0);
        // Columns 100..=500 each cross twice; no row scan line touches y 304..=306
        let est = estimator(10).estimate(&canvas, InkPolicy::AnyChannel);
        let expected = FRAC_PI_2 * 82.0 * 10.0;
        assert!((est - expected).abs() < 1e-9, "got {est}");
    }

    #[test]
    fn test_normalized_formula() {
        let mut canvas = Canvas::new(800, 600);
        canvas.draw_line(Vec2::new(100.0, 305.0), Vec2::new(500.0, 305.0), Rgb::WHITE, 3.0);
        let est = CroftonEstimator::new(
            CroftonConfig {
                step: 10,
                formula: CroftonFormula::Normalized,
            },
            800,
            600,
        )
        .unwrap()
        .estimate(&canvas, InkPolicy::AnyChannel);
        // (π/2) * (1400 / 140) * (82 / 2)
        let expected = FRAC_PI_2 * 10.0 * 41.0;
        assert!((est - expected).abs() < 1e-9, "got {est}");
    }

    #[test]
    fn test_estimate_scales_with_shape() {
        let est = estimator(10);
        let mut small = Canvas::new(800, 600);
        small.draw_polyline(&circle_points(Vec2::new(400.0, 300.0), 60.0, 360), Rgb::WHITE, 3.0);
        let mut large = Canvas::new(800, 600);
        large.draw_polyline(&circle_points(Vec2::new(400.0, 300.0), 120.0, 360), Rgb::WHITE, 3.0);

        let a = est.estimate(&small, InkPolicy::AnyChannel);
        let b = est.estimate(&large, InkPolicy::AnyChannel);
        let ratio = b / a;
        assert!((ratio - 2.0).abs() < 0.3, "ratio {ratio}");
    }

    #[test]
    fn test_exact_color_policy_ignores_other_ink() {
        let mut canvas = Canvas::new(800, 600);
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);
        canvas.draw_line(Vec2::new(100.0, 105.0), Vec2::new(500.0, 105.0), red, 3.0);
        canvas.draw_line(Vec2::new(100.0, 405.0), Vec2::new(500.0, 405.0), blue, 3.0);
        let est = estimator(10);
        let both = est.estimate(&canvas, InkPolicy::AnyChannel);
        let red_only = est.estimate(&canvas, InkPolicy::ExactColor(red));
        assert!((both - 2.0 * red_only).abs() < 1e-9);
    }

    #[test]
    fn test_preview_tracks_full_estimate() {
        let mut canvas = Canvas::new(800, 600);
        canvas.draw_polyline(&circle_points(Vec2::new(400.0, 300.0), 150.0, 360), Rgb::WHITE, 3.0);
        let est = estimator(10);
        let full = est.estimate(&canvas, InkPolicy::AnyChannel);
        let preview = est.preview(&canvas, InkPolicy::AnyChannel);
        assert!(preview > 0.0);
        assert!((preview / full - 1.0).abs() < 0.35, "full {full} preview {preview}");
    }

    #[test]
    fn test_custom_sampler() {
        // Vertical bar at x = 5..7 on a 20x20 mask
        let mask = InkMask::from_fn(20, 20, |x, _| (5..8).contains(&x));
        let est = CroftonEstimator::new(
            CroftonConfig {
                step: 10,
                formula: CroftonFormula::GridStep,
            },
            20,
            20,
        )
        .unwrap();
        // Rows 0 and 10 each cross the bar twice
        let value = est.estimate(&MaskSampler(mask), InkPolicy::AnyChannel);
        assert!((value - FRAC_PI_2 * 4.0 * 10.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_blank_mask_is_zero(step in 1u32..=60, w in 60u32..200, h in 60u32..200) {
            let est = CroftonEstimator::new(
                CroftonConfig { step, formula: CroftonFormula::Normalized },
                w,
                h,
            ).unwrap();
            let sampler = MaskSampler(InkMask::blank(w, h));
            prop_assert_eq!(est.estimate(&sampler, InkPolicy::AnyChannel), 0.0);
        }

        #[test]
        fn prop_estimate_non_negative(x0 in 0.0f32..200.0, y0 in 0.0f32..200.0, x1 in 0.0f32..200.0, y1 in 0.0f32..200.0) {
            let mut canvas = Canvas::new(200, 200);
            canvas.draw_line(Vec2::new(x0, y0), Vec2::new(x1, y1), Rgb::WHITE, 3.0);
            let est = CroftonEstimator::new(CroftonConfig::default(), 200, 200).unwrap();
            prop_assert!(est.estimate(&canvas, InkPolicy::AnyChannel) >= 0.0);
        }
    }
}
