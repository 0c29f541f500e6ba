//! Spectral stroke smoothing
//!
//! The x and y channels of a stroke are treated as two independent discrete
//! signals. Each is transformed to the frequency domain, every coefficient
//! outside the lowest band is zeroed, and the inverse transform's real part
//! becomes the smoothed coordinate.
//!
//! The band is symmetric: `keep` bins at the low end and `keep` bins at the
//! high end (the negative frequencies of a real signal). Endpoints are not
//! preserved; the filter treats the stroke as periodic.

use glam::Vec2;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Number of bins kept at each end of the spectrum
pub fn kept_bins(n: usize, keep_fraction: f64) -> usize {
    let keep = (n as f64 * keep_fraction / 2.0).floor() as usize;
    keep.max(1)
}

/// Low-pass filter a stroke, returning the same number of points
pub fn smooth(points: &[Vec2], keep_fraction: f64) -> Vec<Vec2> {
    let n = points.len();
    if n <= 1 {
        return points.to_vec();
    }

    let keep = kept_bins(n, keep_fraction);
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let filter_channel = |channel: fn(&Vec2) -> f32| -> Vec<f64> {
        let mut buf: Vec<Complex<f64>> = points
            .iter()
            .map(|p| Complex::new(channel(p) as f64, 0.0))
            .collect();
        forward.process(&mut buf);

        // Zero the middle of the spectrum: bins [keep, n - keep)
        if 2 * keep < n {
            for bin in &mut buf[keep..n - keep] {
                *bin = Complex::new(0.0, 0.0);
            }
        }

        inverse.process(&mut buf);
        // rustfft's inverse is unnormalized
        let scale = 1.0 / n as f64;
        buf.iter().map(|c| c.re * scale).collect()
    };

    let xs = filter_channel(|p| p.x);
    let ys = filter_channel(|p| p.y);

    xs.into_iter()
        .zip(ys)
        .map(|(x, y)| Vec2::new(x as f32, y as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_stroke() {
        assert!(smooth(&[], 0.1).is_empty());
    }

    #[test]
    fn test_kept_bins_floor_to_one() {
        assert_eq!(kept_bins(10, 0.05), 1);
        assert_eq!(kept_bins(100, 0.1), 5);
        assert_eq!(kept_bins(400, 0.05), 10);
    }

    #[test]
    fn test_same_cardinality() {
        let points: Vec<Vec2> = (0..37)
            .map(|i| Vec2::new(i as f32, (i as f32 * 0.3).sin() * 20.0))
            .collect();
        assert_eq!(smooth(&points, 0.05).len(), 37);
    }

    #[test]
    fn test_straight_line_stays_on_line() {
        // 100 evenly spaced samples of y = 2x + 1
        let points: Vec<Vec2> = (0..100)
            .map(|i| {
                let x = 100.0 + i as f32 * 4.0;
                Vec2::new(x, 2.0 * x + 1.0)
            })
            .collect();
        let smoothed = smooth(&points, 0.1);
        assert_eq!(smoothed.len(), points.len());

        // Perpendicular distance from the line 2x - y + 1 = 0
        let norm = (2.0f32 * 2.0 + 1.0).sqrt();
        for p in &smoothed {
            let dist = (2.0 * p.x - p.y + 1.0).abs() / norm;
            assert!(dist < 0.05, "point {p:?} is {dist} off the line");
        }
    }

    #[test]
    fn test_removes_high_frequency_jitter() {
        // Slow circle plus alternating jitter
        let n = 200;
        let points: Vec<Vec2> = (0..n)
            .map(|i| {
                let t = i as f32 / n as f32 * std::f32::consts::TAU;
                let jitter = if i % 2 == 0 { 3.0 } else { -3.0 };
                Vec2::new(300.0 + 100.0 * t.cos() + jitter, 300.0 + 100.0 * t.sin())
            })
            .collect();
        let smoothed = smooth(&points, 0.05);
        for (i, p) in smoothed.iter().enumerate() {
            let t = i as f32 / n as f32 * std::f32::consts::TAU;
            let clean = Vec2::new(300.0 + 100.0 * t.cos(), 300.0 + 100.0 * t.sin());
            assert!(p.distance(clean) < 0.5);
        }
    }

    #[test]
    fn test_mean_preserved() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 3.0),
            Vec2::new(4.0, 8.0),
        ];
        // keep = max(1, floor(0.9 * 3 / 2)) = 1; 2 * 1 < 3 so one bin is zeroed
        let smoothed = smooth(&points, 0.9);
        assert_eq!(smoothed.len(), 3);
        // Mean (DC bin) is preserved
        let mean_in: Vec2 = points.iter().copied().sum::<Vec2>() / 3.0;
        let mean_out: Vec2 = smoothed.iter().copied().sum::<Vec2>() / 3.0;
        assert!(mean_in.distance(mean_out) < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_short_strokes_unchanged(
            pts in proptest::collection::vec((-1000.0f32..1000.0, -1000.0f32..1000.0), 0..=1),
            keep in 0.001f64..0.999,
        ) {
            let points: Vec<Vec2> = pts.into_iter().map(|(x, y)| Vec2::new(x, y)).collect();
            prop_assert_eq!(smooth(&points, keep), points);
        }

        #[test]
        fn prop_cardinality_preserved(n in 0usize..300, keep in 0.001f64..0.999) {
            let points: Vec<Vec2> = (0..n).map(|i| Vec2::new(i as f32, (i * i % 17) as f32)).collect();
            prop_assert_eq!(smooth(&points, keep).len(), n);
        }
    }
}
