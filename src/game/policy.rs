//! Pluggable rules for the round state machine
//!
//! Each variation axis between game variants is a trait: where round targets
//! come from, and how deviations order participants.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::ConfigError;

/// Targets for one round, drawn once and fixed for that round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTargets {
    pub pre: f64,
    pub main: f64,
}

/// Source of round targets
pub trait TargetPolicy {
    fn next_targets(&mut self) -> RoundTargets;
}

/// Uniform targets from a fixed range, seeded for reproducibility
#[derive(Debug, Clone)]
pub struct UniformTargets {
    low: f64,
    high: f64,
    rng: Pcg32,
}

impl UniformTargets {
    pub fn new(range: (f64, f64), seed: u64) -> Result<Self, ConfigError> {
        let (low, high) = range;
        if !(low >= 0.0 && high > low) {
            return Err(ConfigError::InvalidTargetRange { low, high });
        }
        Ok(Self {
            low,
            high,
            rng: Pcg32::seed_from_u64(seed),
        })
    }
}

impl TargetPolicy for UniformTargets {
    fn next_targets(&mut self) -> RoundTargets {
        // Whole-pixel targets read better on the HUD
        let pre = self.rng.random_range(self.low..=self.high).round();
        let main = self.rng.random_range(self.low..=self.high).round();
        RoundTargets { pre, main }
    }
}

/// The same targets every round (scripted games and tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedTargets(pub RoundTargets);

impl TargetPolicy for FixedTargets {
    fn next_targets(&mut self) -> RoundTargets {
        self.0
    }
}

/// Orders participants by deviation
///
/// Scores are `(participant, deviation)` pairs.
pub trait RankingPolicy {
    /// Participants best first
    fn rank(&self, scores: &[(usize, f64)]) -> Vec<usize>;

    /// Drawing order for the scored round, derived from the pre-game ranking
    fn play_order(&self, ranked: &[usize]) -> Vec<usize>;

    /// Who leaves after a round, given running totals in ranking order
    fn eliminate(&self, totals: &[(usize, f64)]) -> Option<usize>;
}

/// Smallest deviation ranks first; the best pre-game drawer plays last
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviationRanking;

impl RankingPolicy for DeviationRanking {
    fn rank(&self, scores: &[(usize, f64)]) -> Vec<usize> {
        let mut sorted = scores.to_vec();
        // Stable: equal deviations keep their drawing order
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
        sorted.into_iter().map(|(p, _)| p).collect()
    }

    fn play_order(&self, ranked: &[usize]) -> Vec<usize> {
        let mut order = ranked.to_vec();
        if !order.is_empty() {
            order.rotate_left(1);
        }
        order
    }

    fn eliminate(&self, totals: &[(usize, f64)]) -> Option<usize> {
        // max_by keeps the last of equal maxima
        totals
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|&(p, _)| p)
    }
}

/// Participants with the minimum deviation; ties are all winners
pub fn min_deviation_winners(scores: &[(usize, f64)]) -> Vec<usize> {
    let Some(best) = scores.iter().map(|&(_, d)| d).min_by(f64::total_cmp) else {
        return Vec::new();
    };
    scores
        .iter()
        .filter(|&&(_, d)| d == best)
        .map(|&(p, _)| p)
        .collect()
}
