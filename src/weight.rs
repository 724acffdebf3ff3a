//! Target weights, tolerance bands and the two-decimal rounding used on
//! every committed weight.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TARGET_MIN: f64 = 0.5;
pub const DEFAULT_TARGET_MAX: f64 = 100.0;
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Rounds half-up to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Required weight in grams, always carrying at most two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TargetWeight(f64);

impl TargetWeight {
    /// Rounds `grams` to two decimals. Callers outside the generator use this
    /// for fixed scenarios.
    pub fn new(grams: f64) -> Self {
        Self(round2(grams.max(0.0)))
    }

    pub fn grams(self) -> f64 {
        self.0
    }

    pub fn band(self, tolerance: f64) -> ToleranceBand {
        ToleranceBand::around(self, tolerance)
    }
}

impl fmt::Display for TargetWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}g", self.0)
    }
}

/// Inclusive acceptance range around a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBand {
    pub lower: f64,
    pub upper: f64,
}

impl ToleranceBand {
    pub fn around(target: TargetWeight, tolerance: f64) -> Self {
        let margin = target.grams() * tolerance;
        Self {
            lower: target.grams() - margin,
            upper: target.grams() + margin,
        }
    }

    pub fn contains(&self, weight: f64) -> bool {
        weight >= self.lower && weight <= self.upper
    }

    /// A band collapsed onto zero cannot be reached by positive increments.
    pub fn is_degenerate(&self) -> bool {
        self.upper <= 0.0
    }
}

impl Default for ToleranceBand {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 0.0,
        }
    }
}

/// Display-only progress in percent, clamped to `0..=100`. Zero target yields 0.
pub fn progress_percent(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

/// Draws a target weight once per approval.
#[derive(Debug)]
pub struct WeightTargetGenerator<R> {
    rng: R,
    min: f64,
    max: f64,
}

impl<R: Rng> WeightTargetGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self::with_range(rng, DEFAULT_TARGET_MIN, DEFAULT_TARGET_MAX)
    }

    /// `min` must be strictly less than `max` with at least one representable
    /// two-decimal value between them; config validation enforces this.
    pub fn with_range(rng: R, min: f64, max: f64) -> Self {
        Self { rng, min, max }
    }

    /// Uniform draw over `[min, max)` rounded to two decimals. Draws that round
    /// onto an endpoint are redrawn so the result stays strictly inside.
    pub fn generate(&mut self) -> TargetWeight {
        loop {
            let raw = self.rng.random::<f64>() * (self.max - self.min) + self.min;
            let rounded = round2(raw);
            if rounded > self.min && rounded < self.max {
                return TargetWeight(rounded);
            }
        }
    }
}

/// Source of the target weight drawn on approval.
pub trait TargetSource: Send {
    fn next_target(&mut self) -> TargetWeight;
}

impl<R: Rng + Send> TargetSource for WeightTargetGenerator<R> {
    fn next_target(&mut self) -> TargetWeight {
        self.generate()
    }
}

/// Always yields the same target. Used for fixed scenarios.
#[derive(Debug, Clone, Copy)]
pub struct FixedTarget(pub TargetWeight);

impl TargetSource for FixedTarget {
    fn next_target(&mut self) -> TargetWeight {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(9.404), 9.4);
        assert_eq!(round2(10.126), 10.13);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(9.4 + 0.4), 9.8);
        assert_eq!(round2(9.8 + 0.4), 10.2);
    }

    #[test]
    fn test_band_for_ten_grams() {
        let band = TargetWeight::new(10.0).band(DEFAULT_TOLERANCE);
        assert!((band.lower - 9.5).abs() < 1e-9);
        assert!((band.upper - 10.5).abs() < 1e-9);
        assert!(band.contains(9.5));
        assert!(band.contains(10.5));
        assert!(!band.contains(9.49));
        assert!(!band.contains(10.51));
        assert!(!band.is_degenerate());
    }

    #[test]
    fn test_zero_target_is_degenerate() {
        let band = TargetWeight::new(0.0).band(DEFAULT_TOLERANCE);
        assert_eq!(band, ToleranceBand::default());
        assert!(band.is_degenerate());
        assert_eq!(progress_percent(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_progress_percent_clamps() {
        assert_eq!(progress_percent(5.0, 10.0), 50.0);
        assert_eq!(progress_percent(12.0, 10.0), 100.0);
        assert_eq!(progress_percent(0.0, 10.0), 0.0);
    }

    #[test]
    fn test_generated_targets_stay_inside_open_range() {
        let mut generator = WeightTargetGenerator::new(StdRng::seed_from_u64(99));
        for _ in 0..1_000 {
            let target = generator.generate().grams();
            assert!(target > DEFAULT_TARGET_MIN && target < DEFAULT_TARGET_MAX);
            assert_eq!(round2(target), target);
        }
    }
}
