// Weight increment sources for the dispensing simulator

use rand::Rng;
use std::collections::VecDeque;

pub const DEFAULT_INCREMENT_MIN: f64 = 0.1;
pub const DEFAULT_INCREMENT_MAX: f64 = 0.6;

/// Supplies the weight gained on each dispensing tick.
pub trait WeightSampler: Send {
    fn next_increment(&mut self) -> f64;
}

/// Uniform increments over `[min, max)` grams.
#[derive(Debug)]
pub struct RandomIncrements<R> {
    rng: R,
    min: f64,
    max: f64,
}

impl<R: Rng> RandomIncrements<R> {
    pub fn new(rng: R) -> Self {
        Self::with_range(rng, DEFAULT_INCREMENT_MIN, DEFAULT_INCREMENT_MAX)
    }

    pub fn with_range(rng: R, min: f64, max: f64) -> Self {
        Self { rng, min, max }
    }
}

impl<R: Rng + Send> WeightSampler for RandomIncrements<R> {
    fn next_increment(&mut self) -> f64 {
        self.rng.random_range(self.min..self.max)
    }
}

/// Replays a fixed list of increments, then repeats `fallback` forever.
#[derive(Debug, Clone)]
pub struct ScriptedIncrements {
    queue: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedIncrements {
    pub fn new(increments: impl IntoIterator<Item = f64>) -> Self {
        Self {
            queue: increments.into_iter().collect(),
            fallback: DEFAULT_INCREMENT_MIN,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }
}

impl WeightSampler for ScriptedIncrements {
    fn next_increment(&mut self) -> f64 {
        self.queue.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_increments_within_range() {
        let mut sampler = RandomIncrements::new(StdRng::seed_from_u64(5));
        for _ in 0..1_000 {
            let inc = sampler.next_increment();
            assert!((DEFAULT_INCREMENT_MIN..DEFAULT_INCREMENT_MAX).contains(&inc));
        }
    }

    #[test]
    fn test_scripted_increments_replay_then_fallback() {
        let mut sampler = ScriptedIncrements::new([1.0, 2.0]).with_fallback(0.25);
        assert_eq!(sampler.next_increment(), 1.0);
        assert_eq!(sampler.next_increment(), 2.0);
        assert_eq!(sampler.next_increment(), 0.25);
        assert_eq!(sampler.next_increment(), 0.25);
    }
}
