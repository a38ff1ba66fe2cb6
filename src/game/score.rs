//! Distance to points conversion.

use crate::config::game::GameConfig;

/// Linear decay: `max(0, base - floor(distance_km * penalty))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCalculator {
    pub base_score: u32,
    pub distance_penalty: f64,
}

impl ScoreCalculator {
    pub fn new(base_score: u32, distance_penalty: f64) -> Self {
        Self {
            base_score,
            distance_penalty,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.base_score, config.distance_penalty)
    }

    pub fn score(&self, distance_km: f64) -> u32 {
        if distance_km.is_nan() {
            return 0;
        }
        let lost = (distance_km.max(0.0) * self.distance_penalty).floor();
        if !(lost < f64::from(self.base_score)) {
            return 0;
        }
        self.base_score - lost as u32
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_guess_scores_base() {
        assert_eq!(ScoreCalculator::default().score(0.0), 5000);
    }

    #[test]
    fn test_linear_decay() {
        let calc = ScoreCalculator::default();
        assert_eq!(calc.score(1.0), 4990);
        assert_eq!(calc.score(0.15), 4999);
        assert_eq!(calc.score(250.0), 2500);
    }

    #[test]
    fn test_zero_beyond_threshold() {
        let calc = ScoreCalculator::default();
        assert_eq!(calc.score(500.0), 0);
        assert_eq!(calc.score(501.3), 0);
        assert_eq!(calc.score(20_000.0), 0);
    }

    #[test]
    fn test_non_increasing_in_distance() {
        let calc = ScoreCalculator::new(5000, 1.0);
        let mut previous = calc.score(0.0);
        let mut d = 0.0;
        while d < 6000.0 {
            let current = calc.score(d);
            assert!(current <= previous, "score rose at {d}");
            previous = current;
            d += 7.3;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_degenerate_distances_score_zero() {
        let calc = ScoreCalculator::default();
        assert_eq!(calc.score(f64::NAN), 0);
        assert_eq!(calc.score(f64::INFINITY), 0);
    }

    #[test]
    fn test_zero_penalty_always_scores_base() {
        let calc = ScoreCalculator::new(100, 0.0);
        assert_eq!(calc.score(12_345.0), 100);
    }
}
