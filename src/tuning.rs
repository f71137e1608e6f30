//! Data-driven level generation tuning
//!
//! Every random range used by the generator is a [`Span`] with a strictly
//! positive minimum, so zero-width gaps or platforms cannot be drawn.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;

/// Inclusive `[min, max]` range for a random draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub fn new(min: f32, max: f32) -> Result<Self, ConfigError> {
        let span = Self { min, max };
        span.check("span")?;
        Ok(span)
    }

    fn check(&self, name: &str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::Invalid(format!("{name}: bounds must be finite")));
        }
        if self.min <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{name}: minimum must be positive, got {}",
                self.min
            )));
        }
        if self.max < self.min {
            return Err(ConfigError::Invalid(format!(
                "{name}: max {} is below min {}",
                self.max, self.min
            )));
        }
        Ok(())
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        rng.random_range(self.min..=self.max)
    }
}

/// Relative weights of the three enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyWeights {
    pub patrol: f32,
    pub floater: f32,
    pub seeker: f32,
}

impl EnemyWeights {
    pub fn total(&self) -> f32 {
        self.patrol + self.floater + self.seeker
    }
}

/// Tunables for [`crate::sim::LevelGenerator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorTuning {
    /// Platforms emitted per chunk
    pub segments_per_chunk: u32,
    /// Horizontal gap before each platform
    pub gap: Span,
    pub width: Span,
    pub platform_height: f32,
    /// Platform top, measured up from the bottom of the view
    pub rise: Span,
    pub jump_pad_chance: f64,
    pub hazard_chance: f64,
    /// Platforms must be wider than this to carry an enemy
    pub enemy_min_width: f32,
    pub enemy_chance: f64,
    pub enemy_weights: EnemyWeights,
    /// Platforms must be wider than this to carry coins
    pub coin_min_width: f32,
    pub coin_chance: f64,
    /// Chance that a coin spawn is a single coin rather than a row of three
    pub single_coin_chance: f64,
    pub health_chance: f64,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        Self {
            segments_per_chunk: 10,
            gap: Span {
                min: 120.0,
                max: 240.0,
            },
            width: Span {
                min: 150.0,
                max: 450.0,
            },
            platform_height: 40.0,
            rise: Span {
                min: 100.0,
                max: 300.0,
            },
            jump_pad_chance: 0.10,
            hazard_chance: 0.15,
            enemy_min_width: 150.0,
            enemy_chance: 0.5,
            enemy_weights: EnemyWeights {
                patrol: 0.3,
                floater: 0.3,
                seeker: 0.4,
            },
            coin_min_width: 80.0,
            coin_chance: 0.6,
            single_coin_chance: 0.5,
            health_chance: 0.05,
        }
    }
}

impl GeneratorTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segments_per_chunk == 0 {
            return Err(ConfigError::Invalid("segments_per_chunk must be at least 1".into()));
        }
        self.gap.check("gap")?;
        self.width.check("width")?;
        self.rise.check("rise")?;
        if !(self.platform_height > 0.0) {
            return Err(ConfigError::Invalid("platform_height must be positive".into()));
        }

        for (name, p) in [
            ("jump_pad_chance", self.jump_pad_chance),
            ("hazard_chance", self.hazard_chance),
            ("enemy_chance", self.enemy_chance),
            ("coin_chance", self.coin_chance),
            ("single_coin_chance", self.single_coin_chance),
            ("health_chance", self.health_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {p}")));
            }
        }

        let w = self.enemy_weights;
        if w.patrol < 0.0 || w.floater < 0.0 || w.seeker < 0.0 || !(w.total() > 0.0) {
            return Err(ConfigError::Invalid(
                "enemy weights must be non-negative with a positive total".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GeneratorTuning::default().validate().is_ok());
    }

    #[test]
    fn test_span_rejects_degenerate_ranges() {
        assert!(Span::new(0.0, 10.0).is_err());
        assert!(Span::new(-5.0, 10.0).is_err());
        assert!(Span::new(10.0, 5.0).is_err());
        assert!(Span::new(f32::NAN, 5.0).is_err());
        assert!(Span::new(5.0, 5.0).is_ok());
    }

    #[test]
    fn test_span_sample_stays_in_range() {
        let span = Span::new(120.0, 240.0).unwrap();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = span.sample(&mut rng);
            assert!((120.0..=240.0).contains(&v));
        }
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let tuning = GeneratorTuning {
            hazard_chance: 1.5,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_enemy_weights_rejected() {
        let tuning = GeneratorTuning {
            enemy_weights: EnemyWeights {
                patrol: 0.0,
                floater: 0.0,
                seeker: 0.0,
            },
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }
}
