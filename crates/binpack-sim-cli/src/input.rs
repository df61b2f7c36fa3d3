//! Input providers: manual lists, seeded random generation and YAML config files.

use std::fs;
use std::path::Path;

use anyhow::Context;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Items used when neither `--items` nor `--random` nor a config file provides any.
pub const DEMO_ITEMS: [f64; 6] = [0.5, 0.4, 0.6, 0.2, 0.8, 0.3];

/// Seeded uniform generator for item sizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomSpec {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_min")]
    pub min: f64,
    #[serde(default = "default_max")]
    pub max: f64,
    /// Sizes are rounded to this many decimals.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

impl Default for RandomSpec {
    fn default() -> Self {
        Self {
            count: default_count(),
            seed: default_seed(),
            min: default_min(),
            max: default_max(),
            decimals: default_decimals(),
        }
    }
}

fn default_count() -> usize {
    10
}
fn default_seed() -> u64 {
    42
}
fn default_min() -> f64 {
    0.15
}
fn default_max() -> f64 {
    0.7
}
fn default_decimals() -> u32 {
    2
}

pub const MAX_RANDOM_ITEMS: usize = 1000;
const MAX_DECIMALS: u32 = 6;

impl RandomSpec {
    pub fn check(&self) -> anyhow::Result<()> {
        if self.count == 0 || self.count > MAX_RANDOM_ITEMS {
            anyhow::bail!(
                "random count must be in 1..={} (got {})",
                MAX_RANDOM_ITEMS,
                self.count
            );
        }
        if !(self.min > 0.0 && self.min <= self.max && self.max <= 1.0) {
            anyhow::bail!(
                "random range must satisfy 0 < min <= max <= 1 (got {}..={})",
                self.min,
                self.max
            );
        }
        if self.decimals > MAX_DECIMALS {
            anyhow::bail!("decimals must be <= {} (got {})", MAX_DECIMALS, self.decimals);
        }
        Ok(())
    }

    /// Draws `count` sizes. The same spec always yields the same sizes.
    pub fn generate(&self) -> Vec<f64> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
        let scale = 10f64.powi(self.decimals as i32);
        // rounding must never produce 0.0
        let smallest = 1.0 / scale;
        (0..self.count)
            .map(|_| {
                let v: f64 = rng.gen_range(self.min..=self.max);
                ((v * scale).round() / scale).clamp(smallest, 1.0)
            })
            .collect()
    }
}

/// Where the item sizes of a run come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemSource {
    Manual { items: Vec<f64> },
    Random(RandomSpec),
    Demo,
}

impl ItemSource {
    pub fn sizes(&self) -> anyhow::Result<Vec<f64>> {
        match self {
            ItemSource::Manual { items } => Ok(items.clone()),
            ItemSource::Random(spec) => {
                spec.check()?;
                Ok(spec.generate())
            }
            ItemSource::Demo => Ok(DEMO_ITEMS.to_vec()),
        }
    }
}

/// Merged settings after CLI flags and the optional YAML file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Settings {
    /// Raw algorithm code; validated together with the sizes.
    pub algorithm: String,
    pub source: ItemSource,
    pub parallel: bool,
}

/// YAML config file. Every field is optional; set fields override CLI values en bloc.
#[derive(Debug, Deserialize, Default)]
pub struct YamlConfig {
    algorithm: Option<String>,
    items: Option<Vec<f64>>,
    random: Option<RandomSpec>,
    parallel: Option<bool>,
}

impl YamlConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(y)
    }

    pub fn apply(self, mut settings: Settings) -> anyhow::Result<Settings> {
        if let Some(v) = self.algorithm {
            settings.algorithm = v;
        }
        match (self.items, self.random) {
            (Some(_), Some(_)) => anyhow::bail!("config sets both `items` and `random`"),
            (Some(items), None) => settings.source = ItemSource::Manual { items },
            (None, Some(spec)) => settings.source = ItemSource::Random(spec),
            (None, None) => {}
        }
        if let Some(v) = self.parallel {
            settings.parallel = v;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_generation_is_seeded_and_rounded() {
        let spec = RandomSpec::default();
        let a = spec.generate();
        let b = spec.generate();
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        for v in &a {
            assert!(*v >= 0.15 && *v <= 0.7, "out of range: {v}");
            assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-9);
        }
        let other = RandomSpec {
            seed: 43,
            ..RandomSpec::default()
        };
        assert_ne!(other.generate(), a);
    }

    #[test]
    fn rounding_never_yields_zero() {
        let spec = RandomSpec {
            count: 50,
            min: 0.0001,
            max: 0.002,
            decimals: 1,
            ..RandomSpec::default()
        };
        assert!(spec.generate().iter().all(|v| *v > 0.0));
    }

    #[test]
    fn random_spec_bounds_are_checked() {
        assert!(RandomSpec::default().check().is_ok());
        let zero = RandomSpec {
            count: 0,
            ..RandomSpec::default()
        };
        assert!(zero.check().is_err());
        let inverted = RandomSpec {
            min: 0.8,
            max: 0.2,
            ..RandomSpec::default()
        };
        assert!(inverted.check().is_err());
        let too_big = RandomSpec {
            max: 1.5,
            ..RandomSpec::default()
        };
        assert!(too_big.check().is_err());
    }

    #[test]
    fn yaml_overrides_settings() {
        let base = Settings {
            algorithm: "FF".into(),
            source: ItemSource::Demo,
            parallel: false,
        };
        let y: YamlConfig =
            serde_yaml::from_str("algorithm: BFD\nrandom:\n  count: 12\n  seed: 7\n").unwrap();
        let merged = y.apply(base.clone()).unwrap();
        assert_eq!(merged.algorithm, "BFD");
        match &merged.source {
            ItemSource::Random(spec) => {
                assert_eq!(spec.count, 12);
                assert_eq!(spec.seed, 7);
                assert_eq!(spec.max, 0.7);
            }
            other => panic!("expected random source, got {other:?}"),
        }

        let both: YamlConfig =
            serde_yaml::from_str("items: [0.5]\nrandom:\n  count: 3\n").unwrap();
        assert!(both.apply(base).is_err());
    }
}
