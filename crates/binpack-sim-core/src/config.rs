use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimError};
use crate::model::Item;

/// Packing heuristics.
/// Key notes:
///   - the Decreasing variants only add a stable descending sort in front of the plain search
///   - serialized (and parsed) as the canonical codes `FF`, `BF`, `FFD`, `BFD`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Place each item into the first bin (in creation order) that can hold it.
    #[serde(rename = "FF")]
    FirstFit,
    /// Place each item into the bin that leaves the smallest residual.
    #[serde(rename = "BF")]
    BestFit,
    /// First-Fit over items sorted by size, largest first.
    #[serde(rename = "FFD")]
    FirstFitDecreasing,
    /// Best-Fit over items sorted by size, largest first.
    #[serde(rename = "BFD")]
    BestFitDecreasing,
}

/// How existing bins are searched for a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    FirstFit,
    BestFit,
}

impl Algorithm {
    /// All heuristics in canonical order.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::FirstFit,
        Algorithm::BestFit,
        Algorithm::FirstFitDecreasing,
        Algorithm::BestFitDecreasing,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::FirstFit => "FF",
            Self::BestFit => "BF",
            Self::FirstFitDecreasing => "FFD",
            Self::BestFitDecreasing => "BFD",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstFit => "First-Fit",
            Self::BestFit => "Best-Fit",
            Self::FirstFitDecreasing => "First-Fit Decreasing",
            Self::BestFitDecreasing => "Best-Fit Decreasing",
        }
    }

    pub fn search(&self) -> SearchStrategy {
        match self {
            Self::FirstFit | Self::FirstFitDecreasing => SearchStrategy::FirstFit,
            Self::BestFit | Self::BestFitDecreasing => SearchStrategy::BestFit,
        }
    }

    pub fn is_decreasing(&self) -> bool {
        matches!(self, Self::FirstFitDecreasing | Self::BestFitDecreasing)
    }
}

impl FromStr for Algorithm {
    type Err = SimError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "FF" => Ok(Self::FirstFit),
            "BF" => Ok(Self::BestFit),
            "FFD" => Ok(Self::FirstFitDecreasing),
            "BFD" => Ok(Self::BestFitDecreasing),
            other => Err(SimError::UnknownAlgorithm {
                code: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Validated, immutable input of one simulation run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimulationInput {
    items: Vec<Item>,
    algorithm: Algorithm,
}

impl SimulationInput {
    /// Validates `sizes` for an already-typed `algorithm`.
    pub fn new(sizes: &[f64], algorithm: Algorithm) -> Result<Self> {
        let items = validate_sizes(sizes)?;
        Ok(Self { items, algorithm })
    }

    /// Items in input order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item sizes.
    pub fn total_size(&self) -> f64 {
        self.items.iter().map(|it| it.size).sum()
    }

    /// Same items, different heuristic. Sizes are already validated.
    pub fn with_algorithm(&self, algorithm: Algorithm) -> Self {
        Self {
            items: self.items.clone(),
            algorithm,
        }
    }
}

/// Validates raw sizes and an algorithm code into a [`SimulationInput`].
///
/// Returns an error if:
/// - `algorithm_code` is not one of `FF`, `BF`, `FFD`, `BFD` (checked first)
/// - any size is not in `(0.0, 1.0]`; the first offending index is reported
///
/// An empty size list is valid.
pub fn validate(raw_sizes: &[f64], algorithm_code: &str) -> Result<SimulationInput> {
    let algorithm: Algorithm = algorithm_code.parse()?;
    SimulationInput::new(raw_sizes, algorithm)
}

fn validate_sizes(sizes: &[f64]) -> Result<Vec<Item>> {
    sizes
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            // written so that NaN fails too
            if value > 0.0 && value <= 1.0 {
                Ok(Item::new(index, value))
            } else {
                Err(SimError::InvalidItemSize { index, value })
            }
        })
        .collect()
}

/// Run-level options shared by the batch and comparison helpers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    /// Evaluate independent runs in parallel when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            parallel: default_parallel(),
        }
    }
}

impl RunConfig {
    /// Create a fluent builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::new()
    }

    /// Validates `sizes` against the configured algorithm.
    pub fn input(&self, sizes: &[f64]) -> Result<SimulationInput> {
        SimulationInput::new(sizes, self.algorithm)
    }
}

fn default_algorithm() -> Algorithm {
    Algorithm::FirstFit
}
fn default_parallel() -> bool {
    false
}

/// Builder for `RunConfig`.
#[derive(Debug, Default, Clone)]
pub struct RunConfigBuilder {
    cfg: RunConfig,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: RunConfig::default(),
        }
    }
    pub fn algorithm(mut self, v: Algorithm) -> Self {
        self.cfg.algorithm = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> RunConfig {
        self.cfg
    }
}
