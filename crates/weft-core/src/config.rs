//! Engine configuration: scoring weights, traversal bounds, decay rate.
//!
//! Weights are configuration rather than constants so operators can retune
//! the balance between "what's popular in the conversation" and "what's
//! structurally important in the graph". `validate` runs once at startup;
//! selection itself never fails on a validated config.

use crate::error::{Result, WeftError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relative emphasis of the four composite-score terms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Normalized mention frequency.
    pub frequency: f64,
    /// Exponentially decayed recency.
    pub recency: f64,
    /// Cached structural centrality.
    pub centrality: f64,
    /// Constant bonus for seed (focal) nodes, so seeds never lose to
    /// cheaper neighbors on score alone.
    pub focal: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            frequency: 0.3,
            recency: 0.2,
            centrality: 0.3,
            focal: 0.2,
        }
    }
}

/// Tunables for the subgraph selection engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Node budget for a selected subgraph. The connectivity guard may
    /// exceed it by the nodes of a spliced shortest path.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Hop limit for ego expansion from the seed set.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Exponential decay rate per second; larger means faster forgetting.
    #[serde(default = "default_decay_lambda")]
    pub decay_lambda: f64,

    #[serde(default)]
    pub weights: ScoringWeights,

    /// How many entries the most-discussed stats list carries.
    #[serde(default = "default_most_discussed")]
    pub most_discussed_top_n: usize,
}

fn default_max_nodes() -> usize {
    100
}

fn default_max_hops() -> usize {
    2
}

fn default_decay_lambda() -> f64 {
    // A mention loses ~5% of its recency per hour.
    (1.0f64 / 0.95).ln() / 3600.0
}

fn default_most_discussed() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_hops: default_max_hops(),
            decay_lambda: default_decay_lambda(),
            weights: ScoringWeights::default(),
            most_discussed_top_n: default_most_discussed(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, filling unspecified fields with defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: EngineConfig =
            toml::from_str(&raw).map_err(|e| WeftError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Startup validation. Malformed configuration is rejected here, never
    /// at query time.
    pub fn validate(&self) -> Result<()> {
        if self.max_nodes == 0 {
            return Err(WeftError::Config("max_nodes must be >= 1".into()));
        }
        if self.max_hops == 0 {
            return Err(WeftError::Config("max_hops must be >= 1".into()));
        }
        if !self.decay_lambda.is_finite() || self.decay_lambda < 0.0 {
            return Err(WeftError::Config(format!(
                "decay_lambda must be finite and >= 0, got {}",
                self.decay_lambda
            )));
        }
        for (name, w) in [
            ("frequency", self.weights.frequency),
            ("recency", self.weights.recency),
            ("centrality", self.weights.centrality),
            ("focal", self.weights.focal),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(WeftError::Config(format!(
                    "weight '{}' must be finite and >= 0, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}
