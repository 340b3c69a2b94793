//! Estimator configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `EIGENFOLD_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};
use crate::qubo::PenaltyWeights;

/// Settings for one estimator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// QUBO penalty and reward strengths
    #[serde(default)]
    pub weights: PenaltyWeights,

    /// Target ratio of lattice sites to residues
    #[serde(default = "default_lattice_ratio")]
    pub lattice_ratio: f64,

    /// States with probability strictly above this are stable
    #[serde(default = "default_stable_threshold")]
    pub stable_threshold: f64,

    /// Rescale the Hamiltonian so its largest coefficient is 1
    #[serde(default = "default_true")]
    pub normalize: bool,

    /// Stable states kept in the result record
    #[serde(default = "default_max_reported_states")]
    pub max_reported_states: usize,
}

fn default_lattice_ratio() -> f64 {
    1.3
}

fn default_stable_threshold() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}

fn default_max_reported_states() -> usize {
    3
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            weights: PenaltyWeights::default(),
            lattice_ratio: default_lattice_ratio(),
            stable_threshold: default_stable_threshold(),
            normalize: default_true(),
            max_reported_states: default_max_reported_states(),
        }
    }
}

/// Parse an override, keeping the current value if the text is malformed.
fn parse_override<T: std::str::FromStr>(name: &str, raw: &str, current: &mut T) {
    match raw.trim().parse() {
        Ok(value) => *current = value,
        Err(_) => tracing::warn!(variable = name, value = raw, "ignoring malformed override"),
    }
}

impl EstimatorConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> FoldResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FoldError::Io(format!("{}: {e}", path.display())))?;

        let config: EstimatorConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| FoldError::Config(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> FoldResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => EstimatorConfig::default(),
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge process environment variables into this configuration.
    pub fn merge_env(self) -> Self {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides from an arbitrary variable lookup.
    ///
    /// Only variables the lookup returns override the current values.
    pub fn merge_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        const CONTACT: &str = "EIGENFOLD_WEIGHT_CONTACT";
        const COLLISION: &str = "EIGENFOLD_WEIGHT_COLLISION";
        const CHAIN: &str = "EIGENFOLD_WEIGHT_CHAIN";
        const RATIO: &str = "EIGENFOLD_LATTICE_RATIO";
        const THRESHOLD: &str = "EIGENFOLD_STABLE_THRESHOLD";
        const NORMALIZE: &str = "EIGENFOLD_NORMALIZE";

        // Weights
        if let Some(v) = lookup(CONTACT) {
            parse_override(CONTACT, &v, &mut self.weights.contact);
        }
        if let Some(v) = lookup(COLLISION) {
            parse_override(COLLISION, &v, &mut self.weights.collision);
        }
        if let Some(v) = lookup(CHAIN) {
            parse_override(CHAIN, &v, &mut self.weights.chain);
        }

        // Lattice and statistics
        if let Some(v) = lookup(RATIO) {
            parse_override(RATIO, &v, &mut self.lattice_ratio);
        }
        if let Some(v) = lookup(THRESHOLD) {
            parse_override(THRESHOLD, &v, &mut self.stable_threshold);
        }
        if let Some(v) = lookup(NORMALIZE) {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.normalize = true,
                "0" | "false" | "no" | "off" => self.normalize = false,
                _ => tracing::warn!(variable = NORMALIZE, value = %v, "ignoring malformed override"),
            }
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> FoldResult<()> {
        let weights = [
            ("contact", self.weights.contact),
            ("collision", self.weights.collision),
            ("chain", self.weights.chain),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value <= 0.0 {
                return Err(FoldError::Config(format!(
                    "weights.{name} must be finite and positive, got {value}"
                )));
            }
        }

        if !self.lattice_ratio.is_finite() || self.lattice_ratio < 1.0 {
            return Err(FoldError::Config(format!(
                "lattice_ratio must be at least 1, got {}",
                self.lattice_ratio
            )));
        }

        if !(0.0..1.0).contains(&self.stable_threshold) {
            return Err(FoldError::Config(format!(
                "stable_threshold must be in [0, 1), got {}",
                self.stable_threshold
            )));
        }

        if self.max_reported_states == 0 {
            return Err(FoldError::Config(
                "max_reported_states must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EstimatorConfig::default();
        assert_eq!(config.weights, PenaltyWeights::new(5.0, 500.0, 5.0));
        assert_eq!(config.lattice_ratio, 1.3);
        assert_eq!(config.stable_threshold, 0.1);
        assert!(config.normalize);
        assert_eq!(config.max_reported_states, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EstimatorConfig =
            serde_yaml_ng::from_str("weights:\n  collision: 1000.0\nnormalize: false\n").unwrap();
        assert_eq!(config.weights.collision, 1000.0);
        assert_eq!(config.weights.contact, 5.0);
        assert!(!config.normalize);
        assert_eq!(config.lattice_ratio, 1.3);
    }

    #[test]
    fn test_env_overrides() {
        let config = EstimatorConfig::default().merge_env_from(lookup(&[
            ("EIGENFOLD_WEIGHT_CONTACT", "2.5"),
            ("EIGENFOLD_LATTICE_RATIO", " 2.0 "),
            ("EIGENFOLD_NORMALIZE", "off"),
        ]));
        assert_eq!(config.weights.contact, 2.5);
        assert_eq!(config.weights.collision, 500.0);
        assert_eq!(config.lattice_ratio, 2.0);
        assert!(!config.normalize);
    }

    #[test]
    fn test_malformed_env_override_is_ignored() {
        let config = EstimatorConfig::default()
            .merge_env_from(lookup(&[("EIGENFOLD_STABLE_THRESHOLD", "lots")]));
        assert_eq!(config.stable_threshold, 0.1);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = EstimatorConfig::default();
        config.weights.collision = 0.0;
        assert!(config.validate().is_err());

        let mut config = EstimatorConfig::default();
        config.weights.chain = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = EstimatorConfig::default();
        config.lattice_ratio = 0.5;
        assert!(config.validate().is_err());

        let mut config = EstimatorConfig::default();
        config.stable_threshold = 1.0;
        assert!(config.validate().is_err());

        let mut config = EstimatorConfig::default();
        config.max_reported_states = 0;
        assert!(config.validate().is_err());
    }
}
