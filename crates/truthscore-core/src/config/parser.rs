//! Scoring configuration parsing and validation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_config_schema;
use crate::types::ComponentName;

/// Allowed distance between the weight sum and 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Default sharpness of the normalization sigmoid.
pub const DEFAULT_SIGMOID_STEEPNESS: f64 = 8.0;

pub const DEFAULT_ACCEPT_THRESHOLD: f64 = 0.75;
pub const DEFAULT_QUALIFIED_THRESHOLD: f64 = 0.55;

/// Errors raised while building or loading a `ScoringConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Weight for '{component}' must be finite and non-negative, got {value}")]
    InvalidWeight { component: ComponentName, value: f64 },

    #[error("Weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdRange { name: &'static str, value: f64 },

    #[error("qualified_threshold ({qualified}) must not exceed accept_threshold ({accept})")]
    ThresholdOrder { qualified: f64, accept: f64 },

    #[error("sigmoid_steepness must be finite and positive, got {0}")]
    InvalidSteepness(f64),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Aggregation weight per component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentWeights {
    pub evidence: f64,
    pub consistency: f64,
    pub coverage: f64,
    pub language: f64,
}

impl ComponentWeights {
    /// Weight for a component.
    pub fn get(&self, name: ComponentName) -> f64 {
        match name {
            ComponentName::Evidence => self.evidence,
            ComponentName::Consistency => self.consistency,
            ComponentName::Coverage => self.coverage,
            ComponentName::Language => self.language,
        }
    }

    /// `(name, weight)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentName, f64)> + '_ {
        ComponentName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, w)| w).sum()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (component, value) in self.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { component, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }

        Ok(())
    }
}

impl Default for ComponentWeights {
    /// Evidence dominates; language is the least reliable proxy.
    fn default() -> Self {
        Self {
            evidence: 0.60,
            consistency: 0.20,
            coverage: 0.15,
            language: 0.05,
        }
    }
}

/// Serialized shape of a `ScoringConfig`, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawScoringConfig {
    #[serde(default)]
    weights: ComponentWeights,

    #[serde(default = "default_accept")]
    accept_threshold: f64,

    #[serde(default = "default_qualified")]
    qualified_threshold: f64,

    #[serde(default = "default_steepness")]
    sigmoid_steepness: f64,
}

fn default_accept() -> f64 {
    DEFAULT_ACCEPT_THRESHOLD
}

fn default_qualified() -> f64 {
    DEFAULT_QUALIFIED_THRESHOLD
}

fn default_steepness() -> f64 {
    DEFAULT_SIGMOID_STEEPNESS
}

/// Validated scoring configuration.
///
/// Every instance has passed validation, whether built with
/// [`ScoringConfig::new`] or deserialized. Values are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScoringConfig", into = "RawScoringConfig")]
pub struct ScoringConfig {
    weights: ComponentWeights,
    accept_threshold: f64,
    qualified_threshold: f64,
    sigmoid_steepness: f64,
}

impl TryFrom<RawScoringConfig> for ScoringConfig {
    type Error = ConfigError;

    fn try_from(raw: RawScoringConfig) -> Result<Self, Self::Error> {
        ScoringConfig::new(
            raw.weights,
            raw.accept_threshold,
            raw.qualified_threshold,
            raw.sigmoid_steepness,
        )
    }
}

impl From<ScoringConfig> for RawScoringConfig {
    fn from(config: ScoringConfig) -> Self {
        Self {
            weights: config.weights,
            accept_threshold: config.accept_threshold,
            qualified_threshold: config.qualified_threshold,
            sigmoid_steepness: config.sigmoid_steepness,
        }
    }
}

impl ScoringConfig {
    /// Build and validate a configuration.
    pub fn new(
        weights: ComponentWeights,
        accept_threshold: f64,
        qualified_threshold: f64,
        sigmoid_steepness: f64,
    ) -> Result<Self, ConfigError> {
        weights.validate()?;

        for (name, value) in [
            ("accept_threshold", accept_threshold),
            ("qualified_threshold", qualified_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdRange { name, value });
            }
        }

        if qualified_threshold > accept_threshold {
            return Err(ConfigError::ThresholdOrder {
                qualified: qualified_threshold,
                accept: accept_threshold,
            });
        }

        if !sigmoid_steepness.is_finite() || sigmoid_steepness <= 0.0 {
            return Err(ConfigError::InvalidSteepness(sigmoid_steepness));
        }

        Ok(Self {
            weights,
            accept_threshold,
            qualified_threshold,
            sigmoid_steepness,
        })
    }

    /// Same thresholds and steepness, different weights.
    pub fn with_weights(&self, weights: ComponentWeights) -> Result<Self, ConfigError> {
        Self::new(
            weights,
            self.accept_threshold,
            self.qualified_threshold,
            self.sigmoid_steepness,
        )
    }

    /// Same weights and steepness, different thresholds.
    pub fn with_thresholds(&self, accept: f64, qualified: f64) -> Result<Self, ConfigError> {
        Self::new(self.weights, accept, qualified, self.sigmoid_steepness)
    }

    pub fn weights(&self) -> &ComponentWeights {
        &self.weights
    }

    pub fn accept_threshold(&self) -> f64 {
        self.accept_threshold
    }

    pub fn qualified_threshold(&self) -> f64 {
        self.qualified_threshold
    }

    pub fn sigmoid_steepness(&self) -> f64 {
        self.sigmoid_steepness
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            Some("json") => Self::from_json(&contents),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Structural check against the schema, then semantic validation.
    fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        validate_config_schema(&value).map_err(ConfigError::SchemaError)?;
        let raw: RawScoringConfig = serde_json::from_value(value)?;
        Self::try_from(raw)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ComponentWeights::default(),
            accept_threshold: DEFAULT_ACCEPT_THRESHOLD,
            qualified_threshold: DEFAULT_QUALIFIED_THRESHOLD,
            sigmoid_steepness: DEFAULT_SIGMOID_STEEPNESS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ScoringConfig::default();
        let rebuilt = ScoringConfig::new(
            *config.weights(),
            config.accept_threshold(),
            config.qualified_threshold(),
            config.sigmoid_steepness(),
        )
        .unwrap();
        assert_eq!(config, rebuilt);
        assert_eq!(config.weights().language, 0.05);
    }

    #[test]
    fn test_weights_summing_to_point_nine_rejected() {
        let weights = ComponentWeights {
            evidence: 0.5,
            consistency: 0.2,
            coverage: 0.15,
            language: 0.05,
        };
        let result = ScoringConfig::new(weights, 0.75, 0.55, 8.0);
        assert!(matches!(result, Err(ConfigError::WeightSum { .. })));
    }

    #[test]
    fn test_qualified_above_accept_rejected() {
        let result = ScoringConfig::new(ComponentWeights::default(), 0.5, 0.6, 8.0);
        assert!(matches!(result, Err(ConfigError::ThresholdOrder { .. })));
    }

    #[test]
    fn test_equal_thresholds_allowed() {
        assert!(ScoringConfig::new(ComponentWeights::default(), 0.6, 0.6, 8.0).is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = ComponentWeights {
            evidence: 1.1,
            consistency: -0.1,
            coverage: 0.0,
            language: 0.0,
        };
        let result = ScoringConfig::new(weights, 0.75, 0.55, 8.0);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidWeight {
                component: ComponentName::Consistency,
                ..
            })
        ));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let weights = ComponentWeights {
            evidence: f64::NAN,
            ..ComponentWeights::default()
        };
        assert!(ScoringConfig::new(weights, 0.75, 0.55, 8.0).is_err());
    }

    #[test]
    fn test_bad_steepness_rejected() {
        let weights = ComponentWeights::default();
        assert!(matches!(
            ScoringConfig::new(weights, 0.75, 0.55, 0.0),
            Err(ConfigError::InvalidSteepness(_))
        ));
        assert!(ScoringConfig::new(weights, 0.75, 0.55, f64::INFINITY).is_err());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let result = ScoringConfig::new(ComponentWeights::default(), 1.2, 0.55, 8.0);
        assert!(matches!(
            result,
            Err(ConfigError::ThresholdRange {
                name: "accept_threshold",
                ..
            })
        ));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
weights:
  evidence: 0.5
  consistency: 0.25
  coverage: 0.15
  language: 0.10
accept_threshold: 0.8
qualified_threshold: 0.6
"#;
        let config = ScoringConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.weights().evidence, 0.5);
        assert_eq!(config.accept_threshold(), 0.8);
        assert_eq!(config.sigmoid_steepness(), DEFAULT_SIGMOID_STEEPNESS);
    }

    #[test]
    fn test_parse_json_partial_uses_defaults() {
        let config = ScoringConfig::from_json(r#"{"sigmoid_steepness": 12.0}"#).unwrap();
        assert_eq!(config.weights(), &ComponentWeights::default());
        assert_eq!(config.sigmoid_steepness(), 12.0);
    }

    #[test]
    fn test_parse_rejects_invalid_semantics() {
        let yaml = r#"
accept_threshold: 0.4
qualified_threshold: 0.6
"#;
        assert!(matches!(
            ScoringConfig::from_yaml(yaml),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_field() {
        let result = ScoringConfig::from_json(r#"{"accept": 0.7}"#);
        assert!(matches!(result, Err(ConfigError::SchemaError(_))));
    }

    #[test]
    fn test_deserialize_validates() {
        let result: Result<ScoringConfig, _> =
            serde_json::from_str(r#"{"accept_threshold": 0.5, "qualified_threshold": 0.9}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = ScoringConfig::default().with_thresholds(0.8, 0.5).unwrap();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(ScoringConfig::from_yaml(&yaml).unwrap(), config);
    }
}
