//! Scoring configuration.
//!
//! A `ScoringConfig` is an explicit, immutable value handed to every
//! evaluation. It can be built in code or loaded from YAML/JSON, and is
//! validated on every path.

mod parser;
mod schema;

pub use parser::{
    ComponentWeights, ConfigError, ScoringConfig, DEFAULT_ACCEPT_THRESHOLD,
    DEFAULT_QUALIFIED_THRESHOLD, DEFAULT_SIGMOID_STEEPNESS, WEIGHT_SUM_TOLERANCE,
};
pub use schema::validate_config_schema;
