//! Trendlens Configuration Layer
//!
//! Four-tier layered configuration: built-in defaults, a YAML config file,
//! a fixed allow-list of environment variables, and CLI arguments, merged in
//! that order with the higher tier winning per leaf.
//!
//! # Architecture
//!
//! ```text
//! defaults  <  config.yaml  <  environment  <  CLI arguments
//! ```
//!
//! Each non-default tier is a [`ConfigOverlay`]: a mirror of the effective
//! shape in which every leaf is an `Option` and every section is itself an
//! overlay. [`resolve`] deep-merges the three overlays (field-by-field, the
//! populated higher-priority leaf winning) and fills what remains from the
//! defaults, producing one immutable [`EffectiveConfig`] per run.
//!
//! Resolution itself performs no I/O; gathering the raw tiers is the
//! caller's job ([`ConfigOverlay::from_yaml_file`],
//! [`ConfigOverlay::from_env`]).
//!
//! The one setting without a built-in default is the TianAPI credential:
//! [`EffectiveConfig::tianapi_key`] returns [`ConfigError::MissingApiKey`]
//! when it is absent after the full merge, a fatal and user-visible condition
//! that is never retried.

#![warn(missing_docs)]

mod error;
mod overlay;
mod resolved;

pub use error::ConfigError;
pub use overlay::{
    AnalysisOverlay, ApiOverlay, CleanupOverlay, ConfigOverlay, GradesOverlay, LlmOverlay,
    LoggingOverlay, PathsOverlay, ScoringDetailOverlay, ScoringOverlay, TianApiOverlay,
};
pub use resolved::{
    resolve, AnalysisConfig, CleanupConfig, EffectiveConfig, GradesConfig, LlmConfig,
    LoggingConfig, PathsConfig, ScoringConfig, TianApiConfig,
};
