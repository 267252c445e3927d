//! Configuration system for LinkForge.
//!
//! Select a matcher strategy and its constraint policy from TOML or YAML
//! files (or flat key-value maps) without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use linkforge_config::{ConstraintConfig, LinkConfig, MatcherConfig, Surjection};
//!
//! let config = LinkConfig::from_toml_str(r#"
//!     random_seed = 7
//!
//!     [matcher]
//!     name = "beam-search"
//!     width = 16
//!
//!     [matcher.constraint]
//!     name = "bijective"
//!     surjection = "surjective"
//! "#).unwrap();
//!
//! let MatcherConfig::BeamSearch(beam) = &config.matcher else { panic!() };
//! assert_eq!(beam.width, Some(16));
//! assert_eq!(
//!     beam.constraint,
//!     ConstraintConfig::Bijective(linkforge_config::BijectiveConfig {
//!         surjection: Surjection::Surjective,
//!     })
//! );
//! ```
//!
//! Use the default configuration when the file is missing:
//!
//! ```
//! use linkforge_config::LinkConfig;
//!
//! let config = LinkConfig::load("linkforge.toml").unwrap_or_default();
//! assert_eq!(config.matcher.name(), "unique");
//! ```

use std::path::Path;

use linkforge_core::{SKOS_BROAD_MATCH, SKOS_EXACT_MATCH, SKOS_NARROW_MATCH, SKOS_RELATED_MATCH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat key-value parameters, as produced by external configuration
/// collaborators.
pub type Params = toml::Table;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default threshold of the threshold matcher.
pub const DEFAULT_MATCHER_THRESHOLD: f64 = 0.5;

/// Default iteration budget of Monte Carlo tree search.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Default UCB1 exploration constant.
pub const DEFAULT_EXPLORATION_CONSTANT: f64 = std::f64::consts::SQRT_2;

fn no_threshold() -> f64 {
    f64::NEG_INFINITY
}

fn matcher_threshold() -> f64 {
    DEFAULT_MATCHER_THRESHOLD
}

fn max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn exploration_constant() -> f64 {
    DEFAULT_EXPLORATION_CONSTANT
}

/// Main linking configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LinkConfig {
    /// The matcher strategy and its constraint policy.
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Random seed for reproducible stochastic search.
    ///
    /// Used by Monte Carlo tree search when its own `seed` is unset.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl LinkConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the matcher configuration.
    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matcher.validate()
    }
}

/// Matcher strategy configuration, tagged by `name`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "name")]
pub enum MatcherConfig {
    /// Keep every candidate at or above a threshold.
    #[serde(rename = "threshold")]
    Threshold(ThresholdMatcherConfig),

    /// Constrained assignment by descending probability.
    #[serde(rename = "unique", alias = "unique-assignment")]
    Unique(UniqueConfig),

    /// Plain sorted greedy scan, never solved as an assignment problem.
    #[serde(rename = "greedy")]
    Greedy(UniqueConfig),

    /// Bounded best-first search.
    #[serde(rename = "beam-search")]
    BeamSearch(BeamSearchConfig),

    /// Anytime Monte Carlo tree search.
    #[serde(rename = "monte-carlo")]
    MonteCarlo(MonteCarloConfig),
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig::Unique(UniqueConfig::default())
    }
}

impl MatcherConfig {
    /// Builds a matcher configuration from a flat key-value map carrying a
    /// `name` entry.
    ///
    /// ```
    /// use linkforge_config::{MatcherConfig, Params};
    ///
    /// let params: Params = toml::from_str(r#"
    ///     name = "monte-carlo"
    ///     maxIterations = 500
    ///     unknownKey = true
    /// "#).unwrap();
    ///
    /// let config = MatcherConfig::from_params(&params).unwrap();
    /// assert_eq!(config.name(), "monte-carlo");
    /// ```
    pub fn from_params(params: &Params) -> Result<Self, ConfigError> {
        let config: Self = toml::Value::Table(params.clone()).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the registry name of the selected matcher.
    pub fn name(&self) -> &'static str {
        match self {
            MatcherConfig::Threshold(_) => "threshold",
            MatcherConfig::Unique(_) => "unique",
            MatcherConfig::Greedy(_) => "greedy",
            MatcherConfig::BeamSearch(_) => "beam-search",
            MatcherConfig::MonteCarlo(_) => "monte-carlo",
        }
    }

    /// Returns the constraint policy, if the matcher uses one.
    pub fn constraint(&self) -> Option<&ConstraintConfig> {
        match self {
            MatcherConfig::Threshold(_) => None,
            MatcherConfig::Unique(c) | MatcherConfig::Greedy(c) => Some(&c.constraint),
            MatcherConfig::BeamSearch(c) => Some(&c.constraint),
            MatcherConfig::MonteCarlo(c) => Some(&c.constraint),
        }
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MatcherConfig::Threshold(c) => check_threshold(c.threshold),
            MatcherConfig::Unique(c) | MatcherConfig::Greedy(c) => {
                check_threshold(c.threshold)?;
                c.constraint.validate()
            }
            MatcherConfig::BeamSearch(c) => {
                check_threshold(c.threshold)?;
                if c.width == Some(0) {
                    return Err(ConfigError::Invalid("beam width must be positive".into()));
                }
                c.constraint.validate()
            }
            MatcherConfig::MonteCarlo(c) => {
                check_threshold(c.threshold)?;
                if !(c.exploration_constant.is_finite() && c.exploration_constant > 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "exploration constant must be positive, got {}",
                        c.exploration_constant
                    )));
                }
                c.constraint.validate()
            }
        }
    }
}

fn check_threshold(threshold: f64) -> Result<(), ConfigError> {
    if threshold.is_nan() {
        Err(ConfigError::Invalid("threshold must be a number".into()))
    } else {
        Ok(())
    }
}

/// Threshold matcher configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdMatcherConfig {
    /// Minimum probability to accept.
    #[serde(default = "matcher_threshold")]
    pub threshold: f64,
}

impl Default for ThresholdMatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCHER_THRESHOLD,
        }
    }
}

/// Unique assignment and greedy configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueConfig {
    /// Minimum probability a candidate needs to be considered.
    #[serde(default = "no_threshold")]
    pub threshold: f64,

    /// The constraint policy to satisfy.
    #[serde(default)]
    pub constraint: ConstraintConfig,
}

impl Default for UniqueConfig {
    fn default() -> Self {
        Self {
            threshold: f64::NEG_INFINITY,
            constraint: ConstraintConfig::default(),
        }
    }
}

/// Beam search configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamSearchConfig {
    /// Number of partial solutions kept per level; unbounded when unset.
    #[serde(default, alias = "beamSize")]
    pub width: Option<usize>,

    /// Minimum probability a candidate needs to be considered.
    #[serde(default = "no_threshold")]
    pub threshold: f64,

    /// The constraint policy to satisfy.
    #[serde(default)]
    pub constraint: ConstraintConfig,
}

impl Default for BeamSearchConfig {
    fn default() -> Self {
        Self {
            width: None,
            threshold: f64::NEG_INFINITY,
            constraint: ConstraintConfig::default(),
        }
    }
}

impl BeamSearchConfig {
    /// Sets the beam width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the constraint policy.
    pub fn with_constraint(mut self, constraint: ConstraintConfig) -> Self {
        self.constraint = constraint;
        self
    }
}

/// Monte Carlo tree search configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloConfig {
    /// Number of select/expand/simulate/backpropagate iterations.
    #[serde(default = "max_iterations")]
    pub max_iterations: usize,

    /// UCB1 exploration constant.
    #[serde(default = "exploration_constant", alias = "ce")]
    pub exploration_constant: f64,

    /// Seed of the rollout generator; falls back to the run seed, then to
    /// OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Minimum probability a candidate needs to be considered.
    #[serde(default = "no_threshold")]
    pub threshold: f64,

    /// The constraint policy to satisfy.
    #[serde(default)]
    pub constraint: ConstraintConfig,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            exploration_constant: DEFAULT_EXPLORATION_CONSTANT,
            seed: None,
            threshold: f64::NEG_INFINITY,
            constraint: ConstraintConfig::default(),
        }
    }
}

impl MonteCarloConfig {
    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the rollout seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the constraint policy.
    pub fn with_constraint(mut self, constraint: ConstraintConfig) -> Self {
        self.constraint = constraint;
        self
    }
}

/// Constraint policy configuration, tagged by `name`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "name")]
pub enum ConstraintConfig {
    /// Each alignment judged on its own probability.
    #[serde(rename = "threshold", alias = "constraint.ThresholdConstraint")]
    Threshold(ThresholdConstraintConfig),

    /// One-to-one linking, optionally relaxed.
    #[serde(rename = "bijective", alias = "constraint.Bijective")]
    Bijective(BijectiveConfig),

    /// SKOS-typed linking.
    #[serde(rename = "taxonomic", alias = "constraint.Taxonomic")]
    Taxonomic(TaxonomicConfig),
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        ConstraintConfig::Bijective(BijectiveConfig::default())
    }
}

impl ConstraintConfig {
    /// Builds a constraint configuration from a flat key-value map carrying
    /// a `name` entry. Unknown keys are ignored.
    pub fn from_params(params: &Params) -> Result<Self, ConfigError> {
        let config: Self = toml::Value::Table(params.clone()).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the registry name of the selected policy.
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintConfig::Threshold(_) => "threshold",
            ConstraintConfig::Bijective(_) => "bijective",
            ConstraintConfig::Taxonomic(_) => "taxonomic",
        }
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            ConstraintConfig::Threshold(c) => check_threshold(c.threshold),
            ConstraintConfig::Bijective(_) => Ok(()),
            ConstraintConfig::Taxonomic(c) => {
                let uris = [
                    &c.exact_match,
                    &c.broad_match,
                    &c.narrow_match,
                    &c.related_match,
                ];
                for (i, uri) in uris.iter().enumerate() {
                    if uris[..i].contains(uri) {
                        return Err(ConfigError::Invalid(format!(
                            "taxonomic relation {} is configured twice",
                            uri
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

/// Threshold constraint configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConstraintConfig {
    /// Minimum probability; accepts everything by default.
    #[serde(default = "no_threshold")]
    pub threshold: f64,
}

impl Default for ThresholdConstraintConfig {
    fn default() -> Self {
        Self {
            threshold: f64::NEG_INFINITY,
        }
    }
}

/// Bijective constraint configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BijectiveConfig {
    /// Which injectivity checks are enforced.
    #[serde(default)]
    pub surjection: Surjection,
}

/// Relaxation of the bijective constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Surjection {
    /// Strict one-to-one.
    #[default]
    #[serde(alias = "BIJECTIVE")]
    Bijective,

    /// Many left entities may map to one right entity.
    #[serde(alias = "SURJECTIVE")]
    Surjective,

    /// One left entity may map to many right entities.
    #[serde(alias = "INVERSE_SURJECTIVE", alias = "inverse_surjective")]
    InverseSurjective,
}

/// Taxonomic constraint configuration: the URIs of the four SKOS relation
/// types.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomicConfig {
    #[serde(default = "exact_match")]
    pub exact_match: String,

    #[serde(default = "broad_match")]
    pub broad_match: String,

    #[serde(default = "narrow_match")]
    pub narrow_match: String,

    #[serde(default = "related_match")]
    pub related_match: String,
}

fn exact_match() -> String {
    SKOS_EXACT_MATCH.to_string()
}

fn broad_match() -> String {
    SKOS_BROAD_MATCH.to_string()
}

fn narrow_match() -> String {
    SKOS_NARROW_MATCH.to_string()
}

fn related_match() -> String {
    SKOS_RELATED_MATCH.to_string()
}

impl Default for TaxonomicConfig {
    fn default() -> Self {
        Self {
            exact_match: exact_match(),
            broad_match: broad_match(),
            narrow_match: narrow_match(),
            related_match: related_match(),
        }
    }
}
