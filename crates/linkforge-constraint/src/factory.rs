//! Name-keyed construction of constraint policies.

use std::sync::Arc;

use linkforge_config::{ConstraintConfig, Params};
use linkforge_core::{Alignment, AlignmentScore, LinkForgeError, Result};

use crate::bijective::BijectiveConstraint;
use crate::branch::CommitLog;
use crate::constraint::Constraint;
use crate::taxonomic::TaxonomicConstraint;
use crate::threshold::ThresholdConstraint;

/// Every shipped constraint policy, as a closed sum type.
#[derive(Clone, Debug)]
pub enum AnyConstraint {
    Threshold(ThresholdConstraint),
    Bijective(BijectiveConstraint),
    Taxonomic(TaxonomicConstraint),
}

macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            AnyConstraint::Threshold($c) => $body,
            AnyConstraint::Bijective($c) => $body,
            AnyConstraint::Taxonomic($c) => $body,
        }
    };
}

impl Constraint for AnyConstraint {
    fn name(&self) -> &'static str {
        dispatch!(self, c => c.name())
    }

    fn commits(&self) -> &CommitLog {
        dispatch!(self, c => c.commits())
    }

    fn can_add(&self, alignment: &Alignment) -> Result<bool> {
        dispatch!(self, c => c.can_add(alignment))
    }

    fn add(&self, alignment: Arc<Alignment>) -> Result<Self> {
        Ok(match self {
            AnyConstraint::Threshold(c) => AnyConstraint::Threshold(c.add(alignment)?),
            AnyConstraint::Bijective(c) => AnyConstraint::Bijective(c.add(alignment)?),
            AnyConstraint::Taxonomic(c) => AnyConstraint::Taxonomic(c.add(alignment)?),
        })
    }

    fn score(&self) -> AlignmentScore {
        dispatch!(self, c => c.score())
    }

    fn delta(&self, alignment: &Alignment) -> f64 {
        dispatch!(self, c => c.delta(alignment))
    }

    fn is_complete(&self) -> bool {
        dispatch!(self, c => c.is_complete())
    }

    fn can_complete(&self, alignment: &Alignment) -> bool {
        dispatch!(self, c => c.can_complete(alignment))
    }

    fn is_one_to_one(&self) -> bool {
        dispatch!(self, c => c.is_one_to_one())
    }
}

impl From<ThresholdConstraint> for AnyConstraint {
    fn from(c: ThresholdConstraint) -> Self {
        AnyConstraint::Threshold(c)
    }
}

impl From<BijectiveConstraint> for AnyConstraint {
    fn from(c: BijectiveConstraint) -> Self {
        AnyConstraint::Bijective(c)
    }
}

impl From<TaxonomicConstraint> for AnyConstraint {
    fn from(c: TaxonomicConstraint) -> Self {
        AnyConstraint::Taxonomic(c)
    }
}

/// Builds empty constraint states from configuration.
///
/// A factory is created once per configuration and hands out a fresh empty
/// state per matching run.
///
/// # Example
///
/// ```
/// use linkforge_constraint::{Constraint, ConstraintFactory};
/// use linkforge_config::Params;
///
/// let mut params = Params::new();
/// params.insert("name".into(), "constraint.Bijective".into());
/// params.insert("surjection".into(), "surjective".into());
///
/// let factory = ConstraintFactory::from_params(&params).unwrap();
/// let empty = factory.make();
/// assert_eq!(empty.name(), "bijective");
/// assert!(empty.is_empty());
/// assert!(!empty.is_one_to_one());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConstraintFactory {
    config: ConstraintConfig,
}

impl ConstraintFactory {
    /// Registry names of the shipped policies.
    pub const NAMES: [&'static str; 3] = ["threshold", "bijective", "taxonomic"];

    /// Creates a factory for the given policy configuration.
    pub fn new(config: ConstraintConfig) -> Self {
        Self { config }
    }

    /// Creates a factory from a flat key-value map carrying a `name` entry.
    pub fn from_params(params: &Params) -> Result<Self> {
        ConstraintConfig::from_params(params)
            .map(Self::new)
            .map_err(|e| LinkForgeError::Config(e.to_string()))
    }

    /// Returns the policy configuration.
    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    /// Returns the empty state of the configured policy.
    pub fn make(&self) -> AnyConstraint {
        match &self.config {
            ConstraintConfig::Threshold(c) => ThresholdConstraint::new(c.threshold).into(),
            ConstraintConfig::Bijective(c) => BijectiveConstraint::new(c.surjection).into(),
            ConstraintConfig::Taxonomic(c) => TaxonomicConstraint::new(c.clone()).into(),
        }
    }
}

impl From<ConstraintConfig> for ConstraintFactory {
    fn from(config: ConstraintConfig) -> Self {
        Self::new(config)
    }
}
