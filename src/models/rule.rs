use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

pub const DEFAULT_MIN_SUPPORT: f64 = 0.3;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// A set of item labels, kept sorted and de-duplicated so that equality does
/// not depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemSet(Vec<String>);

impl ItemSet {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<String> = items.into_iter().map(Into::into).collect();
        items.sort();
        items.dedup();
        Self(items)
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.binary_search_by(|label| label.as_str().cmp(item)).is_ok()
    }
}

/// An association rule `antecedents -> consequents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub antecedents: ItemSet,
    pub consequents: ItemSet,
    /// Fraction of transactions containing both sides
    pub support: f64,
    /// support / support(antecedents)
    pub confidence: f64,
    /// confidence / support(consequents)
    pub lift: f64,
}

/// Thresholds for one mining run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiningParams {
    #[serde(default = "default_min_support")]
    pub min_support: f64,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_min_support() -> f64 {
    DEFAULT_MIN_SUPPORT
}

fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}

impl Default for MiningParams {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl MiningParams {
    pub fn new(min_support: f64, min_confidence: f64) -> Self {
        Self {
            min_support,
            min_confidence,
        }
    }

    /// Both thresholds must be finite and lie in (0, 1].
    pub fn validate(&self) -> Result<()> {
        check_threshold("min_support", self.min_support)?;
        check_threshold("min_confidence", self.min_confidence)?;
        Ok(())
    }
}

fn check_threshold(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        bail!(RuleError::validation(format!(
            "{name} must be in (0, 1], got {value}"
        )));
    }
    Ok(())
}
