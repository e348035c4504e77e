use serde::{Deserialize, Serialize};

use super::rule::MiningParams;

/// Body of a rule-generation request. Missing thresholds fall back to the
/// configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
}

impl RulesRequest {
    pub fn resolve(&self, defaults: MiningParams) -> MiningParams {
        MiningParams {
            min_support: self.min_support.unwrap_or(defaults.min_support),
            min_confidence: self.min_confidence.unwrap_or(defaults.min_confidence),
        }
    }
}
