use serde::{Deserialize, Serialize};

use super::super::domain::ScoreWeights;

pub const DEFAULT_GWP_MAX: f64 = 50.0;
pub const DEFAULT_COST_MAX: f64 = 100.0;

/// Normalization ceilings and the weights used when a submission brings none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub gwp_max: f64,
    pub cost_max: f64,
    pub default_weights: ScoreWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            gwp_max: DEFAULT_GWP_MAX,
            cost_max: DEFAULT_COST_MAX,
            default_weights: ScoreWeights::default(),
        }
    }
}
