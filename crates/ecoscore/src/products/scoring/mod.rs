mod config;
pub(crate) mod rules;

pub use config::{ScoringConfig, DEFAULT_COST_MAX, DEFAULT_GWP_MAX};
pub use rules::{clamp_score, rating_from_score};

use super::domain::{ProductSubmission, Rating, ScoreWeights};
use serde::Serialize;

/// Stateless scorer applying the configured ceilings and default weights.
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    config: ScoringConfig,
}

impl ScoreEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a submission using its own weight overrides when present.
    pub fn score(&self, submission: &ProductSubmission) -> ScoreOutcome {
        self.score_with(submission, submission.weights)
    }

    pub fn score_with(
        &self,
        submission: &ProductSubmission,
        weights: Option<ScoreWeights>,
    ) -> ScoreOutcome {
        let components = SubScores {
            gwp: rules::normalize_gwp(submission.gwp, self.config.gwp_max),
            circularity: rules::normalize_circularity(submission.circularity),
            cost: rules::normalize_cost(submission.cost, self.config.cost_max),
        };

        let mut weights = weights.unwrap_or(self.config.default_weights);
        if weights.total() <= 0.0 {
            weights = ScoreWeights::EQUAL;
        }

        let weighted = weights.gwp * components.gwp
            + weights.circularity * components.circularity
            + weights.cost * components.cost;
        let score = rules::clamp_score(rules::round_to(weighted / weights.total(), 1));

        ScoreOutcome {
            score,
            rating: rules::rating_from_score(score),
            components,
            weights,
        }
    }

    pub fn compute_score(
        &self,
        submission: &ProductSubmission,
        weights: Option<ScoreWeights>,
    ) -> f64 {
        self.score_with(submission, weights).score
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

/// Normalized 0-100 values for each metric before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub gwp: f64,
    pub circularity: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub score: f64,
    pub rating: Rating,
    pub components: SubScores,
    pub weights: ScoreWeights,
}
