use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::advisor::suggestions_for_product;
use super::domain::{NewProduct, ProductSubmission, Rating, ScoredProduct};
use super::repository::{ProductRepository, RepositoryError};
use super::scoring::{ScoreEngine, ScoreOutcome, ScoringConfig};
use super::summary::{summarize, ScoreSummary};
use super::validation::{validate_product, ValidationErrors};

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Parse a caller supplied history limit.
///
/// Absent or non-integer text yields the default. A negative limit means no
/// limit, and integers too large for `usize` saturate.
pub fn history_limit(raw: Option<&str>) -> usize {
    let Some(text) = raw.map(str::trim) else {
        return DEFAULT_HISTORY_LIMIT;
    };
    let negative = text.starts_with('-');
    let digits = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return DEFAULT_HISTORY_LIMIT;
    }

    // Only overflow can fail here.
    let magnitude = digits.parse::<usize>().unwrap_or(usize::MAX);
    if negative && magnitude > 0 {
        usize::MAX
    } else {
        magnitude
    }
}

/// Score, rating, and suggestions for a submission, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAssessment {
    pub outcome: ScoreOutcome,
    pub suggestions: Vec<String>,
}

impl ProductAssessment {
    pub fn score(&self) -> f64 {
        self.outcome.score
    }

    pub fn rating(&self) -> &Rating {
        &self.outcome.rating
    }
}

/// Service composing validation, scoring, advice, and the record store.
pub struct ProductScoringService<R> {
    repository: Arc<R>,
    engine: ScoreEngine,
}

impl<R> ProductScoringService<R>
where
    R: ProductRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: ScoringConfig) -> Self {
        Self {
            repository,
            engine: ScoreEngine::new(config),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn validate(&self, payload: &Value) -> Result<ProductSubmission, ValidationErrors> {
        validate_product(payload)
    }

    /// Score and advise without touching the store.
    pub fn assess(&self, submission: &ProductSubmission) -> ProductAssessment {
        ProductAssessment {
            outcome: self.engine.score(submission),
            suggestions: suggestions_for_product(submission),
        }
    }

    /// Validate, score, advise, and persist a payload as one record.
    pub fn score(&self, payload: &Value) -> Result<ScoredProduct, ProductServiceError> {
        let submission = match self.validate(payload) {
            Ok(submission) => submission,
            Err(errors) => {
                debug!(fields = errors.len(), "rejected product submission");
                return Err(errors.into());
            }
        };

        let assessment = self.assess(&submission);
        let ProductAssessment {
            outcome,
            suggestions,
        } = assessment;
        let product = NewProduct::new(submission, outcome.score, outcome.rating, suggestions);
        let record = self.repository.append(product)?;

        info!(
            id = %record.id,
            product = %record.product_name,
            score = record.score,
            rating = %record.rating,
            "scored product"
        );
        Ok(record)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<ScoredProduct>, ProductServiceError> {
        Ok(self.repository.list_recent(limit)?)
    }

    pub fn summary(&self) -> Result<ScoreSummary, ProductServiceError> {
        let records = self.repository.list_all()?;
        Ok(summarize(&records))
    }
}

/// Error raised by the product scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ProductServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
