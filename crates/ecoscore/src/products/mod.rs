//! Product sustainability scoring: validation, scoring, suggestions, storage,
//! and the HTTP routes that expose them.

pub mod advisor;
pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;
pub mod summary;
pub mod validation;

#[cfg(test)]
mod tests;

pub use advisor::suggestions_for_product;
pub use domain::{
    NewProduct, ProductId, ProductSubmission, Rating, ScoreView, ScoreWeights, ScoredProduct,
};
pub use repository::{InMemoryProductRepository, ProductRepository, RepositoryError};
pub use router::product_router;
pub use scoring::{rating_from_score, ScoreEngine, ScoreOutcome, ScoringConfig, SubScores};
pub use service::{
    history_limit, ProductAssessment, ProductScoringService, ProductServiceError,
    DEFAULT_HISTORY_LIMIT,
};
pub use store::JsonLinesProductRepository;
pub use summary::{summarize, ScoreSummary};
pub use validation::{validate_product, ValidationErrors};
