use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::error;

use super::repository::ProductRepository;
use super::service::{history_limit, ProductScoringService, ProductServiceError};
use super::validation::ValidationErrors;

/// Router builder exposing validation, scoring, history, and summary endpoints.
pub fn product_router<R>(service: Arc<ProductScoringService<R>>) -> Router
where
    R: ProductRepository + 'static,
{
    Router::new()
        .route("/validate", post(validate_handler::<R>))
        .route("/score", post(score_handler::<R>))
        .route("/history", get(history_handler::<R>))
        .route("/score-summary", get(summary_handler::<R>))
        .with_state(service)
}

pub(crate) async fn validate_handler<R>(
    State(service): State<Arc<ProductScoringService<R>>>,
    body: Bytes,
) -> Response
where
    R: ProductRepository + 'static,
{
    let validated = parse_body(&body).and_then(|payload| service.validate(&payload));
    match validated {
        Ok(submission) => {
            let payload = json!({
                "message": "Valid data",
                "data": submission,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(errors) => validation_failure(errors),
    }
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<ProductScoringService<R>>>,
    body: Bytes,
) -> Response
where
    R: ProductRepository + 'static,
{
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(errors) => return validation_failure(errors),
    };

    match service.score(&payload) {
        Ok(record) => (StatusCode::CREATED, Json(record.score_view())).into_response(),
        Err(ProductServiceError::Validation(errors)) => validation_failure(errors),
        Err(other) => internal_failure(other),
    }
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<ProductScoringService<R>>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response
where
    R: ProductRepository + 'static,
{
    // Repeated keys are allowed; the first `limit` wins.
    let raw = params
        .iter()
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.as_str());
    let limit = history_limit(raw);
    match service.history(limit) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => internal_failure(err),
    }
}

pub(crate) async fn summary_handler<R>(
    State(service): State<Arc<ProductScoringService<R>>>,
) -> Response
where
    R: ProductRepository + 'static,
{
    match service.summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => internal_failure(err),
    }
}

fn parse_body(body: &Bytes) -> Result<Value, ValidationErrors> {
    serde_json::from_slice(body)
        .map_err(|_| ValidationErrors::single_general("Invalid JSON body."))
}

fn validation_failure(errors: ValidationErrors) -> Response {
    let payload = json!({ "errors": errors });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn internal_failure(err: ProductServiceError) -> Response {
    error!(%err, "product request failed");
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
