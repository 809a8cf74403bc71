use std::sync::Arc;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::products::domain::{
    NewProduct, ProductId, ProductSubmission, Rating, ScoredProduct,
};
use crate::products::repository::{
    InMemoryProductRepository, ProductRepository, RepositoryError,
};
use crate::products::{product_router, ProductScoringService, ScoringConfig};

pub(super) fn bottle_payload() -> Value {
    json!({
        "product_name": "Bottle",
        "materials": ["plastic"],
        "gwp": 5,
        "cost": 10,
        "circularity": 80,
        "transport": "air",
        "packaging": "plastic wrap",
    })
}

pub(super) fn submission() -> ProductSubmission {
    ProductSubmission {
        product_name: "Tote bag".to_string(),
        materials: vec!["cotton".to_string()],
        weight_grams: Some(120),
        transport: Some("sea".to_string()),
        packaging: Some("recycled paper".to_string()),
        gwp: 4.0,
        cost: 20.0,
        circularity: 75.0,
        weights: None,
    }
}

pub(super) fn record(
    id: u64,
    score: f64,
    rating: Rating,
    materials: &[&str],
    transport: Option<&str>,
    packaging: Option<&str>,
) -> ScoredProduct {
    let product = NewProduct {
        product_name: format!("product-{id}"),
        materials: materials.iter().map(|m| m.to_string()).collect(),
        weight_grams: None,
        transport: transport.map(str::to_string),
        packaging: packaging.map(str::to_string),
        gwp: 5.0,
        cost: 10.0,
        circularity: 70.0,
        score,
        rating,
        suggestions: Vec::new(),
    };
    let created_at = Utc
        .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
        + chrono::Duration::minutes(id as i64);
    product.into_record(ProductId(id), created_at)
}

pub(super) fn build_service() -> (
    ProductScoringService<InMemoryProductRepository>,
    Arc<InMemoryProductRepository>,
) {
    let repository = Arc::new(InMemoryProductRepository::default());
    let service = ProductScoringService::new(repository.clone(), ScoringConfig::default());
    (service, repository)
}

pub(super) fn router_with_service(
    service: ProductScoringService<InMemoryProductRepository>,
) -> axum::Router {
    product_router(Arc::new(service))
}

/// Store that refuses every operation.
pub(super) struct UnavailableRepository;

impl ProductRepository for UnavailableRepository {
    fn append(&self, _product: NewProduct) -> Result<ScoredProduct, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn list_recent(&self, _limit: usize) -> Result<Vec<ScoredProduct>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn list_all(&self) -> Result<Vec<ScoredProduct>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
