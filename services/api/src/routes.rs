use crate::infra::{AppState, ProductStore};
use axum::extract::Path as UrlPath;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use ecoscore::products::{product_router, ProductScoringService};
use serde_json::json;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

const DASHBOARD_INDEX: &str = "index.html";

pub(crate) fn with_product_routes(service: Arc<ProductScoringService<ProductStore>>) -> axum::Router {
    product_router(service)
        .route("/", axum::routing::get(dashboard_index))
        .route("/static/*path", axum::routing::get(static_asset))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn dashboard_index(Extension(state): Extension<AppState>) -> Response {
    serve_static(&state.static_dir, DASHBOARD_INDEX).await
}

pub(crate) async fn static_asset(
    Extension(state): Extension<AppState>,
    UrlPath(path): UrlPath<String>,
) -> Response {
    serve_static(&state.static_dir, &path).await
}

async fn serve_static(root: &Path, relative: &str) -> Response {
    let Some(resolved) = resolve_asset_path(root, relative) else {
        return not_found(relative);
    };

    match tokio::fs::read(&resolved).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&resolved).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            not_found(relative)
        }
        Err(err) => {
            warn!(path = %resolved.display(), %err, "failed to read static asset");
            let payload = json!({ "error": "static asset unavailable" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

/// Join `relative` onto `root`, refusing anything that could leave it.
fn resolve_asset_path(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (depth > 0).then_some(resolved)
}

fn not_found(relative: &str) -> Response {
    let payload = json!({ "error": format!("asset '{relative}' not found") });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}
