use crate::infra::{AppState, TrustServices};
use account_trust::domain::OwnerId;
use account_trust::instruments::instrument_router;
use account_trust::kyc::kyc_router;
use account_trust::overview::AccountTrustOverview;
use account_trust::tax::tax_router;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

pub(crate) fn with_trust_routes(services: TrustServices) -> Router {
    let overview = Router::new()
        .route("/api/v1/owners/:owner_id/overview", get(overview_endpoint))
        .with_state(Arc::new(services.clone()));

    instrument_router(services.registry)
        .merge(tax_router(services.tax))
        .merge(kyc_router(services.kyc))
        .merge(overview)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
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

pub(crate) async fn overview_endpoint(
    State(services): State<Arc<TrustServices>>,
    Path(owner_id): Path<String>,
) -> Response {
    let owner = OwnerId(owner_id);
    match AccountTrustOverview::collect(
        &owner,
        services.registry.as_ref(),
        services.tax.as_ref(),
        services.kyc.as_ref(),
        services.contacts.as_ref(),
    ) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(err) => {
            error!(owner = %owner, error = %err, "trust overview unavailable");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
