use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::domain::TaxProfileDraft;
use super::repository::TaxProfileRepository;
use super::service::{TaxProfileError, TaxProfileManager};
use crate::domain::OwnerId;
use crate::verification::ContactVerifier;

/// Router builder exposing the owner's tax profile.
pub fn tax_router<R, V>(manager: Arc<TaxProfileManager<R, V>>) -> Router
where
    R: TaxProfileRepository + 'static,
    V: ContactVerifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/owners/:owner_id/tax-profile",
            get(get_handler::<R, V>)
                .put(upsert_handler::<R, V>)
                .delete(delete_handler::<R, V>),
        )
        .with_state(manager)
}

pub(crate) async fn upsert_handler<R, V>(
    State(manager): State<Arc<TaxProfileManager<R, V>>>,
    Path(owner_id): Path<String>,
    Json(draft): Json<TaxProfileDraft>,
) -> Response
where
    R: TaxProfileRepository + 'static,
    V: ContactVerifier + 'static,
{
    match manager.upsert(&OwnerId(owner_id), draft, Utc::now()) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => tax_error_response(err),
    }
}

pub(crate) async fn get_handler<R, V>(
    State(manager): State<Arc<TaxProfileManager<R, V>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    R: TaxProfileRepository + 'static,
    V: ContactVerifier + 'static,
{
    match manager.get(&OwnerId(owner_id)) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "tax profile not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => tax_error_response(err),
    }
}

pub(crate) async fn delete_handler<R, V>(
    State(manager): State<Arc<TaxProfileManager<R, V>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    R: TaxProfileRepository + 'static,
    V: ContactVerifier + 'static,
{
    match manager.delete(&OwnerId(owner_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => tax_error_response(err),
    }
}

fn tax_error_response(err: TaxProfileError) -> Response {
    match err {
        TaxProfileError::Validation(error) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(error.payload())).into_response()
        }
        TaxProfileError::Verification(_) | TaxProfileError::Repository(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
