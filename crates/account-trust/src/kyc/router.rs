use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::documents::DocumentStore;
use super::domain::{DocumentStatus, DocumentUpload, PersonalInfo, ReviewDecision};
use super::repository::KycRepository;
use super::service::{KycError, KycWorkflow};
use super::steps::KycStep;
use crate::domain::{OwnerId, RecordId};

#[derive(Debug, Deserialize)]
pub struct DocumentReviewRequest {
    pub status: DocumentStatus,
}

#[derive(Debug, Serialize)]
pub struct WizardView {
    pub step: KycStep,
}

/// Router builder exposing KYC documents, submission and review endpoints.
pub fn kyc_router<R, D>(workflow: Arc<KycWorkflow<R, D>>) -> Router
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/owners/:owner_id/kyc/documents",
            get(list_documents_handler::<R, D>).post(upload_document_handler::<R, D>),
        )
        .route(
            "/api/v1/owners/:owner_id/kyc/documents/:document_id/review",
            put(document_review_handler::<R, D>),
        )
        .route(
            "/api/v1/owners/:owner_id/kyc/verification",
            get(verification_handler::<R, D>).post(submit_handler::<R, D>),
        )
        .route(
            "/api/v1/owners/:owner_id/kyc/verification/review-start",
            post(begin_review_handler::<R, D>),
        )
        .route(
            "/api/v1/owners/:owner_id/kyc/verification/review",
            post(record_review_handler::<R, D>),
        )
        .route(
            "/api/v1/owners/:owner_id/kyc/wizard",
            get(wizard_handler::<R, D>),
        )
        .with_state(workflow)
}

pub(crate) async fn upload_document_handler<R, D>(
    State(workflow): State<Arc<KycWorkflow<R, D>>>,
    Path(owner_id): Path<String>,
    Json(upload): Json<DocumentUpload>,
) -> Response
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    match workflow.upload_document(&OwnerId(owner_id), upload, Utc::now()) {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(err) => kyc_error_response(err),
    }
}

pub(crate) async fn list_documents_handler<R, D>(
    State(workflow): State<Arc<KycWorkflow<R, D>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    match workflow.documents(&OwnerId(owner_id)) {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(err) => kyc_error_response(err),
    }
}

pub(crate) async fn document_review_handler<R, D>(
    State(workflow): State<Arc<KycWorkflow<R, D>>>,
    Path((owner_id, document_id)): Path<(String, String)>,
    Json(request): Json<DocumentReviewRequest>,
) -> Response
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    match workflow.record_document_review(
        &OwnerId(owner_id),
        &RecordId(document_id),
        request.status,
        Utc::now(),
    ) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(err) => kyc_error_response(err),
    }
}

pub(crate) async fn submit_handler<R, D>(
    State(workflow): State<Arc<KycWorkflow<R, D>>>,
    Path(owner_id): Path<String>,
    Json(personal_info): Json<PersonalInfo>,
) -> Response
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    match workflow.submit(&OwnerId(owner_id), personal_info, Utc::now()) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => kyc_error_response(err),
    }
}

pub(crate) async fn verification_handler<R, D>(
    State(workflow): State<Arc<KycWorkflow<R, D>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    match workflow.verification(&OwnerId(owner_id)) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "no verification on file" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => kyc_error_response(err),
    }
}

pub(crate) async fn begin_review_handler<R, D>(
    State(workflow): State<Arc<KycWorkflow<R, D>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    match workflow.begin_review(&OwnerId(owner_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => kyc_error_response(err),
    }
}

pub(crate) async fn record_review_handler<R, D>(
    State(workflow): State<Arc<KycWorkflow<R, D>>>,
    Path(owner_id): Path<String>,
    Json(decision): Json<ReviewDecision>,
) -> Response
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    match workflow.record_review(&OwnerId(owner_id), decision, Utc::now()) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => kyc_error_response(err),
    }
}

pub(crate) async fn wizard_handler<R, D>(
    State(workflow): State<Arc<KycWorkflow<R, D>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    match workflow.wizard(&OwnerId(owner_id)) {
        Ok(wizard) => (
            StatusCode::OK,
            Json(WizardView {
                step: wizard.step(),
            }),
        )
            .into_response(),
        Err(err) => kyc_error_response(err),
    }
}

fn kyc_error_response(err: KycError) -> Response {
    match err {
        KycError::Validation(error) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(error.payload())).into_response()
        }
        KycError::Step(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        KycError::DocumentNotFound { .. } | KycError::VerificationNotFound { .. } => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        KycError::Conflict(conflict) => {
            let payload = json!({ "error": conflict.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        KycError::Repository(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
