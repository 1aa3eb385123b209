use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use chrono::Local;
use serde::Serialize;
use serde_json::json;

use super::domain::{
    BankAccount, BankAccountSubmission, CardSubmission, Instrument, PaymentMethod,
};
use super::repository::InstrumentRepository;
use super::service::{InstrumentRegistry, RegistryError};
use crate::domain::{OwnerId, RecordId};

/// Owner collection with the default surfaced so callers can sort default-first.
#[derive(Debug, Serialize)]
pub struct InstrumentListView<T> {
    pub items: Vec<T>,
    pub default_id: Option<RecordId>,
}

impl<T: Instrument> InstrumentListView<T> {
    pub fn new(items: Vec<T>) -> Self {
        let default_id = items
            .iter()
            .find(|item| item.is_default())
            .map(|item| item.id().clone());
        Self { items, default_id }
    }
}

/// Router builder exposing card and payout account endpoints.
pub fn instrument_router<C, B>(registry: Arc<InstrumentRegistry<C, B>>) -> Router
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    Router::new()
        .route(
            "/api/v1/owners/:owner_id/payment-methods",
            get(list_payment_methods_handler::<C, B>).post(add_payment_method_handler::<C, B>),
        )
        .route(
            "/api/v1/owners/:owner_id/payment-methods/:instrument_id",
            delete(remove_payment_method_handler::<C, B>),
        )
        .route(
            "/api/v1/owners/:owner_id/payment-methods/:instrument_id/default",
            put(set_default_payment_method_handler::<C, B>),
        )
        .route(
            "/api/v1/owners/:owner_id/bank-accounts",
            get(list_bank_accounts_handler::<C, B>).post(add_bank_account_handler::<C, B>),
        )
        .route(
            "/api/v1/owners/:owner_id/bank-accounts/:instrument_id",
            delete(remove_bank_account_handler::<C, B>),
        )
        .route(
            "/api/v1/owners/:owner_id/bank-accounts/:instrument_id/default",
            put(set_default_bank_account_handler::<C, B>),
        )
        .with_state(registry)
}

pub(crate) async fn add_payment_method_handler<C, B>(
    State(registry): State<Arc<InstrumentRegistry<C, B>>>,
    Path(owner_id): Path<String>,
    Json(submission): Json<CardSubmission>,
) -> Response
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    let owner = OwnerId(owner_id);
    let today = Local::now().date_naive();
    match registry.add_payment_method(&owner, submission, today) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => registry_error_response(err),
    }
}

pub(crate) async fn list_payment_methods_handler<C, B>(
    State(registry): State<Arc<InstrumentRegistry<C, B>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    match registry.payment_methods(&OwnerId(owner_id)) {
        Ok(items) => (StatusCode::OK, Json(InstrumentListView::new(items))).into_response(),
        Err(err) => registry_error_response(err),
    }
}

pub(crate) async fn remove_payment_method_handler<C, B>(
    State(registry): State<Arc<InstrumentRegistry<C, B>>>,
    Path((owner_id, instrument_id)): Path<(String, String)>,
) -> Response
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    match registry.remove_payment_method(&OwnerId(owner_id), &RecordId(instrument_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => registry_error_response(err),
    }
}

pub(crate) async fn set_default_payment_method_handler<C, B>(
    State(registry): State<Arc<InstrumentRegistry<C, B>>>,
    Path((owner_id, instrument_id)): Path<(String, String)>,
) -> Response
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    match registry.set_default_payment_method(&OwnerId(owner_id), &RecordId(instrument_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => registry_error_response(err),
    }
}

pub(crate) async fn add_bank_account_handler<C, B>(
    State(registry): State<Arc<InstrumentRegistry<C, B>>>,
    Path(owner_id): Path<String>,
    Json(submission): Json<BankAccountSubmission>,
) -> Response
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    match registry.add_bank_account(&OwnerId(owner_id), submission) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => registry_error_response(err),
    }
}

pub(crate) async fn list_bank_accounts_handler<C, B>(
    State(registry): State<Arc<InstrumentRegistry<C, B>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    match registry.bank_accounts(&OwnerId(owner_id)) {
        Ok(items) => (StatusCode::OK, Json(InstrumentListView::new(items))).into_response(),
        Err(err) => registry_error_response(err),
    }
}

pub(crate) async fn remove_bank_account_handler<C, B>(
    State(registry): State<Arc<InstrumentRegistry<C, B>>>,
    Path((owner_id, instrument_id)): Path<(String, String)>,
) -> Response
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    match registry.remove_bank_account(&OwnerId(owner_id), &RecordId(instrument_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => registry_error_response(err),
    }
}

pub(crate) async fn set_default_bank_account_handler<C, B>(
    State(registry): State<Arc<InstrumentRegistry<C, B>>>,
    Path((owner_id, instrument_id)): Path<(String, String)>,
) -> Response
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    match registry.set_default_bank_account(&OwnerId(owner_id), &RecordId(instrument_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => registry_error_response(err),
    }
}

fn registry_error_response(err: RegistryError) -> Response {
    match err {
        RegistryError::Validation(error) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(error.payload())).into_response()
        }
        RegistryError::NotFound { .. } => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        RegistryError::Ownership { .. } => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::FORBIDDEN, Json(payload)).into_response()
        }
        RegistryError::Repository(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
