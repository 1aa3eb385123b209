use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::instruments::{
    instrument_router, BankAccount, InstrumentGuard, InstrumentRegistry, PaymentMethod,
};

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn card_payload() -> serde_json::Value {
    json!({
        "card_number": "4532015112830366",
        "expiry_month": 12,
        "expiry_year": 2030,
        "cvv": "123",
        "cardholder_name": "John Doe"
    })
}

#[tokio::test]
async fn add_card_route_returns_created_record() {
    let (registry, _, _) = build_registry();
    let router = instrument_router(Arc::new(registry));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/owners/host-42/payment-methods",
            card_payload(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["last4"], "0366");
    assert_eq!(payload["card_type"], "visa");
    assert_eq!(payload["is_default"], false);
    assert!(payload.get("card_number").is_none());
    assert!(payload.get("cvv").is_none());
}

#[tokio::test]
async fn add_card_route_reports_failing_field() {
    let (registry, _, _) = build_registry();
    let router = instrument_router(Arc::new(registry));
    let mut body = card_payload();
    body["cvv"] = json!("12");

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/owners/host-42/payment-methods",
            body,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "cvv");
    assert_eq!(payload["reason"]["kind"], "invalid_length");
    assert_eq!(payload["reason"]["expected"], 3);
}

#[tokio::test]
async fn failing_field_matches_the_request_key() {
    let (registry, _, _) = build_registry();
    let router = instrument_router(Arc::new(registry));

    for (key, value) in [
        ("card_number", json!("4532015112830367")),
        ("expiry_month", json!(13)),
        ("expiry_year", json!(2020)),
        ("cardholder_name", json!("  ")),
    ] {
        let mut body = card_payload();
        body[key] = value;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/owners/host-42/payment-methods",
                body.clone(),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = read_json_body(response).await;
        assert_eq!(payload["field"], key);
        assert!(body.get(key).is_some());
    }
}

#[tokio::test]
async fn set_default_route_rejects_foreign_owner() {
    let (registry, _, _) = build_registry();
    let card = registry
        .add_payment_method(&owner(), visa_card(), today())
        .expect("card accepted");
    let router = instrument_router(Arc::new(registry));

    let response = router
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!(
                    "/api/v1/owners/guest-7/payment-methods/{}/default",
                    card.id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn remove_handler_returns_not_found_for_unknown_account() {
    let (registry, _, _) = build_registry();

    let response = crate::instruments::router::remove_bank_account_handler::<
        MemoryInstrumentStore<PaymentMethod>,
        MemoryInstrumentStore<BankAccount>,
    >(
        State(Arc::new(registry)),
        Path(("host-42".to_string(), "ba-424242".to_string())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_handler_surfaces_default_id() {
    let (registry, _, _) = build_registry();
    let first = registry
        .add_bank_account(&owner(), bank_submission())
        .expect("first account");
    let second = registry
        .add_bank_account(&owner(), bank_submission())
        .expect("second account");
    registry
        .set_default_bank_account(&owner(), &second.id)
        .expect("default set");

    let response = crate::instruments::router::list_bank_accounts_handler::<
        MemoryInstrumentStore<PaymentMethod>,
        MemoryInstrumentStore<BankAccount>,
    >(State(Arc::new(registry)), Path("host-42".to_string()))
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["default_id"], second.id.as_str());
    assert_eq!(payload["items"][0]["id"], first.id.as_str());
    assert_eq!(payload["items"][1]["is_default"], true);
}

#[tokio::test]
async fn store_outage_maps_to_internal_error() {
    let registry = InstrumentRegistry::new(
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
        InstrumentGuard::default(),
    );
    let router = instrument_router(Arc::new(registry));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/owners/host-42/bank-accounts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
