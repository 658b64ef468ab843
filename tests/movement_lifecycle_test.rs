//! End-to-end movement lifecycle tests over the HTTP surface.

mod common;

use axum::{
    body,
    http::{Method, StatusCode},
};
use serde_json::{json, Value};

use common::TestApp;

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

async fn seeded_app() -> TestApp {
    let app = TestApp::new().await;
    app.seed_branch(1, "Matriz").await;
    app.seed_branch(2, "Filial Norte").await;
    app.seed_product(42, "Engine Oil", 10, 1).await;
    app
}

fn create_payload(quantity: i32) -> Value {
    json!({
        "origin_branch_id": 1,
        "destination_branch_id": 2,
        "product_id": 42,
        "quantity": quantity
    })
}

#[tokio::test]
async fn creating_a_movement_debits_stock_and_records_history() {
    let app = seeded_app().await;

    let response = app
        .request(Method::POST, "/movements", Some(create_payload(4)))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("created"));
    assert_eq!(body["data"]["quantity"], json!(4));
    let id = body["data"]["id"].as_i64().expect("movement id");

    // Stock at the origin dropped from 10 to 6.
    let stock = app
        .request(Method::GET, "/products/42/branches/1/quantity", None)
        .await;
    let stock_body = response_json(stock).await;
    assert_eq!(stock_body["data"]["quantity"], json!(6));

    // Detail carries the creation history entry.
    let detail = app
        .request(Method::GET, &format!("/movements/{id}"), None)
        .await;
    let detail_body = response_json(detail).await;
    let history = detail_body["data"]["history"].as_array().expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["description"], json!("created"));
    assert_eq!(history[0]["file"], Value::Null);
}

#[tokio::test]
async fn creation_is_rejected_when_stock_is_insufficient() {
    let app = seeded_app().await;

    let response = app
        .request(Method::POST, "/movements", Some(create_payload(11)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The failed attempt left stock untouched and created nothing.
    let stock = app
        .request(Method::GET, "/products/42/branches/1/quantity", None)
        .await;
    assert_eq!(response_json(stock).await["data"]["quantity"], json!(10));

    let list = app.request(Method::GET, "/movements", None).await;
    assert_eq!(
        response_json(list).await["data"].as_array().unwrap().len(),
        0
    );
}

#[tokio::test]
async fn creation_rejects_same_branch_and_unknown_references() {
    let app = seeded_app().await;

    let same_branch = app
        .request(
            Method::POST,
            "/movements",
            Some(json!({
                "origin_branch_id": 1,
                "destination_branch_id": 1,
                "product_id": 42,
                "quantity": 1
            })),
        )
        .await;
    assert_eq!(same_branch.status(), StatusCode::BAD_REQUEST);

    let unknown_branch = app
        .request(
            Method::POST,
            "/movements",
            Some(json!({
                "origin_branch_id": 1,
                "destination_branch_id": 99,
                "product_id": 42,
                "quantity": 1
            })),
        )
        .await;
    assert_eq!(unknown_branch.status(), StatusCode::NOT_FOUND);

    let unknown_product = app
        .request(
            Method::POST,
            "/movements",
            Some(json!({
                "origin_branch_id": 1,
                "destination_branch_id": 2,
                "product_id": 77,
                "quantity": 1
            })),
        )
        .await;
    assert_eq!(unknown_product.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_delivery_flow_walks_created_to_finalized() {
    let app = seeded_app().await;

    let created = app
        .request(Method::POST, "/movements", Some(create_payload(3)))
        .await;
    let id = response_json(created).await["data"]["id"]
        .as_i64()
        .expect("movement id");

    let started = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/start"),
            Some(("driver_name", "Ana")),
            Some(("pickup.jpg", b"jpegbytes")),
        )
        .await;
    assert_eq!(started.status(), StatusCode::OK);
    let started_body = response_json(started).await;
    let file_path = started_body["data"]["file_path"]
        .as_str()
        .expect("file path");
    assert!(file_path.starts_with("uploads/"));
    assert!(file_path.ends_with(".jpg"));

    let finished = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/end"),
            Some(("driver_name", "Ana")),
            Some(("dropoff.jpg", b"jpegbytes2")),
        )
        .await;
    assert_eq!(finished.status(), StatusCode::OK);

    let detail = app
        .request(Method::GET, &format!("/movements/{id}"), None)
        .await;
    let detail_body = response_json(detail).await;
    assert_eq!(detail_body["data"]["status"], json!("finalized"));

    let history = detail_body["data"]["history"].as_array().expect("history");
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["description"], json!("created"));
    assert_eq!(
        history[1]["description"],
        json!("Driver Ana started delivery")
    );
    assert_eq!(
        history[2]["description"],
        json!("Driver Ana finished delivery")
    );
    // Evidence resolves to an absolute URL under the public base.
    let evidence = history[1]["file"].as_str().expect("evidence url");
    assert!(evidence.starts_with("http://localhost:8080/uploads/"));
}

#[tokio::test]
async fn start_requires_both_driver_name_and_evidence() {
    let app = seeded_app().await;

    let created = app
        .request(Method::POST, "/movements", Some(create_payload(1)))
        .await;
    let id = response_json(created).await["data"]["id"]
        .as_i64()
        .expect("movement id");

    let missing_file = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/start"),
            Some(("driver_name", "Ana")),
            None,
        )
        .await;
    assert_eq!(missing_file.status(), StatusCode::BAD_REQUEST);

    let missing_driver = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/start"),
            None,
            Some(("pickup.jpg", b"jpegbytes")),
        )
        .await;
    assert_eq!(missing_driver.status(), StatusCode::BAD_REQUEST);

    // Rejected attempts leave the movement untouched.
    let detail = app
        .request(Method::GET, &format!("/movements/{id}"), None)
        .await;
    assert_eq!(response_json(detail).await["data"]["status"], json!("created"));
}

#[tokio::test]
async fn start_accepts_legacy_motorista_field() {
    let app = seeded_app().await;

    let created = app
        .request(Method::POST, "/movements", Some(create_payload(1)))
        .await;
    let id = response_json(created).await["data"]["id"]
        .as_i64()
        .expect("movement id");

    let started = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/start"),
            Some(("motorista", "Carlos")),
            Some(("pickup.jpg", b"jpegbytes")),
        )
        .await;
    assert_eq!(started.status(), StatusCode::OK);
}

#[tokio::test]
async fn lifecycle_guards_reject_out_of_order_transitions() {
    let app = seeded_app().await;

    let created = app
        .request(Method::POST, "/movements", Some(create_payload(1)))
        .await;
    let id = response_json(created).await["data"]["id"]
        .as_i64()
        .expect("movement id");

    // Cannot finish a delivery that never started.
    let finish_first = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/end"),
            Some(("driver_name", "Ana")),
            Some(("dropoff.jpg", b"jpegbytes")),
        )
        .await;
    assert_eq!(finish_first.status(), StatusCode::BAD_REQUEST);

    // Cancel, then no further transitions are allowed.
    let cancelled = app
        .request(Method::POST, &format!("/movements/{id}/cancel"), None)
        .await;
    assert_eq!(cancelled.status(), StatusCode::OK);

    let start_after_cancel = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/start"),
            Some(("driver_name", "Ana")),
            Some(("pickup.jpg", b"jpegbytes")),
        )
        .await;
    assert_eq!(start_after_cancel.status(), StatusCode::BAD_REQUEST);

    let cancel_again = app
        .request(Method::POST, &format!("/movements/{id}/cancel"), None)
        .await;
    assert_eq!(cancel_again.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejected_transitions_leave_no_evidence_files_behind() {
    let app = seeded_app().await;

    let created = app
        .request(Method::POST, "/movements", Some(create_payload(1)))
        .await;
    let id = response_json(created).await["data"]["id"]
        .as_i64()
        .expect("movement id");

    // Finishing before starting is rejected; the upload must be cleaned up.
    let finish_first = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/end"),
            Some(("driver_name", "Ana")),
            Some(("dropoff.jpg", b"jpegbytes")),
        )
        .await;
    assert_eq!(finish_first.status(), StatusCode::BAD_REQUEST);

    // Same for a movement that does not exist at all.
    let unknown = app
        .request_multipart(
            Method::PUT,
            "/movements/9999/start",
            Some(("driver_name", "Ana")),
            Some(("pickup.jpg", b"jpegbytes")),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    assert_eq!(app.stored_evidence_count(), 0);

    // A legal transition keeps its file.
    let started = app
        .request_multipart(
            Method::PUT,
            &format!("/movements/{id}/start"),
            Some(("driver_name", "Ana")),
            Some(("pickup.jpg", b"jpegbytes")),
        )
        .await;
    assert_eq!(started.status(), StatusCode::OK);
    assert_eq!(app.stored_evidence_count(), 1);
}

#[tokio::test]
async fn cancel_does_not_restore_stock() {
    let app = seeded_app().await;

    let created = app
        .request(Method::POST, "/movements", Some(create_payload(4)))
        .await;
    let id = response_json(created).await["data"]["id"]
        .as_i64()
        .expect("movement id");

    app.request(Method::POST, &format!("/movements/{id}/cancel"), None)
        .await;

    let stock = app
        .request(Method::GET, "/products/42/branches/1/quantity", None)
        .await;
    assert_eq!(response_json(stock).await["data"]["quantity"], json!(6));
}

#[tokio::test]
async fn status_patch_bypasses_lifecycle_guards() {
    let app = seeded_app().await;

    let created = app
        .request(Method::POST, "/movements", Some(create_payload(1)))
        .await;
    let id = response_json(created).await["data"]["id"]
        .as_i64()
        .expect("movement id");

    // Jump straight to finalized, then back again.
    let patched = app
        .request(
            Method::PATCH,
            &format!("/movements/{id}/status"),
            Some(json!({ "status": "finalized" })),
        )
        .await;
    assert_eq!(patched.status(), StatusCode::OK);

    // Legacy Portuguese labels are accepted and stored canonically.
    let legacy = app
        .request(
            Method::PATCH,
            &format!("/movements/{id}/status"),
            Some(json!({ "status": "em transito" })),
        )
        .await;
    assert_eq!(legacy.status(), StatusCode::OK);
    assert_eq!(
        response_json(legacy).await["data"]["status"],
        json!("in_transit")
    );

    let unknown = app
        .request(
            Method::PATCH,
            &format!("/movements/{id}/status"),
            Some(json!({ "status": "teleported" })),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_supports_status_filters_including_legacy_labels() {
    let app = seeded_app().await;

    let first = app
        .request(Method::POST, "/movements", Some(create_payload(1)))
        .await;
    let first_id = response_json(first).await["data"]["id"]
        .as_i64()
        .expect("movement id");
    app.request(Method::POST, "/movements", Some(create_payload(2)))
        .await;

    app.request_multipart(
        Method::PUT,
        &format!("/movements/{first_id}/start"),
        Some(("driver_name", "Ana")),
        Some(("pickup.jpg", b"jpegbytes")),
    )
    .await;

    let in_transit = app
        .request(Method::GET, "/movements?status=in_transit", None)
        .await;
    let in_transit_body = response_json(in_transit).await;
    assert_eq!(in_transit_body["data"].as_array().unwrap().len(), 1);
    assert_eq!(in_transit_body["data"][0]["id"], json!(first_id));

    // Legacy filter label maps onto the same status.
    let legacy = app
        .request(Method::GET, "/movements?status=em%20transito", None)
        .await;
    assert_eq!(response_json(legacy).await["data"].as_array().unwrap().len(), 1);

    let bogus = app
        .request(Method::GET, "/movements?status=bogus", None)
        .await;
    assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_movement_removes_its_history() {
    let app = seeded_app().await;

    let created = app
        .request(Method::POST, "/movements", Some(create_payload(2)))
        .await;
    let id = response_json(created).await["data"]["id"]
        .as_i64()
        .expect("movement id");

    let deleted = app
        .request(Method::DELETE, &format!("/movements/{id}"), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = app
        .request(Method::GET, &format!("/movements/{id}"), None)
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let delete_again = app
        .request(Method::DELETE, &format!("/movements/{id}"), None)
        .await;
    assert_eq!(delete_again.status(), StatusCode::NOT_FOUND);

    // Stock stays debited even after deletion.
    let stock = app
        .request(Method::GET, "/products/42/branches/1/quantity", None)
        .await;
    assert_eq!(response_json(stock).await["data"]["quantity"], json!(8));
}
