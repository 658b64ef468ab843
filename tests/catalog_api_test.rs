//! Product and branch catalog endpoint tests.

mod common;

use axum::{
    body,
    http::{Method, StatusCode},
};
use serde_json::Value;

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
    app.seed_product(1, "Engine Oil", 10, 1).await;
    app.seed_product(2, "Brake Pads", 5, 2).await;
    app.seed_product(3, "Engine Oil", 7, 2).await;
    app
}

#[tokio::test]
async fn products_are_listed_with_their_branch() {
    let app = seeded_app().await;

    let response = app.request(Method::GET, "/products", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let items = body["data"].as_array().expect("product list");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "Engine Oil");
    assert_eq!(items[0]["branch"]["name"], "Matriz");
}

#[tokio::test]
async fn product_search_matches_product_or_branch_name() {
    let app = seeded_app().await;

    let by_product = app.request(Method::GET, "/products?query=Brake", None).await;
    let by_product_body = response_json(by_product).await;
    assert_eq!(by_product_body["data"].as_array().unwrap().len(), 1);

    let by_branch = app
        .request(Method::GET, "/products?query=Norte", None)
        .await;
    let by_branch_body = response_json(by_branch).await;
    assert_eq!(by_branch_body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn product_options_collapse_duplicate_names() {
    let app = seeded_app().await;

    let response = app.request(Method::GET, "/products/options", None).await;
    let body = response_json(response).await;
    let options = body["data"].as_array().expect("options");
    assert_eq!(options.len(), 2);
}

#[tokio::test]
async fn branch_options_list_every_branch() {
    let app = seeded_app().await;

    let response = app.request(Method::GET, "/branches/options", None).await;
    let body = response_json(response).await;
    let options = body["data"].as_array().expect("options");
    assert_eq!(options.len(), 2);
    assert_eq!(options[0]["name"], "Matriz");
}

#[tokio::test]
async fn quantity_probe_is_not_found_for_unstocked_pairs() {
    let app = seeded_app().await;

    let stocked = app
        .request(Method::GET, "/products/1/branches/1/quantity", None)
        .await;
    assert_eq!(stocked.status(), StatusCode::OK);
    assert_eq!(response_json(stocked).await["data"]["quantity"], 10);

    let unstocked = app
        .request(Method::GET, "/products/1/branches/2/quantity", None)
        .await;
    assert_eq!(unstocked.status(), StatusCode::NOT_FOUND);
}
