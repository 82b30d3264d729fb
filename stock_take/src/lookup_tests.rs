//! Tests for the product lookup client.
//!
//! Note: the live catalog test requires network access and is marked #[ignore]

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::StockError;
use crate::lookup::{OpenFoodFacts, ProductLookup, ProductResponse};

#[test]
fn test_response_name_when_found() {
    let json = r#"{
        "code": "3017620422003",
        "status": 1,
        "status_verbose": "product found",
        "product": { "product_name": "Nutella", "brands": "Ferrero" }
    }"#;

    let response: ProductResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.name(), Some("Nutella"));
}

#[test]
fn test_response_name_when_unknown() {
    let json = r#"{ "code": "0000000000000", "status": 0, "status_verbose": "product not found" }"#;

    let response: ProductResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.name(), None);
}

#[test]
fn test_response_falls_back_to_first_brand() {
    let json = r#"{ "status": 1, "product": { "product_name": "", "brands": " Heinz, Kraft" } }"#;

    let response: ProductResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.name(), Some("Heinz"));
}

#[test]
fn test_response_blank_name_counts_as_unknown() {
    let json = r#"{ "status": 1, "product": { "product_name": "  ", "brands": "" } }"#;

    let response: ProductResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.name(), None);
}

#[tokio::test]
async fn test_lookup_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v0/product/5000112637922.json"))
        .and(header("User-Agent", "stock_take/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 1,
            "product": { "product_name": "Coca-Cola Zero " }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let lookup = OpenFoodFacts::new(mock_server.uri());
    let name = lookup.product_name("5000112637922").await.unwrap();
    assert_eq!(name, "Coca-Cola Zero");
}

#[tokio::test]
async fn test_lookup_unknown_product() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v0/product/0012345678905.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 0,
            "status_verbose": "product not found"
        })))
        .mount(&mock_server)
        .await;

    let lookup = OpenFoodFacts::new(mock_server.uri());
    let err = lookup.product_name("0012345678905").await.unwrap_err();
    assert!(matches!(err, StockError::ProductNotFound(code) if code == "0012345678905"));
}

#[tokio::test]
async fn test_lookup_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let lookup = OpenFoodFacts::new(format!("{}/", mock_server.uri()));
    let err = lookup.product_name("5000112637922").await.unwrap_err();
    assert!(matches!(err, StockError::HttpStatus(s) if s.as_u16() == 500));
}

#[tokio::test]
async fn test_lookup_network_failure() {
    // Port 1 is reserved and has no listener
    let lookup = OpenFoodFacts::new("http://127.0.0.1:1");
    let err = lookup.product_name("5000112637922").await.unwrap_err();
    assert!(matches!(err, StockError::Network(_)));
}

// Integration test (requires network access)
#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_lookup_live_catalog() {
    let lookup = OpenFoodFacts::default();
    let name = lookup.product_name("3017620422003").await.unwrap();
    assert!(name.to_lowercase().contains("nutella"));
}
