use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use ens_badge::{
    config::Settings,
    models::{BadgeError, Result},
    render::{AvatarLoader, BadgeRenderer, FixedAdvance},
    resolver::{identicon_data_uri, NameService},
    router, AppState,
};
use ethers::types::Address;
use resvg::usvg::fontdb;
use std::sync::Arc;
use tower::util::ServiceExt;

const UNNAMED: &str = "0x742d35cc6634c0532925a3b844bc9e7595f6e842";
const NAMED: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

/// Stand-in for the ENS network.
enum FakeNames {
    Unregistered,
    Named { name: &'static str, avatar: Option<String> },
    Broken,
    Panicking,
}

#[async_trait]
impl NameService for FakeNames {
    async fn reverse_lookup(&self, _address: Address) -> Result<Option<String>> {
        match self {
            FakeNames::Unregistered => Ok(None),
            FakeNames::Named { name, .. } => Ok(Some(name.to_string())),
            FakeNames::Broken => Err(BadgeError::lookup("name", "connection refused")),
            FakeNames::Panicking => panic!("could not abi-decode bytes to ParamType::String"),
        }
    }

    async fn avatar_record(&self, _name: &str) -> Result<Option<String>> {
        match self {
            FakeNames::Named { avatar, .. } => Ok(avatar.clone()),
            _ => Ok(None),
        }
    }
}

fn app(names: FakeNames) -> axum::Router {
    let settings = Settings::default();
    let renderer = BadgeRenderer::with_measure(
        Arc::new(FixedAdvance(24.0)),
        Arc::new(fontdb::Database::new()),
        "satoshi, sans-serif",
    );
    let loader = AvatarLoader::new(&settings.badge).unwrap();
    router(AppState::new(Arc::new(names), loader, renderer, "test"))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, body.to_vec())
}

#[tokio::test]
async fn test_missing_address_is_bad_request() {
    let (status, _, body) = get(app(FakeNames::Unregistered), "/api").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"error": "Valid Ethereum address is required"}));
}

#[tokio::test]
async fn test_empty_and_malformed_address_are_bad_request() {
    for uri in ["/api?address=", "/api?address=0x1234", "/?address=vitalik.eth"] {
        let (status, _, body) = get(app(FakeNames::Unregistered), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Valid Ethereum address is required");
    }
}

#[tokio::test]
async fn test_unnamed_address_renders_avatar_only_badge() {
    let (status, content_type, body) =
        get(app(FakeNames::Unregistered), &format!("/api?address={}", UNNAMED)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));

    let img = image::load_from_memory(&body).unwrap();
    assert_eq!((img.width(), img.height()), (140, 140));
}

#[tokio::test]
async fn test_named_address_without_avatar_renders_wider_badge() {
    let names = FakeNames::Named { name: "vitalik.eth", avatar: None };
    let (status, _, body) = get(app(names), &format!("/?address={}", NAMED)).await;

    assert_eq!(status, StatusCode::OK);
    let img = image::load_from_memory(&body).unwrap();
    // 100 avatar + 3 * 10 padding + 11 chars * 24 + 2 * 10 outer
    assert_eq!((img.width(), img.height()), (100 + 30 + 264 + 20, 140));
}

#[tokio::test]
async fn test_named_address_with_inline_avatar() {
    let names = FakeNames::Named {
        name: "a.eth",
        avatar: Some(identicon_data_uri(NAMED).unwrap()),
    };
    let (status, content_type, _) = get(app(names), &format!("/api?address={}", NAMED)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_lookup_failure_is_generic_internal_error() {
    let (status, _, body) = get(app(FakeNames::Broken), &format!("/api?address={}", NAMED)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_panicking_lookup_still_answers_internal_error() {
    let (status, content_type, body) =
        get(app(FakeNames::Panicking), &format!("/api?address={}", NAMED)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_unloadable_avatar_is_internal_error() {
    let names = FakeNames::Named {
        name: "a.eth",
        avatar: Some("data:image/png;base64,aGVsbG8gd29ybGQ=".to_string()),
    };
    let (status, _, body) = get(app(names), &format!("/api?address={}", NAMED)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Internal server error");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, _, body) = get(app(FakeNames::Unregistered), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], "test");
}
