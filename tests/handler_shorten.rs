mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use shortkey::domain::repositories::LinkRepository;

#[tokio::test]
async fn test_shorten_auto_keyword() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["status"], "success");
    assert_eq!(body["code"], "created");
    // Fresh store: id 0 encodes to the alphabet's first symbol.
    assert_eq!(body["keyword"], "0");
    assert_eq!(body["short_url"], "https://sho.rt/0");
    assert_eq!(body["clicks"], 0);
}

#[tokio::test]
async fn test_shorten_sequential_auto_keywords() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    let mut keywords = Vec::new();
    for i in 0..3 {
        let response = server
            .post("/api/shorten")
            .json(&json!({ "url": format!("https://example.com/{i}") }))
            .await;
        keywords.push(response.json::<serde_json::Value>()["keyword"].clone());
    }

    assert_eq!(keywords, vec!["0", "1", "2"]);
    assert_eq!(ctx.links.next_id().await.unwrap(), 3);
}

#[tokio::test]
async fn test_shorten_with_custom_keyword() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    let response = server
        .post("/api/shorten")
        .json(&json!({
            "url": "https://example.com",
            "keyword": "mylink",
            "title": "My <b>Link</b>"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["keyword"], "mylink");
    assert_eq!(body["title"], "My Link");
}

#[tokio::test]
async fn test_shorten_custom_keyword_taken() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    server
        .post("/api/shorten")
        .json(&json!({ "url": "https://one.example", "keyword": "taken" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://two.example", "keyword": "taken" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["status"], "fail");
    assert_eq!(body["code"], "keyword_unavailable");
}

#[tokio::test]
async fn test_shorten_reserved_keyword_rejected() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    for reserved in ["admin", "api", "health"] {
        let response = server
            .post("/api/shorten")
            .json(&json!({ "url": "https://example.com", "keyword": reserved }))
            .await;

        assert_eq!(response.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            response.json::<serde_json::Value>()["code"],
            "keyword_unavailable"
        );
    }
}

#[tokio::test]
async fn test_shorten_empty_url_rejected() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<serde_json::Value>()["status"], "fail");
}

#[tokio::test]
async fn test_shorten_bare_scheme_rejected() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    for url in ["http://", "https://"] {
        let response = server.post("/api/shorten").json(&json!({ "url": url })).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<serde_json::Value>()["code"], "invalid_url");
    }
}

#[tokio::test]
async fn test_shorten_self_referential_rejected() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://sho.rt/already-short" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>()["code"],
        "self_referential"
    );
}

#[tokio::test]
async fn test_shorten_duplicate_url_returns_existing() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    let first = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/page" }))
        .await;
    first.assert_status(StatusCode::CREATED);
    let first_keyword = first.json::<serde_json::Value>()["keyword"].clone();

    let second = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/page" }))
        .await;

    assert_eq!(second.status_code(), StatusCode::OK);
    let body = second.json::<serde_json::Value>();
    assert_eq!(body["status"], "success");
    assert_eq!(body["code"], "url_exists");
    assert_eq!(body["keyword"], first_keyword);

    // The second call claimed nothing and left the counter alone.
    assert_eq!(ctx.links.next_id().await.unwrap(), 1);
}

#[tokio::test]
async fn test_shorten_normalizes_url_before_dedup() {
    let ctx = common::create_test_state();
    let server = TestServer::new(common::test_router(ctx.state)).unwrap();

    server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/page" }))
        .await
        .assert_status(StatusCode::CREATED);

    // Same URL modulo host case, default port, and fragment.
    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://EXAMPLE.com:443/page#frag" }))
        .await;

    assert_eq!(response.json::<serde_json::Value>()["code"], "url_exists");
}
