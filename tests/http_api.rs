//! HTTP API driven through `dispatch` without a socket
//!
//! Tests:
//! - Health and unknown routes
//! - Token checks on protected routes
//! - Account provisioning and Reddit linking
//! - Submit, feed, verify and status toggle over JSON

mod common;

use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use http_body_util::BodyExt;
use hyper::header::AUTHORIZATION;
use hyper::{HeaderMap, Method, StatusCode};
use serde_json::{json, Value};

use common::{FakeReddit, POST_URL};
use karmicup::auth::TokenInput;
use karmicup::db::MemoryStore;
use karmicup::server::dispatch;
use karmicup::{AppState, Args};

struct Harness {
    state: AppState,
    reddit: Arc<FakeReddit>,
}

impl Harness {
    fn new() -> Self {
        let args = Args::try_parse_from(["karmicup", "--dev-mode"]).unwrap();
        let jwt = args.jwt_validator().unwrap();
        let reddit = Arc::new(FakeReddit::new("Hello world"));
        let state = AppState::new(args, Arc::new(MemoryStore::new()), reddit.clone(), jwt);
        Self { state, reddit }
    }

    fn auth(&self, user_id: &str) -> HeaderMap {
        let token = self
            .state
            .jwt
            .generate_token(TokenInput {
                user_id: user_id.to_string(),
                email: Some(format!("{}@example.com", user_id)),
                name: None,
            })
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        headers
    }

    async fn call(&self, method: Method, path: &str, headers: &HeaderMap, body: Value) -> (StatusCode, Value) {
        let body = if body.is_null() {
            Bytes::new()
        } else {
            Bytes::from(body.to_string())
        };
        let response = dispatch(&self.state, &method, path, headers, &body).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Provision via /api/me and link a Reddit handle
    async fn onboard(&self, user_id: &str, handle: &str) -> HeaderMap {
        let headers = self.auth(user_id);
        let (status, _) = self.call(Method::GET, "/api/me", &headers, Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = self
            .call(
                Method::POST,
                "/api/onboarding/complete",
                &headers,
                json!({ "redditUsername": handle }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        headers
    }
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_health_and_unknown_route() {
    let h = Harness::new();
    let none = HeaderMap::new();

    let (status, body) = h.call(Method::GET, "/health", &none, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["store"], "memory");
    assert_eq!(body["mode"], "development");

    let (status, body) = h.call(Method::GET, "/api/nothing", &none, Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = h.call(Method::OPTIONS, "/api/submissions/create", &none, Value::Null).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let h = Harness::new();
    let none = HeaderMap::new();

    for (method, path) in [
        (Method::GET, "/api/me"),
        (Method::GET, "/api/submissions/mine"),
        (Method::GET, "/api/submissions/feed"),
        (Method::POST, "/api/submissions/create"),
    ] {
        let (status, _) = h.call(method, path, &none, Value::Null).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", path);
    }

    let mut bad = HeaderMap::new();
    bad.insert(AUTHORIZATION, "Bearer not-a-token".parse().unwrap());
    let (status, _) = h.call(Method::GET, "/api/me", &bad, Value::Null).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_me_provisions_starting_balance_once() {
    let h = Harness::new();
    let headers = h.auth("alice");

    let (status, body) = h.call(Method::GET, "/api/me", &headers, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "alice");
    assert_eq!(body["points"], 20);
    assert_eq!(body["onboarded"], false);
    assert_eq!(body["email"], "alice@example.com");

    let (_, again) = h.call(Method::GET, "/api/me", &headers, Value::Null).await;
    assert_eq!(again["points"], 20);
}

#[tokio::test]
async fn test_link_reddit_normalizes_and_rejects_bad_names() {
    let h = Harness::new();
    let headers = h.auth("alice");
    h.call(Method::GET, "/api/me", &headers, Value::Null).await;

    let (status, body) = h
        .call(
            Method::POST,
            "/api/onboarding/complete",
            &headers,
            json!({ "redditUsername": " /u/Alice_R " }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], "Alice_R");

    let (_, me) = h.call(Method::GET, "/api/me", &headers, Value::Null).await;
    assert_eq!(me["onboarded"], true);
    assert_eq!(me["redditUsername"], "Alice_R");

    let (status, _) = h
        .call(
            Method::PATCH,
            "/api/settings/update",
            &headers,
            json!({ "redditUsername": "bad name!" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Submissions
// =============================================================================

#[tokio::test]
async fn test_submit_feed_verify_flow() {
    let h = Harness::new();
    let owner = h.onboard("owner", "OwnerHandle").await;
    let helper = h.onboard("helper", "HelperHandle").await;

    let (status, body) = h
        .call(
            Method::POST,
            "/api/submissions/create",
            &owner,
            json!({ "url": POST_URL, "type": "post" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["points"], 10);
    assert_eq!(body["submission"]["type"], "post");
    assert_eq!(body["submission"]["title"], "Hello world");
    let id = body["submission"]["id"].as_str().unwrap().to_string();

    // Owner sees it in their list, not in their feed
    let (_, mine) = h.call(Method::GET, "/api/submissions/mine", &owner, Value::Null).await;
    assert_eq!(mine["submissions"].as_array().unwrap().len(), 1);
    let (_, own_feed) = h.call(Method::GET, "/api/submissions/feed", &owner, Value::Null).await;
    assert!(own_feed["submissions"].as_array().unwrap().is_empty());

    let (_, feed) = h.call(Method::GET, "/api/submissions/feed", &helper, Value::Null).await;
    let items = feed["submissions"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id.as_str());
    assert_eq!(items[0]["redditUsername"], "OwnerHandle");
    assert!(items[0]["interaction"].is_null());

    // Owner verifying their own submission
    let (status, _) = h
        .call(Method::POST, "/api/submissions/verify", &owner, json!({ "submissionId": id }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    h.reddit.set_score(1);
    h.reddit.comment("HelperHandle");
    let (status, body) = h
        .call(Method::POST, "/api/submissions/verify", &helper, json!({ "submissionId": id }))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["detected"], "both");
    assert_eq!(body["pointsEarned"], 6);
    assert_eq!(body["points"], 26);

    let (status, body) = h
        .call(Method::POST, "/api/submissions/verify", &helper, json!({ "submissionId": id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already performed both"));

    let (_, feed) = h.call(Method::GET, "/api/submissions/feed", &helper, Value::Null).await;
    assert_eq!(feed["submissions"][0]["interaction"], "both");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let h = Harness::new();
    let owner = h.onboard("owner", "OwnerHandle").await;

    let cases = [
        (json!({ "type": "post" }), "URL and type are required"),
        (json!({ "url": POST_URL, "type": "video" }), "Type must be 'post' or 'comment'"),
    ];
    for (body, expected) in cases {
        let (status, response) = h.call(Method::POST, "/api/submissions/create", &owner, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], expected);
    }

    let (status, _) = h
        .call(
            Method::POST,
            "/api/submissions/create",
            &owner,
            json!({ "url": "https://example.com/r/rust/comments/abc123/", "type": "post" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was debited
    let (_, me) = h.call(Method::GET, "/api/me", &owner, Value::Null).await;
    assert_eq!(me["points"], 20);
}

#[tokio::test]
async fn test_modify_status_is_owner_only() {
    let h = Harness::new();
    let owner = h.onboard("owner", "OwnerHandle").await;
    let other = h.onboard("other", "OtherHandle").await;

    let (_, body) = h
        .call(
            Method::POST,
            "/api/submissions/create",
            &owner,
            json!({ "url": POST_URL, "type": "post" }),
        )
        .await;
    let id = body["submission"]["id"].as_str().unwrap().to_string();

    let (status, _) = h
        .call(
            Method::PATCH,
            "/api/submissions/modify",
            &other,
            json!({ "id": id, "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .call(
            Method::PATCH,
            "/api/submissions/modify",
            &owner,
            json!({ "id": "not-a-uuid", "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .call(
            Method::PATCH,
            "/api/submissions/modify",
            &owner,
            json!({ "id": id, "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submission"]["status"], "completed");

    // Completed submissions drop out of other members' feeds
    let (_, feed) = h.call(Method::GET, "/api/submissions/feed", &other, Value::Null).await;
    assert!(feed["submissions"].as_array().unwrap().is_empty());
}
