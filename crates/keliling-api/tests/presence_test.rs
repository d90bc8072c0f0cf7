//! Integration tests for the presence update endpoint.

mod helpers;

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::future::join_all;

use keliling_core::types::{UserId, VendorId};

use helpers::{TestApp, test_config};

fn path(id: VendorId) -> String {
    format!("/api/vendor/{id}/online")
}

fn peer(last: u8) -> SocketAddr {
    SocketAddr::from(([198, 51, 100, last], 40000))
}

fn limited_app(trust_forwarded: bool) -> TestApp {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = 2;
    config.rate_limit.trust_forwarded = trust_forwarded;
    TestApp::with_config(config)
}

#[tokio::test]
async fn test_owner_and_non_owner_scenario() {
    let app = TestApp::new();
    let u1 = UserId::new();
    let u2 = UserId::new();
    let v1 = app.seed_vendor(u1, false).await;

    let resp = app
        .post_online(&path(v1), r#"{"online": true}"#, Some(&app.token_for(u1)))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["ok"], true);
    assert_eq!(resp.body["online"], true);
    assert_eq!(resp.body["vendor"]["online"], true);
    assert_eq!(resp.body["vendor"]["id"], v1.to_string());

    let resp = app
        .post_online(&path(v1), r#"{"online": false}"#, Some(&app.token_for(u2)))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(
        resp.body["error"],
        "Not allowed: you are not owner of this vendor"
    );
    assert_eq!(resp.body["code"], "FORBIDDEN");
    assert!(app.stored_online(v1).await);

    let resp = app
        .post_online(&path(v1), "{}", Some(&app.token_for(u1)))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["online"], false);
    assert!(!app.stored_online(v1).await);
}

#[tokio::test]
async fn test_explicit_value_is_idempotent() {
    let app = TestApp::new();
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;
    let token = app.token_for(owner);

    for _ in 0..3 {
        let resp = app
            .post_online(&path(id), r#"{"online": true}"#, Some(&token))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["online"], true);
    }
    assert!(app.stored_online(id).await);
}

#[tokio::test]
async fn test_absent_value_alternates() {
    let app = TestApp::new();
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;
    let token = app.token_for(owner);

    let mut seen = Vec::new();
    for body in ["", "{}", "", r#"{"unrelated": 1}"#] {
        let resp = app.post_online(&path(id), body, Some(&token)).await;
        assert_eq!(resp.status, StatusCode::OK);
        seen.push(resp.body["online"].as_bool().unwrap());
    }
    assert_eq!(seen, vec![true, false, true, false]);
}

#[tokio::test]
async fn test_values_coerced_by_truthiness() {
    let app = TestApp::new();
    let owner = UserId::new();
    let id = app.seed_vendor(owner, true).await;
    let token = app.token_for(owner);

    for (body, expected) in [
        (r#"{"online": 0}"#, false),
        (r#"{"online": "yes"}"#, true),
        (r#"{"online": null}"#, false),
        (r#"{"online": 1}"#, true),
        (r#"{"online": ""}"#, false),
    ] {
        let resp = app.post_online(&path(id), body, Some(&token)).await;
        assert_eq!(resp.status, StatusCode::OK, "body {body}");
        assert_eq!(resp.body["online"], expected, "body {body}");
    }
}

#[tokio::test]
async fn test_legacy_alias_path() {
    let app = TestApp::new();
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;

    let resp = app
        .post_online(
            &format!("/vendor/{id}/online"),
            r#"{"online": true}"#,
            Some(&app.token_for(owner)),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["online"], true);
}

#[tokio::test]
async fn test_missing_token() {
    let app = TestApp::new();
    let id = app.seed_vendor(UserId::new(), false).await;

    let resp = app.post_online(&path(id), "{}", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "Missing authorization token");
    assert_eq!(resp.body["code"], "UNAUTHENTICATED");
    assert!(!app.stored_online(id).await);
}

#[tokio::test]
async fn test_malformed_authorization_header_is_missing() {
    let app = TestApp::new();
    let id = app.seed_vendor(UserId::new(), false).await;

    let req = Request::builder()
        .method("POST")
        .uri(path(id))
        .header("authorization", "Token abc")
        .body(Body::empty())
        .unwrap();
    let resp = app.send(req).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "Missing authorization token");
}

#[tokio::test]
async fn test_invalid_token() {
    let app = TestApp::new();
    let id = app.seed_vendor(UserId::new(), false).await;

    let resp = app.post_online(&path(id), "{}", Some("garbage")).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "Invalid token");
}

#[tokio::test]
async fn test_lowercase_scheme_accepted() {
    let app = TestApp::new();
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;

    let req = Request::builder()
        .method("POST")
        .uri(path(id))
        .header("authorization", format!("bearer {}", app.token_for(owner)))
        .body(Body::empty())
        .unwrap();
    let resp = app.send(req).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["online"], true);
}

#[tokio::test]
async fn test_unknown_vendor() {
    let app = TestApp::new();
    let token = app.token_for(UserId::new());

    let resp = app
        .post_online(&path(VendorId::new()), "{}", Some(&token))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "Vendor not found");

    let resp = app
        .post_online("/api/vendor/not-a-uuid/online", "{}", Some(&token))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_authentication_checked_before_vendor_lookup() {
    let app = TestApp::new();
    let resp = app
        .post_online("/api/vendor/not-a-uuid/online", "{}", None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json() {
    let app = TestApp::new();
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;

    let resp = app
        .post_online(&path(id), r#"{"online": tru"#, Some(&app.token_for(owner)))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["code"], "VALIDATION");
    assert!(!app.stored_online(id).await);
}

#[tokio::test]
async fn test_read_failure_is_500() {
    let app = TestApp::with_failing_store(true, false);
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;

    let resp = app
        .post_online(&path(id), r#"{"online": true}"#, Some(&app.token_for(owner)))
        .await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body["error"], "Failed to read vendor");
    assert!(!app.stored_online(id).await);
}

#[tokio::test]
async fn test_write_failure_is_500() {
    let app = TestApp::with_failing_store(false, true);
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;

    let resp = app
        .post_online(&path(id), r#"{"online": true}"#, Some(&app.token_for(owner)))
        .await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body["error"], "Failed to update vendor status");
    assert!(!app.stored_online(id).await);
}

#[tokio::test]
async fn test_rate_limited() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = 2;
    let app = TestApp::with_config(config);
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;
    let token = app.token_for(owner);

    for _ in 0..2 {
        let resp = app.post_online(&path(id), "", Some(&token)).await;
        assert_eq!(resp.status, StatusCode::OK);
    }
    let resp = app.post_online(&path(id), "", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.body["code"], "RATE_LIMITED");

    // Read-only routes are not limited.
    assert_eq!(app.get("/api/vendors").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_header_still_limited() {
    let app = limited_app(false);
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;
    let token = app.token_for(owner);

    let mut statuses = Vec::new();
    for hop in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
        let resp = app
            .post_online_from(&path(id), &token, peer(7), Some(hop))
            .await;
        statuses.push(resp.status);
    }
    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
}

#[tokio::test]
async fn test_distinct_peers_have_own_budgets() {
    let app = limited_app(false);
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;
    let token = app.token_for(owner);

    for _ in 0..2 {
        let resp = app.post_online_from(&path(id), &token, peer(1), None).await;
        assert_eq!(resp.status, StatusCode::OK);
    }
    let resp = app.post_online_from(&path(id), &token, peer(1), None).await;
    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);

    let resp = app.post_online_from(&path(id), &token, peer(2), None).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_header_keys_clients_when_trusted() {
    let app = limited_app(true);
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;
    let token = app.token_for(owner);

    for hop in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
        let resp = app
            .post_online_from(&path(id), &token, peer(9), Some(hop))
            .await;
        assert_eq!(resp.status, StatusCode::OK, "hop {hop}");
    }
}

#[tokio::test]
async fn test_concurrent_sets_store_a_returned_value() {
    let app = TestApp::new();
    let owner = UserId::new();
    let id = app.seed_vendor(owner, false).await;
    let token = app.token_for(owner);
    let target = path(id);

    let requests = (0..16).map(|i| {
        let body = if i % 2 == 0 {
            r#"{"online": true}"#
        } else {
            r#"{"online": false}"#
        };
        app.post_online(&target, body, Some(&token))
    });
    let responses = join_all(requests).await;

    let mut returned = Vec::new();
    for resp in &responses {
        assert_eq!(resp.status, StatusCode::OK);
        returned.push(resp.body["online"].as_bool().unwrap());
    }
    assert!(returned.contains(&true));
    assert!(returned.contains(&false));
    assert!(returned.contains(&app.stored_online(id).await));
}
