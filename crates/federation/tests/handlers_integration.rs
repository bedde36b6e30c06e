//! Federation route integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use linkgator_federation::router;
use serde_json::Value;
use support::{ALICE, BOB_INBOX, follow, harness};
use tower::ServiceExt;

const ACTIVITY_JSON: &str = "application/activity+json";

async fn app() -> (Router, support::Harness) {
    let h = harness().await;
    (router(h.state.clone()), h)
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, accept: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ACCEPT, accept)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, ACTIVITY_JSON)
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_actor_document() {
    let (app, _h) = app().await;

    let response = app
        .oneshot(get("/users/alice", ACTIVITY_JSON))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let person = json_body(response).await;
    assert_eq!(person["type"], "Person");
    assert_eq!(person["id"], ALICE);
    assert_eq!(person["name"], "alice");
    assert_eq!(person["preferredUsername"], "alice");
    assert_eq!(person["url"], "https://gator.example/");
    assert_eq!(person["inbox"], "https://gator.example/users/alice/inbox");
    assert_eq!(person["endpoints"]["sharedInbox"], "https://gator.example/inbox");
    assert_eq!(person["publicKey"]["id"], format!("{ALICE}#main-key"));
    assert_eq!(person["publicKey"]["owner"], ALICE);
    assert!(
        person["publicKey"]["publicKeyPem"]
            .as_str()
            .unwrap()
            .starts_with("-----BEGIN PUBLIC KEY-----")
    );
    assert_eq!(person["assertionMethod"], serde_json::json!([format!("{ALICE}#main-key")]));
}

#[tokio::test]
async fn test_actor_document_keeps_its_key() {
    let (app, _h) = app().await;

    let first = json_body(
        app.clone()
            .oneshot(get("/users/alice", ACTIVITY_JSON))
            .await
            .unwrap(),
    )
    .await;
    let second = json_body(
        app.oneshot(get("/users/alice", "application/ld+json"))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(
        first["publicKey"]["publicKeyPem"],
        second["publicKey"]["publicKeyPem"]
    );
}

#[tokio::test]
async fn test_actor_requires_activity_json() {
    let (app, _h) = app().await;

    let response = app.oneshot(get("/users/alice", "text/html")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(response.headers()[header::VARY], "Accept");
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
}

#[tokio::test]
async fn test_unknown_actor_is_not_found() {
    let (app, _h) = app().await;

    let response = app
        .oneshot(get("/users/carol", ACTIVITY_JSON))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_actor_without_database_is_not_found() {
    let (_, h) = app().await;
    assert!(h.registry.unregister("instrumented-database"));
    let app = router(h.state.clone());

    let response = app
        .oneshot(get("/users/alice", ACTIVITY_JSON))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shared_inbox_accepts_follow() {
    let (app, h) = app().await;

    let response = app
        .oneshot(post("/inbox", follow(ALICE).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let sent = h.delivery.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].inbox.as_str(), BOB_INBOX);
}

#[tokio::test]
async fn test_user_inbox_answers_202_even_when_dropped() {
    let (app, h) = app().await;

    let response = app
        .oneshot(post(
            "/users/alice/inbox",
            follow("https://gator.example/users/carol").to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(h.delivery.sent().is_empty());
}

#[tokio::test]
async fn test_inbox_rejects_invalid_json() {
    let (app, h) = app().await;

    let response = app.oneshot(post("/inbox", "{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.metrics.snapshot().activities_received, 0);
}

#[tokio::test]
async fn test_webfinger() {
    let (app, _h) = app().await;

    let response = app
        .oneshot(get(
            "/.well-known/webfinger?resource=acct:alice@gator.example",
            "application/jrd+json",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let jrd = json_body(response).await;
    assert_eq!(jrd["subject"], "acct:alice@gator.example");
    assert_eq!(jrd["links"][0]["rel"], "self");
    assert_eq!(jrd["links"][0]["type"], ACTIVITY_JSON);
    assert_eq!(jrd["links"][0]["href"], ALICE);
}

#[tokio::test]
async fn test_webfinger_errors() {
    let (app, _h) = app().await;

    let cases = [
        ("resource=https://gator.example/users/alice", StatusCode::BAD_REQUEST),
        ("resource=acct:alice@elsewhere.example", StatusCode::NOT_FOUND),
        ("resource=acct:carol@gator.example", StatusCode::NOT_FOUND),
    ];

    for (query, expected) in cases {
        let response = app
            .clone()
            .oneshot(get(
                &format!("/.well-known/webfinger?{query}"),
                "application/jrd+json",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), expected, "{query}");
    }
}
