use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};

use super::harness::{TestHarness, decode_json, json_request};
use crate::ServerConfig;

fn session_cookie(response: &Response) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("set-cookie header");
    cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

fn with_cookie(method: &str, path: &str, cookie: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::COOKIE, cookie);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn register_ada(harness: &TestHarness) -> String {
    let response = harness
        .send(json_request(
            "POST",
            "/api/register",
            &json!({"name": "Ada", "email": "ada@example.com", "password": "secret1"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie(&response)
}

#[tokio::test]
async fn register_sets_session_cookie_and_profile_reads_it() {
    let harness = TestHarness::setup();

    let response = harness
        .send(json_request(
            "POST",
            "/api/register",
            &json!({"name": "Ada", "email": "Ada@Example.com", "password": "secret1"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response);
    assert!(cookie.starts_with("session="));
    let payload: Value = decode_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["user"]["email"], "ada@example.com");
    assert_eq!(format!("session={}", payload["session"].as_str().expect("token")), cookie);

    let profile = harness.send(with_cookie("GET", "/api/profile", &cookie, None)).await;
    assert_eq!(profile.status(), StatusCode::OK);
    let profile: Value = decode_json(profile).await;
    assert_eq!(profile["user"]["name"], "Ada");
    assert!(profile["user"]["created_at"].is_string());
}

#[tokio::test]
async fn register_rejects_bad_input() {
    let harness = TestHarness::setup();
    register_ada(&harness).await;

    for (body, status) in [
        (json!({"name": "Ada", "email": "ada@example.com"}), StatusCode::BAD_REQUEST),
        (
            json!({"name": "Ada", "email": "nope", "password": "secret1"}),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({"name": "Ada", "email": "x@example.com", "password": "123"}),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({"name": "Bob", "email": "ada@example.com", "password": "secret2"}),
            StatusCode::CONFLICT,
        ),
    ] {
        let response = harness.send(json_request("POST", "/api/register", &body)).await;
        assert_eq!(response.status(), status, "{body}");
        let payload: Value = decode_json(response).await;
        assert_eq!(payload["error"], true);
    }
}

#[tokio::test]
async fn login_and_logout() {
    let harness = TestHarness::setup();
    register_ada(&harness).await;

    let wrong = harness
        .send(json_request(
            "POST",
            "/api/login",
            &json!({"email": "ada@example.com", "password": "wrong!!"}),
        ))
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let response = harness
        .send(json_request(
            "POST",
            "/api/login",
            &json!({"email": "ada@example.com", "password": "secret1"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);

    let logout = harness.send(with_cookie("POST", "/api/logout", &cookie, None)).await;
    assert_eq!(logout.status(), StatusCode::OK);
    assert_eq!(session_cookie(&logout), "session=");

    let profile = harness.send(with_cookie("GET", "/api/profile", &cookie, None)).await;
    assert_eq!(profile.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_token_authenticates() {
    let harness = TestHarness::setup();
    let cookie = register_ada(&harness).await;
    let token = cookie.trim_start_matches("session=");

    let response = harness
        .send(
            Request::builder()
                .uri("/api/profile")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn favorites_require_a_session() {
    let harness = TestHarness::setup();

    assert_eq!(harness.get("/api/favorites").await.status(), StatusCode::UNAUTHORIZED);
    let response = harness
        .send(json_request("POST", "/api/favorites", &json!({"movieId": 1})))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let stale = harness
        .send(with_cookie("GET", "/api/favorites", "session=stale", None))
        .await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn favorites_toggle_and_resolve_through_index() {
    let harness = TestHarness::setup();
    let cookie = register_ada(&harness).await;

    for id in [4, 1] {
        let response = harness
            .send(with_cookie("POST", "/api/favorites", &cookie, Some(json!({"movieId": id}))))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload: Value = decode_json(response).await;
        assert_eq!(payload["favorited"], true);
        assert_eq!(payload["message"], "Added to favorites");
    }

    let listed: Value = decode_json(
        harness.send(with_cookie("GET", "/api/favorites", &cookie, None)).await,
    )
    .await;
    assert_eq!(listed["count"], 2);
    assert_eq!(listed["favorites"][0]["title"], "Inception");
    assert_eq!(listed["favorites"][1]["title"], "Parasite");

    // toggling again removes it
    let again: Value = decode_json(
        harness
            .send(with_cookie("POST", "/api/favorites", &cookie, Some(json!({"movieId": 1}))))
            .await,
    )
    .await;
    assert_eq!(again["favorited"], false);

    let unknown = harness
        .send(with_cookie("POST", "/api/favorites", &cookie, Some(json!({"movieId": 99}))))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_skip_movies_deleted_from_index() {
    let harness = TestHarness::setup();
    let cookie = register_ada(&harness).await;

    for id in [2, 3] {
        let response = harness
            .send(with_cookie("POST", "/api/favorites", &cookie, Some(json!({"movieId": id}))))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let delete = Request::builder()
        .method("DELETE")
        .uri("/api/movies/2")
        .body(Body::empty())
        .expect("delete request");
    assert_eq!(harness.send(delete).await.status(), StatusCode::NO_CONTENT);

    let listed: Value = decode_json(
        harness.send(with_cookie("GET", "/api/favorites", &cookie, None)).await,
    )
    .await;
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["favorites"][0]["id"], 3);
}

#[tokio::test]
async fn delete_favorite() {
    let harness = TestHarness::setup();
    let cookie = register_ada(&harness).await;
    harness
        .send(with_cookie("POST", "/api/favorites", &cookie, Some(json!({"movieId": 5}))))
        .await;

    let removed = harness
        .send(with_cookie("DELETE", "/api/favorites/5", &cookie, None))
        .await;
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);
    let missing = harness
        .send(with_cookie("DELETE", "/api/favorites/5", &cookie, None))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_files_served_outside_api() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("index.html"), "<h1>Movie Explorer</h1>").expect("write index");
    let harness = TestHarness::with_config(ServerConfig::default().with_static_dir(dir.path()));

    let response = harness.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    assert_eq!(&body[..], b"<h1>Movie Explorer</h1>");

    assert_eq!(harness.get("/missing.css").await.status(), StatusCode::NOT_FOUND);
    // API routes still win over the static directory
    let hello: Value = decode_json(harness.get("/api/hello").await).await;
    assert_eq!(hello["status"], "running");
}

#[tokio::test]
async fn without_static_dir_unknown_paths_are_not_found() {
    let harness = TestHarness::setup();
    assert_eq!(harness.get("/index.html").await.status(), StatusCode::NOT_FOUND);
}
