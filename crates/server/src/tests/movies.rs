use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};

use super::harness::{TestHarness, decode_json, json_request};

#[tokio::test]
async fn hello_and_health_report_index_size() {
    let harness = TestHarness::setup();

    let hello: Value = decode_json(harness.get("/api/hello").await).await;
    assert_eq!(hello["status"], "running");
    assert_eq!(hello["trie_movies"], 5);

    let health: Value = decode_json(harness.get("/api/health").await).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["movies_in_trie"], 5);
    assert_eq!(health["total_movies_cached"], 5);
}

#[tokio::test]
async fn list_movies_in_popularity_order() {
    let harness = TestHarness::setup();

    let payload: Value = decode_json(harness.get("/api/movies").await).await;
    assert_eq!(payload["count"], 5);
    assert_eq!(payload["movies"][0]["title"], "The Shawshank Redemption");
    assert_eq!(payload["movies"][4]["title"], "Interstellar");
}

#[tokio::test]
async fn popular_movies_paginate_with_default_size() {
    let harness = TestHarness::setup();

    let payload: Value = decode_json(harness.get("/api/movies/popular").await).await;
    assert_eq!(payload["page"], 1);
    assert_eq!(payload["total_pages"], 1);
    assert_eq!(payload["results"].as_array().expect("results").len(), 5);
    assert!(payload.get("query").is_none());

    let second: Value =
        decode_json(harness.get("/api/movies/popular?page=2&limit=4").await).await;
    assert_eq!(second["total_pages"], 2);
    assert_eq!(second["results"][0]["title"], "Interstellar");
}

#[tokio::test]
async fn get_movie_by_id() {
    let harness = TestHarness::setup();

    let response = harness.get("/api/movies/4").await;
    assert_eq!(response.status(), StatusCode::OK);
    let movie: Value = decode_json(response).await;
    assert_eq!(movie["title"], "Parasite");
    assert_eq!(movie["year"], 2019);

    let missing = harness.get("/api/movies/99").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let payload: Value = decode_json(missing).await;
    assert_eq!(payload["error"], true);
    assert_eq!(payload["status"], 404);

    let invalid = harness.get("/api/movies/abc").await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_movie_is_searchable() {
    let harness = TestHarness::setup();

    let response = harness
        .send(json_request(
            "POST",
            "/api/movies",
            &json!({"id": 6, "title": "Inside Out", "year": 2015, "rating": 8.1}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = decode_json(response).await;
    assert_eq!(created["language"], "en");

    let payload: Value = decode_json(harness.get("/api/search?q=ins").await).await;
    assert_eq!(payload["results"][0]["title"], "Inside Out");
    assert_eq!(harness.state.index.read().await.size(), 6);
}

#[tokio::test]
async fn create_movie_with_existing_id_replaces_it() {
    let harness = TestHarness::setup();

    let response = harness
        .send(json_request(
            "POST",
            "/api/movies",
            &json!({"id": 4, "title": "Parasite (Black & White)", "year": 2020, "rating": 8.0}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let index = harness.state.index.read().await;
    assert_eq!(index.size(), 5);
    assert_eq!(
        index.lookup(4).expect("healthy").expect("movie").title,
        "Parasite (Black & White)"
    );
    // the old title's terminal is gone, so there are still five titles
    assert_eq!(index.stats().expect("healthy").unique_titles, 5);
    assert_eq!(index.search("parasite", 10).expect("healthy").len(), 1);
}

#[tokio::test]
async fn retitled_movie_keeps_its_tie_break_position() {
    let harness = TestHarness::setup();

    for body in [
        json!({"id": 6, "title": "Heat", "year": 1995, "rating": 8.0}),
        json!({"id": 7, "title": "Heist", "year": 1995, "rating": 8.0}),
        json!({"id": 6, "title": "Heat 2", "year": 1995, "rating": 8.0}),
    ] {
        let response = harness.send(json_request("POST", "/api/movies", &body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let payload: Value = decode_json(harness.get("/api/search?q=he").await).await;
    assert_eq!(payload["results"][0]["title"], "Heat 2");
    assert_eq!(payload["results"][1]["title"], "Heist");
}

#[tokio::test]
async fn very_long_title_round_trips() {
    let harness = TestHarness::setup();
    let title = "z".repeat(100_000);

    let response = harness
        .send(json_request(
            "POST",
            "/api/movies",
            &json!({"id": 6, "title": title, "year": 2024, "rating": 5.0}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload: Value = decode_json(harness.get("/api/search?q=z").await).await;
    assert_eq!(payload["total_results"], 1);
    let stats = harness.get("/api/trie/stats").await;
    assert_eq!(stats.status(), StatusCode::OK);

    let delete = Request::builder()
        .method("DELETE")
        .uri("/api/movies/6")
        .body(Body::empty())
        .expect("delete request");
    assert_eq!(harness.send(delete).await.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn create_movie_rejects_invalid_records() {
    let harness = TestHarness::setup();

    let blank = harness
        .send(json_request("POST", "/api/movies", &json!({"id": 7, "title": "  "})))
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let zero = harness
        .send(json_request("POST", "/api/movies", &json!({"id": 0, "title": "Zero"})))
        .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let malformed = harness
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/movies")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .expect("request"),
        )
        .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    assert_eq!(harness.state.index.read().await.size(), 5);
}

#[tokio::test]
async fn delete_movie_prunes_it_from_search() {
    let harness = TestHarness::setup();

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/movies/1")
        .body(Body::empty())
        .expect("delete request");
    let response = harness.send(request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let payload: Value = decode_json(harness.get("/api/search?q=inc").await).await;
    assert_eq!(payload["total_results"], 0);

    let again = Request::builder()
        .method("DELETE")
        .uri("/api/movies/1")
        .body(Body::empty())
        .expect("delete request");
    assert_eq!(harness.send(again).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_headers_follow_configured_origin() {
    let harness = TestHarness::setup();

    let response = harness
        .send(
            Request::builder()
                .uri("/api/hello")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}
