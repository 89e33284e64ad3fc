use axum::{
    Router,
    body::{Body, to_bytes},
    http::Request,
    response::Response,
};
use catalog::Movie;
use title_index::TitleIndex;
use tower::util::ServiceExt;

use crate::{AppState, ServerConfig, app_router};

pub(super) struct TestHarness {
    pub(super) state: AppState,
    pub(super) router: Router,
}

impl TestHarness {
    /// Five well-known movies, default config
    pub(super) fn setup() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub(super) fn with_config(config: ServerConfig) -> Self {
        let mut index = TitleIndex::new();
        index
            .insert_all(vec![
                Movie::new(1, "Inception", 2010, 8.8),
                Movie::new(2, "The Shawshank Redemption", 1994, 9.3),
                Movie::new(3, "The Dark Knight", 2008, 9.0),
                Movie::new(4, "Parasite", 2019, 8.6),
                Movie::new(5, "Interstellar", 2014, 8.6),
            ])
            .expect("seed index");

        let state = AppState::new(index, config);
        let router = app_router(state.clone()).expect("router");
        Self { state, router }
    }

    pub(super) async fn get(&self, path: &str) -> Response {
        self.send(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("get request"),
        )
        .await
    }

    pub(super) async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }
}

pub(super) async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body bytes");
    serde_json::from_slice(&bytes).expect("decode json")
}

pub(super) fn json_request(method: &str, path: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("json request")
}
