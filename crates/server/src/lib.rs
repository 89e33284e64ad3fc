//! HTTP front end for the movie explorer.
//!
//! Serves search, suggestions and catalog browsing as JSON over a single
//! shared [`TitleIndex`]. Readers share the index; the two mutating movie
//! endpoints take the write half of the lock. Accounts, sessions and
//! favorites live in a separate in-memory [`UserStore`], and any path the
//! API does not route can be served from a static directory.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use title_index::TitleIndex;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

pub mod config;
pub mod dto;
pub mod error;
mod handlers;
pub mod users;

#[cfg(test)]
mod tests;

pub use config::ServerConfig;
pub use error::ApiError;
pub use users::UserStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) index: Arc<RwLock<TitleIndex>>,
    pub(crate) users: Arc<RwLock<UserStore>>,
    pub(crate) config: Arc<ServerConfig>,
    pub(crate) started: Instant,
}

impl AppState {
    fn new(index: TitleIndex, config: ServerConfig) -> Self {
        Self {
            index: Arc::new(RwLock::new(index)),
            users: Arc::new(RwLock::new(UserStore::new())),
            config: Arc::new(config),
            started: Instant::now(),
        }
    }
}

/// Serve `index` until Ctrl-C.
///
/// # Errors
/// Returns an error when the allowed origin is not a valid header value,
/// the socket cannot be bound, or the server exits with a runtime failure.
pub async fn serve(index: TitleIndex, config: ServerConfig) -> Result<()> {
    let bind_addr = config.bind_addr();
    let router = app_router(AppState::new(index, config))?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind server at {bind_addr}"))?;
    info!("Movie explorer listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("server failed")
}

pub(crate) fn app_router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.allowed_origin)?;
    let mut router = Router::new()
        .route("/api/hello", get(handlers::hello))
        .route("/api/health", get(handlers::health))
        .route(
            "/api/movies",
            get(handlers::list_movies).post(handlers::create_movie),
        )
        .route("/api/movies/popular", get(handlers::popular_movies))
        .route(
            "/api/movies/:id",
            get(handlers::get_movie).delete(handlers::delete_movie),
        )
        .route("/api/search", get(handlers::search))
        .route("/api/suggestions", get(handlers::suggestions))
        .route("/api/trie/stats", get(handlers::trie_stats))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/profile", get(handlers::profile))
        .route(
            "/api/favorites",
            get(handlers::list_favorites).post(handlers::toggle_favorite),
        )
        .route("/api/favorites/:id", delete(handlers::remove_favorite));

    if let Some(dir) = &state.config.static_dir {
        info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    Ok(router
        .layer(cors)
        .layer(middleware::from_fn(log_requests))
        .with_state(state))
}

fn cors_layer(allowed_origin: &str) -> Result<CorsLayer> {
    let origin = if allowed_origin == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(allowed_origin)
            .with_context(|| format!("invalid allowed origin: {allowed_origin}"))?;
        AllowOrigin::exact(value)
    };
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;
    info!(
        "{} {} -> {} ({:.2}ms)",
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    response
}
