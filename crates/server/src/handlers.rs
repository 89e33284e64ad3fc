use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use catalog::{Movie, MovieId};
use title_index::{DEFAULT_AUTOCOMPLETE_LIMIT, normalize};
use tracing::{debug, info};

use crate::AppState;
use crate::dto::{
    AuthResponse, DEFAULT_POPULAR_PAGE_SIZE, DEFAULT_SEARCH_PAGE_SIZE, DEFAULT_TOP_PREFIXES,
    FavoriteRequest, FavoriteToggleResponse, FavoritesResponse, HealthResponse, HelloResponse,
    LoginRequest, MessageResponse, MovieListResponse, Page, PageQuery, PagedResponse,
    ProfileResponse, RegisterRequest, SearchQuery, StatsQuery, StatsResponse, SuggestionsQuery,
    SuggestionsResponse, positive_limit,
};
use crate::error::ApiError;
use crate::users::{Profile, SESSION_TTL, UserError, UserId};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

type ApiResult<T> = Result<T, ApiError>;

pub async fn hello(State(state): State<AppState>) -> Json<HelloResponse> {
    let index = state.index.read().await;
    Json(HelloResponse {
        message: "Movie Explorer API v1.0".to_string(),
        status: "running".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        trie_movies: index.size(),
    })
}

pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let index = state.index.read().await;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        service: "Movie Explorer Backend".to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
        movies_in_trie: index.size(),
        total_movies_cached: index.all_movies()?.count(),
    }))
}

pub async fn list_movies(State(state): State<AppState>) -> ApiResult<Json<MovieListResponse>> {
    let index = state.index.read().await;
    let movies: Vec<Movie> = index
        .search("", usize::MAX)?
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(MovieListResponse {
        count: movies.len(),
        movies,
    }))
}

pub async fn popular_movies(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<PagedResponse>> {
    let Query(query) = query?;
    let page = Page::from_query(query.page, query.limit, DEFAULT_POPULAR_PAGE_SIZE)?;

    let index = state.index.read().await;
    let ranked = index.search("", usize::MAX)?;
    Ok(Json(page.respond(None, &ranked)))
}

pub async fn get_movie(
    State(state): State<AppState>,
    id: Result<Path<MovieId>, PathRejection>,
) -> ApiResult<Json<Movie>> {
    let Path(id) = id?;
    let index = state.index.read().await;
    match index.lookup(id)? {
        Some(movie) => Ok(Json(movie.clone())),
        None => Err(ApiError::NotFound(format!("Movie {id} not found"))),
    }
}

/// Insert a movie, or replace the one with the same id.
///
/// A replacement under a different title drops the old title from the index
/// but keeps the movie's place among equally ranked results.
pub async fn create_movie(
    State(state): State<AppState>,
    body: Result<Json<Movie>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(movie) = body?;
    let mut index = state.index.write().await;

    let previous_title = index.lookup(movie.id)?.map(|existing| existing.title.clone());
    match previous_title {
        Some(title) => index.retitle(&title, movie.clone())?,
        None => index.insert_movie(movie.clone())?,
    }
    info!(id = movie.id, title = %movie.title, "Stored movie");
    Ok((StatusCode::CREATED, Json(movie)).into_response())
}

pub async fn delete_movie(
    State(state): State<AppState>,
    id: Result<Path<MovieId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let mut index = state.index.write().await;

    let Some(title) = index.lookup(id)?.map(|movie| movie.title.clone()) else {
        return Err(ApiError::NotFound(format!("Movie {id} not found")));
    };
    if !index.remove(&title, id)? {
        return Err(ApiError::NotFound(format!("Movie {id} not found")));
    }
    info!(id, title = %title, "Deleted movie");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<PagedResponse>> {
    let Query(query) = query?;
    let page = Page::from_query(query.page, query.limit, DEFAULT_SEARCH_PAGE_SIZE)?;
    let normalized = normalize(&query.q);

    let index = state.index.read().await;
    let ranked = index.search(&normalized, state.config.search_cap)?;
    debug!("Search \"{}\" -> {} results", normalized, ranked.len());
    Ok(Json(page.respond(Some(normalized), &ranked)))
}

pub async fn suggestions(
    State(state): State<AppState>,
    query: Result<Query<SuggestionsQuery>, QueryRejection>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let Query(query) = query?;
    let limit = positive_limit(query.limit, DEFAULT_AUTOCOMPLETE_LIMIT)?;
    let prefix = normalize(&query.q);

    let index = state.index.read().await;
    let suggestions = index.autocomplete(&prefix, limit)?;
    Ok(Json(SuggestionsResponse {
        prefix,
        count: suggestions.len(),
        suggestions,
    }))
}

pub async fn trie_stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<Json<StatsResponse>> {
    let Query(query) = query?;
    let top = positive_limit(query.top, DEFAULT_TOP_PREFIXES)?;

    let index = state.index.read().await;
    Ok(Json(StatsResponse {
        data_structure: "Trie (Prefix Tree)",
        stats: index.stats()?,
        most_common_prefixes: index.most_common_prefixes(top)?,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = body?;
    let (user, session) = state
        .users
        .write()
        .await
        .register(&request.name, &request.email, &request.password)?;
    Ok(signed_in(StatusCode::CREATED, "Registration successful", user, session))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = body?;
    let (user, session) = state
        .users
        .write()
        .await
        .login(&request.email, &request.password)?;
    Ok(signed_in(StatusCode::OK, "Login successful", user, session))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.users.write().await.logout(&token);
    }
    (
        [(header::SET_COOKIE, session_cookie("", 0))],
        Json(MessageResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
        .into_response()
}

pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ProfileResponse>> {
    let user = current_user(&state, &headers).await?;
    let profile = state.users.read().await.profile(user)?.clone();
    Ok(Json(ProfileResponse {
        success: true,
        user: profile,
    }))
}

/// The caller's favorites that are still in the index, newest first
pub async fn list_favorites(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<FavoritesResponse>> {
    let user = current_user(&state, &headers).await?;
    let ids = state.users.read().await.favorites(user)?.to_vec();

    let index = state.index.read().await;
    let mut favorites = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(movie) = index.lookup(id)? {
            favorites.push(movie.clone());
        }
    }
    Ok(Json(FavoritesResponse {
        success: true,
        count: favorites.len(),
        favorites,
    }))
}

/// Add a movie to the caller's favorites, or remove it when already there
pub async fn toggle_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<FavoriteRequest>, JsonRejection>,
) -> ApiResult<Json<FavoriteToggleResponse>> {
    let user = current_user(&state, &headers).await?;
    let Json(request) = body?;
    let movie = request.movie_id;
    if state.index.read().await.lookup(movie)?.is_none() {
        return Err(ApiError::NotFound("Movie not found".to_string()));
    }

    let favorited = state.users.write().await.toggle_favorite(user, movie)?;
    debug!(user, movie, favorited, "Toggled favorite");
    let message = if favorited {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };
    Ok(Json(FavoriteToggleResponse {
        success: true,
        message: message.to_string(),
        favorited,
    }))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<MovieId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let user = current_user(&state, &headers).await?;
    let Path(movie) = id?;
    if !state.users.write().await.remove_favorite(user, movie)? {
        return Err(ApiError::NotFound(format!("Movie {movie} is not a favorite")));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn signed_in(status: StatusCode, message: &str, user: Profile, session: String) -> Response {
    let cookie = session_cookie(&session, SESSION_TTL.as_secs());
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            message: message.to_string(),
            user,
            session,
        }),
    )
        .into_response()
}

fn session_cookie(token: &str, max_age: u64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; Max-Age={max_age}; SameSite=Lax")
}

/// Session token from the `session` cookie, else from a bearer token
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(str::to_string)
    })
}

async fn current_user(state: &AppState, headers: &HeaderMap) -> ApiResult<UserId> {
    let token = session_token(headers).ok_or(UserError::NotAuthenticated)?;
    Ok(state.users.read().await.authenticate(&token)?)
}
