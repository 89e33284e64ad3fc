use catalog::{Movie, MovieId};
use serde::{Deserialize, Serialize};
use title_index::{IndexStats, PrefixCount, limit_from_signed};

use crate::error::ApiError;
use crate::users::Profile;

pub const DEFAULT_SEARCH_PAGE_SIZE: usize = 20;
pub const DEFAULT_POPULAR_PAGE_SIZE: usize = 10;
pub const DEFAULT_TOP_PREFIXES: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub top: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: String,
    pub status: String,
    pub timestamp: String,
    pub trie_movies: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub uptime_seconds: u64,
    pub movies_in_trie: usize,
    pub total_movies_cached: usize,
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub count: usize,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Serialize)]
pub struct PagedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub results: Vec<Movie>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub prefix: String,
    pub suggestions: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub data_structure: &'static str,
    #[serde(flatten)]
    pub stats: IndexStats,
    pub most_common_prefixes: Vec<PrefixCount>,
}

// Missing account fields deserialize as empty so the store reports them

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    #[serde(rename = "movieId", alias = "movie_id")]
    pub movie_id: MovieId,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: Profile,
    pub session: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: Profile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteToggleResponse {
    pub success: bool,
    pub message: String,
    pub favorited: bool,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub success: bool,
    pub favorites: Vec<Movie>,
    pub count: usize,
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    pub fn from_query(
        page: Option<i64>,
        limit: Option<i64>,
        default_size: usize,
    ) -> Result<Self, ApiError> {
        let number = match page {
            None => 1,
            Some(raw) if raw >= 1 => limit_from_signed(raw)?,
            Some(raw) => {
                return Err(ApiError::BadRequest(format!(
                    "page must be at least 1, got {raw}"
                )));
            }
        };
        let size = positive_limit(limit, default_size)?;
        Ok(Self { number, size })
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.size)
    }

    /// The items on this page; empty once past the end
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.number - 1).saturating_mul(self.size);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.size).min(items.len());
        &items[start..end]
    }

    /// Paginate `movies`, cloning only the visible page
    pub fn respond(&self, query: Option<String>, movies: &[&Movie]) -> PagedResponse {
        PagedResponse {
            query,
            page: self.number,
            total_pages: self.total_pages(movies.len()),
            total_results: movies.len(),
            results: self.slice(movies).iter().map(|&m| m.clone()).collect(),
        }
    }
}

/// A limit that must be at least 1 when given
pub fn positive_limit(raw: Option<i64>, default: usize) -> Result<usize, ApiError> {
    match raw {
        None => Ok(default),
        Some(0) => Err(ApiError::BadRequest("limit must be at least 1".to_string())),
        Some(raw) => Ok(limit_from_signed(raw)?),
    }
}
