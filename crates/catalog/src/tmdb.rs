//! Mapping from TMDb movie payloads to catalog movies.
//!
//! TMDb returns movies either as a bare array or wrapped in a paged
//! `{"results": [...]}` envelope. Both shapes decode through
//! [`TmdbCatalog`].

use serde::Deserialize;

use crate::types::{FALLBACK_GENRE, Movie, MovieId, NO_DESCRIPTION};

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const BACKDROP_BASE_URL: &str = "https://image.tmdb.org/t/p/w1280";
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/500x750?text=No+Poster";

/// One movie as TMDb describes it. Every field is optional on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    #[serde(default)]
    pub id: MovieId,
    pub title: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    pub overview: Option<String>,
    pub original_language: Option<String>,
    pub runtime: Option<u16>,
    pub popularity: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: Option<String>,
}

/// Either a bare list of movies or a paged search/popular response
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TmdbCatalog {
    Paged { results: Vec<TmdbMovie> },
    List(Vec<TmdbMovie>),
}

impl TmdbCatalog {
    pub fn into_movies(self) -> Vec<Movie> {
        let raw = match self {
            TmdbCatalog::Paged { results } => results,
            TmdbCatalog::List(list) => list,
        };
        raw.into_iter().map(Movie::from).collect()
    }
}

impl From<TmdbMovie> for Movie {
    fn from(raw: TmdbMovie) -> Self {
        let year = raw
            .release_date
            .as_deref()
            .and_then(release_year)
            .unwrap_or(0);

        let poster = raw
            .poster_path
            .map(|path| format!("{POSTER_BASE_URL}{path}"))
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());
        let backdrop = raw
            .backdrop_path
            .map(|path| format!("{BACKDROP_BASE_URL}{path}"))
            .unwrap_or_else(|| poster.clone());

        let mut genres: Vec<String> = raw.genres.into_iter().filter_map(|g| g.name).collect();
        if genres.is_empty() {
            genres.push(FALLBACK_GENRE.to_string());
        }

        Movie::new(
            raw.id,
            raw.title.unwrap_or_else(|| "Unknown".to_string()),
            year,
            raw.vote_average,
        )
        .with_poster(poster)
        .with_backdrop(backdrop)
        .with_genres(genres)
        .with_description(raw.overview.unwrap_or_else(|| NO_DESCRIPTION.to_string()))
        .with_runtime(raw.runtime.unwrap_or(0))
        .with_language(raw.original_language.unwrap_or_else(|| "en".to_string()))
        .with_popularity(raw.popularity.unwrap_or(0.0))
    }
}

/// `"2010-07-15"` -> `Some(2010)`; anything without four leading digits -> `None`
fn release_year(date: &str) -> Option<u16> {
    date.get(..4)?.parse().ok()
}
