//! The movie record shared by every crate in the workspace.
//!
//! A `Movie` is immutable by convention: the index replaces whole records
//! on update instead of editing them in place. Identity is the `id` alone,
//! so two records with the same id compare equal even if their titles or
//! ratings differ.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie. Valid ids are strictly positive.
pub type MovieId = u32;

/// Earliest year (exclusive) a movie needs to count as valid.
pub const MIN_VALID_YEAR: u16 = 1900;

/// Popularity per rating point when a record carries none.
pub const DEFAULT_POPULARITY_PER_RATING: f32 = 100.0;

/// Genre shown when a movie has none.
pub const FALLBACK_GENRE: &str = "Movie";

/// Description shown when a movie has none.
pub const NO_DESCRIPTION: &str = "No description available.";

// =============================================================================
// Movie
// =============================================================================

/// A catalog movie: identity plus displayable and rankable attributes.
///
/// Deserialized records may omit everything but `id` and `title`; a missing
/// popularity is derived from the rating as in [`Movie::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "MovieRecord")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Release year, `0` when unknown
    pub year: u16,
    /// Average rating on a 0.0 - 10.0 scale
    pub rating: f32,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub genres: Vec<String>,
    pub description: String,
    /// Runtime in minutes, `0` when unknown
    pub runtime: u16,
    pub language: String,
    pub popularity: f32,
}

/// Wire form of [`Movie`] with the optional fields left open
#[derive(Deserialize)]
struct MovieRecord {
    id: MovieId,
    title: String,
    #[serde(default)]
    year: u16,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    backdrop: Option<String>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    runtime: u16,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default)]
    popularity: Option<f32>,
}

impl From<MovieRecord> for Movie {
    fn from(record: MovieRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            year: record.year,
            rating: record.rating,
            poster: record.poster,
            backdrop: record.backdrop,
            genres: record.genres,
            description: record.description,
            runtime: record.runtime,
            language: record.language,
            popularity: record
                .popularity
                .unwrap_or(record.rating * DEFAULT_POPULARITY_PER_RATING),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

impl Movie {
    /// Create a movie with the ranking attributes set and presentation
    /// fields defaulted. Popularity starts at `rating * 100`.
    pub fn new(id: MovieId, title: impl Into<String>, year: u16, rating: f32) -> Self {
        Self {
            id,
            title: title.into(),
            year,
            rating,
            poster: None,
            backdrop: None,
            genres: Vec::new(),
            description: String::new(),
            runtime: 0,
            language: default_language(),
            popularity: rating * DEFAULT_POPULARITY_PER_RATING,
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    pub fn with_backdrop(mut self, backdrop: impl Into<String>) -> Self {
        self.backdrop = Some(backdrop.into());
        self
    }

    pub fn with_runtime(mut self, minutes: u16) -> Self {
        self.runtime = minutes;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_popularity(mut self, popularity: f32) -> Self {
        self.popularity = popularity;
        self
    }

    /// A movie is valid when it has a positive id, a non-blank title and a
    /// release year after 1900.
    pub fn is_valid(&self) -> bool {
        self.id > 0 && !self.title.trim().is_empty() && self.year > MIN_VALID_YEAR
    }

    /// Runtime rendered as `"2h 15m"`, `"2h"`, `"45m"`, or `"N/A"`.
    pub fn formatted_runtime(&self) -> String {
        if self.runtime == 0 {
            return "N/A".to_string();
        }
        let hours = self.runtime / 60;
        let minutes = self.runtime % 60;
        match (hours, minutes) {
            (0, m) => format!("{m}m"),
            (h, 0) => format!("{h}h"),
            (h, m) => format!("{h}h {m}m"),
        }
    }

    /// Rating mapped onto five stars, e.g. `8.8` becomes `"★★★★☆"`.
    ///
    /// Each star is two rating points; a remainder of at least one point
    /// adds a half star.
    pub fn star_rating(&self) -> String {
        let rating = self.rating.clamp(0.0, 10.0);
        let full = (rating / 2.0).floor() as usize;
        let half = usize::from(full < 5 && rating % 2.0 >= 1.0);
        let empty = 5 - full - half;

        let mut stars = "★".repeat(full);
        if half > 0 {
            stars.push('½');
        }
        stars.push_str(&"☆".repeat(empty));
        stars
    }

    pub fn primary_genre(&self) -> &str {
        self.genres.first().map_or(FALLBACK_GENRE, String::as_str)
    }

    pub fn genres_string(&self) -> String {
        if self.genres.is_empty() {
            return FALLBACK_GENRE.to_string();
        }
        self.genres.join(", ")
    }

    /// Description cut to `max_chars` characters, ending in `"..."` when
    /// truncated.
    pub fn short_description(&self, max_chars: usize) -> String {
        if self.description.is_empty() {
            return NO_DESCRIPTION.to_string();
        }
        if self.description.chars().count() <= max_chars {
            return self.description.clone();
        }
        let keep = max_chars.saturating_sub(3);
        let mut short: String = self.description.chars().take(keep).collect();
        short.push_str("...");
        short
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Movie {}

impl Hash for Movie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Movie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Movie{{id={}, title='{}', year={}, rating={:.1}, genres={:?}}}",
            self.id, self.title, self.year, self.rating, self.genres
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_is_by_id() {
        let a = Movie::new(1, "Inception", 2010, 8.8);
        let b = Movie::new(1, "Something Else", 1999, 1.0);
        let c = Movie::new(2, "Inception", 2010, 8.8);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Movie> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_validity() {
        assert!(Movie::new(1, "Inception", 2010, 8.8).is_valid());
        assert!(!Movie::new(0, "Inception", 2010, 8.8).is_valid());
        assert!(!Movie::new(1, "   ", 2010, 8.8).is_valid());
        assert!(!Movie::new(1, "Inception", 1900, 8.8).is_valid());
    }

    #[test]
    fn test_formatted_runtime() {
        let movie = Movie::new(1, "Inception", 2010, 8.8);
        assert_eq!(movie.formatted_runtime(), "N/A");
        assert_eq!(movie.clone().with_runtime(135).formatted_runtime(), "2h 15m");
        assert_eq!(movie.clone().with_runtime(120).formatted_runtime(), "2h");
        assert_eq!(movie.with_runtime(45).formatted_runtime(), "45m");
    }

    #[test]
    fn test_star_rating() {
        assert_eq!(Movie::new(1, "a", 2000, 8.8).star_rating(), "★★★★☆");
        assert_eq!(Movie::new(1, "a", 2000, 9.3).star_rating(), "★★★★½");
        assert_eq!(Movie::new(1, "a", 2000, 10.0).star_rating(), "★★★★★");
        assert_eq!(Movie::new(1, "a", 2000, 0.0).star_rating(), "☆☆☆☆☆");
        assert_eq!(Movie::new(1, "a", 2000, 5.0).star_rating(), "★★½☆☆");
    }

    #[test]
    fn test_genre_fallbacks() {
        let movie = Movie::new(1, "a", 2000, 5.0);
        assert_eq!(movie.primary_genre(), "Movie");
        assert_eq!(movie.genres_string(), "Movie");

        let movie = movie.with_genres(["Drama", "Crime"]);
        assert_eq!(movie.primary_genre(), "Drama");
        assert_eq!(movie.genres_string(), "Drama, Crime");
    }

    #[test]
    fn test_short_description() {
        let movie = Movie::new(1, "a", 2000, 5.0);
        assert_eq!(movie.short_description(10), NO_DESCRIPTION);

        let movie = movie.with_description("Batman faces the Joker in Gotham City.");
        assert_eq!(movie.short_description(100), "Batman faces the Joker in Gotham City.");
        assert_eq!(movie.short_description(12), "Batman fa...");
    }

    #[test]
    fn test_deserialize_defaults() {
        let movie: Movie =
            serde_json::from_str(r#"{"id": 7, "title": "Pulp Fiction"}"#).unwrap();
        assert_eq!(movie.id, 7);
        assert_eq!(movie.year, 0);
        assert_eq!(movie.language, "en");
        assert!(movie.genres.is_empty());
        assert!(movie.poster.is_none());
        assert_eq!(movie.popularity, 0.0);
    }

    #[test]
    fn test_deserialize_derives_popularity_from_rating() {
        let movie: Movie =
            serde_json::from_str(r#"{"id": 6, "title": "Inside Out", "rating": 8.0}"#).unwrap();
        assert_eq!(movie.popularity, 800.0);

        let explicit: Movie = serde_json::from_str(
            r#"{"id": 6, "title": "Inside Out", "rating": 8.0, "popularity": 12.5}"#,
        )
        .unwrap();
        assert_eq!(explicit.popularity, 12.5);
    }
}
