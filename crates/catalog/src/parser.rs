//! Readers for catalog files.
//!
//! Two formats are understood, chosen by file extension:
//! - `.dat`: one movie per line,
//!   `id::title::year::rating::genres[::runtime[::language[::poster]]]`,
//!   genres pipe-separated (`Action|Sci-Fi`). Blank lines and lines
//!   starting with `#` are skipped.
//! - `.json`: TMDb movie objects, see [`crate::tmdb`].

use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::tmdb::TmdbCatalog;
use crate::types::Movie;

/// Load a catalog file, dispatching on its extension
pub fn load_catalog(path: &Path) -> Result<Vec<Movie>> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let movies = match path.extension().and_then(|ext| ext.to_str()) {
        Some("dat") => parse_dat(path)?,
        Some("json") => parse_json(path)?,
        _ => {
            return Err(CatalogError::UnsupportedFormat {
                path: path.display().to_string(),
            });
        }
    };

    info!("Loaded {} movies from {}", movies.len(), path.display());
    Ok(movies)
}

/// Parse a `.dat` catalog.
///
/// Lines are independent, so they are parsed in parallel; the returned
/// movies keep file order. A malformed line fails the load, and the error
/// names the earliest one in the file.
pub fn parse_dat(path: &Path) -> Result<Vec<Movie>> {
    let file = file_label(path);
    let content = fs::read_to_string(path)?;
    parse_dat_str(&file, &content)
}

/// Parse `.dat` content already held in memory. `file` only labels errors.
pub fn parse_dat_str(file: &str, content: &str) -> Result<Vec<Movie>> {
    let lines: Vec<&str> = content.lines().collect();

    // collect in file order first so the reported error is the earliest line
    let parsed: Vec<Result<Option<Movie>>> = lines
        .par_iter()
        .enumerate()
        .map(|(idx, line)| parse_movie_line(file, idx + 1, line))
        .collect();

    let movies = parsed.into_iter().collect::<Result<Vec<Option<Movie>>>>()?;
    Ok(movies.into_iter().flatten().collect())
}

/// Parse a `.json` catalog of TMDb-shaped movies
pub fn parse_json(path: &Path) -> Result<Vec<Movie>> {
    let file = file_label(path);
    let content = fs::read_to_string(path)?;
    let catalog: TmdbCatalog = serde_json::from_str(&content)
        .map_err(|source| CatalogError::JsonError { file, source })?;
    Ok(catalog.into_movies())
}

/// Parse one `.dat` line. Returns `Ok(None)` for blank and comment lines.
fn parse_movie_line(file: &str, line_no: usize, line: &str) -> Result<Option<Movie>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parse_error = |reason: String| CatalogError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason,
    };

    let mut parts = line.split("::");
    let mut required = |name: &str| {
        parts
            .next()
            .ok_or_else(|| parse_error(format!("Missing {name}")))
    };

    let id = required("movieId")?;
    let title = required("title")?;
    let year = required("year")?;
    let rating = required("rating")?;
    let genres = required("genres")?;

    let id = id
        .trim()
        .parse()
        .map_err(|e| parse_error(format!("Invalid movieId: {e}")))?;
    let year = match year.trim() {
        "" => 0,
        value => value
            .parse()
            .map_err(|e| parse_error(format!("Invalid year: {e}")))?,
    };
    let rating = rating
        .trim()
        .parse()
        .map_err(|e| parse_error(format!("Invalid rating: {e}")))?;

    let mut movie = Movie::new(id, title.trim(), year, rating).with_genres(parse_genres(genres));

    // Optional trailing fields
    if let Some(runtime) = parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        movie.runtime = runtime
            .parse()
            .map_err(|e| parse_error(format!("Invalid runtime: {e}")))?;
    }
    if let Some(language) = parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        movie.language = language.to_string();
    }
    if let Some(poster) = parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        movie.poster = Some(poster.to_string());
    }

    Ok(Some(movie))
}

/// `"Action|Sci-Fi"` -> `["Action", "Sci-Fi"]`
fn parse_genres(s: &str) -> Vec<String> {
    s.split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
