//! # Catalog Crate
//!
//! The movie record and the ways to obtain a list of them at startup.
//!
//! ## Main Components
//!
//! - **types**: the `Movie` record and its presentation helpers
//! - **parser**: `.dat` and `.json` catalog files
//! - **tmdb**: mapping from TMDb payloads to `Movie`
//! - **seed**: the built-in sample catalog
//! - **error**: error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{load_catalog, sample_movies};
//! use std::path::Path;
//!
//! let movies = load_catalog(Path::new("data/movies.dat"))?;
//! let fallback = sample_movies();
//! ```

pub mod error;
pub mod parser;
pub mod seed;
pub mod tmdb;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use parser::load_catalog;
pub use seed::sample_movies;
pub use types::{Movie, MovieId};
