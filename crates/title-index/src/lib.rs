//! # Title Index Crate
//!
//! An in-memory prefix tree over normalized movie titles, with ranked
//! prefix search, weighted autocomplete and tree introspection.
//!
//! ## Components
//!
//! ### Index
//! - Titles are lowercased and trimmed before they touch the tree
//! - Nodes hold movie ids only; movies live in a single id -> movie map
//! - Removal prunes branches that no longer lead to a title
//! - `verify()` checks the structural invariants; a failure poisons the index
//!
//! ### Search
//! Movies under a prefix, ranked by:
//! 1. whether their own title starts with the query
//! 2. rating (higher first)
//! 3. year (newer first)
//! 4. insertion order
//!
//! An empty query returns the most popular movies.
//!
//! ### Autocomplete
//! Indexed titles below a prefix, ordered by accumulated insertion weight.
//! Prefixes under two characters get popular titles instead.
//!
//! ## Example Usage
//!
//! ```ignore
//! use title_index::{TitleIndex, DEFAULT_SEARCH_LIMIT};
//!
//! let (index, report) = TitleIndex::from_catalog(catalog::sample_movies());
//!
//! for movie in index.search("the", DEFAULT_SEARCH_LIMIT)? {
//!     println!("{} ({})", movie.title, movie.year);
//! }
//! let words = index.autocomplete("inc", 5)?;
//! ```
//!
//! ## Concurrency
//!
//! The index is `Send + Sync`. Queries take `&self`; mutation takes
//! `&mut self`, so a shared index goes behind a reader/writer lock.

pub mod autocomplete;
pub mod error;
pub mod index;
mod node;
pub mod search;
pub mod stats;

pub use autocomplete::{DEFAULT_AUTOCOMPLETE_LIMIT, MIN_AUTOCOMPLETE_PREFIX};
pub use error::{IndexError, Result, limit_from_signed};
pub use index::{DEFAULT_WEIGHT, LoadReport, TitleIndex, normalize};
pub use search::DEFAULT_SEARCH_LIMIT;
pub use stats::{IndexStats, PrefixCount};
