//! Prefix search over the title tree.
//!
//! Results are ranked by an explicit key: titles that themselves start with
//! the query come first, then higher rating, then newer year, then earlier
//! insertion. Every key is unique per movie, so output never depends on hash
//! iteration order.

use catalog::{Movie, MovieId};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::index::{Entry, TitleIndex, normalize};
use crate::node::Node;

/// Result cap used when a caller does not supply one
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Sort key for ranked movies. Smaller sorts first.
#[derive(Debug, Clone, Copy)]
struct RankKey {
    /// 0 when the movie's own title starts with the query, 1 otherwise
    tier: u8,
    rating: f32,
    year: u16,
    seq: u64,
}

impl RankKey {
    fn search(entry: &Entry, prefix: &str) -> Self {
        let tier = if normalize(&entry.movie.title).starts_with(prefix) {
            0
        } else {
            1
        };
        Self {
            tier,
            ..Self::popularity(entry)
        }
    }

    fn popularity(entry: &Entry) -> Self {
        Self {
            tier: 0,
            rating: entry.movie.rating,
            year: entry.movie.year,
            seq: entry.seq,
        }
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| other.rating.total_cmp(&self.rating))
            .then_with(|| other.year.cmp(&self.year))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl TitleIndex {
    /// Find up to `limit` movies whose indexed title starts with `prefix`.
    ///
    /// An empty (or all-whitespace) prefix returns the most popular movies
    /// instead. An unknown prefix returns an empty list.
    #[instrument(skip(self), level = "debug")]
    pub fn search(&self, prefix: &str, limit: usize) -> Result<Vec<&Movie>> {
        self.ensure_healthy()?;
        let start = Instant::now();
        let prefix = normalize(prefix);

        if prefix.is_empty() {
            return Ok(self.popular_movies(limit));
        }
        let Some(node) = self.root.descend(&prefix) else {
            debug!("No titles start with \"{}\"", prefix);
            return Ok(Vec::new());
        };

        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        collect_ids(node, &mut ids, &mut seen);

        // ids without a movie are skipped rather than reported
        let mut hits: Vec<&Entry> = ids.iter().filter_map(|id| self.by_id.get(id)).collect();
        hits.sort_by_cached_key(|entry| RankKey::search(entry, &prefix));
        hits.truncate(limit);

        debug!(
            "Title search \"{}\": {} candidates -> {} results in {:.2}ms",
            prefix,
            ids.len(),
            hits.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(hits.into_iter().map(|entry| &entry.movie).collect())
    }

    /// Top `limit` movies by rating, then year, then insertion order.
    pub(crate) fn popular_movies(&self, limit: usize) -> Vec<&Movie> {
        let mut entries: Vec<&Entry> = self.by_id.values().collect();
        entries.sort_by_cached_key(|entry| RankKey::popularity(entry));
        entries.truncate(limit);
        entries.into_iter().map(|entry| &entry.movie).collect()
    }
}

/// Depth-first id collection. Heavier children are visited first, and each id
/// is kept at its first occurrence only.
fn collect_ids(node: &Node, ids: &mut Vec<MovieId>, seen: &mut HashSet<MovieId>) {
    node.walk_by_weight(|_, node| {
        if node.terminal {
            ids.extend(node.ids.iter().filter(|&&id| seen.insert(id)));
        }
    });
}
