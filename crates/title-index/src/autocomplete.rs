//! Title completion for search-as-you-type.

use std::cmp::Reverse;

use crate::error::Result;
use crate::index::{TitleIndex, normalize};
use crate::node::Node;

pub const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 10;

/// Prefixes shorter than this (in characters) get popular titles instead of
/// completions.
pub const MIN_AUTOCOMPLETE_PREFIX: usize = 2;

struct Suggestion {
    word: String,
    score: u64,
}

impl TitleIndex {
    /// Complete `prefix` to up to `limit` indexed titles, heaviest first,
    /// ties in lexicographic order.
    ///
    /// Completions are normalized titles. When the prefix is too short or
    /// matches nothing, the display titles of the most popular movies are
    /// returned instead.
    pub fn autocomplete(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        self.ensure_healthy()?;
        let prefix = normalize(prefix);

        if prefix.chars().count() < MIN_AUTOCOMPLETE_PREFIX {
            return Ok(self.popular_titles(limit));
        }
        let Some(node) = self.root.descend(&prefix) else {
            return Ok(self.popular_titles(limit));
        };

        let mut suggestions = Vec::new();
        collect_suggestions(node, &prefix, &mut suggestions);

        suggestions.sort_by(|a, b| suggestion_key(a).cmp(&suggestion_key(b)));
        suggestions.truncate(limit);
        Ok(suggestions.into_iter().map(|s| s.word).collect())
    }

    fn popular_titles(&self, limit: usize) -> Vec<String> {
        self.popular_movies(limit)
            .into_iter()
            .map(|movie| movie.title.clone())
            .collect()
    }
}

fn suggestion_key(suggestion: &Suggestion) -> (Reverse<u64>, &str) {
    (Reverse(suggestion.score), suggestion.word.as_str())
}

fn collect_suggestions(node: &Node, prefix: &str, out: &mut Vec<Suggestion>) {
    node.walk(|suffix, node| {
        if node.terminal && node.weight > 0 {
            let mut word = String::from(prefix);
            word.extend(suffix);
            out.push(Suggestion {
                word,
                score: node.weight,
            });
        }
    });
}
