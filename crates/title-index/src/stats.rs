//! Read-only introspection of the title tree.

use serde::Serialize;
use std::cmp::Reverse;

use crate::error::Result;
use crate::index::TitleIndex;
use crate::node::Node;

/// Rough per-movie footprint used for the memory estimate
const APPROX_BYTES_PER_MOVIE: usize = 1000;

/// Prefixes must cover more than this many title insertions to be reported
/// by [`TitleIndex::most_common_prefixes`].
const COMMON_PREFIX_MIN_WEIGHT: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    /// Same as [`TitleIndex::size`]
    pub total_movies: usize,
    /// Number of terminal nodes
    pub unique_titles: usize,
    /// Number of nodes, root included
    pub total_nodes: usize,
    /// Mean character depth of terminal nodes, 0.0 when there are none
    pub average_terminal_depth: f64,
    /// Human-readable size estimate ("12 bytes", "3.4 KB", "1.2 MB")
    pub memory_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixCount {
    pub prefix: String,
    pub weight: u64,
}

impl TitleIndex {
    pub fn stats(&self) -> Result<IndexStats> {
        self.ensure_healthy()?;

        let mut unique_titles = 0;
        let mut total_nodes = 0;
        let mut depth_sum = 0usize;

        let mut stack: Vec<(&Node, usize)> = vec![(&self.root, 0)];
        while let Some((node, depth)) = stack.pop() {
            total_nodes += 1;
            if node.terminal {
                unique_titles += 1;
                depth_sum += depth;
            }
            stack.extend(node.children.values().map(|child| (child, depth + 1)));
        }

        let average_terminal_depth = if unique_titles == 0 {
            0.0
        } else {
            depth_sum as f64 / unique_titles as f64
        };

        Ok(IndexStats {
            total_movies: self.size(),
            unique_titles,
            total_nodes,
            average_terminal_depth,
            memory_estimate: format_bytes(self.size() * APPROX_BYTES_PER_MOVIE),
        })
    }

    /// The `n` heaviest prefixes longer than one character, heaviest first.
    ///
    /// Only prefixes crossed by more than five weighted insertions count.
    pub fn most_common_prefixes(&self, n: usize) -> Result<Vec<PrefixCount>> {
        self.ensure_healthy()?;

        let mut found = Vec::new();
        self.root.walk(|path, node| {
            if path.len() > 1 && node.weight > COMMON_PREFIX_MIN_WEIGHT {
                found.push(PrefixCount {
                    prefix: path.iter().collect(),
                    weight: node.weight,
                });
            }
        });

        found.sort_by(|a, b| {
            (Reverse(a.weight), a.prefix.as_str()).cmp(&(Reverse(b.weight), b.prefix.as_str()))
        });
        found.truncate(n);
        Ok(found)
    }

    /// Indented dump of the whole tree, one node per line.
    ///
    /// ```text
    /// [] (words: 0)
    ///   [u] (words: 2)
    ///     [up] ★ 1 movies (words: 1)
    /// ```
    pub fn render_tree(&self) -> Result<String> {
        self.ensure_healthy()?;
        let mut out = String::new();
        self.root.walk(|path, node| render_line(&mut out, path, node));
        Ok(out)
    }
}

fn render_line(out: &mut String, path: &[char], node: &Node) {
    let marker = if node.terminal {
        format!("★ {} movies ", node.ids.len())
    } else {
        String::new()
    };
    out.push_str(&format!(
        "{}[{}] {}(words: {})\n",
        "  ".repeat(path.len()),
        path.iter().collect::<String>(),
        marker,
        node.weight
    ));
}

fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / KB)
    } else {
        format!("{:.1} MB", bytes as f64 / (KB * KB))
    }
}
