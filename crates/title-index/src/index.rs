//! The title index: a prefix tree over normalized titles plus an id -> movie map.
//!
//! Nodes only ever hold movie ids. The movies themselves live in `by_id`, so
//! the tree has a single owner and removal only touches one root-to-leaf path.

use catalog::{Movie, MovieId};
use serde::Serialize;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use crate::error::{IndexError, Result};
use crate::node::Node;

/// Weight used by [`TitleIndex::insert_movie`] and the bulk loaders
pub const DEFAULT_WEIGHT: u64 = 1;

/// Normalize a title or prefix to the form stored in the tree:
/// surrounding whitespace trimmed, lowercased.
pub fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

/// A movie as the index holds it
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) movie: Movie,
    /// Order of first insertion; the final tie-breaker when ranking
    pub(crate) seq: u64,
    /// Number of terminal nodes whose `ids` hold this movie
    pub(crate) terminals: usize,
}

/// Outcome of a lenient catalog load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// In-memory prefix index over movie titles.
///
/// Built once at startup, then read by any number of threads. Mutation
/// needs `&mut self`, so an embedding service that edits the index at
/// runtime has to serialize writers itself (e.g. behind an `RwLock`).
#[derive(Debug, Default)]
pub struct TitleIndex {
    pub(crate) root: Node,
    pub(crate) by_id: HashMap<MovieId, Entry>,
    /// Number of (terminal, id) pairs across the tree
    pub(crate) count: usize,
    next_seq: u64,
    poisoned: AtomicBool,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a catalog, skipping records the index cannot hold.
    ///
    /// Records with id 0, a blank title, or an id already seen earlier in
    /// the same catalog are logged and counted as skipped.
    pub fn from_catalog(movies: impl IntoIterator<Item = Movie>) -> (Self, LoadReport) {
        let mut index = Self::new();
        let mut report = LoadReport::default();
        let mut seen: HashSet<MovieId> = HashSet::new();

        for movie in movies {
            if movie.id == 0 || normalize(&movie.title).is_empty() {
                warn!(id = movie.id, title = %movie.title, "Skipping catalog record without id or title");
                report.skipped += 1;
                continue;
            }
            if !seen.insert(movie.id) {
                warn!(id = movie.id, title = %movie.title, "Skipping catalog record with duplicate id");
                report.skipped += 1;
                continue;
            }
            match index.insert_movie(movie) {
                Ok(()) => report.inserted += 1,
                Err(err) => {
                    warn!(%err, "Skipping catalog record rejected by the index");
                    report.skipped += 1;
                }
            }
        }

        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "Built title index from catalog"
        );
        (index, report)
    }

    /// Insert `movie` under `title` with the given weight.
    ///
    /// An existing movie with the same id is replaced (an update). Every node
    /// on the path gains `weight`. The terminal node records the id once, no
    /// matter how often the same pair is inserted.
    pub fn insert(&mut self, title: &str, movie: Movie, weight: u64) -> Result<()> {
        self.ensure_healthy()?;
        let key = checked_key(title, movie.id, weight)?;

        let id = movie.id;
        match self.by_id.entry(id) {
            MapEntry::Occupied(mut slot) => slot.get_mut().movie = movie,
            MapEntry::Vacant(slot) => {
                slot.insert(Entry {
                    movie,
                    seq: self.next_seq,
                    terminals: 0,
                });
                self.next_seq += 1;
            }
        }

        let mut node = &mut self.root;
        for ch in key.chars() {
            node = node.children.entry(ch).or_default();
            node.weight = node.weight.saturating_add(weight);
        }
        node.terminal = true;
        if !node.ids.contains(&id) {
            node.ids.push(id);
            self.count += 1;
            if let Some(entry) = self.by_id.get_mut(&id) {
                entry.terminals += 1;
            }
        }
        Ok(())
    }

    /// Insert a movie under its own title with the default weight
    pub fn insert_movie(&mut self, movie: Movie) -> Result<()> {
        let title = movie.title.clone();
        self.insert(&title, movie, DEFAULT_WEIGHT)
    }

    /// Move `movie` from `old_title` to the title it now carries.
    ///
    /// Unlike a remove followed by an insert, the movie keeps its place in
    /// the first-insertion order. Nothing changes when the new record is
    /// rejected.
    pub fn retitle(&mut self, old_title: &str, movie: Movie) -> Result<()> {
        self.ensure_healthy()?;
        checked_key(&movie.title, movie.id, DEFAULT_WEIGHT)?;

        let id = movie.id;
        let seq = self.by_id.get(&id).map(|entry| entry.seq);
        if normalize(old_title) != normalize(&movie.title) {
            self.remove(old_title, id)?;
        }
        self.insert_movie(movie)?;
        if let (Some(seq), Some(entry)) = (seq, self.by_id.get_mut(&id)) {
            entry.seq = seq;
        }
        Ok(())
    }

    /// Insert every movie under its own title. Stops at the first rejected
    /// movie; the ones before it stay inserted.
    pub fn insert_all(&mut self, movies: impl IntoIterator<Item = Movie>) -> Result<usize> {
        let mut inserted = 0;
        for movie in movies {
            self.insert_movie(movie)?;
            inserted += 1;
        }
        info!("Inserted {} movies into title index", inserted);
        Ok(inserted)
    }

    /// Remove movie `id` from the terminal reached by `title`.
    ///
    /// Returns `Ok(false)` when the path or the id is not there. Branches left
    /// without titles are pruned. Node weights are left untouched.
    pub fn remove(&mut self, title: &str, id: MovieId) -> Result<bool> {
        self.ensure_healthy()?;
        let key: Vec<char> = normalize(title).chars().collect();

        match remove_path(&mut self.root, &key, id) {
            Ok(false) => return Ok(false),
            Ok(true) => {}
            Err(err) => {
                self.poison(&err);
                return Err(err);
            }
        }

        self.count -= 1;
        if let MapEntry::Occupied(mut slot) = self.by_id.entry(id) {
            let entry = slot.get_mut();
            entry.terminals = entry.terminals.saturating_sub(1);
            if entry.terminals == 0 {
                slot.remove();
            }
        }

        if cfg!(debug_assertions) {
            self.verify()?;
        }
        Ok(true)
    }

    pub fn lookup(&self, id: MovieId) -> Result<Option<&Movie>> {
        self.ensure_healthy()?;
        Ok(self.by_id.get(&id).map(|entry| &entry.movie))
    }

    /// True iff every character of the normalized prefix can be followed
    /// from the root. The empty prefix always matches.
    pub fn starts_with(&self, prefix: &str) -> Result<bool> {
        self.ensure_healthy()?;
        Ok(self.root.descend(&normalize(prefix)).is_some())
    }

    /// Number of (title, id) pairs held by the index.
    ///
    /// Reads a counter, not the tree, so unlike the queries it still answers
    /// on a poisoned index. Health reporting depends on that.
    pub fn size(&self) -> usize {
        self.count
    }

    /// See [`TitleIndex::size`]; also answers on a poisoned index.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Every movie in the index, in no particular order
    pub fn all_movies(&self) -> Result<impl Iterator<Item = &Movie>> {
        self.ensure_healthy()?;
        Ok(self.by_id.values().map(|entry| &entry.movie))
    }

    /// Drop every title and movie. Also lifts a poisoned state.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Walk the whole tree and check the structural invariants:
    /// terminal flags agree with id lists, every id resolves to a movie,
    /// no dead branches hang below the root, and the pair count matches.
    ///
    /// A failure poisons the index.
    pub fn verify(&self) -> Result<()> {
        self.ensure_healthy()?;

        let mut held: HashMap<MovieId, usize> = HashMap::new();
        let mut failure = None;
        self.root.walk(|path, node| {
            if failure.is_none() {
                failure = self.verify_node(node, path, &mut held).err();
            }
        });
        let result = match failure {
            Some(err) => Err(err),
            None => self.verify_counts(&held),
        };

        if let Err(err) = &result {
            self.poison(err);
        }
        result
    }

    fn verify_node(
        &self,
        node: &Node,
        path: &[char],
        held: &mut HashMap<MovieId, usize>,
    ) -> Result<()> {
        let at = || path.iter().collect::<String>();
        if node.terminal == node.ids.is_empty() {
            return Err(inconsistent(
                &at(),
                format!("terminal={} but {} ids", node.terminal, node.ids.len()),
            ));
        }
        if !path.is_empty() && node.is_dead() {
            return Err(inconsistent(&at(), "dead branch was not pruned".to_string()));
        }

        let mut local: HashSet<MovieId> = HashSet::with_capacity(node.ids.len());
        for &id in &node.ids {
            if !local.insert(id) {
                return Err(inconsistent(&at(), format!("id {id} listed twice")));
            }
            if !self.by_id.contains_key(&id) {
                return Err(inconsistent(&at(), format!("id {id} has no movie")));
            }
            *held.entry(id).or_insert(0) += 1;
        }
        Ok(())
    }

    fn verify_counts(&self, held: &HashMap<MovieId, usize>) -> Result<()> {
        let total: usize = held.values().sum();
        if total != self.count {
            return Err(inconsistent(
                "",
                format!("count is {} but terminals hold {} ids", self.count, total),
            ));
        }
        for (id, entry) in &self.by_id {
            let refs = held.get(id).copied().unwrap_or(0);
            if refs == 0 || refs != entry.terminals {
                return Err(inconsistent(
                    "",
                    format!(
                        "movie {id} is referenced by {refs} terminals, expected {}",
                        entry.terminals
                    ),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn ensure_healthy(&self) -> Result<()> {
        if self.is_poisoned() {
            return Err(IndexError::Poisoned);
        }
        Ok(())
    }

    fn poison(&self, err: &IndexError) {
        error!(%err, "Title index poisoned");
        self.poisoned.store(true, Ordering::Release);
    }
}

/// Reject what the tree cannot hold; returns the normalized key.
fn checked_key(title: &str, id: MovieId, weight: u64) -> Result<String> {
    if id == 0 {
        return Err(IndexError::InvalidArgument(
            "movie id must be positive".to_string(),
        ));
    }
    if weight == 0 {
        return Err(IndexError::InvalidArgument(
            "insertion weight must be at least 1".to_string(),
        ));
    }
    let key = normalize(title);
    if key.is_empty() {
        return Err(IndexError::InvalidArgument(format!(
            "title for movie {id} is empty after normalization"
        )));
    }
    Ok(key)
}

fn inconsistent(path: &str, reason: String) -> IndexError {
    IndexError::Inconsistent {
        path: path.to_string(),
        reason,
    }
}

/// Take `id` off the terminal at `key` and cut the branch left without titles.
///
/// The path is walked twice without recursion: once to check the terminal and
/// find the deepest node that has to stay, once mutably to apply the change.
fn remove_path(root: &mut Node, key: &[char], id: MovieId) -> Result<bool> {
    if key.is_empty() {
        return Ok(false);
    }
    let mut node: &Node = root;
    // depth of the deepest node on the path that keeps its child link
    let mut keep = 0;
    for (depth, ch) in key.iter().enumerate() {
        if depth > 0 && (node.terminal || node.children.len() > 1) {
            keep = depth;
        }
        let Some(child) = node.children.get(ch) else {
            return Ok(false);
        };
        node = child;
    }

    if node.terminal == node.ids.is_empty() {
        return Err(inconsistent(
            &key.iter().collect::<String>(),
            format!("terminal={} but {} ids", node.terminal, node.ids.len()),
        ));
    }
    if !node.ids.contains(&id) {
        return Ok(false);
    }
    let prune = node.ids.len() == 1 && node.children.is_empty();

    let lost = || inconsistent(&key.iter().collect::<String>(), "path vanished".to_string());
    if prune {
        let parent = root.descend_mut(&key[..keep]).ok_or_else(lost)?;
        parent.children.remove(&key[keep]);
    } else {
        let terminus = root.descend_mut(key).ok_or_else(lost)?;
        terminus.ids.retain(|&held| held != id);
        if terminus.ids.is_empty() {
            terminus.terminal = false;
        }
    }
    Ok(true)
}
