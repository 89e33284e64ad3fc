//! A single position in the prefix tree.

use catalog::MovieId;
use std::collections::BTreeMap;

/// One node of the title tree.
///
/// Children are kept in a `BTreeMap` so every traversal visits them in
/// character order, which keeps query output deterministic.
#[derive(Debug, Default)]
pub(crate) struct Node {
    pub(crate) children: BTreeMap<char, Node>,
    /// True iff some inserted title ends exactly here
    pub(crate) terminal: bool,
    /// Movies whose normalized title ends here, each at most once
    pub(crate) ids: Vec<MovieId>,
    /// Sum of insertion weights of every title whose path crosses this node
    pub(crate) weight: u64,
}

impl Node {
    /// Follow `key` one character at a time from this node.
    pub(crate) fn descend(&self, key: &str) -> Option<&Node> {
        let mut node = self;
        for ch in key.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    /// A node that ends no title and leads nowhere can be pruned
    pub(crate) fn is_dead(&self) -> bool {
        !self.terminal && self.children.is_empty()
    }

    /// Children ordered by weight descending, character ascending on ties.
    pub(crate) fn children_by_weight(&self) -> Vec<(char, &Node)> {
        let mut children: Vec<(char, &Node)> =
            self.children.iter().map(|(&ch, child)| (ch, child)).collect();
        // stable: BTreeMap order breaks weight ties by character
        children.sort_by(|a, b| b.1.weight.cmp(&a.1.weight));
        children
    }

    /// Pre-order walk of this subtree with children in character order.
    /// `visit` gets each node with its path relative to `self`.
    pub(crate) fn walk<'a>(&'a self, visit: impl FnMut(&[char], &'a Node)) {
        self.walk_with(
            |node: &'a Node| node.children.iter().map(|(&ch, child)| (ch, child)),
            visit,
        );
    }

    /// Like [`Node::walk`], but heavier children are visited first.
    pub(crate) fn walk_by_weight<'a>(&'a self, visit: impl FnMut(&[char], &'a Node)) {
        self.walk_with(|node: &'a Node| node.children_by_weight().into_iter(), visit);
    }

    // Explicit stack: a title's path can be deeper than the thread stack.
    fn walk_with<'a, I>(
        &'a self,
        children: impl Fn(&'a Node) -> I,
        mut visit: impl FnMut(&[char], &'a Node),
    ) where
        I: DoubleEndedIterator<Item = (char, &'a Node)>,
    {
        let mut path: Vec<char> = Vec::new();
        let mut stack: Vec<(usize, Option<char>, &'a Node)> = vec![(0, None, self)];
        while let Some((depth, ch, node)) = stack.pop() {
            path.truncate(depth.saturating_sub(1));
            if let Some(ch) = ch {
                path.push(ch);
            }
            visit(&path, node);
            // reversed so the first child is popped first
            stack.extend(
                children(node)
                    .rev()
                    .map(|(ch, child)| (depth + 1, Some(ch), child)),
            );
        }
    }

    /// Follow `key` mutably, one character at a time.
    pub(crate) fn descend_mut(&mut self, key: &[char]) -> Option<&mut Node> {
        let mut node = self;
        for ch in key {
            node = node.children.get_mut(ch)?;
        }
        Some(node)
    }
}

impl Drop for Node {
    // Iterative: the derived drop recurses once per level.
    fn drop(&mut self) {
        let mut pending: Vec<Node> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}
