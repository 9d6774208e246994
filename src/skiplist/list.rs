//! SkipList implementation
//!
//! Arena-backed skip list guarded by a single RwLock.

use std::borrow::Borrow;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, SkipKvError};

use super::iter::Iter;
use super::level::LevelGenerator;
use super::node::{Link, Node, NodeId};

/// Result of [`SkipList::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new node was linked in
    Inserted,

    /// The key existed; its value was overwritten in place
    Updated,
}

/// Concurrent ordered index
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader
///
/// - **Writes** (insert/delete/clear): take the lock exclusively for the
///   whole walk-and-mutate sequence
/// - **Reads** (search/iter/accessors): take the lock shared; any number
///   run together, never alongside a writer
/// - [`Iter`] holds its read guard until dropped, so a traversal never
///   observes a node being unlinked
pub struct SkipList<K, V> {
    /// Header, arena and counters
    inner: RwLock<Inner<K, V>>,

    /// Level distribution for new nodes
    levels: LevelGenerator,
}

impl<K: Ord, V> SkipList<K, V> {
    /// Create an empty skip list with the default level parameters
    pub fn new() -> Self {
        Self::with_level_generator(LevelGenerator::default())
    }

    /// Create an empty skip list drawing levels from `levels`
    pub fn with_level_generator(levels: LevelGenerator) -> Self {
        Self {
            inner: RwLock::new(Inner::new(levels.max_level())),
            levels,
        }
    }

    /// Create an empty skip list from the level parameters in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_level_generator(config.level_generator()?))
    }

    /// Insert a key-value pair, overwriting the value if the key exists
    pub fn insert(&self, key: K, value: V) -> InsertOutcome {
        self.inner.write().insert(key, value, &self.levels)
    }

    /// Look up a key, returning a copy of its value
    pub fn search<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        let inner = self.inner.read_recursive();
        inner.find(key).map(|id| inner.node(id).value.clone())
    }

    /// Check whether a key is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.read_recursive().find(key).is_some()
    }

    /// Remove a key, returning whether it was present
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.write().delete(key)
    }

    /// Remove every entry and reset the level to zero
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Iterate over all entries in ascending key order
    ///
    /// Each call starts from the first entry. The returned iterator holds
    /// the read lock, so writers block until it is dropped. Shared-mode
    /// methods lock recursively and stay callable while it is alive.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let inner = self.inner.read_recursive();
        let first = inner.head[0];
        let remaining = inner.len;
        Iter::new(inner, first, remaining)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.read_recursive().len
    }

    /// Check if the list holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current highest active level
    pub fn level(&self) -> usize {
        self.inner.read_recursive().level
    }

    /// Highest level any node may be assigned
    pub fn max_level(&self) -> usize {
        self.levels.max_level()
    }

    /// Level assigned to the node holding `key`
    pub fn level_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let inner = self.inner.read_recursive();
        inner.find(key).map(|id| inner.node(id).level())
    }

    /// Walk every level and report the first broken structural invariant
    pub fn check_invariants(&self) -> Result<()> {
        self.inner.read_recursive().check()
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Inner State (always accessed under the lock)
// =============================================================================

/// Walk position: the header or a real node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Head,
    Node(NodeId),
}

pub(super) struct Inner<K, V> {
    /// Header successors, one slot per possible level
    pub(super) head: Vec<Link>,

    /// Node arena; `None` marks a released slot
    nodes: Vec<Option<Node<K, V>>>,

    /// Released slots available for reuse
    free: Vec<NodeId>,

    /// Highest level with at least one node (0 when empty)
    level: usize,

    /// Number of live nodes
    pub(super) len: usize,
}

impl<K, V> Inner<K, V> {
    fn new(max_level: usize) -> Self {
        Self {
            head: vec![None; max_level + 1],
            nodes: Vec::new(),
            free: Vec::new(),
            level: 0,
            len: 0,
        }
    }

    pub(super) fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes[id].as_ref().expect("skip list link points at a released node")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.nodes[id].as_mut().expect("skip list link points at a released node")
    }

    fn next(&self, pos: Position, level: usize) -> Link {
        match pos {
            Position::Head => self.head[level],
            Position::Node(id) => self.node(id).forward[level],
        }
    }

    fn set_next(&mut self, pos: Position, level: usize, link: Link) {
        match pos {
            Position::Head => self.head[level] = link,
            Position::Node(id) => self.node_mut(id).forward[level] = link,
        }
    }

    fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Release a slot. The node must already be unlinked from every level.
    fn release(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let node = self.nodes[id].take();
        self.free.push(id);
        node
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head.iter_mut().for_each(|link| *link = None);
        self.level = 0;
        self.len = 0;
    }
}

impl<K: Ord, V> Inner<K, V> {
    fn key_of<Q>(&self, id: NodeId) -> &Q
    where
        K: Borrow<Q>,
        Q: ?Sized,
    {
        self.node(id).key.borrow()
    }

    /// Top-down walk towards `key`
    ///
    /// At each level, advances to the rightmost node whose key is below
    /// `key` and hands that position to `record` before descending.
    /// Returns the level-0 successor of the final position, which is the
    /// first node with a key `>= key`.
    fn walk<Q>(&self, key: &Q, mut record: impl FnMut(usize, Position)) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut pos = Position::Head;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.next(pos, level) {
                if self.key_of::<Q>(next) < key {
                    pos = Position::Node(next);
                } else {
                    break;
                }
            }
            record(level, pos);
        }
        self.next(pos, 0)
    }

    /// Arena slot of the node holding exactly `key`
    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.walk(key, |_, _| {})
            .filter(|&id| self.key_of::<Q>(id) == key)
    }

    fn insert(&mut self, key: K, value: V, levels: &LevelGenerator) -> InsertOutcome {
        let mut update = vec![Position::Head; self.head.len()];
        let candidate = self.walk(&key, |level, pos| update[level] = pos);

        if let Some(id) = candidate {
            let node = self.node_mut(id);
            if node.key == key {
                node.value = value;
                return InsertOutcome::Updated;
            }
        }

        let new_level = levels.random_level();
        if new_level > self.level {
            for slot in &mut update[self.level + 1..=new_level] {
                *slot = Position::Head;
            }
            tracing::trace!("Raising skip list level {} -> {}", self.level, new_level);
            self.level = new_level;
        }

        let id = self.allocate(Node::new(key, value, new_level));
        for (level, &pred) in update.iter().enumerate().take(new_level + 1) {
            let successor = self.next(pred, level);
            self.node_mut(id).forward[level] = successor;
            self.set_next(pred, level, Some(id));
        }

        self.len += 1;
        InsertOutcome::Inserted
    }

    fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut update = vec![Position::Head; self.level + 1];
        let target = match self.walk(key, |level, pos| update[level] = pos) {
            Some(id) if self.key_of::<Q>(id) == key => id,
            _ => return false,
        };

        // Unlink bottom-up; the first level where the predecessor skips the
        // target is above the target's own level.
        for (level, &pred) in update.iter().enumerate() {
            if self.next(pred, level) != Some(target) {
                break;
            }
            let successor = self.node(target).forward[level];
            self.set_next(pred, level, successor);
        }

        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
            tracing::trace!("Shrinking skip list level to {}", self.level);
        }

        self.release(target);
        self.len -= 1;
        true
    }

    /// Structural self-check
    ///
    /// - header slots above `level` are empty, `head[level]` is set unless empty
    /// - every level is strictly increasing and free of released slots
    /// - a node linked at level i is linked at level i - 1
    /// - each node is linked at exactly the levels it was assigned
    /// - `len` matches both the level-0 chain and the live arena slots
    fn check(&self) -> Result<()> {
        let violation = |msg: String| Err(SkipKvError::InvariantViolation(msg));

        if let Some(level) = (self.level + 1..self.head.len()).find(|&l| self.head[l].is_some()) {
            return violation(format!(
                "header linked at level {} above current level {}",
                level, self.level
            ));
        }
        if self.len == 0 && self.level != 0 {
            return violation(format!("empty list at level {}", self.level));
        }
        if self.len > 0 && self.head[self.level].is_none() {
            return violation(format!("top level {} is empty", self.level));
        }

        // per_level[i] = nodes assigned level >= i, counted from the level-0 chain
        let mut per_level = vec![0usize; self.level + 1];
        let mut below: Option<Vec<bool>> = None;

        for level in 0..=self.level {
            let mut seen = vec![false; self.nodes.len()];
            let mut prev: Option<&K> = None;
            let mut count = 0usize;
            let mut link = self.head[level];

            while let Some(id) = link {
                let node = match self.nodes.get(id).and_then(Option::as_ref) {
                    Some(node) => node,
                    None => return violation(format!("level {} links to released slot {}", level, id)),
                };
                if seen[id] {
                    return violation(format!("cycle at level {} through slot {}", level, id));
                }
                if node.level() < level {
                    return violation(format!(
                        "slot {} of level {} linked at level {}",
                        id,
                        node.level(),
                        level
                    ));
                }
                if let Some(below) = &below {
                    if !below[id] {
                        return violation(format!(
                            "slot {} linked at level {} but not at level {}",
                            id,
                            level,
                            level - 1
                        ));
                    }
                }
                if prev.is_some_and(|p| *p >= node.key) {
                    return violation(format!("keys not strictly increasing at level {}", level));
                }

                if level == 0 {
                    if node.level() > self.level {
                        return violation(format!(
                            "slot {} has level {} above current level {}",
                            id,
                            node.level(),
                            self.level
                        ));
                    }
                    for slot in &mut per_level[..=node.level()] {
                        *slot += 1;
                    }
                }

                seen[id] = true;
                prev = Some(&node.key);
                count += 1;
                link = node.forward[level];
            }

            if count != per_level[level] {
                return violation(format!(
                    "level {} links {} nodes, {} are assigned to it",
                    level, count, per_level[level]
                ));
            }
            below = Some(seen);
        }

        if per_level[0] != self.len {
            return violation(format!(
                "level 0 holds {} nodes, len is {}",
                per_level[0], self.len
            ));
        }
        let live = self.nodes.iter().filter(|slot| slot.is_some()).count();
        if live != self.len {
            return violation(format!("{} live slots, len is {}", live, self.len));
        }

        Ok(())
    }
}
