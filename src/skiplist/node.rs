//! Skip list node

/// Index of a node slot in the arena
pub(super) type NodeId = usize;

/// Successor reference: `None` marks the end of a level
pub(super) type Link = Option<NodeId>;

/// A single key/value entry and its per-level successors
///
/// A node assigned level `L` has `L + 1` successor slots and is linked
/// into levels `0..=L`.
#[derive(Debug)]
pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) forward: Vec<Link>,
}

impl<K, V> Node<K, V> {
    pub(super) fn new(key: K, value: V, level: usize) -> Self {
        Self {
            key,
            value,
            forward: vec![None; level + 1],
        }
    }

    /// Highest level this node participates in
    pub(super) fn level(&self) -> usize {
        self.forward.len() - 1
    }
}
