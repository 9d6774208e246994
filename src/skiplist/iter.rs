//! Ordered traversal over a SkipList

use std::iter::FusedIterator;

use parking_lot::RwLockReadGuard;

use super::list::Inner;
use super::node::Link;

/// Iterator over SkipList entries in ascending key order
///
/// Yields cloned `(key, value)` pairs. Holds the list's read lock for its
/// whole lifetime. Reads on the same thread (`search`, `len`, a nested
/// `iter`) take the lock recursively and do not block, even with a writer
/// queued. Writing to the same list from this thread deadlocks; drop the
/// iterator first.
pub struct Iter<'a, K, V> {
    guard: RwLockReadGuard<'a, Inner<K, V>>,
    cursor: Link,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(guard: RwLockReadGuard<'a, Inner<K, V>>, first: Link, remaining: usize) -> Self {
        Self {
            guard,
            cursor: first,
            remaining,
        }
    }
}

impl<K: Clone, V: Clone> Iterator for Iter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.guard.node(id);
        self.cursor = node.forward[0];
        self.remaining -= 1;
        Some((node.key.clone(), node.value.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Clone, V: Clone> FusedIterator for Iter<'_, K, V> {}
