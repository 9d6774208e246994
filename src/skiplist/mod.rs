//! SkipList Module
//!
//! Concurrent ordered index backing the store.
//!
//! ## Responsibilities
//! - Ordered insert/search/delete in expected O(log n)
//! - Keep the per-level linked lists nested and sorted
//! - Single-writer/multi-reader access via one structure-wide RwLock
//! - Ordered traversal for snapshots
//!
//! ## Layout
//! ```text
//! head[3] ----------------------------------> [9] ----------> None
//! head[2] ----------> [2] ------------------> [9] ----------> None
//! head[1] ----------> [2] ------> [4] ------> [9] ----------> None
//! head[0] --> [1] --> [2] --> [3] --> [4] --> [9] --> [10] -> None
//! ```
//!
//! Nodes live in an arena owned by the list. Successor slots hold arena
//! indices, so no reference to a node ever leaves the index: lookups and
//! traversal hand out clones of keys and values.

mod iter;
mod level;
mod list;
mod node;

pub use iter::Iter;
pub use level::LevelGenerator;
pub use list::{InsertOutcome, SkipList};
