//! # SkipKV
//!
//! An embedded key-value store with:
//! - A concurrent skip list as the ordered in-memory index
//! - Single-writer/multi-reader concurrency model
//! - Whole-index snapshots to a flat file (text or framed)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Callers                              │
//! │                    (Multiple Threads)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Store                                 │
//! │           (load on open, dump on close / drop)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  SkipList   │          │  Snapshot   │
//!   │  (RwLock)   │─────────▶│ (Text/Frame)│
//!   └─────────────┘  iter    └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use skipkv::{Config, Store};
//!
//! let config = Config::builder().snapshot_path("./store/dumpFile").build();
//! let store: Store<i64, String> = Store::open(config)?;
//!
//! store.put(1, "good".to_string());
//! assert_eq!(store.get(&1), Some("good".to_string()));
//! assert!(store.delete(&1));
//!
//! store.close()?;
//! # Ok::<(), skipkv::SkipKvError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod skiplist;
pub mod snapshot;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SkipKvError, Result};
pub use config::Config;
pub use skiplist::{InsertOutcome, LevelGenerator, SkipList};
pub use snapshot::{LoadStats, SnapshotFormat};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SkipKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
