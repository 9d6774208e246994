//! Store Module
//!
//! Binds one skip list to a snapshot file.
//!
//! ## Responsibilities
//! - Load the snapshot once on open, before the store can be shared
//! - Forward put/get/delete/clear to the index
//! - Dump the whole index on demand and when dropped

use std::borrow::Borrow;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::str::FromStr;

use crate::config::Config;
use crate::error::Result;
use crate::skiplist::{Iter, SkipList};
use crate::snapshot::{self, LoadStats};

/// Key-value store persisted as a flat snapshot file
///
/// All methods take `&self`; wrap the store in an `Arc` to share it across
/// threads. Concurrency is delegated to the skip list's RwLock.
///
/// ## Lifecycle
/// 1. `open` builds an empty index and loads the configured snapshot
/// 2. CRUD calls go straight to the index
/// 3. `dump` / `dump_to` rewrite a snapshot from an ordered traversal
/// 4. `close` (or drop, when `dump_on_drop` is set) writes the final snapshot
pub struct Store<K, V>
where
    K: Ord + Clone + Display + FromStr,
    V: Clone + Display + FromStr,
{
    /// Store configuration
    config: Config,

    /// The in-memory index (exclusively owned)
    index: SkipList<K, V>,

    /// Cleared by `close` so the final dump happens once
    dump_on_drop: bool,
}

impl<K, V> Store<K, V>
where
    K: Ord + Clone + Display + FromStr,
    V: Clone + Display + FromStr,
{
    /// Open a store with the given config
    ///
    /// On startup:
    /// 1. Validate level parameters and build an empty index
    /// 2. Load the snapshot if it can be opened; otherwise start empty
    ///
    /// A snapshot that opens but cannot be read or fails validation is an
    /// error, so a later dump never overwrites data that failed to load.
    pub fn open(config: Config) -> Result<Self> {
        let index = SkipList::from_config(&config)?;
        let path = &config.snapshot_path;

        match File::open(path) {
            Ok(file) => {
                let stats = Self::load_into(&index, BufReader::new(file))?;
                tracing::debug!(
                    "Loaded {} entries ({} skipped) from {:?} snapshot {}",
                    stats.loaded,
                    stats.skipped,
                    stats.format.unwrap_or_default(),
                    path.display()
                );
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No snapshot at {}, starting empty", path.display());
            }
            Err(e) => {
                tracing::warn!("Cannot open snapshot {}: {}; starting empty", path.display(), e);
            }
        }

        Ok(Self {
            dump_on_drop: config.dump_on_drop,
            config,
            index,
        })
    }

    /// Open with a snapshot path (convenience method)
    ///
    /// Uses default config with the specified snapshot file
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().snapshot_path(path.as_ref()).build();
        Self::open(config)
    }

    // =========================================================================
    // Index Operations
    // =========================================================================

    /// Insert or overwrite a key-value pair
    pub fn put(&self, key: K, value: V) {
        self.index.insert(key, value);
    }

    /// Get a copy of the value stored under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.index.search(key)
    }

    /// Check whether `key` is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Delete `key`, returning whether it was present
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.index.delete(key)
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.index.clear();
    }

    /// Iterate over all entries in ascending key order
    ///
    /// Writers block until the iterator is dropped.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.index.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Load a snapshot from `path` into the index
    ///
    /// Entries are inserted on top of the current contents. A missing file
    /// loads nothing; any other open or read failure is returned.
    pub fn load_from(&self, path: impl AsRef<Path>) -> Result<LoadStats> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(LoadStats::default());
            }
            Err(e) => return Err(e.into()),
        };

        let stats = Self::load_into(&self.index, BufReader::new(file))?;
        tracing::debug!(
            "Loaded {} entries ({} skipped) from {}",
            stats.loaded,
            stats.skipped,
            path.display()
        );
        Ok(stats)
    }

    /// Dump the index to the configured snapshot path
    pub fn dump(&self) -> Result<usize> {
        self.dump_to(&self.config.snapshot_path)
    }

    /// Dump the index to `path`, replacing its contents
    ///
    /// Parent directories are created as needed. Returns the number of
    /// entries written.
    pub fn dump_to(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        let written =
            snapshot::write_snapshot(self.config.snapshot_format, &mut writer, self.index.iter())?;
        writer.flush()?;

        tracing::debug!("Dumped {} entries to {}", written, path.display());
        Ok(written)
    }

    /// Close the store, dumping to the configured path
    ///
    /// Unlike the drop-time dump, a failure here is returned to the caller.
    pub fn close(mut self) -> Result<usize> {
        self.dump_on_drop = false;
        self.dump()
    }

    fn load_into<R: std::io::BufRead>(index: &SkipList<K, V>, reader: R) -> Result<LoadStats> {
        snapshot::read_snapshot(reader, |key, value| {
            index.insert(key, value);
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the snapshot path
    pub fn path(&self) -> &Path {
        &self.config.snapshot_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current highest active level of the index
    pub fn level(&self) -> usize {
        self.index.level()
    }

    /// Walk the index and report the first broken structural invariant
    pub fn check_invariants(&self) -> Result<()> {
        self.index.check_invariants()
    }
}

impl<K, V> Drop for Store<K, V>
where
    K: Ord + Clone + Display + FromStr,
    V: Clone + Display + FromStr,
{
    fn drop(&mut self) {
        if !self.dump_on_drop {
            return;
        }

        if let Err(e) = self.dump() {
            tracing::error!(
                "Failed to dump snapshot to {}: {}",
                self.config.snapshot_path.display(),
                e
            );
        }
    }
}
