//! Disk Tier Module
//!
//! Durable key→file store under a namespaced cache directory.
//!
//! # File Layout
//!
//! ```text
//! {directory}/{escaped_key}.json
//! ```
//!
//! Each file holds a codec record (write time + payload). A file is stale
//! when its embedded write time is older than the TTL by the cache clock, or
//! its mtime is older than the TTL by the wall clock. Expired and corrupt
//! files are deleted when read; there is no background sweep.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheKey, Clock};
use crate::codec;
use crate::error::{CacheError, Result};

// == Disk Tier ==
#[derive(Clone)]
pub struct DiskTier {
    directory: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    temp_counter: Arc<AtomicU64>,
}

impl std::fmt::Debug for DiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskTier")
            .field("directory", &self.directory)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl DiskTier {
    // == Constructor ==
    /// The directory is not touched until the first write.
    pub fn new(directory: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory: directory.into(),
            ttl,
            clock,
            temp_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file backing a key.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.directory.join(key.file_name())
    }

    // == Write ==
    /// Writes a payload stamped with the current time.
    ///
    /// The record goes to a unique temp file first and is renamed over the
    /// final path, so readers see either the old file or the new one.
    pub async fn write(&self, key: &CacheKey, payload: &[u8]) -> Result<()> {
        let entry = CacheEntry::new(payload.to_vec(), self.clock.now());
        self.write_entry(key, &entry).await
    }

    /// Writes an entry keeping its own write time, so both tiers agree on
    /// when it was stored.
    pub async fn write_entry(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        let record = codec::encode_record(&entry.payload, entry.stored_at)?;

        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.path_for(key);
        let temp_path = self.directory.join(format!(
            ".{}.{}.{}.tmp",
            key.file_name(),
            std::process::id(),
            self.temp_counter.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = tokio::fs::write(&temp_path, &record).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(key = %key, bytes = record.len(), "Wrote disk cache entry");
        Ok(())
    }

    // == Read ==
    /// Reads a fresh entry.
    ///
    /// Returns `Ok(None)` when the file is missing, stale or corrupt; stale
    /// and corrupt files are deleted on the way out. The returned entry
    /// carries the embedded write time.
    pub async fn read(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let path = self.path_for(key);

        // Contents and mtime come from one handle, so a concurrent rename
        // cannot pair one file's bytes with another file's age.
        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let modified = file.metadata().await?.modified().ok();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).await?;
        drop(file);

        let (payload, stored_at) = match codec::decode_record(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt disk cache entry, removing");
                self.remove_path(&path).await;
                return Ok(None);
            }
        };
        let entry = CacheEntry::new(payload, stored_at);

        // The embedded time is on the injected clock, the mtime on the wall
        // clock; each is aged against its own source.
        let expired = entry.is_expired(self.clock.now(), self.ttl)
            || modified.is_some_and(|mtime| self.mtime_expired(mtime));
        if expired {
            debug!(key = %key, "Disk cache entry expired, removing");
            self.remove_path(&path).await;
            return Ok(None);
        }

        Ok(Some(entry))
    }

    fn mtime_expired(&self, mtime: SystemTime) -> bool {
        match SystemTime::now().duration_since(mtime) {
            Ok(age) => Duration::from_std(age).map_or(true, |age| age > self.ttl),
            // mtime in the future
            Err(_) => false,
        }
    }

    // == Remove ==
    /// Deletes the file for a key. A missing file is not an error.
    pub async fn remove(&self, key: &CacheKey) -> Result<bool> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // == Total Bytes ==
    /// Sums file sizes under the cache directory. Diagnostics only.
    pub async fn total_bytes(&self) -> Result<u64> {
        let directory = self.directory.clone();
        tokio::task::spawn_blocking(move || dir_size(&directory))
            .await
            .map_err(|e| CacheError::Internal(e.to_string()))
    }

    // == Clear ==
    /// Removes the whole cache directory.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.directory).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_path(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove disk cache file");
            }
        }
    }
}

/// Recursive size walk; unreadable entries are skipped.
fn dir_size(dir: &Path) -> u64 {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                debug!(dir = %dir.display(), error = %e, "Failed to read cache directory");
            }
            return 0;
        }
    };

    entries
        .flatten()
        .map(|entry| match entry.metadata() {
            Ok(metadata) if metadata.is_dir() => dir_size(&entry.path()),
            Ok(metadata) => metadata.len(),
            Err(_) => 0,
        })
        .sum()
}
