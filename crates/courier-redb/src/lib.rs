//! Redb cache store for Courier

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod error;

use std::path::Path;
use std::sync::Arc;

use courier_common::CacheStore;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::instrument;

pub use crate::error::Error;

// <(partition, endpoint), body>
const CACHE_TABLE: TableDefinition<(&str, &str), &str> = TableDefinition::new("cache_store");

/// Valid ASCII characters for partition names
pub const PARTITION_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-";

/// Maximum length of a partition name
pub const PARTITION_MAX_LEN: usize = 120;

/// Validates that a partition name only uses [`PARTITION_ALPHABET`] and fits in
/// [`PARTITION_MAX_LEN`]
pub fn validate_partition(partition: &str) -> Result<(), Error> {
    if partition.is_empty() {
        return Err(Error::InvalidPartition(
            "partition name must not be empty".to_string(),
        ));
    }

    if partition.len() > PARTITION_MAX_LEN {
        return Err(Error::InvalidPartition(format!(
            "{PARTITION_MAX_LEN} exceeds maximum length of partition characters"
        )));
    }

    if !partition.chars().all(|c| PARTITION_ALPHABET.contains(c)) {
        return Err(Error::InvalidPartition("partition contains invalid characters. Only ASCII letters, numbers, underscore, and hyphen are allowed".to_string()));
    }

    Ok(())
}

/// Redb backed [`CacheStore`]
///
/// Several partitions can share one database file; each sees only its own keys.
#[derive(Clone)]
pub struct RedbCache {
    db: Arc<Database>,
    partition: String,
}

impl std::fmt::Debug for RedbCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbCache")
            .field("partition", &self.partition)
            .finish_non_exhaustive()
    }
}

impl RedbCache {
    /// Open or create the database at `path`
    pub fn new(path: &Path, partition: &str) -> Result<Self, Error> {
        validate_partition(partition)?;

        // Check if parent directory exists before attempting to create database
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Parent directory does not exist: {}", parent.display()),
                )));
            }
        }

        let db = Arc::new(Database::create(path)?);

        {
            // Create the table up front so readers never see it missing
            let write_txn = db.begin_write()?;
            let _ = write_txn.open_table(CACHE_TABLE)?;
            write_txn.commit()?;
        }

        tracing::info!("Opened cache partition {} at {}", partition, path.display());

        Ok(Self {
            db,
            partition: partition.to_string(),
        })
    }

    /// Another partition of the same database
    pub fn partition(&self, partition: &str) -> Result<Self, Error> {
        validate_partition(partition)?;

        Ok(Self {
            db: Arc::clone(&self.db),
            partition: partition.to_string(),
        })
    }

    /// Name of this partition
    pub fn partition_name(&self) -> &str {
        &self.partition
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CACHE_TABLE)?;

        let value = table
            .get((self.partition.as_str(), key))?
            .map(|v| v.value().to_string());

        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        let write_txn = self.db.begin_write()?;

        {
            let mut table = write_txn.open_table(CACHE_TABLE)?;
            table.insert((self.partition.as_str(), key), value)?;
        }

        write_txn.commit()?;

        Ok(())
    }
}

impl CacheStore for RedbCache {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, courier_common::Error> {
        Ok(self.read(key)?)
    }

    #[instrument(skip(self, value))]
    fn put(&self, key: &str, value: &str) -> Result<(), courier_common::Error> {
        Ok(self.write(key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &tempfile::TempDir, partition: &str) -> RedbCache {
        RedbCache::new(&dir.path().join("cache.redb"), partition).expect("Open cache")
    }

    #[test]
    fn test_put_get_has() {
        let dir = tempfile::tempdir().expect("Temp dir");
        let cache = open(&dir, "courier");

        let key = "https://api.example.com/v1/items";
        assert!(!cache.has(key).expect("has"));
        assert_eq!(cache.get(key).expect("get"), None);

        cache.put(key, r#"{"code":0}"#).expect("put");
        cache.put(key, r#"{"code":0,"result":"2"}"#).expect("put");

        assert!(cache.has(key).expect("has"));
        assert_eq!(
            cache.get(key).expect("get").as_deref(),
            Some(r#"{"code":0,"result":"2"}"#)
        );
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().expect("Temp dir");

        {
            let cache = open(&dir, "courier");
            cache.put("key", "value").expect("put");
        }

        let cache = open(&dir, "courier");
        assert_eq!(cache.get("key").expect("get").as_deref(), Some("value"));
    }

    #[test]
    fn test_partitions_are_isolated() {
        let dir = tempfile::tempdir().expect("Temp dir");
        let first = open(&dir, "first");
        let second = first.partition("second").expect("Valid partition");

        first.put("key", "one").expect("put");

        assert_eq!(second.partition_name(), "second");
        assert_eq!(second.get("key").expect("get"), None);
        assert_eq!(first.get("key").expect("get").as_deref(), Some("one"));
    }

    #[test]
    fn test_invalid_partition() {
        assert!(validate_partition("").is_err());
        assert!(validate_partition("has space").is_err());
        assert!(validate_partition(&"a".repeat(PARTITION_MAX_LEN + 1)).is_err());
        assert!(validate_partition("courier_cache-1").is_ok());
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = tempfile::tempdir().expect("Temp dir");
        let path = dir.path().join("missing").join("cache.redb");

        let result = RedbCache::new(&path, "courier");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
