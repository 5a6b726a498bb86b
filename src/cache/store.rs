//! Cache store for persisting fetched data to disk
//!
//! Provides a `CacheStore` that writes serializable payloads to JSON files,
//! each stamped with its write time. Freshness is decided at read time against
//! a caller-supplied maximum age, so the same entry can be fresh for one
//! reader and stale for another.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Wrapper struct for cached data stored on disk
///
/// The payload and its write timestamp are serialized as a single record, so
/// readers never observe one without the other.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was written
    stored_at: DateTime<Utc>,
}

/// Outcome of a raw cache lookup, before freshness collapses it for callers
enum Lookup<T> {
    /// A fresh entry was found and decoded
    Hit(T),
    /// No usable entry: absent, expired, or undecodable
    Miss,
    /// The backing storage could not be read at all
    Unavailable,
}

/// Reads and writes cached data under a namespace directory on disk
///
/// The store keeps each entry as a JSON file in an XDG-compliant cache
/// directory (`~/.cache/<namespace>/` on Linux). Every operation is
/// best-effort: a store that cannot be opened, read, or written behaves like
/// an empty one, and callers fall through to fetching fresh data.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Opens the store for a namespace using the platform cache directory.
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory); callers are expected to run without a cache in that
    /// case rather than fail.
    pub fn open(namespace: &str) -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", namespace)?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a store rooted at a specific directory.
    ///
    /// Useful for testing or when a specific cache location is needed.
    #[allow(dead_code)]
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the cache file for the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Reads the entry for `key` if it is younger than `max_age_ms`.
    ///
    /// Returns `None` when the key is absent, the entry is at least
    /// `max_age_ms` old, the record cannot be decoded, or the storage cannot
    /// be read. Expired entries are left on disk; they are only replaced by a
    /// later `put` or an explicit `remove`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, max_age_ms: u64) -> Option<T> {
        match self.lookup(key, max_age_ms, Utc::now()) {
            Lookup::Hit(data) => Some(data),
            Lookup::Miss | Lookup::Unavailable => None,
        }
    }

    /// Raw lookup that keeps miss and storage failure distinct
    fn lookup<T: DeserializeOwned>(
        &self,
        key: &str,
        max_age_ms: u64,
        now: DateTime<Utc>,
    ) -> Lookup<T> {
        let content = match fs::read_to_string(self.entry_path(key)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Lookup::Miss,
            Err(_) => return Lookup::Unavailable,
        };

        // A record we cannot decode is treated the same as no record
        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(_) => return Lookup::Miss,
        };

        if is_fresh(entry.stored_at, now, max_age_ms) {
            Lookup::Hit(entry.data)
        } else {
            Lookup::Miss
        }
    }

    /// Writes `data` under `key`, stamped with the current time.
    ///
    /// The payload and timestamp go out as a single record in one write,
    /// overwriting any previous entry. Callers treat failures as a lost
    /// optimization, not an error to surface.
    pub fn put<T: Serialize>(&self, key: &str, data: &T) -> io::Result<()> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            data,
            stored_at: Utc::now(),
        };

        let json = serde_json::to_string(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.entry_path(key), json)
    }

    /// Deletes the entry for `key`; removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Returns true when an entry written at `stored_at` is still usable at `now`.
///
/// The comparison is strict: an entry exactly `max_age_ms` old is stale.
fn is_fresh(stored_at: DateTime<Utc>, now: DateTime<Utc>, max_age_ms: u64) -> bool {
    let age_ms = now.signed_duration_since(stored_at).num_milliseconds();
    age_ms < max_age_ms as i64
}
