//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

use crate::store::types::{EntityKind, Item};

/// Persistent key-value cache, one envelope per entity kind plus named flags.
///
/// Absent keys read back as `None`/`false`, never as errors. Errors are
/// reserved for storage failures and undecodable rows; callers treat both as
/// cache-absent.
pub trait CacheStorage: Send + Sync {
  /// Read the cached item array for a kind, if one was ever written.
  fn read_items(&self, kind: EntityKind) -> Result<Option<Vec<Item>>>;

  /// Replace the cached item array for a kind.
  fn write_items(&self, kind: EntityKind, items: &[Item]) -> Result<()>;

  fn read_fetched_at(&self, kind: EntityKind) -> Result<Option<DateTime<Utc>>>;

  fn write_fetched_at(&self, kind: EntityKind, at: DateTime<Utc>) -> Result<()>;

  fn read_flag(&self, name: &str) -> Result<bool>;

  fn write_flag(&self, name: &str, value: bool) -> Result<()>;

  /// Explicit invalidation: drop the kind's envelope and its all-fetched
  /// marker. The expanded flag is a view preference and survives.
  fn clear_kind(&self, kind: EntityKind) -> Result<()>;
}

/// Storage implementation that doesn't persist anything.
/// Used when caching is disabled - all reads miss and writes are discarded.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn read_items(&self, _kind: EntityKind) -> Result<Option<Vec<Item>>> {
    Ok(None)
  }

  fn write_items(&self, _kind: EntityKind, _items: &[Item]) -> Result<()> {
    Ok(())
  }

  fn read_fetched_at(&self, _kind: EntityKind) -> Result<Option<DateTime<Utc>>> {
    Ok(None)
  }

  fn write_fetched_at(&self, _kind: EntityKind, _at: DateTime<Utc>) -> Result<()> {
    Ok(())
  }

  fn read_flag(&self, _name: &str) -> Result<bool> {
    Ok(false)
  }

  fn write_flag(&self, _name: &str, _value: bool) -> Result<()> {
    Ok(())
  }

  fn clear_kind(&self, _kind: EntityKind) -> Result<()> {
    Ok(())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- One envelope per collection (serialized JSON array + fetch timestamp)
CREATE TABLE IF NOT EXISTS collection_cache (
    kind TEXT PRIMARY KEY,
    items BLOB NOT NULL,
    fetched_at TEXT
);

-- Named boolean view/session flags
CREATE TABLE IF NOT EXISTS ui_flags (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
"#;

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Create an in-memory storage, used in tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("folio").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStorage for SqliteStorage {
  fn read_items(&self, kind: EntityKind) -> Result<Option<Vec<Item>>> {
    let conn = self.lock()?;

    let data: Option<Vec<u8>> = conn
      .query_row(
        "SELECT items FROM collection_cache WHERE kind = ?",
        params![kind.collection()],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cached items: {}", e))?;

    match data {
      Some(bytes) => {
        let items: Vec<Item> = serde_json::from_slice(&bytes)
          .map_err(|e| eyre!("Malformed cached data for {}: {}", kind.collection(), e))?;
        Ok(Some(items))
      }
      None => Ok(None),
    }
  }

  fn write_items(&self, kind: EntityKind, items: &[Item]) -> Result<()> {
    let conn = self.lock()?;
    let data = serde_json::to_vec(items).map_err(|e| eyre!("Failed to serialize items: {}", e))?;

    conn
      .execute(
        "INSERT INTO collection_cache (kind, items, fetched_at) VALUES (?, ?, NULL)
         ON CONFLICT(kind) DO UPDATE SET items = excluded.items",
        params![kind.collection(), data],
      )
      .map_err(|e| eyre!("Failed to write cached items: {}", e))?;

    Ok(())
  }

  fn read_fetched_at(&self, kind: EntityKind) -> Result<Option<DateTime<Utc>>> {
    let conn = self.lock()?;

    let stamp: Option<Option<String>> = conn
      .query_row(
        "SELECT fetched_at FROM collection_cache WHERE kind = ?",
        params![kind.collection()],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read fetch timestamp: {}", e))?;

    match stamp.flatten() {
      Some(s) => {
        let at = DateTime::parse_from_rfc3339(&s)
          .map_err(|e| eyre!("Malformed fetch timestamp '{}': {}", s, e))?;
        Ok(Some(at.with_timezone(&Utc)))
      }
      None => Ok(None),
    }
  }

  fn write_fetched_at(&self, kind: EntityKind, at: DateTime<Utc>) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT INTO collection_cache (kind, items, fetched_at) VALUES (?, '[]', ?)
         ON CONFLICT(kind) DO UPDATE SET fetched_at = excluded.fetched_at",
        params![kind.collection(), at.to_rfc3339()],
      )
      .map_err(|e| eyre!("Failed to write fetch timestamp: {}", e))?;

    Ok(())
  }

  fn read_flag(&self, name: &str) -> Result<bool> {
    let conn = self.lock()?;

    let value: Option<i64> = conn
      .query_row(
        "SELECT value FROM ui_flags WHERE name = ?",
        params![name],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read flag {}: {}", name, e))?;

    Ok(value.unwrap_or(0) != 0)
  }

  fn write_flag(&self, name: &str, value: bool) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT INTO ui_flags (name, value) VALUES (?, ?)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        params![name, i64::from(value)],
      )
      .map_err(|e| eyre!("Failed to write flag {}: {}", name, e))?;

    Ok(())
  }

  fn clear_kind(&self, kind: EntityKind) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "DELETE FROM collection_cache WHERE kind = ?",
        params![kind.collection()],
      )
      .map_err(|e| eyre!("Failed to clear cache for {}: {}", kind.collection(), e))?;

    conn
      .execute(
        "DELETE FROM ui_flags WHERE name = ?",
        params![kind.all_fetched_flag()],
      )
      .map_err(|e| eyre!("Failed to clear flags for {}: {}", kind.collection(), e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: &str, title: &str) -> Item {
    Item {
      id: id.to_string(),
      title: title.to_string(),
      description: None,
      image: None,
      date: None,
      priority: Some(1),
      year: None,
      subtitle: None,
      link: None,
      tech: Vec::new(),
    }
  }

  #[test]
  fn test_items_round_trip() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let items = vec![item("a", "Alpha"), item("b", "Beta")];

    storage.write_items(EntityKind::Project, &items).unwrap();
    let back = storage.read_items(EntityKind::Project).unwrap().unwrap();

    assert_eq!(back, items);
  }

  #[test]
  fn test_absent_keys_read_as_absent() {
    let storage = SqliteStorage::open_in_memory().unwrap();

    assert!(storage.read_items(EntityKind::Achievement).unwrap().is_none());
    assert!(storage
      .read_fetched_at(EntityKind::Achievement)
      .unwrap()
      .is_none());
    assert!(!storage.read_flag("expanded:projects").unwrap());
  }

  #[test]
  fn test_kinds_are_namespaced() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage
      .write_items(EntityKind::Project, &[item("p", "Proj")])
      .unwrap();

    assert!(storage.read_items(EntityKind::Achievement).unwrap().is_none());
  }

  #[test]
  fn test_write_items_preserves_timestamp() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let at = Utc::now();

    storage.write_fetched_at(EntityKind::Project, at).unwrap();
    storage
      .write_items(EntityKind::Project, &[item("p", "Proj")])
      .unwrap();

    let back = storage.read_fetched_at(EntityKind::Project).unwrap().unwrap();
    assert_eq!(back.timestamp(), at.timestamp());
  }

  #[test]
  fn test_flag_round_trip() {
    let storage = SqliteStorage::open_in_memory().unwrap();

    storage.write_flag("expanded:projects", true).unwrap();
    assert!(storage.read_flag("expanded:projects").unwrap());

    storage.write_flag("expanded:projects", false).unwrap();
    assert!(!storage.read_flag("expanded:projects").unwrap());
  }

  #[test]
  fn test_clear_kind_drops_envelope_and_marker() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let kind = EntityKind::Project;

    storage.write_items(kind, &[item("p", "Proj")]).unwrap();
    storage.write_fetched_at(kind, Utc::now()).unwrap();
    storage.write_flag(&kind.all_fetched_flag(), true).unwrap();
    storage.write_flag(&kind.expanded_flag(), true).unwrap();

    storage.clear_kind(kind).unwrap();

    assert!(storage.read_items(kind).unwrap().is_none());
    assert!(storage.read_fetched_at(kind).unwrap().is_none());
    assert!(!storage.read_flag(&kind.all_fetched_flag()).unwrap());
    // Expanded is a view preference and survives invalidation.
    assert!(storage.read_flag(&kind.expanded_flag()).unwrap());
  }
}
