//! Per-collection fetch orchestration and cache lifecycle.
//!
//! A `Collection` owns the in-memory items for one entity kind together with
//! the session cursor and the persisted envelope. It does no I/O itself:
//! callers ask it what remote call is needed (`initial_plan`, `more_plan`),
//! run the call, and feed the result back through the `apply_*` methods.
//! Every successful apply re-persists, keeping the persisted cache equivalent
//! to the in-memory one.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::warn;

use crate::cache::CacheStorage;
use crate::store::client::Page;
use crate::store::types::{EntityKind, Item, ItemDraft};

/// Hours before cached data is considered stale and forces a full refetch.
const FRESHNESS_HOURS: i64 = 24;

/// The next remote call a collection needs, decided synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
  /// Cache is usable; no network call needed.
  None,
  /// Full ordered fetch from the first page, replacing the cache wholesale.
  Full,
  /// One page starting after the remembered cursor.
  More { after: Option<String> },
}

pub struct Collection {
  kind: EntityKind,
  items: Vec<Item>,
  /// Id of the last document seen; session-only, reset at startup.
  cursor: Option<String>,
  all_fetched: bool,
  expanded: bool,
  fetched_at: Option<DateTime<Utc>>,
  /// Whether an envelope was found in the persistent cache.
  hydrated: bool,
  storage: Arc<dyn CacheStorage>,
}

impl Collection {
  /// Hydrate a collection from the persistent cache. A missing or malformed
  /// envelope reads as absent; `initial_plan` will then ask for a full fetch.
  pub fn load(kind: EntityKind, storage: Arc<dyn CacheStorage>) -> Self {
    let items = match storage.read_items(kind) {
      Ok(items) => items,
      Err(e) => {
        warn!("treating cached {} as absent: {}", kind.collection(), e);
        None
      }
    };
    let fetched_at = storage.read_fetched_at(kind).unwrap_or_else(|e| {
      warn!("ignoring fetch timestamp for {}: {}", kind.collection(), e);
      None
    });
    let all_fetched = storage.read_flag(&kind.all_fetched_flag()).unwrap_or(false);
    let expanded = storage.read_flag(&kind.expanded_flag()).unwrap_or(false);

    Self {
      kind,
      hydrated: items.is_some(),
      items: items.unwrap_or_default(),
      cursor: None,
      all_fetched,
      expanded,
      fetched_at,
      storage,
    }
  }

  pub fn kind(&self) -> EntityKind {
    self.kind
  }

  pub fn items(&self) -> &[Item] {
    &self.items
  }

  pub fn expanded(&self) -> bool {
    self.expanded
  }

  pub fn all_fetched(&self) -> bool {
    self.all_fetched
  }

  fn is_stale(&self, now: DateTime<Utc>) -> bool {
    match self.fetched_at {
      Some(at) => now - at > Duration::hours(FRESHNESS_HOURS),
      None => true,
    }
  }

  /// What the initial load needs: a full fetch when there is no usable
  /// envelope or the envelope has aged out, otherwise nothing.
  pub fn initial_plan(&self, now: DateTime<Utc>) -> FetchPlan {
    if !self.hydrated || self.is_stale(now) {
      FetchPlan::Full
    } else {
      FetchPlan::None
    }
  }

  /// What fetching the remainder needs. `None` once everything is here.
  pub fn more_plan(&self) -> FetchPlan {
    if self.all_fetched {
      FetchPlan::None
    } else {
      FetchPlan::More {
        after: self.cursor.clone(),
      }
    }
  }

  /// Replace the cache wholesale with a full fetch result.
  pub fn apply_refresh(&mut self, page: Page, now: DateTime<Utc>) {
    self.items = page.items;
    self.cursor = page.cursor;
    self.fetched_at = Some(now);
    self.hydrated = true;

    self.persist_items();
    if let Err(e) = self.storage.write_fetched_at(self.kind, now) {
      warn!("failed to persist fetch timestamp: {}", e);
    }
  }

  /// Merge one incremental page. Items whose id is already cached are
  /// silently dropped; an empty page marks the collection fully fetched.
  pub fn apply_page(&mut self, page: Page) {
    if page.items.is_empty() {
      self.mark_all_fetched();
      return;
    }

    for item in page.items {
      if !self.items.iter().any(|existing| existing.id == item.id) {
        self.items.push(item);
      }
    }
    if page.cursor.is_some() {
      self.cursor = page.cursor;
    }

    self.persist_items();
  }

  /// Record that the store has nothing further. Monotonic: nothing clears it
  /// short of explicit invalidation of the persistent cache.
  pub fn mark_all_fetched(&mut self) {
    self.all_fetched = true;
    if let Err(e) = self.storage.write_flag(&self.kind.all_fetched_flag(), true) {
      warn!("failed to persist all-fetched flag: {}", e);
    }
  }

  /// Append an item created remotely.
  pub fn insert(&mut self, item: Item) {
    self.items.push(item);
    self.persist_items();
  }

  /// Merge a successful remote update into the cached copy. An id not in the
  /// cache is left alone; the persisted copy is refreshed either way.
  pub fn merge_patch(&mut self, id: &str, patch: &ItemDraft) {
    if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
      item.apply_patch(patch);
    }
    self.persist_items();
  }

  /// Drop an item deleted remotely.
  pub fn remove(&mut self, id: &str) {
    self.items.retain(|item| item.id != id);
    self.persist_items();
  }

  /// Re-order the cache most-recent-first by year range. Timeline sections
  /// call this after mutations so the persisted order matches the display.
  pub fn resort_by_year(&mut self) {
    self.items = crate::filter::sort_by_year_desc(&self.items);
    self.persist_items();
  }

  pub fn set_expanded(&mut self, expanded: bool) {
    self.expanded = expanded;
    if let Err(e) = self
      .storage
      .write_flag(&self.kind.expanded_flag(), expanded)
    {
      warn!("failed to persist expanded flag: {}", e);
    }
  }

  /// Persistence failure is non-fatal: the remote store is the source of
  /// truth on the next full refresh.
  fn persist_items(&self) {
    if let Err(e) = self.storage.write_items(self.kind, &self.items) {
      warn!("failed to persist {} cache: {}", self.kind.collection(), e);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::SqliteStorage;
  use color_eyre::eyre::eyre;

  fn item(id: &str, title: &str) -> Item {
    Item {
      id: id.to_string(),
      title: title.to_string(),
      description: None,
      image: None,
      date: None,
      priority: None,
      year: None,
      subtitle: None,
      link: None,
      tech: Vec::new(),
    }
  }

  fn page(items: Vec<Item>) -> Page {
    let cursor = items.last().map(|i| i.id.clone());
    Page { items, cursor }
  }

  fn storage() -> Arc<SqliteStorage> {
    Arc::new(SqliteStorage::open_in_memory().unwrap())
  }

  #[test]
  fn test_initial_plan_without_envelope_is_full() {
    let collection = Collection::load(EntityKind::Project, storage());
    assert_eq!(collection.initial_plan(Utc::now()), FetchPlan::Full);
  }

  #[test]
  fn test_freshness_window() {
    let storage = storage();
    let now = Utc::now();
    storage.write_items(EntityKind::Project, &[item("a", "A")]).unwrap();

    storage
      .write_fetched_at(EntityKind::Project, now - Duration::hours(23))
      .unwrap();
    let fresh = Collection::load(EntityKind::Project, storage.clone());
    assert_eq!(fresh.initial_plan(now), FetchPlan::None);

    storage
      .write_fetched_at(EntityKind::Project, now - Duration::hours(25))
      .unwrap();
    let stale = Collection::load(EntityKind::Project, storage.clone());
    assert_eq!(stale.initial_plan(now), FetchPlan::Full);
  }

  #[test]
  fn test_unreadable_envelope_reads_as_absent() {
    struct FailingStorage;
    impl CacheStorage for FailingStorage {
      fn read_items(&self, _kind: EntityKind) -> color_eyre::Result<Option<Vec<Item>>> {
        Err(eyre!("malformed cached data"))
      }
      fn write_items(&self, _kind: EntityKind, _items: &[Item]) -> color_eyre::Result<()> {
        Ok(())
      }
      fn read_fetched_at(
        &self,
        _kind: EntityKind,
      ) -> color_eyre::Result<Option<DateTime<Utc>>> {
        Ok(Some(Utc::now()))
      }
      fn write_fetched_at(
        &self,
        _kind: EntityKind,
        _at: DateTime<Utc>,
      ) -> color_eyre::Result<()> {
        Ok(())
      }
      fn read_flag(&self, _name: &str) -> color_eyre::Result<bool> {
        Ok(false)
      }
      fn write_flag(&self, _name: &str, _value: bool) -> color_eyre::Result<()> {
        Ok(())
      }
      fn clear_kind(&self, _kind: EntityKind) -> color_eyre::Result<()> {
        Ok(())
      }
    }

    let collection = Collection::load(EntityKind::Project, Arc::new(FailingStorage));
    // Even with a fresh timestamp, unreadable items force a refetch.
    assert_eq!(collection.initial_plan(Utc::now()), FetchPlan::Full);
  }

  #[test]
  fn test_incremental_merge_drops_duplicates() {
    let mut collection = Collection::load(EntityKind::Project, storage());
    collection.apply_refresh(page(vec![item("a", "A"), item("b", "B")]), Utc::now());

    collection.apply_page(page(vec![item("b", "B"), item("c", "C")]));

    let ids: Vec<&str> = collection.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
  }

  #[test]
  fn test_cursor_advances_with_pages() {
    let mut collection = Collection::load(EntityKind::Project, storage());
    collection.apply_refresh(page(vec![item("a", "A")]), Utc::now());

    assert_eq!(
      collection.more_plan(),
      FetchPlan::More {
        after: Some("a".to_string())
      }
    );

    collection.apply_page(page(vec![item("b", "B")]));
    assert_eq!(
      collection.more_plan(),
      FetchPlan::More {
        after: Some("b".to_string())
      }
    );
  }

  #[test]
  fn test_empty_page_marks_all_fetched_and_persists() {
    let storage = storage();
    let mut collection = Collection::load(EntityKind::Project, storage.clone());
    collection.apply_refresh(page(vec![item("a", "A")]), Utc::now());

    collection.apply_page(Page::default());

    assert!(collection.all_fetched());
    assert_eq!(collection.more_plan(), FetchPlan::None);

    // Survives a reload from the same storage.
    let reloaded = Collection::load(EntityKind::Project, storage);
    assert!(reloaded.all_fetched());
  }

  #[test]
  fn test_all_fetched_is_monotonic() {
    let mut collection = Collection::load(EntityKind::Project, storage());
    collection.mark_all_fetched();

    collection.apply_page(page(vec![item("x", "X")]));
    assert!(collection.all_fetched());
  }

  #[test]
  fn test_merge_patch_updates_cached_copy_and_persists() {
    let storage = storage();
    let mut collection = Collection::load(EntityKind::Project, storage.clone());
    let mut original = item("a", "A");
    original.priority = Some(5);
    collection.apply_refresh(page(vec![original]), Utc::now());

    let patch = ItemDraft {
      title: Some("X".to_string()),
      ..ItemDraft::default()
    };
    collection.merge_patch("a", &patch);

    assert_eq!(collection.items()[0].title, "X");
    assert_eq!(collection.items()[0].priority, Some(5));

    let persisted = storage.read_items(EntityKind::Project).unwrap().unwrap();
    assert_eq!(persisted, collection.items());
  }

  #[test]
  fn test_merge_patch_on_unknown_id_is_a_no_op() {
    let storage = storage();
    let mut collection = Collection::load(EntityKind::Project, storage.clone());
    collection.apply_refresh(page(vec![item("a", "A")]), Utc::now());

    let patch = ItemDraft {
      title: Some("X".to_string()),
      ..ItemDraft::default()
    };
    collection.merge_patch("missing", &patch);

    assert_eq!(collection.items()[0].title, "A");
    let persisted = storage.read_items(EntityKind::Project).unwrap().unwrap();
    assert_eq!(persisted, collection.items());
  }

  #[test]
  fn test_insert_and_remove_keep_persisted_cache_in_step() {
    let storage = storage();
    let mut collection = Collection::load(EntityKind::Project, storage.clone());
    collection.apply_refresh(page(vec![item("a", "A")]), Utc::now());

    collection.insert(item("b", "B"));
    assert_eq!(
      storage.read_items(EntityKind::Project).unwrap().unwrap(),
      collection.items()
    );

    collection.remove("a");
    let ids: Vec<&str> = collection.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["b"]);
    assert_eq!(
      storage.read_items(EntityKind::Project).unwrap().unwrap(),
      collection.items()
    );
  }

  #[test]
  fn test_expanded_flag_survives_reload() {
    let storage = storage();
    let mut collection = Collection::load(EntityKind::Project, storage.clone());
    collection.set_expanded(true);

    let reloaded = Collection::load(EntityKind::Project, storage);
    assert!(reloaded.expanded());
  }

  #[test]
  fn test_resort_by_year_orders_most_recent_first() {
    let mut collection = Collection::load(EntityKind::Experience, storage());
    let mut old = item("old", "Old");
    old.year = Some("2015".to_string());
    let mut open = item("open", "Open");
    open.year = Some("2022 - Present".to_string());
    collection.apply_refresh(page(vec![old, open]), Utc::now());

    collection.resort_by_year();

    let ids: Vec<&str> = collection.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["open", "old"]);
  }
}
