// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Storage of items, as the engine sees it.
//!
//! Every stored item carries a version that goes up on each write. Writers
//! pass the version they read, and a store rejects the write with a
//! `Conflict` error if the item changed in between, so a review and a
//! concurrent sweep can never interleave into a half-applied state.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::date::Date;
use crate::types::item::ReviewableItem;
use crate::types::item::Status;
use crate::types::item_id::ItemId;

pub type Version = u64;

/// An item together with the version it was read at.
#[derive(Clone, Debug, PartialEq)]
pub struct Versioned {
    pub item: ReviewableItem,
    pub version: Version,
}

pub trait ItemStore {
    /// Add a new item. Fails if an item with the same id exists.
    fn insert(&self, item: &ReviewableItem) -> Fallible<Version>;

    fn get(&self, id: &ItemId) -> Fallible<Option<Versioned>>;

    fn list_all(&self) -> Fallible<Vec<Versioned>>;

    /// Active items whose next review date is on or before `today`.
    fn list_due(&self, today: Date) -> Fallible<Vec<Versioned>>;

    /// Replace an item, provided it is still at `expected`. Returns the new
    /// version. The review history may only grow.
    fn update(&self, item: &ReviewableItem, expected: Version) -> Fallible<Version>;

    /// Remove an item, provided it is still at `expected`.
    fn remove(&self, id: &ItemId, expected: Version) -> Fallible<()>;
}

/// An in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<ItemId, Versioned>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Fallible<MutexGuard<'_, BTreeMap<ItemId, Versioned>>> {
        self.items
            .lock()
            .map_err(|_| ErrorReport::new("item store lock poisoned"))
    }
}

pub fn check_version(id: &ItemId, found: Version, expected: Version) -> Fallible<()> {
    if found != expected {
        return Err(ErrorReport::conflict(format!(
            "item {id} is at version {found}, expected {expected}"
        )));
    }
    Ok(())
}

pub fn not_found(id: &ItemId) -> ErrorReport {
    ErrorReport::not_found(format!("no item with id {id}"))
}

impl ItemStore for MemoryStore {
    fn insert(&self, item: &ReviewableItem) -> Fallible<Version> {
        let mut items = self.lock()?;
        if items.contains_key(&item.id) {
            return Err(ErrorReport::invalid_input(format!(
                "item {} already exists",
                item.id
            )));
        }
        let version = 1;
        items.insert(
            item.id,
            Versioned {
                item: item.clone(),
                version,
            },
        );
        Ok(version)
    }

    fn get(&self, id: &ItemId) -> Fallible<Option<Versioned>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list_all(&self) -> Fallible<Vec<Versioned>> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn list_due(&self, today: Date) -> Fallible<Vec<Versioned>> {
        Ok(self
            .lock()?
            .values()
            .filter(|v| v.item.status == Status::Active && v.item.next_review_date <= today)
            .cloned()
            .collect())
    }

    fn update(&self, item: &ReviewableItem, expected: Version) -> Fallible<Version> {
        let mut items = self.lock()?;
        let stored = items.get_mut(&item.id).ok_or_else(|| not_found(&item.id))?;
        check_version(&item.id, stored.version, expected)?;
        if !item.review_history.starts_with(&stored.item.review_history) {
            return Err(ErrorReport::precondition(format!(
                "update of item {} rewrites its review history",
                item.id
            )));
        }
        stored.item = item.clone();
        stored.version += 1;
        Ok(stored.version)
    }

    fn remove(&self, id: &ItemId, expected: Version) -> Fallible<()> {
        let mut items = self.lock()?;
        let stored = items.get(id).ok_or_else(|| not_found(id))?;
        check_version(id, stored.version, expected)?;
        items.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::item::SchedulingScheme;
    use crate::types::timestamp::Timestamp;

    fn make_item(title: &str) -> ReviewableItem {
        let created_at = Timestamp::try_from("2024-01-01T09:00:00.000".to_string()).unwrap();
        ReviewableItem::new(
            ItemId::derive(title, created_at),
            SchedulingScheme::Adaptive,
            created_at,
        )
    }

    fn date(s: &str) -> Date {
        Date::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_insert_and_get() -> Fallible<()> {
        let store = MemoryStore::new();
        let item = make_item("iterators");
        assert_eq!(store.insert(&item)?, 1);
        let stored = store.get(&item.id)?.unwrap();
        assert_eq!(stored.item, item);
        assert_eq!(stored.version, 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_insert_rejected() -> Fallible<()> {
        let store = MemoryStore::new();
        let item = make_item("iterators");
        store.insert(&item)?;
        assert!(store.insert(&item).is_err());
        Ok(())
    }

    #[test]
    fn test_stale_update_conflicts() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut item = make_item("iterators");
        store.insert(&item)?;
        item.interval = 1;
        assert_eq!(store.update(&item, 1)?, 2);
        item.interval = 6;
        let err = store.update(&item, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.get(&item.id)?.unwrap().item.interval, 1);
        Ok(())
    }

    #[test]
    fn test_update_unknown_item() {
        let store = MemoryStore::new();
        let err = store.update(&make_item("ghost"), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_stale_remove_conflicts() -> Fallible<()> {
        let store = MemoryStore::new();
        let item = make_item("iterators");
        store.insert(&item)?;
        store.update(&item, 1)?;
        assert_eq!(store.remove(&item.id, 1).unwrap_err().kind(), ErrorKind::Conflict);
        store.remove(&item.id, 2)?;
        assert!(store.get(&item.id)?.is_none());
        Ok(())
    }

    #[test]
    fn test_list_due() -> Fallible<()> {
        let store = MemoryStore::new();
        let due = make_item("due");
        let mut later = make_item("later");
        later.next_review_date = date("2024-02-01");
        let mut done = make_item("done");
        done.status = Status::Completed;
        for item in [&due, &later, &done] {
            store.insert(item)?;
        }
        let ids: Vec<ItemId> = store
            .list_due(date("2024-01-15"))?
            .into_iter()
            .map(|v| v.item.id)
            .collect();
        assert_eq!(ids, vec![due.id]);
        Ok(())
    }
}
