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

//! The item lifecycle: active, completed, archived, then gone.
//!
//! ```text
//!            graduate              sweep, archive_at      sweep, delete_at
//!   active ------------> completed ----------------> archived -------------> (removed)
//!     ^                      |                          |
//!     +------ review --------+---------- review --------+
//! ```
//!
//! Graduation happens on review. Archival and deletion happen only during a
//! sweep, once the grace periods recorded at graduation have passed.

use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::store::ItemStore;
use crate::types::date::Date;
use crate::types::item::ReviewableItem;
use crate::types::item::Status;
use crate::types::item_id::ItemId;
use crate::types::timestamp::Timestamp;

/// The lifecycle-related fields of an item. The three dates are always set
/// together or cleared together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LifecycleState {
    pub status: Status,
    pub completed_at: Option<Date>,
    pub archive_at: Option<Date>,
    pub delete_at: Option<Date>,
}

impl LifecycleState {
    pub fn active() -> Self {
        Self {
            status: Status::Active,
            completed_at: None,
            archive_at: None,
            delete_at: None,
        }
    }

    /// Completed today, with both grace periods counted from today.
    pub fn completed(today: Date, config: &SchedulerConfig) -> Self {
        let archive_at = today.plus_days(config.archive_grace_days as i64);
        let delete_at = archive_at.plus_days(config.delete_grace_days as i64);
        Self {
            status: Status::Completed,
            completed_at: Some(today),
            archive_at: Some(archive_at),
            delete_at: Some(delete_at),
        }
    }

    pub fn of(item: &ReviewableItem) -> Self {
        Self {
            status: item.status,
            completed_at: item.completed_at,
            archive_at: item.archive_at,
            delete_at: item.delete_at,
        }
    }

    pub fn apply_to(self, item: &mut ReviewableItem) {
        item.status = self.status;
        item.completed_at = self.completed_at;
        item.archive_at = self.archive_at;
        item.delete_at = self.delete_at;
    }
}

/// The lifecycle state of `item` after it is reviewed at `now`.
///
/// An active item that the evaluator graduated becomes completed. A
/// completed or archived item is reactivated by any review; it does not
/// graduate again in the same review, even if the evaluator says so.
pub fn transition_on_review(
    item: &ReviewableItem,
    is_graduated: bool,
    now: Timestamp,
    config: &SchedulerConfig,
) -> Fallible<LifecycleState> {
    item.check_lifecycle()?;
    let state = match item.status {
        Status::Active if is_graduated => LifecycleState::completed(now.date(), config),
        Status::Active => LifecycleState::active(),
        Status::Completed | Status::Archived => {
            log::debug!("Reactivating item {}", item.id);
            LifecycleState::active()
        }
    };
    Ok(state)
}

/// What a sweep does to one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepAction {
    Keep,
    Archive,
    Delete,
}

pub fn transition_on_sweep(item: &ReviewableItem, now: Timestamp) -> Fallible<SweepAction> {
    item.check_lifecycle()?;
    let today = now.date();
    let action = match (item.status, item.archive_at, item.delete_at) {
        (Status::Active, _, _) => SweepAction::Keep,
        // A completed item past both deadlines skips straight to deletion,
        // so one applied sweep leaves nothing for the next.
        (Status::Completed | Status::Archived, _, Some(delete_at)) if today >= delete_at => {
            SweepAction::Delete
        }
        (Status::Completed, Some(archive_at), _) if today >= archive_at => SweepAction::Archive,
        _ => SweepAction::Keep,
    };
    Ok(action)
}

/// The outcome of planning a sweep over a collection. The id lists are
/// disjoint.
#[derive(Debug, Default, PartialEq)]
pub struct SweepPlan {
    pub to_archive: Vec<ItemId>,
    pub to_delete: Vec<ItemId>,
    /// Always empty. Only a review reactivates an item.
    pub to_reactivate: Vec<ItemId>,
    /// Items whose lifecycle fields are inconsistent. They are left alone;
    /// the rest of the sweep is unaffected.
    pub rejected: Vec<(ItemId, ErrorReport)>,
}

impl SweepPlan {
    pub fn is_empty(&self) -> bool {
        self.to_archive.is_empty() && self.to_delete.is_empty() && self.to_reactivate.is_empty()
    }
}

/// Plan the lifecycle sweep. Items are independent of each other, and the
/// result lists follow the input order.
pub fn sweep<'a>(
    items: impl IntoIterator<Item = &'a ReviewableItem>,
    now: Timestamp,
) -> SweepPlan {
    let mut plan = SweepPlan::default();
    for item in items {
        match transition_on_sweep(item, now) {
            Ok(SweepAction::Keep) => {}
            Ok(SweepAction::Archive) => plan.to_archive.push(item.id),
            Ok(SweepAction::Delete) => plan.to_delete.push(item.id),
            Err(e) => {
                log::warn!("Skipping item {} in sweep: {}", item.id, e.message());
                plan.rejected.push((item.id, e));
            }
        }
    }
    plan
}

/// What a sweep actually changed in a store.
#[derive(Debug, Default, PartialEq)]
pub struct SweepReport {
    pub archived: Vec<ItemId>,
    pub deleted: Vec<ItemId>,
    /// Items left untouched because of an error. Conflicts land here too;
    /// the next sweep retries them.
    pub skipped: Vec<(ItemId, ErrorReport)>,
}

/// Plan a sweep over everything in `store` and apply it.
pub fn apply_sweep<S: ItemStore + ?Sized>(store: &S, now: Timestamp) -> Fallible<SweepReport> {
    let mut report = SweepReport::default();
    for stored in store.list_all()? {
        let item = &stored.item;
        let outcome = match transition_on_sweep(item, now) {
            Ok(SweepAction::Keep) => continue,
            Ok(SweepAction::Archive) => {
                let mut archived = item.clone();
                archived.status = Status::Archived;
                store
                    .update(&archived, stored.version)
                    .map(|_| report.archived.push(item.id))
            }
            Ok(SweepAction::Delete) => store
                .remove(&item.id, stored.version)
                .map(|_| report.deleted.push(item.id)),
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            if e.kind() == ErrorKind::Conflict {
                log::debug!("Item {} changed during sweep: {}", item.id, e.message());
            } else {
                log::warn!("Skipping item {} in sweep: {}", item.id, e.message());
            }
            report.skipped.push((item.id, e));
        }
    }
    log::info!(
        "Sweep archived {} and deleted {} items",
        report.archived.len(),
        report.deleted.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::item::SchedulingScheme;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn date(s: &str) -> Date {
        Date::try_from(s.to_string()).unwrap()
    }

    fn make_item(title: &str) -> ReviewableItem {
        let created_at = ts("2024-01-01T09:00:00.000");
        ReviewableItem::new(
            ItemId::derive(title, created_at),
            SchedulingScheme::Adaptive,
            created_at,
        )
    }

    /// An item that graduated on `completed`.
    fn completed(title: &str, completed: &str) -> ReviewableItem {
        let mut item = make_item(title);
        LifecycleState::completed(date(completed), &SchedulerConfig::default()).apply_to(&mut item);
        item
    }

    #[test]
    fn test_graduation_sets_dates() -> Fallible<()> {
        let config = SchedulerConfig::default();
        let item = make_item("generics");
        let state = transition_on_review(&item, true, ts("2024-03-01T10:00:00.000"), &config)?;
        assert_eq!(state.status, Status::Completed);
        assert_eq!(state.completed_at, Some(date("2024-03-01")));
        assert_eq!(state.archive_at, Some(date("2024-03-31")));
        assert_eq!(state.delete_at, Some(date("2024-05-30")));
        Ok(())
    }

    #[test]
    fn test_no_graduation_stays_active() -> Fallible<()> {
        let config = SchedulerConfig::default();
        let item = make_item("generics");
        let state = transition_on_review(&item, false, ts("2024-03-01T10:00:00.000"), &config)?;
        assert_eq!(state, LifecycleState::active());
        Ok(())
    }

    #[test]
    fn test_review_reactivates() -> Fallible<()> {
        let config = SchedulerConfig::default();
        let now = ts("2024-03-10T10:00:00.000");
        let mut archived = completed("generics", "2024-01-01");
        archived.status = Status::Archived;
        for item in [completed("generics", "2024-03-01"), archived] {
            for graduated in [false, true] {
                let state = transition_on_review(&item, graduated, now, &config)?;
                assert_eq!(state, LifecycleState::active());
            }
        }
        Ok(())
    }

    #[test]
    fn test_sweep_archives_expired_completed_item() {
        // Completed on 2024-01-01, so archive_at is 2024-01-31.
        let item = completed("modules", "2024-01-01");
        let plan = sweep([&item], ts("2024-02-10T08:00:00.000"));
        assert_eq!(plan.to_archive, vec![item.id]);
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_sweep_keeps_completed_item_in_grace() {
        let item = completed("modules", "2024-01-01");
        let plan = sweep([&item], ts("2024-01-30T23:59:59.999"));
        assert!(plan.is_empty());
        let plan = sweep([&item], ts("2024-01-31T00:00:00.000"));
        assert_eq!(plan.to_archive, vec![item.id]);
    }

    #[test]
    fn test_sweep_deletes_expired_archived_item() {
        let mut item = completed("modules", "2024-01-01");
        item.status = Status::Archived;
        // delete_at is 2024-03-31.
        assert!(sweep([&item], ts("2024-03-30T08:00:00.000")).is_empty());
        let plan = sweep([&item], ts("2024-03-31T08:00:00.000"));
        assert_eq!(plan.to_delete, vec![item.id]);
        assert!(plan.to_archive.is_empty());
    }

    #[test]
    fn test_sweep_deletes_long_forgotten_completed_item() {
        let item = completed("modules", "2024-01-01");
        let plan = sweep([&item], ts("2024-06-01T08:00:00.000"));
        assert!(plan.to_archive.is_empty());
        assert_eq!(plan.to_delete, vec![item.id]);
    }

    #[test]
    fn test_sweep_ignores_active_items() {
        let item = make_item("modules");
        assert!(sweep([&item], ts("2030-01-01T00:00:00.000")).is_empty());
    }

    #[test]
    fn test_sweep_isolates_inconsistent_items() {
        let mut broken = make_item("broken");
        broken.archive_at = Some(date("2024-01-02"));
        let good = completed("good", "2024-01-01");
        let plan = sweep([&broken, &good], ts("2024-02-10T08:00:00.000"));
        assert_eq!(plan.to_archive, vec![good.id]);
        assert_eq!(plan.rejected.len(), 1);
        assert_eq!(plan.rejected[0].0, broken.id);
        assert_eq!(plan.rejected[0].1.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_applied_sweep_is_idempotent() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut archived = completed("archived", "2023-12-01");
        archived.status = Status::Archived;
        let items = [
            make_item("active"),
            completed("fresh", "2024-02-01"),
            completed("stale", "2024-01-01"),
            completed("ancient", "2023-06-01"),
            archived,
        ];
        for item in &items {
            store.insert(item)?;
        }
        let now = ts("2024-02-10T08:00:00.000");
        let report = apply_sweep(&store, now)?;
        assert_eq!(report.archived, vec![items[2].id]);
        // The archived item is only deletable from 2024-02-29.
        assert_eq!(report.deleted, vec![items[3].id]);
        assert!(report.skipped.is_empty());
        assert_eq!(
            store.get(&items[2].id)?.unwrap().item.status,
            Status::Archived
        );

        let second = apply_sweep(&store, now)?;
        assert_eq!(second, SweepReport::default());

        let remaining = store.list_all()?;
        assert_eq!(remaining.len(), 4);
        assert!(sweep(remaining.iter().map(|v| &v.item), now).is_empty());
        Ok(())
    }
}
