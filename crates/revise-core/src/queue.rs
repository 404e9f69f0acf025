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

//! Building the day's review queue.

use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::error::Fallible;
use crate::priority::rank;
use crate::retention::estimate_retention;
use crate::sm2::is_leech;
use crate::store::ItemStore;
use crate::types::item::ReviewableItem;
use crate::types::timestamp::Timestamp;

/// One position in the review queue.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueueEntry {
    pub item: ReviewableItem,
    pub priority: f64,
    pub retention: f64,
    pub is_leech: bool,
}

/// Order `due_items` for review, most urgent first.
///
/// Items that are not actually due at `now` are dropped, so a sloppy due
/// query cannot put completed items in front of the user.
pub fn build_queue(
    due_items: Vec<ReviewableItem>,
    now: Timestamp,
    config: &SchedulerConfig,
) -> Vec<QueueEntry> {
    let total = due_items.len();
    let due_items: Vec<ReviewableItem> = due_items
        .into_iter()
        .filter(|item| item.is_due(now))
        .collect();
    if due_items.len() < total {
        log::debug!(
            "Dropped {} items that are not due from the queue",
            total - due_items.len()
        );
    }
    rank(due_items, now, config)
        .into_iter()
        .map(|(item, priority)| {
            let retention = estimate_retention(&item, now);
            let is_leech = is_leech(&item, config);
            QueueEntry {
                item,
                priority,
                retention,
                is_leech,
            }
        })
        .collect()
}

/// Fetch the due items from `store` and build the queue, keeping at most
/// `limit` entries.
pub fn build_queue_from_store<S: ItemStore + ?Sized>(
    store: &S,
    now: Timestamp,
    config: &SchedulerConfig,
    limit: Option<usize>,
) -> Fallible<Vec<QueueEntry>> {
    let due: Vec<ReviewableItem> = store
        .list_due(now.date())?
        .into_iter()
        .map(|v| v.item)
        .collect();
    let mut queue = build_queue(due, now, config);
    if let Some(limit) = limit {
        queue.truncate(limit);
    }
    Ok(queue)
}
