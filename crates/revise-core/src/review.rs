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

//! Applying a completed review to an item.

use crate::config::SchedulerConfig;
use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::evaluate::evaluate;
use crate::lifecycle::transition_on_review;
use crate::store::ItemStore;
use crate::store::not_found;
use crate::types::item::ReviewLogEntry;
use crate::types::item::ReviewableItem;
use crate::types::item_id::ItemId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// How many times `record_review` re-reads an item after a write conflict.
const MAX_ATTEMPTS: usize = 3;

/// The snapshot of `item` after it is reviewed at `now` with `rating`.
///
/// Runs the item's evaluator, then the lifecycle transition, and appends
/// one entry to the review history.
pub fn review(
    item: &ReviewableItem,
    rating: Rating,
    now: Timestamp,
    time_spent_seconds: u32,
    config: &SchedulerConfig,
) -> Fallible<ReviewableItem> {
    let evaluation = evaluate(item, rating, now, config)?;
    let lifecycle = transition_on_review(item, evaluation.is_graduated, now, config)?;
    let mut next = item.clone();
    next.easiness_factor = evaluation.easiness_factor;
    next.interval = evaluation.interval;
    next.repetition = evaluation.repetition;
    next.lapse_count = evaluation.lapse_count;
    next.next_review_date = evaluation.next_review_date;
    next.last_reviewed_at = Some(now);
    lifecycle.apply_to(&mut next);
    next.review_history.push(ReviewLogEntry {
        reviewed_at: now,
        rating,
        time_spent_seconds,
        interval_after: evaluation.interval,
        easiness_after: evaluation.easiness_factor,
    });
    Ok(next)
}

/// Review the item with id `id` in `store` and persist the result.
///
/// If another writer updates the item between the read and the write, the
/// review is recomputed against the fresh snapshot. Evaluation is pure, so
/// retrying is safe.
pub fn record_review<S: ItemStore + ?Sized>(
    store: &S,
    id: &ItemId,
    rating: Rating,
    now: Timestamp,
    time_spent_seconds: u32,
    config: &SchedulerConfig,
) -> Fallible<ReviewableItem> {
    let mut attempt = 1;
    loop {
        let stored = store.get(id)?.ok_or_else(|| not_found(id))?;
        let reviewed = review(&stored.item, rating, now, time_spent_seconds, config)?;
        match store.update(&reviewed, stored.version) {
            Ok(_) => return Ok(reviewed),
            Err(e) if e.kind() == ErrorKind::Conflict && attempt < MAX_ATTEMPTS => {
                log::debug!("Retrying review of {id} after conflict: {}", e.message());
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
