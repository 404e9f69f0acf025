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

//! Ordering of due items by urgency.

use std::cmp::Ordering;

use crate::config::SchedulerConfig;
use crate::retention::FULL_RETENTION;
use crate::retention::estimate_retention;
use crate::types::item::ReviewableItem;
use crate::types::timestamp::Timestamp;

/// Days past the item's due date, zero if it is not overdue.
pub fn overdue_days(item: &ReviewableItem, now: Timestamp) -> i64 {
    now.date().days_since(item.next_review_date).max(0)
}

/// The urgency of reviewing `item` at `now`. Higher is more urgent.
///
/// A weighted sum of days overdue, lifetime lapses, and estimated
/// forgetting (`100 - retention`).
pub fn priority(item: &ReviewableItem, now: Timestamp, config: &SchedulerConfig) -> f64 {
    let weights = config.priority;
    let forgetting = FULL_RETENTION - estimate_retention(item, now);
    weights.overdue * overdue_days(item, now) as f64
        + weights.lapses * item.lapse_count as f64
        + weights.forgetting * forgetting
}

/// The queue order: highest priority first; equal priorities go oldest
/// item first, and the id settles the rest, so the order is total.
pub fn compare(a: (&ReviewableItem, f64), b: (&ReviewableItem, f64)) -> Ordering {
    let (a, a_priority) = a;
    let (b, b_priority) = b;
    b_priority
        .total_cmp(&a_priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort `items` into queue order, pairing each with its priority.
pub fn rank(
    items: Vec<ReviewableItem>,
    now: Timestamp,
    config: &SchedulerConfig,
) -> Vec<(ReviewableItem, f64)> {
    let mut ranked: Vec<(ReviewableItem, f64)> = items
        .into_iter()
        .map(|item| {
            let p = priority(&item, now, config);
            (item, p)
        })
        .collect();
    ranked.sort_by(|(a, pa), (b, pb)| compare((a, *pa), (b, *pb)));
    ranked
}
