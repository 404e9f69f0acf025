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

//! The fixed-interval evaluator used by items created before SM-2.
//!
//! Legacy items climb a fixed table of intervals. The stage index is kept
//! in the item's `repetition` field; there is no easiness, so `hard` and
//! `good` are the same step.

use crate::config::SchedulerConfig;
use crate::evaluate::Evaluation;
use crate::evaluate::SchedulingState;
use crate::types::item::sanitize_easiness;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

pub fn evaluate(
    state: SchedulingState,
    rating: Rating,
    now: Timestamp,
    config: &SchedulerConfig,
) -> Evaluation {
    let last = config.final_legacy_stage();
    let stage = (state.repetition as usize).min(last);
    let stage = match rating {
        Rating::Again => 0,
        Rating::Hard | Rating::Good => (stage + 1).min(last),
        Rating::Easy => (stage + 2).min(last),
    };
    let interval = config.legacy_stages[stage].clamp(1, config.max_interval_days);
    let lapse_count = if rating.is_failure() {
        state.lapse_count.saturating_add(1)
    } else {
        state.lapse_count
    };
    Evaluation {
        easiness_factor: sanitize_easiness(state.easiness_factor),
        interval,
        repetition: stage as u32,
        lapse_count,
        next_review_date: now.date().plus_days(interval as i64),
        is_graduated: !rating.is_failure() && stage == last,
    }
}
