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

//! The SM-2 adaptive evaluator.

use crate::config::SchedulerConfig;
use crate::evaluate::Evaluation;
use crate::evaluate::SchedulingState;
use crate::types::item::ReviewableItem;
use crate::types::item::sanitize_easiness;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// Interval after the first pass, in days.
const FIRST_INTERVAL: u32 = 1;

/// Interval after the second consecutive pass, in days.
const SECOND_INTERVAL: u32 = 6;

/// Interval after a lapse, in days.
const LAPSE_INTERVAL: u32 = 1;

/// The SM-2 easiness update for a quality score `q` in 0..=5.
pub fn new_easiness(ef: f64, q: u8) -> f64 {
    let d = 5.0 - q as f64;
    sanitize_easiness(ef + (0.1 - d * (0.08 + d * 0.02)))
}

pub fn evaluate(
    state: SchedulingState,
    rating: Rating,
    now: Timestamp,
    config: &SchedulerConfig,
) -> Evaluation {
    let easiness_factor = new_easiness(sanitize_easiness(state.easiness_factor), rating.quality());
    let (interval, repetition, lapse_count) = if rating.is_failure() {
        (LAPSE_INTERVAL, 0, state.lapse_count.saturating_add(1))
    } else {
        let repetition = state.repetition.saturating_add(1);
        let interval = match repetition {
            1 => FIRST_INTERVAL,
            2 => SECOND_INTERVAL,
            _ => grow(state.interval, easiness_factor),
        };
        (interval, repetition, state.lapse_count)
    };
    let interval = interval.clamp(1, config.max_interval_days);
    let is_graduated = !rating.is_failure()
        && (repetition >= config.graduation_repetitions
            || interval >= config.graduation_interval_days);
    Evaluation {
        easiness_factor,
        interval,
        repetition,
        lapse_count,
        next_review_date: now.date().plus_days(interval as i64),
        is_graduated,
    }
}

fn grow(interval: u32, ef: f64) -> u32 {
    // `as` saturates, so an absurd product lands on u32::MAX and is then
    // clamped by the caller.
    (interval as f64 * ef).round() as u32
}

/// Whether an item fails often enough to deserve special attention. This
/// is derived on read and never stored.
pub fn is_leech(item: &ReviewableItem, config: &SchedulerConfig) -> bool {
    item.lapse_count >= config.leech_lapses
}
