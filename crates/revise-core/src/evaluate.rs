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

//! The single dispatch point between the scheduling schemes.

use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::error::Fallible;
use crate::legacy;
use crate::sm2;
use crate::types::date::Date;
use crate::types::item::ReviewableItem;
use crate::types::item::SchedulingScheme;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// The numeric state an evaluator reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulingState {
    pub easiness_factor: f64,
    pub interval: u32,
    pub repetition: u32,
    pub lapse_count: u32,
}

impl From<&ReviewableItem> for SchedulingState {
    fn from(item: &ReviewableItem) -> Self {
        Self {
            easiness_factor: item.easiness_factor,
            interval: item.interval,
            repetition: item.repetition,
            lapse_count: item.lapse_count,
        }
    }
}

/// What an evaluator decides for one review.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub easiness_factor: f64,
    pub interval: u32,
    pub repetition: u32,
    pub lapse_count: u32,
    pub next_review_date: Date,
    /// The item has been learned well enough to leave the active rotation.
    /// Turning this into a status change is the lifecycle's job.
    pub is_graduated: bool,
}

/// Evaluate a review of `item` with the evaluator its scheme calls for.
pub fn evaluate(
    item: &ReviewableItem,
    rating: Rating,
    now: Timestamp,
    config: &SchedulerConfig,
) -> Fallible<Evaluation> {
    item.check_lifecycle()?;
    let state = SchedulingState::from(item);
    let evaluation = match item.scheme {
        SchedulingScheme::Adaptive => sm2::evaluate(state, rating, now, config),
        SchedulingScheme::Legacy => legacy::evaluate(state, rating, now, config),
    };
    Ok(evaluation)
}
