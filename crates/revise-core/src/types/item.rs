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

use serde::Deserialize;
use serde::Serialize;

use crate::config::DEFAULT_EASINESS;
use crate::config::MIN_EASINESS;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::date::Date;
use crate::types::item_id::ItemId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// Where an item is in its lifecycle. Deletion is not a status: a deleted
/// item is simply gone from the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Completed,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Completed => "completed",
            Status::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Fallible<Status> {
        match s {
            "active" => Ok(Status::Active),
            "completed" => Ok(Status::Completed),
            "archived" => Ok(Status::Archived),
            _ => Err(ErrorReport::invalid_input(format!("invalid status: '{s}'"))),
        }
    }
}

/// Which evaluator schedules an item. Fixed when the item is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingScheme {
    /// The fixed 1-4-7-30-90 stage table, for items that predate SM-2.
    Legacy,
    /// SM-2.
    Adaptive,
}

impl SchedulingScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingScheme::Legacy => "legacy",
            SchedulingScheme::Adaptive => "adaptive",
        }
    }

    pub fn parse(s: &str) -> Fallible<SchedulingScheme> {
        match s {
            "legacy" => Ok(SchedulingScheme::Legacy),
            "adaptive" => Ok(SchedulingScheme::Adaptive),
            _ => Err(ErrorReport::invalid_input(format!(
                "invalid scheduling scheme: '{s}'"
            ))),
        }
    }
}

/// One line of an item's review log. Entries are only ever appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewLogEntry {
    pub reviewed_at: Timestamp,
    pub rating: Rating,
    pub time_spent_seconds: u32,
    pub interval_after: u32,
    pub easiness_after: f64,
}

/// A snapshot of everything the engine knows about one item.
///
/// The engine never mutates a snapshot it was given; every operation
/// returns a fresh one for the store to persist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRecord")]
pub struct ReviewableItem {
    pub id: ItemId,
    pub scheme: SchedulingScheme,
    pub created_at: Timestamp,
    /// SM-2 easiness factor, at least [`MIN_EASINESS`].
    pub easiness_factor: f64,
    /// Days until the next review. Zero only before the first review.
    pub interval: u32,
    /// Consecutive passes since the last lapse. For legacy items, the
    /// index into the stage table.
    pub repetition: u32,
    /// Lifetime count of failed reviews. Never decreases.
    pub lapse_count: u32,
    pub status: Status,
    pub next_review_date: Date,
    pub last_reviewed_at: Option<Timestamp>,
    pub completed_at: Option<Date>,
    pub archive_at: Option<Date>,
    pub delete_at: Option<Date>,
    pub review_history: Vec<ReviewLogEntry>,
}

impl ReviewableItem {
    /// A freshly created item, due on the day it was created.
    pub fn new(id: ItemId, scheme: SchedulingScheme, created_at: Timestamp) -> Self {
        Self {
            id,
            scheme,
            created_at,
            easiness_factor: DEFAULT_EASINESS,
            interval: 0,
            repetition: 0,
            lapse_count: 0,
            status: Status::Active,
            next_review_date: created_at.date(),
            last_reviewed_at: None,
            completed_at: None,
            archive_at: None,
            delete_at: None,
            review_history: Vec::new(),
        }
    }

    /// Whether the item has never been reviewed.
    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }

    /// Whether the item belongs in the review queue at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.status == Status::Active && self.next_review_date <= now.date()
    }

    /// Check that the lifecycle dates agree with the status.
    ///
    /// Active items carry no lifecycle dates; completed and archived items
    /// carry all three, in order. Anything else means a caller wrote the
    /// item without going through the lifecycle transitioner.
    pub fn check_lifecycle(&self) -> Fallible<()> {
        let dates = [self.completed_at, self.archive_at, self.delete_at];
        match self.status {
            Status::Active => {
                if dates.iter().any(Option::is_some) {
                    return Err(ErrorReport::precondition(format!(
                        "item {} is active but has lifecycle dates set",
                        self.id
                    )));
                }
            }
            Status::Completed | Status::Archived => match dates {
                [Some(completed_at), Some(archive_at), Some(delete_at)] => {
                    if !(completed_at <= archive_at && archive_at <= delete_at) {
                        return Err(ErrorReport::precondition(format!(
                            "item {} has lifecycle dates out of order",
                            self.id
                        )));
                    }
                }
                _ => {
                    return Err(ErrorReport::precondition(format!(
                        "item {} is {} but is missing lifecycle dates",
                        self.id,
                        self.status.as_str()
                    )));
                }
            },
        }
        Ok(())
    }
}

/// Clamp an easiness factor into its valid range. Non-finite values, which
/// can only come from corrupt input, collapse to the lower bound.
pub fn sanitize_easiness(ef: f64) -> f64 {
    if ef.is_finite() {
        ef.max(MIN_EASINESS)
    } else {
        MIN_EASINESS
    }
}

/// The permissive on-disk shape of an item.
///
/// Records written before the adaptive scheduler existed lack the SM-2
/// fields (or hold nulls); they also lack a scheme, and are therefore
/// legacy items.
#[derive(Deserialize)]
struct ItemRecord {
    id: ItemId,
    #[serde(default)]
    scheme: Option<SchedulingScheme>,
    created_at: Timestamp,
    #[serde(default)]
    easiness_factor: Option<f64>,
    #[serde(default)]
    interval: Option<i64>,
    #[serde(default)]
    repetition: Option<i64>,
    #[serde(default)]
    lapse_count: Option<i64>,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    next_review_date: Option<Date>,
    #[serde(default)]
    last_reviewed_at: Option<Timestamp>,
    #[serde(default)]
    completed_at: Option<Date>,
    #[serde(default)]
    archive_at: Option<Date>,
    #[serde(default)]
    delete_at: Option<Date>,
    #[serde(default)]
    review_history: Vec<ReviewLogEntry>,
}

fn non_negative(n: Option<i64>) -> u32 {
    n.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

impl From<ItemRecord> for ReviewableItem {
    fn from(record: ItemRecord) -> Self {
        ReviewableItem {
            id: record.id,
            scheme: record.scheme.unwrap_or(SchedulingScheme::Legacy),
            created_at: record.created_at,
            easiness_factor: sanitize_easiness(record.easiness_factor.unwrap_or(DEFAULT_EASINESS)),
            interval: non_negative(record.interval),
            repetition: non_negative(record.repetition),
            lapse_count: non_negative(record.lapse_count),
            status: record.status.unwrap_or(Status::Active),
            next_review_date: record
                .next_review_date
                .unwrap_or_else(|| record.created_at.date()),
            last_reviewed_at: record.last_reviewed_at,
            completed_at: record.completed_at,
            archive_at: record.archive_at,
            delete_at: record.delete_at,
            review_history: record.review_history,
        }
    }
}
