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

//! Estimated probability of recall.
//!
//! Memory is modelled as exponential decay whose time constant is the
//! item's interval stretched by a stability factor:
//!
//! ```text
//! retention = 100 * exp(-elapsed / (interval * stability))
//! stability = easiness / 2.5
//! ```
//!
//! So an item with default easiness is at 1/e (about 37%) exactly one
//! interval after its last review, and easier items decay more slowly.

use crate::config::DEFAULT_EASINESS;
use crate::types::item::ReviewableItem;
use crate::types::item::sanitize_easiness;
use crate::types::timestamp::Timestamp;

/// Retention of an item that has never been reviewed, or was reviewed just
/// now.
pub const FULL_RETENTION: f64 = 100.0;

/// Stability multiplier for an easiness factor. Linear, and 1.0 at the
/// default easiness.
pub fn stability_factor(easiness_factor: f64) -> f64 {
    sanitize_easiness(easiness_factor) / DEFAULT_EASINESS
}

/// Estimated retention of `item` at `now`, as a percentage in `[0, 100]`.
pub fn estimate_retention(item: &ReviewableItem, now: Timestamp) -> f64 {
    let Some(last_reviewed_at) = item.last_reviewed_at else {
        return FULL_RETENTION;
    };
    let elapsed = now.days_since(last_reviewed_at).max(0.0);
    // A reviewed item always has an interval of at least one day; guard
    // anyway so a corrupt zero cannot divide by zero.
    let interval = item.interval.max(1) as f64;
    let tau = interval * stability_factor(item.easiness_factor);
    (FULL_RETENTION * (-elapsed / tau).exp()).clamp(0.0, FULL_RETENTION)
}
