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

//! revise-core: the review scheduling engine behind revise.
//!
//! Everything here is a pure computation over an item snapshot, the
//! current time and a rating:
//! - SM-2 and legacy fixed-interval evaluators, behind one dispatch point
//! - the active/completed/archived lifecycle and the periodic sweep
//! - retention estimates and the priority order of the review queue
//!
//! Persistence is delegated to an [`ItemStore`].

pub mod config;
pub mod error;
pub mod evaluate;
pub mod legacy;
pub mod lifecycle;
pub mod priority;
pub mod queue;
pub mod retention;
pub mod review;
pub mod sm2;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::SchedulerConfig;
pub use error::{ErrorKind, ErrorReport, Fallible, fail};
pub use evaluate::{Evaluation, evaluate};
pub use lifecycle::{SweepPlan, SweepReport, apply_sweep, sweep};
pub use queue::{QueueEntry, build_queue, build_queue_from_store};
pub use retention::estimate_retention;
pub use review::{record_review, review};
pub use sm2::is_leech;
pub use store::{ItemStore, MemoryStore, Version, Versioned};
pub use types::date::Date;
pub use types::item::{ReviewLogEntry, ReviewableItem, SchedulingScheme, Status};
pub use types::item_id::ItemId;
pub use types::rating::Rating;
pub use types::timestamp::Timestamp;
