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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use revise_core::config::SchedulerConfig;
use revise_core::error::Fallible;
use revise_core::retention::estimate_retention;
use revise_core::sm2::is_leech;
use revise_core::store::ItemStore;
use revise_core::types::item::ReviewableItem;
use revise_core::types::item::Status;
use revise_core::types::timestamp::Timestamp;
use serde::Serialize;

use crate::collection::Collection;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum StatsFormat {
    /// Human-readable plain text.
    Text,
    /// A JSON object.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub archived: usize,
    pub due_today: usize,
    pub leeches: usize,
    /// Mean estimated retention of the active items, in percent. `None` for
    /// a collection with no active items.
    pub mean_retention: Option<f64>,
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let Collection { db, config, .. } = Collection::new(directory)?;
    let items: Vec<ReviewableItem> = db.list_all()?.into_iter().map(|v| v.item).collect();
    let stats = compute_stats(&items, Timestamp::now(), &config);
    match format {
        StatsFormat::Text => print!("{}", render_text(&stats)),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

pub fn compute_stats(items: &[ReviewableItem], now: Timestamp, config: &SchedulerConfig) -> Stats {
    let count = |status: Status| items.iter().filter(|item| item.status == status).count();
    let active: Vec<&ReviewableItem> = items
        .iter()
        .filter(|item| item.status == Status::Active)
        .collect();
    let mean_retention = if active.is_empty() {
        None
    } else {
        let sum: f64 = active
            .iter()
            .map(|item| estimate_retention(item, now))
            .sum();
        Some(sum / active.len() as f64)
    };
    Stats {
        total: items.len(),
        active: active.len(),
        completed: count(Status::Completed),
        archived: count(Status::Archived),
        due_today: items.iter().filter(|item| item.is_due(now)).count(),
        leeches: active.iter().filter(|item| is_leech(item, config)).count(),
        mean_retention,
    }
}

fn render_text(stats: &Stats) -> String {
    let mut text = String::new();
    text.push_str(&format!("Items:      {}\n", stats.total));
    text.push_str(&format!("  active:    {}\n", stats.active));
    text.push_str(&format!("  completed: {}\n", stats.completed));
    text.push_str(&format!("  archived:  {}\n", stats.archived));
    text.push_str(&format!("Due today:  {}\n", stats.due_today));
    text.push_str(&format!("Leeches:    {}\n", stats.leeches));
    match stats.mean_retention {
        Some(retention) => text.push_str(&format!("Retention:  {retention:.1}%\n")),
        None => text.push_str("Retention:  n/a\n"),
    }
    text
}
