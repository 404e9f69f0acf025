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

use std::collections::HashMap;

use revise_core::error::Fallible;
use revise_core::lifecycle::apply_sweep;
use revise_core::lifecycle::sweep;
use revise_core::store::ItemStore;
use revise_core::types::item::ReviewableItem;
use revise_core::types::item_id::ItemId;
use revise_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::utils::short_id;

pub fn run_sweep(directory: Option<String>, dry_run: bool) -> Fallible<()> {
    let Collection { db, .. } = Collection::new(directory)?;
    let titles = db.titles()?;
    let now = Timestamp::now();
    if dry_run {
        let items: Vec<ReviewableItem> = db.list_all()?.into_iter().map(|v| v.item).collect();
        let plan = sweep(&items, now);
        if plan.is_empty() {
            println!("Nothing to sweep.");
        }
        for id in &plan.to_archive {
            println!("would archive {}", label(&titles, id));
        }
        for id in &plan.to_delete {
            println!("would delete  {}", label(&titles, id));
        }
        for (id, e) in &plan.rejected {
            println!("would skip    {}: {}", label(&titles, id), e.message());
        }
    } else {
        let report = apply_sweep(&db, now)?;
        for id in &report.archived {
            println!("archived {}", label(&titles, id));
        }
        for id in &report.deleted {
            println!("deleted  {}", label(&titles, id));
        }
        for (id, e) in &report.skipped {
            println!("skipped  {}: {}", label(&titles, id), e.message());
        }
        println!(
            "Archived {}, deleted {}, skipped {}.",
            report.archived.len(),
            report.deleted.len(),
            report.skipped.len()
        );
    }
    Ok(())
}

fn label(titles: &HashMap<ItemId, String>, id: &ItemId) -> String {
    let hex = id.to_hex();
    match titles.get(id) {
        Some(title) => format!("{} {title}", short_id(&hex)),
        None => short_id(&hex).to_string(),
    }
}
