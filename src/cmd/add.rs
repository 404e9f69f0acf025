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

use revise_core::error::ErrorReport;
use revise_core::error::Fallible;
use revise_core::types::item::ReviewableItem;
use revise_core::types::item::SchedulingScheme;
use revise_core::types::item_id::ItemId;
use revise_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::db::Database;

pub fn add(directory: Option<String>, title: String, legacy: bool) -> Fallible<()> {
    let Collection { db, .. } = Collection::new(directory)?;
    let scheme = if legacy {
        SchedulingScheme::Legacy
    } else {
        SchedulingScheme::Adaptive
    };
    let id = add_item(&db, &title, scheme, Timestamp::now())?;
    println!("{id}");
    Ok(())
}

/// Create an item titled `title`, due immediately.
pub fn add_item(
    db: &Database,
    title: &str,
    scheme: SchedulingScheme,
    now: Timestamp,
) -> Fallible<ItemId> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ErrorReport::invalid_input("title must not be empty"));
    }
    let id = ItemId::derive(title, now);
    let item = ReviewableItem::new(id, scheme, now);
    db.add_item(title, &item)?;
    log::info!("Added {} item {id}", scheme.as_str());
    Ok(id)
}
