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
use std::fs::write;

use revise_core::error::Fallible;
use revise_core::store::ItemStore;
use revise_core::types::item::ReviewableItem;
use revise_core::types::item_id::ItemId;
use serde::Serialize;

use crate::collection::Collection;
use crate::db::Database;

/// An exported item: the stored snapshot plus its title.
#[derive(Serialize)]
struct ExportedItem<'a> {
    title: Option<&'a str>,
    #[serde(flatten)]
    item: &'a ReviewableItem,
}

pub fn export_collection(directory: Option<String>, output: Option<String>) -> Fallible<()> {
    let Collection { db, .. } = Collection::new(directory)?;
    let json = export_json(&db)?;
    match output {
        Some(path) => {
            write(&path, json)?;
            log::info!("Exported collection to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Every item in `db`, as a pretty-printed JSON array.
pub fn export_json(db: &Database) -> Fallible<String> {
    let items: Vec<ReviewableItem> = db.list_all()?.into_iter().map(|v| v.item).collect();
    let titles: HashMap<ItemId, String> = db.titles()?;
    let exported: Vec<ExportedItem> = items
        .iter()
        .map(|item| ExportedItem {
            title: titles.get(&item.id).map(String::as_str),
            item,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&exported)?)
}

#[cfg(test)]
mod tests {
    use revise_core::review::record_review;
    use revise_core::types::item::SchedulingScheme;
    use revise_core::types::rating::Rating;
    use revise_core::types::timestamp::Timestamp;
    use serde_json::Value;

    use super::*;
    use crate::cmd::add::add_item;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_export_json() -> Fallible<()> {
        let db = Database::in_memory()?;
        let created_at = ts("2024-01-01T09:00:00.000");
        let id = add_item(&db, "iterators", SchedulingScheme::Adaptive, created_at)?;
        let config = Default::default();
        record_review(&db, &id, Rating::Good, ts("2024-01-01T10:00:00.000"), 30, &config)?;

        let json: Value = serde_json::from_str(&export_json(&db)?)?;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "iterators");
        assert_eq!(items[0]["id"], id.to_hex());
        assert_eq!(items[0]["scheme"], "adaptive");
        assert_eq!(items[0]["interval"], 1);
        assert_eq!(items[0]["review_history"][0]["rating"], "good");

        // The export reads back as items.
        let back: Vec<ReviewableItem> = serde_json::from_value(json)?;
        assert_eq!(back[0], db.get(&id)?.unwrap().item);
        Ok(())
    }
}
