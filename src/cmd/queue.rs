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

use revise_core::error::Fallible;
use revise_core::queue::QueueEntry;
use revise_core::queue::build_queue_from_store;
use revise_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::utils::short_id;

pub fn print_queue(directory: Option<String>, limit: Option<usize>) -> Fallible<()> {
    let Collection { db, config, .. } = Collection::new(directory)?;
    let queue = build_queue_from_store(&db, Timestamp::now(), &config, limit)?;
    if queue.is_empty() {
        println!("No items due today.");
        return Ok(());
    }
    let titles = db.titles()?;
    for (idx, entry) in queue.iter().enumerate() {
        let title = titles.get(&entry.item.id).map(String::as_str);
        println!("{}", format_entry(idx + 1, entry, title));
    }
    Ok(())
}

fn format_entry(position: usize, entry: &QueueEntry, title: Option<&str>) -> String {
    let hex = entry.item.id.to_hex();
    let mut line = format!(
        "{position:>3}. {}  {:<32}  priority {:>7.1}  retention {:>5.1}%",
        short_id(&hex),
        title.unwrap_or("(untitled)"),
        entry.priority,
        entry.retention,
    );
    if entry.item.is_new() {
        line.push_str("  [new]");
    }
    if entry.is_leech {
        line.push_str("  [leech]");
    }
    line
}

#[cfg(test)]
mod tests {
    use revise_core::types::item::ReviewableItem;
    use revise_core::types::item::SchedulingScheme;
    use revise_core::types::item_id::ItemId;

    use super::*;

    #[test]
    fn test_format_entry() {
        let created_at = Timestamp::try_from("2024-01-01T09:00:00.000".to_string()).unwrap();
        let id = ItemId::derive("lifetimes", created_at);
        let entry = QueueEntry {
            item: ReviewableItem::new(id, SchedulingScheme::Adaptive, created_at),
            priority: 42.0,
            retention: 36.8,
            is_leech: true,
        };
        let line = format_entry(3, &entry, Some("lifetimes"));
        assert!(line.starts_with(&format!("  3. {}", &id.to_hex()[..12])));
        assert!(line.contains("lifetimes"));
        assert!(line.contains("priority    42.0"));
        assert!(line.contains("retention  36.8%"));
        assert!(line.ends_with("[leech]"));
        assert!(line.contains("[new]"));

        let mut item = entry.item.clone();
        item.last_reviewed_at = Some(created_at);
        let entry = QueueEntry {
            item,
            is_leech: false,
            ..entry
        };
        let line = format_entry(1, &entry, None);
        assert!(line.contains("(untitled)"));
        assert!(!line.contains("[new]"));
        assert!(!line.contains("[leech]"));
    }
}
