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

use revise_core::config::SchedulerConfig;
use revise_core::error::Fallible;
use revise_core::review::record_review;
use revise_core::sm2::is_leech;
use revise_core::types::item::ReviewableItem;
use revise_core::types::item::Status;
use revise_core::types::rating::Rating;
use revise_core::types::timestamp::Timestamp;

use crate::collection::Collection;

pub fn review(
    directory: Option<String>,
    id: String,
    rating: String,
    time_spent: u32,
) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let item = review_item(&collection, &id, &rating, time_spent, Timestamp::now())?;
    println!("{}", describe(&item, &collection.config));
    Ok(())
}

/// Parse a rating given either by name or by its 1-4 button number.
pub fn parse_rating(s: &str) -> Fallible<Rating> {
    match s.parse::<u8>() {
        Ok(n) => Rating::from_number(n),
        Err(_) => Rating::try_from(s.to_ascii_lowercase()),
    }
}

pub fn review_item(
    collection: &Collection,
    id_prefix: &str,
    rating: &str,
    time_spent: u32,
    now: Timestamp,
) -> Fallible<ReviewableItem> {
    let rating = parse_rating(rating)?;
    let id = collection.db.resolve_id(id_prefix)?;
    record_review(
        &collection.db,
        &id,
        rating,
        now,
        time_spent,
        &collection.config,
    )
}

fn describe(item: &ReviewableItem, config: &SchedulerConfig) -> String {
    let mut text = match (item.status, item.archive_at) {
        (Status::Completed, Some(archive_at)) => format!(
            "Graduated! The item will be archived on {archive_at} unless you review it again."
        ),
        _ => format!(
            "Next review on {} (in {} days).",
            item.next_review_date, item.interval
        ),
    };
    if is_leech(item, config) {
        text.push_str(&format!(
            "\nThis item has lapsed {} times. Consider rewording it.",
            item.lapse_count
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use revise_core::error::ErrorKind;
    use revise_core::store::ItemStore;
    use revise_core::types::item::SchedulingScheme;

    use super::*;
    use crate::cmd::add::add_item;
    use crate::helper::create_tmp_directory;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_parse_rating() -> Fallible<()> {
        assert_eq!(parse_rating("good")?, Rating::Good);
        assert_eq!(parse_rating("EASY")?, Rating::Easy);
        assert_eq!(parse_rating("1")?, Rating::Again);
        assert_eq!(parse_rating("0").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(parse_rating("great").unwrap_err().kind(), ErrorKind::InvalidInput);
        Ok(())
    }

    #[test]
    fn test_review_item_by_prefix() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let collection = Collection::new(Some(dir.display().to_string()))?;
        let now = ts("2024-01-01T09:00:00.000");
        let id = add_item(&collection.db, "enums", SchedulingScheme::Adaptive, now)?;
        let prefix = &id.to_hex()[..10];
        let item = review_item(&collection, prefix, "good", 15, ts("2024-01-01T09:05:00.000"))?;
        assert_eq!(item.interval, 1);
        assert_eq!(collection.db.get(&id)?.unwrap().item, item);
        Ok(())
    }

    #[test]
    fn test_invalid_rating_leaves_item_untouched() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let collection = Collection::new(Some(dir.display().to_string()))?;
        let now = ts("2024-01-01T09:00:00.000");
        let id = add_item(&collection.db, "enums", SchedulingScheme::Adaptive, now)?;
        let err = review_item(&collection, &id.to_hex(), "meh", 15, now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(collection.db.get(&id)?.unwrap().version, 1);
        Ok(())
    }

    #[test]
    fn test_describe() {
        let config = SchedulerConfig::default();
        let created_at = ts("2024-01-01T09:00:00.000");
        let mut item = ReviewableItem::new(
            revise_core::types::item_id::ItemId::derive("enums", created_at),
            SchedulingScheme::Adaptive,
            created_at,
        );
        item.interval = 6;
        item.next_review_date = created_at.date().plus_days(6);
        assert_eq!(describe(&item, &config), "Next review on 2024-01-07 (in 6 days).");
        item.lapse_count = 5;
        assert!(describe(&item, &config).contains("lapsed 5 times"));
    }
}
