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
use std::path::Path;

use revise_core::config::DEFAULT_EASINESS;
use revise_core::error::ErrorReport;
use revise_core::error::Fallible;
use revise_core::store::ItemStore;
use revise_core::store::Version;
use revise_core::store::Versioned;
use revise_core::store::check_version;
use revise_core::store::not_found;
use revise_core::types::date::Date;
use revise_core::types::item::ReviewLogEntry;
use revise_core::types::item::ReviewableItem;
use revise_core::types::item::SchedulingScheme;
use revise_core::types::item::Status;
use revise_core::types::item::sanitize_easiness;
use revise_core::types::item_id::ItemId;
use revise_core::types::rating::Rating;
use revise_core::types::timestamp::Timestamp;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

/// The adaptive columns are nullable: rows imported from the legacy
/// tracker have no SM-2 state.
const SCHEMA: &str = "
    create table if not exists items (
        id text primary key,
        title text,
        scheme text not null,
        created_at text not null,
        easiness_factor real,
        interval integer,
        repetition integer,
        lapse_count integer,
        status text not null,
        next_review_date text not null,
        last_reviewed_at text,
        completed_at text,
        archive_at text,
        delete_at text,
        version integer not null
    ) strict;

    create table if not exists reviews (
        item_id text not null references items (id) on delete cascade,
        seq integer not null,
        reviewed_at text not null,
        rating text not null,
        time_spent_seconds integer not null,
        interval_after integer not null,
        easiness_after real not null,
        primary key (item_id, seq)
    ) strict;

    create index if not exists items_due on items (status, next_review_date);
";

const ITEM_COLUMNS: &str = "id, scheme, created_at, easiness_factor, interval, repetition, \
     lapse_count, status, next_review_date, last_reviewed_at, completed_at, archive_at, \
     delete_at, version";

pub struct Database {
    conn: Connection,
}

/// Map a SQLite error into an error report.
pub fn sql(e: rusqlite::Error) -> ErrorReport {
    ErrorReport::new(format!("Database error: {e}"))
}

/// An `items` row, as read from SQLite, before validation.
struct ItemRow {
    id: String,
    scheme: String,
    created_at: String,
    easiness_factor: Option<f64>,
    interval: Option<i64>,
    repetition: Option<i64>,
    lapse_count: Option<i64>,
    status: String,
    next_review_date: String,
    last_reviewed_at: Option<String>,
    completed_at: Option<String>,
    archive_at: Option<String>,
    delete_at: Option<String>,
    version: i64,
}

struct ReviewRow {
    reviewed_at: String,
    rating: String,
    time_spent_seconds: u32,
    interval_after: u32,
    easiness_after: f64,
}

fn read_item_row(row: &rusqlite::Row) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: row.get(0)?,
        scheme: row.get(1)?,
        created_at: row.get(2)?,
        easiness_factor: row.get(3)?,
        interval: row.get(4)?,
        repetition: row.get(5)?,
        lapse_count: row.get(6)?,
        status: row.get(7)?,
        next_review_date: row.get(8)?,
        last_reviewed_at: row.get(9)?,
        completed_at: row.get(10)?,
        archive_at: row.get(11)?,
        delete_at: row.get(12)?,
        version: row.get(13)?,
    })
}

fn count(n: Option<i64>) -> u32 {
    n.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

fn date(s: Option<String>) -> Fallible<Option<Date>> {
    s.map(Date::try_from).transpose()
}

impl Database {
    pub fn new(path: &Path) -> Fallible<Self> {
        let conn = Connection::open(path).map_err(sql)?;
        Self::setup(conn)
    }

    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory().map_err(sql)?;
        Self::setup(conn)
    }

    fn setup(conn: Connection) -> Fallible<Self> {
        conn.pragma_update(None, "foreign_keys", "on").map_err(sql)?;
        conn.execute_batch(SCHEMA).map_err(sql)?;
        Ok(Self { conn })
    }

    /// Insert a new item with a human-readable title.
    pub fn add_item(&self, title: &str, item: &ReviewableItem) -> Fallible<Version> {
        self.insert_row(item, Some(title))
    }

    /// Insert the item row and its history in one transaction.
    fn insert_row(&self, item: &ReviewableItem, title: Option<&str>) -> Fallible<Version> {
        if self.stored_version(&item.id)?.is_some() {
            return Err(ErrorReport::invalid_input(format!(
                "item {} already exists",
                item.id
            )));
        }
        let tx = self.conn.unchecked_transaction().map_err(sql)?;
        self.conn
            .execute(
                &format!(
                    "insert into items ({ITEM_COLUMNS}, title)
                     values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 1, ?14)"
                ),
                params![
                    item.id.to_hex(),
                    item.scheme.as_str(),
                    item.created_at.to_string(),
                    item.easiness_factor,
                    item.interval,
                    item.repetition,
                    item.lapse_count,
                    item.status.as_str(),
                    item.next_review_date.to_string(),
                    item.last_reviewed_at.map(String::from),
                    item.completed_at.map(String::from),
                    item.archive_at.map(String::from),
                    item.delete_at.map(String::from),
                    title,
                ],
            )
            .map_err(sql)?;
        self.append_reviews(item, 0)?;
        tx.commit().map_err(sql)?;
        Ok(1)
    }

    /// Titles of all items that have one.
    pub fn titles(&self) -> Fallible<HashMap<ItemId, String>> {
        let mut stmt = self
            .conn
            .prepare("select id, title from items where title is not null")
            .map_err(sql)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(sql)?;
        let mut titles = HashMap::new();
        for row in rows {
            let (id, title) = row.map_err(sql)?;
            titles.insert(ItemId::from_hex(&id)?, title);
        }
        Ok(titles)
    }

    /// Find the single item whose id starts with `prefix`.
    pub fn resolve_id(&self, prefix: &str) -> Fallible<ItemId> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ErrorReport::invalid_input(format!(
                "invalid item id: '{prefix}'"
            )));
        }
        let mut stmt = self
            .conn
            .prepare("select id from items where substr(id, 1, ?1) = ?2 limit 2")
            .map_err(sql)?;
        let ids: Vec<String> = stmt
            .query_map(params![prefix.len() as i64, prefix], |row| row.get(0))
            .map_err(sql)?
            .collect::<Result<_, _>>()
            .map_err(sql)?;
        match ids.as_slice() {
            [id] => ItemId::from_hex(id),
            [] => Err(ErrorReport::not_found(format!(
                "no item with id starting with '{prefix}'"
            ))),
            _ => Err(ErrorReport::invalid_input(format!(
                "item id prefix '{prefix}' is ambiguous"
            ))),
        }
    }

    fn query_items(
        &self,
        sql_text: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Fallible<Vec<Versioned>> {
        let mut stmt = self.conn.prepare(sql_text).map_err(sql)?;
        let rows: Vec<ItemRow> = stmt
            .query_map(args, read_item_row)
            .map_err(sql)?
            .collect::<Result<_, _>>()
            .map_err(sql)?;
        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    /// Turn a raw row into an item, applying the fallbacks for legacy rows.
    fn hydrate(&self, row: ItemRow) -> Fallible<Versioned> {
        let id = ItemId::from_hex(&row.id)?;
        let item = ReviewableItem {
            id,
            scheme: SchedulingScheme::parse(&row.scheme)?,
            created_at: Timestamp::try_from(row.created_at)?,
            easiness_factor: sanitize_easiness(row.easiness_factor.unwrap_or(DEFAULT_EASINESS)),
            interval: count(row.interval),
            repetition: count(row.repetition),
            lapse_count: count(row.lapse_count),
            status: Status::parse(&row.status)?,
            next_review_date: Date::try_from(row.next_review_date)?,
            last_reviewed_at: row.last_reviewed_at.map(Timestamp::try_from).transpose()?,
            completed_at: date(row.completed_at)?,
            archive_at: date(row.archive_at)?,
            delete_at: date(row.delete_at)?,
            review_history: self.history(&id)?,
        };
        Ok(Versioned {
            item,
            version: row.version as Version,
        })
    }

    fn history(&self, id: &ItemId) -> Fallible<Vec<ReviewLogEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "select reviewed_at, rating, time_spent_seconds, interval_after, easiness_after
                 from reviews where item_id = ?1 order by seq",
            )
            .map_err(sql)?;
        let rows: Vec<ReviewRow> = stmt
            .query_map(params![id.to_hex()], |row| {
                Ok(ReviewRow {
                    reviewed_at: row.get(0)?,
                    rating: row.get(1)?,
                    time_spent_seconds: row.get(2)?,
                    interval_after: row.get(3)?,
                    easiness_after: row.get(4)?,
                })
            })
            .map_err(sql)?
            .collect::<Result<_, _>>()
            .map_err(sql)?;
        rows.into_iter()
            .map(|row| {
                Ok(ReviewLogEntry {
                    reviewed_at: Timestamp::try_from(row.reviewed_at)?,
                    rating: Rating::try_from(row.rating)?,
                    time_spent_seconds: row.time_spent_seconds,
                    interval_after: row.interval_after,
                    easiness_after: row.easiness_after,
                })
            })
            .collect()
    }

    fn stored_version(&self, id: &ItemId) -> Fallible<Option<Version>> {
        let version: Option<i64> = self
            .conn
            .query_row(
                "select version from items where id = ?1",
                params![id.to_hex()],
                |row| row.get(0),
            )
            .optional()
            .map_err(sql)?;
        Ok(version.map(|v| v as Version))
    }

    fn append_reviews(&self, item: &ReviewableItem, from: usize) -> Fallible<()> {
        for (seq, entry) in item.review_history.iter().enumerate().skip(from) {
            self.conn
                .execute(
                    "insert into reviews
                     (item_id, seq, reviewed_at, rating, time_spent_seconds,
                      interval_after, easiness_after)
                     values (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        item.id.to_hex(),
                        seq as i64,
                        entry.reviewed_at.to_string(),
                        entry.rating.as_str(),
                        entry.time_spent_seconds,
                        entry.interval_after,
                        entry.easiness_after,
                    ],
                )
                .map_err(sql)?;
        }
        Ok(())
    }
}

impl ItemStore for Database {
    fn insert(&self, item: &ReviewableItem) -> Fallible<Version> {
        self.insert_row(item, None)
    }

    fn get(&self, id: &ItemId) -> Fallible<Option<Versioned>> {
        let mut items = self.query_items(
            &format!("select {ITEM_COLUMNS} from items where id = ?1"),
            &[&id.to_hex()],
        )?;
        Ok(items.pop())
    }

    fn list_all(&self) -> Fallible<Vec<Versioned>> {
        self.query_items(
            &format!("select {ITEM_COLUMNS} from items order by created_at, id"),
            &[],
        )
    }

    fn list_due(&self, today: Date) -> Fallible<Vec<Versioned>> {
        self.query_items(
            &format!(
                "select {ITEM_COLUMNS} from items
                 where status = 'active' and next_review_date <= ?1
                 order by created_at, id"
            ),
            &[&today.to_string()],
        )
    }

    fn update(&self, item: &ReviewableItem, expected: Version) -> Fallible<Version> {
        let tx = self.conn.unchecked_transaction().map_err(sql)?;
        let found = self.stored_version(&item.id)?.ok_or_else(|| not_found(&item.id))?;
        check_version(&item.id, found, expected)?;
        let stored_history = self.history(&item.id)?;
        if !item.review_history.starts_with(&stored_history) {
            return Err(ErrorReport::precondition(format!(
                "update of item {} rewrites its review history",
                item.id
            )));
        }
        let changed = self
            .conn
            .execute(
                "update items set
                    easiness_factor = ?1, interval = ?2, repetition = ?3, lapse_count = ?4,
                    status = ?5, next_review_date = ?6, last_reviewed_at = ?7,
                    completed_at = ?8, archive_at = ?9, delete_at = ?10,
                    version = version + 1
                 where id = ?11 and version = ?12",
                params![
                    item.easiness_factor,
                    item.interval,
                    item.repetition,
                    item.lapse_count,
                    item.status.as_str(),
                    item.next_review_date.to_string(),
                    item.last_reviewed_at.map(String::from),
                    item.completed_at.map(String::from),
                    item.archive_at.map(String::from),
                    item.delete_at.map(String::from),
                    item.id.to_hex(),
                    expected as i64,
                ],
            )
            .map_err(sql)?;
        if changed == 0 {
            return Err(ErrorReport::conflict(format!(
                "item {} changed while it was being written",
                item.id
            )));
        }
        self.append_reviews(item, stored_history.len())?;
        tx.commit().map_err(sql)?;
        Ok(expected + 1)
    }

    fn remove(&self, id: &ItemId, expected: Version) -> Fallible<()> {
        let tx = self.conn.unchecked_transaction().map_err(sql)?;
        let found = self.stored_version(id)?.ok_or_else(|| not_found(id))?;
        check_version(id, found, expected)?;
        self.conn
            .execute("delete from reviews where item_id = ?1", params![id.to_hex()])
            .map_err(sql)?;
        self.conn
            .execute("delete from items where id = ?1", params![id.to_hex()])
            .map_err(sql)?;
        tx.commit().map_err(sql)?;
        Ok(())
    }
}
