//! Storage layer for SiSatSet.
//!
//! Provides a generic record store over `rusqlite`: every table of the
//! household organizer is a collection of JSON documents in one `records`
//! table.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Record Layout
//!
//! - `id`: UUID v4 assigned on insert
//! - `collection`: table name (e.g. `events`, `shopping_list`)
//! - `data`: JSON object with the record's fields, excluding the reserved
//!   `id`, `created_at` and `updated_at` keys
//! - `created_at` / `updated_at`: RFC 3339 UTC with millisecond precision, so
//!   lexicographic order matches chronological order
//!
//! Reserved keys are merged back into records when they are read.
//!
//! ## Natural Keys
//!
//! Tables with a natural key (schedules: `child_id` + `day_of_week`) are
//! upserted: inserting a record whose key fields match an existing one
//! replaces its data and keeps its ID.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde_json::Value;
use sisatset_core::{Filter, Record, RecordStore, Table};
use thiserror::Error;
use uuid::Uuid;

/// Fields owned by the store rather than the record.
const RESERVED_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored document is not valid JSON.
    #[error("invalid record data for {id}: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    /// The record does not exist in the given table.
    #[error("{table} record not found: {id}")]
    NotFound { table: Table, id: String },
    /// The record cannot be stored as given.
    #[error("invalid {table} record: {message}")]
    InvalidRecord { table: Table, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Number of records stored for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: String,
    pub records: usize,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection);
            CREATE INDEX IF NOT EXISTS idx_records_created ON records(created_at);
            ",
        )?;
        Ok(())
    }

    /// Lists record counts per table, ordered by table name.
    pub fn table_counts(&self) -> Result<Vec<TableCount>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT collection, COUNT(*)
            FROM records
            GROUP BY collection
            ORDER BY collection ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let records: i64 = row.get(1)?;
            Ok(TableCount {
                table: row.get(0)?,
                records: usize::try_from(records).unwrap_or_default(),
            })
        })?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    fn load(&self, table: Table) -> Result<Vec<Record>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, data, created_at, updated_at
            FROM records
            WHERE collection = ?
            ORDER BY rowid ASC
            ",
        )?;
        let rows = stmt.query_map([table.as_str()], |row| {
            Ok(StoredRow {
                id: row.get(0)?,
                data: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn find_by_natural_key(&self, table: Table, record: &Record) -> Result<Option<String>, DbError> {
        let keys = table.natural_key();
        if keys.is_empty() {
            return Ok(None);
        }
        let filters: Option<Vec<Filter>> = keys
            .iter()
            .map(|key| record.get(*key).map(|value| Filter::eq(*key, value.clone())))
            .collect();
        let Some(filters) = filters else {
            return Ok(None);
        };
        Ok(self
            .query(table, &filters)?
            .into_iter()
            .find_map(|existing| existing.get("id").and_then(Value::as_str).map(String::from)))
    }

    fn data_for(&self, table: Table, id: &str) -> Result<Record, DbError> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM records WHERE collection = ? AND id = ?",
                params![table.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        let data = data.ok_or_else(|| DbError::NotFound {
            table,
            id: id.to_string(),
        })?;
        parse_data(id, &data)
    }
}

impl RecordStore for Database {
    type Error = DbError;

    fn insert(&mut self, table: Table, record: Record) -> Result<String, DbError> {
        let record = strip_reserved(record);
        if record.is_empty() {
            return Err(DbError::InvalidRecord {
                table,
                message: "record has no fields".to_string(),
            });
        }

        let now = format_timestamp(Utc::now());
        let data = Value::Object(record.clone()).to_string();

        if let Some(id) = self.find_by_natural_key(table, &record)? {
            self.conn.execute(
                "UPDATE records SET data = ?, updated_at = ? WHERE id = ?",
                params![data, now, id],
            )?;
            tracing::debug!(%table, %id, "replaced record with matching natural key");
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "
            INSERT INTO records (id, collection, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![id, table.as_str(), data, now, now],
        )?;
        Ok(id)
    }

    fn query(&self, table: Table, filters: &[Filter]) -> Result<Vec<Record>, DbError> {
        Ok(self
            .load(table)?
            .into_iter()
            .filter(|record| filters.iter().all(|filter| filter.matches(record)))
            .collect())
    }

    fn update(&mut self, table: Table, id: &str, patch: Record) -> Result<(), DbError> {
        let mut data = self.data_for(table, id)?;
        data.extend(strip_reserved(patch));
        self.conn.execute(
            "UPDATE records SET data = ?, updated_at = ? WHERE collection = ? AND id = ?",
            params![
                Value::Object(data).to_string(),
                format_timestamp(Utc::now()),
                table.as_str(),
                id
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, table: Table, id: &str) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM records WHERE collection = ? AND id = ?",
            params![table.as_str(), id],
        )?;
        if deleted == 0 {
            return Err(DbError::NotFound {
                table,
                id: id.to_string(),
            });
        }
        if table == Table::Children {
            let removed = delete_child_records(&tx, id)?;
            tracing::debug!(child_id = id, removed, "removed records owned by child");
        }
        tx.commit()?;
        Ok(())
    }
}

/// Removes homework and schedules that belong to a deleted child.
fn delete_child_records(tx: &Transaction<'_>, child_id: &str) -> Result<usize, DbError> {
    let removed = tx.execute(
        "
        DELETE FROM records
        WHERE collection IN (?, ?)
          AND json_extract(data, '$.child_id') = ?
        ",
        params![Table::Homework.as_str(), Table::Schedules.as_str(), child_id],
    )?;
    Ok(removed)
}

struct StoredRow {
    id: String,
    data: String,
    created_at: String,
    updated_at: String,
}

impl StoredRow {
    fn into_record(self) -> Result<Record, DbError> {
        let mut record = parse_data(&self.id, &self.data)?;
        record.insert("id".to_string(), Value::String(self.id));
        record.insert("created_at".to_string(), Value::String(self.created_at));
        record.insert("updated_at".to_string(), Value::String(self.updated_at));
        Ok(record)
    }
}

fn parse_data(id: &str, data: &str) -> Result<Record, DbError> {
    serde_json::from_str(data).map_err(|source| DbError::Corrupt {
        id: id.to_string(),
        source,
    })
}

fn strip_reserved(mut record: Record) -> Record {
    for field in RESERVED_FIELDS {
        record.remove(field);
    }
    record
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(
            table_columns(&db.conn, "records"),
            vec!["id", "collection", "data", "created_at", "updated_at"]
        );
    }

    #[test]
    fn insert_then_query_returns_record_with_store_fields() {
        let mut db = Database::open_in_memory().unwrap();
        let id = db
            .insert(
                Table::Notes,
                record(json!({"user_id": "local", "content": "bayar SPP", "id": "ignored"})),
            )
            .unwrap();

        let notes = db.query(Table::Notes, &[]).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["id"], id.as_str());
        assert_eq!(notes[0]["content"], "bayar SPP");
        assert!(notes[0]["created_at"].as_str().unwrap().ends_with('Z'));
        assert!(db.query(Table::Events, &[]).unwrap().is_empty());
    }

    #[test]
    fn query_applies_filters_in_insertion_order() {
        let mut db = Database::open_in_memory().unwrap();
        for (name, category) in [("Beras", "Lainnya"), ("Ayam", "Daging & Ikan"), ("Ikan", "Daging & Ikan")] {
            db.insert(
                Table::ShoppingList,
                record(json!({"item": name, "category": category})),
            )
            .unwrap();
        }

        let meat = db
            .query(Table::ShoppingList, &[Filter::eq("category", "Daging & Ikan")])
            .unwrap();
        let names: Vec<&str> = meat.iter().map(|r| r["item"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Ayam", "Ikan"]);
    }

    #[test]
    fn schedules_upsert_on_child_and_day() {
        let mut db = Database::open_in_memory().unwrap();
        let first = db
            .insert(
                Table::Schedules,
                record(json!({"child_id": "c1", "day_of_week": "senin", "subjects": ["IPA"]})),
            )
            .unwrap();
        let second = db
            .insert(
                Table::Schedules,
                record(json!({"child_id": "c1", "day_of_week": "senin", "subjects": ["IPS"]})),
            )
            .unwrap();
        db.insert(
            Table::Schedules,
            record(json!({"child_id": "c2", "day_of_week": "senin", "subjects": ["PKN"]})),
        )
        .unwrap();

        assert_eq!(first, second);
        let schedules = db.query(Table::Schedules, &[]).unwrap();
        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[0]["subjects"], json!(["IPS"]));
    }

    #[test]
    fn budgets_upsert_per_month_and_category() {
        let mut db = Database::open_in_memory().unwrap();
        let budget = |amount: u64| {
            record(json!({
                "user_id": "local",
                "year": 2025,
                "month": 10,
                "category": "Makanan",
                "planned_amount": amount,
            }))
        };
        let first = db.insert(Table::MonthlyBudgets, budget(2_000_000)).unwrap();
        let second = db.insert(Table::MonthlyBudgets, budget(2_500_000)).unwrap();

        assert_eq!(first, second);
        let budgets = db.query(Table::MonthlyBudgets, &[]).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0]["planned_amount"], 2_500_000);
        assert_eq!(budgets[0]["id"], first.as_str());
    }

    #[test]
    fn meal_plan_roundtrips_through_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sisatset.db");
        let id = {
            let mut db = Database::open(&path).unwrap();
            db.insert(
                Table::WeeklyMealPlans,
                record(json!({
                    "user_id": "local",
                    "week_start_date": "2025-10-20",
                    "day_of_week": "senin",
                    "meal_type": "makan_siang",
                    "recipe_id": "recipe-1",
                })),
            )
            .unwrap()
        };

        let db = Database::open(&path).unwrap();
        let plans = db
            .query(Table::WeeklyMealPlans, &[Filter::eq("day_of_week", "senin")])
            .unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0]["id"], id.as_str());
        assert_eq!(plans[0]["recipe_id"], "recipe-1");
        assert!(db.query(Table::Expenses, &[]).unwrap().is_empty());
    }

    #[test]
    fn update_merges_patch() {
        let mut db = Database::open_in_memory().unwrap();
        let id = db
            .insert(
                Table::Homework,
                record(json!({"child_id": "c1", "subject": "IPA", "completed": false})),
            )
            .unwrap();

        db.update(Table::Homework, &id, record(json!({"completed": true})))
            .unwrap();

        let homework = db.query(Table::Homework, &[]).unwrap();
        assert_eq!(homework[0]["completed"], true);
        assert_eq!(homework[0]["subject"], "IPA");
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db
            .update(Table::Notes, "nope", record(json!({"done": true})))
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(err.to_string(), "notes record not found: nope");
    }

    #[test]
    fn delete_child_cascades_to_homework_and_schedules() {
        let mut db = Database::open_in_memory().unwrap();
        let child = db
            .insert(Table::Children, record(json!({"user_id": "local", "name": "Budi"})))
            .unwrap();
        db.insert(
            Table::Homework,
            record(json!({"child_id": &child, "subject": "IPA"})),
        )
        .unwrap();
        db.insert(
            Table::Schedules,
            record(json!({"child_id": &child, "day_of_week": "rabu"})),
        )
        .unwrap();
        db.insert(
            Table::Homework,
            record(json!({"child_id": "other", "subject": "IPS"})),
        )
        .unwrap();

        db.delete(Table::Children, &child).unwrap();

        assert!(db.query(Table::Children, &[]).unwrap().is_empty());
        assert!(db.query(Table::Schedules, &[]).unwrap().is_empty());
        assert_eq!(db.query(Table::Homework, &[]).unwrap().len(), 1);
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.delete(Table::Events, "missing"),
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn empty_record_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db
            .insert(Table::Notes, record(json!({"id": "only-reserved"})))
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { .. }));
    }

    #[test]
    fn table_counts_per_table() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert(Table::Notes, record(json!({"content": "a"}))).unwrap();
        db.insert(Table::Notes, record(json!({"content": "b"}))).unwrap();
        db.insert(Table::Events, record(json!({"title": "Rapat"}))).unwrap();

        let counts = db.table_counts().unwrap();
        let counts: Vec<(&str, usize)> = counts
            .iter()
            .map(|s| (s.table.as_str(), s.records))
            .collect();
        assert_eq!(counts, vec![("events", 1), ("notes", 2)]);
    }

    #[test]
    fn data_survives_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sisatset.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.insert(Table::Notes, record(json!({"content": "persist"})))
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.query(Table::Notes, &[]).unwrap()[0]["content"], "persist");
    }
}
