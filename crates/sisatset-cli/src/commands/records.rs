//! Generic record commands: list, update and delete.

use std::collections::HashSet;
use std::io::Write;

use anyhow::{Context, Result};
use serde_json::Value;
use sisatset_core::{Filter, HouseholdId, Record, RecordStore, Scope, Table, known_children};

use crate::refresh::{Change, ChangeFeed};

/// Renders a field the way it is typed on the command line.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw))
}

const fn touches_schedules(table: Table) -> bool {
    matches!(table, Table::Schedules | Table::Children)
}

/// Loads the household's records, restricted to its own children for
/// child-owned tables.
fn household_records<S: RecordStore>(
    store: &S,
    owner: &HouseholdId,
    table: Table,
) -> Result<Vec<Record>> {
    let filters = match table.scope() {
        Scope::Household => vec![Filter::eq("user_id", owner.as_str())],
        Scope::Shared | Scope::Child => Vec::new(),
    };
    let records = store
        .query(table, &filters)
        .with_context(|| format!("failed to load {table}"))?;
    if table.scope() != Scope::Child {
        return Ok(records);
    }

    let children: HashSet<String> = known_children(store, owner)
        .context("failed to load children")?
        .into_iter()
        .map(|child| child.id)
        .collect();
    Ok(records
        .into_iter()
        .filter(|record| {
            record
                .get("child_id")
                .and_then(Value::as_str)
                .is_some_and(|id| children.contains(id))
        })
        .collect())
}

pub fn list<W, S>(
    writer: &mut W,
    store: &S,
    owner: &HouseholdId,
    table: Table,
    filters: &[(String, String)],
) -> Result<()>
where
    W: Write,
    S: RecordStore,
{
    let records = household_records(store, owner, table)?;
    let mut shown = 0;
    for record in &records {
        let keep = filters.iter().all(|(field, wanted)| {
            record
                .get(field)
                .is_some_and(|value| field_text(value) == *wanted)
        });
        if keep {
            writeln!(writer, "{}", serde_json::to_string(record)?)?;
            shown += 1;
        }
    }
    tracing::debug!(%table, total = records.len(), shown, "listed records");
    Ok(())
}

pub fn update<W, S>(
    writer: &mut W,
    store: &mut S,
    table: Table,
    id: &str,
    fields: &[(String, String)],
    feed: &ChangeFeed,
) -> Result<()>
where
    W: Write,
    S: RecordStore,
{
    let patch: Record = fields
        .iter()
        .map(|(field, raw)| (field.clone(), parse_value(raw)))
        .collect();
    store
        .update(table, id, patch)
        .with_context(|| format!("failed to update {table} {id}"))?;
    if touches_schedules(table) {
        feed.publish(Change::ScheduleUpdated);
    }

    writeln!(writer, "Berhasil memperbarui {} {id}", table.noun())?;
    Ok(())
}

pub fn delete<W, S>(
    writer: &mut W,
    store: &mut S,
    table: Table,
    id: &str,
    feed: &ChangeFeed,
) -> Result<()>
where
    W: Write,
    S: RecordStore,
{
    store
        .delete(table, id)
        .with_context(|| format!("failed to delete {table} {id}"))?;
    if touches_schedules(table) {
        feed.publish(Change::ScheduleUpdated);
    }

    writeln!(writer, "Berhasil menghapus {} {id}", table.noun())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use sisatset_db::Database;

    fn owner() -> HouseholdId {
        HouseholdId::new("local").unwrap()
    }

    fn insert(db: &mut Database, table: Table, value: Value) -> String {
        let Value::Object(record) = value else {
            unreachable!()
        };
        db.insert(table, record).unwrap()
    }

    fn listed(db: &Database, table: Table, filters: &[(String, String)]) -> Vec<Value> {
        let mut output = Vec::new();
        list(&mut output, db, &owner(), table, filters).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn parse_value_prefers_json() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("12000"), json!(12000));
        assert_eq!(parse_value("2 kg"), json!("2 kg"));
        assert_eq!(parse_value(r#""007""#), json!("007"));
    }

    #[test]
    fn list_filters_by_field_text() {
        let mut db = Database::open_in_memory().unwrap();
        insert(
            &mut db,
            Table::ShoppingList,
            json!({"user_id": "local", "item": "Beras", "checked": false}),
        );
        insert(
            &mut db,
            Table::ShoppingList,
            json!({"user_id": "local", "item": "Gula", "checked": true}),
        );

        let unchecked = listed(
            &db,
            Table::ShoppingList,
            &[("checked".to_string(), "false".to_string())],
        );
        assert_eq!(unchecked.len(), 1);
        assert_eq!(unchecked[0]["item"], "Beras");
    }

    #[test]
    fn list_only_shows_own_household() {
        let mut db = Database::open_in_memory().unwrap();
        insert(&mut db, Table::Notes, json!({"user_id": "local", "content": "bayar listrik"}));
        insert(&mut db, Table::Notes, json!({"user_id": "lain", "content": "rahasia"}));
        let own_child = insert(&mut db, Table::Children, json!({"user_id": "local", "name": "Budi"}));
        let other_child = insert(&mut db, Table::Children, json!({"user_id": "lain", "name": "Rina"}));
        insert(&mut db, Table::Homework, json!({"child_id": own_child, "subject": "IPA"}));
        insert(&mut db, Table::Homework, json!({"child_id": other_child, "subject": "IPS"}));

        let notes = listed(&db, Table::Notes, &[]);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["content"], "bayar listrik");

        let homework = listed(&db, Table::Homework, &[]);
        assert_eq!(homework.len(), 1);
        assert_eq!(homework[0]["subject"], "IPA");
    }

    #[test]
    fn list_reaches_finance_and_meal_planner_tables() {
        let mut db = Database::open_in_memory().unwrap();
        insert(
            &mut db,
            Table::Expenses,
            json!({"user_id": "local", "category": "Makanan", "amount": 45000}),
        );
        insert(&mut db, Table::Recipes, json!({"name": "Sop Ayam"}));

        let expenses = listed(&db, Table::Expenses, &[("amount".to_string(), "45000".to_string())]);
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0]["category"], "Makanan");

        let recipes = listed(&db, Table::Recipes, &[]);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0]["name"], "Sop Ayam");
    }

    #[test]
    fn update_parses_values() {
        let mut db = Database::open_in_memory().unwrap();
        let id = insert(
            &mut db,
            Table::ShoppingList,
            json!({"user_id": "local", "item": "Beras", "checked": false}),
        );

        let mut output = Vec::new();
        update(
            &mut output,
            &mut db,
            Table::ShoppingList,
            &id,
            &[
                ("checked".to_string(), "true".to_string()),
                ("quantity".to_string(), "5 kg".to_string()),
            ],
            &ChangeFeed::new(),
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            format!("Berhasil memperbarui item {id}\n")
        );
        let stored = db.query(Table::ShoppingList, &[]).unwrap();
        assert_eq!(stored[0]["checked"], true);
        assert_eq!(stored[0]["quantity"], "5 kg");
    }

    #[test]
    fn delete_missing_record_fails() {
        let mut db = Database::open_in_memory().unwrap();
        let err = delete(
            &mut std::io::sink(),
            &mut db,
            Table::Events,
            "missing",
            &ChangeFeed::new(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "failed to delete events missing");
    }
}
