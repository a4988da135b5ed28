//! Children commands: the names quick input recognizes.

use std::io::Write;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use sisatset_core::{Filter, HouseholdId, Record, RecordStore, Table};

use crate::refresh::{Change, ChangeFeed};

pub fn add<W, S>(
    writer: &mut W,
    store: &mut S,
    owner: &HouseholdId,
    name: &str,
    grade: &str,
    color: &str,
    feed: &ChangeFeed,
) -> Result<()>
where
    W: Write,
    S: RecordStore,
{
    let name = name.trim();
    if name.is_empty() {
        bail!("child name cannot be empty");
    }

    let mut record = Record::new();
    record.insert("user_id".to_string(), Value::from(owner.as_str()));
    record.insert("name".to_string(), Value::from(name));
    record.insert("grade".to_string(), Value::from(grade.trim()));
    record.insert("color".to_string(), Value::from(color.trim()));

    let id = store
        .insert(Table::Children, record)
        .context("failed to add child")?;
    tracing::info!(%id, name, "child added");
    feed.publish(Change::ScheduleUpdated);

    writeln!(writer, "Berhasil menambahkan anak {name} ({id})")?;
    Ok(())
}

pub fn list<W, S>(writer: &mut W, store: &S, owner: &HouseholdId, json: bool) -> Result<()>
where
    W: Write,
    S: RecordStore,
{
    let children = store
        .query(Table::Children, &[Filter::eq("user_id", owner.as_str())])
        .context("failed to load children")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&children)?)?;
        return Ok(());
    }

    if children.is_empty() {
        writeln!(writer, "Belum ada anak terdaftar.")?;
        return Ok(());
    }

    for child in &children {
        writeln!(
            writer,
            "{}  {}  {}",
            field(child, "id"),
            field(child, "name"),
            field(child, "grade")
        )?;
    }
    Ok(())
}

pub fn remove<W, S>(writer: &mut W, store: &mut S, id: &str, feed: &ChangeFeed) -> Result<()>
where
    W: Write,
    S: RecordStore,
{
    store
        .delete(Table::Children, id)
        .with_context(|| format!("failed to remove child {id}"))?;
    tracing::info!(id, "child removed");
    feed.publish(Change::ScheduleUpdated);

    writeln!(writer, "Berhasil menghapus anak {id}")?;
    Ok(())
}

fn field<'a>(record: &'a Record, name: &str) -> &'a str {
    record.get(name).and_then(Value::as_str).unwrap_or("-")
}
