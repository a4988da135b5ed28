//! Sequential, best-effort persistence of parsed drafts.
//!
//! Drafts are inserted one at a time in detection order. A failed insert is
//! logged and recorded, and the remaining drafts are still attempted; nothing
//! already written is rolled back.

use serde::Serialize;
use serde_json::Value;

use crate::assemble::event::DraftEvent;
use crate::assemble::homework::DraftHomework;
use crate::assemble::note::DraftNote;
use crate::assemble::schedule::DraftScheduleDay;
use crate::assemble::shopping::DraftShoppingItem;
use crate::store::{Record, RecordStore, Table};
use crate::types::HouseholdId;

/// A parsed record that knows where and how it is stored.
pub trait Draft: Serialize {
    const TABLE: Table;

    /// Fields every new record of this kind starts with.
    fn initial_fields() -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    /// Builds the record to insert, stamping the owner where the table needs it.
    fn to_record(&self, owner: &HouseholdId) -> Result<Record, serde_json::Error> {
        let Value::Object(mut record) = serde_json::to_value(self)? else {
            return Err(serde::ser::Error::custom("draft must serialize to an object"));
        };
        if Self::TABLE.is_household_scoped() {
            record.insert("user_id".to_string(), Value::from(owner.as_str()));
        }
        for (field, value) in Self::initial_fields() {
            record.entry(field).or_insert(value);
        }
        Ok(record)
    }
}

impl Draft for DraftEvent {
    const TABLE: Table = Table::Events;
}

impl Draft for DraftHomework {
    const TABLE: Table = Table::Homework;

    fn initial_fields() -> Vec<(&'static str, Value)> {
        vec![("completed", Value::Bool(false))]
    }
}

impl Draft for DraftScheduleDay {
    const TABLE: Table = Table::Schedules;
}

impl Draft for DraftShoppingItem {
    const TABLE: Table = Table::ShoppingList;

    fn initial_fields() -> Vec<(&'static str, Value)> {
        vec![
            ("checked", Value::Bool(false)),
            ("source", Value::from("quick_input")),
        ]
    }
}

impl Draft for DraftNote {
    const TABLE: Table = Table::Notes;

    fn initial_fields() -> Vec<(&'static str, Value)> {
        vec![("pinned", Value::Bool(false)), ("done", Value::Bool(false))]
    }
}

/// A draft whose insert failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFailure {
    /// Position of the draft in detection order.
    pub index: usize,
    pub message: String,
}

/// Summary of one submission batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub table: Table,
    /// Every draft is attempted, so this is the batch size.
    pub attempted: usize,
    /// Identifiers of the records that were stored, in order.
    pub inserted_ids: Vec<String>,
    pub failures: Vec<SubmitFailure>,
}

impl SubmitReport {
    pub const fn succeeded(&self) -> usize {
        self.inserted_ids.len()
    }
}

/// Result of a quick-input submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickInputOutcome {
    /// Parsing found no records; nothing was written.
    NothingDetected,
    Submitted(SubmitReport),
}

/// Persists drafts in order, continuing past individual failures.
pub fn submit<S, D>(store: &mut S, owner: &HouseholdId, drafts: &[D]) -> QuickInputOutcome
where
    S: RecordStore,
    D: Draft,
{
    if drafts.is_empty() {
        tracing::info!(table = %D::TABLE, "nothing detected");
        return QuickInputOutcome::NothingDetected;
    }

    let mut report = SubmitReport {
        table: D::TABLE,
        attempted: 0,
        inserted_ids: Vec::with_capacity(drafts.len()),
        failures: Vec::new(),
    };

    for (index, draft) in drafts.iter().enumerate() {
        report.attempted += 1;
        let result = draft
            .to_record(owner)
            .map_err(|err| err.to_string())
            .and_then(|record| {
                store
                    .insert(D::TABLE, record)
                    .map_err(|err| err.to_string())
            });
        match result {
            Ok(id) => {
                tracing::debug!(table = %D::TABLE, index, %id, "record inserted");
                report.inserted_ids.push(id);
            }
            Err(message) => {
                tracing::warn!(table = %D::TABLE, index, error = %message, "failed to insert record");
                report.failures.push(SubmitFailure { index, message });
            }
        }
    }

    tracing::info!(
        table = %D::TABLE,
        attempted = report.attempted,
        failed = report.failures.len(),
        "submission finished"
    );
    QuickInputOutcome::Submitted(report)
}
