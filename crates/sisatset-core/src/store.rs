//! The record store collaborator used by submission.
//!
//! Records are JSON objects grouped by table. The store owns identifiers and
//! timestamps; callers only ever hand it field maps.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::types::{HouseholdId, KnownEntity, ValidationError};

/// A persisted or to-be-persisted record.
pub type Record = serde_json::Map<String, Value>;

/// Tables known to the household organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Events,
    Homework,
    Schedules,
    ShoppingList,
    Notes,
    Children,
    Expenses,
    MonthlyBudgets,
    WeeklyMealPlans,
    FridgeInventory,
    Recipes,
    ShoppingLists,
    UserProfiles,
}

/// Who a table's records belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Stamped with the owning household as `user_id`.
    Household,
    /// Owned through `child_id`.
    Child,
    /// One catalog shared by every household.
    Shared,
}

impl Table {
    pub const ALL: [Self; 13] = [
        Self::Events,
        Self::Homework,
        Self::Schedules,
        Self::ShoppingList,
        Self::Notes,
        Self::Children,
        Self::Expenses,
        Self::MonthlyBudgets,
        Self::WeeklyMealPlans,
        Self::FridgeInventory,
        Self::Recipes,
        Self::ShoppingLists,
        Self::UserProfiles,
    ];

    /// Table name used for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Homework => "homework",
            Self::Schedules => "schedules",
            Self::ShoppingList => "shopping_list",
            Self::Notes => "notes",
            Self::Children => "children",
            Self::Expenses => "expenses",
            Self::MonthlyBudgets => "monthly_budgets",
            Self::WeeklyMealPlans => "weekly_meal_plans",
            Self::FridgeInventory => "fridge_inventory",
            Self::Recipes => "recipes",
            Self::ShoppingLists => "shopping_lists",
            Self::UserProfiles => "user_profiles",
        }
    }

    /// What one record is called in user-facing messages.
    #[must_use]
    pub const fn noun(&self) -> &'static str {
        match self {
            Self::Events => "event",
            Self::Homework => "PR",
            Self::Schedules => "jadwal",
            Self::ShoppingList => "item",
            Self::Notes => "catatan",
            Self::Children => "anak",
            Self::Expenses => "pengeluaran",
            Self::MonthlyBudgets => "anggaran",
            Self::WeeklyMealPlans => "menu",
            Self::FridgeInventory => "bahan",
            Self::Recipes => "resep",
            Self::ShoppingLists => "daftar belanja",
            Self::UserProfiles => "profil",
        }
    }

    /// Fields that identify a record; inserting a record with the same values
    /// replaces the existing one.
    #[must_use]
    pub const fn natural_key(&self) -> &'static [&'static str] {
        match self {
            Self::Schedules => &["child_id", "day_of_week"],
            Self::MonthlyBudgets => &["user_id", "year", "month", "category"],
            Self::WeeklyMealPlans => &["user_id", "week_start_date", "day_of_week", "meal_type"],
            Self::UserProfiles => &["user_id"],
            _ => &[],
        }
    }

    #[must_use]
    pub const fn scope(&self) -> Scope {
        match self {
            Self::Homework | Self::Schedules => Scope::Child,
            Self::Recipes => Scope::Shared,
            _ => Scope::Household,
        }
    }

    /// Whether records carry the owning household as `user_id`.
    #[must_use]
    pub const fn is_household_scoped(&self) -> bool {
        matches!(self.scope(), Scope::Household)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.as_str() == s)
            .ok_or_else(|| ValidationError::Unknown {
                kind: "table",
                value: s.to_string(),
            })
    }
}

/// Equality filter on a top-level record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when the record has the field with exactly this value.
    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.field) == Some(&self.value)
    }
}

/// Generic create/read/update/delete interface over tables of JSON records.
///
/// Calls are blocking: when one returns, the operation has settled.
pub trait RecordStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stores a record and returns its new identifier.
    fn insert(&mut self, table: Table, record: Record) -> Result<String, Self::Error>;

    /// Returns records matching every filter, in insertion order.
    fn query(&self, table: Table, filters: &[Filter]) -> Result<Vec<Record>, Self::Error>;

    /// Merges `patch` into an existing record.
    fn update(&mut self, table: Table, id: &str, patch: Record) -> Result<(), Self::Error>;

    /// Removes a record.
    fn delete(&mut self, table: Table, id: &str) -> Result<(), Self::Error>;
}

/// Loads the household's children as known entities for name matching.
pub fn known_children<S: RecordStore>(
    store: &S,
    household: &HouseholdId,
) -> Result<Vec<KnownEntity>, S::Error> {
    let records = store.query(
        Table::Children,
        &[Filter::eq("user_id", household.as_str())],
    )?;
    Ok(named_entities(&records))
}

/// Loads the shared recipe catalog as known entities for name matching.
pub fn known_recipes<S: RecordStore>(store: &S) -> Result<Vec<KnownEntity>, S::Error> {
    let records = store.query(Table::Recipes, &[])?;
    Ok(named_entities(&records))
}

fn named_entities(records: &[Record]) -> Vec<KnownEntity> {
    records
        .iter()
        .filter_map(|record| {
            let id = record.get("id")?.as_str()?;
            let name = record.get("name")?.as_str()?;
            Some(KnownEntity::new(id, name))
        })
        .collect()
}
