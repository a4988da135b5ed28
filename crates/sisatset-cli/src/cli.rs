//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sisatset_core::Table;

use crate::commands::quick::QuickArgs;

/// Household organizer quick input.
///
/// Turns pasted free text (chat messages, school announcements, shopping
/// lists) into events, homework, schedules, shopping items and notes.
#[derive(Debug, Parser)]
#[command(name = "sisatset", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse pasted text and save the detected records.
    Quick(QuickArgs),

    /// Manage the household's children.
    #[command(subcommand)]
    Children(ChildrenAction),

    /// Print records of a table as JSON lines.
    List {
        /// Table to read, e.g. events, homework, `shopping_list`, expenses, recipes.
        #[arg(value_parser = parse_table)]
        table: Table,

        /// Only show records where FIELD equals VALUE.
        #[arg(long = "where", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        filters: Vec<(String, String)>,
    },

    /// Change fields of a stored record.
    Update {
        #[arg(value_parser = parse_table)]
        table: Table,

        /// Record ID.
        id: String,

        /// Fields to set, as FIELD=VALUE. Values are read as JSON when possible.
        #[arg(required = true, value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },

    /// Delete a stored record.
    Delete {
        #[arg(value_parser = parse_table)]
        table: Table,

        /// Record ID.
        id: String,
    },

    /// Show database location and record counts.
    Status,
}

/// Children subcommands.
#[derive(Debug, Subcommand)]
pub enum ChildrenAction {
    /// Register a child.
    Add {
        #[arg(long)]
        name: String,

        /// School grade, e.g. "4 SD".
        #[arg(long)]
        grade: String,

        /// Display color as a hex string.
        #[arg(long, default_value = "#3B82F6")]
        color: String,
    },

    /// List registered children.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove a child together with its homework and schedules.
    Remove {
        /// Child ID.
        id: String,
    },
}

fn parse_table(s: &str) -> Result<Table, String> {
    s.parse().map_err(|err: sisatset_core::ValidationError| err.to_string())
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }
    Ok((field.to_string(), value.to_string()))
}
