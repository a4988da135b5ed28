//! Quick input: parse pasted text and store what was detected.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use sisatset_core::{
    ChildId, Draft, HouseholdId, KnownEntity, ParseContext, QuickInputOutcome, RecordStore,
    Table, known_children, parse_events, parse_homework, parse_notes, parse_schedule,
    parse_shopping, submit,
};

use crate::refresh::{Change, ChangeFeed};

/// Kind of records the pasted text describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QuickKind {
    Events,
    Homework,
    Schedule,
    Shopping,
    Notes,
}

#[derive(Debug, Args)]
pub struct QuickArgs {
    /// What the text contains.
    #[arg(value_enum)]
    pub kind: QuickKind,

    /// Read text from a file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Child the text is about (name or ID). Required for schedules.
    #[arg(long)]
    pub child: Option<String>,

    /// Date used for year and deadline defaults (YYYY-MM-DD).
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Print the parsed records as JSON lines without saving them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Reads the pasted text from `--file` or stdin.
pub fn read_input(args: &QuickArgs) -> Result<String> {
    match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Finds a child by ID or, ignoring case, by name.
fn resolve_child<'a>(children: &'a [KnownEntity], wanted: &str) -> Result<&'a KnownEntity> {
    let wanted = wanted.trim();
    children
        .iter()
        .find(|child| child.id == wanted)
        .or_else(|| {
            children
                .iter()
                .find(|child| child.name.eq_ignore_ascii_case(wanted))
        })
        .with_context(|| format!("no child named '{wanted}'"))
}

pub fn run<W, S>(
    writer: &mut W,
    store: &mut S,
    owner: &HouseholdId,
    args: &QuickArgs,
    text: &str,
    feed: &ChangeFeed,
) -> Result<()>
where
    W: Write,
    S: RecordStore,
{
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let children = known_children(&*store, owner).context("failed to load children")?;
    let selected = args
        .child
        .as_deref()
        .map(|name| resolve_child(&children, name))
        .transpose()?
        .map(|child| ChildId::new(child.id.as_str()))
        .transpose()?;

    tracing::debug!(kind = ?args.kind, %today, children = children.len(), "parsing quick input");

    let ctx = ParseContext::new(today)
        .with_children(children)
        .with_selected_child(selected.clone());

    let saved = match args.kind {
        QuickKind::Events => save(writer, store, owner, &parse_events(text, &ctx), args.dry_run)?,
        QuickKind::Homework => {
            save(writer, store, owner, &parse_homework(text, &ctx), args.dry_run)?
        }
        QuickKind::Schedule => {
            let Some(child) = selected else {
                bail!("schedule input needs --child");
            };
            let saved = save(writer, store, owner, &parse_schedule(text, &child), args.dry_run)?;
            if saved > 0 {
                feed.publish(Change::ScheduleUpdated);
            }
            saved
        }
        QuickKind::Shopping => save(writer, store, owner, &parse_shopping(text), args.dry_run)?,
        QuickKind::Notes => save(writer, store, owner, &parse_notes(text), args.dry_run)?,
    };
    tracing::debug!(saved, "quick input finished");

    Ok(())
}

/// Message shown when parsing found nothing to save.
fn nothing_detected(table: Table) -> String {
    match table {
        Table::Homework => "Tidak ada PR yang terdeteksi. Pastikan format benar!".to_string(),
        _ => format!("Tidak ada {} yang terdeteksi!", table.noun()),
    }
}

/// Submits drafts (or prints them on a dry run) and reports the outcome.
///
/// Returns the number of records stored.
fn save<W, S, D>(
    writer: &mut W,
    store: &mut S,
    owner: &HouseholdId,
    drafts: &[D],
    dry_run: bool,
) -> Result<usize>
where
    W: Write,
    S: RecordStore,
    D: Draft,
{
    let noun = D::TABLE.noun();

    if dry_run {
        if drafts.is_empty() {
            writeln!(writer, "{}", nothing_detected(D::TABLE))?;
        }
        for draft in drafts {
            let record = draft.to_record(owner)?;
            writeln!(writer, "{}", serde_json::to_string(&record)?)?;
        }
        return Ok(0);
    }

    match submit(store, owner, drafts) {
        QuickInputOutcome::NothingDetected => {
            writeln!(writer, "{}", nothing_detected(D::TABLE))?;
            Ok(0)
        }
        QuickInputOutcome::Submitted(report) => {
            writeln!(writer, "Berhasil menambahkan {} {noun}!", report.succeeded())?;
            for failure in &report.failures {
                writeln!(
                    writer,
                    "Gagal menyimpan {noun} #{}: {}",
                    failure.index + 1,
                    failure.message
                )?;
            }
            Ok(report.succeeded())
        }
    }
}
