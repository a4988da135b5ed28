//! Homework assignments pasted from a school group chat.
//!
//! A subject line (`PR Matematika: halaman 5`, `Tugas IPA: laporan`, or any
//! line with a colon) opens a pending assignment. Following date or
//! `deadline:` lines set its deadline, other lines extend its description.
//! The pending assignment is flushed when the next subject starts, or at end
//! of input, and belongs to whichever child was named last at that point.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Assembler, ParseContext, assemble, child_id};
use crate::classify::{extract_date, extract_deadline_marker, extract_entity, find_date};
use crate::types::{ChildId, KnownEntity};

static SUBJECT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(pr|tugas)\s+").unwrap());

/// Days added to today when an assignment never mentions a deadline.
pub const DEFAULT_DEADLINE_DAYS: i64 = 7;

/// A homework assignment ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftHomework {
    pub child_id: ChildId,
    pub subject: String,
    pub description: String,
    pub deadline: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    subject: String,
    description: String,
    deadline: Option<NaiveDate>,
}

/// Current child plus the assignment being collected.
#[derive(Debug, Clone, Default)]
pub struct HomeworkState {
    child: Option<ChildId>,
    pending: Option<Pending>,
    drafts: Vec<DraftHomework>,
}

/// Flushes the previous assignment whenever a new subject line appears.
#[derive(Debug, Clone, Copy)]
pub struct HomeworkAssembler<'a> {
    children: &'a [KnownEntity],
    initial_child: Option<&'a ChildId>,
    today: NaiveDate,
}

impl<'a> HomeworkAssembler<'a> {
    pub fn new(ctx: &'a ParseContext) -> Self {
        Self {
            children: &ctx.children,
            initial_child: ctx.selected_child.as_ref(),
            today: ctx.today,
        }
    }

    fn default_deadline(&self) -> NaiveDate {
        self.today + Duration::days(DEFAULT_DEADLINE_DAYS)
    }

    fn flush(&self, state: &mut HomeworkState) {
        let Some(pending) = state.pending.take() else {
            return;
        };
        if pending.subject.is_empty() {
            tracing::debug!("dropping homework without a subject");
            return;
        }
        let Some(child_id) = state.child.clone() else {
            tracing::debug!(subject = %pending.subject, "dropping homework without a child");
            return;
        };
        state.drafts.push(DraftHomework {
            child_id,
            subject: pending.subject,
            description: pending.description,
            deadline: pending.deadline.unwrap_or_else(|| self.default_deadline()),
        });
    }
}

/// Returns true when a line opens a new assignment.
fn is_subject_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("pr ") || lower.contains("tugas ") || line.contains(':')
}

/// Splits `PR Matematika: halaman 5` into `("Matematika", "halaman 5")`.
fn split_subject(line: &str) -> (String, String) {
    let stripped = SUBJECT_PREFIX_RE.replace(line, "");
    let subject = stripped.split(':').next().unwrap_or_default().trim();
    let description = line
        .split_once(':')
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default();
    (subject.to_string(), description.to_string())
}

impl Assembler for HomeworkAssembler<'_> {
    type State = HomeworkState;
    type Draft = DraftHomework;

    fn start(&self) -> HomeworkState {
        let child = self
            .initial_child
            .cloned()
            .or_else(|| self.children.first().and_then(child_id));
        HomeworkState {
            child,
            ..HomeworkState::default()
        }
    }

    fn step(&self, mut state: HomeworkState, line: &str) -> HomeworkState {
        if let Some(entity) = extract_entity(line, self.children) {
            state.child = child_id(entity);
            return state;
        }

        let year = self.today.year();

        if let Some(fragment) = find_date(line) {
            match (fragment.resolve(year), &mut state.pending) {
                (Some(deadline), Some(pending)) => pending.deadline = Some(deadline),
                (None, _) => tracing::debug!(line, "ignoring impossible deadline"),
                (Some(_), None) => tracing::debug!(line, "deadline before any subject"),
            }
            return state;
        }

        if let Some(value) = extract_deadline_marker(line) {
            if let (Some(deadline), Some(pending)) = (extract_date(value, year), &mut state.pending)
            {
                pending.deadline = Some(deadline);
            }
            return state;
        }

        if is_subject_line(line) {
            self.flush(&mut state);
            let (subject, description) = split_subject(line);
            state.pending = Some(Pending {
                subject,
                description,
                deadline: None,
            });
        } else if let Some(pending) = &mut state.pending {
            if !pending.description.is_empty() {
                pending.description.push(' ');
            }
            pending.description.push_str(line);
        }

        state
    }

    fn finish(&self, mut state: HomeworkState) -> Vec<DraftHomework> {
        self.flush(&mut state);
        state.drafts
    }
}

/// Parses pasted text into homework assignments.
pub fn parse_homework(text: &str, ctx: &ParseContext) -> Vec<DraftHomework> {
    assemble(&HomeworkAssembler::new(ctx), text)
}
