//! Per-domain assemblers that fold classified lines into draft records.
//!
//! Every domain follows the same shape: an owned accumulator is threaded
//! through the lines, each step consumes it and returns the next one, and
//! `finish` drains whatever is still pending. Sticky context (category, child,
//! date, day) lives in the accumulator and carries forward until a later line
//! overwrites it; per-record fields are reset whenever a draft is flushed.

pub mod event;
pub mod homework;
pub mod note;
pub mod schedule;
pub mod shopping;

use chrono::NaiveDate;

use crate::classify;
use crate::types::{ChildId, KnownEntity};

/// Caller-supplied context for a parse pass.
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// The caller's current date; used for year fallback and default deadlines.
    pub today: NaiveDate,
    /// Known children, matched by name.
    pub children: Vec<KnownEntity>,
    /// Child picked in the surrounding view, if any.
    pub selected_child: Option<ChildId>,
}

impl ParseContext {
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            today,
            children: Vec::new(),
            selected_child: None,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<KnownEntity>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_selected_child(mut self, child: Option<ChildId>) -> Self {
        self.selected_child = child;
        self
    }
}

/// A per-domain flush policy over a stream of lines.
pub trait Assembler {
    /// Accumulator threaded through the fold.
    type State;
    /// Completed record type.
    type Draft;

    /// The accumulator before the first line.
    fn start(&self) -> Self::State;

    /// Consumes one trimmed, non-empty line.
    fn step(&self, state: Self::State, line: &str) -> Self::State;

    /// Flushes anything pending at end of input.
    fn finish(&self, state: Self::State) -> Vec<Self::Draft>;
}

/// Runs an assembler over pasted text.
///
/// Parsing has no hidden state: the same text and assembler always produce
/// the same drafts.
pub fn assemble<A: Assembler>(assembler: &A, text: &str) -> Vec<A::Draft> {
    let state = classify::lines(text).fold(assembler.start(), |state, line| {
        assembler.step(state, line)
    });
    assembler.finish(state)
}

/// Converts a matched entity into a child ID, skipping blank identifiers.
fn child_id(entity: &KnownEntity) -> Option<ChildId> {
    ChildId::new(entity.id.as_str()).ok()
}
