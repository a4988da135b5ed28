//! Free-form notes: every line becomes its own note.

use serde::{Deserialize, Serialize};

use super::{Assembler, assemble};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftNote {
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoteAssembler;

impl Assembler for NoteAssembler {
    type State = Vec<DraftNote>;
    type Draft = DraftNote;

    fn start(&self) -> Self::State {
        Vec::new()
    }

    fn step(&self, mut notes: Self::State, line: &str) -> Self::State {
        notes.push(DraftNote {
            content: line.to_string(),
        });
        notes
    }

    fn finish(&self, notes: Self::State) -> Vec<DraftNote> {
        notes
    }
}

pub fn parse_notes(text: &str) -> Vec<DraftNote> {
    assemble(&NoteAssembler, text)
}
