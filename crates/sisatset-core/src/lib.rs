//! Core domain logic for the SiSatSet household organizer.
//!
//! This crate contains the quick-input engine:
//! - Classification: tagging pasted lines with dates, times, categories and names
//! - Assembly: folding classified lines into event, homework, schedule,
//!   shopping and note drafts
//! - Submission: persisting drafts through a [`RecordStore`]

pub mod assemble;
pub mod category;
pub mod classify;
pub mod store;
pub mod submit;
mod types;

pub use assemble::event::{DraftEvent, parse_events};
pub use assemble::homework::{DraftHomework, parse_homework};
pub use assemble::note::{DraftNote, parse_notes};
pub use assemble::schedule::{DayOfWeek, DraftScheduleDay, parse_schedule};
pub use assemble::shopping::{DraftShoppingItem, parse_shopping};
pub use assemble::{Assembler, ParseContext, assemble};
pub use category::{Category, EventCategory, ShoppingCategory};
pub use store::{Filter, Record, RecordStore, Scope, Table, known_children, known_recipes};
pub use submit::{Draft, QuickInputOutcome, SubmitFailure, SubmitReport, submit};
pub use types::{ChildId, HouseholdId, KnownEntity, ValidationError};
