//! Calendar events pasted from school or class announcements.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Assembler, ParseContext, assemble, child_id};
use crate::category::EventCategory;
use crate::classify::{Classifier, strip_bullet};
use crate::types::ChildId;

/// A calendar event ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEvent {
    pub title: String,
    pub category: EventCategory,
    #[serde(rename = "event_date")]
    pub date: NaiveDate,
    /// Literal `H:MM` as written; empty when no time was seen.
    #[serde(rename = "event_time", default)]
    pub time: String,
    #[serde(default)]
    pub notes: String,
    pub child_id: Option<ChildId>,
}

/// Sticky context plus the events emitted so far.
#[derive(Debug, Clone, Default)]
pub struct EventState {
    category: EventCategory,
    child: Option<ChildId>,
    date: Option<NaiveDate>,
    time: Option<String>,
    drafts: Vec<DraftEvent>,
}

/// Emits one event per content line once a date is known.
#[derive(Debug, Clone, Copy)]
pub struct EventAssembler<'a> {
    classifier: Classifier<'a>,
    today: NaiveDate,
}

impl<'a> EventAssembler<'a> {
    pub fn new(ctx: &'a ParseContext) -> Self {
        Self {
            classifier: Classifier::new(&ctx.children),
            today: ctx.today,
        }
    }
}

impl Assembler for EventAssembler<'_> {
    type State = EventState;
    type Draft = DraftEvent;

    fn start(&self) -> EventState {
        EventState::default()
    }

    fn step(&self, mut state: EventState, line: &str) -> EventState {
        let facets = self.classifier.classify::<EventCategory>(line);

        // A category header only switches context.
        if let Some(category) = facets.category {
            tracing::debug!(%category, "event category");
            return EventState { category, ..state };
        }

        if let Some(entity) = facets.entity {
            state.child = child_id(entity);
        }

        if let Some(fragment) = facets.date {
            let fallback_year = state.date.map_or(self.today.year(), |date| date.year());
            match fragment.resolve(fallback_year) {
                Some(date) => state.date = Some(date),
                None => tracing::debug!(line, "ignoring impossible date"),
            }
        }

        if let Some(time) = &facets.time {
            state.time = Some(time.clone());
        }

        if facets.is_content() {
            let title = strip_bullet(line);
            match state.date {
                Some(date) if !title.is_empty() => state.drafts.push(DraftEvent {
                    title: title.to_string(),
                    category: state.category,
                    date,
                    time: state.time.clone().unwrap_or_default(),
                    notes: String::new(),
                    child_id: state.child.clone(),
                }),
                _ => tracing::debug!(line, "dropping event line without a date"),
            }
        }

        state
    }

    fn finish(&self, state: EventState) -> Vec<DraftEvent> {
        state.drafts
    }
}

/// Parses pasted text into calendar events.
pub fn parse_events(text: &str, ctx: &ParseContext) -> Vec<DraftEvent> {
    assemble(&EventAssembler::new(ctx), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownEntity;

    fn ctx() -> ParseContext {
        ParseContext::new(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()).with_children(vec![
            KnownEntity::new("child-budi", "Budi"),
            KnownEntity::new("child-siti", "Siti"),
        ])
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_and_time_carry_forward_to_following_titles() {
        let events = parse_events("Sekolah\n26/10/2025\n10:30\nLomba A\nLomba B", &ctx());

        assert_eq!(events.len(), 2);
        for (event, title) in events.iter().zip(["Lomba A", "Lomba B"]) {
            assert_eq!(event.title, title);
            assert_eq!(event.date, ymd(2025, 10, 26));
            assert_eq!(event.time, "10:30");
            assert_eq!(event.category, EventCategory::School);
            assert_eq!(event.child_id, None);
        }
    }

    #[test]
    fn title_before_any_date_is_dropped() {
        let events = parse_events("Sekolah\nLomba A\n26/10/2025\n10:30\nLomba B", &ctx());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Lomba B");
        assert_eq!(events[0].date, ymd(2025, 10, 26));
    }

    #[test]
    fn missing_year_reuses_year_of_current_date() {
        let events = parse_events("1/1/2030\nRapat\n5/2\nPentas", &ctx());

        assert_eq!(events[0].date, ymd(2030, 1, 1));
        assert_eq!(events[1].date, ymd(2030, 2, 5));
    }

    #[test]
    fn missing_year_without_prior_date_uses_today() {
        let events = parse_events("17/8\nUpacara", &ctx());
        assert_eq!(events[0].date, ymd(2025, 8, 17));
    }

    #[test]
    fn child_name_sticks_until_replaced() {
        let text = "Budi\n3/11/25\nRenang\nSiti\nMenari\n";
        let events = parse_events(text, &ctx());

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].child_id.as_ref().map(ChildId::as_str), Some("child-budi"));
        assert_eq!(events[1].child_id.as_ref().map(ChildId::as_str), Some("child-siti"));
    }

    #[test]
    fn category_defaults_to_other_and_bullets_are_stripped() {
        let events = parse_events("12/12/2025\n- Bazar\n• Pentas seni", &ctx());

        assert_eq!(events[0].title, "Bazar");
        assert_eq!(events[1].title, "Pentas seni");
        assert!(events.iter().all(|e| e.category == EventCategory::Other));
        assert!(events.iter().all(|e| e.time.is_empty()));
    }

    #[test]
    fn impossible_date_keeps_previous_date() {
        let events = parse_events("2/2/2025\n31/02/2025\nKarnaval", &ctx());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, ymd(2025, 2, 2));
    }

    #[test]
    fn noise_without_dates_yields_nothing() {
        let events = parse_events("halo semua\nterima kasih\n", &ctx());
        assert!(events.is_empty());
    }

    #[test]
    fn reparse_is_idempotent() {
        let text = "Les\n20/11/2025 16:00\nPiano\nAcara Keluarga\n21/11\nArisan";
        let ctx = ctx();
        assert_eq!(parse_events(text, &ctx), parse_events(text, &ctx));
    }

    #[test]
    fn serializes_with_table_field_names() {
        let events = parse_events("26/10/2025\n10:30\nLomba", &ctx());
        let json = serde_json::to_value(&events[0]).unwrap();

        assert_eq!(json["event_date"], "2025-10-26");
        assert_eq!(json["event_time"], "10:30");
        assert_eq!(json["category"], "Lainnya");
        assert!(json["child_id"].is_null());
    }
}
