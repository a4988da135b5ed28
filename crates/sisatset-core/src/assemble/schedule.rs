//! Weekly school schedules, one bucket per day name.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Assembler, assemble};
use crate::types::{ChildId, ValidationError};

static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}[:.-]\d{2}").unwrap());

static UNIFORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)seragam:?|baju:?").unwrap());

/// School days, Monday to Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Senin,
    Selasa,
    Rabu,
    Kamis,
    Jumat,
    Sabtu,
}

impl DayOfWeek {
    pub const ALL: [Self; 6] = [
        Self::Senin,
        Self::Selasa,
        Self::Rabu,
        Self::Kamis,
        Self::Jumat,
        Self::Sabtu,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Senin => "senin",
            Self::Selasa => "selasa",
            Self::Rabu => "rabu",
            Self::Kamis => "kamis",
            Self::Jumat => "jumat",
            Self::Sabtu => "sabtu",
        }
    }

    /// Finds the first day (in week order) named anywhere in the line.
    pub fn find_in(line: &str) -> Option<Self> {
        let lower = line.to_lowercase();
        Self::ALL.into_iter().find(|day| lower.contains(day.as_str()))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::Unknown {
                kind: "day of week",
                value: s.to_string(),
            })
    }
}

/// One day of a child's weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftScheduleDay {
    pub child_id: ChildId,
    pub day_of_week: DayOfWeek,
    pub subjects: Vec<String>,
    pub uniform: String,
    pub school_hours: String,
}

impl DraftScheduleDay {
    fn new(child_id: ChildId, day_of_week: DayOfWeek) -> Self {
        Self {
            child_id,
            day_of_week,
            subjects: Vec::new(),
            uniform: String::new(),
            school_hours: String::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.subjects.is_empty() && self.uniform.is_empty() && self.school_hours.is_empty()
    }
}

/// Current day plus the buckets in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct ScheduleState {
    current: Option<DayOfWeek>,
    days: Vec<DraftScheduleDay>,
}

impl ScheduleState {
    fn bucket(&mut self, day: DayOfWeek) -> Option<&mut DraftScheduleDay> {
        self.days.iter_mut().find(|d| d.day_of_week == day)
    }
}

/// Groups lines under the most recent day name for one child.
#[derive(Debug, Clone)]
pub struct ScheduleAssembler {
    child: ChildId,
}

impl ScheduleAssembler {
    pub const fn new(child: ChildId) -> Self {
        Self { child }
    }
}

impl Assembler for ScheduleAssembler {
    type State = ScheduleState;
    type Draft = DraftScheduleDay;

    fn start(&self) -> ScheduleState {
        ScheduleState::default()
    }

    fn step(&self, mut state: ScheduleState, line: &str) -> ScheduleState {
        if let Some(day) = DayOfWeek::find_in(line) {
            // Naming a day again reopens its bucket rather than replacing it.
            if state.bucket(day).is_none() {
                state.days.push(DraftScheduleDay::new(self.child.clone(), day));
            }
            state.current = Some(day);
            return state;
        }

        let Some(day) = state.current else {
            tracing::debug!(line, "ignoring schedule line before any day");
            return state;
        };
        let lower = line.to_lowercase();
        if let Some(bucket) = state.bucket(day) {
            if lower.contains("jam") || HOURS_RE.is_match(line) {
                bucket.school_hours = line.to_string();
            } else if lower.contains("seragam") || lower.contains("baju") {
                bucket.uniform = UNIFORM_RE.replace_all(line, "").trim().to_string();
            } else {
                bucket.subjects.push(line.to_string());
            }
        }

        state
    }

    fn finish(&self, state: ScheduleState) -> Vec<DraftScheduleDay> {
        state.days.into_iter().filter(|day| !day.is_empty()).collect()
    }
}

/// Parses a pasted weekly schedule for one child.
pub fn parse_schedule(text: &str, child: &ChildId) -> Vec<DraftScheduleDay> {
    assemble(&ScheduleAssembler::new(child.clone()), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child() -> ChildId {
        ChildId::new("child-budi").unwrap()
    }

    #[test]
    fn lines_group_under_their_day() {
        let text = "\
Senin
Jam 07.00 - 12.00
Seragam: Merah Putih
Matematika
Bahasa Indonesia
Selasa
IPA
Baju olahraga";
        let days = parse_schedule(text, &child());

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day_of_week, DayOfWeek::Senin);
        assert_eq!(days[0].school_hours, "Jam 07.00 - 12.00");
        assert_eq!(days[0].uniform, "Merah Putih");
        assert_eq!(days[0].subjects, vec!["Matematika", "Bahasa Indonesia"]);
        assert_eq!(days[1].day_of_week, DayOfWeek::Selasa);
        assert_eq!(days[1].subjects, vec!["IPA"]);
        assert_eq!(days[1].uniform, "olahraga");
    }

    #[test]
    fn repeated_day_accumulates_into_one_record() {
        let text = "Senin\nMatematika\nRabu\nSeni Budaya\nSENIN\nPenjaskes";
        let days = parse_schedule(text, &child());

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day_of_week, DayOfWeek::Senin);
        assert_eq!(days[0].subjects, vec!["Matematika", "Penjaskes"]);
        assert_eq!(days[1].subjects, vec!["Seni Budaya"]);
    }

    #[test]
    fn bare_time_range_counts_as_hours() {
        let days = parse_schedule("Kamis\n07:15-11:30", &child());
        assert_eq!(days[0].school_hours, "07:15-11:30");
        assert!(days[0].subjects.is_empty());
    }

    #[test]
    fn empty_days_and_leading_lines_are_dropped() {
        let days = parse_schedule("Jadwal kelas 3\nJumat\nSabtu\nPramuka", &child());

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day_of_week, DayOfWeek::Sabtu);
        assert_eq!(days[0].child_id, child());
    }

    #[test]
    fn day_of_week_parses_and_serializes_lowercase() {
        assert_eq!("Jumat".parse::<DayOfWeek>().unwrap(), DayOfWeek::Jumat);
        assert!("minggu".parse::<DayOfWeek>().is_err());
        assert_eq!(
            serde_json::to_string(&DayOfWeek::Kamis).unwrap(),
            "\"kamis\""
        );
    }
}
