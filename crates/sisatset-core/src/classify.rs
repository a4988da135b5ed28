//! Line classification and field extraction shared by every quick-input domain.
//!
//! A classifier only reports what a line *could* mean. Which facet wins, and
//! whether the line completes a record, is decided by the assemblers.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::category::Category;
use crate::types::KnownEntity;

/// `D/M`, `D-M`, `D/M/YY`, `D-M-YYYY`, ...
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-]?(\d{2,4})?").unwrap());

/// `H:MM` or `HH:MM`; ranges are not validated.
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*•]\s*").unwrap());

/// Prefixes that introduce a homework deadline.
pub const DEADLINE_MARKERS: &[&str] = &["deadline:", "sampai:", "tenggat:"];

/// A date as written in the text, before the year is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFragment {
    pub day: u32,
    pub month: u32,
    pub year: Option<i32>,
}

impl DateFragment {
    /// Resolves the fragment to a calendar date.
    ///
    /// Two-digit years (anything below 100) are read as `2000 + year`; a
    /// missing year uses `fallback_year`. Returns `None` for dates that do not
    /// exist, such as `31/02`.
    pub fn resolve(self, fallback_year: i32) -> Option<NaiveDate> {
        let year = match self.year {
            Some(year) if year < 100 => 2000 + year,
            Some(year) => year,
            None => fallback_year,
        };
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

/// Finds the first date-looking fragment in a line.
pub fn find_date(line: &str) -> Option<DateFragment> {
    let caps = DATE_RE.captures(line)?;
    Some(DateFragment {
        day: caps[1].parse().ok()?,
        month: caps[2].parse().ok()?,
        year: caps.get(3).and_then(|m| m.as_str().parse().ok()),
    })
}

/// Extracts a date from a line, using `fallback_year` when no year is written.
pub fn extract_date(line: &str, fallback_year: i32) -> Option<NaiveDate> {
    find_date(line)?.resolve(fallback_year)
}

/// Extracts the first `H:MM` time literally as written.
pub fn extract_time(line: &str) -> Option<String> {
    TIME_RE.find(line).map(|m| m.as_str().to_string())
}

/// Returns the first category (in list order) with a keyword in the line.
pub fn extract_category<C: Category>(line: &str) -> Option<C> {
    let lower = line.to_lowercase();
    C::ALL
        .iter()
        .copied()
        .find(|category| category.keywords().iter().any(|kw| lower.contains(kw)))
}

/// Returns the first known entity whose name appears in the line.
pub fn extract_entity<'a>(line: &str, entities: &'a [KnownEntity]) -> Option<&'a KnownEntity> {
    let lower = line.to_lowercase();
    entities.iter().find(|entity| {
        let name = entity.name.trim().to_lowercase();
        !name.is_empty() && lower.contains(&name)
    })
}

/// Returns the text after the first `:` when the line starts a deadline marker.
pub fn extract_deadline_marker(line: &str) -> Option<&str> {
    let lower = line.to_lowercase();
    if !DEADLINE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return None;
    }
    line.split_once(':').map(|(_, value)| value.trim())
}

/// Strips a leading `-`, `*` or `•` bullet.
pub fn strip_bullet(line: &str) -> &str {
    BULLET_RE
        .find(line)
        .map_or(line, |m| &line[m.end()..])
        .trim()
}

/// Splits pasted text into trimmed, non-empty lines.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Everything a line could mean for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFacets<'a, C> {
    pub date: Option<DateFragment>,
    pub time: Option<String>,
    pub category: Option<C>,
    pub entity: Option<&'a KnownEntity>,
}

impl<C> LineFacets<'_, C> {
    /// True when no facet matched and the line is free-text content.
    pub const fn is_content(&self) -> bool {
        self.date.is_none() && self.time.is_none() && self.category.is_none() && self.entity.is_none()
    }
}

/// Tags lines using a domain's lookup tables.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    entities: &'a [KnownEntity],
}

impl<'a> Classifier<'a> {
    pub const fn new(entities: &'a [KnownEntity]) -> Self {
        Self { entities }
    }

    /// Applies every detection rule to a trimmed line independently.
    pub fn classify<C: Category>(&self, line: &str) -> LineFacets<'a, C> {
        LineFacets {
            date: find_date(line),
            time: extract_time(line),
            category: extract_category(line),
            entity: extract_entity(line, self.entities),
        }
    }
}
