//! Shopping list items, one per line.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Assembler, assemble};
use crate::category::ShoppingCategory;
use crate::classify::extract_category;

static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(kg|gr|g|liter|l|buah|biji|pack|pcs|botol|kaleng)").unwrap()
});

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rp\.?\s?([\d.,]+)").unwrap());

static NAME_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-:]").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Quantity used when a line names no recognised unit.
pub const DEFAULT_QUANTITY: &str = "1";

/// A shopping list item ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftShoppingItem {
    #[serde(rename = "item")]
    pub name: String,
    pub quantity: String,
    /// Rupiah, thousand separators removed.
    pub price: u64,
    pub category: ShoppingCategory,
}

/// Parses `Rp.35.000` style amounts; separators are stripped, garbage is 0.
fn parse_price(digits: &str) -> u64 {
    let digits: String = digits.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Extracts one item from a line, or `None` when no name is left.
pub fn parse_item(line: &str) -> Option<DraftShoppingItem> {
    let mut name = line.trim().to_string();
    let mut quantity = DEFAULT_QUANTITY.to_string();
    let mut price = 0;

    if let Some(m) = QUANTITY_RE.find(line) {
        quantity = m.as_str().to_string();
        name = name.replacen(m.as_str(), "", 1);
    }

    if let Some(caps) = PRICE_RE.captures(line) {
        price = parse_price(&caps[1]);
        name = name.replacen(&caps[0], "", 1);
    }

    let name = NAME_PUNCT_RE.replace_all(&name, "");
    let name = WHITESPACE_RE.replace_all(name.trim(), " ").into_owned();
    if name.is_empty() {
        tracing::debug!(line, "no item name left after extraction");
        return None;
    }

    let category = extract_category(&name).unwrap_or_default();
    Some(DraftShoppingItem {
        name,
        quantity,
        price,
        category,
    })
}

/// Treats every line as an independent item; nothing carries over.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShoppingAssembler;

impl Assembler for ShoppingAssembler {
    type State = Vec<DraftShoppingItem>;
    type Draft = DraftShoppingItem;

    fn start(&self) -> Self::State {
        Vec::new()
    }

    fn step(&self, mut items: Self::State, line: &str) -> Self::State {
        items.extend(parse_item(line));
        items
    }

    fn finish(&self, items: Self::State) -> Vec<DraftShoppingItem> {
        items
    }
}

/// Parses a pasted shopping list.
pub fn parse_shopping(text: &str) -> Vec<DraftShoppingItem> {
    assemble(&ShoppingAssembler, text)
}
