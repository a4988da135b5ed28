//! Canonical category sets as the single source of truth for category labels.
//!
//! Each domain has a fixed, ordered list of categories. Order matters: when a
//! line mentions keywords of several categories, the earliest one wins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// A fixed, ordered set of category labels with keyword detection.
pub trait Category: Copy + Eq + fmt::Debug + 'static {
    /// Every category, in tie-break order.
    const ALL: &'static [Self];

    /// Category used when no keyword matches.
    const FALLBACK: Self;

    /// The canonical display label stored in records.
    fn label(self) -> &'static str;

    /// Lowercase keywords that select this category.
    fn keywords(self) -> &'static [&'static str];
}

/// Generates a category enum with label, parsing and serde impls.
macro_rules! define_category {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, fallback = $fallback:ident {
            $($variant:ident => $label:literal [$($keyword:literal),* $(,)?]),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Category for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const FALLBACK: Self = Self::$fallback;

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn keywords(self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => &[$($keyword),*]),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as Category>::FALLBACK
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|category| category.label().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| ValidationError::Unknown {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_category!(
    /// Calendar event categories. A line naming a category becomes the
    /// category for all following events.
    EventCategory, "event category", fallback = Other {
        School => "Sekolah" ["sekolah"],
        Lesson => "Les" ["les"],
        Extracurricular => "Ekstrakurikuler" ["ekstrakurikuler"],
        FamilyEvent => "Acara Keluarga" ["acara keluarga"],
        Other => "Lainnya" ["lainnya"],
    }
);

define_category!(
    /// Shopping list categories, inferred from ingredient keywords.
    ShoppingCategory, "shopping category", fallback = Other {
        Vegetables => "Sayuran" ["sayur", "brokoli", "wortel", "bayam"],
        Fruit => "Buah" ["buah", "apel", "pisang", "jeruk"],
        MeatAndFish => "Daging & Ikan" ["daging", "ayam", "ikan", "sapi"],
        Seasoning => "Bumbu Dapur" ["bumbu", "bawang", "garam", "merica"],
        Household => "Kebutuhan Harian" [],
        Snack => "Snack" ["snack", "kue", "keripik"],
        Other => "Lainnya" [],
    }
);
