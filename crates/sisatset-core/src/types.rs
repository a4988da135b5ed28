//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value is not a member of a fixed label set.
    #[error("unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated child identifier.
    ///
    /// Child IDs are assigned by the record store when a child is registered.
    ChildId, "child ID"
);

define_string_id!(
    /// The household that owns every record created by a submission.
    ///
    /// Stamped into owner-scoped tables as `user_id`.
    HouseholdId, "household ID"
);

/// An externally supplied reference value matched by display name.
///
/// Children and recipes are both known entities; the parsers only ever read
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownEntity {
    pub id: String,
    pub name: String,
}

impl KnownEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_id_rejects_empty() {
        assert!(ChildId::new("").is_err());
        assert!(ChildId::new("   ").is_err());
        assert!(ChildId::new("child-1").is_ok());
    }

    #[test]
    fn household_id_serde_rejects_empty() {
        let result: Result<HouseholdId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());

        let parsed: HouseholdId = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(parsed.as_str(), "local");
    }

    #[test]
    fn child_id_serializes_as_plain_string() {
        let id = ChildId::new("c-42").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"c-42\"");
    }

    #[test]
    fn validation_error_messages() {
        let err = ValidationError::Empty { field: "child ID" };
        assert_eq!(err.to_string(), "child ID cannot be empty");

        let err = ValidationError::Unknown {
            kind: "table",
            value: "recipes".to_string(),
        };
        assert_eq!(err.to_string(), "unknown table: recipes");
    }
}
