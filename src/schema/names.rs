//! Case-insensitive identifiers for record types and fields
//!
//! IDD and IDF files treat type and field names without regard to case.
//! Both newtypes keep the spelling they were created with (for output) and
//! compare, hash and order on a lower-cased key.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

macro_rules! case_insensitive_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name {
            display: String,
            key: String,
        }

        impl $name {
            /// Creates a name, trimming surrounding whitespace.
            pub fn new(name: impl AsRef<str>) -> Self {
                let display = name.as_ref().trim().to_string();
                let key = display.to_lowercase();
                Self { display, key }
            }

            /// The name as originally spelled.
            pub fn as_str(&self) -> &str {
                &self.display
            }

            /// The canonical lower-cased key.
            pub fn key(&self) -> &str {
                &self.key
            }

            /// Case-insensitive comparison against a plain string.
            pub fn matches(&self, other: &str) -> bool {
                self.key == other.trim().to_lowercase()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.key == other.key
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.key.hash(state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.key.cmp(&other.key)
            }
        }

        // `&str` lookups must pass an already lower-cased key.
        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.key
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.display)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self::new(name)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> String {
                name.display
            }
        }
    };
}

case_insensitive_name!(
    /// Name of a record type, e.g. `Zone` or `Schedule:Constant`.
    TypeName
);

case_insensitive_name!(
    /// Name of a field within a record type, e.g. `Floor Area`.
    FieldName
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_equality_ignores_case() {
        assert_eq!(TypeName::new("Zone"), TypeName::new("ZONE"));
        assert_eq!(FieldName::new(" Floor Area "), FieldName::new("floor area"));
        assert_ne!(TypeName::new("Zone"), TypeName::new("ZoneList"));
    }

    #[test]
    fn test_display_keeps_original_spelling() {
        let name = TypeName::new("Schedule:Constant");
        assert_eq!(name.to_string(), "Schedule:Constant");
        assert_eq!(name.key(), "schedule:constant");
    }

    #[test]
    fn test_hash_lookup_by_key() {
        let mut map = HashMap::new();
        map.insert(TypeName::new("Material"), 1);
        assert_eq!(map.get("material"), Some(&1));
        assert_eq!(map.get(&TypeName::new("MATERIAL")), Some(&1));
    }

    #[test]
    fn test_matches_plain_string() {
        let name = FieldName::new("Name");
        assert!(name.matches("NAME"));
        assert!(name.matches("  name "));
        assert!(!name.matches("names"));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let name = FieldName::new("X Origin");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"X Origin\"");
        let back: FieldName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
