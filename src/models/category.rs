//! Category model
//!
//! Product categories. Names are unique, compared case-insensitively.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::validation::{check_name, required_name, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("Category name", &self.name)
    }

    /// Normalize a category name for uniqueness checks
    ///
    /// Folds ASCII letters only, the same rule the `categories` table's
    /// `NOCASE` collation applies, so "Ñame" and "ñame" stay distinct.
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_ascii_lowercase()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Input for creating or renaming a category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_name("Category name", &self.name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(Category::normalize_name("  Bebidas "), "bebidas");
    }

    #[test]
    fn test_normalize_name_folds_ascii_only() {
        assert_eq!(Category::normalize_name("ÑAME"), "Ñame");
        assert_ne!(Category::normalize_name("Ñame"), Category::normalize_name("ñame"));
    }

    #[test]
    fn test_draft_validation() {
        assert_eq!(CategoryDraft::new(" Aseo ").normalize().unwrap().name, "Aseo");
        assert!(CategoryDraft::new("\t").normalize().is_err());
    }
}
