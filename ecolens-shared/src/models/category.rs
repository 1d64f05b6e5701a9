/// Emission categories
///
/// The category set is closed and wire-visible. Every category maps to a
/// fixed display color used by the category breakdown.
///
/// ```text
/// food, beverage, clothing, electronics,
/// transportation, household, packaging, other
/// ```
///
/// Categories are stored as lowercase text and decoded through
/// `TryFrom<String>`, so a row can never carry a value outside the set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a string does not name a known category
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Object category of an emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Beverage,
    Clothing,
    Electronics,
    Transportation,
    Household,
    Packaging,
    #[default]
    Other,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Beverage,
        Category::Clothing,
        Category::Electronics,
        Category::Transportation,
        Category::Household,
        Category::Packaging,
        Category::Other,
    ];

    /// Converts category to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Beverage => "beverage",
            Category::Clothing => "clothing",
            Category::Electronics => "electronics",
            Category::Transportation => "transportation",
            Category::Household => "household",
            Category::Packaging => "packaging",
            Category::Other => "other",
        }
    }

    /// Capitalized name shown on dashboards ("Food", "Other")
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Beverage => "Beverage",
            Category::Clothing => "Clothing",
            Category::Electronics => "Electronics",
            Category::Transportation => "Transportation",
            Category::Household => "Household",
            Category::Packaging => "Packaging",
            Category::Other => "Other",
        }
    }

    /// Fixed chart color for the category
    pub fn color(&self) -> &'static str {
        match self {
            Category::Food => "#10b981",
            Category::Beverage => "#14b8a6",
            Category::Clothing => "#0d9488",
            Category::Electronics => "#059669",
            Category::Transportation => "#047857",
            Category::Household => "#065f46",
            Category::Packaging => "#064e3b",
            Category::Other => "#6b7280",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_string_conversion() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("gadgets".parse::<Category>().is_err());
    }

    #[test]
    fn test_beverage_is_distinct_from_food() {
        assert_ne!(Category::Beverage, Category::Food);
        assert_ne!(Category::Beverage.color(), Category::Food.color());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&Category::Transportation).unwrap();
        assert_eq!(json, "\"transportation\"");

        let parsed: Category = serde_json::from_str("\"packaging\"").unwrap();
        assert_eq!(parsed, Category::Packaging);

        assert!(serde_json::from_str::<Category>("\"gadgets\"").is_err());
    }

    #[test]
    fn test_default_is_other() {
        assert_eq!(Category::default(), Category::Other);
        assert_eq!(Category::Other.display_name(), "Other");
    }
}
