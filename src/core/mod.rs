pub mod preview;
pub mod validation;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The six waste classes the remote model is trained on.
///
/// The service is the source of truth for labels; anything it returns that is
/// not in this set is still accepted and rendered with a fallback display,
/// which is why most code carries the raw label alongside the parsed variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Glass,
    Paper,
    Cardboard,
    Plastic,
    Metal,
    Trash,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Glass,
        Category::Paper,
        Category::Cardboard,
        Category::Plastic,
        Category::Metal,
        Category::Trash,
    ];

    /// Parses a service label, ignoring case. Returns `None` for labels
    /// outside the known set.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "glass" => Some(Category::Glass),
            "paper" => Some(Category::Paper),
            "cardboard" => Some(Category::Cardboard),
            "plastic" => Some(Category::Plastic),
            "metal" => Some(Category::Metal),
            "trash" => Some(Category::Trash),
            _ => None,
        }
    }

    /// The canonical lowercase label, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Glass => "glass",
            Category::Paper => "paper",
            Category::Cardboard => "cardboard",
            Category::Plastic => "plastic",
            Category::Metal => "metal",
            Category::Trash => "trash",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of one successful classify request. Immutable once built.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassificationResult {
    /// Raw label exactly as the service returned it (lookup key).
    pub label: String,
    /// Parsed category, `None` when the service returned an unknown label.
    pub category: Option<Category>,
    /// Probability mass assigned to `label`, a fraction in `[0, 1]`.
    pub confidence: f64,
    /// Per-category probabilities. May be empty when the service sent no
    /// detail; values are trusted as-is (the service owns that contract).
    pub probabilities: BTreeMap<String, f64>,
}

impl ClassificationResult {
    /// Label with normalized casing for display ("plastic" -> "Plastic").
    /// The raw `label` stays untouched for anything keyed by category.
    pub fn display_name(&self) -> String {
        let mut chars = self.label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
