use crate::error::OrganizerError;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// One canonical category and the keywords that recognize it.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Ordered keyword table driving folder-name recognition.
///
/// Declaration order is the tie-break for names that could match more than
/// one category, so the table keeps its source order instead of sorting.
#[derive(Debug, Clone, Default)]
pub struct ClassificationTable {
    rules: Vec<CategoryRule>,
}

/// Lower-case `text` and drop everything that is not an ASCII letter or
/// digit. Both folder names and keywords go through this before matching,
/// so comparisons are case, punctuation and accent insensitive.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

impl ClassificationTable {
    pub fn from_rules(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Load a `category -> [keyword, ...]` JSON object, preserving the
    /// declaration order of its keys.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parsed: serde_json::Map<String, Value> = serde_json::from_str(&raw)
            .map_err(|err| OrganizerError::InvalidTable(format!("{}: {err}", path.display())))?;

        let mut rules = Vec::with_capacity(parsed.len());
        for (category, value) in parsed {
            let Some(items) = value.as_array() else {
                return Err(OrganizerError::InvalidTable(format!(
                    "category `{category}` must map to a list of keywords"
                ))
                .into());
            };
            let mut keywords = Vec::with_capacity(items.len());
            for item in items {
                let Some(keyword) = item.as_str() else {
                    return Err(OrganizerError::InvalidTable(format!(
                        "category `{category}` contains a non-string keyword"
                    ))
                    .into());
                };
                keywords.push(keyword.to_string());
            }
            rules.push(CategoryRule { category, keywords });
        }

        if rules.is_empty() {
            return Err(OrganizerError::InvalidTable(format!(
                "{}: table defines no categories",
                path.display()
            ))
            .into());
        }

        Ok(Self { rules })
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.category.as_str())
    }

    /// Map a raw folder name to its canonical category.
    ///
    /// First category, in table order, with any keyword whose normalized
    /// form is a substring of the normalized name. Substring matching is
    /// intentional: source names are irregular abbreviations.
    pub fn classify(&self, name: &str) -> Option<&str> {
        let normalized = normalize(name);
        for rule in &self.rules {
            for keyword in &rule.keywords {
                let needle = normalize(keyword);
                if needle.is_empty() {
                    continue;
                }
                if normalized.contains(&needle) {
                    return Some(rule.category.as_str());
                }
            }
        }
        None
    }
}
