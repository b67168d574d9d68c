//! Key findings returned by the backend
//!
//! The backend defines the shape below the three nesting levels
//! (category -> subcategory -> field), so values are kept as loosely typed
//! text or lists. Backend key order is preserved for display.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Leaf value of a finding field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindingValue {
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl fmt::Display for FindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingValue::Text(text) => f.write_str(text),
            FindingValue::List(items) => f.write_str(&items.join(", ")),
            FindingValue::Other(serde_json::Value::Null) => Ok(()),
            FindingValue::Other(value) => write!(f, "{}", value),
        }
    }
}

pub type Subcategory = IndexMap<String, FindingValue>;
pub type Category = IndexMap<String, Subcategory>;

/// category -> subcategory -> field -> value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyFindings(pub IndexMap<String, Category>);

/// One field with its position in the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindingEntry<'a> {
    pub category: &'a str,
    pub subcategory: &'a str,
    pub label: String,
    pub value: &'a FindingValue,
}

impl KeyFindings {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.0.iter().map(|(name, category)| (name.as_str(), category))
    }

    /// Every leaf field in backend order
    pub fn entries(&self) -> Vec<FindingEntry<'_>> {
        let mut entries = Vec::new();
        for (category, subcategories) in self.0.iter() {
            for (subcategory, fields) in subcategories.iter() {
                for (key, value) in fields.iter() {
                    entries.push(FindingEntry {
                        category: category.as_str(),
                        subcategory: subcategory.as_str(),
                        label: field_label(key),
                        value,
                    });
                }
            }
        }
        entries
    }

    /// Render as markdown, one heading per category and subcategory
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (category, subcategories) in self.0.iter() {
            out.push_str(&format!("### {}\n\n", category));
            for (subcategory, fields) in subcategories.iter() {
                out.push_str(&format!("#### {}\n\n", subcategory));
                for (key, value) in fields.iter() {
                    match value {
                        FindingValue::List(items) => {
                            out.push_str(&format!("**{}:**\n", field_label(key)));
                            for item in items {
                                out.push_str(&format!("- {}\n", item));
                            }
                        }
                        other => {
                            out.push_str(&format!("**{}:** {}\n", field_label(key), other));
                        }
                    }
                }
                out.push('\n');
            }
        }
        out
    }
}

/// Field keys are shown with their first character upper-cased
pub fn field_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
