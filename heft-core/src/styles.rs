//! Style Table - category -> identifier -> literal

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::source::Fragment;
use crate::value::FieldValue;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleTable {
    categories: IndexMap<String, IndexMap<String, FieldValue>>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, category: &str, identifier: &str) -> Option<&FieldValue> {
        self.categories.get(category)?.get(identifier)
    }

    /// Set one identifier; a later insert overwrites an earlier one.
    pub fn insert(&mut self, category: &str, identifier: &str, value: FieldValue) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(identifier.to_string(), value);
    }

    /// Merge one style fragment into the table.
    ///
    /// Categories are merged identifier by identifier. Entries that are not
    /// a category object, or whose value is not a scalar or scalar list,
    /// are skipped.
    pub fn merge_fragment(&mut self, fragment: &Fragment) {
        for (category, identifiers) in fragment {
            let Some(identifiers) = identifiers.as_object() else {
                tracing::debug!(category = %category, "style entry is not a category, skipping");
                continue;
            };
            for (identifier, literal) in identifiers {
                match serde_json::from_value::<FieldValue>(literal.clone()) {
                    Ok(value) => self.insert(category, identifier, value),
                    Err(_) => tracing::debug!(
                        category = %category,
                        identifier = %identifier,
                        "style literal is not a scalar or list, skipping"
                    ),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: serde_json::Value) -> Fragment {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lookup() {
        let mut table = StyleTable::new();
        table.merge_fragment(&fragment(json!({
            "text": {"white": "255 255 255 255"},
            "size": {"large": 45},
        })));
        assert_eq!(table.lookup("size", "large"), Some(&45i64.into()));
        assert_eq!(table.lookup("size", "small"), None);
        assert_eq!(table.lookup("border", "white"), None);
    }

    #[test]
    fn test_later_fragment_overwrites_within_category() {
        let mut table = StyleTable::new();
        table.merge_fragment(&fragment(json!({"text": {"white": "250 250 250", "red": "255 0 0"}})));
        table.merge_fragment(&fragment(json!({"text": {"white": "255 255 255"}})));
        assert_eq!(table.lookup("text", "white"), Some(&"255 255 255".into()));
        assert_eq!(table.lookup("text", "red"), Some(&"255 0 0".into()));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_non_category_skipped() {
        let mut table = StyleTable::new();
        table.merge_fragment(&fragment(json!({"version": 3, "icon": {"star": {"nested": 1}}})));
        assert!(table.is_empty());
    }
}
