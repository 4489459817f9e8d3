//! Chapter System - Priority-Ordered Sections

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::fields::{ConditionFields, Layered};
use crate::value::keyed;

/// Fields shared by chapters (as defaults) and sections (as overrides).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionFields {
    /// Named condition record.
    #[serde(default, deserialize_with = "condition_key", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Named theme record.
    #[serde(default, deserialize_with = "theme_key", skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, deserialize_with = "show_key", skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    /// Inline condition fields.
    #[serde(flatten)]
    pub conditions: ConditionFields,
}

impl SectionFields {
    /// Rules are shown unless explicitly hidden.
    pub fn is_shown(&self) -> bool {
        self.show.unwrap_or(true)
    }
}

impl Layered for SectionFields {
    fn layer(&mut self, upper: &Self) {
        if upper.condition.is_some() {
            self.condition = upper.condition.clone();
        }
        if upper.theme.is_some() {
            self.theme = upper.theme.clone();
        }
        if upper.show.is_some() {
            self.show = upper.show;
        }
        self.conditions.layer(&upper.conditions);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default, deserialize_with = "priority_key")]
    pub priority: i64,
    #[serde(default, alias = "sections", deserialize_with = "section_key")]
    pub section: IndexMap<String, SectionFields>,
    /// Defaults applied underneath every section.
    #[serde(flatten)]
    pub defaults: SectionFields,
}

impl Chapter {
    /// Effective fields of one section: chapter defaults under section overrides.
    pub fn effective(&self, section: &SectionFields) -> SectionFields {
        self.defaults.layered(section)
    }
}

fn condition_key<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    keyed("condition", d)
}

fn theme_key<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    keyed("theme", d)
}

fn show_key<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    keyed("show", d)
}

fn priority_key<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    keyed("priority", d)
}

fn section_key<'de, D>(d: D) -> Result<IndexMap<String, SectionFields>, D::Error>
where
    D: Deserializer<'de>,
{
    keyed("section", d)
}

/// Chapters in declaration order.
pub type ChapterTable = IndexMap<String, Chapter>;

/// Chapters sorted by ascending priority; ties keep declaration order.
pub fn ordered(chapters: &ChapterTable) -> Vec<(&str, &Chapter)> {
    let mut ordered: Vec<_> = chapters.iter().map(|(n, c)| (n.as_str(), c)).collect();
    ordered.sort_by_key(|(_, chapter)| chapter.priority);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chapter_defaults_under_section() {
        let chapter: Chapter = serde_json::from_value(json!({
            "priority": 10,
            "theme": "currency",
            "class": "Currency",
            "show": true,
            "section": {
                "top": {"type": ["Mirror of Kalandra"], "theme": "top"},
                "rest": {"show": false},
            },
        }))
        .unwrap();

        let top = chapter.effective(&chapter.section["top"]);
        assert_eq!(top.theme.as_deref(), Some("top"));
        assert_eq!(top.conditions.class, Some("Currency".into()));
        assert!(top.is_shown());

        let rest = chapter.effective(&chapter.section["rest"]);
        assert_eq!(rest.theme.as_deref(), Some("currency"));
        assert!(!rest.is_shown());
    }

    #[test]
    fn test_priority_defaults_to_zero() {
        let chapter: Chapter = serde_json::from_value(json!({"section": {}})).unwrap();
        assert_eq!(chapter.priority, 0);
        assert!(chapter.defaults.is_shown());
    }

    #[test]
    fn test_shape_errors_name_their_key() {
        let err = serde_json::from_value::<Chapter>(json!({"priority": 1.5})).unwrap_err();
        assert!(err.to_string().contains("field \"priority\""));

        let err = serde_json::from_value::<Chapter>(json!({"show": "yes"})).unwrap_err();
        assert!(err.to_string().contains("field \"show\""));

        let err = serde_json::from_value::<Chapter>(json!({
            "section": {"top": {"class": ["Currency", null]}},
        }))
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("field \"section\""));
        assert!(message.contains("field \"class\""));
    }

    #[test]
    fn test_ordering_is_stable() {
        let chapters: ChapterTable = serde_json::from_value(json!({
            "late": {"priority": 50},
            "first": {"priority": 10},
            "second": {"priority": 10},
        }))
        .unwrap();
        let names: Vec<_> = ordered(&chapters).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["first", "second", "late"]);
    }

    #[test]
    fn test_sections_keep_declaration_order() {
        let chapter: Chapter = serde_json::from_value(json!({
            "section": {"z": {}, "a": {}, "m": {}},
        }))
        .unwrap();
        let names: Vec<_> = chapter.section.keys().cloned().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
