//! Rule Assembler - Sections to Show/Hide Blocks
//!
//! Precedence, lowest first: chapter defaults, section overrides, resolved
//! named condition. Theme fields are style identifiers and are looked up in
//! the style table with the field name as category.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{Chapter, SectionFields};
use crate::contrast::Color;
use crate::fields::{ConditionFields, Layered, ThemeFields};
use crate::records::RecordTable;
use crate::styles::StyleTable;
use crate::validation::{Diagnostic, DiagnosticKind, Diagnostics, RuleColors, Validator};
use crate::value::{format_entry, Directives};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Show,
    Hide,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Show => f.write_str("Show"),
            Visibility::Hide => f.write_str("Hide"),
        }
    }
}

/// A resolved, ready-to-render block.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub visibility: Visibility,
    /// Theme name for the block header, if the section named one.
    pub theme: Option<String>,
    pub conditions: Directives,
    pub actions: Directives,
}

impl Rule {
    /// A rule with nothing to match and nothing to do is not rendered.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.actions.is_empty()
    }
}

/// Tables consulted while assembling rules.
pub struct Assembler<'a> {
    pub conditions: &'a mut RecordTable<ConditionFields>,
    pub themes: &'a mut RecordTable<ThemeFields>,
    pub styles: &'a StyleTable,
    validator: Validator,
}

impl<'a> Assembler<'a> {
    pub fn new(
        conditions: &'a mut RecordTable<ConditionFields>,
        themes: &'a mut RecordTable<ThemeFields>,
        styles: &'a StyleTable,
    ) -> Self {
        Self {
            conditions,
            themes,
            styles,
            validator: Validator::new(),
        }
    }

    /// Assemble one section of `chapter` into a rule.
    ///
    /// Never fails: unresolved references and missing styles are recorded
    /// in `diagnostics` and simply contribute nothing.
    pub fn assemble(
        &mut self,
        chapter: &Chapter,
        name: &str,
        section: &SectionFields,
        diagnostics: &mut Diagnostics,
    ) -> Rule {
        let effective = chapter.effective(section);

        let mut conditions = effective.conditions.clone();
        if let Some(reference) = &effective.condition {
            if let Some(resolved) = self.conditions.resolve(reference, diagnostics) {
                conditions.layer(&resolved);
            }
        }

        let theme = match &effective.theme {
            Some(reference) => self.themes.resolve(reference, diagnostics).unwrap_or_default(),
            None => ThemeFields::default(),
        };

        let mut actions = Directives::new();
        let mut colors = RuleColors::default();
        for entry in theme.entries() {
            let Some(identifier) = entry.value.map(|v| v.identifier()) else {
                continue;
            };
            let Some(literal) = self.styles.lookup(entry.key, &identifier) else {
                diagnostics.record(Diagnostic::warning(
                    DiagnosticKind::MissingStyle,
                    name,
                    format!(
                        "section \"{}\": style \"{}\" not defined for \"{}\"",
                        name, identifier, entry.key
                    ),
                ));
                continue;
            };
            format_entry(&mut actions, entry.directive, Some(literal), entry.escaped);

            let color = Color::from_value(literal);
            match entry.key {
                "text" => colors.text = color,
                "border" => colors.border = color,
                "background" => colors.background = color,
                _ => {}
            }
        }

        self.validator.validate(name, &colors, diagnostics);

        Rule {
            visibility: if effective.is_shown() {
                Visibility::Show
            } else {
                Visibility::Hide
            },
            theme: effective.theme.clone(),
            conditions: conditions.directives(),
            actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Extends, NamedRecord};
    use serde_json::json;

    struct Fixture {
        conditions: RecordTable<ConditionFields>,
        themes: RecordTable<ThemeFields>,
        styles: StyleTable,
    }

    fn fixture() -> Fixture {
        let mut conditions = RecordTable::new("condition");
        conditions.insert(
            "endgame",
            NamedRecord::new(serde_json::from_value(json!({"itemLevel": [">=", 75]})).unwrap()),
        );

        let mut themes = RecordTable::new("theme");
        themes.insert(
            "base",
            NamedRecord::new(
                serde_json::from_value(json!({"text": "white", "background": "black"})).unwrap(),
            ),
        );
        themes.insert(
            "loud",
            NamedRecord::extending(
                serde_json::from_value(json!({"size": "large", "sound": "ping"})).unwrap(),
                Extends::One("base".into()),
            ),
        );
        themes.insert(
            "murky",
            NamedRecord::new(
                serde_json::from_value(json!({"text": "gray", "background": "darkgray"})).unwrap(),
            ),
        );

        let mut styles = StyleTable::new();
        styles.merge_fragment(
            &serde_json::from_value(json!({
                "text": {"white": "255 255 255", "gray": "120 120 120"},
                "background": {"black": "0 0 0", "darkgray": "128 128 128"},
                "size": {"large": 45},
            }))
            .unwrap(),
        );

        Fixture {
            conditions,
            themes,
            styles,
        }
    }

    fn chapter(value: serde_json::Value) -> Chapter {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_rule() {
        let mut f = fixture();
        let mut d = Diagnostics::new();
        let ch = chapter(json!({"class": "Currency", "section": {
            "s": {"condition": "endgame", "theme": "loud"}
        }}));
        let mut asm = Assembler::new(&mut f.conditions, &mut f.themes, &f.styles);
        let rule = asm.assemble(&ch, "s", &ch.section["s"], &mut d);

        assert_eq!(rule.visibility, Visibility::Show);
        assert_eq!(rule.conditions["ItemLevel"], ">= 75");
        assert_eq!(rule.conditions["Class"], r#""Currency""#);
        assert_eq!(rule.actions["SetTextColor"], "255 255 255");
        assert_eq!(rule.actions["SetBackgroundColor"], "0 0 0");
        assert_eq!(rule.actions["SetFontSize"], "45");
        // "ping" is not in the style table
        assert!(!rule.actions.contains_key("PlayAlertSoundPositional"));
        assert_eq!(d.count(DiagnosticKind::MissingStyle), 1);
        assert_eq!(d.count(DiagnosticKind::LowContrast), 0);
    }

    #[test]
    fn test_named_condition_overrides_inline() {
        let mut f = fixture();
        let mut d = Diagnostics::new();
        let ch = chapter(json!({"itemLevel": 1, "section": {
            "s": {"condition": "endgame", "quality": 20}
        }}));
        let mut asm = Assembler::new(&mut f.conditions, &mut f.themes, &f.styles);
        let rule = asm.assemble(&ch, "s", &ch.section["s"], &mut d);
        assert_eq!(rule.conditions["ItemLevel"], ">= 75");
        assert_eq!(rule.conditions["Quality"], "20");
    }

    #[test]
    fn test_absent_condition_is_warned() {
        let mut f = fixture();
        let mut d = Diagnostics::new();
        let ch = chapter(json!({"section": {"s": {"condition": "ghost", "theme": "base"}}}));
        let mut asm = Assembler::new(&mut f.conditions, &mut f.themes, &f.styles);
        let rule = asm.assemble(&ch, "s", &ch.section["s"], &mut d);
        assert!(rule.conditions.is_empty());
        assert!(!rule.actions.is_empty());
        assert_eq!(d.count(DiagnosticKind::MissingRecord), 1);
    }

    #[test]
    fn test_both_absent_is_empty() {
        let mut f = fixture();
        let mut d = Diagnostics::new();
        let ch = chapter(json!({"section": {"s": {"condition": "ghost", "theme": "phantom"}}}));
        let mut asm = Assembler::new(&mut f.conditions, &mut f.themes, &f.styles);
        let rule = asm.assemble(&ch, "s", &ch.section["s"], &mut d);
        assert!(rule.is_empty());
        assert_eq!(d.count(DiagnosticKind::MissingRecord), 2);
    }

    #[test]
    fn test_low_contrast_advisory_only() {
        let mut f = fixture();
        let mut d = Diagnostics::new();
        let ch = chapter(json!({"section": {"s": {"theme": "murky", "show": false}}}));
        let mut asm = Assembler::new(&mut f.conditions, &mut f.themes, &f.styles);
        let rule = asm.assemble(&ch, "s", &ch.section["s"], &mut d);
        assert_eq!(rule.visibility, Visibility::Hide);
        assert_eq!(rule.actions["SetTextColor"], "120 120 120");
        assert_eq!(d.count(DiagnosticKind::LowContrast), 1);
    }
}
