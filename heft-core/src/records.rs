//! Record Resolver - Extends Chains for Themes and Conditions
//!
//! A named record may extend one or more parents from the same table.
//! Resolution folds the parents in order (later parents win) and puts the
//! record's own fields on top. Each entry moves through
//! `Unresolved -> Resolving -> Resolved`; while an entry is `Resolving`,
//! a reference back to it yields its own fields without their parents,
//! which is what terminates cyclic chains.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::fields::Layered;
use crate::validation::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::value::keyed;

/// Parent reference: one name or an ordered list of names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    pub fn into_names(self) -> Vec<String> {
        match self {
            Extends::One(name) => vec![name],
            Extends::Many(names) => names,
        }
    }
}

/// A theme or condition as written in a fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRecord<R> {
    #[serde(default, deserialize_with = "extends_key", skip_serializing_if = "Option::is_none")]
    pub extends: Option<Extends>,
    #[serde(flatten)]
    pub fields: R,
}

impl<R> NamedRecord<R> {
    pub fn new(fields: R) -> Self {
        Self { extends: None, fields }
    }

    pub fn extending(fields: R, extends: Extends) -> Self {
        Self {
            extends: Some(extends),
            fields,
        }
    }
}

fn extends_key<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Extends>, D::Error> {
    keyed("extends", d)
}

#[derive(Debug, Clone)]
enum Slot<R> {
    Unresolved(NamedRecord<R>),
    Resolving(R),
    Resolved(R),
}

/// Named records of one kind, resolved lazily and memoized in place.
#[derive(Debug, Clone)]
pub struct RecordTable<R> {
    kind: &'static str,
    slots: IndexMap<String, Slot<R>>,
}

impl<R: Layered> RecordTable<R> {
    /// `kind` names the table in diagnostics ("theme", "condition").
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slots: IndexMap::new(),
        }
    }

    /// Add or replace a record. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, record: NamedRecord<R>) {
        self.slots.insert(name.into(), Slot::Unresolved(record));
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `name` has been flattened already.
    pub fn is_resolved(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Slot::Resolved(_)))
    }

    /// Resolve `name`, flattening its extends chain.
    ///
    /// Returns `None` (and records a diagnostic) when the name is unknown.
    pub fn resolve(&mut self, name: &str, diagnostics: &mut Diagnostics) -> Option<R> {
        let Some(slot) = self.slots.get_mut(name) else {
            diagnostics.record(Diagnostic::warning(
                DiagnosticKind::MissingRecord,
                name,
                format!("{} \"{}\" not defined", self.kind, name),
            ));
            return None;
        };

        let record = match std::mem::replace(slot, Slot::Resolving(R::default())) {
            Slot::Resolved(fields) => {
                *slot = Slot::Resolved(fields.clone());
                return Some(fields);
            }
            Slot::Resolving(fields) => {
                tracing::debug!(kind = self.kind, record = name, "cyclic reference, using own fields");
                *slot = Slot::Resolving(fields.clone());
                return Some(fields);
            }
            Slot::Unresolved(record) => {
                // extends is consumed here; re-entry sees only the own fields
                *slot = Slot::Resolving(record.fields.clone());
                record
            }
        };

        let own = record.fields;
        let parents = record.extends.map(Extends::into_names).unwrap_or_default();

        let resolved = if parents.is_empty() {
            tracing::debug!(kind = self.kind, record = name, "found");
            own
        } else {
            let mut merged = R::default();
            for parent in &parents {
                tracing::debug!(kind = self.kind, record = name, parent = %parent, "extends");
                if !self.slots.contains_key(parent.as_str()) {
                    diagnostics.record(Diagnostic::warning(
                        DiagnosticKind::MissingParent,
                        name,
                        format!("{} \"{}\" extends undefined \"{}\"", self.kind, name, parent),
                    ));
                    continue;
                }
                if let Some(fields) = self.resolve(parent, diagnostics) {
                    merged.layer(&fields);
                }
            }
            merged.layer(&own);
            tracing::debug!(kind = self.kind, record = name, "found and updated");
            merged
        };

        self.slots
            .insert(name.to_string(), Slot::Resolved(resolved.clone()));
        Some(resolved)
    }

    /// Resolve every record in declaration order.
    pub fn resolve_all(&mut self, diagnostics: &mut Diagnostics) {
        let names: Vec<String> = self.slots.keys().cloned().collect();
        for name in names {
            self.resolve(&name, diagnostics);
        }
    }
}
