//! Field Values - Scalar/List Union
//!
//! Every condition and action field is either a single scalar or a list of
//! scalars. Both flow through [`format_entry`], which is the only place a
//! field turns into directive text.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// A single text, numeric or boolean value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // The consumer only understands the capitalised literals.
            Scalar::Bool(true) => f.write_str("True"),
            Scalar::Bool(false) => f.write_str("False"),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a text, number or boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
        Ok(Scalar::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
        Ok(Scalar::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
        Ok(Scalar::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
        Number::from_f64(v)
            .map(Scalar::Number)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
        Ok(Scalar::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Scalar, E> {
        Ok(Scalar::Text(v))
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// Value of one domain field as read from a fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl FieldValue {
    /// View the value as a list; a scalar becomes a one-element list.
    pub fn items(&self) -> &[Scalar] {
        match self {
            FieldValue::Scalar(s) => std::slice::from_ref(s),
            FieldValue::List(items) => items,
        }
    }

    /// Directive text for this value, quoting every element when `escaped`.
    pub fn format(&self, escaped: bool) -> String {
        self.items()
            .iter()
            .map(|item| {
                if escaped {
                    format!("\"{}\"", item)
                } else {
                    item.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Identifier used to look this value up in the style table.
    pub fn identifier(&self) -> String {
        self.format(false)
    }
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a text, number or boolean, or a list of them")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldValue, E> {
        ScalarVisitor.visit_bool(v).map(FieldValue::Scalar)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldValue, E> {
        ScalarVisitor.visit_i64(v).map(FieldValue::Scalar)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldValue, E> {
        ScalarVisitor.visit_u64(v).map(FieldValue::Scalar)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldValue, E> {
        ScalarVisitor.visit_f64(v).map(FieldValue::Scalar)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
        ScalarVisitor.visit_str(v).map(FieldValue::Scalar)
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
        ScalarVisitor.visit_string(v).map(FieldValue::Scalar)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FieldValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Scalar>()? {
            items.push(item);
        }
        Ok(FieldValue::List(items))
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Scalar(s.into())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Scalar(n.into())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Scalar(b.into())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::List(values.into_iter().map(Scalar::from).collect())
    }
}

/// Ordered directive name to formatted value mapping.
pub type Directives = indexmap::IndexMap<&'static str, String>;

/// Insert `name` into `directives` when a value is present.
///
/// An absent value adds nothing; it never produces an empty directive.
pub fn format_entry(
    directives: &mut Directives,
    name: &'static str,
    value: Option<&FieldValue>,
    escaped: bool,
) {
    if let Some(value) = value {
        directives.insert(name, value.format(escaped));
    }
}

/// Prefix a deserialization error with the fragment key it came from.
pub(crate) fn key_error<E: de::Error>(key: &str, err: E) -> E {
    E::custom(format_args!("field \"{}\": {}", key, err))
}

/// Deserialize one keyed value, naming `key` in any error.
pub(crate) fn keyed<'de, T, D>(key: &str, deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map_err(|e| key_error(key, e))
}
