//! Field values
//!
//! `InputValue` is what callers hand in (a number or a piece of text).
//! `Value` is what a validated record holds: validation in
//! [`crate::model::validate_value`] is the only place an `InputValue`
//! becomes a `Value`.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::schema::FieldName;

/// Escape literals a numeric field may accept in place of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// `autosize`: sized by the simulation engine
    Autosize,
    /// `autocalculate`: derived by the simulation engine
    Autocalculate,
}

impl Sentinel {
    /// Recognizes a sentinel literal, ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("autosize") {
            Some(Sentinel::Autosize)
        } else if text.eq_ignore_ascii_case("autocalculate") {
            Some(Sentinel::Autocalculate)
        } else {
            None
        }
    }

    /// Canonical spelling used when writing IDF text
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::Autosize => "Autosize",
            Sentinel::Autocalculate => "Autocalculate",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Numeric(f64),
    Text(String),
    Sentinel(Sentinel),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sentinel(&self) -> Option<Sentinel> {
        match self {
            Value::Sentinel(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Sentinel(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Numeric(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Sentinel(s) => serializer.serialize_str(s.as_str()),
        }
    }
}

/// A raw, not yet validated, field value.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    /// Converts a JSON scalar. Anything other than a number or a string is rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(InputValue::Number),
            serde_json::Value::String(s) => Some(InputValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Empty or whitespace-only text. Treated as an absent input.
    pub fn is_blank(&self) -> bool {
        matches!(self, InputValue::Text(s) if s.trim().is_empty())
    }

    /// Short kind name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            InputValue::Number(_) => "Numeric",
            InputValue::Text(_) => "String",
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Number(n) => write!(f, "{}", n),
            InputValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for InputValue {
    fn from(n: f64) -> Self {
        InputValue::Number(n)
    }
}

impl From<i32> for InputValue {
    fn from(n: i32) -> Self {
        InputValue::Number(f64::from(n))
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Text(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Text(s)
    }
}

/// Field name to raw value mapping used to instantiate a record.
///
/// Keys are compared case-insensitively. Inserting the same field twice keeps
/// the last value.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    values: HashMap<FieldName, InputValue>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<FieldName>, value: impl Into<InputValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<FieldName>, value: impl Into<InputValue>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &FieldName) -> Option<&InputValue> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &FieldName) -> bool {
        self.values.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &InputValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builds inputs from a JSON object of scalars.
    ///
    /// Returns the offending key if a value is neither a number nor a string.
    pub fn from_json_object(
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, String> {
        let mut inputs = Inputs::new();
        for (key, value) in object {
            let value = InputValue::from_json(value).ok_or_else(|| key.clone())?;
            inputs.insert(key.as_str(), value);
        }
        Ok(inputs)
    }
}

impl<K, V> FromIterator<(K, V)> for Inputs
where
    K: Into<FieldName>,
    V: Into<InputValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut inputs = Inputs::new();
        for (k, v) in iter {
            inputs.insert(k, v);
        }
        inputs
    }
}
