//! Record type descriptors
//!
//! A `RecordSchema` is the template every record of that type is
//! instantiated from. Field order is positional: the n-th field of the
//! schema is the n-th value slot in IDF text.

use serde::Serialize;

use super::names::{FieldName, TypeName};
use crate::value::{Sentinel, Value};

/// Value kind of a field, from its `A<n>` / `N<n>` slot prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// `N<n>` slots
    Numeric,
    /// `A<n>` slots
    Alpha,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Numeric => "Numeric",
            FieldKind::Alpha => "String",
        }
    }
}

/// The `\type` directive of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Integer,
    Real,
    Alpha,
    Choice,
    ObjectList,
    ExternalList,
    Node,
}

impl FieldType {
    /// Parses the directive argument, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "integer" => Some(FieldType::Integer),
            "real" => Some(FieldType::Real),
            "alpha" => Some(FieldType::Alpha),
            "choice" => Some(FieldType::Choice),
            "object-list" => Some(FieldType::ObjectList),
            "external-list" => Some(FieldType::ExternalList),
            "node" => Some(FieldType::Node),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Real => "real",
            FieldType::Alpha => "alpha",
            FieldType::Choice => "choice",
            FieldType::ObjectList => "object-list",
            FieldType::ExternalList => "external-list",
            FieldType::Node => "node",
        }
    }
}

/// One positional slot of a record type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: FieldName,
    /// Slot label from the dictionary, e.g. `A1` or `N3`
    pub slot: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Inclusive lower bound. Strict bounds are stored nudged by 1e-6.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound. Strict bounds are stored nudged by 1e-6.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    pub autosizable: bool,
    pub autocalculatable: bool,
    pub begin_extensible: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_based_on_field: Option<String>,
    pub retaincase: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub object_list: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_list: Option<String>,
    pub deprecated: bool,
}

impl FieldSchema {
    /// Creates a field with no constraints beyond its kind.
    pub fn new(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            slot: String::new(),
            kind,
            field_type: None,
            required: false,
            default: None,
            minimum: None,
            maximum: None,
            keys: Vec::new(),
            autosizable: false,
            autocalculatable: false,
            begin_extensible: false,
            note: String::new(),
            units: None,
            ip_units: None,
            units_based_on_field: None,
            retaincase: false,
            object_list: Vec::new(),
            reference: Vec::new(),
            external_list: None,
            deprecated: false,
        }
    }

    /// Create a required alpha field
    pub fn required_alpha(name: impl Into<FieldName>) -> Self {
        Self {
            required: true,
            ..Self::new(name, FieldKind::Alpha)
        }
    }

    /// Create an optional alpha field
    pub fn optional_alpha(name: impl Into<FieldName>) -> Self {
        Self::new(name, FieldKind::Alpha)
    }

    /// Create an optional numeric field
    pub fn numeric(name: impl Into<FieldName>) -> Self {
        Self::new(name, FieldKind::Numeric)
    }

    /// Create a choice field over the given keys
    pub fn choice(name: impl Into<FieldName>, keys: &[&str]) -> Self {
        Self {
            field_type: Some(FieldType::Choice),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::new(name, FieldKind::Alpha)
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == FieldKind::Numeric
    }

    pub fn is_choice(&self) -> bool {
        self.field_type == Some(FieldType::Choice)
    }

    /// Whether this field accepts the given escape literal.
    pub fn accepts(&self, sentinel: Sentinel) -> bool {
        match sentinel {
            Sentinel::Autosize => self.autosizable,
            Sentinel::Autocalculate => self.autocalculatable,
        }
    }

    /// Case-insensitive membership in the enumerated keys.
    pub fn has_key(&self, value: &str) -> bool {
        self.keys.iter().any(|k| k.eq_ignore_ascii_case(value.trim()))
    }

    /// One help line describing this field.
    pub fn help_line(&self, last: bool) -> String {
        let terminator = if last { ";" } else { "," };
        let default = match &self.default {
            Some(d) => d.to_string(),
            None => "none".to_string(),
        };
        let required = if self.required { "REQUIRED" } else { "NOT REQUIRED" };
        let field_type = self
            .field_type
            .map(|t| t.as_str())
            .unwrap_or_else(|| self.kind.type_name());

        let mut line = format!(
            "    {}    !- {} (Type: {} | Default: {} | {}",
            terminator, self.name, field_type, default, required
        );
        if self.is_choice() {
            line.push_str(&format!(" | Choices: [{}]", self.keys.join(", ")));
        }
        if let Some(min) = self.minimum {
            line.push_str(&format!(" | Min: {}", min));
        }
        if let Some(max) = self.maximum {
            line.push_str(&format!(" | Max: {}", max));
        }
        line.push(')');
        line
    }
}

/// One record type of the dictionary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSchema {
    pub name: TypeName,
    pub fields: Vec<FieldSchema>,
    /// At most one instance per store
    pub unique: bool,
    /// At least one instance per store
    pub required: bool,
    /// Positional slots always written, even when unset
    pub min_fields: usize,
    /// Size of the repeating field block; 0 when not extensible
    pub extensible: usize,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub memo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub fields_as_indicated: bool,
}

impl RecordSchema {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            unique: false,
            required: false,
            min_fields: 0,
            extensible: 0,
            memo: String::new(),
            group: None,
            format: None,
            fields_as_indicated: false,
        }
    }

    /// Builder-style field append.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name.matches(name))
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.field_index(name).map(|i| &self.fields[i])
    }

    /// Index of the field that carries record identity, if any.
    pub fn name_field_index(&self) -> Option<usize> {
        self.field_index("name")
    }

    /// The repeating block of an extensible type, starting at the field
    /// marked `\begin-extensible`.
    pub fn extensible_group(&self) -> &[FieldSchema] {
        if self.extensible == 0 {
            return &[];
        }
        match self.fields.iter().position(|f| f.begin_extensible) {
            Some(start) => {
                let end = (start + self.extensible).min(self.fields.len());
                &self.fields[start..end]
            }
            None => &[],
        }
    }

    /// Help text: memo, then a template record with one line per field.
    pub fn help_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("!- {}", self.name)];
        if !self.memo.is_empty() {
            lines.push(format!("!- {}", self.memo));
        }
        if let Some(group) = &self.group {
            lines.push(format!("!- Group: {}", group));
        }
        lines.push(String::new());
        if self.fields.is_empty() {
            lines.push(format!("{};", self.name));
            return lines;
        }
        lines.push(format!("{},", self.name));
        let last = self.fields.len() - 1;
        for (i, field) in self.fields.iter().enumerate() {
            lines.push(field.help_line(i == last));
        }
        lines
    }
}
