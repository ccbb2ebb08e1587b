//! Schema definitions produced by the scanner.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All synthesized schemas, keyed by external name.
pub type Definitions = BTreeMap<String, Schema>;

/// Prefix of every reference into [`Definitions`].
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Write `Option<f64>` constraints as integers when they have no fractional part.
fn serialize_number_constraint<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            serializer.serialize_some(&(*v as i64))
        }
        Some(v) => serializer.serialize_some(v),
        None => serializer.serialize_none(),
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Reference to another definition; excludes inline content
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number_constraint"
    )]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number_constraint"
    )]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number_constraint"
    )]
    pub multiple_of: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique_items: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,

    /// Vendor extensions (`x-...`)
    #[serde(flatten)]
    pub extensions: BTreeMap<String, String>,
}

impl Schema {
    /// A schema that only refers to a definition.
    pub fn reference_to(name: &str) -> Result<Self> {
        let mut schema = Schema::default();
        schema.set_ref(definition_ref(name)?);
        Ok(schema)
    }

    /// Set type and format. A typed schema is no longer a reference.
    pub fn typed(&mut self, schema_type: &str, format: &str) {
        self.reference = None;
        self.schema_type = Some(schema_type.to_string());
        self.format = if format.is_empty() {
            None
        } else {
            Some(format.to_string())
        };
    }

    /// Turn this schema into a reference, dropping everything but extensions.
    pub fn set_ref(&mut self, reference: String) {
        let extensions = std::mem::take(&mut self.extensions);
        *self = Schema {
            reference: Some(reference),
            extensions,
            ..Schema::default()
        };
    }

    pub fn is_ref(&self) -> bool {
        self.reference.is_some()
    }

    pub fn add_extension(&mut self, key: &str, value: impl Into<String>) {
        self.extensions.insert(key.to_string(), value.into());
    }

    /// Add a property name to the required list once.
    pub fn add_required(&mut self, name: &str) {
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
    }

    pub fn remove_required(&mut self, name: &str) {
        self.required.retain(|r| r != name);
    }
}

/// Build the reference path for a definition name.
///
/// `~` and `/` are escaped as JSON pointer tokens. Names that are empty or
/// carry whitespace, control characters or `#` have no valid reference.
pub fn definition_ref(name: &str) -> Result<String> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("name contains whitespace or control characters")
    } else if name.contains('#') {
        Some("name contains '#'")
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(Error::ReferenceConstruction {
            name: name.to_string(),
            reason: reason.to_string(),
        });
    }
    let escaped = name.replace('~', "~0").replace('/', "~1");
    Ok(format!("{}{}", DEFINITIONS_PREFIX, escaped))
}

/// A write handle over a schema, or over the `items` of an array schema.
///
/// The mapper writes through this handle so that nested arrays and arrays of
/// primitives share the same code path.
pub struct PropertyTarget<'a> {
    schema: &'a mut Schema,
}

impl<'a> PropertyTarget<'a> {
    pub fn new(schema: &'a mut Schema) -> Self {
        Self { schema }
    }

    pub fn typed(&mut self, schema_type: &str, format: &str) {
        self.schema.typed(schema_type, format);
    }

    pub fn set_ref(&mut self, reference: String) {
        self.schema.set_ref(reference);
    }

    /// The target schema itself.
    pub fn schema(&mut self) -> &mut Schema {
        &mut *self.schema
    }

    /// Mark the target as an array and hand out its `items` schema.
    pub fn items(&mut self) -> PropertyTarget<'_> {
        self.schema.typed("array", "");
        let items = self.schema.items.get_or_insert_with(Box::default);
        PropertyTarget::new(items)
    }
}
