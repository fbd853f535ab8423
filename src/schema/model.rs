//! Schema Model Module
//!
//! Recursive type-shape description of cached values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Schema Kind ==
/// Structural kind of a value at one level of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Number,
    Boolean,
    Null,
    Object,
    Array,
}

impl SchemaKind {
    /// Classifies a value, distinguishing arrays from objects.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => SchemaKind::String,
            Value::Number(_) => SchemaKind::Number,
            Value::Bool(_) => SchemaKind::Boolean,
            Value::Null => SchemaKind::Null,
            Value::Object(_) => SchemaKind::Object,
            Value::Array(_) => SchemaKind::Array,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Null => "null",
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
        };
        f.write_str(name)
    }
}

// == Datatype ==
/// Top-level classification fixed by the first value written to a cache.
///
/// Lists classify as `Object`, so records and collections of records share a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    String,
    Number,
    Boolean,
    Null,
    Object,
}

impl Datatype {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Datatype::String,
            Value::Number(_) => Datatype::Number,
            Value::Bool(_) => Datatype::Boolean,
            Value::Null => Datatype::Null,
            Value::Object(_) | Value::Array(_) => Datatype::Object,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Datatype::String => "string",
            Datatype::Number => "number",
            Datatype::Boolean => "boolean",
            Datatype::Null => "null",
            Datatype::Object => "object",
        };
        f.write_str(name)
    }
}

// == Schema Model ==
/// Shape of a value: its kind plus, for objects and nested arrays, the
/// shape of each field.
///
/// Field schemas live in a `BTreeMap`, so field order of the source value never
/// affects equality or serialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaModel {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaModel>>,
}

impl SchemaModel {
    /// Creates a leaf schema without properties.
    pub fn leaf(kind: SchemaKind) -> Self {
        Self {
            kind,
            properties: None,
        }
    }

    /// Creates a schema with field schemas attached.
    pub fn with_properties(kind: SchemaKind, properties: BTreeMap<String, SchemaModel>) -> Self {
        Self {
            kind,
            properties: Some(properties),
        }
    }

    /// Builds the schema of `value` as seen at the given nesting depth.
    ///
    /// Arrays take the field shape of their first element. At depth 0 they are
    /// tagged `Object` so a top-level list compares equal to a single record of
    /// the same element shape; deeper down they keep the `Array` kind.
    pub fn build(value: &Value, depth: usize) -> Self {
        match value {
            Value::Object(fields) => Self::with_properties(
                SchemaKind::Object,
                fields
                    .iter()
                    .map(|(name, field)| (name.clone(), Self::build(field, depth + 1)))
                    .collect(),
            ),
            Value::Array(items) => {
                let kind = if depth == 0 {
                    SchemaKind::Object
                } else {
                    SchemaKind::Array
                };
                match items.first() {
                    Some(first) => Self {
                        kind,
                        properties: Self::build(first, depth + 1).properties,
                    },
                    None => Self::leaf(kind),
                }
            }
            other => Self::leaf(SchemaKind::of(other)),
        }
    }

    /// Canonical JSON form, used for logging and quick comparison.
    pub fn canonical(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_schema_is_leaf() {
        assert_eq!(SchemaModel::build(&json!("x"), 0), SchemaModel::leaf(SchemaKind::String));
        assert_eq!(SchemaModel::build(&json!(1.5), 0), SchemaModel::leaf(SchemaKind::Number));
        assert_eq!(SchemaModel::build(&json!(true), 0), SchemaModel::leaf(SchemaKind::Boolean));
        assert_eq!(SchemaModel::build(&Value::Null, 0), SchemaModel::leaf(SchemaKind::Null));
    }

    #[test]
    fn test_object_schema_with_nested_array() {
        let user = json!({
            "id": "1",
            "firstName": "John",
            "secondName": "Smith",
            "adresses": [
                { "id": 1, "street": "Street 1" },
                { "id": 2, "street": "Street 2" }
            ]
        });

        let schema = SchemaModel::build(&user, 0);
        let expected = json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "firstName": { "type": "string" },
                "secondName": { "type": "string" },
                "adresses": {
                    "type": "array",
                    "properties": {
                        "id": { "type": "number" },
                        "street": { "type": "string" }
                    }
                }
            }
        });
        assert_eq!(serde_json::to_value(&schema).unwrap(), expected);
    }

    #[test]
    fn test_top_level_array_tagged_object() {
        let list = json!([{ "id": "1", "name": "a" }, { "id": "2", "name": "b" }]);
        let record = json!({ "name": "c", "id": "3" });

        let list_schema = SchemaModel::build(&list, 0);
        assert_eq!(list_schema.kind, SchemaKind::Object);
        assert_eq!(list_schema, SchemaModel::build(&record, 0));
    }

    #[test]
    fn test_empty_array_has_no_properties() {
        let schema = SchemaModel::build(&json!({ "tags": [] }), 0);
        let properties = schema.properties.unwrap();
        assert_eq!(properties["tags"], SchemaModel::leaf(SchemaKind::Array));
    }

    #[test]
    fn test_canonical_ignores_field_order() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": "x"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": "y", "b": 2}"#).unwrap();
        assert_eq!(
            SchemaModel::build(&a, 0).canonical(),
            SchemaModel::build(&b, 0).canonical()
        );
    }

    #[test]
    fn test_datatype_classifies_lists_as_object() {
        assert_eq!(Datatype::of(&json!([1, 2])), Datatype::Object);
        assert_eq!(Datatype::of(&json!({})), Datatype::Object);
        assert_eq!(Datatype::of(&json!("s")), Datatype::String);
        assert_eq!(Datatype::Object.to_string(), "object");
    }
}
