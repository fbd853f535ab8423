//! Schema Validator Module
//!
//! Compares candidate values against a reference schema in quick or deep mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{SchemaKind, SchemaModel};

// == Validation Mode ==
/// How candidate schemas are compared with the reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Exact shape equality, including field sets at every level
    #[default]
    Quick,
    /// Level-by-level field count and per-field kind comparison
    Deep,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(ValidationMode::Quick),
            "deep" => Ok(ValidationMode::Deep),
            other => Err(format!("unknown validation mode: {}", other)),
        }
    }
}

// == Schema Mismatch ==
/// One difference between a candidate and the reference schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaMismatch {
    /// Quick mode: the shapes differ somewhere
    Shape { expected: String, found: String },
    /// The number of fields differs at `path`
    FieldCount {
        path: String,
        expected: usize,
        found: usize,
    },
    /// A reference field is absent from the candidate
    MissingField { path: String },
    /// A field exists on both sides with different kinds
    Kind {
        path: String,
        expected: SchemaKind,
        found: SchemaKind,
    },
}

impl fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaMismatch::Shape { expected, found } => {
                write!(f, "shape {} does not match schema {}", found, expected)
            }
            SchemaMismatch::FieldCount {
                path,
                expected,
                found,
            } => write!(f, "{} has {} fields, expected {}", path, found, expected),
            SchemaMismatch::MissingField { path } => write!(f, "{} is missing", path),
            SchemaMismatch::Kind {
                path,
                expected,
                found,
            } => write!(f, "{} is {}, expected {}", path, found, expected),
        }
    }
}

// == Validator ==
/// Holds the reference schema of a cache. Immutable once built.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: SchemaModel,
    mode: ValidationMode,
}

impl Validator {
    /// Builds a validator whose reference schema is derived from `original`.
    pub fn new(original: &Value, mode: ValidationMode) -> Self {
        Self {
            schema: SchemaModel::build(original, 0),
            mode,
        }
    }

    /// The reference schema.
    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Returns true if `sample` matches the reference schema.
    pub fn validate(&self, sample: &Value) -> bool {
        self.check(sample).is_empty()
    }

    /// Returns true if every element of `samples` validates.
    pub fn validate_list(&self, samples: &[Value]) -> bool {
        samples.iter().all(|sample| self.validate(sample))
    }

    /// Lists every difference between `sample` and the reference schema.
    pub fn check(&self, sample: &Value) -> Vec<SchemaMismatch> {
        let candidate = SchemaModel::build(sample, 0);
        match self.mode {
            ValidationMode::Quick => quick_compare(&self.schema, &candidate),
            ValidationMode::Deep => {
                let mut mismatches = Vec::new();
                deep_compare(&self.schema, &candidate, "$", &mut mismatches);
                mismatches
            }
        }
    }
}

fn quick_compare(reference: &SchemaModel, candidate: &SchemaModel) -> Vec<SchemaMismatch> {
    if reference.canonical() == candidate.canonical() {
        Vec::new()
    } else {
        vec![SchemaMismatch::Shape {
            expected: reference.canonical(),
            found: candidate.canonical(),
        }]
    }
}

/// Walks both schemas in lock-step, collecting kind differences.
///
/// A differing field count stops the walk at that level. Levels where either
/// side carries no field schemas (e.g. an empty nested array) are not descended.
fn deep_compare(
    reference: &SchemaModel,
    candidate: &SchemaModel,
    path: &str,
    mismatches: &mut Vec<SchemaMismatch>,
) {
    if reference.kind != candidate.kind {
        mismatches.push(SchemaMismatch::Kind {
            path: path.to_string(),
            expected: reference.kind,
            found: candidate.kind,
        });
        return;
    }

    let (Some(expected_fields), Some(found_fields)) = (&reference.properties, &candidate.properties)
    else {
        return;
    };

    if expected_fields.len() != found_fields.len() {
        mismatches.push(SchemaMismatch::FieldCount {
            path: path.to_string(),
            expected: expected_fields.len(),
            found: found_fields.len(),
        });
        return;
    }

    for (name, expected) in expected_fields {
        let field_path = format!("{}.{}", path, name);
        match found_fields.get(name) {
            Some(found) => deep_compare(expected, found, &field_path, mismatches),
            None => mismatches.push(SchemaMismatch::MissingField { path: field_path }),
        }
    }
}
