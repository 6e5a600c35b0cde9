//! Decoded signal tree.
//!
//! The vendor schema is open and keeps growing, so the record is kept as a
//! JSON tree and each rule pulls the fields it needs by dotted path. Only a
//! field that is actually read has to be present and well typed.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding the payload or reading a field from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Signal payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Signal payload is not a JSON object")]
    NotAnObject,

    #[error("Missing signal field: {path}")]
    MissingField { path: String },

    #[error("Signal field {path} has wrong type: expected {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Risk signals decoded from an unsealed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    root: Value,
}

impl SignalRecord {
    /// Parse decompressed payload text.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let root: Value =
            serde_json::from_str(text).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
        Self::from_value(root)
    }

    /// Wrap an already parsed tree. The top level must be an object.
    pub fn from_value(root: Value) -> Result<Self, SchemaError> {
        if !root.is_object() {
            return Err(SchemaError::NotAnObject);
        }
        Ok(SignalRecord { root })
    }

    /// Look up a field by dotted path, e.g. `products.botd.data.bot.result`.
    pub fn value_at(&self, path: &str) -> Result<&Value, SchemaError> {
        let mut node = &self.root;
        for segment in path.split('.') {
            node = node.get(segment).ok_or_else(|| SchemaError::MissingField {
                path: path.to_string(),
            })?;
        }
        Ok(node)
    }

    pub fn str_at(&self, path: &str) -> Result<&str, SchemaError> {
        let value = self.value_at(path)?;
        value.as_str().ok_or_else(|| wrong_type(path, "string", value))
    }

    pub fn bool_at(&self, path: &str) -> Result<bool, SchemaError> {
        let value = self.value_at(path)?;
        value.as_bool().ok_or_else(|| wrong_type(path, "boolean", value))
    }

    pub fn f64_at(&self, path: &str) -> Result<f64, SchemaError> {
        let value = self.value_at(path)?;
        value.as_f64().ok_or_else(|| wrong_type(path, "number", value))
    }
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> SchemaError {
    SchemaError::WrongType {
        path: path.to_string(),
        expected,
        found: json_type_name(found),
    }
}

/// Short JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
