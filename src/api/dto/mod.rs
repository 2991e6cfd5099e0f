//! Data Transfer Objects for API requests and responses.
//!
//! All request DTOs use Serde for JSON deserialization and validator for
//! input validation. Responses use the conventional success envelope:
//! `{"status": "success", "results": n, "data": {<resource>: ...}}`.

pub mod auth;
pub mod review;
pub mod tour;
pub mod user;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::AppError;

/// Success envelope for a single document.
pub fn document_envelope(key: &str, value: Value) -> Value {
    json!({ "status": "success", "data": { key: value } })
}

/// Success envelope for a list, including the match count.
pub fn list_envelope(key: &str, values: Vec<Value>) -> Value {
    json!({ "status": "success", "results": values.len(), "data": { key: values } })
}

/// Serializes a response payload to JSON.
pub fn to_json_value<T: Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| {
        AppError::internal(
            "Failed to serialize response",
            json!({ "reason": e.to_string() }),
        )
    })
}

/// Serializes entities and applies the exact projection requested via the
/// `fields` query parameter. Without a projection all public fields are
/// returned (sensitive fields are already stripped at serialization).
pub fn to_projected_values<T: Serialize>(
    items: Vec<T>,
    fields: Option<&[String]>,
) -> Result<Vec<Value>, AppError> {
    items
        .into_iter()
        .map(|item| Ok(project_fields(to_json_value(item)?, fields)))
        .collect()
}

/// Retains only the requested fields (plus `id`) of a serialized entity.
fn project_fields(value: Value, fields: Option<&[String]>) -> Value {
    let Some(fields) = fields else {
        return value;
    };
    let Value::Object(map) = value else {
        return value;
    };

    let mut projected = serde_json::Map::new();
    if let Some(id) = map.get("id") {
        projected.insert("id".to_string(), id.clone());
    }
    for field in fields {
        if let Some(v) = map.get(field) {
            projected.insert(field.clone(), v.clone());
        }
    }
    Value::Object(projected)
}

/// Parses a path id, classifying malformed input as a cast failure.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::cast(format!("Invalid id: {raw}"), json!({ "id": raw })))
}
