//! Wire types for the document store REST surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::error::StoreError;
use super::types::Item;

/// One document as returned by the store: an id plus a schemaless field map.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDocument {
  pub id: String,
  #[serde(default)]
  pub fields: Value,
}

impl ApiDocument {
  /// Fold the document id into the field map and decode it as an item.
  pub fn into_item(self, collection: &str) -> Result<Item, StoreError> {
    let mut map = match self.fields {
      Value::Object(map) => map,
      other => {
        return Err(StoreError::Malformed {
          collection: collection.to_string(),
          reason: format!("expected an object of fields, got {}", json_kind(&other)),
        })
      }
    };
    map.insert("id".to_string(), Value::String(self.id));

    serde_json::from_value(Value::Object(map)).map_err(|e| StoreError::Malformed {
      collection: collection.to_string(),
      reason: e.to_string(),
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiListResponse {
  #[serde(default)]
  pub documents: Vec<ApiDocument>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCreateResponse {
  pub id: String,
}

/// Equality-filter query body, used for the admin credential lookup.
#[derive(Debug, Serialize)]
pub struct ApiQueryRequest {
  #[serde(rename = "where")]
  pub filters: BTreeMap<String, Value>,
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a bool",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_document_decodes_into_item() {
    let doc: ApiDocument = serde_json::from_str(
      r#"{"id":"d1","fields":{"title":"Cert","priority":3,"description":"desc"}}"#,
    )
    .unwrap();

    let item = doc.into_item("achievements").unwrap();
    assert_eq!(item.id, "d1");
    assert_eq!(item.title, "Cert");
    assert_eq!(item.priority, Some(3));
  }

  #[test]
  fn test_non_object_fields_is_malformed() {
    let doc: ApiDocument = serde_json::from_str(r#"{"id":"d2","fields":[1,2]}"#).unwrap();
    let err = doc.into_item("projects").unwrap_err();
    assert!(matches!(err, StoreError::Malformed { .. }));
  }

  #[test]
  fn test_missing_fields_default_to_empty() {
    let doc: ApiDocument = serde_json::from_str(r#"{"id":"d3"}"#).unwrap();
    // No fields at all: defaults to null, which is not an object.
    assert!(doc.into_item("projects").is_err());
  }
}
