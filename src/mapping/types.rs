//! Ingestion field types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a descriptor's column comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Column read from the event
    Path,
    /// Column produced by a transformation
    Expr,
}

/// One column of an ingestion spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// JSONPath of the column
    pub expr: String,
    /// Flattened column name
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_format: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

/// A dataset column computed by a transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationField {
    /// Output column name
    pub field_key: String,
    /// Expression producing the value
    pub transformation_function: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub arrival_format: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl TransformationField {
    pub fn new(field_key: impl Into<String>, transformation_function: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            transformation_function: transformation_function.into(),
            data_type: None,
            arrival_format: None,
            is_deleted: false,
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }
}

/// Fields joined in from a master dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenormField {
    /// Alias the master fields are nested under
    pub denorm_out_field: String,
    /// Finalized schema of the master dataset
    pub schema: Value,
    #[serde(default)]
    pub is_deleted: bool,
}

impl DenormField {
    pub fn new(denorm_out_field: impl Into<String>, schema: Value) -> Self {
        Self {
            denorm_out_field: denorm_out_field.into(),
            schema,
            is_deleted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_serialization() {
        let descriptor = FieldDescriptor {
            expr: "$.a.b".to_string(),
            name: "a.b".to_string(),
            data_type: Some("integer".to_string()),
            arrival_format: None,
            kind: FieldKind::Path,
        };
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({"expr": "$.a.b", "name": "a.b", "data_type": "integer", "type": "path"})
        );
    }

    #[test]
    fn test_transformation_field_defaults() {
        let field: TransformationField = serde_json::from_value(json!({
            "field_key": "full_name",
            "transformation_function": "$join([first, last], ' ')"
        }))
        .unwrap();
        assert!(!field.is_deleted);
        assert_eq!(field, TransformationField::new("full_name", "$join([first, last], ' ')"));
    }
}
