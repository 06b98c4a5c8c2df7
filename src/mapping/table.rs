//! Platform type-mapping table

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::inference::JsonType;

/// Coarse ingestion-time type family
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalFormat {
    Text,
    Number,
    Boolean,
    Object,
    Array,
}

impl ArrivalFormat {
    pub const ALL: [ArrivalFormat; 5] = [
        ArrivalFormat::Text,
        ArrivalFormat::Number,
        ArrivalFormat::Boolean,
        ArrivalFormat::Object,
        ArrivalFormat::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArrivalFormat::Text => "text",
            ArrivalFormat::Number => "number",
            ArrivalFormat::Boolean => "boolean",
            ArrivalFormat::Object => "object",
            ArrivalFormat::Array => "array",
        }
    }

    /// Arrival family of a JSON type; `null` has none
    pub fn for_json_type(json_type: JsonType) -> Option<Self> {
        match json_type {
            JsonType::String => Some(ArrivalFormat::Text),
            JsonType::Number | JsonType::Integer => Some(ArrivalFormat::Number),
            JsonType::Boolean => Some(ArrivalFormat::Boolean),
            JsonType::Object => Some(ArrivalFormat::Object),
            JsonType::Array => Some(ArrivalFormat::Array),
            JsonType::Null => None,
        }
    }
}

impl fmt::Display for ArrivalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrivalFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArrivalFormat::ALL
            .into_iter()
            .find(|a| a.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown arrival format: {}", s))
    }
}

/// Accepted JSON types and storage formats of one arrival family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalMapping {
    #[serde(skip)]
    pub arrival_format: ArrivalFormat,
    pub json_types: Vec<JsonType>,
    pub store_formats: Vec<&'static str>,
}

/// The static platform type-mapping table.
///
/// Serialises as a map keyed by arrival format.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMappings {
    entries: Vec<ArrivalMapping>,
}

impl Default for DataMappings {
    fn default() -> Self {
        Self::standard()
    }
}

impl DataMappings {
    /// The built-in table
    pub fn standard() -> Self {
        let entry = |arrival_format, json_types: &[JsonType], store_formats: &[&'static str]| {
            ArrivalMapping {
                arrival_format,
                json_types: json_types.to_vec(),
                store_formats: store_formats.to_vec(),
            }
        };

        Self {
            entries: vec![
                entry(
                    ArrivalFormat::Text,
                    &[JsonType::String],
                    &["string", "date-time", "date", "time", "epoch"],
                ),
                entry(
                    ArrivalFormat::Number,
                    &[JsonType::Integer, JsonType::Number],
                    &["integer", "number", "epoch"],
                ),
                entry(ArrivalFormat::Boolean, &[JsonType::Boolean], &["boolean"]),
                entry(ArrivalFormat::Object, &[JsonType::Object], &["object"]),
                entry(ArrivalFormat::Array, &[JsonType::Array], &["array"]),
            ],
        }
    }

    pub fn entries(&self) -> &[ArrivalMapping] {
        &self.entries
    }

    pub fn get(&self, arrival_format: ArrivalFormat) -> Option<&ArrivalMapping> {
        self.entries.iter().find(|e| e.arrival_format == arrival_format)
    }

    /// Every arrival format in the table, in table order
    pub fn arrival_formats(&self) -> Vec<ArrivalFormat> {
        self.entries.iter().map(|e| e.arrival_format).collect()
    }

    /// Distinct JSON Schema families accepted by the table, sorted by name.
    /// `integer` folds into `number`.
    pub fn json_families(&self) -> Vec<JsonType> {
        let mut families: Vec<JsonType> = self
            .entries
            .iter()
            .flat_map(|e| e.json_types.iter().map(JsonType::family))
            .collect();
        families.sort_by_key(|t| t.as_str());
        families.dedup();
        families
    }

    /// Arrival family accepting `json_type`
    pub fn arrival_for(&self, json_type: JsonType) -> Option<ArrivalFormat> {
        self.entries
            .iter()
            .find(|e| e.json_types.contains(&json_type))
            .map(|e| e.arrival_format)
    }
}

impl Serialize for DataMappings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.arrival_format.as_str(), entry)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arrival_for() {
        let mappings = DataMappings::standard();
        assert_eq!(mappings.arrival_for(JsonType::Integer), Some(ArrivalFormat::Number));
        assert_eq!(mappings.arrival_for(JsonType::String), Some(ArrivalFormat::Text));
        assert_eq!(mappings.arrival_for(JsonType::Null), None);
        assert_eq!(
            ArrivalFormat::for_json_type(JsonType::Number),
            mappings.arrival_for(JsonType::Number)
        );
    }

    #[test]
    fn test_json_families() {
        let families = DataMappings::standard().json_families();
        assert_eq!(
            families,
            vec![
                JsonType::Array,
                JsonType::Boolean,
                JsonType::Number,
                JsonType::Object,
                JsonType::String
            ]
        );
    }

    #[test]
    fn test_serialization() {
        let value = serde_json::to_value(DataMappings::standard()).unwrap();
        assert_eq!(value["number"]["jsonTypes"], json!(["integer", "number"]));
        assert_eq!(value["text"]["storeFormats"][1], "date-time");
        assert_eq!(value.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_arrival_format_parse() {
        assert_eq!("TEXT".parse::<ArrivalFormat>(), Ok(ArrivalFormat::Text));
        assert!("blob".parse::<ArrivalFormat>().is_err());
    }
}
