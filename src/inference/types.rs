//! Structural schema types

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

use super::formats::Format;
use crate::mapping::ArrivalFormat;
use crate::reconcile::Suggestion;

/// JSON Schema type of a node.
///
/// Declaration order is the type precedence used to break ties between
/// equally frequent types: the first variant wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    /// All types in precedence order
    pub const ALL: [JsonType; 7] = [
        JsonType::String,
        JsonType::Number,
        JsonType::Integer,
        JsonType::Boolean,
        JsonType::Object,
        JsonType::Array,
        JsonType::Null,
    ];

    /// Get the JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
        }
    }

    /// Type of a raw JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    /// Validation family of this type: integers validate as numbers.
    pub fn family(&self) -> JsonType {
        match self {
            JsonType::Integer => JsonType::Number,
            other => *other,
        }
    }

    /// Whether nodes of this type carry children
    pub fn is_structural(&self) -> bool {
        matches!(self, JsonType::Object | JsonType::Array)
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown JSON type: {}", s))
    }
}

/// One step in a schema path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Named object property
    Property(String),
    /// Array element schema
    Items,
}

/// Location of a node inside a schema tree.
///
/// Renders as an absolute schema pointer (`$.properties.a.items.properties.b`)
/// or as a display path (`a[*].b`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaPath(Vec<PathSegment>);

impl SchemaPath {
    /// The schema root (`$`)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Path of a named property below this node
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Property(name.into()));
        Self(segments)
    }

    /// Path of the item schema of this array node
    pub fn items(&self) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Items);
        Self(segments)
    }

    /// Path with the last segment removed
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Nearest enclosing object or array node whose presence is tracked.
    ///
    /// Drops the trailing property and any `items` steps, so the container of
    /// `a[*].b` is `a` and the container of a top-level field is the root.
    pub fn container(&self) -> Self {
        let mut segments = self.0.clone();
        segments.pop();
        while matches!(segments.last(), Some(PathSegment::Items)) {
            segments.pop();
        }
        Self(segments)
    }

    /// Name of the last property segment, if the path ends in one
    pub fn property_name(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Property(name)) => Some(name),
            _ => None,
        }
    }

    /// Whether `self` is `other` or lies beneath it
    pub fn starts_with(&self, other: &SchemaPath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Absolute schema pointer form
    pub fn pointer(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.0 {
            match segment {
                PathSegment::Property(name) => {
                    out.push_str(".properties.");
                    out.push_str(name);
                }
                PathSegment::Items => out.push_str(".items"),
            }
        }
        out
    }

    /// Display form: dotted property names with `[*]` for array items
    pub fn display_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            match segment {
                PathSegment::Property(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSegment::Items => out.push_str("[*]"),
            }
        }
        out
    }

    /// Parse an absolute schema pointer produced by [`SchemaPath::pointer`]
    pub fn parse_pointer(pointer: &str) -> Option<Self> {
        let rest = pointer.strip_prefix('$')?;
        let mut segments = Vec::new();
        let mut parts = rest.split('.').skip(1);
        while let Some(part) = parts.next() {
            match part {
                "properties" => segments.push(PathSegment::Property(parts.next()?.to_string())),
                "items" => segments.push(PathSegment::Items),
                _ => return None,
            }
        }
        Some(Self(segments))
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pointer())
    }
}

impl Serialize for SchemaPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pointer())
    }
}

/// Structural kind of a schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Non-structural node; never holds `Object` or `Array`
    Scalar(JsonType),
    /// Object with named properties and the set of required property names
    Object {
        properties: BTreeMap<String, FieldSchema>,
        required: BTreeSet<String>,
    },
    /// Array. `items` is absent for empty arrays and for opaque arrays;
    /// `validated == false` marks an opaque array whose items are not described.
    Array {
        items: Option<Box<FieldSchema>>,
        validated: bool,
    },
    /// `anyOf`/`oneOf` alternatives, only produced when reading stored schemas
    Union(Vec<FieldSchema>),
}

/// Output metadata written onto a node by the reconciliation stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub arrival_format: Option<ArrivalFormat>,
    pub data_type: Option<String>,
    /// Candidate JSON Schema types (`oneof`)
    pub one_of: Vec<JsonType>,
    /// Candidate arrival formats (`arrivalOneOf`)
    pub arrival_one_of: Vec<ArrivalFormat>,
    pub suggestions: Vec<Suggestion>,
    pub additional_properties: Option<bool>,
}

/// One node of a structural schema tree
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub kind: SchemaKind,
    pub format: Option<Format>,
    pub annotations: Annotations,
}

impl FieldSchema {
    fn with_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            format: None,
            annotations: Annotations::default(),
        }
    }

    /// Create a node of the given type with no children
    pub fn scalar(json_type: JsonType) -> Self {
        match json_type {
            JsonType::Object => Self::object(),
            JsonType::Array => Self::array(None),
            other => Self::with_kind(SchemaKind::Scalar(other)),
        }
    }

    /// Create an empty object node
    pub fn object() -> Self {
        Self::with_kind(SchemaKind::Object {
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
        })
    }

    /// Create an array node with optional items
    pub fn array(items: Option<FieldSchema>) -> Self {
        Self::with_kind(SchemaKind::Array {
            items: items.map(Box::new),
            validated: true,
        })
    }

    /// Create an opaque array whose items are not validated
    pub fn opaque_array() -> Self {
        Self::with_kind(SchemaKind::Array {
            items: None,
            validated: false,
        })
    }

    /// Create a union of alternative schemas
    pub fn union(branches: Vec<FieldSchema>) -> Self {
        Self::with_kind(SchemaKind::Union(branches))
    }

    /// Attach a format
    pub fn with_format(mut self, format: Option<Format>) -> Self {
        self.format = format;
        self
    }

    /// Add a property, marking it required when `required` is true
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        schema: FieldSchema,
        required: bool,
    ) -> Self {
        self.insert_property(name, schema, required);
        self
    }

    /// Insert a property into an object node. No-op for other kinds.
    pub fn insert_property(
        &mut self,
        name: impl Into<String>,
        schema: FieldSchema,
        is_required: bool,
    ) {
        if let SchemaKind::Object {
            properties,
            required,
        } = &mut self.kind
        {
            let name = name.into();
            if is_required {
                required.insert(name.clone());
            }
            properties.insert(name, schema);
        }
    }

    /// JSON Schema type of this node. Unions report their first branch.
    pub fn json_type(&self) -> JsonType {
        match &self.kind {
            SchemaKind::Scalar(t) => *t,
            SchemaKind::Object { .. } => JsonType::Object,
            SchemaKind::Array { .. } => JsonType::Array,
            SchemaKind::Union(branches) => branches
                .first()
                .map(FieldSchema::json_type)
                .unwrap_or(JsonType::Null),
        }
    }

    /// Properties of an object node
    pub fn properties(&self) -> Option<&BTreeMap<String, FieldSchema>> {
        match &self.kind {
            SchemaKind::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Required property names of an object node
    pub fn required(&self) -> Option<&BTreeSet<String>> {
        match &self.kind {
            SchemaKind::Object { required, .. } => Some(required),
            _ => None,
        }
    }

    /// Item schema of a validated array node
    pub fn items(&self) -> Option<&FieldSchema> {
        match &self.kind {
            SchemaKind::Array { items, .. } => items.as_deref(),
            _ => None,
        }
    }

    /// Whether this node is an array whose items are not validated
    pub fn is_opaque_array(&self) -> bool {
        matches!(
            self.kind,
            SchemaKind::Array {
                validated: false,
                ..
            }
        )
    }

    /// Look up the node at `path`
    pub fn get(&self, path: &SchemaPath) -> Option<&FieldSchema> {
        let mut node = self;
        for segment in path.segments() {
            node = match (segment, &node.kind) {
                (PathSegment::Property(name), SchemaKind::Object { properties, .. }) => {
                    properties.get(name)?
                }
                (PathSegment::Items, SchemaKind::Array { items, .. }) => items.as_deref()?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Mutable lookup of the node at `path`
    pub fn get_mut(&mut self, path: &SchemaPath) -> Option<&mut FieldSchema> {
        let mut node = self;
        for segment in path.segments() {
            node = match (segment, &mut node.kind) {
                (PathSegment::Property(name), SchemaKind::Object { properties, .. }) => {
                    properties.get_mut(name)?
                }
                (PathSegment::Items, SchemaKind::Array { items, .. }) => items.as_deref_mut()?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Change the type of this node.
    ///
    /// Keeps the current shape when the kind already matches, and collapses a
    /// union onto its branch of the target type. Otherwise a structural target
    /// takes its shape from `template` when one of the right kind is given,
    /// and starts empty when not.
    pub fn retype(&mut self, target: JsonType, template: Option<&FieldSchema>) {
        if let SchemaKind::Union(branches) = &self.kind {
            if let Some(branch) = branches.iter().find(|b| b.json_type() == target) {
                let branch = branch.clone();
                self.kind = branch.kind;
                self.format = branch.format;
                return;
            }
        } else if self.json_type() == target {
            return;
        }
        self.kind = match template {
            Some(t) if t.json_type() == target && target.is_structural() => t.kind.clone(),
            _ => FieldSchema::scalar(target).kind,
        };
        if target.is_structural() {
            self.format = None;
        }
    }

    /// Render this tree as a JSON Schema document
    pub fn to_json_schema(&self) -> Value {
        let mut document = Map::new();
        document.insert(
            "$schema".to_string(),
            json!("https://json-schema.org/draft/2020-12/schema"),
        );
        if let Value::Object(node) = self.to_json_value() {
            document.extend(node);
        }
        Value::Object(document)
    }

    /// Render this node (without the `$schema` header)
    pub fn to_json_value(&self) -> Value {
        let mut node = Map::new();

        match &self.kind {
            SchemaKind::Scalar(t) => {
                node.insert("type".to_string(), json!(t.as_str()));
            }
            SchemaKind::Object {
                properties,
                required,
            } => {
                node.insert("type".to_string(), json!("object"));
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, child)| (name.clone(), child.to_json_value()))
                    .collect();
                node.insert("properties".to_string(), Value::Object(props));
                if !required.is_empty() {
                    node.insert("required".to_string(), json!(required));
                }
            }
            SchemaKind::Array { items, validated } => {
                node.insert("type".to_string(), json!("array"));
                if !validated {
                    node.insert("additionalProperties".to_string(), json!(false));
                } else if let Some(items) = items {
                    node.insert("items".to_string(), items.to_json_value());
                }
            }
            SchemaKind::Union(branches) => {
                let any_of: Vec<Value> = branches.iter().map(FieldSchema::to_json_value).collect();
                node.insert("anyOf".to_string(), Value::Array(any_of));
            }
        }

        if let Some(format) = self.format {
            node.insert("format".to_string(), json!(format.as_str()));
        }

        let notes = &self.annotations;
        if let Some(allowed) = notes.additional_properties {
            node.insert("additionalProperties".to_string(), json!(allowed));
        }
        if let Some(arrival) = notes.arrival_format {
            node.insert("arrival_format".to_string(), json!(arrival.as_str()));
        }
        if let Some(ref data_type) = notes.data_type {
            node.insert("data_type".to_string(), json!(data_type));
        }
        if !notes.one_of.is_empty() {
            let one_of: Vec<Value> = notes
                .one_of
                .iter()
                .map(|t| json!({ "type": t.as_str() }))
                .collect();
            node.insert("oneof".to_string(), Value::Array(one_of));
        }
        if !notes.arrival_one_of.is_empty() {
            let arrival_one_of: Vec<Value> = notes
                .arrival_one_of
                .iter()
                .map(|a| json!({ "type": a.as_str() }))
                .collect();
            node.insert("arrivalOneOf".to_string(), Value::Array(arrival_one_of));
        }
        if !notes.suggestions.is_empty() {
            node.insert("suggestions".to_string(), json!(notes.suggestions));
        }

        Value::Object(node)
    }
}
