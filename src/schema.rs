//! JSON Schema output tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

/// JSON Schema draft the rendered documents declare.
pub const SCHEMA_VERSION: &str = "http://json-schema.org/draft-04/schema#";

/// Primitive JSON Schema type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::Null => "null",
        }
    }
}

/// The `type` of a node: a single kind or a union such as `["null", "array"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    Single(SchemaKind),
    Union(Vec<SchemaKind>),
}

impl SchemaType {
    /// True only for a non-union type equal to `kind`.
    pub fn is(&self, kind: SchemaKind) -> bool {
        matches!(self, SchemaType::Single(k) if *k == kind)
    }

    fn to_json(&self) -> Value {
        match self {
            SchemaType::Single(kind) => Value::String(kind.as_str().to_string()),
            SchemaType::Union(kinds) => Value::Array(
                kinds
                    .iter()
                    .map(|k| Value::String(k.as_str().to_string()))
                    .collect(),
            ),
        }
    }
}

impl From<SchemaKind> for SchemaType {
    fn from(kind: SchemaKind) -> Self {
        SchemaType::Single(kind)
    }
}

/// One node of a converted schema.
///
/// Properties are held behind `Arc` so a field exposed under both its proto
/// name and its JSON name shares a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub schema_type: SchemaType,
    pub properties: BTreeMap<String, Arc<SchemaNode>>,
    pub items: Option<Box<SchemaNode>>,
    pub additional_properties: Option<bool>,
    /// Allowed literal values; `option_labels` pairs with it positionally.
    pub enum_values: Vec<Value>,
    pub option_labels: Vec<Value>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub index: bool,
    pub query: bool,
    /// Protobuf field number, used to order properties on output.
    pub order: Option<i32>,
}

impl SchemaNode {
    pub fn new(schema_type: impl Into<SchemaType>) -> Self {
        Self {
            schema_type: schema_type.into(),
            properties: BTreeMap::new(),
            items: None,
            additional_properties: None,
            enum_values: Vec::new(),
            option_labels: Vec::new(),
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            title: None,
            description: None,
            required: false,
            primary_key: false,
            auto_increment: false,
            index: false,
            query: false,
            order: None,
        }
    }

    pub fn is(&self, kind: SchemaKind) -> bool {
        self.schema_type.is(kind)
    }

    /// Properties sorted by field number, then by name.
    ///
    /// Properties without a field number sort last.
    pub fn ordered_properties(&self) -> Vec<(&str, &SchemaNode)> {
        let mut props: Vec<(&str, &SchemaNode)> = self
            .properties
            .iter()
            .map(|(name, node)| (name.as_str(), node.as_ref()))
            .collect();
        props.sort_by_key(|(name, node)| (node.order.unwrap_or(i32::MAX), *name));
        props
    }

    /// Render this node as a JSON Schema object.
    ///
    /// Unset attributes and false flags are omitted.
    pub fn to_json(&self) -> Value {
        Value::Object(self.to_json_map())
    }

    /// Render this node as a top-level document carrying `$schema`.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(
            "$schema".to_string(),
            Value::String(SCHEMA_VERSION.to_string()),
        );
        doc.extend(self.to_json_map());
        Value::Object(doc)
    }

    fn to_json_map(&self) -> Map<String, Value> {
        let mut map = Map::new();

        map.insert("type".to_string(), self.schema_type.to_json());
        insert_str(&mut map, "title", &self.title);
        insert_str(&mut map, "description", &self.description);

        if self.is(SchemaKind::Object) || !self.properties.is_empty() {
            let props: Map<String, Value> = self
                .ordered_properties()
                .into_iter()
                .map(|(name, node)| (name.to_string(), node.to_json()))
                .collect();
            map.insert("properties".to_string(), Value::Object(props));
        }

        if let Some(items) = &self.items {
            map.insert("items".to_string(), items.to_json());
        }

        if let Some(allowed) = self.additional_properties {
            map.insert("additionalProperties".to_string(), Value::Bool(allowed));
        }

        if !self.enum_values.is_empty() {
            map.insert("enum".to_string(), Value::Array(self.enum_values.clone()));
            map.insert(
                "optionLabels".to_string(),
                Value::Array(self.option_labels.clone()),
            );
        }

        insert_num(&mut map, "minimum", self.minimum);
        insert_num(&mut map, "maximum", self.maximum);
        insert_num(&mut map, "minLength", self.min_length);
        insert_num(&mut map, "maxLength", self.max_length);
        insert_str(&mut map, "pattern", &self.pattern);
        insert_str(&mut map, "format", &self.format);

        insert_flag(&mut map, "required", self.required);
        insert_flag(&mut map, "primaryKey", self.primary_key);
        insert_flag(&mut map, "autoIncrement", self.auto_increment);
        insert_flag(&mut map, "index", self.index);
        insert_flag(&mut map, "query", self.query);

        if let Some(order) = self.order {
            map.insert("propertyOrder".to_string(), Value::from(order));
        }

        map
    }
}

fn insert_str(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}

fn insert_num<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        map.insert(key.to_string(), v.into());
    }
}

fn insert_flag(map: &mut Map<String, Value>, key: &str, set: bool) {
    if set {
        map.insert(key.to_string(), Value::Bool(true));
    }
}
