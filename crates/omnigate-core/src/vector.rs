//! Vector store data model and its request/response messages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────

/// Type of a declared metadata field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
}

/// A declared metadata field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    pub field_type: FieldType,
}

/// Shape of one collection: embedding width plus declared metadata fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorSchema {
    pub embedding_dimension: usize,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldType>,
}

impl VectorSchema {
    pub fn new(embedding_dimension: usize) -> Self {
        Self {
            embedding_dimension,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field declaration.
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Whether records carry a serialized metadata column.
    pub fn has_metadata(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// Readiness of a collection, in lifecycle order.
///
/// `Undefined → SchemaDefined → Indexed → Loaded → Queryable`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaState {
    Undefined,
    SchemaDefined,
    Indexed,
    Loaded,
    Queryable,
}

impl fmt::Display for SchemaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemaState::Undefined => "UNDEFINED",
            SchemaState::SchemaDefined => "SCHEMA_DEFINED",
            SchemaState::Indexed => "INDEXED",
            SchemaState::Loaded => "LOADED",
            SchemaState::Queryable => "QUERYABLE",
        };
        f.write_str(s)
    }
}

// ─────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────

/// A metadata value. On the wire: `{"string_value": "x"}`,
/// `{"int_value": 3}` or `{"float_value": 0.5}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataValue {
    StringValue(String),
    IntValue(i64),
    FloatValue(f64),
}

impl MetadataValue {
    /// The schema type this value belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            MetadataValue::StringValue(_) => FieldType::String,
            MetadataValue::IntValue(_) => FieldType::Integer,
            MetadataValue::FloatValue(_) => FieldType::Float,
        }
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// One stored vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One search hit. Higher `score` is more similar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorSearchResult {
    pub id: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────
//
// Every request may name a vector provider and a collection; absent values
// fall back to the configured defaults.

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DefineVectorSchemaRequest {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    pub embedding_dimension: usize,
    #[serde(default)]
    pub fields: Vec<MetadataField>,
}

impl DefineVectorSchemaRequest {
    /// The schema this request describes.
    pub fn schema(&self) -> VectorSchema {
        VectorSchema {
            embedding_dimension: self.embedding_dimension,
            fields: self
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.field_type))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DefineVectorSchemaResponse {
    pub success: bool,
    pub collection: String,
    pub state: SchemaState,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpsertVectorRequest {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpsertVectorResponse {
    pub id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VectorIdRequest {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    pub id: String,
}

/// `found == false` → every other field is empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GetVectorResponse {
    pub found: bool,
    pub id: String,
    pub embedding: Vec<f32>,
    pub content: String,
    pub metadata: Metadata,
}

impl From<Option<VectorRecord>> for GetVectorResponse {
    fn from(record: Option<VectorRecord>) -> Self {
        match record {
            Some(r) => Self {
                found: true,
                id: r.id,
                embedding: r.embedding,
                content: r.content,
                metadata: r.metadata,
            },
            None => Self::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DeleteVectorResponse {
    pub success: bool,
    pub found: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchVectorsRequest {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    pub query_embedding: Vec<f32>,
    pub top_k: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchVectorsResponse {
    pub results: Vec<VectorSearchResult>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CollectionStateRequest {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CollectionStateResponse {
    pub collection: String,
    pub state: SchemaState,
}
