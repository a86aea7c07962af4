// Core structs: ProductDocument, VariantDocument, FlattenedRecord, trigger events, errors
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Identifier as emitted by the storefront: usually a 64-bit integer, sometimes a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalId::Number(n) => write!(f, "{}", n),
            ExternalId::Text(s) => f.write_str(s),
        }
    }
}

/// One line of a raw feed batch: a product with its embedded variants.
///
/// Fields the scraper is known to emit with inconsistent JSON types (`vendor`,
/// `images`, `variants`) stay as raw values and are interpreted by the flattener.
/// Scalar fields are coerced rather than rejected, so any JSON object decodes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductDocument {
    #[serde(deserialize_with = "lenient::id")]
    pub id: Option<ExternalId>,
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub body_html: Option<String>,
    pub images: Value,
    #[serde(deserialize_with = "lenient::text")]
    pub product_type: Option<String>,
    pub vendor: Value,
    #[serde(deserialize_with = "lenient::tags")]
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::text")]
    pub handle: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub store: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub product_url: Option<String>,
    pub variants: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VariantDocument {
    #[serde(deserialize_with = "lenient::id")]
    pub id: Option<ExternalId>,
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub option1: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub option2: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub option3: Option<String>,
    pub price: Value,
    #[serde(deserialize_with = "lenient::flag")]
    pub available: Option<bool>,
}

impl VariantDocument {
    /// Option slots in declared order; missing slots come back empty.
    pub fn option_values(&self) -> [&str; 3] {
        [
            self.option1.as_deref().unwrap_or(""),
            self.option2.as_deref().unwrap_or(""),
            self.option3.as_deref().unwrap_or(""),
        ]
    }
}

/// Coercing field decoders for feed documents. Numbers and booleans become
/// text where text is expected; anything else that does not fit is null.
mod lenient {
    use super::ExternalId;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(&Value::deserialize(d)?))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Value::deserialize(d)?.as_bool())
    }

    /// Integral numbers (including `7001.0`) keep the numeric form.
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ExternalId>, D::Error> {
        let id = match Value::deserialize(d)? {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => ExternalId::Number(i),
                (None, Some(f)) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                    ExternalId::Number(f as i64)
                }
                _ => ExternalId::Text(n.to_string()),
            },
            Value::String(s) => ExternalId::Text(s),
            _ => return Ok(None),
        };
        Ok(Some(id))
    }

    /// A list keeps its scalar entries; a single string is split on commas.
    pub fn tags<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
        let tags = match Value::deserialize(d)? {
            Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            _ => return Ok(None),
        };
        Ok(Some(tags))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferredAttributes {
    pub size: Option<String>,
    pub color: Option<String>,
    pub length: Option<String>,
    pub inseam: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryAssignment {
    pub primary: &'static str,
    pub subcategory: Option<&'static str>,
}

/// Output row of the flatten stage. Field order is the column order of the
/// emitted JSON; `None` serializes as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlattenedRecord {
    pub product_id: Option<ExternalId>,
    pub variant_id: Option<ExternalId>,
    pub product_title: Option<String>,
    pub variant_title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub price: Option<f64>,
    pub available: Option<bool>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub length: Option<String>,
    pub inseam: Option<u32>,
    pub product_url: Option<String>,
    pub primary_category: Option<String>,
    pub subcategory: Option<String>,
}

/// Column names of [`FlattenedRecord`] in emission order.
pub const OUTPUT_COLUMNS: [&str; 17] = [
    "product_id",
    "variant_id",
    "product_title",
    "variant_title",
    "description",
    "image_url",
    "category",
    "vendor",
    "price",
    "available",
    "size",
    "color",
    "length",
    "inseam",
    "product_url",
    "primary_category",
    "subcategory",
];

// Object-store notification that drives one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<TriggerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    #[serde(default)]
    pub bucket: Option<S3Bucket>,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    pub key: String,
}

impl TriggerEvent {
    /// Builds a single-record event for `key`.
    pub fn for_key(key: &str) -> Self {
        Self {
            records: vec![TriggerRecord {
                s3: S3Entity {
                    bucket: None,
                    object: S3Object { key: key.to_string() },
                },
            }],
        }
    }

    /// Key of the first record. Further records are ignored.
    pub fn first_key(&self) -> Result<&str, PipelineError> {
        self.records
            .first()
            .map(|r| r.s3.object.key.as_str())
            .ok_or(PipelineError::EmptyEvent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no such key: {0}")]
    NotFound(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("object {key} is not valid UTF-8")]
    Encoding { key: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum UpsertError {
    #[error("upsert rejected [{status}]: {body}")]
    Rejected { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("invalid table name: {0}")]
    InvalidTable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("row {0} has no price")]
    MissingPrice(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("trigger event carries no records")]
    EmptyEvent,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
