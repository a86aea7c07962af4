pub mod rest;
pub mod sqlite;

use crate::model::{FlattenedRecord, RowError, UpsertError};
use serde::Serialize;
use uuid::Uuid;

pub use rest::RestUpserter;
pub use sqlite::SqliteUpserter;

/// Destination of the load stage. Rows sharing an `id` must merge, not duplicate.
#[async_trait::async_trait]
pub trait Upserter: Send + Sync {
    async fn upsert(&self, table: &str, row: &ProductRow) -> Result<(), UpsertError>;
}

/// Row as stored in the products table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub id: String,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub product_title: Option<String>,
    pub vendor: Option<String>,
    pub price: f64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub length: Option<String>,
    pub inseam: Option<u32>,
    pub available: bool,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub variant_title: Option<String>,
    pub description: Option<String>,
    pub primary_category: Option<String>,
    pub subcategory: Option<String>,
}

/// Surrogate key derived from the natural key, so reloading a batch overwrites
/// the rows it loaded before.
pub fn surrogate_id(product_id: Option<&str>, variant_id: Option<&str>) -> String {
    let natural = format!(
        "{}:{}",
        product_id.unwrap_or_default(),
        variant_id.unwrap_or_default()
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, natural.as_bytes()).to_string()
}

/// Converts a flattened record into a loadable row. Records without a price
/// cannot be loaded.
pub fn prepare_row(record: &FlattenedRecord) -> Result<ProductRow, RowError> {
    let product_id = record.product_id.as_ref().map(ToString::to_string);
    let variant_id = record.variant_id.as_ref().map(ToString::to_string);
    let id = surrogate_id(product_id.as_deref(), variant_id.as_deref());

    let price = record
        .price
        .filter(|p| p.is_finite())
        .ok_or_else(|| RowError::MissingPrice(id.clone()))?;

    Ok(ProductRow {
        id,
        product_id,
        variant_id,
        product_title: record.product_title.clone(),
        vendor: record.vendor.clone(),
        price,
        size: record.size.clone(),
        color: record.color.clone(),
        length: record.length.clone(),
        inseam: record.inseam,
        available: record.available.unwrap_or(true),
        image_url: record.image_url.clone(),
        product_url: record.product_url.clone(),
        variant_title: record.variant_title.clone(),
        description: record.description.clone(),
        primary_category: record.primary_category.clone(),
        subcategory: record.subcategory.clone(),
    })
}
