use crate::classifier::{classify, map_category};
use crate::model::{ExternalId, FlattenedRecord, ProductDocument, VariantDocument};
use crate::parser::html_to_text;
use crate::utils::{parse_price, resolve_vendor};
use serde_json::Value;
use tracing::{debug, warn};

/// Product-level columns shared by every variant of one document.
#[derive(Debug, Clone)]
struct ProductContext<'a> {
    product_id: Option<ExternalId>,
    product_title: Option<String>,
    title: &'a str,
    description: String,
    image_url: Option<String>,
    category: Option<String>,
    vendor: Option<String>,
    product_url: Option<String>,
    primary_category: &'static str,
    subcategory: Option<&'static str>,
}

impl<'a> ProductContext<'a> {
    fn new(doc: &'a ProductDocument) -> Self {
        let title = doc.title.as_deref().unwrap_or("");
        let product_type = doc.product_type.as_deref().unwrap_or("");
        let tags = doc.tags.as_deref().unwrap_or(&[]);
        let category = map_category(title, product_type, tags);

        // The document's own product_url beats the one built from store + handle.
        let product_url = doc.product_url.clone().or_else(|| {
            match (doc.store.as_deref(), doc.handle.as_deref()) {
                (Some(store), Some(handle)) => Some(format!("{}/products/{}", store, handle)),
                _ => None,
            }
        });

        Self {
            product_id: doc.id.clone(),
            product_title: doc.title.clone(),
            title,
            description: html_to_text(doc.body_html.as_deref().unwrap_or("")),
            image_url: first_image(&doc.images),
            category: doc.product_type.clone(),
            vendor: resolve_vendor(&doc.vendor, doc.store.as_deref()),
            product_url,
            primary_category: category.primary,
            subcategory: category.subcategory,
        }
    }

    fn record(&self, variant: &VariantDocument) -> FlattenedRecord {
        let variant_title = variant.title.as_deref().unwrap_or("");
        let attrs = classify(&variant.option_values(), variant_title, self.title);

        let price = parse_price(&variant.price);
        if price.is_none() && !variant.price.is_null() {
            debug!("Unparseable price {} for variant {:?}", variant.price, variant.id);
        }

        FlattenedRecord {
            product_id: self.product_id.clone(),
            variant_id: variant.id.clone(),
            product_title: self.product_title.clone(),
            variant_title: variant.title.clone(),
            description: Some(self.description.clone()),
            image_url: self.image_url.clone(),
            category: self.category.clone(),
            vendor: self.vendor.clone(),
            price,
            available: variant.available,
            size: attrs.size,
            color: attrs.color,
            length: attrs.length,
            inseam: attrs.inseam,
            product_url: self.product_url.clone(),
            primary_category: Some(self.primary_category.to_string()),
            subcategory: self.subcategory.map(str::to_string),
        }
    }
}

fn first_image(images: &Value) -> Option<String> {
    images
        .as_array()?
        .first()?
        .get("src")?
        .as_str()
        .map(str::to_string)
}

/// Explodes one product into a record per variant. Documents whose `variants`
/// is not a list produce nothing.
pub fn flatten_document(doc: &ProductDocument) -> Vec<FlattenedRecord> {
    let Some(variants) = doc.variants.as_array() else {
        warn!("Skipping product {:?}: variants is not a list", doc.id);
        return Vec::new();
    };

    let context = ProductContext::new(doc);
    variants
        .iter()
        .filter_map(|raw| match serde_json::from_value::<VariantDocument>(raw.clone()) {
            Ok(variant) => Some(context.record(&variant)),
            Err(e) => {
                warn!("Skipping malformed variant of product {:?}: {}", doc.id, e);
                None
            }
        })
        .collect()
}

/// Flattens a whole batch, preserving document and variant order.
pub fn flatten(documents: &[ProductDocument]) -> Vec<FlattenedRecord> {
    documents.iter().flat_map(flatten_document).collect()
}
