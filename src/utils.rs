// Utility functions
use crate::normalizer::title_case;
use serde_json::Value;

pub const INPUT_PREFIX: &str = "raw-shopify";
pub const OUTPUT_PREFIX: &str = "cleaned-shopify";

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£'];

/// Parses a variant price given either as a JSON number or as text like `"$ 49.00"`.
pub fn parse_price(raw: &Value) -> Option<f64> {
    let price = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s
            .trim()
            .trim_start_matches(CURRENCY_SYMBOLS)
            .trim()
            .parse::<f64>()
            .ok()?,
        _ => return None,
    };
    price.is_finite().then_some(price)
}

/// Brand name guessed from a store URL: `https://www.chic-thread.com` → `Chic Thread`.
pub fn vendor_from_store(store: &str) -> Option<String> {
    let host = store
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let name = host.split('.').next().unwrap_or_default().replace('-', " ");
    if name.trim().is_empty() {
        return None;
    }
    Some(title_case(&name))
}

/// Vendor column: storefronts that publish a numeric vendor id get a name
/// derived from their store URL instead. A numeric vendor with no usable
/// store URL yields `None`, not an empty string.
pub fn resolve_vendor(raw: &Value, store: Option<&str>) -> Option<String> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        store.and_then(vendor_from_store)
    } else {
        Some(text)
    }
}

/// Where the flattened artifact for `input_key` is written.
pub fn output_key(input_key: &str) -> String {
    input_key.replace(INPUT_PREFIX, OUTPUT_PREFIX)
}
