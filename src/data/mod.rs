//! Core data models for the catalog pipeline
//!
//! This module contains the product records as received from the API, the
//! enriched records the pipeline derives from them, and the per-category
//! grouping that gets written to disk.

pub mod products;

pub use products::{
    FetchError, FetchReport, FetchSource, HttpResponse, ProductTransport, ProductsClient,
    ReqwestTransport, TransportError,
};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A product exactly as the API returns it
///
/// Every field is optional; missing, `null` or wrongly typed values fall back
/// to zero or empty when the product is consumed. Unknown fields are ignored.
/// The product itself must still be a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    /// Product identifier
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    /// Display title
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    /// Price in the store currency
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<f64>,
    /// Category name used for grouping
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    /// Free-form description
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

/// Reads any JSON value and keeps it only if it has the expected type
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl RawProduct {
    /// Identifier, or 0 when absent
    pub fn id_or_default(&self) -> i64 {
        self.id.unwrap_or_default()
    }

    /// Title, or an empty string when absent
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Price, or 0.0 when absent
    pub fn price_or_default(&self) -> f64 {
        self.price.unwrap_or_default()
    }

    /// Category, or an empty string when absent
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }
}

/// A product with the derived pricing, stock and popularity fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProduct {
    pub id: i64,
    pub title: String,
    pub original_price: f64,
    /// `original_price` reduced by a random percentage, rounded to cents
    pub discounted_price: f64,
    pub stock: u32,
    /// Average of the price and an independently drawn stock sample, rounded to cents
    pub popularity_score: f64,
}

impl EnrichedProduct {
    /// Column names of the CSV header row, in serialization order
    pub const FIELD_NAMES: [&'static str; 6] = [
        "id",
        "title",
        "originalPrice",
        "discountedPrice",
        "stock",
        "popularityScore",
    ];
}

/// Enriched products grouped by category name
///
/// Categories iterate in sorted order; products within a category keep the
/// order they were inserted in (descending by original price).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedCatalog {
    groups: BTreeMap<String, Vec<EnrichedProduct>>,
}

impl GroupedCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `product` to the end of `category`, creating the group if needed
    pub fn push(&mut self, category: impl Into<String>, product: EnrichedProduct) {
        self.groups.entry(category.into()).or_default().push(product);
    }

    /// Products of a single category, if present
    pub fn get(&self, category: &str) -> Option<&[EnrichedProduct]> {
        self.groups.get(category).map(Vec::as_slice)
    }

    /// Iterates categories in stored order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EnrichedProduct])> {
        self.groups
            .iter()
            .map(|(category, products)| (category.as_str(), products.as_slice()))
    }

    /// Iterates every product across all categories, in stored order
    pub fn products(&self) -> impl Iterator<Item = &EnrichedProduct> {
        self.groups.values().flatten()
    }

    /// Number of distinct categories
    pub fn category_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of products across all categories
    pub fn product_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Whether the catalog has no categories
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched(id: i64, price: f64) -> EnrichedProduct {
        EnrichedProduct {
            id,
            title: format!("Product {}", id),
            original_price: price,
            discounted_price: price,
            stock: 1,
            popularity_score: price / 2.0,
        }
    }

    #[test]
    fn test_raw_product_parses_api_shape() {
        let json = r#"{
            "id": 1,
            "title": "Backpack",
            "price": 109.95,
            "category": "men's clothing",
            "description": "Your perfect pack",
            "image": "https://example.com/1.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }"#;

        let product: RawProduct = serde_json::from_str(json).expect("Failed to parse");
        assert_eq!(product.id, Some(1));
        assert_eq!(product.title_or_default(), "Backpack");
        assert_eq!(product.price_or_default(), 109.95);
        assert_eq!(product.category_or_default(), "men's clothing");
    }

    #[test]
    fn test_raw_product_missing_fields_default() {
        let product: RawProduct = serde_json::from_str(r#"{"id": null}"#).expect("Failed to parse");
        assert_eq!(product.id_or_default(), 0);
        assert_eq!(product.title_or_default(), "");
        assert_eq!(product.price_or_default(), 0.0);
        assert_eq!(product.category_or_default(), "");
    }

    #[test]
    fn test_raw_product_off_type_fields_default() {
        let json = r#"[
            {"id": 1, "title": "Backpack", "price": 109.95, "category": "bags"},
            {"id": "7", "title": 42, "price": "cheap", "category": ["a"], "description": {}},
            {"id": 1.0, "price": 2}
        ]"#;

        let products: Vec<RawProduct> = serde_json::from_str(json).expect("Failed to parse");
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].id, Some(1));

        assert_eq!(products[1].id, None);
        assert_eq!(products[1].id_or_default(), 0);
        assert_eq!(products[1].title_or_default(), "");
        assert_eq!(products[1].price_or_default(), 0.0);
        assert_eq!(products[1].category_or_default(), "");
        assert!(products[1].description.is_none());

        assert_eq!(products[2].id_or_default(), 0);
        assert_eq!(products[2].price_or_default(), 2.0);
    }

    #[test]
    fn test_raw_product_list_rejects_non_object_element() {
        let result: Result<Vec<RawProduct>, _> = serde_json::from_str(r#"[{"id": 1}, "oops"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_product_rejects_non_object() {
        let result: Result<RawProduct, _> = serde_json::from_str("42");
        assert!(result.is_err());
    }

    #[test]
    fn test_enriched_product_uses_camel_case_fields() {
        let json = serde_json::to_value(enriched(3, 10.0)).expect("Failed to serialize");
        let object = json.as_object().expect("Should be an object");

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        let mut expected = EnrichedProduct::FIELD_NAMES.to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_grouped_catalog_counts() {
        let mut catalog = GroupedCatalog::new();
        assert!(catalog.is_empty());

        catalog.push("electronics", enriched(1, 500.0));
        catalog.push("electronics", enriched(2, 100.0));
        catalog.push("jewelery", enriched(3, 50.0));

        assert_eq!(catalog.category_count(), 2);
        assert_eq!(catalog.product_count(), 3);
        assert_eq!(catalog.get("electronics").map(<[_]>::len), Some(2));
        assert!(catalog.get("books").is_none());
    }

    #[test]
    fn test_grouped_catalog_serializes_as_plain_object() {
        let mut catalog = GroupedCatalog::new();
        catalog.push("jewelery", enriched(3, 50.0));

        let json = serde_json::to_value(&catalog).expect("Failed to serialize");
        assert!(json["jewelery"].is_array());
        assert_eq!(json["jewelery"][0]["originalPrice"], 50.0);
    }
}
