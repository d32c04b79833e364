//! Normalization from raw Rainforest types to [`asinkit_core::ProductRecord`].
//!
//! This is the only place that looks at the `dimensions` shape; the record
//! that comes out carries a plain ordered list.

use asinkit_core::{Dimension, ProductRecord, VariantRef};
use serde_json::Value;

use crate::types::{RawDimension, RawDimensions, RawProduct, RawVariant};

/// Normalizes a raw [`RawProduct`] into a [`ProductRecord`].
///
/// Empty strings are treated as absent for `parent_asin`,
/// `title_excluding_variant_name`, and the category breadcrumb.
#[must_use]
pub fn normalize_product(product: RawProduct) -> ProductRecord {
    let asin = product.asin.trim().to_owned();
    let parent_asin = non_empty(product.parent_asin);
    let title_excluding_variant = non_empty(product.title_excluding_variant_name);

    let category = non_empty(product.categories_flat).or_else(|| {
        let names: Vec<&str> = product
            .categories
            .iter()
            .map(|c| c.name.trim())
            .filter(|n| !n.is_empty())
            .collect();
        (!names.is_empty()).then(|| names.join(" > "))
    });

    let variants = product
        .variants
        .into_iter()
        .filter_map(normalize_variant)
        .collect();

    ProductRecord {
        asin,
        parent_asin,
        title: product.title.unwrap_or_default(),
        title_excluding_variant,
        category,
        variants,
        dimensions: product
            .dimensions
            .map(resolve_dimensions)
            .unwrap_or_default(),
    }
}

/// A variant entry without an ASIN cannot be fetched and is dropped.
fn normalize_variant(variant: RawVariant) -> Option<VariantRef> {
    let asin = variant.asin.trim();
    if asin.is_empty() {
        tracing::debug!("dropping variant entry without an asin");
        return None;
    }
    Some(VariantRef {
        asin: asin.to_owned(),
        dimensions: variant.dimensions.map(resolve_dimensions),
        is_current_product: variant.is_current_product.unwrap_or_default(),
        title: non_empty(variant.title),
    })
}

/// Resolves a `dimensions` value into an ordered list.
///
/// - list: every named pair with a usable value, in source order;
/// - object: string-valued entries only, in key order;
/// - anything else: empty.
fn resolve_dimensions(raw: RawDimensions) -> Vec<Dimension> {
    match raw {
        RawDimensions::List(pairs) => resolve_pairs(pairs),
        RawDimensions::Map(map) => map
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::String(s) => Some(Dimension::new(name, s)),
                _ => None,
            })
            .collect(),
        RawDimensions::Other(_) => Vec::new(),
    }
}

fn resolve_pairs(pairs: Vec<RawDimension>) -> Vec<Dimension> {
    pairs
        .into_iter()
        .filter_map(|pair| {
            let name = non_empty(pair.name)?;
            let value = match pair.value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some(Dimension::new(name, value))
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
