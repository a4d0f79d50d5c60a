//! Catalog validation.
//!
//! # Responsibilities
//! - Semantic validation of a decoded `StoreConfig` (serde handles shape)
//! - Check that product sizes/colors come from the top-level vocabulary
//! - Repair a document in place so it satisfies those invariants
//!
//! # Design Decisions
//! - Returns every problem, not just the first
//! - Repair drops out-of-vocabulary entries; it never widens the vocabulary

use std::collections::HashSet;
use thiserror::Error;

use crate::catalog::schema::{Color, Size, StoreConfig};

/// A single semantic problem in a storefront document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("product {product} offers size {size} which is not in AVAILABLE_SIZES")]
    UnknownSize { product: String, size: Size },

    #[error("product {product} offers color '{color}' which is not in AVAILABLE_COLORS")]
    UnknownColor { product: String, color: Color },

    #[error("size {0} is listed more than once")]
    DuplicateSize(Size),

    #[error("color '{0}' is listed more than once")]
    DuplicateColor(Color),
}

/// Check every invariant, returning all violations.
pub fn validate_catalog(config: &StoreConfig) -> Result<(), Vec<CatalogError>> {
    let mut errors = Vec::new();

    let mut seen_sizes = HashSet::new();
    for size in &config.available_sizes {
        if !seen_sizes.insert(*size) {
            errors.push(CatalogError::DuplicateSize(*size));
        }
    }
    let mut seen_colors = HashSet::new();
    for color in &config.available_colors {
        if !seen_colors.insert(color) {
            errors.push(CatalogError::DuplicateColor(color.clone()));
        }
    }

    for (id, product) in &config.products {
        for size in &product.available_sizes {
            if !seen_sizes.contains(size) {
                errors.push(CatalogError::UnknownSize {
                    product: id.clone(),
                    size: *size,
                });
            }
        }
        for color in &product.available_colors {
            if !seen_colors.contains(color) {
                errors.push(CatalogError::UnknownColor {
                    product: id.clone(),
                    color: color.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Repair `config` so that `validate_catalog` passes.
///
/// Duplicate vocabulary entries keep their first position. Product sizes and
/// colors outside the vocabulary are removed. Returns what was changed.
pub fn sanitize_catalog(config: &mut StoreConfig) -> Vec<CatalogError> {
    let issues = match validate_catalog(config) {
        Ok(()) => return Vec::new(),
        Err(issues) => issues,
    };

    let mut seen = HashSet::new();
    config.available_sizes.retain(|s| seen.insert(*s));
    let sizes = seen;

    let mut seen = HashSet::new();
    config.available_colors.retain(|c| seen.insert(c.clone()));
    let colors = seen;

    for product in config.products.values_mut() {
        product.available_sizes.retain(|s| sizes.contains(s));
        product.available_colors.retain(|c| colors.contains(c));
    }

    issues
}
