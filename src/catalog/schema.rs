//! Storefront configuration schema.
//!
//! This is the document stored remotely as `config.json` and cached locally.
//! Field names follow the upper-case keys the storefront has always
//! published; camelCase aliases are accepted when decoding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Root storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Catalog keyed by product id.
    #[serde(rename = "PRODUCTS", alias = "products")]
    pub products: BTreeMap<String, Product>,

    /// Delivery fees keyed by region label.
    #[serde(rename = "DELIVERY_PRICES", alias = "deliveryPrices", default)]
    pub delivery_prices: BTreeMap<String, DeliveryPrice>,

    /// Quantity discount rule.
    #[serde(rename = "DISCOUNTS", alias = "discounts", default)]
    pub discounts: Discounts,

    /// Store metadata shown in the header and footer.
    #[serde(rename = "STORE_INFO", alias = "storeInfo", default)]
    pub store_info: StoreInfo,

    /// Suggested size for a child's age.
    #[serde(rename = "AGE_SIZES", alias = "ageToSize", default)]
    pub age_to_size: BTreeMap<u8, Size>,

    /// Color vocabulary, in display order.
    #[serde(rename = "AVAILABLE_COLORS", alias = "availableColors")]
    pub available_colors: Vec<Color>,

    /// Size vocabulary, in display order.
    #[serde(rename = "AVAILABLE_SIZES", alias = "availableSizes")]
    pub available_sizes: Vec<Size>,
}

impl StoreConfig {
    /// Iterate over every non-empty product image reference.
    pub fn image_refs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.products
            .iter()
            .filter(|(_, p)| !p.image.is_empty())
            .map(|(id, p)| (id.as_str(), p.image.as_str()))
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,

    /// Unit price in the store's currency (whole units).
    pub price: u64,

    /// Absolute image URL. Empty when the product has no picture.
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub available_sizes: Vec<Size>,

    #[serde(default)]
    pub available_colors: Vec<Color>,
}

/// Delivery fees for one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct DeliveryPrice {
    /// Home delivery fee.
    pub home: u64,
    /// Pickup-desk fee.
    pub desk: u64,
}

/// Per-unit discount once an order reaches a quantity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discounts {
    pub min_quantity_for_discount: u32,
    pub discount_per_item: u64,
}

impl Default for Discounts {
    fn default() -> Self {
        Self {
            min_quantity_for_discount: 2,
            discount_per_item: 0,
        }
    }
}

impl Discounts {
    /// Total discount for an order of `quantity` units.
    pub fn discount_for(&self, quantity: u32) -> u64 {
        if self.min_quantity_for_discount > 0 && quantity >= self.min_quantity_for_discount {
            self.discount_per_item.saturating_mul(quantity as u64)
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    /// Contact numbers, primary first.
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

/// Garment size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Size {
    #[serde(rename = "XS")]
    ExtraSmall,
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
    #[serde(rename = "XL")]
    ExtraLarge,
    #[serde(rename = "XXL")]
    DoubleExtraLarge,
    #[serde(rename = "XXXL")]
    TripleExtraLarge,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::ExtraSmall => "XS",
            Size::Small => "S",
            Size::Medium => "M",
            Size::Large => "L",
            Size::ExtraLarge => "XL",
            Size::DoubleExtraLarge => "XXL",
            Size::TripleExtraLarge => "XXXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A color label from the tenant's vocabulary.
///
/// Labels are free text chosen by the tenant (often not in English), so this
/// is a string newtype rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
