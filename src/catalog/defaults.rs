//! Built-in storefront configuration.
//!
//! Used only when neither the remote store nor the local cache produced a
//! document. It is deliberately small but renders a working storefront.

use std::collections::BTreeMap;

use crate::catalog::schema::{
    Color, DeliveryPrice, Discounts, Product, Size, StoreConfig, StoreInfo,
};

const DEFAULT_IMAGE: &str = "https://raw.githubusercontent.com/ahcene43/WAW/main/images/modal1.jpg";

const DEFAULT_COLORS: [&str; 12] = [
    "كما في الصورة",
    "أبيض",
    "أسود",
    "رمادي",
    "أزرق",
    "أحمر",
    "أخضر",
    "زهري",
    "بنفسجي",
    "أصفر",
    "برتقالي",
    "ذهبي",
];

/// Build the fallback configuration.
pub fn builtin_config() -> StoreConfig {
    let mut products = BTreeMap::new();
    products.insert(
        "1".to_string(),
        Product {
            name: "مودال 1".to_string(),
            price: 3300,
            image: DEFAULT_IMAGE.to_string(),
            description: "تصميم مريح وعصري مع تفاصيل راقية تناسب جميع المناسبات".to_string(),
            available_sizes: vec![Size::Small, Size::Medium, Size::Large],
            available_colors: ["كما في الصورة", "أبيض", "أسود", "أزرق"]
                .into_iter()
                .map(Color::from)
                .collect(),
        },
    );

    let mut delivery_prices = BTreeMap::new();
    delivery_prices.insert(
        "00 - إختر الولاية".to_string(),
        DeliveryPrice { home: 0, desk: 0 },
    );
    delivery_prices.insert(
        "16 - الجزائر".to_string(),
        DeliveryPrice { home: 500, desk: 250 },
    );

    let mut age_to_size = BTreeMap::new();
    for (ages, size) in [
        (3..=5, Size::Small),
        (6..=7, Size::Medium),
        (8..=9, Size::Large),
        (10..=12, Size::ExtraLarge),
    ] {
        for age in ages {
            age_to_size.insert(age, size);
        }
    }

    StoreConfig {
        products,
        delivery_prices,
        discounts: Discounts {
            min_quantity_for_discount: 2,
            discount_per_item: 300,
        },
        store_info: StoreInfo {
            name: "BEN&KRAB-Shopp".to_string(),
            tagline: "متجر أفخم الملابس للأطفال".to_string(),
            phone_numbers: vec!["0671466489".to_string(), "0551102155".to_string()],
        },
        age_to_size,
        available_colors: DEFAULT_COLORS.into_iter().map(Color::from).collect(),
        available_sizes: vec![
            Size::Small,
            Size::Medium,
            Size::Large,
            Size::ExtraLarge,
            Size::DoubleExtraLarge,
        ],
    }
}
