//! Storefront catalog document.
//!
//! # Data Flow
//! ```text
//! config.json (remote blob or cached copy)
//!     → schema.rs (serde decode; rejects structurally malformed documents)
//!     → validation.rs (subset invariants; repair by dropping stray entries)
//!     → StoreConfig (published to the resolved state)
//!
//! Nothing usable anywhere:
//!     → defaults.rs (built-in document)
//! ```

pub mod defaults;
pub mod schema;
pub mod validation;

pub use defaults::builtin_config;
pub use schema::{Color, DeliveryPrice, Discounts, Product, Size, StoreConfig, StoreInfo};
pub use validation::{sanitize_catalog, validate_catalog, CatalogError};
