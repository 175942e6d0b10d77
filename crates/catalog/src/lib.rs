//! Retailer catalog access: product lookups, store search, and the per-store
//! stock fan-out.

pub mod aggregator;
pub mod client;
pub mod error;

pub use aggregator::StockAggregator;
pub use client::{CatalogApi, HttpCatalogClient, ProductResponse};
pub use error::CatalogError;
