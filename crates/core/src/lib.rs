pub mod config;
pub mod domain;
pub mod errors;
pub mod links;
pub mod pricing;
pub mod summary;

pub use domain::product::{upstream_error_message, ProductCode, ProductRecord};
pub use domain::store::{StockAggregate, StoreCandidate, StoreStock};
pub use errors::{ApplicationError, DomainError};
pub use links::ProductLinks;
pub use summary::ProductSummary;
