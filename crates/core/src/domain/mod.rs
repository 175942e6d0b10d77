pub mod product;
pub mod store;
