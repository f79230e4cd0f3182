//! The catalog store and the ingestion algorithm that fills it.

pub mod builder;
pub mod store;

pub use builder::CatalogBuilder;
pub use store::{Catalog, Counts, LIBRARY_KEY};
