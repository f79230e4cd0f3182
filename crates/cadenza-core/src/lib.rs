//! Core catalog engine for cadenza.
//!
//! This crate defines the genre/artist/album/track/item entity graph,
//! deterministic entity keying, the ingestion algorithm that links flat
//! track records into the graph, the colon-delimited path navigator, the
//! sorted index builder, and the SQLite snapshot schema.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod hashkey;
pub mod index;
pub mod model;
pub mod path;
pub mod record;
pub mod schema;

pub use catalog::{Catalog, CatalogBuilder, Counts};
pub use error::{Error, NavigationError, Result};
pub use index::{IndexBuilder, IndexDefinition, IndexEntry};
pub use path::{Navigator, Path, Start, Step};
pub use record::{TrackList, TrackMetadata, TrackRecord};
