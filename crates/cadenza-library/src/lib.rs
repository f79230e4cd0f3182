//! Library service for cadenza.
//!
//! Orchestrates load, rebuild, and persist cycles over the core catalog,
//! gates browse queries on a readiness signal, and provides the track-list
//! sources and configuration the binary wires together.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod browse;
pub mod config;
pub mod error;
pub mod service;
pub mod signal;
pub mod source;

pub use browse::ChildListing;
pub use config::Config;
pub use error::{LibraryError, LibraryResult};
pub use service::{LibraryService, LibraryState};
pub use signal::{Readiness, ReadinessSignal};
pub use source::{DirectoryTrackListSource, StaticTrackListSource, TrackListSource};
