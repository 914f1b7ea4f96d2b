//! Typed model of the Apache Iceberg metadata needed to resolve the files of a snapshot
//!
//! This crate holds the data structures that the `icebird` runtime reads from an
//! Iceberg table. It includes:
//!
//! - Table metadata and snapshots, deserialized from the JSON metadata file
//! - Manifest list entries and manifest entries, converted from decoded Avro records
//! - Content discriminators for data files, position deletes and equality deletes
//!
//! The crate is organized into several modules:
//!
//! - `spec`: Metadata types and their conversions
//! - `error`: Error types and handling
//! - `util`: Common utility functions
//!
pub mod error;
pub mod spec;
pub mod util;

pub use spec::*;
