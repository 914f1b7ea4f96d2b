#![deny(missing_docs)]
//! Resolve the files of the current snapshot of an [Apache Iceberg](https://iceberg.apache.org/) table.
//!
//! Starting from the table metadata this crate finds the manifests of the current snapshot,
//! collects the data files they track and reads the position and equality delete files into
//! lookup maps that a reader applies when it scans the data files.
//!
//! # Components
//!
//! * [`table`] - The [`table::Table`] facade, manifest resolution, file collection and delete maps
//! * [`object_store`] - Url resolution and the [`object_store::store::FileFetcher`] transport
//! * [`file_format`] - Decoding of avro manifests and parquet delete files
//! * [`error`] - Error types and handling
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//!
//! use icebird::object_store::store::HttpFetcher;
//! use icebird::table::{Table, TableConfig};
//!
//! let table = Table::load(
//!     "s3://bucket/warehouse/table/metadata/v3.metadata.json",
//!     Arc::new(HttpFetcher::new()),
//!     TableConfig::default(),
//! )
//! .await?;
//!
//! let scan = table.scan_files().await?;
//! for file in &scan.data_files {
//!     let deleted = scan.delete_maps.position_deletes.get(file.file_path());
//!     println!("{} {:?}", file.file_path(), deleted.map(|x| x.len()));
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file_format;
pub mod object_store;
pub mod table;
