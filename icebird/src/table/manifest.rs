//! Reading the entries of Iceberg manifest files.
//!
//! A manifest is an avro container file with one [`ManifestEntry`] per tracked data or delete
//! file. [`ManifestReader`] decodes the records lazily and converts every record into a
//! typed entry.

use std::iter::Map;

use apache_avro::types::Value as AvroValue;
use icebird_spec::manifest::ManifestEntry;
use tracing::instrument;

use crate::{
    error::Error,
    file_format::avro::{fetch_avro_records, AvroRecords},
    object_store::{store::FileFetcher, UrlResolver},
};

type ReaderMap = Map<
    AvroRecords,
    fn(Result<AvroValue, apache_avro::Error>) -> Result<ManifestEntry, Error>,
>;

/// An iterator over the entries of a manifest file.
pub struct ManifestReader {
    reader: ReaderMap,
}

impl Iterator for ManifestReader {
    type Item = Result<ManifestEntry, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}

impl ManifestReader {
    /// Wraps decoded avro records of a manifest file
    pub fn new(records: AvroRecords) -> Self {
        ManifestReader {
            reader: records.map(avro_value_to_manifest_entry as _),
        }
    }
}

fn avro_value_to_manifest_entry(
    value: Result<AvroValue, apache_avro::Error>,
) -> Result<ManifestEntry, Error> {
    Ok(ManifestEntry::try_from(&value?)?)
}

/// Fetches the manifest at `url` and returns a reader over its entries.
#[instrument(
    name = "icebird::table::manifest::fetch_manifest",
    level = "debug",
    skip(fetcher, resolver)
)]
pub async fn fetch_manifest(
    fetcher: &dyn FileFetcher,
    resolver: &UrlResolver,
    url: &str,
) -> Result<ManifestReader, Error> {
    fetch_avro_records(fetcher, resolver, url)
        .await
        .map(ManifestReader::new)
}
