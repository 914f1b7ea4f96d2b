/*!
Manifest files

A manifest is an Avro file whose records wrap a [DataFile] descriptor. For data manifests the
descriptor points at a data file, for delete manifests at a position or equality delete file.
*/
use apache_avro::types::Value as AvroValue;
use derive_builder::Builder;
use derive_getters::Getters;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{
    error::Error,
    util::{as_int, as_int_array, as_long, as_string, field, optional, record_fields, required},
};

/// Content value assumed for data files that don't record one. v1 manifests only track data files.
pub const DEFAULT_CONTENT: i32 = 0;

#[derive(Debug, Serialize_repr, Deserialize_repr, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// Used to track additions and deletions
pub enum Status {
    /// Existing files
    Existing = 0,
    /// Added files
    Added = 1,
    /// Deleted files
    Deleted = 2,
}

impl TryFrom<i32> for Status {
    type Error = Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Existing),
            1 => Ok(Status::Added),
            2 => Ok(Status::Deleted),
            _ => Err(Error::Conversion(value.to_string(), "status".to_string())),
        }
    }
}

#[derive(Debug, Serialize_repr, Deserialize_repr, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// Type of content stored by the data file.
pub enum Content {
    /// Data.
    Data = 0,
    /// Deletes at position.
    PositionDeletes = 1,
    /// Delete by equality.
    EqualityDeletes = 2,
}

impl TryFrom<i32> for Content {
    type Error = Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Content::Data),
            1 => Ok(Content::PositionDeletes),
            2 => Ok(Content::EqualityDeletes),
            _ => Err(Error::Conversion(value.to_string(), "content".to_string())),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Getters, Builder)]
#[builder(build_fn(error = "Error"), setter(prefix = "with"))]
/// DataFile found in Manifest.
pub struct DataFile {
    /// Raw type of content in the file, see [Content]. Defaults to [DEFAULT_CONTENT] when the record doesn't carry it.
    #[builder(default = "DEFAULT_CONTENT")]
    content: i32,
    /// Full URI for the file with a FS scheme.
    #[builder(setter(into))]
    file_path: String,
    /// String file format name, avro, orc or parquet
    #[builder(setter(into, strip_option), default)]
    file_format: Option<String>,
    /// Number of records in this file
    #[builder(setter(strip_option), default)]
    record_count: Option<i64>,
    /// Total file size in bytes
    #[builder(setter(strip_option), default)]
    file_size_in_bytes: Option<i64>,
    /// Field ids used to determine row equality in equality delete files.
    #[builder(setter(strip_option), default)]
    equality_ids: Option<Vec<i32>>,
}

impl DataFile {
    /// Creates a new data file builder
    pub fn builder() -> DataFileBuilder {
        DataFileBuilder::default()
    }

    /// Typed content of the file. `None` for values outside of the Iceberg spec.
    pub fn content_type(&self) -> Option<Content> {
        Content::try_from(self.content).ok()
    }
}

impl TryFrom<&AvroValue> for DataFile {
    type Error = Error;
    fn try_from(value: &AvroValue) -> Result<Self, Self::Error> {
        let fields = record_fields(value, "data_file")?;
        Ok(DataFile {
            content: optional(fields, "content", as_int)?.unwrap_or(DEFAULT_CONTENT),
            file_path: required(fields, "file_path", "data_file", as_string)?,
            file_format: optional(fields, "file_format", as_string)?,
            record_count: optional(fields, "record_count", as_long)?,
            file_size_in_bytes: optional(fields, "file_size_in_bytes", as_long)?,
            equality_ids: optional(fields, "equality_ids", as_int_array)?,
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
/// Entry in manifest with the data file and its tracking information.
pub struct ManifestEntry {
    /// Used to track additions and deletions
    pub status: Option<Status>,
    /// Snapshot id where the file was added, or deleted if status is 2.
    pub snapshot_id: Option<i64>,
    /// Data sequence number of the file.
    pub sequence_number: Option<i64>,
    /// File path, partition tuple, metrics, …
    pub data_file: DataFile,
}

impl TryFrom<&AvroValue> for ManifestEntry {
    type Error = Error;
    fn try_from(value: &AvroValue) -> Result<Self, Self::Error> {
        let fields = record_fields(value, "manifest entry")?;
        let data_file = field(fields, "data_file")
            .ok_or_else(|| Error::MissingField("data_file".to_owned(), "manifest entry".to_owned()))?;
        Ok(ManifestEntry {
            status: optional(fields, "status", as_int)?
                .map(Status::try_from)
                .transpose()?,
            snapshot_id: optional(fields, "snapshot_id", as_long)?,
            sequence_number: optional(fields, "sequence_number", as_long)?,
            data_file: DataFile::try_from(data_file)?,
        })
    }
}
