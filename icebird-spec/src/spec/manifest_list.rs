//! Manifest list entries.
//!
//! A manifest list is an Avro file with one record per manifest of a snapshot. Only the
//! `manifest_path` field is required here. The remaining fields are read when present and
//! their absence is tolerated, so both v1 and v2 manifest lists convert.

use apache_avro::types::Value as AvroValue;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{
    error::Error,
    util::{as_int, as_long, as_string, optional, record_fields, required},
};

#[derive(Debug, PartialEq, Eq, Clone)]
/// One manifest file of a snapshot as recorded in its manifest list.
pub struct ManifestListEntry {
    /// Location of the manifest file
    pub manifest_path: String,
    /// Length of the manifest file in bytes
    pub manifest_length: Option<i64>,
    /// ID of a partition spec used to write the manifest
    pub partition_spec_id: Option<i32>,
    /// Raw type of files tracked by the manifest, 0 for data and 1 for deletes. Absent in v1 manifest lists.
    pub content: Option<i32>,
    /// The sequence number when the manifest was added to the table
    pub sequence_number: Option<i64>,
    /// The minimum sequence number of all data or delete files in the manifest
    pub min_sequence_number: Option<i64>,
    /// ID of the snapshot where the manifest file was added
    pub added_snapshot_id: Option<i64>,
    /// Number of entries in the manifest that have status ADDED (1)
    pub added_files_count: Option<i32>,
    /// Number of entries in the manifest that have status EXISTING (0)
    pub existing_files_count: Option<i32>,
    /// Number of entries in the manifest that have status DELETED (2)
    pub deleted_files_count: Option<i32>,
}

impl ManifestListEntry {
    /// Content of the manifest. `None` if it is not recorded or unknown.
    pub fn content_type(&self) -> Option<ManifestContent> {
        self.content.and_then(|x| ManifestContent::try_from(x).ok())
    }
}

#[derive(Debug, Serialize_repr, Deserialize_repr, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// Type of content tracked by a manifest.
pub enum ManifestContent {
    /// Data.
    Data = 0,
    /// Deletes
    Deletes = 1,
}

impl TryFrom<i32> for ManifestContent {
    type Error = Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ManifestContent::Data),
            1 => Ok(ManifestContent::Deletes),
            _ => Err(Error::Conversion(
                value.to_string(),
                "manifest content".to_string(),
            )),
        }
    }
}

impl TryFrom<&AvroValue> for ManifestListEntry {
    type Error = Error;
    fn try_from(value: &AvroValue) -> Result<Self, Self::Error> {
        let fields = record_fields(value, "manifest list entry")?;
        Ok(ManifestListEntry {
            manifest_path: required(fields, "manifest_path", "manifest list entry", as_string)?,
            manifest_length: optional(fields, "manifest_length", as_long)?,
            partition_spec_id: optional(fields, "partition_spec_id", as_int)?,
            content: optional(fields, "content", as_int)?,
            sequence_number: optional(fields, "sequence_number", as_long)?,
            min_sequence_number: optional(fields, "min_sequence_number", as_long)?,
            added_snapshot_id: optional(fields, "added_snapshot_id", as_long)?,
            // Older v1 writers use the *_data_files_count names
            added_files_count: match optional(fields, "added_files_count", as_int)? {
                Some(count) => Some(count),
                None => optional(fields, "added_data_files_count", as_int)?,
            },
            existing_files_count: match optional(fields, "existing_files_count", as_int)? {
                Some(count) => Some(count),
                None => optional(fields, "existing_data_files_count", as_int)?,
            },
            deleted_files_count: match optional(fields, "deleted_files_count", as_int)? {
                Some(count) => Some(count),
                None => optional(fields, "deleted_data_files_count", as_int)?,
            },
        })
    }
}
