//! Table metadata for Iceberg tables
//!
//! Only the parts of the metadata file needed to locate the files of a snapshot are modelled
//! here. Unknown keys are ignored on deserialization, so full v1 and v2 metadata files parse.
//!
//! The table metadata format is defined in the [Iceberg Table Spec](https://iceberg.apache.org/spec/#table-metadata)

use std::{collections::HashMap, fmt, str};

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::Error;

use super::snapshot::Snapshot;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
/// Table metadata as stored in the `*.metadata.json` file of a table.
pub struct TableMetadata {
    #[serde(default)]
    /// Integer Version for the format.
    pub format_version: FormatVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// A UUID that identifies the table
    pub table_uuid: Option<String>,
    #[serde(default)]
    /// Location tables base location
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Timestamp in milliseconds from the unix epoch when the table was last updated.
    pub last_updated_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// long ID of the current table snapshot. Writers use -1 when there is none.
    pub current_snapshot_id: Option<i64>,
    #[serde(default)]
    /// A list of valid snapshots.
    pub snapshots: Vec<Snapshot>,
    #[serde(default)]
    ///A string to string map of table properties.
    pub properties: HashMap<String, String>,
}

impl TableMetadata {
    /// Looks up a snapshot by id
    pub fn snapshot(&self, snapshot_id: i64) -> Option<&Snapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| *snapshot.snapshot_id() == snapshot_id)
    }
}

impl fmt::Display for TableMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            &serde_json::to_string(self).map_err(|_| fmt::Error)?,
        )
    }
}

impl str::FromStr for TableMetadata {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(Error::from)
    }
}

/// Iceberg format version
#[derive(Debug, Serialize_repr, Deserialize_repr, PartialEq, Eq, Clone, Copy, Default)]
#[repr(u8)]
pub enum FormatVersion {
    /// Iceberg spec version 1. Assumed when the metadata omits the version.
    #[default]
    V1 = 1,
    /// Iceberg spec version 2
    V2 = 2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ManifestSource;

    #[test]
    fn deserialize_table_data_v2() {
        let data = r#"
            {
                "format-version" : 2,
                "table-uuid": "fb072c92-a02b-11e9-ae9c-1bb7bc9eca94",
                "location": "s3://b/wh/data.db/table",
                "last-sequence-number" : 1,
                "last-updated-ms": 1515100955770,
                "last-column-id": 1,
                "schemas": [
                    {
                        "schema-id" : 1,
                        "type" : "struct",
                        "fields" :[
                            {
                                "id": 1,
                                "name": "struct_name",
                                "required": true,
                                "type": "fixed[1]"
                            }
                        ]
                    }
                ],
                "current-schema-id" : 1,
                "partition-specs": [
                    {
                        "spec-id": 1,
                        "fields": []
                    }
                ],
                "default-spec-id": 1,
                "last-partition-id": 1000,
                "properties": {
                    "commit.retry.num-retries": "1"
                },
                "current-snapshot-id": 638933773299822130,
                "snapshots": [
                    {
                        "snapshot-id": 638933773299822130,
                        "timestamp-ms": 1662532818843,
                        "sequence-number": 1,
                        "summary": { "operation": "append" },
                        "manifest-list": "s3://b/wh/data.db/table/metadata/snap-638933773299822130-1.avro",
                        "schema-id": 1
                    }
                ],
                "metadata-log": [],
                "sort-orders": [],
                "default-sort-order-id": 0
            }
        "#;
        let metadata: TableMetadata = data.parse().unwrap();
        assert_eq!(metadata.format_version, FormatVersion::V2);
        assert_eq!(metadata.current_snapshot_id, Some(638933773299822130));
        let snapshot = metadata.snapshot(638933773299822130).unwrap();
        assert_eq!(
            snapshot.manifest_source(),
            Some(ManifestSource::ManifestList(
                "s3://b/wh/data.db/table/metadata/snap-638933773299822130-1.avro"
            ))
        );
        assert!(metadata.snapshot(1).is_none());
    }

    #[test]
    fn deserialize_table_data_v1_without_snapshots() {
        let data = r#"
            {
                "format-version" : 1,
                "location": "/tmp/table",
                "current-snapshot-id": -1
            }
        "#;
        let metadata: TableMetadata = data.parse().unwrap();
        assert_eq!(metadata.format_version, FormatVersion::V1);
        assert_eq!(metadata.current_snapshot_id, Some(-1));
        assert!(metadata.snapshots.is_empty());
    }
}
