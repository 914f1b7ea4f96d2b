//! Snapshots of an Iceberg table.
//!
//! A [`Snapshot`] records the state of a table at one point in time. Its files are reached
//! through a manifest list file (the usual layout) or, for old v1 tables, through an inline
//! list of manifests stored directly in the table metadata. [`ManifestSource`] exposes
//! whichever of the two a snapshot carries.

use std::{collections::HashMap, fmt, str};

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use crate::{error::Error, manifest_list::ManifestContent};

use _serde::InlineManifestEnum;

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, Builder, Getters)]
#[serde(rename_all = "kebab-case")]
#[builder(build_fn(error = "Error"), setter(prefix = "with"))]
/// A snapshot represents the state of a table at some time and is used to access the complete set of data files in the table.
pub struct Snapshot {
    /// A unique long ID
    snapshot_id: i64,
    /// The snapshot ID of the snapshot’s parent.
    /// Omitted for any snapshot with no parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option), default)]
    parent_snapshot_id: Option<i64>,
    /// A monotonically increasing long that tracks the order of
    /// changes to a table. 0 for v1 tables.
    #[serde(default)]
    #[builder(default)]
    sequence_number: i64,
    /// A timestamp when the snapshot was created
    #[serde(default)]
    #[builder(default)]
    timestamp_ms: i64,
    /// The location of a manifest list for this snapshot that
    /// tracks manifest files with additional metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option), default)]
    manifest_list: Option<String>,
    /// Manifests stored inline in the metadata. Only written by v1 tables without a manifest list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option), default)]
    manifests: Option<Vec<InlineManifest>>,
    /// A string map that summarizes the snapshot changes, including operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option), default)]
    summary: Option<Summary>,
    /// ID of the table’s current schema when the snapshot was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option), default)]
    schema_id: Option<i32>,
}

impl Snapshot {
    /// Creates a new snapshot builder
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Where the manifests of this snapshot are listed. A manifest list takes precedence over
    /// inline manifests. Returns `None` if the snapshot carries neither.
    pub fn manifest_source(&self) -> Option<ManifestSource<'_>> {
        match (&self.manifest_list, &self.manifests) {
            (Some(manifest_list), _) if !manifest_list.is_empty() => {
                Some(ManifestSource::ManifestList(manifest_list))
            }
            (_, Some(manifests)) => Some(ManifestSource::Inline(manifests)),
            _ => None,
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            &serde_json::to_string(self).map_err(|_| fmt::Error)?,
        )
    }
}

impl str::FromStr for Snapshot {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(Error::from)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// The location of the manifests belonging to a snapshot
pub enum ManifestSource<'a> {
    /// Url of an avro manifest list file
    ManifestList(&'a str),
    /// Manifests listed directly in the table metadata
    Inline(&'a [InlineManifest]),
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(from = "InlineManifestEnum", into = "InlineManifestEnum")]
/// A manifest referenced directly from the snapshot.
pub struct InlineManifest {
    /// Location of the manifest file
    pub manifest_path: String,
    /// Raw content discriminator, if the metadata records one
    pub content: Option<i32>,
}

impl InlineManifest {
    /// Creates an inline manifest reference without content information
    pub fn new(manifest_path: impl Into<String>) -> Self {
        InlineManifest {
            manifest_path: manifest_path.into(),
            content: None,
        }
    }

    /// Content of the manifest. `None` if it is not recorded or unknown.
    pub fn content_type(&self) -> Option<ManifestContent> {
        self.content.and_then(|x| ManifestContent::try_from(x).ok())
    }
}

mod _serde {
    use serde::{Deserialize, Serialize};

    use super::InlineManifest;

    /// v1 metadata stores plain paths, other writers store objects
    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
    #[serde(untagged)]
    pub(super) enum InlineManifestEnum {
        Path(String),
        Entry {
            manifest_path: String,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            content: Option<i32>,
        },
    }

    impl From<InlineManifestEnum> for InlineManifest {
        fn from(value: InlineManifestEnum) -> Self {
            match value {
                InlineManifestEnum::Path(manifest_path) => InlineManifest {
                    manifest_path,
                    content: None,
                },
                InlineManifestEnum::Entry {
                    manifest_path,
                    content,
                } => InlineManifest {
                    manifest_path,
                    content,
                },
            }
        }
    }

    impl From<InlineManifest> for InlineManifestEnum {
        fn from(value: InlineManifest) -> Self {
            match value.content {
                None => InlineManifestEnum::Path(value.manifest_path),
                Some(content) => InlineManifestEnum::Entry {
                    manifest_path: value.manifest_path,
                    content: Some(content),
                },
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "lowercase")]
/// The operation that produced a snapshot.
pub enum Operation {
    /// Only data files were added and no files were removed.
    #[default]
    Append,
    /// Data and delete files were added and removed without changing table data;
    /// i.e., compaction, changing the data file format, or relocating data files.
    Replace,
    /// Data and delete files were added and removed in a logical overwrite operation.
    Overwrite,
    /// Data files were removed and their contents logically deleted and/or delete files were added to delete rows.
    Delete,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
/// Summarises the changes in the snapshot.
pub struct Summary {
    /// The type of operation in the snapshot
    #[serde(default)]
    pub operation: Operation,
    /// Other summary data.
    #[serde(flatten)]
    pub other: HashMap<String, String>,
}
