/*!
 * Resolving the manifests of the current snapshot.
 *
 * The manifests of a snapshot are listed in a manifest list file or, for old v1 tables, inline in
 * the table metadata. [resolve_manifests] splits them into data manifests and delete manifests.
*/

use std::iter::Map;

use apache_avro::types::Value as AvroValue;
use futures::{stream, StreamExt, TryStreamExt};
use icebird_spec::{
    manifest::Content,
    manifest_list::{ManifestContent, ManifestListEntry},
    snapshot::ManifestSource,
    table_metadata::TableMetadata,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::Error,
    file_format::avro::{fetch_avro_records, AvroRecords},
    object_store::{store::FileFetcher, UrlResolver},
};

use super::{manifest::fetch_manifest, TableConfig};

/// How the content of a manifest (data or deletes) is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestClassification {
    /// Fetch every manifest and use the content of its first entry. Empty manifests are skipped.
    ///
    /// Iceberg writers never mix data and delete files in one manifest, so the first entry
    /// stands for the whole file. A manifest that does mix them is classified by its first entry only.
    #[default]
    FirstEntry,
    /// Use the content recorded with the manifest reference. References without a content value
    /// fall back to [ManifestClassification::FirstEntry].
    ManifestList,
}

/// The manifests of a snapshot, split by content. Both lists keep the order of the manifest list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestUrls {
    /// Manifests tracking data files
    pub data_manifest_urls: Vec<String>,
    /// Manifests tracking position or equality delete files
    pub delete_manifest_urls: Vec<String>,
}

type ReaderMap = Map<
    AvroRecords,
    fn(Result<AvroValue, apache_avro::Error>) -> Result<ManifestListEntry, Error>,
>;

/// An iterator over the entries of a manifest list file.
pub struct ManifestListReader {
    reader: ReaderMap,
}

impl Iterator for ManifestListReader {
    type Item = Result<ManifestListEntry, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}

impl ManifestListReader {
    /// Wraps decoded avro records of a manifest list file
    pub fn new(records: AvroRecords) -> Self {
        ManifestListReader {
            reader: records.map(avro_value_to_manifest_list_entry as _),
        }
    }
}

fn avro_value_to_manifest_list_entry(
    value: Result<AvroValue, apache_avro::Error>,
) -> Result<ManifestListEntry, Error> {
    Ok(ManifestListEntry::try_from(&value?)?)
}

/// Fetches the manifest list at `url` and returns a reader over its entries.
#[instrument(
    name = "icebird::table::manifest_list::fetch_manifest_list",
    level = "debug",
    skip(fetcher, resolver)
)]
pub async fn fetch_manifest_list(
    fetcher: &dyn FileFetcher,
    resolver: &UrlResolver,
    url: &str,
) -> Result<ManifestListReader, Error> {
    fetch_avro_records(fetcher, resolver, url)
        .await
        .map(ManifestListReader::new)
}

// A manifest reference independent of where the snapshot lists it
struct ManifestRef {
    path: String,
    content: Option<i32>,
}

/// Resolves the data and delete manifests of the current snapshot of the table.
///
/// Fails with [Error::NoCurrentSnapshot] if the metadata has no (or a negative) current snapshot id.
/// A current snapshot id of `0` is a valid id and is looked up like any other. It fails
/// with [Error::SnapshotNotFound] if that id doesn't reference a snapshot and with
/// [Error::NoManifestInformation] if the snapshot lists no manifests. Manifests are classified
/// according to [TableConfig::classification], at most [TableConfig::manifest_concurrency] at a time.
#[instrument(
    name = "icebird::table::manifest_list::resolve_manifests",
    level = "debug",
    skip(metadata, fetcher, config),
    fields(snapshot_id = ?metadata.current_snapshot_id)
)]
pub async fn resolve_manifests(
    metadata: &TableMetadata,
    fetcher: &dyn FileFetcher,
    config: &TableConfig,
) -> Result<ManifestUrls, Error> {
    let snapshot_id = metadata
        .current_snapshot_id
        .filter(|id| *id >= 0)
        .ok_or(Error::NoCurrentSnapshot)?;
    let snapshot = metadata
        .snapshot(snapshot_id)
        .ok_or(Error::SnapshotNotFound(snapshot_id))?;

    let manifests: Vec<ManifestRef> = match snapshot.manifest_source() {
        Some(ManifestSource::ManifestList(url)) => {
            fetch_manifest_list(fetcher, config.url_resolver(), url)
                .await?
                .map(|entry| {
                    entry.map(|entry| ManifestRef {
                        path: entry.manifest_path,
                        content: entry.content,
                    })
                })
                .collect::<Result<_, _>>()?
        }
        Some(ManifestSource::Inline(manifests)) => manifests
            .iter()
            .map(|manifest| ManifestRef {
                path: manifest.manifest_path.clone(),
                content: manifest.content,
            })
            .collect(),
        None => return Err(Error::NoManifestInformation(snapshot_id)),
    };
    debug!(manifests = manifests.len(), "listed manifests");

    let classified: Vec<(String, Option<ManifestContent>)> = stream::iter(manifests)
        .map(|manifest| classify_manifest(manifest, fetcher, config))
        .buffered((*config.manifest_concurrency()).max(1))
        .try_collect()
        .await?;

    let mut urls = ManifestUrls::default();
    for (path, content) in classified {
        match content {
            Some(ManifestContent::Data) => urls.data_manifest_urls.push(path),
            Some(ManifestContent::Deletes) => urls.delete_manifest_urls.push(path),
            None => (),
        }
    }
    debug!(
        data_manifests = urls.data_manifest_urls.len(),
        delete_manifests = urls.delete_manifest_urls.len(),
        "classified manifests"
    );
    Ok(urls)
}

async fn classify_manifest(
    manifest: ManifestRef,
    fetcher: &dyn FileFetcher,
    config: &TableConfig,
) -> Result<(String, Option<ManifestContent>), Error> {
    if let (ManifestClassification::ManifestList, Some(content)) =
        (config.classification(), manifest.content)
    {
        let kind = ManifestContent::try_from(content).ok();
        if kind.is_none() {
            debug!(manifest = %manifest.path, content, "ignoring manifest with unknown content");
        }
        return Ok((manifest.path, kind));
    }

    let first_entry = fetch_manifest(fetcher, config.url_resolver(), &manifest.path)
        .await?
        .next()
        .transpose()?;
    let Some(entry) = first_entry else {
        debug!(manifest = %manifest.path, "skipping empty manifest");
        return Ok((manifest.path, None));
    };
    let kind = match entry.data_file.content_type() {
        Some(Content::Data) => Some(ManifestContent::Data),
        Some(Content::PositionDeletes | Content::EqualityDeletes) => Some(ManifestContent::Deletes),
        None => {
            debug!(
                manifest = %manifest.path,
                content = entry.data_file.content(),
                "ignoring manifest with unknown content"
            );
            None
        }
    };
    Ok((manifest.path, kind))
}
