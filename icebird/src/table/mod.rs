/*!
Defining the [Table] struct that gives access to the files of the current snapshot of an iceberg table.
*/

use std::sync::Arc;

use derive_builder::Builder;
use derive_getters::Getters;
use icebird_spec::{manifest::DataFile, table_metadata::TableMetadata};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::Error,
    file_format::parquet::CodecSet,
    object_store::{store::FileFetcher, UrlResolver},
};

use self::{
    deletes::{build_delete_maps, DeleteMaps},
    files::collect_data_files,
    manifest_list::{resolve_manifests, ManifestClassification, ManifestUrls},
};

pub mod deletes;
pub mod files;
pub mod manifest;
pub mod manifest_list;

#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
#[builder(build_fn(error = "Error"), setter(prefix = "with"), default)]
/// Configuration of the file resolution of a table
pub struct TableConfig {
    /// Rewrites bucket-style urls before they are fetched
    url_resolver: UrlResolver,
    /// How manifests are classified into data and delete manifests
    classification: ManifestClassification,
    /// Number of manifests fetched at the same time
    manifest_concurrency: usize,
    /// Number of delete files fetched at the same time. `None` fetches all at once.
    #[builder(setter(strip_option))]
    delete_file_concurrency: Option<usize>,
    /// Compression codecs delete files may use
    codecs: CodecSet,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            url_resolver: UrlResolver::default(),
            classification: ManifestClassification::default(),
            manifest_concurrency: 1,
            delete_file_concurrency: None,
            codecs: CodecSet::default(),
        }
    }
}

impl TableConfig {
    /// Creates a new config builder
    pub fn builder() -> TableConfigBuilder {
        TableConfigBuilder::default()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Data files and deletes of a snapshot
pub struct ScanFiles {
    /// Files tracked by the data manifests
    pub data_files: Vec<DataFile>,
    /// Deletes from the delete manifests
    pub delete_maps: DeleteMaps,
}

#[derive(Debug, Clone)]
/// Iceberg table
pub struct Table {
    metadata: TableMetadata,
    fetcher: Arc<dyn FileFetcher>,
    config: TableConfig,
}

/// Public interface of the table.
impl Table {
    /// Create a table from its metadata
    pub fn new(metadata: TableMetadata, fetcher: Arc<dyn FileFetcher>, config: TableConfig) -> Self {
        Table {
            metadata,
            fetcher,
            config,
        }
    }

    /// Load the table from the metadata file at `location`
    #[instrument(name = "icebird::table::load", level = "debug", skip(fetcher, config))]
    pub async fn load(
        location: &str,
        fetcher: Arc<dyn FileFetcher>,
        config: TableConfig,
    ) -> Result<Self, Error> {
        let url = config.url_resolver().resolve(location)?;
        let metadata = fetcher.get_metadata(&url).await?;
        Ok(Table::new(metadata, fetcher, config))
    }

    #[inline]
    /// Get the metadata of the table
    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    #[inline]
    /// Get the configuration of the table
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[inline]
    /// Get the fetcher used to read the table files
    pub fn fetcher(&self) -> Arc<dyn FileFetcher> {
        Arc::clone(&self.fetcher)
    }

    /// Data and delete manifests of the current snapshot
    pub async fn manifests(&self) -> Result<ManifestUrls, Error> {
        resolve_manifests(&self.metadata, self.fetcher.as_ref(), &self.config).await
    }

    /// Files tracked by the given manifests
    pub async fn data_files(&self, manifest_urls: &[String]) -> Result<Vec<DataFile>, Error> {
        collect_data_files(manifest_urls, self.fetcher.as_ref(), &self.config).await
    }

    /// Deletes from the given delete manifests
    pub async fn delete_maps(&self, delete_manifest_urls: &[String]) -> Result<DeleteMaps, Error> {
        build_delete_maps(delete_manifest_urls, self.fetcher.as_ref(), &self.config).await
    }

    /// Data files and deletes of the current snapshot
    pub async fn scan_files(&self) -> Result<ScanFiles, Error> {
        let manifests = self.manifests().await?;
        let (data_files, delete_maps) = futures::try_join!(
            self.data_files(&manifests.data_manifest_urls),
            self.delete_maps(&manifests.delete_manifest_urls)
        )?;
        Ok(ScanFiles {
            data_files,
            delete_maps,
        })
    }
}
