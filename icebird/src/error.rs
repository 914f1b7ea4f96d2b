/*!
Error type for icebird
*/

use arrow::error::ArrowError;
use thiserror::Error;

#[derive(Error, Debug)]
/// Icebird error
pub enum Error {
    /// Malformed storage url
    #[error("Invalid url {0}, {1}.")]
    InvalidUrl(String, String),
    /// The table metadata has no current snapshot
    #[error("No current snapshot id found in table metadata.")]
    NoCurrentSnapshot,
    /// The current snapshot id doesn't reference a snapshot
    #[error("Snapshot {0} not found in table metadata.")]
    SnapshotNotFound(i64),
    /// The snapshot has neither a manifest list nor inline manifests
    #[error("No manifest information found in snapshot {0}.")]
    NoManifestInformation(i64),
    /// Not supported
    #[error("Feature {0} is not supported.")]
    NotSupported(String),
    /// Iceberg spec error
    #[error(transparent)]
    Spec(#[from] icebird_spec::error::Error),
    /// Arrow error
    #[error(transparent)]
    Arrow(#[from] ArrowError),
    /// Parquet error
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    /// Avro error
    #[error(transparent)]
    Avro(#[from] apache_avro::Error),
    /// Serde json
    #[error(transparent)]
    JSONSerde(#[from] serde_json::Error),
    /// Url parse
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// Objectstore error
    #[error(transparent)]
    ObjectStore(#[from] object_store::Error),
    /// Objectstore path error
    #[error(transparent)]
    ObjectStorePath(#[from] object_store::path::Error),
    /// Derive builder error
    #[error(transparent)]
    DeriveBuilder(#[from] derive_builder::UninitializedFieldError),
}

impl Error {
    /// Whether the error stems from a malformed url
    pub fn is_format(&self) -> bool {
        matches!(self, Error::InvalidUrl(_, _))
    }
    /// Whether the error stems from missing or invalid table metadata
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoCurrentSnapshot | Error::SnapshotNotFound(_) | Error::NoManifestInformation(_)
        )
    }
}
