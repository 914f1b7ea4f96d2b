/*! Helpers for fetching iceberg files
*/
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use icebird_spec::table_metadata::TableMetadata;
use object_store::{http::HttpBuilder, path::Path, ClientOptions, ObjectStore};
use parking_lot::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;

/// Byte transport for table files
#[async_trait]
pub trait FileFetcher: Debug + Send + Sync {
    /// Fetch the complete content of the file at `url`
    async fn fetch(&self, url: &str) -> Result<Bytes, Error>;
    /// Get table metadata file
    async fn get_metadata(&self, location: &str) -> Result<TableMetadata, Error> {
        let bytes = self.fetch(location).await?;
        serde_json::from_slice(&bytes).map_err(Error::from)
    }
}

/// Reads files from an object store. Only the path of the url is used to locate the object.
#[async_trait]
impl FileFetcher for Arc<dyn ObjectStore> {
    async fn fetch(&self, url: &str) -> Result<Bytes, Error> {
        let bytes = self.get(&object_path(url)?).await?.bytes().await?;
        trace!(url, len = bytes.len(), "fetched object");
        Ok(bytes)
    }
}

/// Object location of a url. The url path is percent-decoded, strings that aren't urls are used as they are.
fn object_path(url: &str) -> Result<Path, Error> {
    match Url::parse(url) {
        Ok(url) => Ok(Path::from_url_path(url.path())?),
        Err(_) => Ok(Path::from(url)),
    }
}

/// Fetches files over http(s).
///
/// One store is built per origin and kept for the lifetime of the fetcher, so requests to the
/// same host reuse its connections. Only the store is kept, file contents are never cached.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client_options: ClientOptions,
    stores: Arc<Mutex<HashMap<String, Arc<dyn ObjectStore>>>>,
}

impl HttpFetcher {
    /// Create a fetcher with default client options
    pub fn new() -> Self {
        Self::default()
    }
    /// Set the client options used for every request
    pub fn with_client_options(mut self, client_options: ClientOptions) -> Self {
        self.client_options = client_options;
        self.stores = Arc::default();
        self
    }

    fn store(&self, origin: String) -> Result<Arc<dyn ObjectStore>, Error> {
        let mut stores = self.stores.lock();
        if let Some(store) = stores.get(&origin) {
            return Ok(Arc::clone(store));
        }
        let store: Arc<dyn ObjectStore> = Arc::new(
            HttpBuilder::new()
                .with_url(origin.clone())
                .with_client_options(self.client_options.clone())
                .build()?,
        );
        debug!(%origin, "created http store");
        stores.insert(origin, Arc::clone(&store));
        Ok(store)
    }
}

#[async_trait]
impl FileFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, Error> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::NotSupported(format!(
                "Fetching {} urls over http",
                parsed.scheme()
            )));
        }
        // Only the path reaches the store
        if parsed.query().is_some() {
            return Err(Error::NotSupported(format!(
                "Fetching urls with a query string like {url}"
            )));
        }
        let store = self.store(parsed.origin().ascii_serialization())?;
        let path = Path::from_url_path(parsed.path())?;
        let bytes = store.get(&path).await?.bytes().await?;
        trace!(url, len = bytes.len(), "fetched url");
        Ok(bytes)
    }
}
