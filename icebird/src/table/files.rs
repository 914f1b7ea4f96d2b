/*!
 * Collecting the files tracked by a list of manifests.
*/

use futures::{stream, StreamExt, TryStreamExt};
use icebird_spec::manifest::DataFile;
use tracing::{debug, instrument};

use crate::{error::Error, object_store::store::FileFetcher};

use super::{manifest::fetch_manifest, TableConfig};

/// Collects the data files of all entries of the given manifests.
///
/// Files are returned in manifest order and then in entry order. Every entry is included,
/// independent of its status, and duplicates are kept.
#[instrument(
    name = "icebird::table::files::collect_data_files",
    level = "debug",
    skip(urls, fetcher, config),
    fields(manifests = urls.len())
)]
pub async fn collect_data_files(
    urls: &[String],
    fetcher: &dyn FileFetcher,
    config: &TableConfig,
) -> Result<Vec<DataFile>, Error> {
    let manifests: Vec<Vec<DataFile>> = stream::iter(urls)
        .map(|url| async move {
            fetch_manifest(fetcher, config.url_resolver(), url)
                .await?
                .map(|entry| entry.map(|entry| entry.data_file))
                .collect::<Result<Vec<_>, Error>>()
        })
        .buffered((*config.manifest_concurrency()).max(1))
        .try_collect()
        .await?;
    let files: Vec<DataFile> = manifests.into_iter().flatten().collect();
    debug!(files = files.len(), "collected files");
    Ok(files)
}
