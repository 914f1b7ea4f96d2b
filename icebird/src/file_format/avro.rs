/*!
 * Fetching and decoding avro container files
*/

use std::io::Cursor;

use apache_avro::Reader as AvroReader;
use bytes::Bytes;
use tracing::instrument;

use crate::{
    error::Error,
    object_store::{store::FileFetcher, UrlResolver},
};

/// Records of an avro container file. The iterator is finite and can't be restarted.
pub type AvroRecords = AvroReader<'static, Cursor<Bytes>>;

/// Fetches the avro file at `url` and returns its records.
///
/// The url is resolved with the `resolver` before it is fetched. Creating the reader parses the
/// container header (schema, codec and sync marker), the data blocks are decoded lazily while
/// iterating. Transport and decode errors are returned as they are, there are no retries.
#[instrument(
    name = "icebird::file_format::avro::fetch_avro_records",
    level = "debug",
    skip(fetcher, resolver)
)]
pub async fn fetch_avro_records(
    fetcher: &dyn FileFetcher,
    resolver: &UrlResolver,
    url: &str,
) -> Result<AvroRecords, Error> {
    let url = resolver.resolve(url)?;
    let bytes = fetcher.fetch(&url).await?;
    AvroReader::new(Cursor::new(bytes)).map_err(Error::from)
}
