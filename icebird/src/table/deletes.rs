/*!
 * Building the lookup structures for row level deletes.
 *
 * Delete files are parquet files referenced from delete manifests. Position delete files
 * (content 1) list `(file_path, pos)` pairs, equality delete files (content 2) list column
 * values that mark rows of `file_path` as deleted. [build_delete_maps] reads all of them into
 * [DeleteMaps] keyed by the path of the data file the deletes apply to.
*/

use std::collections::{HashMap, HashSet};

use futures::{stream, StreamExt, TryStreamExt};
use icebird_spec::manifest::{Content, DataFile};
use tracing::{debug, instrument, trace};

use crate::{
    error::Error,
    file_format::parquet::{read_rows, Row},
    object_store::store::FileFetcher,
};

use super::{files::collect_data_files, TableConfig};

/// A row of a data file deleted by its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDeleteRow {
    /// Path of the data file
    pub file_path: String,
    /// Ordinal position of the deleted row in the data file
    pub pos: i64,
}

/// Rows of a data file deleted by value
#[derive(Debug, Clone, PartialEq)]
pub struct EqualityDeleteRow {
    /// Path of the data file
    pub file_path: String,
    /// The complete row of the delete file, `file_path` included
    pub row: Row,
}

/// Deleted row positions by data file path
pub type PositionDeletesMap = HashMap<String, HashSet<i64>>;

/// Equality delete rows by data file path, in delete file order and then in row order
pub type EqualityDeletesMap = HashMap<String, Vec<EqualityDeleteRow>>;

/// A row of a delete file after validation
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteRow {
    /// Row of a position delete file
    Position(PositionDeleteRow),
    /// Row of an equality delete file
    Equality(EqualityDeleteRow),
}

impl DeleteRow {
    /// Validates a decoded row of a delete file with the given raw content.
    ///
    /// Returns `None` for rows without a string `file_path`, position delete rows without an
    /// integer `pos` and rows of files whose content isn't a delete content.
    pub fn try_from_row(row: Row, content: i32) -> Option<Self> {
        let Some(file_path) = row.get("file_path").and_then(|x| x.as_str()) else {
            trace!(content, "dropping delete row without file_path");
            return None;
        };
        let file_path = file_path.to_owned();
        match Content::try_from(content) {
            Ok(Content::PositionDeletes) => match row.get("pos").and_then(|x| x.as_i64()) {
                Some(pos) => Some(DeleteRow::Position(PositionDeleteRow { file_path, pos })),
                None => {
                    trace!(%file_path, "dropping position delete row without pos");
                    None
                }
            },
            Ok(Content::EqualityDeletes) => {
                Some(DeleteRow::Equality(EqualityDeleteRow { file_path, row }))
            }
            Ok(Content::Data) | Err(_) => {
                trace!(%file_path, content, "dropping row of a file without delete content");
                None
            }
        }
    }
}

/// Position and equality deletes of a snapshot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeleteMaps {
    /// Position deletes by data file path
    pub position_deletes: PositionDeletesMap,
    /// Equality deletes by data file path
    pub equality_deletes: EqualityDeletesMap,
}

impl DeleteMaps {
    /// Whether there are no deletes at all
    pub fn is_empty(&self) -> bool {
        self.position_deletes.is_empty() && self.equality_deletes.is_empty()
    }

    /// Whether the row at position `pos` of the data file is deleted by a position delete
    pub fn is_deleted(&self, file_path: &str, pos: i64) -> bool {
        self.position_deletes
            .get(file_path)
            .is_some_and(|positions| positions.contains(&pos))
    }

    /// Equality delete rows that apply to the data file
    pub fn equality_deletes_for(&self, file_path: &str) -> &[EqualityDeleteRow] {
        self.equality_deletes
            .get(file_path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Adds a validated delete row
    pub fn insert(&mut self, row: DeleteRow) {
        match row {
            DeleteRow::Position(PositionDeleteRow { file_path, pos }) => {
                self.position_deletes
                    .entry(file_path)
                    .or_default()
                    .insert(pos);
            }
            DeleteRow::Equality(row) => {
                self.equality_deletes
                    .entry(row.file_path.clone())
                    .or_default()
                    .push(row);
            }
        }
    }

    /// Appends the deletes of `other`. Equality rows of `other` are placed after the existing ones.
    pub fn merge(&mut self, other: DeleteMaps) {
        for (file_path, positions) in other.position_deletes {
            self.position_deletes
                .entry(file_path)
                .or_default()
                .extend(positions);
        }
        for (file_path, rows) in other.equality_deletes {
            self.equality_deletes
                .entry(file_path)
                .or_default()
                .extend(rows);
        }
    }
}

impl FromIterator<DeleteRow> for DeleteMaps {
    fn from_iter<T: IntoIterator<Item = DeleteRow>>(iter: T) -> Self {
        let mut maps = DeleteMaps::default();
        for row in iter {
            maps.insert(row);
        }
        maps
    }
}

/// Reads all delete files referenced by the given delete manifests.
///
/// Without manifests nothing is fetched. Otherwise the delete files are collected from the
/// manifests, then fetched and decoded at most [TableConfig::delete_file_concurrency] at a time
/// (all at once by default). Every delete file yields its own [DeleteMaps], which are merged in
/// delete file order. Invalid rows are dropped, failing fetches or decodes abort the build.
#[instrument(
    name = "icebird::table::deletes::build_delete_maps",
    level = "debug",
    skip(urls, fetcher, config),
    fields(manifests = urls.len())
)]
pub async fn build_delete_maps(
    urls: &[String],
    fetcher: &dyn FileFetcher,
    config: &TableConfig,
) -> Result<DeleteMaps, Error> {
    if urls.is_empty() {
        return Ok(DeleteMaps::default());
    }
    let delete_files = collect_data_files(urls, fetcher, config).await?;
    let concurrency = config
        .delete_file_concurrency()
        .unwrap_or(delete_files.len())
        .max(1);
    debug!(delete_files = delete_files.len(), concurrency, "reading delete files");

    stream::iter(delete_files.iter())
        .map(|delete_file| read_delete_file(delete_file, fetcher, config))
        .buffered(concurrency)
        .try_fold(DeleteMaps::default(), |mut maps, partial| async move {
            maps.merge(partial);
            Ok(maps)
        })
        .await
}

#[instrument(
    name = "icebird::table::deletes::read_delete_file",
    level = "debug",
    skip_all,
    fields(file_path = %delete_file.file_path(), content = delete_file.content())
)]
async fn read_delete_file(
    delete_file: &DataFile,
    fetcher: &dyn FileFetcher,
    config: &TableConfig,
) -> Result<DeleteMaps, Error> {
    let url = config.url_resolver().resolve(delete_file.file_path())?;
    let bytes = fetcher.fetch(&url).await?;
    let content = *delete_file.content();
    Ok(read_rows(bytes, config.codecs())?
        .into_iter()
        .filter_map(|row| DeleteRow::try_from_row(row, content))
        .collect())
}
