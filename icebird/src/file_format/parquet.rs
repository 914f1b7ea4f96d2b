/*!
 * Helpers for parquet files
*/

use std::collections::HashSet;

use arrow::{
    json::{writer::JsonArray, WriterBuilder},
    record_batch::RecordBatch,
};
use bytes::Bytes;
use parquet::{
    arrow::arrow_reader::ParquetRecordBatchReaderBuilder, basic::Compression,
    file::metadata::ParquetMetaData,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Error;

/// A decoded parquet row, keyed by column name. Null columns are kept as [serde_json::Value::Null].
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Compression codecs of parquet column chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Codec {
    /// No compression
    Uncompressed,
    /// Snappy
    Snappy,
    /// Gzip
    Gzip,
    /// Lzo
    Lzo,
    /// Brotli
    Brotli,
    /// Lz4 with the deprecated hadoop framing
    Lz4,
    /// Zstandard
    Zstd,
    /// Raw lz4 blocks
    Lz4Raw,
}

impl From<Compression> for Codec {
    fn from(value: Compression) -> Self {
        match value {
            Compression::UNCOMPRESSED => Codec::Uncompressed,
            Compression::SNAPPY => Codec::Snappy,
            Compression::GZIP(_) => Codec::Gzip,
            Compression::LZO => Codec::Lzo,
            Compression::BROTLI(_) => Codec::Brotli,
            Compression::LZ4 => Codec::Lz4,
            Compression::ZSTD(_) => Codec::Zstd,
            Compression::LZ4_RAW => Codec::Lz4Raw,
        }
    }
}

/// The set of codecs delete files may be compressed with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodecSet(HashSet<Codec>);

/// Everything the parquet crate decodes. Lzo has no implementation.
impl Default for CodecSet {
    fn default() -> Self {
        CodecSet::from_iter([
            Codec::Uncompressed,
            Codec::Snappy,
            Codec::Gzip,
            Codec::Brotli,
            Codec::Lz4,
            Codec::Zstd,
            Codec::Lz4Raw,
        ])
    }
}

impl FromIterator<Codec> for CodecSet {
    fn from_iter<T: IntoIterator<Item = Codec>>(iter: T) -> Self {
        CodecSet(iter.into_iter().collect())
    }
}

impl CodecSet {
    /// Whether the codec may be decoded
    pub fn contains(&self, codec: Codec) -> bool {
        self.0.contains(&codec)
    }
    /// Allow an additional codec
    pub fn with(mut self, codec: Codec) -> Self {
        self.0.insert(codec);
        self
    }
    /// Disallow a codec
    pub fn without(mut self, codec: Codec) -> Self {
        self.0.remove(&codec);
        self
    }
}

/// Decode all rows of a parquet file.
///
/// Fails with [Error::NotSupported] before decoding if any column chunk uses a codec outside of `codecs`.
#[instrument(
    name = "icebird::file_format::parquet::read_rows",
    level = "debug",
    skip(bytes, codecs),
    fields(file_size = bytes.len())
)]
pub fn read_rows(bytes: Bytes, codecs: &CodecSet) -> Result<Vec<Row>, Error> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;
    check_codecs(builder.metadata(), codecs)?;
    let reader = builder.build()?;
    let mut rows = Vec::new();
    for batch in reader {
        rows.extend(batch_to_rows(&batch?)?);
    }
    Ok(rows)
}

fn check_codecs(metadata: &ParquetMetaData, codecs: &CodecSet) -> Result<(), Error> {
    for column in metadata
        .row_groups()
        .iter()
        .flat_map(|row_group| row_group.columns())
    {
        let codec = Codec::from(column.compression());
        if !codecs.contains(codec) {
            return Err(Error::NotSupported(format!(
                "Compression codec {codec:?} of column {}",
                column.column_path()
            )));
        }
    }
    Ok(())
}

fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<Row>, Error> {
    let mut writer = WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, JsonArray>(Vec::new());
    writer.write(batch)?;
    writer.finish()?;
    let json = writer.into_inner();
    if json.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&json).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{ArrayRef, Int64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};
    use serde_json::json;

    use super::*;

    fn position_delete_file(compression: Compression) -> Bytes {
        let schema = Arc::new(Schema::new(vec![
            Field::new("file_path", DataType::Utf8, true),
            Field::new("pos", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![
                    Some("s3://bucket/data/a.parquet"),
                    Some("s3://bucket/data/a.parquet"),
                    None,
                ])) as ArrayRef,
                Arc::new(Int64Array::from(vec![Some(5), None, Some(i64::MAX)])) as ArrayRef,
            ],
        )
        .unwrap();
        let props = WriterProperties::builder()
            .set_compression(compression)
            .build();
        let mut buffer = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(props)).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        Bytes::from(buffer)
    }

    #[test]
    fn reads_rows_with_nulls() {
        let rows = read_rows(
            position_delete_file(Compression::SNAPPY),
            &CodecSet::default(),
        )
        .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            serde_json::Value::Object(rows[0].clone()),
            json!({"file_path": "s3://bucket/data/a.parquet", "pos": 5})
        );
        assert_eq!(rows[1]["pos"], serde_json::Value::Null);
        assert_eq!(rows[2]["file_path"], serde_json::Value::Null);
        assert_eq!(rows[2]["pos"].as_i64(), Some(i64::MAX));
    }

    #[test]
    fn rejects_disallowed_codec() {
        let codecs = CodecSet::default().without(Codec::Snappy);
        assert!(matches!(
            read_rows(position_delete_file(Compression::SNAPPY), &codecs),
            Err(Error::NotSupported(_))
        ));
        assert!(read_rows(position_delete_file(Compression::UNCOMPRESSED), &codecs).is_ok());
    }

    #[test]
    fn rejects_invalid_file() {
        assert!(matches!(
            read_rows(Bytes::from_static(b"PAR1 but not really"), &CodecSet::default()),
            Err(Error::Parquet(_))
        ));
    }

    #[test]
    fn codec_set_from_config() {
        let codecs: CodecSet = serde_json::from_str(r#"["snappy", "zstd"]"#).unwrap();
        assert!(codecs.contains(Codec::Snappy));
        assert!(!codecs.contains(Codec::Gzip));
        assert!(codecs.with(Codec::Gzip).contains(Codec::Gzip));
    }
}
