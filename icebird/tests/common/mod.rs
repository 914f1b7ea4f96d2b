//! Fixtures shared by the integration tests: avro manifests, parquet delete files and a fetcher
//! that records which urls were requested.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use apache_avro::{
    types::{Record, Value as AvroValue},
    Schema as AvroSchema, Writer as AvroWriter,
};
use arrow::{
    array::{ArrayRef, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use async_trait::async_trait;
use bytes::Bytes;
use icebird::{
    error::Error,
    object_store::{store::FileFetcher, translate_url},
};
use icebird_spec::{
    snapshot::{InlineManifest, Snapshot},
    table_metadata::{FormatVersion, TableMetadata},
    util::strip_prefix,
};
use object_store::{memory::InMemory, path::Path, ObjectStore};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};

pub const SNAPSHOT_ID: i64 = 3051729675574597004;

const MANIFEST_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "manifest_entry",
    "fields": [
        {"name": "status", "type": "int"},
        {"name": "snapshot_id", "type": ["null", "long"], "default": null},
        {"name": "data_file", "type": {
            "type": "record",
            "name": "r2",
            "fields": [
                {"name": "content", "type": "int"},
                {"name": "file_path", "type": "string"},
                {"name": "file_format", "type": "string"},
                {"name": "record_count", "type": "long"},
                {"name": "file_size_in_bytes", "type": "long"}
            ]
        }}
    ]
}"#;

const MANIFEST_LIST_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "manifest_file",
    "fields": [
        {"name": "manifest_path", "type": "string"},
        {"name": "manifest_length", "type": "long"},
        {"name": "partition_spec_id", "type": "int"},
        {"name": "content", "type": ["null", "int"], "default": null},
        {"name": "added_snapshot_id", "type": "long"}
    ]
}"#;

/// Avro manifest with one entry per `(content, file_path)`
pub fn manifest(files: &[(i32, &str)]) -> Vec<u8> {
    let schema = AvroSchema::parse_str(MANIFEST_SCHEMA).unwrap();
    let data_file_schema = match &schema {
        AvroSchema::Record(record) => record.fields[2].schema.clone(),
        _ => unreachable!(),
    };
    let mut writer = AvroWriter::new(&schema, Vec::new());
    for (content, file_path) in files {
        let mut data_file = Record::new(&data_file_schema).unwrap();
        data_file.put("content", *content);
        data_file.put("file_path", *file_path);
        data_file.put("file_format", "PARQUET");
        data_file.put("record_count", 10i64);
        data_file.put("file_size_in_bytes", 1024i64);
        let mut entry = Record::new(&schema).unwrap();
        entry.put("status", 1);
        entry.put(
            "snapshot_id",
            AvroValue::Union(1, Box::new(AvroValue::Long(SNAPSHOT_ID))),
        );
        entry.put("data_file", data_file);
        writer.append(entry).unwrap();
    }
    writer.into_inner().unwrap()
}

/// Avro manifest list with one entry per `(manifest_path, content)`
pub fn manifest_list(manifests: &[(&str, Option<i32>)]) -> Vec<u8> {
    let schema = AvroSchema::parse_str(MANIFEST_LIST_SCHEMA).unwrap();
    let mut writer = AvroWriter::new(&schema, Vec::new());
    for (manifest_path, content) in manifests {
        let mut entry = Record::new(&schema).unwrap();
        entry.put("manifest_path", *manifest_path);
        entry.put("manifest_length", 4096i64);
        entry.put("partition_spec_id", 0);
        entry.put(
            "content",
            match content {
                Some(content) => AvroValue::Union(1, Box::new(AvroValue::Int(*content))),
                None => AvroValue::Union(0, Box::new(AvroValue::Null)),
            },
        );
        entry.put("added_snapshot_id", SNAPSHOT_ID);
        writer.append(entry).unwrap();
    }
    writer.into_inner().unwrap()
}

fn write_parquet(batch: RecordBatch) -> Vec<u8> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props)).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    buffer
}

/// Parquet position delete file with nullable `file_path` and `pos` columns
pub fn position_delete_file(rows: &[(Option<&str>, Option<i64>)]) -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("file_path", DataType::Utf8, true),
        Field::new("pos", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|(file_path, _)| *file_path).collect::<Vec<_>>(),
            )) as ArrayRef,
            Arc::new(Int64Array::from(
                rows.iter().map(|(_, pos)| *pos).collect::<Vec<_>>(),
            )) as ArrayRef,
        ],
    )
    .unwrap();
    write_parquet(batch)
}

/// Parquet equality delete file with `file_path`, `id` and `name` columns
pub fn equality_delete_file(rows: &[(&str, i64, &str)]) -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("file_path", DataType::Utf8, false),
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|(file_path, _, _)| *file_path).collect::<Vec<_>>(),
            )) as ArrayRef,
            Arc::new(Int64Array::from(
                rows.iter().map(|(_, id, _)| *id).collect::<Vec<_>>(),
            )) as ArrayRef,
            Arc::new(StringArray::from(
                rows.iter().map(|(_, _, name)| *name).collect::<Vec<_>>(),
            )) as ArrayRef,
        ],
    )
    .unwrap();
    write_parquet(batch)
}

/// Parquet equality delete file with a nullable `id` column
pub fn equality_delete_file_with_nulls(rows: &[(&str, Option<i64>)]) -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("file_path", DataType::Utf8, false),
        Field::new("id", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|(file_path, _)| *file_path).collect::<Vec<_>>(),
            )) as ArrayRef,
            Arc::new(Int64Array::from(
                rows.iter().map(|(_, id)| *id).collect::<Vec<_>>(),
            )) as ArrayRef,
        ],
    )
    .unwrap();
    write_parquet(batch)
}

/// Location in the object store that a table url is fetched from
pub fn object_path(url: &str) -> Path {
    Path::from(strip_prefix(&translate_url(url).unwrap()))
}

pub async fn put(object_store: &Arc<dyn ObjectStore>, url: &str, bytes: Vec<u8>) {
    object_store
        .put(&object_path(url), bytes.into())
        .await
        .unwrap();
}

pub fn memory_store() -> Arc<dyn ObjectStore> {
    Arc::new(InMemory::new())
}

fn metadata(snapshot: Snapshot) -> TableMetadata {
    TableMetadata {
        format_version: FormatVersion::V2,
        location: "s3://bucket/warehouse/table".to_owned(),
        current_snapshot_id: Some(SNAPSHOT_ID),
        snapshots: vec![snapshot],
        ..Default::default()
    }
}

/// Table metadata whose current snapshot has a manifest list
pub fn metadata_with_manifest_list(manifest_list: &str) -> TableMetadata {
    metadata(
        Snapshot::builder()
            .with_snapshot_id(SNAPSHOT_ID)
            .with_sequence_number(1)
            .with_manifest_list(manifest_list)
            .build()
            .unwrap(),
    )
}

/// Table metadata whose current snapshot lists its manifests inline
pub fn metadata_with_inline_manifests(manifests: &[&str]) -> TableMetadata {
    metadata(
        Snapshot::builder()
            .with_snapshot_id(SNAPSHOT_ID)
            .with_manifests(manifests.iter().map(|x| InlineManifest::new(*x)).collect())
            .build()
            .unwrap(),
    )
}

/// Records every requested url before delegating to an object store
#[derive(Debug)]
pub struct RecordingFetcher {
    object_store: Arc<dyn ObjectStore>,
    fetched: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn new(object_store: Arc<dyn ObjectStore>) -> Self {
        RecordingFetcher {
            object_store,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl FileFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, Error> {
        self.fetched.lock().unwrap().push(url.to_owned());
        self.object_store.fetch(url).await
    }
}
