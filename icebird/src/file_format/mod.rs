/*!
 * Decoding of the file formats an iceberg table is made of. Avro for manifest lists and
 * manifests, parquet for delete files.
*/

pub mod avro;
pub mod parquet;
