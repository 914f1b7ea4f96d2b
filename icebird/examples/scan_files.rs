/*!
Prints the data files and deletes of the current snapshot of a table.

```text
cargo run --example scan_files -- s3://bucket/warehouse/table/metadata/v3.metadata.json
```
*/

use std::{error::Error, sync::Arc};

use icebird::{
    object_store::store::HttpFetcher,
    table::{Table, TableConfig},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let location = std::env::args()
        .nth(1)
        .ok_or("Usage: scan_files <metadata location>")?;

    let table = Table::load(&location, Arc::new(HttpFetcher::new()), TableConfig::default()).await?;
    let scan = table.scan_files().await?;

    for file in &scan.data_files {
        let positions = scan
            .delete_maps
            .position_deletes
            .get(file.file_path())
            .map_or(0, |x| x.len());
        let equality = scan.delete_maps.equality_deletes_for(file.file_path()).len();
        println!(
            "{} records={:?} position_deletes={positions} equality_deletes={equality}",
            file.file_path(),
            file.record_count(),
        );
    }
    Ok(())
}
