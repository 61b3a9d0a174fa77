// sentinel-core/src/infrastructure/ingest/mod.rs

pub mod csv;
pub mod discovery;

pub use self::csv::{read_csv, read_csv_path, write_csv_path};
pub use discovery::{discover_csv_files, lineage_of};
