//! Sparkify ETL Library
//!
//! Loads the song catalog and user activity logs into a star-schema
//! warehouse. The binaries are thin wrappers around these modules.

pub mod config;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod handlers;
pub mod models;
pub mod report;
pub mod schema;
pub mod sqlite_persistence;
pub mod transform;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use config::{CliConfig, EtlConfig, FileConfig};
pub use driver::{BatchDriver, LoadReport, MalformedFilePolicy};
pub use error::{EtlError, WriteError, WriteOutcome, WriteResult};
pub use handlers::{EventLogHandler, FileHandler, SongCatalogHandler};
pub use warehouse::{MemoryWarehouse, SchemaProvisioner, SqliteWarehouse, Warehouse};
