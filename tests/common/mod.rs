//! Common test infrastructure
//!
//! Builds song catalog and activity log trees on disk, plus a provisioned
//! SQLite warehouse next to them. Tests should only import from this module.

mod constants;
mod fixtures;

#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{
    create_test_dataset, log_line, query_string, write_data_file, TestDataset,
};
