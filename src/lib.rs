// ============================================================================
// flatdb Library
// ============================================================================

//! Flat-file table store.
//!
//! Each table is a UTF-8 file named after the table. The first line is a JSON
//! array of column names; every following line is a JSON array of row values
//! in schema order:
//!
//! ```text
//! ["no","username","password"]
//! [1,"admin","1234"]
//! [2,"root",""]
//! ```
//!
//! [`TableStore`] is the entry point. Row-level updates and deletes read the
//! whole file and write it back; inserts append a single line.

pub mod config;
pub mod core;
pub mod facade;
pub mod storage;

// Re-export main types for convenience
pub use config::StoreConfig;
pub use crate::core::{
    AllOf, ColumnEquals, DbError, Limit, Record, Result, Row, RowFilter, Schema, Value,
    is_valid_name, record_from_value,
};
pub use facade::TableStore;
