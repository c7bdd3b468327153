pub mod error;
pub mod filter;
pub mod naming;
pub mod types;

pub use error::{DbError, Result};
pub use filter::{AllOf, ColumnEquals, RowFilter};
pub use naming::{is_valid_name, validate_column_name, validate_table_name};
pub use types::{Limit, Record, Row, Schema, record_from_value};
pub use serde_json::Value;
