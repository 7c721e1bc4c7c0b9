//! Data model for tabular data representation

mod key;
mod schema;
mod table;

pub use key::{KeyBuilder, KeyTuple, DEFAULT_KEY_COLUMNS};
pub use schema::Column;
pub use table::{CellValue, Row, Side, Table};
