pub mod errors;
pub mod format;
pub mod frame;
pub mod model;

pub use errors::ParserError;
pub use format::{parse_table, DelimitedFormat, DEFAULT_DELIMITER, DEFAULT_NA_TOKEN};
pub use frame::frame_from_columns;
pub use model::{Column, ColumnData, ColumnKind, Table};

#[cfg(test)]
mod tests;
