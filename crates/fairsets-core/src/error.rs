use std::path::PathBuf;

use fairsets_parser::ParserError;
use thiserror::Error;

/// Which argument of a standardization request named a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Target,
    ProtectedAttribute,
    UseColumn,
    DropColumn,
    RemapSelector,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Target => "target",
            ColumnRole::ProtectedAttribute => "protected attribute",
            ColumnRole::UseColumn => "usecols",
            ColumnRole::DropColumn => "dropcols",
            ColumnRole::RemapSelector => "remap selector",
        }
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("source '{source_id}' unavailable: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    #[error("required file {} is missing\n{instructions}", .path.display())]
    MissingLocalFile { path: PathBuf, instructions: String },

    #[error("{policy} imputation produced no fill value for column '{column}'")]
    EmptyColumn {
        column: String,
        policy: &'static str,
    },

    #[error("{role} column '{column}' does not exist")]
    UnknownColumn { column: String, role: ColumnRole },

    #[error("column '{column}' is required but {reason}")]
    ProtectedColumnConflict { column: String, reason: String },

    #[error("at least one protected attribute must be given")]
    NoProtectedAttributes,

    #[error("Table parsing failed: {0}")]
    Parse(#[from] ParserError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
