use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("input did not contain a header row")]
    MissingHeader,

    #[error("header declares column '{name}' more than once")]
    DuplicateColumn { name: String },

    #[error("index column '{name}' not found in header")]
    MissingIndexColumn { name: String },

    #[error("data row {line_index} has {found} fields, expected {expected}")]
    RaggedRow {
        line_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("data row {line_index} has no value for index column '{name}'")]
    MissingIndexValue { line_index: usize, name: String },

    #[error("table validation error: {message}")]
    Validation { message: String },
}

impl From<csv::Error> for ParserError {
    fn from(source: csv::Error) -> Self {
        ParserError::Csv { source }
    }
}
