use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::errors::ParserError;
use crate::model::{Column, ColumnData, Table};

pub const DEFAULT_DELIMITER: u8 = b';';
pub const DEFAULT_NA_TOKEN: &str = "?";

/// How a delimited text table is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimitedFormat {
    pub delimiter: u8,
    /// Tokens read as missing in addition to empty cells.
    pub na_values: Vec<String>,
    pub index_column: String,
}

impl DelimitedFormat {
    pub fn new(delimiter: u8, index_column: impl Into<String>) -> Self {
        Self {
            delimiter,
            na_values: Vec::new(),
            index_column: index_column.into(),
        }
    }

    pub fn with_na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values = values.into_iter().map(Into::into).collect();
        self
    }

    fn is_missing(&self, value: &str) -> bool {
        value.is_empty() || self.na_values.iter().any(|token| token == value)
    }
}

impl Default for DelimitedFormat {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER, "encounter_id").with_na_values([DEFAULT_NA_TOKEN])
    }
}

/// Parses delimited text into a [`Table`], inferring a kind for every column.
pub fn parse_table(content: &[u8], format: &DelimitedFormat) -> Result<Table, ParserError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let header = reader.headers()?.clone();
    if header.is_empty() || header.iter().all(str::is_empty) {
        return Err(ParserError::MissingHeader);
    }

    let names: Vec<String> = header.iter().map(str::to_string).collect();
    let index_position = names
        .iter()
        .position(|name| *name == format.index_column)
        .ok_or_else(|| ParserError::MissingIndexColumn {
            name: format.index_column.clone(),
        })?;

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];

    for (offset, record) in reader.records().enumerate() {
        let record = record?;
        // header occupies line 1
        let line_index = offset + 2;
        if record.len() != names.len() {
            return Err(ParserError::RaggedRow {
                line_index,
                expected: names.len(),
                found: record.len(),
            });
        }

        for (values, field) in raw.iter_mut().zip(record.iter()) {
            if format.is_missing(field) {
                values.push(None);
            } else {
                values.push(Some(field.to_string()));
            }
        }

        if raw[index_position].last().is_some_and(Option::is_none) {
            return Err(ParserError::MissingIndexValue {
                line_index,
                name: format.index_column.clone(),
            });
        }
    }

    let mut index = None;
    let mut columns = Vec::with_capacity(names.len().saturating_sub(1));
    for (position, (name, values)) in names.into_iter().zip(raw).enumerate() {
        let column = Column::new(name, infer_column_data(values));
        if position == index_position {
            index = Some(column);
        } else {
            columns.push(column);
        }
    }

    let index = index.ok_or_else(|| ParserError::MissingIndexColumn {
        name: format.index_column.clone(),
    })?;
    Table::new(index, columns)
}

/// Integer when every present cell parses as `i64`, float when every present cell
/// parses as `f64`, text otherwise. Columns without any present cell stay text.
pub(crate) fn infer_column_data(values: Vec<Option<String>>) -> ColumnData {
    if values.iter().all(Option::is_none) {
        return ColumnData::Text(values);
    }

    if values.iter().flatten().all(|value| value.parse::<i64>().is_ok()) {
        let parsed = values
            .iter()
            .map(|value| value.as_deref().and_then(|v| v.parse::<i64>().ok()))
            .collect();
        return ColumnData::Integer(parsed);
    }

    if values
        .iter()
        .flatten()
        .all(|value| value.parse::<f64>().is_ok_and(f64::is_finite))
    {
        let parsed = values
            .iter()
            .map(|value| value.as_deref().and_then(|v| v.parse::<f64>().ok()))
            .collect();
        return ColumnData::Float(parsed);
    }

    ColumnData::Text(values)
}
