use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ParserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cell storage for one column. `None` is the missing marker.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Integer(_) => ColumnKind::Integer,
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(values) => values.len(),
            ColumnData::Float(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            ColumnData::Integer(values) => values.get(row).is_some_and(Option::is_none),
            ColumnData::Float(values) => values.get(row).is_some_and(Option::is_none),
            ColumnData::Text(values) => values.get(row).is_some_and(Option::is_none),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|row| self.is_null(*row)).count()
    }

    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            ColumnData::Text(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Vec<Option<String>>> {
        match self {
            ColumnData::Text(values) => Some(values),
            _ => None,
        }
    }

    /// Renders a single cell the way it appeared in the source text.
    pub fn render(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Integer(values) => {
                values.get(row).copied().flatten().map(|v| v.to_string())
            }
            ColumnData::Float(values) => values.get(row).copied().flatten().map(|v| v.to_string()),
            ColumnData::Text(values) => values.get(row).cloned().flatten(),
        }
    }

    /// Keeps the rows whose entry in `keep` is true.
    pub fn filter(&self, keep: &[bool]) -> ColumnData {
        fn pick<T: Clone>(values: &[Option<T>], keep: &[bool]) -> Vec<Option<T>> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, keep)| **keep)
                .map(|(value, _)| value.clone())
                .collect()
        }

        match self {
            ColumnData::Integer(values) => ColumnData::Integer(pick(values, keep)),
            ColumnData::Float(values) => ColumnData::Float(pick(values, keep)),
            ColumnData::Text(values) => ColumnData::Text(pick(values, keep)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<&str>>) -> Self {
        let values = values
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect();
        Self::new(name, ColumnData::Text(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ColumnData {
        &mut self.data
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    pub fn filter(&self, keep: &[bool]) -> Column {
        Column::new(self.name.clone(), self.data.filter(keep))
    }
}

/// A parsed table: one record-id index column plus uniquely named data columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index: Column,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(index: Column, columns: Vec<Column>) -> Result<Self, ParserError> {
        let mut seen = HashSet::with_capacity(columns.len() + 1);
        seen.insert(index.name().to_string());
        for column in &columns {
            if !seen.insert(column.name().to_string()) {
                return Err(ParserError::DuplicateColumn {
                    name: column.name().to_string(),
                });
            }
            if column.len() != index.len() {
                return Err(ParserError::Validation {
                    message: format!(
                        "column '{}' has {} rows but index '{}' has {}",
                        column.name(),
                        column.len(),
                        index.name(),
                        index.len()
                    ),
                });
            }
        }
        Ok(Self { index, columns })
    }

    pub fn index(&self) -> &Column {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Builds a new table with the named columns in the given order. Unknown names are skipped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let columns = names
            .iter()
            .filter_map(|name| self.column(name.as_ref()).cloned())
            .collect();
        Table {
            index: self.index.clone(),
            columns,
        }
    }

    /// Keeps the rows whose entry in `keep` is true, across the index and every column.
    pub fn filter_rows(&self, keep: &[bool]) -> Result<Table, ParserError> {
        if keep.len() != self.height() {
            return Err(ParserError::Validation {
                message: format!(
                    "row mask has {} entries but table has {} rows",
                    keep.len(),
                    self.height()
                ),
            });
        }
        Ok(Table {
            index: self.index.filter(keep),
            columns: self.columns.iter().map(|column| column.filter(keep)).collect(),
        })
    }
}
