use fairsets_parser::{frame_from_columns, Column, ColumnKind, Table};
use polars::prelude::{DataFrame, Series};
use serde::Serialize;

use crate::catalog::CodeCatalog;
use crate::error::{ColumnRole, DatasetError, Result};

/// Descriptive data carried alongside a dataset. Never used for computation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetMetadata {
    pub source: Option<String>,
    /// Label value, after remapping, that marks the favorable outcome.
    pub favorable_label: Option<String>,
    pub code_catalog: Option<CodeCatalog>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnUse {
    Feature,
    ProtectedAttribute,
    Label,
}

impl ColumnUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnUse::Feature => "feature",
            ColumnUse::ProtectedAttribute => "protected",
            ColumnUse::Label => "label",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
    pub role: ColumnUse,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub index: String,
    pub target: String,
    pub protected_attributes: Vec<String>,
    pub columns: Vec<ColumnSummary>,
    pub metadata: DatasetMetadata,
}

/// A standardized table with its label and protected attributes marked.
#[derive(Debug, Clone)]
pub struct AnnotatedDataset {
    table: Table,
    target: String,
    protected_attributes: Vec<String>,
    metadata: DatasetMetadata,
}

impl AnnotatedDataset {
    pub(crate) fn new(table: Table, target: String, protected_attributes: Vec<String>) -> Self {
        Self {
            table,
            target,
            protected_attributes,
            metadata: DatasetMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn index(&self) -> &Column {
        self.table.index()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.table.column(name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.table.column_names()
    }

    /// Retained columns other than the label.
    pub fn feature_names(&self) -> Vec<&str> {
        self.table
            .column_names()
            .into_iter()
            .filter(|name| *name != self.target)
            .collect()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn protected_attributes(&self) -> &[String] {
        &self.protected_attributes
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected_attributes.iter().any(|attr| attr == name)
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    pub fn height(&self) -> usize {
        self.table.height()
    }

    pub fn width(&self) -> usize {
        self.table.width()
    }

    pub fn describe_code(&self, attribute: &str, code: u32) -> Option<&'static str> {
        self.metadata
            .code_catalog
            .as_ref()
            .and_then(|catalog| catalog.describe(attribute, code))
    }

    pub fn column_use(&self, name: &str) -> ColumnUse {
        if name == self.target {
            ColumnUse::Label
        } else if self.is_protected(name) {
            ColumnUse::ProtectedAttribute
        } else {
            ColumnUse::Feature
        }
    }

    pub fn summary(&self) -> DatasetSummary {
        let columns = self
            .table
            .columns()
            .iter()
            .map(|column| ColumnSummary {
                name: column.name().to_string(),
                kind: column.kind(),
                missing: column.null_count(),
                role: self.column_use(column.name()),
            })
            .collect();

        DatasetSummary {
            rows: self.height(),
            index: self.index().name().to_string(),
            target: self.target.clone(),
            protected_attributes: self.protected_attributes.clone(),
            columns,
            metadata: self.metadata.clone(),
        }
    }

    /// Index first, then every retained column including the label.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        Ok(self.table.to_dataframe()?)
    }

    /// Index and every retained column except the label.
    pub fn features_frame(&self) -> Result<DataFrame> {
        let features = self
            .table
            .columns()
            .iter()
            .filter(|column| column.name() != self.target);
        Ok(frame_from_columns(std::iter::once(self.index()).chain(features))?)
    }

    pub fn label_series(&self) -> Result<Series> {
        self.table
            .column(&self.target)
            .map(Column::to_series)
            .ok_or_else(|| DatasetError::UnknownColumn {
                column: self.target.clone(),
                role: ColumnRole::Target,
            })
    }
}
