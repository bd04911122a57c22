use fairsets_parser::Table;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::AnnotatedDataset;
use crate::error::{ColumnRole, DatasetError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardizeOptions {
    /// Keep only these columns; the target and protected attributes are always kept.
    pub usecols: Option<Vec<String>>,
    pub dropcols: Vec<String>,
    /// Drop non-numeric columns other than the target.
    pub numeric_only: bool,
    /// Drop rows with a missing value in any retained column.
    pub dropna: bool,
}

impl Default for StandardizeOptions {
    fn default() -> Self {
        Self {
            usecols: None,
            dropcols: Vec::new(),
            numeric_only: false,
            dropna: true,
        }
    }
}

/// Selects and annotates the columns of a normalized table.
pub fn standardize<S: AsRef<str>>(
    table: &Table,
    protected_attrs: &[S],
    target: &str,
    options: &StandardizeOptions,
) -> Result<AnnotatedDataset> {
    ensure_known(table, target, ColumnRole::Target)?;

    let protected = dedup(protected_attrs.iter().map(|name| name.as_ref()));
    if protected.is_empty() {
        return Err(DatasetError::NoProtectedAttributes);
    }
    for name in &protected {
        ensure_known(table, name, ColumnRole::ProtectedAttribute)?;
    }
    for name in options.usecols.iter().flatten() {
        ensure_known(table, name, ColumnRole::UseColumn)?;
    }
    for name in &options.dropcols {
        ensure_known(table, name, ColumnRole::DropColumn)?;
        if name == target {
            return Err(DatasetError::ProtectedColumnConflict {
                column: name.clone(),
                reason: "dropcols names the target".to_string(),
            });
        }
        if protected.contains(name) {
            return Err(DatasetError::ProtectedColumnConflict {
                column: name.clone(),
                reason: "dropcols names a protected attribute".to_string(),
            });
        }
    }

    let mut retained: Vec<String> = match &options.usecols {
        None => table.column_names().into_iter().map(str::to_string).collect(),
        Some(usecols) => {
            let mut names = dedup(usecols.iter().map(String::as_str));
            let target_name = target.to_string();
            for name in protected.iter().chain(std::iter::once(&target_name)) {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            names
        }
    };
    retained.retain(|name| !options.dropcols.contains(name));

    if options.numeric_only {
        let mut kept = Vec::with_capacity(retained.len());
        for name in retained {
            let numeric = table
                .column(&name)
                .is_some_and(|column| column.kind().is_numeric());
            if numeric || name == target {
                kept.push(name);
            } else if protected.contains(&name) {
                return Err(DatasetError::ProtectedColumnConflict {
                    column: name,
                    reason: "it is non-numeric and numeric_only is set".to_string(),
                });
            }
        }
        retained = kept;
    }

    let mut selected = table.select(&retained);
    if options.dropna {
        let keep: Vec<bool> = (0..selected.height())
            .map(|row| {
                selected
                    .columns()
                    .iter()
                    .all(|column| !column.data().is_null(row))
            })
            .collect();
        selected = selected.filter_rows(&keep)?;
    }

    info!(
        rows = selected.height(),
        dropped_rows = table.height() - selected.height(),
        columns = selected.width(),
        label = target,
        "Standardized dataset"
    );

    Ok(AnnotatedDataset::new(
        selected,
        target.to_string(),
        protected,
    ))
}

fn ensure_known(table: &Table, name: &str, role: ColumnRole) -> Result<()> {
    if table.contains(name) {
        Ok(())
    } else {
        Err(DatasetError::UnknownColumn {
            column: name.to_string(),
            role,
        })
    }
}

fn dedup<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for name in names {
        if !unique.iter().any(|existing| existing == name) {
            unique.push(name.to_string());
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairsets_parser::{Column, ColumnData};

    fn sample() -> Table {
        let index = Column::new("id", ColumnData::Integer(vec![Some(1), Some(2), Some(3)]));
        Table::new(
            index,
            vec![
                Column::new("a", ColumnData::Integer(vec![Some(1), None, Some(3)])),
                Column::text("b", vec![Some("x"), Some("y"), Some("z")]),
                Column::new("p", ColumnData::Integer(vec![Some(1), Some(2), Some(1)])),
                Column::text("y", vec![Some("1"), Some("2"), None]),
            ],
        )
        .unwrap()
    }

    fn keep_all() -> StandardizeOptions {
        StandardizeOptions {
            dropna: false,
            ..StandardizeOptions::default()
        }
    }

    #[test]
    fn defaults_keep_every_column_and_drop_missing_rows() {
        let dataset = standardize(&sample(), &["p"], "y", &StandardizeOptions::default()).unwrap();
        assert_eq!(dataset.column_names(), vec!["a", "b", "p", "y"]);
        assert_eq!(dataset.height(), 1);
        assert_eq!(dataset.index().data(), &ColumnData::Integer(vec![Some(1)]));
    }

    #[test]
    fn usecols_always_retains_target_and_protected() {
        let options = StandardizeOptions {
            usecols: Some(vec!["b".into(), "b".into()]),
            ..keep_all()
        };
        let dataset = standardize(&sample(), &["p"], "y", &options).unwrap();
        assert_eq!(dataset.column_names(), vec!["b", "p", "y"]);
        assert_eq!(dataset.height(), 3);
    }

    #[test]
    fn dropcols_cannot_remove_required_columns() {
        for dropped in ["y", "p"] {
            let options = StandardizeOptions {
                dropcols: vec![dropped.to_string()],
                ..keep_all()
            };
            let err = standardize(&sample(), &["p"], "y", &options).unwrap_err();
            assert!(matches!(
                err,
                DatasetError::ProtectedColumnConflict { column, .. } if column == dropped
            ));
        }
    }

    #[test]
    fn unknown_names_report_their_role() {
        let err = standardize(&sample(), &["p"], "nope", &keep_all()).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownColumn { role: ColumnRole::Target, .. }));

        let err = standardize(&sample(), &["zz"], "y", &keep_all()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::UnknownColumn { role: ColumnRole::ProtectedAttribute, .. }
        ));

        let options = StandardizeOptions {
            usecols: Some(vec!["q".into()]),
            ..keep_all()
        };
        let err = standardize(&sample(), &["p"], "y", &options).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownColumn { role: ColumnRole::UseColumn, .. }));

        let options = StandardizeOptions {
            dropcols: vec!["q".into()],
            ..keep_all()
        };
        let err = standardize(&sample(), &["p"], "y", &options).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownColumn { role: ColumnRole::DropColumn, .. }));
    }

    #[test]
    fn empty_protected_set_is_rejected() {
        let none: [&str; 0] = [];
        let err = standardize(&sample(), &none, "y", &keep_all()).unwrap_err();
        assert!(matches!(err, DatasetError::NoProtectedAttributes));
    }

    #[test]
    fn numeric_only_keeps_text_target() {
        let options = StandardizeOptions {
            numeric_only: true,
            ..keep_all()
        };
        let dataset = standardize(&sample(), &["p", "p"], "y", &options).unwrap();
        assert_eq!(dataset.column_names(), vec!["a", "p", "y"]);
        assert_eq!(dataset.protected_attributes(), ["p".to_string()]);
    }

    #[test]
    fn numeric_only_refuses_to_drop_text_protected_attribute() {
        let options = StandardizeOptions {
            numeric_only: true,
            ..keep_all()
        };
        let err = standardize(&sample(), &["b"], "y", &options).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::ProtectedColumnConflict { column, .. } if column == "b"
        ));
    }

    #[test]
    fn dropna_only_considers_retained_columns() {
        let options = StandardizeOptions {
            dropcols: vec!["a".into()],
            ..StandardizeOptions::default()
        };
        let dataset = standardize(&sample(), &["p"], "y", &options).unwrap();
        assert_eq!(dataset.height(), 2);
        assert!(dataset
            .table()
            .columns()
            .iter()
            .all(|column| column.null_count() == 0));
    }
}
