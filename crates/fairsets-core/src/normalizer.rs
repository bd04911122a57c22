use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fairsets_parser::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ColumnRole, DatasetError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSelector {
    /// Every text column in the table.
    All,
    Columns(Vec<String>),
}

/// One value-replacement pass. `None` targets are the missing marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapRule {
    pub name: String,
    pub selector: ColumnSelector,
    pub mapping: Vec<(String, Option<String>)>,
}

impl RemapRule {
    pub fn new(name: impl Into<String>, selector: ColumnSelector) -> Self {
        Self {
            name: name.into(),
            selector,
            mapping: Vec::new(),
        }
    }

    pub fn map(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.mapping.push((from.into(), Some(to.into())));
        self
    }

    pub fn to_missing(mut self, token: impl Into<String>) -> Self {
        self.mapping.push((token.into(), None));
        self
    }

    fn apply(&self, table: &mut Table) -> Result<usize> {
        if let ColumnSelector::Columns(names) = &self.selector {
            if let Some(unknown) = names.iter().find(|name| !table.contains(name)) {
                return Err(DatasetError::UnknownColumn {
                    column: unknown.clone(),
                    role: ColumnRole::RemapSelector,
                });
            }
        }

        let lookup: HashMap<&str, Option<&str>> = self
            .mapping
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_deref()))
            .collect();

        let mut replaced = 0;
        for column in table.columns_mut() {
            let selected = match &self.selector {
                ColumnSelector::All => true,
                ColumnSelector::Columns(names) => names.iter().any(|name| name == column.name()),
            };
            if !selected {
                continue;
            }
            // numeric columns cannot hold string tokens
            let Some(values) = column.data_mut().as_text_mut() else {
                continue;
            };
            for value in values.iter_mut() {
                let Some(current) = value.as_deref() else {
                    continue;
                };
                if let Some(target) = lookup.get(current) {
                    *value = target.map(str::to_string);
                    replaced += 1;
                }
            }
        }
        Ok(replaced)
    }
}

pub type FillFn = dyn Fn(&str, &[Option<String>]) -> Option<String> + Send + Sync;

/// How missing cells in text columns are filled after remapping.
#[derive(Clone, Default)]
pub enum ImputationPolicy {
    None,
    #[default]
    MostFrequent,
    /// Receives the column name and its cells, returns the fill value.
    Custom(Arc<FillFn>),
}

impl ImputationPolicy {
    pub fn custom<F>(fill: F) -> Self
    where
        F: Fn(&str, &[Option<String>]) -> Option<String> + Send + Sync + 'static,
    {
        ImputationPolicy::Custom(Arc::new(fill))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImputationPolicy::None => "none",
            ImputationPolicy::MostFrequent => "most_frequent",
            ImputationPolicy::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for ImputationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most frequent present value; ties go to the value seen first.
pub fn most_frequent(values: &[Option<String>]) -> Option<&str> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.iter().flatten().enumerate() {
        let entry = counts.entry(value.as_str()).or_insert((0, position));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    rules: Vec<RemapRule>,
    imputation: ImputationPolicy,
}

impl Normalizer {
    pub fn new(rules: Vec<RemapRule>) -> Self {
        Self {
            rules,
            imputation: ImputationPolicy::default(),
        }
    }

    pub fn with_imputation(mut self, policy: ImputationPolicy) -> Self {
        self.imputation = policy;
        self
    }

    /// Applies every rule in order, then imputes. The output keeps the input's shape.
    pub fn normalize(&self, mut table: Table) -> Result<Table> {
        for rule in &self.rules {
            let replaced = rule.apply(&mut table)?;
            debug!(rule = %rule.name, replaced, "Applied remap rule");
        }
        self.impute(&mut table)?;
        Ok(table)
    }

    fn impute(&self, table: &mut Table) -> Result<()> {
        if matches!(self.imputation, ImputationPolicy::None) {
            return Ok(());
        }

        for column in table.columns_mut() {
            let name = column.name().to_string();
            let Some(values) = column.data_mut().as_text_mut() else {
                continue;
            };
            if values.iter().all(Option::is_some) {
                continue;
            }

            let fill = match &self.imputation {
                ImputationPolicy::None => None,
                ImputationPolicy::MostFrequent => most_frequent(values).map(str::to_string),
                ImputationPolicy::Custom(fill) => fill(&name, values),
            };
            let fill = fill.ok_or_else(|| DatasetError::EmptyColumn {
                column: name.clone(),
                policy: self.imputation.as_str(),
            })?;

            let mut filled = 0usize;
            for value in values.iter_mut().filter(|value| value.is_none()) {
                *value = Some(fill.clone());
                filled += 1;
            }
            debug!(column = %name, filled, value = %fill, "Imputed missing values");
        }
        Ok(())
    }
}
