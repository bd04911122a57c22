//! Diabetes 130-US hospitals encounter data (1999–2008).
//!
//! Two entry points share one normalization and standardization path:
//! [`fetch_diabetes`] downloads the comma-delimited copy (cached under
//! `data_home`), [`load_local_diabetes`] reads a semicolon-delimited file the
//! user placed under `data_home/diabetes`.

use std::path::Path;

use fairsets_parser::{DelimitedFormat, Table};
use once_cell::sync::Lazy;
use tracing::info;

use crate::catalog::CodeCatalog;
use crate::config::FetchConfig;
use crate::dataset::{AnnotatedDataset, DatasetMetadata};
use crate::error::Result;
use crate::fetcher::{Fetcher, RemoteTransport};
use crate::normalizer::{ColumnSelector, ImputationPolicy, Normalizer, RemapRule};
use crate::standardizer::{standardize, StandardizeOptions};

pub const DIABETES_URL: &str = "https://raw.githubusercontent.com/angelmanzur/Diabetes_130Hospitals/master/dataset_diabetes/diabetic_data.csv";
pub const DIABETES_ARCHIVE_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/00296/dataset_diabetes.zip";
pub const LOCAL_FILE: &str = "diabetes/diabetic_data.csv";

pub const INDEX_COLUMN: &str = "encounter_id";
pub const TARGET: &str = "readmitted";
pub const PROTECTED_ATTRIBUTES: [&str; 3] = [
    "admission_type_id",
    "discharge_disposition_id",
    "admission_source_id",
];
/// `<30` after the label remap.
pub const FAVORABLE_LABEL: &str = "2";
pub const SENTINEL: &str = "?";

pub const DEFAULT_USECOLS: &[&str] = &[
    "patient_nbr",
    "race",
    "gender",
    "age",
    "admission_type_id",
    "discharge_disposition_id",
    "admission_source_id",
    "time_in_hospital",
    "medical_specialty",
    "num_lab_procedures",
    "num_procedures",
    "num_medications",
    "number_outpatient",
    "number_emergency",
    "number_inpatient",
    "diag_1",
    "diag_2",
    "diag_3",
    "number_diagnoses",
    "max_glu_serum",
    "A1Cresult",
    "metformin",
    "repaglinide",
    "nateglinide",
    "chlorpropamide",
    "glimepiride",
    "acetohexamide",
    "glipizide",
    "glyburide",
    "tolbutamide",
    "pioglitazone",
    "rosiglitazone",
    "acarbose",
    "miglitol",
    "troglitazone",
    "tolazamide",
    "examide",
    "citoglipton",
    "insulin",
    "glyburide-metformin",
    "glipizide-metformin",
    "glimepiride-pioglitazone",
    "metformin-rosiglitazone",
    "metformin-pioglitazone",
    "change",
    "diabetesMed",
];
pub const DEFAULT_DROPCOLS: &[&str] = &["weight", "payer_code"];
pub const LOCAL_DROPCOLS: &[&str] = &["weight"];

static DIABETES_RULES: Lazy<Vec<RemapRule>> = Lazy::new(|| {
    let ages = (0..10).fold(
        RemapRule::new("age_buckets", ColumnSelector::All),
        |rule, decade| {
            let low = decade * 10;
            rule.map(format!("[{low}-{})", low + 10), (decade + 1).to_string())
        },
    );

    vec![
        RemapRule::new("readmission_codes", ColumnSelector::All)
            .map("NO", "1")
            .map("<30", "2")
            .map(">30", "3"),
        RemapRule::new("missing_sentinel", ColumnSelector::All).to_missing(SENTINEL),
        ages,
    ]
});

/// Label codes, then the sentinel, then age buckets.
pub fn diabetes_rules() -> &'static [RemapRule] {
    DIABETES_RULES.as_slice()
}

pub fn remote_format() -> DelimitedFormat {
    DelimitedFormat::new(b',', INDEX_COLUMN)
}

pub fn local_format() -> DelimitedFormat {
    DelimitedFormat::new(b';', INDEX_COLUMN).with_na_values([SENTINEL])
}

#[derive(Debug, Clone)]
pub struct DiabetesOptions {
    pub standardize: StandardizeOptions,
    pub imputation: ImputationPolicy,
}

impl DiabetesOptions {
    pub fn remote_defaults() -> Self {
        Self {
            standardize: StandardizeOptions {
                usecols: Some(owned(DEFAULT_USECOLS)),
                dropcols: owned(DEFAULT_DROPCOLS),
                numeric_only: false,
                dropna: true,
            },
            imputation: ImputationPolicy::MostFrequent,
        }
    }

    pub fn local_defaults() -> Self {
        Self {
            standardize: StandardizeOptions {
                usecols: None,
                dropcols: owned(LOCAL_DROPCOLS),
                numeric_only: false,
                dropna: true,
            },
            imputation: ImputationPolicy::MostFrequent,
        }
    }
}

impl Default for DiabetesOptions {
    fn default() -> Self {
        Self::remote_defaults()
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn local_instructions(data_home: &Path) -> String {
    format!(
        "To use this dataset, download\n\n\t{DIABETES_ARCHIVE_URL}\n\nunzip it and place the files, as-is, in the folder:\n\n\t{}\n",
        data_home.join("diabetes").display()
    )
}

pub fn fetch_diabetes(config: &FetchConfig, options: &DiabetesOptions) -> Result<AnnotatedDataset> {
    let fetcher = Fetcher::new(config.clone())?;
    fetch_diabetes_with(&fetcher, options)
}

pub fn fetch_diabetes_with<T: RemoteTransport>(
    fetcher: &Fetcher<T>,
    options: &DiabetesOptions,
) -> Result<AnnotatedDataset> {
    let raw = fetcher.fetch(DIABETES_URL, &remote_format())?;
    prepare(raw, options, DIABETES_URL)
}

pub fn load_local_diabetes(
    config: &FetchConfig,
    options: &DiabetesOptions,
) -> Result<AnnotatedDataset> {
    let fetcher = Fetcher::new(config.clone())?;
    load_local_diabetes_with(&fetcher, options)
}

pub fn load_local_diabetes_with<T: RemoteTransport>(
    fetcher: &Fetcher<T>,
    options: &DiabetesOptions,
) -> Result<AnnotatedDataset> {
    let instructions = local_instructions(&fetcher.config().data_home);
    let raw = fetcher.fetch_required_local(Path::new(LOCAL_FILE), &local_format(), &instructions)?;
    let source = fetcher.config().data_home.join(LOCAL_FILE);
    prepare(raw, options, &source.display().to_string())
}

fn prepare(raw: Table, options: &DiabetesOptions, source: &str) -> Result<AnnotatedDataset> {
    let normalizer =
        Normalizer::new(diabetes_rules().to_vec()).with_imputation(options.imputation.clone());
    let normalized = normalizer.normalize(raw)?;
    let dataset = standardize(
        &normalized,
        &PROTECTED_ATTRIBUTES,
        TARGET,
        &options.standardize,
    )?;
    info!(
        source,
        rows = dataset.height(),
        columns = dataset.width(),
        imputation = options.imputation.as_str(),
        "Prepared diabetes dataset"
    );

    Ok(dataset.with_metadata(DatasetMetadata {
        source: Some(source.to_string()),
        favorable_label: Some(FAVORABLE_LABEL.to_string()),
        code_catalog: Some(CodeCatalog::diabetes()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_ordered_label_sentinel_buckets() {
        let names: Vec<&str> = diabetes_rules().iter().map(|rule| rule.name.as_str()).collect();
        assert_eq!(names, vec!["readmission_codes", "missing_sentinel", "age_buckets"]);
    }

    #[test]
    fn age_buckets_map_to_one_through_ten() {
        let ages = &diabetes_rules()[2];
        assert_eq!(ages.mapping.len(), 10);
        assert_eq!(ages.mapping[0], ("[0-10)".to_string(), Some("1".to_string())));
        assert_eq!(ages.mapping[9], ("[90-100)".to_string(), Some("10".to_string())));
        let mut targets: Vec<_> = ages.mapping.iter().filter_map(|(_, to)| to.clone()).collect();
        targets.dedup();
        assert_eq!(targets.len(), 10);
    }

    #[test]
    fn defaults_are_built_fresh() {
        let mut first = DiabetesOptions::default();
        first.standardize.dropcols.push("race".to_string());
        let second = DiabetesOptions::default();
        assert_eq!(second.standardize.dropcols, vec!["weight", "payer_code"]);
    }

    #[test]
    fn instructions_name_the_expected_folder() {
        let text = local_instructions(Path::new("/data"));
        assert!(text.contains(DIABETES_ARCHIVE_URL));
        assert!(text.contains("/data/diabetes"));
    }
}
