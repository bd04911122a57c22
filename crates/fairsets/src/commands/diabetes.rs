use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use fairsets_core::{
    fetch_diabetes, load_local_diabetes, AnnotatedDataset, DatasetError, DiabetesOptions,
    FetchConfig, ImputationPolicy, DATA_HOME_ENV,
};
use polars::prelude::ParquetWriter;
use tracing::info;

const DEFAULT_DATA_HOME: &str = "data/raw";

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Imputation {
    None,
    MostFrequent,
}

#[derive(Args, Debug)]
pub struct DiabetesArgs {
    /// Cache and local dataset directory (falls back to FAIRSETS_DATA_HOME)
    #[arg(long)]
    data_home: Option<PathBuf>,
    /// TOML fetch configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Always download, never read or write the cache
    #[arg(long)]
    no_cache: bool,
    /// Read the manually downloaded UCI copy under <data-home>/diabetes
    #[arg(long)]
    local: bool,
    #[arg(long, value_delimiter = ',')]
    usecols: Option<Vec<String>>,
    #[arg(long, value_delimiter = ',')]
    dropcols: Option<Vec<String>>,
    #[arg(long)]
    numeric_only: bool,
    /// Keep rows with missing values
    #[arg(long)]
    keep_na: bool,
    #[arg(long, value_enum, default_value_t = Imputation::MostFrequent)]
    impute: Imputation,
    /// Write the dataset (index first) as parquet
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl DiabetesArgs {
    fn fetch_config(&self) -> Result<FetchConfig> {
        let mut config = match &self.config {
            Some(path) => FetchConfig::load(path)?,
            None => FetchConfig::new(DEFAULT_DATA_HOME),
        };
        if let Some(data_home) = self
            .data_home
            .clone()
            .or_else(|| env::var_os(DATA_HOME_ENV).map(PathBuf::from))
        {
            config.data_home = data_home;
        }
        if self.no_cache {
            config.cache = false;
        }
        Ok(config)
    }

    fn options(&self) -> DiabetesOptions {
        let mut options = if self.local {
            DiabetesOptions::local_defaults()
        } else {
            DiabetesOptions::remote_defaults()
        };
        if let Some(usecols) = &self.usecols {
            options.standardize.usecols = Some(usecols.clone());
        }
        if let Some(dropcols) = &self.dropcols {
            options.standardize.dropcols = dropcols.clone();
        }
        options.standardize.numeric_only = self.numeric_only;
        options.standardize.dropna = !self.keep_na;
        options.imputation = match self.impute {
            Imputation::None => ImputationPolicy::None,
            Imputation::MostFrequent => ImputationPolicy::MostFrequent,
        };
        options
    }
}

pub fn handle_diabetes_command(args: DiabetesArgs) -> Result<()> {
    let config = args.fetch_config()?;
    let options = args.options();
    info!(
        data_home = %config.data_home.display(),
        cache = config.cache,
        local = args.local,
        "Loading diabetes dataset"
    );

    let loaded = if args.local {
        load_local_diabetes(&config, &options)
    } else {
        fetch_diabetes(&config, &options)
    };
    let dataset = match loaded {
        Ok(dataset) => dataset,
        Err(DatasetError::MissingLocalFile { path, instructions }) => {
            eprintln!("{} not found.\n\n{instructions}", path.display());
            std::process::exit(1);
        }
        Err(err) => return Err(err).context("failed to prepare the diabetes dataset"),
    };

    if let Some(path) = &args.output {
        write_parquet(&dataset, path)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dataset.summary())?);
    } else {
        print_summary(&dataset);
    }
    Ok(())
}

fn write_parquet(dataset: &AnnotatedDataset, path: &Path) -> Result<()> {
    let mut df = dataset.to_dataframe()?;
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("failed to write parquet to {}", path.display()))?;
    info!(path = %path.display(), rows = df.height(), "Wrote parquet output");
    Ok(())
}

fn print_summary(dataset: &AnnotatedDataset) {
    let summary = dataset.summary();
    println!("rows:      {}", summary.rows);
    println!("index:     {}", summary.index);
    println!("label:     {}", summary.target);
    println!("protected: {}", summary.protected_attributes.join(", "));
    if let Some(label) = &summary.metadata.favorable_label {
        println!("favorable: {label}");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["column", "kind", "missing", "role"]);
    for column in &summary.columns {
        table.add_row(vec![
            column.name.clone(),
            column.kind.to_string(),
            column.missing.to_string(),
            column.role.as_str().to_string(),
        ]);
    }
    println!("{table}");
}
