pub mod catalog;
pub mod config;
pub mod dataset;
pub mod diabetes;
pub mod error;
pub mod fetcher;
pub mod normalizer;
pub mod standardizer;

pub use catalog::{CodeCatalog, CodeMapping};
pub use config::{FetchConfig, DATA_HOME_ENV};
pub use dataset::{AnnotatedDataset, ColumnSummary, ColumnUse, DatasetMetadata, DatasetSummary};
pub use diabetes::{fetch_diabetes, load_local_diabetes, DiabetesOptions};
pub use error::{ColumnRole, DatasetError, Result};
pub use fetcher::{DataSource, Fetcher, HttpTransport, RemoteTransport};
pub use normalizer::{ColumnSelector, ImputationPolicy, Normalizer, RemapRule};
pub use standardizer::{standardize, StandardizeOptions};
