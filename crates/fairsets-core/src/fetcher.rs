use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fairsets_parser::{parse_table, DelimitedFormat, Table};
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::error::{DatasetError, Result};

/// Retrieves the raw bytes behind a remote source identifier.
pub trait RemoteTransport {
    fn get(&self, url: &str) -> std::result::Result<Vec<u8>, String>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| DatasetError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }
}

impl RemoteTransport for HttpTransport {
    fn get(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        let bytes = response.bytes().map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Local(PathBuf),
    Remote(String),
}

impl DataSource {
    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Remote(trimmed.to_string())
        } else {
            DataSource::Local(PathBuf::from(trimmed))
        }
    }

    pub fn identifier(&self) -> String {
        match self {
            DataSource::Local(path) => path.display().to_string(),
            DataSource::Remote(url) => url.clone(),
        }
    }

    /// Final path segment, used as the cache file name.
    pub fn file_name(&self) -> Option<String> {
        match self {
            DataSource::Local(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            DataSource::Remote(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url);
                let after_scheme = without_query
                    .split_once("://")
                    .map_or(without_query, |(_, rest)| rest);
                let (_authority, path) = after_scheme.split_once('/')?;
                path.rsplit('/')
                    .next()
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
            }
        }
    }
}

pub struct Fetcher<T = HttpTransport> {
    config: FetchConfig,
    transport: T,
}

impl Fetcher<HttpTransport> {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { config, transport })
    }
}

impl<T: RemoteTransport> Fetcher<T> {
    pub fn with_transport(config: FetchConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cache_path(&self, source: &DataSource) -> Option<PathBuf> {
        source
            .file_name()
            .map(|name| self.config.data_home.join(name))
    }

    /// Reads the table from the cache when enabled and present, otherwise from the
    /// primary source, persisting what was retrieved when caching is enabled.
    pub fn fetch(&self, source_identifier: &str, format: &DelimitedFormat) -> Result<Table> {
        let source = DataSource::parse(source_identifier);
        let cache_path = if self.config.cache {
            let path = self.cache_path(&source);
            if path.is_none() {
                warn!(source = %source.identifier(), "Source has no file name; caching disabled");
            }
            path
        } else {
            None
        };

        if let Some(path) = cache_path.as_deref().filter(|path| path.is_file()) {
            match read_table(path, format) {
                Ok(table) => {
                    info!(
                        path = %path.display(),
                        rows = table.height(),
                        columns = table.width(),
                        "Loaded table from cache"
                    );
                    return Ok(table);
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Cached copy unreadable; refetching"
                    );
                }
            }
        }

        let bytes = self.retrieve(&source)?;
        let table = parse_table(&bytes, format).map_err(|err| DatasetError::SourceUnavailable {
            source_id: source.identifier(),
            reason: format!("content could not be parsed: {err}"),
        })?;
        info!(
            source = %source.identifier(),
            rows = table.height(),
            columns = table.width(),
            "Fetched table from primary source"
        );

        if let Some(path) = cache_path {
            self.persist(&source, &path, &bytes);
        }

        Ok(table)
    }

    /// Reads a file under `data_home` that the user must supply by hand.
    pub fn fetch_required_local(
        &self,
        relative_path: &Path,
        format: &DelimitedFormat,
        instructions: &str,
    ) -> Result<Table> {
        let path = self.config.data_home.join(relative_path);
        let bytes = fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => DatasetError::MissingLocalFile {
                path: path.clone(),
                instructions: instructions.to_string(),
            },
            _ => DatasetError::SourceUnavailable {
                source_id: path.display().to_string(),
                reason: err.to_string(),
            },
        })?;
        let table = parse_table(&bytes, format).map_err(|err| DatasetError::SourceUnavailable {
            source_id: path.display().to_string(),
            reason: format!("content could not be parsed: {err}"),
        })?;
        info!(path = %path.display(), rows = table.height(), "Loaded local table");
        Ok(table)
    }

    fn retrieve(&self, source: &DataSource) -> Result<Vec<u8>> {
        match source {
            DataSource::Local(path) => {
                fs::read(path).map_err(|err| DatasetError::SourceUnavailable {
                    source_id: source.identifier(),
                    reason: err.to_string(),
                })
            }
            DataSource::Remote(url) => {
                let attempts = self.config.retries.saturating_add(1);
                let mut last_error = String::new();
                for attempt in 1..=attempts {
                    match self.transport.get(url) {
                        Ok(bytes) => {
                            debug!(url = %url, bytes = bytes.len(), attempt, "Downloaded source");
                            return Ok(bytes);
                        }
                        Err(err) => {
                            warn!(url = %url, attempt, error = %err, "Remote retrieval failed");
                            last_error = err;
                        }
                    }
                }
                Err(DatasetError::SourceUnavailable {
                    source_id: url.clone(),
                    reason: format!("{attempts} attempt(s) failed, last error: {last_error}"),
                })
            }
        }
    }

    fn persist(&self, source: &DataSource, path: &Path, bytes: &[u8]) {
        if let DataSource::Local(origin) = source {
            if origin == path {
                return;
            }
        }
        // a failed cache write leaves the fetched table usable
        match write_atomically(path, bytes) {
            Ok(()) => info!(path = %path.display(), bytes = bytes.len(), "Cached source"),
            Err(err) => warn!(path = %path.display(), error = %err, "Failed to write cache file"),
        }
    }
}

fn read_table(path: &Path, format: &DelimitedFormat) -> std::result::Result<Table, String> {
    let bytes = fs::read(path).map_err(|err| err.to_string())?;
    parse_table(&bytes, format).map_err(|err| err.to_string())
}

fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut staging = path.as_os_str().to_owned();
    staging.push(".part");
    let staging = PathBuf::from(staging);
    fs::write(&staging, bytes)?;
    fs::rename(&staging, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_sources() {
        assert_eq!(
            DataSource::parse("https://example.org/data/file.csv"),
            DataSource::Remote("https://example.org/data/file.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("data/file.csv"),
            DataSource::Local(PathBuf::from("data/file.csv"))
        );
    }

    #[test]
    fn file_name_is_last_url_segment() {
        let source = DataSource::parse("https://example.org/a/b/diabetic_data.csv?raw=1");
        assert_eq!(source.file_name().as_deref(), Some("diabetic_data.csv"));
        assert_eq!(DataSource::parse("https://example.org/a/").file_name(), None);
        assert_eq!(DataSource::parse("https://example.org").file_name(), None);
        assert_eq!(DataSource::parse("https://example.org?x=1").file_name(), None);
        assert_eq!(
            DataSource::parse("https://example.org/data.csv").file_name().as_deref(),
            Some("data.csv")
        );
    }
}
