#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

use fairsets_core::{FetchConfig, Fetcher, RemoteTransport};
use tempfile::TempDir;

pub fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name);
    fs::read(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", path.display(), err))
}

/// The remote fixture rewritten the way the local variant expects it.
pub fn semicolon_fixture() -> Vec<u8> {
    String::from_utf8(fixture("diabetic_data.csv"))
        .expect("fixture is utf-8")
        .replace(',', ";")
        .into_bytes()
}

/// Serves a fixed body, failing the first `failures` requests.
pub struct StubTransport {
    body: Vec<u8>,
    failures: Cell<u32>,
    calls: Cell<u32>,
}

impl StubTransport {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            failures: Cell::new(0),
            calls: Cell::new(0),
        }
    }

    pub fn failing(body: Vec<u8>, failures: u32) -> Self {
        let stub = Self::new(body);
        stub.failures.set(failures);
        stub
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl RemoteTransport for StubTransport {
    fn get(&self, _url: &str) -> Result<Vec<u8>, String> {
        self.calls.set(self.calls.get() + 1);
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err("connection reset by peer".to_string());
        }
        Ok(self.body.clone())
    }
}

pub fn stub_fetcher(dir: &TempDir, transport: StubTransport) -> Fetcher<StubTransport> {
    Fetcher::with_transport(FetchConfig::new(dir.path()), transport)
}
