//! Environment-variable fetcher.

/// Reads one environment variable. Abstracted behind a trait so resolver tests can
/// supply a fixed, hermetic map instead of touching the real process environment.
pub trait EnvReader: Send + Sync {
    fn read(&self, name: &str) -> Option<String>;
}

/// Reads from the real process environment.
pub struct OsEnvReader;

impl EnvReader for OsEnvReader {
    fn read(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed environment, for hermetic tests.
#[derive(Default)]
pub struct FakeEnvReader(std::collections::HashMap<String, String>);

impl FakeEnvReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl EnvReader for FakeEnvReader {
    fn read(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}
