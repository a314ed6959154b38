//! Scheme-specific retrieval. Each fetcher exposes one operation, `(target,
//! request-origin) -> bytes | error`, and never recurses — recursion, chaining, and
//! policy all live in [`crate::resolver`].

mod env;
mod file;
mod http;

pub use env::{EnvReader, FakeEnvReader, OsEnvReader};
pub use file::{FakeFileReader, FileReader, OsFileReader};
pub use http::{FakeHttpClient, HttpClient, HttpResponse, UreqHttpClient};

use crate::error::FetchError;

/// Cooperative cancellation for an in-progress resolution. Checked
/// at each import node before a fetch is attempted; a fetcher does not need to poll it
/// mid-request since individual fetches are already bounded by a timeout.
pub trait CancellationToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// The default token: resolution is never cancelled. Most callers that do not expose
/// their own cancellation mechanism use this.
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Trivial adapter over an [`std::sync::atomic::AtomicBool`] flag, for callers that
/// just want a `cancel()` handle without writing their own token type.
pub struct AtomicCancellation(std::sync::atomic::AtomicBool);

impl AtomicCancellation {
    pub fn new() -> Self {
        Self(std::sync::atomic::AtomicBool::new(false))
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Default for AtomicCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken for AtomicCancellation {
    fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

pub(crate) type FetchResult = Result<(Vec<u8>, Option<String>), FetchError>;
