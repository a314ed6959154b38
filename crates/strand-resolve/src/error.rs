//! Resolver error kinds plus the import chain every top-level failure carries.

use strand_syntax::Fetchable;

/// Underlying cause of a failed fetch, before it is wrapped in [`ErrorKind::Fetch`].
/// Scheme-specific, kept separate from [`ErrorKind`] so fetchers can be tested without
/// constructing a full resolver error.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("local read failed")]
    Io(#[from] std::io::Error),
    #[error("path escapes the configured sandbox")]
    SandboxEscape,
    #[error("http request failed")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("environment variable not set")]
    EnvVarMissing,
}

/// One resolver error kind. Does not itself carry the import chain — that is
/// accumulated on [`Error`] as the failure propagates back up the AST walk.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("import cycle detected")]
    ImportCycle,
    #[error("cross-origin import refused: parent origin {parent}, target origin {target}")]
    CorsViolation { parent: String, target: String },
    #[error("integrity check failed: expected sha256:{expected}, got sha256:{actual}")]
    IntegrityViolation { expected: String, actual: String },
    #[error("imported expression is not closed: free variable(s) {0:?}")]
    UnboundImport(Vec<String>),
    #[error("fetch failed")]
    Fetch(#[source] FetchError),
    #[error("fetch timed out")]
    FetchTimeout,
    #[error("resolution cancelled")]
    Cancelled,
    #[error("the `missing` import was evaluated")]
    MissingImport,
    #[error("fetched bytes are not valid UTF-8")]
    Encoding,
    #[error("fetched code failed to parse:\n{0}")]
    Syntax(String),
    #[error("maximum import depth exceeded")]
    MaxDepthExceeded,
    #[error("an integrity digest was given but no canonical encoder was configured")]
    MissingCanonicalEncoder,
    /// Replayed from the content cache for a second caller of an import whose
    /// first resolution already failed. The original error's structure does not
    /// survive the cache (its sources may not be `Clone`), but its message and
    /// catchability by `?` do.
    #[error("{message}")]
    Cached { message: String, catchable: bool },
}

/// A resolver failure, with the chain of import targets that led to it.
#[derive(Debug, thiserror::Error)]
#[error("{kind}{}", format_chain(.chain))]
pub struct Error {
    pub kind: ErrorKind,
    pub chain: Vec<String>,
}

fn format_chain(chain: &[String]) -> String {
    if chain.is_empty() {
        String::new()
    } else {
        format!("\n  while resolving: {}", chain.join(" -> "))
    }
}

impl Error {
    /// Builds an error from the current resolution stack. `ancestors` is root-first
    /// and does not include `current` (the import actually being processed, if it has
    /// already been determined); the chain recorded on the error is innermost-first,
    /// so the failing import always appears before the ones that led to it.
    pub(crate) fn at(kind: ErrorKind, ancestors: &[Fetchable], current: Option<&Fetchable>) -> Self {
        let mut chain: Vec<String> = Vec::with_capacity(ancestors.len() + 1);
        if let Some(t) = current {
            chain.push(t.to_string());
        }
        chain.extend(ancestors.iter().rev().map(Fetchable::to_string));
        Self { kind, chain }
    }

    /// The set of error kinds the `?` import-alternative operator is allowed to catch
    /// and retry against its right operand.
    /// `SyntaxError` only counts here when it came from parsing the *fetched* code, not
    /// from some unrelated failure upstream — callers only construct a `Syntax` kind in
    /// that situation, so membership in this enum variant is sufficient.
    pub fn catchable_by_alternative(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Fetch(_)
                | ErrorKind::MissingImport
                | ErrorKind::ImportCycle
                | ErrorKind::CorsViolation { .. }
                | ErrorKind::IntegrityViolation { .. }
                | ErrorKind::Syntax(_)
        ) || matches!(self.kind, ErrorKind::Cached { catchable, .. } if catchable)
    }

    /// Flattens this error into the form the single-flight cache stores, so a second
    /// caller replaying a cached failure doesn't need the original (possibly
    /// non-`Clone`) error sources.
    pub(crate) fn into_cached(self) -> (String, bool) {
        let catchable = self.catchable_by_alternative();
        (self.to_string(), catchable)
    }
}
