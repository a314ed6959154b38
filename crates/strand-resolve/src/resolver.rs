//! The import resolution engine itself: walks the AST, replaces every `Import`
//! leaf with the expression it references, and enforces cycle, origin, and integrity
//! policy along the way.

use std::sync::Arc;
use std::time::Duration;

use strand_syntax::{Expr, Fetchable, Import, ImportMode, Opcode, is_closed};

use crate::cache::ImportCache;
use crate::canonical::{CanonicalEncode, digest_of, hex};
use crate::error::{Error, ErrorKind};
use crate::fetch::{CancellationToken, EnvReader, FileReader, HttpClient, NeverCancelled, OsEnvReader, OsFileReader, UreqHttpClient};
use crate::location;
use crate::origin;

/// Resolver configuration: the collaborators used to read each import kind
/// (`env_reader`, `http_client`, `file_reader`), a shared `cache`, a `max_depth`, and a
/// few additions this core needs beyond that: the root document's own location
/// (for chaining relative imports inside the top-level expression), a cancellation
/// token, a per-fetch timeout, and the canonical-encoding collaborator for digest
/// checks.
pub struct ResolveOptions {
    pub env_reader: Arc<dyn EnvReader>,
    pub http_client: Arc<dyn HttpClient>,
    pub file_reader: Arc<dyn FileReader>,
    pub cache: Option<Arc<ImportCache>>,
    pub max_depth: usize,
    pub root: Option<Fetchable>,
    pub cancellation: Arc<dyn CancellationToken>,
    pub fetch_timeout: Duration,
    pub canonical_encode: Option<Arc<dyn CanonicalEncode>>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            env_reader: Arc::new(OsEnvReader),
            http_client: Arc::new(UreqHttpClient::new()),
            file_reader: Arc::new(OsFileReader::new()),
            cache: None,
            max_depth: 1000,
            root: None,
            cancellation: Arc::new(NeverCancelled),
            fetch_timeout: Duration::from_secs(20),
            canonical_encode: None,
        }
    }
}

impl ResolveOptions {
    pub fn with_root(mut self, root: Fetchable) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_cache(mut self, cache: Arc<ImportCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Walks `expr`, fetching and substituting every import it contains, and returns the
/// fully resolved expression or the first unrecoverable error.
pub fn resolve(expr: Expr, options: ResolveOptions) -> Result<Expr, Error> {
    let ctx = ResolveCtx { options };
    let mut stack = Vec::new();
    if let Some(root) = ctx.options.root.clone() {
        stack.push(root);
    }
    ctx.resolve_expr(expr, &mut stack)
}

struct ResolveCtx {
    options: ResolveOptions,
}

impl ResolveCtx {
    fn resolve_expr(&self, expr: Expr, stack: &mut Vec<Fetchable>) -> Result<Expr, Error> {
        match expr {
            Expr::Operator(Opcode::ImportAlt, left, right) => self.resolve_alternative(*left, *right, stack),
            Expr::Import(import) => self.resolve_import(import, stack),
            other => other.try_map_children(&mut |child| self.resolve_expr(child, stack)),
        }
    }

    /// Resolve the left operand in full; on a catchable failure, resolve the right
    /// instead. The right operand is never even
    /// attempted when the left succeeds, so it never fetches anything in that case.
    fn resolve_alternative(&self, left: Expr, right: Expr, stack: &mut Vec<Fetchable>) -> Result<Expr, Error> {
        match self.resolve_expr(left, stack) {
            Ok(resolved) => Ok(resolved),
            Err(err) if err.catchable_by_alternative() => self.resolve_expr(right, stack),
            Err(err) => Err(err),
        }
    }

    fn resolve_import(&self, import: Import, stack: &mut Vec<Fetchable>) -> Result<Expr, Error> {
        if self.options.cancellation.is_cancelled() {
            return Err(Error::at(ErrorKind::Cancelled, stack, None));
        }

        // Step 0: `as Location` never fetches and never touches the stack.
        if import.mode == ImportMode::Location {
            return Ok(location::value_for(&import.hashed.target));
        }

        // Step 2: chaining.
        let target = origin::chain(stack, import.hashed.target.clone());

        // Step 3: cycle detection, before the target is pushed.
        if stack.contains(&target) {
            return Err(Error::at(ErrorKind::ImportCycle, stack, Some(&target)));
        }
        if stack.len() >= self.options.max_depth {
            return Err(Error::at(ErrorKind::MaxDepthExceeded, stack, Some(&target)));
        }

        // Step 4: origin policy (the half that never needs a response).
        if let Err(kind) = origin::check_scheme_crossing(stack, &target) {
            return Err(Error::at(kind, stack, Some(&target)));
        }

        stack.push(target.clone());
        let result = self.fetch_decode_and_resolve(&import, &target, stack);
        stack.pop();
        result
    }

    fn fetch_decode_and_resolve(
        &self,
        import: &Import,
        target: &Fetchable,
        stack: &mut Vec<Fetchable>,
    ) -> Result<Expr, Error> {
        let cache_key = (target.clone(), import.hashed.digest);
        let mode = import.mode;
        let digest = import.hashed.digest;

        match &self.options.cache {
            Some(cache) => {
                let mut inner_stack = stack.clone();
                cache.get_or_try_insert_with(cache_key, || {
                    self.fetch_and_build(target, mode, digest, &mut inner_stack)
                })
            }
            None => self.fetch_and_build(target, mode, digest, stack),
        }
    }

    fn fetch_and_build(
        &self,
        target: &Fetchable,
        mode: ImportMode,
        digest: Option<[u8; 32]>,
        stack: &mut Vec<Fetchable>,
    ) -> Result<Expr, Error> {
        // Step 5: fetch.
        let (bytes, acao) = self.fetch(target, stack)?;

        // Step 4, CORS half: only meaningful once we know the response headers.
        if matches!(target, Fetchable::Remote { .. }) {
            if let Err(kind) = origin::check_cors(&stack[..stack.len() - 1], target, acao.as_deref()) {
                return Err(err_at(kind, stack));
            }
        }

        // Step 6: decode.
        let resolved = match mode {
            ImportMode::RawText => {
                let text =
                    String::from_utf8(bytes).map_err(|_| err_at(ErrorKind::Encoding, stack))?;
                Expr::text(text)
            }
            ImportMode::Code => {
                let filename = target.to_string();
                let parsed = strand_parser::parse(&filename, &bytes, strand_parser::ParseOptions::default())
                    .map_err(|diagnostics| {
                        let rendered = diagnostics
                            .printer()
                            .path(&filename)
                            .render();
                        err_at(ErrorKind::Syntax(rendered), stack)
                    })?;
                let resolved = self.resolve_expr(parsed.expr, stack)?;
                // Step 7: free-variable check.
                if !is_closed(&resolved) {
                    let free = strand_syntax::free_variables(&resolved).into_iter().collect();
                    return Err(err_at(ErrorKind::UnboundImport(free), stack));
                }
                resolved
            }
            ImportMode::Location => unreachable!("Location mode is handled before fetch"),
        };

        // Step 8: digest check.
        if let Some(expected) = digest {
            let Some(encoder) = &self.options.canonical_encode else {
                return Err(err_at(ErrorKind::MissingCanonicalEncoder, stack));
            };
            let actual = digest_of(encoder.as_ref(), &resolved);
            if actual != expected {
                return Err(err_at(
                    ErrorKind::IntegrityViolation {
                        expected: hex(&expected),
                        actual: hex(&actual),
                    },
                    stack,
                ));
            }
        }

        Ok(resolved)
    }

    fn fetch(&self, target: &Fetchable, stack: &[Fetchable]) -> Result<(Vec<u8>, Option<String>), Error> {
        if matches!(target, Fetchable::Missing) {
            return Err(err_at(ErrorKind::MissingImport, stack));
        }

        let result = match target {
            Fetchable::Missing => unreachable!(),
            Fetchable::Local { kind, path } => {
                let os_path = to_os_path(kind, path);
                self.options
                    .file_reader
                    .read(&os_path)
                    .map(|bytes| (bytes, None))
            }
            Fetchable::EnvVar { name } => self
                .options
                .env_reader
                .read(&name.0)
                .map(|v| (v.into_bytes(), None))
                .ok_or(crate::error::FetchError::EnvVarMissing),
            Fetchable::Remote { url } => self
                .options
                .http_client
                .get(url, self.options.fetch_timeout)
                .map(|r| (r.body, r.access_control_allow_origin)),
        };

        result.map_err(|e| err_at(ErrorKind::Fetch(e), stack))
    }
}

/// Builds an error from a stack that already has the failing target pushed as its
/// last element (true of every call site inside fetch/decode/build, since
/// `resolve_import` pushes before delegating here).
fn err_at(kind: ErrorKind, stack: &[Fetchable]) -> Error {
    let (current, ancestors) = stack.split_last().unwrap();
    Error::at(kind, ancestors, Some(current))
}

/// Turns a parsed `Fetchable::Local` back into an OS path. `~` expands against
/// `$HOME`; `.`/`..` are relative to the process's current directory when there is no
/// chaining context (an import with no enclosing parent, i.e. the root document
/// itself, unless `ResolveOptions::root` supplies one).
fn to_os_path(kind: &strand_syntax::LocalKind, path: &[String]) -> std::path::PathBuf {
    use strand_syntax::LocalKind;
    let mut buf = match kind {
        LocalKind::Absolute => std::path::PathBuf::from("/"),
        LocalKind::Home => std::env::var("HOME").map(std::path::PathBuf::from).unwrap_or_default(),
        LocalKind::Parent => std::path::PathBuf::from(".."),
        LocalKind::Here => std::path::PathBuf::new(),
    };
    for component in path {
        buf.push(component);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FakeEnvReader, FakeFileReader, FakeHttpClient};
    use std::sync::Arc;
    use strand_syntax::LocalKind;

    fn options() -> ResolveOptions {
        ResolveOptions {
            env_reader: Arc::new(FakeEnvReader::new()),
            http_client: Arc::new(FakeHttpClient::new()),
            file_reader: Arc::new(FakeFileReader::new()),
            ..ResolveOptions::default()
        }
    }

    fn parse(src: &str) -> Expr {
        strand_parser::parse("<test>", src.as_bytes(), strand_parser::ParseOptions::default())
            .unwrap()
            .expr
    }

    #[test]
    fn raw_text_import_round_trips_through_the_fake_filesystem() {
        let files = FakeFileReader::new().with("/etc/greeting.txt", "hello");
        let mut opts = options();
        opts.file_reader = Arc::new(files);

        let resolved = resolve(parse("/etc/greeting.txt as Text"), opts).unwrap();
        assert!(matches!(resolved, Expr::TextLit(chunks, suffix) if chunks.is_empty() && suffix == "hello"));
    }

    #[test]
    fn env_var_import_reads_from_the_fake_environment() {
        let env = FakeEnvReader::new().with("GREETING", "hi");
        let mut opts = options();
        opts.env_reader = Arc::new(env);

        let resolved = resolve(parse("env:GREETING as Text"), opts).unwrap();
        assert!(matches!(resolved, Expr::TextLit(chunks, suffix) if chunks.is_empty() && suffix == "hi"));
    }

    #[test]
    fn missing_import_fails_with_missing_import_error() {
        let err = resolve(parse("missing"), options()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingImport));
    }

    #[test]
    fn import_alt_falls_back_on_a_catchable_failure() {
        let resolved = resolve(parse("missing ? True"), options()).unwrap();
        assert!(matches!(resolved, Expr::BoolLit(true)));
    }

    #[test]
    fn self_referential_local_import_is_a_cycle() {
        let files = FakeFileReader::new().with("/root.strand", "./root.strand");
        let mut opts = options();
        opts.file_reader = Arc::new(files);
        opts.root = Some(Fetchable::Local {
            kind: LocalKind::Absolute,
            path: vec!["root.strand".to_string()],
        });

        let err = resolve(parse("./root.strand"), opts).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ImportCycle));
    }

    #[test]
    fn remote_parent_forbids_fetching_a_local_child() {
        let opts = ResolveOptions {
            root: Some(Fetchable::Remote {
                url: url::Url::parse("https://example.com/root.strand").unwrap(),
            }),
            ..options()
        };

        let err = resolve(parse("/etc/passwd as Text"), opts).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::CorsViolation { .. }));
    }

    #[test]
    fn cross_origin_remote_import_without_acao_header_is_rejected() {
        let http = FakeHttpClient::new().with("https://b.example/x.strand", 200, "1", None);
        let opts = ResolveOptions {
            http_client: Arc::new(http),
            root: Some(Fetchable::Remote {
                url: url::Url::parse("https://a.example/root.strand").unwrap(),
            }),
            ..options()
        };

        let err = resolve(parse("https://b.example/x.strand"), opts).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::CorsViolation { .. }));
    }

    #[test]
    fn as_location_never_touches_any_fetcher() {
        let resolved = resolve(parse("env:UNSET as Location"), options()).unwrap();
        assert!(strand_syntax::is_closed(&resolved));
        assert!(matches!(resolved, Expr::App(..)));
    }

    #[test]
    fn single_flight_cache_returns_the_same_error_twice() {
        let cache = Arc::new(ImportCache::new());
        let opts1 = ResolveOptions { cache: Some(cache.clone()), ..options() };
        let opts2 = ResolveOptions { cache: Some(cache), ..options() };

        let first = resolve(parse("missing"), opts1).unwrap_err();
        let second = resolve(parse("missing"), opts2).unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn imported_code_with_a_free_variable_is_rejected() {
        let files = FakeFileReader::new().with("/open.strand", "x");
        let mut opts = options();
        opts.file_reader = Arc::new(files);

        let err = resolve(parse("/open.strand"), opts).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnboundImport(_)));
    }

    #[test]
    fn unchained_parent_relative_import_keeps_its_leading_dot_dot() {
        assert_eq!(
            to_os_path(&LocalKind::Parent, &["x.strand".to_string()]),
            std::path::PathBuf::from("../x.strand")
        );
    }
}
