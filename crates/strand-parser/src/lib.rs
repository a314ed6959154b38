//! Packrat PEG parser for the Strand configuration language.
//!
//! Turns UTF-8 source text into a [`strand_syntax::Expr`]. There is no separate
//! tokenizer pass: the [`engine::Engine`] drives the grammar rules in
//! `grammar/` directly over a rune [`scanner::Scanner`], backtracking through ordered
//! choice via checkpoint/rollback rather than re-lexing.

mod diagnostics;
mod engine;
mod error;
mod grammar;
mod scanner;

pub use diagnostics::{Diagnostics, Span};
pub use error::ParseError;

use engine::Engine;

/// Options accepted by [`parse`].
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Emit a `tracing` trace of rule entries/exits.
    pub debug: bool,
    /// Enable packrat memoization keyed by `(offset, rule)`.
    pub memoize: bool,
    /// Recover from a caught engine panic rather than propagating it. Grammar actions
    /// are expected never to panic; this only guards against a bug in one.
    pub recover_panics: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            debug: false,
            memoize: false,
            recover_panics: true,
        }
    }
}

/// The result of a successful parse: the expression plus any non-fatal diagnostics
/// (there are none today — the grammar either matches or it doesn't — but the shape
/// leaves room for future warnings without a breaking change).
#[derive(Debug)]
pub struct ParseOutput {
    pub expr: strand_syntax::Expr,
    pub diagnostics: Diagnostics,
}

/// Parses one Strand source file into an expression, or a non-empty set of diagnostics
/// if it fails to parse. `filename` is used only to label diagnostics; it need not
/// exist on disk.
pub fn parse(filename: &str, source: &[u8], options: ParseOptions) -> Result<ParseOutput, Diagnostics> {
    let text = match std::str::from_utf8(source) {
        Ok(t) => t,
        Err(_) => {
            let mut diagnostics = Diagnostics::new();
            diagnostics
                .error("entry-point", Span::point(0), "input is not valid UTF-8")
                .emit();
            return Err(diagnostics);
        }
    };

    if text.starts_with('\u{FEFF}') {
        let mut diagnostics = Diagnostics::new();
        diagnostics
            .error("entry-point", Span::point(0), "leading byte-order mark is rejected")
            .emit();
        return Err(diagnostics);
    }

    let run = move || -> Result<ParseOutput, Diagnostics> {
        let mut engine = Engine::new(text, options);
        tracing::debug!(filename, len = text.len(), "parsing strand source");

        match grammar::parse_file(&mut engine) {
            Some(expr) => {
                if let Some(fatal) = engine.take_fatal() {
                    let mut diagnostics = engine.into_diagnostics();
                    diagnostics
                        .error("entry-point", Span::point(0), fatal.to_string())
                        .emit();
                    return Err(diagnostics.dedup());
                }
                Ok(ParseOutput {
                    expr,
                    diagnostics: engine.into_diagnostics(),
                })
            }
            None => {
                let mut diagnostics = engine.into_diagnostics();
                if diagnostics.is_empty() {
                    diagnostics
                        .error("entry-point", Span::point(0), "no alternative matched")
                        .emit();
                }
                Err(diagnostics.dedup())
            }
        }
    };

    if options.recover_panics {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(run)) {
            Ok(result) => result,
            Err(_) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics
                    .error("entry-point", Span::point(0), "internal parser error")
                    .emit();
                Err(diagnostics)
            }
        }
    } else {
        run()
    }
}
