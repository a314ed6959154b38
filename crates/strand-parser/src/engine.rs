//! The PEG execution engine: ordered choice, checkpoint/rollback, recursion-depth
//! limiting, and optional packrat memoization, layered over the [`Scanner`].
//!
//! Grammar rules (`src/grammar/*.rs`) are plain recursive functions `fn(&mut Engine) ->
//! Option<T>`, not a combinator DSL — a recursive-descent grammar split by construct,
//! rather than a parser-combinator dependency the rest of the workspace doesn't
//! otherwise use. `Engine` supplies the pieces a hand-written recursive descent parser
//! needs to behave like a proper packrat PEG: backtracking via `choice`/`attempt`, a
//! single `rule` entry point that enforces a recursion-depth limit, and a memo table
//! keyed by `(offset, rule name)`.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::{Diagnostics, Span};
use crate::error::ParseError;
use crate::scanner::{Checkpoint, Scanner};
use crate::ParseOptions;

enum MemoValue {
    Failed,
    Succeeded { end: u32, value: Rc<dyn Any> },
}

type MemoKey = (u32, &'static str);

pub struct Engine<'src> {
    pub(crate) scanner: Scanner<'src>,
    pub(crate) diagnostics: Diagnostics,
    options: ParseOptions,
    depth: u32,
    memo: HashMap<MemoKey, MemoValue>,
    fatal: Option<ParseError>,
}

/// Default recursion depth before a rule entry reports `RecursionLimitExceeded`.
/// Deep enough for realistic configuration nesting, shallow enough to fail fast on a
/// pathological or accidentally-infinite grammar recursion rather than overflow the
/// native call stack.
pub const DEFAULT_RECURSION_LIMIT: u32 = 512;

impl<'src> Engine<'src> {
    pub fn new(source: &'src str, options: ParseOptions) -> Self {
        Self {
            scanner: Scanner::new(source),
            diagnostics: Diagnostics::new(),
            options,
            depth: 0,
            memo: HashMap::new(),
            fatal: None,
        }
    }

    pub fn source(&self) -> &'src str {
        self.scanner.source()
    }

    pub fn at_eof(&self) -> bool {
        self.scanner.at_eof()
    }

    pub fn offset(&self) -> u32 {
        self.scanner.offset()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.scanner.checkpoint()
    }

    pub fn reset(&mut self, checkpoint: Checkpoint) {
        self.scanner.reset(checkpoint);
    }

    pub fn span_since(&self, start: Checkpoint) -> Span {
        self.scanner.span_since(start)
    }

    pub fn peek(&self) -> Option<char> {
        self.scanner.peek()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.scanner.peek_nth(n)
    }

    pub fn bump(&mut self) -> Option<char> {
        self.scanner.bump()
    }

    pub fn eat_char(&mut self, ch: char) -> bool {
        self.scanner.eat_char(ch)
    }

    pub fn eat_str(&mut self, tag: &str) -> bool {
        self.scanner.eat_str(tag)
    }

    pub fn eat_while(&mut self, pred: impl FnMut(char) -> bool) -> &'src str {
        self.scanner.eat_while(pred)
    }

    pub fn text_since(&self, start: Checkpoint) -> &'src str {
        self.scanner.text_since(start)
    }

    pub fn take_fatal(&mut self) -> Option<ParseError> {
        self.fatal.take()
    }

    pub fn has_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Ordered-choice primitive: runs `f`, and if it fails (`None`), rewinds the cursor
    /// as though it had never run. Diagnostics emitted by an abandoned alternative are
    /// kept, not rolled back — the last alternative's complaint is usually the most
    /// informative "expected" message, and the caller `dedup()`s the rest.
    pub fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if result.is_none() {
            self.reset(checkpoint);
        }
        result
    }

    /// Tries each alternative in order, returning the first success (PEG ordered
    /// choice). Each failed alternative's cursor effects are rolled back before
    /// the next is attempted.
    pub fn choice<T>(&mut self, alternatives: &[fn(&mut Self) -> Option<T>]) -> Option<T> {
        for alt in alternatives {
            if let Some(v) = self.attempt(|e| alt(e)) {
                return Some(v);
            }
            if self.has_fatal() {
                return None;
            }
        }
        None
    }

    /// Entry point every named grammar rule wraps itself in. Enforces the recursion
    /// depth limit, and — when `options.memoize` is set — consults/populates the
    /// packrat memo table keyed by `(offset, name)` so left-recursion-free grammars
    /// with heavy backtracking don't re-derive the same sub-parse twice.
    pub fn rule<T: Clone + 'static>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if self.has_fatal() {
            return None;
        }
        self.depth += 1;
        if self.depth > DEFAULT_RECURSION_LIMIT {
            self.fatal = Some(ParseError::RecursionLimitExceeded {
                span: Span::point(self.offset()),
            });
            self.depth -= 1;
            return None;
        }

        let result = if self.options.memoize {
            self.rule_memoized(name, f)
        } else {
            if self.options.debug {
                tracing::trace!(rule = name, offset = self.offset(), "enter");
            }
            let r = f(self);
            if self.options.debug {
                tracing::trace!(rule = name, matched = r.is_some(), "exit");
            }
            r
        };

        self.depth -= 1;
        result
    }

    fn rule_memoized<T: Clone + 'static>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let key: MemoKey = (self.offset(), name);
        if let Some(entry) = self.memo.get(&key) {
            return match entry {
                MemoValue::Failed => None,
                MemoValue::Succeeded { end, value } => {
                    let value = value.downcast_ref::<T>().cloned();
                    self.scanner.seek_to_offset(*end);
                    value
                }
            };
        }

        let result = f(self);
        let entry = match &result {
            Some(v) => MemoValue::Succeeded {
                end: self.offset(),
                value: Rc::new(v.clone()),
            },
            None => MemoValue::Failed,
        };
        self.memo.insert(key, entry);
        result
    }

    /// Records a syntax error at the current position without altering control flow —
    /// the caller still returns `None` itself.
    pub fn error_here(&mut self, rule: &'static str, msg: impl Into<String>) {
        self.diagnostics
            .error(rule, Span::point(self.offset()), msg)
            .emit();
    }

    pub fn error_at(&mut self, rule: &'static str, span: Span, msg: impl Into<String>) {
        self.diagnostics.error(rule, span, msg).emit();
    }
}
