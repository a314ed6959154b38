//! Parser diagnostics infrastructure.
//!
//! This module collects and renders the syntax errors accumulated while parsing one
//! source file. Unlike a type-checker or linter, the grammar never "recovers and
//! keeps going" past a rule failure in a way that produces multiple independent trees —
//! but a single top-level parse can still accumulate more than one candidate failure
//! while backtracking through ordered choice, so callers see a deduplicated list rather
//! than a single error.

mod collection;
mod message;
mod printer;

#[cfg(test)]
mod tests;

pub use collection::Diagnostics;
pub use message::Span;
pub use printer::DiagnosticsPrinter;

use message::DiagnosticMessage;

/// Builder for constructing a diagnostic message.
#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn error(&mut self, rule: &'static str, span: Span, msg: impl Into<String>) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(rule, span, msg),
        }
    }
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn expected(mut self, alternatives: impl IntoIterator<Item = &'static str>) -> Self {
        self.message.expected.extend(alternatives);
        self
    }

    pub fn emit(self) {
        self.diagnostics.push(self.message);
    }
}
