//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::collection::Diagnostics;

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(source) = self.source else {
            return self.format_plain(w);
        };

        if self.diagnostics.is_empty() {
            return Ok(());
        }

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            let range = adjust_range(diag.span, source.len());
            let title = format!("{}: {}", diag.rule, diag.message);

            let mut snippet = Snippet::source(source)
                .line_start(1)
                .annotation(AnnotationKind::Primary.span(range).label(&diag.message));

            if let Some(p) = self.path {
                snippet = snippet.path(p);
            }

            let report: Vec<Group> = vec![Level::ERROR.primary_title(&title).element(snippet)];

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }

    /// Renders the plain error-location format: `filename:line:col (byte-offset): rule:
    /// message`. Used whenever no source text was supplied for a pretty `annotate-
    /// snippets` rendering (e.g. a CLI run with `--no-context`), and as the `Display`
    /// fallback for a lone diagnostic.
    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        let path = self.path.unwrap_or("<input>");
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            let offset = diag.span.start;
            match self.source {
                Some(source) => {
                    let (line, col) = line_col(source, offset as usize);
                    write!(w, "{path}:{line}:{col} ({offset}): {}: {}", diag.rule, diag.message)?;
                }
                None => write!(w, "{path} (byte {offset}): {}: {}", diag.rule, diag.message)?,
            }
        }
        Ok(())
    }
}

/// 1-based `(line, column)` of the UTF-8 byte offset `offset` within `source`. Column is
/// counted in runes, not bytes, matching the scanner's own position bookkeeping.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut col = 1;
    for ch in source[..offset].chars() {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn adjust_range(span: super::message::Span, limit: usize) -> std::ops::Range<usize> {
    let start = span.start as usize;
    let end = span.end as usize;

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
