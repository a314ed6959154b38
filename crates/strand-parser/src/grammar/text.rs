//! Text literals: double-quoted with escapes, and single-quoted multi-line with
//! common-indent stripping.

use strand_syntax::{Chunk, Expr};

use crate::engine::Engine;
use crate::grammar::expression;

/// Parses either text literal form.
pub fn text_literal(e: &mut Engine) -> Option<Expr> {
    e.rule("text-literal", |e| {
        if e.peek() == Some('"') {
            double_quoted(e)
        } else if e.peek() == Some('\'') && e.peek_nth(1) == Some('\'') {
            multiline(e)
        } else {
            None
        }
    })
}

fn double_quoted(e: &mut Engine) -> Option<Expr> {
    if !e.eat_char('"') {
        return None;
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    loop {
        match e.peek() {
            None => {
                e.error_here("text-literal", "unterminated double-quoted text literal");
                return None;
            }
            Some('"') => {
                e.bump();
                break;
            }
            Some('$') if e.peek_nth(1) == Some('{') => {
                e.bump();
                e.bump();
                super::lexical::skip_trivia(e);
                let inner = expression(e)?;
                super::lexical::skip_trivia(e);
                if !e.eat_char('}') {
                    e.error_here("text-literal", "expected '}' to close interpolation");
                    return None;
                }
                chunks.push(Chunk {
                    prefix: std::mem::take(&mut current),
                    expr: inner,
                });
            }
            Some('\\') => {
                e.bump();
                match e.bump() {
                    Some('"') => current.push('"'),
                    Some('$') => current.push('$'),
                    Some('\\') => current.push('\\'),
                    Some('/') => current.push('/'),
                    Some('b') => current.push('\u{08}'),
                    Some('f') => current.push('\u{0C}'),
                    Some('n') => current.push('\n'),
                    Some('r') => current.push('\r'),
                    Some('t') => current.push('\t'),
                    Some('u') => {
                        let Some(ch) = unicode_escape(e) else {
                            e.error_here("text-literal", "invalid \\u escape");
                            return None;
                        };
                        current.push(ch);
                    }
                    _ => {
                        e.error_here("text-literal", "invalid escape sequence");
                        return None;
                    }
                }
            }
            Some(ch) => {
                if !is_allowed_plain_char(ch) {
                    e.error_here("text-literal", "invalid character in text literal");
                    return None;
                }
                current.push(ch);
                e.bump();
            }
        }
    }

    Some(Expr::TextLit(chunks, current))
}

/// `[\x20-\x21] ∪ [\x23-\x5B] ∪ [\x5D-\u{10FFFF}]` — every printable rune except bare
/// `"` (0x22) and `\` (0x5C), which must go through an escape, and `$` is only special
/// when followed by `{` (handled by the caller before reaching here).
fn is_allowed_plain_char(ch: char) -> bool {
    let cp = ch as u32;
    (0x20..=0x21).contains(&cp) || (0x23..=0x5B).contains(&cp) || cp >= 0x5D
}

fn unicode_escape(e: &mut Engine) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..4 {
        let digit = e.peek()?.to_digit(16)?;
        e.bump();
        value = value * 16 + digit;
    }
    char::from_u32(value)
}

/// `''` newline body `''`, with `'''` → `''` and `''${` → `${` escapes, followed by
/// common-indent stripping over the finished chunk sequence.
fn multiline(e: &mut Engine) -> Option<Expr> {
    debug_assert!(e.eat_str("''"));
    // A single-quoted literal always starts with a newline, which is not itself part
    // of the body (Dhall-style "leading newline is consumed, not literal").
    if !(e.eat_str("\r\n") || e.eat_char('\n')) {
        e.error_here("text-literal", "multi-line text literal must start with a newline");
        return None;
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    loop {
        if e.peek() == Some('\'') && e.peek_nth(1) == Some('\'') {
            if e.peek_nth(2) == Some('\'') {
                e.bump();
                e.bump();
                e.bump();
                current.push_str("''");
                continue;
            }
            if e.peek_nth(2) == Some('$') && e.peek_nth(3) == Some('{') {
                e.bump();
                e.bump();
                e.bump();
                e.bump();
                current.push_str("${");
                continue;
            }
            e.bump();
            e.bump();
            break;
        }

        match e.peek() {
            None => {
                e.error_here("text-literal", "unterminated multi-line text literal");
                return None;
            }
            Some('$') if e.peek_nth(1) == Some('{') => {
                e.bump();
                e.bump();
                super::lexical::skip_trivia(e);
                let inner = expression(e)?;
                super::lexical::skip_trivia(e);
                if !e.eat_char('}') {
                    e.error_here("text-literal", "expected '}' to close interpolation");
                    return None;
                }
                chunks.push(Chunk {
                    prefix: std::mem::take(&mut current),
                    expr: inner,
                });
            }
            Some(ch) => {
                current.push(ch);
                e.bump();
            }
        }
    }

    Some(strip_common_indent(chunks, current))
}

/// Removes the longest common space/tab prefix shared by every line that contains at
/// least one non-whitespace character, across both literal text and interpolation
/// boundaries (a line may be split by `${...}`, but indentation is only measured at the
/// very start of each *source* line).
fn strip_common_indent(chunks: Vec<Chunk>, suffix: String) -> Expr {
    let mut lines: Vec<&str> = Vec::new();
    let mut at_line_start = true;
    for c in &chunks {
        for (i, line) in c.prefix.split('\n').enumerate() {
            if i > 0 {
                at_line_start = true;
            }
            if at_line_start {
                lines.push(line);
            }
            at_line_start = false;
        }
    }
    for (i, line) in suffix.split('\n').enumerate() {
        if i > 0 {
            at_line_start = true;
        }
        if at_line_start {
            lines.push(line);
        }
        at_line_start = false;
    }

    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    if common == 0 {
        return Expr::TextLit(chunks, suffix);
    }

    let mut out_chunks = Vec::with_capacity(chunks.len());
    let mut at_line_start = true;
    for c in chunks {
        let stripped = strip_lines(&c.prefix, common, &mut at_line_start);
        out_chunks.push(Chunk {
            prefix: stripped,
            expr: c.expr,
        });
        at_line_start = false;
    }
    let stripped_suffix = strip_lines(&suffix, common, &mut at_line_start);
    Expr::TextLit(out_chunks, stripped_suffix)
}

fn strip_lines(text: &str, common: usize, at_line_start: &mut bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut first = true;
    for segment in text.split('\n') {
        if !first {
            out.push('\n');
            *at_line_start = true;
        }
        first = false;
        if *at_line_start {
            out.push_str(segment.get(common.min(segment.len())..).unwrap_or(""));
        } else {
            out.push_str(segment);
        }
        *at_line_start = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn parse(src: &str) -> Expr {
        let mut e = Engine::new(src, ParseOptions::default());
        text_literal(&mut e).expect("should parse")
    }

    #[test]
    fn double_quoted_escapes() {
        let e = parse(r#""a\nb\"c""#);
        assert_eq!(e, Expr::text("a\nb\"c"));
    }

    #[test]
    fn double_quoted_interpolation_splits_into_chunks() {
        let e = parse(r#""x = ${True}!""#);
        match e {
            Expr::TextLit(chunks, suffix) => {
                assert_eq!(chunks.len(), 1);
                assert_eq!(chunks[0].prefix, "x = ");
                assert_eq!(suffix, "!");
            }
            _ => panic!("expected TextLit"),
        }
    }

    #[test]
    fn multiline_strips_common_indent() {
        let e = parse("''\n    line one\n    line two\n    ''");
        assert_eq!(e, Expr::text("line one\nline two\n"));
    }

    #[test]
    fn multiline_with_no_common_indent_is_unchanged() {
        let e = parse("''\nline one\n  line two\n''");
        assert_eq!(e, Expr::text("line one\n  line two\n"));
    }

    #[test]
    fn multiline_strips_indent_shared_with_blank_lines() {
        let src = indoc::indoc! {"
            ''
                first

                second
            ''
        "};
        let e = parse(src.trim_end());
        assert_eq!(e, Expr::text("first\n\nsecond\n"));
    }

    #[test]
    fn stripping_twice_equals_stripping_once() {
        let chunks = Vec::new();
        let once = strip_common_indent(chunks.clone(), "  a\n  b\n".to_string());
        let twice = match &once {
            Expr::TextLit(c, s) => strip_common_indent(c.clone(), s.clone()),
            _ => unreachable!(),
        };
        assert_eq!(once, twice);
    }
}
