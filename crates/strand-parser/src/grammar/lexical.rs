//! Whitespace/comments, identifiers, keywords, and numeric literals.

use num_bigint::{BigInt, BigUint};
use num_traits::Num;

use crate::engine::Engine;

pub const KEYWORDS: &[&str] = &[
    "if", "then", "else", "let", "in", "as", "using", "merge", "missing", "True", "False",
    "Infinity", "NaN", "Some", "toMap", "assert", "with",
];

fn is_label_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_label_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '/' | '-')
}

/// `_` := zero or more of: space/tab/newline, `--` line comments, nestable `{- -}`
/// block comments. Never fails.
pub fn skip_trivia(e: &mut Engine) {
    loop {
        e.eat_while(|ch| matches!(ch, ' ' | '\t' | '\n' | '\r'));

        if e.eat_str("--") {
            e.eat_while(|ch| ch != '\n');
            continue;
        }

        if e.peek() == Some('{') && e.peek_nth(1) == Some('-') {
            skip_block_comment(e);
            continue;
        }

        break;
    }
}

/// One or more of the same. Fails (returns `false`) if nothing was
/// consumed, which the caller uses to require separating whitespace (e.g. between
/// `merge` and its two operands).
pub fn skip_trivia1(e: &mut Engine) -> bool {
    let start = e.checkpoint();
    skip_trivia(e);
    e.checkpoint() != start
}

fn skip_block_comment(e: &mut Engine) {
    debug_assert!(e.eat_str("{-"));
    let mut depth = 1u32;
    while depth > 0 {
        if e.at_eof() {
            e.error_here("comment", "unterminated block comment");
            return;
        }
        if e.eat_str("{-") {
            depth += 1;
        } else if e.eat_str("-}") {
            depth -= 1;
        } else {
            e.bump();
        }
    }
}

/// Parses a bare label: keyword-as-label or `[A-Za-z_][A-Za-z0-9_/-]*`. Does not
/// itself decide reservedness — see [`reserved_or_label`].
pub fn bare_label(e: &mut Engine) -> Option<String> {
    let start = e.checkpoint();
    let first = e.peek()?;
    if !is_label_start(first) {
        return None;
    }
    e.bump();
    e.eat_while(is_label_continue);
    Some(e.text_since(start).to_string())
}

/// A quoted label: `` `name` `` (arbitrary text between backticks, no escapes). Used
/// where a reserved word must be forced into label position.
pub fn quoted_label(e: &mut Engine) -> Option<String> {
    let checkpoint = e.checkpoint();
    if !e.eat_char('`') {
        return None;
    }
    let start = e.checkpoint();
    e.eat_while(|ch| ch != '`');
    let text = e.text_since(start).to_string();
    if !e.eat_char('`') {
        e.reset(checkpoint);
        return None;
    }
    Some(text)
}

/// Any label, quoted or bare.
pub fn label(e: &mut Engine) -> Option<String> {
    e.rule("label", |e| quoted_label(e).or_else(|| bare_label(e)))
}

/// `Naturalism` is a label; `Natural` is reserved. A label is only "nonreserved" if it
/// is not in `names` — OR if continuation characters follow, i.e. `reserved` only
/// blocks an exact match, not a prefix.
pub fn is_exact_keyword_or_builtin(text: &str, names: &[&str]) -> bool {
    names.contains(&text)
}

/// Parses a label guaranteed not to collide with any of `reserved` (built-ins or
/// keywords), per the `NonreservedLabel` rule.
pub fn nonreserved_label(e: &mut Engine, reserved: &[&str]) -> Option<String> {
    e.rule("nonreserved-label", |e| {
        let checkpoint = e.checkpoint();
        let text = bare_label(e)?;
        if is_exact_keyword_or_builtin(&text, reserved) {
            e.reset(checkpoint);
            return None;
        }
        Some(text)
    })
}

/// Matches a specific keyword exactly — not as a prefix of a longer label.
pub fn keyword(e: &mut Engine, word: &str) -> bool {
    e.attempt(|e| {
        let checkpoint = e.checkpoint();
        if !e.eat_str(word) {
            return None;
        }
        if e.peek().is_some_and(is_label_continue) {
            e.reset(checkpoint);
            return None;
        }
        Some(())
    })
    .is_some()
}

/// Matches a literal symbol that must not be immediately followed by a label
/// continuation character, used for multi-spelling binder sigils (`forall`/`∀`).
pub fn symbol(e: &mut Engine, text: &str) -> bool {
    e.eat_str(text)
}

/// `[0-9]+`, parsed as an arbitrary-precision unsigned integer.
pub fn natural_digits(e: &mut Engine) -> Option<BigUint> {
    let start = e.checkpoint();
    let digits = e.eat_while(|ch| ch.is_ascii_digit());
    if digits.is_empty() {
        e.reset(start);
        return None;
    }
    BigUint::from_str_radix(digits, 10).ok()
}

/// `Natural`: `[0-9]+`.
pub fn natural_literal(e: &mut Engine) -> Option<BigUint> {
    e.rule("natural-literal", natural_digits)
}

/// `Integer`: mandatory sign followed by `Natural`.
pub fn integer_literal(e: &mut Engine) -> Option<BigInt> {
    e.rule("integer-literal", |e| {
        let negative = if e.eat_char('-') {
            true
        } else if e.eat_char('+') {
            false
        } else {
            return None;
        };
        let digits = natural_digits(e)?;
        let value = BigInt::from(digits);
        Some(if negative { -value } else { value })
    })
}

/// `Double`: optional sign, digits, `.digits[exponent]` or `exponent`; plus the
/// `Infinity`/`-Infinity`/`NaN` literals.
pub fn double_literal(e: &mut Engine) -> Option<f64> {
    e.rule("double-literal", |e| {
        if keyword(e, "NaN") {
            return Some(f64::NAN);
        }
        let checkpoint = e.checkpoint();
        let negative = e.eat_char('-');
        if !negative {
            e.eat_char('+');
        }
        if keyword(e, "Infinity") {
            return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
        }
        e.reset(checkpoint);

        let sign_start = e.checkpoint();
        if !e.eat_char('-') {
            e.eat_char('+');
        }
        let int_part = e.eat_while(|ch| ch.is_ascii_digit());
        if int_part.is_empty() {
            e.reset(sign_start);
            return None;
        }

        let mut has_fraction = false;
        if e.peek() == Some('.') {
            let dot = e.checkpoint();
            e.bump();
            let frac = e.eat_while(|ch| ch.is_ascii_digit());
            if frac.is_empty() {
                e.reset(dot);
            } else {
                has_fraction = true;
            }
        }

        let mut has_exponent = false;
        if matches!(e.peek(), Some('e') | Some('E')) {
            let exp_checkpoint = e.checkpoint();
            e.bump();
            if !e.eat_char('-') {
                e.eat_char('+');
            }
            let exp_digits = e.eat_while(|ch| ch.is_ascii_digit());
            if exp_digits.is_empty() {
                e.reset(exp_checkpoint);
            } else {
                has_exponent = true;
            }
        }

        if !has_fraction && !has_exponent {
            e.reset(sign_start);
            return None;
        }

        let text = e.text_since(sign_start);
        text.parse::<f64>().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn engine(src: &str) -> Engine<'_> {
        Engine::new(src, ParseOptions::default())
    }

    #[test]
    fn natural_is_reserved_but_naturalism_is_a_label() {
        let mut e = engine("Natural");
        assert!(is_exact_keyword_or_builtin(&bare_label(&mut e).unwrap(), &["Natural"]));

        let mut e = engine("Naturalism");
        assert!(!is_exact_keyword_or_builtin(&bare_label(&mut e).unwrap(), &["Natural"]));
    }

    #[test]
    fn nested_block_comments_balance() {
        let mut e = engine("{- outer {- inner -} still outer -} rest");
        skip_trivia(&mut e);
        assert_eq!(e.source()[e.offset() as usize..].trim_start(), "rest");
    }

    #[test]
    fn keyword_does_not_match_prefix_of_longer_label() {
        assert!(!keyword(&mut engine("lettuce"), "let"));
        assert!(keyword(&mut engine("let "), "let"));
    }

    #[test]
    fn double_requires_fraction_or_exponent() {
        assert_eq!(double_literal(&mut engine("1e10")), Some(1e10));
        assert_eq!(double_literal(&mut engine("1.5")), Some(1.5));
        assert!(double_literal(&mut engine("1")).is_none());
        assert_eq!(double_literal(&mut engine("-Infinity")), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn integer_requires_explicit_sign() {
        assert!(integer_literal(&mut engine("5")).is_none());
        assert_eq!(integer_literal(&mut engine("+5")).unwrap(), BigInt::from(5));
        assert_eq!(integer_literal(&mut engine("-5")).unwrap(), BigInt::from(-5));
    }
}
