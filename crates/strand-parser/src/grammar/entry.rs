//! Entry point: `StrandFile := shebang? _ Expression _ EOF`.

use strand_syntax::Expr;

use crate::engine::Engine;
use crate::grammar::expression;
use crate::grammar::lexical::skip_trivia;

/// If the source begins with `#!` up to and including the first newline, skip it as
/// trivia. Only applies at offset 0 and does not nest.
fn skip_shebang(e: &mut Engine) {
    if e.offset() != 0 {
        return;
    }
    if e.peek() == Some('#') && e.peek_nth(1) == Some('!') {
        e.eat_while(|ch| ch != '\n');
        e.eat_char('\n');
    }
}

pub fn parse_file(e: &mut Engine) -> Option<Expr> {
    skip_shebang(e);
    skip_trivia(e);
    let expr = expression(e)?;
    skip_trivia(e);
    if !e.at_eof() {
        e.error_here("entry-point", "expected end of input");
        return None;
    }
    Some(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    #[test]
    fn shebang_line_is_skipped() {
        let mut e = Engine::new("#!/usr/bin/env strand-run\nTrue", ParseOptions::default());
        assert_eq!(parse_file(&mut e), Some(Expr::BoolLit(true)));
    }

    #[test]
    fn trailing_garbage_fails() {
        let mut e = Engine::new("True garbage )", ParseOptions::default());
        assert!(parse_file(&mut e).is_none());
    }

    #[test]
    fn whole_file_roundtrip() {
        let mut e = Engine::new("  { a = 1, b = True }  ", ParseOptions::default());
        assert!(parse_file(&mut e).is_some());
    }

    #[test]
    fn lambda_with_if_matches_ast_snapshot() {
        let mut e = Engine::new("λ(x : Bool) → if x then True else False", ParseOptions::default());
        let expr = parse_file(&mut e).unwrap();
        insta::assert_snapshot!(
            format!("{expr:?}"),
            @r#"Lambda("x", Builtin(Bool), BoolIf(Var("x", 0), BoolLit(true), BoolLit(false)))"#
        );
    }
}
