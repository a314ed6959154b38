//! Binary operator precedence, weakest to strongest binding. Each
//! level is left-associative and folds into a flat chain of `Operator` nodes, exactly
//! as a classic precedence-climbing parser would, rather than needing a dedicated
//! combinator for "repeat-then-fold".

use strand_syntax::{Expr, Opcode};

use crate::engine::Engine;
use crate::grammar::application::with_expr;
use crate::grammar::lexical::skip_trivia;

/// Lowest to highest binding. `?` binds weakest, below even `||`, so an import
/// fallback chain spans an entire expression rather than just its innermost operand.
const LEVELS: &[(&str, Opcode)] = &[
    ("?", Opcode::ImportAlt),
    ("||", Opcode::Or),
    ("+", Opcode::Plus),
    ("++", Opcode::TextAppend),
    ("#", Opcode::ListAppend),
    ("&&", Opcode::And),
    ("*", Opcode::Times),
    ("==", Opcode::Equal),
    ("!=", Opcode::NotEqual),
];

/// Entry point: the full operator precedence chain, bottoming out at application and
/// field selection.
pub fn operator_expr(e: &mut Engine) -> Option<Expr> {
    level(e, 0)
}

fn level(e: &mut Engine, idx: usize) -> Option<Expr> {
    let Some(&(token, opcode)) = LEVELS.get(idx) else {
        return with_expr(e);
    };

    let mut lhs = level(e, idx + 1)?;

    loop {
        let checkpoint = e.checkpoint();
        skip_trivia(e);
        if !e.eat_str(token) {
            e.reset(checkpoint);
            break;
        }
        skip_trivia(e);
        let Some(rhs) = level(e, idx + 1) else {
            e.reset(checkpoint);
            break;
        };
        lhs = Expr::Operator(opcode, Box::new(lhs), Box::new(rhs));
    }

    Some(lhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;
    use strand_syntax::Const;

    fn parse(src: &str) -> Expr {
        let mut e = Engine::new(src, ParseOptions::default());
        operator_expr(&mut e).expect("should parse")
    }

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string(), 0)
    }

    #[test]
    fn or_binds_weaker_than_and() {
        // a || b && c  ==  a || (b && c)
        let e = parse("a || b && c");
        assert_eq!(
            e,
            Expr::Operator(
                Opcode::Or,
                Box::new(var("a")),
                Box::new(Expr::Operator(Opcode::And, Box::new(var("b")), Box::new(var("c"))))
            )
        );
    }

    #[test]
    fn plus_binds_weaker_than_times() {
        // a + b * c == a + (b * c)
        let e = parse("a + b * c");
        assert_eq!(
            e,
            Expr::Operator(
                Opcode::Plus,
                Box::new(var("a")),
                Box::new(Expr::Operator(Opcode::Times, Box::new(var("b")), Box::new(var("c"))))
            )
        );
    }

    #[test]
    fn equal_and_not_equal_are_left_associative() {
        // a == b != c == (a == b) != c
        let e = parse("a == b != c");
        assert_eq!(
            e,
            Expr::Operator(
                Opcode::NotEqual,
                Box::new(Expr::Operator(Opcode::Equal, Box::new(var("a")), Box::new(var("b")))),
                Box::new(var("c"))
            )
        );
    }

    #[test]
    fn text_append_does_not_swallow_single_plus() {
        let e = parse("a + b ++ c");
        assert_eq!(
            e,
            Expr::Operator(
                Opcode::Plus,
                Box::new(var("a")),
                Box::new(Expr::Operator(
                    Opcode::TextAppend,
                    Box::new(var("b")),
                    Box::new(var("c"))
                ))
            )
        );
    }

    #[test]
    fn import_alt_is_weakest() {
        let e = parse("a ? b || c");
        assert_eq!(
            e,
            Expr::Operator(
                Opcode::ImportAlt,
                Box::new(var("a")),
                Box::new(Expr::Operator(Opcode::Or, Box::new(var("b")), Box::new(var("c"))))
            )
        );
    }

    #[test]
    fn bare_type_const_parses_through_to_application() {
        assert_eq!(parse("Type"), Expr::Const(Const::Type));
    }
}
