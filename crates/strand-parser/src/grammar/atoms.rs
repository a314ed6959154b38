//! Primary expressions: literals, constants, variables, and parenthesized expressions
//! (the base case of application & selection).

use strand_syntax::{Builtin, Const, Expr};

use crate::engine::Engine;
use crate::grammar::imports::import_expr;
use crate::grammar::lexical::{
    bare_label, double_literal, integer_literal, natural_digits, skip_trivia,
};
use crate::grammar::lists::list_expr;
use crate::grammar::records::{record_or_union_expr};
use crate::grammar::text::text_literal;
use crate::grammar::{expression, KEYWORDS};

/// All names that shadow a user variable of the same spelling: keywords plus every
/// built-in constant/function.
pub fn reserved_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = KEYWORDS.to_vec();
    names.extend(["Type", "Kind", "Sort"]);
    names.extend(Builtin::ALL.iter().map(|(_, n)| *n));
    names
}

pub fn primary_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("primary-expression", |e| {
        // `Double` must be tried before `Natural`/`Integer`: both of those are a
        // strict prefix of a finite double's digits, and would otherwise greedily
        // consume the integer part and leave a stray `.2`/`e10` behind.
        let checkpoint = e.checkpoint();
        if let Some(d) = double_literal(e) {
            return Some(Expr::DoubleLit(d));
        }
        e.reset(checkpoint);
        if let Some(n) = integer_literal(e) {
            return Some(Expr::IntegerLit(n));
        }
        e.reset(checkpoint);
        if let Some(n) = natural_digits(e) {
            return Some(Expr::NaturalLit(n));
        }

        if let Some(expr) = text_literal(e) {
            return Some(expr);
        }
        if let Some(expr) = record_or_union_expr(e) {
            return Some(expr);
        }
        if let Some(expr) = list_expr(e) {
            return Some(expr);
        }
        if let Some(expr) = import_expr(e) {
            return Some(Expr::Import(expr));
        }
        if e.eat_char('(') {
            skip_trivia(e);
            let inner = expression(e)?;
            skip_trivia(e);
            if !e.eat_char(')') {
                e.error_here("primary-expression", "expected ')'");
                return None;
            }
            return Some(inner);
        }

        identifier_or_reserved(e)
    })
}

/// Parses a (possibly `@n`-suffixed) bare label and classifies it as a keyword-const,
/// a builtin, or a `Var`. Reserved exact matches never fall through to `Var`.
fn identifier_or_reserved(e: &mut Engine) -> Option<Expr> {
    let checkpoint = e.checkpoint();
    let name = bare_label(e)?;

    match name.as_str() {
        "True" => return Some(Expr::BoolLit(true)),
        "False" => return Some(Expr::BoolLit(false)),
        "Type" => return Some(Expr::Const(Const::Type)),
        "Kind" => return Some(Expr::Const(Const::Kind)),
        "Sort" => return Some(Expr::Const(Const::Sort)),
        "missing" => {
            e.reset(checkpoint);
            return None;
        }
        _ => {}
    }

    if let Some(builtin) = Builtin::from_name(&name) {
        return Some(Expr::Builtin(builtin));
    }

    if KEYWORDS.contains(&name.as_str()) {
        e.reset(checkpoint);
        return None;
    }

    let index = if e.eat_char('@') {
        let digits = natural_digits(e)?;
        use num_traits::cast::ToPrimitive;
        digits.to_usize().unwrap_or(0)
    } else {
        0
    };

    Some(Expr::Var(name, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn parse(src: &str) -> Expr {
        let mut e = Engine::new(src, ParseOptions::default());
        primary_expr(&mut e).expect("should parse")
    }

    #[test]
    fn natural_vs_integer_vs_double() {
        assert_eq!(parse("42"), Expr::NaturalLit(42u32.into()));
        assert_eq!(parse("+42"), Expr::IntegerLit(42.into()));
        assert_eq!(parse("4.2"), Expr::DoubleLit(4.2));
    }

    #[test]
    fn double_with_exponent_is_not_swallowed_by_natural() {
        assert_eq!(parse("1e10"), Expr::DoubleLit(1e10));
    }

    #[test]
    fn signed_double_is_not_swallowed_by_integer() {
        assert_eq!(parse("+1.5"), Expr::DoubleLit(1.5));
        assert_eq!(parse("-1.5"), Expr::DoubleLit(-1.5));
    }

    #[test]
    fn reserved_builtin_vs_plain_label() {
        assert_eq!(parse("Natural"), Expr::Builtin(Builtin::Natural));
        assert_eq!(parse("Naturalism"), Expr::Var("Naturalism".into(), 0));
    }

    #[test]
    fn at_suffix_sets_de_bruijn_index() {
        assert_eq!(parse("x@2"), Expr::Var("x".into(), 2));
        assert_eq!(parse("x"), Expr::Var("x".into(), 0));
    }

    #[test]
    fn parenthesized_expression_unwraps() {
        assert_eq!(parse("(True)"), Expr::BoolLit(true));
    }
}
