//! Application and field selection.
//!
//! `expr (. label | .{l1, l2, …} | .(Type))*` generalizes plain field access to
//! projection by label set or by a type's fields, then a
//! whitespace-separated left-associative application chain sits on top.

use strand_syntax::{Expr, Label, Selector};

use crate::engine::Engine;
use crate::grammar::atoms::primary_expr;
use crate::grammar::bindings::{merge_expr, some_expr, to_map_expr};
use crate::grammar::lexical::{label, nonreserved_label, skip_trivia, skip_trivia1};

/// One step tighter than full application: the operand position for `merge`/`Some`/
/// `toMap`, and the base case `application_expr` folds over.
pub fn selector_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("selector-expression", |e| {
        let mut expr = primary_expr(e)?;
        loop {
            let checkpoint = e.checkpoint();
            skip_trivia(e);
            if !e.eat_char('.') {
                e.reset(checkpoint);
                break;
            }
            skip_trivia(e);

            if e.eat_char('{') {
                skip_trivia(e);
                let labels = label_set(e)?;
                skip_trivia(e);
                if !e.eat_char('}') {
                    e.error_here("selector-expression", "expected '}' to close projection");
                    return None;
                }
                expr = Expr::Project(Box::new(expr), Selector::Labels(labels));
                continue;
            }

            if e.eat_char('(') {
                skip_trivia(e);
                let ty = crate::grammar::expression(e)?;
                skip_trivia(e);
                if !e.eat_char(')') {
                    e.error_here("selector-expression", "expected ')' to close type projection");
                    return None;
                }
                expr = Expr::Project(Box::new(expr), Selector::ByType(Box::new(ty)));
                continue;
            }

            let Some(l) = label(e) else {
                e.error_here("selector-expression", "expected a label after '.'");
                return None;
            };
            expr = Expr::Field(Box::new(expr), l);
        }
        Some(expr)
    })
}

fn label_set(e: &mut Engine) -> Option<Vec<Label>> {
    let mut labels = Vec::new();
    if let Some(first) = nonreserved_label(e, &[]) {
        labels.push(first);
        loop {
            let checkpoint = e.checkpoint();
            skip_trivia(e);
            if !e.eat_char(',') {
                e.reset(checkpoint);
                break;
            }
            skip_trivia(e);
            let Some(next) = nonreserved_label(e, &[]) else {
                e.error_here("selector-expression", "expected a label after ','");
                return None;
            };
            labels.push(next);
        }
    }
    Some(labels)
}

/// Application: a whitespace-separated sequence of operands, left-associative. The
/// leading forms `merge`, `Some`, `toMap` are tried first since they bind tighter than
/// further application.
pub fn application_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("application-expression", |e| {
        let mut expr = merge_expr(e)
            .or_else(|| e.attempt(some_expr))
            .or_else(|| e.attempt(to_map_expr))
            .or_else(|| e.attempt(selector_expr))?;

        loop {
            let checkpoint = e.checkpoint();
            if !skip_trivia1(e) {
                break;
            }
            if e.at_eof() {
                e.reset(checkpoint);
                break;
            }
            let Some(arg) = e.attempt(selector_expr) else {
                e.reset(checkpoint);
                break;
            };
            expr = Expr::App(Box::new(expr), Box::new(arg));
        }

        Some(expr)
    })
}

/// `e with a.b.c = v`, one precedence level above the operator chain:
/// tighter than every binary operator, looser than plain application.
pub fn with_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("with-expression", |e| {
        let mut expr = application_expr(e)?;
        loop {
            let checkpoint = e.checkpoint();
            skip_trivia(e);
            if !crate::grammar::lexical::keyword(e, "with") {
                e.reset(checkpoint);
                break;
            }
            skip_trivia(e);
            let Some(path) = with_path(e) else {
                e.error_here("with-expression", "expected a label path after 'with'");
                return None;
            };
            skip_trivia(e);
            if !e.eat_char('=') {
                e.error_here("with-expression", "expected '=' in 'with' update");
                return None;
            }
            skip_trivia(e);
            let value = application_expr(e)?;
            expr = Expr::With(Box::new(expr), path, Box::new(value));
        }
        Some(expr)
    })
}

fn with_path(e: &mut Engine) -> Option<Vec<Label>> {
    let mut path = vec![label(e)?];
    loop {
        let checkpoint = e.checkpoint();
        skip_trivia(e);
        if !e.eat_char('.') {
            e.reset(checkpoint);
            break;
        }
        skip_trivia(e);
        let Some(next) = label(e) else {
            e.error_here("with-expression", "expected a label after '.' in 'with' path");
            return None;
        };
        path.push(next);
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn parse(src: &str) -> Expr {
        let mut e = Engine::new(src, ParseOptions::default());
        application_expr(&mut e).expect("should parse")
    }

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string(), 0)
    }

    #[test]
    fn application_is_left_associative() {
        let e = parse("f a b");
        assert_eq!(
            e,
            Expr::App(Box::new(Expr::App(Box::new(var("f")), Box::new(var("a")))), Box::new(var("b")))
        );
    }

    #[test]
    fn field_selection_chains() {
        let e = parse("r.a.b");
        assert_eq!(
            e,
            Expr::Field(Box::new(Expr::Field(Box::new(var("r")), "a".into())), "b".into())
        );
    }

    #[test]
    fn label_set_projection() {
        let e = parse("r.{ a, b }");
        assert_eq!(
            e,
            Expr::Project(Box::new(var("r")), Selector::Labels(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn with_update_parses_a_dotted_path() {
        let mut e = Engine::new("r with a.b = True", ParseOptions::default());
        let parsed = with_expr(&mut e).expect("should parse");
        assert_eq!(
            parsed,
            Expr::With(Box::new(var("r")), vec!["a".into(), "b".into()], Box::new(Expr::BoolLit(true)))
        );
    }
}
