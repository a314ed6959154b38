//! Let / lambda / pi / if / merge / toMap / assert.

use strand_syntax::{Binding, Expr};

use crate::engine::Engine;
use crate::grammar::application::selector_expr;
use crate::grammar::atoms::reserved_names;
use crate::grammar::lexical::{keyword, nonreserved_label, skip_trivia, skip_trivia1, symbol};
use crate::grammar::operators::operator_expr;

/// `λ(x : T) → body` / `\(x : T) -> body`.
pub fn lambda_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("lambda-expression", |e| {
        if !(symbol(e, "\u{3bb}") || e.eat_char('\\')) {
            return None;
        }
        skip_trivia(e);
        if !e.eat_char('(') {
            e.error_here("lambda-expression", "expected '(' after lambda sigil");
            return None;
        }
        skip_trivia(e);
        let label = nonreserved_label(e, &reserved_names())?;
        skip_trivia(e);
        if !e.eat_char(':') {
            e.error_here("lambda-expression", "expected ':' in lambda parameter");
            return None;
        }
        skip_trivia(e);
        let ty = expression(e)?;
        skip_trivia(e);
        if !e.eat_char(')') {
            e.error_here("lambda-expression", "expected ')' to close lambda parameter");
            return None;
        }
        skip_trivia(e);
        if !(symbol(e, "\u{2192}") || e.eat_str("->")) {
            e.error_here("lambda-expression", "expected '->' after lambda parameter");
            return None;
        }
        skip_trivia(e);
        let body = expression(e)?;
        Some(Expr::Lambda(label, Box::new(ty), Box::new(body)))
    })
}

/// `∀(x : T) → body` / `forall(x : T) -> body`.
pub fn forall_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("forall-expression", |e| {
        if !(symbol(e, "\u{2200}") || e.eat_str("forall")) {
            return None;
        }
        skip_trivia(e);
        if !e.eat_char('(') {
            e.error_here("forall-expression", "expected '(' after forall sigil");
            return None;
        }
        skip_trivia(e);
        let label = nonreserved_label(e, &reserved_names())?;
        skip_trivia(e);
        if !e.eat_char(':') {
            e.error_here("forall-expression", "expected ':' in forall parameter");
            return None;
        }
        skip_trivia(e);
        let ty = expression(e)?;
        skip_trivia(e);
        if !e.eat_char(')') {
            e.error_here("forall-expression", "expected ')' to close forall parameter");
            return None;
        }
        skip_trivia(e);
        if !(symbol(e, "\u{2192}") || e.eat_str("->")) {
            e.error_here("forall-expression", "expected '->' after forall parameter");
            return None;
        }
        skip_trivia(e);
        let body = expression(e)?;
        Some(Expr::Pi(label, Box::new(ty), Box::new(body)))
    })
}

/// `if c then t else f`.
pub fn if_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("if-expression", |e| {
        if !keyword(e, "if") {
            return None;
        }
        skip_trivia(e);
        let cond = expression(e)?;
        skip_trivia(e);
        if !keyword(e, "then") {
            e.error_here("if-expression", "expected 'then'");
            return None;
        }
        skip_trivia(e);
        let then_branch = expression(e)?;
        skip_trivia(e);
        if !keyword(e, "else") {
            e.error_here("if-expression", "expected 'else'");
            return None;
        }
        skip_trivia(e);
        let else_branch = expression(e)?;
        Some(Expr::BoolIf(Box::new(cond), Box::new(then_branch), Box::new(else_branch)))
    })
}

/// `let x [: T] = v let … in body` — one or more bindings share one `in`.
pub fn let_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("let-expression", |e| {
        if !keyword(e, "let") {
            return None;
        }
        let mut bindings = Vec::new();
        loop {
            skip_trivia(e);
            let label = nonreserved_label(e, &reserved_names())?;
            skip_trivia(e);
            let annotation = if e.eat_char(':') {
                skip_trivia(e);
                let ty = expression(e)?;
                skip_trivia(e);
                Some(ty)
            } else {
                None
            };
            if !e.eat_char('=') {
                e.error_here("let-expression", "expected '=' in let binding");
                return None;
            }
            skip_trivia(e);
            let value = expression(e)?;
            bindings.push(Binding {
                label,
                annotation,
                value,
            });

            skip_trivia(e);
            let checkpoint = e.checkpoint();
            if keyword(e, "let") {
                continue;
            }
            e.reset(checkpoint);
            break;
        }
        skip_trivia(e);
        if !keyword(e, "in") {
            e.error_here("let-expression", "expected 'in' to close let bindings");
            return None;
        }
        skip_trivia(e);
        let body = expression(e)?;
        Some(Expr::Let(bindings, Box::new(body)))
    })
}

/// `assert : T`. Appears only where `expression` is dispatched, never
/// nested inside application without parentheses.
pub fn assert_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("assert-expression", |e| {
        if !keyword(e, "assert") {
            return None;
        }
        skip_trivia(e);
        if !e.eat_char(':') {
            e.error_here("assert-expression", "expected ':' after 'assert'");
            return None;
        }
        skip_trivia(e);
        let ty = expression(e)?;
        Some(Expr::Assert(Box::new(ty)))
    })
}

/// `merge h u [: T]`. Operands are parsed at `selector_expr` precedence — one notch
/// tighter than full application — so `merge h u` reads as a single application-level
/// unit rather than swallowing further trailing arguments.
pub fn merge_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("merge-expression", |e| {
        if !keyword(e, "merge") {
            return None;
        }
        if !skip_trivia1(e) {
            e.error_here("merge-expression", "expected whitespace after 'merge'");
            return None;
        }
        let handler = selector_expr(e)?;
        if !skip_trivia1(e) {
            e.error_here("merge-expression", "expected whitespace before merge union operand");
            return None;
        }
        let union = selector_expr(e)?;

        let checkpoint = e.checkpoint();
        skip_trivia(e);
        let annotation = if e.eat_char(':') {
            skip_trivia(e);
            Some(Box::new(operator_expr(e)?))
        } else {
            e.reset(checkpoint);
            None
        };

        Some(Expr::Merge(Box::new(handler), Box::new(union), annotation))
    })
}

/// `Some e`.
pub fn some_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("some-expression", |e| {
        if !keyword(e, "Some") {
            return None;
        }
        if !skip_trivia1(e) {
            e.error_here("some-expression", "expected whitespace after 'Some'");
            return None;
        }
        let inner = selector_expr(e)?;
        Some(Expr::Some(Box::new(inner)))
    })
}

/// `toMap e [: T]`.
pub fn to_map_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("to-map-expression", |e| {
        if !keyword(e, "toMap") {
            return None;
        }
        if !skip_trivia1(e) {
            e.error_here("to-map-expression", "expected whitespace after 'toMap'");
            return None;
        }
        let inner = selector_expr(e)?;

        let checkpoint = e.checkpoint();
        skip_trivia(e);
        let annotation = if e.eat_char(':') {
            skip_trivia(e);
            Some(Box::new(operator_expr(e)?))
        } else {
            e.reset(checkpoint);
            None
        };

        Some(Expr::ToMap(Box::new(inner), annotation))
    })
}

/// The top-level `Expression` production: lambda/forall/if/let/assert each take
/// the entire rest of the expression, otherwise fall through to the operator chain with
/// its own optional trailing `-> expr` (Pi sugar, `T -> U`) or `: expr` (annotation).
pub fn expression(e: &mut Engine) -> Option<Expr> {
    e.rule("expression", |e| {
        if let Some(expr) = e.attempt(lambda_expr) {
            return Some(expr);
        }
        if let Some(expr) = e.attempt(forall_expr) {
            return Some(expr);
        }
        if let Some(expr) = e.attempt(if_expr) {
            return Some(expr);
        }
        if let Some(expr) = e.attempt(let_expr) {
            return Some(expr);
        }
        if let Some(expr) = e.attempt(assert_expr) {
            return Some(expr);
        }

        let lhs = operator_expr(e)?;

        let checkpoint = e.checkpoint();
        skip_trivia(e);
        if symbol(e, "\u{2192}") || e.eat_str("->") {
            skip_trivia(e);
            let rhs = expression(e)?;
            return Some(Expr::Pi("_".to_string(), Box::new(lhs), Box::new(rhs)));
        }
        e.reset(checkpoint);

        let checkpoint = e.checkpoint();
        skip_trivia(e);
        if e.eat_char(':') {
            skip_trivia(e);
            let rhs = expression(e)?;
            return Some(Expr::Annot(Box::new(lhs), Box::new(rhs)));
        }
        e.reset(checkpoint);

        Some(lhs)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;
    use strand_syntax::Const;

    fn parse(src: &str) -> Expr {
        let mut e = Engine::new(src, ParseOptions::default());
        expression(&mut e).expect("should parse")
    }

    #[test]
    fn lambda_builds_binder() {
        let e = parse("\\(x : Natural) -> x");
        match e {
            Expr::Lambda(label, ty, body) => {
                assert_eq!(label, "x");
                assert_eq!(*ty, Expr::Builtin(strand_syntax::Builtin::Natural));
                assert_eq!(*body, Expr::Var("x".into(), 0));
            }
            _ => panic!("expected Lambda"),
        }
    }

    #[test]
    fn arrow_sugar_builds_anonymous_pi() {
        let e = parse("Natural -> Bool");
        match e {
            Expr::Pi(label, domain, codomain) => {
                assert_eq!(label, "_");
                assert_eq!(*domain, Expr::Builtin(strand_syntax::Builtin::Natural));
                assert_eq!(*codomain, Expr::Builtin(strand_syntax::Builtin::Bool));
            }
            _ => panic!("expected Pi"),
        }
    }

    #[test]
    fn let_with_multiple_bindings_shares_one_in() {
        let e = parse("let x = 1 let y = 2 in x");
        match e {
            Expr::Let(bindings, _) => assert_eq!(bindings.len(), 2),
            _ => panic!("expected Let"),
        }
    }

    #[test]
    fn annotation_binds_weaker_than_operators() {
        let e = parse("1 + 1 : Natural");
        match e {
            Expr::Annot(_, ty) => assert_eq!(*ty, Expr::Builtin(strand_syntax::Builtin::Natural)),
            _ => panic!("expected Annot"),
        }
    }

    #[test]
    fn assert_carries_only_its_annotation() {
        let e = parse("assert : Natural");
        assert_eq!(e, Expr::Assert(Box::new(Expr::Builtin(strand_syntax::Builtin::Natural))));
    }

    #[test]
    fn bare_const_is_not_annotation() {
        assert_eq!(parse("Type"), Expr::Const(Const::Type));
    }
}
