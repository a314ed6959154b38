//! Lists. `[]: List T` requires an element-type annotation; `[e1, e2, …]` is
//! non-empty and infers its element type downstream (evaluation out of scope here).

use strand_syntax::{Builtin, Expr};

use crate::engine::Engine;
use crate::grammar::expression;
use crate::grammar::lexical::skip_trivia;
use crate::grammar::operators::operator_expr;

pub fn list_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("list-expression", |e| {
        if !e.eat_char('[') {
            return None;
        }
        skip_trivia(e);

        if e.eat_char(']') {
            skip_trivia(e);
            if !e.eat_char(':') {
                e.error_here("list-expression", "empty list requires an element-type annotation");
                return None;
            }
            skip_trivia(e);
            let ty = operator_expr(e)?;
            if !matches!(&ty, Expr::App(f, _) if matches!(**f, Expr::Builtin(Builtin::List))) {
                e.error_here("list-expression", "empty list annotation must be 'List T'");
            }
            return Some(Expr::EmptyList(Box::new(ty)));
        }

        let mut items = vec![expression(e)?];
        loop {
            skip_trivia(e);
            let checkpoint = e.checkpoint();
            if !e.eat_char(',') {
                e.reset(checkpoint);
                break;
            }
            skip_trivia(e);
            items.push(expression(e)?);
        }

        skip_trivia(e);
        if !e.eat_char(']') {
            e.error_here("list-expression", "expected ']' or ',' in list literal");
            return None;
        }

        Some(Expr::NonEmptyList(items))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn parse(src: &str) -> Expr {
        let mut e = Engine::new(src, ParseOptions::default());
        list_expr(&mut e).expect("should parse")
    }

    #[test]
    fn non_empty_list_collects_items() {
        let e = parse("[1, 2, 3]");
        match e {
            Expr::NonEmptyList(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected NonEmptyList"),
        }
    }

    #[test]
    fn empty_list_requires_annotation() {
        let mut e = Engine::new("[]", ParseOptions::default());
        assert!(list_expr(&mut e).is_none());
    }

    #[test]
    fn empty_list_keeps_its_element_type() {
        let e = parse("[] : List Natural");
        match e {
            Expr::EmptyList(ty) => {
                assert_eq!(
                    *ty,
                    Expr::App(Box::new(Expr::Builtin(Builtin::List)), Box::new(Expr::Builtin(Builtin::Natural)))
                );
            }
            _ => panic!("expected EmptyList"),
        }
    }
}
