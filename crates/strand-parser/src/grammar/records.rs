//! Records and unions. `{}` is the empty record type, `{=}` the empty record
//! literal; the presence of `=` vs `:` on the first field disambiguates a non-empty
//! record as a type or a literal. Unions are always typed (`<l : T | ...>`).

use indexmap::IndexMap;
use strand_syntax::{Expr, Label};

use crate::engine::Engine;
use crate::grammar::atoms::reserved_names;
use crate::grammar::expression;
use crate::grammar::lexical::{nonreserved_label, skip_trivia};

pub fn record_or_union_expr(e: &mut Engine) -> Option<Expr> {
    if e.peek() == Some('{') {
        return record_expr(e);
    }
    if e.peek() == Some('<') {
        return union_expr(e);
    }
    None
}

fn record_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("record-expression", |e| {
        if !e.eat_char('{') {
            return None;
        }
        skip_trivia(e);

        if e.eat_char('=') {
            skip_trivia(e);
            if !e.eat_char('}') {
                e.error_here("record-expression", "expected '}' to close empty record literal");
                return None;
            }
            return Some(Expr::RecordLit(IndexMap::new()));
        }

        if e.eat_char('}') {
            return Some(Expr::Record(IndexMap::new()));
        }

        let mut is_literal: Option<bool> = None;
        let mut type_fields = IndexMap::new();
        let mut lit_fields = IndexMap::new();

        loop {
            let field_label = nonreserved_label(e, &reserved_names())?;
            skip_trivia(e);

            match e.peek() {
                Some(':') => {
                    if is_literal == Some(true) {
                        e.error_here("record-expression", "cannot mix ':' and '=' fields");
                        return None;
                    }
                    is_literal = Some(false);
                    e.bump();
                    skip_trivia(e);
                    let ty = expression(e)?;
                    if type_fields.insert(field_label.clone(), ty).is_some() {
                        e.error_here("record-expression", format!("duplicate field '{field_label}'"));
                        return None;
                    }
                }
                Some('=') => {
                    if is_literal == Some(false) {
                        e.error_here("record-expression", "cannot mix ':' and '=' fields");
                        return None;
                    }
                    is_literal = Some(true);
                    e.bump();
                    skip_trivia(e);
                    let value = expression(e)?;
                    if lit_fields.insert(field_label.clone(), value).is_some() {
                        e.error_here("record-expression", format!("duplicate field '{field_label}'"));
                        return None;
                    }
                }
                _ => {
                    // Punning: `{ x }` short for `{ x = x }`.
                    is_literal = Some(true);
                    if lit_fields
                        .insert(field_label.clone(), Expr::Var(field_label.clone(), 0))
                        .is_some()
                    {
                        e.error_here("record-expression", format!("duplicate field '{field_label}'"));
                        return None;
                    }
                }
            }

            skip_trivia(e);
            let checkpoint = e.checkpoint();
            if e.eat_char(',') {
                skip_trivia(e);
                continue;
            }
            e.reset(checkpoint);
            break;
        }

        if !e.eat_char('}') {
            e.error_here("record-expression", "expected '}' or ',' in record");
            return None;
        }

        Some(if is_literal == Some(true) {
            Expr::RecordLit(lit_fields)
        } else {
            Expr::Record(type_fields)
        })
    })
}

fn union_expr(e: &mut Engine) -> Option<Expr> {
    e.rule("union-expression", |e| {
        if !e.eat_char('<') {
            return None;
        }
        skip_trivia(e);

        let mut alternatives: IndexMap<Label, Option<Expr>> = IndexMap::new();

        if e.peek() != Some('>') {
            loop {
                let alt_label = nonreserved_label(e, &reserved_names())?;
                skip_trivia(e);
                let checkpoint = e.checkpoint();
                let payload = if e.eat_char(':') {
                    skip_trivia(e);
                    Some(expression(e)?)
                } else {
                    e.reset(checkpoint);
                    None
                };
                if alternatives.insert(alt_label.clone(), payload).is_some() {
                    e.error_here("union-expression", format!("duplicate alternative '{alt_label}'"));
                    return None;
                }

                skip_trivia(e);
                let checkpoint = e.checkpoint();
                if e.eat_char('|') {
                    skip_trivia(e);
                    continue;
                }
                e.reset(checkpoint);
                break;
            }
        }

        if !e.eat_char('>') {
            e.error_here("union-expression", "expected '>' to close union type");
            return None;
        }

        Some(Expr::UnionType(alternatives))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn parse(src: &str) -> Expr {
        let mut e = Engine::new(src, ParseOptions::default());
        record_or_union_expr(&mut e).expect("should parse")
    }

    #[test]
    fn empty_record_type_vs_literal() {
        assert_eq!(parse("{}"), Expr::Record(IndexMap::new()));
        assert_eq!(parse("{=}"), Expr::RecordLit(IndexMap::new()));
    }

    #[test]
    fn record_literal_with_punning() {
        let e = parse("{ x, y = 2 }");
        match e {
            Expr::RecordLit(fields) => {
                assert_eq!(fields.get("x"), Some(&Expr::Var("x".into(), 0)));
                assert_eq!(fields.get("y"), Some(&Expr::NaturalLit(2u32.into())));
            }
            _ => panic!("expected RecordLit"),
        }
    }

    #[test]
    fn record_type_rejects_duplicate_fields() {
        let mut e = Engine::new("{ x : Natural, x : Bool }", ParseOptions::default());
        assert!(record_expr(&mut e).is_none());
    }

    #[test]
    fn union_type_allows_payload_free_alternatives() {
        let e = parse("<A | B : Natural>");
        match e {
            Expr::UnionType(alts) => {
                assert_eq!(alts.get("A"), Some(&None));
                assert_eq!(alts.get("B"), Some(&Some(Expr::Builtin(strand_syntax::Builtin::Natural))));
            }
            _ => panic!("expected UnionType"),
        }
    }
}
