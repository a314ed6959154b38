//! `as Location` mode: substitutes the import target
//! itself, described as a closed union value, without performing any fetch.

use indexmap::IndexMap;
use strand_syntax::{Expr, Fetchable};

/// The four-alternative union type every `as Location` import is a value of:
/// `< Local : Text | Remote : Text | Environment : Text | Missing >`. Built fresh each
/// call rather than cached — these expressions are cheap and the AST is a tree, not a
/// DAG, so there is no sharing to preserve.
fn location_type() -> Expr {
    let mut alts = IndexMap::new();
    alts.insert("Local".to_string(), Some(Expr::Builtin(strand_syntax::Builtin::Text)));
    alts.insert("Remote".to_string(), Some(Expr::Builtin(strand_syntax::Builtin::Text)));
    alts.insert(
        "Environment".to_string(),
        Some(Expr::Builtin(strand_syntax::Builtin::Text)),
    );
    alts.insert("Missing".to_string(), None);
    Expr::UnionType(alts)
}

/// Builds the closed union value describing `target`'s kind. A constructor for union
/// alternative `label` is itself `Field(unionType, label)`; one carrying a payload is
/// that constructor applied to the payload (there is no separate "union literal" AST
/// node).
pub fn value_for(target: &Fetchable) -> Expr {
    let ty = location_type();
    match target {
        Fetchable::Missing => Expr::Field(Box::new(ty), "Missing".to_string()),
        Fetchable::Local { .. } => construct(ty, "Local", target.to_string()),
        Fetchable::Remote { url } => construct(ty, "Remote", url.to_string()),
        Fetchable::EnvVar { name } => construct(ty, "Environment", name.0.clone()),
    }
}

fn construct(ty: Expr, label: &str, payload: String) -> Expr {
    Expr::App(
        Box::new(Expr::Field(Box::new(ty), label.to_string())),
        Box::new(Expr::text(payload)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_syntax::is_closed;

    #[test]
    fn location_values_are_always_closed() {
        let targets = [
            Fetchable::Missing,
            Fetchable::EnvVar {
                name: strand_syntax::EnvName("HOME".to_string()),
            },
        ];
        for target in &targets {
            assert!(is_closed(&value_for(target)));
        }
    }

    #[test]
    fn missing_has_no_payload() {
        match value_for(&Fetchable::Missing) {
            Expr::Field(_, label) => assert_eq!(label, "Missing"),
            other => panic!("expected Field, got {other:?}"),
        }
    }

    #[test]
    fn env_var_carries_its_name_as_payload() {
        let target = Fetchable::EnvVar {
            name: strand_syntax::EnvName("FOO".to_string()),
        };
        match value_for(&target) {
            Expr::App(ctor, payload) => {
                match *ctor {
                    Expr::Field(_, label) => assert_eq!(label, "Environment"),
                    other => panic!("expected Field, got {other:?}"),
                }
                assert!(matches!(*payload, Expr::TextLit(chunks, suffix) if chunks.is_empty() && suffix == "FOO"));
            }
            other => panic!("expected App, got {other:?}"),
        }
    }
}
