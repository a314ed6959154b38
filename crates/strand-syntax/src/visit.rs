use std::collections::HashMap;

use indexmap::IndexSet;

use crate::{Expr, Label};

/// The set of free variables in an expression, in order of first occurrence. Two
/// `Var` nodes with the same name but different De Bruijn indices are different
/// variables only if both are free; a free reference is identified by name alone,
/// since by definition there is no enclosing binder left to disambiguate with.
pub type FreeVariables = IndexSet<Label>;

/// Tracks, for each name currently in scope, how many binders of that name enclose the
/// point of traversal. A `Var(name, index)` is bound when `index < depth[name]`, and
/// free otherwise — mirroring how the parser assigns indices in the first place.
#[derive(Default)]
struct Scope {
    depth: HashMap<Label, usize>,
}

impl Scope {
    fn push(&mut self, name: &Label) {
        *self.depth.entry(name.clone()).or_insert(0) += 1;
    }

    fn pop(&mut self, name: &Label) {
        if let Some(d) = self.depth.get_mut(name) {
            *d -= 1;
            if *d == 0 {
                self.depth.remove(name);
            }
        }
    }

    fn is_bound(&self, name: &Label, index: usize) -> bool {
        self.depth.get(name).is_some_and(|&d| index < d)
    }
}

/// Computes the free variables of `expr`, walking binders (`Lambda`, `Pi`, `Let`) to
/// track which names are in scope at each point. This is a read-only traversal; it does
/// not shift or substitute indices, since nothing downstream of parsing and import
/// resolution in this crate evaluates the tree.
pub fn free_variables(expr: &Expr) -> FreeVariables {
    let mut out = FreeVariables::new();
    let mut scope = Scope::default();
    walk(expr, &mut scope, &mut out);
    out
}

/// `true` iff `expr` has no free variables. Import resolution relies on this to check
/// that a resolved expression is safe to splice in. Builds the full free-variable set
/// rather than short-circuiting on the first one found, since both share the same walk.
pub fn is_closed(expr: &Expr) -> bool {
    free_variables(expr).is_empty()
}

fn walk(expr: &Expr, scope: &mut Scope, out: &mut FreeVariables) {
    match expr {
        Expr::Var(name, index) => {
            if !scope.is_bound(name, *index) {
                out.insert(name.clone());
            }
        }
        Expr::Lambda(label, ty, body) | Expr::Pi(label, ty, body) => {
            walk(ty, scope, out);
            scope.push(label);
            walk(body, scope, out);
            scope.pop(label);
        }
        Expr::Let(bindings, body) => {
            for b in bindings {
                if let Some(ann) = &b.annotation {
                    walk(ann, scope, out);
                }
                walk(&b.value, scope, out);
                scope.push(&b.label);
            }
            walk(body, scope, out);
            for b in bindings.iter().rev() {
                scope.pop(&b.label);
            }
        }
        Expr::App(a, b) => {
            walk(a, scope, out);
            walk(b, scope, out);
        }
        Expr::Annot(e, t) => {
            walk(e, scope, out);
            walk(t, scope, out);
        }
        Expr::BoolIf(c, t, e) => {
            walk(c, scope, out);
            walk(t, scope, out);
            walk(e, scope, out);
        }
        Expr::Operator(_, l, r) => {
            walk(l, scope, out);
            walk(r, scope, out);
        }
        Expr::TextLit(chunks, _) => {
            for c in chunks {
                walk(&c.expr, scope, out);
            }
        }
        Expr::EmptyList(t) => walk(t, scope, out),
        Expr::NonEmptyList(items) => {
            for e in items {
                walk(e, scope, out);
            }
        }
        Expr::Record(fields) | Expr::RecordLit(fields) => {
            for v in fields.values() {
                walk(v, scope, out);
            }
        }
        Expr::Field(e, _) => walk(e, scope, out),
        Expr::Project(e, sel) => {
            walk(e, scope, out);
            if let crate::Selector::ByType(t) = sel {
                walk(t, scope, out);
            }
        }
        Expr::UnionType(alts) => {
            for v in alts.values().flatten() {
                walk(v, scope, out);
            }
        }
        Expr::Merge(h, u, ann) => {
            walk(h, scope, out);
            walk(u, scope, out);
            if let Some(a) = ann {
                walk(a, scope, out);
            }
        }
        Expr::Some(e) => walk(e, scope, out),
        Expr::ToMap(e, ann) => {
            walk(e, scope, out);
            if let Some(a) = ann {
                walk(a, scope, out);
            }
        }
        Expr::With(e, _, v) => {
            walk(e, scope, out);
            walk(v, scope, out);
        }
        Expr::Assert(t) => walk(t, scope, out),
        Expr::NaturalLit(_)
        | Expr::IntegerLit(_)
        | Expr::DoubleLit(_)
        | Expr::BoolLit(_)
        | Expr::Const(_)
        | Expr::Builtin(_)
        | Expr::Import(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Binding, Const};

    fn var(name: &str, index: usize) -> Expr {
        Expr::Var(name.to_string(), index)
    }

    #[test]
    fn bare_var_is_free() {
        let fv = free_variables(&var("x", 0));
        assert_eq!(fv.iter().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn lambda_binds_its_parameter() {
        let e = Expr::Lambda(
            "x".into(),
            Box::new(Expr::Const(Const::Type)),
            Box::new(var("x", 0)),
        );
        assert!(is_closed(&e));
    }

    #[test]
    fn shadowing_leaves_outer_index_free() {
        // \(x : Type) -> \(x : Type) -> x@1 refers to the outer x, which is still bound.
        // x@2 would refer to a nonexistent third binder and stays free.
        let inner = Expr::Lambda(
            "x".into(),
            Box::new(Expr::Const(Const::Type)),
            Box::new(var("x", 2)),
        );
        let outer = Expr::Lambda("x".into(), Box::new(Expr::Const(Const::Type)), Box::new(inner));
        let fv = free_variables(&outer);
        assert_eq!(fv.iter().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn let_binding_scopes_over_body_only() {
        let e = Expr::Let(
            vec![Binding {
                label: "y".into(),
                annotation: None,
                value: var("x", 0),
            }],
            Box::new(var("y", 0)),
        );
        let fv = free_variables(&e);
        assert_eq!(fv.iter().collect::<Vec<_>>(), vec!["x"]);
    }
}
