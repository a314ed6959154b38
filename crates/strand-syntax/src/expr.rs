use indexmap::IndexMap;
use num_bigint::{BigInt, BigUint};

use crate::{Const, Import, Label, Opcode};

/// One `(label, optional annotation, value)` triple inside a `Let`. Several bindings
/// may share a single trailing `in body`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub label: Label,
    pub annotation: Option<Expr>,
    pub value: Expr,
}

/// `(prefix text, embedded expression)` pair inside an interpolated string literal. The
/// text after the last chunk is stored as `TextLit`'s own `suffix`, not as a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub prefix: String,
    pub expr: Expr,
}

/// The built-in functions and primitive types, reserved identifiers that the parser
/// recognizes directly rather than producing a `Var`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Bool,
    Natural,
    Integer,
    Double,
    Text,
    List,
    Optional,
    None_,
    NaturalBuild,
    NaturalFold,
    NaturalIsZero,
    NaturalEven,
    NaturalOdd,
    NaturalToInteger,
    NaturalShow,
    ListBuild,
    ListFold,
    ListLength,
    ListHead,
    ListLast,
    ListIndexed,
    ListReverse,
    OptionalBuild,
    OptionalFold,
    TextShow,
}

impl Builtin {
    /// All builtins paired with their surface spelling, longest names first isn't
    /// required here (the parser matches on the full identifier, not a prefix), but
    /// callers that build a lookup table want a single source of truth.
    pub const ALL: &'static [(Builtin, &'static str)] = &[
        (Builtin::Bool, "Bool"),
        (Builtin::Natural, "Natural"),
        (Builtin::Integer, "Integer"),
        (Builtin::Double, "Double"),
        (Builtin::Text, "Text"),
        (Builtin::List, "List"),
        (Builtin::Optional, "Optional"),
        (Builtin::None_, "None"),
        (Builtin::NaturalBuild, "Natural/build"),
        (Builtin::NaturalFold, "Natural/fold"),
        (Builtin::NaturalIsZero, "Natural/isZero"),
        (Builtin::NaturalEven, "Natural/even"),
        (Builtin::NaturalOdd, "Natural/odd"),
        (Builtin::NaturalToInteger, "Natural/toInteger"),
        (Builtin::NaturalShow, "Natural/show"),
        (Builtin::ListBuild, "List/build"),
        (Builtin::ListFold, "List/fold"),
        (Builtin::ListLength, "List/length"),
        (Builtin::ListHead, "List/head"),
        (Builtin::ListLast, "List/last"),
        (Builtin::ListIndexed, "List/indexed"),
        (Builtin::ListReverse, "List/reverse"),
        (Builtin::OptionalBuild, "Optional/build"),
        (Builtin::OptionalFold, "Optional/fold"),
        (Builtin::TextShow, "Text/show"),
    ];

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.iter().find(|(_, n)| *n == name).map(|(b, _)| *b)
    }

    pub fn name(self) -> &'static str {
        Self::ALL.iter().find(|(b, _)| *b == self).unwrap().1
    }
}

/// A field-selection suffix beyond plain `.label`: either projection by
/// an explicit label set (`e.{a, b}`) or projection by the fields of a type (`e.(T)`).
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Labels(Vec<Label>),
    ByType(Box<Expr>),
}

/// The expression AST. A tagged sum, not a DAG — every variant below owns its
/// sub-expressions directly. See `crate` docs for why this is a tree rather than a
/// graph, and `strand_syntax::visit` for the traversal primitives built on top of it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// De Bruijn-capable variable reference; `index` counts enclosing binders of the
    /// same `name` to skip, and defaults to 0 (innermost binder of that name).
    Var(Label, usize),
    Lambda(Label, Box<Expr>, Box<Expr>),
    Pi(Label, Box<Expr>, Box<Expr>),
    /// Application, left-associative: `f a b` parses as `App(App(f, a), b)`.
    App(Box<Expr>, Box<Expr>),
    Let(Vec<Binding>, Box<Expr>),
    Annot(Box<Expr>, Box<Expr>),
    BoolIf(Box<Expr>, Box<Expr>, Box<Expr>),
    Operator(Opcode, Box<Expr>, Box<Expr>),
    NaturalLit(BigUint),
    IntegerLit(BigInt),
    DoubleLit(f64),
    BoolLit(bool),
    TextLit(Vec<Chunk>, String),
    EmptyList(Box<Expr>),
    NonEmptyList(Vec<Expr>),
    Record(IndexMap<Label, Expr>),
    RecordLit(IndexMap<Label, Expr>),
    Field(Box<Expr>, Label),
    /// `e.{a, b}` or `e.(T)`.
    Project(Box<Expr>, Selector),
    UnionType(IndexMap<Label, Option<Expr>>),
    Merge(Box<Expr>, Box<Expr>, Option<Box<Expr>>),
    Some(Box<Expr>),
    /// `toMap e [: T]`. Parse-only; no evaluation semantics here.
    ToMap(Box<Expr>, Option<Box<Expr>>),
    /// `e with a.b.c = v`. `path` is non-empty.
    With(Box<Expr>, Vec<Label>, Box<Expr>),
    /// `assert : T`. Parse-only.
    Assert(Box<Expr>),
    Const(Const),
    Builtin(Builtin),
    Import(Import),
}

impl Expr {
    /// `TextLit` with zero chunks and no interpolations is equivalent to a plain string
    /// suffix. Constructs that canonical form directly.
    pub fn text(suffix: impl Into<String>) -> Expr {
        Expr::TextLit(Vec::new(), suffix.into())
    }

    pub fn is_plain_text(&self) -> bool {
        matches!(self, Expr::TextLit(chunks, _) if chunks.is_empty())
    }

    /// Applies `f` to each immediate child expression, left-to-right, returning a new
    /// node of the same shape. This is the "substitution primitive" the AST model is
    /// responsible for: the resolver uses it to rewrite `Import` leaves into their
    /// resolved sub-trees without hand-matching every variant itself.
    pub fn map_children(self, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
        match self {
            Expr::Var(..) | Expr::NaturalLit(_) | Expr::IntegerLit(_) | Expr::DoubleLit(_)
            | Expr::BoolLit(_) | Expr::Const(_) | Expr::Builtin(_) | Expr::Import(_) => self,
            Expr::Lambda(l, t, b) => Expr::Lambda(l, Box::new(f(*t)), Box::new(f(*b))),
            Expr::Pi(l, t, b) => Expr::Pi(l, Box::new(f(*t)), Box::new(f(*b))),
            Expr::App(a, b) => Expr::App(Box::new(f(*a)), Box::new(f(*b))),
            Expr::Let(bindings, body) => {
                let bindings = bindings
                    .into_iter()
                    .map(|b| Binding {
                        label: b.label,
                        annotation: b.annotation.map(&mut *f),
                        value: f(b.value),
                    })
                    .collect();
                Expr::Let(bindings, Box::new(f(*body)))
            }
            Expr::Annot(e, t) => Expr::Annot(Box::new(f(*e)), Box::new(f(*t))),
            Expr::BoolIf(c, t, e) => Expr::BoolIf(Box::new(f(*c)), Box::new(f(*t)), Box::new(f(*e))),
            Expr::Operator(op, l, r) => Expr::Operator(op, Box::new(f(*l)), Box::new(f(*r))),
            Expr::TextLit(chunks, suffix) => {
                let chunks = chunks
                    .into_iter()
                    .map(|c| Chunk {
                        prefix: c.prefix,
                        expr: f(c.expr),
                    })
                    .collect();
                Expr::TextLit(chunks, suffix)
            }
            Expr::EmptyList(t) => Expr::EmptyList(Box::new(f(*t))),
            Expr::NonEmptyList(items) => Expr::NonEmptyList(items.into_iter().map(f).collect()),
            Expr::Record(fields) => {
                Expr::Record(fields.into_iter().map(|(k, v)| (k, f(v))).collect())
            }
            Expr::RecordLit(fields) => {
                Expr::RecordLit(fields.into_iter().map(|(k, v)| (k, f(v))).collect())
            }
            Expr::Field(e, l) => Expr::Field(Box::new(f(*e)), l),
            Expr::Project(e, sel) => {
                let sel = match sel {
                    Selector::Labels(ls) => Selector::Labels(ls),
                    Selector::ByType(t) => Selector::ByType(Box::new(f(*t))),
                };
                Expr::Project(Box::new(f(*e)), sel)
            }
            Expr::UnionType(alts) => Expr::UnionType(
                alts.into_iter()
                    .map(|(k, v)| (k, v.map(&mut *f)))
                    .collect(),
            ),
            Expr::Merge(h, u, ann) => {
                Expr::Merge(Box::new(f(*h)), Box::new(f(*u)), ann.map(|a| Box::new(f(*a))))
            }
            Expr::Some(e) => Expr::Some(Box::new(f(*e))),
            Expr::ToMap(e, ann) => Expr::ToMap(Box::new(f(*e)), ann.map(|a| Box::new(f(*a)))),
            Expr::With(e, path, v) => Expr::With(Box::new(f(*e)), path, Box::new(f(*v))),
            Expr::Assert(t) => Expr::Assert(Box::new(f(*t))),
        }
    }

    /// Fallible counterpart to [`Expr::map_children`]; short-circuits on the first
    /// `Err`. Used by the resolver, where rewriting an `Import` leaf can fail.
    pub fn try_map_children<E>(
        self,
        f: &mut impl FnMut(Expr) -> Result<Expr, E>,
    ) -> Result<Expr, E> {
        // `map_children` cannot express short-circuiting directly since its callback is
        // infallible, so fold the fallible case by hand over the same shape.
        Ok(match self {
            Expr::Var(..) | Expr::NaturalLit(_) | Expr::IntegerLit(_) | Expr::DoubleLit(_)
            | Expr::BoolLit(_) | Expr::Const(_) | Expr::Builtin(_) | Expr::Import(_) => self,
            Expr::Lambda(l, t, b) => Expr::Lambda(l, Box::new(f(*t)?), Box::new(f(*b)?)),
            Expr::Pi(l, t, b) => Expr::Pi(l, Box::new(f(*t)?), Box::new(f(*b)?)),
            Expr::App(a, b) => Expr::App(Box::new(f(*a)?), Box::new(f(*b)?)),
            Expr::Let(bindings, body) => {
                let mut out = Vec::with_capacity(bindings.len());
                for b in bindings {
                    out.push(Binding {
                        label: b.label,
                        annotation: b.annotation.map(&mut f).transpose()?,
                        value: f(b.value)?,
                    });
                }
                Expr::Let(out, Box::new(f(*body)?))
            }
            Expr::Annot(e, t) => Expr::Annot(Box::new(f(*e)?), Box::new(f(*t)?)),
            Expr::BoolIf(c, t, e) => {
                Expr::BoolIf(Box::new(f(*c)?), Box::new(f(*t)?), Box::new(f(*e)?))
            }
            Expr::Operator(op, l, r) => Expr::Operator(op, Box::new(f(*l)?), Box::new(f(*r)?)),
            Expr::TextLit(chunks, suffix) => {
                let mut out = Vec::with_capacity(chunks.len());
                for c in chunks {
                    out.push(Chunk {
                        prefix: c.prefix,
                        expr: f(c.expr)?,
                    });
                }
                Expr::TextLit(out, suffix)
            }
            Expr::EmptyList(t) => Expr::EmptyList(Box::new(f(*t)?)),
            Expr::NonEmptyList(items) => {
                let mut out = Vec::with_capacity(items.len());
                for e in items {
                    out.push(f(e)?);
                }
                Expr::NonEmptyList(out)
            }
            Expr::Record(fields) => {
                let mut out = IndexMap::with_capacity(fields.len());
                for (k, v) in fields {
                    out.insert(k, f(v)?);
                }
                Expr::Record(out)
            }
            Expr::RecordLit(fields) => {
                let mut out = IndexMap::with_capacity(fields.len());
                for (k, v) in fields {
                    out.insert(k, f(v)?);
                }
                Expr::RecordLit(out)
            }
            Expr::Field(e, l) => Expr::Field(Box::new(f(*e)?), l),
            Expr::Project(e, sel) => {
                let sel = match sel {
                    Selector::Labels(ls) => Selector::Labels(ls),
                    Selector::ByType(t) => Selector::ByType(Box::new(f(*t)?)),
                };
                Expr::Project(Box::new(f(*e)?), sel)
            }
            Expr::UnionType(alts) => {
                let mut out = IndexMap::with_capacity(alts.len());
                for (k, v) in alts {
                    out.insert(k, v.map(&mut f).transpose()?);
                }
                Expr::UnionType(out)
            }
            Expr::Merge(h, u, ann) => Expr::Merge(
                Box::new(f(*h)?),
                Box::new(f(*u)?),
                ann.map(|a| f(*a)).transpose()?.map(Box::new),
            ),
            Expr::Some(e) => Expr::Some(Box::new(f(*e)?)),
            Expr::ToMap(e, ann) => Expr::ToMap(
                Box::new(f(*e)?),
                ann.map(|a| f(*a)).transpose()?.map(Box::new),
            ),
            Expr::With(e, path, v) => Expr::With(Box::new(f(*e)?), path, Box::new(f(*v)?)),
            Expr::Assert(t) => Expr::Assert(Box::new(f(*t)?)),
        })
    }
}
