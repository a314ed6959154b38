//! AST model for the Strand configuration language.
//!
//! An expression tree is a plain recursive sum type, not a DAG: sub-trees are owned
//! (`Box<Expr>`), and there is no cycle handling inside the tree itself. Operator and
//! application folding build left-leaning trees explicitly at parse time (see
//! `strand-parser`); this crate only defines the shape and the primitives that walk it.

mod expr;
mod import;
mod konst;
mod opcode;
mod visit;

pub use expr::{Binding, Builtin, Chunk, Expr, Selector};
pub use import::{EnvName, Fetchable, Import, ImportHashed, ImportMode, LocalKind};
pub use konst::Const;
pub use opcode::Opcode;
pub use visit::{FreeVariables, free_variables, is_closed};

/// A bound or free variable name. Kept as an owned `String` rather than an interned
/// symbol: expressions in this core are parsed once and resolved once, not repeatedly
/// hashed in a long-lived compiler session, so interning would add complexity without
/// a matching payoff.
pub type Label = String;
