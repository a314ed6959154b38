/// Tag for the `Operator` AST node. One variant per binary operator, in precedence
/// order, lowest-binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `?` — import alternative. Binds weaker than every other operator, so `a ? b
    /// || c` parses as `a ? (b || c)`.
    ImportAlt,
    /// `||`
    Or,
    /// `+`
    Plus,
    /// `++`
    TextAppend,
    /// `#`
    ListAppend,
    /// `&&`
    And,
    /// `*`
    Times,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

impl Opcode {
    /// Surface syntax for this operator, used by diagnostics and tests.
    pub fn symbol(self) -> &'static str {
        match self {
            Opcode::ImportAlt => "?",
            Opcode::Or => "||",
            Opcode::Plus => "+",
            Opcode::TextAppend => "++",
            Opcode::ListAppend => "#",
            Opcode::And => "&&",
            Opcode::Times => "*",
            Opcode::Equal => "==",
            Opcode::NotEqual => "!=",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
