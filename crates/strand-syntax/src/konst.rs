/// The typed-calculus universes. `Type : Kind`, `Kind : Sort`, and `Sort` has no type
/// (typing `Sort` is a type error left to the external type-checking collaborator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Const {
    Type,
    Kind,
    Sort,
}

impl Const {
    pub fn as_str(self) -> &'static str {
        match self {
            Const::Type => "Type",
            Const::Kind => "Kind",
            Const::Sort => "Sort",
        }
    }
}

impl std::fmt::Display for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
