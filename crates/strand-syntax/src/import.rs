/// An import target, before it has been fetched. One of the four kinds the resolver
/// dispatches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fetchable {
    Local { kind: LocalKind, path: Vec<String> },
    Remote { url: url::Url },
    EnvVar { name: EnvName },
    Missing,
}

/// How a local path was anchored in source. `path` components are stored separately on
/// `Fetchable::Local` so the resolver can re-root them during chaining
/// without re-parsing the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    /// `..`
    Parent,
    /// `.`
    Here,
    /// `~`
    Home,
    /// leading `/`
    Absolute,
}

/// An environment variable name, spelled either as a bare bash identifier or a quoted
/// POSIX string. Both forms normalize to the same variable name; we keep the name only
/// since the resolver never needs to re-print the original spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvName(pub String);

impl std::fmt::Display for EnvName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "env:{}", self.0)
    }
}

impl std::fmt::Display for Fetchable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fetchable::Local { kind, path } => {
                let lead = match kind {
                    LocalKind::Parent => "..",
                    LocalKind::Here => ".",
                    LocalKind::Home => "~",
                    LocalKind::Absolute => "",
                };
                write!(f, "{lead}/{}", path.join("/"))
            }
            Fetchable::Remote { url } => write!(f, "{url}"),
            Fetchable::EnvVar { name } => write!(f, "{name}"),
            Fetchable::Missing => write!(f, "missing"),
        }
    }
}

/// Decides what happens to an import's fetched bytes once retrieved — or whether they
/// are fetched at all. Default is `Code`; `as Text` forces `RawText`; `as Location`
/// forces `Location` and skips the fetch entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImportMode {
    #[default]
    Code,
    RawText,
    Location,
}

/// The fetchable target plus an optional integrity digest. The digest is
/// the SHA-256 of the resolved expression's canonical CBOR encoding, per the Dhall
/// standard hash format (`sha256:<hex>`); re-serialisation is delegated to an external
/// collaborator (see `strand-resolve::CanonicalEncode`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportHashed {
    pub target: Fetchable,
    pub digest: Option<[u8; 32]>,
}

/// An unresolved reference; a leaf in the AST produced by the parser and consumed by
/// the resolver. Never persists past resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Import {
    pub hashed: ImportHashed,
    pub mode: ImportMode,
}
