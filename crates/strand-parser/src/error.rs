use crate::diagnostics::Span;

/// Parser-level error kinds. Import-resolution errors (`ImportCycle`,
/// `CORSViolation`, and so on) belong to `strand-resolve`, not here — this crate never
/// fetches anything.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: no alternative matched")]
    Syntax,

    #[error("input is not valid UTF-8")]
    Encoding,

    #[error("input begins with a byte-order mark, which is rejected")]
    LeadingBom,

    #[error("duplicate field label at {span:?}")]
    DuplicateField { label: String, span: Span },

    #[error("recursion limit exceeded at {span:?}")]
    RecursionLimitExceeded { span: Span },
}
