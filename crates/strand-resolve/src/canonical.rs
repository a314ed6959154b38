//! Canonical encoding collaborator. Binary (CBOR) serialization of a
//! resolved expression is out of scope for this core; the resolver depends on it
//! only through this narrow trait so integrity checking can be exercised with a stub
//! in tests without pulling in a real encoder.

use sha2::{Digest, Sha256};
use strand_syntax::Expr;

/// Produces the canonical byte encoding of a resolved expression, suitable for hashing
/// against an import's `sha256:` digest. A real implementation serializes to the
/// language's canonical CBOR form; this crate never constructs one itself.
pub trait CanonicalEncode: Send + Sync {
    fn encode(&self, expr: &Expr) -> Vec<u8>;
}

/// Hashes `expr`'s canonical encoding and compares it against `expected`. `sha256:<hex>` is the wire format; the compare
/// itself only ever needs the raw bytes.
pub fn digest_of(encoder: &dyn CanonicalEncode, expr: &Expr) -> [u8; 32] {
    let bytes = encoder.encode(expr);
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hasher.finalize().into()
}

/// Renders a digest as the lowercase hex Dhall-style integrity checks print, e.g. in
/// error messages (`sha256:<64 hex digits>`, minus the `sha256:` prefix since callers
/// already format that part).
pub fn hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_syntax::Expr;

    struct IdentityEncoder;
    impl CanonicalEncode for IdentityEncoder {
        fn encode(&self, expr: &Expr) -> Vec<u8> {
            format!("{expr:?}").into_bytes()
        }
    }

    #[test]
    fn same_expression_hashes_the_same() {
        let encoder = IdentityEncoder;
        let a = digest_of(&encoder, &Expr::text("x"));
        let b = digest_of(&encoder, &Expr::text("x"));
        assert_eq!(a, b);
    }

    #[test]
    fn different_expressions_hash_differently() {
        let encoder = IdentityEncoder;
        let a = digest_of(&encoder, &Expr::text("x"));
        let b = digest_of(&encoder, &Expr::text("y"));
        assert_ne!(a, b);
    }
}
