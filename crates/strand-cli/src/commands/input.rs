//! Shared helpers for reading a command's source file.

use std::io::Read;
use std::path::Path;

/// Reads `path`'s bytes, or stdin when `path` is exactly `-`.
pub fn read_bytes(path: &Path) -> Vec<u8> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .unwrap_or_else(|e| {
                eprintln!("error: failed to read stdin: {e}");
                std::process::exit(1);
            });
        buf
    } else {
        std::fs::read(path).unwrap_or_else(|e| {
            eprintln!("error: failed to read {}: {e}", path.display());
            std::process::exit(1);
        })
    }
}

/// Builds the root `Fetchable::Local` a resolved file's own relative imports chain
/// against: the canonicalized path to the file itself, split into path components
/// (the resolver treats a `Local` target's last component as the file name, and
/// chains a relative child against everything before it). Falls back to a synthetic
/// `<stdin>` entry under the current directory when `path` is `-`, since there is no
/// real file to anchor against.
pub fn root_fetchable(path: &Path) -> strand_syntax::Fetchable {
    let full = if path.as_os_str() == "-" {
        std::env::current_dir()
            .unwrap_or_default()
            .join("<stdin>")
    } else {
        path.to_path_buf()
    };
    let full = full.canonicalize().unwrap_or(full);
    let components: Vec<String> = full
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    strand_syntax::Fetchable::Local {
        kind: strand_syntax::LocalKind::Absolute,
        path: components,
    }
}
