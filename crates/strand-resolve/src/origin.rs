//! Relative-path chaining and cross-origin policy.

use strand_syntax::{Fetchable, LocalKind};

use crate::error::ErrorKind;

/// scheme + host + port of a remote import, or the "local" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote {
        scheme: String,
        host: String,
        port: Option<u16>,
    },
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Local => write!(f, "local"),
            Origin::Remote { scheme, host, port } => match port {
                Some(p) => write!(f, "{scheme}://{host}:{p}"),
                None => write!(f, "{scheme}://{host}"),
            },
        }
    }
}

pub fn origin_of(target: &Fetchable) -> Origin {
    match target {
        Fetchable::Remote { url } => Origin::Remote {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port(),
        },
        _ => Origin::Local,
    }
}

/// The nearest enclosing `Remote` target in `stack` (root-first order, nearest parent
/// last), or `None` if every ancestor is local. This is the origin a CORS check
/// compares a fetched response's headers against.
fn nearest_remote_ancestor(stack: &[Fetchable]) -> Option<Origin> {
    stack.iter().rev().find_map(|t| match t {
        Fetchable::Remote { .. } => Some(origin_of(t)),
        _ => None,
    })
}

/// Re-roots `child` against `stack`'s innermost target when it is a relative local
/// reference. Absolute paths, `~`, environment references, and remote
/// absolutes pass through unchanged; so does a `Remote` child, since our grammar only
/// ever produces already-absolute remote URLs.
pub fn chain(stack: &[Fetchable], child: Fetchable) -> Fetchable {
    let Some(parent) = stack.last() else {
        return child;
    };
    match (parent, &child) {
        (
            Fetchable::Local {
                kind: parent_kind,
                path: parent_path,
            },
            Fetchable::Local {
                kind: child_kind @ (LocalKind::Parent | LocalKind::Here),
                path: child_path,
            },
        ) => {
            let (kind, path) = chain_local(*parent_kind, parent_path, *child_kind, child_path);
            Fetchable::Local { kind, path }
        }
        (
            Fetchable::Remote { url: parent_url },
            Fetchable::Local {
                kind: child_kind @ (LocalKind::Parent | LocalKind::Here),
                path: child_path,
            },
        ) => {
            let relative = relative_string(*child_kind, child_path);
            match parent_url.join(&relative) {
                Ok(url) => Fetchable::Remote { url },
                Err(_) => child,
            }
        }
        _ => child,
    }
}

/// `..`/`.` plus its path components, joined as a relative-URL string suitable for
/// `Url::join` (which already implements RFC 3986 relative resolution, including `..`
/// segment removal, so we don't hand-roll that part).
fn relative_string(kind: LocalKind, path: &[String]) -> String {
    let lead = match kind {
        LocalKind::Parent => "../",
        LocalKind::Here => "./",
        _ => "",
    };
    format!("{lead}{}", path.join("/"))
}

/// Combines a parent local target's directory with a relative child, popping one
/// directory level per leading `..` the way a shell `cd` would. When the parent's own
/// directory is already empty, `..` escalates the *kind* itself (`.` becomes `..`);
/// `~` and absolute roots have no higher level to escalate to and are left as-is —
/// best-effort, since the grammar never lets a single import spell more than one
/// leading `..`/`.` itself.
fn chain_local(
    parent_kind: LocalKind,
    parent_path: &[String],
    child_kind: LocalKind,
    child_path: &[String],
) -> (LocalKind, Vec<String>) {
    let mut dir: Vec<String> = parent_path[..parent_path.len().saturating_sub(1)].to_vec();
    let mut kind = parent_kind;
    if child_kind == LocalKind::Parent {
        if dir.pop().is_none() && kind == LocalKind::Here {
            kind = LocalKind::Parent;
        }
    }
    dir.extend(child_path.iter().cloned());
    (kind, dir)
}

/// Remote parents may never fetch a `Local` or `EnvVar` child — that would let a
/// remote document read its importer's filesystem or environment. Checked before any
/// network request, since it never depends on response headers.
pub fn check_scheme_crossing(stack: &[Fetchable], target: &Fetchable) -> Result<(), ErrorKind> {
    if let Some(Fetchable::Remote { .. }) = stack.last() {
        if matches!(target, Fetchable::Local { .. } | Fetchable::EnvVar { .. }) {
            return Err(ErrorKind::CorsViolation {
                parent: origin_of(stack.last().unwrap()).to_string(),
                target: origin_of(target).to_string(),
            });
        }
    }
    Ok(())
}

/// Cross-origin policy for a remote fetch, evaluated once the response's headers are
/// known. A local parent (no enclosing `Remote` ancestor) is always permitted regardless of
/// headers; a same-origin fetch is always permitted; otherwise the response must carry
/// `Access-Control-Allow-Origin: *` or the exact parent origin.
pub fn check_cors(
    stack: &[Fetchable],
    target: &Fetchable,
    acao: Option<&str>,
) -> Result<(), ErrorKind> {
    let Some(parent_origin) = nearest_remote_ancestor(stack) else {
        return Ok(());
    };
    let target_origin = origin_of(target);
    if parent_origin == target_origin {
        return Ok(());
    }
    match acao {
        Some("*") => Ok(()),
        Some(value) if value == parent_origin.to_string() => Ok(()),
        _ => Err(ErrorKind::CorsViolation {
            parent: parent_origin.to_string(),
            target: target_origin.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_syntax::Fetchable;

    fn local(kind: LocalKind, path: &[&str]) -> Fetchable {
        Fetchable::Local {
            kind,
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn here_child_chains_under_parent_directory() {
        let stack = vec![local(LocalKind::Here, &["a", "b.strand"])];
        let child = local(LocalKind::Here, &["c.strand"]);
        assert_eq!(chain(&stack, child), local(LocalKind::Here, &["a", "c.strand"]));
    }

    #[test]
    fn parent_child_pops_a_directory_level() {
        let stack = vec![local(LocalKind::Here, &["a", "b", "c.strand"])];
        let child = local(LocalKind::Parent, &["d.strand"]);
        assert_eq!(chain(&stack, child), local(LocalKind::Here, &["a", "d.strand"]));
    }

    #[test]
    fn absolute_child_ignores_parent() {
        let stack = vec![local(LocalKind::Here, &["a", "b.strand"])];
        let child = local(LocalKind::Absolute, &["etc", "x"]);
        assert_eq!(chain(&stack, child.clone()), child);
    }

    #[test]
    fn local_parent_permits_any_remote() {
        let stack = vec![local(LocalKind::Here, &["a.strand"])];
        let target = Fetchable::Remote {
            url: url::Url::parse("https://example.com/x").unwrap(),
        };
        assert!(check_cors(&stack, &target, None).is_ok());
    }

    #[test]
    fn cross_origin_without_header_is_rejected() {
        let stack = vec![Fetchable::Remote {
            url: url::Url::parse("https://a.example/root.strand").unwrap(),
        }];
        let target = Fetchable::Remote {
            url: url::Url::parse("https://b.example/x.strand").unwrap(),
        };
        assert!(check_cors(&stack, &target, None).is_err());
        assert!(check_cors(&stack, &target, Some("*")).is_ok());
        assert!(check_cors(&stack, &target, Some("https://a.example")).is_ok());
    }

    #[test]
    fn remote_parent_cannot_fetch_local_or_env() {
        let stack = vec![Fetchable::Remote {
            url: url::Url::parse("https://a.example/root.strand").unwrap(),
        }];
        let local_target = local(LocalKind::Absolute, &["etc", "passwd"]);
        assert!(check_scheme_crossing(&stack, &local_target).is_err());
    }
}
