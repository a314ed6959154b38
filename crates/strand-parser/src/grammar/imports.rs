//! Import syntax.

use strand_syntax::{EnvName, Fetchable, Import, ImportHashed, ImportMode, LocalKind};

use crate::engine::Engine;
use crate::grammar::lexical::{keyword, skip_trivia, skip_trivia1};

/// `[! $-' * + - . 0-; = @-Z ^-z | ~]`.
fn is_path_char(ch: char) -> bool {
    let cp = ch as u32;
    matches!(ch, '!' | '*' | '+' | '-' | '.' | '=' | '|' | '~')
        || (0x24..=0x27).contains(&cp)
        || (0x30..=0x3B).contains(&cp)
        || (0x40..=0x5A).contains(&cp)
        || (0x5E..=0x7A).contains(&cp)
}

pub fn import_expr(e: &mut Engine) -> Option<Import> {
    e.rule("import-expression", |e| {
        let target = fetchable(e)?;
        skip_trivia(e);
        let digest = e.attempt(integrity_digest);
        skip_trivia(e);

        let checkpoint = e.checkpoint();
        let mode = if keyword(e, "as") {
            if !skip_trivia1(e) {
                e.error_here("import-expression", "expected whitespace after 'as'");
                return None;
            }
            if keyword(e, "Text") {
                ImportMode::RawText
            } else if keyword(e, "Location") {
                ImportMode::Location
            } else {
                e.error_here("import-expression", "expected 'Text' or 'Location' after 'as'");
                return None;
            }
        } else {
            e.reset(checkpoint);
            ImportMode::Code
        };

        Some(Import {
            hashed: ImportHashed { target, digest },
            mode,
        })
    })
}

fn fetchable(e: &mut Engine) -> Option<Fetchable> {
    if keyword(e, "missing") {
        return Some(Fetchable::Missing);
    }
    if let Some(target) = local_path(e) {
        return Some(target);
    }
    if let Some(target) = env_var(e) {
        return Some(target);
    }
    remote_url(e)
}

fn local_path(e: &mut Engine) -> Option<Fetchable> {
    let checkpoint = e.checkpoint();

    let kind = if e.eat_str("..") {
        LocalKind::Parent
    } else if e.eat_char('~') {
        LocalKind::Home
    } else if e.peek() == Some('/') {
        // The leading `/` also serves as the separator before the first path
        // component, so it is deliberately left for the loop below to consume.
        LocalKind::Absolute
    } else if e.eat_char('.') {
        LocalKind::Here
    } else {
        return None;
    };

    let mut path = Vec::new();
    loop {
        if !e.eat_char('/') {
            break;
        }
        let start = e.checkpoint();
        e.eat_while(is_path_char);
        let component = e.text_since(start);
        if component.is_empty() {
            e.error_here("import-expression", "empty path component");
            e.reset(checkpoint);
            return None;
        }
        path.push(component.to_string());
    }

    if path.is_empty() {
        // `.`/`..`/`~`/`/` alone, with no following `/component`, is not a valid
        // import path.
        e.reset(checkpoint);
        return None;
    }

    Some(Fetchable::Local { kind, path })
}

/// Bash-style environment variable name: `[A-Za-z_][A-Za-z0-9_]*`. Deliberately
/// narrower than a label (`bare_label` also admits `-` and `/`) — anything outside
/// this alphabet must go through the quoted POSIX form instead.
fn bash_env_name(e: &mut Engine) -> Option<String> {
    let start = e.checkpoint();
    let first = e.peek()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    e.bump();
    e.eat_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    Some(e.text_since(start).to_string())
}

fn env_var(e: &mut Engine) -> Option<Fetchable> {
    let checkpoint = e.checkpoint();
    if !e.eat_str("env:") {
        return None;
    }

    if let Some(name) = bash_env_name(e) {
        return Some(Fetchable::EnvVar { name: EnvName(name) });
    }

    if e.eat_char('"') {
        let mut name = String::new();
        loop {
            match e.peek() {
                None => {
                    e.error_here("import-expression", "unterminated environment variable name");
                    return None;
                }
                Some('"') => {
                    e.bump();
                    break;
                }
                Some('\\') => {
                    e.bump();
                    match e.bump() {
                        Some('"') => name.push('"'),
                        Some('\\') => name.push('\\'),
                        Some('a') => name.push('\u{07}'),
                        Some('b') => name.push('\u{08}'),
                        Some('f') => name.push('\u{0C}'),
                        Some('n') => name.push('\n'),
                        Some('r') => name.push('\r'),
                        Some('t') => name.push('\t'),
                        Some('v') => name.push('\u{0B}'),
                        _ => {
                            e.error_here("import-expression", "invalid escape in environment variable name");
                            return None;
                        }
                    }
                }
                Some(ch) => {
                    name.push(ch);
                    e.bump();
                }
            }
        }
        return Some(Fetchable::EnvVar { name: EnvName(name) });
    }

    e.reset(checkpoint);
    None
}

fn remote_url(e: &mut Engine) -> Option<Fetchable> {
    let checkpoint = e.checkpoint();
    let scheme = if e.eat_str("https://") {
        "https"
    } else if e.eat_str("http://") {
        "http"
    } else {
        return None;
    };

    let start = e.checkpoint();
    e.eat_while(|ch| !ch.is_whitespace() && !matches!(ch, ')' | ']' | '}' | ',' | '?'));
    let rest = e.text_since(start);
    let full = format!("{scheme}://{rest}");

    match url::Url::parse(&full) {
        Ok(url) => Some(Fetchable::Remote { url }),
        Err(_) => {
            e.error_here("import-expression", "malformed remote import URL");
            e.reset(checkpoint);
            None
        }
    }
}

/// `sha256:` followed by 64 hex digits.
fn integrity_digest(e: &mut Engine) -> Option<[u8; 32]> {
    if !e.eat_str("sha256:") {
        return None;
    }
    let start = e.checkpoint();
    let hex = e.eat_while(|ch| ch.is_ascii_hexdigit());
    if hex.len() != 64 {
        e.error_here("import-expression", "sha256 digest must be 64 hex digits");
        e.reset(start);
        return None;
    }
    let mut digest = [0u8; 32];
    for (i, byte) in digest.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn parse(src: &str) -> Import {
        let mut e = Engine::new(src, ParseOptions::default());
        import_expr(&mut e).expect("should parse")
    }

    #[test]
    fn missing_sentinel() {
        assert_eq!(parse("missing").hashed.target, Fetchable::Missing);
    }

    #[test]
    fn relative_local_path() {
        let import = parse("./config/base.strand");
        match import.hashed.target {
            Fetchable::Local { kind, path } => {
                assert_eq!(kind, LocalKind::Here);
                assert_eq!(path, vec!["config", "base.strand"]);
            }
            _ => panic!("expected Local"),
        }
    }

    #[test]
    fn remote_url_parses() {
        let import = parse("https://example.com/config.strand");
        match import.hashed.target {
            Fetchable::Remote { url } => assert_eq!(url.host_str(), Some("example.com")),
            _ => panic!("expected Remote"),
        }
    }

    #[test]
    fn bash_style_env_var() {
        let import = parse("env:HOME");
        match import.hashed.target {
            Fetchable::EnvVar { name } => assert_eq!(name.0, "HOME"),
            _ => panic!("expected EnvVar"),
        }
    }

    #[test]
    fn bash_style_env_var_name_stops_before_a_hyphen() {
        // `-` is outside `[A-Za-z_][A-Za-z0-9_]*`; a name containing one must use the
        // quoted POSIX form instead, so the bash-form scan only claims "FOO".
        let mut e = Engine::new("env:FOO-BAR", ParseOptions::default());
        let import = import_expr(&mut e).expect("should parse");
        match import.hashed.target {
            Fetchable::EnvVar { name } => assert_eq!(name.0, "FOO"),
            _ => panic!("expected EnvVar"),
        }
        assert_eq!(&e.source()[e.offset() as usize..], "-BAR");
    }

    #[test]
    fn as_text_and_as_location_set_mode() {
        assert_eq!(parse("./x.strand as Text").mode, ImportMode::RawText);
        assert_eq!(parse("./x.strand as Location").mode, ImportMode::Location);
        assert_eq!(parse("./x.strand").mode, ImportMode::Code);
    }

    #[test]
    fn digest_is_parsed() {
        let digest = "a".repeat(64);
        let import = parse(&format!("./x.strand sha256:{digest}"));
        assert!(import.hashed.digest.is_some());
    }
}
