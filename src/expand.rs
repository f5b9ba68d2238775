//! Placeholder expansion against an [`Env`].
//!
//! Supported forms:
//!
//! - `$NAME` and `${NAME}` substitute the value of `NAME`
//! - `${NAME:default}` falls back to `default` when `NAME` is undefined;
//!   defaults may nest, as in `${A:${B:c}}`
//! - `\$` produces a literal `$`
//!
//! A name is one or more ASCII alphanumerics or underscores. References that
//! cannot be resolved are left verbatim, so expansion never fails.

use crate::env::Env;

/// Substituted values are expanded again, up to this many levels.
const MAX_DEPTH: usize = 10;

/// Expands placeholders in `raw`.
///
/// Without a mapping the input is returned unchanged.
pub fn expand(raw: &str, env: Option<&Env>) -> String {
    env.map_or_else(|| raw.to_owned(), |env| expand_with(raw, env, 0))
}

fn expand_with(raw: &str, env: &Env, depth: usize) -> String {
    if depth > MAX_DEPTH {
        return raw.to_owned();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(['\\', '$']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("\\$") {
            out.push('$');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix('\\') {
            out.push('\\');
            rest = after;
            continue;
        }

        let body = &tail[1..];
        if let Some((reference, consumed)) = parse_reference(body) {
            let verbatim = &tail[..=consumed];
            out.push_str(&resolve(&reference, verbatim, env, depth));
            rest = &body[consumed..];
        } else {
            out.push('$');
            rest = body;
        }
    }

    out.push_str(rest);
    out
}

#[derive(Debug, PartialEq, Eq)]
struct Reference<'a> {
    name: &'a str,
    default: Option<&'a str>,
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte offset of the `}` closing an already opened `{`, counting nesting.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (pos, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses the text following a `$`, returning the reference and its length.
fn parse_reference(body: &str) -> Option<(Reference<'_>, usize)> {
    if let Some(braced) = body.strip_prefix('{') {
        let end = matching_brace(braced)?;
        let inner = &braced[..end];
        let (name, default) = match inner.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (inner, None),
        };
        if name.is_empty() || !name.chars().all(is_name_char) {
            return None;
        }
        // `{` + inner + `}`
        return Some((Reference { name, default }, end + 2));
    }

    let len = body.find(|c| !is_name_char(c)).unwrap_or(body.len());
    if len == 0 {
        return None;
    }
    Some((
        Reference {
            name: &body[..len],
            default: None,
        },
        len,
    ))
}

fn resolve(reference: &Reference<'_>, verbatim: &str, env: &Env, depth: usize) -> String {
    match (env.get(reference.name), reference.default) {
        (Some(value), _) => expand_with(value, env, depth + 1),
        (None, Some(default)) => expand_with(default, env, depth + 1),
        (None, None) => verbatim.to_owned(),
    }
}
