//! Pre-parse filtering for subcommands that tolerate foreign tokens.
//!
//! A pass-through subcommand keeps only the options it declares (plus
//! `-h`/`--help`) and drops everything else before clap sees the arguments,
//! so unrelated flags can appear anywhere after the subcommand name without
//! hiding its own options.

use clap::Command;
use std::ffi::OsString;

/// How a single `-x`/`--xyz` token relates to a command's declared options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// A declared option; `consumes_next` when its value is the next token.
    Known { consumes_next: bool },
    Unknown,
}

fn is_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

fn classify(command: &Command, token: &str) -> Token {
    if let Some(body) = token.strip_prefix("--") {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        if name == "help" || (name == "version" && command.get_version().is_some()) {
            return Token::Known {
                consumes_next: false,
            };
        }
        return command
            .get_arguments()
            .find(|arg| arg.get_long() == Some(name))
            .map_or(Token::Unknown, |arg| Token::Known {
                consumes_next: arg.get_action().takes_values() && inline.is_none(),
            });
    }

    let Some(cluster) = token.strip_prefix('-') else {
        return Token::Unknown;
    };
    for (pos, c) in cluster.char_indices() {
        if c == 'h' || (c == 'V' && command.get_version().is_some()) {
            continue;
        }
        let Some(arg) = command.get_arguments().find(|arg| arg.get_short() == Some(c)) else {
            return Token::Unknown;
        };
        if arg.get_action().takes_values() {
            // `-tvalue` carries its value, `-t value` takes the next token
            return Token::Known {
                consumes_next: pos + c.len_utf8() == cluster.len(),
            };
        }
    }
    Token::Known {
        consumes_next: false,
    }
}

/// Keeps the tokens `command` declares, dropping everything else.
///
/// Tokens after `--` are dropped as well.
pub fn retain_declared<I, T>(command: &Command, tokens: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut kept = Vec::new();
    let mut tokens = tokens.into_iter().map(Into::into);

    while let Some(token) = tokens.next() {
        let Some(text) = token.to_str() else {
            continue;
        };
        if text == "--" {
            break;
        }
        if !is_option(text) {
            continue;
        }
        if let Token::Known { consumes_next } = classify(command, text) {
            kept.push(token);
            if consumes_next {
                kept.extend(tokens.next());
            }
        }
    }

    kept
}

/// Filters a full argv whose selected subcommand passes through.
///
/// Tokens up to and including the subcommand name are left as they are.
/// When the subcommand is not one for which `passes_through` holds, the
/// arguments are returned untouched.
pub fn filter_args<F>(cli: &Command, passes_through: F, args: Vec<OsString>) -> Vec<OsString>
where
    F: Fn(&str) -> bool,
{
    let mut out = Vec::with_capacity(args.len());
    let mut args = args.into_iter();
    out.extend(args.next());

    let mut selected = None;
    while let Some(arg) = args.next() {
        let text = arg.to_str().map(str::to_owned);
        out.push(arg);
        let Some(text) = text else {
            continue;
        };
        if text == "--" {
            break;
        }
        if is_option(&text) {
            if classify(cli, &text) == (Token::Known { consumes_next: true }) {
                out.extend(args.next());
            }
            continue;
        }
        selected = Some(text);
        break;
    }

    let subcommand = selected
        .filter(|name| passes_through(name))
        .and_then(|name| cli.find_subcommand(name));
    match subcommand {
        Some(command) => out.extend(retain_declared(command, args)),
        None => out.extend(args),
    }
    out
}
