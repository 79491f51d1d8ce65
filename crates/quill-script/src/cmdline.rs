//! The command-line parser: argv to invocation tuples.
//!
//! Every command with a long flag is reachable as `--long-flag args...`
//! (plus `-x` when a short flag is declared), followed by `/opt=value`
//! tokens. A command with zero positional arguments invoked by flag
//! receives the boolean-flag sentinel `[true]`, which the argument
//! converter passes through unchanged. Bare words dispatch the configured
//! default command with the word as sole argument.

use std::collections::HashMap;

use quill_types::error::{QuillError, Result};
use quill_types::value::Value;

use crate::registry::CommandRegistry;

/// One parsed command invocation: name plus raw arguments and options,
/// ready for conversion and dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<Value>,
    pub options: HashMap<String, Value>,
}

/// Split a `/name=value` word into its parts, or `None` when the word is
/// not option-shaped.
pub(crate) fn split_option(word: &str) -> Option<(&str, &str)> {
    let rest = word.strip_prefix('/')?;
    let (name, value) = rest.split_once('=')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some((name, value))
}

/// Parse argv into invocations against the registry's flag tables.
pub fn parse_argv(
    registry: &CommandRegistry,
    argv: &[String],
    default_command: Option<&str>,
) -> Result<Vec<Invocation>> {
    let mut out = Vec::new();
    let mut iter = argv.iter().peekable();

    while let Some(token) = iter.next() {
        let command = if let Some(long) = token.strip_prefix("--") {
            registry
                .by_long_flag(long)
                .ok_or_else(|| QuillError::UnknownCommand(token.clone()))?
        } else if token.len() == 2 && token.starts_with('-') && token != "--" {
            let flag = token.chars().nth(1).unwrap_or('-');
            registry
                .by_short_flag(flag)
                .ok_or_else(|| QuillError::UnknownCommand(token.clone()))?
        } else {
            // Bare word: hand it to the default command.
            let Some(name) = default_command else {
                return Err(QuillError::UnknownCommand(token.clone()));
            };
            let command = registry.get(name)?;
            out.push(Invocation {
                command: command.name().to_string(),
                args: vec![Value::Str(token.clone())],
                options: HashMap::new(),
            });
            continue;
        };

        let needed = command.arguments().len();
        let mut args = Vec::with_capacity(needed.max(1));
        if needed == 0 {
            // Boolean flag: reuses the ordinary dispatch path.
            args.push(Value::Bool(true));
        } else {
            for got in 0..needed {
                let Some(arg) = iter.next() else {
                    return Err(QuillError::ArgumentNumberMismatch {
                        command: command.name().to_string(),
                        expected: needed,
                        got,
                    });
                };
                args.push(Value::Str(arg.clone()));
            }
        }

        let mut options = HashMap::new();
        while let Some(next) = iter.peek() {
            let Some((name, value)) = split_option(next) else {
                break;
            };
            options.insert(name.to_string(), Value::Str(value.to_string()));
            iter.next();
        }

        out.push(Invocation {
            command: command.name().to_string(),
            args,
            options,
        });
    }

    Ok(out)
}
