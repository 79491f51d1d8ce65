//! Commands: named actions with typed positional and optional arguments.

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use quill_types::error::{QuillError, Result};
use quill_types::types::ValueType;
use quill_types::value::Value;

use crate::context::Context;

/// A typed, documented argument slot, used both for positionals and for
/// option values.
#[derive(Debug)]
pub struct CommandArgument {
    name: String,
    vtype: Rc<ValueType>,
    description: String,
}

impl CommandArgument {
    pub fn new(name: &str, vtype: Rc<ValueType>) -> Self {
        CommandArgument {
            name: name.to_string(),
            vtype,
            description: String::new(),
        }
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vtype(&self) -> &Rc<ValueType> {
        &self.vtype
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// An optional named argument.
#[derive(Debug)]
pub struct CommandOption {
    arg: CommandArgument,
    /// `Some` marks the option deprecated; the inner value optionally names
    /// the replacement option to redirect to.
    deprecated: Option<Option<String>>,
}

impl CommandOption {
    pub fn new(arg: CommandArgument) -> Self {
        CommandOption {
            arg,
            deprecated: None,
        }
    }

    /// Mark deprecated, optionally redirecting to `replacement`.
    pub fn deprecated(mut self, replacement: Option<&str>) -> Self {
        self.deprecated = Some(replacement.map(str::to_string));
        self
    }

    pub fn argument(&self) -> &CommandArgument {
        &self.arg
    }
}

/// The options value handed to a callback.
///
/// `NotDeclared` when the command declares no options at all; `Declared`
/// (possibly empty) when options are declared, whether or not any were
/// supplied at the call site. Callbacks can therefore tell "command takes
/// no options" apart from "no options given".
#[derive(Debug, Clone, PartialEq)]
pub enum OptionSet {
    NotDeclared,
    Declared(HashMap<String, Value>),
}

impl OptionSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            OptionSet::NotDeclared => None,
            OptionSet::Declared(map) => map.get(&normalize_option_name(name)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            OptionSet::NotDeclared => true,
            OptionSet::Declared(map) => map.is_empty(),
        }
    }
}

/// What a command asks its caller to do after it ran.
///
/// The `Run*` variants are signals the interpreter consumes to perform
/// nested interpretation; commands themselves never re-enter the
/// interpreter directly.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    None,
    Text(String),
    RunFile(PathBuf),
    RunCommands(String),
}

/// Fixed callback signature: execution target, converted positional
/// arguments in declaration order, and the option set.
pub type CommandAction = Box<dyn Fn(&mut Context, &[Value], &OptionSet) -> Result<CommandOutput>>;

/// Canonical option spelling: case-insensitive, `-` folded to `_`.
pub fn normalize_option_name(name: &str) -> String {
    name.to_ascii_lowercase().replace('-', "_")
}

/// Render a converted positional argument back to text (callback helper).
pub(crate) fn arg_text(args: &[Value], idx: usize) -> String {
    args.get(idx).map(Value::to_string).unwrap_or_default()
}

/// One invocable action.
pub struct Command {
    name: String,
    short_flag: Option<char>,
    long_flag: Option<String>,
    arguments: Vec<CommandArgument>,
    options: HashMap<String, CommandOption>,
    short_desc: String,
    long_desc: String,
    group: Option<String>,
    action: CommandAction,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("short_flag", &self.short_flag)
            .field("long_flag", &self.long_flag)
            .field("arguments", &self.arguments)
            .field("options", &self.options)
            .field("short_desc", &self.short_desc)
            .field("long_desc", &self.long_desc)
            .field("group", &self.group)
            .field("action", &"<action>")
            .finish()
    }
}

impl Command {
    /// Create a command. A short flag without a long flag is an invariant
    /// violation and is rejected here rather than at registration.
    pub fn new(
        name: &str,
        short_flag: Option<char>,
        long_flag: Option<&str>,
        arguments: Vec<CommandArgument>,
        action: CommandAction,
    ) -> Result<Self> {
        if short_flag.is_some() && long_flag.is_none() {
            return Err(QuillError::Data(format!(
                "command '{name}' declares a short flag without a long flag"
            )));
        }
        Ok(Command {
            name: name.to_string(),
            short_flag,
            long_flag: long_flag.map(str::to_string),
            arguments,
            options: HashMap::new(),
            short_desc: String::new(),
            long_desc: String::new(),
            group: None,
            action,
        })
    }

    /// Declare an option (keyed by its canonical spelling).
    pub fn with_option(mut self, name: &str, option: CommandOption) -> Self {
        self.options.insert(normalize_option_name(name), option);
        self
    }

    /// Attach documentation and a group.
    pub fn describe(mut self, short: &str, long: &str, group: Option<&str>) -> Self {
        self.short_desc = short.to_string();
        self.long_desc = long.to_string();
        self.group = group.map(str::to_string);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_flag(&self) -> Option<char> {
        self.short_flag
    }

    pub fn long_flag(&self) -> Option<&str> {
        self.long_flag.as_deref()
    }

    pub fn arguments(&self) -> &[CommandArgument] {
        &self.arguments
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Sorted canonical option names, for listings.
    pub fn option_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.options.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn short_desc(&self) -> &str {
        &self.short_desc
    }

    pub fn long_desc(&self) -> &str {
        &self.long_desc
    }

    /// Convert raw positional arguments through the declared types.
    ///
    /// Raw `Str` elements are converted; anything else passes through
    /// untouched (pre-typed values arriving from the flag parser). The
    /// length must match exactly, with one compatibility carve-out: a
    /// command with zero declared arguments accepts the singleton
    /// `[Bool(true)]` the boolean-flag dispatch path produces, unchanged.
    pub fn convert_arguments(&self, raw: &[Value]) -> Result<Vec<Value>> {
        if self.arguments.is_empty() && matches!(raw, [Value::Bool(true)]) {
            return Ok(raw.to_vec());
        }
        if raw.len() != self.arguments.len() {
            return Err(QuillError::ArgumentNumberMismatch {
                command: self.name.clone(),
                expected: self.arguments.len(),
                got: raw.len(),
            });
        }
        raw.iter()
            .zip(&self.arguments)
            .map(|(value, arg)| match value {
                Value::Str(s) => arg.vtype.parse_str(s),
                other => Ok(other.clone()),
            })
            .collect()
    }

    /// Convert raw options through the declared option types.
    ///
    /// Keys are matched case-insensitively with `-`/`_` folded together.
    /// Deprecated options warn (and redirect when a replacement is named)
    /// but still succeed.
    pub fn convert_options(&self, raw: &HashMap<String, Value>) -> Result<HashMap<String, Value>> {
        let mut converted = HashMap::new();
        for (key, value) in raw {
            let canonical = normalize_option_name(key);
            let Some(option) = self.options.get(&canonical) else {
                return Err(QuillError::UnknownOption {
                    command: self.name.clone(),
                    option: key.clone(),
                });
            };
            let mut target_key = canonical;
            let mut target_option = option;
            if let Some(replacement) = &option.deprecated {
                match replacement {
                    Some(new_name) => {
                        log::warn!(
                            "option '/{key}' of command '{}' is deprecated, use '/{new_name}'",
                            self.name
                        );
                        target_key = normalize_option_name(new_name);
                        if let Some(opt) = self.options.get(&target_key) {
                            target_option = opt;
                        }
                    },
                    None => {
                        log::warn!("option '/{key}' of command '{}' is deprecated", self.name);
                    },
                }
            }
            let typed = match value {
                Value::Str(s) => target_option.arg.vtype.parse_str(s)?,
                other => other.clone(),
            };
            converted.insert(target_key, typed);
        }
        Ok(converted)
    }

    /// Convert and invoke.
    pub fn dispatch(
        &self,
        ctx: &mut Context,
        raw_args: &[Value],
        raw_options: &HashMap<String, Value>,
    ) -> Result<CommandOutput> {
        let args = self.convert_arguments(raw_args)?;
        let options = if self.options.is_empty() {
            if let Some(key) = raw_options.keys().next() {
                return Err(QuillError::UnknownOption {
                    command: self.name.clone(),
                    option: key.clone(),
                });
            }
            OptionSet::NotDeclared
        } else {
            OptionSet::Declared(self.convert_options(raw_options)?)
        };
        (self.action)(ctx, &args, &options)
    }
}
