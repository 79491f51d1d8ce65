//! The quill interpreter core.
//!
//! Script text flows through four layers: the lexer turns characters into
//! tagged segments, the variable engine expands `$(...)` references
//! (make-style immediate vs. recursive bindings plus macro functions), the
//! command registry converts raw words into typed arguments, and the
//! interpreter dispatches the resulting invocations against a [`Context`].
//!
//! Build a registry with [`register_builtin_commands`], move it into an
//! [`Interpreter`], and feed it script text, command files, or argv.

pub mod cmdline;
pub mod command;
mod commands;
pub mod context;
mod data_commands;
pub mod functions;
pub mod interpreter;
pub mod lexer;
mod output_commands;
mod plot_commands;
pub mod registry;
pub mod string;
pub mod variables;

/// One invocable action with typed arguments.
pub use command::Command;
/// A typed, documented argument slot.
pub use command::CommandArgument;
/// An optional named argument, possibly deprecated.
pub use command::CommandOption;
/// Signal returned by a command to its caller.
pub use command::CommandOutput;
/// The options value handed to callbacks (declared vs. not).
pub use command::OptionSet;
/// Register the default types, groups, and builtin commands.
pub use commands::register_builtin_commands;
/// The execution target handed to command callbacks.
pub use context::Context;
/// The macro-function registry.
pub use functions::Functions;
/// The per-run orchestrator.
pub use interpreter::Interpreter;
/// A documentation bucket for commands.
pub use registry::CommandGroup;
/// The command registry with flag and name lookup.
pub use registry::CommandRegistry;
/// A parsed piece of script text.
pub use string::ScriptString;
/// The variable table.
pub use variables::Variables;
