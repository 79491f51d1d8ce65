//! Builtin command registration and the general command set.
//!
//! This is the explicit build step replacing a global registry: call
//! [`register_builtin_commands`] on a fresh [`CommandRegistry`] exactly
//! once, then move the registry into the interpreter.

use std::path::PathBuf;
use std::rc::Rc;

use quill_types::error::Result;
use quill_types::types::register_default_types;
use quill_types::value::Value;

use crate::command::{
    Command, CommandArgument, CommandOption, CommandOutput, arg_text,
};
use crate::registry::{CommandGroup, CommandRegistry};

/// Register the default types, groups, and all builtin commands.
pub fn register_builtin_commands(reg: &mut CommandRegistry) -> Result<()> {
    register_default_types(reg.types_mut())?;
    register_groups(reg)?;
    register_general_commands(reg)?;
    crate::data_commands::register_data_commands(reg)?;
    crate::plot_commands::register_plot_commands(reg)?;
    crate::output_commands::register_output_commands(reg)?;
    Ok(())
}

fn register_groups(reg: &mut CommandRegistry) -> Result<()> {
    reg.register_group(CommandGroup::new("data", "Loading and managing datasets", 1))?;
    reg.register_group(CommandGroup::new("plot", "Drawing on the figure", 2))?;
    reg.register_group(CommandGroup::new("output", "Page and output control", 3))?;
    reg.register_group(CommandGroup::new("general", "General commands", 10))?;
    reg.register_group(CommandGroup::new("debug", "Debugging aids", 100).blacklisted())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// general
// ---------------------------------------------------------------------------

fn register_general_commands(reg: &mut CommandRegistry) -> Result<()> {
    let text = reg.types().lookup("text")?;

    reg.register(
        Command::new(
            "echo",
            None,
            Some("echo"),
            vec![CommandArgument::new("text", Rc::clone(&text)).described("Text to emit")],
            Box::new(|_, args, opts| {
                let message = arg_text(args, 0);
                match opts.get("level").and_then(Value::as_str) {
                    Some("debug") => log::debug!("{message}"),
                    Some("warn") => log::warn!("{message}"),
                    _ => log::info!("{message}"),
                }
                Ok(CommandOutput::Text(message))
            }),
        )?
        .with_option(
            "level",
            CommandOption::new(
                CommandArgument::new("level", Rc::clone(&text))
                    .described("Log level: debug, info or warn"),
            ),
        )
        .with_option(
            "verbosity",
            CommandOption::new(CommandArgument::new("level", Rc::clone(&text)))
                .deprecated(Some("level")),
        )
        .describe(
            "Emit text through the logger",
            "Emits its argument both as command output and through the log \
             facade at the level given by /level.",
            Some("general"),
        ),
    )?;

    reg.register(
        Command::new(
            "print",
            None,
            None,
            vec![CommandArgument::new("text", Rc::clone(&text)).described("Text to print")],
            Box::new(|_, args, _| Ok(CommandOutput::Text(arg_text(args, 0)))),
        )?
        .describe("Print text to the command output", "", Some("general")),
    )?;

    reg.register(
        Command::new(
            "run",
            Some('f'),
            Some("file"),
            vec![CommandArgument::new("file", text).described("Command file to run")],
            Box::new(|_, args, _| Ok(CommandOutput::RunFile(PathBuf::from(arg_text(args, 0))))),
        )?
        .describe(
            "Run a command file",
            "Reads the file and interprets its commands in place, sharing \
             the current variables and state.",
            Some("general"),
        ),
    )?;

    reg.register(
        Command::new(
            "debug-state",
            None,
            Some("debug-state"),
            vec![],
            Box::new(|ctx, _, _| {
                Ok(CommandOutput::Text(format!(
                    "datasets: {}, page open: {}, output: {}",
                    ctx.data.len(),
                    ctx.page_is_open(),
                    ctx.output.path.display(),
                )))
            }),
        )?
        .describe("Dump interpreter-visible state", "", Some("debug")),
    )?;

    Ok(())
}
