//! quill entry point.
//!
//! Usage: `quill [--command args... | -x args... | datafile] [/opt=val ...]`
//!
//! Every registered command with a long flag is reachable as
//! `--long-flag`; bare words are plotted as data files through the default
//! `plot` command. `-f script.qs` runs a command file. Preferences load
//! from an optional `quill.toml` in the working directory.

use std::path::Path;

use anyhow::Result;

use quill_render::SvgRenderer;
use quill_script::{Context, CommandRegistry, Interpreter, register_builtin_commands};
use quill_types::config::QuillConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = QuillConfig::load(Path::new("quill.toml"))?;
    log::debug!(
        "page {}x{}pt, default output {}",
        config.page_width,
        config.page_height,
        config.default_output.display(),
    );

    // Explicit build step: populate the registry, then freeze it into the
    // interpreter.
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry)?;
    log::debug!("{} commands registered", registry.len());

    let mut interpreter = Interpreter::new(registry);
    interpreter.set_default_command("plot");

    let mut ctx = Context::new(&config, Box::new(SvgRenderer::new()));

    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() {
        eprintln!("usage: quill [--command args... | datafile] [/opt=val ...]");
        std::process::exit(2);
    }

    interpreter.run_command_line(&argv, &mut ctx)?;

    // A figure that was drawn but never flushed still gets written.
    if ctx.page_is_open() {
        interpreter.run_commands("render", &mut ctx)?;
    }

    for line in ctx.take_output() {
        println!("{line}");
    }
    Ok(())
}
