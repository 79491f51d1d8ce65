//! Output commands: page geometry and flushing the figure.

use std::path::PathBuf;
use std::rc::Rc;

use quill_types::error::{QuillError, Result};
use quill_types::value::Value;

use crate::command::{Command, CommandArgument, CommandOutput, arg_text};
use crate::registry::CommandRegistry;

pub(crate) fn register_output_commands(reg: &mut CommandRegistry) -> Result<()> {
    let text = reg.types().lookup("text")?;
    let float_list = reg.types().lookup("float-list")?;

    reg.register(
        Command::new(
            "output",
            Some('o'),
            Some("output"),
            vec![CommandArgument::new("file", Rc::clone(&text)).described("Output file path")],
            Box::new(|ctx, args, _| {
                ctx.output.path = PathBuf::from(arg_text(args, 0));
                Ok(CommandOutput::None)
            }),
        )?
        .describe("Set the output file written by render", "", Some("output")),
    )?;

    reg.register(
        Command::new(
            "page-size",
            None,
            Some("page-size"),
            vec![CommandArgument::new("size", float_list).described("width,height in points")],
            Box::new(|ctx, args, _| {
                let values = args.first().and_then(Value::as_f64_list).unwrap_or_default();
                let [width, height] = values[..] else {
                    return Err(QuillError::Data(format!(
                        "page-size expects two values, got {}",
                        values.len()
                    )));
                };
                if width <= 0.0 || height <= 0.0 {
                    return Err(QuillError::Data(format!(
                        "page size must be positive, got {width}x{height}"
                    )));
                }
                if ctx.page_is_open() {
                    log::warn!("page-size changed while a page is open; applies to the next page");
                }
                ctx.output.page_width = width;
                ctx.output.page_height = height;
                Ok(CommandOutput::None)
            }),
        )?
        .describe("Set the page size for subsequent pages", "", Some("output")),
    )?;

    reg.register(
        Command::new(
            "render",
            Some('r'),
            Some("render"),
            vec![],
            Box::new(|ctx, _, _| {
                ctx.ensure_page();
                if let Some(title) = ctx.figure.title.clone() {
                    let x = ctx.output.page_width / 2.0 - 4.0 * title.len() as f64 / 2.0;
                    let y = ctx.output.page_height - 16.0;
                    ctx.renderer.text(x.max(0.0), y, &title);
                }
                ctx.finish_page()?;
                Ok(CommandOutput::None)
            }),
        )?
        .describe(
            "Flush the figure to the output file",
            "Draws the title, if any, and hands the page to the renderer.",
            Some("output"),
        ),
    )?;

    Ok(())
}
