//! Data commands: loading files onto the data stack.

use std::path::Path;
use std::rc::Rc;

use quill_data::{LoadSpec, load_text_file};
use quill_types::error::{QuillError, Result};
use quill_types::value::Value;

use crate::command::{
    Command, CommandArgument, CommandOption, CommandOutput, OptionSet, arg_text,
};
use crate::context::Context;
use crate::registry::CommandRegistry;

pub(crate) fn register_data_commands(reg: &mut CommandRegistry) -> Result<()> {
    let text = reg.types().lookup("text")?;
    let int = reg.types().lookup("int")?;
    let text_list = reg.types().lookup("text-list")?;

    reg.register(
        Command::new(
            "load",
            Some('l'),
            Some("load"),
            vec![CommandArgument::new("file", Rc::clone(&text)).described("Data file to read")],
            Box::new(load_action),
        )?
        .with_option(
            "every",
            CommandOption::new(
                CommandArgument::new("n", Rc::clone(&int)).described("Keep every n-th row"),
            ),
        )
        .with_option(
            "columns",
            CommandOption::new(
                CommandArgument::new("list", text_list)
                    .described("Zero-based column selection, e.g. 0,2"),
            ),
        )
        .with_option(
            "name",
            CommandOption::new(
                CommandArgument::new("name", Rc::clone(&text)).described("Dataset name override"),
            ),
        )
        .describe(
            "Load a dataset from a text file",
            "Reads whitespace/comma separated numeric columns onto the data \
             stack. Comment lines and non-numeric header rows are skipped.",
            Some("data"),
        ),
    )?;

    reg.register(
        Command::new(
            "dataset-hook",
            None,
            Some("dataset-hook"),
            vec![
                CommandArgument::new("commands", Rc::clone(&text))
                    .described("Commands re-run after each load"),
            ],
            Box::new(|ctx, args, _| {
                let commands = arg_text(args, 0);
                ctx.dataset_hook = if commands.is_empty() {
                    None
                } else {
                    Some(commands)
                };
                Ok(CommandOutput::None)
            }),
        )?
        .describe(
            "Install commands re-run after every data load",
            "The given command text is interpreted after each successful \
             load (and after each file loaded by plot). Pass an empty string \
             to clear the hook.",
            Some("data"),
        ),
    )?;

    reg.register(
        Command::new(
            "pop",
            None,
            Some("pop"),
            vec![],
            Box::new(|ctx, _, _| match ctx.data.pop() {
                Some(ds) => Ok(CommandOutput::Text(format!("popped '{}'", ds.name()))),
                None => Err(QuillError::Data("the data stack is empty".into())),
            }),
        )?
        .describe("Drop the top dataset from the stack", "", Some("data")),
    )?;

    Ok(())
}

fn load_action(ctx: &mut Context, args: &[Value], opts: &OptionSet) -> Result<CommandOutput> {
    let file = arg_text(args, 0);
    let spec = load_spec_from(opts)?;
    let dataset = load_text_file(Path::new(&file), &spec)?;
    log::info!("loaded '{}' ({} rows)", dataset.name(), dataset.len());
    ctx.data.push(dataset);
    ctx.mark_data_loaded();
    Ok(CommandOutput::None)
}

/// Shared by `load` and `plot`.
pub(crate) fn load_spec_from(opts: &OptionSet) -> Result<LoadSpec> {
    let mut spec = LoadSpec::default();
    if let Some(n) = opts.get("every").and_then(Value::as_i64) {
        spec.every = usize::try_from(n)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| QuillError::Data(format!("/every must be positive, got {n}")))?;
    }
    if let Some(items) = opts.get("columns").and_then(Value::as_list) {
        let mut columns = Vec::with_capacity(items.len());
        for item in items {
            let raw = item.to_string();
            let idx = raw.trim().parse::<usize>().map_err(|_| QuillError::InvalidValue {
                type_name: "column index".into(),
                raw: raw.clone(),
            })?;
            columns.push(idx);
        }
        spec.columns = Some(columns);
    }
    if let Some(name) = opts.get("name") {
        spec.name = Some(name.to_string());
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn load_spec_defaults() {
        let spec = load_spec_from(&OptionSet::NotDeclared).unwrap();
        assert_eq!(spec.every, 1);
        assert!(spec.columns.is_none());
        assert!(spec.name.is_none());
    }

    #[test]
    fn load_spec_reads_options() {
        let mut map = HashMap::new();
        map.insert("every".to_string(), Value::Int(3));
        map.insert(
            "columns".to_string(),
            Value::List(vec![Value::Str("0".into()), Value::Str("2".into())]),
        );
        map.insert("name".to_string(), Value::Str("mine".into()));
        let spec = load_spec_from(&OptionSet::Declared(map)).unwrap();
        assert_eq!(spec.every, 3);
        assert_eq!(spec.columns, Some(vec![0, 2]));
        assert_eq!(spec.name.as_deref(), Some("mine"));
    }

    #[test]
    fn non_positive_every_is_rejected() {
        let mut map = HashMap::new();
        map.insert("every".to_string(), Value::Int(0));
        assert!(load_spec_from(&OptionSet::Declared(map)).is_err());
    }

    #[test]
    fn non_numeric_column_is_rejected() {
        let mut map = HashMap::new();
        map.insert(
            "columns".to_string(),
            Value::List(vec![Value::Str("x".into())]),
        );
        assert!(matches!(
            load_spec_from(&OptionSet::Declared(map)),
            Err(QuillError::InvalidValue { .. })
        ));
    }
}
