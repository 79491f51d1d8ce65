//! The interpreter: parsing, expansion, conversion, dispatch.
//!
//! One interpreter instance owns the variable table, the macro functions,
//! and the command registry it was built over. The registry is moved in at
//! construction, so the visible command set is frozen from that point on.
//!
//! Error policy: per-invocation failures (unknown commands, conversion
//! errors, cyclic expansions) are logged with their source location and the
//! run continues at the next line; structural lexer errors abort the
//! enclosing run, since parsing cannot safely continue past them.

use std::collections::HashMap;
use std::path::Path;

use quill_types::error::{QuillError, Result};
use quill_types::value::Value;

use crate::cmdline::{self, split_option};
use crate::command::CommandOutput;
use crate::context::Context;
use crate::functions::{Functions, register_default_functions};
use crate::lexer::{self, CharStream};
use crate::registry::CommandRegistry;
use crate::string::ScriptString;
use crate::variables::{ExpansionEnv, Variables};

/// Characters ending a word at top level.
const WORD_TERMINATORS: &str = " \t\r\n";

/// Bound on nested interpretation (included files, dataset hooks).
const MAX_RUN_DEPTH: usize = 32;

pub struct Interpreter {
    registry: CommandRegistry,
    variables: Variables,
    functions: Functions,
    default_command: Option<String>,
    run_depth: usize,
}

impl Interpreter {
    /// Build over a fully populated registry.
    ///
    /// The registry is taken by value: commands registered elsewhere after
    /// this point are invisible to the instance, by construction.
    pub fn new(registry: CommandRegistry) -> Self {
        let mut functions = Functions::new();
        if let Err(e) = register_default_functions(&mut functions) {
            // Unreachable with an empty table; keep the diagnostic anyway.
            log::error!("default function registration failed: {e}");
        }
        Interpreter {
            registry,
            variables: Variables::new(),
            functions,
            default_command: None,
            run_depth: 0,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    pub fn functions_mut(&mut self) -> &mut Functions {
        &mut self.functions
    }

    /// Command dispatched for bare (non-flag) command-line words.
    pub fn set_default_command(&mut self, name: &str) {
        self.default_command = Some(name.to_string());
    }

    /// Run script text.
    pub fn run_commands(&mut self, text: &str, ctx: &mut Context) -> Result<()> {
        self.enter_nested()?;
        let mut stream = CharStream::new(text);
        let result = self.run_stream(&mut stream, "<commands>", ctx);
        self.leave_nested();
        result
    }

    /// Run a command file.
    pub fn run_command_file(&mut self, path: &Path, ctx: &mut Context) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.enter_nested()?;
        let mut stream = CharStream::new(&text);
        let result = self.run_stream(&mut stream, &path.display().to_string(), ctx);
        self.leave_nested();
        result
    }

    /// Run command-line arguments through the flag parser and the ordinary
    /// conversion/dispatch path.
    pub fn run_command_line(&mut self, argv: &[String], ctx: &mut Context) -> Result<()> {
        let invocations =
            cmdline::parse_argv(&self.registry, argv, self.default_command.as_deref())?;
        for invocation in invocations {
            if let Err(e) = self.run_command(
                &invocation.command,
                invocation.args,
                invocation.options,
                ctx,
            ) {
                if e.is_fatal() {
                    return Err(e);
                }
                log::error!("--{}: {e}", invocation.command);
            }
        }
        Ok(())
    }

    /// Dispatch one command with pre-collected raw arguments and options.
    pub fn run_command(
        &mut self,
        name: &str,
        raw_args: Vec<Value>,
        raw_options: HashMap<String, Value>,
        ctx: &mut Context,
    ) -> Result<()> {
        let command = self.registry.get(name)?;
        let output = command.dispatch(ctx, &raw_args, &raw_options)?;
        self.handle_output(output, ctx)?;
        self.run_dataset_hooks(ctx)
    }

    fn enter_nested(&mut self) -> Result<()> {
        if self.run_depth >= MAX_RUN_DEPTH {
            return Err(QuillError::RunDepthExceeded(MAX_RUN_DEPTH));
        }
        self.run_depth += 1;
        Ok(())
    }

    fn leave_nested(&mut self) {
        self.run_depth = self.run_depth.saturating_sub(1);
    }

    fn expand(&self, text: &ScriptString) -> Result<String> {
        let env = ExpansionEnv::new(&self.variables, &self.functions);
        text.expand(&env)
    }

    /// The main loop over a character stream.
    fn run_stream(
        &mut self,
        stream: &mut CharStream<'_>,
        source: &str,
        ctx: &mut Context,
    ) -> Result<()> {
        loop {
            skip_whitespace(stream);
            if stream.at_end() {
                return Ok(());
            }
            let line = stream.line();
            match self.step(stream, ctx) {
                Ok(()) => {},
                Err(e) if e.is_fatal() => {
                    log::error!("{source}:{line}: {e}");
                    return Err(e);
                },
                Err(e) => {
                    log::error!("{source}:{line}: {e}");
                    skip_to_line_end(stream);
                },
            }
        }
    }

    /// Parse and execute one variable definition or command invocation.
    fn step(&mut self, stream: &mut CharStream<'_>, ctx: &mut Context) -> Result<()> {
        let word = lexer::parse_string(stream, WORD_TERMINATORS, false)?;
        let name = self.expand(&word)?;
        if name.is_empty() {
            // Comment-only or empty word; nothing to do.
            return Ok(());
        }

        skip_horizontal_whitespace(stream);
        if let Some(immediate) = take_assignment_op(stream)? {
            skip_horizontal_whitespace(stream);
            let value = lexer::parse_string(stream, "\n", false)?;
            return self
                .variables
                .define(&name, value, immediate, &self.functions);
        }

        // Commands needing interpreter state are intercepted before lookup.
        match name.as_str() {
            "set" => return self.intercept_set(stream),
            "unset" => return self.intercept_unset(stream),
            _ => {},
        }

        let command = self.registry.get(&name)?;
        let needed = command.arguments().len();
        let mut raw_args: Vec<Value> = Vec::with_capacity(needed);
        let mut raw_options: HashMap<String, Value> = HashMap::new();

        while raw_args.len() < needed {
            skip_whitespace(stream);
            if stream.at_end() {
                return Err(QuillError::ArgumentNumberMismatch {
                    command: name.clone(),
                    expected: needed,
                    got: raw_args.len(),
                });
            }
            let word = lexer::parse_string(stream, WORD_TERMINATORS, false)?;
            let expanded = self.expand(&word)?;
            if word.starts_with_unquoted('/')
                && let Some((opt, value)) = split_option(&expanded)
            {
                raw_options.insert(opt.to_string(), Value::Str(value.to_string()));
            } else {
                raw_args.push(Value::Str(expanded));
            }
        }

        // Trailing options: only words led by an unquoted '/'.
        loop {
            skip_whitespace(stream);
            if stream.peek() != Some('/') {
                break;
            }
            let word = lexer::parse_string(stream, WORD_TERMINATORS, false)?;
            let expanded = self.expand(&word)?;
            match split_option(&expanded) {
                Some((opt, value)) => {
                    raw_options.insert(opt.to_string(), Value::Str(value.to_string()));
                },
                None => {
                    return Err(QuillError::UnknownOption {
                        command: name.clone(),
                        option: expanded,
                    });
                },
            }
        }

        let output = command.dispatch(ctx, &raw_args, &raw_options)?;
        self.handle_output(output, ctx)?;
        self.run_dataset_hooks(ctx)
    }

    /// `set name value`: bind an immediate variable. Intercepted because
    /// the variable table lives on the interpreter, not the context.
    fn intercept_set(&mut self, stream: &mut CharStream<'_>) -> Result<()> {
        let Some(name) = self.next_word(stream)? else {
            return Err(set_mismatch(0));
        };
        let Some(value) = self.next_word(stream)? else {
            return Err(set_mismatch(1));
        };
        self.variables.define_immediate(&name, value);
        Ok(())
    }

    /// `unset name`: drop a binding.
    fn intercept_unset(&mut self, stream: &mut CharStream<'_>) -> Result<()> {
        let Some(name) = self.next_word(stream)? else {
            return Err(QuillError::ArgumentNumberMismatch {
                command: "unset".into(),
                expected: 1,
                got: 0,
            });
        };
        self.variables.unset(&name);
        Ok(())
    }

    fn next_word(&self, stream: &mut CharStream<'_>) -> Result<Option<String>> {
        skip_whitespace(stream);
        if stream.at_end() {
            return Ok(None);
        }
        let word = lexer::parse_string(stream, WORD_TERMINATORS, false)?;
        Ok(Some(self.expand(&word)?))
    }

    /// Consume a command's output signal.
    fn handle_output(&mut self, output: CommandOutput, ctx: &mut Context) -> Result<()> {
        match output {
            CommandOutput::None => Ok(()),
            CommandOutput::Text(text) => {
                ctx.print(&text);
                Ok(())
            },
            CommandOutput::RunFile(path) => self.run_command_file(&path, ctx),
            CommandOutput::RunCommands(text) => self.run_commands(&text, ctx),
        }
    }

    /// Re-run the dataset hook once per load recorded by the last dispatch.
    ///
    /// The hook string is cloned up front: a hook that replaces itself only
    /// affects later loads, not the runs already due.
    fn run_dataset_hooks(&mut self, ctx: &mut Context) -> Result<()> {
        let loads = ctx.take_pending_loads();
        if loads == 0 {
            return Ok(());
        }
        let Some(hook) = ctx.dataset_hook.clone() else {
            return Ok(());
        };
        for _ in 0..loads {
            self.run_commands(&hook, ctx)?;
        }
        Ok(())
    }
}

fn set_mismatch(got: usize) -> QuillError {
    QuillError::ArgumentNumberMismatch {
        command: "set".into(),
        expected: 2,
        got,
    }
}

fn skip_whitespace(stream: &mut CharStream<'_>) {
    while stream.peek().is_some_and(char::is_whitespace) {
        stream.next_char();
    }
}

fn skip_horizontal_whitespace(stream: &mut CharStream<'_>) {
    while matches!(stream.peek(), Some(' ' | '\t')) {
        stream.next_char();
    }
}

/// Consume through the end of the current line (error recovery).
fn skip_to_line_end(stream: &mut CharStream<'_>) {
    while let Some(c) = stream.next_char() {
        if c == '\n' {
            break;
        }
    }
}

/// Recognize `:=` (immediate) or `=` (recursive) after the first word of a
/// step. Returns `Some(immediate)` with the operator consumed.
fn take_assignment_op(stream: &mut CharStream<'_>) -> Result<Option<bool>> {
    match stream.peek() {
        Some('=') => {
            stream.next_char();
            Ok(Some(false))
        },
        Some(':') => {
            stream.next_char();
            if stream.peek() == Some('=') {
                stream.next_char();
                Ok(Some(true))
            } else {
                Err(QuillError::Syntax(format!(
                    "expected '=' after ':' at line {}",
                    stream.line()
                )))
            }
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::rc::Rc;

    use quill_render::{DrawOp, RecordingRenderer};
    use quill_types::config::QuillConfig;

    use crate::command::{Command, CommandArgument, CommandOption, OptionSet};
    use crate::register_builtin_commands;

    fn harness() -> (Interpreter, Context, RecordingRenderer) {
        let mut registry = CommandRegistry::new();
        register_builtin_commands(&mut registry).unwrap();
        let recorder = RecordingRenderer::new();
        let ctx = Context::new(&QuillConfig::default(), Box::new(recorder.clone()));
        (Interpreter::new(registry), ctx, recorder)
    }

    #[test]
    fn end_to_end_set_and_print() {
        let (mut interp, mut ctx, _) = harness();
        interp.run_commands("set x 5\nprint $(x)", &mut ctx).unwrap();
        assert_eq!(ctx.captured_output(), ["5"]);
    }

    #[test]
    fn quoting_survives_variable_storage() {
        let (mut interp, mut ctx, _) = harness();
        interp
            .run_commands("set x \"a b\"\nprint $(x)", &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["a b"]);
    }

    #[test]
    fn immediate_and_recursive_definitions() {
        let (mut interp, mut ctx, _) = harness();
        let script = "\
a := 1
early := $(a)-now
late = $(a)-later
a := 2
print $(early)
print $(late)
";
        interp.run_commands(script, &mut ctx).unwrap();
        assert_eq!(ctx.captured_output(), ["1-now", "2-later"]);
    }

    #[test]
    fn unknown_command_is_logged_and_skipped() {
        let (mut interp, mut ctx, _) = harness();
        interp
            .run_commands("no-such-command with args\nprint ok", &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["ok"]);
    }

    #[test]
    fn invalid_argument_skips_only_that_command() {
        let (mut interp, mut ctx, _) = harness();
        interp
            .run_commands("line 1 2 3 notafloat\nprint ok", &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["ok"]);
    }

    #[test]
    fn unterminated_string_aborts_the_run() {
        let (mut interp, mut ctx, _) = harness();
        let err = interp
            .run_commands("print \"never closed\nprint ok", &mut ctx)
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(ctx.captured_output().is_empty());
    }

    #[test]
    fn options_are_collected_before_and_after_arguments() {
        let (mut interp, mut ctx, recorder) = harness();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "0 0\n1 1\n2 4\n3 9").unwrap();
        let path = f.path().display().to_string();
        interp
            .run_commands(&format!("load /every=2 \"{path}\"\ndraw render"), &mut ctx)
            .unwrap();
        // every=2 keeps rows 0 and 2 -> polyline with 2 points.
        let polylines: Vec<DrawOp> = recorder
            .ops()
            .into_iter()
            .filter(|op| matches!(op, DrawOp::Polyline(_)))
            .collect();
        assert_eq!(polylines.len(), 1);
        match &polylines[0] {
            DrawOp::Polyline(points) => assert_eq!(points.len(), 2),
            _ => unreachable!(),
        }
    }

    #[test]
    fn recursive_expansion_is_reported_not_a_stack_overflow() {
        let (mut interp, mut ctx, _) = harness();
        interp
            .run_commands("a = $(a)\nprint $(a)\nprint ok", &mut ctx)
            .unwrap();
        // The cyclic print is skipped, the run continues.
        assert_eq!(ctx.captured_output(), ["ok"]);
    }

    #[test]
    fn undefined_variable_prints_empty() {
        let (mut interp, mut ctx, _) = harness();
        interp.run_commands("print <$(missing)>", &mut ctx).unwrap();
        assert_eq!(ctx.captured_output(), ["<>"]);
    }

    #[test]
    fn run_command_file_executes_a_script() {
        let (mut interp, mut ctx, _) = harness();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# a comment\nset greeting hello\nprint $(greeting)").unwrap();
        interp.run_command_file(f.path(), &mut ctx).unwrap();
        assert_eq!(ctx.captured_output(), ["hello"]);
    }

    #[test]
    fn nested_run_via_the_run_command() {
        let (mut interp, mut ctx, _) = harness();
        let mut inner = tempfile::NamedTempFile::new().unwrap();
        writeln!(inner, "print inner").unwrap();
        let path = inner.path().display().to_string();
        interp
            .run_commands(&format!("print before\nrun \"{path}\"\nprint after"), &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["before", "inner", "after"]);
    }

    #[test]
    fn runaway_nesting_is_bounded() {
        let (mut interp, mut ctx, _) = harness();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let path = f.path().display().to_string();
        writeln!(f, "run \"{path}\"").unwrap();
        // The self-including file terminates with a logged depth error
        // instead of blowing the stack.
        interp
            .run_commands(&format!("run \"{path}\"\nprint done"), &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["done"]);
    }

    #[test]
    fn dataset_hook_runs_after_each_load() {
        let (mut interp, mut ctx, _) = harness();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "1 2\n3 4").unwrap();
        let path = f.path().display().to_string();
        let script = format!(
            "dataset-hook \"print loaded\"\nload \"{path}\"\nload \"{path}\""
        );
        interp.run_commands(&script, &mut ctx).unwrap();
        assert_eq!(ctx.captured_output(), ["loaded", "loaded"]);
    }

    #[test]
    fn snapshot_semantics_are_enforced_by_ownership() {
        // The registry moves into the interpreter; a command registered
        // into a different registry afterwards is simply not visible.
        let mut registry = CommandRegistry::new();
        register_builtin_commands(&mut registry).unwrap();
        let interp = Interpreter::new(registry);
        assert!(interp.registry().find("late-command").is_none());
    }

    #[test]
    fn argv_flags_share_the_dispatch_path() {
        let (mut interp, mut ctx, recorder) = harness();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "0 0\n1 1").unwrap();
        let argv: Vec<String> = vec![
            "--load".into(),
            f.path().display().to_string(),
            "--draw".into(),
            "--render".into(),
        ];
        interp.run_command_line(&argv, &mut ctx).unwrap();
        assert_eq!(recorder.count(|op| matches!(op, DrawOp::Polyline(_))), 1);
        assert_eq!(recorder.count(|op| matches!(op, DrawOp::Finish(_))), 1);
    }

    #[test]
    fn bare_argv_word_uses_the_default_command() {
        let (mut interp, mut ctx, _) = harness();
        interp.set_default_command("print");
        interp
            .run_command_line(&["hello".to_string()], &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["hello"]);
    }

    #[test]
    fn deprecated_option_still_works() {
        let (mut interp, mut ctx, _) = harness();
        interp
            .run_commands("echo watch-this /verbosity=info", &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["watch-this"]);
    }

    #[test]
    fn option_spelling_variants_resolve() {
        // /skip-first and /skip_first hit the same declared option.
        let mut registry = CommandRegistry::new();
        quill_types::types::register_default_types(registry.types_mut()).unwrap();
        let int = registry.types().lookup("int").unwrap();
        registry
            .register(
                Command::new(
                    "probe",
                    None,
                    Some("probe"),
                    vec![],
                    Box::new(|ctx, _, opts| {
                        if let OptionSet::Declared(map) = opts {
                            ctx.print(&format!("n={:?}", map.get("skip_first")));
                        }
                        Ok(CommandOutput::None)
                    }),
                )
                .unwrap()
                .with_option(
                    "skip-first",
                    CommandOption::new(CommandArgument::new("n", Rc::clone(&int))),
                ),
            )
            .unwrap();
        let mut interp = Interpreter::new(registry);
        let mut ctx = Context::new(
            &QuillConfig::default(),
            Box::new(RecordingRenderer::new()),
        );
        interp
            .run_commands("probe /skip_first=3 probe /skip-first=4", &mut ctx)
            .unwrap();
        assert_eq!(
            ctx.captured_output(),
            ["n=Some(Int(3))", "n=Some(Int(4))"]
        );
    }

    #[test]
    fn function_call_in_command_position_text() {
        let (mut interp, mut ctx, _) = harness();
        interp
            .run_commands("print $(upcase quiet please)", &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["QUIET PLEASE"]);
    }

    #[test]
    fn unset_interception() {
        let (mut interp, mut ctx, _) = harness();
        interp
            .run_commands("set x gone\nunset x\nprint <$(x)>", &mut ctx)
            .unwrap();
        assert_eq!(ctx.captured_output(), ["<>"]);
    }
}
