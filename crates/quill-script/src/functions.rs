//! Macro functions: named multi-argument text transforms.
//!
//! A `$(name arg1 arg2)` reference whose name part contains whitespace is a
//! function call. The argument text is passed *unexpanded*: split on
//! whitespace, except that a one-argument function receives the whole
//! remaining text unsplit. The string result is substituted literally and
//! is not re-parsed as script.

use std::collections::HashMap;

use quill_types::error::{QuillError, Result};

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, got: usize) -> bool {
        match self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
        }
    }

    fn expected(self) -> String {
        match self {
            Arity::Exact(n) => n.to_string(),
            Arity::AtLeast(n) => format!("at least {n}"),
        }
    }
}

type Handler = Box<dyn Fn(&[String]) -> Result<String>>;

/// A registered macro function.
pub struct ScriptFunction {
    name: String,
    arity: Arity,
    description: String,
    handler: Handler,
}

impl ScriptFunction {
    pub fn new(
        name: &str,
        arity: Arity,
        description: &str,
        handler: impl Fn(&[String]) -> Result<String> + 'static,
    ) -> Self {
        ScriptFunction {
            name: name.to_string(),
            arity,
            description: description.to_string(),
            handler: Box::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Registry of macro functions.
#[derive(Default)]
pub struct Functions {
    map: HashMap<String, ScriptFunction>,
}

impl Functions {
    pub fn new() -> Self {
        Functions::default()
    }

    pub fn register(&mut self, f: ScriptFunction) -> Result<()> {
        if self.map.contains_key(f.name()) {
            return Err(QuillError::DuplicateFunction(f.name().to_string()));
        }
        self.map.insert(f.name().to_string(), f);
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Invoke `name` with the raw (unexpanded) argument text.
    pub fn call(&self, name: &str, raw_args: &str) -> Result<String> {
        let f = self
            .map
            .get(name)
            .ok_or_else(|| QuillError::UnknownFunction(name.to_string()))?;

        let args: Vec<String> = if f.arity == Arity::Exact(1) {
            // One-argument functions see the whole text, whitespace and all.
            vec![raw_args.trim().to_string()]
        } else {
            raw_args.split_whitespace().map(String::from).collect()
        };

        if !f.arity.accepts(args.len()) {
            return Err(QuillError::ArgumentCountMismatch {
                function: name.to_string(),
                expected: f.arity.expected(),
                got: args.len(),
            });
        }
        (f.handler)(&args)
    }
}

/// Install the default function set.
pub fn register_default_functions(funcs: &mut Functions) -> Result<()> {
    funcs.register(ScriptFunction::new(
        "concat",
        Arity::AtLeast(1),
        "Concatenate the arguments without separators",
        |args| Ok(args.concat()),
    ))?;
    funcs.register(ScriptFunction::new(
        "upcase",
        Arity::Exact(1),
        "Uppercase the whole argument text",
        |args| Ok(args[0].to_uppercase()),
    ))?;
    funcs.register(ScriptFunction::new(
        "downcase",
        Arity::Exact(1),
        "Lowercase the whole argument text",
        |args| Ok(args[0].to_lowercase()),
    ))?;
    funcs.register(ScriptFunction::new(
        "strip",
        Arity::Exact(1),
        "Trim surrounding whitespace",
        |args| Ok(args[0].trim().to_string()),
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Functions {
        let mut f = Functions::new();
        register_default_functions(&mut f).unwrap();
        f
    }

    #[test]
    fn concat_joins_whitespace_split_args() {
        let f = defaults();
        assert_eq!(f.call("concat", "a b  c").unwrap(), "abc");
    }

    #[test]
    fn single_argument_functions_get_whole_text() {
        let f = defaults();
        assert_eq!(f.call("upcase", "two words").unwrap(), "TWO WORDS");
    }

    #[test]
    fn unknown_function_is_an_error() {
        let f = defaults();
        assert!(matches!(
            f.call("nope", "x"),
            Err(QuillError::UnknownFunction(_))
        ));
    }

    #[test]
    fn argument_count_mismatch() {
        let mut funcs = Functions::new();
        funcs
            .register(ScriptFunction::new("pair", Arity::Exact(2), "", |args| {
                Ok(format!("{}+{}", args[0], args[1]))
            }))
            .unwrap();
        assert_eq!(funcs.call("pair", "a b").unwrap(), "a+b");
        let err = funcs.call("pair", "a b c").unwrap_err();
        match err {
            QuillError::ArgumentCountMismatch { expected, got, .. } => {
                assert_eq!(expected, "2");
                assert_eq!(got, 3);
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn at_least_arity() {
        let f = defaults();
        let err = f.call("concat", "  ").unwrap_err();
        assert!(matches!(err, QuillError::ArgumentCountMismatch { .. }));
    }

    #[test]
    fn duplicate_function_rejected() {
        let mut funcs = defaults();
        let err = funcs
            .register(ScriptFunction::new("strip", Arity::Exact(1), "", |a| {
                Ok(a[0].clone())
            }))
            .unwrap_err();
        assert!(matches!(err, QuillError::DuplicateFunction(_)));
    }
}
