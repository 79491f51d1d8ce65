//! The variable table and make-style expansion.
//!
//! A variable is bound either to an already-expanded string (*immediate*,
//! `name := value`) or to an unexpanded [`ScriptString`] re-expanded on
//! every reference (*recursive*, `name = value`). Referencing an undefined
//! variable expands to the empty string -- make semantics, preserved on
//! purpose even though it can hide typos; see the tests pinning it down.
//! Cyclic references are detected and reported instead of overflowing the
//! stack.

use std::cell::RefCell;
use std::collections::HashMap;

use quill_types::error::{QuillError, Result};

use crate::functions::Functions;
use crate::string::{ScriptString, VariableResolver};

/// One binding.
#[derive(Debug, Clone)]
pub enum Variable {
    /// Expanded once at definition time.
    Immediate(String),
    /// Re-expanded on every reference.
    Deferred(ScriptString),
}

/// Name -> binding table.
#[derive(Default)]
pub struct Variables {
    map: HashMap<String, Variable>,
}

impl Variables {
    pub fn new() -> Self {
        Variables::default()
    }

    /// Define a variable from parsed value text.
    ///
    /// With `immediate` set (or when the value contains no variable
    /// references) the value is expanded now and stored as plain text;
    /// otherwise the token sequence is stored and re-expanded on each use.
    pub fn define(
        &mut self,
        name: &str,
        value: ScriptString,
        immediate: bool,
        funcs: &Functions,
    ) -> Result<()> {
        if immediate || !value.has_variable_refs() {
            // Seeding the in-progress stack with the name being defined makes
            // a self-reference in the definition a reported cycle instead of
            // a silent reference to the (possibly absent) previous binding.
            let expanded = {
                let env = ExpansionEnv::seeded(self, funcs, name);
                value.expand(&env)?
            };
            self.map
                .insert(name.to_string(), Variable::Immediate(expanded));
        } else {
            self.map.insert(name.to_string(), Variable::Deferred(value));
        }
        Ok(())
    }

    /// Bind a plain string directly (the `set` command path).
    pub fn define_immediate(&mut self, name: &str, value: String) {
        self.map
            .insert(name.to_string(), Variable::Immediate(value));
    }

    pub fn unset(&mut self, name: &str) {
        self.map.remove(name);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&Variable> {
        self.map.get(name)
    }

    /// Sorted variable names, for listings.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Convenience: parse and expand a piece of text against this table.
    pub fn expand_str(&self, text: &str, funcs: &Functions) -> Result<String> {
        let parsed = ScriptString::from_text(text)?;
        let env = ExpansionEnv::new(self, funcs);
        parsed.expand(&env)
    }
}

/// Resolver tying a variable table and function registry together for one
/// expansion. Tracks the names currently being expanded so that direct or
/// mutual self-reference fails with [`QuillError::RecursiveExpansion`].
pub struct ExpansionEnv<'a> {
    vars: &'a Variables,
    funcs: &'a Functions,
    in_progress: RefCell<Vec<String>>,
}

impl<'a> ExpansionEnv<'a> {
    pub fn new(vars: &'a Variables, funcs: &'a Functions) -> Self {
        ExpansionEnv {
            vars,
            funcs,
            in_progress: RefCell::new(Vec::new()),
        }
    }

    /// An environment already "inside" `name`, for definition-time
    /// expansion of that variable.
    fn seeded(vars: &'a Variables, funcs: &'a Functions, name: &str) -> Self {
        ExpansionEnv {
            vars,
            funcs,
            in_progress: RefCell::new(vec![name.to_string()]),
        }
    }
}

impl VariableResolver for ExpansionEnv<'_> {
    fn resolve(&self, reference: &str) -> Result<String> {
        let reference = reference.trim();

        // A name part containing whitespace is a function call; the
        // argument text is handed over unexpanded.
        if let Some((fname, rest)) = reference.split_once(char::is_whitespace) {
            return self.funcs.call(fname, rest.trim_start());
        }

        if self
            .in_progress
            .borrow()
            .iter()
            .any(|n| n == reference)
        {
            return Err(QuillError::RecursiveExpansion(reference.to_string()));
        }

        match self.vars.get(reference) {
            // Undefined names expand empty (make semantics).
            None => Ok(String::new()),
            Some(Variable::Immediate(text)) => Ok(text.clone()),
            Some(Variable::Deferred(value)) => {
                self.in_progress.borrow_mut().push(reference.to_string());
                let result = value.expand(self);
                self.in_progress.borrow_mut().pop();
                result
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::register_default_functions;

    fn env_parts() -> (Variables, Functions) {
        let mut funcs = Functions::new();
        register_default_functions(&mut funcs).unwrap();
        (Variables::new(), funcs)
    }

    fn define(vars: &mut Variables, funcs: &Functions, name: &str, text: &str, immediate: bool) {
        let value = ScriptString::from_text(text).unwrap();
        vars.define(name, value, immediate, funcs).unwrap();
    }

    #[test]
    fn immediate_expands_at_definition_time() {
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "a", "1", true);
        define(&mut vars, &funcs, "b", "$(a)+", true);
        // Redefining a does not change b.
        define(&mut vars, &funcs, "a", "2", true);
        assert_eq!(vars.expand_str("$(b)", &funcs).unwrap(), "1+");
    }

    #[test]
    fn recursive_reexpands_on_every_reference() {
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "a", "1", true);
        define(&mut vars, &funcs, "b", "$(a)+", false);
        define(&mut vars, &funcs, "a", "2", true);
        assert_eq!(vars.expand_str("$(b)", &funcs).unwrap(), "2+");
    }

    #[test]
    fn value_without_references_is_stored_immediate() {
        let (mut vars, funcs) = env_parts();
        // Recursive definition, but nothing to re-expand.
        define(&mut vars, &funcs, "x", "plain", false);
        assert!(matches!(vars.get("x"), Some(Variable::Immediate(_))));
    }

    #[test]
    fn undefined_expands_to_empty_string() {
        // Intentional make-compatible behavior: not an error.
        let (vars, funcs) = env_parts();
        assert_eq!(vars.expand_str("<$(missing)>", &funcs).unwrap(), "<>");
    }

    #[test]
    fn expansion_is_idempotent_without_references() {
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "x", "stable text", false);
        let once = vars.expand_str("$(x)", &funcs).unwrap();
        let twice = vars.expand_str("$(x)", &funcs).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, "stable text");
    }

    #[test]
    fn immediate_self_reference_is_detected() {
        let (mut vars, funcs) = env_parts();
        let value = ScriptString::from_text("$(a)").unwrap();
        let err = vars.define("a", value, true, &funcs).unwrap_err();
        assert!(matches!(err, QuillError::RecursiveExpansion(name) if name == "a"));
    }

    #[test]
    fn direct_cycle_is_detected() {
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "a", "$(a)", false);
        let err = vars.expand_str("$(a)", &funcs).unwrap_err();
        assert!(matches!(err, QuillError::RecursiveExpansion(name) if name == "a"));
    }

    #[test]
    fn mutual_cycle_is_detected() {
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "a", "$(b)", false);
        define(&mut vars, &funcs, "b", "$(a)", false);
        let err = vars.expand_str("$(a)", &funcs).unwrap_err();
        assert!(matches!(err, QuillError::RecursiveExpansion(_)));
    }

    #[test]
    fn diamond_reference_is_not_a_cycle() {
        // a -> b, a -> c, b -> d, c -> d: d expands twice, legally.
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "d", "x", true);
        define(&mut vars, &funcs, "b", "$(d)", false);
        define(&mut vars, &funcs, "c", "$(d)", false);
        define(&mut vars, &funcs, "a", "$(b)$(c)", false);
        assert_eq!(vars.expand_str("$(a)", &funcs).unwrap(), "xx");
    }

    #[test]
    fn function_calls_expand_inside_references() {
        let (vars, funcs) = env_parts();
        assert_eq!(vars.expand_str("$(upcase hi)", &funcs).unwrap(), "HI");
    }

    #[test]
    fn function_arguments_are_not_pre_expanded() {
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "v", "value", true);
        // A reference ends at the first ')', so the argument text "$(v" is
        // handed to upcase literally, not expanded first.
        assert_eq!(vars.expand_str("$(upcase $(v))", &funcs).unwrap(), "$(V)");
    }

    #[test]
    fn quoted_variable_segments_expand_too() {
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "who", "world", true);
        assert_eq!(
            vars.expand_str("\"hello $(who)\"", &funcs).unwrap(),
            "hello world"
        );
    }

    #[test]
    fn unset_removes_binding() {
        let (mut vars, funcs) = env_parts();
        define(&mut vars, &funcs, "x", "1", true);
        vars.unset("x");
        assert_eq!(vars.expand_str("$(x)", &funcs).unwrap(), "");
    }
}
