//! Error types for quill.

use std::io;

/// Errors produced by the quill framework.
///
/// One variant per error kind so callers can match on the kind when deciding
/// whether to continue a batch (see [`QuillError::is_fatal`]).
#[derive(Debug, thiserror::Error)]
pub enum QuillError {
    #[error("invalid value '{raw}' for type '{type_name}'")]
    InvalidValue { type_name: String, raw: String },

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("type '{0}' is already registered")]
    DuplicateType(String),

    #[error("invalid pattern: {0}")]
    Pattern(String),

    #[error("unterminated string or variable reference at line {line}")]
    UnterminatedString { line: usize },

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("command '{command}' expects {expected} argument(s), got {got}")]
    ArgumentNumberMismatch {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("unknown option '{option}' for command '{command}'")]
    UnknownOption { command: String, option: String },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("command group '{0}' is already registered")]
    DuplicateGroup(String),

    #[error("function '{0}' is already registered")]
    DuplicateFunction(String),

    #[error("recursive expansion of variable '{0}'")]
    RecursiveExpansion(String),

    #[error("function '{function}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        function: String,
        expected: String,
        got: usize,
    },

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("nested command runs exceeded depth {0}")]
    RunDepthExceeded(usize),

    #[error("data error: {0}")]
    Data(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl QuillError {
    /// Whether this error aborts the enclosing file/script run.
    ///
    /// Structural lexer errors cannot be recovered from (parsing cannot
    /// safely continue past them); everything else aborts only the current
    /// command invocation and is logged by the interpreter loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, QuillError::UnterminatedString { .. })
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, QuillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display() {
        let e = QuillError::InvalidValue {
            type_name: "int".into(),
            raw: "abc".into(),
        };
        assert_eq!(format!("{e}"), "invalid value 'abc' for type 'int'");
    }

    #[test]
    fn argument_number_mismatch_display() {
        let e = QuillError::ArgumentNumberMismatch {
            command: "line".into(),
            expected: 4,
            got: 2,
        };
        assert_eq!(format!("{e}"), "command 'line' expects 4 argument(s), got 2");
    }

    #[test]
    fn unknown_option_display() {
        let e = QuillError::UnknownOption {
            command: "load".into(),
            option: "evry".into(),
        };
        assert_eq!(format!("{e}"), "unknown option 'evry' for command 'load'");
    }

    #[test]
    fn recursive_expansion_display() {
        let e = QuillError::RecursiveExpansion("a".into());
        assert_eq!(format!("{e}"), "recursive expansion of variable 'a'");
    }

    #[test]
    fn unterminated_string_is_fatal() {
        assert!(QuillError::UnterminatedString { line: 3 }.is_fatal());
    }

    #[test]
    fn conversion_errors_are_recoverable() {
        let e = QuillError::InvalidValue {
            type_name: "float".into(),
            raw: "x".into(),
        };
        assert!(!e.is_fatal());
        assert!(!QuillError::UnknownCommand("nope".into()).is_fatal());
        assert!(!QuillError::RecursiveExpansion("a".into()).is_fatal());
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: QuillError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: QuillError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn result_alias_ok() {
        let r: Result<i32> = Ok(42);
        assert_eq!(r.unwrap(), 42);
    }
}
