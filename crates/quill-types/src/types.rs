//! Named value types: reusable string <-> value conversion rules.
//!
//! Every command argument and option is validated through a [`ValueType`]
//! registered by name in a [`TypeRegistry`]. A type converts raw script text
//! into a [`Value`] (and back, best-effort, for documentation output).
//! Composite kinds cover separator-split arrays, first-match-wins regex
//! enumerations, and named value sets usable as circular style palettes.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::NaiveDate;
use regex::Regex;

use crate::color::Color;
use crate::error::{QuillError, Result};
use crate::value::Value;

/// How a [`ValueType`] converts raw text.
#[derive(Debug)]
pub enum TypeKind {
    Integer,
    Float,
    Boolean,
    String,
    Date,
    Color,
    /// Split on `separator`, convert each piece via `subtype`.
    Array {
        subtype: Rc<ValueType>,
        separator: Regex,
        output_sep: String,
    },
    /// Try `patterns` in declaration order; the first match wins.
    ReList {
        patterns: Vec<(Regex, Value)>,
        fallback: Option<Value>,
    },
    /// Like `Array`, but a bare shortcut name expands to a whole value list.
    Set {
        subtype: Rc<ValueType>,
        separator: Regex,
        shortcuts: HashMap<String, Vec<Value>>,
    },
}

/// A named, reusable conversion rule.
///
/// Created once at registry-build time and immutable thereafter.
#[derive(Debug)]
pub struct ValueType {
    name: String,
    kind: TypeKind,
    /// Whole-string substitutions checked (case-insensitively) before
    /// conversion, e.g. `"none" -> Bool(false)`.
    shortcuts: HashMap<String, Value>,
    description: String,
}

impl ValueType {
    pub fn new(name: &str, kind: TypeKind, description: &str) -> Self {
        ValueType {
            name: name.to_string(),
            kind,
            shortcuts: HashMap::new(),
            description: description.to_string(),
        }
    }

    /// Attach a shortcut substitution (keys are matched case-insensitively).
    pub fn with_shortcut(mut self, name: &str, value: Value) -> Self {
        self.shortcuts.insert(name.to_ascii_lowercase(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn invalid(&self, raw: &str) -> QuillError {
        QuillError::InvalidValue {
            type_name: self.name.clone(),
            raw: raw.to_string(),
        }
    }

    /// Convert raw text to a typed value.
    pub fn parse_str(&self, raw: &str) -> Result<Value> {
        if let Some(v) = self.shortcuts.get(&raw.trim().to_ascii_lowercase()) {
            return Ok(v.clone());
        }
        match &self.kind {
            TypeKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.invalid(raw)),
            TypeKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.invalid(raw)),
            TypeKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(self.invalid(raw)),
            },
            TypeKind::String => Ok(Value::Str(raw.to_string())),
            TypeKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| self.invalid(raw)),
            TypeKind::Color => raw.trim().parse::<Color>().map(Value::Color),
            TypeKind::Array {
                subtype, separator, ..
            } => Ok(Value::List(split_convert(raw, separator, subtype)?)),
            TypeKind::ReList { patterns, fallback } => {
                for (re, value) in patterns {
                    if re.is_match(raw) {
                        return Ok(value.clone());
                    }
                }
                fallback.clone().ok_or_else(|| self.invalid(raw))
            },
            TypeKind::Set {
                subtype,
                separator,
                shortcuts,
            } => {
                if let Some(values) = shortcuts.get(&raw.trim().to_ascii_lowercase()) {
                    return Ok(Value::List(values.clone()));
                }
                Ok(Value::List(split_convert(raw, separator, subtype)?))
            },
        }
    }

    /// Best-effort inverse of [`ValueType::parse_str`], used for
    /// documentation and debug output. Arrays re-serialize with the declared
    /// output separator, not necessarily the one the user typed.
    pub fn format(&self, value: &Value) -> String {
        match (&self.kind, value) {
            (TypeKind::Array { subtype, output_sep, .. }, Value::List(items)) => {
                let parts: Vec<String> = items.iter().map(|i| subtype.format(i)).collect();
                parts.join(output_sep)
            },
            (TypeKind::Set { subtype, .. }, Value::List(items)) => {
                let parts: Vec<String> = items.iter().map(|i| subtype.format(i)).collect();
                parts.join(",")
            },
            _ => value.to_string(),
        }
    }
}

fn split_convert(raw: &str, separator: &Regex, subtype: &ValueType) -> Result<Vec<Value>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    separator.split(raw).map(|p| subtype.parse_str(p)).collect()
}

/// Compile a separator/pattern regex, mapping failure into [`QuillError`].
pub fn pattern(pat: &str) -> Result<Regex> {
    Regex::new(pat).map_err(|e| QuillError::Pattern(e.to_string()))
}

/// Registry of value types, keyed by unique name.
#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<String, Rc<ValueType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry {
            types: HashMap::new(),
        }
    }

    /// Register a type. A second registration under the same name is an
    /// error; the first registration stays active.
    pub fn register(&mut self, vtype: ValueType) -> Result<Rc<ValueType>> {
        if self.types.contains_key(vtype.name()) {
            return Err(QuillError::DuplicateType(vtype.name().to_string()));
        }
        let rc = Rc::new(vtype);
        self.types.insert(rc.name().to_string(), Rc::clone(&rc));
        Ok(rc)
    }

    /// Look a type up by name.
    pub fn lookup(&self, name: &str) -> Result<Rc<ValueType>> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| QuillError::UnknownType(name.to_string()))
    }

    /// Sorted type names, for listings.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Install the default quill types into a registry.
pub fn register_default_types(reg: &mut TypeRegistry) -> Result<()> {
    reg.register(ValueType::new("int", TypeKind::Integer, "An integer"))?;
    let float = reg.register(ValueType::new(
        "float",
        TypeKind::Float,
        "A floating-point number",
    ))?;
    reg.register(
        ValueType::new("boolean", TypeKind::Boolean, "A true/false value")
            .with_shortcut("none", Value::Bool(false)),
    )?;
    let text = reg.register(ValueType::new("text", TypeKind::String, "Free-form text"))?;
    reg.register(ValueType::new(
        "date",
        TypeKind::Date,
        "An ISO date (YYYY-MM-DD)",
    ))?;

    reg.register(ValueType::new(
        "float-list",
        TypeKind::Array {
            subtype: Rc::clone(&float),
            separator: pattern(r"\s*[,:]\s*")?,
            output_sep: ",".into(),
        },
        "Comma- or colon-separated floats",
    ))?;
    reg.register(ValueType::new(
        "text-list",
        TypeKind::Array {
            subtype: Rc::clone(&text),
            separator: pattern(r"\s*,\s*")?,
            output_sep: ",".into(),
        },
        "Comma-separated text items",
    ))?;

    reg.register(ValueType::new(
        "line-style",
        TypeKind::ReList {
            patterns: vec![
                (pattern(r"^solid$")?, Value::Str("solid".into())),
                (pattern(r"^dash(es)?$")?, Value::Str("dashes".into())),
                (pattern(r"^dot(s|ted)?$")?, Value::Str("dots".into())),
                (pattern(r"^(no(ne)?|off)$")?, Value::Str("none".into())),
            ],
            fallback: None,
        },
        "A stroke style: solid, dashes, dots or none",
    ))?;
    reg.register(ValueType::new(
        "marker-style",
        TypeKind::ReList {
            patterns: vec![
                (pattern(r"^bullet$")?, Value::Str("bullet".into())),
                (pattern(r"^circle$")?, Value::Str("circle".into())),
                (pattern(r"^cross$")?, Value::Str("cross".into())),
                (pattern(r"^star$")?, Value::Str("star".into())),
            ],
            fallback: Some(Value::Str("bullet".into())),
        },
        "A data-point marker glyph (falls back to bullet)",
    ))?;

    let color = reg.register(ValueType::new(
        "color",
        TypeKind::Color,
        "A named, #rrggbb or r,g,b color",
    ))?;
    reg.register(ValueType::new(
        "color-set",
        TypeKind::Set {
            subtype: color,
            separator: pattern(r"\s*,\s*")?,
            shortcuts: default_palettes(),
        },
        "A named palette or comma-separated colors, cycled across datasets",
    ))?;

    Ok(())
}

fn default_palettes() -> HashMap<String, Vec<Value>> {
    let mut palettes = HashMap::new();
    palettes.insert(
        "default".to_string(),
        vec![
            Value::Color(Color::RED),
            Value::Color(Color::GREEN),
            Value::Color(Color::BLUE),
            Value::Color(Color::new(1.0, 0.5, 0.0)),
        ],
    );
    palettes.insert("mono".to_string(), vec![Value::Color(Color::BLACK)]);
    palettes
}
