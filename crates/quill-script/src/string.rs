//! Parsed script strings.
//!
//! A [`ScriptString`] is the parsed representation of one chunk of script
//! text: an ordered list of tagged segments. Concatenating the segments in
//! order (resolving variable segments through a [`VariableResolver`])
//! reproduces the intended expanded text. Quoted segments survive later
//! word-splitting intact.

use quill_types::error::Result;
use regex::Regex;

/// The enclosing context a segment closed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Unquoted,
    Quoted,
    UnquotedVariable,
    QuotedVariable,
}

impl SegmentKind {
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            SegmentKind::UnquotedVariable | SegmentKind::QuotedVariable
        )
    }
}

/// One tagged run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Segment {
            kind,
            text: text.into(),
        }
    }
}

/// Resolves a variable reference (the text between `$(` and `)`) to its
/// expanded value. Implemented by the variable engine; taking it as a trait
/// keeps the string representation independent of the engine.
pub trait VariableResolver {
    fn resolve(&self, reference: &str) -> Result<String>;
}

/// A resolver for contexts with no variables; references expand empty.
pub struct NoVariables;

impl VariableResolver for NoVariables {
    fn resolve(&self, _reference: &str) -> Result<String> {
        Ok(String::new())
    }
}

/// An ordered sequence of tagged segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptString {
    segments: Vec<Segment>,
}

impl ScriptString {
    pub fn new(segments: Vec<Segment>) -> Self {
        ScriptString { segments }
    }

    /// Parse a complete piece of text (no terminators, strict mode).
    pub fn from_text(text: &str) -> Result<Self> {
        let mut stream = crate::lexer::CharStream::new(text);
        crate::lexer::parse_string(&mut stream, "", false)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether expansion could depend on the variable environment.
    pub fn has_variable_refs(&self) -> bool {
        self.segments.iter().any(|s| s.kind.is_variable())
    }

    /// Whether the string begins with unquoted text starting with `ch`
    /// (used to recognize `/option=value` words: quoting defeats it).
    pub fn starts_with_unquoted(&self, ch: char) -> bool {
        self.segments
            .first()
            .is_some_and(|s| s.kind == SegmentKind::Unquoted && s.text.starts_with(ch))
    }

    /// Expand to plain text, resolving variable segments.
    pub fn expand(&self, resolver: &dyn VariableResolver) -> Result<String> {
        let mut out = String::new();
        for seg in &self.segments {
            match seg.kind {
                SegmentKind::Unquoted | SegmentKind::Quoted => out.push_str(&seg.text),
                SegmentKind::UnquotedVariable | SegmentKind::QuotedVariable => {
                    out.push_str(&resolver.resolve(&seg.text)?);
                },
            }
        }
        Ok(out)
    }

    /// Expand and split into words on `sep`.
    ///
    /// The separator only applies inside unquoted segments: quoted text and
    /// expanded variable values are never split, however many separator
    /// characters they contain.
    pub fn expand_and_split(
        &self,
        sep: &Regex,
        resolver: &dyn VariableResolver,
    ) -> Result<Vec<String>> {
        let mut words = Vec::new();
        let mut current = String::new();
        for seg in &self.segments {
            match seg.kind {
                SegmentKind::Quoted => current.push_str(&seg.text),
                SegmentKind::UnquotedVariable | SegmentKind::QuotedVariable => {
                    current.push_str(&resolver.resolve(&seg.text)?);
                },
                SegmentKind::Unquoted => {
                    let mut first = true;
                    for piece in sep.split(&seg.text) {
                        if !first && !current.is_empty() {
                            words.push(std::mem::take(&mut current));
                        }
                        current.push_str(piece);
                        first = false;
                    }
                },
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        Ok(words)
    }
}
