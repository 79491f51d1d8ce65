//! Lexical parser for script text.
//!
//! A single-pass, character-level state machine turning raw text into the
//! tagged segments of a [`ScriptString`]: plain text, `'...'` and `"..."`
//! quotes, and `$(name)` variable references (recognized inside double
//! quotes as well). `#` outside quotes starts a line comment. Parsing stops
//! without consuming when a caller-supplied terminator character is seen at
//! top level, so callers can tokenize words out of a larger stream.

use quill_types::error::{QuillError, Result};

use crate::string::{ScriptString, Segment, SegmentKind};

/// A peekable character stream that tracks the current line for
/// diagnostics.
pub struct CharStream<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> CharStream<'a> {
    pub fn new(text: &'a str) -> Self {
        CharStream {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    /// 1-based line of the next unconsumed character.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    pub fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    pub fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }
}

/// Lexer states. `Escape` remembers whether it was entered from inside
/// double quotes, where a restricted escape table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing consumed yet.
    Start,
    /// Inside unquoted text.
    Top,
    /// Inside `'...'`.
    Single,
    /// Inside `"..."`.
    Double,
    /// Just saw `$` at top level.
    Dollar,
    /// Just saw `$` inside double quotes.
    DqDollar,
    /// Inside `$(...)` at top level.
    Var,
    /// Inside `$(...)` within double quotes.
    DqVar,
    /// Just saw `\`.
    Escape { in_double: bool },
}

/// Parse one script string from `stream`.
///
/// Stops (leaving the character unconsumed) when a character from
/// `terminators` is seen in the `Start`/`Top` states, or at end of input.
/// End of input inside quotes or a variable reference is an
/// [`QuillError::UnterminatedString`] unless `lenient` is set, in which
/// case the open construct is closed as-is (used for best-effort parsing).
pub fn parse_string(
    stream: &mut CharStream<'_>,
    terminators: &str,
    lenient: bool,
) -> Result<ScriptString> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut buf = String::new();
    let mut state = State::Start;

    // Close the current buffer as a segment of the given kind.
    fn flush(segments: &mut Vec<Segment>, buf: &mut String, kind: SegmentKind) {
        if !buf.is_empty() {
            segments.push(Segment::new(kind, std::mem::take(buf)));
        }
    }

    loop {
        let Some(c) = stream.peek() else {
            // End of input: only the outer states terminate cleanly.
            match state {
                State::Start | State::Top => break,
                State::Dollar => {
                    buf.push('$');
                    break;
                },
                _ if lenient => {
                    match state {
                        State::Single | State::Double => {
                            flush(&mut segments, &mut buf, SegmentKind::Quoted);
                        },
                        State::Var => {
                            flush(&mut segments, &mut buf, SegmentKind::UnquotedVariable);
                        },
                        State::DqVar => {
                            flush(&mut segments, &mut buf, SegmentKind::QuotedVariable);
                        },
                        State::DqDollar => {
                            buf.push('$');
                            flush(&mut segments, &mut buf, SegmentKind::Quoted);
                        },
                        State::Escape { in_double } => {
                            buf.push('\\');
                            let kind = if in_double {
                                SegmentKind::Quoted
                            } else {
                                SegmentKind::Unquoted
                            };
                            flush(&mut segments, &mut buf, kind);
                        },
                        _ => {},
                    }
                    break;
                },
                _ => {
                    return Err(QuillError::UnterminatedString {
                        line: stream.line(),
                    });
                },
            }
        };

        match state {
            State::Start | State::Top => {
                if terminators.contains(c) {
                    break;
                }
                stream.next_char();
                match c {
                    '#' => {
                        // Line comment: consume up to (not including) the
                        // newline so the caller still sees the word end.
                        while stream.peek().is_some_and(|n| n != '\n') {
                            stream.next_char();
                        }
                    },
                    '\'' => {
                        flush(&mut segments, &mut buf, SegmentKind::Unquoted);
                        state = State::Single;
                    },
                    '"' => {
                        flush(&mut segments, &mut buf, SegmentKind::Unquoted);
                        state = State::Double;
                    },
                    '$' => state = State::Dollar,
                    '\\' => state = State::Escape { in_double: false },
                    _ => {
                        buf.push(c);
                        state = State::Top;
                    },
                }
            },
            State::Dollar => {
                if c == '(' {
                    stream.next_char();
                    flush(&mut segments, &mut buf, SegmentKind::Unquoted);
                    state = State::Var;
                } else {
                    // Literal dollar; reprocess c at top level.
                    buf.push('$');
                    state = State::Top;
                }
            },
            State::DqDollar => {
                if c == '(' {
                    stream.next_char();
                    flush(&mut segments, &mut buf, SegmentKind::Quoted);
                    state = State::DqVar;
                } else {
                    buf.push('$');
                    state = State::Double;
                }
            },
            State::Single => {
                stream.next_char();
                if c == '\'' {
                    flush(&mut segments, &mut buf, SegmentKind::Quoted);
                    state = State::Top;
                } else {
                    buf.push(c);
                }
            },
            State::Double => {
                stream.next_char();
                match c {
                    '"' => {
                        flush(&mut segments, &mut buf, SegmentKind::Quoted);
                        state = State::Top;
                    },
                    '\\' => state = State::Escape { in_double: true },
                    '$' => state = State::DqDollar,
                    _ => buf.push(c),
                }
            },
            State::Var => {
                stream.next_char();
                if c == ')' {
                    flush(&mut segments, &mut buf, SegmentKind::UnquotedVariable);
                    state = State::Top;
                } else {
                    // Variable names may contain anything except ')'.
                    buf.push(c);
                }
            },
            State::DqVar => {
                stream.next_char();
                if c == ')' {
                    flush(&mut segments, &mut buf, SegmentKind::QuotedVariable);
                    state = State::Double;
                } else {
                    buf.push(c);
                }
            },
            State::Escape { in_double } => {
                stream.next_char();
                if in_double {
                    // Restricted escape table inside double quotes; other
                    // characters keep their backslash.
                    match c {
                        '\\' | '"' | '$' => buf.push(c),
                        'n' => buf.push('\n'),
                        't' => buf.push('\t'),
                        _ => {
                            buf.push('\\');
                            buf.push(c);
                        },
                    }
                    state = State::Double;
                } else {
                    buf.push(c);
                    state = State::Top;
                }
            },
        }
    }

    flush(&mut segments, &mut buf, SegmentKind::Unquoted);
    Ok(ScriptString::new(segments))
}
