//! The closed error taxonomy described in `spec.md` §7.
//!
//! Only unrecoverable conditions raise an `Error`. The semantic validator
//! (§4.5) and the ReDoS analyzer (§4.6) return structured results instead —
//! see [`crate::validate::ValidationResult`] and [`crate::redos::ReDoSAnalysis`].

use crate::span::ByteSpan;
use std::fmt;

/// A short, stable identifier for a specific diagnostic rule or failure
/// mode, e.g. `"regex.semantic.unbounded-lookbehind"` (§8, scenario 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub &'static str);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of lexical failure (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    UnterminatedClass,
    InvalidEscape,
    UnterminatedQuote,
    BadUnicodeName,
}

impl LexerErrorKind {
    pub fn code(self) -> ErrorCode {
        ErrorCode(match self {
            LexerErrorKind::UnterminatedClass => "regex.lex.unterminated-class",
            LexerErrorKind::InvalidEscape => "regex.lex.invalid-escape",
            LexerErrorKind::UnterminatedQuote => "regex.lex.unterminated-quote",
            LexerErrorKind::BadUnicodeName => "regex.lex.bad-unicode-name",
        })
    }
}

/// Extracts a short caret-snippet (up to ~40 surrounding bytes) around a
/// byte offset, for display in error messages. The snippet always stays on
/// UTF-8 boundaries by widening outward when it would otherwise split a
/// multi-byte character.
pub fn caret_snippet(source: &str, pos: u32) -> String {
    const RADIUS: usize = 20;
    let bytes = source.as_bytes();
    let pos = (pos as usize).min(bytes.len());

    let mut start = pos.saturating_sub(RADIUS);
    while start > 0 && !source.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (pos + RADIUS).min(bytes.len());
    while end < bytes.len() && !source.is_char_boundary(end) {
        end += 1;
    }

    let caret_col = pos - start;
    let mut out = String::with_capacity(end - start + caret_col + 2);
    out.push_str(&source[start..end]);
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', caret_col));
    out.push('^');
    out
}

/// Errors that abort an operation outright (§7).
///
/// Every variant carries the originating byte position (when known) and a
/// stable [`ErrorCode`]; [`Error::hint`] and [`Error::snippet`] surface the
/// optional fix hint and caret snippet uniformly across variants.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Configuration rejected before any work begins.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption { option: String, reason: String },

    /// Tokenization failure.
    #[error("{kind:?} at byte {pos}")]
    Lexer {
        kind: LexerErrorKind,
        pos: u32,
        snippet: String,
    },

    /// Structural parse failure.
    #[error("syntax error at byte {pos}: {message}")]
    Syntax {
        pos: u32,
        message: String,
        snippet: String,
        hint: Option<String>,
    },

    /// Well-formed structure violating a PCRE rule, detected during
    /// parsing itself (e.g. a quantifier with no target). Semantic issues
    /// detected by the validator (§4.5) are reported via
    /// [`crate::validate::ValidationResult`] instead, not this variant.
    #[error("semantic error at byte {pos}: {message}")]
    Semantic {
        pos: u32,
        code: ErrorCode,
        message: String,
        snippet: String,
        hint: Option<String>,
    },

    /// Parser exhausted its recursion depth budget.
    #[error("recursion limit ({limit}) exceeded at byte {pos}")]
    RecursionLimit { pos: u32, limit: u32 },

    /// A resource budget (pattern length, NFA/DFA state count, ...) was
    /// exceeded.
    #[error("resource limit exceeded: {what}")]
    ResourceLimit { what: String, limit: u64 },

    /// The pattern uses a feature outside the automata-supported regular
    /// subset (§4.7.1): lookaround, backreferences, subroutines,
    /// conditionals, verbs, `\K`, or Unicode property classes.
    #[error("pattern is not representable as a finite automaton: {feature}")]
    Complexity { feature: String, pos: Option<u32> },
}

impl Error {
    pub fn pos(&self) -> Option<u32> {
        match self {
            Error::InvalidOption { .. } => None,
            Error::Lexer { pos, .. } => Some(*pos),
            Error::Syntax { pos, .. } => Some(*pos),
            Error::Semantic { pos, .. } => Some(*pos),
            Error::RecursionLimit { pos, .. } => Some(*pos),
            Error::ResourceLimit { .. } => None,
            Error::Complexity { pos, .. } => *pos,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Error::Syntax { hint, .. } | Error::Semantic { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    pub fn snippet(&self) -> Option<&str> {
        match self {
            Error::Lexer { snippet, .. }
            | Error::Syntax { snippet, .. }
            | Error::Semantic { snippet, .. } => Some(snippet),
            _ => None,
        }
    }

    /// Whether the tolerant parser (§4.3) may record this error and keep
    /// going rather than abort the whole parse. Recursion- and
    /// resource-budget failures never are — §5 requires those to raise
    /// immediately with no partial output.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Lexer { .. } | Error::Syntax { .. } | Error::Semantic { .. })
    }

    pub(crate) fn syntax(source: &str, span: ByteSpan, message: impl Into<String>) -> Self {
        Error::Syntax {
            pos: span.start,
            message: message.into(),
            snippet: caret_snippet(source, span.start),
            hint: None,
        }
    }

    pub(crate) fn syntax_with_hint(
        source: &str,
        span: ByteSpan,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Error::Syntax {
            pos: span.start,
            message: message.into(),
            snippet: caret_snippet(source, span.start),
            hint: Some(hint.into()),
        }
    }

    pub(crate) fn semantic(
        source: &str,
        span: ByteSpan,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Error::Semantic {
            pos: span.start,
            code,
            message: message.into(),
            snippet: caret_snippet(source, span.start),
            hint: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_snippet_points_at_offset() {
        let source = "(a+)+b";
        let snippet = caret_snippet(source, 3);
        let mut lines = snippet.lines();
        assert_eq!(lines.next(), Some(source));
        let caret_line = lines.next().unwrap();
        assert_eq!(caret_line.len(), 4);
        assert!(caret_line.ends_with('^'));
    }

    #[test]
    fn caret_snippet_stays_on_char_boundaries() {
        let source = "héllo";
        // `é` is 2 bytes; position 2 sits mid-character for naive slicing.
        let snippet = caret_snippet(source, 2);
        assert!(snippet.starts_with("héllo") || snippet.starts_with('h'));
    }
}
