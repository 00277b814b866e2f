//! Hand-written PCRE tokenizer (`spec.md` §4.2).
//!
//! Operates directly over the pattern body's bytes. Unlike the teacher's
//! `logos`-derived lexer (`plotnik-lib::parser::lexer`), this tokenizer is
//! hand-rolled: PCRE tokenization is context-sensitive in ways a single
//! regular-token grammar can't express — quote mode (`\Q...\E`), the
//! character-class sublexer, and extended-mode whitespace skipping all
//! depend on state a `Logos` derive can't see. See `DESIGN.md`.
//!
//! Whitespace/comment skipping under extended (`x`) mode happens here and
//! is invisible to the parser: `next_token`/`peek_token` never return
//! [`TokenKind::ExtendedTrivia`]; skipped spans are recorded in
//! [`Tokenizer::trivia_spans`] purely for diagnostics.

mod class;
mod escape;
pub mod token;

pub use token::{Token, TokenKind};

use crate::error::LexerErrorKind;
use crate::span::ByteSpan;

/// A single lexical failure, collected (not raised) during tokenization,
/// matching §7's "validator/analyzer return structured results" policy
/// extended to lexing: the tokenizer keeps scanning after an error so the
/// parser can still attempt recovery in tolerant mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexerErrorKind,
    pub span: ByteSpan,
}

/// Hand-written byte-level tokenizer.
pub struct Tokenizer<'s> {
    pub(crate) source: &'s str,
    bytes: &'s [u8],
    pub(crate) pos: usize,
    in_class: bool,
    class_start: usize,
    extended_mode: bool,
    in_quote: bool,
    errors: Vec<LexError>,
    trivia_spans: Vec<ByteSpan>,
    lookahead: Option<Token>,
    end: usize,
}

impl<'s> Tokenizer<'s> {
    pub fn new(source: &'s str, extended_mode: bool) -> Self {
        Self::new_in_range(source, 0, source.len(), extended_mode)
    }

    /// Scans only `source[start..end]`, but every token span stays in
    /// absolute byte offsets into the full `source`. Used to tokenize a
    /// delimited literal's body (`spec.md` §4.1) without losing the
    /// surrounding delimiter/flags offsets.
    pub fn new_in_range(source: &'s str, start: usize, end: usize, extended_mode: bool) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: start,
            in_class: false,
            class_start: start,
            extended_mode,
            in_quote: false,
            errors: Vec::new(),
            trivia_spans: Vec::new(),
            lookahead: None,
            end,
        }
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn trivia_spans(&self) -> &[ByteSpan] {
        &self.trivia_spans
    }

    /// Toggles extended-mode whitespace skipping. Called by the parser when
    /// entering/leaving an inline-flag scope such as `(?x:...)` or `(?-x:...)`.
    pub fn set_extended_mode(&mut self, enabled: bool) {
        self.extended_mode = enabled;
        self.lookahead = None; // re-tokenize under the new mode
    }

    pub fn extended_mode(&self) -> bool {
        self.extended_mode
    }

    pub fn in_class(&self) -> bool {
        self.in_class
    }

    /// Current byte offset. Used by the parser's group-modifier dispatch,
    /// which scans raw bytes directly rather than going through tokens (see
    /// `parser::groups`).
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Repositions the tokenizer. Used after the parser hand-scans a
    /// group-modifier header (`(?:`, `(?<name>`, `(?P<name>`, ...).
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
        self.lookahead = None;
    }

    pub fn remaining(&self) -> &'s str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.end
    }

    pub(super) fn push_error(&mut self, kind: LexerErrorKind, span: ByteSpan) {
        self.errors.push(LexError { kind, span });
    }

    pub(super) fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    pub(super) fn len(&self) -> usize {
        self.end
    }

    pub(super) fn advance_to(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(super) fn set_in_quote(&mut self, v: bool) {
        self.in_quote = v;
    }

    pub(super) fn set_in_class(&mut self, v: bool) {
        self.in_class = v;
    }

    pub(super) fn class_start(&self) -> usize {
        self.class_start
    }

    pub fn peek_token(&mut self) -> Token {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scan_token());
        }
        self.lookahead.unwrap()
    }

    pub fn next_token(&mut self) -> Token {
        if let Some(t) = self.lookahead.take() {
            return t;
        }
        self.scan_token()
    }

    /// Scans one meaningful token, transparently skipping extended-mode
    /// trivia first.
    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_trivia_if_extended();
            if self.at_eof() {
                return Token::new(TokenKind::Eof, ByteSpan::empty_at(self.pos as u32));
            }
            if self.in_quote {
                return self.scan_in_quote();
            }
            if self.in_class {
                if let Some(tok) = class::scan(self) {
                    return tok;
                }
                continue;
            }
            if let Some(tok) = self.scan_normal() {
                return tok;
            }
            // scan_normal returned None only for zero-width skips (stray \E).
        }
    }

    fn skip_trivia_if_extended(&mut self) {
        if !self.extended_mode || self.in_class || self.in_quote {
            return;
        }
        let start = self.pos;
        loop {
            match self.bytes.get(self.pos) {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'#') => {
                    while let Some(&b) = self.bytes.get(self.pos) {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
        if self.pos > start {
            self.trivia_spans
                .push(ByteSpan::new(start as u32, self.pos as u32));
        }
    }

    fn scan_in_quote(&mut self) -> Token {
        let start = self.pos;
        if self.bytes[self.pos..].starts_with(b"\\E") {
            self.pos += 2;
            self.in_quote = false;
            return Token::new(TokenKind::QuoteEnd, ByteSpan::new(start as u32, self.pos as u32));
        }
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos..].starts_with(b"\\E") {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            // Immediately at \E, handled above; unreachable in practice.
        }
        if self.pos >= self.bytes.len() && start == self.pos {
            self.push_error(
                LexerErrorKind::UnterminatedQuote,
                ByteSpan::new(start as u32, self.pos as u32),
            );
        }
        Token::new(TokenKind::QuoteLiteral, ByteSpan::new(start as u32, self.pos as u32))
    }

    fn scan_normal(&mut self) -> Option<Token> {
        let start = self.pos;
        let b = self.bytes[self.pos];

        match b {
            b'\\' => self.scan_escape(false),
            b'.' => {
                self.pos += 1;
                Some(Token::new(TokenKind::Dot, ByteSpan::new(start as u32, self.pos as u32)))
            }
            b'^' => {
                self.pos += 1;
                Some(Token::new(
                    TokenKind::CaretAnchor,
                    ByteSpan::new(start as u32, self.pos as u32),
                ))
            }
            b'$' => {
                self.pos += 1;
                Some(Token::new(
                    TokenKind::DollarAnchor,
                    ByteSpan::new(start as u32, self.pos as u32),
                ))
            }
            b'|' => {
                self.pos += 1;
                Some(Token::new(TokenKind::Pipe, ByteSpan::new(start as u32, self.pos as u32)))
            }
            b'[' => {
                self.pos += 1;
                self.in_class = true;
                self.class_start = self.pos;
                Some(Token::new(
                    TokenKind::ClassOpen,
                    ByteSpan::new(start as u32, self.pos as u32),
                ))
            }
            b')' => {
                self.pos += 1;
                Some(Token::new(
                    TokenKind::GroupClose,
                    ByteSpan::new(start as u32, self.pos as u32),
                ))
            }
            b'(' => self.scan_group_open(),
            b'*' | b'+' | b'?' => Some(self.scan_quantifier()),
            b'{' => Some(self.scan_brace_quantifier_or_literal()),
            _ => {
                let len = utf8_len(b);
                self.pos += len;
                Some(Token::new(
                    TokenKind::Literal,
                    ByteSpan::new(start as u32, self.pos as u32),
                ))
            }
        }
    }

    fn scan_group_open(&mut self) -> Option<Token> {
        let start = self.pos;
        self.pos += 1; // consume '('

        if self.bytes.get(self.pos) != Some(&b'?') {
            return Some(Token::new(
                TokenKind::GroupOpen,
                ByteSpan::new(start as u32, self.pos as u32),
            ));
        }

        // Bare verb `(*NAME...)` never has `?`, so we only special-case
        // `(?#...)` comments here; everything else stays as a plain
        // GroupModifierOpen for the parser's raw-byte dispatch.
        if self.bytes.get(self.pos + 1) == Some(&b'#') {
            let mut p = self.pos + 2;
            while p < self.bytes.len() && self.bytes[p] != b')' {
                p += 1;
            }
            let end = (p + 1).min(self.bytes.len());
            self.pos = end;
            return Some(Token::new(
                TokenKind::Comment,
                ByteSpan::new(start as u32, end as u32),
            ));
        }

        self.pos += 1; // consume '?'
        Some(Token::new(
            TokenKind::GroupModifierOpen,
            ByteSpan::new(start as u32, self.pos as u32),
        ))
    }

    fn scan_quantifier(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1; // consume */+/?
        self.consume_quantifier_suffix();
        Token::new(TokenKind::Quantifier, ByteSpan::new(start as u32, self.pos as u32))
    }

    fn consume_quantifier_suffix(&mut self) {
        match self.bytes.get(self.pos) {
            Some(b'?') | Some(b'+') => self.pos += 1,
            _ => {}
        }
    }

    /// `{m,n}`, `{m,}`, `{m}` quantifiers; a `{` that doesn't parse as one
    /// of these forms is a literal `{` (PCRE convention).
    fn scan_brace_quantifier_or_literal(&mut self) -> Token {
        let start = self.pos;
        let mut p = self.pos + 1;
        let digits_start = p;
        while self.bytes.get(p).is_some_and(u8::is_ascii_digit) {
            p += 1;
        }
        let has_first = p > digits_start;
        if self.bytes.get(p) == Some(&b',') {
            p += 1;
            while self.bytes.get(p).is_some_and(u8::is_ascii_digit) {
                p += 1;
            }
        }
        if has_first && self.bytes.get(p) == Some(&b'}') {
            p += 1;
            self.pos = p;
            self.consume_quantifier_suffix();
            return Token::new(TokenKind::Quantifier, ByteSpan::new(start as u32, self.pos as u32));
        }
        // Not a valid quantifier body: treat the `{` as a literal byte.
        self.pos = start + 1;
        Token::new(TokenKind::Literal, ByteSpan::new(start as u32, self.pos as u32))
    }

    fn scan_escape(&mut self, in_class: bool) -> Option<Token> {
        escape::scan_escape(self, in_class)
    }
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut t = Tokenizer::new(source, false);
        let mut out = Vec::new();
        loop {
            let tok = t.next_token();
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn literal_run() {
        assert_eq!(
            kinds("abc"),
            vec![TokenKind::Literal, TokenKind::Literal, TokenKind::Literal]
        );
    }

    #[test]
    fn quantifier_forms() {
        assert_eq!(
            kinds("a+b*?c{2,3}+"),
            vec![
                TokenKind::Literal,
                TokenKind::Quantifier,
                TokenKind::Literal,
                TokenKind::Quantifier,
                TokenKind::Literal,
                TokenKind::Quantifier,
            ]
        );
    }

    #[test]
    fn group_open_plain_vs_modifier() {
        // The tokenizer only marks `(?`; the `:` dispatch byte that follows
        // is left for the parser's group-modifier dispatch to interpret
        // directly from the source text (see `parser::groups`).
        assert_eq!(
            kinds("(a)(?:b)"),
            vec![
                TokenKind::GroupOpen,
                TokenKind::Literal,
                TokenKind::GroupClose,
                TokenKind::GroupModifierOpen,
                TokenKind::Literal,
                TokenKind::Literal,
                TokenKind::GroupClose,
            ]
        );
    }

    #[test]
    fn comment_group_is_single_token() {
        assert_eq!(kinds("(?#hello)a"), vec![TokenKind::Comment, TokenKind::Literal]);
    }

    #[test]
    fn extended_mode_skips_whitespace_and_comments() {
        let mut t = Tokenizer::new("a   # comment\n  b", true);
        let a = t.next_token();
        let b = t.next_token();
        assert_eq!(a.kind, TokenKind::Literal);
        assert_eq!(b.kind, TokenKind::Literal);
        assert_eq!(b.text("a   # comment\n  b"), "b");
        assert!(!t.trivia_spans().is_empty());
    }

    #[test]
    fn quote_mode_roundtrip() {
        assert_eq!(
            kinds(r"\Qa.b\E+"),
            vec![
                TokenKind::QuoteStart,
                TokenKind::QuoteLiteral,
                TokenKind::QuoteEnd,
                TokenKind::Quantifier,
            ]
        );
    }

    #[test]
    fn brace_that_is_not_a_quantifier_is_literal() {
        // a { x y z } -> six literal bytes, since `{xyz}` isn't `{m,n}`.
        assert_eq!(kinds("a{xyz}"), vec![TokenKind::Literal; 6]);
    }
}
