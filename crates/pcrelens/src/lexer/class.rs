//! Character-class sublexer (`spec.md` §4.2): entered at `[`, exited at the
//! matching `]`. PCRE gives `]`, `-`, `^`, and `[:name:]` positional meaning
//! inside a class that they don't have elsewhere, so this runs as a
//! dedicated scanning mode rather than falling through the normal dispatch.

use super::escape;
use super::{Token, TokenKind, Tokenizer};
use crate::span::ByteSpan;

/// Scans one class-mode token. Returns `None` only when the class has just
/// been closed or the input ended mid-class; the caller's loop re-checks
/// end-of-input/mode on the next iteration.
pub(super) fn scan(t: &mut Tokenizer<'_>) -> Option<Token> {
    let start = t.pos;
    let b = t.byte_at(start)?;

    if b == b'^' && start == t.class_start() {
        t.advance_to(start + 1);
        return Some(Token::new(TokenKind::ClassNegate, span(start, t)));
    }

    if b == b']' {
        if start == first_literal_close_pos(t) {
            t.advance_to(start + 1);
            return Some(Token::new(TokenKind::Literal, span(start, t)));
        }
        t.advance_to(start + 1);
        t.set_in_class(false);
        return Some(Token::new(TokenKind::ClassClose, span(start, t)));
    }

    if b == b'\\' {
        return escape::scan_escape(t, true);
    }

    if b == b'[' && t.byte_at(start + 1) == Some(b':') {
        if let Some(end) = find_posix_class_end(t, start) {
            t.advance_to(end);
            return Some(Token::new(TokenKind::PosixClass, span(start, t)));
        }
        // No matching `:]`: `[` is a literal inside a class.
        t.advance_to(start + 1);
        return Some(Token::new(TokenKind::Literal, span(start, t)));
    }

    if b == b'&' && t.byte_at(start + 1) == Some(b'&') {
        t.advance_to(start + 2);
        return Some(Token::new(TokenKind::ClassIntersect, span(start, t)));
    }

    if b == b'-' && t.byte_at(start + 1) == Some(b'-') {
        t.advance_to(start + 2);
        return Some(Token::new(TokenKind::ClassSubtract, span(start, t)));
    }

    if b == b'-' {
        t.advance_to(start + 1);
        let kind = if is_edge_position(t, start) {
            TokenKind::Literal
        } else {
            TokenKind::ClassRange
        };
        return Some(Token::new(kind, span(start, t)));
    }

    let len = utf8_len(b);
    t.advance_to(start + len);
    Some(Token::new(TokenKind::Literal, span(start, t)))
}

/// The position at which a literal `]` is permitted: immediately at class
/// start, or immediately after a leading negation `^`.
fn first_literal_close_pos(t: &Tokenizer<'_>) -> usize {
    let start = t.class_start();
    if t.byte_at(start) == Some(b'^') {
        start + 1
    } else {
        start
    }
}

/// A `-` right at the position a literal `]` would be allowed, or
/// immediately before the class's closing `]`, is a literal hyphen rather
/// than a range operator.
fn is_edge_position(t: &Tokenizer<'_>, pos: usize) -> bool {
    pos == first_literal_close_pos(t) || t.byte_at(pos + 1) == Some(b']')
}

fn find_posix_class_end(t: &Tokenizer<'_>, open: usize) -> Option<usize> {
    let mut p = open + 2;
    loop {
        match (t.byte_at(p), t.byte_at(p + 1)) {
            (Some(b':'), Some(b']')) => return Some(p + 2),
            (Some(b']'), _) | (None, _) => return None,
            _ => p += 1,
        }
    }
}

fn span(start: usize, t: &Tokenizer<'_>) -> ByteSpan {
    ByteSpan::new(start as u32, t.pos() as u32)
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
