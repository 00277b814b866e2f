//! Shared escape-resolution logic (`spec.md` §4.2), used both outside and
//! inside character classes — `\d`, `\x{...}`, `\p{...}` and friends mean the
//! same thing in both positions.

use super::{Token, TokenKind, Tokenizer};
use crate::error::LexerErrorKind;
use crate::span::ByteSpan;

pub(super) fn scan_escape(t: &mut Tokenizer<'_>, in_class: bool) -> Option<Token> {
    let start = t.pos;
    debug_assert_eq!(t.byte_at(start), Some(b'\\'));

    let Some(kind_byte) = t.byte_at(start + 1) else {
        // Trailing backslash at end of pattern: treat as a literal escape
        // error but still produce a token so parsing can terminate cleanly.
        t.push_error(LexerErrorKind::InvalidEscape, ByteSpan::new(start as u32, start as u32 + 1));
        t.advance_to(start + 1);
        return Some(Token::new(TokenKind::Error, ByteSpan::new(start as u32, t.pos as u32)));
    };

    match kind_byte {
        b'Q' if !in_class => {
            t.advance_to(start + 2);
            t.set_in_quote(true);
            Some(Token::new(TokenKind::QuoteStart, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'E' if !in_class => {
            // Stray \E with no matching \Q: a documented PCRE no-op. Consume
            // both bytes and signal the caller to keep scanning.
            t.advance_to(start + 2);
            None
        }
        b'd' | b'D' | b'w' | b'W' | b's' | b'S' | b'h' | b'H' | b'v' | b'V' | b'R' | b'X' | b'C'
        | b'N' => {
            t.advance_to(start + 2);
            Some(Token::new(TokenKind::CharType, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'b' | b'B' if !in_class => {
            let mut end = start + 2;
            // `\b{g}` / `\B{g}` grapheme-boundary variants.
            if t.byte_at(end) == Some(b'{') {
                let mut p = end + 1;
                while t.byte_at(p).is_some_and(|b| b != b'}') {
                    p += 1;
                }
                if t.byte_at(p) == Some(b'}') {
                    end = p + 1;
                }
            }
            t.advance_to(end);
            Some(Token::new(TokenKind::Assertion, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'A' | b'z' | b'Z' | b'G' if !in_class => {
            t.advance_to(start + 2);
            Some(Token::new(TokenKind::Assertion, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'K' if !in_class => {
            t.advance_to(start + 2);
            Some(Token::new(TokenKind::Keep, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'k' | b'g' if !in_class => scan_named_or_numeric_ref(t, start),
        b'c' => {
            let end = if t.byte_at(start + 2).is_some() { start + 3 } else { start + 2 };
            t.advance_to(end);
            Some(Token::new(TokenKind::Control, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'o' if t.byte_at(start + 2) == Some(b'{') => {
            let end = scan_braced(t, start + 2);
            t.advance_to(end);
            Some(Token::new(TokenKind::Octal, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'x' if t.byte_at(start + 2) == Some(b'{') => {
            let end = scan_braced(t, start + 2);
            t.advance_to(end);
            Some(Token::new(TokenKind::HexBraced, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'x' => {
            let mut end = start + 2;
            let limit = (end + 2).min(t.len());
            while end < limit && t.byte_at(end).is_some_and(|b| b.is_ascii_hexdigit()) {
                end += 1;
            }
            t.advance_to(end);
            Some(Token::new(TokenKind::Hex, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'p' | b'P' if t.byte_at(start + 2) == Some(b'{') => {
            let end = scan_braced(t, start + 2);
            t.advance_to(end);
            Some(Token::new(TokenKind::UnicodeProp, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'p' | b'P' => {
            // Single-letter shorthand, e.g. `\pL`.
            let end = if t.byte_at(start + 2).is_some() { start + 3 } else { start + 2 };
            t.advance_to(end);
            Some(Token::new(TokenKind::UnicodeProp, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'1'..=b'9' if !in_class => {
            let mut end = start + 2;
            while t.byte_at(end).is_some_and(|b| b.is_ascii_digit()) {
                end += 1;
            }
            t.advance_to(end);
            Some(Token::new(TokenKind::NumericRef, ByteSpan::new(start as u32, t.pos as u32)))
        }
        b'0' => {
            // Legacy octal: `\0` plus up to two more octal digits.
            let mut end = start + 2;
            let limit = (start + 4).min(t.len());
            while end < limit && t.byte_at(end).is_some_and(|b| (b'0'..=b'7').contains(&b)) {
                end += 1;
            }
            t.advance_to(end);
            Some(Token::new(TokenKind::OctalLegacy, ByteSpan::new(start as u32, t.pos as u32)))
        }
        _ => {
            t.advance_to(start + 1 + utf8_len_at(t, start + 1));
            Some(Token::new(TokenKind::EscapedLiteral, ByteSpan::new(start as u32, t.pos as u32)))
        }
    }
}

/// `\k<name>`, `\k'name'`, `\k{name}`, `\g<name>`, `\g{name}`, `\g{-1}`,
/// `\g-1`, `\g+1`, or a bare `\g1`.
fn scan_named_or_numeric_ref(t: &mut Tokenizer<'_>, start: usize) -> Option<Token> {
    let letter = t.byte_at(start + 1).unwrap();
    let delim_pos = start + 2;
    match t.byte_at(delim_pos) {
        Some(b'<') => {
            let end = scan_until(t, delim_pos + 1, b'>') ;
            t.advance_to(end);
            Some(Token::new(TokenKind::NamedRef, ByteSpan::new(start as u32, t.pos as u32)))
        }
        Some(b'\'') => {
            let end = scan_until(t, delim_pos + 1, b'\'');
            t.advance_to(end);
            Some(Token::new(TokenKind::NamedRef, ByteSpan::new(start as u32, t.pos as u32)))
        }
        Some(b'{') if letter == b'k' => {
            let end = scan_braced(t, delim_pos);
            t.advance_to(end);
            Some(Token::new(TokenKind::NamedRef, ByteSpan::new(start as u32, t.pos as u32)))
        }
        Some(b'{') => {
            // `\g{name}` or `\g{-1}` / `\g{1}`: numeric content is a
            // NumericRef, anything else a NamedRef. Peek past the `{`.
            let content_start = delim_pos + 1;
            let is_numeric = t
                .byte_at(content_start)
                .is_some_and(|b| b.is_ascii_digit() || b == b'-' || b == b'+');
            let end = scan_braced(t, delim_pos);
            t.advance_to(end);
            let kind = if is_numeric { TokenKind::NumericRef } else { TokenKind::NamedRef };
            Some(Token::new(kind, ByteSpan::new(start as u32, t.pos as u32)))
        }
        Some(b'-') | Some(b'+') | Some(b'0'..=b'9') if letter == b'g' => {
            let mut end = delim_pos + 1;
            while t.byte_at(end).is_some_and(|b| b.is_ascii_digit()) {
                end += 1;
            }
            t.advance_to(end);
            Some(Token::new(TokenKind::NumericRef, ByteSpan::new(start as u32, t.pos as u32)))
        }
        _ => {
            // Malformed `\k` / `\g` with no recognizable argument form.
            t.push_error(
                LexerErrorKind::InvalidEscape,
                ByteSpan::new(start as u32, delim_pos as u32),
            );
            t.advance_to(delim_pos);
            Some(Token::new(TokenKind::Error, ByteSpan::new(start as u32, t.pos as u32)))
        }
    }
}

fn scan_until(t: &Tokenizer<'_>, from: usize, closer: u8) -> usize {
    let mut p = from;
    while t.byte_at(p).is_some_and(|b| b != closer) {
        p += 1;
    }
    if t.byte_at(p) == Some(closer) { p + 1 } else { p }
}

/// Scans a `{...}` run starting at the `{` byte, returning the offset just
/// past the matching `}` (or end-of-input if unterminated).
fn scan_braced(t: &Tokenizer<'_>, brace_open: usize) -> usize {
    scan_until(t, brace_open + 1, b'}')
}

fn utf8_len_at(t: &Tokenizer<'_>, pos: usize) -> usize {
    match t.byte_at(pos) {
        Some(b) if b < 0x80 => 1,
        Some(b) if (0xC0..=0xDF).contains(&b) => 2,
        Some(b) if (0xE0..=0xEF).contains(&b) => 3,
        Some(b) if (0xF0..=0xF7).contains(&b) => 4,
        _ => 1,
    }
}
