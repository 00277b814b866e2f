//! Character-class grammar (`spec.md` §3, §4.3).
//!
//! Entered once the tokenizer hands back a [`TokenKind::ClassOpen`]. Per
//! §3's invariant ("Inside a character class, `Alternation` is the join
//! operator for union"), a bracket expression's members are wedged into an
//! [`crate::ast::Node::Alternation`] rather than a `Sequence`; `&&`/`--`
//! combine two such union groups via [`crate::ast::Node::ClassOperation`].

use super::Parser;
use crate::ast::{ClassOpKind, Node};
use crate::error::{Error, Result};
use crate::lexer::TokenKind;
use crate::span::ByteSpan;

impl<'s> Parser<'s> {
    /// Parses a full `[...]` bracket expression. Assumes the `ClassOpen`
    /// token has already been consumed by the caller.
    pub(super) fn parse_char_class(&mut self, open_start: u32) -> Result<crate::ast::NodeId> {
        let is_negated = if self.at(TokenKind::ClassNegate) {
            self.bump();
            true
        } else {
            false
        };

        let mut left = self.parse_class_union()?;
        loop {
            match self.cur_kind() {
                TokenKind::ClassIntersect => {
                    self.bump();
                    let right = self.parse_class_union()?;
                    let span = self.builder.span(left).cover(self.builder.span(right));
                    left = self.builder.push(Node::ClassOperation {
                        span,
                        kind: ClassOpKind::Intersection,
                        left,
                        right,
                    });
                }
                TokenKind::ClassSubtract => {
                    self.bump();
                    let right = self.parse_class_union()?;
                    let span = self.builder.span(left).cover(self.builder.span(right));
                    left = self.builder.push(Node::ClassOperation {
                        span,
                        kind: ClassOpKind::Subtraction,
                        left,
                        right,
                    });
                }
                _ => break,
            }
        }

        let close_end = if self.at(TokenKind::ClassClose) {
            self.bump().span.end
        } else {
            return Err(Error::syntax(
                self.source,
                ByteSpan::new(open_start, open_start + 1),
                "unterminated character class",
            ));
        };

        let span = ByteSpan::new(open_start, close_end);
        Ok(self.builder.push(Node::CharClass {
            span,
            is_negated,
            inner: left,
        }))
    }

    /// A maximal run of union members (literals, ranges, shorthands),
    /// wrapped in an `Alternation` per the union-join invariant.
    fn parse_class_union(&mut self) -> Result<crate::ast::NodeId> {
        let mut items = Vec::new();
        while !matches!(
            self.cur_kind(),
            TokenKind::ClassClose | TokenKind::ClassIntersect | TokenKind::ClassSubtract | TokenKind::Eof
        ) {
            items.push(self.parse_class_item()?);
        }

        if items.len() == 1 {
            return Ok(items[0]);
        }

        let span = items
            .iter()
            .map(|&id| self.builder.span(id))
            .reduce(|a, b| a.cover(b))
            .unwrap_or_else(|| ByteSpan::empty_at(self.tok.peek_token().span.start));

        Ok(self.builder.push(Node::Alternation {
            span,
            alternatives: items,
        }))
    }

    fn parse_class_item(&mut self) -> Result<crate::ast::NodeId> {
        match self.cur_kind() {
            TokenKind::CharType => {
                let t = self.bump();
                let letter = t.text(self.source).as_bytes()[1];
                Ok(self.builder.push(Node::CharType { span: t.span, letter }))
            }
            TokenKind::UnicodeProp => {
                let id = self.parse_unicode_prop_token()?;
                Ok(id)
            }
            TokenKind::PosixClass => {
                let t = self.bump();
                let text = t.text(self.source);
                // `[:name:]` or `[:^name:]`.
                let inner = &text[2..text.len() - 2];
                let (is_negated, name) = match inner.strip_prefix('^') {
                    Some(rest) => (true, rest),
                    None => (false, inner),
                };
                let name = self.builder.intern(name);
                Ok(self.builder.push(Node::PosixClass {
                    span: t.span,
                    name,
                    is_negated,
                }))
            }
            TokenKind::Literal
            | TokenKind::EscapedLiteral
            | TokenKind::Octal
            | TokenKind::OctalLegacy
            | TokenKind::Hex
            | TokenKind::HexBraced
            | TokenKind::UnicodeNamed
            | TokenKind::Control => {
                let start = self.parse_class_atom()?;
                if self.at(TokenKind::ClassRange) {
                    self.bump();
                    let end = self.parse_class_atom()?;
                    let span = self.builder.span(start).cover(self.builder.span(end));
                    Ok(self.builder.push(Node::Range { span, start, end }))
                } else {
                    Ok(start)
                }
            }
            _ => {
                let t = self.bump();
                Err(Error::syntax(
                    self.source,
                    t.span,
                    "unexpected token inside character class",
                ))
            }
        }
    }

    /// A single literal byte, or a numeric/Unicode character literal,
    /// usable as a range endpoint.
    fn parse_class_atom(&mut self) -> Result<crate::ast::NodeId> {
        match self.cur_kind() {
            TokenKind::Literal | TokenKind::EscapedLiteral => {
                let t = self.bump();
                let bytes = t.text(self.source).as_bytes();
                let byte = if t.kind == TokenKind::EscapedLiteral {
                    bytes[1]
                } else {
                    bytes[0]
                };
                Ok(self.builder.push(Node::Literal {
                    span: t.span,
                    bytes: vec![byte],
                }))
            }
            _ => self.parse_char_literal_token(),
        }
    }
}
