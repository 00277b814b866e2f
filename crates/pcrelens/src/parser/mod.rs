//! Recursive-descent parser (`spec.md` §4.3).
//!
//! Builds the arena [`crate::ast::Ast`] directly from tokens, with no
//! intermediate CST. Mirrors the teacher's `plotnik-lib::parser::core`
//! `Parser` shape — one token of lookahead, a fuel-style recursion budget
//! checked on every recursive descent into a sub-pattern — generalized from
//! tree-sitter-query grammar to PCRE's.
//!
//! Group-modifier dispatch (`(?:`, `(?=`, `(?<name>`, `(?P<name>`, inline
//! flags, conditionals, `(*VERB...)`) reads raw source bytes directly via
//! [`crate::lexer::Tokenizer::seek`] rather than going through tokens — see
//! `DESIGN.md`'s "Open design choice" note — and lives in `parser::groups`.

mod classes;
mod groups;

use crate::ast::{
    Ast, AstBuilder, CharLiteralSubtype, FlagSet, Node, NodeId, QuantifierKind, Reference,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind, Tokenizer};
use crate::reader;
use crate::span::ByteSpan;

/// Parses a full delimited regex literal (e.g. `/(a+)+b/i`) into an [`Ast`].
/// Strict mode: aborts with the first `SyntaxError`/`SemanticError`
/// encountered (§4.3, §7).
pub fn parse(source: &str, config: &Config) -> Result<Ast> {
    parse_impl(source, config, false).map(|(ast, _errors)| ast)
}

/// Tolerant parsing (§4.3, §6): records each recoverable error
/// ([`Error::is_recoverable`]) instead of aborting, synchronizing at the
/// next `)` or `|` and continuing, and returns the partial [`Ast`] together
/// with every error recorded along the way. `RecursionLimit` and
/// `ResourceLimit` still abort outright in either mode — §5 requires no
/// partial output when a resource budget is exceeded.
pub fn parse_tolerant(source: &str, config: &Config) -> Result<(Ast, Vec<Error>)> {
    parse_impl(source, config, true)
}

fn parse_impl(source: &str, config: &Config, tolerant: bool) -> Result<(Ast, Vec<Error>)> {
    let split = reader::split(source)?;
    if split.byte_len() > config.max_pattern_length {
        return Err(Error::ResourceLimit {
            what: "pattern body exceeds maxPatternLength".into(),
            limit: config.max_pattern_length as u64,
        });
    }

    let flags = FlagSet::parse(split.flags.as_bytes());
    let tok = Tokenizer::new_in_range(
        source,
        split.body_start as usize,
        split.body_end as usize,
        flags.extended,
    );

    let mut parser = Parser {
        tok,
        source,
        builder: AstBuilder::new(),
        depth: 0,
        max_depth: config.max_recursion_depth,
        group_counter: 1,
        tolerant,
        errors: Vec::new(),
    };

    let pattern = parser.parse_alternation()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        let err = Error::syntax(source, trailing.span, "unexpected trailing input after pattern");
        if parser.tolerant {
            parser.errors.push(err);
        } else {
            return Err(err);
        }
    }

    let whole_span = ByteSpan::new(0, source.len() as u32);
    let root = parser.builder.push(Node::Regex {
        span: whole_span,
        opening_delimiter: split.opening_delimiter,
        closing_delimiter: split.closing_delimiter,
        flags,
        pattern,
    });
    let errors = parser.errors;
    Ok((parser.builder.finish(root), errors))
}

/// Recursive-descent parser state. Fields are `pub(super)` so `classes.rs`
/// and `groups.rs` can extend `impl<'s> Parser<'s>` directly.
pub(crate) struct Parser<'s> {
    pub(super) tok: Tokenizer<'s>,
    pub(super) source: &'s str,
    pub(super) builder: AstBuilder,
    depth: u32,
    max_depth: u32,
    /// Next capture-group number to assign; `0` is reserved for
    /// whole-pattern recursion (`(?R)`).
    pub(super) group_counter: u32,
    /// Whether [`parse_sequence`](Parser::parse_sequence) should recover
    /// from a failing atom by recording the error and synchronizing,
    /// rather than propagating it (§4.3 "Tolerant mode").
    tolerant: bool,
    /// Errors recorded in tolerant mode, in source order.
    errors: Vec<Error>,
}

impl<'s> Parser<'s> {
    pub(super) fn peek(&mut self) -> Token {
        self.tok.peek_token()
    }

    pub(super) fn cur_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    pub(super) fn at(&mut self, kind: TokenKind) -> bool {
        self.cur_kind() == kind
    }

    pub(super) fn bump(&mut self) -> Token {
        self.tok.next_token()
    }

    pub(super) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            let t = self.peek();
            Err(Error::syntax(self.source, t.span, format!("expected {what}")))
        }
    }

    pub(super) fn expect_group_close(&mut self) -> Result<u32> {
        Ok(self.expect(TokenKind::GroupClose, "`)`")?.span.end)
    }

    pub(super) fn next_group_number(&mut self) -> u32 {
        let n = self.group_counter;
        self.group_counter += 1;
        n
    }

    fn enter(&mut self, open_pos: u32) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::RecursionLimit {
                pos: open_pos,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Recovery point for tolerant mode (§4.3, §9): advances past whatever
    /// is left of the failing atom up to the next `|` or `)`, or `Eof`,
    /// guaranteeing forward progress even when the failing production
    /// consumed no tokens of its own.
    fn synchronize(&mut self) {
        let is_sync = |k: TokenKind| matches!(k, TokenKind::Pipe | TokenKind::GroupClose | TokenKind::Eof);
        if !is_sync(self.cur_kind()) {
            self.bump();
        }
        while !is_sync(self.cur_kind()) {
            self.bump();
        }
    }

    /// `alt ::= sequence ('|' sequence)*`
    pub(super) fn parse_alternation(&mut self) -> Result<NodeId> {
        let start_pos = self.peek().span.start;
        self.enter(start_pos)?;
        let result = self.parse_alternation_inner();
        self.leave();
        result
    }

    fn parse_alternation_inner(&mut self) -> Result<NodeId> {
        let mut alts = vec![self.parse_sequence()?];
        while self.at(TokenKind::Pipe) {
            self.bump();
            alts.push(self.parse_sequence()?);
        }
        if alts.len() == 1 {
            return Ok(alts.pop().unwrap());
        }
        let span = alts
            .iter()
            .map(|&id| self.builder.span(id))
            .reduce(ByteSpan::cover)
            .unwrap();
        Ok(self.builder.push(Node::Alternation {
            span,
            alternatives: alts,
        }))
    }

    /// `sequence ::= quantified_atom*`, with adjacent un-quantified
    /// single-byte `Literal` atoms merged into one run afterward. Merging
    /// here (rather than while parsing atoms) keeps a trailing quantifier
    /// bound to just the last atom, not the whole run.
    pub(super) fn parse_sequence(&mut self) -> Result<NodeId> {
        let start = self.peek().span.start;
        let mut items: Vec<NodeId> = Vec::new();
        while !matches!(
            self.cur_kind(),
            TokenKind::Pipe | TokenKind::GroupClose | TokenKind::Eof
        ) {
            match self.parse_quantified_atom() {
                Ok(id) => items.push(id),
                Err(err) if self.tolerant && err.is_recoverable() => {
                    self.errors.push(err);
                    self.synchronize();
                }
                Err(err) => return Err(err),
            }
        }
        let merged = merge_literal_runs(&mut self.builder, items);
        let span = merged
            .iter()
            .map(|&id| self.builder.span(id))
            .reduce(ByteSpan::cover)
            .unwrap_or_else(|| ByteSpan::empty_at(start));
        Ok(self.builder.push(Node::Sequence {
            span,
            children: merged,
        }))
    }

    /// `quantified_atom ::= atom quantifier?`
    fn parse_quantified_atom(&mut self) -> Result<NodeId> {
        let atom = self.parse_atom()?;
        if self.at(TokenKind::Quantifier) {
            let t = self.bump();
            let (min, max, kind) = parse_quantifier_text(t.text(self.source));
            let span = self.builder.span(atom).cover(t.span);
            return Ok(self.builder.push(Node::Quantifier {
                span,
                target: atom,
                min,
                max,
                kind,
            }));
        }
        Ok(atom)
    }

    fn parse_atom(&mut self) -> Result<NodeId> {
        let t = self.peek();
        match t.kind {
            TokenKind::Literal => {
                self.bump();
                Ok(self.builder.push(Node::Literal {
                    span: t.span,
                    bytes: t.text(self.source).as_bytes().to_vec(),
                }))
            }
            TokenKind::EscapedLiteral => {
                self.bump();
                let byte = t.text(self.source).as_bytes()[1];
                Ok(self.builder.push(Node::Literal {
                    span: t.span,
                    bytes: vec![byte],
                }))
            }
            TokenKind::QuoteStart => self.parse_quoted_literal_run(),
            TokenKind::Dot => {
                self.bump();
                Ok(self.builder.push(Node::Dot { span: t.span }))
            }
            TokenKind::CaretAnchor => {
                self.bump();
                Ok(self.builder.push(Node::Anchor {
                    span: t.span,
                    kind: crate::ast::AnchorKind::Caret,
                }))
            }
            TokenKind::DollarAnchor => {
                self.bump();
                Ok(self.builder.push(Node::Anchor {
                    span: t.span,
                    kind: crate::ast::AnchorKind::Dollar,
                }))
            }
            TokenKind::Assertion => {
                self.bump();
                let kind = assertion_kind(t.text(self.source));
                Ok(self.builder.push(Node::Assertion { span: t.span, kind }))
            }
            TokenKind::Keep => {
                self.bump();
                Ok(self.builder.push(Node::Keep { span: t.span }))
            }
            TokenKind::CharType => {
                self.bump();
                let letter = t.text(self.source).as_bytes()[1];
                Ok(self.builder.push(Node::CharType { span: t.span, letter }))
            }
            TokenKind::UnicodeProp => self.parse_unicode_prop_token(),
            TokenKind::Octal
            | TokenKind::OctalLegacy
            | TokenKind::Hex
            | TokenKind::HexBraced
            | TokenKind::UnicodeNamed
            | TokenKind::Control => self.parse_char_literal_token(),
            TokenKind::NumericRef => {
                self.bump();
                Ok(self.builder.push(Node::Backref {
                    span: t.span,
                    reference: parse_numeric_ref_text(t.text(self.source)),
                }))
            }
            TokenKind::NamedRef => self.parse_named_ref(),
            TokenKind::ClassOpen => {
                self.bump();
                self.parse_char_class(t.span.start)
            }
            TokenKind::Comment => {
                self.bump();
                Ok(self.builder.push(Node::Comment { span: t.span }))
            }
            TokenKind::GroupOpen => {
                self.bump();
                if self.tok.byte_at(self.tok.pos()) == Some(b'*') {
                    return self.parse_verb(t.span.start);
                }
                let number = self.next_group_number();
                let child = self.parse_alternation()?;
                let close = self.expect_group_close()?;
                Ok(self.builder.push(Node::Group {
                    span: ByteSpan::new(t.span.start, close),
                    group_type: crate::ast::GroupType::Capturing { number },
                    child,
                }))
            }
            TokenKind::GroupModifierOpen => {
                self.bump();
                self.parse_group_modifier(t.span.start)
            }
            TokenKind::Error => {
                self.bump();
                Err(Error::syntax(self.source, t.span, "invalid escape sequence"))
            }
            _ => {
                self.bump();
                Err(Error::syntax(
                    self.source,
                    t.span,
                    format!("unexpected token {:?}", t.kind),
                ))
            }
        }
    }

    /// `\Qliteral\E`: each byte between the delimiters becomes its own
    /// `Literal` atom (later coalesced by [`merge_literal_runs`]), so a
    /// quantifier directly after `\E` binds only to the last quoted byte,
    /// matching PCRE's own behavior.
    fn parse_quoted_literal_run(&mut self) -> Result<NodeId> {
        let start = self.bump().span; // QuoteStart
        let mut last = self.builder.push(Node::Sequence {
            span: start,
            children: vec![],
        });
        let mut produced_any = false;
        loop {
            let t = self.peek();
            match t.kind {
                TokenKind::QuoteLiteral => {
                    self.bump();
                    for (i, b) in t.text(self.source).bytes().enumerate() {
                        let byte_span =
                            ByteSpan::new(t.span.start + i as u32, t.span.start + i as u32 + 1);
                        last = self.builder.push(Node::Literal {
                            span: byte_span,
                            bytes: vec![b],
                        });
                        produced_any = true;
                    }
                }
                TokenKind::QuoteEnd => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => break,
                _ => break,
            }
        }
        if !produced_any {
            // Empty `\Q\E`: represent as a zero-width literal run.
            last = self.builder.push(Node::Literal {
                span: ByteSpan::empty_at(start.end),
                bytes: vec![],
            });
        }
        Ok(last)
    }

    /// `\p{...}` / `\P{...}` / `\pL` standalone Unicode-property atom, also
    /// used inside a character class.
    pub(super) fn parse_unicode_prop_token(&mut self) -> Result<NodeId> {
        let t = self.bump();
        let text = t.text(self.source);
        let is_negated = text.as_bytes()[1] == b'P';
        let (has_braces, name) = if text.as_bytes().get(2) == Some(&b'{') {
            (true, &text[3..text.len() - 1])
        } else {
            (false, &text[2..])
        };
        let name_sym = self.builder.intern(name);
        Ok(self.builder.push(Node::UnicodeProp {
            span: t.span,
            name: name_sym,
            has_braces,
            is_negated,
        }))
    }

    /// Numeric/hex/octal/named Unicode character literal, shared between
    /// atom position and character-class item position.
    pub(super) fn parse_char_literal_token(&mut self) -> Result<NodeId> {
        let t = self.bump();
        let text = t.text(self.source);
        let (code_point, subtype) = match t.kind {
            TokenKind::Hex => (
                u32::from_str_radix(&text[2..], 16).unwrap_or(0),
                CharLiteralSubtype::Hex,
            ),
            TokenKind::HexBraced => (
                u32::from_str_radix(&text[3..text.len() - 1], 16).unwrap_or(0),
                CharLiteralSubtype::HexBraced,
            ),
            TokenKind::OctalLegacy => (
                u32::from_str_radix(&text[1..], 8).unwrap_or(0),
                CharLiteralSubtype::OctalLegacy,
            ),
            TokenKind::Octal => (
                u32::from_str_radix(&text[3..text.len() - 1], 8).unwrap_or(0),
                CharLiteralSubtype::Octal,
            ),
            TokenKind::Control => {
                let x = text.as_bytes()[2];
                (u32::from(x) ^ 0x40, CharLiteralSubtype::Control)
            }
            TokenKind::UnicodeNamed => {
                // `\N{U+XXXX}` resolves directly; `\N{NAME}` has no codepoint
                // table here, so it carries `0` and the name lives nowhere —
                // acceptable since the automata core rejects named-Unicode
                // atoms as out-of-subset (`Error::Complexity`) regardless.
                let inner = &text[3..text.len() - 1];
                let cp = inner
                    .strip_prefix("U+")
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .unwrap_or(0);
                (cp, CharLiteralSubtype::UnicodeNamed)
            }
            _ => unreachable!("parse_char_literal_token called on non-literal token"),
        };
        Ok(self.builder.push(Node::CharLiteral {
            span: t.span,
            code_point,
            subtype,
        }))
    }

    fn parse_named_ref(&mut self) -> Result<NodeId> {
        let t = self.bump();
        let text = t.text(self.source);
        let letter = text.as_bytes()[1];
        let name = extract_delimited_name(text);
        let name_sym = self.builder.intern(name);
        if letter == b'k' {
            Ok(self.builder.push(Node::Backref {
                span: t.span,
                reference: Reference::Name(name_sym),
            }))
        } else {
            Ok(self.builder.push(Node::Subroutine {
                span: t.span,
                reference: Reference::Name(name_sym),
                syntax: crate::ast::SubroutineSyntax::GAngle,
            }))
        }
    }
}

/// Strips `\k`/`\g` plus its opening delimiter (`<`, `'`, `{`) and the
/// matching closer, leaving the bare name/number text.
fn extract_delimited_name(text: &str) -> &str {
    let bytes = text.as_bytes();
    let open = bytes[2];
    let close: u8 = match open {
        b'<' => b'>',
        b'\'' => b'\'',
        b'{' => b'}',
        _ => open,
    };
    let inner = &text[3..];
    inner.strip_suffix(close as char).unwrap_or(inner)
}

fn parse_numeric_ref_text(text: &str) -> Reference {
    // `\1`..`\99` or `\g1`/`\g{1}`/`\g{-1}`/`\g-1`/`\g+1`.
    if let Some(rest) = text.strip_prefix("\\g{") {
        let rest = rest.strip_suffix('}').unwrap_or(rest);
        return parse_signed_ref(rest);
    }
    if let Some(rest) = text.strip_prefix("\\g") {
        return parse_signed_ref(rest);
    }
    let rest = &text[1..];
    Reference::Number(rest.parse().unwrap_or(0))
}

fn parse_signed_ref(text: &str) -> Reference {
    if let Some(rest) = text.strip_prefix('-') {
        Reference::Relative(-rest.parse::<i32>().unwrap_or(0))
    } else if let Some(rest) = text.strip_prefix('+') {
        Reference::Relative(rest.parse::<i32>().unwrap_or(0))
    } else {
        Reference::Number(text.parse().unwrap_or(0))
    }
}

fn assertion_kind(text: &str) -> crate::ast::AssertionKind {
    use crate::ast::AssertionKind::*;
    match text.as_bytes()[1] {
        b'b' if text.len() > 2 => GraphemeBoundary,
        b'B' if text.len() > 2 => NotGraphemeBoundary,
        b'b' => WordBoundary,
        b'B' => NotWordBoundary,
        b'A' => StartOfSubject,
        b'Z' => EndOfSubjectOrNewline,
        b'z' => EndOfSubject,
        b'G' => FirstMatchPosition,
        _ => WordBoundary,
    }
}

/// Parses a tokenized quantifier's text (`*`, `+`, `?`, `{m,n}`, each with
/// an optional trailing `?`/`+`) into `(min, max, kind)`.
fn parse_quantifier_text(text: &str) -> (u32, Option<u32>, QuantifierKind) {
    let bytes = text.as_bytes();
    let (body, kind) = match bytes.last() {
        Some(b'?') if bytes.len() > 1 => (&text[..text.len() - 1], QuantifierKind::Lazy),
        Some(b'+') if bytes.len() > 1 => (&text[..text.len() - 1], QuantifierKind::Possessive),
        _ => (text, QuantifierKind::Greedy),
    };
    match body.as_bytes()[0] {
        b'*' => (0, None, kind),
        b'+' => (1, None, kind),
        b'?' => (0, Some(1), kind),
        b'{' => {
            let inner = &body[1..body.len() - 1];
            match inner.split_once(',') {
                Some((min, "")) => (min.parse().unwrap_or(0), None, kind),
                Some((min, max)) => (
                    min.parse().unwrap_or(0),
                    Some(max.parse().unwrap_or(0)),
                    kind,
                ),
                None => {
                    let n = inner.parse().unwrap_or(0);
                    (n, Some(n), kind)
                }
            }
        }
        _ => (0, None, kind),
    }
}

/// Merges adjacent un-quantified single-byte `Literal` nodes (and the
/// exploded bytes of a `\Q...\E` run) into one multi-byte `Literal`, so the
/// automata translator doesn't have to special-case byte-by-byte runs.
/// Anything else (a `Quantifier`, a `Group`, ...) passes through unchanged.
fn merge_literal_runs(builder: &mut AstBuilder, items: Vec<NodeId>) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::with_capacity(items.len());
    for id in items {
        if let Node::Literal { span, bytes } = builder.get(id) {
            let (span, bytes) = (*span, bytes.clone());
            if let Some(&prev_id) = out.last() {
                if let Node::Literal {
                    span: prev_span,
                    bytes: prev_bytes,
                } = builder.get(prev_id)
                {
                    if prev_span.end == span.start {
                        let mut merged_bytes = prev_bytes.clone();
                        merged_bytes.extend_from_slice(&bytes);
                        let merged_span = prev_span.cover(span);
                        *out.last_mut().unwrap() = builder.push(Node::Literal {
                            span: merged_span,
                            bytes: merged_bytes,
                        });
                        continue;
                    }
                }
            }
            out.push(id);
        } else {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Ast {
        parse(source, &Config::default()).expect("should parse")
    }

    #[test]
    fn parses_simple_literal_sequence() {
        let ast = parse_ok("/abc/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!("expected Regex root")
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!("expected Sequence pattern")
        };
        // Adjacent literals merge into a single run.
        assert_eq!(children.len(), 1);
        let Node::Literal { bytes, .. } = ast.get(children[0]) else {
            panic!("expected Literal")
        };
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn parses_alternation_and_quantifier() {
        let ast = parse_ok("/a+|b/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Alternation { alternatives, .. } = ast.get(*pattern) else {
            panic!("expected top-level alternation")
        };
        assert_eq!(alternatives.len(), 2);
    }

    #[test]
    fn parses_capturing_group_with_increasing_numbers() {
        let ast = parse_ok("/(a)(b)/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        let numbers: Vec<u32> = children
            .iter()
            .map(|&id| match ast.get(id) {
                Node::Group {
                    group_type: crate::ast::GroupType::Capturing { number },
                    ..
                } => *number,
                other => panic!("expected capturing group, got {other:?}"),
            })
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn parses_non_capturing_group() {
        let ast = parse_ok("/(?:ab)/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        assert!(matches!(
            ast.get(children[0]),
            Node::Group {
                group_type: crate::ast::GroupType::NonCapturing,
                ..
            }
        ));
    }

    #[test]
    fn unterminated_group_is_a_syntax_error() {
        assert!(parse("/(a/", &Config::default()).is_err());
    }

    #[test]
    fn tolerant_mode_recovers_past_a_bad_escape_and_keeps_parsing_next_alternative() {
        // `\kX` is a malformed named backreference (no `<`/`'`/`{`
        // delimiter); strict mode aborts. Tolerant mode records the error,
        // synchronizes to the next `|`, and still parses the `c`
        // alternative that follows (§4.3 "synchronizing at `)` and `|`").
        let config = Config::default();
        assert!(parse(r"/a\kXb|c/", &config).is_err());

        let (ast, errors) =
            parse_tolerant(r"/a\kXb|c/", &config).expect("tolerant parse should not abort");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_recoverable());

        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Alternation { alternatives, .. } = ast.get(*pattern) else {
            panic!("expected top-level alternation")
        };
        assert_eq!(alternatives.len(), 2);
        let Node::Sequence { children: second, .. } = ast.get(alternatives[1]) else {
            panic!()
        };
        let Node::Literal { bytes, .. } = ast.get(second[0]) else {
            panic!("expected Literal")
        };
        assert_eq!(bytes, b"c");
    }

    #[test]
    fn tolerant_mode_still_aborts_on_recursion_limit() {
        let pattern = "(".repeat(2000) + &")".repeat(2000);
        let source = format!("/{pattern}/");
        let config = Config::default();
        let err = parse_tolerant(&source, &config).unwrap_err();
        assert!(matches!(err, Error::RecursionLimit { .. }));
    }

    #[test]
    fn deeply_nested_groups_hit_recursion_limit() {
        let pattern = "(".repeat(2000) + &")".repeat(2000);
        let source = format!("/{pattern}/");
        let config = Config::default();
        let err = parse(&source, &config).unwrap_err();
        assert!(matches!(err, Error::RecursionLimit { .. }));
    }
}
