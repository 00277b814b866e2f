//! Group-modifier dispatch after `(?` (`spec.md` §3, §4.3): non-capturing,
//! atomic, branch-reset, lookaround, named capture, backreference/subroutine
//! syntaxes, inline flags, conditionals, callouts — plus bare PCRE verbs
//! `(*NAME...)`/`(*NAME:arg)`, which share the raw-byte dispatch style
//! because the tokenizer never special-cases them (`DESIGN.md`, "Open design
//! choice").
//!
//! None of this goes through tokens: the tokenizer hands back a bare
//! `GroupModifierOpen` for `(?` and leaves its cursor right after the `?`,
//! and this module reads the dispatch byte(s) directly from the source via
//! [`crate::lexer::Tokenizer::seek`]/`pos`/`byte_at`, repositioning the
//! tokenizer before resuming normal token-based parsing for the group body.
//! Every `)` still becomes an ordinary `GroupClose` token regardless of
//! semantic nesting, so closing a group never needs manual paren-depth
//! bookkeeping.

use super::Parser;
use crate::ast::{
    CalloutId, ConditionKind, FlagDelta, GroupType, Node, NodeId, Reference, ScriptRunKind,
    SubroutineSyntax, VersionOp,
};
use crate::error::{Error, Result};
use crate::lexer::TokenKind;
use crate::span::ByteSpan;

impl<'s> Parser<'s> {
    /// Entered with the tokenizer positioned right after `(?`.
    pub(super) fn parse_group_modifier(&mut self, open_start: u32) -> Result<NodeId> {
        let p = self.tok.pos();
        let b0 = self.byte(p);
        match b0 {
            Some(b':') => {
                self.tok.seek(p + 1);
                self.parse_group_body(open_start, GroupType::NonCapturing)
            }
            Some(b'>') => {
                self.tok.seek(p + 1);
                self.parse_group_body(open_start, GroupType::Atomic)
            }
            Some(b'|') => {
                self.tok.seek(p + 1);
                self.parse_branch_reset(open_start)
            }
            Some(b'=') => {
                self.tok.seek(p + 1);
                self.parse_group_body(open_start, GroupType::LookaheadPositive)
            }
            Some(b'!') => {
                self.tok.seek(p + 1);
                self.parse_group_body(open_start, GroupType::LookaheadNegative)
            }
            Some(b'<') => match self.byte(p + 1) {
                Some(b'=') => {
                    self.tok.seek(p + 2);
                    self.parse_group_body(open_start, GroupType::LookbehindPositive)
                }
                Some(b'!') => {
                    self.tok.seek(p + 2);
                    self.parse_group_body(open_start, GroupType::LookbehindNegative)
                }
                _ => self.parse_named_capture(open_start, p, b'<', b'>'),
            },
            Some(b'\'') => self.parse_named_capture(open_start, p, b'\'', b'\''),
            Some(b'P') => match self.byte(p + 1) {
                Some(b'<') => self.parse_named_capture(open_start, p + 1, b'<', b'>'),
                Some(b'\'') => self.parse_named_capture(open_start, p + 1, b'\'', b'\''),
                Some(b'=') => self.parse_p_backref(open_start, p + 2),
                Some(b'>') => self.parse_subroutine_by_name(open_start, p + 2, SubroutineSyntax::NamedGroup),
                _ => Err(self.err(open_start, "malformed `(?P...)` group")),
            },
            Some(b'&') => self.parse_subroutine_by_name(open_start, p + 1, SubroutineSyntax::NamedGroup),
            Some(b'(') => self.parse_conditional(open_start, p),
            Some(b'R') if self.byte(p + 1) == Some(b')') => {
                self.tok.seek(p + 1);
                let close = self.expect_group_close()?;
                Ok(self.builder.push(Node::Subroutine {
                    span: ByteSpan::new(open_start, close),
                    reference: Reference::Number(0),
                    syntax: SubroutineSyntax::WholePattern,
                }))
            }
            Some(b'C') => self.parse_callout(open_start, p),
            Some(b) if b == b'-' || b == b'+' || b.is_ascii_digit() => {
                self.parse_numbered_subroutine(open_start, p)
            }
            Some(b) if is_inline_flag_start(b) => self.parse_inline_flags(open_start, p),
            _ => Err(self.err(open_start, "unrecognized `(?...)` group modifier")),
        }
    }

    fn byte(&self, pos: usize) -> Option<u8> {
        self.source.as_bytes().get(pos).copied()
    }

    fn err(&self, pos: u32, message: &str) -> Error {
        Error::syntax(self.source, ByteSpan::empty_at(pos), message.to_string())
    }

    fn scan_name(&self, start: usize, close: u8) -> (String, usize) {
        let bytes = self.source.as_bytes();
        let mut q = start;
        while bytes.get(q).is_some_and(|&b| b != close) {
            q += 1;
        }
        (self.source[start..q].to_string(), q)
    }

    fn parse_group_body(&mut self, open_start: u32, group_type: GroupType) -> Result<NodeId> {
        let child = self.parse_alternation()?;
        let close = self.expect_group_close()?;
        Ok(self.builder.push(Node::Group {
            span: ByteSpan::new(open_start, close),
            group_type,
            child,
        }))
    }

    fn parse_named_capture(
        &mut self,
        open_start: u32,
        delim_pos: usize,
        _open_delim: u8,
        close_delim: u8,
    ) -> Result<NodeId> {
        let (name, name_end) = self.scan_name(delim_pos + 1, close_delim);
        let number = self.next_group_number();
        let name_sym = self.builder.intern(&name);
        self.tok.seek(name_end + 1);
        let child = self.parse_alternation()?;
        let close = self.expect_group_close()?;
        Ok(self.builder.push(Node::Group {
            span: ByteSpan::new(open_start, close),
            group_type: GroupType::Named {
                number,
                name: name_sym,
            },
            child,
        }))
    }

    /// `(?|a|b|c)`: each alternative restarts capture numbering from the
    /// count at entry; the branch's overall numbering advances to the
    /// highest count reached by any alternative.
    fn parse_branch_reset(&mut self, open_start: u32) -> Result<NodeId> {
        let saved = self.group_counter;
        let mut alts = Vec::new();
        let mut high_water = saved;
        loop {
            self.group_counter = saved;
            alts.push(self.parse_sequence()?);
            high_water = high_water.max(self.group_counter);
            if self.at(TokenKind::Pipe) {
                self.bump();
                continue;
            }
            break;
        }
        self.group_counter = high_water;
        let close = self.expect_group_close()?;
        let inner_span = alts
            .iter()
            .map(|&id| self.builder.span(id))
            .reduce(ByteSpan::cover)
            .unwrap();
        let child = if alts.len() == 1 {
            alts[0]
        } else {
            self.builder.push(Node::Alternation {
                span: inner_span,
                alternatives: alts,
            })
        };
        Ok(self.builder.push(Node::Group {
            span: ByteSpan::new(open_start, close),
            group_type: GroupType::BranchReset,
            child,
        }))
    }

    /// `(?i-x:...)`, `(?^i:...)`, or the scope-to-end-of-group form
    /// `(?i-x)` with no `:` body.
    fn parse_inline_flags(&mut self, open_start: u32, dispatch_pos: usize) -> Result<NodeId> {
        let bytes = self.source.as_bytes();
        let mut p = dispatch_pos;
        let reset = bytes.get(p) == Some(&b'^');
        if reset {
            p += 1;
        }
        let mut set = Vec::new();
        while bytes.get(p).is_some_and(|&b| b != b'-' && b != b':' && b != b')') {
            set.push(bytes[p]);
            p += 1;
        }
        let mut unset = Vec::new();
        if bytes.get(p) == Some(&b'-') {
            p += 1;
            while bytes.get(p).is_some_and(|&b| b != b':' && b != b')') {
                unset.push(bytes[p]);
                p += 1;
            }
        }
        let group_type = GroupType::InlineFlags {
            set: FlagDelta(set.clone()),
            unset: FlagDelta(unset.clone()),
        };

        let prev_extended = self.tok.extended_mode();
        let mut new_extended = if reset { false } else { prev_extended };
        if set.contains(&b'x') {
            new_extended = true;
        }
        if unset.contains(&b'x') {
            new_extended = false;
        }

        if bytes.get(p) == Some(&b':') {
            self.tok.seek(p + 1);
            self.tok.set_extended_mode(new_extended);
            let child = self.parse_alternation()?;
            self.tok.set_extended_mode(prev_extended);
            let close = self.expect_group_close()?;
            return Ok(self.builder.push(Node::Group {
                span: ByteSpan::new(open_start, close),
                group_type,
                child,
            }));
        }

        if bytes.get(p) != Some(&b')') {
            return Err(self.err(open_start, "malformed inline-flags group"));
        }
        let close_end = p as u32 + 1;
        self.tok.seek(p + 1);
        self.tok.set_extended_mode(new_extended);
        // A flag-scope marker with no body: represented as a `Group`
        // wrapping an empty `Sequence` so the visitor can still observe the
        // flag change when walking the enclosing alternative.
        let child = self.builder.push(Node::Sequence {
            span: ByteSpan::empty_at(close_end),
            children: vec![],
        });
        Ok(self.builder.push(Node::Group {
            span: ByteSpan::new(open_start, close_end),
            group_type,
            child,
        }))
    }

    fn parse_p_backref(&mut self, open_start: u32, name_start: usize) -> Result<NodeId> {
        let (name, name_end) = self.scan_name(name_start, b')');
        let name_sym = self.builder.intern(&name);
        self.tok.seek(name_end + 1);
        Ok(self.builder.push(Node::Backref {
            span: ByteSpan::new(open_start, name_end as u32 + 1),
            reference: Reference::Name(name_sym),
        }))
    }

    fn parse_subroutine_by_name(
        &mut self,
        open_start: u32,
        name_start: usize,
        syntax: SubroutineSyntax,
    ) -> Result<NodeId> {
        let (name, name_end) = self.scan_name(name_start, b')');
        let name_sym = self.builder.intern(&name);
        self.tok.seek(name_end + 1);
        Ok(self.builder.push(Node::Subroutine {
            span: ByteSpan::new(open_start, name_end as u32 + 1),
            reference: Reference::Name(name_sym),
            syntax,
        }))
    }

    /// `(?1)`, `(?-1)`, `(?+1)`.
    fn parse_numbered_subroutine(&mut self, open_start: u32, dispatch_pos: usize) -> Result<NodeId> {
        let bytes = self.source.as_bytes();
        let mut q = dispatch_pos;
        let relative = matches!(bytes.get(q), Some(b'-') | Some(b'+'));
        let negative = bytes.get(q) == Some(&b'-');
        if relative {
            q += 1;
        }
        let digits_start = q;
        while bytes.get(q).is_some_and(u8::is_ascii_digit) {
            q += 1;
        }
        if q == digits_start {
            return Err(self.err(open_start, "malformed numbered group reference"));
        }
        let n: i32 = self.source[digits_start..q].parse().unwrap_or(0);
        self.tok.seek(q);
        let close = self.expect_group_close()?;
        let reference = if relative {
            Reference::Relative(if negative { -n } else { n })
        } else {
            Reference::Number(n as u32)
        };
        Ok(self.builder.push(Node::Subroutine {
            span: ByteSpan::new(open_start, close),
            reference,
            syntax: SubroutineSyntax::RelativeOrNumberedGroup,
        }))
    }

    /// `(?C)`, `(?C1)`, `(?C"arg")`.
    fn parse_callout(&mut self, open_start: u32, dispatch_pos: usize) -> Result<NodeId> {
        let bytes = self.source.as_bytes();
        let mut q = dispatch_pos + 1;
        let id = if bytes.get(q).is_some_and(u8::is_ascii_digit) {
            let start = q;
            while bytes.get(q).is_some_and(u8::is_ascii_digit) {
                q += 1;
            }
            CalloutId::Numeric(self.source[start..q].parse().unwrap_or(0))
        } else if bytes.get(q) == Some(&b'"') {
            q += 1;
            let (arg, end) = self.scan_name(q, b'"');
            q = end + 1;
            CalloutId::StringArg(self.builder.intern(&arg))
        } else {
            CalloutId::Numeric(0)
        };
        self.tok.seek(q);
        let close = self.expect_group_close()?;
        Ok(self.builder.push(Node::Callout {
            span: ByteSpan::new(open_start, close),
            id,
        }))
    }

    /// `(?(cond)yes|no)`, including the inline-assertion condition
    /// `(?(?=foo)yes|no)`, the named-recursion predicate `(?(R&name)...)`,
    /// and `(?(DEFINE)...)` blocks (represented as a bare `Define` node,
    /// not a `Conditional`).
    fn parse_conditional(&mut self, open_start: u32, dispatch_pos: usize) -> Result<NodeId> {
        let cond_open = dispatch_pos; // points at the condition's own '('
        let p = cond_open + 1;
        let bytes = self.source.as_bytes();

        if self.source[p..].starts_with("DEFINE)") {
            self.tok.seek(p + "DEFINE)".len());
            let content = self.parse_alternation()?;
            let close = self.expect_group_close()?;
            return Ok(self.builder.push(Node::Define {
                span: ByteSpan::new(open_start, close),
                content,
            }));
        }

        if self.source[p..].len() >= 7 && self.source[p..p + 7].eq_ignore_ascii_case("VERSION") {
            return self.parse_version_conditional(open_start, p);
        }

        let condition = if bytes.get(p) == Some(&b'?') {
            self.tok.seek(p + 1);
            self.parse_assertion_condition(p)?
        } else if bytes.get(p) == Some(&b'R') {
            self.parse_recursion_condition(p)?
        } else if bytes.get(p).is_some_and(u8::is_ascii_digit) {
            let (text, end) = self.scan_name(p, b')');
            self.tok.seek(end + 1);
            ConditionKind::GroupNumber(text.parse().unwrap_or(0))
        } else if bytes.get(p) == Some(&b'<') || bytes.get(p) == Some(&b'\'') {
            let close_delim = if bytes[p] == b'<' { b'>' } else { b'\'' };
            let (name, end) = self.scan_name(p + 1, close_delim);
            self.tok.seek(end + 2); // name's closer, then the condition's ')'
            ConditionKind::GroupName(self.builder.intern(&name))
        } else {
            let (name, end) = self.scan_name(p, b')');
            self.tok.seek(end + 1);
            ConditionKind::GroupName(self.builder.intern(&name))
        };

        let yes_branch = self.parse_sequence()?;
        let no_branch = if self.at(TokenKind::Pipe) {
            self.bump();
            Some(self.parse_sequence()?)
        } else {
            None
        };
        let close = self.expect_group_close()?;
        Ok(self.builder.push(Node::Conditional {
            span: ByteSpan::new(open_start, close),
            condition,
            yes_branch,
            no_branch,
        }))
    }

    /// Entered with the tokenizer seeked to right after the condition's own
    /// `(?`; parses the nested assertion as an ordinary lookaround `Group`
    /// and consumes its closing `)` itself (the condition has no separate
    /// closing paren of its own beyond the assertion's).
    fn parse_assertion_condition(&mut self, assertion_start: usize) -> Result<ConditionKind> {
        let p = self.tok.pos();
        let bytes = self.source.as_bytes();
        let group_type = match bytes.get(p) {
            Some(b'=') => {
                self.tok.seek(p + 1);
                GroupType::LookaheadPositive
            }
            Some(b'!') => {
                self.tok.seek(p + 1);
                GroupType::LookaheadNegative
            }
            Some(b'<') => match bytes.get(p + 1) {
                Some(b'=') => {
                    self.tok.seek(p + 2);
                    GroupType::LookbehindPositive
                }
                Some(b'!') => {
                    self.tok.seek(p + 2);
                    GroupType::LookbehindNegative
                }
                _ => return Err(self.err(assertion_start as u32, "expected assertion condition")),
            },
            _ => return Err(self.err(assertion_start as u32, "expected assertion condition")),
        };
        let child = self.parse_alternation()?;
        let close = self.expect_group_close()?;
        let node = self.builder.push(Node::Group {
            span: ByteSpan::new(assertion_start as u32, close),
            group_type,
            child,
        });
        Ok(ConditionKind::Assertion(node))
    }

    /// `(?(R)...)`, `(?(R1)...)`, `(?(R&name)...)`.
    fn parse_recursion_condition(&mut self, r_pos: usize) -> Result<ConditionKind> {
        let bytes = self.source.as_bytes();
        let mut q = r_pos + 1;
        let kind = if bytes.get(q) == Some(&b'&') {
            q += 1;
            let (name, end) = self.scan_name(q, b')');
            q = end;
            ConditionKind::RecursionNamed(self.builder.intern(&name))
        } else if bytes.get(q).is_some_and(u8::is_ascii_digit) {
            let start = q;
            while bytes.get(q).is_some_and(u8::is_ascii_digit) {
                q += 1;
            }
            ConditionKind::RecursionNumbered(self.source[start..q].parse().unwrap_or(0))
        } else {
            ConditionKind::RecursionAny
        };
        self.tok.seek(q + 1); // skip the condition's own ')'
        Ok(kind)
    }

    fn parse_version_conditional(&mut self, open_start: u32, version_start: usize) -> Result<NodeId> {
        let bytes = self.source.as_bytes();
        let mut q = version_start + 7; // past "VERSION"
        let operator = if bytes.get(q) == Some(&b'>') && bytes.get(q + 1) == Some(&b'=') {
            q += 2;
            VersionOp::GreaterEq
        } else if bytes.get(q) == Some(&b'=') {
            q += 1;
            VersionOp::Eq
        } else {
            return Err(self.err(open_start, "malformed VERSION condition"));
        };
        let (version_text, end) = self.scan_name(q, b')');
        let (major, minor) = parse_version_number(&version_text);
        let vnode = self.builder.push(Node::VersionCondition {
            span: ByteSpan::new(version_start as u32, end as u32),
            operator,
            major,
            minor,
        });
        self.tok.seek(end + 1);

        let yes_branch = self.parse_sequence()?;
        let no_branch = if self.at(TokenKind::Pipe) {
            self.bump();
            Some(self.parse_sequence()?)
        } else {
            None
        };
        let close = self.expect_group_close()?;
        Ok(self.builder.push(Node::Conditional {
            span: ByteSpan::new(open_start, close),
            condition: ConditionKind::Version(vnode),
            yes_branch,
            no_branch,
        }))
    }

    /// Entered with the tokenizer positioned right after `(*`. Recognizes
    /// `(*script_run:...)`/`(*atomic_script_run:...)` (which wrap a nested
    /// pattern, not a plain string argument) specially; everything else is
    /// `name` optionally followed by `:arg` up to the closing `)`.
    pub(super) fn parse_verb(&mut self, open_start: u32) -> Result<NodeId> {
        let bang_pos = self.tok.pos(); // at the '*'
        let bytes = self.source.as_bytes();
        let name_start = bang_pos + 1;
        let mut q = name_start;
        while bytes.get(q).is_some_and(|&b| b != b':' && b != b'=' && b != b')') {
            q += 1;
        }
        let name = self.source[name_start..q].to_string();
        let name_upper = name.to_ascii_uppercase();

        if (name_upper == "SCRIPT_RUN" || name_upper == "ATOMIC_SCRIPT_RUN")
            && bytes.get(q) == Some(&b':')
        {
            self.tok.seek(q + 1);
            let child = self.parse_alternation()?;
            let close = self.expect_group_close()?;
            let kind = if name_upper == "ATOMIC_SCRIPT_RUN" {
                ScriptRunKind::Atomic
            } else {
                ScriptRunKind::Plain
            };
            return Ok(self.builder.push(Node::ScriptRun {
                span: ByteSpan::new(open_start, close),
                kind,
                child,
            }));
        }

        let (arg, after_arg) = if bytes.get(q) == Some(&b':') {
            let (arg, end) = self.scan_name(q + 1, b')');
            (Some(arg), end)
        } else {
            (None, q)
        };
        let close_end = (after_arg + 1).min(self.source.len()) as u32;
        self.tok.seek(after_arg + 1);
        let span = ByteSpan::new(open_start, close_end);

        let node = if matches!(
            name_upper.as_str(),
            "LIMIT_MATCH" | "LIMIT_RECURSION" | "LIMIT_DEPTH" | "LIMIT_HEAP"
        ) {
            let value: u32 = arg.as_deref().and_then(|a| a.parse().ok()).unwrap_or(0);
            Node::LimitMatch { span, value }
        } else {
            let name_sym = self.builder.intern(&name);
            let arg_sym = arg.as_deref().map(|a| self.builder.intern(a));
            Node::PcreVerb {
                span,
                name: name_sym,
                arg: arg_sym,
            }
        };
        Ok(self.builder.push(node))
    }
}

fn is_inline_flag_start(b: u8) -> bool {
    matches!(
        b,
        b'i' | b'm' | b's' | b'x' | b'U' | b'J' | b'X' | b'n' | b'u' | b'A' | b'D' | b'^'
    )
}

/// Parses `"10"`, `"10.34"` into `(major, minor)`.
fn parse_version_number(text: &str) -> (u16, u16) {
    match text.split_once('.') {
        Some((maj, min)) => (maj.parse().unwrap_or(0), min.parse().unwrap_or(0)),
        None => (text.parse().unwrap_or(0), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn parse_ok(source: &str) -> crate::ast::Ast {
        super::super::parse(source, &Config::default()).expect("should parse")
    }

    #[test]
    fn named_capture_angle_brackets() {
        let ast = parse_ok("/(?<word>\\w+)/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        match ast.get(children[0]) {
            Node::Group {
                group_type: GroupType::Named { number, name },
                ..
            } => {
                assert_eq!(*number, 1);
                assert_eq!(ast.resolve(*name), "word");
            }
            other => panic!("expected named group, got {other:?}"),
        }
    }

    #[test]
    fn lookahead_and_lookbehind() {
        let ast = parse_ok("/(?=a)(?<!b)/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        assert!(matches!(
            ast.get(children[0]),
            Node::Group {
                group_type: GroupType::LookaheadPositive,
                ..
            }
        ));
        assert!(matches!(
            ast.get(children[1]),
            Node::Group {
                group_type: GroupType::LookbehindNegative,
                ..
            }
        ));
    }

    #[test]
    fn conditional_on_group_number() {
        let ast = parse_ok("/(a)(?(1)b|c)/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        assert!(matches!(
            ast.get(children[1]),
            Node::Conditional {
                condition: ConditionKind::GroupNumber(1),
                no_branch: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn conditional_on_inline_assertion() {
        let ast = parse_ok("/(?(?=a)b|c)/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        assert!(matches!(
            ast.get(children[0]),
            Node::Conditional {
                condition: ConditionKind::Assertion(_),
                ..
            }
        ));
    }

    #[test]
    fn define_block() {
        let ast = parse_ok("/(?(DEFINE)(?<x>a))/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        assert!(matches!(ast.get(children[0]), Node::Define { .. }));
    }

    #[test]
    fn bare_verb_and_limit_match() {
        let ast = parse_ok("/(*LIMIT_MATCH=10)a/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        assert!(matches!(
            ast.get(children[0]),
            Node::PcreVerb { .. } | Node::LimitMatch { .. }
        ));
    }

    #[test]
    fn script_run_wraps_nested_pattern() {
        let ast = parse_ok("/(*script_run:abc)/");
        let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
            panic!()
        };
        let Node::Sequence { children, .. } = ast.get(*pattern) else {
            panic!()
        };
        assert!(matches!(
            ast.get(children[0]),
            Node::ScriptRun {
                kind: ScriptRunKind::Plain,
                ..
            }
        ));
    }
}
