//! Semantic validator (`spec.md` §4.5).
//!
//! Walks the parsed [`Ast`] with the [`Visitor`] framework (§4.4) and
//! collects [`Diagnostic`]s into a [`ValidationResult`]; unlike the parser's
//! own structural failures, nothing here is ever raised as an [`Error`](crate::error::Error)
//! (§7's propagation policy). Grounded on
//! `plotnik-lib::analyze::validation::anchors`'s `Visitor`-based validation
//! pass shape: a struct overriding only the node kinds it cares about and
//! reporting through a diagnostics sink, deferring everything else to the
//! default walk.

use std::collections::HashMap;

use crate::ast::{
    Ast, AssertionKind, ConditionKind, GroupType, Node, NodeId, QuantifierKind, Reference, Visitor,
};
use crate::config::Config;
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::ErrorCode;
use crate::span::ByteSpan;
use pcrelens_core::Symbol;

/// Structured output of a validation pass: a flat list of findings.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// `true` when nothing at `Error` severity or above was found.
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(|d| d.severity >= Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Error)
    }
}

/// Runs every §4.5 check over `ast` and returns the collected findings.
pub fn validate(ast: &Ast, source: &str, config: &Config) -> ValidationResult {
    let mut collector = NameCollector::default();
    ast.accept(ast.root(), &mut collector);

    let mut validator = Validator {
        source,
        config,
        names: &collector,
        diagnostics: Vec::new(),
    };
    ast.accept(ast.root(), &mut validator);

    if config.runtime_pcre_validation {
        runtime_probe(source, &mut validator.diagnostics);
    }

    ValidationResult {
        diagnostics: validator.diagnostics,
    }
}

/// A declared named capture group: its number and the span of its name.
#[derive(Debug, Clone, Copy)]
struct DeclaredGroup {
    number: u32,
    span: ByteSpan,
}

/// First pass: walks the whole tree recording every declared group name and
/// the highest capture number reached, so the second pass can resolve
/// backreferences/subroutines and flag duplicate/undefined names without
/// re-walking.
#[derive(Default)]
struct NameCollector {
    /// Every `(name, occurrence)` pair in declaration order, including
    /// duplicates.
    declared: Vec<(Symbol, DeclaredGroup)>,
    max_group_number: u32,
}

impl NameCollector {
    fn name_strings<'a>(&'a self, ast: &'a Ast) -> Vec<&'a str> {
        self.declared.iter().map(|(s, _)| ast.resolve(*s)).collect()
    }
}

impl Visitor<()> for NameCollector {
    fn default_return(&self) {}

    fn visit_group(&mut self, ast: &Ast, id: NodeId) {
        if let Node::Group { group_type, span, .. } = ast.get(id) {
            match group_type {
                GroupType::Named { number, name } => {
                    self.max_group_number = self.max_group_number.max(*number);
                    self.declared.push((
                        *name,
                        DeclaredGroup {
                            number: *number,
                            span: *span,
                        },
                    ));
                }
                GroupType::Capturing { number } => {
                    self.max_group_number = self.max_group_number.max(*number);
                }
                _ => {}
            }
        }
        crate::ast::visitor::walk_group(self, ast, id);
    }
}

struct Validator<'a> {
    source: &'a str,
    config: &'a Config,
    names: &'a NameCollector,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    fn push(&mut self, severity: Severity, code: &'static str, span: ByteSpan, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(severity, ErrorCode(code), span, message));
    }

    fn push_hint(
        &mut self,
        severity: Severity,
        code: &'static str,
        span: ByteSpan,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.diagnostics.push(
            Diagnostic::new(severity, ErrorCode(code), span, message).with_hint(hint),
        );
    }

    /// Checks a group/subroutine name reference against the declared set,
    /// suggesting the nearest declared name when it's off by one edit
    /// (`strsim`, the same tool the pack reaches for in
    /// `Brahmastra-Labs-logicaffeine/src/suggest.rs`).
    fn check_name_reference(&mut self, ast: &Ast, name: Symbol, span: ByteSpan) {
        let resolved = ast.resolve(name);
        if self.names.declared.iter().any(|(s, _)| *s == name) {
            return;
        }
        let suggestion = self
            .names
            .name_strings(ast)
            .into_iter()
            .filter(|candidate| strsim::levenshtein(resolved, candidate) == 1)
            .min_by_key(|candidate| candidate.len());
        match suggestion {
            Some(candidate) => self.push_hint(
                Severity::Error,
                "regex.semantic.undefined-group-name",
                span,
                format!("reference to undefined group name `{resolved}`"),
                format!("did you mean `{candidate}`?"),
            ),
            None => self.push(
                Severity::Error,
                "regex.semantic.undefined-group-name",
                span,
                format!("reference to undefined group name `{resolved}`"),
            ),
        }
    }

    fn check_number_reference(&mut self, n: u32, span: ByteSpan) {
        if n == 0 || n > self.names.max_group_number {
            self.push(
                Severity::Error,
                "regex.semantic.undefined-group-number",
                span,
                format!("reference to non-existent group number {n}"),
            );
        }
    }

    fn check_quantifier_target(&mut self, ast: &Ast, target: NodeId, span: ByteSpan) {
        let empty_target = match ast.get(target) {
            Node::Anchor { .. } | Node::Assertion { .. } | Node::Keep { .. } => true,
            Node::Group { child, .. } => matches!(
                ast.get(*child),
                Node::Sequence { children, .. } if children.is_empty()
            ),
            Node::Sequence { children, .. } => children.is_empty(),
            _ => false,
        };
        if empty_target {
            self.push(
                Severity::Error,
                "regex.semantic.quantifier-without-target",
                span,
                "quantifier applied to a zero-width assertion or empty group has no effect",
            );
        }
    }

    fn check_quantifier_bounds(&mut self, span: ByteSpan, min: u32, max: Option<u32>, kind: QuantifierKind) {
        if let Some(max) = max {
            if max < min {
                self.push(
                    Severity::Error,
                    "regex.semantic.invalid-quantifier-bounds",
                    span,
                    format!("quantifier minimum {min} exceeds maximum {max}"),
                );
                return;
            }
            if min == 0 && max == 0 {
                self.push(
                    Severity::Info,
                    "regex.semantic.zero-repeat-quantifier",
                    span,
                    "{0,0} always matches the empty string",
                );
            }
        }
        let _ = kind;
    }

    fn check_inline_flags(&mut self, set: &[u8], unset: &[u8], span: ByteSpan) {
        for &b in set {
            if unset.contains(&b) {
                self.push(
                    Severity::Error,
                    "regex.semantic.conflicting-inline-flag",
                    span,
                    format!("flag `{}` is both set and unset in the same scope", b as char),
                );
            }
        }
    }

    fn check_unknown_flags(&mut self, unknown: &[u8], span: ByteSpan) {
        for &b in unknown {
            self.push(
                Severity::Warning,
                "regex.semantic.unknown-flag",
                span,
                format!("unrecognized flag byte `{}`", b as char),
            );
        }
    }

    fn check_duplicate_names(&mut self, ast: &Ast, allow_dup_names: bool) {
        if allow_dup_names {
            return;
        }
        let mut seen: HashMap<Symbol, DeclaredGroup> = HashMap::new();
        for (name, occ) in &self.names.declared {
            if let Some(first) = seen.get(name) {
                let _ = first;
                self.push(
                    Severity::Error,
                    "regex.semantic.duplicate-group-name",
                    occ.span,
                    format!("duplicate capture group name `{}`", ast.resolve(*name)),
                );
            } else {
                seen.insert(*name, *occ);
            }
        }
    }

    fn check_lookbehind(&mut self, ast: &Ast, child: NodeId, span: ByteSpan) {
        let (_, max) = subpattern_length(ast, child);
        match max {
            None => {
                let culprit = find_unbounded_span(ast, child).unwrap_or(span);
                self.push(
                    Severity::Error,
                    "regex.semantic.unbounded-lookbehind",
                    culprit,
                    "lookbehind subpattern has no bounded maximum length",
                )
            }
            Some(len) if len > self.config.max_lookbehind_length => self.push(
                Severity::Error,
                "regex.semantic.lookbehind-too-long",
                span,
                format!(
                    "lookbehind subpattern may match up to {len} bytes, exceeding the configured limit of {}",
                    self.config.max_lookbehind_length
                ),
            ),
            Some(_) => {}
        }
    }

    fn check_class_range(&mut self, ast: &Ast, start: NodeId, end: NodeId, span: ByteSpan) {
        let (Some(lo), Some(hi)) = (atom_code_point(ast, start), atom_code_point(ast, end)) else {
            return;
        };
        if lo > hi {
            self.push(
                Severity::Error,
                "regex.semantic.empty-char-range",
                span,
                format!("character range is empty: start {lo:#x} is greater than end {hi:#x}"),
            );
            return;
        }
        if crosses_ascii_case_boundary(lo, hi) {
            self.push(
                Severity::Warning,
                "regex.semantic.case-boundary-range",
                span,
                "character range crosses an ASCII case boundary and includes unintended punctuation",
            );
        }
    }

    fn check_version_condition(&mut self, operator_ge: bool, major: u16, minor: u16, span: ByteSpan) {
        let target = self.config.target_pcre_version;
        let satisfied = if operator_ge {
            (major, minor) <= (target.major, target.minor)
        } else {
            (major, minor) == (target.major, target.minor)
        };
        self.push(
            Severity::Info,
            "regex.semantic.version-gate",
            span,
            format!(
                "version condition evaluates to {satisfied} against target PCRE2 {}.{}",
                target.major, target.minor
            ),
        );
    }
}

impl<'a> Visitor<()> for Validator<'a> {
    fn default_return(&self) {}

    fn visit_regex(&mut self, ast: &Ast, id: NodeId) {
        if let Node::Regex { flags, .. } = ast.get(id) {
            let span = ast.span(id);
            self.check_unknown_flags(&flags.unknown, span);
        }
        self.check_duplicate_names(ast, matches!(ast.get(id), Node::Regex { flags, .. } if flags.allow_dup_names));
        crate::ast::visitor::walk_regex(self, ast, id)
    }

    fn visit_group(&mut self, ast: &Ast, id: NodeId) {
        let span = ast.span(id);
        if let Node::Group { group_type, child, .. } = ast.get(id) {
            match group_type {
                GroupType::LookbehindPositive | GroupType::LookbehindNegative => {
                    self.check_lookbehind(ast, *child, span);
                }
                GroupType::InlineFlags { set, unset } => {
                    self.check_inline_flags(&set.0, &unset.0, span);
                }
                _ => {}
            }
        }
        crate::ast::visitor::walk_group(self, ast, id)
    }

    fn visit_quantifier(&mut self, ast: &Ast, id: NodeId) {
        let span = ast.span(id);
        if let Node::Quantifier { target, min, max, kind } = ast.get(id) {
            self.check_quantifier_target(ast, *target, span);
            self.check_quantifier_bounds(span, *min, *max, *kind);
        }
        crate::ast::visitor::walk_quantifier(self, ast, id)
    }

    fn visit_range(&mut self, ast: &Ast, id: NodeId) {
        let span = ast.span(id);
        if let Node::Range { start, end, .. } = ast.get(id) {
            self.check_class_range(ast, *start, *end, span);
        }
        crate::ast::visitor::walk_range(self, ast, id)
    }

    fn visit_backref(&mut self, ast: &Ast, id: NodeId) {
        let span = ast.span(id);
        if let Node::Backref { reference, .. } = ast.get(id) {
            match reference {
                Reference::Name(name) => self.check_name_reference(ast, *name, span),
                Reference::Number(n) => self.check_number_reference(*n, span),
                Reference::Relative(_) => {}
            }
        }
    }

    fn visit_subroutine(&mut self, ast: &Ast, id: NodeId) {
        let span = ast.span(id);
        if let Node::Subroutine { reference, .. } = ast.get(id) {
            match reference {
                Reference::Name(name) => self.check_name_reference(ast, *name, span),
                Reference::Number(n) if *n != 0 => self.check_number_reference(*n, span),
                _ => {}
            }
        }
    }

    fn visit_conditional(&mut self, ast: &Ast, id: NodeId) {
        let span = ast.span(id);
        if let Node::Conditional { condition, .. } = ast.get(id) {
            match condition {
                ConditionKind::GroupName(name) => self.check_name_reference(ast, *name, span),
                ConditionKind::GroupNumber(n) => self.check_number_reference(*n, span),
                _ => {}
            }
        }
        crate::ast::visitor::walk_conditional(self, ast, id)
    }

    fn visit_version_condition(&mut self, ast: &Ast, id: NodeId) {
        let span = ast.span(id);
        if let Node::VersionCondition { operator, major, minor } = ast.get(id) {
            let ge = matches!(operator, crate::ast::VersionOp::GreaterEq);
            self.check_version_condition(ge, *major, *minor, span);
        }
    }
}

/// Numeric value of a character-class range endpoint, for range-order and
/// case-boundary checks.
fn atom_code_point(ast: &Ast, id: NodeId) -> Option<u32> {
    match ast.get(id) {
        Node::Literal { bytes, .. } if bytes.len() == 1 => Some(bytes[0] as u32),
        Node::CharLiteral { code_point, .. } => Some(*code_point),
        _ => None,
    }
}

fn crosses_ascii_case_boundary(lo: u32, hi: u32) -> bool {
    (b'A' as u32..=b'Z' as u32).contains(&lo) && (b'a' as u32..=b'z' as u32).contains(&hi)
}

/// Conservative min/max consumed-byte length of a subpattern, used to bound
/// lookbehind length (§4.5). Any construct whose length can't be bounded
/// statically (backreferences, subroutines, recursion, `(*VERB)`s) makes the
/// whole subpattern unbounded; this is deliberately pessimistic rather than
/// attempting full fixed-point analysis of subroutine call graphs.
fn subpattern_length(ast: &Ast, id: NodeId) -> (u32, Option<u32>) {
    match ast.get(id) {
        Node::Literal { bytes, .. } => (bytes.len() as u32, Some(bytes.len() as u32)),
        Node::CharLiteral { .. } | Node::CharType { .. } | Node::Dot { .. } => (1, Some(1)),
        Node::CharClass { .. } | Node::PosixClass { .. } | Node::UnicodeProp { .. } => (1, Some(1)),
        Node::Anchor { .. } | Node::Assertion { .. } | Node::Keep { .. } | Node::Comment { .. } => {
            (0, Some(0))
        }
        Node::Sequence { children, .. } => children.iter().fold((0, Some(0)), |(amin, amax), &c| {
            let (cmin, cmax) = subpattern_length(ast, c);
            (amin + cmin, amax.zip(cmax).map(|(a, b)| a + b))
        }),
        Node::Alternation { alternatives, .. } => {
            let lengths: Vec<_> = alternatives.iter().map(|&a| subpattern_length(ast, a)).collect();
            let min = lengths.iter().map(|(mn, _)| *mn).min().unwrap_or(0);
            let max = lengths
                .iter()
                .try_fold(0u32, |acc, (_, mx)| mx.map(|m| acc.max(m)));
            (min, max)
        }
        Node::Group {
            group_type: GroupType::LookaheadPositive | GroupType::LookaheadNegative,
            ..
        } => (0, Some(0)),
        Node::Group {
            group_type: GroupType::LookbehindPositive | GroupType::LookbehindNegative,
            ..
        } => (0, Some(0)),
        Node::Group { child, .. } => subpattern_length(ast, *child),
        Node::Quantifier { target, min, max, .. } => {
            let (cmin, cmax) = subpattern_length(ast, *target);
            let new_min = cmin * min;
            let new_max = max.and_then(|m| cmax.map(|c| c * m));
            (new_min, new_max)
        }
        // Backreferences, subroutines, conditionals, verbs, script runs, and
        // recursion all have dynamic or unknown length.
        _ => (0, None),
    }
}

/// Locates the first variable-length subexpression responsible for
/// `subpattern_length` returning an unbounded max, so diagnostics can point
/// at e.g. the `a+` in `(?<=a+)` rather than the enclosing group's `(?<=`
/// (§8 scenario 2). Mirrors `subpattern_length`'s own recursion, descending
/// into the first child whose own max is unbounded.
fn find_unbounded_span(ast: &Ast, id: NodeId) -> Option<ByteSpan> {
    match ast.get(id) {
        Node::Sequence { children, .. } => children
            .iter()
            .find(|&&c| subpattern_length(ast, c).1.is_none())
            .and_then(|&c| find_unbounded_span(ast, c)),
        Node::Alternation { alternatives, .. } => alternatives
            .iter()
            .find(|&&a| subpattern_length(ast, a).1.is_none())
            .and_then(|&a| find_unbounded_span(ast, a)),
        Node::Group { child, .. } => find_unbounded_span(ast, *child),
        _ => Some(ast.span(id)),
    }
}

/// Optional runtime-PCRE-probe hook (§6's `runtimePcreValidation` option).
///
/// No PCRE2 binding crate is part of this workspace's dependency stack (see
/// `DESIGN.md`'s Open Question resolutions), so enabling this option is
/// accepted but currently a no-op extension point: a future build could wire
/// it to an actual PCRE2 library to catch engine-specific rejections this
/// static validator can't see.
fn runtime_probe(_source: &str, _diagnostics: &mut Vec<Diagnostic>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn validate_source(source: &str) -> ValidationResult {
        let config = Config::default();
        let ast = parse(source, &config).expect("should parse");
        validate(&ast, source, &config)
    }

    #[test]
    fn duplicate_group_names_are_flagged() {
        let result = validate_source("/(?<x>a)(?<x>b)/");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.semantic.duplicate-group-name")));
    }

    #[test]
    fn duplicate_group_names_allowed_with_j_flag() {
        let result = validate_source("/(?<x>a)(?<x>b)/J");
        assert!(!result
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.semantic.duplicate-group-name")));
    }

    #[test]
    fn undefined_named_backref_suggests_closest_name() {
        let result = validate_source("/(?<word>a)\\k<wrd>/");
        let diag = result
            .diagnostics
            .iter()
            .find(|d| d.code == ErrorCode("regex.semantic.undefined-group-name"))
            .expect("expected undefined-group-name diagnostic");
        assert!(diag.hint.as_deref().unwrap_or("").contains("word"));
    }

    #[test]
    fn unbounded_lookbehind_is_flagged() {
        let result = validate_source("/(?<=a+)b/");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.semantic.unbounded-lookbehind")));
    }

    #[test]
    fn unbounded_lookbehind_span_points_at_the_offending_quantifier() {
        // `/(?<=a+)b/`: byte 5 is the `a` of `a+`, the construct actually
        // responsible for the unbounded length, not byte 1 (the group's
        // own `(`).
        let result = validate_source("/(?<=a+)b/");
        let finding = result
            .diagnostics
            .iter()
            .find(|d| d.code == ErrorCode("regex.semantic.unbounded-lookbehind"))
            .expect("expected an unbounded-lookbehind finding");
        assert_eq!(finding.span.start, 5);
    }

    #[test]
    fn fixed_length_lookbehind_is_accepted() {
        let result = validate_source("/(?<=abc)d/");
        assert!(!result
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.semantic.unbounded-lookbehind")));
    }

    #[test]
    fn invalid_quantifier_bounds_are_flagged() {
        let result = validate_source("/a{3,1}/");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.semantic.invalid-quantifier-bounds")));
    }

    #[test]
    fn case_boundary_range_is_a_warning() {
        let result = validate_source("/[A-z]/");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.semantic.case-boundary-range")));
    }

    #[test]
    fn quantifier_on_anchor_has_no_target() {
        let result = validate_source("/^*a/");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.semantic.quantifier-without-target")));
    }
}
