//! Catastrophic-backtracking (ReDoS) risk analysis (`spec.md` §4.6).
//!
//! Grounds on the same "return a structured result, don't raise" posture
//! [`crate::validate`] takes (see `DESIGN.md`), walking the AST with a
//! hand-rolled recursive traversal (rather than [`crate::ast::Visitor`])
//! since several heuristics need ancestor context — the set of capture
//! groups and quantifiers enclosing the current node — that the visitor's
//! one-node-at-a-time dispatch doesn't carry. Mirrors
//! [`crate::validate::subpattern_length`]'s own manual-recursion style for
//! the same reason.

use crate::ast::{Ast, GroupType, Node, NodeId, QuantifierKind, Reference};
use crate::automata::charset::{self, CharSet};
use crate::config::Config;
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::ErrorCode;
use crate::span::ByteSpan;

/// A single named ReDoS risk factor, each carrying the fixed weight used to
/// compute [`ReDoSAnalysis::score`] (SPEC_FULL.md's Open Question
/// resolution #1: one canonical weight table, defined here and nowhere
/// else).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    /// An unbounded quantifier whose target itself contains an unbounded
    /// quantifier over an overlapping alphabet, with no atomic/possessive
    /// boundary between them — the classic `(a+)+` shape.
    NestedQuantifier,
    /// A backreference inside the quantified scope of the very capture
    /// group it refers to, e.g. `(a*)\1+`.
    SelfReferentialBackref,
    /// An unbounded quantifier whose target is an alternation with two or
    /// more branches that can match the same next byte.
    AmbiguousAlternation,
    /// An unbounded quantifier whose target can match the empty string,
    /// with no possessive/atomic guard against zero-width iterations.
    QuantifiedEmptyMatch,
    /// Two adjacent quantified atoms in a sequence whose alphabets
    /// overlap, e.g. `a*a*`.
    AmbiguousAdjacentQuantifiers,
    /// A large bounded repeat (`{1,N}` for large `N`) nested inside another
    /// repeat, multiplying the work an engine must consider.
    LargeBoundedRepeat,
}

impl Heuristic {
    /// The fixed weight contributed to the overall score (0-10 scale, §8's
    /// `/(a+)+b/` scenario scoring 10).
    pub fn weight(self) -> u32 {
        match self {
            Heuristic::NestedQuantifier => 10,
            Heuristic::SelfReferentialBackref => 8,
            Heuristic::AmbiguousAlternation => 7,
            Heuristic::QuantifiedEmptyMatch => 6,
            Heuristic::AmbiguousAdjacentQuantifiers => 5,
            Heuristic::LargeBoundedRepeat => 3,
        }
    }

    fn code(self) -> ErrorCode {
        ErrorCode(match self {
            Heuristic::NestedQuantifier => "regex.redos.nested-quantifier",
            Heuristic::SelfReferentialBackref => "regex.redos.self-referential-backref",
            Heuristic::AmbiguousAlternation => "regex.redos.ambiguous-alternation",
            Heuristic::QuantifiedEmptyMatch => "regex.redos.quantified-empty-match",
            Heuristic::AmbiguousAdjacentQuantifiers => "regex.redos.ambiguous-adjacent-quantifiers",
            Heuristic::LargeBoundedRepeat => "regex.redos.large-bounded-repeat",
        })
    }

    fn severity(self) -> Severity {
        match self.weight() {
            8..=10 => Severity::Critical,
            5..=7 => Severity::Error,
            _ => Severity::Warning,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Heuristic::NestedQuantifier => {
                "nested unbounded quantifiers over an overlapping alphabet can cause catastrophic backtracking"
            }
            Heuristic::SelfReferentialBackref => {
                "backreference to a capture group inside that group's own quantified scope"
            }
            Heuristic::AmbiguousAlternation => {
                "repeated alternation has overlapping branches, multiplying the ways a match can be retried"
            }
            Heuristic::QuantifiedEmptyMatch => {
                "quantified subpattern can match the empty string, allowing an unbounded number of zero-width iterations"
            }
            Heuristic::AmbiguousAdjacentQuantifiers => {
                "adjacent quantified atoms overlap, so the engine cannot tell which one consumed a given byte"
            }
            Heuristic::LargeBoundedRepeat => "large bounded repeat nested inside another repeat",
        }
    }

    /// A human-actionable fix, independent of the per-finding `message`
    /// (§4.6's `recommendations[]`).
    fn recommendation(self) -> &'static str {
        match self {
            Heuristic::NestedQuantifier => {
                "wrap the inner repeated group in an atomic group `(?>...)`, or make one of the two quantifiers possessive, so the engine cannot retry the same span two different ways"
            }
            Heuristic::SelfReferentialBackref => {
                "make the enclosing quantifier possessive or wrap the capture in an atomic group before repeating the backreference"
            }
            Heuristic::AmbiguousAlternation => {
                "reorder or merge the overlapping branches (e.g. factor out their common prefix) so at most one branch can match at a given position"
            }
            Heuristic::QuantifiedEmptyMatch => {
                "require at least one character of progress inside the quantified group, or make the outer quantifier possessive"
            }
            Heuristic::AmbiguousAdjacentQuantifiers => {
                "merge the two quantified atoms into a single quantifier over their shared alphabet, or make the first one possessive"
            }
            Heuristic::LargeBoundedRepeat => "lower the repeat's upper bound, or make the enclosing quantifier possessive",
        }
    }

    /// How confident the analyzer is that a firing of this heuristic is a
    /// genuine catastrophic-backtracking risk rather than an artifact of
    /// the heuristic's conservative approximations (§4.6's `confidence`).
    fn confidence(self) -> Confidence {
        match self {
            Heuristic::NestedQuantifier | Heuristic::SelfReferentialBackref => Confidence::High,
            Heuristic::AmbiguousAlternation | Heuristic::QuantifiedEmptyMatch => Confidence::Medium,
            Heuristic::AmbiguousAdjacentQuantifiers | Heuristic::LargeBoundedRepeat => Confidence::Low,
        }
    }

    /// The converse of confidence: how likely this specific finding is a
    /// false positive (§4.6's `falsePositiveRisk`).
    fn false_positive_risk(self) -> Confidence {
        match self.confidence() {
            Confidence::High => Confidence::Low,
            Confidence::Medium => Confidence::Medium,
            Confidence::Low => Confidence::High,
        }
    }
}

/// Qualitative confidence bucket shared by [`ReDoSAnalysis::confidence`] and
/// [`ReDoSAnalysis::false_positive_risk`] (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// A single located risk factor that contributed to the overall verdict
/// (§4.6's `hotspots[]`).
#[derive(Debug, Clone)]
pub struct Hotspot {
    pub code: ErrorCode,
    pub span: ByteSpan,
    pub message: &'static str,
}

/// Overall result of a ReDoS scan (§4.6): severity/score/confidence verdict,
/// the located risk factors, and actionable follow-up.
#[derive(Debug, Clone)]
pub struct ReDoSAnalysis {
    pub diagnostics: Vec<Diagnostic>,
    pub severity: Severity,
    /// `max` of every finding's heuristic weight, `0` if none fired
    /// (0-10 scale).
    pub score: u32,
    /// How sure the analyzer is in the overall verdict; `High` when no
    /// finding fired (confidently safe) or when the worst finding is one of
    /// the structural, low-false-positive heuristics.
    pub confidence: Confidence,
    /// The span of the single worst finding (the one driving `severity`
    /// and `score`), e.g. the outer `+` in `/(a+)+b/` (§8 scenario 1).
    pub vulnerable_part: Option<ByteSpan>,
    /// One actionable fix per distinct heuristic that fired, in the order
    /// first encountered.
    pub recommendations: Vec<String>,
    /// Every risk factor located during the walk, in source order.
    pub hotspots: Vec<Hotspot>,
    /// A mechanically-derived rewrite of the worst finding's span, when one
    /// of the rewrites the analyzer reasons about (atomic-wrapping the
    /// offending subpattern) applies.
    pub suggested_rewrite: Option<String>,
    /// Inverse of `confidence`: how likely the worst finding is a false
    /// positive of the heuristic approximations in `approx_charset`/
    /// `can_match_empty` rather than a real backtracking hazard.
    pub false_positive_risk: Confidence,
}

impl ReDoSAnalysis {
    pub fn is_safe(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Scans `ast` for catastrophic-backtracking risk factors. Patterns whose
/// original source matches one of `config.redos_ignored_patterns` verbatim
/// are reported safe without being walked (§6's escape hatch for
/// known-intentional patterns).
pub fn analyze(ast: &Ast, source: &str, config: &Config) -> ReDoSAnalysis {
    if config.redos_ignored_patterns.iter().any(|p| p == source) {
        return ReDoSAnalysis {
            diagnostics: Vec::new(),
            severity: Severity::Info,
            score: 0,
            confidence: Confidence::High,
            vulnerable_part: None,
            recommendations: Vec::new(),
            hotspots: Vec::new(),
            suggested_rewrite: None,
            false_positive_risk: Confidence::Low,
        };
    }

    let mut scanner = Scanner {
        ast,
        findings: Vec::new(),
    };
    let Node::Regex { pattern, .. } = ast.get(ast.root()) else {
        unreachable!("analyze called on a non-Regex root")
    };
    scanner.walk(*pattern, &Context::default());

    let score = scanner.findings.iter().map(|f| f.0.weight()).max().unwrap_or(0);
    let severity = if scanner.findings.is_empty() {
        Severity::Info
    } else {
        scanner.findings.iter().map(|f| f.0.severity()).max().unwrap_or(Severity::Info)
    };

    // The single finding driving the overall verdict: highest weight first,
    // earliest in source order as a tiebreaker.
    let worst = scanner
        .findings
        .iter()
        .max_by_key(|(h, span)| (h.weight(), std::cmp::Reverse(span.start)))
        .copied();

    let confidence = worst.map(|(h, _)| h.confidence()).unwrap_or(Confidence::High);
    let false_positive_risk = worst.map(|(h, _)| h.false_positive_risk()).unwrap_or(Confidence::Low);
    let vulnerable_part = worst.map(|(_, span)| span);
    let suggested_rewrite = worst.and_then(|(h, span)| suggest_rewrite(h, span, source));

    let mut recommendations = Vec::new();
    for (heuristic, _) in &scanner.findings {
        let text = heuristic.recommendation().to_string();
        if !recommendations.contains(&text) {
            recommendations.push(text);
        }
    }

    let hotspots = scanner
        .findings
        .iter()
        .map(|&(heuristic, span)| Hotspot {
            code: heuristic.code(),
            span,
            message: heuristic.message(),
        })
        .collect();

    let diagnostics = scanner
        .findings
        .into_iter()
        .map(|(heuristic, span)| Diagnostic::new(heuristic.severity(), heuristic.code(), span, heuristic.message()))
        .collect();

    ReDoSAnalysis {
        diagnostics,
        severity,
        score,
        confidence,
        vulnerable_part,
        recommendations,
        hotspots,
        suggested_rewrite,
        false_positive_risk,
    }
}

/// Atomic-wraps the offending span's source text, the one rewrite the
/// analyzer can derive mechanically without reasoning about the rest of the
/// pattern (§4.6's `suggestedRewrite`; mirrors the atomic-group mitigator
/// `contains_unguarded_nested_unbounded` already checks for). Only offered
/// for the two heuristics an atomic wrap actually neutralizes; `None` if
/// the span doesn't land on UTF-8 boundaries.
fn suggest_rewrite(heuristic: Heuristic, span: ByteSpan, source: &str) -> Option<String> {
    if !matches!(heuristic, Heuristic::NestedQuantifier | Heuristic::SelfReferentialBackref) {
        return None;
    }
    let text = source.get(span.start as usize..span.end as usize)?;
    Some(format!("(?>{text})"))
}

/// Ancestor context tracked while descending, since several heuristics need
/// to know which capture groups and quantifiers enclose the current node.
#[derive(Debug, Clone, Default)]
struct Context {
    /// Capture-group numbers whose subtree we're currently inside.
    enclosing_groups: Vec<u32>,
    /// `true` once we're nested inside an unbounded quantifier not guarded
    /// by an atomic group or possessive quantifier.
    inside_unguarded_unbounded: bool,
}

struct Scanner<'a> {
    ast: &'a Ast,
    findings: Vec<(Heuristic, ByteSpan)>,
}

impl<'a> Scanner<'a> {
    fn walk(&mut self, id: NodeId, ctx: &Context) {
        match self.ast.get(id) {
            Node::Sequence { children, .. } => {
                self.check_adjacent_quantifiers(children);
                for &c in children {
                    self.walk(c, ctx);
                }
            }
            Node::Alternation { alternatives, .. } => {
                for &a in alternatives {
                    self.walk(a, ctx);
                }
            }
            Node::Group { group_type, child, .. } => {
                let mut next = ctx.clone();
                if matches!(group_type, GroupType::Atomic) {
                    next.inside_unguarded_unbounded = false;
                }
                if let GroupType::Capturing { number } | GroupType::Named { number, .. } = group_type {
                    next.enclosing_groups.push(*number);
                }
                self.walk(*child, &next);
            }
            Node::Quantifier {
                target, min, max, kind, span,
            } => {
                self.check_quantifier(*target, *min, *max, *kind, *span, ctx);

                let mut next = ctx.clone();
                if max.is_none() && *kind != QuantifierKind::Possessive {
                    next.inside_unguarded_unbounded = true;
                }
                if *kind == QuantifierKind::Possessive {
                    next.inside_unguarded_unbounded = false;
                }
                self.walk(*target, &next);
            }
            Node::Backref { reference, span } => {
                if let Reference::Number(n) = reference {
                    if ctx.enclosing_groups.contains(n) && ctx.inside_unguarded_unbounded {
                        self.findings.push((Heuristic::SelfReferentialBackref, *span));
                    }
                }
            }
            Node::Conditional {
                yes_branch, no_branch, ..
            } => {
                self.walk(*yes_branch, ctx);
                if let Some(n) = no_branch {
                    self.walk(*n, ctx);
                }
            }
            Node::Define { content, .. } => self.walk(*content, ctx),
            Node::ScriptRun { child, .. } => self.walk(*child, ctx),
            _ => {}
        }
    }

    /// Flags an unbounded quantifier whose target either (a) contains
    /// another unbounded quantifier over an overlapping alphabet with no
    /// atomic/possessive boundary in between, (b) is an alternation with
    /// overlapping branches, or (c) can match the empty string.
    fn check_quantifier(
        &mut self,
        target: NodeId,
        min: u32,
        max: Option<u32>,
        kind: QuantifierKind,
        span: ByteSpan,
        ctx: &Context,
    ) {
        let is_unbounded = max.is_none();
        let is_guarded = kind == QuantifierKind::Possessive;

        if is_unbounded && !is_guarded {
            if self.contains_unguarded_nested_unbounded(target) {
                self.findings.push((Heuristic::NestedQuantifier, span));
            } else if self.is_ambiguous_alternation(target) {
                self.findings.push((Heuristic::AmbiguousAlternation, span));
            } else if can_match_empty(self.ast, target) {
                self.findings.push((Heuristic::QuantifiedEmptyMatch, span));
            }
        }

        if let Some(max) = max {
            const LARGE_REPEAT_THRESHOLD: u32 = 1000;
            if max.saturating_sub(min) > LARGE_REPEAT_THRESHOLD && ctx.inside_unguarded_unbounded {
                self.findings.push((Heuristic::LargeBoundedRepeat, span));
            }
        }
    }

    /// `true` if `id`'s subtree contains, without crossing an atomic group
    /// or possessive quantifier, another unbounded quantifier whose target
    /// alphabet overlaps `id`'s own approximate alphabet.
    fn contains_unguarded_nested_unbounded(&self, id: NodeId) -> bool {
        let outer_alphabet = approx_charset(self.ast, id);
        self.find_nested_unbounded(id, outer_alphabet.as_ref(), true)
    }

    fn find_nested_unbounded(&self, id: NodeId, outer: Option<&CharSet>, is_root: bool) -> bool {
        match self.ast.get(id) {
            Node::Quantifier { target, max, kind, .. } => {
                if !is_root && max.is_none() && *kind != QuantifierKind::Possessive {
                    let inner = approx_charset(self.ast, *target);
                    if overlaps(outer, inner.as_ref()) {
                        return true;
                    }
                }
                if *kind == QuantifierKind::Possessive {
                    return false;
                }
                self.find_nested_unbounded(*target, outer, false)
            }
            Node::Group { group_type, child, .. } => {
                if matches!(group_type, GroupType::Atomic) {
                    return false;
                }
                self.find_nested_unbounded(*child, outer, false)
            }
            Node::Sequence { children, .. } => children.iter().any(|&c| self.find_nested_unbounded(c, outer, false)),
            Node::Alternation { alternatives, .. } => {
                alternatives.iter().any(|&a| self.find_nested_unbounded(a, outer, false))
            }
            _ => false,
        }
    }

    fn is_ambiguous_alternation(&self, id: NodeId) -> bool {
        let inner = strip_transparent_groups(self.ast, id);
        let Node::Alternation { alternatives, .. } = self.ast.get(inner) else {
            return false;
        };
        let sets: Vec<Option<CharSet>> = alternatives.iter().map(|&a| approx_charset(self.ast, a)).collect();
        for i in 0..sets.len() {
            for j in (i + 1)..sets.len() {
                if overlaps(sets[i].as_ref(), sets[j].as_ref()) {
                    return true;
                }
            }
        }
        false
    }

    fn check_adjacent_quantifiers(&mut self, children: &[NodeId]) {
        for pair in children.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (Some(quant_a), Some(quant_b)) = (quantifier_alphabet(self.ast, a), quantifier_alphabet(self.ast, b))
            else {
                continue;
            };
            if overlaps(quant_a.as_ref(), quant_b.as_ref()) {
                let span = self.ast.span(a).cover(self.ast.span(b));
                self.findings.push((Heuristic::AmbiguousAdjacentQuantifiers, span));
            }
        }
    }
}

fn overlaps(a: Option<&CharSet>, b: Option<&CharSet>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.overlaps(b),
        // Unknown alphabets (e.g. a subtree containing a backreference)
        // are treated conservatively as potentially overlapping.
        _ => true,
    }
}

/// The alphabet a quantified atom repeats over, if `id` is itself a
/// `Quantifier` with an unbounded repeat. Used by the "ambiguous adjacent
/// quantifiers" heuristic, which only cares about pairs of quantified
/// atoms, not arbitrary neighbors.
fn quantifier_alphabet(ast: &Ast, id: NodeId) -> Option<CharSet> {
    let Node::Quantifier { target, max, .. } = ast.get(id) else {
        return None;
    };
    if max.is_some() {
        return None;
    }
    approx_charset(ast, *target)
}

fn strip_transparent_groups(ast: &Ast, id: NodeId) -> NodeId {
    match ast.get(id) {
        Node::Group { group_type, child, .. }
            if matches!(
                group_type,
                GroupType::Capturing { .. } | GroupType::NonCapturing | GroupType::Named { .. } | GroupType::Atomic
            ) =>
        {
            strip_transparent_groups(ast, *child)
        }
        _ => id,
    }
}

/// Conservative best-effort alphabet for a subtree, used only for overlap
/// heuristics (never for correctness-critical automata construction, which
/// is [`crate::automata::nfa::translate`]'s job). Returns `None` when the
/// alphabet can't cheaply be determined, which call sites treat as
/// "assume it can overlap".
fn approx_charset(ast: &Ast, id: NodeId) -> Option<CharSet> {
    match ast.get(id) {
        Node::Literal { bytes, .. } if bytes.len() == 1 => Some(CharSet::single(bytes[0])),
        Node::CharLiteral { code_point, .. } if *code_point <= 255 => Some(CharSet::single(*code_point as u8)),
        Node::CharType { letter, .. } => charset::char_type(*letter),
        Node::Dot { .. } => Some(charset::dot(true)),
        Node::PosixClass { name, is_negated, .. } => {
            let set = charset::posix_class(ast.resolve(*name))?;
            Some(if *is_negated { set.complement() } else { set })
        }
        Node::CharClass { is_negated, inner, .. } => {
            let set = approx_class_body(ast, *inner)?;
            Some(if *is_negated { set.complement() } else { set })
        }
        Node::Group { group_type, child, .. }
            if matches!(
                group_type,
                GroupType::Capturing { .. } | GroupType::NonCapturing | GroupType::Named { .. } | GroupType::Atomic
            ) =>
        {
            approx_charset(ast, *child)
        }
        Node::Quantifier { target, .. } => approx_charset(ast, *target),
        Node::Alternation { alternatives, .. } => {
            let mut set = CharSet::empty();
            for &a in alternatives {
                set = set.union(&approx_charset(ast, a)?);
            }
            Some(set)
        }
        Node::Sequence { children, .. } => children.first().and_then(|&c| approx_charset(ast, c)),
        _ => None,
    }
}

fn approx_class_body(ast: &Ast, id: NodeId) -> Option<CharSet> {
    match ast.get(id) {
        Node::Alternation { alternatives, .. } => {
            let mut set = CharSet::empty();
            for &a in alternatives {
                set = set.union(&approx_class_body(ast, a)?);
            }
            Some(set)
        }
        Node::Range { start, end, .. } => {
            let lo = class_byte(ast, *start)?;
            let hi = class_byte(ast, *end)?;
            Some(CharSet::range(lo, hi))
        }
        Node::Literal { bytes, .. } if bytes.len() == 1 => Some(CharSet::single(bytes[0])),
        Node::CharLiteral { code_point, .. } if *code_point <= 255 => Some(CharSet::single(*code_point as u8)),
        Node::CharType { letter, .. } => charset::char_type(*letter),
        Node::PosixClass { name, is_negated, .. } => {
            let set = charset::posix_class(ast.resolve(*name))?;
            Some(if *is_negated { set.complement() } else { set })
        }
        _ => None,
    }
}

fn class_byte(ast: &Ast, id: NodeId) -> Option<u8> {
    match ast.get(id) {
        Node::Literal { bytes, .. } if bytes.len() == 1 => Some(bytes[0]),
        Node::CharLiteral { code_point, .. } if *code_point <= 255 => Some(*code_point as u8),
        _ => None,
    }
}

/// Whether `id`'s subtree can match the empty string (a conservative
/// estimate: backreferences, subroutines, and recursion are treated as
/// possibly-empty, matching [`crate::validate::subpattern_length`]'s own
/// conservative posture for unsupported constructs).
fn can_match_empty(ast: &Ast, id: NodeId) -> bool {
    match ast.get(id) {
        Node::Sequence { children, .. } => children.iter().all(|&c| can_match_empty(ast, c)),
        Node::Alternation { alternatives, .. } => alternatives.iter().any(|&a| can_match_empty(ast, a)),
        Node::Group { child, .. } => can_match_empty(ast, *child),
        Node::Quantifier { min, .. } => *min == 0,
        Node::Literal { bytes, .. } => bytes.is_empty(),
        Node::Comment { .. } | Node::Anchor { .. } | Node::Assertion { .. } | Node::Keep { .. } | Node::Define { .. } => {
            true
        }
        Node::CharLiteral { .. } | Node::CharType { .. } | Node::Dot { .. } | Node::CharClass { .. } => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn analyze_source(source: &str) -> ReDoSAnalysis {
        let config = Config::default();
        let ast = parse(source, &config).unwrap();
        analyze(&ast, source, &config)
    }

    #[test]
    fn nested_unbounded_quantifiers_score_critical() {
        let analysis = analyze_source("/(a+)+b/");
        assert_eq!(analysis.severity, Severity::Critical);
        assert_eq!(analysis.score, 10);
    }

    #[test]
    fn atomic_group_suppresses_nested_quantifier_finding() {
        let analysis = analyze_source("/(?>a+)+b/");
        assert!(!analysis
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.redos.nested-quantifier")));
    }

    #[test]
    fn possessive_outer_quantifier_suppresses_finding() {
        let analysis = analyze_source("/(a+)++b/");
        assert!(!analysis
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.redos.nested-quantifier")));
    }

    #[test]
    fn simple_literal_pattern_is_safe() {
        let analysis = analyze_source("/hello world/");
        assert!(analysis.is_safe());
        assert_eq!(analysis.severity, Severity::Info);
    }

    #[test]
    fn overlapping_repeated_alternation_is_flagged() {
        let analysis = analyze_source("/(a|a)*b/");
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.redos.ambiguous-alternation")));
    }

    #[test]
    fn adjacent_overlapping_quantifiers_are_flagged() {
        let analysis = analyze_source("/a*a*/");
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode("regex.redos.ambiguous-adjacent-quantifiers")));
    }

    #[test]
    fn ignored_pattern_is_reported_safe() {
        let config = Config::builder()
            .redos_ignored_patterns(vec!["/(a+)+b/".to_string()])
            .build()
            .unwrap();
        let ast = parse("/(a+)+b/", &config).unwrap();
        let analysis = analyze(&ast, "/(a+)+b/", &config);
        assert!(analysis.is_safe());
    }
}
