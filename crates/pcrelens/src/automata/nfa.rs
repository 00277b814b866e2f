//! Thompson NFA construction over the automata-supported regular subset
//! (`spec.md` §4.7.1-§4.7.2).
//!
//! Grounds on the general fuel/budget-limited-traversal posture of
//! `plotnik-lib::parser::core`'s recursion budget, applied here to NFA
//! state-count growth (`Config::max_nfa_states`) instead of token
//! consumption (see `DESIGN.md`).

use super::charset::{self, CharSet};
use crate::ast::{Ast, ClassOpKind, GroupType, Node, NodeId, QuantifierKind};
use crate::config::Config;
use crate::error::{Error, Result};

pub type StateId = usize;

#[derive(Debug, Clone, Default)]
pub struct NfaState {
    /// Byte-consuming transitions: `(set, target)`.
    pub byte_transitions: Vec<(CharSet, StateId)>,
    /// Epsilon (no-input) transitions.
    pub epsilons: Vec<StateId>,
}

/// A Thompson-constructed NFA with a single start and single accept state
/// (the classic McNaughton-Yamada-Thompson invariant, preserved through
/// every combinator below).
#[derive(Debug, Clone)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: StateId,
    pub accept: StateId,
}

impl Nfa {
    fn new_state(&mut self) -> StateId {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }
}

/// Whether the pattern had an outer `^`/`$` stripped during translation
/// (§4.7's FULL-vs-PARTIAL match-mode distinction).
#[derive(Debug, Clone, Copy, Default)]
pub struct Anchoring {
    pub start: bool,
    pub end: bool,
}

struct Builder {
    nfa: Nfa,
    max_states: u32,
}

impl Builder {
    fn alloc(&mut self) -> Result<StateId> {
        if self.nfa.states.len() as u32 >= self.max_states {
            return Err(Error::ResourceLimit {
                what: "NFA state count exceeds maxNfaStates".into(),
                limit: self.max_states as u64,
            });
        }
        Ok(self.nfa.new_state())
    }

    fn frag_byte(&mut self, set: CharSet) -> Result<(StateId, StateId)> {
        let s = self.alloc()?;
        let a = self.alloc()?;
        self.nfa.states[s].byte_transitions.push((set, a));
        Ok((s, a))
    }

    fn frag_epsilon(&mut self) -> Result<(StateId, StateId)> {
        let s = self.alloc()?;
        let a = self.alloc()?;
        self.nfa.states[s].epsilons.push(a);
        Ok((s, a))
    }

    fn concat(&mut self, a: (StateId, StateId), b: (StateId, StateId)) -> (StateId, StateId) {
        self.nfa.states[a.1].epsilons.push(b.0);
        (a.0, b.1)
    }

    fn alternate(&mut self, frags: Vec<(StateId, StateId)>) -> Result<(StateId, StateId)> {
        let start = self.alloc()?;
        let accept = self.alloc()?;
        for (s, a) in frags {
            self.nfa.states[start].epsilons.push(s);
            self.nfa.states[a].epsilons.push(accept);
        }
        Ok((start, accept))
    }

    fn star(&mut self, f: (StateId, StateId)) -> Result<(StateId, StateId)> {
        let start = self.alloc()?;
        let accept = self.alloc()?;
        self.nfa.states[start].epsilons.push(f.0);
        self.nfa.states[start].epsilons.push(accept);
        self.nfa.states[f.1].epsilons.push(f.0);
        self.nfa.states[f.1].epsilons.push(accept);
        Ok((start, accept))
    }

    fn plus(&mut self, f: (StateId, StateId)) -> Result<(StateId, StateId)> {
        let accept = self.alloc()?;
        self.nfa.states[f.1].epsilons.push(f.0);
        self.nfa.states[f.1].epsilons.push(accept);
        Ok((f.0, accept))
    }

    fn optional(&mut self, f: (StateId, StateId)) -> Result<(StateId, StateId)> {
        let start = self.alloc()?;
        self.nfa.states[start].epsilons.push(f.0);
        self.nfa.states[start].epsilons.push(f.1);
        Ok((start, f.1))
    }

    fn empty(&mut self) -> Result<(StateId, StateId)> {
        self.frag_epsilon()
    }
}

/// Translates the pattern body of `ast` into an [`Nfa`], raising
/// [`Error::Complexity`] for anything outside the automata-supported
/// regular subset (§4.7.1): lookaround, backreferences, subroutines,
/// conditionals, `(*VERB)`s, `\K`, Unicode property classes, and named
/// Unicode characters. A single leading `^`/trailing `$` at the very top of
/// the pattern is recognized and stripped (recorded in the returned
/// [`Anchoring`]); any other occurrence of an anchor or zero-width assertion
/// is not representable as a finite automaton and also raises
/// `Error::Complexity`, since PCRE's assertions have no general translation
/// into a regular language.
pub fn translate(ast: &Ast, config: &Config) -> Result<(Nfa, Anchoring)> {
    let Node::Regex { pattern, flags, .. } = ast.get(ast.root()) else {
        unreachable!("translate called on a non-Regex root")
    };
    let dot_all = flags.dot_all;

    let mut builder = Builder {
        nfa: Nfa {
            states: Vec::new(),
            start: 0,
            accept: 0,
        },
        max_states: config.max_nfa_states,
    };

    let (frag, anchoring) = build_top_level(ast, &mut builder, *pattern, dot_all)?;
    builder.nfa.start = frag.0;
    builder.nfa.accept = frag.1;
    Ok((builder.nfa, anchoring))
}

/// Builds the whole-pattern fragment, recognizing a single leading `^`
/// and/or trailing `$` at the very top level and excluding them from the
/// translated language (recorded in the returned [`Anchoring`] instead).
/// Any other `^`/`$` occurrence is translated as ordinary embedded node via
/// `build`, which rejects it as [`Error::Complexity`].
fn build_top_level(
    ast: &Ast,
    b: &mut Builder,
    pattern: NodeId,
    dot_all: bool,
) -> Result<((StateId, StateId), Anchoring)> {
    use crate::ast::AnchorKind;

    if let Node::Anchor { kind, .. } = ast.get(pattern) {
        let anchoring = Anchoring {
            start: *kind == AnchorKind::Caret,
            end: *kind == AnchorKind::Dollar,
        };
        return Ok((b.empty()?, anchoring));
    }

    let Node::Sequence { children, .. } = ast.get(pattern) else {
        return Ok((build(ast, b, pattern, dot_all)?, Anchoring::default()));
    };
    if children.is_empty() {
        return Ok((b.empty()?, Anchoring::default()));
    }

    let mut start = 0;
    let mut end = children.len();
    let mut anchoring = Anchoring::default();
    if let Node::Anchor {
        kind: AnchorKind::Caret,
        ..
    } = ast.get(children[0])
    {
        anchoring.start = true;
        start = 1;
    }
    if end > start {
        if let Node::Anchor {
            kind: AnchorKind::Dollar,
            ..
        } = ast.get(children[end - 1])
        {
            anchoring.end = true;
            end -= 1;
        }
    }

    let frag = build_sequence(ast, b, children, dot_all, start, children.len() - end)?;
    Ok((frag, anchoring))
}

fn build(ast: &Ast, b: &mut Builder, id: NodeId, dot_all: bool) -> Result<(StateId, StateId)> {
    match ast.get(id) {
        Node::Sequence { children, .. } => build_sequence(ast, b, children, dot_all, 0, 0),
        Node::Alternation { alternatives, .. } => {
            let mut frags = Vec::with_capacity(alternatives.len());
            for &a in alternatives {
                frags.push(build(ast, b, a, dot_all)?);
            }
            b.alternate(frags)
        }
        Node::Group { group_type, child, .. } => build_group(ast, b, group_type, *child, dot_all, id),
        Node::Quantifier {
            target, min, max, kind,
        } => build_quantifier(ast, b, *target, *min, *max, *kind, dot_all),
        Node::Literal { bytes, .. } => {
            let mut frag = b.empty()?;
            let mut first = true;
            for &byte in bytes {
                let next = b.frag_byte(CharSet::single(byte))?;
                frag = if first {
                    first = false;
                    next
                } else {
                    b.concat(frag, next)
                };
            }
            Ok(frag)
        }
        Node::CharLiteral { code_point, .. } => {
            if *code_point > 255 {
                return Err(complexity("non-ASCII character literal", id, ast));
            }
            b.frag_byte(CharSet::single(*code_point as u8))
        }
        Node::CharType { letter, .. } => {
            let set = charset::char_type(*letter)
                .ok_or_else(|| complexity("unsupported character-type shorthand", id, ast))?;
            b.frag_byte(set)
        }
        Node::Dot { .. } => b.frag_byte(charset::dot(dot_all)),
        Node::CharClass { is_negated, inner, .. } => {
            let set = class_to_charset(ast, *inner)?;
            let set = if *is_negated { set.complement() } else { set };
            b.frag_byte(set)
        }
        Node::Comment { .. } => b.empty(),
        Node::ScriptRun { child, .. } => build(ast, b, *child, dot_all),
        Node::Define { .. } => b.empty(),
        Node::Anchor { .. } => Err(complexity("embedded anchor", id, ast)),
        Node::Assertion { .. } => Err(complexity("zero-width assertion", id, ast)),
        Node::Keep { .. } => Err(complexity("\\K reset-match-start", id, ast)),
        Node::Backref { .. } => Err(complexity("backreference", id, ast)),
        Node::Subroutine { .. } => Err(complexity("subroutine call", id, ast)),
        Node::Conditional { .. } => Err(complexity("conditional subpattern", id, ast)),
        Node::PcreVerb { .. } | Node::LimitMatch { .. } => Err(complexity("PCRE verb", id, ast)),
        Node::Callout { .. } => Err(complexity("callout", id, ast)),
        Node::VersionCondition { .. } => Err(complexity("version condition", id, ast)),
        Node::PosixClass { .. } | Node::UnicodeProp { .. } | Node::Range { .. } | Node::ClassOperation { .. } => {
            Err(complexity("class construct outside a character class", id, ast))
        }
        Node::Regex { .. } => unreachable!("nested Regex node"),
    }
}

fn build_sequence(
    ast: &Ast,
    b: &mut Builder,
    children: &[NodeId],
    dot_all: bool,
    skip_front: usize,
    skip_back: usize,
) -> Result<(StateId, StateId)> {
    let slice = &children[skip_front..children.len() - skip_back];
    if slice.is_empty() {
        return b.empty();
    }
    let mut frag = build(ast, b, slice[0], dot_all)?;
    for &c in &slice[1..] {
        let next = build(ast, b, c, dot_all)?;
        frag = b.concat(frag, next);
    }
    Ok(frag)
}

fn build_group(
    ast: &Ast,
    b: &mut Builder,
    group_type: &GroupType,
    child: NodeId,
    dot_all: bool,
    id: NodeId,
) -> Result<(StateId, StateId)> {
    match group_type {
        GroupType::LookaheadPositive
        | GroupType::LookaheadNegative
        | GroupType::LookbehindPositive
        | GroupType::LookbehindNegative => Err(complexity("lookaround", id, ast)),
        GroupType::BranchReset => build(ast, b, child, dot_all),
        // Capture numbering and inline-flags scoping are invisible to the
        // language the pattern denotes; both translate transparently.
        GroupType::Capturing { .. }
        | GroupType::NonCapturing
        | GroupType::Named { .. }
        | GroupType::Atomic
        | GroupType::InlineFlags { .. } => build(ast, b, child, dot_all),
    }
}

fn build_quantifier(
    ast: &Ast,
    b: &mut Builder,
    target: NodeId,
    min: u32,
    max: Option<u32>,
    _kind: QuantifierKind,
    dot_all: bool,
) -> Result<(StateId, StateId)> {
    // Possessive vs greedy vs lazy quantifiers denote the same *language*;
    // only their matching strategy differs, which is out of scope for a
    // language-theoretic automaton (§4.7: the automata core reasons about
    // the set of strings a pattern can match, not how a backtracking engine
    // explores it).
    match max {
        None if min == 0 => {
            let inner = build(ast, b, target, dot_all)?;
            b.star(inner)
        }
        None if min == 1 => {
            let inner = build(ast, b, target, dot_all)?;
            b.plus(inner)
        }
        None => {
            let mut frag = build(ast, b, target, dot_all)?;
            for _ in 1..min {
                let next = build(ast, b, target, dot_all)?;
                frag = b.concat(frag, next);
            }
            let tail = build(ast, b, target, dot_all)?;
            let tail = b.star(tail)?;
            Ok(b.concat(frag, tail))
        }
        Some(max) => {
            if max == 0 {
                return b.empty();
            }
            let mut frag = build(ast, b, target, dot_all)?;
            for _ in 1..min {
                let next = build(ast, b, target, dot_all)?;
                frag = b.concat(frag, next);
            }
            let mut result = if min == 0 {
                let first_optional = build(ast, b, target, dot_all)?;
                b.optional(first_optional)?
            } else {
                frag
            };
            for _ in min.max(1)..max {
                let opt = build(ast, b, target, dot_all)?;
                let opt = b.optional(opt)?;
                result = b.concat(result, opt);
            }
            Ok(result)
        }
    }
}

/// Evaluates a character-class body (the `Alternation`/`ClassOperation`
/// tree wedged under a `CharClass` node, per §4.4's union-join invariant)
/// into a single [`CharSet`].
fn class_to_charset(ast: &Ast, id: NodeId) -> Result<CharSet> {
    match ast.get(id) {
        Node::Alternation { alternatives, .. } => {
            let mut set = CharSet::empty();
            for &a in alternatives {
                set = set.union(&class_to_charset(ast, a)?);
            }
            Ok(set)
        }
        Node::ClassOperation { kind, left, right, .. } => {
            let l = class_to_charset(ast, *left)?;
            let r = class_to_charset(ast, *right)?;
            Ok(match kind {
                ClassOpKind::Intersection => l.intersect(&r),
                ClassOpKind::Subtraction => l.subtract(&r),
            })
        }
        Node::Range { start, end, .. } => {
            let lo = class_atom_byte(ast, *start)?;
            let hi = class_atom_byte(ast, *end)?;
            Ok(CharSet::range(lo, hi))
        }
        Node::Literal { bytes, .. } if bytes.len() == 1 => Ok(CharSet::single(bytes[0])),
        Node::CharLiteral { code_point, .. } => {
            if *code_point > 255 {
                return Err(complexity("non-ASCII character in class", id, ast));
            }
            Ok(CharSet::single(*code_point as u8))
        }
        Node::CharType { letter, .. } => {
            charset::char_type(*letter).ok_or_else(|| complexity("unsupported character type", id, ast))
        }
        Node::PosixClass { name, is_negated, .. } => {
            let set = charset::posix_class(ast.resolve(*name))
                .ok_or_else(|| complexity("unknown POSIX class", id, ast))?;
            Ok(if *is_negated { set.complement() } else { set })
        }
        Node::UnicodeProp { .. } => Err(complexity("Unicode property class", id, ast)),
        other => Err(complexity(
            &format!("unexpected node in character class: {}", other.kind_name()),
            id,
            ast,
        )),
    }
}

fn class_atom_byte(ast: &Ast, id: NodeId) -> Result<u8> {
    match ast.get(id) {
        Node::Literal { bytes, .. } if bytes.len() == 1 => Ok(bytes[0]),
        Node::CharLiteral { code_point, .. } if *code_point <= 255 => Ok(*code_point as u8),
        _ => Err(complexity("non-byte character range endpoint", id, ast)),
    }
}

/// Prepends a self-looping `Σ*` state ahead of `nfa.start`, so any number
/// of arbitrary bytes may precede a match (§4.7's unanchored-start
/// composition). The new state becomes the NFA's start; it epsilon-reaches
/// the old start so the real pattern can still begin matching at any
/// position.
pub(super) fn prepend_sigma_star(nfa: &mut Nfa) {
    let loop_state = nfa.states.len();
    nfa.states.push(NfaState {
        byte_transitions: vec![(CharSet::full(), loop_state)],
        epsilons: vec![nfa.start],
    });
    nfa.start = loop_state;
}

/// Appends a self-looping `Σ*` state after `nfa.accept`, so any number of
/// arbitrary bytes may follow a match (§4.7's unanchored-end composition).
pub(super) fn append_sigma_star(nfa: &mut Nfa) {
    let loop_state = nfa.states.len();
    nfa.states.push(NfaState {
        byte_transitions: vec![(CharSet::full(), loop_state)],
        epsilons: Vec::new(),
    });
    nfa.states[nfa.accept].epsilons.push(loop_state);
    nfa.accept = loop_state;
}

fn complexity(feature: &str, id: NodeId, ast: &Ast) -> Error {
    Error::Complexity {
        feature: feature.to_string(),
        pos: Some(ast.span(id).start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn translate_source(source: &str) -> Result<(Nfa, Anchoring)> {
        let config = Config::default();
        let ast = parse(source, &config).expect("should parse");
        translate(&ast, &config)
    }

    #[test]
    fn literal_pattern_translates() {
        let (nfa, _) = translate_source("/abc/").unwrap();
        assert!(nfa.states.len() >= 2);
    }

    #[test]
    fn lookaround_is_complexity_error() {
        let err = translate_source("/(?=a)b/").unwrap_err();
        assert!(matches!(err, Error::Complexity { .. }));
    }

    #[test]
    fn backreference_is_complexity_error() {
        let err = translate_source("/(a)\\1/").unwrap_err();
        assert!(matches!(err, Error::Complexity { .. }));
    }

    #[test]
    fn outer_anchors_are_stripped_not_rejected() {
        let (_, anchoring) = translate_source("/^abc$/").unwrap();
        assert!(anchoring.start && anchoring.end);
    }

    #[test]
    fn embedded_anchor_is_complexity_error() {
        let err = translate_source("/a^b/").unwrap_err();
        assert!(matches!(err, Error::Complexity { .. }));
    }
}
