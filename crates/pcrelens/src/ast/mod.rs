//! The AST (`spec.md` §3, §4.4, §9).
//!
//! A flat arena (`Vec<Node>`) indexed by [`NodeId`], built once during
//! parsing and never mutated afterward — the "Arena-allocated trees with
//! byte offsets" REDESIGN FLAG in §9, replacing the teacher's lossless
//! `rowan` CST (see `DESIGN.md`, "Departures from the teacher"). Every
//! [`Node`] variant carries its byte [`ByteSpan`]; children are referenced by
//! [`NodeId`], never by pointer, so an [`Ast`] is `Send + Sync` and a cheap
//! structural `Clone`.

pub mod visitor;

pub use visitor::Visitor;

use crate::span::ByteSpan;
use pcrelens_core::{Interner, Symbol};

/// A handle into an [`Ast`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of reference made by a backreference or subroutine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Number(u32),
    /// Relative numeric reference, e.g. `\g{-1}` / `\g-1` / `\g+1`.
    Relative(i32),
    Name(Symbol),
}

/// The syntax a subroutine call used, preserved for diagnostics and for
/// round-tripping (§8 "Round-trip of known-safe subset").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineSyntax {
    /// `(?1)`, `(?-1)`, `(?+1)`
    RelativeOrNumberedGroup,
    /// `(?&name)`
    NamedGroup,
    /// `\g<name>` or `\g<1>`
    GAngle,
    /// `(?R)` — whole-pattern recursion.
    WholePattern,
}

/// `GroupType` enumerates PCRE's group flavors (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupType {
    Capturing { number: u32 },
    NonCapturing,
    Named { number: u32, name: Symbol },
    Atomic,
    LookaheadPositive,
    LookaheadNegative,
    LookbehindPositive,
    LookbehindNegative,
    /// Flag-scope-only group, e.g. `(?i-x)` with no `:` body (the scope
    /// extends to the end of the enclosing group/alternative).
    InlineFlags { set: FlagDelta, unset: FlagDelta },
    /// `(?|...)`: alternative branches share capture numbers.
    BranchReset,
}

/// A set of flag bytes toggled by an inline-flags group, e.g. the `i-m` in
/// `(?i-m:...)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagDelta(pub Vec<u8>);

/// Quantifier repetition kind (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    Greedy,
    Lazy,
    Possessive,
}

/// Subtype of a numeric/Unicode character literal (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharLiteralSubtype {
    /// `\xNN`
    Hex,
    /// `\x{...}`
    HexBraced,
    /// Legacy `\NNN`
    OctalLegacy,
    /// `\o{...}`
    Octal,
    /// `\N{...}` named Unicode character.
    UnicodeNamed,
    /// `\cX` control character (codepoint computed as `X ^ 0x40`).
    Control,
}

/// `^` or `$` (§3 "Anchor").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    Caret,
    Dollar,
}

/// Zero-width assertions other than `^`/`$` (§3 "Assertion").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
    WordBoundary,
    NotWordBoundary,
    /// Grapheme-cluster variants `\b{g}` / `\B{g}`.
    GraphemeBoundary,
    NotGraphemeBoundary,
    StartOfSubject,
    EndOfSubjectOrNewline,
    EndOfSubject,
    FirstMatchPosition,
}

/// The condition governing a `Conditional` node (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    GroupNumber(u32),
    GroupName(Symbol),
    RecursionAny,
    RecursionNumbered(i32),
    RecursionNamed(Symbol),
    /// An inline lookaround used as the condition itself, e.g.
    /// `(?(?=foo)yes|no)`.
    Assertion(NodeId),
    /// `(?(VERSION>=10.34)yes|no)`, pointing at a `VersionCondition` atom.
    Version(NodeId),
}

/// `ClassOperation` join kind (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOpKind {
    Intersection,
    Subtraction,
}

/// `(*script_run:...)` / `(*atomic_script_run:...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptRunKind {
    Plain,
    Atomic,
}

/// A PCRE2-version comparison operator used by `VersionCondition`
/// (`(?(VERSION>=10.34)...)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOp {
    Eq,
    GreaterEq,
}

/// A single AST node. Every variant carries its [`ByteSpan`]; structural
/// variants reference children by [`NodeId`].
#[derive(Debug, Clone)]
pub enum Node {
    // --- Structural ---
    Regex {
        span: ByteSpan,
        opening_delimiter: u8,
        closing_delimiter: u8,
        flags: FlagSet,
        pattern: NodeId,
    },
    Sequence {
        span: ByteSpan,
        children: Vec<NodeId>,
    },
    Alternation {
        span: ByteSpan,
        alternatives: Vec<NodeId>,
    },
    Group {
        span: ByteSpan,
        group_type: GroupType,
        child: NodeId,
    },
    Quantifier {
        span: ByteSpan,
        target: NodeId,
        min: u32,
        max: Option<u32>,
        kind: QuantifierKind,
    },
    Conditional {
        span: ByteSpan,
        condition: ConditionKind,
        yes_branch: NodeId,
        no_branch: Option<NodeId>,
    },
    Define {
        span: ByteSpan,
        content: NodeId,
    },
    Comment {
        span: ByteSpan,
    },

    // --- Atoms ---
    Literal {
        span: ByteSpan,
        bytes: Vec<u8>,
    },
    CharLiteral {
        span: ByteSpan,
        code_point: u32,
        subtype: CharLiteralSubtype,
    },
    CharType {
        span: ByteSpan,
        letter: u8,
    },
    Dot {
        span: ByteSpan,
    },
    Anchor {
        span: ByteSpan,
        kind: AnchorKind,
    },
    Assertion {
        span: ByteSpan,
        kind: AssertionKind,
    },
    Keep {
        span: ByteSpan,
    },
    Backref {
        span: ByteSpan,
        reference: Reference,
    },
    Subroutine {
        span: ByteSpan,
        reference: Reference,
        syntax: SubroutineSyntax,
    },
    PcreVerb {
        span: ByteSpan,
        name: Symbol,
        arg: Option<Symbol>,
    },
    Callout {
        span: ByteSpan,
        id: CalloutId,
    },
    LimitMatch {
        span: ByteSpan,
        value: u32,
    },
    ScriptRun {
        span: ByteSpan,
        kind: ScriptRunKind,
        child: NodeId,
    },
    VersionCondition {
        span: ByteSpan,
        operator: VersionOp,
        major: u16,
        minor: u16,
    },

    // --- Class-expression atoms ---
    CharClass {
        span: ByteSpan,
        is_negated: bool,
        inner: NodeId,
    },
    Range {
        span: ByteSpan,
        start: NodeId,
        end: NodeId,
    },
    ClassOperation {
        span: ByteSpan,
        kind: ClassOpKind,
        left: NodeId,
        right: NodeId,
    },
    PosixClass {
        span: ByteSpan,
        name: Symbol,
        is_negated: bool,
    },
    UnicodeProp {
        span: ByteSpan,
        name: Symbol,
        has_braces: bool,
        is_negated: bool,
    },
}

/// `(*C...)` callout identifier: numeric or a quoted string argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalloutId {
    Numeric(u32),
    StringArg(Symbol),
}

impl Node {
    pub fn span(&self) -> ByteSpan {
        match self {
            Node::Regex { span, .. }
            | Node::Sequence { span, .. }
            | Node::Alternation { span, .. }
            | Node::Group { span, .. }
            | Node::Quantifier { span, .. }
            | Node::Conditional { span, .. }
            | Node::Define { span, .. }
            | Node::Comment { span }
            | Node::Literal { span, .. }
            | Node::CharLiteral { span, .. }
            | Node::CharType { span, .. }
            | Node::Dot { span }
            | Node::Anchor { span, .. }
            | Node::Assertion { span, .. }
            | Node::Keep { span }
            | Node::Backref { span, .. }
            | Node::Subroutine { span, .. }
            | Node::PcreVerb { span, .. }
            | Node::Callout { span, .. }
            | Node::LimitMatch { span, .. }
            | Node::ScriptRun { span, .. }
            | Node::VersionCondition { span, .. }
            | Node::CharClass { span, .. }
            | Node::Range { span, .. }
            | Node::ClassOperation { span, .. }
            | Node::PosixClass { span, .. }
            | Node::UnicodeProp { span, .. } => *span,
        }
    }

    /// A short, human-readable name for the node's kind (used by
    /// diagnostics and the ReDoS analyzer's hotspot labels).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Regex { .. } => "regex",
            Node::Sequence { .. } => "sequence",
            Node::Alternation { .. } => "alternation",
            Node::Group { .. } => "group",
            Node::Quantifier { .. } => "quantifier",
            Node::Conditional { .. } => "conditional",
            Node::Define { .. } => "define",
            Node::Comment { .. } => "comment",
            Node::Literal { .. } => "literal",
            Node::CharLiteral { .. } => "char-literal",
            Node::CharType { .. } => "char-type",
            Node::Dot { .. } => "dot",
            Node::Anchor { .. } => "anchor",
            Node::Assertion { .. } => "assertion",
            Node::Keep { .. } => "keep",
            Node::Backref { .. } => "backref",
            Node::Subroutine { .. } => "subroutine",
            Node::PcreVerb { .. } => "pcre-verb",
            Node::Callout { .. } => "callout",
            Node::LimitMatch { .. } => "limit-match",
            Node::ScriptRun { .. } => "script-run",
            Node::VersionCondition { .. } => "version-condition",
            Node::CharClass { .. } => "char-class",
            Node::Range { .. } => "range",
            Node::ClassOperation { .. } => "class-operation",
            Node::PosixClass { .. } => "posix-class",
            Node::UnicodeProp { .. } => "unicode-prop",
        }
    }
}

/// Recognized flags (§3), each a single byte after the closing delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    pub case_insensitive: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub extended: bool,
    pub unicode: bool,
    pub swap_greediness: bool,
    pub dollar_endonly: bool,
    pub force_start_anchor: bool,
    pub allow_dup_names: bool,
    pub strict: bool,
    pub no_auto_capture: bool,
    /// Flag bytes after the closing delimiter that aren't part of the
    /// recognized set (§3: "unknown flag bytes are a diagnostic").
    pub unknown: Vec<u8>,
    /// The exact multiset of bytes, preserved verbatim (§3 invariant).
    pub raw: Vec<u8>,
}

impl FlagSet {
    pub fn parse(bytes: &[u8]) -> Self {
        let mut flags = FlagSet {
            raw: bytes.to_vec(),
            ..Default::default()
        };
        for &b in bytes {
            flags.apply(b);
        }
        flags
    }

    /// Applies one flag byte, returning `true` if it was recognized.
    pub fn apply(&mut self, b: u8) -> bool {
        match b {
            b'i' => self.case_insensitive = true,
            b'm' => self.multiline = true,
            b's' => self.dot_all = true,
            b'x' => self.extended = true,
            b'u' => self.unicode = true,
            b'U' => self.swap_greediness = true,
            b'D' => self.dollar_endonly = true,
            b'A' => self.force_start_anchor = true,
            b'J' => self.allow_dup_names = true,
            b'X' => self.strict = true,
            b'n' => self.no_auto_capture = true,
            other => {
                self.unknown.push(other);
                return false;
            }
        }
        true
    }
}

/// The immutable AST produced by [`crate::parser::parse`].
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
    interner: Interner,
}

impl Ast {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn span(&self, id: NodeId) -> ByteSpan {
        self.get(id).span()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol)
    }

    pub fn accept<T>(&self, id: NodeId, visitor: &mut dyn Visitor<T>) -> T {
        visitor::dispatch(self, id, visitor)
    }
}

/// Mutable builder used only during parsing; seals into an immutable [`Ast`]
/// via [`AstBuilder::finish`] (§9: "Builder mutation during construction,
/// immutability afterward").
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
    interner: Interner,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Reads back a node pushed earlier in this same parse, e.g. to inspect
    /// a quantifier's target or to merge adjacent literal runs.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn span(&self, id: NodeId) -> ByteSpan {
        self.get(id).span()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    pub fn finish(self, root: NodeId) -> Ast {
        Ast {
            nodes: self.nodes,
            root,
            interner: self.interner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parse_separates_unknown() {
        let flags = FlagSet::parse(b"imq");
        assert!(flags.case_insensitive);
        assert!(flags.multiline);
        assert_eq!(flags.unknown, vec![b'q']);
        assert_eq!(flags.raw, b"imq");
    }

    #[test]
    fn builder_assigns_increasing_ids() {
        let mut b = AstBuilder::new();
        let a = b.push(Node::Dot {
            span: ByteSpan::new(0, 1),
        });
        let c = b.push(Node::Dot {
            span: ByteSpan::new(1, 2),
        });
        assert_ne!(a, c);
        let ast = b.finish(c);
        assert_eq!(ast.len(), 2);
        assert_eq!(ast.root(), c);
    }
}
