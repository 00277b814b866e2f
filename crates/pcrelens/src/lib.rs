//! Static analysis for PCRE-flavored regular expressions: a tokenizer and
//! recursive-descent parser producing a byte-spanned AST, a semantic
//! validator, a ReDoS/catastrophic-backtracking risk analyzer, and a
//! language-theoretic NFA/DFA-based equivalence/subset/intersection solver.
//!
//! [`Analyzer`] is the facade most callers want; the individual stages
//! ([`parser::parse`], [`validate::validate`], [`redos::analyze`],
//! [`automata::compile`]) are also public for callers who only need one of
//! them.

pub mod ast;
pub mod automata;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod reader;
pub mod redos;
pub mod span;
pub mod validate;

pub use ast::Ast;
pub use config::{Config, ConfigBuilder, PcreVersion};
pub use error::{Error, Result};

use automata::solver::Counterexample;
use automata::{CompiledPattern, MatchMode};
use lexer::{Token, Tokenizer};
use redos::ReDoSAnalysis;
use validate::ValidationResult;

/// The bundled result of running every analysis stage over one pattern
/// (§6).
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub ast: Ast,
    pub validation: ValidationResult,
    pub redos: ReDoSAnalysis,
}

/// Configuration-bearing facade over the whole crate (§6). Validates its
/// [`Config`] eagerly at construction, matching the teacher's
/// validate-before-use posture for configuration-bearing types.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: Config,
}

impl Analyzer {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tokenizes a full delimited regex literal (e.g. `/(a+)+b/i`), for
    /// callers that want raw tokens without building an AST.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>> {
        let split = reader::split(source)?;
        let flags = ast::FlagSet::parse(split.flags.as_bytes());
        let mut tok = Tokenizer::new_in_range(
            source,
            split.body_start as usize,
            split.body_end as usize,
            flags.extended,
        );
        let mut tokens = Vec::new();
        loop {
            let t = tok.next_token();
            let is_eof = t.kind == lexer::TokenKind::Eof;
            tokens.push(t);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    pub fn parse(&self, source: &str) -> Result<Ast> {
        parser::parse(source, &self.config)
    }

    /// Tolerant counterpart of [`Analyzer::parse`] (§4.3, §6): never
    /// aborts on a `SyntaxError`/`SemanticError` mid-pattern, returning the
    /// partial [`Ast`] plus every recorded error instead. Still aborts on
    /// `RecursionLimit`/`ResourceLimit` (§5).
    pub fn parse_tolerant(&self, source: &str) -> Result<(Ast, Vec<Error>)> {
        parser::parse_tolerant(source, &self.config)
    }

    pub fn validate(&self, ast: &Ast, source: &str) -> ValidationResult {
        validate::validate(ast, source, &self.config)
    }

    pub fn redos(&self, ast: &Ast, source: &str) -> ReDoSAnalysis {
        redos::analyze(ast, source, &self.config)
    }

    /// Runs parsing, validation, and ReDoS analysis over `source` in one
    /// call.
    pub fn analyze(&self, source: &str) -> Result<AnalysisReport> {
        let ast = self.parse(source)?;
        let validation = self.validate(&ast, source);
        let redos = self.redos(&ast, source);
        Ok(AnalysisReport { ast, validation, redos })
    }

    /// Entry point for the automata-based equivalence/subset/intersection
    /// solver (§5). A separate struct rather than methods on `Analyzer`
    /// itself since these operations take *two* patterns, not one.
    pub fn solve(&self) -> Solver<'_> {
        Solver { config: &self.config }
    }
}

/// Compares two patterns' automata-supported regular languages.
/// `Error::Complexity` propagates from [`automata::nfa::translate`]
/// whenever either pattern uses a construct outside the supported subset
/// (lookaround, backreferences, subroutines, conditionals, verbs, `\K`,
/// Unicode property classes).
pub struct Solver<'a> {
    config: &'a Config,
}

impl<'a> Solver<'a> {
    fn compile(&self, source: &str, mode: MatchMode) -> Result<CompiledPattern> {
        let ast = parser::parse(source, self.config)?;
        automata::compile(&ast, self.config, mode)
    }

    /// `None` if the two patterns' automata-supported languages coincide
    /// under `mode`; otherwise the shortest, lexicographically smallest
    /// string distinguishing them (§8).
    pub fn equivalent(&self, a: &str, b: &str, mode: MatchMode) -> Result<Option<Counterexample>> {
        let a = self.compile(a, mode)?;
        let b = self.compile(b, mode)?;
        automata::solver::equivalent(&a.dfa, &b.dfa, self.config)
    }

    /// `None` if every string `a` matches is also matched by `b` under
    /// `mode` (i.e. `L(a) ⊆ L(b)`); otherwise a witness `a` accepts that
    /// `b` rejects.
    pub fn subset_of(&self, a: &str, b: &str, mode: MatchMode) -> Result<Option<Counterexample>> {
        let a = self.compile(a, mode)?;
        let b = self.compile(b, mode)?;
        automata::solver::subset_of(&a.dfa, &b.dfa, self.config)
    }

    /// The minimized DFA recognizing `L(a) ∩ L(b)` under `mode`.
    pub fn intersection(&self, a: &str, b: &str, mode: MatchMode) -> Result<automata::dfa::Dfa> {
        let a = self.compile(a, mode)?;
        let b = self.compile(b, mode)?;
        let product = automata::solver::intersection(&a.dfa, &b.dfa, self.config)?;
        Ok(product.minimize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> Analyzer {
        Analyzer::new(Config::default()).unwrap()
    }

    #[test]
    fn analyze_reports_both_validation_and_redos_findings() {
        let report = analyzer().analyze("/(a+)+b/").unwrap();
        assert!(!report.redos.is_safe());
        assert!(report.validation.is_valid());
    }

    #[test]
    fn tokenize_reaches_eof() {
        let tokens = analyzer().tokenize("/abc/i").unwrap();
        assert_eq!(tokens.last().unwrap().kind, lexer::TokenKind::Eof);
    }

    #[test]
    fn solver_finds_equivalent_alternation_orderings() {
        let solver = analyzer().solve();
        let result = solver.equivalent("/cat|dog/", "/dog|cat/", MatchMode::Full).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn solver_surfaces_complexity_error_for_unsupported_constructs() {
        let solver = analyzer().solve();
        let err = solver.equivalent("/(?=a)b/", "/ab/", MatchMode::Full).unwrap_err();
        assert!(matches!(err, Error::Complexity { .. }));
    }
}
