//! The language-theoretic automata core (`spec.md` §4.7): translates a
//! pattern's regular subset into a Thompson NFA, determinizes it into a
//! DFA, minimizes, and answers equivalence/subset/intersection queries
//! between two patterns via a product automaton.
//!
//! Every stage is budgeted against a [`crate::config::Config`] limit and
//! raises [`crate::error::Error::ResourceLimit`] or
//! [`crate::error::Error::Complexity`] rather than ever looping unbounded —
//! the same posture `crate::parser`'s recursion-depth guard takes, applied
//! here to state-space growth instead of syntax depth.

pub mod charset;
pub mod dfa;
pub mod minimize;
pub mod nfa;
pub mod solver;

use crate::ast::Ast;
use crate::config::Config;
use crate::error::Result;
use dfa::Dfa;
use nfa::Anchoring;

/// Whether a pattern's automaton should recognize it as a full-string match
/// or as PCRE's default unanchored substring search (§4.7's REDESIGN FLAG:
/// outer anchors become ε in `Full` mode and a `Σ* L Σ*` composition in
/// `Partial` mode, PCRE's actual default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    Full,
    #[default]
    Partial,
}

/// A pattern compiled down to a minimized DFA, ready for solver queries.
pub struct CompiledPattern {
    pub dfa: Dfa,
    pub anchoring: Anchoring,
}

/// Translates, determinizes, and minimizes `ast` into a [`CompiledPattern`]
/// under `mode`. `Error::Complexity` propagates untouched from
/// [`nfa::translate`] for anything outside the automata-supported subset.
pub fn compile(ast: &Ast, config: &Config, mode: MatchMode) -> Result<CompiledPattern> {
    let (mut compiled, anchoring) = nfa::translate(ast, config)?;
    if mode == MatchMode::Partial {
        if !anchoring.start {
            nfa::prepend_sigma_star(&mut compiled);
        }
        if !anchoring.end {
            nfa::append_sigma_star(&mut compiled);
        }
    }
    let raw = dfa::build(&compiled, config)?;
    Ok(CompiledPattern {
        dfa: raw.minimize(),
        anchoring,
    })
}
