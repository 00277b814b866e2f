//! Language-theoretic solver: intersection, subset, and equivalence over
//! two DFAs via a product automaton and BFS counterexample search
//! (`spec.md` §4.7.4, §5).
//!
//! No teacher analogue; grounds on the standard textbook product-automaton
//! construction. Byte transitions are always tried in increasing numeric
//! order during the BFS, which (a well known property of BFS over a
//! totally ordered alphabet) guarantees that the first accepting path found
//! is both shortest and, among paths of that length, lexicographically
//! smallest — satisfying §8's "shortest and lexicographically smallest
//! counterexample" requirement.

use super::dfa::{Dfa, DfaStateId};
use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::{HashMap, VecDeque};

/// A concrete input string demonstrating that two automata disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    pub input: Vec<u8>,
}

/// Builds the product automaton recognizing `L(a) ∩ L(b)`.
pub fn intersection(a: &Dfa, b: &Dfa, config: &Config) -> Result<Dfa> {
    let a = a.to_total();
    let b = b.to_total();
    build_product(&a, &b, config, |aa, bb| aa && bb)
}

/// `Some(witness)` if `a` accepts a string `b` rejects (i.e. `L(a) ⊄ L(b)`);
/// `None` if `L(a) ⊆ L(b)`.
pub fn subset_of(a: &Dfa, b: &Dfa, config: &Config) -> Result<Option<Counterexample>> {
    let a = a.to_total();
    let b = b.to_total();
    bfs_witness(&a, &b, config, |aa, bb| aa && !bb)
}

/// `Some(witness)` if `L(a) != L(b)`; `None` if the languages coincide.
pub fn equivalent(a: &Dfa, b: &Dfa, config: &Config) -> Result<Option<Counterexample>> {
    let a = a.to_total();
    let b = b.to_total();
    bfs_witness(&a, &b, config, |aa, bb| aa != bb)
}

fn build_product(a: &Dfa, b: &Dfa, config: &Config, accept_rule: impl Fn(bool, bool) -> bool) -> Result<Dfa> {
    let mut registry: HashMap<(DfaStateId, DfaStateId), usize> = HashMap::new();
    let mut pairs: Vec<(DfaStateId, DfaStateId)> = Vec::new();
    let start_pair = (a.start, b.start);
    registry.insert(start_pair, 0);
    pairs.push(start_pair);

    let mut states = Vec::new();
    let mut queue = vec![0usize];
    let mut transitions_seen: u64 = 0;

    while let Some(id) = queue.pop() {
        while states.len() <= id {
            states.push(super::dfa::DfaState {
                transitions: vec![None; 256],
                is_accept: false,
            });
        }
        let (pa, pb) = pairs[id];
        states[id].is_accept = accept_rule(a.is_accepting(pa), b.is_accepting(pb));

        for byte in 0u16..256 {
            transitions_seen += 1;
            if transitions_seen > config.max_transitions_processed {
                return Err(Error::ResourceLimit {
                    what: "product automaton construction exceeded maxTransitionsProcessed".into(),
                    limit: config.max_transitions_processed,
                });
            }
            let byte = byte as u8;
            let (na, nb) = (a.step(pa, byte).unwrap(), b.step(pb, byte).unwrap());
            let next_pair = (na, nb);
            let next_id = match registry.get(&next_pair) {
                Some(&id) => id,
                None => {
                    let id = pairs.len();
                    if id as u32 >= config.max_dfa_states {
                        return Err(Error::ResourceLimit {
                            what: "product automaton exceeds maxDfaStates".into(),
                            limit: config.max_dfa_states as u64,
                        });
                    }
                    registry.insert(next_pair, id);
                    pairs.push(next_pair);
                    queue.push(id);
                    id
                }
            };
            states[id].transitions[byte as usize] = Some(next_id);
        }
    }

    Ok(Dfa {
        states,
        start: 0,
        is_total: true,
    })
}

/// BFS over state pairs `(a_state, b_state)`, trying bytes in increasing
/// order, returning the first input for which `predicate(a_accepts,
/// b_accepts)` holds.
fn bfs_witness(
    a: &Dfa,
    b: &Dfa,
    config: &Config,
    predicate: impl Fn(bool, bool) -> bool,
) -> Result<Option<Counterexample>> {
    let start = (a.start, b.start);
    if predicate(a.is_accepting(start.0), b.is_accepting(start.1)) {
        return Ok(Some(Counterexample { input: Vec::new() }));
    }

    let mut visited: HashMap<(DfaStateId, DfaStateId), ()> = HashMap::new();
    visited.insert(start, ());
    let mut queue: VecDeque<((DfaStateId, DfaStateId), Vec<u8>)> = VecDeque::new();
    queue.push_back((start, Vec::new()));

    let mut explored: u64 = 0;
    while let Some((pair, path)) = queue.pop_front() {
        for byte in 0u16..256 {
            explored += 1;
            if explored > config.max_transitions_processed {
                return Err(Error::ResourceLimit {
                    what: "counterexample search exceeded maxTransitionsProcessed".into(),
                    limit: config.max_transitions_processed,
                });
            }
            let byte = byte as u8;
            let next = (a.step(pair.0, byte).unwrap(), b.step(pair.1, byte).unwrap());
            if visited.contains_key(&next) {
                continue;
            }
            visited.insert(next, ());
            if visited.len() as u32 > config.max_dfa_states {
                return Err(Error::ResourceLimit {
                    what: "counterexample search exceeds maxDfaStates".into(),
                    limit: config.max_dfa_states as u64,
                });
            }
            let mut next_path = path.clone();
            next_path.push(byte);
            if predicate(a.is_accepting(next.0), b.is_accepting(next.1)) {
                return Ok(Some(Counterexample { input: next_path }));
            }
            queue.push_back((next, next_path));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::nfa::translate;
    use crate::parser::parse;

    fn dfa_for(source: &str) -> Dfa {
        let config = Config::default();
        let ast = parse(source, &config).unwrap();
        let (nfa, _) = translate(&ast, &config).unwrap();
        super::super::dfa::build(&nfa, &config).unwrap()
    }

    #[test]
    fn identical_patterns_are_equivalent() {
        let config = Config::default();
        let a = dfa_for("/cat|dog/");
        let b = dfa_for("/dog|cat/");
        assert_eq!(equivalent(&a, &b, &config).unwrap(), None);
    }

    #[test]
    fn different_patterns_produce_a_counterexample() {
        let config = Config::default();
        let a = dfa_for("/ab*/");
        let b = dfa_for("/ab+/");
        let witness = equivalent(&a, &b, &config).unwrap().expect("should differ");
        assert_eq!(witness.input, b"a");
    }

    #[test]
    fn subset_relationship_is_detected() {
        let config = Config::default();
        let narrow = dfa_for("/ab+/");
        let wide = dfa_for("/ab*/");
        assert_eq!(subset_of(&narrow, &wide, &config).unwrap(), None);
        let witness = subset_of(&wide, &narrow, &config).unwrap().expect("a should not be subset of b");
        assert_eq!(witness.input, b"a");
    }

    #[test]
    fn intersection_recognizes_common_language() {
        let config = Config::default();
        let a = dfa_for("/a.*c/");
        let b = dfa_for("/a.*d/");
        let inter = intersection(&a, &b, &config).unwrap();
        assert_eq!(equivalent(&inter, &inter, &config).unwrap(), None);
    }
}
