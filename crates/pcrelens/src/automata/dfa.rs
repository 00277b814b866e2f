//! Subset construction: NFA -> DFA over the full 256-byte alphabet
//! (`spec.md` §4.7.2).
//!
//! Grounds on the same budget-checked-traversal posture as
//! [`super::nfa::translate`]; here the budget is `Config::max_dfa_states`
//! plus a running `Config::max_transitions_processed` counter, since a
//! byte-alphabet subset construction is `O(states * 256)` in the worst case.

use super::nfa::{Nfa, StateId as NfaStateId};
use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

pub type DfaStateId = usize;

#[derive(Debug, Clone)]
pub struct DfaState {
    /// One target per byte value, `None` meaning "no transition" (implicit
    /// reject) until [`Dfa::to_total`] adds an explicit dead state.
    pub transitions: Vec<Option<DfaStateId>>,
    pub is_accept: bool,
}

/// A deterministic automaton built by [`build`]. Not necessarily total —
/// see [`Dfa::to_total`].
#[derive(Debug, Clone)]
pub struct Dfa {
    pub states: Vec<DfaState>,
    pub start: DfaStateId,
    /// `true` once every state has a transition for every byte (i.e. after
    /// [`Dfa::to_total`]).
    pub is_total: bool,
}

impl Dfa {
    pub fn step(&self, state: DfaStateId, byte: u8) -> Option<DfaStateId> {
        self.states[state].transitions[byte as usize]
    }

    pub fn is_accepting(&self, state: DfaStateId) -> bool {
        self.states[state].is_accept
    }

    /// Adds an explicit non-accepting dead state and redirects every
    /// missing transition to it, so every state has exactly 256 outgoing
    /// transitions. Required before [`super::solver::complement`], since
    /// complementing a partial DFA would silently treat "no transition" and
    /// "reject" as the same thing (they are, for subset/equivalence
    /// checks, but complement must flip *every* byte's verdict).
    pub fn to_total(&self) -> Self {
        if self.is_total {
            return self.clone();
        }
        let dead = self.states.len();
        let mut states: Vec<DfaState> = self
            .states
            .iter()
            .map(|s| DfaState {
                transitions: s.transitions.iter().map(|t| Some(t.unwrap_or(dead))).collect(),
                is_accept: s.is_accept,
            })
            .collect();
        states.push(DfaState {
            transitions: vec![Some(dead); 256],
            is_accept: false,
        });
        Dfa {
            states,
            start: self.start,
            is_total: true,
        }
    }

    /// Default minimizer: Hopcroft's algorithm (`Config` has no knob
    /// selecting Moore; callers who want it call
    /// [`super::minimize::minimize_moore`] directly, e.g. to cross-check in
    /// tests).
    pub fn minimize(&self) -> Self {
        super::minimize::minimize_hopcroft(self)
    }
}

struct Builder<'n> {
    nfa: &'n Nfa,
    max_states: u32,
    max_transitions: u64,
    transitions_seen: u64,
}

impl<'n> Builder<'n> {
    fn epsilon_closure(&self, seed: impl IntoIterator<Item = NfaStateId>) -> BTreeSet<NfaStateId> {
        let mut closure: BTreeSet<NfaStateId> = seed.into_iter().collect();
        let mut stack: Vec<NfaStateId> = closure.iter().copied().collect();
        while let Some(s) = stack.pop() {
            for &next in &self.nfa.states[s].epsilons {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }
        closure
    }

    fn step_set(&self, set: &BTreeSet<NfaStateId>, byte: u8) -> BTreeSet<NfaStateId> {
        let mut reached = Vec::new();
        for &s in set {
            for (charset, target) in &self.nfa.states[s].byte_transitions {
                if charset.contains(byte) {
                    reached.push(*target);
                }
            }
        }
        self.epsilon_closure(reached)
    }
}

/// Builds a DFA recognizing the same language as `nfa` via subset
/// construction, budgeted against `config.max_dfa_states` and
/// `config.max_transitions_processed`.
pub fn build(nfa: &Nfa, config: &Config) -> Result<Dfa> {
    let mut builder = Builder {
        nfa,
        max_states: config.max_dfa_states,
        max_transitions: config.max_transitions_processed,
        transitions_seen: 0,
    };

    let start_set = builder.epsilon_closure([nfa.start]);
    let mut registry: HashMap<BTreeSet<NfaStateId>, DfaStateId> = HashMap::new();
    let mut sets: Vec<BTreeSet<NfaStateId>> = Vec::new();
    registry.insert(start_set.clone(), 0);
    sets.push(start_set);

    let mut states: Vec<DfaState> = Vec::new();
    let mut queue = vec![0usize];

    while let Some(id) = queue.pop() {
        while states.len() <= id {
            states.push(DfaState {
                transitions: vec![None; 256],
                is_accept: false,
            });
        }
        let set = sets[id].clone();
        states[id].is_accept = set.contains(&nfa.accept);

        for byte in 0u16..256 {
            let byte = byte as u8;
            builder.transitions_seen += 1;
            if builder.transitions_seen > builder.max_transitions {
                return Err(Error::ResourceLimit {
                    what: "DFA construction exceeded maxTransitionsProcessed".into(),
                    limit: builder.max_transitions,
                });
            }
            let next_set = builder.step_set(&set, byte);
            if next_set.is_empty() {
                continue;
            }
            let next_id = match registry.get(&next_set) {
                Some(&id) => id,
                None => {
                    let id = sets.len();
                    if id as u32 >= builder.max_states {
                        return Err(Error::ResourceLimit {
                            what: "DFA state count exceeds maxDfaStates".into(),
                            limit: builder.max_states as u64,
                        });
                    }
                    registry.insert(next_set.clone(), id);
                    sets.push(next_set.clone());
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
        is_total: false,
    })
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
        build(&nfa, &config).unwrap()
    }

    fn accepts(dfa: &Dfa, input: &[u8]) -> bool {
        let mut state = dfa.start;
        for &b in input {
            match dfa.step(state, b) {
                Some(next) => state = next,
                None => return false,
            }
        }
        dfa.is_accepting(state)
    }

    #[test]
    fn literal_pattern_accepts_only_itself() {
        let dfa = dfa_for("/abc/");
        assert!(accepts(&dfa, b"abc"));
        assert!(!accepts(&dfa, b"abd"));
        assert!(!accepts(&dfa, b"ab"));
    }

    #[test]
    fn star_accepts_empty_and_repeats() {
        let dfa = dfa_for("/a*/");
        assert!(accepts(&dfa, b""));
        assert!(accepts(&dfa, b"aaaa"));
        assert!(!accepts(&dfa, b"aab"));
    }

    #[test]
    fn alternation_accepts_either_branch() {
        let dfa = dfa_for("/cat|dog/");
        assert!(accepts(&dfa, b"cat"));
        assert!(accepts(&dfa, b"dog"));
        assert!(!accepts(&dfa, b"cow"));
    }

    #[test]
    fn to_total_gives_every_state_256_transitions() {
        let dfa = dfa_for("/ab/").to_total();
        for state in &dfa.states {
            assert_eq!(state.transitions.len(), 256);
            assert!(state.transitions.iter().all(Option::is_some));
        }
    }
}
