//! DFA minimization (`spec.md` §4.7.3): Moore's algorithm as a readable
//! baseline, Hopcroft's as the production default.
//!
//! No teacher analogue; grounds on the standard partition-refinement
//! presentation of both algorithms (see `DESIGN.md`). Both operate on the
//! DFA's [`Dfa::to_total`] form, since reasoning about "two states are
//! equivalent" requires a transition defined for every byte.

use super::dfa::{Dfa, DfaState, DfaStateId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Merges states with identical future behavior by repeatedly refining a
/// partition until no byte distinguishes any two states in the same block.
/// `O(n^2 * 256)` in the worst case; kept around as a readable cross-check
/// for [`minimize_hopcroft`] in tests.
pub fn minimize_moore(dfa: &Dfa) -> Dfa {
    let total = dfa.to_total();
    let n = total.states.len();

    // Initial partition: accepting vs non-accepting.
    let mut class: Vec<usize> = total.states.iter().map(|s| s.is_accept as usize).collect();
    let mut num_classes = 2;

    loop {
        let mut signature_to_class: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut new_class = vec![0usize; n];
        for state in 0..n {
            let mut signature = Vec::with_capacity(257);
            signature.push(class[state]);
            for byte in 0..256 {
                let target = total.states[state].transitions[byte].unwrap();
                signature.push(class[target]);
            }
            let next = signature_to_class.len();
            let id = *signature_to_class.entry(signature).or_insert(next);
            new_class[state] = id;
        }
        let new_count = signature_to_class.len();
        if new_count == num_classes {
            class = new_class;
            break;
        }
        class = new_class;
        num_classes = new_count;
    }

    rebuild_from_classes(&total, &class, num_classes)
}

/// Hopcroft's algorithm: a worklist of `(block, byte)` splitters, each used
/// once to refine every block it distinguishes. `Dfa::minimize()`'s default.
pub fn minimize_hopcroft(dfa: &Dfa) -> Dfa {
    let total = dfa.to_total();
    let n = total.states.len();
    if n == 0 {
        return total;
    }

    let accepting: HashSet<DfaStateId> = (0..n).filter(|&s| total.states[s].is_accept).collect();
    let non_accepting: HashSet<DfaStateId> = (0..n).filter(|&s| !total.states[s].is_accept).collect();

    let mut partition: Vec<HashSet<DfaStateId>> = Vec::new();
    if !accepting.is_empty() {
        partition.push(accepting.clone());
    }
    if !non_accepting.is_empty() {
        partition.push(non_accepting.clone());
    }

    let mut worklist: VecDeque<(usize, u8)> = VecDeque::new();
    // Seed with the smaller of the two initial blocks for each byte, the
    // standard trick that bounds Hopcroft's running time.
    let seed_block = if accepting.len() <= non_accepting.len() { 0 } else { 1 };
    if partition.len() == 2 {
        for byte in 0..=255u16 {
            worklist.push_back((seed_block, byte as u8));
        }
    }

    // Reverse transition index: for a given byte, which states lead into a
    // given state.
    let mut predecessors: Vec<Vec<Vec<DfaStateId>>> = vec![vec![Vec::new(); n]; 256];
    for state in 0..n {
        for byte in 0..256 {
            let target = total.states[state].transitions[byte].unwrap();
            predecessors[byte][target].push(state);
        }
    }

    while let Some((block_idx, byte)) = worklist.pop_front() {
        if block_idx >= partition.len() {
            continue;
        }
        let splitter = partition[block_idx].clone();
        let mut preimage: HashSet<DfaStateId> = HashSet::new();
        for &s in &splitter {
            for &p in &predecessors[byte as usize][s] {
                preimage.insert(p);
            }
        }
        if preimage.is_empty() {
            continue;
        }

        let mut next_partition = Vec::with_capacity(partition.len() + 1);
        let mut next_worklist_additions: Vec<(usize, HashSet<DfaStateId>, HashSet<DfaStateId>)> = Vec::new();

        for (idx, block) in partition.iter().enumerate() {
            let in_preimage: HashSet<DfaStateId> = block.intersection(&preimage).copied().collect();
            if in_preimage.is_empty() || in_preimage.len() == block.len() {
                next_partition.push(block.clone());
                continue;
            }
            let out_preimage: HashSet<DfaStateId> = block.difference(&in_preimage).copied().collect();
            let new_idx_in = next_partition.len();
            next_partition.push(in_preimage.clone());
            let new_idx_out = next_partition.len();
            next_partition.push(out_preimage.clone());
            next_worklist_additions.push((idx, in_preimage, out_preimage));
            let _ = (new_idx_in, new_idx_out);
        }

        if next_worklist_additions.is_empty() {
            continue;
        }

        partition = next_partition;

        // Any splitter `(idx, b)` already queued that referenced a block we
        // just split must be replaced by both halves; plus queue the new
        // halves against every byte, since a freshly split block may now
        // distinguish states it didn't before.
        let mut rebuilt_worklist: VecDeque<(usize, u8)> = VecDeque::new();
        'outer: for &(w_idx, w_byte) in &worklist {
            for (old_idx, in_set, out_set) in &next_worklist_additions {
                if w_idx == *old_idx {
                    if let Some(pos) = partition.iter().position(|b| b == in_set) {
                        rebuilt_worklist.push_back((pos, w_byte));
                    }
                    if let Some(pos) = partition.iter().position(|b| b == out_set) {
                        rebuilt_worklist.push_back((pos, w_byte));
                    }
                    continue 'outer;
                }
            }
            rebuilt_worklist.push_back((w_idx, w_byte));
        }
        worklist = rebuilt_worklist;

        for (_, in_set, out_set) in &next_worklist_additions {
            let in_idx = partition.iter().position(|b| b == in_set).unwrap();
            let out_idx = partition.iter().position(|b| b == out_set).unwrap();
            let smaller = if in_set.len() <= out_set.len() { in_idx } else { out_idx };
            for b in 0..=255u16 {
                worklist.push_back((smaller, b as u8));
            }
        }
    }

    let mut class = vec![0usize; n];
    for (idx, block) in partition.iter().enumerate() {
        for &s in block {
            class[s] = idx;
        }
    }
    rebuild_from_classes(&total, &class, partition.len())
}

fn rebuild_from_classes(total: &Dfa, class: &[usize], num_classes: usize) -> Dfa {
    let mut representative = vec![usize::MAX; num_classes];
    for (state, &c) in class.iter().enumerate() {
        if representative[c] == usize::MAX {
            representative[c] = state;
        }
    }

    let mut states = Vec::with_capacity(num_classes);
    for &rep in &representative {
        let transitions = total.states[rep]
            .transitions
            .iter()
            .map(|t| t.map(|target| class[target]))
            .collect();
        states.push(DfaState {
            transitions,
            is_accept: total.states[rep].is_accept,
        });
    }

    Dfa {
        states,
        start: class[total.start],
        is_total: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::nfa::translate;
    use crate::config::Config;
    use crate::parser::parse;

    fn dfa_for(source: &str) -> Dfa {
        let config = Config::default();
        let ast = parse(source, &config).unwrap();
        let (nfa, _) = translate(&ast, &config).unwrap();
        super::super::dfa::build(&nfa, &config).unwrap()
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
    fn moore_and_hopcroft_agree_on_state_count() {
        let dfa = dfa_for("/a(b|c)*d/");
        let moore = minimize_moore(&dfa);
        let hopcroft = minimize_hopcroft(&dfa);
        assert_eq!(moore.states.len(), hopcroft.states.len());
    }

    #[test]
    fn minimized_dfa_preserves_language() {
        let dfa = dfa_for("/a(b|c)*d/");
        let min = minimize_hopcroft(&dfa);
        for input in [&b"ad"[..], b"abcd", b"abbccbd", b"a", b"ae"] {
            assert_eq!(accepts(&dfa, input), accepts(&min, input), "input: {input:?}");
        }
    }

    #[test]
    fn minimization_can_shrink_redundant_states() {
        let dfa = dfa_for("/(a|a)/");
        let min = minimize_hopcroft(&dfa);
        assert!(min.states.len() <= dfa.states.len());
    }
}
