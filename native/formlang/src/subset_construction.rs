//! Subset construction algorithm for converting ε-NFA to DFA.

use crate::dfa::DeterministicAutomaton;
use crate::epsilon_nfa::EpsilonNFA;
use crate::state::{State, StateId, StateSet};
use crate::symbol::Label;
use indexmap::IndexMap;
use log::{debug, trace};

/// Convert an epsilon-NFA to a DFA using the powerset construction algorithm.
///
/// Each DFA state stands for the set of NFA states it was built from and is
/// named by [`State::merged`] over their names.
pub fn subset_construction(nfa: &EpsilonNFA) -> DeterministicAutomaton {
    // Each DFA state corresponds to a set of NFA states
    // We map sets of NFA states to DFA state IDs
    let mut state_mapping: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut dfa = EpsilonNFA::new();
    for &symbol in nfa.symbols() {
        dfa.add_symbol(symbol);
    }

    // Initial DFA state is the epsilon closure of NFA start states
    let initial_set = nfa.epsilon_closure(nfa.start_set());

    if initial_set.is_empty() {
        // No start state - return empty DFA
        return DeterministicAutomaton::new_unchecked(dfa);
    }

    let initial_dfa_state = add_subset(nfa, &mut dfa, &initial_set);
    dfa.set_start(initial_dfa_state, true);
    state_mapping.insert(initial_set.clone(), initial_dfa_state);

    // Queue of DFA states to process (as NFA state sets)
    let mut worklist: Vec<StateSet> = vec![initial_set];

    while let Some(current_nfa_set) = worklist.pop() {
        let current_dfa_state = state_mapping[&current_nfa_set];

        // For each symbol in the alphabet
        for &symbol in nfa.symbols() {
            // Compute the set of NFA states reachable on this symbol
            let next_nfa_set = nfa.move_on_symbol(&current_nfa_set, symbol);

            if next_nfa_set.is_empty() {
                // No transition on this symbol - the DFA stays partial
                continue;
            }

            let next_dfa_state = match state_mapping.get(&next_nfa_set) {
                Some(&existing) => existing,
                None => {
                    let new_state = add_subset(nfa, &mut dfa, &next_nfa_set);
                    trace!("subset {} discovered", dfa.state(new_state));
                    state_mapping.insert(next_nfa_set.clone(), new_state);
                    worklist.push(next_nfa_set);
                    new_state
                }
            };

            dfa.add_transition_by_id(current_dfa_state, Label::Symbol(symbol), next_dfa_state);
        }
    }

    debug!(
        "subset construction: {} NFA states -> {} DFA states, {} transitions",
        nfa.num_states(),
        dfa.num_states(),
        dfa.num_transitions()
    );

    DeterministicAutomaton::new_unchecked(dfa)
}

/// Add the merged state for `subset`; it is final iff it holds a final state.
fn add_subset(nfa: &EpsilonNFA, dfa: &mut EpsilonNFA, subset: &StateSet) -> StateId {
    let name = State::merged(subset.iter().map(|id| nfa.state(id)));
    let id = dfa.add_state(name);
    if subset.intersects(nfa.final_set()) {
        dfa.set_final(id, true);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_construction_basic() {
        // NFA: 0 -a-> 1, 0 -a-> 2, 1 -b-> 3(final), 2 -b-> 3(final)
        let mut nfa = EpsilonNFA::new();
        nfa.add_transition("0", "a", "1");
        nfa.add_transition("0", "a", "2");
        nfa.add_transition("1", "b", "3");
        nfa.add_transition("2", "b", "3");
        nfa.add_start_state("0");
        nfa.add_final_state("3");

        let dfa = subset_construction(&nfa);

        assert!(dfa.is_deterministic());
        assert_eq!(dfa.num_states(), 3);
        assert_eq!(dfa.start_state(), Some(&State::from("{0}")));
        assert_eq!(dfa.transition("{0}", "a"), Some(&State::from("{1;2}")));
        assert_eq!(dfa.transition("{1;2}", "b"), Some(&State::from("{3}")));
        assert!(dfa.is_final("{3}"));
        assert!(dfa.accepts(["a", "b"]));
        assert!(!dfa.accepts(["a"]));
    }

    #[test]
    fn test_subset_construction_with_epsilon() {
        // NFA: 0 -ε-> 1 -a-> 2(final)
        let mut nfa = EpsilonNFA::new();
        nfa.add_epsilon_transition("0", "1");
        nfa.add_transition("1", "a", "2");
        nfa.add_start_state("0");
        nfa.add_final_state("2");

        let dfa = subset_construction(&nfa);

        // Initial DFA state is the epsilon closure of {0}
        assert_eq!(dfa.start_state(), Some(&State::from("{0;1}")));
        assert!(dfa.is_final("{2}"));
        assert!(!dfa.is_final("{0;1}"));
        assert!(dfa.accepts(["a"]));
        assert_eq!(dfa.symbols().len(), 1);
    }

    #[test]
    fn test_merged_finals() {
        // q0 -a-> q1, q0 -a-> q1', both final
        let mut nfa = EpsilonNFA::new();
        nfa.add_start_state("q0");
        nfa.add_transition("q0", "a", "q1");
        nfa.add_transition("q0", "a", "q1'");
        nfa.add_final_state("q1");
        nfa.add_final_state("q1'");

        let dfa = subset_construction(&nfa);
        assert_eq!(dfa.num_states(), 2);
        assert!(dfa.is_final("{q1;q1'}"));
        assert_eq!(dfa.final_states().count(), 1);
    }

    #[test]
    fn test_empty_nfa() {
        let nfa = EpsilonNFA::new();
        let dfa = subset_construction(&nfa);
        assert!(dfa.start_state().is_none());
        assert_eq!(dfa.num_states(), 0);
        assert!(dfa.is_empty());
    }
}
