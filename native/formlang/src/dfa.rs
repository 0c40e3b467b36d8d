//! Deterministic Finite Automaton (DFA) implementation with Hopcroft minimization.

use crate::dsu::Dsu;
use crate::epsilon_nfa::EpsilonNFA;
use crate::error::{FormlangError, Result};
use crate::state::{State, StateId, StateSet};
use crate::symbol::{Label, Symbol};
use indexmap::IndexSet;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::ops::Deref;

/// An automaton known to be deterministic.
///
/// The transition function may be partial: a missing transition rejects the
/// rest of the word. All read-only queries of [`EpsilonNFA`] are available
/// through `Deref`.
#[derive(Debug, Clone, Default)]
pub struct DeterministicAutomaton {
    nfa: EpsilonNFA,
}

impl DeterministicAutomaton {
    /// Wrap an automaton built deterministic by construction.
    pub(crate) fn new_unchecked(nfa: EpsilonNFA) -> Self {
        debug_assert!(nfa.is_deterministic());
        Self { nfa }
    }

    /// Get the start state (None if the automaton has no states).
    pub fn start_state(&self) -> Option<&State> {
        self.nfa.start_states().next()
    }

    fn start_id(&self) -> Option<StateId> {
        self.nfa.start_set().iter().next()
    }

    /// Get the transition from a state on a symbol.
    pub fn transition(&self, source: impl AsRef<str>, symbol: impl Into<Symbol>) -> Option<&State> {
        let source = self.nfa.state_id(source)?;
        self.next_id(source, symbol.into())
            .map(|id| self.nfa.state(id))
    }

    fn next_id(&self, source: StateId, symbol: Symbol) -> Option<StateId> {
        self.nfa
            .table()
            .get(source, Label::Symbol(symbol))
            .and_then(|destinations| destinations.iter().next())
    }

    /// Check whether `word` is accepted, following the single active state.
    /// Epsilon entries of the word are skipped.
    pub fn accepts<L: Into<Label>>(&self, word: impl IntoIterator<Item = L>) -> bool {
        let Some(mut current) = self.start_id() else {
            return false;
        };

        for label in word {
            let Label::Symbol(symbol) = label.into() else {
                continue;
            };
            match self.next_id(current, symbol) {
                Some(next) => current = next,
                None => return false,
            }
        }

        self.nfa.final_set().contains(current)
    }

    /// Check if the DFA is empty (accepts no strings).
    pub fn is_empty(&self) -> bool {
        let reachable = self.find_reachable_states();
        !reachable.intersects(self.nfa.final_set())
    }

    pub fn as_nfa(&self) -> &EpsilonNFA {
        &self.nfa
    }

    pub fn into_nfa(self) -> EpsilonNFA {
        self.nfa
    }

    /// Minimize the DFA using Hopcroft's algorithm.
    /// Returns a new minimized DFA.
    ///
    /// Unreachable states are dropped first. Missing transitions are treated
    /// as going to an implicit dead state; every state equivalent to it is
    /// dropped from the result, so the result stays partial. Each remaining
    /// block becomes one state named by [`State::merged`] over its members.
    pub fn minimize(&self) -> DeterministicAutomaton {
        let Some(start) = self.start_id() else {
            return DeterministicAutomaton::default();
        };

        let symbols: Vec<Symbol> = self.nfa.symbols().iter().copied().collect();
        let sink = self.nfa.num_states() as StateId;
        let delta = |state: StateId, symbol: Symbol| -> StateId {
            if state == sink {
                sink
            } else {
                self.next_id(state, symbol).unwrap_or(sink)
            }
        };

        // Only reachable states plus the dead state take part
        let mut universe = self.find_reachable_states();
        universe.insert(sink);

        // Reverse transitions: (destination, symbol) -> set of sources
        let mut reverse_transitions: HashMap<(StateId, Symbol), StateSet> = HashMap::new();
        for state in universe.iter() {
            for &symbol in &symbols {
                reverse_transitions
                    .entry((delta(state, symbol), symbol))
                    .or_default()
                    .insert(state);
            }
        }

        // Initial partition: final states and non-final states
        let final_reachable = universe.intersection(self.nfa.final_set());
        let non_final_reachable = universe.difference(self.nfa.final_set());

        let mut partitions: Vec<StateSet> = [final_reachable, non_final_reachable]
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect();

        // Worklist of (partition_index, symbol) pairs to process
        let mut worklist: VecDeque<(usize, Symbol)> = VecDeque::new();
        for idx in 0..partitions.len() {
            for &symbol in &symbols {
                worklist.push_back((idx, symbol));
            }
        }

        // Main refinement loop
        while let Some((splitter_idx, symbol)) = worklist.pop_front() {
            let splitter = partitions[splitter_idx].clone();

            // States that reach the splitter on this symbol
            let mut predecessors = StateSet::with_capacity(universe.len());
            for target in splitter.iter() {
                if let Some(sources) = reverse_transitions.get(&(target, symbol)) {
                    predecessors.union_with(sources);
                }
            }

            if predecessors.is_empty() {
                continue;
            }

            // Try to split each partition
            let mut new_partitions = Vec::new();

            for (part_idx, partition) in partitions.iter().enumerate() {
                let intersection = partition.intersection(&predecessors);
                let difference = partition.difference(&predecessors);

                if !intersection.is_empty() && !difference.is_empty() {
                    // Keep the larger part in place, queue the smaller one
                    let (keep, add) = if intersection.len() <= difference.len() {
                        (difference, intersection)
                    } else {
                        (intersection, difference)
                    };

                    new_partitions.push((part_idx, keep, add));
                }
            }

            // Apply splits
            for (part_idx, keep, add) in new_partitions {
                let new_idx = partitions.len();
                partitions[part_idx] = keep;
                partitions.push(add);

                for &sym in &symbols {
                    worklist.push_back((new_idx, sym));
                }
            }
        }

        let minimized = self.build_minimized_dfa(&partitions, start, sink, &symbols, delta);
        debug!(
            "minimization: {} states -> {} states",
            self.nfa.num_states(),
            minimized.num_states()
        );
        minimized
    }

    /// Find all states reachable from the start state.
    fn find_reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.nfa.num_states());

        let Some(start) = self.start_id() else {
            return reachable;
        };

        let mut queue = VecDeque::new();
        reachable.insert(start);
        queue.push_back(start);

        while let Some(state) = queue.pop_front() {
            for &symbol in self.nfa.symbols() {
                if let Some(next) = self.next_id(state, symbol) {
                    if reachable.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        reachable
    }

    /// Build a minimized DFA from partitions.
    fn build_minimized_dfa(
        &self,
        partitions: &[StateSet],
        start: StateId,
        sink: StateId,
        symbols: &[Symbol],
        delta: impl Fn(StateId, Symbol) -> StateId,
    ) -> DeterministicAutomaton {
        let mut minimized = EpsilonNFA::new();
        for &symbol in symbols {
            minimized.add_symbol(symbol);
        }

        let dead_block = partitions.iter().position(|block| block.contains(sink));
        let block_of = |state: StateId| partitions.iter().position(|block| block.contains(state));
        let start_block = block_of(start);

        // Map each live partition to its new state
        let mut new_ids: HashMap<usize, StateId> = HashMap::new();
        for (part_idx, partition) in partitions.iter().enumerate() {
            if Some(part_idx) == dead_block && Some(part_idx) != start_block {
                continue;
            }
            let name = State::merged(
                partition
                    .iter()
                    .filter(|&state| state != sink)
                    .map(|state| self.nfa.state(state)),
            );
            let id = minimized.add_state(name);
            minimized.set_final(id, partition.intersects(self.nfa.final_set()));
            new_ids.insert(part_idx, id);
        }

        if let Some(new_start) = start_block.and_then(|idx| new_ids.get(&idx)) {
            minimized.set_start(*new_start, true);
        }

        // Add transitions (use representative state from each partition)
        for (part_idx, partition) in partitions.iter().enumerate() {
            if Some(part_idx) == dead_block {
                continue;
            }
            let (Some(&source), Some(representative)) =
                (new_ids.get(&part_idx), partition.iter().next())
            else {
                continue;
            };
            for &symbol in symbols {
                let target_block = block_of(delta(representative, symbol));
                if target_block == dead_block {
                    continue;
                }
                if let Some(&dest) = target_block.and_then(|idx| new_ids.get(&idx)) {
                    minimized.add_transition_by_id(source, Label::Symbol(symbol), dest);
                }
            }
        }

        DeterministicAutomaton::new_unchecked(minimized)
    }

    /// Check whether both automata accept the same language, using the
    /// Hopcroft-Karp union-find algorithm. Missing transitions go to an
    /// implicit dead state on each side.
    pub fn is_equivalent_to(&self, other: &DeterministicAutomaton) -> bool {
        let sink1 = self.nfa.num_states();
        let offset = sink1 + 1;
        let sink2 = offset + other.nfa.num_states();

        let symbols: IndexSet<Symbol> = self
            .nfa
            .symbols()
            .iter()
            .chain(other.nfa.symbols())
            .copied()
            .collect();

        // Work with indices over both automata: [a1 states, sink1, a2 states, sink2]
        let step = |state: usize, symbol: Symbol| -> usize {
            if state < sink1 {
                self.next_id(state as StateId, symbol)
                    .map_or(sink1, |next| next as usize)
            } else if state > sink1 && state < sink2 {
                other
                    .next_id((state - offset) as StateId, symbol)
                    .map_or(sink2, |next| next as usize + offset)
            } else {
                state
            }
        };
        let accepting = |state: usize| -> bool {
            if state < sink1 {
                self.nfa.final_set().contains(state as StateId)
            } else if state > sink1 && state < sink2 {
                other.nfa.final_set().contains((state - offset) as StateId)
            } else {
                false
            }
        };

        let start1 = self.start_id().map_or(sink1, |start| start as usize);
        let start2 = other
            .start_id()
            .map_or(sink2, |start| start as usize + offset);

        let mut dsu = Dsu::new(sink2 + 1);
        dsu.union(start1, start2);
        let mut stack = vec![(start1, start2)];

        while let Some((s1, s2)) = stack.pop() {
            if accepting(s1) != accepting(s2) {
                return false;
            }

            for &symbol in &symbols {
                let next1 = step(s1, symbol);
                let next2 = step(s2, symbol);
                if dsu.union(next1, next2) {
                    stack.push((next1, next2));
                }
            }
        }

        true
    }
}

impl Deref for DeterministicAutomaton {
    type Target = EpsilonNFA;

    fn deref(&self) -> &EpsilonNFA {
        &self.nfa
    }
}

impl TryFrom<EpsilonNFA> for DeterministicAutomaton {
    type Error = FormlangError;

    fn try_from(nfa: EpsilonNFA) -> Result<Self> {
        if nfa.is_deterministic() {
            Ok(Self { nfa })
        } else {
            Err(FormlangError::NotDeterministic)
        }
    }
}

impl From<DeterministicAutomaton> for EpsilonNFA {
    fn from(dfa: DeterministicAutomaton) -> Self {
        dfa.nfa
    }
}
