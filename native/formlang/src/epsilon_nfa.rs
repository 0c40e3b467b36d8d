//! Epsilon Non-deterministic Finite Automaton (ε-NFA) implementation.

use crate::state::{State, StateId, StateSet};
use crate::symbol::{Label, Symbol};
use crate::transition::TransitionTable;
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, VecDeque};

/// An Epsilon Non-deterministic Finite Automaton.
///
/// States live in an insertion-ordered arena and are addressed internally by
/// their [`StateId`] (arena index). Adding a transition or marking a state as
/// start or final inserts the state if it is not known yet; states are never
/// removed from the arena.
#[derive(Debug, Clone, Default)]
pub struct EpsilonNFA {
    /// State arena; a state's index is its id
    states: IndexSet<State>,
    /// All symbols declared or used (never epsilon)
    symbols: IndexSet<Symbol>,
    /// Transitions: (source, label) -> set of destination states
    transitions: TransitionTable,
    /// Start states
    start_states: StateSet,
    /// Final (accepting) states
    final_states: StateSet,
}

impl EpsilonNFA {
    /// Create a new empty epsilon-NFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state, returning its id. Adding a known state returns its
    /// existing id.
    pub fn add_state(&mut self, state: impl Into<State>) -> StateId {
        let (id, _) = self.states.insert_full(state.into());
        id as StateId
    }

    /// Declare a symbol of the input alphabet.
    pub fn add_symbol(&mut self, symbol: impl Into<Symbol>) -> bool {
        self.symbols.insert(symbol.into())
    }

    /// Add a start state.
    pub fn add_start_state(&mut self, state: impl Into<State>) -> bool {
        let id = self.add_state(state);
        self.start_states.insert(id)
    }

    /// Unmark a start state. Unknown states are ignored.
    pub fn remove_start_state(&mut self, state: impl AsRef<str>) -> bool {
        match self.state_id(state) {
            Some(id) => self.start_states.remove(id),
            None => false,
        }
    }

    /// Add a final (accepting) state.
    pub fn add_final_state(&mut self, state: impl Into<State>) -> bool {
        let id = self.add_state(state);
        self.final_states.insert(id)
    }

    /// Unmark a final state. Unknown states are ignored.
    pub fn remove_final_state(&mut self, state: impl AsRef<str>) -> bool {
        match self.state_id(state) {
            Some(id) => self.final_states.remove(id),
            None => false,
        }
    }

    /// Add a transition from source to destination on the given label.
    /// An ordinary symbol also joins the alphabet.
    pub fn add_transition(
        &mut self,
        source: impl Into<State>,
        label: impl Into<Label>,
        destination: impl Into<State>,
    ) -> bool {
        let source = self.add_state(source);
        let destination = self.add_state(destination);
        self.add_transition_by_id(source, label.into(), destination)
    }

    /// Add an epsilon transition from source to destination.
    pub fn add_epsilon_transition(
        &mut self,
        source: impl Into<State>,
        destination: impl Into<State>,
    ) -> bool {
        self.add_transition(source, Label::Epsilon, destination)
    }

    /// Remove exactly one transition. Missing transitions are ignored.
    pub fn remove_transition(
        &mut self,
        source: impl AsRef<str>,
        label: impl Into<Label>,
        destination: impl AsRef<str>,
    ) -> bool {
        let (Some(source), Some(destination)) = (self.state_id(source), self.state_id(destination))
        else {
            return false;
        };
        self.transitions.remove(source, label.into(), destination)
    }

    pub(crate) fn add_transition_by_id(
        &mut self,
        source: StateId,
        label: Label,
        destination: StateId,
    ) -> bool {
        if let Label::Symbol(symbol) = label {
            self.symbols.insert(symbol);
        }
        self.transitions.add(source, label, destination)
    }

    pub(crate) fn set_start(&mut self, state: StateId, start: bool) {
        if start {
            self.start_states.insert(state);
        } else {
            self.start_states.remove(state);
        }
    }

    pub(crate) fn set_final(&mut self, state: StateId, accepting: bool) {
        if accepting {
            self.final_states.insert(state);
        } else {
            self.final_states.remove(state);
        }
    }

    /// A state named after `base` that is not in the automaton yet.
    pub(crate) fn fresh_state(&self, base: &str) -> State {
        let mut name = base.to_owned();
        while self.states.contains(name.as_str()) {
            name.push('\'');
        }
        State::from(name)
    }

    /// Get the number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Get the number of transitions.
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// All states, in insertion order.
    pub fn states(&self) -> &IndexSet<State> {
        &self.states
    }

    /// The input alphabet (never contains epsilon).
    pub fn symbols(&self) -> &IndexSet<Symbol> {
        &self.symbols
    }

    /// Get the start states.
    pub fn start_states(&self) -> impl Iterator<Item = &State> + '_ {
        self.start_states.iter().map(|id| self.state(id))
    }

    /// Get the final states.
    pub fn final_states(&self) -> impl Iterator<Item = &State> + '_ {
        self.final_states.iter().map(|id| self.state(id))
    }

    pub fn is_start(&self, state: impl AsRef<str>) -> bool {
        self.state_id(state)
            .is_some_and(|id| self.start_states.contains(id))
    }

    pub fn is_final(&self, state: impl AsRef<str>) -> bool {
        self.state_id(state)
            .is_some_and(|id| self.final_states.contains(id))
    }

    /// Look up the id of a state by name.
    pub fn state_id(&self, state: impl AsRef<str>) -> Option<StateId> {
        self.states
            .get_index_of(state.as_ref())
            .map(|id| id as StateId)
    }

    pub(crate) fn state(&self, id: StateId) -> &State {
        &self.states[id as usize]
    }

    pub(crate) fn start_set(&self) -> &StateSet {
        &self.start_states
    }

    pub(crate) fn final_set(&self) -> &StateSet {
        &self.final_states
    }

    pub(crate) fn table(&self) -> &TransitionTable {
        &self.transitions
    }

    /// All destinations of `(source, label)`.
    pub fn lookup(&self, source: impl AsRef<str>, label: impl Into<Label>) -> BTreeSet<State> {
        match self.state_id(source) {
            Some(id) => self.resolve(&self.transitions.lookup(id, label.into())),
            None => BTreeSet::new(),
        }
    }

    /// Get all transitions as an iterator.
    pub fn transitions(&self) -> impl Iterator<Item = (&State, Label, &State)> + '_ {
        self.transitions
            .iter()
            .map(|(src, label, dst)| (self.state(src), label, self.state(dst)))
    }

    pub(crate) fn resolve(&self, states: &StateSet) -> BTreeSet<State> {
        states.iter().map(|id| self.state(id).clone()).collect()
    }

    /// Compute the epsilon closure of a single state.
    pub(crate) fn epsilon_closure_single(&self, state: StateId) -> StateSet {
        self.epsilon_closure(&StateSet::singleton(state, self.num_states()))
    }

    /// Get the epsilon closure of a set of states. Every state is pushed on
    /// the worklist at most once.
    pub(crate) fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(s) = stack.pop() {
            if let Some(destinations) = self.transitions.get(s, Label::Epsilon) {
                for dest in destinations.iter() {
                    if closure.insert(dest) {
                        stack.push(dest);
                    }
                }
            }
        }

        closure
    }

    /// Epsilon closures of every state, indexed by state id.
    pub(crate) fn epsilon_closures(&self) -> Vec<StateSet> {
        (0..self.num_states() as StateId)
            .map(|state| self.epsilon_closure_single(state))
            .collect()
    }

    /// Get the states reachable from a set of states on a given symbol.
    /// Returns the epsilon closure of the reached states.
    pub(crate) fn move_on_symbol(&self, states: &StateSet, symbol: Symbol) -> StateSet {
        let mut reached = StateSet::with_capacity(self.num_states());

        for state in states.iter() {
            if let Some(destinations) = self.transitions.get(state, Label::Symbol(symbol)) {
                reached.union_with(destinations);
            }
        }

        self.epsilon_closure(&reached)
    }

    /// The epsilon closure of `state`: every state reachable from it through
    /// epsilon transitions only, including itself. Unknown states have an
    /// empty closure.
    pub fn eclose(&self, state: impl AsRef<str>) -> BTreeSet<State> {
        match self.state_id(state) {
            Some(id) => self.resolve(&self.epsilon_closure_single(id)),
            None => BTreeSet::new(),
        }
    }

    /// Union of the epsilon closures of `states`.
    pub fn eclose_iterable<S: AsRef<str>>(
        &self,
        states: impl IntoIterator<Item = S>,
    ) -> BTreeSet<State> {
        let seeds: StateSet = states
            .into_iter()
            .filter_map(|state| self.state_id(state))
            .collect();
        self.resolve(&self.epsilon_closure(&seeds))
    }

    /// Check whether `word` is accepted. Epsilon entries of the word are
    /// skipped.
    pub fn accepts<L: Into<Label>>(&self, word: impl IntoIterator<Item = L>) -> bool {
        let mut current = self.epsilon_closure(&self.start_states);

        for label in word {
            let Label::Symbol(symbol) = label.into() else {
                continue;
            };
            current = self.move_on_symbol(&current, symbol);
            if current.is_empty() {
                return false;
            }
        }

        current.intersects(&self.final_states)
    }

    /// True iff there is at most one start state, no epsilon transition and
    /// at most one destination per (state, symbol).
    pub fn is_deterministic(&self) -> bool {
        self.start_states.len() <= 1
            && self.transitions.is_deterministic()
            && (0..self.num_states() as StateId)
                .all(|state| self.epsilon_closure_single(state).len() == 1)
    }

    /// Check if the NFA accepts no string at all.
    /// Uses BFS from start states following all transitions.
    pub fn is_empty(&self) -> bool {
        let mut visited = self.start_states.clone();
        let mut queue: VecDeque<StateId> = self.start_states.iter().collect();
        let labels: Vec<Label> = self
            .symbols
            .iter()
            .map(|&symbol| Label::Symbol(symbol))
            .chain([Label::Epsilon])
            .collect();

        while let Some(state) = queue.pop_front() {
            if self.final_states.contains(state) {
                return false;
            }

            for &label in &labels {
                if let Some(destinations) = self.transitions.get(state, label) {
                    for dest in destinations.iter() {
                        if visited.insert(dest) {
                            queue.push_back(dest);
                        }
                    }
                }
            }
        }

        true
    }

    /// Deep, independent copy of the automaton.
    pub fn copy(&self) -> EpsilonNFA {
        self.clone()
    }

    /// Convert to a map representation for debugging.
    pub fn to_transition_map(&self) -> IndexMap<State, IndexMap<Label, Vec<State>>> {
        let mut map: IndexMap<State, IndexMap<Label, Vec<State>>> = IndexMap::new();

        for (src, label, dst) in self.transitions() {
            map.entry(src.clone())
                .or_default()
                .entry(label)
                .or_default()
                .push(dst.clone());
        }
        for destinations in map.values_mut().flat_map(|by_label| by_label.values_mut()) {
            destinations.sort();
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(names: &[&str]) -> BTreeSet<State> {
        names.iter().map(|&name| State::from(name)).collect()
    }

    /// q0 -a-> q1 -b-> q2 (final)
    fn scenario() -> EpsilonNFA {
        let mut nfa = EpsilonNFA::new();
        nfa.add_start_state("q0");
        nfa.add_final_state("q2");
        nfa.add_transition("q0", "a", "q1");
        nfa.add_transition("q1", "b", "q2");
        nfa
    }

    #[test]
    fn test_epsilon_nfa_basic() {
        let nfa = scenario();

        assert_eq!(nfa.num_states(), 3);
        assert_eq!(nfa.num_transitions(), 2);
        assert_eq!(nfa.symbols().len(), 2);
        assert!(nfa.accepts(["a", "b"]));
        assert!(!nfa.accepts(["a"]));
        assert!(!nfa.accepts(Vec::<Label>::new()));
        assert!(!nfa.is_empty());
    }

    #[test]
    fn test_epsilon_to_final_accepts_empty_word() {
        let mut nfa = scenario();
        nfa.add_epsilon_transition("q0", "q2");

        assert!(nfa.accepts(Vec::<Label>::new()));
        assert!(nfa.accepts(["a", "b"]));
        assert!(!nfa.symbols().iter().any(|s| &*s.name() == "epsilon"));
    }

    #[test]
    fn test_epsilon_in_word_is_skipped() {
        let nfa = scenario();
        let a = Label::from("a");
        let b = Label::from("b");
        assert!(nfa.accepts([Label::Epsilon, a, Label::Epsilon, b]));
    }

    #[test]
    fn test_no_start_state_accepts_nothing() {
        let mut nfa = EpsilonNFA::new();
        nfa.add_final_state("q0");
        nfa.add_transition("q0", "a", "q0");
        assert!(!nfa.accepts(Vec::<Label>::new()));
        assert!(!nfa.accepts(["a"]));
        assert!(nfa.is_empty());
    }

    #[test]
    fn test_epsilon_closure() {
        let mut nfa = EpsilonNFA::new();

        // 0 -ε-> 1 -ε-> 2, 2 -ε-> 0, 2 -a-> 3
        nfa.add_epsilon_transition("0", "1");
        nfa.add_epsilon_transition("1", "2");
        nfa.add_epsilon_transition("2", "0");
        nfa.add_transition("2", "a", "3");

        assert_eq!(nfa.eclose("0"), states(&["0", "1", "2"]));
        assert_eq!(nfa.eclose("3"), states(&["3"]));
        assert!(nfa.eclose("missing").is_empty());
        assert_eq!(
            nfa.eclose_iterable(["1", "3"]),
            states(&["0", "1", "2", "3"])
        );

        for state in nfa.states() {
            let closure = nfa.eclose(state);
            assert!(closure.contains(state));
            assert_eq!(nfa.eclose_iterable(&closure), closure);
        }
    }

    #[test]
    fn test_move_on_symbol() {
        let mut nfa = EpsilonNFA::new();

        // 0 -a-> 1, 0 -a-> 2, 1 -ε-> 3
        nfa.add_transition("0", "a", "1");
        nfa.add_transition("0", "a", "2");
        nfa.add_epsilon_transition("1", "3");

        let start = StateSet::singleton(0, 4);
        let reached = nfa.resolve(&nfa.move_on_symbol(&start, Symbol::new("a")));

        assert_eq!(reached, states(&["1", "2", "3"]));
        assert_eq!(nfa.lookup("0", "a"), states(&["1", "2"]));
        assert!(nfa.lookup("0", "b").is_empty());
    }

    #[test]
    fn test_empty_nfa() {
        let mut nfa = EpsilonNFA::new();
        nfa.add_start_state("0");
        nfa.add_final_state("1");
        // No transitions - NFA is empty (no path from 0 to 1)
        assert!(nfa.is_empty());

        nfa.add_epsilon_transition("0", "1");
        assert!(!nfa.is_empty());

        nfa.remove_transition("0", Label::Epsilon, "1");
        assert!(nfa.is_empty());

        nfa.add_transition("0", "a", "1");
        assert!(!nfa.is_empty());
    }

    #[test]
    fn test_removals_are_silent() {
        let mut nfa = scenario();
        assert!(!nfa.remove_transition("q0", "b", "q1"));
        assert!(!nfa.remove_transition("nowhere", "a", "q1"));
        assert!(!nfa.remove_final_state("q1"));
        assert!(!nfa.remove_final_state("nowhere"));
        assert!(!nfa.remove_start_state("nowhere"));

        assert!(nfa.remove_final_state("q2"));
        assert!(!nfa.is_final("q2"));
        assert!(nfa.is_empty());
        // States stay in the arena.
        assert_eq!(nfa.num_states(), 3);
    }

    #[test]
    fn test_is_deterministic() {
        let mut nfa = scenario();
        assert!(nfa.is_deterministic());

        nfa.add_transition("q0", "a", "q2");
        assert!(!nfa.is_deterministic());
        nfa.remove_transition("q0", "a", "q2");

        nfa.add_start_state("q1");
        assert!(!nfa.is_deterministic());
        nfa.remove_start_state("q1");

        nfa.add_epsilon_transition("q1", "q1");
        assert!(!nfa.is_deterministic());
    }

    #[test]
    fn test_copy_is_independent() {
        let mut nfa = scenario();
        nfa.add_epsilon_transition("q0", "q1");
        let copy = nfa.copy();

        nfa.remove_transition("q1", "b", "q2");
        nfa.add_final_state("q9");

        assert!(copy.accepts(["a", "b"]));
        assert!(copy.accepts(["b"]));
        assert_eq!(copy.num_states(), 3);
        assert_eq!(copy.num_transitions(), 3);
        assert!(!nfa.accepts(["a", "b"]));
    }

    #[test]
    fn test_to_transition_map() {
        let mut nfa = scenario();
        nfa.add_transition("q0", "a", "q0");
        let map = nfa.to_transition_map();

        let from_q0 = &map[&State::from("q0")];
        assert_eq!(
            from_q0[&Label::from("a")],
            vec![State::from("q0"), State::from("q1")]
        );
        assert!(!map.contains_key(&State::from("q2")));
    }
}
