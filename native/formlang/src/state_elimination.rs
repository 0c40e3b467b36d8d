//! Regular-expression extraction by state elimination.

use crate::epsilon_nfa::EpsilonNFA;
use crate::error::{FormlangError, Result};
use crate::regex::Regex;
use crate::state::{StateId, StateSet};
use crate::symbol::Label;
use log::{debug, trace};
use std::collections::BTreeMap;

/// Mutable working graph for state elimination.
///
/// Edges are labeled with regular expressions, and there is at most one edge
/// per ordered pair of states: parallel edges are merged into a single
/// alternation. The builder always works on its own copy of the automaton.
#[derive(Debug, Clone)]
pub struct StateElimination {
    states: StateSet,
    start_states: StateSet,
    final_states: StateSet,
    edges: BTreeMap<(StateId, StateId), Regex>,
}

impl StateElimination {
    /// Copy `nfa` into a working graph. Several start states are joined
    /// under one fresh start state with epsilon edges to each of them.
    pub fn new(nfa: &EpsilonNFA) -> Self {
        let mut graph = Self::copy_of(nfa);

        if graph.start_states.len() > 1 {
            let start = nfa.num_states() as StateId;
            graph.states.insert(start);
            for old_start in std::mem::take(&mut graph.start_states).iter() {
                graph.add_edge(start, old_start, Regex::Epsilon);
            }
            graph.start_states.insert(start);
        }

        graph
    }

    /// Copy states, start/final markers and edges of `nfa` as they are.
    fn copy_of(nfa: &EpsilonNFA) -> Self {
        let mut graph = Self {
            states: (0..nfa.num_states() as StateId).collect(),
            start_states: nfa.start_set().clone(),
            final_states: nfa.final_set().clone(),
            edges: BTreeMap::new(),
        };
        graph.create_or_transitions(nfa);
        graph
    }

    /// Merge every edge of `nfa` into the graph, joining labels between the
    /// same ordered pair of states with `+`.
    fn create_or_transitions(&mut self, nfa: &EpsilonNFA) {
        for (source, label, destination) in nfa.table().iter() {
            let regex = match label {
                Label::Symbol(symbol) => Regex::Symbol(symbol),
                Label::Epsilon => Regex::Epsilon,
            };
            self.add_edge(source, destination, regex);
        }
    }

    fn add_edge(&mut self, source: StateId, destination: StateId, regex: Regex) {
        let merged = match self.edges.remove(&(source, destination)) {
            Some(existing) => Regex::union(existing, regex),
            None => regex,
        };
        if merged != Regex::Empty {
            self.edges.insert((source, destination), merged);
        }
    }

    fn edge(&self, source: StateId, destination: StateId) -> Regex {
        self.edges
            .get(&(source, destination))
            .cloned()
            .unwrap_or(Regex::Empty)
    }

    /// Number of states still in the graph.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Keep `state` as the only final state.
    pub(crate) fn retain_final_state(&mut self, state: StateId) {
        self.final_states = StateSet::singleton(state, self.states.len());
    }

    /// Eliminate every state that is neither a start nor a final state.
    pub fn remove_all_basic_states(&mut self) {
        let basic: Vec<StateId> = self
            .states
            .iter()
            .filter(|&state| {
                !self.start_states.contains(state) && !self.final_states.contains(state)
            })
            .collect();

        for state in basic {
            self.remove_state(state);
        }
    }

    /// Eliminate `state`, rerouting every path through it as a direct edge
    /// labeled `in . (loop)* . out`.
    fn remove_state(&mut self, state: StateId) {
        let self_loop = Regex::star(self.edges.remove(&(state, state)).unwrap_or(Regex::Empty));

        let mut incoming = Vec::new();
        let mut outgoing = Vec::new();
        for (&(source, destination), regex) in &self.edges {
            if destination == state {
                incoming.push((source, regex.clone()));
            } else if source == state {
                outgoing.push((destination, regex.clone()));
            }
        }
        self.edges
            .retain(|&(source, destination), _| source != state && destination != state);

        for (predecessor, in_regex) in &incoming {
            for (successor, out_regex) in &outgoing {
                let through = Regex::concat(
                    Regex::concat(in_regex.clone(), self_loop.clone()),
                    out_regex.clone(),
                );
                self.add_edge(*predecessor, *successor, through);
            }
        }

        self.states.remove(state);
        trace!(
            "eliminated state {state}: {} in, {} out, {} states left",
            incoming.len(),
            outgoing.len(),
            self.states.len()
        );
    }

    /// Closed-form expression of a graph reduced to one start state and at
    /// most one final state.
    pub fn get_regex_simple(&self) -> Result<Regex> {
        let not_simple = || FormlangError::NotSimpleEnough {
            start_states: self.start_states.len(),
            final_states: self.final_states.len(),
            states: self.states.len(),
        };

        let mut starts = self.start_states.iter();
        let (Some(start), None) = (starts.next(), starts.next()) else {
            return Err(not_simple());
        };
        if self.final_states.len() > 1 {
            return Err(not_simple());
        }
        let mut boundary = self.start_states.clone();
        boundary.union_with(&self.final_states);
        if !self.states.is_subset(&boundary) {
            return Err(not_simple());
        }

        let Some(end) = self.final_states.iter().next() else {
            return Ok(Regex::Empty);
        };
        Ok(self.simple_regex(start, end))
    }

    /// (ss + sf.(ff)*.fs)* . sf . (ff)*
    fn simple_regex(&self, start: StateId, end: StateId) -> Regex {
        if start == end {
            return Regex::star(self.edge(start, start));
        }

        let loop_end = Regex::star(self.edge(end, end));
        let round_trip = Regex::concat(
            Regex::concat(self.edge(start, end), loop_end.clone()),
            self.edge(end, start),
        );
        let loop_start = Regex::star(Regex::union(self.edge(start, start), round_trip));

        Regex::concat(Regex::concat(loop_start, self.edge(start, end)), loop_end)
    }
}

impl EpsilonNFA {
    /// Extract a regular expression accepting the same language.
    ///
    /// Each final state is reduced separately on a private copy with all
    /// other final states stripped, and the sub-expressions are joined with
    /// `+`. The receiver is never modified.
    pub fn to_regex(&self) -> Regex {
        let base = StateElimination::new(self);
        let mut regex = Regex::Empty;

        if base.start_states.is_empty() {
            return regex;
        }

        for end in base.final_states.iter() {
            let mut graph = base.clone();
            graph.retain_final_state(end);
            graph.remove_all_basic_states();
            let Some(start) = graph.start_states.iter().next() else {
                continue;
            };
            regex = Regex::union(regex, graph.simple_regex(start, end));
        }

        debug!(
            "extracted regex from {} states, {} transitions",
            self.num_states(),
            self.num_transitions()
        );
        regex
    }

    /// Closed-form expression of an automaton that has exactly one start
    /// state, at most one final state and no other state.
    pub fn get_regex_simple(&self) -> Result<Regex> {
        StateElimination::copy_of(self).get_regex_simple()
    }
}
