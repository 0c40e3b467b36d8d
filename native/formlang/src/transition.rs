//! Nondeterministic transition table.

use crate::state::{StateId, StateSet};
use crate::symbol::Label;
use std::collections::HashMap;

/// A nondeterministic mapping from (source, label) to a set of destinations.
///
/// The table owns no states or symbols; it only records edges between state
/// ids of the automaton that owns it.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    transitions: HashMap<(StateId, Label), StateSet>,
    num_transitions: usize,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the edge `source -label-> destination`.
    /// Returns false if the edge was already present.
    pub fn add(&mut self, source: StateId, label: Label, destination: StateId) -> bool {
        let added = self
            .transitions
            .entry((source, label))
            .or_default()
            .insert(destination);
        if added {
            self.num_transitions += 1;
        }
        added
    }

    /// Delete exactly the edge `source -label-> destination`, if present.
    pub fn remove(&mut self, source: StateId, label: Label, destination: StateId) -> bool {
        let Some(destinations) = self.transitions.get_mut(&(source, label)) else {
            return false;
        };
        let removed = destinations.remove(destination);
        if destinations.is_empty() {
            self.transitions.remove(&(source, label));
        }
        if removed {
            self.num_transitions -= 1;
        }
        removed
    }

    /// Borrow the destinations of `(source, label)`, if any.
    pub fn get(&self, source: StateId, label: Label) -> Option<&StateSet> {
        self.transitions.get(&(source, label))
    }

    /// All destinations of `(source, label)`; empty if none.
    pub fn lookup(&self, source: StateId, label: Label) -> StateSet {
        self.get(source, label).cloned().unwrap_or_default()
    }

    /// Whether `source` has at least one outgoing edge labeled `label`.
    pub fn has_edge(&self, source: StateId, label: Label) -> bool {
        self.transitions.contains_key(&(source, label))
    }

    /// True iff no epsilon edge exists and every (source, symbol) pair
    /// maps to exactly one destination.
    pub fn is_deterministic(&self) -> bool {
        self.transitions
            .iter()
            .all(|((_, label), destinations)| !label.is_epsilon() && destinations.len() == 1)
    }

    /// Number of recorded edges.
    pub fn len(&self) -> usize {
        self.num_transitions
    }

    pub fn is_empty(&self) -> bool {
        self.num_transitions == 0
    }

    /// Iterate over every edge as `(source, label, destination)`.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, Label, StateId)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&(src, label), dests)| dests.iter().map(move |dst| (src, label, dst)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    #[test]
    fn test_add_is_idempotent() {
        let a = Label::from(Symbol::new("a"));
        let mut table = TransitionTable::new();
        assert!(table.add(0, a, 1));
        assert!(!table.add(0, a, 1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(0, a).to_vec(), vec![1]);
    }

    #[test]
    fn test_remove() {
        let a = Label::from("a");
        let mut table = TransitionTable::new();
        table.add(0, a, 1);
        table.add(0, a, 2);

        assert!(!table.remove(0, a, 3));
        assert!(!table.remove(5, Label::Epsilon, 1));
        assert!(table.remove(0, a, 1));
        assert_eq!(table.lookup(0, a).to_vec(), vec![2]);
        assert!(table.remove(0, a, 2));
        assert!(table.lookup(0, a).is_empty());
        assert!(!table.has_edge(0, a));
        assert!(table.is_empty());
    }

    #[test]
    fn test_is_deterministic() {
        let a = Label::from("a");
        let b = Label::from("b");
        let mut table = TransitionTable::new();
        table.add(0, a, 1);
        table.add(0, b, 0);
        table.add(1, a, 1);
        assert!(table.is_deterministic());

        table.add(0, a, 2);
        assert!(!table.is_deterministic());
        table.remove(0, a, 2);
        assert!(table.is_deterministic());

        table.add(1, Label::Epsilon, 0);
        assert!(!table.is_deterministic());
    }

    #[test]
    fn test_iter() {
        let a = Label::from("a");
        let mut table = TransitionTable::new();
        table.add(0, a, 1);
        table.add(0, Label::Epsilon, 2);
        table.add(1, a, 2);

        let mut edges: Vec<_> = table.iter().collect();
        edges.sort();
        assert_eq!(edges.len(), 3);
        assert!(edges.contains(&(0, Label::Epsilon, 2)));
    }
}
