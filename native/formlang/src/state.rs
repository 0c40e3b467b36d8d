//! State types for automata.

use fixedbitset::FixedBitSet;
use itertools::Itertools;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A state identifier: the state's index in its automaton's state arena.
pub type StateId = u32;

/// Separator between member names of a merged state.
pub const MERGE_SEPARATOR: &str = ";";

/// An immutable, named automaton state.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State(Arc<str>);

impl State {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Canonical name for a set of states: member names sorted, deduplicated
    /// and joined, so the same set always merges to the same state.
    pub fn merged<'a>(states: impl IntoIterator<Item = &'a State>) -> State {
        let inner = states
            .into_iter()
            .map(State::name)
            .sorted_unstable()
            .dedup()
            .join(MERGE_SEPARATOR);
        State::new(format!("{{{inner}}}"))
    }

    /// Name of a product-construction state.
    pub fn pair(left: &State, right: &State) -> State {
        State::new(format!("({left}, {right})"))
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&State> for State {
    fn from(state: &State) -> Self {
        state.clone()
    }
}

impl AsRef<str> for State {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for State {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({:?})", &*self.0)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of states implemented using a fixed-size bit set for efficiency.
#[derive(Clone, Default)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// Create a new empty state set with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Create a state set containing a single state.
    pub fn singleton(state: StateId, capacity: usize) -> Self {
        let mut set = Self::with_capacity(capacity);
        set.insert(state);
        set
    }

    /// Insert a state into the set. Returns true if it was not yet present.
    pub fn insert(&mut self, state: StateId) -> bool {
        let idx = state as usize;
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        !self.bits.put(idx)
    }

    /// Check if the set contains a state.
    pub fn contains(&self, state: StateId) -> bool {
        let idx = state as usize;
        idx < self.bits.len() && self.bits.contains(idx)
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Get the number of states in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Iterate over all states in the set, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|i| i as StateId)
    }

    /// Union this set with another, modifying self in place.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    /// Check if this set intersects with another.
    pub fn intersects(&self, other: &StateSet) -> bool {
        self.bits.intersection(&other.bits).next().is_some()
    }

    /// Check if every state of this set is also in `other`.
    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.iter().all(|state| other.contains(state))
    }

    /// Create a new set that is the intersection of this set and another.
    pub fn intersection(&self, other: &StateSet) -> StateSet {
        let mut result = self.clone();
        result.bits.intersect_with(&other.bits);
        result
    }

    /// Create a new set with states not in other.
    pub fn difference(&self, other: &StateSet) -> StateSet {
        let mut result = self.clone();
        result.bits.difference_with(&other.bits);
        result
    }

    /// Remove a state from the set. Returns true if it was present.
    pub fn remove(&mut self, state: StateId) -> bool {
        let idx = state as usize;
        if self.contains(state) {
            self.bits.set(idx, false);
            true
        } else {
            false
        }
    }

    /// Get a canonical representation (as a sorted vec).
    pub fn to_vec(&self) -> Vec<StateId> {
        self.iter().collect()
    }
}

// Equality and hashing look only at members: two sets holding the same
// states are equal whatever their bit capacity.
impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for StateSet {}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for id in self.iter() {
            id.hash(state);
        }
        self.len().hash(state);
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl Extend<StateId> for StateSet {
    fn extend<I: IntoIterator<Item = StateId>>(&mut self, iter: I) {
        for state in iter {
            self.insert(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_set_basic() {
        let mut set = StateSet::with_capacity(10);
        assert!(set.is_empty());

        assert!(set.insert(3));
        assert!(set.insert(7));
        assert!(!set.insert(7));
        assert!(!set.is_empty());
        assert_eq!(set.len(), 2);
        assert!(set.contains(3));
        assert!(set.contains(7));
        assert!(!set.contains(5));
        assert!(!set.contains(500));
    }

    #[test]
    fn test_state_set_union() {
        let mut set1 = StateSet::with_capacity(10);
        set1.insert(1);
        set1.insert(3);

        let mut set2 = StateSet::with_capacity(40);
        set2.insert(2);
        set2.insert(33);

        set1.union_with(&set2);
        assert_eq!(set1.to_vec(), vec![1, 2, 3, 33]);
    }

    #[test]
    fn test_state_set_intersection_and_difference() {
        let set1: StateSet = [1, 3, 5].into_iter().collect();
        let set2: StateSet = [2, 3, 5, 9].into_iter().collect();

        let inter = set1.intersection(&set2);
        assert_eq!(inter.to_vec(), vec![3, 5]);
        assert!(set1.intersects(&set2));
        assert_eq!(set1.difference(&set2).to_vec(), vec![1]);
        assert!(inter.is_subset(&set1));
        assert!(!set1.is_subset(&set2));
    }

    #[test]
    fn test_state_set_equality_ignores_capacity() {
        let small = StateSet::singleton(2, 3);
        let mut large = StateSet::with_capacity(128);
        large.insert(2);
        assert_eq!(small, large);

        let mut seen = std::collections::HashSet::new();
        seen.insert(small);
        assert!(seen.contains(&large));
    }

    #[test]
    fn test_state_set_remove() {
        let mut set = StateSet::singleton(5, 10);
        assert!(set.remove(5));
        assert!(!set.remove(5));
        assert!(!set.remove(99));
        assert!(set.is_empty());
    }

    #[test]
    fn test_merged_name_is_order_independent() {
        let a = State::from("q1");
        let b = State::from("q0");
        let c = State::from("q1");
        assert_eq!(State::merged([&a, &b, &c]).name(), "{q0;q1}");
        assert_eq!(State::merged([&b, &a]), State::merged([&a, &b]));
        assert_eq!(State::merged(std::iter::empty()).name(), "{}");
        assert_eq!(State::pair(&a, &b).name(), "(q1, q0)");
    }
}
