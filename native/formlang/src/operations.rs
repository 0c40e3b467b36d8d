//! Automaton algebra: determinization entry points, complement, product,
//! difference, reverse and the regular closure operations.

use crate::dfa::DeterministicAutomaton;
use crate::epsilon_nfa::EpsilonNFA;
use crate::state::{State, StateId, StateSet};
use crate::subset_construction::subset_construction;
use crate::symbol::{Label, Symbol};
use log::debug;
use std::collections::{HashMap, VecDeque};

/// Destinations of `state` on `symbol`, closed under epsilon transitions.
fn step_closed(
    nfa: &EpsilonNFA,
    closures: &[StateSet],
    state: StateId,
    symbol: Symbol,
) -> StateSet {
    let mut reached = StateSet::with_capacity(nfa.num_states());
    if let Some(destinations) = nfa.table().get(state, Label::Symbol(symbol)) {
        for dest in destinations.iter() {
            reached.union_with(&closures[dest as usize]);
        }
    }
    reached
}

/// Copy every state and edge of `source` into `target` with `prefix` added
/// to each state name. Returns the ids of the copied states, indexed by the
/// source ids.
fn embed(target: &mut EpsilonNFA, source: &EpsilonNFA, prefix: &str) -> Vec<StateId> {
    for &symbol in source.symbols() {
        target.add_symbol(symbol);
    }
    let ids: Vec<StateId> = source
        .states()
        .iter()
        .map(|state| target.add_state(format!("{prefix}{state}")))
        .collect();
    for (src, label, dst) in source.table().iter() {
        target.add_transition_by_id(ids[src as usize], label, ids[dst as usize]);
    }
    ids
}

/// Pair states of a product construction, discovered breadth-first.
struct ProductBuilder<'a> {
    left: &'a EpsilonNFA,
    right: &'a EpsilonNFA,
    product: EpsilonNFA,
    pairs: HashMap<(StateId, StateId), StateId>,
    queue: VecDeque<(StateId, StateId, StateId)>,
}

impl ProductBuilder<'_> {
    /// Id of the pair state `(p, q)`, creating and queueing it if unseen.
    /// A pair is final iff both components are final.
    fn intern(&mut self, p: StateId, q: StateId) -> StateId {
        if let Some(&id) = self.pairs.get(&(p, q)) {
            return id;
        }
        let id = self
            .product
            .add_state(State::pair(self.left.state(p), self.right.state(q)));
        let accepting = self.left.final_set().contains(p) && self.right.final_set().contains(q);
        self.product.set_final(id, accepting);
        self.pairs.insert((p, q), id);
        self.queue.push_back((p, q, id));
        id
    }
}

impl EpsilonNFA {
    /// Convert to an equivalent deterministic automaton by subset
    /// construction.
    pub fn to_deterministic(&self) -> DeterministicAutomaton {
        subset_construction(self)
    }

    /// Determinize, then minimize with Hopcroft's algorithm.
    pub fn minimize(&self) -> DeterministicAutomaton {
        self.to_deterministic().minimize()
    }

    /// Whether both automata accept the same language.
    pub fn is_equivalent_to(&self, other: &EpsilonNFA) -> bool {
        self.to_deterministic()
            .is_equivalent_to(&other.to_deterministic())
    }

    /// Flip every state's final status and send every missing transition to
    /// a fresh final trap state.
    ///
    /// This is the true complement only for deterministic automata; for
    /// other inputs the flipped automaton may accept words the original also
    /// accepts. Determinize first when the exact complement is needed.
    pub fn get_complement(&self) -> EpsilonNFA {
        let mut complement = self.copy();
        let closures = self.epsilon_closures();
        let num_states = self.num_states() as StateId;

        for state in 0..num_states {
            let accepting = self.final_set().contains(state);
            complement.set_final(state, !accepting);
        }

        let trap = complement.add_state(self.fresh_state("trap"));
        complement.set_final(trap, true);

        for &symbol in self.symbols() {
            let label = Label::Symbol(symbol);
            for state in 0..num_states {
                let has_move = closures[state as usize]
                    .iter()
                    .any(|member| self.table().has_edge(member, label));
                if !has_move {
                    complement.add_transition_by_id(state, label, trap);
                }
            }
            complement.add_transition_by_id(trap, label, trap);
        }

        debug!(
            "complement: {} states, {} transitions",
            complement.num_states(),
            complement.num_transitions()
        );
        complement
    }

    /// Product automaton accepting the words accepted by both automata.
    ///
    /// Only symbols shared by both alphabets are kept; pair states are named
    /// `(p, q)` and only pairs reachable from the start pairs are built.
    pub fn get_intersection(&self, other: &EpsilonNFA) -> EpsilonNFA {
        let mut product = EpsilonNFA::new();
        let shared: Vec<Symbol> = self
            .symbols()
            .iter()
            .filter(|symbol| other.symbols().contains(*symbol))
            .copied()
            .collect();
        for &symbol in &shared {
            product.add_symbol(symbol);
        }

        let left_closures = self.epsilon_closures();
        let right_closures = other.epsilon_closures();
        let mut builder = ProductBuilder {
            left: self,
            right: other,
            product,
            pairs: HashMap::new(),
            queue: VecDeque::new(),
        };

        let left_starts = self.epsilon_closure(self.start_set());
        let right_starts = other.epsilon_closure(other.start_set());
        for p in left_starts.iter() {
            for q in right_starts.iter() {
                let id = builder.intern(p, q);
                builder.product.set_start(id, true);
            }
        }

        while let Some((p, q, source)) = builder.queue.pop_front() {
            for &symbol in &shared {
                let left = step_closed(self, &left_closures, p, symbol);
                if left.is_empty() {
                    continue;
                }
                let right = step_closed(other, &right_closures, q, symbol);
                for next_p in left.iter() {
                    for next_q in right.iter() {
                        let dest = builder.intern(next_p, next_q);
                        builder
                            .product
                            .add_transition_by_id(source, Label::Symbol(symbol), dest);
                    }
                }
            }
        }

        let product = builder.product;
        debug!(
            "intersection: {} x {} states -> {} states",
            self.num_states(),
            other.num_states(),
            product.num_states()
        );
        product
    }

    /// Automaton accepting the words of `self` that `other` rejects.
    ///
    /// `other` is complemented over its alphabet extended with the symbols
    /// only `self` uses, so the same caveat as [`EpsilonNFA::get_complement`]
    /// applies to nondeterministic `other`.
    pub fn get_difference(&self, other: &EpsilonNFA) -> EpsilonNFA {
        let mut extended = other.copy();
        for &symbol in self.symbols() {
            extended.add_symbol(symbol);
        }
        self.get_intersection(&extended.get_complement())
    }

    /// Flip every transition and swap start and final states. The result
    /// accepts exactly the reversed words.
    pub fn reverse(&self) -> EpsilonNFA {
        let mut reversed = EpsilonNFA::new();
        for state in self.states() {
            reversed.add_state(state.clone());
        }
        for &symbol in self.symbols() {
            reversed.add_symbol(symbol);
        }
        for (src, label, dst) in self.table().iter() {
            reversed.add_transition_by_id(dst, label, src);
        }
        for state in self.final_set().iter() {
            reversed.set_start(state, true);
        }
        for state in self.start_set().iter() {
            reversed.set_final(state, true);
        }
        reversed
    }

    /// Automaton accepting the words of either automaton.
    ///
    /// Operand states are renamed with a `0:`/`1:` prefix; a fresh `start`
    /// state reaches both operands' start states by epsilon transitions.
    pub fn union(&self, other: &EpsilonNFA) -> EpsilonNFA {
        let mut union = EpsilonNFA::new();
        let start = union.add_state("start");
        union.set_start(start, true);

        for (prefix, operand) in [("0:", self), ("1:", other)] {
            let ids = embed(&mut union, operand, prefix);
            for state in operand.start_set().iter() {
                union.add_transition_by_id(start, Label::Epsilon, ids[state as usize]);
            }
            for state in operand.final_set().iter() {
                union.set_final(ids[state as usize], true);
            }
        }
        union
    }

    /// Automaton accepting a word of `self` followed by a word of `other`.
    pub fn concatenate(&self, other: &EpsilonNFA) -> EpsilonNFA {
        let mut concatenation = EpsilonNFA::new();
        let left = embed(&mut concatenation, self, "0:");
        let right = embed(&mut concatenation, other, "1:");

        for state in self.start_set().iter() {
            concatenation.set_start(left[state as usize], true);
        }
        for end in self.final_set().iter() {
            for start in other.start_set().iter() {
                concatenation.add_transition_by_id(
                    left[end as usize],
                    Label::Epsilon,
                    right[start as usize],
                );
            }
        }
        for state in other.final_set().iter() {
            concatenation.set_final(right[state as usize], true);
        }
        concatenation
    }

    /// Automaton accepting any number of repetitions of words of `self`.
    pub fn kleene_star(&self) -> EpsilonNFA {
        let mut star = self.copy();
        let start = star.add_state(self.fresh_state("start"));

        for state in self.start_set().iter() {
            star.add_transition_by_id(start, Label::Epsilon, state);
            star.set_start(state, false);
        }
        for state in self.final_set().iter() {
            star.add_transition_by_id(state, Label::Epsilon, start);
        }
        star.set_start(start, true);
        star.set_final(start, true);
        star
    }
}
