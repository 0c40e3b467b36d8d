//! Formal language automata.
//!
//! This crate provides an epsilon-NFA with:
//! - Epsilon closure computation and word acceptance
//! - Subset construction (NFA to DFA conversion)
//! - Hopcroft's DFA minimization algorithm and DFA equivalence
//! - Regular expression extraction by state elimination
//! - Complement, intersection, difference, reverse, union, concatenation
//!   and Kleene star
//!
//! ```
//! use formlang::{EpsilonNFA, Label};
//!
//! let mut nfa = EpsilonNFA::new();
//! nfa.add_start_state("q0");
//! nfa.add_final_state("q2");
//! nfa.add_transition("q0", "a", "q1");
//! nfa.add_transition("q1", "b", "q2");
//!
//! assert!(nfa.accepts(["a", "b"]));
//! assert!(!nfa.accepts(Vec::<Label>::new()));
//! assert!(nfa.to_deterministic().is_deterministic());
//! assert_eq!(nfa.to_regex().to_string(), "a.b");
//! ```

mod dfa;
mod dsu;
mod epsilon_nfa;
mod error;
mod operations;
mod regex;
mod state;
mod state_elimination;
mod subset_construction;
mod symbol;
mod transition;

pub use dfa::DeterministicAutomaton;
pub use epsilon_nfa::EpsilonNFA;
pub use error::{FormlangError, Result};
pub use regex::Regex;
pub use state::{MERGE_SEPARATOR, State, StateId, StateSet};
pub use state_elimination::StateElimination;
pub use subset_construction::subset_construction;
pub use symbol::{Label, Symbol, SymbolId};
pub use transition::TransitionTable;
