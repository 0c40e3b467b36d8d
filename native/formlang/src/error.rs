//! Errors raised by automaton operations.

use std::fmt;

/// Errors that can occur when querying or transforming an automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormlangError {
    /// `get_regex_simple` needs exactly one start state and at most one
    /// final state, with no other states left.
    NotSimpleEnough {
        start_states: usize,
        final_states: usize,
        states: usize,
    },
    /// The automaton was expected to be deterministic.
    NotDeterministic,
}

impl fmt::Display for FormlangError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormlangError::NotSimpleEnough {
                start_states,
                final_states,
                states,
            } => write!(
                f,
                "automaton not simple enough: {start_states} start state(s), \
                 {final_states} final state(s), {states} state(s)"
            ),
            FormlangError::NotDeterministic => write!(f, "automaton is not deterministic"),
        }
    }
}

impl std::error::Error for FormlangError {}

pub type Result<T> = std::result::Result<T, FormlangError>;
