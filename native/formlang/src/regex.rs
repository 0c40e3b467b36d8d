//! Regular expressions over automaton symbols.

use crate::epsilon_nfa::EpsilonNFA;
use crate::state::{State, StateId};
use crate::symbol::{Label, Symbol};
use std::fmt;

/// A regular expression over [`Symbol`]s.
///
/// Build compound expressions with [`Regex::union`], [`Regex::concat`] and
/// [`Regex::star`], which apply language-preserving simplifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Regex {
    /// The empty language. This never matches anything.
    Empty,
    /// The empty word.
    Epsilon,
    /// A single symbol.
    Symbol(Symbol),
    /// Alternation.
    Union(Box<Regex>, Box<Regex>),
    /// Concatenation.
    Concat(Box<Regex>, Box<Regex>),
    /// Kleene closure. Matches zero or more repetitions.
    Star(Box<Regex>),
}

impl Regex {
    pub fn symbol(symbol: impl Into<Symbol>) -> Regex {
        Regex::Symbol(symbol.into())
    }

    /// `left + right`.
    pub fn union(left: Regex, right: Regex) -> Regex {
        match (left, right) {
            (Regex::Empty, other) | (other, Regex::Empty) => other,
            (left, right) if left == right => left,
            // r* already holds the empty word
            (Regex::Epsilon, star @ Regex::Star(_)) | (star @ Regex::Star(_), Regex::Epsilon) => {
                star
            }
            (left, right) => Regex::Union(Box::new(left), Box::new(right)),
        }
    }

    /// `left . right`.
    pub fn concat(left: Regex, right: Regex) -> Regex {
        match (left, right) {
            (Regex::Empty, _) | (_, Regex::Empty) => Regex::Empty,
            (Regex::Epsilon, other) | (other, Regex::Epsilon) => other,
            (left, right) => Regex::Concat(Box::new(left), Box::new(right)),
        }
    }

    /// `(inner)*`.
    pub fn star(inner: Regex) -> Regex {
        match inner {
            Regex::Empty | Regex::Epsilon => Regex::Epsilon,
            star @ Regex::Star(_) => star,
            // (epsilon + r)* = r*
            Regex::Union(left, right) if *left == Regex::Epsilon => Regex::star(*right),
            Regex::Union(left, right) if *right == Regex::Epsilon => Regex::star(*left),
            inner => Regex::Star(Box::new(inner)),
        }
    }

    /// Build an automaton accepting exactly this expression's language,
    /// using Thompson's construction. States are numbered from `0`; the
    /// automaton has one start and one final state.
    pub fn to_epsilon_nfa(&self) -> EpsilonNFA {
        let mut builder = Thompson::default();
        let start = builder.fresh();
        let end = builder.build(self, start);
        builder.nfa.set_start(start, true);
        builder.nfa.set_final(end, true);
        builder.nfa
    }

    /// Check whether `word` matches this expression.
    pub fn accepts<L: Into<Label>>(&self, word: impl IntoIterator<Item = L>) -> bool {
        self.to_epsilon_nfa().accepts(word)
    }

    fn precedence(&self) -> u8 {
        match self {
            Regex::Union(..) => 0,
            Regex::Concat(..) => 1,
            _ => 2,
        }
    }

    fn fmt_in(&self, f: &mut fmt::Formatter<'_>, context: u8) -> fmt::Result {
        let parenthesize = self.precedence() < context;
        if parenthesize {
            f.write_str("(")?;
        }
        match self {
            Regex::Empty => f.write_str("$")?,
            Regex::Epsilon => f.write_str("epsilon")?,
            Regex::Symbol(symbol) => write!(f, "{symbol}")?,
            Regex::Union(left, right) => {
                left.fmt_in(f, 0)?;
                f.write_str("+")?;
                right.fmt_in(f, 0)?;
            }
            Regex::Concat(left, right) => {
                left.fmt_in(f, 1)?;
                f.write_str(".")?;
                right.fmt_in(f, 1)?;
            }
            Regex::Star(inner) => {
                f.write_str("(")?;
                inner.fmt_in(f, 0)?;
                f.write_str(")*")?;
            }
        }
        if parenthesize {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl From<Symbol> for Regex {
    fn from(symbol: Symbol) -> Self {
        Regex::Symbol(symbol)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_in(f, 0)
    }
}

/// Thompson construction state.
#[derive(Default)]
struct Thompson {
    nfa: EpsilonNFA,
    next: usize,
}

impl Thompson {
    fn fresh(&mut self) -> StateId {
        let id = self.nfa.add_state(State::new(self.next.to_string()));
        self.next += 1;
        id
    }

    /// Wire `regex` starting at `start`; returns its end state.
    fn build(&mut self, regex: &Regex, start: StateId) -> StateId {
        match regex {
            // The end state is never connected
            Regex::Empty => self.fresh(),
            Regex::Epsilon => {
                let end = self.fresh();
                self.nfa.add_transition_by_id(start, Label::Epsilon, end);
                end
            }
            Regex::Symbol(symbol) => {
                let end = self.fresh();
                self.nfa
                    .add_transition_by_id(start, Label::Symbol(*symbol), end);
                end
            }
            Regex::Concat(left, right) => {
                let middle = self.build(left, start);
                self.build(right, middle)
            }
            Regex::Union(left, right) => {
                let left_start = self.fresh();
                let right_start = self.fresh();
                self.nfa
                    .add_transition_by_id(start, Label::Epsilon, left_start);
                self.nfa
                    .add_transition_by_id(start, Label::Epsilon, right_start);

                let left_end = self.build(left, left_start);
                let right_end = self.build(right, right_start);
                let end = self.fresh();
                self.nfa.add_transition_by_id(left_end, Label::Epsilon, end);
                self.nfa
                    .add_transition_by_id(right_end, Label::Epsilon, end);
                end
            }
            Regex::Star(inner) => {
                let inner_start = self.fresh();
                let inner_end = self.build(inner, inner_start);
                let end = self.fresh();

                self.nfa
                    .add_transition_by_id(inner_end, Label::Epsilon, inner_start);
                self.nfa
                    .add_transition_by_id(inner_end, Label::Epsilon, end);
                self.nfa
                    .add_transition_by_id(start, Label::Epsilon, inner_start);
                self.nfa.add_transition_by_id(start, Label::Epsilon, end);
                end
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Regex {
        Regex::symbol(name)
    }

    #[test]
    fn test_simplifying_constructors() {
        let a = sym("a");
        assert_eq!(Regex::union(Regex::Empty, a.clone()), a);
        assert_eq!(Regex::union(a.clone(), a.clone()), a);
        assert_eq!(Regex::concat(Regex::Epsilon, a.clone()), a);
        assert_eq!(Regex::concat(a.clone(), Regex::Empty), Regex::Empty);
        assert_eq!(Regex::star(Regex::Empty), Regex::Epsilon);
        assert_eq!(Regex::star(Regex::Epsilon), Regex::Epsilon);

        let a_star = Regex::star(a.clone());
        assert_eq!(Regex::star(a_star.clone()), a_star);
        assert_eq!(Regex::union(Regex::Epsilon, a_star.clone()), a_star);
        assert_eq!(Regex::star(Regex::union(Regex::Epsilon, a)), a_star);
    }

    #[test]
    fn test_display() {
        let a = sym("a");
        let b = sym("b");
        let union = Regex::union(a.clone(), b.clone());
        assert_eq!(union.to_string(), "a+b");
        assert_eq!(
            Regex::concat(union.clone(), a.clone()).to_string(),
            "(a+b).a"
        );
        assert_eq!(Regex::star(union).to_string(), "(a+b)*");
        assert_eq!(
            Regex::concat(Regex::star(a.clone()), b.clone()).to_string(),
            "(a)*.b"
        );
        assert_eq!(
            Regex::union(Regex::concat(a, b.clone()), b).to_string(),
            "a.b+b"
        );
        assert_eq!(Regex::Epsilon.to_string(), "epsilon");
        assert_eq!(Regex::Empty.to_string(), "$");
    }

    #[test]
    fn test_thompson_construction() {
        // (a+b)*.a.b
        let regex = Regex::concat(
            Regex::concat(Regex::star(Regex::union(sym("a"), sym("b"))), sym("a")),
            sym("b"),
        );
        let nfa = regex.to_epsilon_nfa();

        assert_eq!(nfa.start_states().count(), 1);
        assert_eq!(nfa.final_states().count(), 1);
        assert_eq!(nfa.symbols().len(), 2);
        assert!(regex.accepts(["a", "b"]));
        assert!(regex.accepts(["b", "b", "a", "a", "b"]));
        assert!(!regex.accepts(["a", "b", "a"]));
        assert!(!regex.accepts(Vec::<Label>::new()));
    }

    #[test]
    fn test_thompson_atoms() {
        assert!(Regex::Epsilon.accepts(Vec::<Label>::new()));
        assert!(!Regex::Epsilon.accepts(["a"]));
        assert!(Regex::Empty.to_epsilon_nfa().is_empty());
        assert!(!Regex::Empty.accepts(Vec::<Label>::new()));
        assert!(Regex::star(sym("a")).accepts(["a", "a", "a"]));
    }
}
