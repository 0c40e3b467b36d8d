//! Symbol types for automata transitions.
//!
//! Symbols are interned process-wide, so a [`Symbol`] is a cheap `Copy` handle
//! that compares by value across every automaton in the process.

use indexmap::IndexSet;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A symbol identifier: the symbol's index in the interner.
pub type SymbolId = u32;

fn interner() -> &'static RwLock<IndexSet<Arc<str>>> {
    static INTERNER: OnceLock<RwLock<IndexSet<Arc<str>>>> = OnceLock::new();
    INTERNER.get_or_init(|| RwLock::new(IndexSet::new()))
}

fn intern(name: &str) -> SymbolId {
    if let Some(id) = interner().read().get_index_of(name) {
        return id as SymbolId;
    }
    // Another caller may have interned the name between the two locks;
    // insert_full returns the existing index in that case.
    let (id, _) = interner().write().insert_full(Arc::from(name));
    id as SymbolId
}

/// An atomic input token of an automaton's alphabet.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(SymbolId);

impl Symbol {
    /// Intern `name` and return its symbol.
    pub fn new(name: &str) -> Self {
        Self(intern(name))
    }

    /// The interner index of this symbol.
    pub fn id(self) -> SymbolId {
        self.0
    }

    /// The name this symbol was created from.
    pub fn name(self) -> Arc<str> {
        let interner = interner().read();
        // Handles are only minted by `intern`, so the index is always present.
        interner
            .get_index(self.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Self::new(c.encode_utf8(&mut [0; 4]))
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Symbols order by name, so output built from sorted symbols is stable
/// regardless of interning order.
impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.0 == other.0 {
            return std::cmp::Ordering::Equal;
        }
        self.name().cmp(&other.name())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", &*self.name())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A transition label: either an ordinary symbol or epsilon.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Symbol(Symbol),
    Epsilon,
}

impl Label {
    /// Check if this label is an epsilon transition.
    #[inline]
    pub fn is_epsilon(self) -> bool {
        matches!(self, Label::Epsilon)
    }

    /// The ordinary symbol carried by this label, if any.
    #[inline]
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            Label::Symbol(symbol) => Some(symbol),
            Label::Epsilon => None,
        }
    }
}

impl From<Symbol> for Label {
    fn from(symbol: Symbol) -> Self {
        Label::Symbol(symbol)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::Symbol(Symbol::new(name))
    }
}

impl From<char> for Label {
    fn from(c: char) -> Self {
        Label::Symbol(Symbol::from(c))
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Symbol(symbol) => fmt::Debug::fmt(symbol, f),
            Label::Epsilon => f.write_str("Epsilon"),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Symbol(symbol) => fmt::Display::fmt(symbol, f),
            Label::Epsilon => f.write_str("epsilon"),
        }
    }
}
