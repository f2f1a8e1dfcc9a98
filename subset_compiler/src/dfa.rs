use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::state_set::StateSet;
use crate::{CompileError, CompileResult};

/// Index of a state within its [`Dfa`].
pub type DfaStateId = usize;

/// A DFA state: the set of NFA states it stands for, whether it accepts, and
/// at most one destination per symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    id: DfaStateId,
    nfa_states: StateSet,
    accepting: bool,
    transitions: BTreeMap<char, DfaStateId>,
}

impl DfaState {
    pub fn new(id: DfaStateId, nfa_states: StateSet, accepting: bool) -> Self {
        DfaState {
            id,
            nfa_states,
            accepting,
            transitions: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) the transition on `symbol`.
    pub fn with_transition(mut self, symbol: char, target: DfaStateId) -> Self {
        self.insert_transition(symbol, target);
        self
    }

    pub(crate) fn insert_transition(&mut self, symbol: char, target: DfaStateId) {
        self.transitions.insert(symbol, target);
    }

    pub fn id(&self) -> DfaStateId {
        self.id
    }

    /// The signature of this state.
    pub fn nfa_states(&self) -> &StateSet {
        &self.nfa_states
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn transitions(&self) -> &BTreeMap<char, DfaStateId> {
        &self.transitions
    }

    /// The destination on `symbol`, or `None` if there is no transition.
    #[inline]
    pub fn next(&self, symbol: char) -> Option<DfaStateId> {
        self.transitions.get(&symbol).copied()
    }
}

/// A finished deterministic automaton. It cannot be modified once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    start: DfaStateId,
    states: Vec<DfaState>,
}

impl Dfa {
    /// Validates and freezes a state collection.
    ///
    /// Fails with [`CompileError::InvariantViolation`] if `states` is empty,
    /// `start` is not one of them, a state's id does not match its position,
    /// or a transition points outside the collection.
    pub fn new(start: DfaStateId, states: Vec<DfaState>) -> CompileResult<Self> {
        if states.is_empty() {
            return Err(CompileError::invariant("DFA must have at least one state"));
        }
        if start >= states.len() {
            return Err(CompileError::invariant(format!(
                "DFA start state {} is not among its {} states",
                start,
                states.len()
            )));
        }
        for (index, state) in states.iter().enumerate() {
            if state.id != index {
                return Err(CompileError::invariant(format!(
                    "DFA state at position {} has id {}",
                    index, state.id
                )));
            }
            if let Some((symbol, target)) = state.transitions.iter().find(|&(_, &t)| t >= states.len()) {
                return Err(CompileError::invariant(format!(
                    "DFA transition {} --{:?}--> {} leaves the automaton",
                    index, symbol, target
                )));
            }
        }
        Ok(Dfa { start, states })
    }

    pub fn start(&self) -> DfaStateId {
        self.start
    }

    pub fn start_state(&self) -> &DfaState {
        &self.states[self.start]
    }

    /// Every state, in discovery order.
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// # Panics
    ///
    /// If `id` is not a state of this DFA.
    pub fn state(&self, id: DfaStateId) -> &DfaState {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false; construction rejects an empty automaton.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn next(&self, from: DfaStateId, symbol: char) -> Option<DfaStateId> {
        self.states.get(from).and_then(|s| s.next(symbol))
    }

    pub fn is_accepting(&self, id: DfaStateId) -> bool {
        self.states.get(id).map_or(false, |s| s.accepting)
    }

    /// Every symbol that labels at least one transition.
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.keys().copied())
            .collect()
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        for state in &self.states {
            let marker = if state.accepting { '*' } else { ' ' };
            write!(f, "{}{:>3} {}:", marker, state.id, state.nfa_states)?;
            for (symbol, target) in &state.transitions {
                write!(f, " {:?} -> {}", symbol, target)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
