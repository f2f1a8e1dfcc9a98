//! Subset construction.
//!
//! Each DFA state stands for the epsilon-closure of a set of NFA states. The
//! construction starts from the closure of the NFA's start state and explores
//! a FIFO worklist; for every state it tries each symbol of the alphabet in
//! the caller's order. Given the same NFA and the same alphabet order, the
//! states are always discovered in the same order and get the same ids.
//!
//! Termination: every DFA state is a distinct subset of the NFA's states, so
//! at most `2^n` of them can ever be discovered.

use std::collections::{HashMap, VecDeque};

use crate::dfa::{Dfa, DfaState, DfaStateId};
use crate::nfa::{Nfa, StateId};
use crate::state_set::{Bitset, StateSet};
use crate::{CompileError, CompileResult};

/// The ordered symbols that subset construction tries from every state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Keeps the first occurrence of each symbol, in iteration order.
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Self {
        let mut out: Vec<char> = Vec::new();
        for symbol in symbols {
            if !out.contains(&symbol) {
                out.push(symbol);
            }
        }
        Alphabet { symbols: out }
    }

    /// Every symbol that labels an edge of `nfa`, in ascending order.
    pub fn of(nfa: &Nfa) -> Self {
        let mut symbols: Vec<char> = nfa
            .states()
            .iter()
            .flat_map(|s| s.transitions().iter().filter_map(|t| t.symbol))
            .collect();
        symbols.sort_unstable();
        symbols.dedup();
        Alphabet { symbols }
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Alphabet::new(iter)
    }
}

/// The smallest superset of `states` closed under epsilon edges.
///
/// Ids that are not states of `nfa` are ignored.
pub fn epsilon_closure(nfa: &Nfa, states: &StateSet) -> StateSet {
    let mut seen = Bitset::new(nfa.len());
    let mut stack: Vec<_> = states.iter().filter(|&id| seen.insert(id)).collect();

    while let Some(id) = stack.pop() {
        for target in nfa.state(id).epsilon_targets() {
            if seen.insert(target) {
                stack.push(target);
            }
        }
    }

    StateSet::from_bitset(&seen)
}

/// The states reachable from `states` by one edge labelled exactly `symbol`.
/// Epsilon edges are not followed.
pub fn move_on(nfa: &Nfa, states: &StateSet, symbol: char) -> StateSet {
    let mut reached = Bitset::new(nfa.len());
    for state in states.iter().filter_map(|id| nfa.get(id)) {
        for target in state.targets_on(symbol) {
            reached.insert(target);
        }
    }
    StateSet::from_bitset(&reached)
}

/// Runs subset construction.
#[derive(Debug, Clone, Default)]
pub struct Determinizer {
    state_limit: Option<usize>,
}

impl Determinizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`CompileError::TooComplex`] instead of discovering more
    /// than `limit` DFA states. `None` (the default) means no limit.
    pub fn state_limit(mut self, limit: Option<usize>) -> Self {
        self.state_limit = limit;
        self
    }

    pub fn determinize(&self, nfa: &Nfa, alphabet: &Alphabet) -> CompileResult<Dfa> {
        let accept = nfa.accept();
        let start_set = epsilon_closure(nfa, &StateSet::singleton(nfa.start()));

        let mut states: Vec<DfaState> = Vec::new();
        let mut index: HashMap<StateSet, DfaStateId> = HashMap::new();
        let mut worklist: VecDeque<DfaStateId> = VecDeque::new();

        let start = self.discover(start_set, accept, &mut states, &mut index)?;
        worklist.push_back(start);

        while let Some(current) = worklist.pop_front() {
            for symbol in alphabet.iter() {
                let closure = epsilon_closure(nfa, &move_on(nfa, states[current].nfa_states(), symbol));
                if closure.is_empty() {
                    continue;
                }
                let target = match index.get(&closure) {
                    Some(&existing) => existing,
                    None => {
                        let id = self.discover(closure, accept, &mut states, &mut index)?;
                        worklist.push_back(id);
                        id
                    }
                };
                states[current].insert_transition(symbol, target);
            }
        }

        debug!("subset construction produced {} DFA states", states.len());
        Dfa::new(start, states)
    }

    /// Registers a newly found NFA state set as the next DFA state.
    fn discover(
        &self,
        nfa_states: StateSet,
        accept: StateId,
        states: &mut Vec<DfaState>,
        index: &mut HashMap<StateSet, DfaStateId>,
    ) -> CompileResult<DfaStateId> {
        let id = states.len();
        if let Some(limit) = self.state_limit {
            if id >= limit {
                return Err(CompileError::TooComplex { limit });
            }
        }
        let accepting = nfa_states.contains(accept);
        trace!("DFA state {} = {} (accepting: {})", id, nfa_states, accepting);
        index.insert(nfa_states.clone(), id);
        states.push(DfaState::new(id, nfa_states, accepting));
        Ok(id)
    }
}

/// Runs subset construction without a state limit.
pub fn determinize(nfa: &Nfa, alphabet: &Alphabet) -> CompileResult<Dfa> {
    Determinizer::new().determinize(nfa, alphabet)
}
