use std::fmt;

use crate::{CompileError, CompileResult};

/// A state ID in the NFA. Ids are indices into the owning automaton's arena
/// and start at zero for every construction.
pub type StateId = usize;

/// An outgoing edge. `symbol` is `None` for an epsilon edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub symbol: Option<char>,
    pub target: StateId,
}

impl Transition {
    /// Create an edge that consumes no input
    pub fn epsilon(target: StateId) -> Self {
        Transition {
            symbol: None,
            target,
        }
    }

    /// Create an edge that consumes exactly `ch`
    pub fn symbol(ch: char, target: StateId) -> Self {
        Transition {
            symbol: Some(ch),
            target,
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbol.is_none()
    }
}

/// A Thompson NFA state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    id: StateId,
    transitions: Vec<Transition>,
    accepting: bool,
}

impl State {
    fn new(id: StateId) -> Self {
        State {
            id,
            transitions: Vec::new(),
            accepting: false,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Targets of this state's epsilon edges.
    pub fn epsilon_targets(&self) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(|t| t.is_epsilon())
            .map(|t| t.target)
    }

    /// Targets of this state's edges labelled exactly `symbol`.
    pub fn targets_on(&self, symbol: char) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(move |t| t.symbol == Some(symbol))
            .map(|t| t.target)
    }
}

/// Fragment of an NFA with one entry and one exit state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: StateId,
    pub end: StateId,
}

/// The mutable side of NFA construction: an arena of states with its own
/// id counter. Converted into an [`Nfa`] by [`Builder::finish`].
#[derive(Debug, Default)]
pub(crate) struct Builder {
    states: Vec<State>,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a new state and return its ID
    pub(crate) fn add_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(State::new(id));
        id
    }

    fn state_mut(&mut self, id: StateId) -> CompileResult<&mut State> {
        self.states
            .get_mut(id)
            .ok_or_else(|| CompileError::invariant(format!("NFA state {} does not exist", id)))
    }

    /// Adds an edge from `from`. Both ends must already exist.
    pub(crate) fn add_transition(&mut self, from: StateId, transition: Transition) -> CompileResult<()> {
        if transition.target >= self.states.len() {
            return Err(CompileError::invariant(format!(
                "edge {} -> {} points outside the NFA",
                from, transition.target
            )));
        }
        self.state_mut(from)?.transitions.push(transition);
        Ok(())
    }

    pub(crate) fn add_epsilon(&mut self, from: StateId, to: StateId) -> CompileResult<()> {
        self.add_transition(from, Transition::epsilon(to))
    }

    pub(crate) fn set_accepting(&mut self, id: StateId, accepting: bool) -> CompileResult<()> {
        self.state_mut(id)?.accepting = accepting;
        Ok(())
    }

    /// Creates a fragment over existing states and marks its exit accepting.
    pub(crate) fn fragment(&mut self, start: StateId, end: StateId) -> CompileResult<Fragment> {
        if start >= self.states.len() || end >= self.states.len() {
            return Err(CompileError::invariant(format!(
                "fragment ({}, {}) refers to a missing state",
                start, end
            )));
        }
        self.set_accepting(end, true)?;
        Ok(Fragment { start, end })
    }

    /// Freezes the arena. `fragment.end` must be the one and only accepting
    /// state.
    pub(crate) fn finish(mut self, fragment: Fragment) -> CompileResult<Nfa> {
        self.set_accepting(fragment.end, true)?;
        if fragment.start >= self.states.len() {
            return Err(CompileError::invariant(format!(
                "NFA start state {} does not exist",
                fragment.start
            )));
        }
        let stray = self
            .states
            .iter()
            .find(|s| s.accepting && s.id != fragment.end);
        if let Some(state) = stray {
            return Err(CompileError::invariant(format!(
                "state {} is accepting but the exit is {}",
                state.id, fragment.end
            )));
        }
        Ok(Nfa {
            states: self.states,
            start: fragment.start,
            accept: fragment.end,
        })
    }
}

/// A finished Thompson NFA. Read-only: it has exactly one start and exactly
/// one accepting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
}

impl Nfa {
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The sole accepting state
    pub fn accept(&self) -> StateId {
        self.accept
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// # Panics
    ///
    /// If `id` is not a state of this NFA.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn get(&self, id: StateId) -> Option<&State> {
        self.states.get(id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false; an NFA has at least its start state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        writeln!(f, "accept: {}", self.accept)?;
        for state in &self.states {
            write!(f, "{:>4}:", state.id)?;
            for t in &state.transitions {
                match t.symbol {
                    Some(c) => write!(f, " {:?} -> {}", c, t.target)?,
                    None => write!(f, " ε -> {}", t.target)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
