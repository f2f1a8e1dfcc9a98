//! Sets of NFA states.
//!
//! A [`StateSet`] is the identity of a DFA state: two DFA states are the same
//! exactly when their sets are equal. It is stored as a sorted, deduplicated
//! sequence so that equality, ordering and hashing are all canonical.

use std::fmt;

use crate::nfa::StateId;

#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateSet {
    ids: Vec<StateId>,
}

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(id: StateId) -> Self {
        StateSet { ids: vec![id] }
    }

    pub(crate) fn from_bitset(bits: &Bitset) -> Self {
        StateSet {
            ids: bits.iter().collect(),
        }
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// State ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[StateId] {
        &self.ids
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut ids: Vec<StateId> = iter.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        StateSet { ids }
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ids.iter()).finish()
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "}}")
    }
}

/// Membership scratch space sized to one NFA.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Bitset {
    data: Vec<bool>,
}

impl Bitset {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            data: vec![false; size],
        }
    }

    /// Returns true if `bit` was not already present. Out of range bits are
    /// ignored.
    pub(crate) fn insert(&mut self, bit: usize) -> bool {
        match self.data.get_mut(bit) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag)
            .map(|(idx, _)| idx)
    }
}
