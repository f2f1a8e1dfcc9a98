use crate::dfa::Dfa;

/// Runs a DFA against whole inputs.
///
/// Matching never mutates the DFA, so any number of matchers may share one
/// automaton across threads.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    dfa: &'a Dfa,
}

impl<'a> Matcher<'a> {
    /// Create a new matcher for the given DFA
    pub fn new(dfa: &'a Dfa) -> Self {
        Self { dfa }
    }

    /// Check if the entire input is accepted
    pub fn accepts(&self, input: &str) -> bool {
        self.accepts_chars(input.chars())
    }

    /// Same as [`Matcher::accepts`] over any character sequence. Stops at
    /// the first character with no transition.
    pub fn accepts_chars<I: IntoIterator<Item = char>>(&self, input: I) -> bool {
        let mut current = self.dfa.start_state();
        for ch in input {
            match current.next(ch) {
                Some(next) => current = self.dfa.state(next),
                None => return false,
            }
        }
        current.is_accepting()
    }
}

/// Whole-string match: true iff `dfa` accepts all of `input`.
pub fn accepts(dfa: &Dfa, input: &str) -> bool {
    Matcher::new(dfa).accepts(input)
}
