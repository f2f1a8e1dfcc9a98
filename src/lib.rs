/*!
Whole-string regular expression matching with a precompiled DFA.

A [`Regex`] is compiled once, up front, through the pipeline in
[`subset_compiler`]: the pattern is converted to postfix, turned into a
Thompson NFA, and determinized by subset construction. Matching is then a
single left-to-right walk over the input, so it runs in time linear in the
input length no matter the pattern.

```
use finite_regex::Regex;

let re = Regex::new("ab*(c|d)")?;
assert!(re.is_match("abbbc"));
assert!(!re.is_match("abbb"));
# Ok::<(), finite_regex::Error>(())
```

# Syntax

| pattern | matches |
|---------|---------|
| `x`     | the literal character `x` |
| `xy`    | `x` followed by `y` |
| `x\|y`  | `x` or `y` |
| `x*`    | zero or more `x` |
| `x+`    | one or more `x` |
| `x?`    | zero or one `x` |
| `(x)`   | grouping |
| `\c`    | the character `c` taken literally, even if it is an operator |

Unary operators bind tighter than concatenation, which binds tighter than
`|`. Whitespace outside an escape is ignored unless
[`RegexBuilder::ignore_whitespace`] turns that off. There are no character
classes, anchors or captures, and a match must cover the whole input.
*/

#![deny(missing_docs)]

use std::fmt;
use std::str::FromStr;

use subset_compiler::{Alphabet, Compiler, Determinizer, Dfa, Matcher, Parser};

pub use subset_compiler::{CompileError as Error, SyntaxError, SyntaxErrorKind};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

/// A compiled regular expression.
///
/// Cheap to share: matching only reads the underlying [`Dfa`].
#[derive(Clone, Debug)]
pub struct Regex {
    pattern: String,
    dfa: Dfa,
}

impl Regex {
    /// Compiles `pattern` with the default [`Config`].
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        RegexBuilder::new(pattern).build()
    }

    /// Returns true if the regex matches all of `haystack`.
    pub fn is_match(&self, haystack: &str) -> bool {
        Matcher::new(&self.dfa).accepts(haystack)
    }

    /// The pattern this regex was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The automaton that does the matching.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

impl FromStr for Regex {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Regex, Error> {
        Regex::new(pattern)
    }
}

/// Compilation options.
#[derive(Debug, Clone)]
pub struct Config {
    /// Drop unescaped whitespace from the pattern. Default: true.
    pub ignore_whitespace: bool,
    /// Refuse to build more DFA states than this. Default: no limit.
    pub dfa_state_limit: Option<usize>,
    /// The ordered alphabet for subset construction. Default: every symbol
    /// that appears in the pattern, in ascending order.
    pub alphabet: Option<Vec<char>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_whitespace: true,
            dfa_state_limit: None,
            alphabet: None,
        }
    }
}

impl From<&Config> for Parser {
    fn from(value: &Config) -> Self {
        Parser::new().ignore_whitespace(value.ignore_whitespace)
    }
}

impl From<&Config> for Determinizer {
    fn from(value: &Config) -> Self {
        Determinizer::new().state_limit(value.dfa_state_limit)
    }
}

/// Configures and compiles a [`Regex`].
#[derive(Debug, Clone)]
pub struct RegexBuilder<'s> {
    pattern: &'s str,
    config: Config,
}

impl<'s> RegexBuilder<'s> {
    /// Starts from the default [`Config`].
    pub fn new(pattern: &'s str) -> Self {
        Self {
            pattern,
            config: Config::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// See [`Config::ignore_whitespace`].
    pub fn ignore_whitespace(mut self, value: bool) -> Self {
        self.config.ignore_whitespace = value;
        self
    }

    /// See [`Config::dfa_state_limit`].
    pub fn dfa_state_limit(mut self, limit: Option<usize>) -> Self {
        self.config.dfa_state_limit = limit;
        self
    }

    /// See [`Config::alphabet`]. Symbols missing from `alphabet` can never
    /// be matched.
    pub fn alphabet<I: IntoIterator<Item = char>>(mut self, alphabet: I) -> Self {
        self.config.alphabet = Some(alphabet.into_iter().collect());
        self
    }

    /// Runs the full pipeline.
    pub fn build(&self) -> Result<Regex, Error> {
        let postfix = Parser::from(&self.config).parse(self.pattern)?;
        let nfa = Compiler::new().compile(&postfix)?;
        let alphabet = match &self.config.alphabet {
            Some(symbols) => Alphabet::new(symbols.iter().copied()),
            None => Alphabet::of(&nfa),
        };
        let dfa = Determinizer::from(&self.config).determinize(&nfa, &alphabet)?;
        Ok(Regex {
            pattern: self.pattern.to_string(),
            dfa,
        })
    }
}
