use crate::nfa::{Builder, Fragment, Nfa, StateId, Transition};
use crate::postfix::{Postfix, Token, TokenKind};
use crate::{CompileError, CompileResult, SyntaxErrorKind};

/// Compiler that interprets a postfix token stream as a stack machine over
/// Thompson fragments.
///
/// Each compiler owns one state arena, so it is consumed by
/// [`Compiler::compile`].
pub struct Compiler {
    builder: Builder,
}

impl Compiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Self {
            builder: Builder::new(),
        }
    }

    /// Compile postfix tokens to a Thompson NFA
    pub fn compile(mut self, postfix: &Postfix) -> CompileResult<Nfa> {
        let mut stack: Vec<Fragment> = Vec::new();

        for &token in postfix.tokens() {
            let fragment = match token.kind {
                TokenKind::Literal(ch) | TokenKind::Escaped(ch) => self.compile_literal(ch)?,
                TokenKind::Concat => {
                    let (first, second) = pop_pair(&mut stack, token)?;
                    self.compile_concat(first, second)?
                }
                TokenKind::Union => {
                    let (first, second) = pop_pair(&mut stack, token)?;
                    self.compile_union(first, second)?
                }
                TokenKind::Star => {
                    let inner = pop_one(&mut stack, token)?;
                    self.compile_star(inner)?
                }
                TokenKind::Plus => {
                    let inner = pop_one(&mut stack, token)?;
                    self.compile_plus(inner)?
                }
                TokenKind::Question => {
                    let inner = pop_one(&mut stack, token)?;
                    self.compile_question(inner)?
                }
                TokenKind::LeftParen | TokenKind::RightParen => {
                    return Err(CompileError::syntax(
                        SyntaxErrorKind::UnknownOperator(token.kind.operator().unwrap_or('?')),
                        token.position,
                    ));
                }
            };
            stack.push(fragment);
        }

        let fragment = match stack.len() {
            0 => self.compile_empty()?,
            1 => stack[0],
            n => {
                let end = postfix.tokens().last().map_or(0, |t| t.position + 1);
                return Err(CompileError::syntax(SyntaxErrorKind::DanglingOperands(n), end));
            }
        };

        let nfa = self.builder.finish(fragment)?;
        debug!("built NFA with {} states", nfa.len());
        Ok(nfa)
    }

    /// Compile the empty pattern: one state that is both entry and exit
    fn compile_empty(&mut self) -> CompileResult<Fragment> {
        let state = self.builder.add_state();
        self.builder.fragment(state, state)
    }

    /// Compile a single literal symbol
    fn compile_literal(&mut self, ch: char) -> CompileResult<Fragment> {
        let start = self.builder.add_state();
        let end = self.builder.add_state();
        self.builder.add_transition(start, Transition::symbol(ch, end))?;
        self.builder.fragment(start, end)
    }

    /// Compile `first` followed by `second`
    fn compile_concat(&mut self, first: Fragment, second: Fragment) -> CompileResult<Fragment> {
        self.builder.set_accepting(first.end, false)?;
        self.builder.add_epsilon(first.end, second.start)?;
        self.builder.fragment(first.start, second.end)
    }

    /// Compile `first | second`
    fn compile_union(&mut self, first: Fragment, second: Fragment) -> CompileResult<Fragment> {
        let (start, end) = self.fresh_pair();
        self.builder.add_epsilon(start, first.start)?;
        self.builder.add_epsilon(start, second.start)?;
        self.retire_exit(first, end)?;
        self.retire_exit(second, end)?;
        self.builder.fragment(start, end)
    }

    /// Compile * quantifier: skip, or loop any number of times
    fn compile_star(&mut self, inner: Fragment) -> CompileResult<Fragment> {
        let (start, end) = self.fresh_pair();
        self.builder.add_epsilon(start, inner.start)?;
        self.builder.add_epsilon(start, end)?;
        self.builder.add_epsilon(inner.end, inner.start)?;
        self.retire_exit(inner, end)?;
        self.builder.fragment(start, end)
    }

    /// Compile + quantifier: one mandatory pass, then loop
    fn compile_plus(&mut self, inner: Fragment) -> CompileResult<Fragment> {
        let (start, end) = self.fresh_pair();
        self.builder.add_epsilon(start, inner.start)?;
        self.builder.add_epsilon(inner.end, inner.start)?;
        self.retire_exit(inner, end)?;
        self.builder.fragment(start, end)
    }

    /// Compile ? quantifier: skip, or one pass
    fn compile_question(&mut self, inner: Fragment) -> CompileResult<Fragment> {
        let (start, end) = self.fresh_pair();
        self.builder.add_epsilon(start, inner.start)?;
        self.builder.add_epsilon(start, end)?;
        self.retire_exit(inner, end)?;
        self.builder.fragment(start, end)
    }

    fn fresh_pair(&mut self) -> (StateId, StateId) {
        let start = self.builder.add_state();
        let end = self.builder.add_state();
        (start, end)
    }

    /// Links a wrapped fragment's exit to the new exit and clears its
    /// accepting flag.
    fn retire_exit(&mut self, inner: Fragment, end: StateId) -> CompileResult<()> {
        self.builder.set_accepting(inner.end, false)?;
        self.builder.add_epsilon(inner.end, end)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn pop_one(stack: &mut Vec<Fragment>, op: Token) -> CompileResult<Fragment> {
    stack.pop().ok_or_else(|| missing_operand(op))
}

/// Pops the right operand, then the left one.
fn pop_pair(stack: &mut Vec<Fragment>, op: Token) -> CompileResult<(Fragment, Fragment)> {
    let second = pop_one(stack, op)?;
    let first = pop_one(stack, op)?;
    Ok((first, second))
}

fn missing_operand(op: Token) -> CompileError {
    CompileError::syntax(
        SyntaxErrorKind::MissingOperand(op.kind.operator().unwrap_or('?')),
        op.position,
    )
}

/// Builds an NFA from the textual postfix form, e.g. `"ab|c·"`.
pub fn build(postfix: &str) -> CompileResult<Nfa> {
    let postfix: Postfix = postfix.parse()?;
    Compiler::new().compile(&postfix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postfix::to_postfix;
    use crate::SyntaxError;

    fn compile(pattern: &str) -> Nfa {
        Compiler::new().compile(&to_postfix(pattern).unwrap()).unwrap()
    }

    fn accepting_states(nfa: &Nfa) -> Vec<StateId> {
        nfa.states()
            .iter()
            .filter(|s| s.is_accepting())
            .map(|s| s.id())
            .collect()
    }

    fn syntax_error(postfix: &str) -> SyntaxError {
        match build(postfix) {
            Err(CompileError::Syntax(err)) => err,
            other => panic!("expected a syntax error for {:?}, got {:?}", postfix, other),
        }
    }

    #[test]
    fn test_literal_fragment() {
        let nfa = build("a").unwrap();
        assert_eq!(nfa.len(), 2);
        assert_eq!(nfa.state(nfa.start()).transitions(), &[Transition::symbol('a', nfa.accept())]);
        assert_eq!(accepting_states(&nfa), vec![nfa.accept()]);
    }

    #[test]
    fn test_state_counts_per_rule() {
        assert_eq!(build("ab·").unwrap().len(), 4);
        assert_eq!(build("ab|").unwrap().len(), 6);
        assert_eq!(build("a*").unwrap().len(), 4);
        assert_eq!(build("a+").unwrap().len(), 4);
        assert_eq!(build("a?").unwrap().len(), 4);
    }

    #[test]
    fn test_single_accepting_state() {
        for pattern in ["a", "ab", "a|b", "ab*", "a+", "a?b", "(a|b)*c+", "((a?)|b)+"] {
            let nfa = compile(pattern);
            assert_eq!(accepting_states(&nfa), vec![nfa.accept()], "pattern {:?}", pattern);
        }
    }

    #[test]
    fn test_star_structure() {
        let nfa = build("a*").unwrap();
        // 0 -a-> 1 is the inner fragment, 2/3 the wrapper
        let start = nfa.state(nfa.start());
        let mut skip: Vec<StateId> = start.epsilon_targets().collect();
        skip.sort_unstable();
        assert_eq!(skip, vec![0, 3]);
        let mut from_inner: Vec<StateId> = nfa.state(1).epsilon_targets().collect();
        from_inner.sort_unstable();
        assert_eq!(from_inner, vec![0, 3]);
    }

    #[test]
    fn test_plus_has_no_bypass() {
        let nfa = build("a+").unwrap();
        let start = nfa.state(nfa.start());
        assert!(start.epsilon_targets().all(|t| t != nfa.accept()));
    }

    #[test]
    fn test_escaped_literal_is_one_symbol() {
        let nfa = build(r"\*").unwrap();
        assert_eq!(nfa.len(), 2);
        assert_eq!(nfa.state(nfa.start()).transitions()[0].symbol, Some('*'));
    }

    #[test]
    fn test_empty_pattern() {
        let nfa = compile("");
        assert_eq!(nfa.len(), 1);
        assert_eq!(nfa.start(), nfa.accept());
        assert!(nfa.state(nfa.start()).is_accepting());
    }

    #[test]
    fn test_malformed_postfix() {
        let err = syntax_error("ab");
        assert_eq!(err.kind, SyntaxErrorKind::DanglingOperands(2));
        assert_eq!(err.position, 2);

        let err = syntax_error("a|");
        assert_eq!(err.kind, SyntaxErrorKind::MissingOperand('|'));
        assert_eq!(err.position, 1);

        let err = syntax_error("*");
        assert_eq!(err.kind, SyntaxErrorKind::MissingOperand('*'));

        let err = syntax_error("a(");
        assert_eq!(err.kind, SyntaxErrorKind::UnknownOperator('('));
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_missing_operand_from_pattern_position() {
        let err = Compiler::new().compile(&to_postfix("ab|").unwrap()).unwrap_err();
        assert_eq!(
            err.as_syntax().map(|e| (e.kind, e.position)),
            Some((SyntaxErrorKind::MissingOperand('|'), 2))
        );
    }
}
