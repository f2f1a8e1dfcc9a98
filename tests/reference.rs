// Compares the DFA against a naive backtracking matcher on random
// expressions over a three letter alphabet.

use finite_regex::Regex;
use quickcheck::{Arbitrary, Gen, QuickCheck};

const LETTERS: &[char] = &['a', 'b', 'c'];
const MAX_DEPTH: u32 = 4;

#[derive(Clone, Debug)]
enum Expr {
    Lit(char),
    Concat(Box<Expr>, Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Star(Box<Expr>),
    Plus(Box<Expr>),
    Question(Box<Expr>),
}

impl Expr {
    fn generate(g: &mut Gen, depth: u32) -> Expr {
        let choice = if depth == 0 { 0 } else { u8::arbitrary(g) % 6 };
        let lit = *g.choose(LETTERS).unwrap();
        match choice {
            0 => Expr::Lit(lit),
            1 => Expr::Concat(Box::new(Self::generate(g, depth - 1)), Box::new(Self::generate(g, depth - 1))),
            2 => Expr::Union(Box::new(Self::generate(g, depth - 1)), Box::new(Self::generate(g, depth - 1))),
            3 => Expr::Star(Box::new(Self::generate(g, depth - 1))),
            4 => Expr::Plus(Box::new(Self::generate(g, depth - 1))),
            _ => Expr::Question(Box::new(Self::generate(g, depth - 1))),
        }
    }

    /// Fully parenthesized, so precedence never matters.
    fn render(&self) -> String {
        match self {
            Expr::Lit(c) => c.to_string(),
            Expr::Concat(a, b) => format!("({})({})", a.render(), b.render()),
            Expr::Union(a, b) => format!("(({})|({}))", a.render(), b.render()),
            Expr::Star(a) => format!("({})*", a.render()),
            Expr::Plus(a) => format!("({})+", a.render()),
            Expr::Question(a) => format!("({})?", a.render()),
        }
    }

    fn matches(&self, input: &[char]) -> bool {
        matches_here(self, input, &mut |rest: &[char]| rest.is_empty())
    }
}

impl Arbitrary for Expr {
    fn arbitrary(g: &mut Gen) -> Self {
        Expr::generate(g, MAX_DEPTH)
    }
}

#[derive(Clone, Debug)]
struct Input(Vec<char>);

impl Arbitrary for Input {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 7;
        Input((0..len).map(|_| *g.choose(LETTERS).unwrap()).collect())
    }
}

/// Continuation-passing backtracker: `k` receives what is left after `e`
/// matched a prefix of `s`.
fn matches_here(e: &Expr, s: &[char], k: &mut dyn FnMut(&[char]) -> bool) -> bool {
    match e {
        Expr::Lit(c) => s.first() == Some(c) && k(&s[1..]),
        Expr::Concat(a, b) => matches_here(a, s, &mut |rest: &[char]| matches_here(b, rest, &mut *k)),
        Expr::Union(a, b) => matches_here(a, s, &mut *k) || matches_here(b, s, &mut *k),
        Expr::Question(a) => matches_here(a, s, &mut *k) || k(s),
        Expr::Star(a) => matches_star(a, s, k),
        Expr::Plus(a) => matches_here(a, s, &mut |rest: &[char]| matches_star(a, rest, &mut *k)),
    }
}

fn matches_star(a: &Expr, s: &[char], k: &mut dyn FnMut(&[char]) -> bool) -> bool {
    // Only iterations that consume input are tried again, otherwise nested
    // stars would recurse forever.
    k(s) || matches_here(a, s, &mut |rest: &[char]| rest.len() < s.len() && matches_star(a, rest, &mut *k))
}

fn dfa_agrees_with_backtracker(expr: Expr, inputs: Vec<Input>) -> bool {
    let pattern = expr.render();
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return false,
    };
    inputs.iter().all(|Input(chars)| {
        let haystack: String = chars.iter().collect();
        re.is_match(&haystack) == expr.matches(chars)
    })
}

#[test]
fn test_agrees_with_backtracker() {
    crate::init_logging();
    QuickCheck::new()
        .tests(300)
        .quickcheck(dfa_agrees_with_backtracker as fn(Expr, Vec<Input>) -> bool);
}

#[test]
fn test_backtracker_sanity() {
    let ab_star = Expr::Concat(Box::new(Expr::Lit('a')), Box::new(Expr::Star(Box::new(Expr::Lit('b')))));
    assert_eq!(ab_star.render(), "(a)((b)*)");
    assert!(ab_star.matches(&['a', 'b', 'b']));
    assert!(!ab_star.matches(&['b']));

    let nested = Expr::Star(Box::new(Expr::Star(Box::new(Expr::Lit('a')))));
    assert!(nested.matches(&[]));
    assert!(nested.matches(&['a', 'a']));
    assert!(!nested.matches(&['b']));
}

#[test]
fn test_exhaustive_short_inputs() {
    let patterns = ["(a|b)*c", "a?b+", "(ab|a)(bc|c)", "((a*)b?)+", "a(b|c)?a"];
    let mut inputs: Vec<Vec<char>> = vec![vec![]];
    for len in 1..=5 {
        let mut next = Vec::new();
        for prefix in inputs.iter().filter(|p| p.len() == len - 1) {
            for &c in LETTERS {
                let mut word = prefix.clone();
                word.push(c);
                next.push(word);
            }
        }
        inputs.extend(next);
    }

    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        let expr = parse_reference(pattern);
        for input in &inputs {
            let haystack: String = input.iter().collect();
            assert_eq!(re.is_match(&haystack), expr.matches(input), "{:?} on {:?}", pattern, haystack);
        }
    }
}

/// A tiny recursive-descent parser used only to build reference expressions
/// for hand-written patterns.
fn parse_reference(pattern: &str) -> Expr {
    fn union(chars: &[char], pos: &mut usize) -> Expr {
        let mut left = concat(chars, pos);
        while chars.get(*pos) == Some(&'|') {
            *pos += 1;
            left = Expr::Union(Box::new(left), Box::new(concat(chars, pos)));
        }
        left
    }

    fn concat(chars: &[char], pos: &mut usize) -> Expr {
        let mut left = postfix(chars, pos);
        while matches!(chars.get(*pos), Some(c) if *c != '|' && *c != ')') {
            left = Expr::Concat(Box::new(left), Box::new(postfix(chars, pos)));
        }
        left
    }

    fn postfix(chars: &[char], pos: &mut usize) -> Expr {
        let mut atom = if chars[*pos] == '(' {
            *pos += 1;
            let inner = union(chars, pos);
            *pos += 1;
            inner
        } else {
            *pos += 1;
            Expr::Lit(chars[*pos - 1])
        };
        loop {
            atom = match chars.get(*pos) {
                Some('*') => Expr::Star(Box::new(atom)),
                Some('+') => Expr::Plus(Box::new(atom)),
                Some('?') => Expr::Question(Box::new(atom)),
                _ => return atom,
            };
            *pos += 1;
        }
    }

    let chars: Vec<char> = pattern.chars().collect();
    union(&chars, &mut 0)
}
