//! Infix pattern to postfix token stream.
//!
//! The dialect is small: literal characters, the operators `|`, `*`, `+`,
//! `?`, grouping with `(` `)`, and `\` to make the next character a literal.
//! Concatenation is implicit in the pattern and becomes the explicit `·`
//! operator in the postfix form.

use std::fmt;
use std::str::FromStr;

use crate::{CompileError, CompileResult, SyntaxErrorKind};

/// Character used for explicit concatenation in the textual postfix form.
pub const CONCAT: char = '·';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A plain operand character
    Literal(char),
    /// A character that followed a backslash
    Escaped(char),
    Union,
    Concat,
    Star,
    Plus,
    Question,
    LeftParen,
    RightParen,
}

impl TokenKind {
    /// The literal symbol carried by an operand token.
    pub fn literal(self) -> Option<char> {
        match self {
            TokenKind::Literal(c) | TokenKind::Escaped(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_operand(self) -> bool {
        self.literal().is_some()
    }

    /// Binding power for the shunting-yard pass; zero for everything that is
    /// not an operator.
    fn precedence(self) -> u8 {
        match self {
            TokenKind::Star | TokenKind::Plus | TokenKind::Question => 3,
            TokenKind::Concat => 2,
            TokenKind::Union => 1,
            _ => 0,
        }
    }

    /// Whether a concatenation may follow this token.
    fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Literal(_)
                | TokenKind::Escaped(_)
                | TokenKind::RightParen
                | TokenKind::Star
                | TokenKind::Plus
                | TokenKind::Question
        )
    }

    /// Whether a concatenation may precede this token.
    fn starts_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Literal(_) | TokenKind::Escaped(_) | TokenKind::LeftParen
        )
    }

    /// The operator character, for operator tokens.
    pub fn operator(self) -> Option<char> {
        match self {
            TokenKind::Union => Some('|'),
            TokenKind::Concat => Some(CONCAT),
            TokenKind::Star => Some('*'),
            TokenKind::Plus => Some('+'),
            TokenKind::Question => Some('?'),
            TokenKind::LeftParen => Some('('),
            TokenKind::RightParen => Some(')'),
            TokenKind::Literal(_) | TokenKind::Escaped(_) => None,
        }
    }
}

fn is_meta(c: char) -> bool {
    matches!(c, '|' | '*' | '+' | '?' | '(' | ')' | '\\' | CONCAT)
}

/// A token and the character offset it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Token { kind, position }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Escaped(c) => write!(f, "\\{}", c),
            TokenKind::Literal(c) if is_meta(c) => write!(f, "\\{}", c),
            TokenKind::Literal(c) => write!(f, "{}", c),
            op => match op.operator() {
                Some(c) => write!(f, "{}", c),
                None => Ok(()),
            },
        }
    }
}

/// A pattern in postfix order. Contains no parentheses when produced by
/// [`Parser::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Postfix {
    tokens: Vec<Token>,
}

impl Postfix {
    pub fn new(tokens: Vec<Token>) -> Self {
        Postfix { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

/// Reads the textual postfix form back into tokens.
///
/// Positions are character offsets into the postfix text. Parentheses are
/// kept as tokens so that [`crate::Compiler`] can reject them.
impl FromStr for Postfix {
    type Err = CompileError;

    fn from_str(s: &str) -> CompileResult<Self> {
        let mut tokens = Vec::new();
        let mut chars = s.chars().enumerate();
        while let Some((i, c)) = chars.next() {
            let kind = match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => TokenKind::Escaped(escaped),
                    None => return Err(CompileError::syntax(SyntaxErrorKind::DanglingEscape, i)),
                },
                CONCAT => TokenKind::Concat,
                '|' => TokenKind::Union,
                '*' => TokenKind::Star,
                '+' => TokenKind::Plus,
                '?' => TokenKind::Question,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                c => TokenKind::Literal(c),
            };
            tokens.push(Token::new(kind, i));
        }
        Ok(Postfix { tokens })
    }
}

/// Converts infix patterns to postfix.
#[derive(Debug, Clone)]
pub struct Parser {
    ignore_whitespace: bool,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            ignore_whitespace: true,
        }
    }

    /// When enabled (the default), unescaped whitespace is dropped from the
    /// pattern. When disabled it is an ordinary literal.
    pub fn ignore_whitespace(mut self, yes: bool) -> Self {
        self.ignore_whitespace = yes;
        self
    }

    /// Splits a pattern into tokens. `\X` becomes a single escaped literal.
    pub fn tokenize(&self, pattern: &str) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars().enumerate();
        while let Some((i, c)) = chars.next() {
            let kind = match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => TokenKind::Escaped(escaped),
                    None => return Err(CompileError::syntax(SyntaxErrorKind::DanglingEscape, i)),
                },
                c if c.is_whitespace() && self.ignore_whitespace => continue,
                '|' => TokenKind::Union,
                '*' => TokenKind::Star,
                '+' => TokenKind::Plus,
                '?' => TokenKind::Question,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                c => TokenKind::Literal(c),
            };
            tokens.push(Token::new(kind, i));
        }
        Ok(tokens)
    }

    /// Tokenizes `pattern`, inserts explicit concatenation and reorders the
    /// tokens into postfix.
    pub fn parse(&self, pattern: &str) -> CompileResult<Postfix> {
        let tokens = insert_concatenation(&self.tokenize(pattern)?);
        let postfix = shunting_yard(&tokens)?;
        debug!("postfix for {:?}: {}", pattern, postfix);
        Ok(postfix)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Inserts a `Concat` token between every pair of adjacent tokens where the
/// left one ends an operand and the right one starts one.
pub fn insert_concatenation(tokens: &[Token]) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    for (i, &token) in tokens.iter().enumerate() {
        if i > 0 && tokens[i - 1].kind.ends_operand() && token.kind.starts_operand() {
            out.push(Token::new(TokenKind::Concat, token.position));
        }
        out.push(token);
    }
    out
}

fn shunting_yard(tokens: &[Token]) -> CompileResult<Postfix> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();
    let mut prev: Option<Token> = None;

    for &token in tokens {
        match token.kind {
            TokenKind::Literal(_) | TokenKind::Escaped(_) => output.push(token),
            TokenKind::LeftParen => operators.push(token),
            TokenKind::RightParen => {
                if let Some(open) = prev.filter(|p| p.kind == TokenKind::LeftParen) {
                    return Err(CompileError::syntax(SyntaxErrorKind::EmptyGroup, open.position));
                }
                loop {
                    match operators.pop() {
                        Some(top) if top.kind == TokenKind::LeftParen => break,
                        Some(top) => output.push(top),
                        None => {
                            return Err(CompileError::syntax(
                                SyntaxErrorKind::UnmatchedCloseParen,
                                token.position,
                            ))
                        }
                    }
                }
            }
            op => {
                // Every operator is left-associative, so pop on equal
                // precedence as well.
                let precedence = op.precedence();
                while let Some(&top) = operators.last() {
                    if top.kind == TokenKind::LeftParen || top.kind.precedence() < precedence {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(token);
            }
        }
        prev = Some(token);
    }

    while let Some(top) = operators.pop() {
        if top.kind == TokenKind::LeftParen {
            return Err(CompileError::syntax(SyntaxErrorKind::UnmatchedOpenParen, top.position));
        }
        output.push(top);
    }

    Ok(Postfix::new(output))
}

/// Converts `pattern` to postfix with the default [`Parser`].
pub fn to_postfix(pattern: &str) -> CompileResult<Postfix> {
    Parser::new().parse(pattern)
}

/// Tokenizes `pattern` with the default [`Parser`].
pub fn tokenize(pattern: &str) -> CompileResult<Vec<Token>> {
    Parser::new().tokenize(pattern)
}
