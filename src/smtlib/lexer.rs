#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Tokenizer for the SMT-LIB subset, tracking lines for error reports.
//!
//! Everything that is not a parenthesis, whitespace or a comment lexes as a
//! symbol; `|...|` quotes a symbol and `"..."` a string, both of which may
//! span lines. Double `""` inside a string is the escape for one quote.

use crate::euf::error::{Result, SolverError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    Symbol(String),
    StringLit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Splits `input` into tokens, dropping `;` comments.
///
/// # Errors
///
/// Fails on an unterminated quoted symbol or string literal.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '(' => tokens.push(Token {
                kind: TokenKind::LParen,
                line,
            }),
            ')' => tokens.push(Token {
                kind: TokenKind::RParen,
                line,
            }),
            '|' => {
                let start = line;
                let mut symbol = String::new();
                loop {
                    match chars.next() {
                        Some('|') => break,
                        Some('\n') => {
                            line += 1;
                            symbol.push('\n');
                        }
                        Some(c) => symbol.push(c),
                        None => {
                            return Err(SolverError::parse(start, "unterminated quoted symbol"));
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Symbol(symbol),
                    line: start,
                });
            }
            '"' => {
                let start = line;
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            // "" escapes a single quote inside the literal
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                text.push('"');
                            } else {
                                break;
                            }
                        }
                        Some('\n') => {
                            line += 1;
                            text.push('\n');
                        }
                        Some(c) => text.push(c),
                        None => {
                            return Err(SolverError::parse(start, "unterminated string literal"));
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::StringLit(text),
                    line: start,
                });
            }
            c => {
                let mut symbol = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '(' | ')' | ';' | '|' | '"') {
                        break;
                    }
                    symbol.push(next);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Symbol(symbol),
                    line,
                });
            }
        }
    }
    Ok(tokens)
}
