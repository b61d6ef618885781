#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Recursive-descent parser for the SMT-LIB subset.
//!
//! Commands: `set-logic` (QF_UF only), `set-info` and `set-option` (skipped
//! wholesale), `declare-sort` with arity 0, `declare-fun`, `declare-const`,
//! `assert`, `check-sat` and `exit`. Inside assertions the connectives
//! `and`, `or` and `not` are structural; `=` and `distinct` fold their
//! n-ary forms into binary equalities; any other head resolves through the
//! declaration table as a predicate application. `ite`, `let`, `=>`, `xor`
//! and the Boolean constants are recognised and rejected as unsupported
//! rather than misparsed.

use crate::euf::error::{Result, SolverError};
use crate::euf::formula::Formula;
use crate::euf::term::{FunId, TermArena, TermId};
use crate::smtlib::lexer::{Token, TokenKind, tokenize};
use itertools::Itertools as _;
use rustc_hash::FxHashSet;
use std::path::Path;

/// A parsed script: declarations in the arena, assertions as formulas.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub arena: TermArena,
    pub assertions: Vec<Formula>,
    pub logic: Option<String>,
    pub check_sat: bool,
}

impl Script {
    /// The conjunction of all assertions, or `None` for an empty script.
    #[must_use]
    pub fn conjunction(&self) -> Option<Formula> {
        match self.assertions.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            _ => Some(Formula::And(self.assertions.clone())),
        }
    }
}

/// Parses a whole script from source text.
///
/// # Errors
///
/// Any lexical, syntactic or declaration error aborts the parse.
pub fn parse_script(input: &str) -> Result<Script> {
    let tokens = tokenize(input)?;
    Parser::new(&tokens).run()
}

/// Reads and parses `path`.
///
/// # Errors
///
/// Propagates I/O failures on top of the usual parse errors.
pub fn parse_file(path: &Path) -> Result<Script> {
    let text = std::fs::read_to_string(path)?;
    parse_script(&text)
}

const UNSUPPORTED_CONNECTIVES: &[&str] = &[
    "ite", "=>", "xor", "let", "forall", "exists", "true", "false",
];

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    arena: TermArena,
    sorts: FxHashSet<String>,
    assertions: Vec<Formula>,
    logic: Option<String>,
    check_sat: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            arena: TermArena::new(),
            sorts: FxHashSet::default(),
            assertions: Vec::new(),
            logic: None,
            check_sat: false,
        }
    }

    fn run(mut self) -> Result<Script> {
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::LParen => {
                    if !self.command()? {
                        break;
                    }
                }
                _ => return Err(self.err_at(token, "expected `(` to open a command")),
            }
        }
        Ok(Script {
            arena: self.arena,
            assertions: self.assertions,
            logic: self.logic,
            check_sat: self.check_sat,
        })
    }

    /// Parses one command body, the opening paren already consumed.
    /// Returns `false` on `exit`.
    fn command(&mut self) -> Result<bool> {
        let (name, _) = self.expect_symbol()?;
        match name {
            "set-logic" => {
                // Recorded but never interpreted; unsupported constructs
                // fail at their use site regardless of the declared logic.
                let (logic, _) = self.expect_symbol()?;
                tracing::debug!(logic, "declared logic recorded");
                self.logic = Some(logic.to_owned());
                self.expect_rparen()?;
            }
            "set-info" | "set-option" => self.skip_balanced()?,
            "declare-sort" => {
                let (sort, token) = self.expect_symbol()?;
                let (arity, arity_token) = self.expect_symbol()?;
                if arity != "0" {
                    return Err(self.err_at(arity_token, "only arity-0 sorts are supported"));
                }
                if sort == "Bool" || !self.sorts.insert(sort.to_owned()) {
                    return Err(self.err_at(token, format!("sort `{sort}` is declared twice")));
                }
                self.expect_rparen()?;
            }
            "declare-fun" => {
                self.declare_fun()?;
                self.expect_rparen()?;
            }
            "declare-const" => {
                let (name, _) = self.expect_symbol()?;
                let result = self.sort()?;
                self.declare(name, &[], result)?;
                self.expect_rparen()?;
            }
            "assert" => {
                let formula = self.formula()?;
                self.expect_rparen()?;
                self.assertions.push(formula);
            }
            "check-sat" => {
                self.check_sat = true;
                self.expect_rparen()?;
            }
            "exit" => {
                self.expect_rparen()?;
                return Ok(false);
            }
            other => {
                return Err(SolverError::Unsupported(format!("command `{other}`")));
            }
        }
        Ok(true)
    }

    fn declare_fun(&mut self) -> Result<()> {
        let (name, _) = self.expect_symbol()?;
        let name = name.to_owned();
        self.expect_lparen()?;
        let mut args = Vec::new();
        loop {
            let token = self.bump_or_eof()?;
            match &token.kind {
                TokenKind::RParen => break,
                TokenKind::Symbol(sort) => args.push(self.check_arg_sort(sort, token)?),
                _ => return Err(self.err_at(token, "expected a sort name")),
            }
        }
        let result = self.sort()?;
        self.declare(&name, &args, result)
    }

    /// Declared sorts become `Value`, `Bool` stays `Bool`, anything else is
    /// unknown.
    fn sort(&mut self) -> Result<Sort> {
        let (sort, token) = self.expect_symbol()?;
        if sort == "Bool" {
            return Ok(Sort::Bool);
        }
        if self.sorts.contains(sort) {
            return Ok(Sort::Value);
        }
        Err(self.err_at(token, format!("unknown sort `{sort}`")))
    }

    fn check_arg_sort(&self, sort: &str, token: &Token) -> Result<Sort> {
        if sort == "Bool" {
            return Err(SolverError::Unsupported(
                "Bool-sorted function arguments".into(),
            ));
        }
        if self.sorts.contains(sort) {
            return Ok(Sort::Value);
        }
        Err(self.err_at(token, format!("unknown sort `{sort}`")))
    }

    fn declare(&mut self, name: &str, args: &[Sort], result: Sort) -> Result<()> {
        match result {
            Sort::Bool => self.arena.declare_predicate(name, args.len()).map(|_| ()),
            Sort::Value => self.arena.declare_fun(name, args.len()).map(|_| ()),
        }
    }

    fn formula(&mut self) -> Result<Formula> {
        let token = self.bump_or_eof()?;
        match &token.kind {
            TokenKind::Symbol(name) => self.atom(name),
            TokenKind::LParen => {
                let (head, head_token) = self.expect_symbol()?;
                match head {
                    "and" | "or" => {
                        let mut children = Vec::new();
                        while !self.at_rparen() {
                            children.push(self.formula()?);
                        }
                        self.expect_rparen()?;
                        if children.is_empty() {
                            return Err(SolverError::EmptyConnective(if head == "and" {
                                "and"
                            } else {
                                "or"
                            }));
                        }
                        Ok(if head == "and" {
                            Formula::And(children)
                        } else {
                            Formula::Or(children)
                        })
                    }
                    "not" => {
                        let child = self.formula()?;
                        if !self.at_rparen() {
                            return Err(self
                                .err_at(head_token, "`not` takes exactly one argument"));
                        }
                        self.expect_rparen()?;
                        Ok(Formula::not(child))
                    }
                    "=" => {
                        let terms = self.terms_until_rparen(head_token, 2)?;
                        // chain: (= a b c) is a = b and b = c
                        let pairs: Vec<Formula> = terms
                            .iter()
                            .tuple_windows()
                            .map(|(&left, &right)| Formula::equality(left, right))
                            .collect();
                        Ok(Self::conjoin(pairs))
                    }
                    "distinct" => {
                        let terms = self.terms_until_rparen(head_token, 2)?;
                        let pairs: Vec<Formula> = terms
                            .iter()
                            .tuple_combinations()
                            .map(|(&left, &right)| Formula::disequality(left, right))
                            .collect();
                        Ok(Self::conjoin(pairs))
                    }
                    head if UNSUPPORTED_CONNECTIVES.contains(&head) => {
                        Err(SolverError::Unsupported(format!("connective `{head}`")))
                    }
                    _ => self.predicate_application(head_token),
                }
            }
            _ => Err(self.err_at(token, "expected a formula")),
        }
    }

    /// A bare symbol in formula position: a Boolean constant.
    fn atom(&mut self, name: &str) -> Result<Formula> {
        if UNSUPPORTED_CONNECTIVES.contains(&name) {
            return Err(SolverError::Unsupported(format!("constant `{name}`")));
        }
        let fun = self.lookup(name)?;
        if !self.arena.function(fun).boolean {
            return Err(SolverError::SortMismatch {
                term: name.to_owned(),
                expected: "Boolean",
            });
        }
        Ok(Formula::Predicate(self.arena.constant(fun)?))
    }

    /// `(p t...)` in formula position with `p` not a connective.
    fn predicate_application(&mut self, head: &'a Token) -> Result<Formula> {
        let TokenKind::Symbol(name) = &head.kind else {
            return Err(self.err_at(head, "expected a symbol"));
        };
        let fun = self.lookup(name)?;
        let args = self.term_args_until_rparen()?;
        if !self.arena.function(fun).boolean {
            return Err(SolverError::SortMismatch {
                term: name.clone(),
                expected: "Boolean",
            });
        }
        Ok(Formula::Predicate(self.arena.apply(fun, &args)?))
    }

    fn terms_until_rparen(&mut self, head: &Token, minimum: usize) -> Result<Vec<TermId>> {
        let mut terms = Vec::new();
        while !self.at_rparen() {
            terms.push(self.term()?);
        }
        self.expect_rparen()?;
        if terms.len() < minimum {
            return Err(self.err_at(head, format!("needs at least {minimum} arguments")));
        }
        Ok(terms)
    }

    fn term(&mut self) -> Result<TermId> {
        let token = self.bump_or_eof()?;
        match &token.kind {
            TokenKind::Symbol(name) => {
                if UNSUPPORTED_CONNECTIVES.contains(&name.as_str()) {
                    return Err(SolverError::Unsupported(format!("constant `{name}`")));
                }
                let fun = self.lookup(name)?;
                self.arena.constant(fun)
            }
            TokenKind::LParen => {
                let (name, _) = self.expect_symbol()?;
                let fun = self.lookup(name)?;
                let args = self.term_args_until_rparen()?;
                self.arena.apply(fun, &args)
            }
            _ => Err(self.err_at(token, "expected a term")),
        }
    }

    /// Parses argument terms up to `)`, rejecting Boolean-sorted ones.
    fn term_args_until_rparen(&mut self) -> Result<Vec<TermId>> {
        let mut args = Vec::new();
        while !self.at_rparen() {
            let arg = self.term()?;
            if self.arena.is_boolean(arg) {
                return Err(SolverError::SortMismatch {
                    term: self.arena.display(arg),
                    expected: "value",
                });
            }
            args.push(arg);
        }
        self.expect_rparen()?;
        Ok(args)
    }

    fn conjoin(mut parts: Vec<Formula>) -> Formula {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Formula::And(parts)
        }
    }

    fn lookup(&self, name: &str) -> Result<FunId> {
        self.arena
            .lookup(name)
            .ok_or_else(|| SolverError::UnknownSymbol(name.to_owned()))
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn bump_or_eof(&mut self) -> Result<&'a Token> {
        let line = self.last_line();
        self.bump()
            .ok_or_else(|| SolverError::parse(line, "unexpected end of input"))
    }

    fn at_rparen(&self) -> bool {
        matches!(
            self.tokens.get(self.pos),
            Some(Token {
                kind: TokenKind::RParen,
                ..
            })
        )
    }

    fn expect_symbol(&mut self) -> Result<(&'a str, &'a Token)> {
        let token = self.bump_or_eof()?;
        match &token.kind {
            TokenKind::Symbol(name) => Ok((name, token)),
            _ => Err(self.err_at(token, "expected a symbol")),
        }
    }

    fn expect_lparen(&mut self) -> Result<()> {
        let token = self.bump_or_eof()?;
        if token.kind == TokenKind::LParen {
            Ok(())
        } else {
            Err(self.err_at(token, "expected `(`"))
        }
    }

    fn expect_rparen(&mut self) -> Result<()> {
        let token = self.bump_or_eof()?;
        if token.kind == TokenKind::RParen {
            Ok(())
        } else {
            Err(self.err_at(token, "expected `)`"))
        }
    }

    /// Consumes up to the `)` matching the already-open command form.
    fn skip_balanced(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.bump_or_eof()?;
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    fn err_at(&self, token: &Token, message: impl Into<String>) -> SolverError {
        SolverError::parse(token.line, message)
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(1, |token| token.line)
    }
}

/// Sorts collapse to a two-point lattice: the Booleans and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sort {
    Bool,
    Value,
}
