//! A parser-combinator front end operating directly on source text.
//!
//! # Layers
//! - [`combinator`] and [`primitive`] form a grammar-agnostic engine;
//! - [`token`] specializes the engine to the lexicon of the language;
//! - [`expr`] and [`stmt`] build AST-producing grammar rules from tokens;
//! - [`Grammar`] ties them together into the program entry point.
//!
//! # Errors
//! A failed parse produces a single [`ParseError`] describing the furthest position the
//! parser reached and everything it would have accepted there. No attempt is made to
//! recover and report further errors.

use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::debug;

use crate::ast::Block;

use self::{
    combinator::{Failure, Parser, Rule, State},
    primitive::end,
    token::ignored,
};

pub mod combinator;
pub mod expr;
pub mod primitive;
pub mod stmt;
pub mod token;
mod util;

/// The error type produced when a program cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("expected {expected} at {line}:{column}")]
pub struct ParseError {
    /// The byte offset at which parsing failed.
    pub offset: usize,
    /// The 1-based line of `offset`.
    pub line: usize,
    /// The 1-based column of `offset`, counted in characters.
    pub column: usize,
    /// A description of what was expected at `offset`.
    pub expected: String,
}

impl ParseError {
    /// Constructs a [`ParseError`] from a [`Failure`] that occurred while parsing `source`.
    fn new(source: &str, failure: Failure) -> Self {
        let prefix = source.get(..failure.offset).unwrap_or(source);
        let line_start = prefix.rfind('\n').map_or(0, |index| index + 1);

        Self {
            offset: failure.offset,
            line: prefix.matches('\n').count() + 1,
            column: prefix[line_start..].chars().count() + 1,
            expected: failure.expected.into_owned(),
        }
    }

    /// Renders `self` as a multi-line report quoting the offending line of `source`, with
    /// a caret under the failing column.
    pub fn render(&self, source: &str) -> String {
        let text = source
            .lines()
            .nth(self.line.saturating_sub(1))
            .unwrap_or_default();
        let gutter = self.line.to_string();
        let pad = " ".repeat(gutter.len());

        format!(
            "error: {self}\n{pad} |\n{gutter} | {text}\n{pad} | {caret:>column$}",
            caret = "^",
            column = self.column,
        )
    }
}

/// The complete grammar of the language.
///
/// A [`Grammar`] is immutable once built and can be shared between threads, each of
/// which may parse independently. Building one is comparatively expensive, so a program
/// should build one and reuse it; [`parse`] does exactly that. Recursive rules refer
/// back to themselves weakly, so dropping a [`Grammar`] frees all of its rules.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// The entry rule.
    program: Rule<Block>,
}

sa::assert_impl_all!(Grammar: Send, Sync);

impl Grammar {
    /// Builds the grammar.
    pub fn new() -> Self {
        let statement = stmt::statement(expr::expression());
        let program = ignored()
            .then(statement.repeat())
            .then(end())
            .map(|(((), statements), ())| Block::new(statements))
            .boxed();

        Self { program }
    }

    /// Parses the whole of `source` into a [`Block`] of top-level statements.
    pub fn parse(&self, source: &str) -> Result<Block, ParseError> {
        debug!(bytes = source.len(), "parsing program");
        let mut state = State::new(source);

        match self.program.parse(&mut state) {
            Ok(block) => {
                debug!(statements = block.len(), "parsed program");
                Ok(block)
            }
            Err(failure) => {
                let failure = state.furthest().unwrap_or(failure);
                let error = ParseError::new(source, failure);
                debug!(
                    offset = error.offset,
                    expected = %error.expected,
                    "failed to parse program"
                );
                Err(error)
            }
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

/// The grammar used by [`parse`], built on first use.
static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    debug!("building grammar");
    Grammar::new()
});

/// Parses the whole of `source` into a [`Block`] of top-level statements.
pub fn parse(source: &str) -> Result<Block, ParseError> {
    GRAMMAR.parse(source)
}
