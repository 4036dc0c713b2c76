//! Common functionality for the [`crate::parser`] submodules.
//!
//! # Infix operators
//! A left-associative binary operator cannot be written as the obvious left-recursive
//! rule (`sum := sum '+' product | product`) in a recursive-descent parser, since the
//! rule would immediately invoke itself without consuming anything. [`infix`] instead
//! parses the first operand and then a *repetition* of `(operator, operand)` suffixes,
//! folding them onto the first operand from left to right.
//!
//! ```raw
//! sum ::= product (('+' | '-') product)*
//! ```

use std::{cell::Cell, iter};

use super::{
    combinator::{PResult, Parser, Rule, State},
    primitive::constant,
    token::comma,
};

/// Returns a parser for `term (operator term)*`, combining the results from left to
/// right with `combine`, so that `a - b - c` produces `combine(-, combine(-, a, b), c)`.
pub fn infix<O, T>(operator: Rule<O>, term: Rule<T>, combine: fn(O, T, T) -> T) -> Rule<T>
where
    O: 'static,
    T: Send + Sync + 'static,
{
    term.clone()
        .bind(move |head: T| FoldLeft {
            head: Cell::new(Some(head)),
            tail: operator.clone().then(term.clone()).repeat(),
            combine,
        })
        .boxed()
}

/// The continuation built by [`infix`] for a single parsed head operand.
///
/// The head is moved into the fold rather than cloned, since it may be an arbitrarily
/// large subtree.
struct FoldLeft<P, T, O> {
    /// The first operand; taken by the first (and only) call to `parse`.
    head: Cell<Option<T>>,
    /// Parses the `(operator, operand)` suffixes.
    tail: P,
    /// Combines an operator and its operands.
    combine: fn(O, T, T) -> T,
}

impl<P, T, O> Parser<T> for FoldLeft<P, T, O>
where
    P: Parser<Vec<(O, T)>>,
{
    fn parse(&self, state: &mut State<'_>) -> PResult<T> {
        let tail = self.tail.parse(state)?;
        let combine = self.combine;

        match self.head.take() {
            Some(head) => Ok(tail
                .into_iter()
                .fold(head, |lhs, (op, rhs)| combine(op, lhs, rhs))),
            // bind builds a fresh continuation per head
            None => Err(state.fail("operand")),
        }
    }
}

/// Returns a parser for a possibly-empty, comma-separated list of `item`s without a
/// trailing comma.
pub fn comma_separated<T>(item: Rule<T>) -> Rule<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    item.clone()
        .then(comma().then(item).repeat())
        .map(|(head, tail)| {
            iter::once(head)
                .chain(tail.into_iter().map(|(_, item)| item))
                .collect::<Vec<_>>()
        })
        .or(constant(Vec::new()))
        .boxed()
}
