//! The generic combinator engine.
//!
//! Everything in this module is grammar-agnostic: a [`Parser`] is any value that can
//! attempt to read an `O` from a [`State`], and the provided methods on that trait build
//! larger parsers out of smaller ones.
//!
//! # Relationship to [`nom`]
//! The shape of this module deliberately mirrors [`nom::Parser`] (a trait with provided
//! combinator methods returning small adapter structs), but it differs in two ways that
//! the grammar relies on:
//!
//! 1. input is a byte offset into a source string held by a [`State`], which is
//!    explicitly snapshotted and restored by [`Or`], [`Repeat`] and [`Maybe`];
//! 2. the [`State`] remembers the furthest [`Failure`] created during a parse, even when
//!    that failure was later recovered from, so a whole-parse error can point at the
//!    place where the input stopped making sense.
//!
//! Lexical matching itself is still done by [`nom`] (see [`super::primitive`]).
//!
//! # Recursion
//! Grammar rules are values, so a rule that refers to itself (directly or through other
//! rules) is declared up front with [`forward`] and bound later through its [`Definer`].
//!
//! A reference from inside a rule's own definition should go through
//! [`Forward::downgrade`]: a [`Forward`] owns its definition, so a strong self-reference
//! would form an [`Arc`] cycle that is never freed.

use std::{
    borrow::Cow,
    marker::PhantomData,
    sync::{Arc, Weak},
};

use once_cell::sync::OnceCell;

/// A failed parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// The byte offset at which the attempt failed.
    pub offset: usize,
    /// A human-readable description of what was expected at `offset`.
    pub expected: Cow<'static, str>,
}

impl Failure {
    /// Constructs a new [`Failure`] at `offset`.
    pub fn new(offset: usize, expected: impl Into<Cow<'static, str>>) -> Self {
        Self {
            offset,
            expected: expected.into(),
        }
    }

    /// Returns whichever of `self` and `other` reached further into the input,
    /// preferring `self` when both stopped at the same offset.
    pub fn furthest(self, other: Self) -> Self {
        if other.offset > self.offset {
            other
        } else {
            self
        }
    }
}

/// The return type of [`Parser::parse`].
pub type PResult<O> = Result<O, Failure>;

/// The expectations gathered at the furthest offset reached during a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Expectations {
    /// The furthest offset at which a failure was recorded.
    offset: usize,
    /// Everything that was expected at `offset`, in the order it was tried.
    expected: Vec<Cow<'static, str>>,
}

impl Expectations {
    /// Summarizes `self` as a single [`Failure`].
    fn to_failure(&self) -> Failure {
        match self.expected.as_slice() {
            [single] => Failure::new(self.offset, single.clone()),
            many => Failure::new(self.offset, format!("one of {}", many.join(", "))),
        }
    }
}

/// The mutable state of a single parse: the source, the current offset into it, and
/// the furthest failure observed so far.
///
/// A [`State`] is created per parse and never shared, which is what allows one grammar
/// to serve any number of concurrent parses.
#[derive(Debug, Clone)]
pub struct State<'src> {
    /// The complete source text.
    source: &'src str,
    /// The current byte offset into `source`; always on a `char` boundary.
    offset: usize,
    /// What was expected at the furthest offset reached so far.
    furthest: Option<Expectations>,
    /// The number of enclosing [`Quiet`] parsers.
    quiet: usize,
}

impl<'src> State<'src> {
    /// Constructs a new [`State`] positioned at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            furthest: None,
            quiet: 0,
        }
    }

    /// Returns the complete source text.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the current byte offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the unconsumed remainder of the source.
    pub fn rest(&self) -> &'src str {
        &self.source[self.offset..]
    }

    /// Returns `true` if the whole source has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.offset == self.source.len()
    }

    /// Moves the current offset forward by `len` bytes.
    pub fn advance(&mut self, len: usize) {
        debug_assert!(self.source.is_char_boundary(self.offset + len));
        self.offset += len;
    }

    /// Resets the current offset to a previously observed `offset`.
    pub fn restore(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Creates a [`Failure`] at the current offset, recording its expectation unless a
    /// [`Quiet`] parser is running.
    pub fn fail(&mut self, expected: impl Into<Cow<'static, str>>) -> Failure {
        let failure = Failure::new(self.offset, expected);
        if self.quiet == 0 {
            self.record(&failure);
        }
        failure
    }

    /// Merges `failure` into the expectations at the furthest offset.
    fn record(&mut self, failure: &Failure) {
        if let Some(furthest) = &mut self.furthest {
            if furthest.offset > failure.offset {
                return;
            }

            if furthest.offset == failure.offset {
                if !furthest.expected.contains(&failure.expected) {
                    furthest.expected.push(failure.expected.clone());
                }
                return;
            }
        }

        self.furthest = Some(Expectations {
            offset: failure.offset,
            expected: vec![failure.expected.clone()],
        });
    }

    /// Returns the furthest failure recorded so far, with every expectation recorded at
    /// that offset merged into one description.
    pub fn furthest(&self) -> Option<Failure> {
        self.furthest.as_ref().map(Expectations::to_failure)
    }
}

/// A composable parsing rule producing values of type `O`.
///
/// On success a parser leaves the [`State`] positioned after whatever it consumed. On
/// failure the position is unspecified, and it is the responsibility of whichever
/// combinator recovers from the failure to restore it.
pub trait Parser<O> {
    /// Attempts to parse an `O` at the current position of `state`.
    fn parse(&self, state: &mut State<'_>) -> PResult<O>;

    /// Sequences `self` and `next`, producing the pair of their results.
    fn then<P>(self, next: P) -> Then<Self, P>
    where
        Self: Sized,
    {
        Then {
            first: self,
            second: next,
        }
    }

    /// Tries `self`, and if it fails tries `other` from the same starting position.
    fn or<P>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
        P: Parser<O>,
    {
        Or {
            first: self,
            second: other,
        }
    }

    /// Applies `f` to the result of `self`.
    fn map<F, U>(self, f: F) -> Map<Self, F, O>
    where
        Self: Sized,
        F: Fn(O) -> U,
    {
        Map {
            parser: self,
            f,
            phantom: PhantomData,
        }
    }

    /// Uses the result of `self` to construct the parser that runs next.
    fn bind<F, P>(self, f: F) -> Bind<Self, F, O>
    where
        Self: Sized,
        F: Fn(O) -> P,
    {
        Bind {
            parser: self,
            f,
            phantom: PhantomData,
        }
    }

    /// Applies `self` zero or more times.
    fn repeat(self) -> Repeat<Self>
    where
        Self: Sized,
    {
        Repeat { parser: self }
    }

    /// Applies `self` zero or one times.
    fn maybe(self) -> Maybe<Self>
    where
        Self: Sized,
    {
        Maybe { parser: self }
    }

    /// Runs `self` without recording its failures as expectations in the [`State`].
    ///
    /// Used for content, like whitespace, that is never what the user was missing.
    fn quiet(self) -> Quiet<Self>
    where
        Self: Sized,
    {
        Quiet { parser: self }
    }

    /// Erases the type of `self`, producing a cheaply clonable [`Rule`].
    fn boxed(self) -> Rule<O>
    where
        Self: Sized + Send + Sync + 'static,
    {
        Rule(Arc::new(self))
    }
}

/// The parser returned by [`Parser::then`].
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    /// Runs first.
    first: A,
    /// Runs from wherever `first` stopped.
    second: B,
}

impl<A, B, O1, O2> Parser<(O1, O2)> for Then<A, B>
where
    A: Parser<O1>,
    B: Parser<O2>,
{
    fn parse(&self, state: &mut State<'_>) -> PResult<(O1, O2)> {
        let first = self.first.parse(state)?;
        let second = self.second.parse(state)?;
        Ok((first, second))
    }
}

/// The parser returned by [`Parser::or`].
#[derive(Debug, Clone)]
pub struct Or<A, B> {
    /// The preferred alternative.
    first: A,
    /// The fallback alternative.
    second: B,
}

impl<A, B, O> Parser<O> for Or<A, B>
where
    A: Parser<O>,
    B: Parser<O>,
{
    fn parse(&self, state: &mut State<'_>) -> PResult<O> {
        let start = state.offset();
        match self.first.parse(state) {
            Ok(value) => Ok(value),
            Err(first) => {
                state.restore(start);
                self.second
                    .parse(state)
                    .map_err(|second| first.furthest(second))
            }
        }
    }
}

/// The parser returned by [`Parser::map`].
pub struct Map<P, F, O> {
    /// The inner parser.
    parser: P,
    /// The transformation applied to successful results.
    f: F,
    /// Marks the result type of `parser`.
    phantom: PhantomData<fn() -> O>,
}

impl<P, F, O, U> Parser<U> for Map<P, F, O>
where
    P: Parser<O>,
    F: Fn(O) -> U,
{
    fn parse(&self, state: &mut State<'_>) -> PResult<U> {
        self.parser.parse(state).map(&self.f)
    }
}

/// The parser returned by [`Parser::bind`].
pub struct Bind<P, F, O> {
    /// The parser whose result selects the continuation.
    parser: P,
    /// Builds the continuation.
    f: F,
    /// Marks the result type of `parser`.
    phantom: PhantomData<fn() -> O>,
}

impl<P, F, O, Q, U> Parser<U> for Bind<P, F, O>
where
    P: Parser<O>,
    F: Fn(O) -> Q,
    Q: Parser<U>,
{
    fn parse(&self, state: &mut State<'_>) -> PResult<U> {
        let value = self.parser.parse(state)?;
        (self.f)(value).parse(state)
    }
}

/// The parser returned by [`Parser::repeat`].
///
/// Repetition stops at the first attempt that fails *or* that succeeds without
/// consuming anything, so it terminates even over parsers that can match the empty
/// string. The stopping attempt is rolled back and its value (if any) is discarded.
#[derive(Debug, Clone)]
pub struct Repeat<P> {
    /// The repeated parser.
    parser: P,
}

impl<P, O> Parser<Vec<O>> for Repeat<P>
where
    P: Parser<O>,
{
    fn parse(&self, state: &mut State<'_>) -> PResult<Vec<O>> {
        let mut values = Vec::new();
        loop {
            let start = state.offset();
            match self.parser.parse(state) {
                Ok(value) if state.offset() > start => values.push(value),
                _ => {
                    state.restore(start);
                    return Ok(values);
                }
            }
        }
    }
}

/// The parser returned by [`Parser::maybe`]. Never fails.
#[derive(Debug, Clone)]
pub struct Maybe<P> {
    /// The optional parser.
    parser: P,
}

impl<P, O> Parser<Option<O>> for Maybe<P>
where
    P: Parser<O>,
{
    fn parse(&self, state: &mut State<'_>) -> PResult<Option<O>> {
        let start = state.offset();
        match self.parser.parse(state) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                state.restore(start);
                Ok(None)
            }
        }
    }
}

/// The parser returned by [`Parser::quiet`].
#[derive(Debug, Clone)]
pub struct Quiet<P> {
    /// The inner parser.
    parser: P,
}

impl<P, O> Parser<O> for Quiet<P>
where
    P: Parser<O>,
{
    fn parse(&self, state: &mut State<'_>) -> PResult<O> {
        state.quiet += 1;
        let result = self.parser.parse(state);
        state.quiet -= 1;
        result
    }
}

/// A type-erased, shareable [`Parser`].
///
/// Cloning a [`Rule`] is cheap and yields a handle to the same underlying parser, which
/// is how one rule ends up referenced from several places in a grammar.
pub struct Rule<O>(Arc<dyn Parser<O> + Send + Sync>);

impl<O> Clone for Rule<O> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<O> std::fmt::Debug for Rule<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Rule(..)")
    }
}

impl<O> Parser<O> for Rule<O> {
    fn parse(&self, state: &mut State<'_>) -> PResult<O> {
        self.0.parse(state)
    }
}

/// A parser whose definition is supplied after it has been referenced.
///
/// Created (together with its [`Definer`]) by [`forward`].
pub struct Forward<O> {
    /// The rule name, used if the cell is parsed before it is defined.
    name: &'static str,
    /// The definition, shared with the [`Definer`].
    cell: Arc<OnceCell<Rule<O>>>,
}

impl<O> Clone for Forward<O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<O> std::fmt::Debug for Forward<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forward")
            .field("name", &self.name)
            .field("defined", &self.cell.get().is_some())
            .finish()
    }
}

impl<O> Forward<O> {
    /// Returns a non-owning handle to the same definition, for use inside it.
    pub fn downgrade(&self) -> WeakForward<O> {
        WeakForward {
            name: self.name,
            cell: Arc::downgrade(&self.cell),
        }
    }
}

impl<O> Parser<O> for Forward<O> {
    fn parse(&self, state: &mut State<'_>) -> PResult<O> {
        match self.cell.get() {
            Some(rule) => rule.parse(state),
            None => Err(state.fail(format!("`{}` (undefined rule)", self.name))),
        }
    }
}

/// A non-owning handle to the definition of a [`Forward`], created by
/// [`Forward::downgrade`].
///
/// Once every [`Forward`] for a definition has been dropped, parsing a [`WeakForward`]
/// fails as if the rule had never been defined.
pub struct WeakForward<O> {
    /// The rule name, used if the definition is missing.
    name: &'static str,
    /// The definition, owned by the [`Forward`].
    cell: Weak<OnceCell<Rule<O>>>,
}

impl<O> Clone for WeakForward<O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            cell: Weak::clone(&self.cell),
        }
    }
}

impl<O> std::fmt::Debug for WeakForward<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakForward")
            .field("name", &self.name)
            .field("alive", &(self.cell.strong_count() > 0))
            .finish()
    }
}

impl<O> Parser<O> for WeakForward<O> {
    fn parse(&self, state: &mut State<'_>) -> PResult<O> {
        match self.cell.upgrade().as_deref().and_then(OnceCell::get) {
            Some(rule) => rule.parse(state),
            None => Err(state.fail(format!("`{}` (undefined rule)", self.name))),
        }
    }
}

/// The one-shot handle that binds a [`Forward`] to its definition.
#[derive(Debug)]
pub struct Definer<O> {
    /// The definition, shared with every clone of the [`Forward`].
    cell: Arc<OnceCell<Rule<O>>>,
}

impl<O> Definer<O> {
    /// Binds the associated [`Forward`] (and all of its clones) to `parser`.
    pub fn define<P>(self, parser: P)
    where
        P: Parser<O> + Send + Sync + 'static,
    {
        // a Definer is unique and consumed here, so the cell is still empty
        let _ = self.cell.set(parser.boxed());
    }
}

/// Declares a parser named `name` whose definition will be provided later through the
/// returned [`Definer`].
pub fn forward<O>(name: &'static str) -> (Forward<O>, Definer<O>) {
    let cell = Arc::new(OnceCell::new());
    (
        Forward {
            name,
            cell: Arc::clone(&cell),
        },
        Definer { cell },
    )
}

/// Runs `parser` over `source`, returning its result and the offset it stopped at.
#[cfg(test)]
pub(crate) fn run<O>(parser: &impl Parser<O>, source: &str) -> (PResult<O>, usize) {
    let mut state = State::new(source);
    let result = parser.parse(&mut state);
    (result, state.offset())
}
