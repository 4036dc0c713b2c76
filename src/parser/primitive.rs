//! Primitive parsers, from which every other parser is ultimately built.
//!
//! Only [`pattern`] ever looks at the source text. It delegates the actual matching to a
//! [`Recognize`] implementation, which is either a named function built from [`nom`]
//! parsers or one of the fixed recognizers [`Keyword`] and [`Symbol`].

use std::borrow::Cow;

use nom::{
    bytes::complete::tag,
    character::complete::satisfy,
    combinator::{not, recognize},
    sequence::terminated,
    IResult,
};

use super::combinator::{PResult, Parser, State};

/// A lexical pattern, matched against a prefix of the remaining input.
pub trait Recognize {
    /// Matches a prefix of `input`, returning the unmatched remainder.
    fn recognize<'a>(&self, input: &'a str) -> IResult<&'a str, &'a str>;
}

impl<F> Recognize for F
where
    F: for<'a> Fn(&'a str) -> IResult<&'a str, &'a str>,
{
    #[inline(always)]
    fn recognize<'a>(&self, input: &'a str) -> IResult<&'a str, &'a str> {
        self(input)
    }
}

/// Recognizes a keyword as a whole word, i.e. only when it is not immediately followed
/// by a character that could continue an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword(pub &'static str);

impl Recognize for Keyword {
    fn recognize<'a>(&self, input: &'a str) -> IResult<&'a str, &'a str> {
        recognize(terminated(tag(self.0), not(satisfy(is_word_char))))(input)
    }
}

/// Recognizes an exact string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol(pub &'static str);

impl Recognize for Symbol {
    fn recognize<'a>(&self, input: &'a str) -> IResult<&'a str, &'a str> {
        tag(self.0)(input)
    }
}

/// Returns `true` if `c` may appear after the first character of an identifier.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The parser returned by [`constant`].
#[derive(Debug, Clone)]
pub struct Constant<O>(O);

impl<O: Clone> Parser<O> for Constant<O> {
    fn parse(&self, _state: &mut State<'_>) -> PResult<O> {
        Ok(self.0.clone())
    }
}

/// Returns a parser that always succeeds with `value` without consuming input.
pub fn constant<O: Clone>(value: O) -> Constant<O> {
    Constant(value)
}

/// The parser returned by [`pattern`].
#[derive(Debug, Clone)]
pub struct Pattern<R> {
    /// Describes `recognizer` in failure messages.
    expected: Cow<'static, str>,
    /// The lexical pattern.
    recognizer: R,
}

impl<R: Recognize> Parser<String> for Pattern<R> {
    fn parse(&self, state: &mut State<'_>) -> PResult<String> {
        let input = state.rest();
        let matched = match self.recognizer.recognize(input) {
            // a well-behaved recognizer returns a suffix of its input as the tail
            Ok((tail, _)) => input
                .len()
                .checked_sub(tail.len())
                .and_then(|len| input.get(..len)),
            Err(_) => None,
        };

        match matched {
            Some(matched) => {
                state.advance(matched.len());
                Ok(matched.to_owned())
            }
            None => Err(state.fail(self.expected.clone())),
        }
    }
}

/// Returns a parser that matches `recognizer` at the current position, producing the
/// matched text, or fails with the description `expected`.
pub fn pattern<R: Recognize>(expected: impl Into<Cow<'static, str>>, recognizer: R) -> Pattern<R> {
    Pattern {
        expected: expected.into(),
        recognizer,
    }
}

/// The parser returned by [`end`].
#[derive(Debug, Clone, Copy)]
pub struct End;

impl Parser<()> for End {
    fn parse(&self, state: &mut State<'_>) -> PResult<()> {
        match state.is_at_end() {
            true => Ok(()),
            false => Err(state.fail("end of input")),
        }
    }
}

/// Returns a parser that succeeds only when no input remains.
pub fn end() -> End {
    End
}

#[cfg(test)]
mod tests {
    use nom::character::complete::digit1;

    use crate::parser::combinator::{run, Failure};

    use super::*;

    fn digits(input: &str) -> IResult<&str, &str> {
        digit1(input)
    }

    #[test]
    fn constant_consumes_nothing() {
        let (result, offset) = run(&constant(42), "hello");
        assert_eq!(result.unwrap(), 42);
        assert_eq!(offset, 0);
    }

    #[test]
    fn pattern_advances_by_the_match() {
        let (result, offset) = run(&pattern("digits", digits), "149 * X");
        assert_eq!(result.unwrap(), "149");
        assert_eq!(offset, 3);

        let (result, offset) = run(&pattern("digits", digits), "X * 149");
        assert_eq!(result.unwrap_err(), Failure::new(0, "digits"));
        assert_eq!(offset, 0);
    }

    #[test]
    fn pattern_rejects_a_tail_longer_than_its_input() {
        fn bogus(_: &str) -> IResult<&str, &str> {
            Ok(("a tail longer than the input", ""))
        }

        let (result, offset) = run(&pattern("bogus", bogus), "short");
        assert_eq!(result.unwrap_err(), Failure::new(0, "bogus"));
        assert_eq!(offset, 0);
    }

    #[test]
    fn pattern_rejects_a_match_ending_inside_a_character() {
        // a 2-byte tail leaves 1 byte of the 2-byte `é` as the match
        fn split(input: &str) -> IResult<&str, &str> {
            Ok(("zz", input))
        }

        let (result, offset) = run(&pattern("split", split), "éz");
        assert_eq!(result.unwrap_err(), Failure::new(0, "split"));
        assert_eq!(offset, 0);
    }

    #[test]
    fn keyword_only_matches_whole_words() {
        assert!(Keyword("var").recognize("var x").is_ok_and(|res| res == (" x", "var")));
        assert!(Keyword("var").recognize("var").is_ok_and(|res| res == ("", "var")));
        assert!(Keyword("var").recognize("var(").is_ok());
        assert!(Keyword("var").recognize("variable").is_err());
        assert!(Keyword("var").recognize("var_1").is_err());
        assert!(Keyword("var").recognize("va").is_err());
    }

    #[test]
    fn symbol_matches_exactly() {
        assert!(Symbol("==").recognize("== 1").is_ok_and(|res| res == (" 1", "==")));
        assert!(Symbol("==").recognize("= 1").is_err());
    }

    #[test]
    fn end_requires_empty_input() {
        assert!(run(&end(), "").0.is_ok());
        assert_eq!(run(&end(), " ").0.unwrap_err(), Failure::new(0, "end of input"));
    }
}
