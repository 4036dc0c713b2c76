//! The lexicon of the language, expressed as parsers.
//!
//! There is no separate lexing pass: every token is a [`pattern`] wrapped by [`token`],
//! which additionally swallows any whitespace and comments that follow the match. As a
//! consequence, no grammar rule ever has to deal with ignorable content except the
//! program entry point, which skips it once before the first token.

use nom::{
    bytes::complete::{tag, take_till, take_until, take_while1},
    character::complete::{char, digit1, none_of, satisfy},
    combinator::{not, recognize},
    multi::many0_count,
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::ast::{BinaryOp, Expr};

use super::{
    combinator::{Parser, Rule},
    primitive::{is_word_char, pattern, Keyword, Symbol},
};

/// Matches one or more ASCII whitespace characters, including vertical tab.
fn whitespace(input: &str) -> IResult<&str, &str> {
    // char::is_ascii_whitespace omits U+000B
    take_while1(|c: char| c.is_ascii_whitespace() || c == '\x0B')(input)
}

/// Matches a `//` comment, up to but excluding the end of the line.
fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), take_till(|c: char| c == '\n')))(input)
}

/// Matches a `/* ... */` comment, ending at the first `*/`.
fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// Matches an identifier: an ASCII letter or underscore followed by any number of
/// ASCII letters, digits and underscores.
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        many0_count(satisfy(is_word_char)),
    ))(input)
}

/// Matches a non-empty run of ASCII digits.
fn digits(input: &str) -> IResult<&str, &str> {
    digit1(input)
}

/// Matches a character literal such as `'a'`.
fn char_literal(input: &str) -> IResult<&str, &str> {
    recognize(delimited(char('\''), none_of("'"), char('\'')))(input)
}

/// Matches `=`, but not the first half of `==`.
fn assign_symbol(input: &str) -> IResult<&str, &str> {
    terminated(tag("="), not(char('=')))(input)
}

/// Matches `!`, but not the first half of `!=`.
fn not_symbol(input: &str) -> IResult<&str, &str> {
    terminated(tag("!"), not(char('=')))(input)
}

/// Returns a parser that skips any mixture of whitespace and comments. Never fails, and
/// never contributes to the expectations reported for a failed parse.
pub fn ignored() -> Rule<()> {
    pattern("whitespace", whitespace)
        .or(pattern("comment", line_comment))
        .or(pattern("comment", block_comment))
        .repeat()
        .map(|_| ())
        .quiet()
        .boxed()
}

/// Wraps `parser` so that any whitespace and comments after it are skipped.
pub fn token<P, O>(parser: P) -> Rule<O>
where
    P: Parser<O> + Send + Sync + 'static,
    O: 'static,
{
    parser.then(ignored()).map(|(value, ())| value).boxed()
}

/// Returns a parser for the keyword `word`.
pub fn keyword(word: &'static str) -> Rule<String> {
    token(pattern(format!("`{word}`"), Keyword(word)))
}

/// Returns a parser for the punctuation or operator `text`.
pub fn symbol(text: &'static str) -> Rule<String> {
    token(pattern(format!("`{text}`"), Symbol(text)))
}

/// Parses the `function` keyword.
pub fn function() -> Rule<String> {
    keyword("function")
}

/// Parses the `if` keyword.
pub fn r#if() -> Rule<String> {
    keyword("if")
}

/// Parses the `else` keyword.
pub fn r#else() -> Rule<String> {
    keyword("else")
}

/// Parses the `return` keyword.
pub fn r#return() -> Rule<String> {
    keyword("return")
}

/// Parses the `var` keyword.
pub fn var() -> Rule<String> {
    keyword("var")
}

/// Parses the `while` keyword.
pub fn r#while() -> Rule<String> {
    keyword("while")
}

/// Parses a `,`.
pub fn comma() -> Rule<String> {
    symbol(",")
}

/// Parses a `;`.
pub fn semicolon() -> Rule<String> {
    symbol(";")
}

/// Parses a `(`.
pub fn left_paren() -> Rule<String> {
    symbol("(")
}

/// Parses a `)`.
pub fn right_paren() -> Rule<String> {
    symbol(")")
}

/// Parses a `{`.
pub fn left_brace() -> Rule<String> {
    symbol("{")
}

/// Parses a `}`.
pub fn right_brace() -> Rule<String> {
    symbol("}")
}

/// Parses an identifier, producing its name.
pub fn id() -> Rule<String> {
    token(pattern("identifier", identifier))
}

/// Parses a numeric literal: a decimal integer, or failing that a character literal,
/// which stands for its code point.
pub fn number() -> Rule<Expr> {
    let integer = token(pattern("integer literal", digits));
    let character = token(pattern("character literal", char_literal));

    integer
        .map(|text| Expr::Number(decimal(&text)))
        .or(character.map(|text| Expr::Number(code_point(&text))))
        .boxed()
}

/// Parses the `!` operator.
pub fn not_op() -> Rule<()> {
    token(pattern("`!`", not_symbol)).map(|_| ()).boxed()
}

/// Parses the `=` of an assignment.
pub fn assign() -> Rule<()> {
    token(pattern("`=`", assign_symbol)).map(|_| ()).boxed()
}

/// Parses the binary operator `text`, producing `op`.
fn operator(text: &'static str, op: BinaryOp) -> Rule<BinaryOp> {
    symbol(text).map(move |_| op).boxed()
}

/// Parses `==`.
pub fn equal() -> Rule<BinaryOp> {
    operator("==", BinaryOp::Equal)
}

/// Parses `!=`.
pub fn not_equal() -> Rule<BinaryOp> {
    operator("!=", BinaryOp::NotEqual)
}

/// Parses `+`.
pub fn plus() -> Rule<BinaryOp> {
    operator("+", BinaryOp::Add)
}

/// Parses `-`.
pub fn minus() -> Rule<BinaryOp> {
    operator("-", BinaryOp::Sub)
}

/// Parses `*`.
pub fn star() -> Rule<BinaryOp> {
    operator("*", BinaryOp::Mul)
}

/// Parses `/`.
pub fn slash() -> Rule<BinaryOp> {
    operator("/", BinaryOp::Div)
}

/// Converts a string of ASCII digits into its value.
fn decimal(digits: &str) -> BigUint {
    digits.bytes().fold(BigUint::zero(), |acc, digit| {
        acc * 10u32 + u32::from(digit - b'0')
    })
}

/// Returns the code point of the character in a literal such as `'a'`.
fn code_point(literal: &str) -> BigUint {
    // char_literal guarantees exactly one character between the quotes
    literal
        .chars()
        .nth(1)
        .map(u32::from)
        .unwrap_or_default()
        .into()
}
