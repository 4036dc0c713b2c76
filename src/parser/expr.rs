//! Expressions.
//!
//! # Grammar
//! Precedence increases downwards; every binary layer is left-associative and is built
//! with [`infix`], so none of these rules is left-recursive.
//!
//! ```raw
//! expression ::= comparison
//! comparison ::= sum (('==' | '!=') sum)*
//! sum        ::= product (('+' | '-') product)*
//! product    ::= unary (('*' | '/') unary)*
//! unary      ::= '!'? atom
//! atom       ::= ID '(' arguments ')'
//!              | ID
//!              | NUMBER
//!              | '(' expression ')'
//! arguments  ::= (expression (',' expression)*)?
//! ```
//!
//! Only the parenthesised atom and the call arguments refer back to `expression`, which
//! is why it is declared with [`forward`] before any of the layers are built. Those
//! inner references are weak; the returned rule owns the whole graph.

use crate::ast::Expr;

use super::{
    combinator::{forward, Parser, Rule},
    token::{
        equal, id, left_paren, minus, not_equal, not_op, number, plus, right_paren, slash, star,
    },
    util::{comma_separated, infix},
};

/// Builds the expression grammar and returns its entry rule.
pub fn expression() -> Rule<Expr> {
    let (expression, define) = forward::<Expr>("expression");

    let unary = unary(expression.downgrade().boxed());
    let product = infix(star().or(slash()).boxed(), unary, Expr::binary);
    let sum = infix(plus().or(minus()).boxed(), product, Expr::binary);
    let comparison = infix(equal().or(not_equal()).boxed(), sum, Expr::binary);

    define.define(comparison);
    expression.boxed()
}

/// Parses an [`atom`] optionally preceded by a single `!`.
fn unary(expression: Rule<Expr>) -> Rule<Expr> {
    not_op()
        .maybe()
        .then(atom(expression))
        .map(|(negated, operand)| match negated {
            Some(()) => Expr::not(operand),
            None => operand,
        })
        .boxed()
}

/// Parses a call, a variable, a number, or a parenthesised expression, in that order.
fn atom(expression: Rule<Expr>) -> Rule<Expr> {
    let call = id()
        .then(left_paren())
        .then(comma_separated(expression.clone()))
        .then(right_paren())
        .map(|(((callee, _), args), _)| Expr::call(callee, args));

    let parens = left_paren()
        .then(expression)
        .then(right_paren())
        .map(|((_, inner), _)| inner);

    call.or(id().map(Expr::Id)).or(number()).or(parens).boxed()
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::BinaryOp,
        parser::combinator::{run, Failure},
    };

    use super::*;

    fn parse(source: &str) -> Expr {
        let (result, offset) = run(&expression(), source);
        let expr = result.unwrap();
        assert_eq!(offset, source.len(), "unconsumed input after {expr}");
        expr
    }

    fn num(value: u32) -> Expr {
        Expr::number(value)
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(
            parse("1 - 2 - 3"),
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, num(1), num(2)),
                num(3)
            )
        );
    }

    #[test]
    fn products_bind_tighter_than_sums() {
        assert_eq!(
            parse("1 + 2 * 3"),
            Expr::binary(
                BinaryOp::Add,
                num(1),
                Expr::binary(BinaryOp::Mul, num(2), num(3))
            )
        );
    }

    #[test]
    fn comparisons_bind_loosest() {
        assert_eq!(parse("1 * 2 + 3 == 4").to_string(), "(== (+ (* 1 2) 3) 4)");
        assert_eq!(parse("a != b / c").to_string(), "(!= a (/ b c))");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(parse("(1 + 2) * 3").to_string(), "(* (+ 1 2) 3)");
        assert_eq!(parse("1 - (2 - 3)").to_string(), "(- 1 (- 2 3))");
        assert_eq!(parse("((x))"), Expr::id("x"));
    }

    #[test]
    fn deeply_left_nested_sums() {
        let mut source = String::from("x");
        for _ in 0..64 {
            source = format!("({source} + 1)");
        }

        let mut expected = Expr::id("x");
        for _ in 0..64 {
            expected = Expr::binary(BinaryOp::Add, expected, num(1));
        }

        assert_eq!(parse(&source), expected);
    }

    #[test]
    fn negation_applies_to_a_single_atom() {
        assert_eq!(parse("!x"), Expr::not(Expr::id("x")));
        assert_eq!(parse("!x == y").to_string(), "(== (! x) y)");
        assert_eq!(parse("!(x == y)").to_string(), "(! (== x y))");

        // negation is not chained
        assert!(run(&expression(), "!!x").0.is_err());
    }

    #[test]
    fn calls_take_expression_arguments() {
        assert_eq!(parse("f()"), Expr::call("f", vec![]));
        assert_eq!(
            parse("f(1, g(x), 'a' + 2)").to_string(),
            "(call f 1 (call g x) (+ 97 2))"
        );
    }

    #[test]
    fn identifiers_are_not_calls_without_parentheses() {
        let (result, offset) = run(&expression(), "f + g");
        assert_eq!(result.unwrap().to_string(), "(+ f g)");
        assert_eq!(offset, 5);
    }

    #[test]
    fn missing_operand_is_reported() {
        let (result, offset) = run(&expression(), ")");
        dbg!(&result);
        assert_eq!(offset, 0);
        assert_eq!(result.unwrap_err(), Failure::new(0, "identifier"));
    }
}
