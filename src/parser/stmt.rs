//! Statements.
//!
//! # Grammar
//! ```raw
//! statement ::=
//!       'return' expression ';'
//!     | 'function' ID '(' parameters ')' block
//!     | 'if' '(' expression ')' statement 'else' statement
//!     | 'while' '(' expression ')' statement
//!     | 'var' ID '=' expression ';'
//!     | ID '=' expression ';'
//!     | block
//!     | expression ';'
//!
//! block      ::= '{' statement* '}'
//! parameters ::= (ID (',' ID)*)?
//! ```
//!
//! The alternatives are tried in the order given, each from the same position, so the
//! catch-all expression statement never shadows a more specific form. Note that `else`
//! is mandatory: there is no dangling-else ambiguity to resolve because there is no
//! `if` without an `else`.

use crate::ast::{Block, Expr, Stmt};

use super::{
    combinator::{forward, Parser, Rule},
    token::{
        assign, function, id, left_brace, left_paren, r#else, r#if, r#return, r#while,
        right_brace, right_paren, semicolon, var,
    },
    util::comma_separated,
};

/// Builds the statement grammar on top of `expression`, returning its entry rule.
pub fn statement(expression: Rule<Expr>) -> Rule<Stmt> {
    let (owner, define) = forward::<Stmt>("statement");
    let statement = owner.downgrade().boxed();

    let return_stmt = r#return()
        .then(expression.clone())
        .then(semicolon())
        .map(|((_, value), _)| Stmt::Return(value));

    let function_stmt = function()
        .then(id())
        .then(left_paren())
        .then(comma_separated(id()))
        .then(right_paren())
        .then(block(statement.clone()))
        .map(|(((((_, name), _), params), _), body)| Stmt::function(name, params, body));

    let if_stmt = r#if()
        .then(left_paren())
        .then(expression.clone())
        .then(right_paren())
        .then(statement.clone())
        .then(r#else())
        .then(statement.clone())
        .map(|((((((_, _), cond), _), consequence), _), alternative)| {
            Stmt::r#if(cond, consequence, alternative)
        });

    let while_stmt = r#while()
        .then(left_paren())
        .then(expression.clone())
        .then(right_paren())
        .then(statement.clone())
        .map(|((((_, _), cond), _), body)| Stmt::r#while(cond, body));

    let var_stmt = var()
        .then(id())
        .then(assign())
        .then(expression.clone())
        .then(semicolon())
        .map(|((((_, name), ()), value), _)| Stmt::var(name, value));

    let assign_stmt = id()
        .then(assign())
        .then(expression.clone())
        .then(semicolon())
        .map(|(((name, ()), value), _)| Stmt::assign(name, value));

    let block_stmt = block(statement.clone()).map(Stmt::Block);

    let expression_stmt = expression
        .then(semicolon())
        .map(|(expr, _)| Stmt::Expr(expr));

    define.define(
        return_stmt
            .or(function_stmt)
            .or(if_stmt)
            .or(while_stmt)
            .or(var_stmt)
            .or(assign_stmt)
            .or(block_stmt)
            .or(expression_stmt),
    );
    owner.boxed()
}

/// Parses a brace-delimited sequence of statements.
pub fn block(statement: Rule<Stmt>) -> Rule<Block> {
    left_brace()
        .then(statement.repeat())
        .then(right_brace())
        .map(|((_, statements), _)| Block::new(statements))
        .boxed()
}
