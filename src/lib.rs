//! A parser for a small imperative language, built from a hand-written combinator
//! engine.
//!
//! The language has functions, variables, `if`/`else`, `while`, calls, and the
//! arithmetic and equality operators over unbounded unsigned integers. A program is a
//! sequence of statements, and [`parse`] turns one into an [`ast::Block`].
//!
//! ```
//! let program = tinyc::parse("function id(x) { return x; } id(1);").unwrap();
//! assert_eq!(
//!     program.to_string(),
//!     "(block (function id (x) (block (return x))) (call id 1))"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

extern crate static_assertions as sa;

pub mod ast;
pub mod parser;

pub use parser::{parse, Grammar, ParseError};

sa::assert_impl_all!(parser::combinator::Rule<ast::Block>: Send, Sync);
