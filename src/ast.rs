//! Abstract syntax trees.
//!
//! The [`Display`](std::fmt::Display) implementations on the types in this module
//! produce lisp-style s-expressions, e.g. `(while (!= x 0) (assign x (- x 1)))`.

use std::fmt::{self, Display};

use num_bigint::BigUint;

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// Returns the source symbol of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// An integer, written either in decimal or as a character literal.
    Number(BigUint),
    /// A reference to a variable.
    Id(String),
    /// Logical negation.
    Not(Box<Expr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        lhs: Box<Expr>,
        /// The right operand.
        rhs: Box<Expr>,
    },
    /// A function call.
    Call {
        /// The name of the called function.
        callee: String,
        /// The arguments, in source order.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Constructs an [`Expr::Number`].
    pub fn number(value: impl Into<BigUint>) -> Self {
        Self::Number(value.into())
    }

    /// Constructs an [`Expr::Id`].
    pub fn id(name: impl Into<String>) -> Self {
        Self::Id(name.into())
    }

    /// Constructs an [`Expr::Not`].
    pub fn not(inner: Expr) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Constructs an [`Expr::Binary`].
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Constructs an [`Expr::Call`].
    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: callee.into(),
            args,
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Id(name) => write!(f, "{name}"),
            Expr::Not(inner) => write!(f, "(! {inner})"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({op} {lhs} {rhs})"),
            Expr::Call { callee, args } => {
                write!(f, "(call {callee}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// An expression evaluated for its effects.
    Expr(Expr),
    /// `return value;`
    Return(Expr),
    /// `if (cond) consequence else alternative`
    If {
        /// The condition.
        cond: Expr,
        /// Executed when `cond` is non-zero.
        consequence: Box<Stmt>,
        /// Executed when `cond` is zero.
        alternative: Box<Stmt>,
    },
    /// `while (cond) body`
    While {
        /// The loop condition.
        cond: Expr,
        /// The loop body.
        body: Box<Stmt>,
    },
    /// `var name = value;`
    Var {
        /// The declared variable.
        name: String,
        /// Its initial value.
        value: Expr,
    },
    /// `name = value;`
    Assign {
        /// The assigned variable.
        name: String,
        /// The new value.
        value: Expr,
    },
    /// `{ statements }`
    Block(Block),
    /// `function name(params) body`
    Function {
        /// The function name.
        name: String,
        /// The parameter names, in source order.
        params: Vec<String>,
        /// The function body.
        body: Block,
    },
}

impl Stmt {
    /// Constructs a [`Stmt::If`].
    pub fn r#if(cond: Expr, consequence: Stmt, alternative: Stmt) -> Self {
        Self::If {
            cond,
            consequence: Box::new(consequence),
            alternative: Box::new(alternative),
        }
    }

    /// Constructs a [`Stmt::While`].
    pub fn r#while(cond: Expr, body: Stmt) -> Self {
        Self::While {
            cond,
            body: Box::new(body),
        }
    }

    /// Constructs a [`Stmt::Var`].
    pub fn var(name: impl Into<String>, value: Expr) -> Self {
        Self::Var {
            name: name.into(),
            value,
        }
    }

    /// Constructs a [`Stmt::Assign`].
    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Self::Assign {
            name: name.into(),
            value,
        }
    }

    /// Constructs a [`Stmt::Function`].
    pub fn function(name: impl Into<String>, params: Vec<String>, body: Block) -> Self {
        Self::Function {
            name: name.into(),
            params,
            body,
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expr(expr) => write!(f, "{expr}"),
            Stmt::Return(value) => write!(f, "(return {value})"),
            Stmt::If {
                cond,
                consequence,
                alternative,
            } => write!(f, "(if {cond} {consequence} {alternative})"),
            Stmt::While { cond, body } => write!(f, "(while {cond} {body})"),
            Stmt::Var { name, value } => write!(f, "(var {name} {value})"),
            Stmt::Assign { name, value } => write!(f, "(assign {name} {value})"),
            Stmt::Block(block) => write!(f, "{block}"),
            Stmt::Function { name, params, body } => {
                write!(f, "(function {name} ({}) {body})", params.join(" "))
            }
        }
    }
}

/// A sequence of statements; also the root of every parsed program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// The statements, in source order.
    pub statements: Vec<Stmt>,
}

impl Block {
    /// Constructs a new [`Block`].
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    /// Returns the number of statements in `self`.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns `true` if `self` contains no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(block")?;
        for statement in &self.statements {
            write!(f, " {statement}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_display_as_s_expressions() {
        let expr = Expr::binary(
            BinaryOp::Equal,
            Expr::call("f", vec![Expr::id("x"), Expr::number(1u32)]),
            Expr::not(Expr::id("y")),
        );
        assert_eq!(expr.to_string(), "(== (call f x 1) (! y))");
        assert_eq!(Expr::call("g", vec![]).to_string(), "(call g)");
    }

    #[test]
    fn statements_display_as_s_expressions() {
        let program = Block::new(vec![
            Stmt::function(
                "f",
                vec!["a".into(), "b".into()],
                Block::new(vec![Stmt::Return(Expr::binary(
                    BinaryOp::Add,
                    Expr::id("a"),
                    Expr::id("b"),
                ))]),
            ),
            Stmt::r#if(
                Expr::id("x"),
                Stmt::var("y", Expr::number(0u32)),
                Stmt::Block(Block::default()),
            ),
            Stmt::r#while(Expr::id("y"), Stmt::assign("y", Expr::number(1u32))),
            Stmt::Expr(Expr::call("print", vec![Expr::id("y")])),
        ]);

        assert_eq!(
            program.to_string(),
            "(block (function f (a b) (block (return (+ a b)))) \
             (if x (var y 0) (block)) \
             (while y (assign y 1)) \
             (call print y))"
        );
    }
}
