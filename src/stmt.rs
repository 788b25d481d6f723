use std::rc::Rc;

use crate::{expr::Expr, token::Token};

/// A function declaration: name, parameters and body.
///
/// Wrapped in an `Rc` by `Stmt::Function` so function values can share the
/// declaration with every closure created from it instead of cloning the
/// body tree.
#[derive(Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// Statement nodes. `for` loops never reach this level; the parser desugars
/// them into `Block`/`While`.
#[derive(Debug, PartialEq)]
pub enum Stmt {
    Expression {
        expr: Expr,
    },
    Print {
        expr: Expr,
    },
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block {
        statements: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Function {
        declaration: Rc<FunctionDecl>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
}
