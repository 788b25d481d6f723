use std::{
    cell::RefCell,
    fmt,
    io::{self, Write},
    rc::Rc,
};

use crate::{
    environment::Environment,
    error::ErrorReporter,
    expr::{Expr, Literal},
    lox_callable::LoxCallable,
    stmt::Stmt,
    token::Token,
    token_type::TokenType,
};

/// A runtime value. Numbers are IEEE-754 doubles; everything is shared
/// through `Rc` so environments, closures and expression results can alias
/// the same value cheaply.
#[derive(Debug)]
pub enum LoxValue {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Callable(LoxCallable),
}

impl LoxValue {
    /// Only `false` and `nil` are falsey.
    pub fn is_truthy(&self) -> bool {
        match self {
            LoxValue::Nil => false,
            LoxValue::Boolean(value) => *value,
            _ => true,
        }
    }
}

impl PartialEq for LoxValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LoxValue::Nil, LoxValue::Nil) => true,
            // IEEE-754 comparison, so NaN != NaN.
            (LoxValue::Number(left), LoxValue::Number(right)) => left == right,
            (LoxValue::Boolean(left), LoxValue::Boolean(right)) => left == right,
            (LoxValue::String(left), LoxValue::String(right)) => left == right,
            (LoxValue::Callable(left), LoxValue::Callable(right)) => left == right,
            _ => false,
        }
    }
}

impl fmt::Display for LoxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxValue::Nil => write!(f, "nil"),
            LoxValue::Boolean(value) => write!(f, "{}", value),
            // `{}` on f64 already drops the trailing `.0` of integral values.
            LoxValue::Number(value) => write!(f, "{}", value),
            LoxValue::String(value) => write!(f, "{}", value),
            LoxValue::Callable(value) => write!(f, "{}", value),
        }
    }
}

impl From<&Literal> for LoxValue {
    fn from(literal: &Literal) -> LoxValue {
        match literal {
            Literal::String(value) => LoxValue::String(value.clone()),
            Literal::Number(value) => LoxValue::Number(*value),
            Literal::Boolean(value) => LoxValue::Boolean(*value),
            Literal::Nil => LoxValue::Nil,
        }
    }
}

#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: String) -> RuntimeError {
        RuntimeError { token, message }
    }
}

/// Everything that can interrupt straight-line evaluation.
///
/// `Return` rides the same channel as errors so it unwinds through any
/// number of nested blocks; the call frame in `LoxCallable::call` consumes
/// it and turns it back into a value.
#[derive(Debug)]
pub enum RuntimeEvent {
    Error(RuntimeError),
    Return { keyword: Token, value: Rc<LoxValue> },
    Io(io::Error),
}

impl From<io::Error> for RuntimeEvent {
    fn from(error: io::Error) -> RuntimeEvent {
        RuntimeEvent::Io(error)
    }
}

/// Tree-walking evaluator.
///
/// Holds the global environment, so a REPL session keeps its definitions
/// across `interpret` calls, and borrows the output sink that `print`
/// writes to.
pub struct Interpreter<'a, W: Write> {
    output: &'a mut W,
    globals: Rc<RefCell<Environment>>,
}

impl<'a, W: Write> Interpreter<'a, W> {
    pub fn new(output: &'a mut W) -> Interpreter<'a, W> {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock".to_string(),
            Rc::new(LoxValue::Callable(LoxCallable::Clock)),
        );

        Interpreter { output, globals }
    }

    /// Execute top-level statements in order. The first runtime error is
    /// reported through the sink and aborts this call; the globals survive
    /// for the next one.
    pub fn interpret(&mut self, statements: &[Stmt], reporter: &mut ErrorReporter) {
        for statement in statements {
            if let Err(event) = self.execute(statement, self.globals.clone()) {
                match event {
                    RuntimeEvent::Error(error) => reporter.runtime_error(&error),
                    RuntimeEvent::Return { keyword, .. } => reporter.runtime_error(
                        &RuntimeError::new(keyword, "Can't return from top-level code.".to_string()),
                    ),
                    RuntimeEvent::Io(error) => {
                        eprintln!("I/O error while writing program output: {}", error);
                        reporter.had_runtime_error = true;
                    }
                }
                return;
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt, environment: Rc<RefCell<Environment>>) -> Result<(), RuntimeEvent> {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate(expr, environment)?;
                Ok(())
            }
            Stmt::Print { expr } => {
                let value = self.evaluate(expr, environment)?;
                writeln!(self.output, "{}", value)?;
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr, environment.clone())?,
                    None => Rc::new(LoxValue::Nil),
                };

                environment.borrow_mut().define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block { statements } => {
                let inner = Rc::new(RefCell::new(Environment::new_enclosing(environment)));
                self.execute_block(statements, inner)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, environment.clone())?.is_truthy() {
                    self.execute(then_branch, environment)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, environment)?;
                }
                Ok(())
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, environment.clone())?.is_truthy() {
                    self.execute(body, environment.clone())?;
                }
                Ok(())
            }
            Stmt::Function { declaration } => {
                let function = LoxValue::Callable(LoxCallable::Function {
                    declaration: declaration.clone(),
                    closure: environment.clone(),
                });

                environment
                    .borrow_mut()
                    .define(declaration.name.lexeme.clone(), Rc::new(function));
                Ok(())
            }
            Stmt::Return { keyword, value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, environment)?,
                    None => Rc::new(LoxValue::Nil),
                };

                Err(RuntimeEvent::Return {
                    keyword: keyword.clone(),
                    value,
                })
            }
        }
    }

    /// Run a statement list in the given environment. Each statement sees
    /// the same frame; the frame itself is dropped by the caller, so scope
    /// exit needs no explicit restore even when an event unwinds through.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), RuntimeEvent> {
        for statement in statements {
            self.execute(statement, environment.clone())?;
        }
        Ok(())
    }

    fn evaluate(
        &mut self,
        expr: &Expr,
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Rc<LoxValue>, RuntimeEvent> {
        match expr {
            Expr::Literal { value } => Ok(Rc::new(value.into())),
            Expr::Grouping { expression } => self.evaluate(expression, environment),
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right, environment)?;

                match operator.token_type {
                    TokenType::Minus => {
                        let value = check_number_operand(operator, &right)?;
                        Ok(Rc::new(LoxValue::Number(-value)))
                    }
                    TokenType::Bang => Ok(Rc::new(LoxValue::Boolean(!right.is_truthy()))),
                    _ => unreachable!("invalid unary operator in AST"),
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, environment.clone())?;
                let right = self.evaluate(right, environment)?;

                match operator.token_type {
                    TokenType::Plus => match (left.as_ref(), right.as_ref()) {
                        (LoxValue::Number(left), LoxValue::Number(right)) => {
                            Ok(Rc::new(LoxValue::Number(left + right)))
                        }
                        (LoxValue::String(left), LoxValue::String(right)) => {
                            Ok(Rc::new(LoxValue::String(format!("{}{}", left, right))))
                        }
                        _ => Err(RuntimeEvent::Error(RuntimeError::new(
                            operator.clone(),
                            "Operands must be two numbers or two strings.".to_string(),
                        ))),
                    },
                    TokenType::Minus => {
                        let (left, right) = check_number_operands(operator, &left, &right)?;
                        Ok(Rc::new(LoxValue::Number(left - right)))
                    }
                    TokenType::Star => {
                        let (left, right) = check_number_operands(operator, &left, &right)?;
                        Ok(Rc::new(LoxValue::Number(left * right)))
                    }
                    TokenType::Slash => {
                        // IEEE-754 division: x/0 is ±inf or NaN, not an error.
                        let (left, right) = check_number_operands(operator, &left, &right)?;
                        Ok(Rc::new(LoxValue::Number(left / right)))
                    }
                    TokenType::Greater => {
                        let (left, right) = check_number_operands(operator, &left, &right)?;
                        Ok(Rc::new(LoxValue::Boolean(left > right)))
                    }
                    TokenType::GreaterEqual => {
                        let (left, right) = check_number_operands(operator, &left, &right)?;
                        Ok(Rc::new(LoxValue::Boolean(left >= right)))
                    }
                    TokenType::Less => {
                        let (left, right) = check_number_operands(operator, &left, &right)?;
                        Ok(Rc::new(LoxValue::Boolean(left < right)))
                    }
                    TokenType::LessEqual => {
                        let (left, right) = check_number_operands(operator, &left, &right)?;
                        Ok(Rc::new(LoxValue::Boolean(left <= right)))
                    }
                    TokenType::EqualEqual => Ok(Rc::new(LoxValue::Boolean(left == right))),
                    TokenType::BangEqual => Ok(Rc::new(LoxValue::Boolean(left != right))),
                    _ => unreachable!("invalid binary operator in AST"),
                }
            }
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, environment.clone())?;

                match operator.token_type {
                    TokenType::Or if left.is_truthy() => Ok(left),
                    TokenType::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right, environment),
                }
            }
            Expr::Variable { name } => environment.borrow().get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value, environment.clone())?;
                environment.borrow_mut().assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Call {
                callee,
                closing_paren,
                arguments,
            } => {
                let callee = self.evaluate(callee, environment.clone())?;

                let mut evaluated_args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated_args.push(self.evaluate(argument, environment.clone())?);
                }

                match callee.as_ref() {
                    LoxValue::Callable(function) => {
                        function.call(self, evaluated_args, closing_paren)
                    }
                    _ => Err(RuntimeEvent::Error(RuntimeError::new(
                        closing_paren.clone(),
                        "Can only call functions and classes.".to_string(),
                    ))),
                }
            }
        }
    }
}

fn check_number_operand(operator: &Token, operand: &LoxValue) -> Result<f64, RuntimeEvent> {
    match operand {
        LoxValue::Number(value) => Ok(*value),
        _ => Err(RuntimeEvent::Error(RuntimeError::new(
            operator.clone(),
            "Operand must be a number.".to_string(),
        ))),
    }
}

fn check_number_operands(
    operator: &Token,
    left: &LoxValue,
    right: &LoxValue,
) -> Result<(f64, f64), RuntimeEvent> {
    match (left, right) {
        (LoxValue::Number(left), LoxValue::Number(right)) => Ok((*left, *right)),
        _ => Err(RuntimeEvent::Error(RuntimeError::new(
            operator.clone(),
            "Operands must be numbers.".to_string(),
        ))),
    }
}
