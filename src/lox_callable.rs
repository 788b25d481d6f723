use std::{
    cell::RefCell,
    fmt,
    io::Write,
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    environment::Environment,
    interpreter::{Interpreter, LoxValue, RuntimeError, RuntimeEvent},
    stmt::FunctionDecl,
    token::Token,
};

/// A value that can be invoked with `()`.
///
/// User functions pair their declaration with the environment that was
/// current when the declaration executed, which is what makes them closures.
#[derive(Clone)]
pub enum LoxCallable {
    Clock,
    Function {
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
    },
}

impl LoxCallable {
    pub fn arity(&self) -> usize {
        match self {
            LoxCallable::Clock => 0,
            LoxCallable::Function { declaration, .. } => declaration.params.len(),
        }
    }

    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<'_, W>,
        arguments: Vec<Rc<LoxValue>>,
        closing_paren: &Token,
    ) -> Result<Rc<LoxValue>, RuntimeEvent> {
        if arguments.len() != self.arity() {
            return Err(RuntimeEvent::Error(RuntimeError::new(
                closing_paren.clone(),
                format!(
                    "Expected {} arguments but got {}.",
                    self.arity(),
                    arguments.len()
                ),
            )));
        }

        match self {
            LoxCallable::Clock => {
                let duration = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .expect("Time went backwards");
                Ok(Rc::new(LoxValue::Number(duration.as_secs_f64())))
            }
            LoxCallable::Function {
                declaration,
                closure,
            } => {
                // The call frame hangs off the captured closure environment,
                // not the caller's.
                let environment = Rc::new(RefCell::new(Environment::new_enclosing(closure.clone())));
                for (param, argument) in declaration.params.iter().zip(arguments) {
                    environment.borrow_mut().define(param.lexeme.clone(), argument);
                }

                match interpreter.execute_block(&declaration.body, environment) {
                    Err(RuntimeEvent::Return { value, .. }) => Ok(value),
                    Err(event) => Err(event),
                    Ok(()) => Ok(Rc::new(LoxValue::Nil)),
                }
            }
        }
    }
}

impl PartialEq for LoxCallable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LoxCallable::Clock, LoxCallable::Clock) => true,
            (
                LoxCallable::Function {
                    declaration: left,
                    closure: left_env,
                },
                LoxCallable::Function {
                    declaration: right,
                    closure: right_env,
                },
            ) => Rc::ptr_eq(left, right) && Rc::ptr_eq(left_env, right_env),
            _ => false,
        }
    }
}

// A closure can live inside the environment it captured, so Debug must not
// descend into the captured scope.
impl fmt::Debug for LoxCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxCallable::Clock => write!(f, "<native fn>"),
            LoxCallable::Function { declaration, .. } => f
                .debug_struct("Function")
                .field("name", &declaration.name.lexeme)
                .field("arity", &declaration.params.len())
                .finish(),
        }
    }
}

impl fmt::Display for LoxCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxCallable::Clock => write!(f, "<native fn>"),
            LoxCallable::Function { declaration, .. } => {
                write!(f, "<fn {}>", declaration.name.lexeme)
            }
        }
    }
}
