//! Completion records and executable blocks
//!
//! Compiled code reaches the engine as blocks of statements. Each statement is
//! a closure over the execution context that yields exactly one [`Completion`];
//! a throw completion is the `Err` side of the result so `?` propagates it.

use std::fmt;
use std::rc::Rc;

use crate::error::JsError;
use crate::interpreter::context::ExecutionContext;
use crate::value::{JsString, JsValue};

/// Completion type for control flow
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Normal completion, optionally carrying the statement's value
    Normal(Option<JsValue>),
    /// Return from function
    Return(JsValue),
    /// Break from loop (with optional label)
    Break(Option<JsString>),
    /// Continue to next iteration (with optional label)
    Continue(Option<JsString>),
}

impl Completion {
    /// Normal completion without a value
    pub fn empty() -> Self {
        Completion::Normal(None)
    }

    pub fn normal(value: impl Into<JsValue>) -> Self {
        Completion::Normal(Some(value.into()))
    }

    pub fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal(_))
    }

    /// The value carried by this completion, if any
    pub fn value(&self) -> Option<&JsValue> {
        match self {
            Completion::Normal(value) => value.as_ref(),
            Completion::Return(value) => Some(value),
            Completion::Break(_) | Completion::Continue(_) => None,
        }
    }

    /// The carried value, or `undefined`
    pub fn into_value(self) -> JsValue {
        match self {
            Completion::Normal(Some(value)) | Completion::Return(value) => value,
            _ => JsValue::Undefined,
        }
    }
}

type StatementFn = dyn Fn(&mut ExecutionContext) -> Result<Completion, JsError>;

/// One executable statement
#[derive(Clone)]
pub struct Statement {
    line: Option<u32>,
    run: Rc<StatementFn>,
}

impl Statement {
    pub fn new(
        run: impl Fn(&mut ExecutionContext) -> Result<Completion, JsError> + 'static,
    ) -> Self {
        Self {
            line: None,
            run: Rc::new(run),
        }
    }

    /// Statement that moves the context's current line before it runs
    pub fn at_line(
        line: u32,
        run: impl Fn(&mut ExecutionContext) -> Result<Completion, JsError> + 'static,
    ) -> Self {
        Self {
            line: Some(line),
            run: Rc::new(run),
        }
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn run(&self, ctx: &mut ExecutionContext) -> Result<Completion, JsError> {
        if let Some(line) = self.line {
            ctx.set_line_number(line);
        }
        (self.run)(ctx)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "Statement(line {})", line),
            None => write!(f, "Statement"),
        }
    }
}

/// Statement sequence
#[derive(Debug, Clone, Default)]
pub struct Block {
    statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Builder form of [`Block::push`]
    pub fn with(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Run statements in order. An abrupt completion stops the sequence;
    /// otherwise the block completes with the last value produced.
    pub fn execute(&self, ctx: &mut ExecutionContext) -> Result<Completion, JsError> {
        let mut last = None;
        for statement in &self.statements {
            match statement.run(ctx)? {
                Completion::Normal(value) => {
                    if value.is_some() {
                        last = value;
                    }
                }
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal(last))
    }
}

impl FromIterator<Statement> for Block {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
