use alloc::boxed::Box;
use alloc::string::{String, ToString};

use hashbrown::HashMap;

use crate::{
    api::ExecutionOptions,
    evaluator::{
        EvalError, ResourceExceeded, RuntimeError,
        overload::{OperatorOverloader, StandardOperatorOverloader},
    },
    values::Value,
};

/// Everything evaluation needs besides the expression itself: variables,
/// the overloader for unsupported operands, and resource limits.
pub struct Environment {
    variables: HashMap<String, Value>,
    overloader: Box<dyn OperatorOverloader>,
    options: ExecutionOptions,
    depth: usize,
}

impl Environment {
    pub fn new() -> Self {
        Self::with_options(ExecutionOptions::default())
    }

    pub fn with_options(options: ExecutionOptions) -> Self {
        Self {
            variables: HashMap::new(),
            overloader: Box::new(StandardOperatorOverloader),
            options,
            depth: 0,
        }
    }

    /// Replaces the overloader consulted for unsupported operands.
    pub fn with_overloader(mut self, overloader: impl OperatorOverloader + 'static) -> Self {
        self.overloader = Box::new(overloader);
        self
    }

    /// Binds a variable, returning its previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.variables.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.variables
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    pub fn overloader(&self) -> &dyn OperatorOverloader {
        &*self.overloader
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Current nesting depth of operator evaluation.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enters one level of nested evaluation. Pair every successful call with
    /// [`Environment::exit`].
    pub(crate) fn enter(&mut self) -> Result<(), EvalError> {
        if self.depth >= self.options.max_depth {
            return Err(ResourceExceeded::StackOverflow {
                depth: self.depth,
                max_depth: self.options.max_depth,
            }
            .into());
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        debug_assert!(self.depth > 0, "unbalanced Environment::exit");
        self.depth -= 1;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Environment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Environment")
            .field("variables", &self.variables)
            .field("options", &self.options)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
