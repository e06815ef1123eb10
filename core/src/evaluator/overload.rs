//! Fallback for operand combinations the operators do not handle themselves.

use crate::{
    ast::ArithmeticOp,
    evaluator::{EvalError, RuntimeError},
    values::Value,
};

/// Decides what an arithmetic operator does with operands that are neither
/// both numeric nor covered by a text rule.
///
/// Injected through [`Environment`](crate::evaluator::Environment); its
/// result or error is returned to the caller unchanged.
///
/// Closures of the right shape implement the trait:
///
/// ```
/// use spry_core::ast::ArithmeticOp;
/// use spry_core::evaluator::{Environment, EvalError, RuntimeError};
/// use spry_core::values::Value;
///
/// let env = Environment::new().with_overloader(
///     |op: ArithmeticOp, _: &Value, _: &Value| -> Result<Value, EvalError> {
///         Err(RuntimeError::Custom(format!("no '{}' here", op)).into())
///     },
/// );
/// # drop(env);
/// ```
pub trait OperatorOverloader {
    fn resolve(&self, op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value, EvalError>;
}

impl<F> OperatorOverloader for F
where
    F: Fn(ArithmeticOp, &Value, &Value) -> Result<Value, EvalError>,
{
    fn resolve(&self, op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        self(op, left, right)
    }
}

/// Rejects every combination.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardOperatorOverloader;

impl OperatorOverloader for StandardOperatorOverloader {
    fn resolve(&self, op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        Err(RuntimeError::UnsupportedOperands {
            op,
            left: left.kind(),
            right: right.kind(),
        }
        .into())
    }
}
