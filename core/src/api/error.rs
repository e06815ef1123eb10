//! Public error type for the Spry API.
//!
//! Internal errors are converted to [`Error`] at API boundaries. Each variant
//! carries a stable diagnostic code for rendering with `miette`.

use miette::Diagnostic;

use crate::{
    compiler::CompileError,
    evaluator::{EvalError, InternalError, ResourceExceeded, RuntimeError},
};

/// Public error type for all Spry operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Diagnostic)]
pub enum Error {
    /// The tree could not be turned into bytecode.
    #[error("compilation failed: {0}")]
    #[diagnostic(
        code(spry::compilation),
        help("interpret the expression until its operand kinds are known")
    )]
    Compilation(#[from] CompileError),

    /// Evaluation failed because of the operands or the environment.
    #[error("runtime error: {0}")]
    #[diagnostic(code(spry::runtime))]
    Runtime(#[from] RuntimeError),

    /// Evaluation hit a configured limit.
    #[error("resource limit exceeded: {0}")]
    #[diagnostic(
        code(spry::resource_exceeded),
        help("raise the limit in ExecutionOptions if this input is expected")
    )]
    ResourceExceeded(#[from] ResourceExceeded),

    /// Malformed bytecode reached the VM.
    #[error("internal error: {0}")]
    #[diagnostic(code(spry::internal))]
    Internal(#[from] InternalError),
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Runtime(e) => Error::Runtime(e),
            EvalError::ResourceExceeded(e) => Error::ResourceExceeded(e),
            EvalError::Internal(e) => Error::Internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_eval_error() {
        let err: Error = EvalError::from(RuntimeError::DivisionByZero).into();
        assert_eq!(err, Error::Runtime(RuntimeError::DivisionByZero));
        assert_eq!(err.to_string(), "runtime error: division by zero");
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = Error::from(CompileError::TooManyConstants);
        assert_eq!(err.code().unwrap().to_string(), "spry::compilation");

        let err = Error::from(ResourceExceeded::TextTooLong { max_length: 4 });
        assert_eq!(err.code().unwrap().to_string(), "spry::resource_exceeded");
        assert!(err.help().is_some());
    }
}
