//! Evaluation errors.
//!
//! Both execution paths report failures with [`EvalError`]: the tree-walking
//! interpreter and the VM running emitted code. For the same inputs they fail
//! with the same error.
//!
//! # Error Categories
//!
//! - **Runtime errors**: the operands or the environment do not allow the
//!   operation (unsupported operand kinds, division by zero, missing
//!   variables). An overloader may also report its own.
//!
//! - **Resource exceeded errors**: evaluation hit a configured limit.
//!
//! - **Internal errors**: malformed bytecode reached the VM. These indicate a
//!   bug or tampered code, never a problem with the operands.

use alloc::string::String;

use crate::{
    ast::ArithmeticOp,
    values::{PrimitiveKind, ValueKind},
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    ResourceExceeded(#[from] ResourceExceeded),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// No built-in rule combines these operands and no overload took over.
    #[error("operator '{op}' is not supported between {left} and {right}")]
    UnsupportedOperands {
        op: ArithmeticOp,
        left: ValueKind,
        right: ValueKind,
    },

    #[error("unary operator '{op}' is not supported for {operand}")]
    UnsupportedOperand { op: ArithmeticOp, operand: ValueKind },

    #[error("operator '{op}' requires a right operand")]
    MissingOperand { op: ArithmeticOp },

    /// Integer or decimal division (or remainder) by zero.
    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot convert {value} to a decimal")]
    DecimalConversion { value: String },

    #[error("variable '{name}' is not defined")]
    UndefinedVariable { name: String },

    /// Compiled code expected a variable of another kind than it now holds.
    #[error("cannot unbox {found} as {expected}")]
    UnboxMismatch {
        expected: PrimitiveKind,
        found: ValueKind,
    },

    /// Reported by operator overloaders.
    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResourceExceeded {
    #[error("evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },

    #[error("text result would exceed the maximum length of {max_length} bytes")]
    TextTooLong { max_length: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InternalError {
    #[error("unrecognized exit descriptor '{}'", byte_char(.0))]
    UnrecognizedDescriptor(u8),

    #[error("unrecognized operator byte '{}'", byte_char(.0))]
    UnrecognizedOperator(u8),

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("operand stack exceeds its declared size of {max_stack_size}")]
    StackSizeExceeded { max_stack_size: usize },

    #[error("{instruction} expected a {expected} operand")]
    OperandMismatch {
        instruction: &'static str,
        expected: PrimitiveKind,
    },

    #[error("constant index {0} out of range")]
    InvalidConstant(u8),

    #[error("variable index {0} out of range")]
    InvalidVariable(u8),

    #[error("execution ran past the last instruction")]
    UnexpectedEnd,

    #[error("execution halted")]
    Halted,
}

fn byte_char(byte: &u8) -> char {
    char::from(*byte)
}
