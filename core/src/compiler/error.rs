//! Bytecode compilation errors.

use alloc::string::String;

/// Errors that can occur during bytecode compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Emission was requested for a node whose `is_compilable` is false.
    /// Callers are expected to check first.
    #[error("node {node} is not compilable")]
    NotCompilable { node: String },

    /// Constant pool exceeds 256 entries (u8 operand).
    #[error("too many constants (limit: 256)")]
    TooManyConstants,

    /// Variable table exceeds 256 entries (u8 operand).
    #[error("too many variables (limit: 256)")]
    TooManyVariables,
}
