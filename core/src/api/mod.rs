//! Public API for running Spry operator trees.
//!
//! A [`CompiledExpression`] wraps a tree and decides per run whether to
//! interpret it or execute bytecode compiled from what interpretation
//! observed. Failures surface as the public [`Error`].

pub mod error;
pub mod expression;
pub mod options;

pub use error::Error;
pub use expression::CompiledExpression;
pub use options::{CompilationOptions, CompilerMode, ExecutionOptions};
