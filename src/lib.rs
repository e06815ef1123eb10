//! Spry - arithmetic operator trees that compile themselves
//!
//! # Overview
//!
//! Spry evaluates arithmetic over dynamically typed values. Each operator
//! node interprets itself and remembers which primitive kinds it saw; once
//! that is known, the tree can be compiled to bytecode for a small stack
//! machine that produces the same results.
//!
//! Numbers follow a promotion ladder: decimal, then 64-bit float, 32-bit
//! float, 64-bit integer and 32-bit integer. Text can be repeated
//! (`"ab" * 3`) or concatenated, and everything else is handed to an
//! [`OperatorOverloader`] supplied by the host.
//!
//! # Quick Start
//!
//! ```
//! use spry::{
//!     ArithmeticOp, CompilationOptions, CompiledExpression, CompilerMode, Environment, Literal,
//!     OperatorNode, Value, VariableRef,
//! };
//!
//! // price * 3
//! let tree = OperatorNode::binary(ArithmeticOp::Mul, VariableRef::new("price"), Literal::new(3));
//! let mut expr = CompiledExpression::new(tree).with_options(CompilationOptions {
//!     mode: CompilerMode::Mixed,
//!     interpreted_count_threshold: 2,
//!     ..CompilationOptions::default()
//! });
//!
//! let mut env = Environment::new();
//! for price in 1..=5 {
//!     env.set("price", price);
//!     assert_eq!(expr.run(&mut env).unwrap(), Value::Int32(price * 3));
//! }
//! assert!(expr.compiled_code().is_some());
//! ```
//!
//! # Errors
//!
//! Every failure is an [`Error`] carrying a diagnostic code. Use
//! [`render_error`] or [`render_error_to_string`] for display.

pub use spry_core::{api, ast, compiler, evaluator, values, vm};

pub use spry_core::api::{
    CompilationOptions, CompiledExpression, CompilerMode, Error, ExecutionOptions,
};
pub use spry_core::ast::{ArithmeticOp, Literal, Node, OperatorNode, VariableRef};
pub use spry_core::evaluator::{Environment, OperatorOverloader};
pub use spry_core::values::Value;

mod error_renderer;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
