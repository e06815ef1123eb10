//! Tree-walking evaluation of operator nodes.
//!
//! Nodes interpret themselves through [`Node::evaluate`](crate::ast::Node::evaluate);
//! this module provides what they evaluate against and how operands combine.
//!
//! ## Design Principles
//!
//! - **Never panic**: overflow wraps, division by zero and unsupported
//!   operands are errors, text growth is checked
//! - **Stack-safe**: depth tracking prevents stack overflow from deeply nested trees
//! - **Shared kernels**: the VM calls the same primitive arithmetic, so both
//!   execution paths agree exactly
//!
//! ## Example
//!
//! ```
//! use spry_core::ast::{ArithmeticOp, Literal, Node, OperatorNode, VariableRef};
//! use spry_core::evaluator::Environment;
//! use spry_core::values::Value;
//!
//! let mut env = Environment::new();
//! env.set("x", 21);
//!
//! let mut node = OperatorNode::binary(ArithmeticOp::Mul, VariableRef::new("x"), Literal::new(2));
//! assert_eq!(node.evaluate(&mut env).unwrap(), Value::Int32(42));
//! ```

mod environment;
mod error;
pub(crate) mod operators;
mod overload;


pub use environment::Environment;
pub use error::{EvalError, InternalError, ResourceExceeded, RuntimeError};
pub use overload::{OperatorOverloader, StandardOperatorOverloader};
