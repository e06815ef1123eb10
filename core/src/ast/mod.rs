//! Expression nodes.
//!
//! Every node can be interpreted directly ([`Node::evaluate`]) and, once
//! interpretation has shown which primitive kinds flow through it, emitted as
//! bytecode ([`Node::emit`]). The two paths must produce identical values.
//!
//! ## Design
//!
//! - Nodes own their children (`Box<dyn Node>`); trees are built once and
//!   evaluated many times.
//! - Evaluation takes `&mut self` because nodes record what they observed.
//!   Sharing one tree between threads therefore needs an external lock.
//! - Emission only reads that record. A node that never observed primitive
//!   operands is not compilable and refuses to emit.

mod literal;
mod operator;
mod variable;

#[cfg(test)]
mod operator_test;

pub use literal::Literal;
pub use operator::{Observation, OperatorNode};
pub use variable::VariableRef;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    compiler::{BytecodeCompiler, CompileError},
    evaluator::{Environment, EvalError},
    values::{PrimitiveKind, Value},
};

/// The arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
        }
    }

    /// Operand byte of the binary instructions.
    pub(crate) fn op_byte(self) -> u8 {
        match self {
            ArithmeticOp::Add => b'+',
            ArithmeticOp::Sub => b'-',
            ArithmeticOp::Mul => b'*',
            ArithmeticOp::Div => b'/',
            ArithmeticOp::Mod => b'%',
        }
    }

    pub(crate) fn from_op_byte(byte: u8) -> Option<Self> {
        match byte {
            b'+' => Some(ArithmeticOp::Add),
            b'-' => Some(ArithmeticOp::Sub),
            b'*' => Some(ArithmeticOp::Mul),
            b'/' => Some(ArithmeticOp::Div),
            b'%' => Some(ArithmeticOp::Mod),
            _ => None,
        }
    }

    /// Whether the operator also has a one-operand form (`+x`, `-x`).
    pub fn has_unary_form(self) -> bool {
        matches!(self, ArithmeticOp::Add | ArithmeticOp::Sub)
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How emitted code leaves a node's value on the VM stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitDescriptor {
    /// A raw primitive of this kind.
    Primitive(PrimitiveKind),
    /// A dynamically typed value last observed as this kind. Consumers that
    /// need the primitive must unbox it first.
    Boxed(PrimitiveKind),
}

impl ExitDescriptor {
    pub fn is_primitive(self) -> bool {
        matches!(self, ExitDescriptor::Primitive(_))
    }

    pub fn kind(self) -> PrimitiveKind {
        match self {
            ExitDescriptor::Primitive(kind) | ExitDescriptor::Boxed(kind) => kind,
        }
    }
}

impl fmt::Display for ExitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitDescriptor::Primitive(kind) => write!(f, "{}", kind),
            ExitDescriptor::Boxed(kind) => write!(f, "boxed {}", kind),
        }
    }
}

/// An expression node.
pub trait Node: fmt::Debug + fmt::Display {
    /// Interprets the node. Children are evaluated left to right.
    fn evaluate(&mut self, env: &mut Environment) -> Result<Value, EvalError>;

    /// Whether [`Node::emit`] can currently produce code equivalent to
    /// [`Node::evaluate`].
    fn is_compilable(&self) -> bool;

    /// Emits code leaving this node's value on the stack, and pushes the
    /// node's exit descriptor onto the compiler's code flow.
    ///
    /// Fails with [`CompileError::NotCompilable`] unless
    /// [`Node::is_compilable`] holds.
    fn emit(&self, compiler: &mut BytecodeCompiler) -> Result<(), CompileError>;

    /// The form [`Node::emit`] leaves the value in, if known.
    fn exit_descriptor(&self) -> Option<ExitDescriptor>;
}
