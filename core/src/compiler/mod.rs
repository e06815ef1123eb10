//! Bytecode compiler for operator trees.
//!
//! Nodes emit themselves into a [`BytecodeCompiler`], which collects
//! instructions for the VM.
//!
//! ## Design
//!
//! - Emission is driven by the nodes (`Node::emit`); the compiler is the
//!   instruction sink plus bookkeeping
//! - Tracks stack depth precisely to size the VM stack
//! - A [`CodeFlow`] carries exit descriptors from children to parents so a
//!   parent knows whether an operand needs unboxing
//! - Only trees that interpretation has proven primitive can be compiled

mod bytecode;
mod codeflow;
mod error;


pub use bytecode::BytecodeCompiler;
pub use codeflow::CodeFlow;
pub use error::CompileError;
