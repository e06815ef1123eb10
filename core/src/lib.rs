extern crate alloc;

pub mod api;
pub mod ast;
pub mod compiler;
pub mod evaluator;
pub mod values;
pub mod vm;
