use alloc::string::ToString;
use core::fmt;

use crate::{
    ast::{ExitDescriptor, Node},
    compiler::{BytecodeCompiler, CompileError},
    evaluator::{Environment, EvalError},
    values::Value,
};

/// A constant value.
///
/// Primitive literals are always compilable; they load straight from the
/// constant pool as raw primitives.
#[derive(Debug, Clone)]
pub struct Literal {
    value: Value,
}

impl Literal {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Node for Literal {
    fn evaluate(&mut self, _env: &mut Environment) -> Result<Value, EvalError> {
        Ok(self.value.clone())
    }

    fn is_compilable(&self) -> bool {
        self.value.as_primitive().is_some()
    }

    fn emit(&self, compiler: &mut BytecodeCompiler) -> Result<(), CompileError> {
        let Some(primitive) = self.value.as_primitive() else {
            return Err(CompileError::NotCompilable {
                node: self.to_string(),
            });
        };
        compiler.emit_constant(primitive)?;
        compiler
            .code_flow_mut()
            .push_descriptor(ExitDescriptor::Primitive(primitive.kind()));
        Ok(())
    }

    fn exit_descriptor(&self) -> Option<ExitDescriptor> {
        self.value.primitive_kind().map(ExitDescriptor::Primitive)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Text(s) => write!(f, "{:?}", s),
            value => write!(f, "{}", value),
        }
    }
}
