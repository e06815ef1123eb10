use alloc::string::{String, ToString};
use core::fmt;

use crate::{
    ast::{ExitDescriptor, Node},
    compiler::{BytecodeCompiler, CompileError},
    evaluator::{Environment, EvalError},
    values::{PrimitiveKind, Value},
};

/// A reference to a variable of the [`Environment`].
///
/// Compiled code reloads the variable on every run and receives it boxed,
/// since its kind may change between runs. The kind seen by the most recent
/// evaluation is what consumers unbox to.
#[derive(Debug, Clone)]
pub struct VariableRef {
    name: String,
    last_kind: Option<PrimitiveKind>,
}

impl VariableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_kind: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Node for VariableRef {
    fn evaluate(&mut self, env: &mut Environment) -> Result<Value, EvalError> {
        let value = env.lookup(&self.name)?.clone();
        self.last_kind = value.primitive_kind();
        Ok(value)
    }

    fn is_compilable(&self) -> bool {
        self.last_kind.is_some()
    }

    fn emit(&self, compiler: &mut BytecodeCompiler) -> Result<(), CompileError> {
        let Some(kind) = self.last_kind else {
            return Err(CompileError::NotCompilable {
                node: self.to_string(),
            });
        };
        compiler.emit_load_variable(&self.name)?;
        compiler
            .code_flow_mut()
            .push_descriptor(ExitDescriptor::Boxed(kind));
        Ok(())
    }

    fn exit_descriptor(&self) -> Option<ExitDescriptor> {
        self.last_kind.map(ExitDescriptor::Boxed)
    }
}

impl fmt::Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name)
    }
}
