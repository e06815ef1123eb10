use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::{ast::ExitDescriptor, values::Primitive, vm::Instruction};

/// Compiled form of an operator tree.
///
/// `Code` owns everything it needs, so it can be cached, shared between
/// threads, or serialized and loaded elsewhere. Variables are stored by name
/// and resolved against the environment each run.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    pub constants: Vec<Primitive>,
    pub variables: Vec<String>,
    pub instructions: Vec<Instruction>,
    pub max_stack_size: usize,
    /// Descriptor of the value left by the root node.
    pub exit_descriptor: Option<ExitDescriptor>,
}

impl core::fmt::Debug for Code {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Code {{")?;
        writeln!(f, "  max_stack_size: {}", self.max_stack_size)?;
        match self.exit_descriptor {
            Some(descriptor) => writeln!(f, "  exit_descriptor: {}", descriptor)?,
            None => writeln!(f, "  exit_descriptor: none")?,
        }

        if !self.constants.is_empty() {
            writeln!(f, "  constants: [")?;
            for (i, constant) in self.constants.iter().enumerate() {
                writeln!(f, "    [{}] = {}", i, constant)?;
            }
            writeln!(f, "  ]")?;
        } else {
            writeln!(f, "  constants: []")?;
        }

        if !self.variables.is_empty() {
            writeln!(f, "  variables: [")?;
            for (i, name) in self.variables.iter().enumerate() {
                writeln!(f, "    [{}] = #{}", i, name)?;
            }
            writeln!(f, "  ]")?;
        } else {
            writeln!(f, "  variables: []")?;
        }

        writeln!(f, "  instructions:")?;
        for (addr, instr) in self.instructions.iter().enumerate() {
            // Annotate table references with what they point at
            match instr {
                Instruction::ConstLoad(index) => match self.constants.get(*index as usize) {
                    Some(constant) => {
                        writeln!(f, "    {:4}  {:?} ({})", addr, instr, constant)?
                    }
                    None => writeln!(f, "    {:4}  {:?} (<invalid>)", addr, instr)?,
                },
                Instruction::LoadVariable(index) => match self.variables.get(*index as usize) {
                    Some(name) => writeln!(f, "    {:4}  {:?} (#{})", addr, instr, name)?,
                    None => writeln!(f, "    {:4}  {:?} (<invalid>)", addr, instr)?,
                },
                _ => writeln!(f, "    {:4}  {:?}", addr, instr)?,
            }
        }

        write!(f, "}}")
    }
}
