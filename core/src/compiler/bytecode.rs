//! Bytecode compiler implementation.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::{
    ast::{ArithmeticOp, Node},
    compiler::{CodeFlow, CompileError},
    values::{Primitive, PrimitiveKind},
    vm::{Code, Instruction},
};

/// Instruction sink that nodes emit themselves into.
///
/// It deduplicates constants and variable names into their tables and
/// tracks the operand stack precisely to set an exact `max_stack_size`.
pub struct BytecodeCompiler {
    /// Constant pool for primitive literals
    constants: Vec<Primitive>,

    /// Constant deduplication map, keyed by kind and bit pattern so that
    /// `0.0` and `-0.0` (or NaNs with different payloads) stay distinct.
    constant_map: HashMap<(PrimitiveKind, u64), u8>,

    /// Variable names, resolved against the environment at run time
    variables: Vec<String>,

    variable_map: HashMap<String, u8>,

    /// Bytecode instructions
    instructions: Vec<Instruction>,

    code_flow: CodeFlow,

    /// Current stack depth during compilation
    current_stack_depth: usize,

    /// Maximum stack depth observed
    max_stack_size: usize,
}

impl BytecodeCompiler {
    pub fn new() -> Self {
        Self {
            constants: Vec::new(),
            constant_map: HashMap::new(),
            variables: Vec::new(),
            variable_map: HashMap::new(),
            instructions: Vec::new(),
            code_flow: CodeFlow::new(),
            current_stack_depth: 0,
            max_stack_size: 0,
        }
    }

    /// Compiles a whole tree: emits the root, then `Return`.
    #[tracing::instrument(level = "debug", skip_all, fields(node = %root))]
    pub fn compile(root: &dyn Node) -> Result<Code, CompileError> {
        if !root.is_compilable() {
            return Err(CompileError::NotCompilable {
                node: root.to_string(),
            });
        }
        let mut compiler = Self::new();
        root.emit(&mut compiler)?;
        compiler.emit(Instruction::Return);
        compiler.pop_stack();
        let code = compiler.finalize();
        tracing::debug!(
            instructions = code.instructions.len(),
            max_stack_size = code.max_stack_size,
            "compiled expression"
        );
        Ok(code)
    }

    /// Finalize compilation and return the bytecode.
    pub fn finalize(self) -> Code {
        debug_assert!(
            self.code_flow.len() <= 1,
            "code flow holds {} descriptors after emission",
            self.code_flow.len()
        );
        Code {
            constants: self.constants,
            variables: self.variables,
            instructions: self.instructions,
            max_stack_size: self.max_stack_size,
            exit_descriptor: self.code_flow.last_descriptor(),
        }
    }

    pub fn code_flow(&self) -> &CodeFlow {
        &self.code_flow
    }

    pub fn code_flow_mut(&mut self) -> &mut CodeFlow {
        &mut self.code_flow
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    // === Emission API for nodes ===

    /// Loads a primitive constant as a raw primitive.
    pub fn emit_constant(&mut self, value: Primitive) -> Result<(), CompileError> {
        let index = self.add_constant(value)?;
        self.emit(Instruction::ConstLoad(index));
        self.push_stack();
        Ok(())
    }

    /// Loads a variable, boxed.
    pub fn emit_load_variable(&mut self, name: &str) -> Result<(), CompileError> {
        let index = self.add_variable(name)?;
        self.emit(Instruction::LoadVariable(index));
        self.push_stack();
        Ok(())
    }

    /// Converts the boxed value on top of the stack into a raw `kind`.
    pub fn emit_unbox(&mut self, kind: PrimitiveKind) {
        self.emit(Instruction::Unbox(kind.descriptor()));
    }

    /// Combines the two raw `kind` operands on top of the stack.
    pub fn emit_binary(&mut self, op: ArithmeticOp, kind: PrimitiveKind) {
        let op_byte = op.op_byte();
        let instruction = match kind {
            PrimitiveKind::Int32 => Instruction::IntBinOp(op_byte),
            PrimitiveKind::Int64 => Instruction::LongBinOp(op_byte),
            PrimitiveKind::Float32 => Instruction::FloatBinOp(op_byte),
            PrimitiveKind::Float64 => Instruction::DoubleBinOp(op_byte),
        };
        self.emit(instruction);
        self.pop_stack_n(2);
        self.push_stack();
    }

    /// Negates the raw `kind` operand on top of the stack.
    pub fn emit_negate(&mut self, kind: PrimitiveKind) {
        let instruction = match kind {
            PrimitiveKind::Int32 => Instruction::NegInt,
            PrimitiveKind::Int64 => Instruction::NegLong,
            PrimitiveKind::Float32 => Instruction::NegFloat,
            PrimitiveKind::Float64 => Instruction::NegDouble,
        };
        self.emit(instruction);
    }

    // === Stack Management ===

    /// Push a value onto the stack (increases depth by 1).
    fn push_stack(&mut self) {
        self.current_stack_depth += 1;
        if self.current_stack_depth > self.max_stack_size {
            self.max_stack_size = self.current_stack_depth;
        }
    }

    /// Pop a value from the stack (decreases depth by 1).
    fn pop_stack(&mut self) {
        debug_assert!(self.current_stack_depth > 0, "Stack underflow");
        self.current_stack_depth = self.current_stack_depth.saturating_sub(1);
    }

    /// Pop N values from the stack.
    fn pop_stack_n(&mut self, n: usize) {
        debug_assert!(
            self.current_stack_depth >= n,
            "Stack underflow: trying to pop {} but depth is {}",
            n,
            self.current_stack_depth
        );
        self.current_stack_depth = self.current_stack_depth.saturating_sub(n);
    }

    // === Instruction Emission ===

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    // === Tables ===

    /// Add a constant to the pool (or reuse an identical one) and return its index.
    fn add_constant(&mut self, value: Primitive) -> Result<u8, CompileError> {
        let key = value.bits_key();
        if let Some(&index) = self.constant_map.get(&key) {
            return Ok(index);
        }
        let index: u8 = self
            .constants
            .len()
            .try_into()
            .map_err(|_| CompileError::TooManyConstants)?;
        self.constants.push(value);
        self.constant_map.insert(key, index);
        Ok(index)
    }

    fn add_variable(&mut self, name: &str) -> Result<u8, CompileError> {
        if let Some(&index) = self.variable_map.get(name) {
            return Ok(index);
        }
        let index: u8 = self
            .variables
            .len()
            .try_into()
            .map_err(|_| CompileError::TooManyVariables)?;
        self.variables.push(name.to_string());
        self.variable_map.insert(name.to_string(), index);
        Ok(index)
    }
}

impl Default for BytecodeCompiler {
    fn default() -> Self {
        Self::new()
    }
}
