use super::instruction_set::Instruction;

use crate::{
    ast::{ArithmeticOp, ExitDescriptor},
    evaluator::{Environment, EvalError, InternalError, RuntimeError, operators},
    values::{Primitive, PrimitiveKind, PrimitivePair, Value},
    vm::{Code, Stack},
};

/// An operand stack entry.
#[derive(Debug, Clone)]
enum Slot {
    /// Unboxed primitive, ready for arithmetic.
    Raw(Primitive),
    /// A value as it came out of the environment.
    Boxed(Value),
}

impl Slot {
    fn into_value(self) -> Value {
        match self {
            Slot::Raw(p) => Value::from(p),
            Slot::Boxed(v) => v,
        }
    }
}

/// Stack machine that runs [`Code`] against an environment.
pub struct VM<'c, 'e> {
    code: &'c Code,
    env: &'e Environment,
    ip: usize,
    stack: Stack<Slot>,
}

impl<'c, 'e> VM<'c, 'e> {
    pub fn new(code: &'c Code, env: &'e Environment) -> Self {
        VM {
            code,
            env,
            ip: 0,
            stack: Stack::new(code.max_stack_size),
        }
    }

    /// Runs `code` to completion.
    pub fn execute(code: &Code, env: &Environment) -> Result<Value, EvalError> {
        VM::new(code, env).run()
    }

    pub fn run(&mut self) -> Result<Value, EvalError> {
        loop {
            let instruction = *self
                .code
                .instructions
                .get(self.ip)
                .ok_or(InternalError::UnexpectedEnd)?;
            self.ip += 1;

            use Instruction::*;
            match instruction {
                Halt => return Err(InternalError::Halted.into()),
                ConstLoad(index) => {
                    let constant = *self
                        .code
                        .constants
                        .get(index as usize)
                        .ok_or(InternalError::InvalidConstant(index))?;
                    self.push(Slot::Raw(constant))?;
                }
                LoadVariable(index) => {
                    let name = self
                        .code
                        .variables
                        .get(index as usize)
                        .ok_or(InternalError::InvalidVariable(index))?;
                    let value = self.env.lookup(name)?.clone();
                    self.push(Slot::Boxed(value))?;
                }
                Unbox(descriptor) => {
                    let kind = PrimitiveKind::from_descriptor(descriptor)
                        .ok_or(InternalError::UnrecognizedDescriptor(descriptor))?;
                    let raw = match self.pop()? {
                        Slot::Boxed(value) => match value.as_primitive() {
                            Some(p) if p.kind() == kind => p,
                            _ => {
                                return Err(RuntimeError::UnboxMismatch {
                                    expected: kind,
                                    found: value.kind(),
                                }
                                .into());
                            }
                        },
                        Slot::Raw(_) => {
                            return Err(InternalError::OperandMismatch {
                                instruction: "Unbox",
                                expected: kind,
                            }
                            .into());
                        }
                    };
                    self.push(Slot::Raw(raw))?;
                }
                IntBinOp(op) => self.binary("IntBinOp", PrimitiveKind::Int32, op)?,
                LongBinOp(op) => self.binary("LongBinOp", PrimitiveKind::Int64, op)?,
                FloatBinOp(op) => self.binary("FloatBinOp", PrimitiveKind::Float32, op)?,
                DoubleBinOp(op) => self.binary("DoubleBinOp", PrimitiveKind::Float64, op)?,
                NegInt => self.negate("NegInt", PrimitiveKind::Int32)?,
                NegLong => self.negate("NegLong", PrimitiveKind::Int64)?,
                NegFloat => self.negate("NegFloat", PrimitiveKind::Float32)?,
                NegDouble => self.negate("NegDouble", PrimitiveKind::Float64)?,
                Return => {
                    let result = self.pop()?;
                    if let Some(ExitDescriptor::Primitive(kind)) = self.code.exit_descriptor {
                        match result {
                            Slot::Raw(p) if p.kind() == kind => {}
                            _ => {
                                return Err(InternalError::OperandMismatch {
                                    instruction: "Return",
                                    expected: kind,
                                }
                                .into());
                            }
                        }
                    }
                    debug_assert!(self.stack.is_empty(), "values left on the stack");
                    return Ok(result.into_value());
                }
            }
        }
    }

    fn binary(
        &mut self,
        instruction: &'static str,
        kind: PrimitiveKind,
        op_byte: u8,
    ) -> Result<(), EvalError> {
        let op = ArithmeticOp::from_op_byte(op_byte)
            .ok_or(InternalError::UnrecognizedOperator(op_byte))?;
        let right = self.pop_raw(instruction, kind)?;
        let left = self.pop_raw(instruction, kind)?;
        let pair = PrimitivePair::exact(left, right).ok_or(InternalError::OperandMismatch {
            instruction,
            expected: kind,
        })?;
        let result = operators::eval_binary_primitive(op, pair)?;
        self.push(Slot::Raw(result))
    }

    fn negate(&mut self, instruction: &'static str, kind: PrimitiveKind) -> Result<(), EvalError> {
        let operand = self.pop_raw(instruction, kind)?;
        let result = operators::eval_unary_primitive(ArithmeticOp::Sub, operand)?;
        self.push(Slot::Raw(result))
    }

    fn pop_raw(
        &mut self,
        instruction: &'static str,
        kind: PrimitiveKind,
    ) -> Result<Primitive, EvalError> {
        match self.pop()? {
            Slot::Raw(p) if p.kind() == kind => Ok(p),
            _ => Err(InternalError::OperandMismatch {
                instruction,
                expected: kind,
            }
            .into()),
        }
    }

    #[inline]
    fn pop(&mut self) -> Result<Slot, EvalError> {
        Ok(self.stack.pop().ok_or(InternalError::StackUnderflow)?)
    }

    #[inline]
    fn push(&mut self, slot: Slot) -> Result<(), EvalError> {
        self.stack.push(slot).map_err(|_| {
            EvalError::from(InternalError::StackSizeExceeded {
                max_stack_size: self.stack.capacity(),
            })
        })
    }
}
