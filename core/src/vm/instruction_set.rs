//! Spry VM Instructions - Fixed 16-bit Format
//!
//! **ALL instructions are exactly 16 bits (2 bytes)**:
//! ```text
//! ┌────────────┬────────────┐
//! │    Tag     │  Operand   │
//! │  (8 bits)  │  (8 bits)  │
//! └────────────┴────────────┘
//! ```
//!
//! Operand slots hold either *raw* primitives, produced by constants and
//! arithmetic, or *boxed* values, produced by variable loads. Arithmetic
//! only accepts raw operands of its own width; `Unbox` converts between the
//! two.
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use core::fmt;

use serde::{Deserialize, Serialize};

/// A single VM instruction (exactly 16 bits)
#[repr(C, u8)]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Halt execution
    ///
    /// Zeroed bytecode halts instead of executing garbage. Well-formed code
    /// never reaches it, so the VM reports it as an internal error.
    Halt = 0x00,

    /// Push raw primitive from the constant pool (index 0-255)
    /// Operand: u8 index | Stack: [...] -> [..., raw]
    ConstLoad(u8) = 0x01,

    /// Push the boxed value of a variable from the environment
    /// Operand: u8 index into the variable table | Stack: [...] -> [..., boxed]
    LoadVariable(u8) = 0x02,

    /// Unbox the top of the stack into a raw primitive
    ///
    /// Operand: descriptor code (`I`, `J`, `F`, `D`)
    /// Stack: [..., boxed] -> [..., raw]
    Unbox(u8) = 0x03,

    /// 32-bit integer binary operation
    ///
    /// Operand encodes the operation:
    /// - `b'+'` (0x2B): Addition
    /// - `b'-'` (0x2D): Subtraction
    /// - `b'*'` (0x2A): Multiplication
    /// - `b'/'` (0x2F): Division (can error)
    /// - `b'%'` (0x25): Modulo (can error)
    ///
    /// Stack: [..., a: Int32, b: Int32] -> [..., result: Int32(|!)]
    IntBinOp(u8) = 0x10,

    /// Stack: [..., a: Int32] -> [..., -a: Int32]
    NegInt = 0x11,

    /// 64-bit integer binary operation, same operand encoding as IntBinOp
    LongBinOp(u8) = 0x18,

    NegLong = 0x19,

    /// 32-bit float binary operation, same operand encoding as IntBinOp
    FloatBinOp(u8) = 0x20,

    NegFloat = 0x21,

    /// 64-bit float binary operation, same operand encoding as IntBinOp
    DoubleBinOp(u8) = 0x28,

    NegDouble = 0x29,

    /// Return the top of the stack
    Return = 0x3E,
}

const _: () = assert!(core::mem::size_of::<Instruction>() == 2);

impl Instruction {
    /// Size of an instruction in bytes
    pub const SIZE: usize = 2;

    /// Check if this instruction can produce an error effect
    pub const fn can_error(&self) -> bool {
        matches!(
            self,
            Self::IntBinOp(b'/')
                | Self::IntBinOp(b'%')
                | Self::LongBinOp(b'/')
                | Self::LongBinOp(b'%')
                | Self::LoadVariable(_)
                | Self::Unbox(_)
        )
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Operations and descriptors show as chars
            Self::IntBinOp(op) => write!(f, "IntBinOp({})", *op as char),
            Self::LongBinOp(op) => write!(f, "LongBinOp({})", *op as char),
            Self::FloatBinOp(op) => write!(f, "FloatBinOp({})", *op as char),
            Self::DoubleBinOp(op) => write!(f, "DoubleBinOp({})", *op as char),
            Self::Unbox(descriptor) => write!(f, "Unbox({})", *descriptor as char),

            Self::Halt => write!(f, "Halt"),
            Self::ConstLoad(idx) => write!(f, "ConstLoad({})", idx),
            Self::LoadVariable(idx) => write!(f, "LoadVariable({})", idx),
            Self::NegInt => write!(f, "NegInt"),
            Self::NegLong => write!(f, "NegLong"),
            Self::NegFloat => write!(f, "NegFloat"),
            Self::NegDouble => write!(f, "NegDouble"),
            Self::Return => write!(f, "Return"),
        }
    }
}
