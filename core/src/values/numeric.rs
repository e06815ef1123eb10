//! Primitive numbers and the numeric promotion ladder.
//!
//! The ladder, lowest tier first, is `Int32 < Int64 < Float32 < Float64 < Decimal`.
//! When two numbers meet in an arithmetic operator, the operand on the lower
//! tier is widened to the tier of the other one before the operation runs.
//!
//! The four primitive tiers are the only ones compiled code can operate on, so
//! they get their own types ([`PrimitiveKind`], [`Primitive`], [`PrimitivePair`]).
//! Decimals are only ever handled by the interpreter.

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::ToString;
use core::{cmp, fmt};
use core::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A primitive numeric kind.
///
/// Variants are declared in ladder order, so the derived `Ord` picks the
/// winning kind of a promotion with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 4] = [
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::Float32,
        PrimitiveKind::Float64,
    ];

    /// One-byte code identifying this kind inside instructions.
    pub fn descriptor(self) -> u8 {
        match self {
            PrimitiveKind::Int32 => b'I',
            PrimitiveKind::Int64 => b'J',
            PrimitiveKind::Float32 => b'F',
            PrimitiveKind::Float64 => b'D',
        }
    }

    /// Inverse of [`PrimitiveKind::descriptor`].
    pub fn from_descriptor(code: u8) -> Option<Self> {
        match code {
            b'I' => Some(PrimitiveKind::Int32),
            b'J' => Some(PrimitiveKind::Int64),
            b'F' => Some(PrimitiveKind::Float32),
            b'D' => Some(PrimitiveKind::Float64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::Float32 => "float32",
            PrimitiveKind::Float64 => "float64",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A number of one of the four primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

impl Primitive {
    pub fn kind(self) -> PrimitiveKind {
        match self {
            Primitive::Int32(_) => PrimitiveKind::Int32,
            Primitive::Int64(_) => PrimitiveKind::Int64,
            Primitive::Float32(_) => PrimitiveKind::Float32,
            Primitive::Float64(_) => PrimitiveKind::Float64,
        }
    }

    // Conversions below follow primitive widening: they are exact whenever the
    // target kind is not lower on the ladder than `self`.

    fn as_i32(self) -> i32 {
        match self {
            Primitive::Int32(v) => v,
            Primitive::Int64(v) => v as i32,
            Primitive::Float32(v) => v as i32,
            Primitive::Float64(v) => v as i32,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Primitive::Int32(v) => v as i64,
            Primitive::Int64(v) => v,
            Primitive::Float32(v) => v as i64,
            Primitive::Float64(v) => v as i64,
        }
    }

    fn as_f32(self) -> f32 {
        match self {
            Primitive::Int32(v) => v as f32,
            Primitive::Int64(v) => v as f32,
            Primitive::Float32(v) => v,
            Primitive::Float64(v) => v as f32,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Primitive::Int32(v) => v as f64,
            Primitive::Int64(v) => v as f64,
            Primitive::Float32(v) => v as f64,
            Primitive::Float64(v) => v,
        }
    }

    /// Converts to a decimal.
    ///
    /// Floats go through their shortest round-trip digits, so `0.1f64`
    /// becomes exactly `0.1` rather than its binary expansion. The scale is
    /// the one of the float's canonical text: plain with at least one
    /// fraction digit for magnitudes in `[1e-3, 1e7)` (`2.0`), scientific
    /// with at least one mantissa fraction digit elsewhere (`1.0E20`).
    /// Returns `None` for NaN and infinities.
    pub fn to_decimal(self) -> Option<BigDecimal> {
        match self {
            Primitive::Int32(v) => Some(BigDecimal::from(v)),
            Primitive::Int64(v) => Some(BigDecimal::from(v)),
            Primitive::Float32(v) if v.is_finite() => {
                let plain = v == 0.0 || (1e-3..1e7).contains(&v.abs());
                float_to_decimal(&format!("{:e}", v), plain)
            }
            Primitive::Float64(v) if v.is_finite() => {
                let plain = v == 0.0 || (1e-3..1e7).contains(&v.abs());
                float_to_decimal(&format!("{:e}", v), plain)
            }
            Primitive::Float32(_) | Primitive::Float64(_) => None,
        }
    }

    /// Bitwise identity: unlike `==`, NaN is identical to itself and `0.0`
    /// is not identical to `-0.0`.
    pub fn identical(self, other: Primitive) -> bool {
        match (self, other) {
            (Primitive::Int32(a), Primitive::Int32(b)) => a == b,
            (Primitive::Int64(a), Primitive::Int64(b)) => a == b,
            (Primitive::Float32(a), Primitive::Float32(b)) => a.to_bits() == b.to_bits(),
            (Primitive::Float64(a), Primitive::Float64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }

    /// Bit pattern tagged with the kind, used for constant deduplication.
    pub(crate) fn bits_key(self) -> (PrimitiveKind, u64) {
        let bits = match self {
            Primitive::Int32(v) => v as u32 as u64,
            Primitive::Int64(v) => v as u64,
            Primitive::Float32(v) => v.to_bits() as u64,
            Primitive::Float64(v) => v.to_bits(),
        };
        (self.kind(), bits)
    }
}

/// Rescales the exact value of `scientific` (`d.ddde±x`) to the scale of its
/// plain or scientific canonical text.
fn float_to_decimal(scientific: &str, plain: bool) -> Option<BigDecimal> {
    let (mantissa, exponent) = scientific.split_once('e')?;
    let exponent: i64 = exponent.parse().ok()?;
    let fraction_digits = mantissa.split_once('.').map_or(0, |(_, f)| f.len() as i64);
    let scale = if plain {
        cmp::max(1, fraction_digits - exponent)
    } else {
        cmp::max(1, fraction_digits) - exponent
    };
    // Never below the natural scale, so this only appends zeros.
    Some(BigDecimal::from_str(scientific).ok()?.with_scale(scale))
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Int32(v) => write!(f, "{}", v),
            Primitive::Int64(v) => write!(f, "{}L", v),
            Primitive::Float32(v) => {
                format_float(f, *v as f64, &v.to_string())?;
                f.write_str("f")
            }
            Primitive::Float64(v) => format_float(f, *v, &v.to_string()),
        }
    }
}

fn format_float(f: &mut fmt::Formatter<'_>, value: f64, text: &str) -> fmt::Result {
    if value.is_nan() {
        write!(f, "nan")
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            write!(f, "inf")
        } else {
            write!(f, "-inf")
        }
    } else if text.contains('.') || text.contains('e') || text.contains('E') {
        write!(f, "{}", text)
    } else {
        write!(f, "{}.0", text)
    }
}

/// Two operands already promoted to a common primitive kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitivePair {
    Int32(i32, i32),
    Int64(i64, i64),
    Float32(f32, f32),
    Float64(f64, f64),
}

impl PrimitivePair {
    /// Widens the operand on the lower tier to the kind of the other one.
    pub fn promote(left: Primitive, right: Primitive) -> Self {
        match left.kind().max(right.kind()) {
            PrimitiveKind::Int32 => PrimitivePair::Int32(left.as_i32(), right.as_i32()),
            PrimitiveKind::Int64 => PrimitivePair::Int64(left.as_i64(), right.as_i64()),
            PrimitiveKind::Float32 => PrimitivePair::Float32(left.as_f32(), right.as_f32()),
            PrimitiveKind::Float64 => PrimitivePair::Float64(left.as_f64(), right.as_f64()),
        }
    }

    /// Pairs two operands that already share a kind, without any widening.
    pub fn exact(left: Primitive, right: Primitive) -> Option<Self> {
        match (left, right) {
            (Primitive::Int32(l), Primitive::Int32(r)) => Some(PrimitivePair::Int32(l, r)),
            (Primitive::Int64(l), Primitive::Int64(r)) => Some(PrimitivePair::Int64(l, r)),
            (Primitive::Float32(l), Primitive::Float32(r)) => Some(PrimitivePair::Float32(l, r)),
            (Primitive::Float64(l), Primitive::Float64(r)) => Some(PrimitivePair::Float64(l, r)),
            _ => None,
        }
    }

    pub fn kind(self) -> PrimitiveKind {
        match self {
            PrimitivePair::Int32(..) => PrimitiveKind::Int32,
            PrimitivePair::Int64(..) => PrimitiveKind::Int64,
            PrimitivePair::Float32(..) => PrimitiveKind::Float32,
            PrimitivePair::Float64(..) => PrimitiveKind::Float64,
        }
    }
}

/// Borrowed view of a numeric value: a primitive or a decimal.
#[derive(Debug, Clone, Copy)]
pub enum Numeric<'a> {
    Primitive(Primitive),
    Decimal(&'a BigDecimal),
}

impl<'a> Numeric<'a> {
    /// Converts to the decimal tier, borrowing when already there.
    ///
    /// Returns `None` for non-finite floats, which have no decimal form.
    pub fn to_decimal(self) -> Option<Cow<'a, BigDecimal>> {
        match self {
            Numeric::Primitive(p) => p.to_decimal().map(Cow::Owned),
            Numeric::Decimal(d) => Some(Cow::Borrowed(d)),
        }
    }
}

impl fmt::Display for Numeric<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Primitive(p) => write!(f, "{}", p),
            Numeric::Decimal(d) => write!(f, "{}", d),
        }
    }
}
