use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use bigdecimal::BigDecimal;

use crate::values::numeric::{Numeric, Primitive, PrimitiveKind};

/// A dynamically typed runtime value.
///
/// The set of variants is closed: every place that dispatches on a value
/// matches exhaustively, so adding a variant forces each of them to decide
/// what to do with it.
#[derive(Clone)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(BigDecimal),
    Text(String),
    /// A host value the arithmetic operators never combine themselves.
    Other(Opaque),
}

/// The kind of a [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Text,
    Other(&'static str),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int32 => f.write_str("int32"),
            ValueKind::Int64 => f.write_str("int64"),
            ValueKind::Float32 => f.write_str("float32"),
            ValueKind::Float64 => f.write_str("float64"),
            ValueKind::Decimal => f.write_str("decimal"),
            ValueKind::Text => f.write_str("text"),
            ValueKind::Other(name) => f.write_str(name),
        }
    }
}

impl From<PrimitiveKind> for ValueKind {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Int32 => ValueKind::Int32,
            PrimitiveKind::Int64 => ValueKind::Int64,
            PrimitiveKind::Float32 => ValueKind::Float32,
            PrimitiveKind::Float64 => ValueKind::Float64,
        }
    }
}

/// Type-erased, shared host value carried by [`Value::Other`].
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Opaque values are only equal to clones of themselves.
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque<{}>", self.type_name)
    }
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn other<T: Any + Send + Sync>(value: T) -> Self {
        Value::Other(Opaque::new(value))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Text(_) => ValueKind::Text,
            Value::Other(opaque) => ValueKind::Other(opaque.type_name()),
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Value::Int32(v) => Some(Primitive::Int32(*v)),
            Value::Int64(v) => Some(Primitive::Int64(*v)),
            Value::Float32(v) => Some(Primitive::Float32(*v)),
            Value::Float64(v) => Some(Primitive::Float64(*v)),
            Value::Decimal(_) | Value::Text(_) | Value::Other(_) => None,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.as_primitive().map(Primitive::kind)
    }

    pub fn as_numeric(&self) -> Option<Numeric<'_>> {
        match self {
            Value::Int32(_) | Value::Int64(_) | Value::Float32(_) | Value::Float64(_) => {
                self.as_primitive().map(Numeric::Primitive)
            }
            Value::Decimal(d) => Some(Numeric::Decimal(d)),
            Value::Text(_) | Value::Other(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_numeric().is_some()
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_other<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Other(opaque) => opaque.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Stricter than `==`: the variants must match and floats are compared
    /// bit for bit. Decimals must also agree on scale.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Decimal(a), Value::Decimal(b)) => {
                a == b && a.as_bigint_and_exponent().1 == b.as_bigint_and_exponent().1
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Other(a), Value::Other(b)) => a.ptr_eq(b),
            _ => match (self.as_primitive(), other.as_primitive()) {
                (Some(a), Some(b)) => a.identical(b),
                _ => false,
            },
        }
    }
}

/// Values of different variants are never equal, even when numerically
/// equivalent: `Int32(1) != Int64(1)`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Other(a), Value::Other(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(v) => write!(f, "Int32({})", v),
            Value::Int64(v) => write!(f, "Int64({})", v),
            Value::Float32(v) => write!(f, "Float32({:?})", v),
            Value::Float64(v) => write!(f, "Float64({:?})", v),
            Value::Decimal(d) => write!(f, "Decimal({})", d),
            Value::Text(s) => write!(f, "Text({:?})", s),
            Value::Other(opaque) => write!(f, "Other({:?})", opaque),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(v) => write!(f, "{}", Primitive::Int32(*v)),
            Value::Int64(v) => write!(f, "{}", Primitive::Int64(*v)),
            Value::Float32(v) => write!(f, "{}", Primitive::Float32(*v)),
            Value::Float64(v) => write!(f, "{}", Primitive::Float64(*v)),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => f.write_str(s),
            Value::Other(opaque) => write!(f, "<{}>", opaque.type_name()),
        }
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Int32(v) => Value::Int32(v),
            Primitive::Int64(v) => Value::Int64(v),
            Primitive::Float32(v) => Value::Float32(v),
            Primitive::Float64(v) => Value::Float64(v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(String::from(s))
    }
}
