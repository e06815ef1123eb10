//! Runtime values.

mod numeric;
mod value;

pub use numeric::{Numeric, Primitive, PrimitiveKind, PrimitivePair};
pub use value::{Opaque, Value, ValueKind};
