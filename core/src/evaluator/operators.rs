//! Arithmetic operator implementations.
//!
//! The primitive kernels here are shared by the interpreter and the VM, which
//! is what keeps the two execution paths in exact agreement.

use alloc::format;
use alloc::string::{String, ToString};
use core::cmp::{self, Ordering};

use bigdecimal::{BigDecimal, num_bigint::BigInt};

use crate::{
    ast::ArithmeticOp,
    evaluator::{Environment, EvalError, ResourceExceeded, RuntimeError},
    values::{Numeric, Primitive, PrimitivePair, Value},
};

/// Combines two evaluated operands.
///
/// Numbers go through the promotion ladder, `text * int32` repeats text,
/// `text + text` concatenates, and everything else is handed to the
/// environment's overloader.
pub(crate) fn eval_binary(
    op: ArithmeticOp,
    left: Value,
    right: Value,
    env: &Environment,
) -> Result<Value, EvalError> {
    if let (Some(l), Some(r)) = (left.as_numeric(), right.as_numeric()) {
        return eval_binary_numeric(op, l, r).map_err(EvalError::from);
    }

    let max_length = env.options().max_text_length;
    match (op, &left, &right) {
        (ArithmeticOp::Mul, Value::Text(text), Value::Int32(count)) => {
            repeat_text(text, *count, max_length).map(Value::Text)
        }
        (ArithmeticOp::Add, Value::Text(l), Value::Text(r)) => {
            concat_text(l, r, max_length).map(Value::Text)
        }
        _ => env.overloader().resolve(op, &left, &right),
    }
}

/// Applies a one-operand form (`+x`, `-x`).
pub(crate) fn eval_unary(op: ArithmeticOp, operand: &Value) -> Result<Value, EvalError> {
    if !op.has_unary_form() {
        return Err(RuntimeError::MissingOperand { op }.into());
    }
    match operand.as_numeric() {
        Some(Numeric::Primitive(p)) => Ok(Value::from(eval_unary_primitive(op, p)?)),
        Some(Numeric::Decimal(d)) => Ok(Value::Decimal(match op {
            ArithmeticOp::Sub => -d.clone(),
            _ => d.clone(),
        })),
        None => Err(RuntimeError::UnsupportedOperand {
            op,
            operand: operand.kind(),
        }
        .into()),
    }
}

fn eval_binary_numeric(
    op: ArithmeticOp,
    left: Numeric<'_>,
    right: Numeric<'_>,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Numeric::Primitive(l), Numeric::Primitive(r)) => {
            eval_binary_primitive(op, PrimitivePair::promote(l, r)).map(Value::from)
        }
        // At least one decimal: everything moves to the decimal tier.
        (l, r) => {
            let l = to_decimal(l)?;
            let r = to_decimal(r)?;
            eval_binary_decimal(op, &l, &r).map(Value::Decimal)
        }
    }
}

fn to_decimal(n: Numeric<'_>) -> Result<alloc::borrow::Cow<'_, BigDecimal>, RuntimeError> {
    n.to_decimal().ok_or_else(|| RuntimeError::DecimalConversion {
        value: n.to_string(),
    })
}

/// Applies a binary operator to two operands of one primitive kind.
pub(crate) fn eval_binary_primitive(
    op: ArithmeticOp,
    pair: PrimitivePair,
) -> Result<Primitive, RuntimeError> {
    match pair {
        PrimitivePair::Int32(l, r) => eval_binary_i32(op, l, r).map(Primitive::Int32),
        PrimitivePair::Int64(l, r) => eval_binary_i64(op, l, r).map(Primitive::Int64),
        PrimitivePair::Float32(l, r) => Ok(Primitive::Float32(eval_binary_f32(op, l, r))),
        PrimitivePair::Float64(l, r) => Ok(Primitive::Float64(eval_binary_f64(op, l, r))),
    }
}

/// Applies a one-operand form to a primitive.
pub(crate) fn eval_unary_primitive(
    op: ArithmeticOp,
    operand: Primitive,
) -> Result<Primitive, RuntimeError> {
    match op {
        ArithmeticOp::Add => Ok(operand),
        ArithmeticOp::Sub => Ok(match operand {
            Primitive::Int32(v) => Primitive::Int32(v.wrapping_neg()),
            Primitive::Int64(v) => Primitive::Int64(v.wrapping_neg()),
            Primitive::Float32(v) => Primitive::Float32(-v),
            Primitive::Float64(v) => Primitive::Float64(-v),
        }),
        ArithmeticOp::Mul | ArithmeticOp::Div | ArithmeticOp::Mod => {
            Err(RuntimeError::MissingOperand { op })
        }
    }
}

// Integer arithmetic wraps on overflow (two's complement), including
// `MIN / -1`. Division and remainder by zero are errors.
macro_rules! int_kernel {
    ($name:ident, $ty:ty) => {
        fn $name(op: ArithmeticOp, left: $ty, right: $ty) -> Result<$ty, RuntimeError> {
            match op {
                ArithmeticOp::Add => Ok(left.wrapping_add(right)),
                ArithmeticOp::Sub => Ok(left.wrapping_sub(right)),
                ArithmeticOp::Mul => Ok(left.wrapping_mul(right)),
                ArithmeticOp::Div if right == 0 => Err(RuntimeError::DivisionByZero),
                ArithmeticOp::Div => Ok(left.wrapping_div(right)),
                ArithmeticOp::Mod if right == 0 => Err(RuntimeError::DivisionByZero),
                ArithmeticOp::Mod => Ok(left.wrapping_rem(right)),
            }
        }
    };
}

// IEEE 754: division by zero gives an infinity or NaN, `%` truncates.
macro_rules! float_kernel {
    ($name:ident, $ty:ty) => {
        fn $name(op: ArithmeticOp, left: $ty, right: $ty) -> $ty {
            match op {
                ArithmeticOp::Add => left + right,
                ArithmeticOp::Sub => left - right,
                ArithmeticOp::Mul => left * right,
                ArithmeticOp::Div => left / right,
                ArithmeticOp::Mod => left % right,
            }
        }
    };
}

int_kernel!(eval_binary_i32, i32);
int_kernel!(eval_binary_i64, i64);
float_kernel!(eval_binary_f32, f32);
float_kernel!(eval_binary_f64, f64);

/// Exact decimal arithmetic.
///
/// Division rounds half-even to the larger of the two operand scales.
pub(crate) fn eval_binary_decimal(
    op: ArithmeticOp,
    left: &BigDecimal,
    right: &BigDecimal,
) -> Result<BigDecimal, RuntimeError> {
    match op {
        ArithmeticOp::Add => Ok(left + right),
        ArithmeticOp::Sub => Ok(left - right),
        ArithmeticOp::Mul => Ok(left * right),
        ArithmeticOp::Div => {
            if is_zero(right) {
                return Err(RuntimeError::DivisionByZero);
            }
            let scale = cmp::max(scale_of(left), scale_of(right));
            divide_half_even(left, right, scale)
        }
        ArithmeticOp::Mod => {
            if is_zero(right) {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(left % right)
        }
    }
}

/// Divides at `scale` with a single half-even rounding of the exact quotient.
fn divide_half_even(
    left: &BigDecimal,
    right: &BigDecimal,
    scale: i64,
) -> Result<BigDecimal, RuntimeError> {
    let (mut numerator, left_scale) = left.as_bigint_and_exponent();
    let (mut denominator, right_scale) = right.as_bigint_and_exponent();

    // left / right * 10^scale == numerator * 10^shift / denominator
    let shift = scale - left_scale + right_scale;
    let ten_pow = |exponent: i64| {
        u32::try_from(exponent)
            .map(|exponent| BigInt::from(10u32).pow(exponent))
            .map_err(|_| RuntimeError::DecimalConversion {
                value: format!("10^{}", exponent),
            })
    };
    if shift >= 0 {
        numerator *= ten_pow(shift)?;
    } else {
        denominator *= ten_pow(-shift)?;
    }

    let mut quotient = &numerator / &denominator;
    let remainder = &numerator % &denominator;
    if remainder != BigInt::from(0) {
        let round_away = match (remainder.magnitude() + remainder.magnitude()).cmp(denominator.magnitude()) {
            Ordering::Greater => true,
            Ordering::Equal => quotient.magnitude().bit(0),
            Ordering::Less => false,
        };
        if round_away {
            if numerator.sign() == denominator.sign() {
                quotient += BigInt::from(1);
            } else {
                quotient -= BigInt::from(1);
            }
        }
    }
    Ok(BigDecimal::new(quotient, scale))
}

fn is_zero(d: &BigDecimal) -> bool {
    *d == BigDecimal::from(0)
}

fn scale_of(d: &BigDecimal) -> i64 {
    d.as_bigint_and_exponent().1
}

/// Concatenates `count` copies of `text`. Non-positive counts give "".
pub(crate) fn repeat_text(
    text: &str,
    count: i32,
    max_length: Option<usize>,
) -> Result<String, EvalError> {
    if count <= 0 {
        return Ok(String::new());
    }
    let length = text
        .len()
        .checked_mul(count as usize)
        .ok_or(ResourceExceeded::TextTooLong {
            max_length: max_length.unwrap_or(usize::MAX),
        })?;
    check_text_length(length, max_length)?;
    Ok(text.repeat(count as usize))
}

fn concat_text(left: &str, right: &str, max_length: Option<usize>) -> Result<String, EvalError> {
    check_text_length(left.len().saturating_add(right.len()), max_length)?;
    let mut result = String::with_capacity(left.len() + right.len());
    result.push_str(left);
    result.push_str(right);
    Ok(result)
}

fn check_text_length(length: usize, max_length: Option<usize>) -> Result<(), ResourceExceeded> {
    match max_length {
        Some(max_length) if length > max_length => Err(ResourceExceeded::TextTooLong { max_length }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_int32_mul_wraps() {
        assert_eq!(eval_binary_i32(ArithmeticOp::Mul, 3, 4).unwrap(), 12);
        assert_eq!(eval_binary_i32(ArithmeticOp::Mul, i32::MAX, 2).unwrap(), -2);
        assert_eq!(
            eval_binary_i32(ArithmeticOp::Add, i32::MAX, 1).unwrap(),
            i32::MIN
        );
    }

    #[test]
    fn test_int64_mul_wraps() {
        assert_eq!(eval_binary_i64(ArithmeticOp::Mul, -2, 5).unwrap(), -10);
        assert_eq!(eval_binary_i64(ArithmeticOp::Mul, i64::MAX, 2).unwrap(), -2);
    }

    #[test]
    fn test_int_div_truncates_and_wraps() {
        assert_eq!(eval_binary_i32(ArithmeticOp::Div, 7, 2).unwrap(), 3);
        assert_eq!(eval_binary_i32(ArithmeticOp::Div, -7, 2).unwrap(), -3);
        assert_eq!(
            eval_binary_i32(ArithmeticOp::Div, i32::MIN, -1).unwrap(),
            i32::MIN
        );
        assert_eq!(eval_binary_i64(ArithmeticOp::Mod, -7, 2).unwrap(), -1);
        assert_eq!(eval_binary_i64(ArithmeticOp::Mod, i64::MIN, -1).unwrap(), 0);
    }

    #[test]
    fn test_int_div_by_zero() {
        assert_eq!(
            eval_binary_i32(ArithmeticOp::Div, 1, 0),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            eval_binary_i64(ArithmeticOp::Mod, 1, 0),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_float_div_by_zero_is_infinite() {
        let result = eval_binary_f64(ArithmeticOp::Div, 10.0, 0.0);
        assert!(result.is_infinite() && result.is_sign_positive());
        assert!(eval_binary_f32(ArithmeticOp::Mod, 1.0, 0.0).is_nan());
    }

    #[test]
    fn test_float_mod_truncates() {
        assert_eq!(eval_binary_f64(ArithmeticOp::Mod, -7.5, 2.0), -1.5);
    }

    #[test]
    fn test_decimal_mul_is_exact() {
        assert_eq!(
            eval_binary_decimal(ArithmeticOp::Mul, &dec("0.1"), &dec("0.2")).unwrap(),
            dec("0.02")
        );
    }

    #[test]
    fn test_decimal_div_rounds_half_even_to_operand_scale() {
        let result = eval_binary_decimal(ArithmeticOp::Div, &dec("1.00"), &dec("3")).unwrap();
        assert_eq!(result, dec("0.33"));
        assert_eq!(scale_of(&result), 2);

        let result = eval_binary_decimal(ArithmeticOp::Div, &dec("5"), &dec("2")).unwrap();
        assert_eq!(result, dec("2"));
    }

    #[test]
    fn test_decimal_div_rounds_long_quotient_once() {
        // The exact quotient is 1.4999...95 with well over 100 digits; it is
        // below the tie, so it must not be rounded up to 2.
        let ten = BigInt::from(10u32);
        let right = ten.pow(110) + BigInt::from(1);
        let left = &right + (&right - BigInt::from(1)) / BigInt::from(2);
        let result = eval_binary_decimal(
            ArithmeticOp::Div,
            &BigDecimal::new(left.clone(), 0),
            &BigDecimal::new(right.clone(), 0),
        )
        .unwrap();
        assert_eq!(result, dec("1"));

        let result = eval_binary_decimal(
            ArithmeticOp::Div,
            &BigDecimal::new(-left, 0),
            &BigDecimal::new(right, 0),
        )
        .unwrap();
        assert_eq!(result, dec("-1"));
    }

    #[test]
    fn test_decimal_div_ties_go_to_even() {
        let half = |l: &str, r: &str| eval_binary_decimal(ArithmeticOp::Div, &dec(l), &dec(r)).unwrap();
        assert_eq!(half("5", "2"), dec("2"));
        assert_eq!(half("7", "2"), dec("4"));
        assert_eq!(half("-5", "2"), dec("-2"));
        assert_eq!(half("-7", "2"), dec("-4"));
        assert_eq!(half("0.25", "2"), dec("0.12"));
        assert_eq!(half("7", "-0.50"), dec("-14.00"));
    }

    #[test]
    fn test_decimal_div_by_zero() {
        assert_eq!(
            eval_binary_decimal(ArithmeticOp::Div, &dec("1"), &dec("0.00")),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_promoted_primitive() {
        let pair = PrimitivePair::promote(Primitive::Int64(2), Primitive::Int32(3));
        assert_eq!(
            eval_binary_primitive(ArithmeticOp::Mul, pair).unwrap(),
            Primitive::Int64(6)
        );
    }

    #[test]
    fn test_unary_primitive() {
        assert_eq!(
            eval_unary_primitive(ArithmeticOp::Sub, Primitive::Int32(i32::MIN)).unwrap(),
            Primitive::Int32(i32::MIN)
        );
        assert_eq!(
            eval_unary_primitive(ArithmeticOp::Sub, Primitive::Float64(2.0)).unwrap(),
            Primitive::Float64(-2.0)
        );
        assert_eq!(
            eval_unary_primitive(ArithmeticOp::Mul, Primitive::Int32(1)),
            Err(RuntimeError::MissingOperand {
                op: ArithmeticOp::Mul
            })
        );
    }

    #[test]
    fn test_repeat_text() {
        assert_eq!(repeat_text("ab", 3, None).unwrap(), "ababab");
        assert_eq!(repeat_text("x", 0, None).unwrap(), "");
        assert_eq!(repeat_text("x", -4, None).unwrap(), "");
    }

    #[test]
    fn test_repeat_text_respects_limit() {
        assert_eq!(repeat_text("ab", 2, Some(4)).unwrap(), "abab");
        assert_eq!(
            repeat_text("ab", 3, Some(4)),
            Err(EvalError::ResourceExceeded(ResourceExceeded::TextTooLong {
                max_length: 4
            }))
        );
    }

    #[test]
    fn test_concat_text_respects_limit() {
        assert_eq!(concat_text("ab", "cd", None).unwrap(), "abcd");
        assert!(concat_text("ab", "cd", Some(3)).is_err());
    }
}
