//! Switching between interpretation and compiled code.

use pretty_assertions::assert_eq;
use spry::{
    ArithmeticOp, CompilationOptions, CompiledExpression, CompilerMode, Environment, Error,
    Literal, OperatorNode, Value, VariableRef, evaluator::RuntimeError, values::PrimitiveKind,
    values::ValueKind,
};

fn x_times_two(mode: CompilerMode) -> CompiledExpression {
    let tree = OperatorNode::binary(ArithmeticOp::Mul, VariableRef::new("x"), Literal::new(2));
    CompiledExpression::new(tree).with_options(CompilationOptions {
        mode,
        ..CompilationOptions::default()
    })
}

fn env_with_x(x: impl Into<Value>) -> Environment {
    let mut env = Environment::new();
    env.set("x", x);
    env
}

#[test]
fn off_mode_never_compiles() {
    let mut expr = x_times_two(CompilerMode::Off);
    let mut env = env_with_x(5);
    for _ in 0..500 {
        assert_eq!(expr.run(&mut env).unwrap(), Value::Int32(10));
    }
    assert!(expr.compiled_code().is_none());
    assert_eq!(expr.interpreted_count(), 500);
    assert_eq!(expr.failed_attempts(), 0);
}

#[test]
fn off_is_the_default_mode() {
    let expr = CompiledExpression::new(Literal::new(1));
    assert_eq!(expr.options().mode, CompilerMode::Off);
}

#[test]
fn immediate_mode_compiles_after_second_run() {
    let mut expr = x_times_two(CompilerMode::Immediate);
    let mut env = env_with_x(5);

    expr.run(&mut env).unwrap();
    assert!(expr.compiled_code().is_none());

    expr.run(&mut env).unwrap();
    assert!(expr.compiled_code().is_some());

    // Later runs use the code and leave the count alone.
    env.set("x", 7);
    assert_eq!(expr.run(&mut env).unwrap(), Value::Int32(14));
    assert_eq!(expr.interpreted_count(), 2);
}

#[test]
fn mixed_mode_waits_for_threshold() {
    let mut expr = x_times_two(CompilerMode::Mixed);
    let mut env = env_with_x(5);

    for _ in 0..100 {
        expr.run(&mut env).unwrap();
    }
    assert!(expr.compiled_code().is_none());

    expr.run(&mut env).unwrap();
    assert!(expr.compiled_code().is_some());
    assert_eq!(expr.interpreted_count(), 101);
}

#[test]
fn mixed_mode_custom_threshold() {
    let mut expr = x_times_two(CompilerMode::Mixed).with_options(CompilationOptions {
        mode: CompilerMode::Mixed,
        interpreted_count_threshold: 3,
        ..CompilationOptions::default()
    });
    let mut env = env_with_x(1);
    for _ in 0..3 {
        expr.run(&mut env).unwrap();
    }
    assert!(expr.compiled_code().is_none());
    expr.run(&mut env).unwrap();
    assert!(expr.compiled_code().is_some());
}

#[test]
fn mixed_mode_falls_back_when_variable_changes_kind() {
    let mut expr = x_times_two(CompilerMode::Immediate).with_options(CompilationOptions {
        mode: CompilerMode::Mixed,
        interpreted_count_threshold: 1,
        ..CompilationOptions::default()
    });
    let mut env = env_with_x(5);
    expr.run(&mut env).unwrap();
    expr.run(&mut env).unwrap();
    assert!(expr.compiled_code().is_some());

    // The compiled code unboxes x as int32; interpretation promotes.
    env.set("x", 5i64);
    assert_eq!(expr.run(&mut env).unwrap(), Value::Int64(10));
    assert!(expr.compiled_code().is_none());
    assert_eq!(expr.interpreted_count(), 1);

    // The operator still remembers int32, but x now reports int64, so the
    // tree cannot be compiled again until the kinds line up.
    expr.run(&mut env).unwrap();
    assert!(expr.compiled_code().is_none());
    assert_eq!(expr.failed_attempts(), 1);

    env.set("x", 6);
    assert_eq!(expr.run(&mut env).unwrap(), Value::Int32(12));
    assert!(expr.compiled_code().is_some());
}

#[test]
fn mixed_mode_reports_errors_of_both_paths() {
    let tree = OperatorNode::binary(ArithmeticOp::Div, VariableRef::new("x"), VariableRef::new("y"));
    let mut expr = CompiledExpression::new(tree).with_options(CompilationOptions {
        mode: CompilerMode::Mixed,
        interpreted_count_threshold: 0,
        ..CompilationOptions::default()
    });
    let mut env = Environment::new();
    env.set("x", 9);
    env.set("y", 3);
    assert_eq!(expr.run(&mut env).unwrap(), Value::Int32(3));
    assert!(expr.compiled_code().is_some());

    env.set("y", 0);
    assert_eq!(
        expr.run(&mut env),
        Err(Error::Runtime(RuntimeError::DivisionByZero))
    );
    assert!(expr.compiled_code().is_none());
    assert_eq!(expr.interpreted_count(), 0);
}

#[test]
fn immediate_mode_propagates_compiled_errors() {
    let mut expr = x_times_two(CompilerMode::Immediate);
    let mut env = env_with_x(5);
    expr.run(&mut env).unwrap();
    expr.run(&mut env).unwrap();
    assert!(expr.compiled_code().is_some());

    env.set("x", 2.5f64);
    assert_eq!(
        expr.run(&mut env),
        Err(Error::Runtime(RuntimeError::UnboxMismatch {
            expected: PrimitiveKind::Int32,
            found: ValueKind::Float64,
        }))
    );
    assert!(expr.compiled_code().is_some(), "code is kept");
}

#[test]
fn failed_attempts_are_capped() {
    // int32 * int64 never yields a descriptor.
    let tree = OperatorNode::binary(ArithmeticOp::Mul, VariableRef::new("x"), Literal::new(2i64));
    let mut expr = CompiledExpression::new(tree).with_options(CompilationOptions {
        mode: CompilerMode::Immediate,
        failed_attempts_threshold: 3,
        ..CompilationOptions::default()
    });
    let mut env = env_with_x(5);
    for _ in 0..10 {
        assert_eq!(expr.run(&mut env).unwrap(), Value::Int64(10));
    }
    assert_eq!(expr.failed_attempts(), 3);
    assert!(!expr.compile());
    assert_eq!(expr.failed_attempts(), 3);
}

#[test]
fn compile_forces_an_attempt() {
    let mut expr = x_times_two(CompilerMode::Off);
    assert!(!expr.compile(), "nothing observed yet");
    assert_eq!(expr.failed_attempts(), 1);

    let mut env = env_with_x(4);
    expr.run(&mut env).unwrap();
    assert!(expr.compile());
    assert!(expr.compile(), "already compiled");

    assert_eq!(expr.run(&mut env).unwrap(), Value::Int32(8));
    assert_eq!(expr.interpreted_count(), 1);
}

#[test]
fn revert_to_interpreted() {
    let mut expr = x_times_two(CompilerMode::Off);
    let mut env = env_with_x(4);
    expr.run(&mut env).unwrap();
    assert!(expr.compile());

    expr.revert_to_interpreted();
    assert!(expr.compiled_code().is_none());
    assert_eq!(expr.run(&mut env).unwrap(), Value::Int32(8));
    assert_eq!(expr.interpreted_count(), 1);
}

#[test]
fn interpretation_errors_are_returned() {
    let mut expr = x_times_two(CompilerMode::Immediate);
    let err = expr.run(&mut Environment::new()).unwrap_err();
    assert_eq!(
        err,
        Error::Runtime(RuntimeError::UndefinedVariable {
            name: "x".to_string()
        })
    );
    assert_eq!(expr.interpreted_count(), 0);
}
