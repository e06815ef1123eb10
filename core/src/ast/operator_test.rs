use core::{cell::Cell, fmt};
use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::{
    ast::{ArithmeticOp, ExitDescriptor, Literal, Node, Observation, OperatorNode, VariableRef},
    compiler::{BytecodeCompiler, CompileError},
    evaluator::{Environment, EvalError},
    values::{Primitive, PrimitiveKind, Value},
    vm::{Instruction, VM},
};

use ArithmeticOp::*;

#[test]
fn test_display() {
    let node = OperatorNode::binary(
        Mul,
        VariableRef::new("price"),
        OperatorNode::unary(Sub, Literal::new(2.5f64)),
    );
    assert_eq!(node.to_string(), "(#price * (-2.5))");

    let text = OperatorNode::binary(Mul, Literal::new("ab"), Literal::new(3i64));
    assert_eq!(text.to_string(), "(\"ab\" * 3L)");
}

#[test]
fn test_accessors() {
    let node = OperatorNode::binary(Mod, Literal::new(7), Literal::new(2));
    assert_eq!(node.op(), Mod);
    assert_eq!(node.left().to_string(), "7");
    assert_eq!(node.right().map(|r| r.to_string()), Some("2".to_string()));
    assert_eq!(node.observation(), Observation::Pending);
    assert_eq!(node.exit_descriptor(), None);

    let unary = OperatorNode::unary(Sub, Literal::new(1));
    assert!(unary.right().is_none());
}

#[test]
fn test_exit_descriptor_follows_observation() {
    let mut node = OperatorNode::binary(Sub, Literal::new(1.0f32), Literal::new(0.5f32));
    node.evaluate(&mut Environment::new()).unwrap();
    assert_eq!(
        node.exit_descriptor(),
        Some(ExitDescriptor::Primitive(PrimitiveKind::Float32))
    );
}

#[test]
fn test_emit_pushes_one_descriptor() {
    let inner = OperatorNode::binary(Add, VariableRef::new("a"), VariableRef::new("b"));
    let mut node = OperatorNode::binary(Mul, inner, VariableRef::new("c"));
    let mut env = Environment::new();
    env.set("a", 1i64);
    env.set("b", 2i64);
    env.set("c", 3i64);
    assert_eq!(node.evaluate(&mut env).unwrap(), Value::Int64(9));

    let mut compiler = BytecodeCompiler::new();
    node.emit(&mut compiler).unwrap();

    assert_eq!(compiler.code_flow().len(), 1);
    assert_eq!(
        compiler.code_flow().last_descriptor(),
        Some(ExitDescriptor::Primitive(PrimitiveKind::Int64))
    );
    // The inner result is already raw; only variables are unboxed.
    use Instruction::*;
    assert_eq!(
        compiler.instructions(),
        &[
            LoadVariable(0),
            Unbox(b'J'),
            LoadVariable(1),
            Unbox(b'J'),
            LongBinOp(b'+'),
            LoadVariable(2),
            Unbox(b'J'),
            LongBinOp(b'*'),
        ]
    );
}

#[test]
fn test_child_must_be_compilable() {
    // Both operands are int64, but the right one is a promoted pair that was
    // never observed as a single kind.
    let mut env = Environment::new();
    env.set("x", 1);
    let promoted = OperatorNode::binary(Mul, VariableRef::new("x"), Literal::new(3i64));
    let mut node = OperatorNode::binary(Add, Literal::new(1i64), promoted);
    node.evaluate(&mut env).unwrap();

    assert_eq!(node.descriptor(), Some(PrimitiveKind::Int64));
    assert!(!node.right().unwrap().is_compilable());
    assert!(!node.is_compilable());

    let mut compiler = BytecodeCompiler::new();
    assert!(matches!(
        node.emit(&mut compiler),
        Err(CompileError::NotCompilable { .. })
    ));
}

#[test]
fn test_unevaluated_variable_blocks_compilation() {
    let node = OperatorNode::binary(Mul, VariableRef::new("x"), Literal::new(2));
    assert!(!node.is_compilable());
}

/// An int32 constant that counts how often its compilability is queried.
#[derive(Debug)]
struct CountingLeaf {
    queries: Rc<Cell<usize>>,
}

impl fmt::Display for CountingLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "counted")
    }
}

impl Node for CountingLeaf {
    fn evaluate(&mut self, _env: &mut Environment) -> Result<Value, EvalError> {
        Ok(Value::Int32(1))
    }

    fn is_compilable(&self) -> bool {
        self.queries.set(self.queries.get() + 1);
        true
    }

    fn emit(&self, compiler: &mut BytecodeCompiler) -> Result<(), CompileError> {
        compiler.emit_constant(Primitive::Int32(1))?;
        compiler
            .code_flow_mut()
            .push_descriptor(ExitDescriptor::Primitive(PrimitiveKind::Int32));
        Ok(())
    }

    fn exit_descriptor(&self) -> Option<ExitDescriptor> {
        Some(ExitDescriptor::Primitive(PrimitiveKind::Int32))
    }
}

#[test]
fn test_deep_chain_checks_compilability_once() {
    let queries = Rc::new(Cell::new(0));
    let mut node = OperatorNode::binary(
        Add,
        CountingLeaf {
            queries: Rc::clone(&queries),
        },
        Literal::new(1),
    );
    for _ in 0..100 {
        node = OperatorNode::binary(Add, node, Literal::new(1));
    }
    let mut env = Environment::new();
    assert_eq!(node.evaluate(&mut env).unwrap(), Value::Int32(102));

    let code = BytecodeCompiler::compile(&node).unwrap();
    assert_eq!(queries.get(), 1);
    assert_eq!(VM::execute(&code, &env).unwrap(), Value::Int32(102));
}

#[test]
fn test_emit_checks_child_exit_kinds() {
    // The operator remembers int32 while `x` last read an int64.
    let mut node = OperatorNode::binary(Mul, VariableRef::new("x"), Literal::new(2));
    let mut env = Environment::new();
    env.set("x", 3);
    node.evaluate(&mut env).unwrap();
    env.set("x", 3i64);
    node.evaluate(&mut env).unwrap();
    assert_eq!(node.descriptor(), Some(PrimitiveKind::Int32));

    let mut compiler = BytecodeCompiler::new();
    assert!(matches!(
        node.emit(&mut compiler),
        Err(CompileError::NotCompilable { .. })
    ));
    assert!(compiler.instructions().is_empty());
}
