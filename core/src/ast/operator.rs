use alloc::boxed::Box;
use alloc::string::ToString;
use core::fmt;

use crate::{
    ast::{ArithmeticOp, ExitDescriptor, Node},
    compiler::{BytecodeCompiler, CompileError},
    evaluator::{Environment, EvalError, operators},
    values::{PrimitiveKind, Value},
};

/// What interpretation has established about an operator's operands.
///
/// The state only moves forward: `Pending` becomes `Dynamic` or
/// `Primitive` on the first evaluation, and a `Primitive` observation is
/// kept until another evaluation observes a different primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Observation {
    /// Never evaluated.
    #[default]
    Pending,
    /// Evaluated, but never with both operands of one primitive kind.
    Dynamic,
    /// Both operands were observed as exactly this kind.
    Primitive(PrimitiveKind),
}

impl Observation {
    /// The primitive kind emitted code would operate on.
    pub fn descriptor(self) -> Option<PrimitiveKind> {
        match self {
            Observation::Primitive(kind) => Some(kind),
            Observation::Pending | Observation::Dynamic => None,
        }
    }

    fn record(self, kind: Option<PrimitiveKind>) -> Self {
        match (kind, self) {
            (Some(kind), _) => Observation::Primitive(kind),
            (None, Observation::Primitive(kind)) => Observation::Primitive(kind),
            (None, Observation::Pending | Observation::Dynamic) => Observation::Dynamic,
        }
    }
}

/// An arithmetic operator applied to one or two operands.
pub struct OperatorNode {
    op: ArithmeticOp,
    left: Box<dyn Node>,
    right: Option<Box<dyn Node>>,
    observation: Observation,
}

impl OperatorNode {
    pub fn binary(op: ArithmeticOp, left: impl Node + 'static, right: impl Node + 'static) -> Self {
        Self::from_boxed(op, Box::new(left), Some(Box::new(right)))
    }

    pub fn unary(op: ArithmeticOp, operand: impl Node + 'static) -> Self {
        Self::from_boxed(op, Box::new(operand), None)
    }

    pub fn from_boxed(op: ArithmeticOp, left: Box<dyn Node>, right: Option<Box<dyn Node>>) -> Self {
        Self {
            op,
            left,
            right,
            observation: Observation::Pending,
        }
    }

    pub fn op(&self) -> ArithmeticOp {
        self.op
    }

    pub fn left(&self) -> &dyn Node {
        &*self.left
    }

    pub fn right(&self) -> Option<&dyn Node> {
        self.right.as_deref()
    }

    pub fn observation(&self) -> Observation {
        self.observation
    }

    pub fn descriptor(&self) -> Option<PrimitiveKind> {
        self.observation.descriptor()
    }

    fn observe(&mut self, kind: Option<PrimitiveKind>) {
        let next = self.observation.record(kind);
        if next != self.observation {
            tracing::debug!(
                op = %self.op,
                from = ?self.observation,
                to = ?next,
                "operator observation changed"
            );
        }
        self.observation = next;
    }

    /// The kind this node would operate on, judged from this node and its
    /// children's exit descriptors only.
    fn emittable_kind(&self) -> Option<PrimitiveKind> {
        let kind = self.observation.descriptor()?;
        // A sticky observation may be older than what the children saw last.
        let fits = |node: &dyn Node| node.exit_descriptor().map(ExitDescriptor::kind) == Some(kind);
        let shape_fits = match &self.right {
            Some(right) => fits(&**right),
            None => self.op.has_unary_form(),
        };
        (fits(&*self.left) && shape_fits).then_some(kind)
    }

    fn evaluate_inner(&mut self, env: &mut Environment) -> Result<Value, EvalError> {
        let left = self.left.evaluate(env)?;
        let Some(right_node) = self.right.as_mut() else {
            // Unary forms record the operand's own kind.
            let kind = if self.op.has_unary_form() {
                left.primitive_kind()
            } else {
                None
            };
            self.observe(kind);
            return operators::eval_unary(self.op, &left);
        };
        let right = right_node.evaluate(env)?;

        // Only operands of exactly the same primitive kind prove a descriptor;
        // a promoted pair such as int32 * int64 does not.
        let kind = match (left.primitive_kind(), right.primitive_kind()) {
            (Some(l), Some(r)) if l == r => Some(l),
            _ => None,
        };
        self.observe(kind);

        operators::eval_binary(self.op, left, right, env)
    }
}

impl Node for OperatorNode {
    fn evaluate(&mut self, env: &mut Environment) -> Result<Value, EvalError> {
        env.enter()?;
        let result = self.evaluate_inner(env);
        env.exit();
        result
    }

    fn is_compilable(&self) -> bool {
        self.emittable_kind().is_some()
            && self.left.is_compilable()
            && self.right.as_ref().is_none_or(|right| right.is_compilable())
    }

    fn emit(&self, compiler: &mut BytecodeCompiler) -> Result<(), CompileError> {
        // Children check themselves as they emit.
        let Some(kind) = self.emittable_kind() else {
            return Err(CompileError::NotCompilable {
                node: self.to_string(),
            });
        };

        emit_operand(&*self.left, kind, compiler)?;
        match &self.right {
            Some(right) => {
                emit_operand(&**right, kind, compiler)?;
                compiler.emit_binary(self.op, kind);
            }
            None => match self.op {
                ArithmeticOp::Add => {}
                ArithmeticOp::Sub => compiler.emit_negate(kind),
                ArithmeticOp::Mul | ArithmeticOp::Div | ArithmeticOp::Mod => {
                    return Err(CompileError::NotCompilable {
                        node: self.to_string(),
                    });
                }
            },
        }

        compiler
            .code_flow_mut()
            .push_descriptor(ExitDescriptor::Primitive(kind));
        Ok(())
    }

    fn exit_descriptor(&self) -> Option<ExitDescriptor> {
        self.observation.descriptor().map(ExitDescriptor::Primitive)
    }
}

/// Emits an operand and converts it to a raw `kind` if it was left boxed.
fn emit_operand(
    node: &dyn Node,
    kind: PrimitiveKind,
    compiler: &mut BytecodeCompiler,
) -> Result<(), CompileError> {
    node.emit(compiler)?;
    let exit = compiler.code_flow_mut().pop_descriptor();
    debug_assert_eq!(exit, node.exit_descriptor(), "code flow out of sync at {}", node);
    if !exit.is_some_and(ExitDescriptor::is_primitive) {
        compiler.emit_unbox(kind);
    }
    Ok(())
}

impl fmt::Debug for OperatorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorNode")
            .field("op", &self.op)
            .field("left", &self.left)
            .field("right", &self.right)
            .field("observation", &self.observation)
            .finish()
    }
}

impl fmt::Display for OperatorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            Some(right) => write!(f, "({} {} {})", self.left, self.op, right),
            None => write!(f, "({}{})", self.op, self.left),
        }
    }
}
