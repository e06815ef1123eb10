//! Expressions that switch from interpretation to compiled code.

use alloc::boxed::Box;

use super::{CompilationOptions, CompilerMode, Error};
use crate::{
    ast::Node,
    compiler::BytecodeCompiler,
    evaluator::Environment,
    values::Value,
    vm::{Code, VM},
};

/// An operator tree together with its compilation state.
///
/// Every run either interprets the tree, which lets its nodes observe operand
/// kinds, or executes bytecode compiled from those observations. When and
/// whether the switch happens is governed by [`CompilationOptions`].
///
/// # Example
///
/// ```
/// use spry_core::api::{CompilationOptions, CompiledExpression, CompilerMode};
/// use spry_core::ast::{ArithmeticOp, Literal, OperatorNode, VariableRef};
/// use spry_core::evaluator::Environment;
/// use spry_core::values::Value;
///
/// let tree = OperatorNode::binary(ArithmeticOp::Mul, VariableRef::new("x"), Literal::new(2));
/// let mut expr = CompiledExpression::new(tree).with_options(CompilationOptions {
///     mode: CompilerMode::Immediate,
///     ..CompilationOptions::default()
/// });
///
/// let mut env = Environment::new();
/// for x in 1..=3 {
///     env.set("x", x);
///     assert_eq!(expr.run(&mut env).unwrap(), Value::Int32(x * 2));
/// }
/// assert!(expr.compiled_code().is_some());
/// ```
pub struct CompiledExpression {
    root: Box<dyn Node>,
    options: CompilationOptions,
    compiled: Option<Code>,
    /// Successful interpretations since the last compilation or fallback.
    interpreted_count: usize,
    failed_attempts: usize,
}

impl CompiledExpression {
    pub fn new(root: impl Node + 'static) -> Self {
        Self::from_boxed(Box::new(root))
    }

    pub fn from_boxed(root: Box<dyn Node>) -> Self {
        Self {
            root,
            options: CompilationOptions::default(),
            compiled: None,
            interpreted_count: 0,
            failed_attempts: 0,
        }
    }

    pub fn with_options(mut self, options: CompilationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    pub fn root(&self) -> &dyn Node {
        self.root.as_ref()
    }

    pub fn compiled_code(&self) -> Option<&Code> {
        self.compiled.as_ref()
    }

    pub fn interpreted_count(&self) -> usize {
        self.interpreted_count
    }

    pub fn failed_attempts(&self) -> usize {
        self.failed_attempts
    }

    /// Evaluates the expression.
    ///
    /// Compiled code runs when available. If it fails in
    /// [`CompilerMode::Mixed`], the code is discarded and the tree is
    /// interpreted instead; in other modes the failure is returned.
    pub fn run(&mut self, env: &mut Environment) -> Result<Value, Error> {
        if let Some(code) = &self.compiled {
            match VM::execute(code, env) {
                Ok(value) => return Ok(value),
                Err(err) if self.options.mode == CompilerMode::Mixed => {
                    tracing::warn!(
                        error = %err,
                        expression = %self.root,
                        "compiled code failed, reverting to interpretation"
                    );
                    self.compiled = None;
                    self.interpreted_count = 0;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let value = self.root.evaluate(env)?;
        self.interpreted_count += 1;
        if self.should_compile() {
            self.compile();
        }
        Ok(value)
    }

    fn should_compile(&self) -> bool {
        match self.options.mode {
            CompilerMode::Off => false,
            CompilerMode::Immediate => self.interpreted_count > 1,
            CompilerMode::Mixed => self.interpreted_count > self.options.interpreted_count_threshold,
        }
    }

    /// Attempts compilation now, regardless of mode. Returns whether compiled
    /// code is available afterwards.
    ///
    /// Each failed attempt is counted; once `failed_attempts_threshold` is
    /// reached no further attempts are made.
    pub fn compile(&mut self) -> bool {
        if self.compiled.is_some() {
            return true;
        }
        if self.failed_attempts >= self.options.failed_attempts_threshold {
            return false;
        }
        if !self.root.is_compilable() {
            self.failed_attempts += 1;
            tracing::debug!(
                expression = %self.root,
                failed_attempts = self.failed_attempts,
                "expression is not compilable yet"
            );
            return false;
        }
        match BytecodeCompiler::compile(self.root.as_ref()) {
            Ok(code) => {
                tracing::debug!(expression = %self.root, "switched to compiled code");
                self.compiled = Some(code);
                true
            }
            Err(err) => {
                self.failed_attempts += 1;
                tracing::debug!(
                    expression = %self.root,
                    error = %err,
                    failed_attempts = self.failed_attempts,
                    "compilation failed"
                );
                false
            }
        }
    }

    /// Discards compiled code; the next run interprets the tree.
    pub fn revert_to_interpreted(&mut self) {
        self.compiled = None;
        self.interpreted_count = 0;
    }
}

impl core::fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("root", &self.root)
            .field("mode", &self.options.mode)
            .field("compiled", &self.compiled.is_some())
            .field("interpreted_count", &self.interpreted_count)
            .field("failed_attempts", &self.failed_attempts)
            .finish()
    }
}
