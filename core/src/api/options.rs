//! Configuration options for evaluation and adaptive compilation.

/// Configuration options for expression execution.
///
/// These options control resource limits during evaluation. They are carried
/// by the [`Environment`](crate::evaluator::Environment).
///
/// # Example
///
/// ```
/// use spry_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_depth: 500,
///     max_text_length: Some(64 * 1024),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum operator nesting depth (for recursion protection).
    ///
    /// Default: 1000
    pub max_depth: usize,

    /// Maximum length in bytes of text produced by repetition or
    /// concatenation.
    ///
    /// Set to `None` for no limit beyond what memory allows.
    ///
    /// Default: None
    pub max_text_length: Option<usize>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_text_length: None,
        }
    }
}

/// When a [`CompiledExpression`](crate::api::CompiledExpression) switches
/// from interpreting its tree to running bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompilerMode {
    /// Always interpret.
    #[default]
    Off,

    /// Compile as soon as the tree has been interpreted more than once.
    /// Failures of compiled code are reported to the caller.
    Immediate,

    /// Compile after a number of interpretations. When compiled code fails,
    /// discard it and go back to interpreting.
    Mixed,
}

/// Configuration options for adaptive compilation.
///
/// # Example
///
/// ```
/// use spry_core::api::{CompilationOptions, CompilerMode};
///
/// let options = CompilationOptions {
///     mode: CompilerMode::Mixed,
///     interpreted_count_threshold: 10,
///     ..CompilationOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CompilationOptions {
    /// Default: [`CompilerMode::Off`]
    pub mode: CompilerMode,

    /// Number of interpretations in [`CompilerMode::Mixed`] after which
    /// compilation is attempted.
    ///
    /// Default: 100
    pub interpreted_count_threshold: usize,

    /// Number of failed compilation attempts after which the expression stops
    /// trying.
    ///
    /// Default: 100
    pub failed_attempts_threshold: usize,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            mode: CompilerMode::Off,
            interpreted_count_threshold: 100,
            failed_attempts_threshold: 100,
        }
    }
}
