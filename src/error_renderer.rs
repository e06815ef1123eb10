//! Error rendering using miette
//!
//! Errors carry a stable diagnostic code and, for some variants, a help
//! message. These functions render them the way a terminal user sees them.

use std::io::Write;

use miette::{GraphicalReportHandler, GraphicalTheme};

use crate::Error;

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use spry::{CompiledExpression, Environment, Literal, OperatorNode, ArithmeticOp, render_error};
///
/// let mut expr = CompiledExpression::new(OperatorNode::binary(
///     ArithmeticOp::Div,
///     Literal::new(1),
///     Literal::new(0),
/// ));
/// if let Err(e) = expr.run(&mut Environment::new()) {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to(error, &mut std::io::stderr()).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    writer.write_all(render(error, true).as_bytes())
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    render(error, true)
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    render(error, false)
}

fn render(error: &Error, use_color: bool) -> String {
    let theme = if use_color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme);
    let mut out = String::new();
    if handler.render_report(&mut out, error).is_err() {
        // Fall back to the plain message
        out = format!("{}\n", error);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use spry_core::evaluator::RuntimeError;

    #[test]
    fn test_render_includes_code_and_message() {
        let err = Error::Runtime(RuntimeError::DivisionByZero);
        let rendered = render_error_to_string_no_color(&err);
        assert!(rendered.contains("spry::runtime"), "{}", rendered);
        assert!(rendered.contains("division by zero"), "{}", rendered);
    }

    #[test]
    fn test_render_includes_help() {
        let err = Error::Compilation(spry_core::compiler::CompileError::TooManyConstants);
        let rendered = render_error_to_string_no_color(&err);
        assert!(rendered.contains("interpret the expression"), "{}", rendered);
    }
}
