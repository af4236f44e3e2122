//! Diagnostic and error reporting utilities

use crate::Result;
use miette::Diagnostic as MietteDiagnostic;
use stackgen_ir::diagnostics::Diagnostic;
use thiserror::Error;

/// Install miette as the global error handler
pub fn setup_error_reporting() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .map_err(|e| crate::CliError::Config(format!("Failed to setup error reporting: {}", e)))?;

    Ok(())
}

/// A function the code generator could not lower
#[derive(Error, Debug, MietteDiagnostic)]
#[error("cannot generate '{function}': {message} (at {location})")]
#[diagnostic(
    code(stackgen::codegen),
    help("the function was left out of the output; other functions are unaffected")
)]
pub struct CodegenReport {
    pub function: String,
    pub message: String,
    pub location: String,
}

impl From<&Diagnostic> for CodegenReport {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            function: diagnostic
                .source_context
                .clone()
                .unwrap_or_else(|| "<module>".to_string()),
            message: diagnostic.message.clone(),
            location: diagnostic
                .span
                .map(|span| span.to_string())
                .unwrap_or_else(|| "unknown location".to_string()),
        }
    }
}

/// Print codegen diagnostics through the installed miette handler
pub fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let report = miette::Report::new(CodegenReport::from(diagnostic));
        eprintln!("{:?}", report);
    }
}
