//! Command implementations

use crate::config::{OutputFormat, StackgenConfig};
use crate::diagnostics::report_diagnostics;
use crate::emit::render;
use crate::Result;
use stackgen_ir::IrModule;
use stackgen_wasm::ModuleCodegen;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Arguments of one code generation run
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub input: PathBuf,
    /// Standard output when absent
    pub output: Option<PathBuf>,
    /// Overrides the configured output format
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSummary {
    pub generated: usize,
    pub failed: usize,
}

pub fn generate_command(args: &GenerateArgs, config: &StackgenConfig) -> Result<GenerateSummary> {
    let source = std::fs::read_to_string(&args.input)?;
    let module = IrModule::from_json(&source)?;
    info!(
        "Loaded {} declarations from {}",
        module.decls.len(),
        args.input.display()
    );

    let mut decls = module.into_table();
    let output = ModuleCodegen::new(&mut decls, config.codegen.clone()).run()?;
    report_diagnostics(&output.diagnostics);

    let format = args.format.unwrap_or(config.output.format);
    let bytes = render(&output, &decls, format)?;
    write_output(args.output.as_deref(), &bytes)?;

    let summary = GenerateSummary {
        generated: output.functions.len(),
        failed: output.diagnostics.len(),
    };
    debug!(?summary, "code generation finished");
    Ok(summary)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
