use crate::context::{generate_function, FunctionCode};
use serde::{Deserialize, Serialize};
use stackgen_ir::diagnostics::{Diagnostic, DiagnosticManager};
use stackgen_ir::error::{Error, ErrorMsg, Result};
use stackgen_ir::{debug, warn, Body, DeclId, DeclTable, InstKind, Span};

/// What the driver does when a function fails to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the diagnostic and continue with the next function.
    #[default]
    Skip,
    /// Stop at the first failing function.
    Abort,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone)]
pub struct ModuleOutput {
    pub functions: Vec<FunctionCode>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleOutput {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Function bodies in generation order. Call immediates are still missing;
    /// the link stage inserts them at each function's relocations.
    pub fn code_section(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.functions.iter().map(|f| f.body.len()).sum());
        for function in &self.functions {
            out.extend_from_slice(&function.body);
        }
        out
    }
}

/// Generates every function of a declaration table and hands relocations to
/// each declaration's link data.
pub struct ModuleCodegen<'a> {
    decls: &'a mut DeclTable,
    options: CodegenOptions,
    diagnostics: DiagnosticManager,
}

impl<'a> ModuleCodegen<'a> {
    pub fn new(decls: &'a mut DeclTable, options: CodegenOptions) -> Self {
        Self {
            decls,
            options,
            diagnostics: DiagnosticManager::new(),
        }
    }

    pub fn run(mut self) -> Result<ModuleOutput> {
        let mut functions = Vec::new();
        let ids = self.decls.ids().collect::<Vec<_>>();

        for id in ids {
            let decl = self.decls.decl(id);
            if decl.body.is_none() {
                continue;
            }
            let name = decl.name.clone();

            let generated = generate_function(id, decl).and_then(|code| {
                self.check_call_targets(id, &code)?;
                Ok(code)
            });
            match generated {
                Ok(code) => {
                    self.decls
                        .link_mut(id)
                        .relocs
                        .extend(code.relocs.iter().copied());
                    functions.push(code);
                }
                Err(err) => {
                    self.diagnostics
                        .add_diagnostic(err.to_diagnostic().with_source_context(name.clone()));
                    match self.options.failure_policy {
                        FailurePolicy::Skip => {
                            warn!("skipping '{}': {}", name, err);
                        }
                        FailurePolicy::Abort => return Err(err),
                    }
                }
            }
        }

        debug!(
            "generated {} functions, {} failed",
            functions.len(),
            self.diagnostics.error_count()
        );
        Ok(ModuleOutput {
            functions,
            diagnostics: self.diagnostics.into_vec(),
        })
    }

    /// Every call must name a declaration of this table before its
    /// relocations can be handed to the linker.
    fn check_call_targets(&self, id: DeclId, code: &FunctionCode) -> Result<()> {
        for reloc in &code.relocs {
            if self.decls.get(reloc.target).is_some() {
                continue;
            }
            let decl = self.decls.decl(id);
            let span = decl
                .body
                .as_ref()
                .and_then(|body| call_span(body, reloc.target))
                .unwrap_or(decl.span);
            return Err(Error::Codegen(ErrorMsg::new(
                span,
                format!("call to unknown declaration {}", reloc.target),
            )));
        }
        Ok(())
    }
}

fn call_span(body: &Body, target: DeclId) -> Option<Span> {
    body.instructions().find_map(|(_, inst)| match &inst.kind {
        InstKind::Call { callee, .. }
            if body.constant(*callee).and_then(|value| value.as_function()) == Some(target) =>
        {
            Some(inst.span)
        }
        _ => None,
    })
}

pub fn generate_module(decls: &mut DeclTable, options: CodegenOptions) -> Result<ModuleOutput> {
    ModuleCodegen::new(decls, options).run()
}
