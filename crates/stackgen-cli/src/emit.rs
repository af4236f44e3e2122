//! Output writers for generated modules

use crate::config::OutputFormat;
use crate::Result;
use itertools::Itertools;
use stackgen_ir::DeclTable;
use stackgen_wasm::{BodyReader, FunctionCode, ModuleOutput};

pub fn render(output: &ModuleOutput, decls: &DeclTable, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Binary => Ok(output.code_section()),
        OutputFormat::Hex => Ok(render_hex(output, decls).into_bytes()),
        OutputFormat::Listing => Ok(render_listing(output)?.into_bytes()),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).join("")
}

fn render_relocs(function: &FunctionCode, decls: &DeclTable) -> String {
    function
        .relocs
        .iter()
        .map(|reloc| {
            let target = decls
                .get(reloc.target)
                .map(|decl| decl.name.clone())
                .unwrap_or_else(|| reloc.target.to_string());
            format!("{}->{}", reloc.offset, target)
        })
        .join(",")
}

pub fn render_hex(output: &ModuleOutput, decls: &DeclTable) -> String {
    let mut out = String::new();
    for function in &output.functions {
        out.push_str(&format!(
            "{}: type={} body={} relocs=[{}]\n",
            function.name,
            hex(&function.func_type),
            hex(&function.body),
            render_relocs(function, decls)
        ));
    }
    out
}

pub fn render_listing(output: &ModuleOutput) -> Result<String> {
    let mut out = String::new();
    for function in &output.functions {
        let decoded = BodyReader::new(&function.body, &function.relocs).decode()?;
        out.push_str(&format!("{}:\n", function.name));
        for line in decoded.listing() {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
    }
    Ok(out)
}
