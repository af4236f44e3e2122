use crate::constant::emit_constant;
use crate::opcodes::{
    push_local, push_uleb, write_padded_u32, END, LOCAL_GET, PADDED_U32_WIDTH, RELOC_WIDTH,
};
use crate::signature::encode_func_type;
use crate::types::{val_type, val_type_byte};
use stackgen_ir::error::{Error, ErrorMsg, Result};
use stackgen_ir::{debug, invariant, Body, Decl, DeclId, InstId, InstKind, Reloc, Span};
use std::collections::HashMap;
use wasm_encoder::ValType;

/// How a lowered instruction's value is obtained again by later consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WValue {
    /// Nothing to push; either there is no value or it already sits on the stack.
    None,
    /// Index into the combined argument and local space.
    Local(u32),
    /// A literal, re-emitted at each use.
    Constant(InstId),
    /// Structured control-flow block label.
    BlockIdx(u32),
}

/// Bytes generated for one function, ready for the module assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCode {
    pub decl: DeclId,
    pub name: String,
    /// Encoded function type entry.
    pub func_type: Vec<u8>,
    /// Size prefix, local declarations, instructions and the end marker.
    pub body: Vec<u8>,
    /// Call sites whose function index is written by the linker.
    pub relocs: Vec<Reloc>,
}

/// Per-function generation state. One context generates exactly one function.
pub struct Context<'a> {
    pub(crate) decl_id: DeclId,
    pub(crate) decl: &'a Decl,
    pub(crate) func_type: Vec<u8>,
    pub(crate) code: Vec<u8>,
    pub(crate) values: HashMap<InstId, WValue>,
    pub(crate) local_index: u32,
    pub(crate) relocs: Vec<Reloc>,
    pub(crate) err_msg: Option<ErrorMsg>,
}

impl<'a> Context<'a> {
    pub fn new(decl_id: DeclId, decl: &'a Decl) -> Self {
        Self {
            decl_id,
            decl,
            func_type: Vec::new(),
            code: Vec::new(),
            values: HashMap::new(),
            local_index: 0,
            relocs: Vec::new(),
            err_msg: None,
        }
    }

    pub fn func_type(&self) -> &[u8] {
        &self.func_type
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn relocs(&self) -> &[Reloc] {
        &self.relocs
    }

    /// The error record attached by the last failure, if any.
    pub fn err_msg(&self) -> Option<&ErrorMsg> {
        self.err_msg.as_ref()
    }

    pub(crate) fn fail(&mut self, span: Span, message: impl Into<String>) -> Error {
        self.fail_with(ErrorMsg::new(span, message))
    }

    pub(crate) fn fail_with(&mut self, msg: ErrorMsg) -> Error {
        self.err_msg = Some(msg.clone());
        Error::Codegen(msg)
    }

    pub(crate) fn body(&mut self) -> Result<&'a Body> {
        let decl = self.decl;
        match decl.body.as_ref() {
            Some(body) => Ok(body),
            None => Err(self.fail(
                decl.span,
                format!("function '{}' has no body to generate", decl.name),
            )),
        }
    }

    /// Value handle of an operand.
    ///
    /// Literals resolve to a constant reference without touching the map. Any
    /// other operand must have been lowered already.
    pub(crate) fn resolve_inst(&self, body: &Body, id: InstId) -> WValue {
        let Some(inst) = body.get(id) else {
            panic!(
                "IR invariant violated: {} used before its definition in '{}'",
                id, self.decl.name
            );
        };
        if inst.kind.is_constant() {
            return WValue::Constant(id);
        }
        match self.values.get(&id) {
            Some(value) => *value,
            None => panic!(
                "IR invariant violated: {} used before its definition in '{}'",
                id, self.decl.name
            ),
        }
    }

    /// Push the runtime value of `value` onto the operand stack.
    pub(crate) fn emit_value(&mut self, body: &Body, value: WValue) -> Result<()> {
        match value {
            WValue::None | WValue::BlockIdx(_) => Ok(()),
            WValue::Local(index) => {
                push_local(&mut self.code, LOCAL_GET, index);
                Ok(())
            }
            WValue::Constant(id) => {
                emit_constant(&mut self.code, body.inst(id)).map_err(|msg| self.fail_with(msg))
            }
        }
    }

    /// Remember that the bytes following the current position must hold the
    /// function index of `target`.
    pub(crate) fn record_reloc(&mut self, target: DeclId) {
        self.relocs.push(Reloc {
            offset: self.code.len() as u32,
            target,
        });
    }

    /// Encode the declaration's function type into its own buffer.
    pub fn gen_func_type(&mut self) -> Result<()> {
        let decl = self.decl;
        let Some(fn_ty) = decl.fn_ty() else {
            return Err(self.fail(
                decl.span,
                format!("'{}' has non-function type '{}'", decl.name, decl.ty),
            ));
        };
        self.func_type.try_reserve(fn_ty.params.len() + 4)?;
        encode_func_type(&mut self.func_type, fn_ty, decl.span).map_err(|msg| self.fail_with(msg))
    }

    /// Generate the complete function body into the code buffer.
    pub fn gen_func(&mut self) -> Result<()> {
        invariant!(
            self.code.is_empty(),
            "code buffer of '{}' reused for a second generation",
            self.decl.name
        );
        let body = self.body()?;
        self.code.try_reserve(PADDED_U32_WIDTH + 2 + body.len() * 4)?;

        // size prefix, patched once everything after it is known
        self.code.extend_from_slice(&[0; PADDED_U32_WIDTH]);

        let (arg_count, local_count) = self.gen_locals(body)?;
        self.gen_body(body)?;
        self.code.push(END);

        invariant!(
            self.local_index == arg_count + local_count,
            "local index space of '{}' is not dense",
            self.decl.name
        );

        let size = self.code.len() - PADDED_U32_WIDTH + self.relocs.len() * RELOC_WIDTH;
        let Ok(size) = u32::try_from(size) else {
            let decl = self.decl;
            return Err(self.fail(
                decl.span,
                format!("body of '{}' is too large ({} bytes)", decl.name, size),
            ));
        };
        write_padded_u32(&mut self.code[..PADDED_U32_WIDTH], size);

        debug!(
            "generated wasm for '{}': {} bytes, {} locals, {} relocations",
            self.decl.name,
            size,
            local_count,
            self.relocs.len()
        );
        Ok(())
    }

    /// Emit the local declarations table and return the argument and local counts.
    ///
    /// Each stack allocation gets its own `(1, type)` entry, in body order.
    fn gen_locals(&mut self, body: &Body) -> Result<(u32, u32)> {
        let mut arg_count = 0u32;
        let mut locals: Vec<ValType> = Vec::new();
        for (_, inst) in body.instructions() {
            match &inst.kind {
                InstKind::Arg { .. } => arg_count += 1,
                InstKind::Alloc => {
                    let Some(elem) = inst.ty.pointee() else {
                        return Err(self.fail(
                            inst.span,
                            format!("unsupported type '{}' for wasm local", inst.ty),
                        ));
                    };
                    let Some(val_type) = val_type(elem) else {
                        return Err(self.fail(
                            inst.span,
                            format!("unsupported type '{}' for wasm local", elem),
                        ));
                    };
                    locals.push(val_type);
                }
                _ => {}
            }
        }

        if let Some(fn_ty) = self.decl.fn_ty() {
            invariant!(
                arg_count as usize == fn_ty.params.len(),
                "'{}' declares {} parameters but its body has {} arg instructions",
                self.decl.name,
                fn_ty.params.len(),
                arg_count
            );
        }

        let local_count = locals.len() as u32;
        push_uleb(&mut self.code, local_count);
        for val_type in locals {
            push_uleb(&mut self.code, 1);
            self.code.push(val_type_byte(val_type));
        }
        Ok((arg_count, local_count))
    }

    fn gen_body(&mut self, body: &Body) -> Result<()> {
        for (id, inst) in body.instructions() {
            let value = self.gen_inst(body, id, inst)?;
            let previous = self.values.insert(id, value);
            invariant!(previous.is_none(), "{} lowered twice", id);
        }
        Ok(())
    }

    pub fn finish(self) -> FunctionCode {
        FunctionCode {
            decl: self.decl_id,
            name: self.decl.name.clone(),
            func_type: self.func_type,
            body: self.code,
            relocs: self.relocs,
        }
    }
}

/// Generate the type entry and body of one function declaration.
///
/// A failure discards everything produced so far for the function.
pub fn generate_function(decl_id: DeclId, decl: &Decl) -> Result<FunctionCode> {
    let mut ctx = Context::new(decl_id, decl);
    ctx.gen_func_type()?;
    ctx.gen_func()?;
    Ok(ctx.finish())
}
