use crate::context::{Context, WValue};
use crate::opcodes::{push_local, CALL, F32_ADD, F64_ADD, I32_ADD, I64_ADD, LOCAL_SET};
use crate::types::val_type;
use stackgen_ir::error::Result;
use stackgen_ir::{invariant, trace, Body, Inst, InstId, InstKind};
use wasm_encoder::ValType;

impl<'a> Context<'a> {
    /// Lower one instruction of the main block and return its value handle.
    pub(crate) fn gen_inst(&mut self, body: &Body, id: InstId, inst: &Inst) -> Result<WValue> {
        trace!("lowering {} = {} : {}", id, inst.kind.tag(), inst.ty);
        match &inst.kind {
            InstKind::Arg { index } => Ok(self.gen_arg(*index)),
            InstKind::Alloc => Ok(self.gen_alloc()),
            InstKind::Load { ptr } => self.gen_load(body, *ptr),
            InstKind::Store { ptr, value } => self.gen_store(body, *ptr, *value),
            InstKind::Add { lhs, rhs } => self.gen_add(body, inst, *lhs, *rhs),
            InstKind::Call { callee, args } => self.gen_call(body, inst, *callee, args),
            InstKind::Ret { operand } => self.gen_ret(body, *operand),
            InstKind::RetVoid | InstKind::DbgStmt { .. } => Ok(WValue::None),
            other => Err(self.fail(
                inst.span,
                format!("TODO: implement wasm lowering for instruction '{}'", other.tag()),
            )),
        }
    }

    fn gen_arg(&mut self, index: u32) -> WValue {
        invariant!(
            index == self.local_index,
            "argument {} of '{}' reached out of declaration order",
            index,
            self.decl.name
        );
        self.local_index += 1;
        WValue::Local(self.local_index - 1)
    }

    /// The slot itself was declared by the locals table.
    fn gen_alloc(&mut self) -> WValue {
        self.local_index += 1;
        WValue::Local(self.local_index - 1)
    }

    /// The loaded value stays on the stack, so consumers push nothing for it.
    fn gen_load(&mut self, body: &Body, ptr: InstId) -> Result<WValue> {
        let operand = self.resolve_inst(body, ptr);
        self.emit_value(body, operand)?;
        Ok(WValue::None)
    }

    fn gen_store(&mut self, body: &Body, ptr: InstId, value: InstId) -> Result<WValue> {
        let lhs = self.resolve_inst(body, ptr);
        let rhs = self.resolve_inst(body, value);
        self.emit_value(body, rhs)?;

        let WValue::Local(index) = lhs else {
            panic!(
                "IR invariant violated: store through {:?} in '{}' is not a local slot",
                lhs, self.decl.name
            );
        };
        push_local(&mut self.code, LOCAL_SET, index);
        Ok(WValue::None)
    }

    fn gen_add(&mut self, body: &Body, inst: &Inst, lhs: InstId, rhs: InstId) -> Result<WValue> {
        let lhs = self.resolve_inst(body, lhs);
        let rhs = self.resolve_inst(body, rhs);
        self.emit_value(body, lhs)?;
        self.emit_value(body, rhs)?;

        let opcode = match val_type(&inst.ty) {
            Some(ValType::I32) => I32_ADD,
            Some(ValType::I64) => I64_ADD,
            Some(ValType::F32) => F32_ADD,
            Some(ValType::F64) => F64_ADD,
            _ => {
                return Err(self.fail(
                    inst.span,
                    format!("TODO: implement wasm add for type '{}'", inst.ty),
                ))
            }
        };
        self.code.push(opcode);
        Ok(WValue::None)
    }

    /// The callee index is left out; the linker writes it where the
    /// relocation points.
    fn gen_call(
        &mut self,
        body: &Body,
        inst: &Inst,
        callee: InstId,
        args: &[InstId],
    ) -> Result<WValue> {
        self.resolve_inst(body, callee);
        let Some(target) = body.constant(callee).and_then(|value| value.as_function()) else {
            return Err(self.fail(
                inst.span,
                format!(
                    "TODO: implement wasm indirect call through '{}'",
                    body.inst(callee).kind.tag()
                ),
            ));
        };

        for arg in args {
            let value = self.resolve_inst(body, *arg);
            self.emit_value(body, value)?;
        }

        self.code.push(CALL);
        self.record_reloc(target);
        Ok(WValue::None)
    }

    /// Falling off the end of the body with the operand on the stack returns it.
    fn gen_ret(&mut self, body: &Body, operand: InstId) -> Result<WValue> {
        let value = self.resolve_inst(body, operand);
        self.emit_value(body, value)?;
        Ok(WValue::None)
    }
}
