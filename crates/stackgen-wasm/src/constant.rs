use crate::opcodes::{F32_CONST, F64_CONST, I32_CONST, I64_CONST};
use crate::types::val_type;
use stackgen_ir::error::ErrorMsg;
use stackgen_ir::{Inst, InstKind, Ty};
use wasm_encoder::{Encode, ValType};

/// Emit the immediate form of a literal instruction.
///
/// This runs once per use site: literals are never materialized into a local.
/// Unsigned integers are stored with the same bit pattern as the signed
/// immediate the target expects, so `u32::MAX` becomes `i32.const -1`.
pub fn emit_constant(sink: &mut Vec<u8>, inst: &Inst) -> Result<(), ErrorMsg> {
    let InstKind::Constant(value) = &inst.kind else {
        panic!("`{}` instruction is not a literal", inst.kind.tag());
    };
    if matches!(inst.ty, Ty::Void) {
        return Ok(());
    }

    let mismatch = || {
        ErrorMsg::new(
            inst.span,
            format!("constant {} does not fit type '{}'", value, inst.ty),
        )
    };

    match val_type(&inst.ty) {
        Some(ValType::I32) => {
            let imm = if inst.ty.is_signed_int() {
                value.to_signed().and_then(|v| i32::try_from(v).ok())
            } else {
                value
                    .to_unsigned()
                    .and_then(|v| u32::try_from(v).ok())
                    .map(|v| v as i32)
            }
            .ok_or_else(mismatch)?;
            sink.push(I32_CONST);
            imm.encode(sink);
        }
        Some(ValType::I64) => {
            let imm = if inst.ty.is_signed_int() {
                value.to_signed()
            } else {
                value.to_unsigned().map(|v| v as i64)
            }
            .ok_or_else(mismatch)?;
            sink.push(I64_CONST);
            imm.encode(sink);
        }
        Some(ValType::F32) => {
            let imm = value.to_f32().ok_or_else(mismatch)?;
            sink.push(F32_CONST);
            sink.extend_from_slice(&imm.to_bits().to_le_bytes());
        }
        Some(ValType::F64) => {
            let imm = value.to_f64().ok_or_else(mismatch)?;
            sink.push(F64_CONST);
            sink.extend_from_slice(&imm.to_bits().to_le_bytes());
        }
        _ => {
            return Err(ErrorMsg::new(
                inst.span,
                format!("unsupported type '{}' for wasm constant", inst.ty),
            ))
        }
    }
    Ok(())
}
