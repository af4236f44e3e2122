use crate::opcodes::{push_uleb, FUNC_TYPE};
use crate::types::{val_type, val_type_byte};
use stackgen_ir::error::ErrorMsg;
use stackgen_ir::{FnTy, Span};

/// Encode a function type entry: `0x60`, the parameters, then the results.
pub fn encode_func_type(sink: &mut Vec<u8>, fn_ty: &FnTy, span: Span) -> Result<(), ErrorMsg> {
    sink.push(FUNC_TYPE);

    push_uleb(sink, fn_ty.params.len() as u32);
    for param in &fn_ty.params {
        let val_type = val_type(param).ok_or_else(|| {
            ErrorMsg::new(span, format!("unsupported type '{}' for wasm argument", param))
        })?;
        sink.push(val_type_byte(val_type));
    }

    if fn_ty.ret.is_void() {
        push_uleb(sink, 0);
    } else {
        let val_type = val_type(&fn_ty.ret).ok_or_else(|| {
            ErrorMsg::new(
                span,
                format!("unsupported type '{}' for wasm return type", fn_ty.ret),
            )
        })?;
        push_uleb(sink, 1);
        sink.push(val_type_byte(val_type));
    }
    Ok(())
}
