use stackgen_ir::Ty;
use wasm_encoder::ValType;

/// Value type a scalar IR type lowers to, or `None` when the target has no
/// representation for it.
pub fn val_type(ty: &Ty) -> Option<ValType> {
    match ty {
        Ty::Float { bits: 32 } => Some(ValType::F32),
        Ty::Float { bits: 64 } => Some(ValType::F64),
        Ty::Int { bits: 32, .. } => Some(ValType::I32),
        Ty::Int { bits: 64, .. } => Some(ValType::I64),
        _ => None,
    }
}

/// Single-byte tag of a numeric value type.
pub fn val_type_byte(val_type: ValType) -> u8 {
    match val_type {
        ValType::I32 => 0x7F,
        ValType::I64 => 0x7E,
        ValType::F32 => 0x7D,
        ValType::F64 => 0x7C,
        other => unreachable!("{other:?} is never produced by val_type"),
    }
}

pub fn val_type_from_byte(byte: u8) -> Option<ValType> {
    match byte {
        0x7F => Some(ValType::I32),
        0x7E => Some(ValType::I64),
        0x7D => Some(ValType::F32),
        0x7C => Some(ValType::F64),
        _ => None,
    }
}
