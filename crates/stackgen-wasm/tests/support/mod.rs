#![allow(dead_code)]
use stackgen_ir::{BodyBuilder, ConstValue, Decl, DeclId, FnTy, InstId, InstKind, Span, Ty};
use stackgen_wasm::opcodes::PADDED_U32_WIDTH;
use stackgen_wasm::{generate_function, FunctionCode};

pub fn fn_ty(params: Vec<Ty>, ret: Ty) -> FnTy {
    FnTy { params, ret }
}

/// Function declaration whose body is filled in by `build`.
pub fn function(
    name: &str,
    params: Vec<Ty>,
    ret: Ty,
    build: impl FnOnce(&mut BodyBuilder),
) -> Decl {
    let mut builder = BodyBuilder::new();
    build(&mut builder);
    Decl::function(name, fn_ty(params, ret), builder.finish())
}

pub fn generate(decl: &Decl) -> FunctionCode {
    generate_function(DeclId(0), decl).expect("generation should succeed")
}

pub fn op(b: &mut BodyBuilder, ty: Ty, kind: InstKind) -> InstId {
    b.push(ty, kind, Span::dummy())
}

pub fn ret(b: &mut BodyBuilder, operand: InstId) -> InstId {
    op(b, Ty::NoReturn, InstKind::Ret { operand })
}

pub fn ret_void(b: &mut BodyBuilder) -> InstId {
    op(b, Ty::NoReturn, InstKind::RetVoid)
}

pub fn fn_ref(b: &mut BodyBuilder, target: DeclId, ty: FnTy) -> InstId {
    b.constant(Ty::Fn(Box::new(ty)), ConstValue::Function(target))
}

/// Value of the fixed-width size prefix.
pub fn size_prefix(body: &[u8]) -> u32 {
    body[..PADDED_U32_WIDTH]
        .iter()
        .enumerate()
        .map(|(idx, byte)| u32::from(byte & 0x7F) << (7 * idx))
        .sum()
}

/// Instruction bytes between the local declarations and the end marker.
/// Only valid for bodies with fewer than 128 local entries.
pub fn instruction_bytes(body: &[u8]) -> &[u8] {
    let count = body[PADDED_U32_WIDTH] as usize;
    assert!(count < 0x80, "helper expects a single-byte local count");
    assert_eq!(*body.last().expect("non-empty body"), 0x0B);
    &body[PADDED_U32_WIDTH + 1 + 2 * count..body.len() - 1]
}
