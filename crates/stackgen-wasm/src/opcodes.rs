//! Binary constants of the code section and the few encodings wasm-encoder
//! does not provide.

use wasm_encoder::Encode;

pub const FUNC_TYPE: u8 = 0x60;

pub const CALL: u8 = 0x10;
pub const LOCAL_GET: u8 = 0x20;
pub const LOCAL_SET: u8 = 0x21;
pub const I32_CONST: u8 = 0x41;
pub const I64_CONST: u8 = 0x42;
pub const F32_CONST: u8 = 0x43;
pub const F64_CONST: u8 = 0x44;
pub const I32_ADD: u8 = 0x6A;
pub const I64_ADD: u8 = 0x7C;
pub const F32_ADD: u8 = 0x92;
pub const F64_ADD: u8 = 0xA0;
pub const END: u8 = 0x0B;

/// Width of a `u32` LEB128 padded to its maximum length.
pub const PADDED_U32_WIDTH: usize = 5;

/// Bytes the linker inserts after each `call` opcode. Function indices are
/// patched with the same padded encoding as the body size prefix.
pub const RELOC_WIDTH: usize = PADDED_U32_WIDTH;

/// Write `value` as unsigned LEB128 into exactly `PADDED_U32_WIDTH` bytes.
pub fn write_padded_u32(dest: &mut [u8], value: u32) {
    assert_eq!(
        dest.len(),
        PADDED_U32_WIDTH,
        "padded u32 slot must be {PADDED_U32_WIDTH} bytes"
    );
    let mut val = value;
    for (idx, byte) in dest.iter_mut().enumerate() {
        *byte = (val & 0x7F) as u8;
        val >>= 7;
        if idx + 1 < PADDED_U32_WIDTH {
            *byte |= 0x80;
        }
    }
}

pub fn push_uleb(sink: &mut Vec<u8>, value: u32) {
    value.encode(sink);
}

pub fn push_local(sink: &mut Vec<u8>, opcode: u8, index: u32) {
    sink.push(opcode);
    push_uleb(sink, index);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_u32_keeps_full_width() {
        let mut slot = [0u8; PADDED_U32_WIDTH];
        write_padded_u32(&mut slot, 0);
        assert_eq!(slot, [0x80, 0x80, 0x80, 0x80, 0x00]);

        write_padded_u32(&mut slot, 624_485);
        assert_eq!(slot, [0xE5, 0x8E, 0xA6, 0x80, 0x00]);

        write_padded_u32(&mut slot, u32::MAX);
        assert_eq!(slot, [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn local_access_uses_minimal_leb() {
        let mut sink = Vec::new();
        push_local(&mut sink, LOCAL_GET, 1);
        push_local(&mut sink, LOCAL_SET, 128);
        assert_eq!(sink, vec![0x20, 0x01, 0x21, 0x80, 0x01]);
    }
}
