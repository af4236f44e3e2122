//! Decoder for generated function bodies, used for listings and tests.

use crate::opcodes::{
    CALL, END, F32_ADD, F32_CONST, F64_ADD, F64_CONST, I32_ADD, I32_CONST, I64_ADD, I64_CONST,
    LOCAL_GET, LOCAL_SET,
};
use crate::types::val_type_from_byte;
use stackgen_ir::error::Result;
use stackgen_ir::{bail, DeclId, Reloc};
use std::fmt::{Display, Formatter};
use wasm_encoder::ValType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    LocalGet(u32),
    LocalSet(u32),
    I32Const(i32),
    I64Const(i64),
    F32Const(f32),
    F64Const(f64),
    I32Add,
    I64Add,
    F32Add,
    F64Add,
    /// Call whose function index is still to be written by the linker.
    CallReloc(DeclId),
    Call(u32),
    End,
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::LocalGet(idx) => write!(f, "local.get {}", idx),
            Op::LocalSet(idx) => write!(f, "local.set {}", idx),
            Op::I32Const(v) => write!(f, "i32.const {}", v),
            Op::I64Const(v) => write!(f, "i64.const {}", v),
            Op::F32Const(v) => write!(f, "f32.const {}", v),
            Op::F64Const(v) => write!(f, "f64.const {}", v),
            Op::I32Add => write!(f, "i32.add"),
            Op::I64Add => write!(f, "i64.add"),
            Op::F32Add => write!(f, "f32.add"),
            Op::F64Add => write!(f, "f64.add"),
            Op::CallReloc(target) => write!(f, "call <reloc -> {}>", target),
            Op::Call(idx) => write!(f, "call {}", idx),
            Op::End => write!(f, "end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBody {
    /// Value of the size prefix.
    pub size: u32,
    /// Local declarations as `(count, type)` runs.
    pub locals: Vec<(u32, ValType)>,
    /// Instructions with the offset of their opcode byte.
    pub ops: Vec<(usize, Op)>,
}

impl DecodedBody {
    /// Human readable listing, one instruction per line.
    pub fn listing(&self) -> Vec<String> {
        let mut lines = vec![format!("size {}", self.size)];
        for (count, val_type) in &self.locals {
            lines.push(format!("local {} x {:?}", count, val_type));
        }
        for (offset, op) in &self.ops {
            lines.push(format!("{:>6}: {}", offset, op));
        }
        lines
    }
}

pub struct BodyReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    relocs: &'a [Reloc],
}

impl<'a> BodyReader<'a> {
    /// `relocs` lists the call sites whose index bytes are still missing.
    pub fn new(bytes: &'a [u8], relocs: &'a [Reloc]) -> Self {
        Self {
            bytes,
            pos: 0,
            relocs,
        }
    }

    pub fn decode(mut self) -> Result<DecodedBody> {
        let size = self.read_u32()?;

        let mut locals = Vec::new();
        let local_runs = self.read_u32()?;
        for _ in 0..local_runs {
            let count = self.read_u32()?;
            let byte = self.read_byte()?;
            let Some(val_type) = val_type_from_byte(byte) else {
                bail!("unknown value type 0x{:02X} at offset {}", byte, self.pos - 1);
            };
            locals.push((count, val_type));
        }

        let mut ops = Vec::new();
        loop {
            let offset = self.pos;
            let op = self.read_op()?;
            ops.push((offset, op));
            if op == Op::End {
                break;
            }
        }
        if self.pos != self.bytes.len() {
            bail!(
                "{} trailing bytes after end marker",
                self.bytes.len() - self.pos
            );
        }

        Ok(DecodedBody { size, locals, ops })
    }

    fn read_op(&mut self) -> Result<Op> {
        let opcode = self.read_byte()?;
        let op = match opcode {
            LOCAL_GET => Op::LocalGet(self.read_u32()?),
            LOCAL_SET => Op::LocalSet(self.read_u32()?),
            I32_CONST => {
                let start = self.pos;
                let value = self.read_i64()?;
                match i32::try_from(value) {
                    Ok(value) => Op::I32Const(value),
                    Err(_) => bail!("i32.const immediate at offset {} overflows i32", start),
                }
            }
            I64_CONST => Op::I64Const(self.read_i64()?),
            F32_CONST => {
                let bytes = self.read_array::<4>()?;
                Op::F32Const(f32::from_le_bytes(bytes))
            }
            F64_CONST => {
                let bytes = self.read_array::<8>()?;
                Op::F64Const(f64::from_le_bytes(bytes))
            }
            I32_ADD => Op::I32Add,
            I64_ADD => Op::I64Add,
            F32_ADD => Op::F32Add,
            F64_ADD => Op::F64Add,
            CALL => {
                let pos = self.pos as u32;
                match self.relocs.iter().find(|reloc| reloc.offset == pos) {
                    Some(reloc) => Op::CallReloc(reloc.target),
                    None => Op::Call(self.read_u32()?),
                }
            }
            END => Op::End,
            other => bail!("unknown opcode 0x{:02X} at offset {}", other, self.pos - 1),
        };
        Ok(op)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let Some(byte) = self.bytes.get(self.pos).copied() else {
            bail!("unexpected end of body at offset {}", self.pos);
        };
        self.pos += 1;
        Ok(byte)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        for byte in out.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let start = self.pos;
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.read_byte()?;
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift >= 35 {
                bail!("unsigned LEB128 at offset {} is too long", start);
            }
        }
        match u32::try_from(result) {
            Ok(value) => Ok(value),
            Err(_) => bail!("unsigned LEB128 at offset {} overflows u32", start),
        }
    }

    fn read_i64(&mut self) -> Result<i64> {
        let start = self.pos;
        let mut result: i64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.read_byte()?;
            result |= i64::from(byte & 0x7F) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < 64 && byte & 0x40 != 0 {
                    result |= -1 << shift;
                }
                break;
            }
            if shift >= 70 {
                bail!("signed LEB128 at offset {} is too long", start);
            }
        }
        Ok(result)
    }
}
