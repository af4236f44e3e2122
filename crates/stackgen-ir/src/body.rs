use crate::span::Span;
use crate::ty::Ty;
use crate::value::ConstValue;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Index of an instruction inside its function's [`Body`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstId(pub u32);

impl InstId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for InstId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inst {
    pub ty: Ty,
    pub kind: InstKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstKind {
    /// Literal value; never part of the main instruction order.
    Constant(ConstValue),
    Arg { index: u32 },
    /// Stack allocation; the instruction type is a pointer to the slot's element type.
    Alloc,
    Load { ptr: InstId },
    Store { ptr: InstId, value: InstId },
    Add { lhs: InstId, rhs: InstId },
    Sub { lhs: InstId, rhs: InstId },
    Mul { lhs: InstId, rhs: InstId },
    Cmp { op: CmpOp, lhs: InstId, rhs: InstId },
    Call { callee: InstId, args: Vec<InstId> },
    Ret { operand: InstId },
    RetVoid,
    DbgStmt { line: u32, column: u32 },
    Block { body: Vec<InstId> },
    Br { block: InstId, operand: InstId },
    CondBr {
        condition: InstId,
        then_body: Vec<InstId>,
        else_body: Vec<InstId>,
    },
    Unreach,
    BitCast { operand: InstId },
    IntCast { operand: InstId },
}

impl InstKind {
    /// Short lowercase name used in listings and diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            InstKind::Constant(_) => "constant",
            InstKind::Arg { .. } => "arg",
            InstKind::Alloc => "alloc",
            InstKind::Load { .. } => "load",
            InstKind::Store { .. } => "store",
            InstKind::Add { .. } => "add",
            InstKind::Sub { .. } => "sub",
            InstKind::Mul { .. } => "mul",
            InstKind::Cmp { op, .. } => match op {
                CmpOp::Eq => "cmp_eq",
                CmpOp::Ne => "cmp_neq",
                CmpOp::Lt => "cmp_lt",
                CmpOp::Le => "cmp_lte",
                CmpOp::Gt => "cmp_gt",
                CmpOp::Ge => "cmp_gte",
            },
            InstKind::Call { .. } => "call",
            InstKind::Ret { .. } => "ret",
            InstKind::RetVoid => "retvoid",
            InstKind::DbgStmt { .. } => "dbg_stmt",
            InstKind::Block { .. } => "block",
            InstKind::Br { .. } => "br",
            InstKind::CondBr { .. } => "condbr",
            InstKind::Unreach => "unreach",
            InstKind::BitCast { .. } => "bitcast",
            InstKind::IntCast { .. } => "intcast",
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, InstKind::Constant(_))
    }
}

/// Instruction arena of one function plus the order its main block runs in.
///
/// Operands always refer to instructions defined earlier in `code`, or to
/// constants, which sit in the arena without appearing in `code`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub insts: Vec<Inst>,
    pub code: Vec<InstId>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: InstId) -> Option<&Inst> {
        self.insts.get(id.index())
    }

    /// Panics when `id` does not belong to this body.
    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id.index()]
    }

    pub fn constant(&self, id: InstId) -> Option<&ConstValue> {
        match &self.get(id)?.kind {
            InstKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Instructions of the main block, in execution order.
    pub fn instructions(&self) -> impl Iterator<Item = (InstId, &Inst)> + '_ {
        self.code.iter().map(move |id| (*id, self.inst(*id)))
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Incrementally assembles a [`Body`].
#[derive(Debug, Default)]
pub struct BodyBuilder {
    body: Body,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, inst: Inst) -> InstId {
        let id = InstId(self.body.insts.len() as u32);
        self.body.insts.push(inst);
        id
    }

    /// Adds a literal to the arena without scheduling it.
    pub fn constant(&mut self, ty: Ty, value: ConstValue) -> InstId {
        self.alloc(Inst {
            ty,
            kind: InstKind::Constant(value),
            span: Span::dummy(),
        })
    }

    /// Adds an instruction and appends it to the main block.
    pub fn push(&mut self, ty: Ty, kind: InstKind, span: Span) -> InstId {
        let id = self.alloc(Inst { ty, kind, span });
        self.body.code.push(id);
        id
    }

    pub fn arg(&mut self, ty: Ty, index: u32) -> InstId {
        self.push(ty, InstKind::Arg { index }, Span::dummy())
    }

    pub fn alloc_local(&mut self, elem: Ty) -> InstId {
        self.push(Ty::ptr(elem), InstKind::Alloc, Span::dummy())
    }

    pub fn finish(self) -> Body {
        self.body
    }
}
