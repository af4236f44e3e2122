//! Typed single-assignment IR consumed by the stackgen backends.
//!
//! The crate carries everything a code generator needs from the rest of the
//! compiler: types, constant values, instruction bodies, the declaration table
//! with its link data, spans, and the shared error and diagnostic types.

#[macro_use]
pub mod macros;

pub mod body;
pub mod decl;
pub mod diagnostics;
pub mod error;
pub mod span;
pub mod ty;
pub mod value;

// Re-export commonly used items for convenience
pub use tracing;

pub use body::{Body, BodyBuilder, CmpOp, Inst, InstId, InstKind};
pub use decl::{Decl, DeclId, DeclTable, IrModule, LinkData, Reloc};
pub use span::Span;
pub use ty::{FnTy, Ty};
pub use value::ConstValue;

pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
