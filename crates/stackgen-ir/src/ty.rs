use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Type of an IR value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ty {
    Void,
    NoReturn,
    Bool,
    Int { signed: bool, bits: u16 },
    Float { bits: u16 },
    Ptr(Box<Ty>),
    Array(Box<Ty>, u64),
    Struct { name: String, fields: Vec<Ty> },
    Fn(Box<FnTy>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FnTy {
    pub params: Vec<Ty>,
    pub ret: Ty,
}

impl Ty {
    pub fn int(signed: bool, bits: u16) -> Ty {
        Ty::Int { signed, bits }
    }

    pub fn i32() -> Ty {
        Ty::int(true, 32)
    }

    pub fn u32() -> Ty {
        Ty::int(false, 32)
    }

    pub fn i64() -> Ty {
        Ty::int(true, 64)
    }

    pub fn u64() -> Ty {
        Ty::int(false, 64)
    }

    pub fn f32() -> Ty {
        Ty::Float { bits: 32 }
    }

    pub fn f64() -> Ty {
        Ty::Float { bits: 64 }
    }

    pub fn ptr(pointee: Ty) -> Ty {
        Ty::Ptr(Box::new(pointee))
    }

    pub fn func(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Fn(Box::new(FnTy { params, ret }))
    }

    /// `void` and `noreturn` both mean "no value is produced".
    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void | Ty::NoReturn)
    }

    pub fn is_signed_int(&self) -> bool {
        matches!(self, Ty::Int { signed: true, .. })
    }

    /// Element type behind a pointer, if this is one.
    pub fn pointee(&self) -> Option<&Ty> {
        match self {
            Ty::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn fn_ty(&self) -> Option<&FnTy> {
        match self {
            Ty::Fn(fn_ty) => Some(fn_ty),
            _ => None,
        }
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Void => write!(f, "void"),
            Ty::NoReturn => write!(f, "noreturn"),
            Ty::Bool => write!(f, "bool"),
            Ty::Int { signed, bits } => {
                write!(f, "{}{}", if *signed { "i" } else { "u" }, bits)
            }
            Ty::Float { bits } => write!(f, "f{}", bits),
            Ty::Ptr(inner) => write!(f, "*{}", inner),
            Ty::Array(elem, len) => write!(f, "[{}]{}", len, elem),
            Ty::Struct { name, .. } => write!(f, "struct {}", name),
            Ty::Fn(fn_ty) => write!(f, "{}", fn_ty),
        }
    }
}

impl Display for FnTy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fn({}) {}",
            self.params.iter().map(|ty| ty.to_string()).join(", "),
            self.ret
        )
    }
}
