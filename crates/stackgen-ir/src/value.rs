use crate::decl::DeclId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Literal carried by a constant instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Void,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Function(DeclId),
}

impl ConstValue {
    pub fn to_signed(&self) -> Option<i64> {
        match *self {
            ConstValue::Int(value) => Some(value),
            ConstValue::UInt(value) => i64::try_from(value).ok(),
            ConstValue::Bool(value) => Some(value as i64),
            _ => None,
        }
    }

    pub fn to_unsigned(&self) -> Option<u64> {
        match *self {
            ConstValue::UInt(value) => Some(value),
            ConstValue::Int(value) => u64::try_from(value).ok(),
            ConstValue::Bool(value) => Some(value as u64),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match *self {
            ConstValue::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn to_f32(&self) -> Option<f32> {
        self.to_f64().map(|value| value as f32)
    }

    pub fn as_function(&self) -> Option<DeclId> {
        match *self {
            ConstValue::Function(decl) => Some(decl),
            _ => None,
        }
    }
}

impl Display for ConstValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstValue::Void => write!(f, "{{}}"),
            ConstValue::Int(value) => write!(f, "{}", value),
            ConstValue::UInt(value) => write!(f, "{}", value),
            ConstValue::Float(value) => write!(f, "{}", value),
            ConstValue::Bool(value) => write!(f, "{}", value),
            ConstValue::Function(decl) => write!(f, "@{}", decl),
        }
    }
}
