use std::sync::Arc;
use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

pub type Dict<K = Arc<str>, V = Value> = BTreeMap<K, V>;

/// Represents any valid front matter or property value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Num(Num),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Dict(Arc<Dict>),
}

impl Value {
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None
        }
    }

    pub fn to_num(&self) -> Option<Num> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None
        }
    }

    pub fn into_str(self) -> Result<Arc<str>, Value> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None
        }
    }

    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(v) => Some(&**v),
            _ => None
        }
    }

    pub fn into_dict(self) -> Result<Arc<Dict>, Value> {
        match self {
            Value::Dict(v) => Ok(v),
            _ => Err(self)
        }
    }

    /// Interprets `self` as a flag the way course authors write them: `true`,
    /// any non-zero number, or the strings `"true"`/`"yes"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Num(n) => n.as_f64() != 0.0,
            Value::String(s) => matches!(&**s, "true" | "yes" | "1"),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

macro_rules! impl_from_primitive {
    ($($T:ty),+ => $E:ident::$kind:ident) => {
        $(
            impl From<$T> for $E {
                fn from(value: $T) -> Self {
                    $E::$kind(value.into())
                }
            }
        )+
    };
}

impl_from_primitive!(bool => Value::Bool);
impl_from_primitive!(&str => Value::String);
impl_from_primitive!(String => Value::String);
impl_from_primitive!(Arc<str> => Value::String);
impl_from_primitive!(Arc<Vec<Value>> => Value::Array);
impl_from_primitive!(Arc<Dict> => Value::Dict);
impl_from_primitive!(u8, u16, u32, u64, usize => Value::Num);
impl_from_primitive!(i8, i16, i32, i64, isize => Value::Num);
impl_from_primitive!(f32, f64 => Value::Num);

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Value::Dict(Arc::new(value))
    }
}

/// A numeric value as found in YAML or JSON documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Num {
    /// An unsigned integer.
    U64(u64),
    /// A signed integer.
    I64(i64),
    /// A floating point number.
    F64(f64),
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Num::U64(v) => v as f64,
            Num::I64(v) => v as f64,
            Num::F64(v) => v,
        }
    }

    /// The value as an `i64` if it is integral and in range.
    pub fn to_i64(self) -> Option<i64> {
        match self {
            Num::U64(v) => i64::try_from(v).ok(),
            Num::I64(v) => Some(v),
            Num::F64(_) => None,
        }
    }
}

macro_rules! impl_from_for_num_value {
    ($($T:ty: $V:ident),* $(,)?) => ($(
        impl From<$T> for Num {
            fn from(value: $T) -> Num {
                Num::$V(value.into())
            }
        }
    )*)
}

impl_from_for_num_value! {
    u8: U64, u16: U64, u32: U64, u64: U64,
    i8: I64, i16: I64, i32: I64, i64: I64,
    f32: F64, f64: F64,
}

impl From<usize> for Num {
    fn from(value: usize) -> Num {
        Num::U64(value as u64)
    }
}

impl From<isize> for Num {
    fn from(value: isize) -> Num {
        Num::I64(value as i64)
    }
}

macro_rules! impl_try_from_value {
    ($($T:ty),+ => | $v:ident | $e:expr) => {
        $(
            impl TryFrom<$crate::value::Value> for $T {
                type Error = Value;

                fn try_from($v: $crate::value::Value) -> Result<Self, Self::Error> {
                    (|| $e)()
                }
            }
        )+
    };
}

impl_try_from_value!(bool => |v| v.to_bool().ok_or(v));
impl_try_from_value!(Arc<str> => |v| v.into_str());
impl_try_from_value!(String => |v| v.into_str().map(|s| s.to_string()));
impl_try_from_value!(Arc<Dict> => |v| v.into_dict());
impl_try_from_value!(Num => |v| v.to_num().ok_or(v));
