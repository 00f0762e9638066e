use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::callable::Call;
use crate::error::BindError;
use crate::signature::Parameters;
use crate::Value;

/// A typed parameter struct: declares its parameters, and binds a reconstructed call back into itself.
///
/// Typically derived via `#[derive(Arguments)]`.
pub trait Arguments: Sized {
    fn parameters() -> Parameters;

    fn from_call(call: Call) -> Result<Self, BindError>;
}

/// Conversion out of a dynamic [`Value`].
pub trait FromValue: Sized {
    /// Convert the value of the parameter `name`.
    fn from_value(name: &str, value: Value) -> Result<Self, BindError>;
}

fn mismatch(name: &str, expected: &'static str, value: &Value) -> BindError {
    match value {
        Value::Null => BindError::Missing(name.to_string()),
        _ => BindError::Mismatch {
            name: name.to_string(),
            expected,
            found: value.type_name(),
        },
    }
}

impl FromValue for Value {
    fn from_value(_name: &str, value: Value) -> Result<Self, BindError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
        match value {
            Value::Str(inner) => Ok(inner),
            other => Err(mismatch(name, "str", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
        value.as_bool().ok_or_else(|| mismatch(name, "bool", &value))
    }
}

macro_rules! from_integer_value {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
                    value
                        .as_int()
                        .and_then(|inner| <$t>::try_from(inner).ok())
                        .ok_or_else(|| mismatch(name, stringify!($t), &value))
                }
            }
        )*
    };
}

from_integer_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
        value.as_float().ok_or_else(|| mismatch(name, "f64", &value))
    }
}

impl FromValue for f32 {
    fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
        value
            .as_float()
            .map(|inner| inner as f32)
            .ok_or_else(|| mismatch(name, "f32", &value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(name, other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
        match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| T::from_value(name, item))
                .collect(),
            other => Err(mismatch(name, "list", &other)),
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, item)| Ok((key, T::from_value(name, item)?)))
                .collect(),
            other => Err(mismatch(name, "map", &other)),
        }
    }
}

impl<K, T> FromValue for HashMap<K, T>
where
    K: From<String> + Eq + Hash,
    T: FromValue,
{
    fn from_value(name: &str, value: Value) -> Result<Self, BindError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, item)| Ok((K::from(key), T::from_value(name, item)?)))
                .collect(),
            other => Err(mismatch(name, "map", &other)),
        }
    }
}

/// Walks a [`Call`] in declaration order, binding each part to a typed field.
#[derive(Debug)]
pub struct Binder {
    args: std::vec::IntoIter<Value>,
    varargs: Option<Vec<Value>>,
    kwargs: Option<BTreeMap<String, Value>>,
}

impl Binder {
    pub fn new(call: Call) -> Self {
        Self {
            args: call.args.into_iter(),
            varargs: Some(call.varargs),
            kwargs: Some(call.kwargs),
        }
    }

    /// Bind the next positional value; a missing value binds as `Value::Null`.
    pub fn next<T: FromValue>(&mut self, name: &str) -> Result<T, BindError> {
        T::from_value(name, self.args.next().unwrap_or(Value::Null))
    }

    /// Bind the variadic values, as a list.
    pub fn varargs<T: FromValue>(&mut self, name: &str) -> Result<T, BindError> {
        let items = self.varargs.take().unwrap_or_default();
        T::from_value(name, Value::List(items))
    }

    /// Bind the keyword values, as a map.
    pub fn varkw<T: FromValue>(&mut self, name: &str) -> Result<T, BindError> {
        let entries = self.kwargs.take().unwrap_or_default();
        T::from_value(name, Value::Map(entries))
    }
}
