use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// The dynamically typed value carried from the command line into a call.
///
/// `Null` is a legitimate value (and a legitimate default).
/// Floats compare and hash by their bit pattern, so that values may key a map.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// A string keyed mapping of values.
    Map(BTreeMap<String, Value>),
}

/// The values captured by a parse, keyed by destination name.
pub type Values = HashMap<String, Value>;

impl Value {
    /// The name of this value's variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    #[allow(missing_docs)]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[allow(missing_docs)]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integers widen into floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(values) => Some(values),
            _ => None,
        }
    }

    /// Whether the value counts as "set" when re-serialized as a switch.
    /// `Null`, `false`, zero and empty containers are not truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(value) => !value.is_empty(),
            Value::List(values) => !values.is_empty(),
            Value::Map(values) => !values.is_empty(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Value::Null => {}
            Value::Bool(value) => value.hash(state),
            Value::Int(value) => value.hash(state),
            Value::Float(value) => value.to_bits().hash(state),
            Value::Str(value) => value.hash(state),
            Value::List(values) => values.hash(state),
            Value::Map(values) => values.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Str(value) => write!(f, "{value}"),
            Value::List(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Map(values) => {
                let items: Vec<String> = values.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(values: BTreeMap<String, T>) -> Self {
        Value::Map(values.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// Converts a single command line token into a [`Value`].
/// The error is a short reason, which the parser places in context.
pub type Converter = Rc<dyn Fn(&str) -> Result<Value, String>>;

/// Stock [`Converter`]s.
pub mod convert {
    use std::rc::Rc;
    use std::str::FromStr;

    use super::{Converter, Value};

    /// Wrap a closure as a [`Converter`].
    pub fn with(function: impl Fn(&str) -> Result<Value, String> + 'static) -> Converter {
        Rc::new(function)
    }

    /// Keep the token as a string (the behaviour when no converter is declared).
    pub fn string() -> Converter {
        Rc::new(|token: &str| Ok(Value::Str(token.to_string())))
    }

    /// Parse the token via `T`'s `FromStr`.
    pub fn parse<T>() -> Converter
    where
        T: FromStr + Into<Value> + 'static,
    {
        Rc::new(|token: &str| {
            T::from_str(token)
                .map(Into::into)
                .map_err(|_| format!("expected {}", short_type_name::<T>()))
        })
    }

    #[allow(missing_docs)]
    pub fn integer() -> Converter {
        parse::<i64>()
    }

    #[allow(missing_docs)]
    pub fn float() -> Converter {
        parse::<f64>()
    }

    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, ignoring case.
    pub fn boolean() -> Converter {
        Rc::new(|token: &str| match token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err("expected bool".to_string()),
        })
    }

    fn short_type_name<T>() -> &'static str {
        let full = std::any::type_name::<T>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case(Value::Null, false)]
    #[case(Value::Bool(false), false)]
    #[case(Value::Bool(true), true)]
    #[case(Value::Int(0), false)]
    #[case(Value::Int(-3), true)]
    #[case(Value::Str("".to_string()), false)]
    #[case(Value::Str("x".to_string()), true)]
    #[case(Value::List(vec![]), false)]
    #[case(Value::List(vec![Value::Null]), true)]
    fn truthy(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[test]
    fn float_identity() {
        // Setup
        let mut set = HashSet::new();

        // Execute
        set.insert(Value::Float(1.5));
        set.insert(Value::Float(1.5));
        set.insert(Value::Float(f64::NAN));
        set.insert(Value::Float(f64::NAN));

        // Verify
        assert_eq!(set.len(), 2);
        assert_ne!(Value::Float(1.0), Value::Int(1));
    }

    #[test]
    fn tuple_keys() {
        let a: Vec<Value> = vec![Value::from("x"), Value::from(1)];
        let b: Vec<Value> = vec![Value::from("x".to_string()), Value::Int(1)];
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[rstest]
    #[case(Value::Null, "None")]
    #[case(Value::from(1234), "1234")]
    #[case(Value::from("abc"), "abc")]
    #[case(Value::from(vec![1, 2]), "[1, 2]")]
    #[case(Value::from(BTreeMap::from([("k".to_string(), "v")])), "{k=v}")]
    fn display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn option_into() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(2u8)), Value::Int(2));
    }

    #[rstest]
    #[case(convert::integer(), "01", Value::Int(1))]
    #[case(convert::integer(), "-5", Value::Int(-5))]
    #[case(convert::float(), "2.5", Value::Float(2.5))]
    #[case(convert::boolean(), "Yes", Value::Bool(true))]
    #[case(convert::boolean(), "off", Value::Bool(false))]
    #[case(convert::string(), "01", Value::from("01"))]
    fn converters(#[case] converter: Converter, #[case] token: &str, #[case] expected: Value) {
        assert_eq!(converter(token).unwrap(), expected);
    }

    #[rstest]
    #[case(convert::integer(), "abc", "expected i64")]
    #[case(convert::float(), "1.2.3", "expected f64")]
    #[case(convert::boolean(), "maybe", "expected bool")]
    fn converters_invalid(
        #[case] converter: Converter,
        #[case] token: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(converter(token).unwrap_err(), expected);
    }
}
